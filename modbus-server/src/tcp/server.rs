use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::net::{TcpListener, TcpStream};
use tracing::Instrument;

use crate::common::phys::PhysLayer;
use crate::decode::DecodeLevel;
use crate::server::handler::RequestHandler;
use crate::server::task::SessionTask;
use crate::tcp::transport::TcpTransport;

struct SessionRecord {
    id: u64,
    // dropping the sender stops the session
    _shutdown: tokio::sync::mpsc::Sender<()>,
}

/// active sessions, bounded by the connection limit
pub(crate) struct SessionTracker {
    max: usize,
    id: u64,
    sessions: Vec<SessionRecord>,
}

impl SessionTracker {
    pub(crate) fn new(max: usize) -> Self {
        Self {
            max,
            id: 0,
            sessions: Vec::new(),
        }
    }

    fn get_next_id(&mut self) -> u64 {
        let ret = self.id;
        self.id += 1;
        ret
    }

    /// register a new session, or `None` if the limit has been reached
    pub(crate) fn add(&mut self, shutdown: tokio::sync::mpsc::Sender<()>) -> Option<u64> {
        if self.sessions.len() >= self.max {
            return None;
        }

        let id = self.get_next_id();
        self.sessions.push(SessionRecord {
            id,
            _shutdown: shutdown,
        });
        Some(id)
    }

    pub(crate) fn remove(&mut self, id: u64) {
        if let Some(pos) = self.sessions.iter().position(|x| x.id == id) {
            self.sessions.swap_remove(pos);
        }
    }

    /// drop every record, which signals every session to stop
    pub(crate) fn clear(&mut self) {
        self.sessions.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.sessions.len()
    }
}

/// state shared between the server handle, the accept loop and the sessions
pub(crate) struct ServerState {
    pub(crate) started: bool,
    pub(crate) local_addr: Option<SocketAddr>,
    pub(crate) sessions: SessionTracker,
}

#[derive(Clone)]
pub(crate) struct SharedState {
    inner: Arc<Mutex<ServerState>>,
}

impl SharedState {
    pub(crate) fn new(max_sessions: usize) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ServerState {
                started: false,
                local_addr: None,
                sessions: SessionTracker::new(max_sessions),
            })),
        }
    }

    /// the state is never left inconsistent by a panic, so a poisoned lock is still usable
    pub(crate) fn lock(&self) -> MutexGuard<'_, ServerState> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

pub(crate) struct ServerTask {
    listener: TcpListener,
    handler: Arc<dyn RequestHandler>,
    state: SharedState,
    timeout: Duration,
    decode: DecodeLevel,
}

impl ServerTask {
    pub(crate) fn new(
        listener: TcpListener,
        handler: Arc<dyn RequestHandler>,
        state: SharedState,
        timeout: Duration,
        decode: DecodeLevel,
    ) -> Self {
        Self {
            listener,
            handler,
            state,
            timeout,
            decode,
        }
    }

    pub(crate) async fn run(&mut self, mut shutdown: tokio::sync::mpsc::Receiver<()>) {
        loop {
            tokio::select! {
               _ = shutdown.recv() => {
                    tracing::info!("server shutdown");
                    return;
               }
               result = self.listener.accept() => {
                   match result {
                        Err(err) => {
                            if !self.state.lock().started {
                                return;
                            }
                            tracing::warn!("error accepting connection: {}", err);
                        }
                        Ok((socket, addr)) => {
                            self.handle(socket, addr)
                        }
                   }
               }
            }
        }
    }

    fn handle(&self, socket: TcpStream, addr: SocketAddr) {
        let (tx, rx) = tokio::sync::mpsc::channel(1);

        // admission check and registration happen under the same lock as stop
        let id = {
            let mut state = self.state.lock();
            if !state.started {
                return;
            }
            match state.sessions.add(tx) {
                Some(id) => id,
                None => {
                    tracing::warn!(
                        "max. number of concurrent connections reached, rejecting {}",
                        addr
                    );
                    return;
                }
            }
        };

        tracing::info!("accepted connection {} from: {}", id, addr);

        let transport = TcpTransport::new(PhysLayer::new_tcp(socket), self.timeout, self.decode);
        let task = SessionTask::new(transport, self.handler.clone(), rx, self.decode.app);
        let state = self.state.clone();

        tokio::spawn(
            async move {
                task.run().await;
                tracing::info!("shutdown session");
                state.lock().sessions.remove(id);
            }
            .instrument(tracing::info_span!("Session", id, remote = ?addr)),
        );
    }
}
