use std::net::SocketAddr;
use std::sync::Arc;

use tracing::Instrument;

use crate::config::{ListenConfig, ServerConfig};
use crate::error::{ConfigError, ServerError};
use crate::tcp::server::{ServerTask, SharedState};

/// server handling
pub(crate) mod handler;
pub(crate) mod request;
pub(crate) mod response;
pub(crate) mod task;

// re-export to the public API
pub use handler::*;

/// A Modbus/TCP server
///
/// The server is created stopped. [`Server::start`] binds the listener and spawns the
/// accept task onto the current Tokio runtime; every accepted connection gets its own
/// session task. [`Server::stop`] closes the listener and every open connection.
///
/// Both lifecycle operations are idempotent and may be called concurrently from any
/// task. Cloning a `Server` produces another handle to the same server.
///
/// ```no_run
/// use std::sync::Arc;
/// use modbus_server::server::{RequestHandler, Server};
/// use modbus_server::ServerConfig;
///
/// struct NoData;
/// impl RequestHandler for NoData {}
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let server = Server::new(ServerConfig::new("tcp://0.0.0.0:502"), Arc::new(NoData))?;
/// server.start().await?;
/// // ...
/// server.stop().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Server {
    inner: Arc<ServerInner>,
}

struct ServerInner {
    config: ListenConfig,
    handler: Arc<dyn RequestHandler>,
    state: SharedState,
    // also serializes start and stop
    listener: tokio::sync::Mutex<Option<ListenerHandle>>,
}

struct ListenerHandle {
    shutdown: tokio::sync::mpsc::Sender<()>,
    task: tokio::task::JoinHandle<()>,
}

impl std::fmt::Debug for Server {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Server")
            .field("address", &self.inner.config.address)
            .field("started", &self.is_started())
            .finish()
    }
}

impl Server {
    /// Validate the configuration and create a stopped server
    ///
    /// Unset or zero timeout and connection limit are replaced with their defaults
    /// (120 seconds and 10 connections).
    pub fn new(
        config: ServerConfig,
        handler: Arc<dyn RequestHandler>,
    ) -> Result<Self, ConfigError> {
        let config = config.resolve()?;
        let state = SharedState::new(config.max_clients);
        Ok(Self {
            inner: Arc::new(ServerInner {
                config,
                handler,
                state,
                listener: tokio::sync::Mutex::new(None),
            }),
        })
    }

    /// Bind the listener and start accepting connections
    ///
    /// Does nothing if the server is already started. If binding fails the server
    /// stays stopped. Must be called from within a Tokio runtime.
    pub async fn start(&self) -> Result<(), ServerError> {
        let mut listener = self.inner.listener.lock().await;
        if listener.is_some() {
            return Ok(());
        }

        let socket = tokio::net::TcpListener::bind(self.inner.config.address.as_str()).await?;
        let local_addr = socket.local_addr()?;

        {
            let mut state = self.inner.state.lock();
            state.started = true;
            state.local_addr = Some(local_addr);
        }

        let (tx, rx) = tokio::sync::mpsc::channel(1);
        let mut task = ServerTask::new(
            socket,
            self.inner.handler.clone(),
            self.inner.state.clone(),
            self.inner.config.timeout,
            self.inner.config.decode,
        );

        let handle = tokio::spawn(
            async move { task.run(rx).await }
                .instrument(tracing::info_span!("Modbus-Server-TCP", "listen" = ?local_addr)),
        );

        *listener = Some(ListenerHandle {
            shutdown: tx,
            task: handle,
        });

        tracing::info!("server listening on {}", local_addr);
        Ok(())
    }

    /// Close the listener and every open connection
    ///
    /// Does nothing if the server is not started. Returns once the accept task has
    /// exited, but does not wait for the session tasks, which terminate on their own.
    pub async fn stop(&self) -> Result<(), ServerError> {
        let mut listener = self.inner.listener.lock().await;
        let handle = match listener.take() {
            Some(handle) => handle,
            None => return Ok(()),
        };

        {
            let mut state = self.inner.state.lock();
            state.started = false;
            state.local_addr = None;
            state.sessions.clear();
        }

        let ListenerHandle { shutdown, task } = handle;
        drop(shutdown);
        task.await?;

        tracing::info!("server stopped");
        Ok(())
    }

    /// true between a successful [`Server::start`] and the next [`Server::stop`]
    pub fn is_started(&self) -> bool {
        self.inner.state.lock().started
    }

    /// Address the listener is bound to while started
    ///
    /// Useful when the configured port is 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.inner.state.lock().local_addr
    }

    /// Number of connections currently being served
    pub fn active_sessions(&self) -> usize {
        self.inner.state.lock().sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoData;

    impl RequestHandler for NoData {}

    fn server(url: &str) -> Result<Server, ConfigError> {
        Server::new(ServerConfig::new(url), Arc::new(NoData))
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert_eq!(
            server("rtu:///dev/ttyS0").unwrap_err(),
            ConfigError::UnsupportedScheme("rtu:///dev/ttyS0".to_string())
        );
        assert_eq!(
            server("tcp://127.0.0.1").unwrap_err(),
            ConfigError::InvalidAddress("127.0.0.1".to_string())
        );
    }

    #[tokio::test]
    async fn start_and_stop_are_idempotent() {
        let server = server("tcp://127.0.0.1:0").unwrap();
        assert!(!server.is_started());
        server.stop().await.unwrap();

        server.start().await.unwrap();
        let addr = server.local_addr().unwrap();
        server.start().await.unwrap();
        assert!(server.is_started());
        assert_eq!(server.local_addr(), Some(addr));

        server.stop().await.unwrap();
        server.stop().await.unwrap();
        assert!(!server.is_started());
        assert_eq!(server.local_addr(), None);
        assert_eq!(server.active_sessions(), 0);
    }

    #[tokio::test]
    async fn bind_failure_leaves_server_stopped() {
        let first = server("tcp://127.0.0.1:0").unwrap();
        first.start().await.unwrap();
        let port = first.local_addr().unwrap().port();

        let second = server(&format!("tcp://127.0.0.1:{port}")).unwrap();
        assert!(matches!(second.start().await, Err(ServerError::Io(_))));
        assert!(!second.is_started());

        first.stop().await.unwrap();
    }

    #[tokio::test]
    async fn can_restart_after_stop() {
        let server = server("tcp://127.0.0.1:0").unwrap();
        server.start().await.unwrap();
        server.stop().await.unwrap();
        server.start().await.unwrap();
        assert!(server.is_started());
        server.stop().await.unwrap();
    }
}
