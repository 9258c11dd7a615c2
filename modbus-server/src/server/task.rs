use std::sync::Arc;

use crate::decode::AppDecodeLevel;
use crate::error::{ProtocolError, TransportError};
use crate::server::handler::RequestHandler;
use crate::server::request;
use crate::server::response::{self, Reply, ResponseDisplay};
use crate::tcp::transport::TcpTransport;

/// reason a session ended
#[derive(Debug)]
pub(crate) enum SessionError {
    /// the server dropped the session's shutdown channel
    Shutdown,
    /// read failure, idle timeout, bad framing or peer close
    Transport(TransportError),
    /// malformed request content
    Protocol(ProtocolError),
}

impl From<TransportError> for SessionError {
    fn from(err: TransportError) -> Self {
        SessionError::Transport(err)
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            SessionError::Shutdown => f.write_str("shutdown requested"),
            SessionError::Transport(err) => write!(f, "{err}"),
            SessionError::Protocol(err) => write!(f, "protocol error, closing link: {err}"),
        }
    }
}

/// the worker that owns a single client connection
pub(crate) struct SessionTask {
    transport: TcpTransport,
    handler: Arc<dyn RequestHandler>,
    shutdown: tokio::sync::mpsc::Receiver<()>,
    level: AppDecodeLevel,
}

impl SessionTask {
    pub(crate) fn new(
        transport: TcpTransport,
        handler: Arc<dyn RequestHandler>,
        shutdown: tokio::sync::mpsc::Receiver<()>,
        level: AppDecodeLevel,
    ) -> Self {
        Self {
            transport,
            handler,
            shutdown,
            level,
        }
    }

    /// process requests one at a time until the connection fails or the server stops it
    pub(crate) async fn run(self) -> SessionError {
        let Self {
            mut transport,
            handler,
            mut shutdown,
            level,
        } = self;

        let err = loop {
            tokio::select! {
                _ = shutdown.recv() => {
                    // only an explicit drop of the sender is expected
                    break SessionError::Shutdown;
                }
                res = run_one(&mut transport, handler.as_ref(), level) => {
                    if let Err(err) = res {
                        break err;
                    }
                }
            }
        };

        match &err {
            SessionError::Protocol(_) | SessionError::Transport(TransportError::Frame(_)) => {
                tracing::warn!("{err}")
            }
            _ => tracing::info!("{err}"),
        }

        err
    }
}

async fn run_one(
    transport: &mut TcpTransport,
    handler: &dyn RequestHandler,
    level: AppDecodeLevel,
) -> Result<(), SessionError> {
    let request = transport.read_request().await?;
    let result = request::dispatch(handler, &request, level);

    match response::finalize(&request, result) {
        Reply::Close(err) => Err(SessionError::Protocol(err)),
        Reply::Send(response) => {
            if level.enabled() {
                tracing::info!("PDU TX - {}", ResponseDisplay::new(level, &response));
            }
            // the next read reports the state of a broken connection
            if let Err(err) = transport.write_response(&response).await {
                tracing::warn!("failed to write response: {err}");
            }
            Ok(())
        }
    }
}
