use crate::exception::ExceptionCode;

/// Errors detected while validating a [`ServerConfig`](crate::ServerConfig)
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// The URL does not start with `tcp://`, the only supported scheme
    UnsupportedScheme(String),
    /// The part of the URL after the scheme is not a `host:port` pair
    InvalidAddress(String),
}

/// Errors returned by the [`Server`](crate::server::Server) lifecycle operations
#[derive(Debug)]
pub enum ServerError {
    /// Binding or closing the listener failed
    Io(std::io::Error),
    /// The accept task terminated abnormally
    Task(tokio::task::JoinError),
}

/// Error returned by a [`RequestHandler`](crate::server::RequestHandler)
///
/// The server converts it into the exception code of the error response:
///
/// * `Exception(code)` is sent as `code`
/// * `Other(..)` is sent as [`ExceptionCode::ServerDeviceFailure`]
#[derive(Debug)]
pub enum HandlerError {
    /// The handler rejected the request with a specific exception
    Exception(ExceptionCode),
    /// Any other failure inside the handler
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl HandlerError {
    /// Wrap an arbitrary error
    pub fn other<E>(err: E) -> Self
    where
        E: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        HandlerError::Other(err.into())
    }

    /// The exception code sent back to the client for this error
    pub fn exception_code(&self) -> ExceptionCode {
        match self {
            HandlerError::Exception(ex) => *ex,
            HandlerError::Other(_) => ExceptionCode::ServerDeviceFailure,
        }
    }
}

/// Malformed request content; the server closes the connection instead of replying
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum ProtocolError {
    /// payload must be exactly this many bytes
    WrongLength(usize, usize), // expected / actual
    /// payload is shorter than the minimum for the function
    TooShort(usize, usize), // minimum / actual
    /// quantity is zero or above the limit for the function
    QuantityOutOfRange(u16, u16), // quantity / max
    /// write single coil value other than 0xFF00 or 0x0000
    BadCoilValue(u8, u8),
    /// byte count field doesn't match the quantity
    ByteCountMismatch(usize, u8), // expected / actual
    /// byte count field doesn't match the number of bytes present
    InsufficientBytesForByteCount(usize, usize), // count / remaining
    /// attempted to read past the end of the payload
    InsufficientBytes,
}

/// errors that should only occur if there is a logic error in the server or a handler
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum InternalError {
    /// attempted to write more bytes than the buffer allows
    InsufficientWriteSpace(usize, usize), // written / remaining
    /// attempted to read more bytes than present
    InsufficientBytesForRead(usize, usize), // requested / remaining
    /// a byte count would not fit into a u8
    BadByteCount(usize),
    /// a handler returned a different number of values than requested
    HandlerResultCount(usize, usize), // expected / actual
    /// dispatch completed without producing a response or an error
    NoResponse,
}

/// errors in the MBAP header of a received frame
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum FrameParseError {
    /// length field does not cover the unit id and a function code
    MbapLengthTooSmall(usize),
    /// length field exceeds the maximum frame size
    MbapLengthTooBig(usize, usize), // actual / max
    /// protocol id is not Modbus
    UnknownProtocolId(u16),
}

/// outcome of validating and dispatching a single request
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum RequestError {
    /// the connection must be closed without a reply
    Protocol(ProtocolError),
    /// reply with an exception response
    Exception(ExceptionCode),
    /// reply with a server device failure and log
    Internal(InternalError),
}

/// failures that end a connection
#[derive(Debug)]
pub(crate) enum TransportError {
    Io(std::io::Error),
    Frame(FrameParseError),
    Internal(InternalError),
    Timeout,
}

impl std::error::Error for ConfigError {}
impl std::error::Error for HandlerError {}
impl std::error::Error for ProtocolError {}
impl std::error::Error for InternalError {}
impl std::error::Error for FrameParseError {}
impl std::error::Error for TransportError {}

impl std::error::Error for ServerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServerError::Io(err) => Some(err),
            ServerError::Task(err) => Some(err),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ConfigError::UnsupportedScheme(url) => {
                write!(f, "unsupported URL scheme (expected tcp://host:port): {url}")
            }
            ConfigError::InvalidAddress(addr) => {
                write!(f, "listen address is not a valid host:port pair: {addr}")
            }
        }
    }
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ServerError::Io(err) => write!(f, "I/O error: {err}"),
            ServerError::Task(err) => write!(f, "accept task failed: {err}"),
        }
    }
}

impl std::fmt::Display for HandlerError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            HandlerError::Exception(ex) => write!(f, "handler exception: {ex}"),
            HandlerError::Other(err) => write!(f, "handler error: {err}"),
        }
    }
}

impl std::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ProtocolError::WrongLength(expected, actual) => write!(
                f,
                "request payload is {actual} bytes, expected exactly {expected}"
            ),
            ProtocolError::TooShort(min, actual) => write!(
                f,
                "request payload is {actual} bytes, expected at least {min}"
            ),
            ProtocolError::QuantityOutOfRange(quantity, max) => write!(
                f,
                "quantity of {quantity} is outside the allowed range [1, {max}]"
            ),
            ProtocolError::BadCoilValue(high, low) => write!(
                f,
                "coil value 0x{high:02X}{low:02X} is neither 0xFF00 nor 0x0000"
            ),
            ProtocolError::ByteCountMismatch(expected, actual) => write!(
                f,
                "byte count ({actual}) doesn't match what is expected based on quantity ({expected})"
            ),
            ProtocolError::InsufficientBytesForByteCount(count, remaining) => write!(
                f,
                "byte count ({count}) doesn't match the actual number of bytes remaining ({remaining})"
            ),
            ProtocolError::InsufficientBytes => f.write_str("request is too short to be valid"),
        }
    }
}

impl std::fmt::Display for InternalError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            InternalError::InsufficientWriteSpace(written, remaining) => write!(
                f,
                "attempted to write {written} bytes with {remaining} bytes remaining"
            ),
            InternalError::InsufficientBytesForRead(requested, remaining) => write!(
                f,
                "attempted to read {requested} bytes with only {remaining} remaining"
            ),
            InternalError::BadByteCount(count) => {
                write!(f, "byte count would exceed maximum size of u8: {count}")
            }
            InternalError::HandlerResultCount(expected, actual) => write!(
                f,
                "handler returned {actual} values, expected {expected}"
            ),
            InternalError::NoResponse => {
                f.write_str("request produced neither a response nor an error")
            }
        }
    }
}

impl std::fmt::Display for FrameParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            FrameParseError::MbapLengthTooSmall(length) => write!(
                f,
                "received TCP frame with length ({length}) too small to hold a function code"
            ),
            FrameParseError::MbapLengthTooBig(size, max) => write!(
                f,
                "received TCP frame with length ({size}) that exceeds max allowed size ({max})"
            ),
            FrameParseError::UnknownProtocolId(id) => {
                write!(f, "received TCP frame with non-Modbus protocol id: {id}")
            }
        }
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            RequestError::Protocol(err) => write!(f, "protocol error: {err}"),
            RequestError::Exception(ex) => write!(f, "exception: {ex}"),
            RequestError::Internal(err) => write!(f, "internal error: {err}"),
        }
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            TransportError::Io(err) => write!(f, "I/O error: {err}"),
            TransportError::Frame(err) => write!(f, "framing error: {err}"),
            TransportError::Internal(err) => write!(f, "internal error: {err}"),
            TransportError::Timeout => f.write_str("idle timeout expired"),
        }
    }
}

impl From<std::io::Error> for ServerError {
    fn from(err: std::io::Error) -> Self {
        ServerError::Io(err)
    }
}

impl From<tokio::task::JoinError> for ServerError {
    fn from(err: tokio::task::JoinError) -> Self {
        ServerError::Task(err)
    }
}

impl From<ExceptionCode> for HandlerError {
    fn from(ex: ExceptionCode) -> Self {
        HandlerError::Exception(ex)
    }
}

impl From<std::io::Error> for HandlerError {
    fn from(err: std::io::Error) -> Self {
        HandlerError::Other(Box::new(err))
    }
}

impl From<HandlerError> for RequestError {
    fn from(err: HandlerError) -> Self {
        RequestError::Exception(err.exception_code())
    }
}

impl From<ProtocolError> for RequestError {
    fn from(err: ProtocolError) -> Self {
        RequestError::Protocol(err)
    }
}

impl From<InternalError> for RequestError {
    fn from(err: InternalError) -> Self {
        RequestError::Internal(err)
    }
}

impl From<ExceptionCode> for RequestError {
    fn from(ex: ExceptionCode) -> Self {
        RequestError::Exception(ex)
    }
}

impl From<std::io::Error> for TransportError {
    fn from(err: std::io::Error) -> Self {
        TransportError::Io(err)
    }
}

impl From<FrameParseError> for TransportError {
    fn from(err: FrameParseError) -> Self {
        TransportError::Frame(err)
    }
}

impl From<InternalError> for TransportError {
    fn from(err: InternalError) -> Self {
        TransportError::Internal(err)
    }
}

impl From<tokio::time::error::Elapsed> for TransportError {
    fn from(_: tokio::time::error::Elapsed) -> Self {
        TransportError::Timeout
    }
}
