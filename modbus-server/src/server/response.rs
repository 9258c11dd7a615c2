use crate::common::pdu::Pdu;
use crate::decode::AppDecodeLevel;
use crate::error::{InternalError, ProtocolError, RequestError};
use crate::exception::ExceptionCode;

/// what the session does with the outcome of a request
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Reply {
    /// write this response and keep reading
    Send(Pdu),
    /// close the connection without writing anything
    Close(ProtocolError),
}

/// Turn the outcome of [`dispatch`](crate::server::request::dispatch) into exactly one reply
pub(crate) fn finalize(request: &Pdu, result: Result<Option<Pdu>, RequestError>) -> Reply {
    let err = match result {
        Ok(Some(response)) => return Reply::Send(response),
        Ok(None) => RequestError::Internal(InternalError::NoResponse),
        Err(err) => err,
    };

    let ex = match err {
        RequestError::Protocol(err) => return Reply::Close(err),
        RequestError::Exception(ex) => ex,
        RequestError::Internal(err) => {
            tracing::error!(
                "internal server error processing function {:#04X}: {}",
                request.function,
                err
            );
            ExceptionCode::ServerDeviceFailure
        }
    };

    Reply::Send(Pdu::exception(request.unit_id, request.function, ex))
}

pub(crate) struct ResponseDisplay<'a> {
    level: AppDecodeLevel,
    response: &'a Pdu,
}

impl<'a> ResponseDisplay<'a> {
    pub(crate) fn new(level: AppDecodeLevel, response: &'a Pdu) -> Self {
        Self { level, response }
    }
}

impl std::fmt::Display for ResponseDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.response.is_exception() {
            let ex = self
                .response
                .payload
                .first()
                .map(|x| ExceptionCode::from(*x))
                .unwrap_or(ExceptionCode::ServerDeviceFailure);
            return write!(
                f,
                "Modbus exception {} ({:#04X}) for function {:#04X}",
                ex,
                ex.to_u8(),
                self.response.function & !crate::constants::ERROR_BIT
            );
        }

        write!(f, "function {:#04X}", self.response.function)?;
        if self.level.data_headers() {
            write!(f, " length: {}", self.response.payload.len())?;
        }
        if self.level.data_values() {
            crate::decode::format_bytes(f, &self.response.payload)?;
        }
        Ok(())
    }
}
