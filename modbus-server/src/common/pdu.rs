use crate::common::cursor::WriteCursor;
use crate::common::function::as_error;
use crate::error::InternalError;
use crate::exception::ExceptionCode;
use crate::types::UnitId;

pub(crate) mod constants {
    /// function code plus at most 252 bytes of data
    pub(crate) const MAX_PDU_LENGTH: usize = 253;
}

/// one request or response: function code and the bytes that follow it
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Pdu {
    pub(crate) unit_id: UnitId,
    pub(crate) function: u8,
    pub(crate) payload: Vec<u8>,
}

impl Pdu {
    pub(crate) fn new(unit_id: UnitId, function: u8, payload: Vec<u8>) -> Self {
        Self {
            unit_id,
            function,
            payload,
        }
    }

    /// error response to a request with function code `function`
    pub(crate) fn exception(unit_id: UnitId, function: u8, ex: ExceptionCode) -> Self {
        Self::new(unit_id, as_error(function), vec![ex.to_u8()])
    }

    /// splits raw PDU bytes into function code and payload, `None` if there is no function code
    pub(crate) fn decode(unit_id: UnitId, bytes: &[u8]) -> Option<Self> {
        let (function, payload) = bytes.split_first()?;
        Some(Self::new(unit_id, *function, payload.to_vec()))
    }

    pub(crate) fn encode(&self, cursor: &mut WriteCursor) -> Result<(), InternalError> {
        cursor.write_u8(self.function)?;
        cursor.write_bytes(&self.payload)
    }

    /// number of bytes produced by [`Pdu::encode`]
    pub(crate) fn len(&self) -> usize {
        1 + self.payload.len()
    }

    pub(crate) fn is_exception(&self) -> bool {
        self.function & crate::constants::ERROR_BIT != 0
    }
}
