use crate::constants::exceptions;

/// Exception codes a server places in the single-byte payload of an error response
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub enum ExceptionCode {
    /// The function code received in the query is not an allowable action for the server
    IllegalFunction,
    /// The data address received in the query is not an allowable address for the server
    IllegalDataAddress,
    /// A value contained in the request is not an allowable value for server
    IllegalDataValue,
    /// An unrecoverable error occurred while the server was attempting to perform the requested
    /// action
    ServerDeviceFailure,
    /// The server has accepted the request and is processing it
    Acknowledge,
    /// The server is engaged in processing a long-duration command, try again later
    ServerDeviceBusy,
    /// The server detected a parity error in its memory
    MemoryParityError,
    /// A gateway was unable to allocate a path from the input port to the output port
    GatewayPathUnavailable,
    /// A gateway received no response from the target device
    GatewayTargetDeviceFailedToRespond,
    /// Any code not defined in the standard, sent verbatim
    Unknown(u8),
}

impl ExceptionCode {
    /// Byte placed in the payload of the error response
    pub const fn to_u8(self) -> u8 {
        match self {
            ExceptionCode::IllegalFunction => exceptions::ILLEGAL_FUNCTION,
            ExceptionCode::IllegalDataAddress => exceptions::ILLEGAL_DATA_ADDRESS,
            ExceptionCode::IllegalDataValue => exceptions::ILLEGAL_DATA_VALUE,
            ExceptionCode::ServerDeviceFailure => exceptions::SERVER_DEVICE_FAILURE,
            ExceptionCode::Acknowledge => exceptions::ACKNOWLEDGE,
            ExceptionCode::ServerDeviceBusy => exceptions::SERVER_DEVICE_BUSY,
            ExceptionCode::MemoryParityError => exceptions::MEMORY_PARITY_ERROR,
            ExceptionCode::GatewayPathUnavailable => exceptions::GATEWAY_PATH_UNAVAILABLE,
            ExceptionCode::GatewayTargetDeviceFailedToRespond => {
                exceptions::GATEWAY_TARGET_DEVICE_FAILED_TO_RESPOND
            }
            ExceptionCode::Unknown(value) => value,
        }
    }
}

impl From<u8> for ExceptionCode {
    fn from(value: u8) -> Self {
        match value {
            exceptions::ILLEGAL_FUNCTION => ExceptionCode::IllegalFunction,
            exceptions::ILLEGAL_DATA_ADDRESS => ExceptionCode::IllegalDataAddress,
            exceptions::ILLEGAL_DATA_VALUE => ExceptionCode::IllegalDataValue,
            exceptions::SERVER_DEVICE_FAILURE => ExceptionCode::ServerDeviceFailure,
            exceptions::ACKNOWLEDGE => ExceptionCode::Acknowledge,
            exceptions::SERVER_DEVICE_BUSY => ExceptionCode::ServerDeviceBusy,
            exceptions::MEMORY_PARITY_ERROR => ExceptionCode::MemoryParityError,
            exceptions::GATEWAY_PATH_UNAVAILABLE => ExceptionCode::GatewayPathUnavailable,
            exceptions::GATEWAY_TARGET_DEVICE_FAILED_TO_RESPOND => {
                ExceptionCode::GatewayTargetDeviceFailedToRespond
            }
            _ => ExceptionCode::Unknown(value),
        }
    }
}

impl From<ExceptionCode> for u8 {
    fn from(ex: ExceptionCode) -> Self {
        ex.to_u8()
    }
}

impl std::error::Error for ExceptionCode {}

impl std::fmt::Display for ExceptionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ExceptionCode::IllegalFunction => f.write_str("illegal function"),
            ExceptionCode::IllegalDataAddress => f.write_str("illegal data address"),
            ExceptionCode::IllegalDataValue => f.write_str("illegal data value"),
            ExceptionCode::ServerDeviceFailure => f.write_str("server device failure"),
            ExceptionCode::Acknowledge => f.write_str("acknowledge"),
            ExceptionCode::ServerDeviceBusy => f.write_str("server device busy"),
            ExceptionCode::MemoryParityError => f.write_str("memory parity error"),
            ExceptionCode::GatewayPathUnavailable => f.write_str("gateway path unavailable"),
            ExceptionCode::GatewayTargetDeviceFailedToRespond => {
                f.write_str("gateway target device failed to respond")
            }
            ExceptionCode::Unknown(code) => write!(f, "unknown exception code: {code:#04X}"),
        }
    }
}
