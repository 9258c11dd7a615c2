/// Controls the decoding of transmitted and received data
///
/// Each of the application, frame and physical layers has its own level.
///
/// Everything is logged at the INFO level through `tracing`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodeLevel {
    /// Controls decoding of the protocol data unit (function code and payload)
    pub app: AppDecodeLevel,
    /// Controls decoding of the MBAP header around each PDU
    pub frame: FrameDecodeLevel,
    /// Controls the logging of socket reads and writes
    pub physical: PhysDecodeLevel,
}

/// Controls how received requests and transmitted responses are decoded
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum AppDecodeLevel {
    /// Decode nothing
    #[default]
    Nothing,
    /// Decode the function code only
    FunctionCode,
    /// Decode the function code and the address range of the request
    DataHeaders,
    /// Decode the function code, the address range and the actual values
    DataValues,
}

/// Controls how the MBAP frames are decoded
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum FrameDecodeLevel {
    /// Decode nothing
    #[default]
    Nothing,
    /// Decode the header
    Header,
    /// Decode the header and the raw payload as hexadecimal
    Payload,
}

/// Controls how data transmitted over the socket is logged
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PhysDecodeLevel {
    /// Log nothing
    #[default]
    Nothing,
    /// Log only the length of data that is sent and received
    Length,
    /// Log the length and the actual data that is sent and received
    Data,
}

impl DecodeLevel {
    /// construct a `DecodeLevel` with nothing enabled
    pub fn nothing() -> Self {
        Self::default()
    }

    /// construct a `DecodeLevel` from its fields
    pub fn new(app: AppDecodeLevel, frame: FrameDecodeLevel, physical: PhysDecodeLevel) -> Self {
        DecodeLevel {
            app,
            frame,
            physical,
        }
    }
}

impl From<AppDecodeLevel> for DecodeLevel {
    fn from(app: AppDecodeLevel) -> Self {
        Self {
            app,
            frame: FrameDecodeLevel::Nothing,
            physical: PhysDecodeLevel::Nothing,
        }
    }
}

impl AppDecodeLevel {
    pub(crate) fn enabled(&self) -> bool {
        !matches!(self, AppDecodeLevel::Nothing)
    }

    pub(crate) fn data_headers(&self) -> bool {
        matches!(
            self,
            AppDecodeLevel::DataHeaders | AppDecodeLevel::DataValues
        )
    }

    pub(crate) fn data_values(&self) -> bool {
        matches!(self, AppDecodeLevel::DataValues)
    }
}

impl FrameDecodeLevel {
    pub(crate) fn enabled(&self) -> bool {
        !matches!(self, FrameDecodeLevel::Nothing)
    }

    pub(crate) fn payload_enabled(&self) -> bool {
        matches!(self, FrameDecodeLevel::Payload)
    }
}

impl PhysDecodeLevel {
    pub(crate) fn enabled(&self) -> bool {
        !matches!(self, PhysDecodeLevel::Nothing)
    }

    pub(crate) fn data_enabled(&self) -> bool {
        matches!(self, PhysDecodeLevel::Data)
    }
}

const BYTES_PER_DECODE_LINE: usize = 18;

pub(crate) fn format_bytes(f: &mut std::fmt::Formatter, bytes: &[u8]) -> std::fmt::Result {
    for chunk in bytes.chunks(BYTES_PER_DECODE_LINE) {
        writeln!(f)?;
        let mut first = true;
        for byte in chunk {
            if !first {
                f.write_str(" ")?;
            }
            first = false;
            write!(f, "{byte:02X}")?;
        }
    }
    Ok(())
}
