pub(crate) mod coil {
    /// first value byte of a write single coil request that turns the coil ON (0xFF00)
    pub(crate) const ON: u8 = 0xFF;
    /// first value byte of a write single coil request that turns the coil OFF (0x0000)
    pub(crate) const OFF: u8 = 0x00;
}

pub(crate) mod limits {
    /// Maximum count allowed in a read coils/discrete inputs request
    pub(crate) const MAX_READ_COILS_COUNT: u16 = 0x07D0;
    /// Maximum count allowed in a read holding/input registers request
    pub(crate) const MAX_READ_REGISTERS_COUNT: u16 = 0x007D;
    /// Maximum count allowed in a `write multiple coils` request
    pub(crate) const MAX_WRITE_COILS_COUNT: u16 = 0x07B0;
    /// Maximum count allowed in a `write multiple registers` request
    pub(crate) const MAX_WRITE_REGISTERS_COUNT: u16 = 0x007B;
    /// Highest addressable point
    pub(crate) const MAX_ADDRESS: u32 = 0xFFFF;
}

pub(crate) mod exceptions {
    pub(crate) const ILLEGAL_FUNCTION: u8 = 0x01;
    pub(crate) const ILLEGAL_DATA_ADDRESS: u8 = 0x02;
    pub(crate) const ILLEGAL_DATA_VALUE: u8 = 0x03;
    pub(crate) const SERVER_DEVICE_FAILURE: u8 = 0x04;
    pub(crate) const ACKNOWLEDGE: u8 = 0x05;
    pub(crate) const SERVER_DEVICE_BUSY: u8 = 0x06;
    pub(crate) const MEMORY_PARITY_ERROR: u8 = 0x08;
    pub(crate) const GATEWAY_PATH_UNAVAILABLE: u8 = 0x0A;
    pub(crate) const GATEWAY_TARGET_DEVICE_FAILED_TO_RESPOND: u8 = 0x0B;
}

pub(crate) mod defaults {
    use std::time::Duration;

    /// idle session timeout used when none is configured
    pub(crate) const IDLE_TIMEOUT: Duration = Duration::from_secs(120);
    /// connection limit used when none is configured
    pub(crate) const MAX_CLIENTS: usize = 10;
}

/// the only URL scheme currently supported by the server
pub(crate) const TCP_SCHEME: &str = "tcp://";

/// bit set in the function code of an exception response
pub(crate) const ERROR_BIT: u8 = 0x80;
