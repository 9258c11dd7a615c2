use std::time::Duration;

use crate::constants::{defaults, TCP_SCHEME};
use crate::decode::DecodeLevel;
use crate::error::ConfigError;

/// Settings used to construct a [`Server`](crate::server::Server)
///
/// ```
/// use std::time::Duration;
/// use modbus_server::ServerConfig;
///
/// let config = ServerConfig::new("tcp://[::]:502")
///     .with_timeout(Duration::from_secs(30))
///     .with_max_clients(4);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServerConfig {
    /// where to listen, e.g. `tcp://0.0.0.0:502`
    pub url: String,
    /// idle session timeout, 120 seconds when unset or zero
    pub timeout: Option<Duration>,
    /// maximum number of concurrent client connections, 10 when unset or zero
    pub max_clients: Option<usize>,
    /// protocol decoding written to the log
    pub decode: DecodeLevel,
}

impl ServerConfig {
    /// Configuration with the given URL and every other field at its default
    pub fn new<S: Into<String>>(url: S) -> Self {
        Self {
            url: url.into(),
            timeout: None,
            max_clients: None,
            decode: DecodeLevel::default(),
        }
    }

    /// Set the idle session timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the connection limit
    pub fn with_max_clients(mut self, max_clients: usize) -> Self {
        self.max_clients = Some(max_clients);
        self
    }

    /// Set the protocol decode level
    pub fn with_decode_level(mut self, decode: DecodeLevel) -> Self {
        self.decode = decode;
        self
    }

    pub(crate) fn resolve(&self) -> Result<ListenConfig, ConfigError> {
        let address = match self.url.strip_prefix(TCP_SCHEME) {
            Some(address) => address,
            None => return Err(ConfigError::UnsupportedScheme(self.url.clone())),
        };

        validate_host_port(address)?;

        let timeout = match self.timeout {
            Some(timeout) if !timeout.is_zero() => timeout,
            _ => defaults::IDLE_TIMEOUT,
        };

        let max_clients = match self.max_clients {
            Some(max) if max > 0 => max,
            _ => defaults::MAX_CLIENTS,
        };

        Ok(ListenConfig {
            address: address.to_string(),
            timeout,
            max_clients,
            decode: self.decode,
        })
    }
}

/// configuration with defaults filled in, fixed for the lifetime of a server
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ListenConfig {
    pub(crate) address: String,
    pub(crate) timeout: Duration,
    pub(crate) max_clients: usize,
    pub(crate) decode: DecodeLevel,
}

fn validate_host_port(address: &str) -> Result<(), ConfigError> {
    let invalid = || ConfigError::InvalidAddress(address.to_string());

    let (host, port) = address.rsplit_once(':').ok_or_else(invalid)?;
    port.parse::<u16>().map_err(|_| invalid())?;

    let host = match host.strip_prefix('[') {
        Some(rest) => rest.strip_suffix(']').ok_or_else(invalid)?,
        // an unbracketed IPv6 literal would be ambiguous
        None if host.contains(':') => return Err(invalid()),
        None => host,
    };

    if host.is_empty() {
        return Err(invalid());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fills_in_defaults() {
        let config = ServerConfig::new("tcp://127.0.0.1:502").resolve().unwrap();
        assert_eq!(config.address, "127.0.0.1:502");
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.max_clients, 10);
    }

    #[test]
    fn zero_values_mean_default() {
        let config = ServerConfig::new("tcp://127.0.0.1:502")
            .with_timeout(Duration::ZERO)
            .with_max_clients(0)
            .resolve()
            .unwrap();
        assert_eq!(config.timeout, Duration::from_secs(120));
        assert_eq!(config.max_clients, 10);
    }

    #[test]
    fn keeps_explicit_values() {
        let config = ServerConfig::new("tcp://localhost:1502")
            .with_timeout(Duration::from_millis(250))
            .with_max_clients(2)
            .resolve()
            .unwrap();
        assert_eq!(config.address, "localhost:1502");
        assert_eq!(config.timeout, Duration::from_millis(250));
        assert_eq!(config.max_clients, 2);
    }

    #[test]
    fn accepts_bracketed_ipv6() {
        let config = ServerConfig::new("tcp://[::]:502").resolve().unwrap();
        assert_eq!(config.address, "[::]:502");
    }

    #[test]
    fn rejects_other_schemes() {
        for url in ["rtu:///dev/ttyUSB0", "udp://127.0.0.1:502", "127.0.0.1:502", "TCP://a:1"] {
            assert_eq!(
                ServerConfig::new(url).resolve(),
                Err(ConfigError::UnsupportedScheme(url.to_string()))
            );
        }
    }

    #[test]
    fn rejects_malformed_addresses() {
        for address in [
            "",
            "localhost",
            "localhost:",
            ":502",
            "host:70000",
            "::1:502",
            "[::1:502",
        ] {
            let url = format!("tcp://{address}");
            assert_eq!(
                ServerConfig::new(url).resolve(),
                Err(ConfigError::InvalidAddress(address.to_string()))
            );
        }
    }
}
