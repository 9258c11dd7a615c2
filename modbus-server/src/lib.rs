//! An async [Modbus](http://modbus.org/) TCP server built on [Tokio](https://docs.rs/tokio)
//!
//! The library accepts Modbus/TCP connections, validates every request against the
//! structural rules of its function code and hands the decoded request to a
//! user-supplied [`RequestHandler`](server::RequestHandler). The handler's result, or
//! the exception it returns, is encoded back into the response.
//!
//! # Features
//!
//! * Panic-free parsing
//! * Bounded number of concurrent connections, excess connections are closed immediately
//! * Idle timeout per connection
//! * Idempotent start/stop that force-closes every open connection
//! * Protocol decoding to the log via [`tracing`](https://docs.rs/tracing), see [`DecodeLevel`]
//!
//! # Supported Functions
//!
//! * Read Coils
//! * Read Discrete Inputs
//! * Read Holding Registers
//! * Read Input Registers
//! * Write Single Coil
//! * Write Single Register
//! * Write Multiple Coils
//! * Write Multiple Registers
//!
//! Any other function code is answered with [`ExceptionCode::IllegalFunction`].
//!
//! # Error handling
//!
//! * Requests whose content is malformed (bad length, quantity out of range, inconsistent
//!   byte count, bad coil value) close the connection without a reply.
//! * Ranges running past address `0xFFFF` are answered with
//!   [`ExceptionCode::IllegalDataAddress`].
//! * A [`HandlerError`] is answered with its exception code, see [`HandlerError::exception_code`].
//!
//! # Example
//!
//! ```no_run
//! use std::sync::{Arc, Mutex};
//! use std::time::Duration;
//!
//! use modbus_server::server::{get_range_of, get_range_of_mut, RequestHandler, Server};
//! use modbus_server::*;
//!
//! struct Registers {
//!     values: Mutex<[u16; 10]>,
//! }
//!
//! impl RequestHandler for Registers {
//!     fn handle_holding_registers(
//!         &self,
//!         _unit_id: UnitId,
//!         range: AddressRange,
//!         op: Operation<'_, u16>,
//!     ) -> Result<Vec<u16>, HandlerError> {
//!         let mut values = self.values.lock().unwrap();
//!         if let Operation::Write(new) = op {
//!             get_range_of_mut(values.as_mut_slice(), range)?.copy_from_slice(new);
//!         }
//!         Ok(get_range_of(values.as_slice(), range)?.to_vec())
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let handler = Arc::new(Registers {
//!         values: Mutex::new([0; 10]),
//!     });
//!
//!     let server = Server::new(ServerConfig::new("tcp://127.0.0.1:502"), handler)?;
//!     server.start().await?;
//!
//!     tokio::time::sleep(Duration::from_secs(60)).await;
//!     server.stop().await?;
//!     Ok(())
//! }
//! ```
#![cfg_attr(test, allow(unused_crate_dependencies))]
#![doc(test(attr(allow(unused_crate_dependencies, missing_docs))))]

/// server API
pub mod server;

// internal modules
mod common;
mod config;
mod constants;
mod decode;
mod error;
mod exception;
mod tcp;
mod types;

pub use crate::config::*;
pub use crate::decode::*;
pub use crate::error::{ConfigError, HandlerError, ServerError};
pub use crate::exception::*;
pub use crate::types::*;
