//! Command-line Modbus/TCP server backed by in-memory tables
//!
//! Serves coils, discrete inputs, holding registers and input registers from memory.
//! Commands read from stdin modify the tables or exercise the server lifecycle:
//!
//! * `uc` - toggle every coil
//! * `udi` - toggle every discrete input
//! * `uhr` - increment every holding register
//! * `uir` - increment every input register
//! * `stop` / `start` - stop or restart the server
//! * `x` - stop the server and exit

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tokio_stream::StreamExt;
use tokio_util::codec::{FramedRead, LinesCodec, LinesCodecError};

use modbus_server::server::*;
use modbus_server::*;

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("bad configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("server error: {0}")]
    Server(#[from] ServerError),
    #[error("unable to read stdin: {0}")]
    Stdin(#[from] LinesCodecError),
    #[error("data tables are unavailable after a panic")]
    Poisoned,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Decode {
    Nothing,
    Function,
    Headers,
    Values,
}

impl From<Decode> for AppDecodeLevel {
    fn from(x: Decode) -> Self {
        match x {
            Decode::Nothing => AppDecodeLevel::Nothing,
            Decode::Function => AppDecodeLevel::FunctionCode,
            Decode::Headers => AppDecodeLevel::DataHeaders,
            Decode::Values => AppDecodeLevel::DataValues,
        }
    }
}

#[derive(Parser)]
#[command(name = "modbus-server-cli")]
#[command(about = "A command line Modbus/TCP server backed by in-memory tables")]
#[command(version)]
struct Cli {
    #[arg(long, default_value = "tcp://127.0.0.1:502", help = "Listen URL")]
    url: String,

    #[arg(short = 't', long, help = "Idle session timeout in seconds")]
    timeout: Option<u64>,

    #[arg(short = 'm', long, help = "Maximum number of concurrent connections")]
    max_clients: Option<usize>,

    #[arg(
        short = 's',
        long,
        default_value_t = 100,
        help = "Number of points in each table"
    )]
    size: u16,

    #[arg(
        short = 'd',
        long,
        value_enum,
        default_value_t = Decode::Nothing,
        help = "Protocol decoding written to the log"
    )]
    decode: Decode,
}

impl Cli {
    fn config(&self) -> ServerConfig {
        let mut config = ServerConfig::new(self.url.as_str())
            .with_decode_level(AppDecodeLevel::from(self.decode).into());
        if let Some(timeout) = self.timeout {
            config = config.with_timeout(Duration::from_secs(timeout));
        }
        if let Some(max) = self.max_clients {
            config = config.with_max_clients(max);
        }
        config
    }
}

struct Tables {
    coils: Vec<bool>,
    discrete_inputs: Vec<bool>,
    holding_registers: Vec<u16>,
    input_registers: Vec<u16>,
}

struct MemoryHandler {
    tables: Mutex<Tables>,
}

impl MemoryHandler {
    fn new(size: u16) -> Self {
        let size = size as usize;
        Self {
            tables: Mutex::new(Tables {
                coils: vec![false; size],
                discrete_inputs: vec![false; size],
                holding_registers: vec![0; size],
                input_registers: vec![0; size],
            }),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>, CliError> {
        self.tables.lock().map_err(|_| CliError::Poisoned)
    }

    fn lock_for_request(&self) -> Result<MutexGuard<'_, Tables>, HandlerError> {
        self.tables
            .lock()
            .map_err(|_| HandlerError::other("data tables are unavailable after a panic"))
    }
}

impl RequestHandler for MemoryHandler {
    fn handle_coils(
        &self,
        _unit_id: UnitId,
        range: AddressRange,
        op: Operation<'_, bool>,
    ) -> Result<Vec<bool>, HandlerError> {
        let mut tables = self.lock_for_request()?;
        if let Operation::Write(values) = op {
            get_range_of_mut(&mut tables.coils, range)?.copy_from_slice(values);
        }
        Ok(get_range_of(&tables.coils, range)?.to_vec())
    }

    fn handle_discrete_inputs(
        &self,
        _unit_id: UnitId,
        range: AddressRange,
    ) -> Result<Vec<bool>, HandlerError> {
        let tables = self.lock_for_request()?;
        Ok(get_range_of(&tables.discrete_inputs, range)?.to_vec())
    }

    fn handle_holding_registers(
        &self,
        _unit_id: UnitId,
        range: AddressRange,
        op: Operation<'_, u16>,
    ) -> Result<Vec<u16>, HandlerError> {
        let mut tables = self.lock_for_request()?;
        if let Operation::Write(values) = op {
            get_range_of_mut(&mut tables.holding_registers, range)?.copy_from_slice(values);
        }
        Ok(get_range_of(&tables.holding_registers, range)?.to_vec())
    }

    fn handle_input_registers(
        &self,
        _unit_id: UnitId,
        range: AddressRange,
    ) -> Result<Vec<u16>, HandlerError> {
        let tables = self.lock_for_request()?;
        Ok(get_range_of(&tables.input_registers, range)?.to_vec())
    }
}

#[tokio::main(flavor = "multi_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(false)
        .init();

    if let Err(ref e) = run().await {
        println!("error: {e}");
    }
}

async fn run() -> Result<(), CliError> {
    let cli = Cli::parse();

    let handler = Arc::new(MemoryHandler::new(cli.size));
    let server = Server::new(cli.config(), handler.clone())?;
    server.start().await?;

    let mut reader = FramedRead::new(tokio::io::stdin(), LinesCodec::new());
    loop {
        let line = match reader.next().await {
            Some(line) => line?,
            // stdin closed
            None => break,
        };

        match line.trim() {
            "x" => break,
            "uc" => {
                for coil in handler.lock()?.coils.iter_mut() {
                    *coil = !*coil;
                }
            }
            "udi" => {
                for discrete_input in handler.lock()?.discrete_inputs.iter_mut() {
                    *discrete_input = !*discrete_input;
                }
            }
            "uhr" => {
                for holding_register in handler.lock()?.holding_registers.iter_mut() {
                    *holding_register = holding_register.wrapping_add(1);
                }
            }
            "uir" => {
                for input_register in handler.lock()?.input_registers.iter_mut() {
                    *input_register = input_register.wrapping_add(1);
                }
            }
            "stop" => server.stop().await?,
            "start" => server.start().await?,
            "" => {}
            _ => println!("unknown command"),
        }
    }

    server.stop().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn range(start: u16, count: u16) -> AddressRange {
        AddressRange::try_from(start, count).unwrap()
    }

    #[test]
    fn writes_are_visible_to_reads() {
        let handler = MemoryHandler::new(10);
        let unit = UnitId::new(1);

        handler
            .handle_holding_registers(unit, range(2, 2), Operation::Write(&[7, 8]))
            .unwrap();
        assert_eq!(
            handler
                .handle_holding_registers(unit, range(1, 4), Operation::Read)
                .unwrap(),
            vec![0, 7, 8, 0]
        );

        handler
            .handle_coils(unit, range(9, 1), Operation::Write(&[true]))
            .unwrap();
        assert_eq!(
            handler.handle_coils(unit, range(8, 2), Operation::Read).unwrap(),
            vec![false, true]
        );
    }

    #[test]
    fn ranges_outside_tables_are_illegal_data_address() {
        let handler = MemoryHandler::new(10);
        let unit = UnitId::new(1);

        for err in [
            handler.handle_coils(unit, range(10, 1), Operation::Read).unwrap_err(),
            handler.handle_discrete_inputs(unit, range(9, 2)).unwrap_err(),
            handler
                .handle_holding_registers(unit, range(0, 11), Operation::Write(&[0; 11]))
                .unwrap_err(),
            handler.handle_input_registers(unit, range(0xFFFF, 1)).unwrap_err(),
        ] {
            assert_eq!(err.exception_code(), ExceptionCode::IllegalDataAddress);
        }
    }

    #[test]
    fn decode_argument_maps_to_app_level() {
        let cli = Cli::parse_from(["modbus-server-cli", "--decode", "headers", "-m", "3"]);
        let config = cli.config();
        assert_eq!(config.decode.app, AppDecodeLevel::DataHeaders);
        assert_eq!(config.max_clients, Some(3));
        assert_eq!(config.timeout, None);
        assert_eq!(config.url, "tcp://127.0.0.1:502");
    }
}
