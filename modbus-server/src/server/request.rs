use crate::common::bits::{
    byte_count_for_bits, byte_count_for_registers, num_bytes_for_bits, pack_bits, unpack_bits,
};
use crate::common::cursor::ReadCursor;
use crate::common::function::FunctionCode;
use crate::common::pdu::Pdu;
use crate::constants::{coil, limits};
use crate::decode::AppDecodeLevel;
use crate::error::{InternalError, ProtocolError, RequestError};
use crate::exception::ExceptionCode;
use crate::server::handler::RequestHandler;
use crate::types::{AddressRange, Operation, UnitId};

/// a validated request, ready to be handed to the handler
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Request {
    ReadCoils(AddressRange),
    ReadDiscreteInputs(AddressRange),
    ReadHoldingRegisters(AddressRange),
    ReadInputRegisters(AddressRange),
    WriteSingleCoil(u16, bool),
    WriteSingleRegister(u16, u16),
    WriteMultipleCoils(AddressRange, Vec<bool>),
    WriteMultipleRegisters(AddressRange, Vec<u16>),
}

/// Validate `request`, invoke the handler and build the response
///
/// * `Err(Protocol)` - the request is malformed and the link must be closed
/// * `Err(Exception | Internal)` - reply with an exception response
/// * `Ok(Some(..))` - the normal response
pub(crate) fn dispatch(
    handler: &dyn RequestHandler,
    request: &Pdu,
    level: AppDecodeLevel,
) -> Result<Option<Pdu>, RequestError> {
    let function = match FunctionCode::get(request.function) {
        Some(x) => x,
        None => {
            tracing::warn!("received unsupported function code: {:#04X}", request.function);
            return Err(ExceptionCode::IllegalFunction.into());
        }
    };

    let parsed = Request::parse(function, &request.payload)?;

    if level.enabled() {
        tracing::info!("PDU RX - {}", RequestDisplay::new(level, function, &parsed));
    }

    let payload = parsed.execute(handler, request.unit_id)?;

    Ok(Some(Pdu::new(
        request.unit_id,
        function.get_value(),
        payload,
    )))
}

impl Request {
    pub(crate) fn parse(function: FunctionCode, payload: &[u8]) -> Result<Self, RequestError> {
        let mut cursor = ReadCursor::new(payload);
        match function {
            FunctionCode::ReadCoils => {
                expect_length(payload, 4)?;
                let range = read_range(&mut cursor, limits::MAX_READ_COILS_COUNT)?;
                Ok(Request::ReadCoils(range))
            }
            FunctionCode::ReadDiscreteInputs => {
                expect_length(payload, 4)?;
                let range = read_range(&mut cursor, limits::MAX_READ_COILS_COUNT)?;
                Ok(Request::ReadDiscreteInputs(range))
            }
            FunctionCode::ReadHoldingRegisters => {
                expect_length(payload, 4)?;
                let range = read_range(&mut cursor, limits::MAX_READ_REGISTERS_COUNT)?;
                Ok(Request::ReadHoldingRegisters(range))
            }
            FunctionCode::ReadInputRegisters => {
                expect_length(payload, 4)?;
                let range = read_range(&mut cursor, limits::MAX_READ_REGISTERS_COUNT)?;
                Ok(Request::ReadInputRegisters(range))
            }
            FunctionCode::WriteSingleCoil => {
                expect_length(payload, 4)?;
                let address = cursor.read_u16_be()?;
                let high = cursor.read_u8()?;
                let low = cursor.read_u8()?;
                let value = match (high, low) {
                    (coil::ON, 0x00) => true,
                    (coil::OFF, 0x00) => false,
                    _ => return Err(ProtocolError::BadCoilValue(high, low).into()),
                };
                Ok(Request::WriteSingleCoil(address, value))
            }
            FunctionCode::WriteSingleRegister => {
                expect_length(payload, 4)?;
                let address = cursor.read_u16_be()?;
                let value = cursor.read_u16_be()?;
                Ok(Request::WriteSingleRegister(address, value))
            }
            FunctionCode::WriteMultipleCoils => {
                expect_min_length(payload, 6)?;
                let range = read_range(&mut cursor, limits::MAX_WRITE_COILS_COUNT)?;
                let bytes = read_counted_bytes(&mut cursor, num_bytes_for_bits(range.count))?;
                Ok(Request::WriteMultipleCoils(
                    range,
                    unpack_bits(range.count, bytes),
                ))
            }
            FunctionCode::WriteMultipleRegisters => {
                expect_min_length(payload, 6)?;
                let range = read_range(&mut cursor, limits::MAX_WRITE_REGISTERS_COUNT)?;
                let bytes = read_counted_bytes(&mut cursor, 2 * range.count as usize)?;
                let values = bytes
                    .chunks_exact(2)
                    .map(|x| u16::from_be_bytes([x[0], x[1]]))
                    .collect();
                Ok(Request::WriteMultipleRegisters(range, values))
            }
        }
    }

    /// invoke the handler and serialize the payload of the normal response
    pub(crate) fn execute(
        &self,
        handler: &dyn RequestHandler,
        unit_id: UnitId,
    ) -> Result<Vec<u8>, RequestError> {
        match self {
            Request::ReadCoils(range) => {
                let values = handler.handle_coils(unit_id, *range, Operation::Read)?;
                bits_response(*range, &values)
            }
            Request::ReadDiscreteInputs(range) => {
                let values = handler.handle_discrete_inputs(unit_id, *range)?;
                bits_response(*range, &values)
            }
            Request::ReadHoldingRegisters(range) => {
                let values = handler.handle_holding_registers(unit_id, *range, Operation::Read)?;
                registers_response(*range, &values)
            }
            Request::ReadInputRegisters(range) => {
                let values = handler.handle_input_registers(unit_id, *range)?;
                registers_response(*range, &values)
            }
            Request::WriteSingleCoil(address, value) => {
                handler.handle_coils(
                    unit_id,
                    AddressRange::single(*address),
                    Operation::Write(&[*value]),
                )?;
                let high = if *value { coil::ON } else { coil::OFF };
                Ok(echo(*address, u16::from_be_bytes([high, 0x00])))
            }
            Request::WriteSingleRegister(address, value) => {
                handler.handle_holding_registers(
                    unit_id,
                    AddressRange::single(*address),
                    Operation::Write(&[*value]),
                )?;
                Ok(echo(*address, *value))
            }
            Request::WriteMultipleCoils(range, values) => {
                handler.handle_coils(unit_id, *range, Operation::Write(values))?;
                Ok(echo(range.start, range.count))
            }
            Request::WriteMultipleRegisters(range, values) => {
                handler.handle_holding_registers(unit_id, *range, Operation::Write(values))?;
                Ok(echo(range.start, range.count))
            }
        }
    }
}

fn expect_length(payload: &[u8], length: usize) -> Result<(), ProtocolError> {
    if payload.len() != length {
        return Err(ProtocolError::WrongLength(length, payload.len()));
    }
    Ok(())
}

fn expect_min_length(payload: &[u8], min: usize) -> Result<(), ProtocolError> {
    if payload.len() < min {
        return Err(ProtocolError::TooShort(min, payload.len()));
    }
    Ok(())
}

// quantity outside of [1, max] is malformed, a range running past 0xFFFF is only an exception
fn read_range(cursor: &mut ReadCursor, max: u16) -> Result<AddressRange, RequestError> {
    let start = cursor.read_u16_be()?;
    let count = cursor.read_u16_be()?;

    if count == 0 || count > max {
        return Err(ProtocolError::QuantityOutOfRange(count, max).into());
    }

    AddressRange::try_from(start, count)
        .ok_or(RequestError::Exception(ExceptionCode::IllegalDataAddress))
}

// the byte count must equal what the quantity implies and cover exactly the rest of the payload
fn read_counted_bytes<'a>(
    cursor: &mut ReadCursor<'a>,
    expected: usize,
) -> Result<&'a [u8], ProtocolError> {
    let count = cursor.read_u8()?;
    if count as usize != expected {
        return Err(ProtocolError::ByteCountMismatch(expected, count));
    }
    if cursor.remaining() != expected {
        return Err(ProtocolError::InsufficientBytesForByteCount(
            expected,
            cursor.remaining(),
        ));
    }
    cursor.read_bytes(expected)
}

fn check_count(range: AddressRange, actual: usize) -> Result<(), InternalError> {
    let expected = range.count as usize;
    if actual != expected {
        return Err(InternalError::HandlerResultCount(expected, actual));
    }
    Ok(())
}

fn bits_response(range: AddressRange, values: &[bool]) -> Result<Vec<u8>, RequestError> {
    check_count(range, values.len())?;
    let count = byte_count_for_bits(values.len())?;
    let mut payload = Vec::with_capacity(1 + count as usize);
    payload.push(count);
    payload.extend(pack_bits(values));
    Ok(payload)
}

fn registers_response(range: AddressRange, values: &[u16]) -> Result<Vec<u8>, RequestError> {
    check_count(range, values.len())?;
    let count = byte_count_for_registers(values.len())?;
    let mut payload = Vec::with_capacity(1 + count as usize);
    payload.push(count);
    for value in values {
        payload.extend_from_slice(&value.to_be_bytes());
    }
    Ok(payload)
}

fn echo(first: u16, second: u16) -> Vec<u8> {
    let mut payload = Vec::with_capacity(4);
    payload.extend_from_slice(&first.to_be_bytes());
    payload.extend_from_slice(&second.to_be_bytes());
    payload
}

pub(crate) struct RequestDisplay<'a> {
    level: AppDecodeLevel,
    function: FunctionCode,
    request: &'a Request,
}

impl<'a> RequestDisplay<'a> {
    pub(crate) fn new(level: AppDecodeLevel, function: FunctionCode, request: &'a Request) -> Self {
        Self {
            level,
            function,
            request,
        }
    }
}

impl std::fmt::Display for RequestDisplay<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.function)?;

        if !self.level.data_headers() {
            return Ok(());
        }

        match self.request {
            Request::ReadCoils(range)
            | Request::ReadDiscreteInputs(range)
            | Request::ReadHoldingRegisters(range)
            | Request::ReadInputRegisters(range) => write!(f, " {range}"),
            Request::WriteSingleCoil(address, value) => {
                write!(f, " idx: {address:#06X} value: {value}")
            }
            Request::WriteSingleRegister(address, value) => {
                write!(f, " idx: {address:#06X} value: {value:#06X}")
            }
            Request::WriteMultipleCoils(range, values) => {
                write!(f, " {range}")?;
                if self.level.data_values() {
                    for (i, value) in values.iter().enumerate() {
                        write!(f, "\nidx: {:#06X} value: {}", range.start as usize + i, value)?;
                    }
                }
                Ok(())
            }
            Request::WriteMultipleRegisters(range, values) => {
                write!(f, " {range}")?;
                if self.level.data_values() {
                    for (i, value) in values.iter().enumerate() {
                        let index = range.start as usize + i;
                        write!(f, "\nidx: {index:#06X} value: {value:#06X}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::error::HandlerError;

    const UNIT: UnitId = UnitId::new(0x01);

    /// records every call and serves a fixed table
    #[derive(Default)]
    struct MockHandler {
        coils: Vec<bool>,
        registers: Vec<u16>,
        short_by: usize,
        calls: Mutex<Vec<String>>,
    }

    impl MockHandler {
        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl RequestHandler for MockHandler {
        fn handle_coils(
            &self,
            _unit_id: UnitId,
            range: AddressRange,
            op: Operation<'_, bool>,
        ) -> Result<Vec<bool>, HandlerError> {
            self.record(format!("coils {range} {op:?}"));
            let values = crate::server::handler::get_range_of(&self.coils, range)?;
            Ok(values[..values.len() - self.short_by].to_vec())
        }

        fn handle_discrete_inputs(
            &self,
            _unit_id: UnitId,
            range: AddressRange,
        ) -> Result<Vec<bool>, HandlerError> {
            Ok(vec![true; range.count as usize])
        }

        fn handle_holding_registers(
            &self,
            _unit_id: UnitId,
            range: AddressRange,
            op: Operation<'_, u16>,
        ) -> Result<Vec<u16>, HandlerError> {
            self.record(format!("holding {range} {op:?}"));
            let values = crate::server::handler::get_range_of(&self.registers, range)?;
            Ok(values[..values.len() - self.short_by].to_vec())
        }
    }

    fn table() -> MockHandler {
        MockHandler {
            coils: vec![true, false, true, true, false, false, true, true, true, false],
            registers: vec![1, 2, 3, 0xCAFE],
            ..Default::default()
        }
    }

    fn run(
        handler: &MockHandler,
        function: u8,
        payload: &[u8],
    ) -> Result<Option<Pdu>, RequestError> {
        dispatch(
            handler,
            &Pdu::new(UNIT, function, payload.to_vec()),
            AppDecodeLevel::DataValues,
        )
    }

    fn response(handler: &MockHandler, function: u8, payload: &[u8]) -> Vec<u8> {
        let pdu = run(handler, function, payload).unwrap().unwrap();
        assert_eq!(pdu.function, function);
        assert_eq!(pdu.unit_id, UNIT);
        pdu.payload
    }

    fn error(function: u8, payload: &[u8]) -> RequestError {
        run(&table(), function, payload).unwrap_err()
    }

    #[test]
    fn reads_coils_packed_lsb_first() {
        assert_eq!(
            response(&table(), 0x01, &[0x00, 0x00, 0x00, 0x0A]),
            vec![0x02, 0xCD, 0x01]
        );
        assert_eq!(response(&table(), 0x01, &[0x00, 0x02, 0x00, 0x01]), vec![0x01, 0x01]);
    }

    #[test]
    fn reads_discrete_inputs() {
        assert_eq!(
            response(&table(), 0x02, &[0x00, 0x00, 0x00, 0x09]),
            vec![0x02, 0xFF, 0x01]
        );
    }

    #[test]
    fn reads_holding_registers_big_endian() {
        assert_eq!(
            response(&table(), 0x03, &[0x00, 0x00, 0x00, 0x03]),
            vec![0x06, 0x00, 0x01, 0x00, 0x02, 0x00, 0x03]
        );
    }

    #[test]
    fn default_input_registers_handler_is_illegal_function() {
        assert_eq!(
            error(0x04, &[0x00, 0x00, 0x00, 0x01]),
            RequestError::Exception(ExceptionCode::IllegalFunction)
        );
    }

    #[test]
    fn read_quantity_limits_are_protocol_errors() {
        assert_eq!(
            error(0x01, &[0x00, 0x00, 0x00, 0x00]),
            RequestError::Protocol(ProtocolError::QuantityOutOfRange(0, 2000))
        );
        assert_eq!(
            error(0x02, &[0x00, 0x00, 0x07, 0xD1]),
            RequestError::Protocol(ProtocolError::QuantityOutOfRange(2001, 2000))
        );
        assert_eq!(
            error(0x03, &[0x00, 0x00, 0x00, 0x7E]),
            RequestError::Protocol(ProtocolError::QuantityOutOfRange(0x7E, 0x7D))
        );
    }

    #[test]
    fn maximum_read_quantities_are_accepted() {
        let handler = MockHandler {
            coils: vec![false; 2000],
            registers: vec![0; 125],
            ..Default::default()
        };
        assert_eq!(response(&handler, 0x01, &[0x00, 0x00, 0x07, 0xD0])[0], 250);
        assert_eq!(response(&handler, 0x03, &[0x00, 0x00, 0x00, 0x7D])[0], 250);
    }

    #[test]
    fn read_length_must_be_exact() {
        assert_eq!(
            error(0x03, &[0x00, 0x00, 0x00, 0x01, 0x00]),
            RequestError::Protocol(ProtocolError::WrongLength(4, 5))
        );
        assert_eq!(
            error(0x01, &[0x00, 0x00, 0x00]),
            RequestError::Protocol(ProtocolError::WrongLength(4, 3))
        );
    }

    #[test]
    fn range_past_last_address_is_illegal_data_address() {
        let expected = RequestError::Exception(ExceptionCode::IllegalDataAddress);
        assert_eq!(error(0x01, &[0xFF, 0xFF, 0x00, 0x02]), expected);
        assert_eq!(error(0x04, &[0xFF, 0xF0, 0x00, 0x11]), expected);
        assert_eq!(error(0x0F, &[0xFF, 0xFF, 0x00, 0x02, 0x01, 0x03]), expected);
        assert_eq!(
            error(0x10, &[0xFF, 0xFF, 0x00, 0x02, 0x04, 0x00, 0x01, 0x00, 0x02]),
            expected
        );
    }

    #[test]
    fn handler_result_count_mismatch_is_internal() {
        let handler = MockHandler {
            short_by: 1,
            ..table()
        };
        assert_eq!(
            run(&handler, 0x01, &[0x00, 0x00, 0x00, 0x04]),
            Err(RequestError::Internal(InternalError::HandlerResultCount(4, 3)))
        );
        assert_eq!(
            run(&handler, 0x03, &[0x00, 0x00, 0x00, 0x02]),
            Err(RequestError::Internal(InternalError::HandlerResultCount(2, 1)))
        );
    }

    struct ShortInputs;

    impl RequestHandler for ShortInputs {
        fn handle_discrete_inputs(
            &self,
            _unit_id: UnitId,
            range: AddressRange,
        ) -> Result<Vec<bool>, HandlerError> {
            Ok(vec![true; range.count as usize + 1])
        }

        fn handle_input_registers(
            &self,
            _unit_id: UnitId,
            range: AddressRange,
        ) -> Result<Vec<u16>, HandlerError> {
            Ok(vec![0; range.count as usize - 1])
        }
    }

    #[test]
    fn input_result_count_mismatch_is_internal() {
        assert_eq!(
            dispatch(
                &ShortInputs,
                &Pdu::new(UNIT, 0x02, vec![0x00, 0x00, 0x00, 0x08]),
                AppDecodeLevel::Nothing,
            ),
            Err(RequestError::Internal(InternalError::HandlerResultCount(8, 9)))
        );
        assert_eq!(
            dispatch(
                &ShortInputs,
                &Pdu::new(UNIT, 0x04, vec![0x00, 0x10, 0x00, 0x03]),
                AppDecodeLevel::Nothing,
            ),
            Err(RequestError::Internal(InternalError::HandlerResultCount(3, 2)))
        );
    }

    #[test]
    fn writes_single_coil_and_echoes_request() {
        let handler = table();
        assert_eq!(
            response(&handler, 0x05, &[0x00, 0x07, 0xFF, 0x00]),
            vec![0x00, 0x07, 0xFF, 0x00]
        );
        assert_eq!(
            response(&handler, 0x05, &[0x00, 0x08, 0x00, 0x00]),
            vec![0x00, 0x08, 0x00, 0x00]
        );
        assert_eq!(
            handler.calls(),
            vec![
                "coils start: 0x0007 qty: 1 Write([true])",
                "coils start: 0x0008 qty: 1 Write([false])",
            ]
        );
    }

    #[test]
    fn single_coil_value_must_be_on_or_off() {
        assert_eq!(
            error(0x05, &[0x00, 0x07, 0x01, 0x00]),
            RequestError::Protocol(ProtocolError::BadCoilValue(0x01, 0x00))
        );
        assert_eq!(
            error(0x05, &[0x00, 0x07, 0xFF, 0x01]),
            RequestError::Protocol(ProtocolError::BadCoilValue(0xFF, 0x01))
        );
    }

    #[test]
    fn single_write_to_address_outside_table_is_handler_exception() {
        assert_eq!(
            error(0x05, &[0xFF, 0xFF, 0xFF, 0x00]),
            RequestError::Exception(ExceptionCode::IllegalDataAddress)
        );
    }

    #[test]
    fn writes_single_register_and_echoes_request() {
        let handler = table();
        assert_eq!(
            response(&handler, 0x06, &[0x00, 0x01, 0xCA, 0xFE]),
            vec![0x00, 0x01, 0xCA, 0xFE]
        );
        assert_eq!(
            handler.calls(),
            vec!["holding start: 0x0001 qty: 1 Write([51966])"]
        );
    }

    #[test]
    fn writes_multiple_coils() {
        let handler = table();
        assert_eq!(
            response(&handler, 0x0F, &[0x00, 0x01, 0x00, 0x09, 0x02, 0x05, 0x01]),
            vec![0x00, 0x01, 0x00, 0x09]
        );
        assert_eq!(
            handler.calls(),
            vec![
                "coils start: 0x0001 qty: 9 Write([true, false, true, false, false, false, false, false, true])"
            ]
        );
    }

    #[test]
    fn write_multiple_coils_validation() {
        assert_eq!(
            error(0x0F, &[0x00, 0x01, 0x00, 0x09, 0x02]),
            RequestError::Protocol(ProtocolError::TooShort(6, 5))
        );
        assert_eq!(
            error(0x0F, &[0x00, 0x01, 0x07, 0xB1, 0x01, 0x00]),
            RequestError::Protocol(ProtocolError::QuantityOutOfRange(0x7B1, 0x7B0))
        );
        assert_eq!(
            error(0x0F, &[0x00, 0x01, 0x00, 0x09, 0x01, 0x00]),
            RequestError::Protocol(ProtocolError::ByteCountMismatch(2, 1))
        );
        assert_eq!(
            error(0x0F, &[0x00, 0x01, 0x00, 0x09, 0x02, 0x00]),
            RequestError::Protocol(ProtocolError::InsufficientBytesForByteCount(2, 1))
        );
        assert_eq!(
            error(0x0F, &[0x00, 0x01, 0x00, 0x01, 0x01, 0x00, 0x00]),
            RequestError::Protocol(ProtocolError::InsufficientBytesForByteCount(1, 2))
        );
    }

    #[test]
    fn writes_multiple_registers() {
        let handler = table();
        assert_eq!(
            response(
                &handler,
                0x10,
                &[0x00, 0x02, 0x00, 0x02, 0x04, 0x00, 0x07, 0xFF, 0xFF]
            ),
            vec![0x00, 0x02, 0x00, 0x02]
        );
        assert_eq!(
            handler.calls(),
            vec!["holding start: 0x0002 qty: 2 Write([7, 65535])"]
        );
    }

    #[test]
    fn maximum_write_quantities_are_accepted() {
        let handler = MockHandler {
            coils: vec![false; 0x7B0],
            registers: vec![0; 0x7B],
            ..Default::default()
        };

        let mut coils = vec![0x00, 0x00, 0x07, 0xB0, 0xF6];
        coils.extend_from_slice(&[0xFF; 246]);
        assert_eq!(response(&handler, 0x0F, &coils), vec![0x00, 0x00, 0x07, 0xB0]);

        let mut registers = vec![0x00, 0x00, 0x00, 0x7B, 0xF6];
        registers.extend_from_slice(&[0x00; 246]);
        assert_eq!(
            response(&handler, 0x10, &registers),
            vec![0x00, 0x00, 0x00, 0x7B]
        );
    }

    #[test]
    fn write_multiple_registers_validation() {
        assert_eq!(
            error(0x10, &[0x00, 0x00, 0x00, 0x7C, 0x00, 0x00]),
            RequestError::Protocol(ProtocolError::QuantityOutOfRange(0x7C, 0x7B))
        );
        assert_eq!(
            error(0x10, &[0x00, 0x00, 0x00, 0x02, 0x03, 0x00, 0x01, 0x00]),
            RequestError::Protocol(ProtocolError::ByteCountMismatch(4, 3))
        );
        assert_eq!(
            error(0x10, &[0x00, 0x00, 0x00, 0x02, 0x04, 0x00, 0x01, 0x00]),
            RequestError::Protocol(ProtocolError::InsufficientBytesForByteCount(4, 3))
        );
    }

    #[test]
    fn unknown_function_is_illegal_function() {
        for function in [0x00, 0x07, 0x08, 0x11, 0x17, 0x2B] {
            assert_eq!(
                error(function, &[0x00, 0x00, 0x00, 0x01]),
                RequestError::Exception(ExceptionCode::IllegalFunction)
            );
        }
    }

    #[test]
    fn validation_failures_never_reach_the_handler() {
        let handler = table();
        let _ = run(&handler, 0x01, &[0x00, 0x00, 0x00, 0x00]);
        let _ = run(&handler, 0x05, &[0x00, 0x00, 0x12, 0x00]);
        let _ = run(&handler, 0x10, &[0x00, 0x00, 0x00, 0x01, 0x03, 0x00, 0x01, 0x00]);
        assert!(handler.calls().is_empty());
    }

    #[test]
    fn formats_request_at_each_level() {
        let range = AddressRange::try_from(1, 2).unwrap();
        let request = Request::WriteMultipleRegisters(range, vec![7, 8]);
        let function = FunctionCode::WriteMultipleRegisters;

        assert_eq!(
            RequestDisplay::new(AppDecodeLevel::FunctionCode, function, &request).to_string(),
            "WRITE MULTIPLE REGISTERS (0x10)"
        );
        assert_eq!(
            RequestDisplay::new(AppDecodeLevel::DataHeaders, function, &request).to_string(),
            "WRITE MULTIPLE REGISTERS (0x10) start: 0x0001 qty: 2"
        );
        assert_eq!(
            RequestDisplay::new(AppDecodeLevel::DataValues, function, &request).to_string(),
            "WRITE MULTIPLE REGISTERS (0x10) start: 0x0001 qty: 2\nidx: 0x0001 value: 0x0007\nidx: 0x0002 value: 0x0008"
        );
    }
}
