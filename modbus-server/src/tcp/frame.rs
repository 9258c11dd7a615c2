use crate::common::buffer::ReadBuffer;
use crate::common::cursor::WriteCursor;
use crate::common::pdu::constants::MAX_PDU_LENGTH;
use crate::common::pdu::Pdu;
use crate::common::phys::PhysLayer;
use crate::decode::{format_bytes, FrameDecodeLevel, PhysDecodeLevel};
use crate::error::{FrameParseError, InternalError, TransportError};
use crate::types::UnitId;

pub(crate) mod constants {
    pub(crate) const HEADER_LENGTH: usize = 7;
    pub(crate) const MAX_FRAME_LENGTH: usize = HEADER_LENGTH + super::MAX_PDU_LENGTH;
    // the length field includes the 1 byte unit id
    pub(crate) const MIN_LENGTH_FIELD: usize = 2;
    pub(crate) const MAX_LENGTH_FIELD: usize = super::MAX_PDU_LENGTH + 1;
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct MbapHeader {
    pub(crate) tx_id: u16,
    pub(crate) unit_id: UnitId,
}

impl MbapHeader {
    pub(crate) fn new(tx_id: u16, unit_id: UnitId) -> Self {
        Self { tx_id, unit_id }
    }
}

/// a complete request: the header it arrived with and the PDU it carried
#[derive(Debug)]
pub(crate) struct MbapFrame {
    pub(crate) header: MbapHeader,
    pub(crate) pdu: Pdu,
}

#[derive(Copy, Clone)]
enum ParseState {
    Begin,
    Header(MbapHeader, usize),
}

pub(crate) struct MbapParser {
    state: ParseState,
}

impl MbapParser {
    pub(crate) fn new() -> Self {
        Self {
            state: ParseState::Begin,
        }
    }

    /// `Ok(None)` means more bytes are required
    pub(crate) fn parse(
        &mut self,
        buffer: &mut ReadBuffer,
    ) -> Result<Option<MbapFrame>, TransportError> {
        match self.state {
            ParseState::Header(header, pdu_length) => {
                if buffer.len() < pdu_length {
                    return Ok(None);
                }

                let bytes = buffer.read(pdu_length)?;
                self.state = ParseState::Begin;

                // the length check guarantees at least a function code
                let pdu = Pdu::decode(header.unit_id, bytes)
                    .ok_or(FrameParseError::MbapLengthTooSmall(pdu_length + 1))?;

                Ok(Some(MbapFrame { header, pdu }))
            }
            ParseState::Begin => {
                if buffer.len() < constants::HEADER_LENGTH {
                    return Ok(None);
                }

                let (header, pdu_length) = Self::parse_header(buffer)?;
                self.state = ParseState::Header(header, pdu_length);
                self.parse(buffer)
            }
        }
    }

    fn parse_header(buffer: &mut ReadBuffer) -> Result<(MbapHeader, usize), TransportError> {
        let tx_id = buffer.read_u16_be()?;
        let protocol_id = buffer.read_u16_be()?;
        let length = buffer.read_u16_be()? as usize;
        let unit_id = UnitId::new(buffer.read_u8()?);

        if protocol_id != 0 {
            return Err(FrameParseError::UnknownProtocolId(protocol_id).into());
        }

        if length < constants::MIN_LENGTH_FIELD {
            return Err(FrameParseError::MbapLengthTooSmall(length).into());
        }

        if length > constants::MAX_LENGTH_FIELD {
            return Err(
                FrameParseError::MbapLengthTooBig(length, constants::MAX_LENGTH_FIELD).into(),
            );
        }

        Ok((MbapHeader::new(tx_id, unit_id), length - 1))
    }
}

/// reads whole frames from the physical layer, buffering partial segments
pub(crate) struct FramedReader {
    parser: MbapParser,
    buffer: ReadBuffer,
}

impl FramedReader {
    pub(crate) fn new() -> Self {
        Self {
            parser: MbapParser::new(),
            buffer: ReadBuffer::new(constants::MAX_FRAME_LENGTH),
        }
    }

    pub(crate) async fn next_frame(
        &mut self,
        io: &mut PhysLayer,
        frame_level: FrameDecodeLevel,
        phys_level: PhysDecodeLevel,
    ) -> Result<MbapFrame, TransportError> {
        loop {
            match self.parser.parse(&mut self.buffer)? {
                Some(frame) => {
                    if frame_level.enabled() {
                        tracing::info!(
                            "MBAP RX - {}",
                            MbapDisplay::new(frame_level, frame.header, &frame.pdu)
                        );
                    }
                    return Ok(frame);
                }
                None => {
                    self.buffer.read_some(io, phys_level).await?;
                }
            }
        }
    }
}

/// serializes response frames into a fixed buffer
pub(crate) struct MbapFormatter {
    buffer: [u8; constants::MAX_FRAME_LENGTH],
}

impl MbapFormatter {
    pub(crate) fn new() -> Self {
        Self {
            buffer: [0; constants::MAX_FRAME_LENGTH],
        }
    }

    pub(crate) fn format(
        &mut self,
        header: MbapHeader,
        pdu: &Pdu,
        level: FrameDecodeLevel,
    ) -> Result<&[u8], InternalError> {
        let mut cursor = WriteCursor::new(self.buffer.as_mut());
        cursor.write_u16_be(header.tx_id)?;
        cursor.write_u16_be(0)?;
        cursor.write_u16_be(0)?; // length is written once the PDU is serialized
        cursor.write_u8(header.unit_id.value)?;

        let start = cursor.position();
        pdu.encode(&mut cursor)?;
        let end = cursor.position();
        let pdu_length = end - start;

        if pdu_length > MAX_PDU_LENGTH {
            return Err(InternalError::InsufficientWriteSpace(
                pdu_length,
                MAX_PDU_LENGTH,
            ));
        }

        cursor.seek_to(4)?;
        cursor.write_u16_be((pdu_length + 1) as u16)?;

        if level.enabled() {
            tracing::info!("MBAP TX - {}", MbapDisplay::new(level, header, pdu));
        }

        Ok(&self.buffer[..end])
    }
}

struct MbapDisplay<'a> {
    level: FrameDecodeLevel,
    header: MbapHeader,
    pdu: &'a Pdu,
}

impl<'a> MbapDisplay<'a> {
    fn new(level: FrameDecodeLevel, header: MbapHeader, pdu: &'a Pdu) -> Self {
        MbapDisplay { level, header, pdu }
    }
}

impl<'a> std::fmt::Display for MbapDisplay<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(
            f,
            "tx_id: {:#06X} unit: {} len: {}",
            self.header.tx_id,
            self.header.unit_id,
            self.pdu.len()
        )?;
        if self.level.payload_enabled() {
            let mut bytes = Vec::with_capacity(self.pdu.len());
            bytes.push(self.pdu.function);
            bytes.extend_from_slice(&self.pdu.payload);
            format_bytes(f, &bytes)?;
        }
        Ok(())
    }
}
