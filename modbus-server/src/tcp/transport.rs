use std::time::Duration;

use crate::common::pdu::Pdu;
use crate::common::phys::PhysLayer;
use crate::decode::DecodeLevel;
use crate::error::TransportError;
use crate::tcp::frame::{FramedReader, MbapFormatter, MbapHeader};

/// Modbus/TCP transport for a single connection
///
/// Reading the next request and writing each response are both bounded by the
/// idle timeout. Responses echo the transaction id of the last request read.
pub(crate) struct TcpTransport {
    phys: PhysLayer,
    reader: FramedReader,
    formatter: MbapFormatter,
    tx_id: u16,
    timeout: Duration,
    decode: DecodeLevel,
}

impl TcpTransport {
    pub(crate) fn new(phys: PhysLayer, timeout: Duration, decode: DecodeLevel) -> Self {
        Self {
            phys,
            reader: FramedReader::new(),
            formatter: MbapFormatter::new(),
            tx_id: 0,
            timeout,
            decode,
        }
    }

    pub(crate) async fn read_request(&mut self) -> Result<Pdu, TransportError> {
        let frame = tokio::time::timeout(
            self.timeout,
            self.reader
                .next_frame(&mut self.phys, self.decode.frame, self.decode.physical),
        )
        .await??;

        self.tx_id = frame.header.tx_id;
        Ok(frame.pdu)
    }

    pub(crate) async fn write_response(&mut self, response: &Pdu) -> Result<(), TransportError> {
        let header = MbapHeader::new(self.tx_id, response.unit_id);
        let bytes = self.formatter.format(header, response, self.decode.frame)?;
        tokio::time::timeout(self.timeout, self.phys.write(bytes, self.decode.physical)).await??;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::io::Builder;

    use super::*;
    use crate::types::UnitId;

    fn transport(mock: tokio_test::io::Mock, timeout: Duration) -> TcpTransport {
        TcpTransport::new(PhysLayer::new_mock(mock), timeout, DecodeLevel::nothing())
    }

    #[tokio::test]
    async fn response_echoes_transaction_and_unit_id() {
        let mock = Builder::new()
            .read(&[0xCA, 0xFE, 0x00, 0x00, 0x00, 0x06, 0x11, 0x06, 0x00, 0x01, 0x00, 0x2A])
            .write(&[0xCA, 0xFE, 0x00, 0x00, 0x00, 0x06, 0x11, 0x06, 0x00, 0x01, 0x00, 0x2A])
            .build();
        let mut transport = transport(mock, Duration::from_secs(1));

        let request = transport.read_request().await.unwrap();
        assert_eq!(request.unit_id, UnitId::new(0x11));
        assert_eq!(request.function, 0x06);

        let response = Pdu::new(request.unit_id, request.function, request.payload.clone());
        transport.write_response(&response).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn idle_read_times_out() {
        let mock = Builder::new().wait(Duration::from_secs(10)).build();
        let mut transport = transport(mock, Duration::from_secs(1));

        assert!(matches!(
            transport.read_request().await,
            Err(TransportError::Timeout)
        ));
    }

    #[tokio::test]
    async fn peer_close_is_an_io_error() {
        let mut transport = transport(Builder::new().build(), Duration::from_secs(1));
        match transport.read_request().await {
            Err(TransportError::Io(err)) => {
                assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof)
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
