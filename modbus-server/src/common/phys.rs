use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::decode::{format_bytes, PhysDecodeLevel};

trait Stream: AsyncRead + AsyncWrite + Unpin + Send {}

impl<T> Stream for T where T: AsyncRead + AsyncWrite + Unpin + Send {}

/// byte stream underneath a session, logs every read and write according to the decode level
pub(crate) enum PhysLayer {
    Tcp(tokio::net::TcpStream),
    #[cfg(test)]
    Mock(tokio_test::io::Mock),
}

impl PhysLayer {
    pub(crate) fn new_tcp(socket: tokio::net::TcpStream) -> Self {
        PhysLayer::Tcp(socket)
    }

    #[cfg(test)]
    pub(crate) fn new_mock(mock: tokio_test::io::Mock) -> Self {
        PhysLayer::Mock(mock)
    }

    fn stream(&mut self) -> &mut dyn Stream {
        match self {
            PhysLayer::Tcp(x) => x,
            #[cfg(test)]
            PhysLayer::Mock(x) => x,
        }
    }

    /// a return value of zero means the peer closed the stream
    pub(crate) async fn read(
        &mut self,
        buffer: &mut [u8],
        level: PhysDecodeLevel,
    ) -> std::io::Result<usize> {
        let count = self.stream().read(buffer).await?;
        if level.enabled() {
            if let Some(data) = buffer.get(..count) {
                tracing::info!("PHYS RX - {}", Bytes::new(level, data));
            }
        }
        Ok(count)
    }

    pub(crate) async fn write(
        &mut self,
        data: &[u8],
        level: PhysDecodeLevel,
    ) -> std::io::Result<()> {
        if level.enabled() {
            tracing::info!("PHYS TX - {}", Bytes::new(level, data));
        }
        self.stream().write_all(data).await
    }
}

struct Bytes<'a> {
    level: PhysDecodeLevel,
    data: &'a [u8],
}

impl<'a> Bytes<'a> {
    fn new(level: PhysDecodeLevel, data: &'a [u8]) -> Self {
        Self { level, data }
    }
}

impl std::fmt::Display for Bytes<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} bytes", self.data.len())?;
        if self.level.data_enabled() {
            format_bytes(f, self.data)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio_test::io::Builder;

    use super::*;

    #[tokio::test]
    async fn passes_bytes_through_in_both_directions() {
        let mock = Builder::new().read(&[0x01, 0x02]).write(&[0x03]).build();
        let mut phys = PhysLayer::new_mock(mock);
        let mut buffer = [0u8; 4];
        let count = phys.read(&mut buffer, PhysDecodeLevel::Data).await.unwrap();
        assert_eq!(count, 2);
        assert_eq!(&buffer[..2], &[0x01, 0x02]);
        phys.write(&[0x03], PhysDecodeLevel::Length).await.unwrap();
    }

    #[test]
    fn formats_length_and_optionally_data() {
        let data = [0xCA, 0xFE];
        assert_eq!(Bytes::new(PhysDecodeLevel::Length, &data).to_string(), "2 bytes");
        assert_eq!(
            Bytes::new(PhysDecodeLevel::Data, &data).to_string(),
            "2 bytes\nCA FE"
        );
    }
}
