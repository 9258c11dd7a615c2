use crate::common::phys::PhysLayer;
use crate::decode::PhysDecodeLevel;
use crate::error::InternalError;

/// Holds bytes received from the socket until the frame parser consumes them
///
/// Unconsumed bytes live in `storage[start..filled]`. A partial frame is moved to the
/// front only when no room is left behind it.
pub(crate) struct ReadBuffer {
    storage: Box<[u8]>,
    start: usize,
    filled: usize,
}

impl ReadBuffer {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            storage: vec![0; capacity].into_boxed_slice(),
            start: 0,
            filled: 0,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.filled - self.start
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// consume exactly `count` bytes or nothing at all
    pub(crate) fn read(&mut self, count: usize) -> Result<&[u8], InternalError> {
        let remaining = self.len();
        let end = self.start + count;
        let bytes = self
            .storage
            .get(self.start..end)
            .filter(|_| count <= remaining)
            .ok_or(InternalError::InsufficientBytesForRead(count, remaining))?;
        self.start = end;
        Ok(bytes)
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, InternalError> {
        Ok(self.read(1)?[0])
    }

    pub(crate) fn read_u16_be(&mut self) -> Result<u16, InternalError> {
        let bytes = self.read(2)?;
        Ok(u16::from_be_bytes([bytes[0], bytes[1]]))
    }

    fn make_room(&mut self) {
        if self.is_empty() {
            self.start = 0;
            self.filled = 0;
        } else if self.filled == self.storage.len() {
            self.storage.copy_within(self.start..self.filled, 0);
            self.filled -= self.start;
            self.start = 0;
        }
    }

    /// perform a single socket read, end of stream is reported as `UnexpectedEof`
    pub(crate) async fn read_some(
        &mut self,
        io: &mut PhysLayer,
        level: PhysDecodeLevel,
    ) -> Result<usize, std::io::Error> {
        self.make_room();
        let free = &mut self.storage[self.filled..];
        match io.read(free, level).await? {
            0 => Err(std::io::ErrorKind::UnexpectedEof.into()),
            count => {
                self.filled += count;
                Ok(count)
            }
        }
    }
}
