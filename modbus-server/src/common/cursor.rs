use crate::error::{InternalError, ProtocolError};

/// read-only cursor over a request payload, all multi-byte reads are big-endian
pub(crate) struct ReadCursor<'a> {
    src: &'a [u8],
}

/// write cursor over a fixed-size output buffer
pub(crate) struct WriteCursor<'a> {
    dest: &'a mut [u8],
    pos: usize,
}

impl<'a> ReadCursor<'a> {
    pub(crate) fn new(src: &'a [u8]) -> ReadCursor<'a> {
        ReadCursor { src }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.src.len()
    }

    pub(crate) fn read_u8(&mut self) -> Result<u8, ProtocolError> {
        match self.src.split_first() {
            Some((first, rest)) => {
                self.src = rest;
                Ok(*first)
            }
            None => Err(ProtocolError::InsufficientBytes),
        }
    }

    pub(crate) fn read_u16_be(&mut self) -> Result<u16, ProtocolError> {
        let high = self.read_u8()?;
        let low = self.read_u8()?;
        Ok(u16::from_be_bytes([high, low]))
    }

    pub(crate) fn read_bytes(&mut self, count: usize) -> Result<&'a [u8], ProtocolError> {
        if self.src.len() < count {
            return Err(ProtocolError::InsufficientBytes);
        }
        let (first, rest) = self.src.split_at(count);
        self.src = rest;
        Ok(first)
    }
}

impl<'a> WriteCursor<'a> {
    pub(crate) fn new(dest: &'a mut [u8]) -> WriteCursor<'a> {
        WriteCursor { dest, pos: 0 }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.dest.len() - self.pos
    }

    pub(crate) fn seek_to(&mut self, pos: usize) -> Result<(), InternalError> {
        if self.dest.len() < pos {
            return Err(InternalError::InsufficientWriteSpace(pos, self.dest.len()));
        }
        self.pos = pos;
        Ok(())
    }

    pub(crate) fn write_u8(&mut self, value: u8) -> Result<(), InternalError> {
        match self.dest.get_mut(self.pos) {
            Some(x) => {
                *x = value;
                self.pos += 1;
                Ok(())
            }
            None => Err(InternalError::InsufficientWriteSpace(1, 0)),
        }
    }

    pub(crate) fn write_u16_be(&mut self, value: u16) -> Result<(), InternalError> {
        self.write_bytes(&value.to_be_bytes())
    }

    pub(crate) fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), InternalError> {
        // don't write any bytes if there isn't space for all of them
        if self.remaining() < bytes.len() {
            return Err(InternalError::InsufficientWriteSpace(
                bytes.len(),
                self.remaining(),
            ));
        }
        self.dest[self.pos..self.pos + bytes.len()].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn written(&self) -> &[u8] {
        &self.dest[..self.pos]
    }
}
