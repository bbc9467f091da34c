//! Interleaved byte stream with an explicit read cursor.
//!
//! The buffer is never shrunk or reallocated while tiles are consumed; only
//! the cursor moves.

use crate::error::{Result, RipError};

#[derive(Debug, Clone)]
pub struct ByteStream {
    data: Vec<u8>,
    position: usize,
}

impl ByteStream {
    pub fn new(data: Vec<u8>) -> Self {
        ByteStream { data, position: 0 }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    #[cfg(test)]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Take the next `length` bytes and advance the cursor past them.
    pub fn take(&mut self, length: usize) -> Result<&[u8]> {
        if length > self.remaining() {
            return Err(self.exhausted(length));
        }

        let start = self.position;
        self.position += length;
        Ok(&self.data[start..self.position])
    }

    /// Advance the cursor without reading.
    pub fn skip(&mut self, length: usize) -> Result<()> {
        if length > self.remaining() {
            return Err(self.exhausted(length));
        }
        self.position += length;
        Ok(())
    }

    fn exhausted(&self, requested: usize) -> RipError {
        RipError::StreamExhausted {
            requested,
            remaining: self.remaining(),
            tiles_placed: 0,
            tiles_required: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_take_advances_cursor() {
        let mut stream = ByteStream::new((0u8..10).collect());
        assert_eq!(stream.take(3).unwrap(), &[0, 1, 2]);
        assert_eq!(stream.position(), 3);
        assert_eq!(stream.take(2).unwrap(), &[3, 4]);
        assert_eq!(stream.remaining(), 5);
        assert_eq!(stream.len(), 10);
    }

    #[test]
    fn test_take_past_end_fails_without_moving() {
        let mut stream = ByteStream::new(vec![0; 4]);
        stream.take(3).unwrap();

        match stream.take(2) {
            Err(RipError::StreamExhausted {
                requested,
                remaining,
                ..
            }) => {
                assert_eq!(requested, 2);
                assert_eq!(remaining, 1);
            }
            other => panic!("expected StreamExhausted, got {:?}", other),
        }
        assert_eq!(stream.position(), 3);
    }

    #[test]
    fn test_skip() {
        let mut stream = ByteStream::new((0u8..8).collect());
        stream.skip(6).unwrap();
        assert_eq!(stream.take(2).unwrap(), &[6, 7]);
        assert!(stream.skip(1).is_err());
    }
}
