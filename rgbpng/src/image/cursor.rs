use super::{Result, Error};

/// Sequential big-endian reader over a borrowed buffer.
///
/// Every read is bounds checked and fails with `TruncatedInput` instead of
/// reading past the end; a failed read leaves the offset where it was.
#[derive(Debug, Clone)]
pub struct ByteCursor<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteCursor<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    pub fn position(&self) -> usize {
        self.offset
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn peek_bytes(&self, n: usize) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(Error::truncated(format!(
                "need {} bytes at offset {}, only {} left", n, self.offset, self.remaining()
            )));
        }
        Ok(&self.data[self.offset..self.offset+n])
    }

    pub fn read_bytes(&mut self, n: usize) -> Result<&'a [u8]> {
        let out = self.peek_bytes(n)?;
        self.offset += n;
        Ok(out)
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        self.read_bytes(n).map(|_| ())
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut s = [0; N];
        s.copy_from_slice(self.read_bytes(N)?);
        Ok(s)
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read_array::<1>()?[0])
    }

    pub fn read_u16_be(&mut self) -> Result<u16> {
        self.read_array().map(u16::from_be_bytes)
    }

    pub fn read_u32_be(&mut self) -> Result<u32> {
        self.read_array().map(u32::from_be_bytes)
    }
}
