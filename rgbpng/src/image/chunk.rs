use super::{Result, Error};
use super::cursor::ByteCursor;

use std::fmt;
use bitflags::bitflags;
use log::{debug, trace};

pub const PNG_SIG: [u8; 8] = [ 137,80,78,71,13,10,26,10 ];

/// Four ASCII bytes naming a chunk.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ChunkType(pub [u8; 4]);

impl ChunkType {
    pub const IHDR: Self = Self(*b"IHDR");
    pub const IDAT: Self = Self(*b"IDAT");
    pub const IEND: Self = Self(*b"IEND");

    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }

    pub fn props(&self) -> ChunkProps {
        ChunkProps::from_bits_truncate(u32::from_be_bytes(self.0))
    }
}

impl fmt::Display for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &c in self.0.iter() {
            if c.is_ascii_graphic() {
                write!(f, "{}", c as char)?;
            } else {
                write!(f, "\\x{:02x}", c)?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for ChunkType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ChunkType({})", self)
    }
}

bitflags! {
    /// Property bits packed into bit 5 of each tag byte.
    pub struct ChunkProps: u32 {
        const ANCILLARY    = 1 << 29;
        const PRIVATE      = 1 << 21;
        const RESERVED     = 1 << 13;
        const SAFE_TO_COPY = 1 << 5;
    }
}

/// A validated chunk borrowed from the input buffer.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Chunk<'a> {
    pub chunk_type: ChunkType,
    pub data: &'a [u8],
    pub declared_length: u32,
    pub stored_crc: u32,
}

impl fmt::Debug for Chunk<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chunk")
            .field("chunk_type", &self.chunk_type)
            .field("data", &(&self.data[..self.data.len().min(12)], self.data.len()))
            .field("stored_crc", &self.stored_crc)
            .finish()
    }
}

/// CRC-32 over the tag followed by the payload.
pub fn checksum(chunk_type: &ChunkType, data: &[u8]) -> u32 {
    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type.as_bytes());
    hasher.update(data);
    hasher.finalize()
}

/// Appends one length-prefixed, checksummed chunk to `out`.
pub fn write_chunk(out: &mut Vec<u8>, chunk_type: ChunkType, data: &[u8]) {
    out.extend_from_slice(&(data.len() as u32).to_be_bytes());
    out.extend_from_slice(chunk_type.as_bytes());
    out.extend_from_slice(data);
    out.extend_from_slice(&checksum(&chunk_type, data).to_be_bytes());
}

/// Splits the bytes after the signature into chunks.
///
/// `next_block` yields every chunk up to, but not including, the `IEND`
/// marker, and `Ok(None)` once the marker has been read and checked. Any error
/// also ends the stream.
#[derive(Debug, Clone)]
pub struct ChunkStream<'a> {
    cursor: ByteCursor<'a>,
    done: bool,
}

impl<'a> ChunkStream<'a> {
    pub fn new(bytes: &'a [u8]) -> Result<Self> {
        let mut cursor = ByteCursor::new(bytes);
        match cursor.read_bytes(PNG_SIG.len()) {
            Ok(sig) if sig == &PNG_SIG[..] => {},
            _ => return Err(Error::bad_magic("incorrect magic")),
        }
        Ok(Self { cursor, done: false })
    }

    pub fn next_block(&mut self) -> Result<Option<Chunk<'a>>> {
        if self.done { return Ok(None); }

        match self.read_chunk() {
            Ok(chunk) if chunk.chunk_type == ChunkType::IEND => {
                self.done = true;
                if !self.cursor.is_empty() {
                    debug!("{} bytes after IEND ignored", self.cursor.remaining());
                }
                Ok(None)
            },
            Ok(chunk) => Ok(Some(chunk)),
            Err(e) => {
                self.done = true;
                Err(e)
            },
        }
    }

    fn read_chunk(&mut self) -> Result<Chunk<'a>> {
        let s = &mut self.cursor;
        let offset = s.position();
        let declared_length = s.read_u32_be()?;
        let mut tag = [0u8; 4];
        tag.copy_from_slice(s.read_bytes(4)?);
        let chunk_type = ChunkType(tag);
        trace!("chunk {}@{} (offset {})", chunk_type, declared_length, offset);

        let data = s.read_bytes(declared_length as usize)?;
        let stored_crc = s.read_u32_be()?;
        let computed = checksum(&chunk_type, data);
        if computed != stored_crc {
            return Err(Error::checksum_mismatch(chunk_type, stored_crc, computed));
        }

        Ok(Chunk { chunk_type, data, declared_length, stored_crc })
    }
}

impl<'a> Iterator for ChunkStream<'a> {
    type Item = Result<Chunk<'a>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_block().transpose()
    }
}
