pub mod error;
pub mod cursor;
pub mod chunk;
pub mod header;
pub mod filter;
pub mod zlib;
pub mod decoder;
pub mod encoder;

pub use error::{Error, ErrorKind};
pub use chunk::{Chunk, ChunkProps, ChunkStream, ChunkType, PNG_SIG};
pub use header::{Header, HeaderField};
pub use decoder::{decode, decode_with_options, DecodeOptions, PayloadAssembler};
pub use encoder::encode;

use std::path::Path;
use std::slice::ChunksExact;

pub type Result<T> = std::result::Result<T, Error>;

/// Decoded image: `height` rows of `width` RGB pixels, one byte per channel,
/// stored row-major without padding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl RasterGrid {
    pub const CHANNELS: usize = header::CHANNELS;

    /// Wraps already decoded pixels; `None` if the sizes disagree or are zero.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Option<Self> {
        let len = width.checked_mul(height)?.checked_mul(Self::CHANNELS)?;
        if len == 0 || data.len() != len { return None; }
        Some(Self { width, height, data })
    }

    pub fn load_from_memory(bytes: &[u8]) -> Result<Self> {
        decode(bytes)
    }

    pub fn load<P: AsRef<Path>>(fname: P) -> Result<Self> {
        let bytes = std::fs::read(fname)?;
        Self::load_from_memory(&bytes)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn row_stride(&self) -> usize {
        self.width * Self::CHANNELS
    }

    pub fn row(&self, y: usize) -> Option<&[u8]> {
        if y >= self.height { return None; }
        let stride = self.row_stride();
        Some(&self.data[y*stride..(y+1)*stride])
    }

    pub fn rows(&self) -> ChunksExact<'_, u8> {
        self.data.chunks_exact(self.row_stride())
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        if x >= self.width { return None; }
        let p = &self.row(y)?[x*Self::CHANNELS..];
        Some([p[0], p[1], p[2]])
    }

    /// Every pixel, row by row.
    pub fn pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data.chunks_exact(Self::CHANNELS).map(|p| [p[0], p[1], p[2]])
    }

    pub fn as_raw(&self) -> &[u8] {
        &self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }
}
