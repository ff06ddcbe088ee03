use super::{Result, Error, RasterGrid};
use super::chunk::{ChunkStream, ChunkType, ChunkProps};
use super::header::{Header, MAX_DIMENSIONS};
use super::filter::unfilter_scanlines;
use super::zlib::zlib_decode;

use log::{debug, trace, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeOptions {
    /// Upper bound for both width and height.
    pub max_dimension: u32,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        Self {
            max_dimension: MAX_DIMENSIONS,
        }
    }
}

/// Concatenates `IDAT` payloads in arrival order.
#[derive(Debug, Clone, Default)]
pub struct PayloadAssembler {
    idata: Vec<u8>,
    chunks: usize,
}

impl PayloadAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, data: &[u8]) {
        self.idata.extend_from_slice(data);
        self.chunks += 1;
    }

    pub fn len(&self) -> usize {
        self.idata.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idata.is_empty()
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks
    }

    pub fn finalize(self) -> Vec<u8> {
        self.idata
    }
}

/// Decoder state for one PNG data stream.
pub struct Png<'a> {
    s: ChunkStream<'a>,
    options: DecodeOptions,

    header: Option<Header>,
    filtered_len: usize,
    idata: PayloadAssembler,
}

impl<'a> Png<'a> {
    pub fn new(bytes: &'a [u8], options: DecodeOptions) -> Result<Self> {
        Ok(Self {
            s: ChunkStream::new(bytes)?,
            options,
            header: None,
            filtered_len: 0,
            idata: PayloadAssembler::new(),
        })
    }

    fn parse_png_file(&mut self) -> Result<Header> {
        while let Some(chunk) = self.s.next_block()? {
            match chunk.chunk_type {
                ChunkType::IHDR => {
                    if self.header.is_some() { return Err(Error::corrupt("multiple IHDR")); }
                    let header = Header::decode(chunk.data)?;
                    self.filtered_len = header.filtered_len(self.options.max_dimension)?;
                    self.header = Some(header);
                },
                ChunkType::IDAT => {
                    if self.header.is_none() { return Err(Error::corrupt("first not IHDR")); }
                    self.idata.append(chunk.data);
                },
                other => {
                    // unknown chunks never stop decoding, critical ones are just louder
                    if other.props().contains(ChunkProps::ANCILLARY) {
                        debug!("chunk {} not handled, ignoring", other);
                    } else {
                        warn!("critical chunk {} not handled, ignoring", other);
                    }
                },
            }
        }

        self.header.ok_or_else(|| Error::corrupt("no IHDR before IEND"))
    }

    pub fn decode(mut self) -> Result<RasterGrid> {
        let header = self.parse_png_file()?;
        trace!("{} IDAT chunks, {} compressed bytes", self.idata.chunk_count(), self.idata.len());

        let idata = self.idata.finalize();
        let expanded = zlib_decode(&idata, self.filtered_len)?;
        drop(idata);

        let (width, height) = (header.width as usize, header.height as usize);
        let data = unfilter_scanlines(&expanded, width, height)?;
        Ok(RasterGrid { width, height, data })
    }
}

/// Decodes a whole PNG held in memory with the default limits.
pub fn decode(bytes: &[u8]) -> Result<RasterGrid> {
    decode_with_options(bytes, &DecodeOptions::default())
}

pub fn decode_with_options(bytes: &[u8], options: &DecodeOptions) -> Result<RasterGrid> {
    Png::new(bytes, *options)?.decode()
}
