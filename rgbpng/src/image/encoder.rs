use super::{Result, Error, RasterGrid};
use super::chunk::{write_chunk, ChunkType, PNG_SIG};
use super::header::Header;
use super::filter::filter_none;
use super::zlib::zlib_encode;

use std::convert::TryFrom;
use log::trace;

fn header_for(width: usize, height: usize) -> Result<Header> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok(Header::rgb8(w, h)),
        _ => Err(Error::bad_dims(format!("{}x{} does not fit an IHDR", width, height))),
    }
}

/// Writes `img` as a PNG: one `IDAT`, every scanline with filter `None`.
///
/// Fails with `InvalidDimensions` when a side does not fit in 32 bits.
pub fn encode(img: &RasterGrid) -> Result<Vec<u8>> {
    let header = header_for(img.width(), img.height())?;
    let idata = zlib_encode(&filter_none(img.as_raw(), img.width()));
    trace!("encode: {}x{}, {} compressed bytes", img.width(), img.height(), idata.len());

    let mut out = Vec::with_capacity(PNG_SIG.len() + 3 * 12 + 13 + idata.len());
    out.extend_from_slice(&PNG_SIG);
    write_chunk(&mut out, ChunkType::IHDR, &header.encode());
    write_chunk(&mut out, ChunkType::IDAT, &idata);
    write_chunk(&mut out, ChunkType::IEND, &[]);
    Ok(out)
}
