//! zlib boundary. PNG splits one zlib stream across any number of `IDAT`
//! chunks, so the chunks are concatenated first and inflated in one go.
use super::{Result, Error};

use log::debug;
use miniz_oxide::inflate::{decompress_to_vec_zlib_with_limit, TINFLStatus};
use miniz_oxide::deflate::compress_to_vec_zlib;

const COMPRESSION_LEVEL: u8 = 6;
/// Decompressed bytes tolerated past `expected_len` before the stream is refused.
const INFLATE_SLACK: usize = 1 << 10;

/// Inflates a complete zlib stream into at most `expected_len` bytes.
///
/// A stream that inflates to more than `expected_len + INFLATE_SLACK` bytes is
/// rejected without producing the rest; a smaller excess is dropped.
pub fn zlib_decode(zbuffer: &[u8], expected_len: usize) -> Result<Vec<u8>> {
    if zbuffer.is_empty() { return Err(Error::decompression("no image data")); }

    let limit = expected_len.saturating_add(INFLATE_SLACK);
    let mut out = decompress_to_vec_zlib_with_limit(zbuffer, limit).map_err(|e| match e.status {
        TINFLStatus::HasMoreOutput => Error::decompression(format!("image data inflates past {} bytes", limit)),
        status => Error::decompression(format!("bad zlib stream: {:?}", status)),
    })?;
    debug!("inflated {} -> {} bytes (expected {})", zbuffer.len(), out.len(), expected_len);
    if out.len() > expected_len {
        debug!("{} decompressed bytes past the last scanline dropped", out.len() - expected_len);
        out.truncate(expected_len);
    }
    Ok(out)
}

pub fn zlib_encode(data: &[u8]) -> Vec<u8> {
    compress_to_vec_zlib(data, COMPRESSION_LEVEL)
}
