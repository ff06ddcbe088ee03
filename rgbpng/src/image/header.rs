use super::{Result, Error};
use super::cursor::ByteCursor;

use std::fmt;
use log::debug;

pub const HEADER_LEN: usize = 13;
pub const CHANNELS: usize = 3;
/// Largest width or height accepted unless the caller says otherwise.
pub const MAX_DIMENSIONS: u32 = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HeaderField {
    BitDepth,
    ColorMode,
    CompressionMethod,
    FilterMethod,
    InterlaceMethod,
}

impl fmt::Display for HeaderField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            HeaderField::BitDepth          => "bit depth",
            HeaderField::ColorMode         => "color type",
            HeaderField::CompressionMethod => "compression method",
            HeaderField::FilterMethod      => "filter method",
            HeaderField::InterlaceMethod   => "interlace method",
        })
    }
}

/// Image header, the payload of the `IHDR` chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_mode: u8,
    pub compression_method: u8,
    pub filter_method: u8,
    pub interlace_method: u8,
}

impl Header {
    /// The only header this decoder accepts: 8 bits per channel, RGB,
    /// deflate, adaptive filtering, no interlace.
    pub fn rgb8(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            bit_depth: 8,
            color_mode: 2,
            compression_method: 0,
            filter_method: 0,
            interlace_method: 0,
        }
    }

    pub fn decode(data: &[u8]) -> Result<Self> {
        if data.len() > HEADER_LEN { return Err(Error::corrupt(format!("bad IHDR len {}", data.len()))); }

        let mut s = ByteCursor::new(data);
        let header = Self {
            width: s.read_u32_be()?,
            height: s.read_u32_be()?,
            bit_depth: s.read_u8()?,
            color_mode: s.read_u8()?,
            compression_method: s.read_u8()?,
            filter_method: s.read_u8()?,
            interlace_method: s.read_u8()?,
        };
        debug!("IHDR: {:?}", header);

        if header.width == 0 || header.height == 0 { return Err(Error::bad_dims("0-pixel image")); }

        let expect = [
            (HeaderField::BitDepth,          header.bit_depth,          8),
            (HeaderField::ColorMode,         header.color_mode,         2),
            (HeaderField::CompressionMethod, header.compression_method, 0),
            (HeaderField::FilterMethod,      header.filter_method,      0),
            (HeaderField::InterlaceMethod,   header.interlace_method,   0),
        ];
        for &(field, value, supported) in expect.iter() {
            if value != supported { return Err(Error::unsupported_variant(field, value)); }
        }

        Ok(header)
    }

    pub fn encode(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&self.width.to_be_bytes());
        out[4..8].copy_from_slice(&self.height.to_be_bytes());
        out[8]  = self.bit_depth;
        out[9]  = self.color_mode;
        out[10] = self.compression_method;
        out[11] = self.filter_method;
        out[12] = self.interlace_method;
        out
    }

    /// Bytes of pixel data in one scanline, without the filter byte.
    pub fn row_stride(&self) -> usize {
        self.width as usize * CHANNELS
    }

    /// Checks the dimensions against `max_dimension` and returns the number of
    /// bytes the decompressed stream has to hold.
    pub fn filtered_len(&self, max_dimension: u32) -> Result<usize> {
        if self.width == 0 || self.height == 0 { return Err(Error::bad_dims("0-pixel image")); }
        if self.width > max_dimension || self.height > max_dimension {
            return Err(Error::bad_dims(format!("Very large image {}x{} (corrupt?)", self.width, self.height)));
        }
        if (1 << 30) / self.width as usize / CHANNELS < self.height as usize {
            return Err(Error::bad_dims("image too large to decode"));
        }
        (self.width as usize).checked_mul(CHANNELS)
            .and_then(|stride| stride.checked_add(1))
            .and_then(|line| line.checked_mul(self.height as usize))
            .ok_or_else(|| Error::bad_dims("image too large to decode"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::ErrorKind;

    #[test]
    fn decodes_rgb8() {
        let h = Header::decode(&Header::rgb8(640, 480).encode()).unwrap();
        assert_eq!(h, Header::rgb8(640, 480));
        assert_eq!(h.row_stride(), 1920);
        assert_eq!(h.filtered_len(MAX_DIMENSIONS).unwrap(), 1921 * 480);
    }

    #[test]
    fn field_layout() {
        let raw = [0, 0, 1, 0,  0, 0, 0, 2,  8, 2, 0, 0, 0];
        let h = Header::decode(&raw).unwrap();
        assert_eq!((h.width, h.height), (256, 2));
    }

    #[test]
    fn short_payload_is_truncated() {
        let raw = Header::rgb8(1, 1).encode();
        let err = Header::decode(&raw[..12]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::TruncatedInput);
        assert_eq!(Header::decode(&[]).unwrap_err().kind(), ErrorKind::TruncatedInput);
    }

    #[test]
    fn long_payload_is_corrupt() {
        let mut raw = Header::rgb8(1, 1).encode().to_vec();
        raw.push(0);
        assert_eq!(Header::decode(&raw).unwrap_err().kind(), ErrorKind::Corrupt);
    }

    #[test]
    fn zero_dimensions() {
        for &(w, h) in [(0, 1), (1, 0), (0, 0)].iter() {
            let err = Header::decode(&Header::rgb8(w, h).encode()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidDimensions);
        }
    }

    #[test]
    fn rejects_every_unsupported_field() {
        let cases = [
            (8,  HeaderField::BitDepth,          16),
            (8,  HeaderField::BitDepth,          4),
            (9,  HeaderField::ColorMode,         6),
            (9,  HeaderField::ColorMode,         3),
            (9,  HeaderField::ColorMode,         0),
            (10, HeaderField::CompressionMethod, 1),
            (11, HeaderField::FilterMethod,      1),
            (12, HeaderField::InterlaceMethod,   1),
        ];
        for &(offset, field, value) in cases.iter() {
            let mut raw = Header::rgb8(4, 4).encode();
            raw[offset] = value;
            let err = Header::decode(&raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::UnsupportedVariant { field, value });
        }
    }

    #[test]
    fn dimension_limit() {
        let h = Header::rgb8(MAX_DIMENSIONS + 1, 1);
        assert_eq!(h.filtered_len(MAX_DIMENSIONS).unwrap_err().kind(), ErrorKind::InvalidDimensions);
        assert_eq!(Header::rgb8(10, 10).filtered_len(9).unwrap_err().kind(), ErrorKind::InvalidDimensions);
        assert!(Header::rgb8(10, 10).filtered_len(10).is_ok());
        // fits the per-side limit but not the total
        let err = Header::rgb8(1 << 16, 1 << 16).filtered_len(MAX_DIMENSIONS).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidDimensions);
    }
}
