use std::io;
use std::fmt;

use super::chunk::ChunkType;
use super::header::HeaderField;

macro_rules! impl_error_abbr {
    ($(($func:ident, $ekid:expr)),+ $(,)?) => {
        impl Error {$(
            pub fn $func<E: Into<Box<dyn std::error::Error + Send + Sync>>>(error: E) -> Self {
                Self { kind: $ekid, error: error.into() }
            }
        )+}
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Io,
    BadMagic,
    TruncatedInput,
    ChecksumMismatch { type_tag: ChunkType },
    UnsupportedVariant { field: HeaderField, value: u8 },
    InvalidDimensions,
    InvalidFilterSelector { row: usize, value: u8 },
    DecompressionError,
    /// blocks arrived in an order the decoder can't make sense of
    Corrupt,
}

#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    error: Box<dyn std::error::Error + Send + Sync>,
}

impl_error_abbr!{
    (io,            ErrorKind::Io),
    (bad_magic,     ErrorKind::BadMagic),
    (truncated,     ErrorKind::TruncatedInput),
    (bad_dims,      ErrorKind::InvalidDimensions),
    (decompression, ErrorKind::DecompressionError),
    (corrupt,       ErrorKind::Corrupt),
}

impl Error {
    pub fn checksum_mismatch(type_tag: ChunkType, stored: u32, computed: u32) -> Self {
        Self {
            kind: ErrorKind::ChecksumMismatch { type_tag },
            error: format!("chunk {} CRC32 incorrect: stored={:#010x}, computed={:#010x}", type_tag, stored, computed).into(),
        }
    }

    pub fn unsupported_variant(field: HeaderField, value: u8) -> Self {
        Self {
            kind: ErrorKind::UnsupportedVariant { field, value },
            error: format!("unsupported {} ({})", field, value).into(),
        }
    }

    pub fn invalid_filter(row: usize, value: u8) -> Self {
        Self {
            kind: ErrorKind::InvalidFilterSelector { row, value },
            error: format!("invalid filter {} on row {}", value, row).into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

impl From<io::Error> for Error {
    fn from(error: io::Error) -> Error {
        Self::io(error)
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.error.source()
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.error)
    }
}
