//! Error types for texture container decoding.

use thiserror::Error;

/// Errors that can occur when decoding a texture container.
#[derive(Debug, Error)]
pub enum Error {
    /// Header or pixel data ended early.
    #[error("truncated texture data: {0}")]
    Truncated(#[from] texel_common::Error),

    /// Neither the DDS nor the KTX signature was found.
    #[error("unrecognized texture container magic: {0:02X?}")]
    InvalidMagic([u8; 4]),

    /// Invalid container header.
    #[error("invalid texture header: {0}")]
    InvalidHeader(String),

    /// The header declares zero mip levels.
    #[error("texture does not contain any mip level")]
    NoMips,

    /// The header declares a zero width or height.
    #[error("texture has zero dimensions ({width}x{height})")]
    ZeroDimensions { width: u32, height: u32 },

    /// The pixel format is recognized by the container but cannot be decoded.
    #[error("texture does not use a supported format ({0})")]
    UnsupportedFormat(String),

    /// The load was cancelled between mip levels.
    #[error("texture load cancelled")]
    Cancelled,
}

/// Coarse classification of [`Error`], for callers that only branch on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Malformed or truncated input.
    Parse,
    /// Well-formed container, unsupported pixel format.
    UnsupportedFormat,
    /// The caller asked the load to stop.
    Cancelled,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Truncated(_)
            | Error::InvalidMagic(_)
            | Error::InvalidHeader(_)
            | Error::NoMips
            | Error::ZeroDimensions { .. } => ErrorKind::Parse,
            Error::UnsupportedFormat(_) => ErrorKind::UnsupportedFormat,
            Error::Cancelled => ErrorKind::Cancelled,
        }
    }
}

/// Result type for texture decoding.
pub type Result<T> = std::result::Result<T, Error>;
