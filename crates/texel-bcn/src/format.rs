//! Pixel format tags and the process-wide format catalog.
//!
//! The catalog maps every decodable [`FormatTag`] to a [`FormatInfo`] that
//! carries both its layout constants and the function that decodes one
//! source unit. Tags the parser can recognize but the catalog does not list
//! are rejected by [`lookup`] with [`Error::UnsupportedFormat`].

use std::fmt;
use std::sync::LazyLock;

use rustc_hash::FxHashMap;

use crate::block::{self, BC1_BLOCK_SIZE, BC2_BLOCK_SIZE};
use crate::raw;
use crate::tile::{DecodeParams, Tile};
use crate::{Error, Result};

/// Decodes one source unit (a block or a pixel) into a tile.
pub type DecodeFn = fn(&[u8], &mut Tile<'_>, DecodeParams);

/// Every pixel format a DDS or KTX header can be mapped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormatTag {
    Bc1,
    Bc2,
    Bc3,
    Bc4,
    Bc4S,
    Bc5,
    Bc5S,
    Bc6h,
    Bc7,
    Etc1,
    Etc2,
    Etc2A,
    Astc4x4,
    Bgra8,
    Bgrx8,
    Rgba8,
    Rgb8,
    Rg8,
    R8,
    A8,
    Rgba8S,
    Rg8S,
    R8S,
    R16,
    Rg16,
    Rgba16,
    R16S,
    Rg16S,
    Rgba16S,
    R16F,
    Rg16F,
    Rgba16F,
    R32F,
    Rgba32F,
    Rgb10A2,
    Rg11B10F,
}

impl FormatTag {
    /// Diagnostic name used in error messages and listings.
    pub const fn name(self) -> &'static str {
        match self {
            FormatTag::Bc1 => "BC1",
            FormatTag::Bc2 => "BC2",
            FormatTag::Bc3 => "BC3",
            FormatTag::Bc4 => "BC4",
            FormatTag::Bc4S => "BC4S",
            FormatTag::Bc5 => "BC5",
            FormatTag::Bc5S => "BC5S",
            FormatTag::Bc6h => "BC6H",
            FormatTag::Bc7 => "BC7",
            FormatTag::Etc1 => "ETC1",
            FormatTag::Etc2 => "ETC2",
            FormatTag::Etc2A => "ETC2A",
            FormatTag::Astc4x4 => "ASTC4x4",
            FormatTag::Bgra8 => "BGRA8",
            FormatTag::Bgrx8 => "BGRX8",
            FormatTag::Rgba8 => "RGBA8",
            FormatTag::Rgb8 => "RGB8",
            FormatTag::Rg8 => "RG8",
            FormatTag::R8 => "R8",
            FormatTag::A8 => "A8",
            FormatTag::Rgba8S => "RGBA8S",
            FormatTag::Rg8S => "RG8S",
            FormatTag::R8S => "R8S",
            FormatTag::R16 => "R16",
            FormatTag::Rg16 => "RG16",
            FormatTag::Rgba16 => "RGBA16",
            FormatTag::R16S => "R16S",
            FormatTag::Rg16S => "RG16S",
            FormatTag::Rgba16S => "RGBA16S",
            FormatTag::R16F => "R16F",
            FormatTag::Rg16F => "RG16F",
            FormatTag::Rgba16F => "RGBA16F",
            FormatTag::R32F => "R32F",
            FormatTag::Rgba32F => "RGBA32F",
            FormatTag::Rgb10A2 => "RGB10A2",
            FormatTag::Rg11B10F => "RG11B10F",
        }
    }

    /// Whether the format stores 4x4 blocks rather than pixels.
    pub const fn is_compressed(self) -> bool {
        matches!(
            self,
            FormatTag::Bc1
                | FormatTag::Bc2
                | FormatTag::Bc3
                | FormatTag::Bc4
                | FormatTag::Bc4S
                | FormatTag::Bc5
                | FormatTag::Bc5S
                | FormatTag::Bc6h
                | FormatTag::Bc7
                | FormatTag::Etc1
                | FormatTag::Etc2
                | FormatTag::Etc2A
                | FormatTag::Astc4x4
        )
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Layout constants and decoder of one supported format.
#[derive(Clone, Copy)]
pub struct FormatInfo {
    pub tag: FormatTag,
    /// Channels produced per pixel (1-4).
    pub channel_count: usize,
    /// Bytes per decoded channel in the reference 8-bit / float encoding.
    pub bytes_per_channel: usize,
    /// Bytes consumed per decoded unit: one block, or one pixel.
    pub source_stride: usize,
    /// Pixels per unit along each axis: 4 for block formats, 1 otherwise.
    pub block_step: usize,
    /// The format stores a real alpha lane.
    pub has_alpha: bool,
    pub decode: DecodeFn,
}

impl FormatInfo {
    fn block(tag: FormatTag, channels: usize, bytes: usize, stride: usize, alpha: bool, decode: DecodeFn) -> Self {
        Self {
            tag,
            channel_count: channels,
            bytes_per_channel: bytes,
            source_stride: stride,
            block_step: 4,
            has_alpha: alpha,
            decode,
        }
    }

    fn pixel(tag: FormatTag, channels: usize, bytes: usize, stride: usize, alpha: bool, decode: DecodeFn) -> Self {
        Self {
            tag,
            channel_count: channels,
            bytes_per_channel: bytes,
            source_stride: stride,
            block_step: 1,
            has_alpha: alpha,
            decode,
        }
    }

    /// Source units per row / column for an image of the given size.
    #[inline]
    pub fn units(&self, width: usize, height: usize) -> (usize, usize) {
        (width.div_ceil(self.block_step), height.div_ceil(self.block_step))
    }

    /// Bytes of one tightly packed row of units, or `None` on overflow.
    #[inline]
    pub fn row_bytes(&self, width: usize) -> Option<usize> {
        width.div_ceil(self.block_step).checked_mul(self.source_stride)
    }

    /// Decode one source unit into `tile`.
    #[inline]
    pub fn decode_unit(&self, src: &[u8], tile: &mut Tile<'_>, params: DecodeParams) {
        (self.decode)(src, tile, params)
    }
}

impl fmt::Debug for FormatInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FormatInfo")
            .field("tag", &self.tag)
            .field("channel_count", &self.channel_count)
            .field("bytes_per_channel", &self.bytes_per_channel)
            .field("source_stride", &self.source_stride)
            .field("block_step", &self.block_step)
            .field("has_alpha", &self.has_alpha)
            .finish()
    }
}

static CATALOG: LazyLock<FxHashMap<FormatTag, FormatInfo>> = LazyLock::new(|| {
    use FormatTag::*;

    [
        FormatInfo::block(Bc1, 4, 1, BC1_BLOCK_SIZE, false, block::bc1),
        FormatInfo::block(Bc2, 4, 1, BC2_BLOCK_SIZE, true, block::bc2),
        FormatInfo::block(Bc3, 4, 1, BC2_BLOCK_SIZE, true, block::bc3),
        FormatInfo::block(Bc4, 1, 1, BC1_BLOCK_SIZE, false, block::bc4),
        FormatInfo::block(Bc4S, 1, 1, BC1_BLOCK_SIZE, false, block::bc4s),
        FormatInfo::block(Bc5, 2, 1, BC2_BLOCK_SIZE, false, block::bc5),
        FormatInfo::block(Bc5S, 2, 1, BC2_BLOCK_SIZE, false, block::bc5s),
        FormatInfo::block(Bc6h, 3, 4, BC2_BLOCK_SIZE, false, block::bc6h),
        FormatInfo::block(Bc7, 4, 1, BC2_BLOCK_SIZE, true, block::bc7),
        FormatInfo::pixel(Bgra8, 4, 1, 4, true, raw::bgra8),
        FormatInfo::pixel(Bgrx8, 4, 1, 4, false, raw::bgrx8),
        FormatInfo::pixel(Rgba8, 4, 1, 4, true, raw::unorm8::<4>),
        FormatInfo::pixel(Rgb8, 3, 1, 3, false, raw::unorm8::<3>),
        FormatInfo::pixel(Rg8, 2, 1, 2, false, raw::unorm8::<2>),
        FormatInfo::pixel(R8, 1, 1, 1, false, raw::unorm8::<1>),
        FormatInfo::pixel(A8, 1, 1, 1, true, raw::unorm8::<1>),
        FormatInfo::pixel(Rgba8S, 4, 1, 4, true, raw::snorm8::<4>),
        FormatInfo::pixel(Rg8S, 2, 1, 2, false, raw::snorm8::<2>),
        FormatInfo::pixel(R8S, 1, 1, 1, false, raw::snorm8::<1>),
        FormatInfo::pixel(R16, 1, 4, 2, false, raw::unorm16::<1>),
        FormatInfo::pixel(Rg16, 2, 4, 4, false, raw::unorm16::<2>),
        FormatInfo::pixel(Rgba16, 4, 4, 8, true, raw::unorm16::<4>),
        FormatInfo::pixel(R16S, 1, 4, 2, false, raw::snorm16::<1>),
        FormatInfo::pixel(Rg16S, 2, 4, 4, false, raw::snorm16::<2>),
        FormatInfo::pixel(Rgba16S, 4, 4, 8, true, raw::snorm16::<4>),
        FormatInfo::pixel(R16F, 1, 4, 2, false, raw::float16::<1>),
        FormatInfo::pixel(Rg16F, 2, 4, 4, false, raw::float16::<2>),
        FormatInfo::pixel(Rgba16F, 4, 4, 8, true, raw::float16::<4>),
        FormatInfo::pixel(R32F, 1, 4, 4, false, raw::float32::<1>),
        FormatInfo::pixel(Rgba32F, 4, 4, 16, true, raw::float32::<4>),
    ]
    .into_iter()
    .map(|info| (info.tag, info))
    .collect()
});

/// Look up the layout and decoder of a format.
pub fn lookup(tag: FormatTag) -> Result<&'static FormatInfo> {
    CATALOG
        .get(&tag)
        .ok_or_else(|| Error::UnsupportedFormat(tag.name().to_owned()))
}

/// All decodable formats, in no particular order.
pub fn supported() -> impl Iterator<Item = &'static FormatInfo> {
    CATALOG.values()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_every_entry_is_well_formed() {
        for info in supported() {
            assert!((1..=4).contains(&info.channel_count), "{info:?}");
            assert!(info.source_stride > 0, "{info:?}");
            assert!(matches!(info.bytes_per_channel, 1 | 4), "{info:?}");
            assert_eq!(info.block_step == 4, info.tag.is_compressed(), "{info:?}");
        }
        assert_eq!(supported().count(), 30);
    }

    #[rstest]
    #[case(FormatTag::Etc1)]
    #[case(FormatTag::Astc4x4)]
    #[case(FormatTag::Rgb10A2)]
    #[case(FormatTag::Rg11B10F)]
    fn test_uncataloged_formats_are_rejected(#[case] tag: FormatTag) {
        match lookup(tag) {
            Err(Error::UnsupportedFormat(name)) => assert_eq!(name, tag.name()),
            other => panic!("expected UnsupportedFormat, got {other:?}"),
        }
    }

    #[test]
    fn test_block_row_bytes() {
        let bc1 = lookup(FormatTag::Bc1).unwrap();
        assert_eq!(bc1.units(5, 1), (2, 1));
        assert_eq!(bc1.row_bytes(5), Some(16));

        let rgb = lookup(FormatTag::Rgb8).unwrap();
        assert_eq!(rgb.row_bytes(5), Some(15));
        assert_eq!(rgb.row_bytes(usize::MAX), None);
    }

    #[test]
    fn test_lookup_returns_shared_entry() {
        let a = lookup(FormatTag::Bc7).unwrap();
        let b = lookup(FormatTag::Bc7).unwrap();
        assert!(std::ptr::eq(a, b));
    }
}
