//! Container-independent texture description and subresource layout.
//!
//! [`parse`] turns a DDS or KTX1 byte buffer into a [`TextureDescriptor`];
//! [`locate_subresource`] then finds the bytes of any (layer, face, mip)
//! triple. "Face" is the cubemap face for cubemaps and the depth slice for
//! volume textures.

use std::fmt;

use bitflags::bitflags;
use log::debug;
use texel_common::BinaryReader;

use crate::format::{self, FormatInfo, FormatTag};
use crate::header::{DDS_MAGIC, KTX_MAGIC};
use crate::{dds, ktx, Error, Result};

bitflags! {
    /// Properties declared by the container header.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct TextureFlags: u32 {
        /// Color data is sRGB encoded.
        const SRGB = 1 << 0;
        /// The texture carries meaningful alpha.
        const ALPHA = 1 << 1;
        /// Six faces per layer.
        const CUBEMAP = 1 << 2;
        /// 3D texture; faces are depth slices.
        const VOLUME = 1 << 3;
        /// The format code names a signed variant.
        const SIGNED = 1 << 4;
        /// Color channels are premultiplied by alpha.
        const PREMULTIPLIED_ALPHA = 1 << 5;
    }
}

/// Which container the descriptor was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    Dds,
    Ktx,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ContainerKind::Dds => "DDS",
            ContainerKind::Ktx => "KTX",
        })
    }
}

/// Everything the header says about a texture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureDescriptor {
    pub container: ContainerKind,
    pub format: FormatTag,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub mip_count: u32,
    pub layer_count: u32,
    pub flags: TextureFlags,
    /// Offset of the first pixel byte in the input buffer.
    pub data_offset: usize,
}

impl TextureDescriptor {
    #[inline]
    pub fn is_srgb(&self) -> bool {
        self.flags.contains(TextureFlags::SRGB)
    }

    #[inline]
    pub fn has_alpha(&self) -> bool {
        self.flags.contains(TextureFlags::ALPHA)
    }

    #[inline]
    pub fn is_cubemap(&self) -> bool {
        self.flags.contains(TextureFlags::CUBEMAP)
    }

    #[inline]
    pub fn is_volume(&self) -> bool {
        self.flags.contains(TextureFlags::VOLUME)
    }

    #[inline]
    pub fn is_array(&self) -> bool {
        self.layer_count > 1
    }

    /// Faces iterated per layer: 6 for cubemaps, the depth otherwise.
    #[inline]
    pub fn face_count(&self) -> u32 {
        if self.is_cubemap() {
            6
        } else {
            self.depth
        }
    }

    /// Pixel extent `(width, height, depth)` of a mip level.
    ///
    /// Levels past the end of the full mip chain have zero extent.
    pub fn mip_extent(&self, mip: u32) -> (u32, u32, u32) {
        let shr = |v: u32| v.checked_shr(mip).unwrap_or(0);
        if shr(self.width.max(self.height)) == 0 {
            return (0, 0, 0);
        }
        (shr(self.width).max(1), shr(self.height).max(1), shr(self.depth).max(1))
    }
}

/// Location of one (layer, face, mip) subresource inside the input buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Subresource {
    pub offset: usize,
    pub len: usize,
    /// Width in pixels; may be smaller than one block.
    pub width: u32,
    /// Height in pixels; may be smaller than one block.
    pub height: u32,
    /// Bytes between consecutive rows of units.
    pub row_pitch: usize,
}

impl Subresource {
    /// A subresource with no pixels, which decoders skip.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Borrow the subresource bytes.
    pub fn bytes<'a>(&self, data: &'a [u8]) -> Result<&'a [u8]> {
        Ok(BinaryReader::new(data).slice_at(self.offset, self.len)?)
    }
}

/// Check for a DDS or KTX signature at the reader's position.
///
/// The reader position is unchanged afterwards, whether or not a signature
/// matched.
pub fn is_texture(reader: &mut BinaryReader<'_>) -> bool {
    reader.restoring(|r| match r.read_array::<4>() {
        Ok(magic) if &magic == DDS_MAGIC => true,
        Ok(magic) if magic == KTX_MAGIC[..4] => r
            .read_bytes(KTX_MAGIC.len() - 4)
            .is_ok_and(|rest| rest == &KTX_MAGIC[4..]),
        _ => false,
    })
}

/// Longest possible mip chain: one level per bit of a `u32` dimension.
pub const MAX_MIP_LEVELS: u32 = u32::BITS;

/// Parse a texture and check that it can be decoded.
///
/// Fails on unrecognized magic, malformed or truncated headers, zero mips or
/// dimensions, formats missing from the catalog, and pixel data shorter
/// than the header declares.
pub fn parse(data: &[u8]) -> Result<TextureDescriptor> {
    let descriptor = parse_header(data)?;
    validate(&descriptor, data)?;
    Ok(descriptor)
}

/// Parse only the container header.
///
/// The format tag is not checked against the catalog and the pixel data is
/// not measured, so descriptors of recognized-but-undecodable textures can
/// still be inspected.
pub fn parse_header(data: &[u8]) -> Result<TextureDescriptor> {
    let mut reader = BinaryReader::new(data);
    let magic = reader.peek_bytes(4)?;

    let descriptor = if magic == DDS_MAGIC {
        dds::parse(&mut reader)?
    } else if reader.starts_with(KTX_MAGIC) {
        ktx::parse(&mut reader)?
    } else {
        return Err(Error::InvalidMagic([magic[0], magic[1], magic[2], magic[3]]));
    };

    if descriptor.mip_count == 0 {
        return Err(Error::NoMips);
    }
    if descriptor.mip_count > MAX_MIP_LEVELS {
        return Err(Error::InvalidHeader(format!(
            "{} mip levels declared, at most {MAX_MIP_LEVELS} are possible",
            descriptor.mip_count
        )));
    }
    if descriptor.width == 0 || descriptor.height == 0 {
        return Err(Error::ZeroDimensions {
            width: descriptor.width,
            height: descriptor.height,
        });
    }
    if descriptor.is_cubemap() && descriptor.is_volume() {
        return Err(Error::InvalidHeader("texture is both a cubemap and a volume".into()));
    }

    debug!(
        "{} {} {}x{}x{}, {} mips, {} layers, {:?}",
        descriptor.container,
        descriptor.format,
        descriptor.width,
        descriptor.height,
        descriptor.depth,
        descriptor.mip_count,
        descriptor.layer_count,
        descriptor.flags
    );

    Ok(descriptor)
}

/// Check that the format is decodable and that `data` holds every
/// subresource the header declares.
pub fn validate(descriptor: &TextureDescriptor, data: &[u8]) -> Result<&'static FormatInfo> {
    let info = format::lookup(descriptor.format)?;
    let needed = required_len(descriptor)?;
    if needed > data.len() {
        return Err(Error::Truncated(texel_common::Error::UnexpectedEof {
            needed,
            available: data.len(),
        }));
    }
    Ok(info)
}

/// Bytes needed to hold the header and every declared subresource.
pub(crate) fn required_len(descriptor: &TextureDescriptor) -> Result<usize> {
    let info = format::lookup(descriptor.format)?;
    Layout::new(descriptor, info)
        .total_len()
        .ok_or_else(|| oversized(descriptor))
}

/// Bytes of one KTX mip level, without its `imageSize` prefix.
#[cfg(test)]
pub(crate) fn ktx_level_len(descriptor: &TextureDescriptor, mip: u32) -> Result<usize> {
    let info = format::lookup(descriptor.format)?;
    Layout::new(descriptor, info)
        .ktx_level_len(mip)
        .ok_or_else(|| oversized(descriptor))
}

/// Find the bytes of one subresource.
///
/// Returns an empty [`Subresource`] when the mip level or depth slice has no
/// pixels. Indices beyond the declared layer, face or mip counts are errors.
pub fn locate_subresource(
    descriptor: &TextureDescriptor,
    data: &[u8],
    layer: u32,
    face: u32,
    mip: u32,
) -> Result<Subresource> {
    if layer >= descriptor.layer_count || face >= descriptor.face_count() || mip >= descriptor.mip_count {
        return Err(Error::InvalidHeader(format!(
            "subresource (layer {layer}, face {face}, mip {mip}) is out of range"
        )));
    }

    let info = format::lookup(descriptor.format)?;
    let sub = Layout::new(descriptor, info)
        .subresource(layer, face, mip)
        .ok_or_else(|| oversized(descriptor))?;
    if !sub.is_empty() {
        sub.bytes(data)?;
    }
    Ok(sub)
}

fn oversized(d: &TextureDescriptor) -> Error {
    Error::InvalidHeader(format!(
        "{}x{}x{} with {} layers and {} mips does not fit in memory",
        d.width, d.height, d.depth, d.layer_count, d.mip_count
    ))
}

/// Byte layout of all subresources of one texture.
///
/// Every size is computed with checked arithmetic; `None` means the header
/// declares more bytes than `usize` can address.
struct Layout<'a> {
    descriptor: &'a TextureDescriptor,
    info: &'static FormatInfo,
}

impl<'a> Layout<'a> {
    fn new(descriptor: &'a TextureDescriptor, info: &'static FormatInfo) -> Self {
        Self { descriptor, info }
    }

    /// Faces stored per layer: cube faces, or 1 (volume slices live inside a mip).
    fn stored_faces(&self) -> usize {
        if self.descriptor.is_cubemap() {
            6
        } else {
            1
        }
    }

    fn row_pitch(&self, width: u32) -> Option<usize> {
        let tight = self.info.row_bytes(width as usize)?;
        match self.descriptor.container {
            ContainerKind::Ktx if self.info.block_step == 1 => align4(tight),
            _ => Some(tight),
        }
    }

    /// Bytes of one 2D slice of a mip level.
    fn slice_len(&self, mip: u32) -> Option<usize> {
        let (w, h, _) = self.descriptor.mip_extent(mip);
        if w == 0 {
            return Some(0);
        }
        let (_, rows) = self.info.units(w as usize, h as usize);
        self.row_pitch(w)?.checked_mul(rows)
    }

    /// Bytes of a whole mip level of one face, all depth slices included.
    fn face_mip_len(&self, mip: u32) -> Option<usize> {
        let (_, _, d) = self.descriptor.mip_extent(mip);
        self.slice_len(mip)?.checked_mul(d as usize)
    }

    fn images_per_level(&self) -> Option<usize> {
        (self.descriptor.layer_count as usize).checked_mul(self.stored_faces())
    }

    /// Stride between the images of one KTX level.
    fn ktx_image_len(&self, mip: u32) -> Option<usize> {
        let face = self.face_mip_len(mip)?;
        if self.descriptor.is_cubemap() && self.descriptor.layer_count == 1 {
            align4(face)
        } else {
            Some(face)
        }
    }

    /// Bytes of one KTX mip level, `imageSize` field excluded.
    fn ktx_level_len(&self, mip: u32) -> Option<usize> {
        align4(self.ktx_image_len(mip)?.checked_mul(self.images_per_level()?)?)
    }

    /// Bytes of the KTX levels before `mip`, `imageSize` fields included.
    fn ktx_levels_before(&self, mip: u32) -> Option<usize> {
        (0..mip).try_fold(0usize, |acc, m| acc.checked_add(self.ktx_level_len(m)?)?.checked_add(4))
    }

    /// Bytes of the DDS mip levels before `mip` of one image.
    fn dds_levels_before(&self, mip: u32) -> Option<usize> {
        (0..mip).try_fold(0usize, |acc, m| acc.checked_add(self.face_mip_len(m)?))
    }

    fn total_len(&self) -> Option<usize> {
        let d = self.descriptor;
        let pixels = match d.container {
            ContainerKind::Dds => self
                .images_per_level()?
                .checked_mul(self.dds_levels_before(d.mip_count)?)?,
            ContainerKind::Ktx => self.ktx_levels_before(d.mip_count)?,
        };
        d.data_offset.checked_add(pixels)
    }

    fn subresource(&self, layer: u32, face: u32, mip: u32) -> Option<Subresource> {
        let d = self.descriptor;
        let (w, h, depth) = d.mip_extent(mip);
        if w == 0 || (d.is_volume() && face >= depth) {
            return Some(Subresource::default());
        }

        // cube faces are stored images; volume slices sit inside one image
        let (image, slice) = if d.is_cubemap() {
            ((layer as usize).checked_mul(6)?.checked_add(face as usize)?, 0)
        } else {
            (layer as usize, face as usize)
        };

        let slice_len = self.slice_len(mip)?;
        let in_image = slice.checked_mul(slice_len)?;
        let offset = match d.container {
            ContainerKind::Dds => image
                .checked_mul(self.dds_levels_before(d.mip_count)?)?
                .checked_add(self.dds_levels_before(mip)?)?
                .checked_add(in_image)?,
            ContainerKind::Ktx => image
                .checked_mul(self.ktx_image_len(mip)?)?
                .checked_add(self.ktx_levels_before(mip)?)?
                .checked_add(4)?
                .checked_add(in_image)?,
        };

        Some(Subresource {
            offset: d.data_offset.checked_add(offset)?,
            len: slice_len,
            width: w,
            height: h,
            row_pitch: self.row_pitch(w)?,
        })
    }
}

#[inline]
fn align4(v: usize) -> Option<usize> {
    Some(v.checked_add(3)? & !3)
}
