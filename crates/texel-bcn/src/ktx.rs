//! KTX1 header parsing.
//!
//! Only little-endian files are accepted. Key/value metadata is skipped.

use texel_common::BinaryReader;

use crate::container::{ContainerKind, TextureDescriptor, TextureFlags};
use crate::format::{self, FormatTag};
use crate::header::{KtxHeader, KTX_MAGIC};
use crate::{Error, Result};

const GL_ALPHA: u32 = 0x1906;
const GL_RGBA: u32 = 0x1908;
const GL_LUMINANCE_ALPHA: u32 = 0x190A;

pub(crate) fn parse(reader: &mut BinaryReader<'_>) -> Result<TextureDescriptor> {
    reader.expect_magic(KTX_MAGIC)?;
    let header: KtxHeader = reader.read_struct()?;

    let endianness = header.endianness;
    match endianness {
        KtxHeader::ENDIAN_LITTLE => {}
        KtxHeader::ENDIAN_BIG => {
            return Err(Error::InvalidHeader("big-endian KTX files are not supported".into()));
        }
        other => {
            return Err(Error::InvalidHeader(format!("bad endianness marker {other:#010x}")));
        }
    }

    let (format, mut flags) = gl_format(header.gl_internal_format)?;

    let (faces, depth) = (header.number_of_faces, header.pixel_depth);
    match faces {
        1 => {}
        6 => flags |= TextureFlags::CUBEMAP,
        n => return Err(Error::InvalidHeader(format!("{n} faces, expected 1 or 6"))),
    }
    if depth > 0 {
        flags |= TextureFlags::VOLUME;
    }

    let base = header.gl_base_internal_format;
    let intrinsic_alpha = format::lookup(format).is_ok_and(|info| info.has_alpha);
    if intrinsic_alpha || matches!(base, GL_ALPHA | GL_RGBA | GL_LUMINANCE_ALPHA) {
        flags |= TextureFlags::ALPHA;
    }

    let kv_len = header.bytes_of_key_value_data as usize;
    reader.read_bytes(kv_len)?;

    Ok(TextureDescriptor {
        container: ContainerKind::Ktx,
        format,
        width: header.pixel_width,
        // 1D textures store a height of 0
        height: header.pixel_height.max(1),
        depth: depth.max(1),
        mip_count: header.number_of_mipmap_levels,
        layer_count: header.number_of_array_elements.max(1),
        flags,
        data_offset: reader.position(),
    })
}

/// Map a `glInternalFormat` value.
fn gl_format(code: u32) -> Result<(FormatTag, TextureFlags)> {
    let none = TextureFlags::empty();
    let srgb = TextureFlags::SRGB;
    let signed = TextureFlags::SIGNED;
    let alpha = TextureFlags::ALPHA;

    Ok(match code {
        // S3TC
        0x83F0 => (FormatTag::Bc1, none),
        0x83F1 => (FormatTag::Bc1, alpha),
        0x83F2 => (FormatTag::Bc2, none),
        0x83F3 => (FormatTag::Bc3, none),
        0x8C4C => (FormatTag::Bc1, srgb),
        0x8C4D => (FormatTag::Bc1, srgb | alpha),
        0x8C4E => (FormatTag::Bc2, srgb),
        0x8C4F => (FormatTag::Bc3, srgb),
        // RGTC
        0x8DBB => (FormatTag::Bc4, none),
        0x8DBC => (FormatTag::Bc4S, signed),
        0x8DBD => (FormatTag::Bc5, none),
        0x8DBE => (FormatTag::Bc5S, signed),
        // BPTC
        0x8E8C => (FormatTag::Bc7, none),
        0x8E8D => (FormatTag::Bc7, srgb),
        0x8E8E => (FormatTag::Bc6h, signed),
        0x8E8F => (FormatTag::Bc6h, none),
        // ETC / ASTC
        0x8D64 => (FormatTag::Etc1, none),
        0x9274 => (FormatTag::Etc2, none),
        0x9278 => (FormatTag::Etc2A, none),
        0x93B0 => (FormatTag::Astc4x4, none),
        // 8-bit
        0x8058 => (FormatTag::Rgba8, none),
        0x8C43 => (FormatTag::Rgba8, srgb),
        0x8051 => (FormatTag::Rgb8, none),
        0x8C41 => (FormatTag::Rgb8, srgb),
        0x822B => (FormatTag::Rg8, none),
        0x8229 => (FormatTag::R8, none),
        0x803C => (FormatTag::A8, none),
        0x8F94 => (FormatTag::R8S, signed),
        0x8F95 => (FormatTag::Rg8S, signed),
        0x8F97 => (FormatTag::Rgba8S, signed),
        0x93A1 => (FormatTag::Bgra8, none),
        // 16-bit
        0x822A => (FormatTag::R16, none),
        0x822C => (FormatTag::Rg16, none),
        0x805B => (FormatTag::Rgba16, none),
        0x8F98 => (FormatTag::R16S, signed),
        0x8F99 => (FormatTag::Rg16S, signed),
        0x8F9B => (FormatTag::Rgba16S, signed),
        0x822D => (FormatTag::R16F, none),
        0x822F => (FormatTag::Rg16F, none),
        0x881A => (FormatTag::Rgba16F, none),
        // 32-bit
        0x822E => (FormatTag::R32F, none),
        0x8814 => (FormatTag::Rgba32F, none),
        // packed
        0x8059 => (FormatTag::Rgb10A2, none),
        0x8C3A => (FormatTag::Rg11B10F, none),
        _ => return Err(Error::UnsupportedFormat(format!("GL {code:#06X}"))),
    })
}
