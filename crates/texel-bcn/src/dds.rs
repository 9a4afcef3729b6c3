//! DDS header parsing.

use texel_common::BinaryReader;

use crate::container::{ContainerKind, TextureDescriptor, TextureFlags};
use crate::format::{self, FormatTag};
use crate::header::{DdsHeader, DdsHeaderDxt10, DdsPixelFormat, FourCC, DDS_MAGIC};
use crate::{Error, Result};

/// Parse a DDS header (and DX10 extension) at the reader position.
pub(crate) fn parse(reader: &mut BinaryReader<'_>) -> Result<TextureDescriptor> {
    reader.expect_magic(DDS_MAGIC)?;
    let header: DdsHeader = reader.read_struct()?;

    let size = header.size;
    if size != DdsHeader::SIZE {
        return Err(Error::InvalidHeader(format!(
            "header size is {size}, expected {}",
            DdsHeader::SIZE
        )));
    }
    let pf = header.pixel_format;
    let pf_size = pf.size;
    if pf_size != 32 {
        return Err(Error::InvalidHeader(format!("pixel format size is {pf_size}, expected 32")));
    }

    let ext = if header.is_dx10() {
        Some(reader.read_struct::<DdsHeaderDxt10>()?)
    } else {
        None
    };

    let (format, mut flags) = match &ext {
        Some(ext) => dxgi_format(ext.dxgi_format)?,
        None => legacy_format(&pf)?,
    };

    let header_flags = header.flags;
    let caps2 = header.caps2;

    let mip_count = if header_flags & DdsHeader::FLAG_MIPMAPCOUNT != 0 {
        header.mipmap_count
    } else {
        1
    };
    let depth = if header_flags & DdsHeader::FLAG_DEPTH != 0 {
        header.depth.max(1)
    } else {
        1
    };

    let mut layer_count = 1;
    if caps2 & DdsHeader::CAPS2_CUBEMAP != 0 {
        if caps2 & DdsHeader::CAPS2_CUBEMAP_ALLFACES != DdsHeader::CAPS2_CUBEMAP_ALLFACES {
            return Err(Error::InvalidHeader(format!(
                "partial cubemap (caps2 {caps2:#x}) is not supported"
            )));
        }
        flags |= TextureFlags::CUBEMAP;
    }
    if caps2 & DdsHeader::CAPS2_VOLUME != 0 || depth > 1 {
        flags |= TextureFlags::VOLUME;
    }
    if let Some(ext) = &ext {
        let (dimension, misc, misc2) = (ext.resource_dimension, ext.misc_flag, ext.misc_flags2);
        if misc & DdsHeaderDxt10::MISC_TEXTURECUBE != 0 {
            flags |= TextureFlags::CUBEMAP;
        }
        if dimension == DdsHeaderDxt10::DIMENSION_TEXTURE3D {
            flags |= TextureFlags::VOLUME;
        }
        if misc2 & DdsHeaderDxt10::ALPHA_MODE_MASK == DdsHeaderDxt10::ALPHA_MODE_PREMULTIPLIED {
            flags |= TextureFlags::PREMULTIPLIED_ALPHA;
        }
        layer_count = ext.array_size.max(1);
    }

    let pf_flags = pf.flags;
    let intrinsic_alpha = format::lookup(format).is_ok_and(|info| info.has_alpha);
    if pf_flags & DdsPixelFormat::ALPHAPIXELS != 0 || intrinsic_alpha {
        flags |= TextureFlags::ALPHA;
    }

    Ok(TextureDescriptor {
        container: ContainerKind::Dds,
        format,
        width: header.width,
        height: header.height,
        depth,
        mip_count,
        layer_count,
        flags,
        data_offset: reader.position(),
    })
}

/// Map a pre-DX10 pixel format block.
fn legacy_format(pf: &DdsPixelFormat) -> Result<(FormatTag, TextureFlags)> {
    let pf_flags = pf.flags;
    let none = TextureFlags::empty();

    if pf_flags & DdsPixelFormat::FOURCC != 0 {
        let four_cc = pf.four_cc;
        return Ok(match four_cc {
            FourCC::DXT1 => (FormatTag::Bc1, none),
            FourCC::DXT2 => (FormatTag::Bc2, TextureFlags::PREMULTIPLIED_ALPHA),
            FourCC::DXT3 => (FormatTag::Bc2, none),
            FourCC::DXT4 => (FormatTag::Bc3, TextureFlags::PREMULTIPLIED_ALPHA),
            FourCC::DXT5 => (FormatTag::Bc3, none),
            FourCC::ATI1 | FourCC::BC4U => (FormatTag::Bc4, none),
            FourCC::BC4S => (FormatTag::Bc4S, TextureFlags::SIGNED),
            FourCC::ATI2 | FourCC::BC5U => (FormatTag::Bc5, none),
            FourCC::BC5S => (FormatTag::Bc5S, TextureFlags::SIGNED),
            FourCC::ETC1 => (FormatTag::Etc1, none),
            other => match other.d3d_format() {
                36 => (FormatTag::Rgba16, none),
                110 => (FormatTag::Rgba16S, TextureFlags::SIGNED),
                111 => (FormatTag::R16F, none),
                112 => (FormatTag::Rg16F, none),
                113 => (FormatTag::Rgba16F, none),
                114 => (FormatTag::R32F, none),
                116 => (FormatTag::Rgba32F, none),
                _ => return Err(Error::UnsupportedFormat(other.to_string())),
            },
        });
    }

    let bits = pf.rgb_bit_count;
    let masks = pf.masks();

    if pf_flags & DdsPixelFormat::BUMPDUDV != 0 {
        let tag = match (bits, masks) {
            (16, (0xff, 0xff00, 0, 0)) => FormatTag::Rg8S,
            (32, (0xff, 0xff00, 0xff_0000, 0xff00_0000)) => FormatTag::Rgba8S,
            (32, (0xffff, 0xffff_0000, 0, 0)) => FormatTag::Rg16S,
            _ => return Err(unsupported_masks(bits, masks)),
        };
        return Ok((tag, TextureFlags::SIGNED));
    }

    if pf_flags & (DdsPixelFormat::RGB | DdsPixelFormat::LUMINANCE | DdsPixelFormat::ALPHA) == 0 {
        return Err(Error::InvalidHeader(
            "pixel format has no FOURCC, RGB, luminance or alpha flag".into(),
        ));
    }

    let tag = match (bits, masks) {
        (32, (0xff, 0xff00, 0xff_0000, 0xff00_0000)) => FormatTag::Rgba8,
        (32, (0xff_0000, 0xff00, 0xff, 0xff00_0000)) => FormatTag::Bgra8,
        (32, (0xff_0000, 0xff00, 0xff, 0)) => FormatTag::Bgrx8,
        (24, (0xff, 0xff00, 0xff_0000, 0)) => FormatTag::Rgb8,
        (16, (0xff, 0xff00, 0, 0)) => FormatTag::Rg8,
        (32, (0xffff, 0xffff_0000, 0, 0)) => FormatTag::Rg16,
        (16, (0xffff, 0, 0, 0)) => FormatTag::R16,
        (8, (0xff, 0, 0, 0)) => FormatTag::R8,
        (8, (0, 0, 0, 0xff)) => FormatTag::A8,
        _ => return Err(unsupported_masks(bits, masks)),
    };
    Ok((tag, none))
}

fn unsupported_masks(bits: u32, (r, g, b, a): (u32, u32, u32, u32)) -> Error {
    Error::UnsupportedFormat(format!("{bits}-bit masks {r:#x}/{g:#x}/{b:#x}/{a:#x}"))
}

/// Map a `DXGI_FORMAT` code from the DX10 extension.
fn dxgi_format(code: u32) -> Result<(FormatTag, TextureFlags)> {
    let none = TextureFlags::empty();
    let srgb = TextureFlags::SRGB;
    let signed = TextureFlags::SIGNED;

    Ok(match code {
        2 => (FormatTag::Rgba32F, none),
        10 => (FormatTag::Rgba16F, none),
        11 => (FormatTag::Rgba16, none),
        13 => (FormatTag::Rgba16S, signed),
        24 => (FormatTag::Rgb10A2, none),
        26 => (FormatTag::Rg11B10F, none),
        27 | 28 => (FormatTag::Rgba8, none),
        29 => (FormatTag::Rgba8, srgb),
        31 => (FormatTag::Rgba8S, signed),
        34 => (FormatTag::Rg16F, none),
        35 => (FormatTag::Rg16, none),
        37 => (FormatTag::Rg16S, signed),
        41 => (FormatTag::R32F, none),
        49 => (FormatTag::Rg8, none),
        51 => (FormatTag::Rg8S, signed),
        54 => (FormatTag::R16F, none),
        56 => (FormatTag::R16, none),
        58 => (FormatTag::R16S, signed),
        61 => (FormatTag::R8, none),
        63 => (FormatTag::R8S, signed),
        65 => (FormatTag::A8, none),
        70 | 71 => (FormatTag::Bc1, none),
        72 => (FormatTag::Bc1, srgb),
        73 | 74 => (FormatTag::Bc2, none),
        75 => (FormatTag::Bc2, srgb),
        76 | 77 => (FormatTag::Bc3, none),
        78 => (FormatTag::Bc3, srgb),
        79 | 80 => (FormatTag::Bc4, none),
        81 => (FormatTag::Bc4S, signed),
        82 | 83 => (FormatTag::Bc5, none),
        84 => (FormatTag::Bc5S, signed),
        87 | 90 => (FormatTag::Bgra8, none),
        91 => (FormatTag::Bgra8, srgb),
        88 | 92 => (FormatTag::Bgrx8, none),
        93 => (FormatTag::Bgrx8, srgb),
        94 | 95 => (FormatTag::Bc6h, none),
        96 => (FormatTag::Bc6h, signed),
        97 | 98 => (FormatTag::Bc7, none),
        99 => (FormatTag::Bc7, srgb),
        _ => return Err(Error::UnsupportedFormat(format!("DXGI format {code}"))),
    })
}
