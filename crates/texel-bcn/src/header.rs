//! On-disk header structures for DDS and KTX1 containers.
//!
//! The structs are read straight from the input with zerocopy. All of them
//! are `packed`, so copy fields into locals before comparing them.

use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};

/// DDS file magic bytes ("DDS ").
pub const DDS_MAGIC: &[u8; 4] = b"DDS ";

/// KTX1 file identifier.
pub const KTX_MAGIC: &[u8; 12] = &[
    0xAB, b'K', b'T', b'X', b' ', b'1', b'1', 0xBB, b'\r', b'\n', 0x1A, b'\n',
];

/// DDS file header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsHeader {
    /// Header size (should be 124).
    pub size: u32,
    /// Header flags.
    pub flags: u32,
    /// Image height.
    pub height: u32,
    /// Image width.
    pub width: u32,
    /// Pitch or linear size.
    pub pitch_or_linear_size: u32,
    /// Depth (for volume textures).
    pub depth: u32,
    /// Number of mipmap levels.
    pub mipmap_count: u32,
    /// Reserved.
    pub reserved1: [u32; 11],
    /// Pixel format.
    pub pixel_format: DdsPixelFormat,
    /// Surface capabilities.
    pub caps: u32,
    /// Surface capabilities 2.
    pub caps2: u32,
    /// Surface capabilities 3.
    pub caps3: u32,
    /// Surface capabilities 4.
    pub caps4: u32,
    /// Reserved.
    pub reserved2: u32,
}

impl DdsHeader {
    /// Expected header size.
    pub const SIZE: u32 = 124;

    /// `mipmap_count` is valid.
    pub const FLAG_MIPMAPCOUNT: u32 = 0x0002_0000;
    /// `depth` is valid.
    pub const FLAG_DEPTH: u32 = 0x0080_0000;

    /// Cubemap surface.
    pub const CAPS2_CUBEMAP: u32 = 0x0000_0200;
    /// All six `CAPS2_CUBEMAP_*` face bits.
    pub const CAPS2_CUBEMAP_ALLFACES: u32 = 0x0000_FC00;
    /// Volume texture.
    pub const CAPS2_VOLUME: u32 = 0x0020_0000;

    /// Check if this is a DX10 extended header.
    pub fn is_dx10(&self) -> bool {
        self.pixel_format.four_cc == FourCC::DX10
    }
}

/// DDS pixel format.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsPixelFormat {
    /// Structure size (should be 32).
    pub size: u32,
    /// Pixel format flags.
    pub flags: u32,
    /// Four-character code for compression.
    pub four_cc: FourCC,
    /// Number of bits per pixel (for uncompressed).
    pub rgb_bit_count: u32,
    /// Red bit mask.
    pub r_bit_mask: u32,
    /// Green bit mask.
    pub g_bit_mask: u32,
    /// Blue bit mask.
    pub b_bit_mask: u32,
    /// Alpha bit mask.
    pub a_bit_mask: u32,
}

impl DdsPixelFormat {
    /// Alpha mask is valid.
    pub const ALPHAPIXELS: u32 = 0x0000_0001;
    /// Alpha-only surface.
    pub const ALPHA: u32 = 0x0000_0002;
    /// `four_cc` is valid.
    pub const FOURCC: u32 = 0x0000_0004;
    /// Uncompressed RGB data.
    pub const RGB: u32 = 0x0000_0040;
    /// Single-channel luminance data.
    pub const LUMINANCE: u32 = 0x0002_0000;
    /// Signed (bump map) data.
    pub const BUMPDUDV: u32 = 0x0008_0000;

    /// The bit masks as an `(r, g, b, a)` tuple.
    pub fn masks(&self) -> (u32, u32, u32, u32) {
        (self.r_bit_mask, self.g_bit_mask, self.b_bit_mask, self.a_bit_mask)
    }
}

/// Four-character code for compression type.
#[derive(Clone, Copy, PartialEq, Eq, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(transparent)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    /// DXT1 compression.
    pub const DXT1: Self = Self(*b"DXT1");
    /// DXT2 compression (premultiplied DXT3).
    pub const DXT2: Self = Self(*b"DXT2");
    /// DXT3 compression.
    pub const DXT3: Self = Self(*b"DXT3");
    /// DXT4 compression (premultiplied DXT5).
    pub const DXT4: Self = Self(*b"DXT4");
    /// DXT5 compression.
    pub const DXT5: Self = Self(*b"DXT5");
    /// DX10 extended header.
    pub const DX10: Self = Self(*b"DX10");
    /// ATI single-channel compression (BC4).
    pub const ATI1: Self = Self(*b"ATI1");
    /// ATI two-channel compression (BC5).
    pub const ATI2: Self = Self(*b"ATI2");
    /// BC4U compression.
    pub const BC4U: Self = Self(*b"BC4U");
    /// BC4S compression.
    pub const BC4S: Self = Self(*b"BC4S");
    /// BC5U compression.
    pub const BC5U: Self = Self(*b"BC5U");
    /// BC5S compression.
    pub const BC5S: Self = Self(*b"BC5S");
    /// ETC1 compression.
    pub const ETC1: Self = Self(*b"ETC1");

    /// Legacy D3DFMT codes stored as a little-endian integer in `four_cc`.
    pub fn d3d_format(self) -> u32 {
        u32::from_le_bytes(self.0)
    }
}

impl std::fmt::Debug for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "FourCC({self})")
    }
}

impl std::fmt::Display for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.iter().all(|b| b.is_ascii_graphic() || *b == b' ') {
            write!(f, "{}", String::from_utf8_lossy(&self.0))
        } else {
            write!(f, "D3DFMT {}", self.d3d_format())
        }
    }
}

/// DX10 extended header.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct DdsHeaderDxt10 {
    /// DXGI format.
    pub dxgi_format: u32,
    /// Resource dimension.
    pub resource_dimension: u32,
    /// Misc flags.
    pub misc_flag: u32,
    /// Array size.
    pub array_size: u32,
    /// Misc flags 2.
    pub misc_flags2: u32,
}

impl DdsHeaderDxt10 {
    /// `D3D10_RESOURCE_DIMENSION_TEXTURE3D`.
    pub const DIMENSION_TEXTURE3D: u32 = 4;
    /// `D3D10_RESOURCE_MISC_TEXTURECUBE`.
    pub const MISC_TEXTURECUBE: u32 = 0x4;
    /// Low bits of `misc_flags2` hold the alpha mode.
    pub const ALPHA_MODE_MASK: u32 = 0x7;
    /// `DDS_ALPHA_MODE_PREMULTIPLIED`.
    pub const ALPHA_MODE_PREMULTIPLIED: u32 = 2;
}

/// KTX1 header, following the 12-byte identifier.
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, Immutable, KnownLayout)]
#[repr(C, packed)]
pub struct KtxHeader {
    /// Endianness marker, `0x04030201` when the file matches the reader.
    pub endianness: u32,
    /// GL data type, 0 for compressed formats.
    pub gl_type: u32,
    /// Size of one `gl_type` element.
    pub gl_type_size: u32,
    /// GL pixel format, 0 for compressed formats.
    pub gl_format: u32,
    /// GL sized internal format.
    pub gl_internal_format: u32,
    /// GL base internal format.
    pub gl_base_internal_format: u32,
    /// Width in pixels.
    pub pixel_width: u32,
    /// Height in pixels, 0 for 1D textures.
    pub pixel_height: u32,
    /// Depth in pixels, 0 unless this is a 3D texture.
    pub pixel_depth: u32,
    /// Array elements, 0 unless this is an array texture.
    pub number_of_array_elements: u32,
    /// 6 for cubemaps, 1 otherwise.
    pub number_of_faces: u32,
    /// Mip levels stored in the file.
    pub number_of_mipmap_levels: u32,
    /// Bytes of key/value metadata following the header.
    pub bytes_of_key_value_data: u32,
}

impl KtxHeader {
    /// Endianness marker of a little-endian file.
    pub const ENDIAN_LITTLE: u32 = 0x0403_0201;
    /// Endianness marker of a byte-swapped file.
    pub const ENDIAN_BIG: u32 = 0x0102_0304;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_sizes() {
        assert_eq!(std::mem::size_of::<DdsHeader>(), DdsHeader::SIZE as usize);
        assert_eq!(std::mem::size_of::<DdsPixelFormat>(), 32);
        assert_eq!(std::mem::size_of::<DdsHeaderDxt10>(), 20);
        assert_eq!(KTX_MAGIC.len() + std::mem::size_of::<KtxHeader>(), 64);
    }

    #[test]
    fn test_fourcc_display() {
        assert_eq!(FourCC::DXT5.to_string(), "DXT5");
        assert_eq!(FourCC(113u32.to_le_bytes()).to_string(), "D3DFMT 113");
    }
}
