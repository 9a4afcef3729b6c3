//! In-memory DDS and KTX writers for tests.

use zerocopy::IntoBytes;

use crate::container::{self, ContainerKind};
use crate::header::{
    DdsHeader, DdsHeaderDxt10, DdsPixelFormat, FourCC, KtxHeader, DDS_MAGIC, KTX_MAGIC,
};

/// How the pixel data after the header is produced.
#[derive(Clone, Default)]
enum Payload {
    /// Zero bytes, as many as the header requires.
    #[default]
    Zeros,
    /// A unit repeated until every subresource is covered.
    Fill(Vec<u8>),
    /// Exactly these bytes.
    Raw(Vec<u8>),
}

impl Payload {
    fn produce(&self, len: usize) -> Vec<u8> {
        match self {
            Payload::Zeros => vec![0; len],
            Payload::Fill(unit) => unit.iter().copied().cycle().take(len).collect(),
            Payload::Raw(bytes) => bytes.clone(),
        }
    }
}

pub struct DdsBuilder {
    header: DdsHeader,
    ext: Option<DdsHeaderDxt10>,
    payload: Payload,
}

impl DdsBuilder {
    fn base(width: u32, height: u32, pixel_format: DdsPixelFormat) -> Self {
        Self {
            header: DdsHeader {
                size: DdsHeader::SIZE,
                flags: 0x1007 | DdsHeader::FLAG_MIPMAPCOUNT,
                height,
                width,
                pitch_or_linear_size: 0,
                depth: 0,
                mipmap_count: 1,
                reserved1: [0; 11],
                pixel_format,
                caps: 0x1000,
                caps2: 0,
                caps3: 0,
                caps4: 0,
                reserved2: 0,
            },
            ext: None,
            payload: Payload::Zeros,
        }
    }

    fn pixel_format(flags: u32, four_cc: [u8; 4], bits: u32, masks: (u32, u32, u32, u32)) -> DdsPixelFormat {
        DdsPixelFormat {
            size: 32,
            flags,
            four_cc: FourCC(four_cc),
            rgb_bit_count: bits,
            r_bit_mask: masks.0,
            g_bit_mask: masks.1,
            b_bit_mask: masks.2,
            a_bit_mask: masks.3,
        }
    }

    /// Legacy header with a FourCC code.
    pub fn fourcc(four_cc: [u8; 4], width: u32, height: u32) -> Self {
        Self::base(width, height, Self::pixel_format(DdsPixelFormat::FOURCC, four_cc, 0, (0, 0, 0, 0)))
    }

    /// Legacy header with bit masks.
    pub fn masks(bits: u32, masks: (u32, u32, u32, u32), width: u32, height: u32) -> Self {
        let mut flags = DdsPixelFormat::RGB;
        if masks.3 != 0 {
            flags |= DdsPixelFormat::ALPHAPIXELS;
        }
        Self::base(width, height, Self::pixel_format(flags, [0; 4], bits, masks))
    }

    pub fn rgba8(width: u32, height: u32) -> Self {
        Self::masks(32, (0xff, 0xff00, 0xff_0000, 0xff00_0000), width, height)
    }

    /// DX10 header with a DXGI format code.
    pub fn dxgi(code: u32, width: u32, height: u32) -> Self {
        let mut builder = Self::fourcc(FourCC::DX10.0, width, height);
        builder.ext = Some(DdsHeaderDxt10 {
            dxgi_format: code,
            resource_dimension: 3,
            misc_flag: 0,
            array_size: 1,
            misc_flags2: 0,
        });
        builder
    }

    pub fn mips(mut self, count: u32) -> Self {
        self.header.mipmap_count = count;
        self
    }

    /// Set the mip count field and whether the header flags it as valid.
    pub fn raw_mip_field(mut self, count: u32, flagged: bool) -> Self {
        self.header.mipmap_count = count;
        let flags = self.header.flags;
        self.header.flags = if flagged {
            flags | DdsHeader::FLAG_MIPMAPCOUNT
        } else {
            flags & !DdsHeader::FLAG_MIPMAPCOUNT
        };
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.header.depth = depth;
        self.header.flags = self.header.flags | DdsHeader::FLAG_DEPTH;
        self.header.caps2 = self.header.caps2 | DdsHeader::CAPS2_VOLUME;
        self
    }

    pub fn cubemap(mut self) -> Self {
        self.header.caps2 = self.header.caps2 | DdsHeader::CAPS2_CUBEMAP | DdsHeader::CAPS2_CUBEMAP_ALLFACES;
        self
    }

    /// Overwrite the raw `caps2` field.
    pub fn caps2(mut self, bits: u32) -> Self {
        self.header.caps2 = bits;
        self
    }

    /// DX10 array size. Only meaningful on [`DdsBuilder::dxgi`] headers.
    pub fn array(mut self, layers: u32) -> Self {
        if let Some(ext) = &mut self.ext {
            ext.array_size = layers;
        }
        self
    }

    /// Set the DX10 alpha mode.
    pub fn alpha_mode(mut self, mode: u32) -> Self {
        if let Some(ext) = &mut self.ext {
            ext.misc_flags2 = mode;
        }
        self
    }

    pub fn alpha_pixels(mut self) -> Self {
        self.header.pixel_format.flags = self.header.pixel_format.flags | DdsPixelFormat::ALPHAPIXELS;
        self
    }

    /// Repeat `unit` over all pixel data.
    pub fn fill(mut self, unit: &[u8]) -> Self {
        self.payload = Payload::Fill(unit.to_vec());
        self
    }

    /// Use exactly `bytes` as pixel data.
    pub fn data(mut self, bytes: &[u8]) -> Self {
        self.payload = Payload::Raw(bytes.to_vec());
        self
    }

    /// Magic and headers, no pixel data.
    pub fn header_only(&self) -> Vec<u8> {
        let mut out = DDS_MAGIC.to_vec();
        out.extend_from_slice(self.header.as_bytes());
        if let Some(ext) = &self.ext {
            out.extend_from_slice(ext.as_bytes());
        }
        out
    }

    /// A complete file.
    pub fn build(&self) -> Vec<u8> {
        let mut out = self.header_only();
        let descriptor = container::parse_header(&out).expect("builder header must parse");
        assert_eq!(descriptor.container, ContainerKind::Dds);
        let total = container::required_len(&descriptor).expect("builder format must be decodable");
        out.extend(self.payload.produce(total - out.len()));
        out
    }
}

pub struct KtxBuilder {
    header: KtxHeader,
    key_value: Vec<u8>,
    payload: Payload,
}

impl KtxBuilder {
    pub fn new(internal_format: u32, width: u32, height: u32) -> Self {
        Self {
            header: KtxHeader {
                endianness: KtxHeader::ENDIAN_LITTLE,
                gl_type: 0,
                gl_type_size: 1,
                gl_format: 0,
                gl_internal_format: internal_format,
                gl_base_internal_format: 0,
                pixel_width: width,
                pixel_height: height,
                pixel_depth: 0,
                number_of_array_elements: 0,
                number_of_faces: 1,
                number_of_mipmap_levels: 1,
                bytes_of_key_value_data: 0,
            },
            key_value: Vec::new(),
            payload: Payload::Zeros,
        }
    }

    pub fn mips(mut self, count: u32) -> Self {
        self.header.number_of_mipmap_levels = count;
        self
    }

    pub fn array(mut self, layers: u32) -> Self {
        self.header.number_of_array_elements = layers;
        self
    }

    pub fn depth(mut self, depth: u32) -> Self {
        self.header.pixel_depth = depth;
        self
    }

    pub fn cubemap(mut self) -> Self {
        self.header.number_of_faces = 6;
        self
    }

    pub fn big_endian(mut self) -> Self {
        self.header.endianness = KtxHeader::ENDIAN_BIG;
        self
    }

    pub fn key_value(mut self, bytes: &[u8]) -> Self {
        self.key_value = bytes.to_vec();
        self.header.bytes_of_key_value_data = bytes.len() as u32;
        self
    }

    /// Repeat `unit` over the image data of every mip level.
    pub fn fill(mut self, unit: &[u8]) -> Self {
        self.payload = Payload::Fill(unit.to_vec());
        self
    }

    /// Use exactly `bytes` after the header; `imageSize` fields included.
    pub fn data(mut self, bytes: &[u8]) -> Self {
        self.payload = Payload::Raw(bytes.to_vec());
        self
    }

    pub fn header_only(&self) -> Vec<u8> {
        let mut out = KTX_MAGIC.to_vec();
        out.extend_from_slice(self.header.as_bytes());
        out.extend_from_slice(&self.key_value);
        out
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = self.header_only();
        if let Payload::Raw(bytes) = &self.payload {
            out.extend_from_slice(bytes);
            return out;
        }

        let descriptor = container::parse_header(&out).expect("builder header must parse");
        for mip in 0..descriptor.mip_count {
            let len = container::ktx_level_len(&descriptor, mip).expect("builder format must be decodable");
            // non-array cubemaps record the size of one face
            let image_size = if descriptor.is_cubemap() && !descriptor.is_array() {
                len / 6
            } else {
                len
            };
            out.extend_from_slice(&(image_size as u32).to_le_bytes());
            out.extend(self.payload.produce(len));
        }
        out
    }
}
