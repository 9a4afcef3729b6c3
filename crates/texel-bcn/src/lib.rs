//! DDS and KTX1 texture decoding.
//!
//! Textures are decoded into the shared image model of `texel-common`:
//! one [`ImagePart`] per mip level, holding one group of `f32` channels per
//! array layer, cubemap face or volume slice.
//!
//! Supported pixel data:
//! - BC1-BC7 block compression (BC6H and BC7 through `bcdec_rs`)
//! - 8-bit unsigned/signed, 16-bit unsigned/signed, half and float layouts
//!
//! # Example
//!
//! ```no_run
//! use texel_bcn::BcnLoader;
//! use texel_common::CancellationToken;
//!
//! let data = std::fs::read("path/to/texture.dds")?;
//! let parts = BcnLoader::new().decode(&data, &CancellationToken::new())?;
//! for part in &parts {
//!     println!("{}: {} channels", part.part_name, part.channels.len());
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod assemble;
mod block;
mod color;
mod container;
mod dds;
mod error;
mod format;
mod header;
mod ktx;
mod loader;
mod options;
mod raw;
mod tile;

#[cfg(test)]
mod testutil;

pub use assemble::{assemble, group_label, FACE_NAMES};
pub use color::{to_linear, ColorNormalizer, ALPHA_CHANNEL};
pub use container::{
    is_texture, locate_subresource, parse, parse_header, validate, ContainerKind, Subresource,
    TextureDescriptor, TextureFlags, MAX_MIP_LEVELS,
};
pub use error::{Error, ErrorKind, Result};
pub use format::{lookup, supported, DecodeFn, FormatInfo, FormatTag};
pub use header::{DdsHeader, DdsHeaderDxt10, DdsPixelFormat, FourCC, KtxHeader, DDS_MAGIC, KTX_MAGIC};
pub use loader::BcnLoader;
pub use options::{Bc6hSignedness, DecodeOptions, LinearizePolicy};
pub use raw::SNORM16_SCALE;
pub use tile::{DecodeParams, Tile};

pub use texel_common::ImagePart;
