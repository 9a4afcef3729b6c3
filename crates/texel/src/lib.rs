//! Texel - texture container decoding library.
//!
//! This crate provides a unified interface to the Texel crates and the
//! [`LoaderRegistry`] that dispatches an input to the first loader that
//! recognizes it.
//!
//! # Crates
//!
//! - [`texel_common`] - Common utilities (binary reading, image model, loader contract)
//! - [`texel_bcn`] - DDS/KTX parsing and BC1-BC7 / raw pixel decoding
//!
//! # Example
//!
//! ```no_run
//! use texel::prelude::*;
//!
//! let registry = LoaderRegistry::with_defaults();
//! let parts = registry.load_file("skybox.dds", &CancellationToken::new())?;
//! for part in &parts {
//!     println!("{}: {:?}", part.part_name, part.groups);
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod registry;

// Re-export all sub-crates
pub use texel_bcn as bcn;
pub use texel_common as common;

pub use registry::{Error, LoaderRegistry, Result};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::LoaderRegistry;
    pub use texel_bcn::{BcnLoader, Bc6hSignedness, DecodeOptions, LinearizePolicy, TextureDescriptor};
    pub use texel_common::{BinaryReader, CancellationToken, Channel, ImageLoader, ImagePart};
}

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
