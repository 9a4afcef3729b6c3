//! Common utilities for Texel.
//!
//! This crate provides foundational types used across all Texel crates:
//!
//! - [`BinaryReader`] - Zero-copy binary reading from byte slices
//! - [`Channel`] and [`ImagePart`] - The decoded image model
//! - [`ImageLoader`] - The contract implemented by format loaders
//! - [`CancellationToken`] - Cooperative cancellation for running loads

mod error;
mod image;
mod loader;
mod reader;

pub use error::{Error, Result};
pub use image::{make_channels, Channel, ImagePart};
pub use loader::{CancellationToken, ImageLoader, LoaderError};
pub use reader::BinaryReader;

/// Re-export zerocopy traits for convenience
pub use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout};
