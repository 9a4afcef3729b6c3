//! Conversion of decoded samples into the channel encoding handed to callers.

use crate::container::{TextureDescriptor, TextureFlags};
use crate::format::FormatInfo;
use crate::options::{DecodeOptions, LinearizePolicy};

/// Channel index that holds alpha in every RGBA-ordered layout.
pub const ALPHA_CHANNEL: usize = 3;

/// sRGB transfer function, inverted.
#[inline]
pub fn to_linear(v: f32) -> f32 {
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

/// Per-texture sample transform, fixed once the descriptor is known.
#[derive(Debug, Clone, Copy)]
pub struct ColorNormalizer {
    linearize: bool,
    force_opaque: bool,
    premultiplied: bool,
}

impl ColorNormalizer {
    pub fn new(descriptor: &TextureDescriptor, info: &FormatInfo, options: &DecodeOptions) -> Self {
        let linearize = match options.linearize {
            LinearizePolicy::Always => true,
            LinearizePolicy::RespectSrgbFlag => descriptor.is_srgb(),
        };
        Self {
            linearize,
            force_opaque: !descriptor.has_alpha() && info.channel_count > ALPHA_CHANNEL,
            premultiplied: descriptor.flags.contains(TextureFlags::PREMULTIPLIED_ALPHA),
        }
    }

    /// Transform one decoded sample of `channel`.
    #[inline]
    pub fn apply(&self, channel: usize, v: f32) -> f32 {
        if channel == ALPHA_CHANNEL {
            if self.force_opaque {
                1.0
            } else {
                v
            }
        } else if self.linearize {
            to_linear(v)
        } else {
            v
        }
    }

    #[inline]
    pub fn has_premultiplied_alpha(&self) -> bool {
        self.premultiplied
    }
}
