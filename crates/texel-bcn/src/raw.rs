//! Uncompressed pixel decoders.
//!
//! Each decoder reads one source pixel and writes its channels in RGBA
//! order, normalized the same way for every layout of a given bit depth.

use byteorder::{ByteOrder, LittleEndian};
use half::f16;

use crate::tile::{DecodeParams, Tile};

/// Divisor for signed 16-bit normalized channels.
pub const SNORM16_SCALE: f32 = 32767.0;

/// `N` unsigned 8-bit channels.
pub(crate) fn unorm8<const N: usize>(src: &[u8], tile: &mut Tile<'_>, _: DecodeParams) {
    for (c, &v) in src[..N].iter().enumerate() {
        tile.set(0, 0, c, f32::from(v) / 255.0);
    }
}

/// Byte-swapped RGBA.
pub(crate) fn bgra8(src: &[u8], tile: &mut Tile<'_>, _: DecodeParams) {
    let [b, g, r, a] = [src[0], src[1], src[2], src[3]];
    tile.set_pixel(
        0,
        0,
        &[r, g, b, a].map(|v| f32::from(v) / 255.0),
    );
}

/// Byte-swapped RGB with an unused fourth byte; alpha reads as opaque.
pub(crate) fn bgrx8(src: &[u8], tile: &mut Tile<'_>, _: DecodeParams) {
    let [b, g, r] = [src[0], src[1], src[2]];
    let [r, g, b] = [r, g, b].map(|v| f32::from(v) / 255.0);
    tile.set_pixel(0, 0, &[r, g, b, 1.0]);
}

/// `N` signed 8-bit channels, scaled by 1/255 like their unsigned variants.
pub(crate) fn snorm8<const N: usize>(src: &[u8], tile: &mut Tile<'_>, _: DecodeParams) {
    for (c, &v) in src[..N].iter().enumerate() {
        tile.set(0, 0, c, f32::from(v as i8) / 255.0);
    }
}

/// `N` unsigned 16-bit channels.
pub(crate) fn unorm16<const N: usize>(src: &[u8], tile: &mut Tile<'_>, _: DecodeParams) {
    for c in 0..N {
        let v = LittleEndian::read_u16(&src[2 * c..]);
        tile.set(0, 0, c, f32::from(v) / 65535.0);
    }
}

/// `N` signed 16-bit channels.
pub(crate) fn snorm16<const N: usize>(src: &[u8], tile: &mut Tile<'_>, _: DecodeParams) {
    for c in 0..N {
        let v = LittleEndian::read_i16(&src[2 * c..]);
        tile.set(0, 0, c, f32::from(v) / SNORM16_SCALE);
    }
}

/// `N` half-float channels, widened without rescaling.
pub(crate) fn float16<const N: usize>(src: &[u8], tile: &mut Tile<'_>, _: DecodeParams) {
    for c in 0..N {
        let bits = LittleEndian::read_u16(&src[2 * c..]);
        tile.set(0, 0, c, f16::from_bits(bits).to_f32());
    }
}

/// `N` single-precision channels, copied as is.
pub(crate) fn float32<const N: usize>(src: &[u8], tile: &mut Tile<'_>, _: DecodeParams) {
    for c in 0..N {
        tile.set(0, 0, c, LittleEndian::read_f32(&src[4 * c..]));
    }
}
