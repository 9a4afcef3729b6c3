//! BC1-BC7 block decoders.
//!
//! Every decoder consumes exactly one block and writes a full 4x4 tile.
//! All seven formats go through `bcdec_rs`: the unorm formats as 8-bit
//! samples, the signed BC4/BC5 variants and BC6H straight to float.

use crate::tile::{DecodeParams, Tile};

/// Bytes per BC1 / BC4 block.
pub const BC1_BLOCK_SIZE: usize = 8;
/// Bytes per BC2 / BC3 / BC5 / BC6H / BC7 block.
pub const BC2_BLOCK_SIZE: usize = 16;

/// Output pitch of the RGBA8 decoders, in bytes.
const RGBA8_PITCH: usize = 4 * 4;

/// BC1: 565 color endpoints, 2-bit indices, optional 1-bit alpha.
pub(crate) fn bc1(src: &[u8], tile: &mut Tile<'_>, _: DecodeParams) {
    let mut decoded = [0u8; 4 * RGBA8_PITCH];
    bcdec_rs::bc1(&src[..BC1_BLOCK_SIZE], &mut decoded, RGBA8_PITCH);
    tile.put_block_u8(&decoded, RGBA8_PITCH);
}

/// BC2: explicit 4-bit alpha followed by an opaque color block.
pub(crate) fn bc2(src: &[u8], tile: &mut Tile<'_>, _: DecodeParams) {
    let mut decoded = [0u8; 4 * RGBA8_PITCH];
    bcdec_rs::bc2(&src[..BC2_BLOCK_SIZE], &mut decoded, RGBA8_PITCH);
    tile.put_block_u8(&decoded, RGBA8_PITCH);
}

/// BC3: interpolated alpha followed by an opaque color block.
pub(crate) fn bc3(src: &[u8], tile: &mut Tile<'_>, _: DecodeParams) {
    let mut decoded = [0u8; 4 * RGBA8_PITCH];
    bcdec_rs::bc3(&src[..BC2_BLOCK_SIZE], &mut decoded, RGBA8_PITCH);
    tile.put_block_u8(&decoded, RGBA8_PITCH);
}

/// BC4: a single interpolated channel.
pub(crate) fn bc4(src: &[u8], tile: &mut Tile<'_>, _: DecodeParams) {
    const PITCH: usize = 4;
    let mut decoded = [0u8; 4 * PITCH];
    bcdec_rs::bc4(&src[..BC1_BLOCK_SIZE], &mut decoded, PITCH, false);
    tile.put_block_u8(&decoded, PITCH);
}

/// BC4 signed: one channel in `[-1, 1]`.
pub(crate) fn bc4s(src: &[u8], tile: &mut Tile<'_>, _: DecodeParams) {
    const PITCH: usize = 4;
    let mut decoded = [0f32; 4 * PITCH];
    bcdec_rs::bc4_float(&src[..BC1_BLOCK_SIZE], &mut decoded, PITCH, true);
    tile.put_block_f32(&decoded, PITCH);
}

/// BC5: two independent interpolated channels.
pub(crate) fn bc5(src: &[u8], tile: &mut Tile<'_>, _: DecodeParams) {
    const PITCH: usize = 4 * 2;
    let mut decoded = [0u8; 4 * PITCH];
    bcdec_rs::bc5(&src[..BC2_BLOCK_SIZE], &mut decoded, PITCH, false);
    tile.put_block_u8(&decoded, PITCH);
}

/// BC5 signed: two channels in `[-1, 1]`.
pub(crate) fn bc5s(src: &[u8], tile: &mut Tile<'_>, _: DecodeParams) {
    const PITCH: usize = 4 * 2;
    let mut decoded = [0f32; 4 * PITCH];
    bcdec_rs::bc5_float(&src[..BC2_BLOCK_SIZE], &mut decoded, PITCH, true);
    tile.put_block_f32(&decoded, PITCH);
}

/// BC6H: HDR RGB, decoded straight to float.
pub(crate) fn bc6h(src: &[u8], tile: &mut Tile<'_>, params: DecodeParams) {
    const PITCH: usize = 4 * 3;
    let mut decoded = [0f32; 4 * PITCH];
    bcdec_rs::bc6h_float(&src[..BC2_BLOCK_SIZE], &mut decoded, PITCH, params.signed);
    tile.put_block_f32(&decoded, PITCH);
}

/// BC7: RGBA8 with per-block modes.
pub(crate) fn bc7(src: &[u8], tile: &mut Tile<'_>, _: DecodeParams) {
    let mut decoded = [0u8; 4 * RGBA8_PITCH];
    bcdec_rs::bc7(&src[..BC2_BLOCK_SIZE], &mut decoded, RGBA8_PITCH);
    tile.put_block_u8(&decoded, RGBA8_PITCH);
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    /// Decode one block into a standalone 4x4 buffer, returning 8-bit values.
    fn decode(
        f: fn(&[u8], &mut Tile<'_>, DecodeParams),
        block: &[u8],
        channels: usize,
    ) -> Vec<u8> {
        let mut buf = vec![0f32; 16 * channels];
        let mut tile = Tile::new(&mut buf, 4, channels, 0, 0);
        f(block, &mut tile, DecodeParams::default());
        buf.iter().map(|v| (v * 255.0).round() as u8).collect()
    }

    fn row(values: &[u8], channels: usize, y: usize) -> &[u8] {
        &values[y * 4 * channels..(y + 1) * 4 * channels]
    }

    #[test]
    fn test_bc1_four_color_mode() {
        // color0 = white, color1 = black, one index value per row
        let block = [0xff, 0xff, 0x00, 0x00, 0x00, 0x55, 0xaa, 0xff];
        let rgba = decode(bc1, &block, 4);

        assert_eq!(row(&rgba, 4, 0), [255u8, 255, 255, 255].repeat(4));
        assert_eq!(row(&rgba, 4, 1), [0u8, 0, 0, 255].repeat(4));
        assert_eq!(row(&rgba, 4, 2), [170u8, 170, 170, 255].repeat(4));
        assert_eq!(row(&rgba, 4, 3), [85u8, 85, 85, 255].repeat(4));
    }

    #[test]
    fn test_bc1_three_color_mode_with_transparent() {
        let idx = 3u32.to_le_bytes();
        let block = [0x00, 0x00, 0xff, 0xff, idx[0], idx[1], idx[2], idx[3]];
        let rgba = decode(bc1, &block, 4);

        assert_eq!(&rgba[0..4], &[0, 0, 0, 0]);
        assert_eq!(&rgba[4..8], &[0, 0, 0, 255]);
    }

    #[test]
    fn test_bc1_three_color_midpoint_rounds_up() {
        // color0 = black, color1 = pure red: midpoint (0 + 255 + 1) >> 1
        let idx = 2u32.to_le_bytes();
        let block = [0x00, 0x00, 0x00, 0xf8, idx[0], idx[1], idx[2], idx[3]];
        let rgba = decode(bc1, &block, 4);

        assert_eq!(&rgba[0..4], &[128, 0, 0, 255]);
    }

    #[test]
    fn test_bc2_explicit_alpha() {
        let block = [
            0xff, 0xff, 0x00, 0x00, 0x88, 0x88, 0x11, 0x11, // alpha nibbles
            0xff, 0xff, 0xff, 0xff, // white endpoints
            0x00, 0x00, 0x00, 0x00,
        ];
        let rgba = decode(bc2, &block, 4);

        assert_eq!(row(&rgba, 4, 0), [255u8, 255, 255, 255].repeat(4));
        assert_eq!(row(&rgba, 4, 1), [255u8, 255, 255, 0].repeat(4));
        assert_eq!(row(&rgba, 4, 2), [255u8, 255, 255, 136].repeat(4));
        assert_eq!(row(&rgba, 4, 3), [255u8, 255, 255, 17].repeat(4));
    }

    #[test]
    fn test_bc2_color_is_always_four_color() {
        // color0 < color1 would select BC1's transparent mode; BC2 ignores it.
        let idx = 3u32.to_le_bytes();
        let mut block = [0xffu8; 16];
        block[8..16].copy_from_slice(&[0x00, 0x00, 0xff, 0xff, idx[0], idx[1], idx[2], idx[3]]);
        let rgba = decode(bc2, &block, 4);

        assert_eq!(&rgba[0..4], &[170, 170, 170, 255]);
    }

    #[test]
    fn test_bc3_alpha_interpolation() {
        let block = [
            0xff, 0x00, // alpha0, alpha1
            0x00, 0x90, 0x24, 0x92, 0xf4, 0xff, // rows use indices 0, 1, 2, 7
            0xff, 0xff, 0x00, 0x00, // white / black
            0x00, 0x00, 0x00, 0x00,
        ];
        let rgba = decode(bc3, &block, 4);

        assert_eq!(&row(&rgba, 4, 0)[..4], &[255, 255, 255, 255]);
        assert_eq!(&row(&rgba, 4, 1)[..4], &[255, 255, 255, 0]);
        assert_eq!(&row(&rgba, 4, 2)[..4], &[255, 255, 255, 219]);
        assert_eq!(&row(&rgba, 4, 3)[..4], &[255, 255, 255, 36]);
    }

    #[rstest]
    #[case::six_value_mode_zero(6, 0)]
    #[case::six_value_mode_one(7, 255)]
    #[case::six_value_interpolated(2, 16)]
    fn test_bc4_six_value_palette(#[case] index: u64, #[case] expected: u8) {
        // a0 = 0 <= a1 = 80 selects the 6-value palette with explicit 0 and 255
        let bits = index * 0x0000_2492_4924_9249 & 0xFFFF_FFFF_FFFF;
        let mut block = [0u8; 8];
        block[1] = 80;
        block[2..8].copy_from_slice(&bits.to_le_bytes()[..6]);
        let r = decode(bc4, &block, 1);

        assert!(r.iter().all(|&v| v == expected), "{r:?}");
    }

    #[test]
    fn test_bc5_two_lanes() {
        let mut block = [0u8; 16];
        block[0] = 200; // red endpoints, index 0 everywhere
        block[8] = 10;
        block[9] = 20; // green: index 0 -> 10
        let rg = decode(bc5, &block, 2);

        for px in rg.chunks(2) {
            assert_eq!(px, [200, 10]);
        }
    }

    #[rstest]
    #[case::positive_endpoint(127, 1.0)]
    #[case::negative_endpoint(0x81, -1.0)]
    #[case::minus_128_clamps(0x80, -1.0)]
    fn test_bc4_signed_endpoint(#[case] a0: u8, #[case] expected: f32) {
        // index 0 everywhere selects endpoint a0
        let block = [a0, 0, 0, 0, 0, 0, 0, 0];
        let mut buf = vec![0f32; 16];
        let mut tile = Tile::new(&mut buf, 4, 1, 0, 0);
        bc4s(&block, &mut tile, DecodeParams::default());

        assert!(buf.iter().all(|&v| v == expected), "{buf:?}");
    }

    #[test]
    fn test_bc5_signed_lanes_are_independent() {
        let mut block = [0u8; 16];
        block[0] = 127; // red: +1.0
        block[8] = 0x81; // green: -1.0
        let mut buf = vec![0f32; 32];
        let mut tile = Tile::new(&mut buf, 4, 2, 0, 0);
        bc5s(&block, &mut tile, DecodeParams::default());

        for px in buf.chunks(2) {
            assert_eq!(px, [1.0, -1.0]);
        }
    }

    #[test]
    fn test_bc7_mode6_solid_white() {
        let mut block = [0xffu8; 16];
        block[0] = 0xC0; // mode 6, first endpoint bit set
        let rgba = decode(bc7, &block, 4);

        assert!(rgba.iter().all(|&v| v == 255));
    }

    #[test]
    fn test_bc7_reserved_mode_is_black() {
        let rgba = decode(bc7, &[0u8; 16], 4);
        assert!(rgba.iter().all(|&v| v == 0));
    }

    #[test]
    fn test_bc6h_zero_block_is_black() {
        let mut buf = vec![1f32; 48];
        let mut tile = Tile::new(&mut buf, 4, 3, 0, 0);
        bc6h(&[0u8; 16], &mut tile, DecodeParams { signed: true });

        assert!(buf.iter().all(|&v| v == 0.0));
    }
}
