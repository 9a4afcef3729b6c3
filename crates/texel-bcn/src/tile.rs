//! Destination window that a single decode unit writes into.

/// Per-call knobs passed to every unit decoder.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecodeParams {
    /// Interpret BC6H blocks as signed.
    pub signed: bool,
}

/// A view of one 4x4 block (or one pixel) inside an interleaved scratch buffer.
///
/// Samples are stored pixel-interleaved, `channels` per pixel, `pitch`
/// samples per row. Writes to a channel index at or beyond `channels` are
/// dropped, so a decoder for a wider format can never spill into a
/// neighbouring pixel.
pub struct Tile<'a> {
    samples: &'a mut [f32],
    origin: usize,
    pitch: usize,
    channels: usize,
}

impl<'a> Tile<'a> {
    /// Window at pixel `(x, y)` of a scratch buffer `width` pixels wide.
    pub fn new(samples: &'a mut [f32], width: usize, channels: usize, x: usize, y: usize) -> Self {
        let pitch = width * channels;
        Self {
            samples,
            origin: y * pitch + x * channels,
            pitch,
            channels,
        }
    }

    /// Number of interleaved channels per pixel.
    #[inline]
    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Write one sample at tile-relative pixel `(x, y)`.
    #[inline]
    pub fn set(&mut self, x: usize, y: usize, channel: usize, value: f32) {
        if channel < self.channels {
            self.samples[self.origin + y * self.pitch + x * self.channels + channel] = value;
        }
    }

    /// Write the leading channels of one pixel.
    #[inline]
    pub fn set_pixel(&mut self, x: usize, y: usize, values: &[f32]) {
        for (c, &v) in values.iter().enumerate() {
            self.set(x, y, c, v);
        }
    }

    /// Write a 4x4 block of 8-bit samples laid out as `rows` of `stride` bytes,
    /// normalizing each to `[0, 1]`.
    pub fn put_block_u8(&mut self, block: &[u8], stride: usize) {
        let per_pixel = stride / 4;
        for y in 0..4 {
            for x in 0..4 {
                for c in 0..per_pixel {
                    let v = block[y * stride + x * per_pixel + c];
                    self.set(x, y, c, f32::from(v) / 255.0);
                }
            }
        }
    }

    /// Write a 4x4 block of float samples laid out as `rows` of `stride` floats.
    pub fn put_block_f32(&mut self, block: &[f32], stride: usize) {
        let per_pixel = stride / 4;
        for y in 0..4 {
            for x in 0..4 {
                let at = y * stride + x * per_pixel;
                self.set_pixel(x, y, &block[at..at + per_pixel]);
            }
        }
    }
}
