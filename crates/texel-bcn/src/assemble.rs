//! Turns a parsed texture into named image parts, one per mip level.

use log::{debug, warn};
use texel_common::{make_channels, CancellationToken, Channel, ImagePart};

use crate::color::ColorNormalizer;
use crate::container::{self, Subresource, TextureDescriptor, TextureFlags};
use crate::format::FormatInfo;
use crate::options::{Bc6hSignedness, DecodeOptions};
use crate::tile::{DecodeParams, Tile};
use crate::{Error, Result};

/// Cubemap face labels in storage order.
pub const FACE_NAMES: [&str; 6] = ["+X", "-X", "+Y", "-Y", "+Z", "-Z"];

/// Decode every subresource of `descriptor` into image parts.
///
/// Parts are ordered by mip level; inside a part, groups are ordered by layer
/// and then by face. Subresources without pixels are skipped, and a mip
/// level left without any group produces no part. `cancel` is polled before
/// each mip level.
pub fn assemble(
    descriptor: &TextureDescriptor,
    data: &[u8],
    options: &DecodeOptions,
    cancel: &CancellationToken,
) -> Result<Vec<ImagePart>> {
    let info = container::validate(descriptor, data)?;
    let normalizer = ColorNormalizer::new(descriptor, info, options);
    let params = DecodeParams {
        signed: match options.bc6h {
            Bc6hSignedness::AssumeSigned => true,
            Bc6hSignedness::FromContainer => descriptor.flags.contains(TextureFlags::SIGNED),
        },
    };

    let mut parts = Vec::new();
    for mip in 0..descriptor.mip_count {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        let mut part = ImagePart::new(format!("Mip {mip}"));
        part.has_premultiplied_alpha = normalizer.has_premultiplied_alpha();

        for layer in 0..descriptor.layer_count {
            for face in 0..descriptor.face_count() {
                let sub = container::locate_subresource(descriptor, data, layer, face, mip)?;
                if sub.is_empty() {
                    warn!("skipping empty subresource (mip {mip}, layer {layer}, face {face})");
                    continue;
                }

                let label = group_label(descriptor, layer, face);
                let prefix = if label.is_empty() {
                    String::new()
                } else {
                    format!("{label}.")
                };
                let channels = decode_subresource(info, &sub, data, &prefix, &normalizer, params)?;
                part.push_group(&label, channels);
            }
        }

        if part.is_empty() {
            warn!("mip {mip} has no pixels, dropping it");
            continue;
        }
        debug!("{}: {} groups, {} channels", part.part_name, part.groups.len(), part.channels.len());
        parts.push(part);
    }

    Ok(parts)
}

/// Label of the (layer, face) group, or `""` for plain 2D textures.
pub fn group_label(descriptor: &TextureDescriptor, layer: u32, face: u32) -> String {
    let mut label = Vec::with_capacity(2);
    if descriptor.is_array() {
        label.push(format!("Layer {layer}"));
    }
    if descriptor.is_cubemap() {
        let name = FACE_NAMES.get(face as usize).copied().unwrap_or("?");
        label.push(format!("Face {name}"));
    } else if descriptor.is_volume() {
        label.push(format!("Slice {face}"));
    }
    label.join(".")
}

fn decode_subresource(
    info: &FormatInfo,
    sub: &Subresource,
    data: &[u8],
    prefix: &str,
    normalizer: &ColorNormalizer,
    params: DecodeParams,
) -> Result<Vec<Channel>> {
    let src = sub.bytes(data)?;
    let step = info.block_step;
    let count = info.channel_count;
    let (width, height) = (sub.width as usize, sub.height as usize);

    // whole units, so edge blocks never write out of bounds
    let (units_x, units_y) = info.units(width, height);
    let scratch_width = units_x * step;
    let mut scratch = vec![0.0f32; scratch_width * units_y * step * count];

    for (uy, row) in src.chunks(sub.row_pitch).take(units_y).enumerate() {
        for (ux, unit) in row.chunks_exact(info.source_stride).take(units_x).enumerate() {
            let mut tile = Tile::new(&mut scratch, scratch_width, count, ux * step, uy * step);
            info.decode_unit(unit, &mut tile, params);
        }
    }

    let (out_width, out_height) = (width.max(step), height.max(step));
    let mut channels = make_channels(prefix, count, out_width, out_height);
    for (c, channel) in channels.iter_mut().enumerate() {
        let out = channel.data_mut();
        for y in 0..out_height {
            let samples = &scratch[y * scratch_width * count..][..out_width * count];
            let dst = &mut out[y * out_width..][..out_width];
            for (d, pixel) in dst.iter_mut().zip(samples.chunks_exact(count)) {
                *d = normalizer.apply(c, pixel[c]);
            }
        }
    }

    Ok(channels)
}
