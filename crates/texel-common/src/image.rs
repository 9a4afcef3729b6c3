//! Decoded image model shared by every loader.
//!
//! A loader returns one [`ImagePart`] per logical sub-image (for textures,
//! one per mip level). Each part owns its [`Channel`]s; channels that belong
//! to the same layer/face group carry the group label as a name prefix.

/// A single named plane of `f32` samples, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    name: String,
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl Channel {
    /// Allocate a zero-filled channel.
    pub fn new(name: impl Into<String>, width: usize, height: usize) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            data: vec![0.0; width * height],
        }
    }

    /// Channel name, including any group prefix (`"Layer 1.Face -Y.G"`).
    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The part of the name after the last `.` separator.
    pub fn short_name(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or(&self.name)
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Width and height as a pair.
    #[inline]
    pub fn size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    #[inline]
    pub fn data_mut(&mut self) -> &mut [f32] {
        &mut self.data
    }
}

/// Build the default channel set for `count` channels of one group.
///
/// Multi-channel layouts are named `R`, `G`, `B`, `A` and then by index;
/// a single channel is luminance, `L`. `prefix` is prepended verbatim.
pub fn make_channels(prefix: &str, count: usize, width: usize, height: usize) -> Vec<Channel> {
    const NAMES: [&str; 4] = ["R", "G", "B", "A"];

    if count == 1 {
        return vec![Channel::new(format!("{prefix}L"), width, height)];
    }

    (0..count)
        .map(|c| {
            let name = match NAMES.get(c) {
                Some(letter) => format!("{prefix}{letter}"),
                None => format!("{prefix}{c}"),
            };
            Channel::new(name, width, height)
        })
        .collect()
}

/// One sub-image produced by a loader.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImagePart {
    /// Display name of the part, e.g. `"Mip 2"`.
    pub part_name: String,
    /// Group labels in channel order; empty when the image has a single group.
    pub groups: Vec<String>,
    /// All channels of all groups, group after group.
    pub channels: Vec<Channel>,
    /// Whether color channels are already multiplied by alpha.
    pub has_premultiplied_alpha: bool,
}

impl ImagePart {
    pub fn new(part_name: impl Into<String>) -> Self {
        Self {
            part_name: part_name.into(),
            ..Self::default()
        }
    }

    /// Append a group of channels. An empty label marks the ungrouped case
    /// and is not recorded in [`ImagePart::groups`].
    pub fn push_group(&mut self, label: &str, channels: Vec<Channel>) {
        if !label.is_empty() {
            self.groups.push(label.to_owned());
        }
        self.channels.extend(channels);
    }

    /// Channels whose name starts with `label` followed by the separator.
    pub fn group_channels<'a>(&'a self, label: &'a str) -> impl Iterator<Item = &'a Channel> + 'a {
        self.channels.iter().filter(move |c| {
            c.name()
                .strip_prefix(label)
                .is_some_and(|rest| rest.starts_with('.'))
        })
    }

    /// Look up a channel by its full name.
    pub fn channel(&self, name: &str) -> Option<&Channel> {
        self.channels.iter().find(|c| c.name() == name)
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}
