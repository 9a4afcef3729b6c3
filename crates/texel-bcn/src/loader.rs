//! [`ImageLoader`] implementation for DDS and KTX textures.

use std::path::Path;

use log::debug;
use texel_common::{BinaryReader, CancellationToken, ImageLoader, ImagePart, LoaderError};

use crate::assemble::assemble;
use crate::container;
use crate::options::DecodeOptions;
use crate::Result;

/// Loader for block-compressed and raw DDS/KTX textures.
#[derive(Debug, Clone, Copy, Default)]
pub struct BcnLoader {
    options: DecodeOptions,
}

impl BcnLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: DecodeOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &DecodeOptions {
        &self.options
    }

    /// Decode a whole texture file held in memory.
    ///
    /// Either every mip level is decoded or an error is returned; there is no
    /// partial result.
    pub fn decode(&self, data: &[u8], cancel: &CancellationToken) -> Result<Vec<ImagePart>> {
        let descriptor = container::parse(data)?;
        assemble(&descriptor, data, &self.options, cancel)
    }
}

impl ImageLoader for BcnLoader {
    fn name(&self) -> &'static str {
        "BCN"
    }

    fn can_load(&self, reader: &mut BinaryReader<'_>) -> bool {
        container::is_texture(reader)
    }

    fn load(
        &self,
        data: &[u8],
        path: &Path,
        _channel_selector: &str,
        _priority: i32,
        cancel: &CancellationToken,
    ) -> std::result::Result<Vec<ImagePart>, LoaderError> {
        debug!("decoding {} as a DDS/KTX texture", path.display());
        Ok(self.decode(data, cancel)?)
    }
}
