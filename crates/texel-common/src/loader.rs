//! The contract every image loader implements.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::{BinaryReader, ImagePart};

/// Error returned through the [`ImageLoader`] trait object.
///
/// Loaders box their own error type so callers can downcast back to it.
pub type LoaderError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// A format loader that can be registered with a loader registry.
pub trait ImageLoader: Send + Sync {
    /// Diagnostic identifier, e.g. `"BCN"`.
    fn name(&self) -> &'static str;

    /// Check whether this loader recognizes the input.
    ///
    /// Implementations must leave `reader` at the position they received it
    /// at, whether or not they match.
    fn can_load(&self, reader: &mut BinaryReader<'_>) -> bool;

    /// Decode the whole input into image parts.
    ///
    /// `path` is only used for diagnostics. `channel_selector` and `priority`
    /// are scheduling and filtering hints; loaders may ignore them.
    fn load(
        &self,
        data: &[u8],
        path: &Path,
        channel_selector: &str,
        priority: i32,
        cancel: &CancellationToken,
    ) -> Result<Vec<ImagePart>, LoaderError>;
}

/// Cooperative cancellation flag shared between a caller and running loads.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation of every load holding this token.
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}
