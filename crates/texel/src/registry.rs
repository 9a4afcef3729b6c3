//! Ordered list of image loaders; the first one that recognizes an input wins.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use texel_bcn::{BcnLoader, DecodeOptions};
use texel_common::{BinaryReader, CancellationToken, ImageLoader, ImagePart, LoaderError};
use thiserror::Error;

/// Errors produced while dispatching an input to a loader.
#[derive(Debug, Error)]
pub enum Error {
    /// No registered loader recognized the input.
    #[error("no loader recognizes {}", path.display())]
    NoLoader { path: PathBuf },

    /// The chosen loader failed.
    #[error("{loader} loader failed on {}", path.display())]
    Load {
        loader: &'static str,
        path: PathBuf,
        #[source]
        source: LoaderError,
    },

    /// Reading the input file failed.
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// The loader's own error, when the failure came from a loader.
    pub fn loader_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Error::Load { source, .. } => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type for registry operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Explicitly constructed set of loaders, tried in registration order.
#[derive(Default)]
pub struct LoaderRegistry {
    loaders: Vec<Box<dyn ImageLoader>>,
}

impl LoaderRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding every loader this workspace ships.
    pub fn with_defaults() -> Self {
        Self::with_options(DecodeOptions::default())
    }

    /// Like [`LoaderRegistry::with_defaults`], with explicit texture options.
    pub fn with_options(options: DecodeOptions) -> Self {
        let mut registry = Self::new();
        registry.register(BcnLoader::with_options(options));
        registry
    }

    /// Append a loader; it is tried after the ones already registered.
    pub fn register(&mut self, loader: impl ImageLoader + 'static) -> &mut Self {
        self.loaders.push(Box::new(loader));
        self
    }

    /// Names of the registered loaders, in order.
    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.loaders.iter().map(|l| l.name())
    }

    /// The first loader whose sniff accepts the input at the reader position.
    pub fn find(&self, reader: &mut BinaryReader<'_>) -> Option<&dyn ImageLoader> {
        self.loaders
            .iter()
            .find(|loader| loader.can_load(reader))
            .map(|loader| &**loader)
    }

    /// Sniff `data` and decode it with the first matching loader.
    pub fn load(
        &self,
        data: &[u8],
        path: &Path,
        channel_selector: &str,
        priority: i32,
        cancel: &CancellationToken,
    ) -> Result<Vec<ImagePart>> {
        let mut reader = BinaryReader::new(data);
        let loader = self.find(&mut reader).ok_or_else(|| Error::NoLoader {
            path: path.to_path_buf(),
        })?;

        debug!("{}: using {} loader", path.display(), loader.name());
        loader
            .load(data, path, channel_selector, priority, cancel)
            .map_err(|source| Error::Load {
                loader: loader.name(),
                path: path.to_path_buf(),
                source,
            })
    }

    /// Read a file and decode it.
    pub fn load_file(&self, path: impl AsRef<Path>, cancel: &CancellationToken) -> Result<Vec<ImagePart>> {
        let path = path.as_ref();
        let data = fs::read(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.load(&data, path, "", 0, cancel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use texel_common::make_channels;

    /// Accepts inputs starting with `magic` and counts its loads.
    struct MagicLoader {
        name: &'static str,
        magic: &'static [u8],
        loads: Arc<AtomicUsize>,
    }

    impl MagicLoader {
        fn new(name: &'static str, magic: &'static [u8]) -> Self {
            Self {
                name,
                magic,
                loads: Arc::default(),
            }
        }
    }

    impl ImageLoader for MagicLoader {
        fn name(&self) -> &'static str {
            self.name
        }

        fn can_load(&self, reader: &mut BinaryReader<'_>) -> bool {
            reader.starts_with(self.magic)
        }

        fn load(
            &self,
            _data: &[u8],
            _path: &Path,
            _channel_selector: &str,
            _priority: i32,
            _cancel: &CancellationToken,
        ) -> std::result::Result<Vec<ImagePart>, LoaderError> {
            self.loads.fetch_add(1, Ordering::SeqCst);
            let mut part = ImagePart::new(self.name);
            part.push_group("", make_channels("", 1, 1, 1));
            Ok(vec![part])
        }
    }

    /// Claims every input, then fails.
    struct BrokenLoader;

    impl ImageLoader for BrokenLoader {
        fn name(&self) -> &'static str {
            "BROKEN"
        }

        fn can_load(&self, _reader: &mut BinaryReader<'_>) -> bool {
            true
        }

        fn load(
            &self,
            _data: &[u8],
            _path: &Path,
            _channel_selector: &str,
            _priority: i32,
            _cancel: &CancellationToken,
        ) -> std::result::Result<Vec<ImagePart>, LoaderError> {
            Err("always fails".into())
        }
    }

    #[test]
    fn test_first_match_wins() {
        let first = MagicLoader::new("FIRST", b"AB");
        let second = MagicLoader::new("SECOND", b"A");
        let (first_loads, second_loads) = (first.loads.clone(), second.loads.clone());

        let mut registry = LoaderRegistry::new();
        registry.register(first).register(second);

        let parts = registry
            .load(b"ABC", Path::new("x"), "", 0, &CancellationToken::new())
            .unwrap();
        assert_eq!(parts[0].part_name, "FIRST");

        let parts = registry
            .load(b"AXX", Path::new("x"), "", 0, &CancellationToken::new())
            .unwrap();
        assert_eq!(parts[0].part_name, "SECOND");

        assert_eq!(first_loads.load(Ordering::SeqCst), 1);
        assert_eq!(second_loads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_find_leaves_reader_untouched() {
        let registry = LoaderRegistry::with_defaults();
        let mut reader = BinaryReader::new(b"DDS \x7c\x00\x00\x00");
        assert_eq!(registry.find(&mut reader).map(|l| l.name()), Some("BCN"));
        assert_eq!(reader.position(), 0);
    }

    #[test]
    fn test_no_loader() {
        let registry = LoaderRegistry::with_defaults();
        let err = registry
            .load(b"\x89PNG", Path::new("image.png"), "", 0, &CancellationToken::new())
            .unwrap_err();
        assert!(matches!(err, Error::NoLoader { .. }));
        assert_eq!(err.to_string(), "no loader recognizes image.png");
    }

    #[test]
    fn test_loader_errors_are_wrapped_unchanged() {
        let mut registry = LoaderRegistry::new();
        registry.register(BrokenLoader);

        let err = registry
            .load(b"anything", Path::new("a.bin"), "", 0, &CancellationToken::new())
            .unwrap_err();
        assert_eq!(err.loader_error().map(|e| e.to_string()).as_deref(), Some("always fails"));
    }

    #[test]
    fn test_bcn_errors_can_be_downcast() {
        let registry = LoaderRegistry::with_defaults();
        let err = registry
            .load(b"DDS truncated", Path::new("t.dds"), "", 0, &CancellationToken::new())
            .unwrap_err();

        let inner = err
            .loader_error()
            .and_then(|e| e.downcast_ref::<texel_bcn::Error>())
            .expect("BCN error");
        assert_eq!(inner.kind(), texel_bcn::ErrorKind::Parse);
    }

    #[test]
    fn test_default_loader_names() {
        assert_eq!(LoaderRegistry::with_defaults().names().collect::<Vec<_>>(), ["BCN"]);
        assert_eq!(LoaderRegistry::new().names().count(), 0);
    }
}
