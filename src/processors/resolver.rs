// image-compressor/src/processors/resolver.rs
use crate::core::backend::{RawSource, SourceFetcher};
use crate::core::{CompressError, Result};
use crate::utils::{format_from_extension, format_from_mime};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Where a source image lives, decided once from its URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocator {
    /// Bare path or `file://` URI.
    File(PathBuf),
    /// `content://` handle, kept whole.
    Content(String),
    /// Asset identifier taken from a `ph://` URI.
    PhotoLibrary(String),
    /// `http://` or `https://` URL.
    Remote(String),
    /// `memory://` artifact handed out by a [`MemoryPersister`](super::MemoryPersister).
    Memory(String),
}

impl SourceLocator {
    pub fn parse(uri: &str) -> Result<Self> {
        let uri = uri.trim();
        if uri.is_empty() {
            return Err(CompressError::MissingUri);
        }

        let Some(scheme) = scheme_of(uri) else {
            return Ok(SourceLocator::File(PathBuf::from(uri)));
        };
        let rest = &uri[scheme.len() + 1..];

        match scheme.to_ascii_lowercase().as_str() {
            "file" => file_uri_path(uri, rest).map(SourceLocator::File),
            "content" => Ok(SourceLocator::Content(uri.to_string())),
            "ph" => {
                let asset_id = rest.strip_prefix("//").unwrap_or(rest);
                if asset_id.is_empty() {
                    return Err(CompressError::InvalidParameter(format!(
                        "Photo library uri has no asset id: {}",
                        uri
                    )));
                }
                Ok(SourceLocator::PhotoLibrary(asset_id.to_string()))
            }
            "http" | "https" => Ok(SourceLocator::Remote(uri.to_string())),
            "memory" => Ok(SourceLocator::Memory(uri.to_string())),
            other => Err(CompressError::UnsupportedScheme(other.to_string())),
        }
    }

    pub fn scheme(&self) -> &'static str {
        match self {
            SourceLocator::File(_) => "file",
            SourceLocator::Content(_) => "content",
            SourceLocator::PhotoLibrary(_) => "ph",
            SourceLocator::Remote(_) => "http",
            SourceLocator::Memory(_) => "memory",
        }
    }
}

/// Returns the URI scheme, if the string has one. Single letters are
/// Windows drive prefixes, not schemes.
fn scheme_of(uri: &str) -> Option<&str> {
    let (scheme, _) = uri.split_once(':')?;
    let mut chars = scheme.chars();
    let first = chars.next()?;

    if scheme.len() < 2 || !first.is_ascii_alphabetic() {
        return None;
    }

    chars
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
        .then_some(scheme)
}

fn file_uri_path(uri: &str, rest: &str) -> Result<PathBuf> {
    // Query and fragment never name part of the file.
    let rest = rest.split(['?', '#']).next().unwrap_or_default();

    let path = match rest.strip_prefix("//") {
        Some(authority_and_path) => {
            let (host, path) = match authority_and_path.find('/') {
                Some(index) => authority_and_path.split_at(index),
                None => (authority_and_path, ""),
            };
            if !host.is_empty() && !host.eq_ignore_ascii_case("localhost") {
                return Err(CompressError::InvalidParameter(format!(
                    "File uri must not name a remote host: {}",
                    uri
                )));
            }
            path
        }
        None => rest,
    };

    if path.is_empty() {
        return Err(CompressError::InvalidParameter(format!("Invalid file uri: {}", uri)));
    }

    let decoded = urlencoding::decode(path).map_err(|e| {
        CompressError::InvalidParameter(format!("Invalid file uri {}: {}", uri, e))
    })?;

    Ok(PathBuf::from(decoded.into_owned()))
}

/// Maps each [`SourceLocator`] variant to the strategy that reads it.
///
/// Plain files are always readable. Content handles, photo-library assets,
/// remote URLs and in-memory artifacts need a [`SourceFetcher`]; a locator whose fetcher was never
/// registered fails with [`CompressError::UnsupportedScheme`].
#[derive(Clone, Default)]
pub struct Resolver {
    content: Option<Arc<dyn SourceFetcher>>,
    photo_library: Option<Arc<dyn SourceFetcher>>,
    remote: Option<Arc<dyn SourceFetcher>>,
    memory: Option<Arc<dyn SourceFetcher>>,
}

impl Resolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_content_source(mut self, source: Arc<dyn SourceFetcher>) -> Self {
        self.content = Some(source);
        self
    }

    pub fn with_photo_library(mut self, source: Arc<dyn SourceFetcher>) -> Self {
        self.photo_library = Some(source);
        self
    }

    pub fn with_remote_source(mut self, source: Arc<dyn SourceFetcher>) -> Self {
        self.remote = Some(source);
        self
    }

    pub fn with_memory_store(mut self, store: Arc<dyn SourceFetcher>) -> Self {
        self.memory = Some(store);
        self
    }

    pub fn resolve(&self, locator: &SourceLocator) -> Result<RawSource> {
        match locator {
            SourceLocator::File(path) => self.read_file(path),
            SourceLocator::Content(uri) => self.fetch(self.content.as_deref(), locator, uri),
            SourceLocator::PhotoLibrary(asset_id) => {
                self.fetch(self.photo_library.as_deref(), locator, asset_id)
            }
            SourceLocator::Remote(uri) => self.fetch(self.remote.as_deref(), locator, uri),
            SourceLocator::Memory(uri) => self.fetch(self.memory.as_deref(), locator, uri),
        }
    }

    fn read_file(&self, path: &Path) -> Result<RawSource> {
        log::debug!("Reading image from: {}", path.display());

        if !path.exists() {
            return Err(CompressError::SourceNotFound(path.display().to_string()));
        }

        let bytes = std::fs::read(path).map_err(|e| CompressError::SourceUnavailable {
            uri: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let format_hint = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(format_from_extension);

        Ok(RawSource {
            bytes,
            format_hint,
            origin: path.display().to_string(),
        })
    }

    fn fetch(
        &self,
        fetcher: Option<&dyn SourceFetcher>,
        locator: &SourceLocator,
        key: &str,
    ) -> Result<RawSource> {
        let fetcher =
            fetcher.ok_or_else(|| CompressError::UnsupportedScheme(locator.scheme().to_string()))?;

        log::debug!("Fetching {} source: {}", locator.scheme(), key);

        let fetched = fetcher.fetch(key)?;
        let format_hint = fetched.mime_type.as_deref().and_then(format_from_mime);

        log::debug!(
            "Fetched {} bytes (mime: {})",
            fetched.bytes.len(),
            fetched.mime_type.as_deref().unwrap_or("unknown")
        );

        Ok(RawSource {
            bytes: fetched.bytes,
            format_hint,
            origin: key.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::backend::FetchedSource;
    use image::ImageFormat;
    use std::sync::Mutex;

    #[derive(Default)]
    struct StubFetcher {
        mime_type: Option<String>,
        requested: Mutex<Vec<String>>,
    }

    impl SourceFetcher for StubFetcher {
        fn fetch(&self, uri: &str) -> Result<FetchedSource> {
            self.requested.lock().unwrap().push(uri.to_string());
            Ok(FetchedSource {
                bytes: vec![1, 2, 3],
                mime_type: self.mime_type.clone(),
            })
        }
    }

    #[test]
    fn bare_path_is_file() {
        assert_eq!(
            SourceLocator::parse("/tmp/photo.jpg").unwrap(),
            SourceLocator::File(PathBuf::from("/tmp/photo.jpg"))
        );
        assert_eq!(
            SourceLocator::parse("relative/photo.png").unwrap(),
            SourceLocator::File(PathBuf::from("relative/photo.png"))
        );
    }

    #[test]
    fn drive_letter_is_not_a_scheme() {
        assert_eq!(
            SourceLocator::parse(r"C:\images\a.jpg").unwrap(),
            SourceLocator::File(PathBuf::from(r"C:\images\a.jpg"))
        );
    }

    #[test]
    fn file_uri_is_decoded() {
        assert_eq!(
            SourceLocator::parse("file:///tmp/my%20photo.jpg").unwrap(),
            SourceLocator::File(PathBuf::from("/tmp/my photo.jpg"))
        );
        assert_eq!(
            SourceLocator::parse("FILE://localhost/tmp/a.png").unwrap(),
            SourceLocator::File(PathBuf::from("/tmp/a.png"))
        );
        assert_eq!(
            SourceLocator::parse("file:/tmp/a.png").unwrap(),
            SourceLocator::File(PathBuf::from("/tmp/a.png"))
        );
    }

    #[test]
    fn file_uri_drops_query_and_fragment() {
        assert_eq!(
            SourceLocator::parse("file:///tmp/a.jpg?version=2").unwrap(),
            SourceLocator::File(PathBuf::from("/tmp/a.jpg"))
        );
        assert_eq!(
            SourceLocator::parse("file:///tmp/a.jpg#frag").unwrap(),
            SourceLocator::File(PathBuf::from("/tmp/a.jpg"))
        );
        assert_eq!(
            SourceLocator::parse("file:///tmp/a%3Fb.jpg?x=1#y").unwrap(),
            SourceLocator::File(PathBuf::from("/tmp/a?b.jpg"))
        );
    }

    #[test]
    fn file_uri_with_remote_host_is_rejected() {
        assert!(matches!(
            SourceLocator::parse("file://server/share/a.png"),
            Err(CompressError::InvalidParameter(_))
        ));
    }

    #[test]
    fn handle_schemes() {
        assert_eq!(
            SourceLocator::parse("content://media/external/images/12").unwrap(),
            SourceLocator::Content("content://media/external/images/12".to_string())
        );
        assert_eq!(
            SourceLocator::parse("ph://ABC-123/L0/001").unwrap(),
            SourceLocator::PhotoLibrary("ABC-123/L0/001".to_string())
        );
        assert_eq!(
            SourceLocator::parse("https://example.com/a.png").unwrap(),
            SourceLocator::Remote("https://example.com/a.png".to_string())
        );
    }

    #[test]
    fn unknown_scheme_is_unsupported() {
        match SourceLocator::parse("ftp://example.com/a.jpg") {
            Err(CompressError::UnsupportedScheme(scheme)) => assert_eq!(scheme, "ftp"),
            other => panic!("expected UnsupportedScheme, got {:?}", other),
        }
    }

    #[test]
    fn memory_uri_needs_a_store() {
        let locator = SourceLocator::parse("memory://compressed-1.jpg").unwrap();
        assert_eq!(locator, SourceLocator::Memory("memory://compressed-1.jpg".to_string()));
        assert!(matches!(
            Resolver::new().resolve(&locator),
            Err(CompressError::UnsupportedScheme(s)) if s == "memory"
        ));
    }

    #[test]
    fn blank_uri_is_missing() {
        assert!(matches!(SourceLocator::parse("   "), Err(CompressError::MissingUri)));
    }

    #[test]
    fn missing_file_is_not_found() {
        let resolver = Resolver::new();
        let locator = SourceLocator::File(PathBuf::from("/definitely/not/here.jpg"));
        assert!(matches!(
            resolver.resolve(&locator),
            Err(CompressError::SourceNotFound(_))
        ));
    }

    #[test]
    fn file_hint_comes_from_extension() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("picture.PNG");
        std::fs::write(&path, b"not really a png").unwrap();

        let raw = Resolver::new().resolve(&SourceLocator::File(path)).unwrap();
        assert_eq!(raw.format_hint, Some(ImageFormat::Png));
        assert_eq!(raw.bytes, b"not really a png");
    }

    #[test]
    fn unregistered_handle_is_unsupported() {
        let resolver = Resolver::new();
        let locator = SourceLocator::PhotoLibrary("asset".to_string());
        assert!(matches!(
            resolver.resolve(&locator),
            Err(CompressError::UnsupportedScheme(s)) if s == "ph"
        ));
    }

    #[test]
    fn fetched_hint_comes_from_mime() {
        let fetcher = Arc::new(StubFetcher {
            mime_type: Some("image/png; charset=binary".to_string()),
            ..Default::default()
        });
        let resolver = Resolver::new().with_content_source(fetcher.clone());

        let locator = SourceLocator::parse("content://media/42").unwrap();
        let raw = resolver.resolve(&locator).unwrap();

        assert_eq!(raw.format_hint, Some(ImageFormat::Png));
        assert_eq!(*fetcher.requested.lock().unwrap(), vec!["content://media/42"]);
    }

    #[test]
    fn photo_library_receives_asset_id() {
        let fetcher = Arc::new(StubFetcher::default());
        let resolver = Resolver::new().with_photo_library(fetcher.clone());

        let raw = resolver
            .resolve(&SourceLocator::parse("ph://XYZ").unwrap())
            .unwrap();

        assert_eq!(raw.format_hint, None);
        assert_eq!(*fetcher.requested.lock().unwrap(), vec!["XYZ"]);
    }
}
