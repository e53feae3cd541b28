// image-compressor/src/processors/sources.rs
use crate::core::backend::{FetchedSource, SourceFetcher};
use crate::core::{CompressError, Result, DEFAULT_MAX_DOWNLOAD_BYTES};
use crate::utils::format_from_extension;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::io::Read;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

/// Fetches `http(s)://` sources with a blocking client. The client is built
/// on first use. Bodies larger than `max_bytes` are refused.
#[derive(Debug)]
pub struct HttpFetcher {
    timeout: Duration,
    max_bytes: u64,
    client: OnceLock<Client>,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            max_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
            client: OnceLock::new(),
        }
    }

    pub fn with_max_bytes(mut self, max_bytes: u64) -> Self {
        self.max_bytes = max_bytes;
        self
    }

    fn client(&self) -> Result<&Client> {
        if let Some(client) = self.client.get() {
            return Ok(client);
        }

        let client = Client::builder()
            .timeout(self.timeout)
            .build()
            .map_err(|e| CompressError::ProcessingError(format!("Failed to build HTTP client: {}", e)))?;

        Ok(self.client.get_or_init(|| client))
    }
}

impl SourceFetcher for HttpFetcher {
    fn fetch(&self, uri: &str) -> Result<FetchedSource> {
        let unavailable = |reason: String| CompressError::SourceUnavailable {
            uri: uri.to_string(),
            reason,
        };

        let response = self
            .client()?
            .get(uri)
            .send()
            .map_err(|e| unavailable(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(CompressError::SourceNotFound(uri.to_string()));
        }
        if !status.is_success() {
            return Err(unavailable(format!("HTTP {}", status)));
        }

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let too_large = || unavailable(format!("body exceeds {} bytes", self.max_bytes));
        if response.content_length().is_some_and(|len| len > self.max_bytes) {
            return Err(too_large());
        }

        // Content-Length can be absent or wrong; cap the read itself too.
        let mut bytes = Vec::new();
        response
            .take(self.max_bytes.saturating_add(1))
            .read_to_end(&mut bytes)
            .map_err(|e| unavailable(e.to_string()))?;
        if bytes.len() as u64 > self.max_bytes {
            return Err(too_large());
        }

        Ok(FetchedSource { bytes, mime_type })
    }
}

/// Serves content handles and photo-library identifiers from files under a
/// root directory.
///
/// `content://media/images/7.png` maps to `<root>/media/images/7.png` and
/// `ph://<asset-id>` to `<root>/<asset-id>`. A key without an extension also
/// matches a file in the same directory whose stem equals the last segment.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn locate(&self, uri: &str) -> Result<PathBuf> {
        let key = uri.split_once("://").map(|(_, rest)| rest).unwrap_or(uri);
        let relative = Path::new(key.trim_start_matches('/'));

        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(CompressError::SourceUnavailable {
                uri: uri.to_string(),
                reason: "handle escapes the asset directory".to_string(),
            });
        }

        let candidate = self.root.join(relative);
        if candidate.is_file() {
            return Ok(candidate);
        }

        if relative.extension().is_none() {
            if let Some(found) = find_by_stem(&candidate) {
                return Ok(found);
            }
        }

        Err(CompressError::SourceNotFound(uri.to_string()))
    }
}

fn find_by_stem(candidate: &Path) -> Option<PathBuf> {
    let parent = candidate.parent()?;
    let stem = candidate.file_name()?;

    let mut matches: Vec<PathBuf> = std::fs::read_dir(parent)
        .ok()?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && path.file_stem() == Some(stem))
        .collect();

    matches.sort();
    matches.into_iter().next()
}

impl SourceFetcher for DirectorySource {
    fn fetch(&self, uri: &str) -> Result<FetchedSource> {
        let path = self.locate(uri)?;
        log::debug!("Handle {} resolved to {}", uri, path.display());

        let bytes = std::fs::read(&path).map_err(|e| CompressError::SourceUnavailable {
            uri: uri.to_string(),
            reason: e.to_string(),
        })?;

        let mime_type = path
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(format_from_extension)
            .map(|format| format.to_mime_type().to_string());

        Ok(FetchedSource { bytes, mime_type })
    }
}
