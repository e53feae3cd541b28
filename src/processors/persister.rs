// image-compressor/src/processors/persister.rs
use crate::core::backend::{FetchedSource, PersistedArtifact, Persister, SourceFetcher};
use crate::core::{CompressError, Result};
use crate::utils::{format_from_extension, path_to_file_uri};
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use uuid::Uuid;

const MEMORY_SCHEME: &str = "memory://";

fn artifact_name(extension: &str) -> String {
    format!("compressed-{}.{}", Uuid::new_v4(), extension)
}

/// Writes each artifact as `compressed-<uuid>.<ext>` inside a scratch
/// directory. Bytes are staged in a temp file in the same directory and
/// renamed into place, so readers never observe a partial file.
#[derive(Debug, Clone)]
pub struct TempDirPersister {
    dir: PathBuf,
}

impl TempDirPersister {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl Default for TempDirPersister {
    fn default() -> Self {
        Self::new(std::env::temp_dir())
    }
}

impl Persister for TempDirPersister {
    fn persist(&self, bytes: &[u8], extension: &str) -> Result<PersistedArtifact> {
        let path = self.dir.join(artifact_name(extension));
        let failure = |source: std::io::Error| CompressError::PersistFailure {
            path: path.clone(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(failure)?;

        let mut staged = tempfile::Builder::new()
            .prefix(".compressed-")
            .tempfile_in(&self.dir)
            .map_err(failure)?;
        staged.write_all(bytes).map_err(failure)?;
        staged.flush().map_err(failure)?;
        staged.persist(&path).map_err(|e| failure(e.error))?;

        log::info!("Saved image: {} ({} bytes)", path.display(), bytes.len());

        Ok(PersistedArtifact {
            uri: path_to_file_uri(&path),
            size: bytes.len() as u64,
        })
    }
}

/// Keeps artifacts in memory under revocable `memory://` URIs, the way a
/// browser hands out object URLs. Attached as a source, it also serves those
/// URIs back until they are revoked.
#[derive(Debug, Default)]
pub struct MemoryPersister {
    artifacts: Mutex<HashMap<String, Arc<Vec<u8>>>>,
}

impl MemoryPersister {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, uri: &str) -> Option<Arc<Vec<u8>>> {
        self.artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(uri)
            .cloned()
    }

    /// Releases an artifact. Returns `false` if the URI was unknown or
    /// already revoked.
    pub fn revoke(&self, uri: &str) -> bool {
        self.artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(uri)
            .is_some()
    }

    pub fn len(&self) -> usize {
        self.artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Persister for MemoryPersister {
    fn persist(&self, bytes: &[u8], extension: &str) -> Result<PersistedArtifact> {
        let uri = format!("{}{}", MEMORY_SCHEME, artifact_name(extension));

        self.artifacts
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(uri.clone(), Arc::new(bytes.to_vec()));

        log::debug!("Stored {} bytes at {}", bytes.len(), uri);

        Ok(PersistedArtifact {
            uri,
            size: bytes.len() as u64,
        })
    }
}

impl SourceFetcher for MemoryPersister {
    fn fetch(&self, uri: &str) -> Result<FetchedSource> {
        let bytes = self
            .get(uri)
            .ok_or_else(|| CompressError::SourceNotFound(uri.to_string()))?;

        let mime_type = Path::new(uri)
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(format_from_extension)
            .map(|format| format.to_mime_type().to_string());

        Ok(FetchedSource {
            bytes: bytes.as_ref().clone(),
            mime_type,
        })
    }
}
