// image-compressor/src/core/backend.rs
//! Seams between the compression pipeline and the services it drives.
//!
//! [`ImageCompressor`](super::ImageCompressor) owns one implementation of each
//! trait. The defaults are [`Loader`](crate::Loader),
//! [`Compressor`](crate::Compressor) and
//! [`TempDirPersister`](crate::TempDirPersister); tests swap in their own.
//! Every trait is `Send + Sync` so a single compressor can serve concurrent
//! calls.

use super::{OutputFormat, Result};
use image::{DynamicImage, ImageFormat};

/// Turns raw source bytes into a raster.
pub trait RasterDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage>;
}

/// Serializes a raster. `quality` is already clamped to `[0, 1]` and is
/// ignored for lossless formats.
pub trait RasterEncoder: Send + Sync {
    fn encode(&self, raster: &DynamicImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>>;
}

/// Writes encoded bytes to a fresh, uniquely named location.
pub trait Persister: Send + Sync {
    fn persist(&self, bytes: &[u8], extension: &str) -> Result<PersistedArtifact>;
}

/// Supplies raw bytes for a URI that is not a plain file path: content
/// handles, photo-library identifiers and remote URLs.
pub trait SourceFetcher: Send + Sync {
    fn fetch(&self, uri: &str) -> Result<FetchedSource>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedArtifact {
    pub uri: String,
    pub size: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedSource {
    pub bytes: Vec<u8>,
    /// Reported MIME type, parameters included (`image/png; q=1`).
    pub mime_type: Option<String>,
}

/// Bytes for one source plus whatever its location says about the format.
#[derive(Debug, Clone)]
pub struct RawSource {
    pub bytes: Vec<u8>,
    pub format_hint: Option<ImageFormat>,
    pub origin: String,
}

/// A decoded raster owned by a single compress call.
#[derive(Debug)]
pub struct DecodedImage {
    pub raster: DynamicImage,
    pub format_hint: Option<ImageFormat>,
}

impl DecodedImage {
    pub fn dimensions(&self) -> (u32, u32) {
        (self.raster.width(), self.raster.height())
    }
}
