// image-compressor/src/core/mod.rs
pub mod backend;
pub mod processor;

use image::ImageFormat;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

pub use processor::ImageCompressor;

/// Quality used when neither the call nor the config supplies one.
pub const DEFAULT_QUALITY: f32 = 0.7;

/// Largest remote body read before decoding.
pub const DEFAULT_MAX_DOWNLOAD_BYTES: u64 = 50 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResizeAlgorithm {
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Jpeg,
    Png,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "jpg",
            OutputFormat::Png => "png",
        }
    }

    /// Picks the output format: an explicit override wins, otherwise PNG
    /// sources stay PNG and everything else becomes JPEG.
    pub fn select(requested: Option<OutputFormat>, hint: Option<ImageFormat>) -> OutputFormat {
        match (requested, hint) {
            (Some(format), _) => format,
            (None, Some(ImageFormat::Png)) => OutputFormat::Png,
            _ => OutputFormat::Jpeg,
        }
    }
}

/// Opaque reference to a source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    pub uri: String,
}

impl ImageAsset {
    pub fn new(uri: impl Into<String>) -> Self {
        Self { uri: uri.into() }
    }
}

/// Per-call constraints. Every field is optional; `None` means "use the
/// default" for quality and format and "unbounded" for the dimensions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompressOptions {
    pub quality: Option<f32>,
    pub max_width: Option<f64>,
    pub max_height: Option<f64>,
    pub format: Option<OutputFormat>,
}

impl CompressOptions {
    pub fn with_quality(mut self, quality: f32) -> Self {
        self.quality = Some(quality);
        self
    }

    pub fn with_max_width(mut self, max_width: f64) -> Self {
        self.max_width = Some(max_width);
        self
    }

    pub fn with_max_height(mut self, max_height: f64) -> Self {
        self.max_height = Some(max_height);
        self
    }

    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = Some(format);
        self
    }
}

/// Describes the written artifact, never the source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompressResult {
    pub uri: String,
    pub width: u32,
    pub height: u32,
    pub size: u64,
}

#[derive(Debug, Clone)]
pub struct CompressorConfig {
    pub default_quality: f32,
    pub algorithm: ResizeAlgorithm,
    pub output_dir: PathBuf,
    pub optimize_png: bool,
    pub apply_orientation: bool,
    pub http_timeout: Duration,
    pub max_download_bytes: u64,
}

impl Default for CompressorConfig {
    fn default() -> Self {
        Self {
            default_quality: DEFAULT_QUALITY,
            algorithm: ResizeAlgorithm::Bilinear,
            output_dir: std::env::temp_dir(),
            optimize_png: false,
            apply_orientation: true,
            http_timeout: Duration::from_secs(30),
            max_download_bytes: DEFAULT_MAX_DOWNLOAD_BYTES,
        }
    }
}

impl CompressorConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.default_quality) {
            return Err(CompressError::InvalidParameter(format!(
                "Default quality must be between 0 and 1, got {}",
                self.default_quality
            )));
        }

        if self.output_dir.as_os_str().is_empty() {
            return Err(CompressError::InvalidParameter(
                "Output directory cannot be empty".to_string(),
            ));
        }

        if self.http_timeout.is_zero() {
            return Err(CompressError::InvalidParameter(
                "HTTP timeout must be greater than zero".to_string(),
            ));
        }

        if self.max_download_bytes == 0 {
            return Err(CompressError::InvalidParameter(
                "Download limit must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum CompressError {
    #[error("Image uri is required")]
    MissingUri,

    #[error("Unsupported uri scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Source does not exist: {0}")]
    SourceNotFound(String),

    #[error("Unable to read {uri}: {reason}")]
    SourceUnavailable { uri: String, reason: String },

    #[error("Unable to decode image: {0}")]
    DecodeFailure(String),

    #[error("Invalid image dimensions: {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("Failed to encode image: {0}")]
    EncodeFailure(String),

    #[error("Failed to write compressed image to {}: {source}", .path.display())]
    PersistFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Processing error: {0}")]
    ProcessingError(String),
}

pub type Result<T> = std::result::Result<T, CompressError>;

/// Clamps a requested quality into `[0, 1]`, falling back to `default`
/// when the request is absent or NaN.
pub fn effective_quality(requested: Option<f32>, default: f32) -> f32 {
    requested
        .filter(|q| !q.is_nan())
        .unwrap_or(default)
        .clamp(0.0, 1.0)
}
