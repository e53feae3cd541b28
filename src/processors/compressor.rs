// image-compressor/src/processors/compressor.rs
use crate::core::backend::RasterEncoder;
use crate::core::{CompressError, OutputFormat, Result};
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use oxipng::{optimize_from_memory, Options};
use std::io::Cursor;

/// Default encoder: JPEG through `image`'s baseline encoder, PNG through
/// `image` with optional `oxipng` post-processing.
#[derive(Debug, Clone)]
pub struct Compressor {
    optimize_png: bool,
}

impl Compressor {
    pub fn new() -> Self {
        Self {
            optimize_png: false,
        }
    }

    pub fn with_png_optimization(mut self, optimize: bool) -> Self {
        self.optimize_png = optimize;
        self
    }

    pub fn compress_to_bytes(
        &self,
        image: &DynamicImage,
        format: OutputFormat,
        quality: f32,
    ) -> Result<Vec<u8>> {
        log::debug!(
            "Encoding {}x{} image as {:?}, quality: {}",
            image.width(),
            image.height(),
            format,
            quality
        );

        let data = match format {
            OutputFormat::Jpeg => self.encode_jpeg(image, jpeg_quality(quality))?,
            OutputFormat::Png => self.encode_png(image)?,
        };

        if data.is_empty() {
            return Err(CompressError::EncodeFailure(format!(
                "{:?} encoder produced no data",
                format
            )));
        }

        Ok(data)
    }

    fn encode_jpeg(&self, image: &DynamicImage, quality: u8) -> Result<Vec<u8>> {
        // The baseline encoder only takes 8-bit gray or RGB
        let flattened;
        let image = match image {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => image,
            other => {
                flattened = DynamicImage::ImageRgb8(other.to_rgb8());
                &flattened
            }
        };

        let mut buffer = Vec::new();
        let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);
        image
            .write_with_encoder(encoder)
            .map_err(|e| CompressError::EncodeFailure(e.to_string()))?;

        Ok(buffer)
    }

    fn encode_png(&self, image: &DynamicImage) -> Result<Vec<u8>> {
        let converted;
        let image = match image {
            DynamicImage::ImageRgb32F(_) | DynamicImage::ImageRgba32F(_) => {
                converted = DynamicImage::ImageRgba8(image.to_rgba8());
                &converted
            }
            other => other,
        };

        let mut buffer = Cursor::new(Vec::new());
        image
            .write_to(&mut buffer, ImageFormat::Png)
            .map_err(|e| CompressError::EncodeFailure(e.to_string()))?;

        if self.optimize_png {
            return self.optimize_png_bytes(&buffer.into_inner());
        }

        Ok(buffer.into_inner())
    }

    fn optimize_png_bytes(&self, data: &[u8]) -> Result<Vec<u8>> {
        let optimized = optimize_from_memory(data, &Options::default())
            .map_err(|e| CompressError::EncodeFailure(format!("PNG optimization failed: {}", e)))?;

        log::debug!("oxipng: {} -> {} bytes", data.len(), optimized.len());
        Ok(optimized)
    }
}

impl Default for Compressor {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterEncoder for Compressor {
    fn encode(&self, raster: &DynamicImage, format: OutputFormat, quality: f32) -> Result<Vec<u8>> {
        self.compress_to_bytes(raster, format, quality)
    }
}

/// Maps a `[0, 1]` quality onto the JPEG encoder's `1..=100` scale.
pub fn jpeg_quality(quality: f32) -> u8 {
    ((quality * 100.0).round() as i32).clamp(1, 100) as u8
}
