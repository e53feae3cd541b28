// image-compressor/src/processors/loader.rs
use crate::core::backend::RasterDecoder;
use crate::core::{CompressError, Result};
use crate::processors::MetadataProcessor;
use image::{DynamicImage, GenericImageView, ImageReader};
use std::io::Cursor;

/// Default decoder: sniffs the format from the bytes themselves and,
/// unless disabled, applies the EXIF orientation.
#[derive(Debug, Clone)]
pub struct Loader {
    apply_orientation: bool,
    metadata: MetadataProcessor,
}

impl Loader {
    pub fn new() -> Self {
        Self {
            apply_orientation: true,
            metadata: MetadataProcessor::new(),
        }
    }

    pub fn with_orientation(mut self, apply: bool) -> Self {
        self.apply_orientation = apply;
        self
    }

    pub fn load_from_bytes(&self, data: &[u8]) -> Result<DynamicImage> {
        if data.is_empty() {
            return Err(CompressError::DecodeFailure("source is empty".to_string()));
        }

        let image = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| CompressError::DecodeFailure(e.to_string()))?
            .decode()
            .map_err(|e| CompressError::DecodeFailure(e.to_string()))?;

        let image = if self.apply_orientation {
            self.metadata.normalize(image, data)
        } else {
            image
        };

        let (width, height) = image.dimensions();
        log::debug!(
            "Decoded image: {}x{} pixels, color: {:?}",
            width,
            height,
            image.color()
        );

        Ok(image)
    }
}

impl Default for Loader {
    fn default() -> Self {
        Self::new()
    }
}

impl RasterDecoder for Loader {
    fn decode(&self, bytes: &[u8]) -> Result<DynamicImage> {
        self.load_from_bytes(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, RgbaImage};

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let image = DynamicImage::ImageRgba8(RgbaImage::new(7, 5));
        let image = match format {
            ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
            _ => image,
        };
        let mut buffer = Vec::new();
        image.write_to(&mut Cursor::new(&mut buffer), format).unwrap();
        buffer
    }

    #[test]
    fn decodes_png_and_jpeg() {
        let loader = Loader::new();
        for format in [ImageFormat::Png, ImageFormat::Jpeg] {
            let image = loader.decode(&encoded(format)).unwrap();
            assert_eq!(image.dimensions(), (7, 5));
        }
    }

    #[test]
    fn empty_bytes_fail_to_decode() {
        assert!(matches!(
            Loader::new().decode(&[]),
            Err(CompressError::DecodeFailure(_))
        ));
    }

    #[test]
    fn garbage_fails_to_decode() {
        assert!(matches!(
            Loader::new().decode(b"definitely not an image"),
            Err(CompressError::DecodeFailure(_))
        ));
    }

    #[test]
    fn truncated_png_fails_to_decode() {
        let png = encoded(ImageFormat::Png);
        assert!(matches!(
            Loader::new().with_orientation(false).decode(&png[..png.len() / 2]),
            Err(CompressError::DecodeFailure(_))
        ));
    }
}
