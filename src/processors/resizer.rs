// image-compressor/src/processors/resizer.rs
use crate::core::{CompressError, ResizeAlgorithm, Result};
use image::{imageops::FilterType, DynamicImage, GenericImageView};

/// Uniform, non-upscaling scale factor for a `width`x`height` source under
/// optional bounds. Absent bounds are unbounded; a factor outside `(0, 1)`
/// collapses to `1.0` (no resize).
pub fn compute_scale(
    width: u32,
    height: u32,
    max_width: Option<f64>,
    max_height: Option<f64>,
) -> Result<f64> {
    if width == 0 || height == 0 {
        return Err(CompressError::InvalidDimensions { width, height });
    }

    if max_width.is_none() && max_height.is_none() {
        return Ok(1.0);
    }

    let width_limit = max_width.unwrap_or(f64::INFINITY);
    let height_limit = max_height.unwrap_or(f64::INFINITY);
    let scale = (width_limit / width as f64).min(height_limit / height as f64);

    if scale.is_nan() || scale >= 1.0 || scale <= 0.0 {
        return Ok(1.0);
    }

    Ok(scale)
}

pub fn target_dimensions(width: u32, height: u32, scale: f64) -> (u32, u32) {
    let new_width = (width as f64 * scale).round() as u32;
    let new_height = (height as f64 * scale).round() as u32;
    (new_width.max(1), new_height.max(1))
}

#[derive(Debug, Clone, Copy)]
pub struct Resizer {
    algorithm: ResizeAlgorithm,
}

impl Resizer {
    pub fn new(algorithm: ResizeAlgorithm) -> Self {
        Self { algorithm }
    }

    /// Downsamples `image` to fit the bounds, or returns `None` when it
    /// already fits and the original raster should be used untouched.
    pub fn fit(
        &self,
        image: &DynamicImage,
        max_width: Option<f64>,
        max_height: Option<f64>,
    ) -> Result<Option<DynamicImage>> {
        let (width, height) = image.dimensions();
        let scale = compute_scale(width, height, max_width, max_height)?;

        if scale >= 1.0 {
            log::debug!("Image dimensions unchanged, skipping resize");
            return Ok(None);
        }

        let (new_width, new_height) = target_dimensions(width, height, scale);
        Ok(Some(self.resize_exact(image, new_width, new_height)))
    }

    pub fn resize_exact(&self, image: &DynamicImage, width: u32, height: u32) -> DynamicImage {
        log::debug!(
            "Resizing image from {}x{} to {}x{}",
            image.width(),
            image.height(),
            width,
            height
        );

        image.resize_exact(width, height, self.get_filter_type())
    }

    fn get_filter_type(&self) -> FilterType {
        match self.algorithm {
            ResizeAlgorithm::Nearest => FilterType::Nearest,
            ResizeAlgorithm::Bilinear => FilterType::Triangle,
            ResizeAlgorithm::Bicubic => FilterType::CatmullRom,
            ResizeAlgorithm::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new(ResizeAlgorithm::Bilinear)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn no_bounds_means_no_resize() {
        assert_eq!(compute_scale(4000, 3000, None, None).unwrap(), 1.0);
    }

    #[test]
    fn both_bounds_take_the_tighter_ratio() {
        let scale = compute_scale(200, 100, Some(50.0), Some(50.0)).unwrap();
        assert_eq!(scale, 0.25);
        assert_eq!(target_dimensions(200, 100, scale), (50, 25));
    }

    #[test]
    fn single_bound() {
        let scale = compute_scale(1000, 500, None, Some(100.0)).unwrap();
        assert_eq!(scale, 0.2);
        assert_eq!(target_dimensions(1000, 500, scale), (200, 100));
    }

    #[test]
    fn never_upscales() {
        assert_eq!(compute_scale(100, 80, Some(100.0), None).unwrap(), 1.0);
        assert_eq!(compute_scale(100, 80, Some(5000.0), None).unwrap(), 1.0);
        assert_eq!(compute_scale(100, 80, Some(400.0), Some(300.0)).unwrap(), 1.0);
    }

    #[test]
    fn degenerate_bounds_are_ignored() {
        assert_eq!(compute_scale(100, 80, Some(0.0), None).unwrap(), 1.0);
        assert_eq!(compute_scale(100, 80, Some(-20.0), Some(40.0)).unwrap(), 1.0);
        assert_eq!(compute_scale(100, 80, Some(f64::NAN), None).unwrap(), 1.0);
    }

    #[test]
    fn zero_sized_source_is_invalid() {
        assert!(matches!(
            compute_scale(0, 10, Some(5.0), None),
            Err(CompressError::InvalidDimensions { width: 0, height: 10 })
        ));
        assert!(compute_scale(10, 0, None, None).is_err());
    }

    #[test]
    fn extreme_aspect_keeps_at_least_one_pixel() {
        let scale = compute_scale(10_000, 10, Some(100.0), None).unwrap();
        assert_eq!(target_dimensions(10_000, 10, scale), (100, 1));
    }

    #[test]
    fn fit_resizes_only_when_needed() {
        let resizer = Resizer::default();
        let image = DynamicImage::ImageRgb8(RgbImage::new(200, 100));

        assert!(resizer.fit(&image, Some(300.0), None).unwrap().is_none());

        let resized = resizer.fit(&image, Some(50.0), Some(50.0)).unwrap().unwrap();
        assert_eq!(resized.dimensions(), (50, 25));
    }

    #[test]
    fn every_filter_produces_exact_size() {
        let image = DynamicImage::ImageRgb8(RgbImage::new(64, 48));
        for algorithm in [
            ResizeAlgorithm::Nearest,
            ResizeAlgorithm::Bilinear,
            ResizeAlgorithm::Bicubic,
            ResizeAlgorithm::Lanczos3,
        ] {
            let resized = Resizer::new(algorithm).resize_exact(&image, 16, 12);
            assert_eq!(resized.dimensions(), (16, 12));
        }
    }
}
