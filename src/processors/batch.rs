// image-compressor/src/processors/batch.rs
use crate::core::{
    CompressError, CompressOptions, CompressResult, ImageAsset, ImageCompressor, Result,
};
use crate::utils::is_supported_format;
use indicatif::{ParallelProgressIterator, ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::Path;
use walkdir::WalkDir;

#[derive(Debug)]
pub struct BatchOutcome {
    pub uri: String,
    pub result: Result<CompressResult>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &CompressResult> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = (&str, &CompressError)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.as_ref().err().map(|e| (o.uri.as_str(), e)))
    }

    pub fn processed_count(&self) -> usize {
        self.succeeded().count()
    }

    pub fn total_size_after(&self) -> u64 {
        self.succeeded().map(|r| r.size).sum()
    }
}

/// Runs independent compress calls in parallel. Results come back in input
/// order; one failure never affects the others.
pub struct BatchProcessor {
    compressor: ImageCompressor,
    thread_pool: Option<rayon::ThreadPool>,
    show_progress: bool,
}

impl BatchProcessor {
    /// `max_threads == 0` uses rayon's global pool.
    pub fn new(compressor: ImageCompressor, max_threads: usize) -> Result<Self> {
        let thread_pool = if max_threads > 0 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(max_threads)
                .build()
                .map_err(|e| {
                    CompressError::ProcessingError(format!("Failed to create thread pool: {}", e))
                })?;
            Some(pool)
        } else {
            None
        };

        Ok(Self {
            compressor,
            thread_pool,
            show_progress: false,
        })
    }

    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn compress_all(&self, assets: &[ImageAsset], options: &CompressOptions) -> BatchReport {
        if assets.is_empty() {
            log::warn!("No images to compress");
            return BatchReport::default();
        }

        log::info!("Compressing {} images", assets.len());

        let pb = self.create_progress_bar(assets.len());
        let run = || -> Vec<BatchOutcome> {
            assets
                .par_iter()
                .progress_with(pb.clone())
                .map(|asset| self.compress_one(asset, options))
                .collect()
        };

        let outcomes = match &self.thread_pool {
            Some(pool) => pool.install(run),
            None => run(),
        };

        let report = BatchReport { outcomes };
        pb.finish_with_message(format!(
            "Compressed {} of {} images",
            report.processed_count(),
            report.outcomes.len()
        ));

        report
    }

    fn compress_one(&self, asset: &ImageAsset, options: &CompressOptions) -> BatchOutcome {
        let result = self.compressor.compress(asset, options);
        if let Err(e) = &result {
            log::warn!("Failed to compress {}: {}", asset.uri, e);
        }

        BatchOutcome {
            uri: asset.uri.clone(),
            result,
        }
    }

    fn create_progress_bar(&self, total: usize) -> ProgressBar {
        if !self.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(total as u64);
        let style = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        pb.set_style(style);
        pb
    }
}

/// Lists supported image files under `input_dir` as assets, sorted by path.
pub fn collect_image_assets(input_dir: &Path, recursive: bool) -> Result<Vec<ImageAsset>> {
    if !input_dir.exists() {
        return Err(CompressError::SourceNotFound(input_dir.display().to_string()));
    }

    if !input_dir.is_dir() {
        return Err(CompressError::InvalidParameter(format!(
            "Input path is not a directory: {}",
            input_dir.display()
        )));
    }

    let walker = if recursive {
        WalkDir::new(input_dir)
    } else {
        WalkDir::new(input_dir).max_depth(1)
    };

    let assets = walker
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| is_supported_format(entry.path()))
        .map(|entry| ImageAsset::new(entry.path().to_string_lossy().into_owned()))
        .collect();

    Ok(assets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CompressorConfig;
    use image::{DynamicImage, RgbImage};

    fn write_jpeg(path: &Path, width: u32, height: u32) {
        DynamicImage::ImageRgb8(RgbImage::new(width, height))
            .save(path)
            .unwrap();
    }

    fn compressor_into(dir: &Path) -> ImageCompressor {
        ImageCompressor::new(CompressorConfig {
            output_dir: dir.to_path_buf(),
            ..Default::default()
        })
    }

    #[test]
    fn collects_supported_files_only() {
        let dir = tempfile::tempdir().unwrap();
        write_jpeg(&dir.path().join("b.jpg"), 4, 4);
        write_jpeg(&dir.path().join("a.jpg"), 4, 4);
        std::fs::write(dir.path().join("notes.txt"), b"hi").unwrap();
        std::fs::write(dir.path().join("undecodable.avif"), b"avif").unwrap();
        std::fs::create_dir(dir.path().join("nested")).unwrap();
        write_jpeg(&dir.path().join("nested").join("c.jpg"), 4, 4);

        let flat = collect_image_assets(dir.path(), false).unwrap();
        assert_eq!(flat.len(), 2);
        assert!(flat[0].uri.ends_with("a.jpg"));
        assert!(flat[1].uri.ends_with("b.jpg"));

        let deep = collect_image_assets(dir.path(), true).unwrap();
        assert_eq!(deep.len(), 3);
    }

    #[test]
    fn missing_directory_is_not_found() {
        let result = collect_image_assets(Path::new("/no/such/dir"), true);
        assert!(matches!(result, Err(CompressError::SourceNotFound(_))));
    }

    #[test]
    fn batch_keeps_order_and_isolates_failures() {
        let input = tempfile::tempdir().unwrap();
        let output = tempfile::tempdir().unwrap();
        let small = input.path().join("small.jpg");
        let large = input.path().join("large.jpg");
        write_jpeg(&small, 40, 20);
        write_jpeg(&large, 400, 200);

        let assets = vec![
            ImageAsset::new(small.to_string_lossy()),
            ImageAsset::new("ftp://example.com/x.jpg"),
            ImageAsset::new(large.to_string_lossy()),
        ];

        let batch = BatchProcessor::new(compressor_into(output.path()), 2).unwrap();
        let report = batch.compress_all(&assets, &CompressOptions::default().with_max_width(100.0));

        assert_eq!(report.outcomes.len(), 3);
        assert_eq!(report.processed_count(), 2);

        let first = report.outcomes[0].result.as_ref().unwrap();
        assert_eq!((first.width, first.height), (40, 20));
        assert!(matches!(
            report.outcomes[1].result,
            Err(CompressError::UnsupportedScheme(_))
        ));
        let third = report.outcomes[2].result.as_ref().unwrap();
        assert_eq!((third.width, third.height), (100, 50));

        let failed: Vec<&str> = report.failed().map(|(uri, _)| uri).collect();
        assert_eq!(failed, vec!["ftp://example.com/x.jpg"]);
        assert_eq!(report.total_size_after(), first.size + third.size);
    }

    #[test]
    fn empty_batch_is_empty_report() {
        let output = tempfile::tempdir().unwrap();
        let batch = BatchProcessor::new(compressor_into(output.path()), 0).unwrap();
        let report = batch.compress_all(&[], &CompressOptions::default());
        assert!(report.outcomes.is_empty());
        assert_eq!(report.total_size_after(), 0);
    }
}
