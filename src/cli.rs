// image-compressor/src/cli.rs
use crate::core::{CompressOptions, CompressorConfig, OutputFormat, ResizeAlgorithm};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "image-compressor", version, about = "Downsample and re-encode images")]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compress a single image (path, file://, content://, ph:// or http(s):// uri)
    Compress {
        uri: String,

        #[command(flatten)]
        settings: CompressArgs,
    },

    /// Compress every supported image in a directory
    Batch {
        input: PathBuf,

        /// Descend into subdirectories
        #[arg(short, long)]
        recursive: bool,

        /// Worker threads (0 = one per core)
        #[arg(short, long, default_value_t = 0)]
        threads: usize,

        #[command(flatten)]
        settings: CompressArgs,
    },
}

#[derive(Args, Debug, Clone)]
pub struct CompressArgs {
    /// Encoding quality between 0 and 1 (default 0.7)
    #[arg(short, long)]
    pub quality: Option<f32>,

    /// Upper bound on the output width, in pixels
    #[arg(long)]
    pub max_width: Option<f64>,

    /// Upper bound on the output height, in pixels
    #[arg(long)]
    pub max_height: Option<f64>,

    /// Force the output format instead of following the source
    #[arg(short, long, value_enum)]
    pub format: Option<Format>,

    /// Where compressed files are written (default: system temp dir)
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Directory serving content:// and ph:// handles
    #[arg(long)]
    pub assets_dir: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = Algorithm::Bilinear)]
    pub algorithm: Algorithm,

    /// Run PNG output through oxipng
    #[arg(long)]
    pub optimize_png: bool,

    /// Ignore EXIF orientation
    #[arg(long)]
    pub no_orientation: bool,

    /// Timeout for remote sources, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Largest remote image accepted, in MiB
    #[arg(long, default_value_t = 50)]
    pub max_download_mb: u64,
}

impl CompressArgs {
    pub fn options(&self) -> CompressOptions {
        CompressOptions {
            quality: self.quality,
            max_width: self.max_width,
            max_height: self.max_height,
            format: self.format.map(Into::into),
        }
    }

    pub fn config(&self) -> CompressorConfig {
        let defaults = CompressorConfig::default();
        CompressorConfig {
            algorithm: self.algorithm.into(),
            output_dir: self.output_dir.clone().unwrap_or(defaults.output_dir),
            optimize_png: self.optimize_png,
            apply_orientation: !self.no_orientation,
            http_timeout: Duration::from_secs(self.timeout),
            max_download_bytes: self.max_download_mb.saturating_mul(1024 * 1024),
            ..defaults
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Algorithm {
    Nearest,
    Bilinear,
    Bicubic,
    Lanczos3,
}

impl From<Algorithm> for ResizeAlgorithm {
    fn from(algorithm: Algorithm) -> Self {
        match algorithm {
            Algorithm::Nearest => ResizeAlgorithm::Nearest,
            Algorithm::Bilinear => ResizeAlgorithm::Bilinear,
            Algorithm::Bicubic => ResizeAlgorithm::Bicubic,
            Algorithm::Lanczos3 => ResizeAlgorithm::Lanczos3,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Jpeg,
    Png,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Jpeg => OutputFormat::Jpeg,
            Format::Png => OutputFormat::Png,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compress_flags_map_to_options() {
        let cli = Cli::parse_from([
            "image-compressor",
            "compress",
            "ph://ABC",
            "--quality",
            "0.5",
            "--max-width",
            "640",
            "--format",
            "png",
            "--no-orientation",
        ]);

        let Commands::Compress { uri, settings } = cli.command else {
            panic!("expected compress command");
        };
        assert_eq!(uri, "ph://ABC");

        let options = settings.options();
        assert_eq!(options.quality, Some(0.5));
        assert_eq!(options.max_width, Some(640.0));
        assert_eq!(options.max_height, None);
        assert_eq!(options.format, Some(OutputFormat::Png));

        let config = settings.config();
        assert!(!config.apply_orientation);
        assert_eq!(config.algorithm, ResizeAlgorithm::Bilinear);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn batch_flags() {
        let cli = Cli::parse_from([
            "image-compressor",
            "-v",
            "batch",
            "photos",
            "-r",
            "--threads",
            "4",
            "--algorithm",
            "lanczos3",
            "--max-download-mb",
            "2",
        ]);

        assert!(cli.verbose);
        let Commands::Batch {
            input,
            recursive,
            threads,
            settings,
        } = cli.command
        else {
            panic!("expected batch command");
        };
        assert_eq!(input, PathBuf::from("photos"));
        assert!(recursive);
        assert_eq!(threads, 4);
        assert_eq!(settings.config().algorithm, ResizeAlgorithm::Lanczos3);
        assert_eq!(settings.config().max_download_bytes, 2 * 1024 * 1024);
    }
}
