mod cli;
mod core;
mod processors;
mod utils;

pub use crate::cli::{Algorithm, Cli, Commands, CompressArgs, Format};
pub use crate::core::backend::{
    DecodedImage, FetchedSource, PersistedArtifact, Persister, RasterDecoder, RasterEncoder,
    RawSource, SourceFetcher,
};
pub use crate::core::processor::compress;
pub use crate::core::{
    effective_quality, CompressError, CompressOptions, CompressResult, CompressorConfig,
    ImageAsset, ImageCompressor, OutputFormat, ResizeAlgorithm, Result,
    DEFAULT_MAX_DOWNLOAD_BYTES, DEFAULT_QUALITY,
};
pub use crate::processors::{
    collect_image_assets, compute_scale, jpeg_quality, target_dimensions, BatchOutcome,
    BatchProcessor, BatchReport, Compressor, DirectorySource, HttpFetcher, Loader,
    MemoryPersister, MetadataProcessor, Resizer, Resolver, SourceLocator, TempDirPersister,
};
pub use crate::utils::{format_file_size, format_from_extension, format_from_mime, path_to_file_uri};

pub mod prelude {
    pub use crate::{
        compress, CompressOptions, CompressResult, CompressorConfig, ImageAsset,
        ImageCompressor, OutputFormat,
    };
}

// Re-export commonly used types
pub use image::DynamicImage;
