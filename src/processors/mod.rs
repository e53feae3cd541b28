// image-compressor/src/processors/mod.rs
mod batch;
mod compressor;
mod loader;
mod metadata;
mod persister;
mod resizer;
mod resolver;
mod sources;

pub use batch::{BatchOutcome, BatchProcessor, BatchReport, collect_image_assets};
pub use compressor::{jpeg_quality, Compressor};
pub use loader::Loader;
pub use metadata::MetadataProcessor;
pub use persister::{MemoryPersister, TempDirPersister};
pub use resizer::{compute_scale, target_dimensions, Resizer};
pub use resolver::{Resolver, SourceLocator};
pub use sources::{DirectorySource, HttpFetcher};

