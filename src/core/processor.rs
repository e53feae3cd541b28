// image-compressor/src/core/processor.rs
use super::backend::{DecodedImage, Persister, RasterDecoder, RasterEncoder, SourceFetcher};
use super::{
    effective_quality, CompressError, CompressOptions, CompressResult, CompressorConfig,
    ImageAsset, OutputFormat, Result,
};
use crate::processors::{
    Compressor, HttpFetcher, Loader, MemoryPersister, Resizer, Resolver, SourceLocator,
    TempDirPersister,
};
use std::sync::Arc;

/// Runs the resolve, decode, resize, encode and persist pipeline.
///
/// Holds no per-call state, so one instance can be shared across threads.
#[derive(Clone)]
pub struct ImageCompressor {
    config: CompressorConfig,
    resolver: Resolver,
    decoder: Arc<dyn RasterDecoder>,
    resizer: Resizer,
    encoder: Arc<dyn RasterEncoder>,
    persister: Arc<dyn Persister>,
}

impl ImageCompressor {
    pub fn new(config: CompressorConfig) -> Self {
        let fetcher =
            HttpFetcher::new(config.http_timeout).with_max_bytes(config.max_download_bytes);
        let resolver = Resolver::new().with_remote_source(Arc::new(fetcher));
        let decoder = Loader::new().with_orientation(config.apply_orientation);
        let resizer = Resizer::new(config.algorithm);
        let encoder = Compressor::new().with_png_optimization(config.optimize_png);
        let persister = TempDirPersister::new(config.output_dir.clone());

        Self {
            config,
            resolver,
            decoder: Arc::new(decoder),
            resizer,
            encoder: Arc::new(encoder),
            persister: Arc::new(persister),
        }
    }

    pub fn with_decoder(mut self, decoder: Arc<dyn RasterDecoder>) -> Self {
        self.decoder = decoder;
        self
    }

    pub fn with_encoder(mut self, encoder: Arc<dyn RasterEncoder>) -> Self {
        self.encoder = encoder;
        self
    }

    pub fn with_persister(mut self, persister: Arc<dyn Persister>) -> Self {
        self.persister = persister;
        self
    }

    pub fn with_content_source(mut self, source: Arc<dyn SourceFetcher>) -> Self {
        self.resolver = self.resolver.with_content_source(source);
        self
    }

    pub fn with_photo_library(mut self, source: Arc<dyn SourceFetcher>) -> Self {
        self.resolver = self.resolver.with_photo_library(source);
        self
    }

    pub fn with_remote_source(mut self, source: Arc<dyn SourceFetcher>) -> Self {
        self.resolver = self.resolver.with_remote_source(source);
        self
    }

    /// Writes artifacts into `store` and reads its `memory://` URIs back.
    pub fn with_memory_store(mut self, store: Arc<MemoryPersister>) -> Self {
        self.resolver = self.resolver.with_memory_store(store.clone());
        self.persister = store;
        self
    }

    pub fn config(&self) -> &CompressorConfig {
        &self.config
    }

    /// Resolves and decodes `uri` without resizing or encoding.
    pub fn load(&self, uri: &str) -> Result<DecodedImage> {
        let locator = SourceLocator::parse(uri)?;
        let raw = self.resolver.resolve(&locator)?;
        let raster = self.decoder.decode(&raw.bytes)?;

        log::debug!(
            "Loaded {} ({}x{}, hint: {:?})",
            raw.origin,
            raster.width(),
            raster.height(),
            raw.format_hint
        );

        Ok(DecodedImage {
            raster,
            format_hint: raw.format_hint,
        })
    }

    pub fn compress(&self, image: &ImageAsset, options: &CompressOptions) -> Result<CompressResult> {
        if image.uri.trim().is_empty() {
            return Err(CompressError::MissingUri);
        }

        let DecodedImage {
            raster,
            format_hint,
        } = self.load(&image.uri)?;

        let raster = match self.resizer.fit(&raster, options.max_width, options.max_height)? {
            Some(resized) => {
                drop(raster);
                resized
            }
            None => raster,
        };

        let quality = effective_quality(options.quality, self.config.default_quality);
        let format = OutputFormat::select(options.format, format_hint);
        let (width, height) = (raster.width(), raster.height());

        let encoded = self.encoder.encode(&raster, format, quality)?;
        drop(raster);

        let artifact = self.persister.persist(&encoded, format.extension())?;

        log::info!(
            "Compressed {} -> {} ({}x{}, {} bytes, {:?} q={:.2})",
            image.uri,
            artifact.uri,
            width,
            height,
            artifact.size,
            format,
            quality
        );

        Ok(CompressResult {
            uri: artifact.uri,
            width,
            height,
            size: artifact.size,
        })
    }
}

impl Default for ImageCompressor {
    fn default() -> Self {
        Self::new(CompressorConfig::default())
    }
}

/// One-shot compression with the default configuration.
pub fn compress(image: &ImageAsset, options: Option<&CompressOptions>) -> Result<CompressResult> {
    let defaults = CompressOptions::default();
    ImageCompressor::default().compress(image, options.unwrap_or(&defaults))
}
