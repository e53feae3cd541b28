use anyhow::Context;
use clap::Parser;
use image_compressor::{
    collect_image_assets, format_file_size, BatchProcessor, Cli, Commands, CompressArgs,
    DirectorySource, ImageAsset, ImageCompressor,
};
use log::LevelFilter;
use std::path::PathBuf;
use std::sync::Arc;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(if cli.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .init();

    match cli.command {
        Commands::Compress { uri, settings } => process_compress(uri, settings),
        Commands::Batch {
            input,
            recursive,
            threads,
            settings,
        } => process_batch(input, recursive, threads, settings),
    }
}

fn build_compressor(settings: &CompressArgs) -> anyhow::Result<ImageCompressor> {
    let config = settings.config();
    config.validate().context("invalid compressor settings")?;

    let mut compressor = ImageCompressor::new(config);
    if let Some(dir) = &settings.assets_dir {
        let source = Arc::new(DirectorySource::new(dir));
        compressor = compressor
            .with_content_source(source.clone())
            .with_photo_library(source);
    }

    Ok(compressor)
}

fn process_compress(uri: String, settings: CompressArgs) -> anyhow::Result<()> {
    let compressor = build_compressor(&settings)?;
    let result = compressor
        .compress(&ImageAsset::new(uri.as_str()), &settings.options())
        .with_context(|| format!("failed to compress {}", uri))?;

    println!("uri:    {}", result.uri);
    println!("width:  {}", result.width);
    println!("height: {}", result.height);
    println!("size:   {} ({})", result.size, format_file_size(result.size));

    Ok(())
}

fn process_batch(
    input: PathBuf,
    recursive: bool,
    threads: usize,
    settings: CompressArgs,
) -> anyhow::Result<()> {
    let assets = collect_image_assets(&input, recursive)
        .with_context(|| format!("cannot scan {}", input.display()))?;

    let compressor = build_compressor(&settings)?;
    let batch = BatchProcessor::new(compressor, threads)?.with_progress(true);
    let report = batch.compress_all(&assets, &settings.options());

    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(result) => println!(
                "{} -> {} ({}x{}, {})",
                outcome.uri,
                result.uri,
                result.width,
                result.height,
                format_file_size(result.size)
            ),
            Err(e) => eprintln!("{}: {}", outcome.uri, e),
        }
    }

    println!(
        "Batch complete. Compressed {} of {} images ({} written)",
        report.processed_count(),
        report.outcomes.len(),
        format_file_size(report.total_size_after())
    );

    let failures = report.failed().count();
    if failures > 0 {
        anyhow::bail!("{} image(s) failed to compress", failures);
    }

    Ok(())
}
