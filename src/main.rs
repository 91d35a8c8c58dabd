use anyhow::Result;
use clap::Parser;
use datesort::datesort_core::decoder::DecoderRegistry;
use datesort::datesort_core::media::photo_extensions;
use datesort::datesort_core::{
    Cli, DateExtractor, ExifToolDecoder, Organizer, exiftool_available,
};
use simplelog::{CombinedLogger, Config, LevelFilter, SharedLogger, TermLogger, WriteLogger};
use std::fs::File;
use std::rc::Rc;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize loggers
    let mut loggers: Vec<Box<dyn SharedLogger>> = vec![TermLogger::new(
        LevelFilter::Warn,
        Config::default(),
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    )];

    if cli.log {
        loggers.push(WriteLogger::new(
            cli.log_level,
            Config::default(),
            File::create("datesort.log")?,
        ));
    }

    CombinedLogger::init(loggers)?;

    let registry = build_registry(cli.exiftool);
    log::info!(
        "Organizing files with extensions: {}",
        registry.extensions().collect::<Vec<_>>().join(", ")
    );
    let mut organizer = Organizer::new(DateExtractor::new(registry), cli.organize_options());
    let dry_run = organizer.options().dry_run;

    let result = organizer.organize_dir_with(&cli.source_dir, |source, destination| {
        if dry_run {
            println!("[DRY RUN] {} -> {}", source.display(), destination.display());
        }
    })?;

    println!("{}", result);

    Ok(())
}

/// Decoders are registered once here and handed to the extractor.
fn build_registry(use_exiftool: bool) -> DecoderRegistry {
    let mut registry = DecoderRegistry::with_defaults();
    if !use_exiftool {
        return registry;
    }

    if !exiftool_available() {
        log::warn!("exiftool not found on PATH, using built-in decoders");
        return registry;
    }

    match ExifToolDecoder::new() {
        Ok(decoder) => {
            let extensions: Vec<&str> = photo_extensions().collect();
            registry.register(&extensions, Rc::new(decoder));
        }
        Err(e) => log::warn!("{}, using built-in decoders", e),
    }
    registry
}
