mod config;
mod diagnostics;
mod error;
mod formats;
mod metadata;
mod organizer;
mod processor;
mod reader;
mod resolver;
mod walker;

use crate::config::{AppConfig, Overrides};
use crate::diagnostics::LogSink;
use crate::organizer::{GroupBy, OrganizeOptions};
use crate::reader::ExifMetadataReader;
use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Sort photos into folders by the camera that took them.
#[derive(Debug, Parser)]
#[command(name = "whichcam", version)]
struct Cli {
    /// Directory holding the photos (not searched recursively)
    source: Option<PathBuf>,

    /// Root for the sorted copies, defaults to the source directory
    destination: Option<PathBuf>,

    /// Field used to name the destination folders
    #[arg(short, long, value_enum)]
    group_by: Option<GroupBy>,

    /// Log planned copies without touching the filesystem
    #[arg(long)]
    dry_run: bool,

    /// Write the extracted records as JSON to this file
    #[arg(long)]
    report: Option<PathBuf>,

    /// Configuration file, replaces config/default
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Log filter level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

fn write_report(path: &Path, records: &[metadata::PictureRecord]) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating report {:?}", path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), records)?;
    info!("Wrote {} record(s) to {:?}", records.len(), path);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let overrides = Overrides {
        source_directory: cli.source,
        destination_directory: cli.destination,
        group_by: cli.group_by,
        log_level: cli.log_level,
        dry_run: cli.dry_run,
        report_path: cli.report,
    };
    let config = AppConfig::new(cli.config.as_deref(), &overrides)?;

    env_logger::Builder::new()
        .filter_level(config.log_level.parse().unwrap_or(log::LevelFilter::Info))
        .init();

    info!("Starting whichcam");

    let mut sink = LogSink::default();
    let records = processor::extract(&config.source_directory, &ExifMetadataReader, &mut sink)
        .with_context(|| format!("reading source directory {:?}", config.source_directory))?;

    if let Some(report) = &config.report_path {
        write_report(report, &records)?;
    }

    let options = OrganizeOptions {
        group_by: config.group_by,
        dry_run: config.dry_run,
    };
    let summary = organizer::organize(&records, config.destination(), options, &mut sink);

    println!(
        "{} picture(s) identified, {} copied, {} skipped, {} failed, {} diagnostic(s)",
        records.len(),
        summary.copied,
        summary.skipped,
        summary.failed,
        sink.reported()
    );
    info!("whichcam finished");

    Ok(())
}
