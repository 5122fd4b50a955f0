// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Main entry point for the interferogram accumulator
use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use rust_interferometry::acquisition::get_finite_source;
use rust_interferometry::config::{self, Config};
use rust_interferometry::daemon::Daemon;
use rust_interferometry::processing::{AccumulationSnapshot, PulseRecord, SpectrumPipeline};
use rust_interferometry::slicing::ThresholdCrestFinder;

use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;

/// Accumulate phase-corrected spectra from interferometric pulse trains
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to configuration file (YAML format)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Input pulse sequence file (WAV or text)
    #[arg(long)]
    input: Option<PathBuf>,

    /// Use the simulated pulse train even if the configuration names a file
    #[arg(long)]
    simulate: bool,

    /// Number of pulse sequences to process (0 for unlimited in daemon mode)
    #[arg(long)]
    records: Option<u64>,

    /// Number of pipeline lanes
    #[arg(long)]
    workers: Option<usize>,

    /// Zero fill factor (>= 1)
    #[arg(long)]
    zero_fill_factor: Option<u32>,

    /// Output file for the accumulated spectrum (JSON)
    #[arg(long)]
    output: Option<PathBuf>,

    /// Run until interrupted, reporting the accumulation periodically
    #[arg(long)]
    daemon: bool,

    /// Output the configuration schema as JSON and exit
    #[arg(long)]
    show_config_schema: bool,

    /// Enable verbose logging (debug level)
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    if args.show_config_schema {
        return config::output_config_schema();
    }

    let config_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from("config.yaml"));
    let mut config = Config::from_file(&config_path)?;
    config.apply_args(
        args.input.clone(),
        args.records,
        args.workers,
        args.zero_fill_factor,
    );
    if args.simulate {
        config.acquisition.input_file = None;
    }
    config::validate_specific_rules(&config)?;

    let snapshot = if args.daemon {
        run_daemon(&config).await?
    } else {
        run_batch(&config).await?
    };

    report(&snapshot, args.output.as_ref())
}

/// Process a bounded number of sequences and return the final accumulation
async fn run_batch(config: &Config) -> Result<AccumulationSnapshot> {
    let mut source = get_finite_source(&config.acquisition)?;
    let crest_finder = Arc::new(ThresholdCrestFinder::from_config(&config.crest_finder));
    let pipeline = SpectrumPipeline::new(&config.accumulation, &config.pipeline, crest_finder)
        .context("Failed to build the accumulation pipeline")?;
    pipeline.start();

    info!("Reading pulse sequences from {}", source.description());

    let limit = config.acquisition.records;
    let mut submitted = 0u64;
    while limit == 0 || submitted < limit {
        let Some(sequence) = source.next_sequence()? else {
            break;
        };
        if let Err(e) = pipeline.submit(PulseRecord::new(sequence)) {
            warn!("Sequence dropped: {}", e);
            continue;
        }
        submitted += 1;
    }
    info!("Submitted {} sequences, waiting for processing", submitted);

    pipeline.wait_idle().await;
    let snapshot = pipeline.snapshot();
    pipeline.shutdown().await;
    Ok(snapshot)
}

/// Run the daemon until Ctrl+C and return the accumulation at shutdown
async fn run_daemon(config: &Config) -> Result<AccumulationSnapshot> {
    info!("Starting in daemon mode");
    let mut daemon = Daemon::new();
    daemon.launch(config).await?;

    signal::ctrl_c()
        .await
        .context("Error waiting for shutdown signal")?;
    info!("Received shutdown signal, terminating daemon");
    daemon.shutdown();
    let pipeline = daemon.pipeline();
    daemon.join().await?;

    pipeline
        .map(|p| p.snapshot())
        .context("Daemon did not start a pipeline")
}

fn report(snapshot: &AccumulationSnapshot, output: Option<&PathBuf>) -> Result<()> {
    if let Some(output_path) = output {
        info!("Saving results to: {}", output_path.display());
        std::fs::write(output_path, serde_json::to_string_pretty(snapshot)?)
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        return Ok(());
    }

    println!("Interferogram Accumulator");
    println!("-------------------------");
    println!("- Sequences processed: {}", snapshot.sequences_processed);
    println!(
        "- Failures: {} ({:.1}%)",
        snapshot.exception_count,
        snapshot.failure_rate() * 100.0
    );
    if let Some(category) = snapshot.last_exception {
        println!("- Last failure: {}", category);
    }
    match &snapshot.spectrum {
        Some(spectrum) => {
            let magnitude = spectrum.average().magnitude();
            let (peak_bin, peak) = magnitude
                .iter()
                .enumerate()
                .fold((0, 0.0), |best, (i, &m)| if m > best.1 { (i, m) } else { best });
            println!("- Pulses accumulated: {}", spectrum.pulse_count());
            println!("- Spectrum bins: {}", spectrum.len());
            println!("- Peak: bin {} (magnitude {:.6})", peak_bin, peak);
        }
        None => println!("- No spectrum accumulated"),
    }
    Ok(())
}
