// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

// Pulse train generator for accumulator testing
// Writes simulated interferogram sequences to a mono WAV or text file

use clap::Parser;
use hound::{SampleFormat, WavSpec, WavWriter};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::PathBuf;

use rust_interferometry::config::SimulatedSourceConfig;
use rust_interferometry::utility::PulseTrainSimulator;

/// Simulated interferogram pulse train generator
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Output file path (.wav, anything else is written as text)
    #[arg(short, long, value_name = "FILE")]
    output: PathBuf,

    /// Number of sequences to write
    #[arg(short, long, default_value_t = 10)]
    records: usize,

    /// Samples per sequence
    #[arg(short = 'l', long, default_value_t = 8192)]
    sequence_length: usize,

    /// Samples between consecutive crests
    #[arg(short = 'p', long, default_value_t = 2000)]
    pulse_period: usize,

    /// Index of the first crest in each sequence
    #[arg(short = 'f', long, default_value_t = 1000)]
    first_crest: usize,

    /// Carrier frequency in cycles per sample (0 < f < 0.5)
    #[arg(short = 'c', long, default_value_t = 0.12)]
    carrier_frequency: f64,

    /// Peak amplitude of each burst (0.0 to 1.0 for WAV output)
    #[arg(short, long, default_value_t = 0.8)]
    amplitude: f64,

    /// Standard deviation of the added Gaussian noise
    #[arg(short, long, default_value_t = 0.01)]
    noise: f64,

    /// Sample rate written in the WAV header
    #[arg(short, long, default_value_t = 48000)]
    sample_rate: u32,

    /// Noise seed
    #[arg(long, default_value_t = 12345)]
    seed: u32,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    if args.carrier_frequency <= 0.0 || args.carrier_frequency >= 0.5 {
        eprintln!("Error: Carrier frequency must be between 0 and 0.5 cycles per sample");
        std::process::exit(1);
    }
    if args.pulse_period == 0 {
        eprintln!("Error: Pulse period must be positive");
        std::process::exit(1);
    }
    if args.first_crest >= args.sequence_length {
        eprintln!("Error: First crest must fall inside the sequence");
        std::process::exit(1);
    }

    let config = SimulatedSourceConfig {
        sequence_length: args.sequence_length,
        pulse_period: args.pulse_period,
        first_crest: args.first_crest,
        carrier_frequency: args.carrier_frequency,
        amplitude: args.amplitude,
        noise_amplitude: args.noise,
        seed: args.seed,
        ..SimulatedSourceConfig::default()
    };
    let mut simulator = PulseTrainSimulator::new(config);

    println!(
        "Generating {} sequences of {} samples...",
        args.records, args.sequence_length
    );
    println!("Crests at: {:?}", simulator.crest_indices());

    let is_wav = args
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"));

    if is_wav {
        let spec = WavSpec {
            channels: 1,
            sample_rate: args.sample_rate,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&args.output, spec)?;
        for _ in 0..args.records {
            for value in simulator.next_sequence() {
                let sample = (value.clamp(-1.0, 1.0) * i16::MAX as f64) as i16;
                writer.write_sample(sample)?;
            }
        }
        writer.finalize()?;
    } else {
        let mut writer = BufWriter::new(File::create(&args.output)?);
        writeln!(
            writer,
            "# {} sequences of {} samples",
            args.records, args.sequence_length
        )?;
        for _ in 0..args.records {
            for value in simulator.next_sequence() {
                writeln!(writer, "{}", value)?;
            }
        }
        writer.flush()?;
    }

    println!(
        "Pulse train successfully generated and saved to: {}",
        args.output.display()
    );

    Ok(())
}
