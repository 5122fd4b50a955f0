// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Pulse sequence acquisition module
//!
//! This module provides pulse sequences from WAV or text files, or from the
//! pulse train simulator, and the non-blocking [`Camera`] stage used to hand
//! them to the processing side.

pub mod camera;

pub use camera::Camera;

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use hound::WavReader;
use log::{debug, info};

use crate::config::{AcquisitionConfig, SimulatedSourceConfig};
use crate::utility::PulseTrainSimulator;

/// Represents a source of pulse sequences (file or simulated)
pub trait PulseSequenceSource: Send {
    /// Read the next pulse sequence, `None` once the source is exhausted
    fn next_sequence(&mut self) -> Result<Option<Vec<f64>>>;

    /// Short human-readable description for logs
    fn description(&self) -> String;
}

/// Pulse sequences read from a file and cut into fixed-length chunks
pub struct FileSource {
    path: PathBuf,
    samples: Vec<f64>,
    sequence_length: usize,
    position: usize,
}

impl FileSource {
    /// Load a WAV file (first channel) or a text file with one or more
    /// numbers per line. `sequence_length == 0` yields the whole file once.
    pub fn new<P: AsRef<Path>>(path: P, sequence_length: usize) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(anyhow!("Input file does not exist: {}", path.display()));
        }

        let is_wav = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
        let samples = if is_wav {
            read_wav_samples(path)?
        } else {
            read_text_samples(path)?
        };

        info!(
            "Loaded {} samples from {}",
            samples.len(),
            path.display()
        );
        if sequence_length > 0 && samples.len() % sequence_length != 0 {
            debug!(
                "Ignoring {} trailing samples that do not fill a sequence",
                samples.len() % sequence_length
            );
        }

        Ok(Self {
            path: path.to_path_buf(),
            samples,
            sequence_length,
            position: 0,
        })
    }

    /// Number of complete sequences in the file
    pub fn sequence_count(&self) -> usize {
        match self.sequence_length {
            0 => usize::from(!self.samples.is_empty()),
            length => self.samples.len() / length,
        }
    }
}

impl PulseSequenceSource for FileSource {
    fn next_sequence(&mut self) -> Result<Option<Vec<f64>>> {
        let length = match self.sequence_length {
            0 => self.samples.len(),
            length => length,
        };
        if length == 0 || self.position + length > self.samples.len() {
            return Ok(None);
        }
        let sequence = self.samples[self.position..self.position + length].to_vec();
        self.position += length;
        Ok(Some(sequence))
    }

    fn description(&self) -> String {
        format!("file {}", self.path.display())
    }
}

/// First channel of a WAV file, scaled to [-1, 1] for integer formats
fn read_wav_samples(path: &Path) -> Result<Vec<f64>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut reader = WavReader::new(BufReader::new(file))
        .with_context(|| format!("Failed to read WAV header of {}", path.display()))?;
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    info!("Opened WAV file: {}", path.display());
    info!("  Sample rate: {} Hz", spec.sample_rate);
    info!("  Channels: {}", spec.channels);
    info!("  Bits per sample: {}", spec.bits_per_sample);

    let interleaved: Vec<f64> = match spec.sample_format {
        hound::SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f64;
            reader
                .samples::<i32>()
                .map(|s| s.map(|v| v as f64 / scale))
                .collect::<Result<_, _>>()
                .context("Failed to decode WAV samples")?
        }
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|s| s.map(f64::from))
            .collect::<Result<_, _>>()
            .context("Failed to decode WAV samples")?,
    };

    Ok(interleaved.into_iter().step_by(channels).collect())
}

/// Whitespace or comma separated numbers; `#` starts a comment
fn read_text_samples(path: &Path) -> Result<Vec<f64>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let mut samples = Vec::new();
    for (line_number, line) in contents.lines().enumerate() {
        let line = line.split('#').next().unwrap_or_default();
        for token in line
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|t| !t.is_empty())
        {
            let value: f64 = token.parse().with_context(|| {
                format!(
                    "Invalid sample '{}' at {}:{}",
                    token,
                    path.display(),
                    line_number + 1
                )
            })?;
            samples.push(value);
        }
    }
    Ok(samples)
}

/// Pulse sequences produced by the pulse train simulator
pub struct SimulatedSource {
    simulator: PulseTrainSimulator,
    remaining: Option<u64>,
}

impl SimulatedSource {
    /// Simulated source yielding `records` sequences, or forever when zero
    pub fn new(config: SimulatedSourceConfig, records: u64) -> Self {
        Self {
            simulator: PulseTrainSimulator::new(config),
            remaining: (records > 0).then_some(records),
        }
    }

    pub fn crest_indices(&self) -> Vec<usize> {
        self.simulator.crest_indices()
    }
}

impl PulseSequenceSource for SimulatedSource {
    fn next_sequence(&mut self) -> Result<Option<Vec<f64>>> {
        match &mut self.remaining {
            Some(0) => return Ok(None),
            Some(remaining) => *remaining -= 1,
            None => {}
        }
        Ok(Some(self.simulator.next_sequence()))
    }

    fn description(&self) -> String {
        let config = self.simulator.config();
        format!(
            "simulated pulse train ({} samples, period {})",
            config.sequence_length, config.pulse_period
        )
    }
}

/// Get a pulse sequence source from the specified file
pub fn get_source_from_file<P: AsRef<Path>>(
    path: P,
    sequence_length: usize,
) -> Result<Box<dyn PulseSequenceSource>> {
    Ok(Box::new(FileSource::new(path, sequence_length)?))
}

/// Get the simulated pulse sequence source
pub fn get_simulated_source(config: &AcquisitionConfig) -> Box<dyn PulseSequenceSource> {
    Box::new(SimulatedSource::new(
        config.simulated.clone(),
        config.records,
    ))
}

/// Get the source selected by the acquisition configuration
pub fn get_source(config: &AcquisitionConfig) -> Result<Box<dyn PulseSequenceSource>> {
    match &config.input_file {
        Some(path) => get_source_from_file(path, config.sequence_length),
        None => Ok(get_simulated_source(config)),
    }
}

/// Get a source that is guaranteed to run out.
///
/// Batch processing waits for the source to be exhausted, so an unlimited
/// simulated source (`records == 0`) is refused here.
pub fn get_finite_source(config: &AcquisitionConfig) -> Result<Box<dyn PulseSequenceSource>> {
    if config.input_file.is_none() && config.records == 0 {
        return Err(anyhow!(
            "An unlimited simulated source never ends in batch mode, set records or use daemon mode"
        ));
    }
    get_source(config)
}
