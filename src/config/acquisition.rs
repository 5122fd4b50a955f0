// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Data acquisition configuration
//!
//! This module defines where pulse sequences come from and how often they
//! are read and reported on.

use serde::{Deserialize, Serialize};

/// Configuration for the pulse sequence source.
///
/// When `input_file` is set, sequences are read from that file (WAV, or plain
/// text with one sample per line). Otherwise the simulated source is used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AcquisitionConfig {
    /// Path to a WAV or text file holding pulse sequences
    #[serde(default)]
    pub input_file: Option<String>,

    /// Number of samples per pulse sequence read from a file.
    /// Zero reads the whole file as a single sequence.
    #[serde(default = "default_sequence_length")]
    pub sequence_length: usize,

    /// Synthetic interferogram settings
    #[serde(default)]
    pub simulated: SimulatedSourceConfig,

    /// Number of sequences to acquire, zero for unlimited
    #[serde(default = "default_records")]
    pub records: u64,

    /// Delay between two acquisitions in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Period of the accumulation report in daemon mode, in milliseconds
    #[serde(default = "default_report_interval_ms")]
    pub report_interval_ms: u64,
}

fn default_sequence_length() -> usize {
    8192
}

fn default_records() -> u64 {
    100
}

fn default_interval_ms() -> u64 {
    10
}

fn default_report_interval_ms() -> u64 {
    1000
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            input_file: None,
            sequence_length: default_sequence_length(),
            simulated: SimulatedSourceConfig::default(),
            records: default_records(),
            interval_ms: default_interval_ms(),
            report_interval_ms: default_report_interval_ms(),
        }
    }
}

/// Settings of the synthetic pulse train generator.
///
/// Each burst is a cosine carrier under a Gaussian envelope, centered on a
/// crest. Crests repeat every `pulse_period` samples starting at
/// `first_crest`, and Gaussian noise of standard deviation `noise_amplitude`
/// is added to the whole sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedSourceConfig {
    /// Samples per generated sequence
    #[serde(default = "default_sim_sequence_length")]
    pub sequence_length: usize,

    /// Crest-to-crest distance in samples
    #[serde(default = "default_pulse_period")]
    pub pulse_period: usize,

    /// Index of the first crest
    #[serde(default = "default_first_crest")]
    pub first_crest: usize,

    /// Standard deviation of the Gaussian envelope, in samples
    #[serde(default = "default_burst_width")]
    pub burst_width: f64,

    /// Carrier frequency in cycles per sample (0 < f < 0.5)
    #[serde(default = "default_carrier_frequency")]
    pub carrier_frequency: f64,

    /// Peak amplitude of each burst
    #[serde(default = "default_amplitude")]
    pub amplitude: f64,

    /// Standard deviation of the additive noise
    #[serde(default = "default_noise_amplitude")]
    pub noise_amplitude: f64,

    /// Seed of the noise generator
    #[serde(default = "default_seed")]
    pub seed: u32,
}

fn default_sim_sequence_length() -> usize {
    8192
}

fn default_pulse_period() -> usize {
    2000
}

fn default_first_crest() -> usize {
    1000
}

fn default_burst_width() -> f64 {
    12.0
}

fn default_carrier_frequency() -> f64 {
    0.12
}

fn default_amplitude() -> f64 {
    1.0
}

fn default_noise_amplitude() -> f64 {
    0.01
}

fn default_seed() -> u32 {
    12345
}

impl Default for SimulatedSourceConfig {
    fn default() -> Self {
        Self {
            sequence_length: default_sim_sequence_length(),
            pulse_period: default_pulse_period(),
            first_crest: default_first_crest(),
            burst_width: default_burst_width(),
            carrier_frequency: default_carrier_frequency(),
            amplitude: default_amplitude(),
            noise_amplitude: default_noise_amplitude(),
            seed: default_seed(),
        }
    }
}
