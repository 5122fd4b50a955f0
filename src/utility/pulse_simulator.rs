// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Synthetic interferogram pulse trains
//!
//! Every burst is `amplitude * exp(-d² / 2σ²) * cos(2π f d)` where `d` is the
//! distance to its crest. Bursts repeat every `pulse_period` samples and
//! Gaussian noise is added on top.

use super::noise_generator::NoiseGenerator;
use crate::config::SimulatedSourceConfig;

/// Generator of pulse sequences with known crest positions
#[derive(Debug, Clone)]
pub struct PulseTrainSimulator {
    config: SimulatedSourceConfig,
    noise: NoiseGenerator,
    /// Burst shape sampled once, centered on index `half_span`
    burst: Vec<f64>,
    half_span: usize,
}

impl PulseTrainSimulator {
    pub fn new(config: SimulatedSourceConfig) -> Self {
        // The envelope is negligible beyond six standard deviations
        let half_span = (config.burst_width * 6.0).ceil() as usize;
        let burst = (0..=2 * half_span)
            .map(|i| {
                let d = i as f64 - half_span as f64;
                let envelope = (-d * d / (2.0 * config.burst_width * config.burst_width)).exp();
                config.amplitude
                    * envelope
                    * (2.0 * std::f64::consts::PI * config.carrier_frequency * d).cos()
            })
            .collect();
        let noise = NoiseGenerator::new(config.seed);
        Self {
            config,
            noise,
            burst,
            half_span,
        }
    }

    pub fn config(&self) -> &SimulatedSourceConfig {
        &self.config
    }

    /// Crest positions of every generated sequence
    pub fn crest_indices(&self) -> Vec<usize> {
        (self.config.first_crest..self.config.sequence_length)
            .step_by(self.config.pulse_period.max(1))
            .collect()
    }

    /// Generate the next pulse sequence. Noise differs between calls.
    pub fn next_sequence(&mut self) -> Vec<f64> {
        let length = self.config.sequence_length;
        let mut sequence = vec![0.0; length];
        for crest in self.crest_indices() {
            let start = crest as isize - self.half_span as isize;
            for (k, &value) in self.burst.iter().enumerate() {
                let index = start + k as isize;
                if index >= 0 && (index as usize) < length {
                    sequence[index as usize] += value;
                }
            }
        }
        self.noise
            .add_noise(&mut sequence, self.config.noise_amplitude);
        sequence
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn quiet_config() -> SimulatedSourceConfig {
        SimulatedSourceConfig {
            sequence_length: 4000,
            pulse_period: 1000,
            first_crest: 500,
            noise_amplitude: 0.0,
            ..SimulatedSourceConfig::default()
        }
    }

    #[test]
    fn test_crests_at_expected_positions() {
        let simulator = PulseTrainSimulator::new(quiet_config());
        assert_eq!(simulator.crest_indices(), vec![500, 1500, 2500, 3500]);
    }

    #[test]
    fn test_burst_peaks_at_crest() {
        let mut simulator = PulseTrainSimulator::new(quiet_config());
        let sequence = simulator.next_sequence();
        assert_relative_eq!(sequence[1500], 1.0, epsilon = 1e-12);
        let max = sequence[1000..2000]
            .iter()
            .cloned()
            .fold(f64::MIN, f64::max);
        assert_relative_eq!(max, 1.0, epsilon = 1e-12);
        assert_eq!(sequence[1000], 0.0);
    }

    #[test]
    fn test_noise_changes_between_sequences() {
        let mut config = quiet_config();
        config.noise_amplitude = 0.05;
        let mut simulator = PulseTrainSimulator::new(config);
        let a = simulator.next_sequence();
        let b = simulator.next_sequence();
        assert_ne!(a, b);
    }
}
