// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Apodization windows applied to pulses before the transform

use serde::{Deserialize, Serialize};

/// Available apodization windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Apodizer {
    /// Leave the pulse untouched
    #[default]
    None,
    /// Hann window over the pulse samples
    Hann,
    /// Hamming window over the pulse samples, never reaching zero
    Hamming,
    /// Linear ramp rising to 1 at the crest and falling back to 0
    Triangular,
}

impl Apodizer {
    /// Weight of sample `i` in a pulse of `length` samples whose crest is at `peak`
    pub fn weight(&self, i: usize, length: usize, peak: usize) -> f64 {
        match self {
            Apodizer::None => 1.0,
            Apodizer::Hann => {
                if length < 2 {
                    return 1.0;
                }
                0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / (length - 1) as f64).cos())
            }
            Apodizer::Hamming => {
                if length < 2 {
                    return 1.0;
                }
                0.53836 - 0.46164 * (2.0 * std::f64::consts::PI * i as f64 / (length - 1) as f64).cos()
            }
            Apodizer::Triangular => {
                let peak = peak.min(length.saturating_sub(1));
                if i <= peak {
                    if peak == 0 {
                        1.0
                    } else {
                        i as f64 / peak as f64
                    }
                } else {
                    1.0 - (i - peak) as f64 / (length - peak - 1) as f64
                }
            }
        }
    }
}

/// Apodizer with its weights cached for the last (length, peak) pair
#[derive(Debug, Clone, Default)]
pub struct ApodizationWindow {
    apodizer: Apodizer,
    key: (usize, usize),
    weights: Vec<f64>,
}

impl ApodizationWindow {
    pub fn new(apodizer: Apodizer) -> Self {
        Self {
            apodizer,
            key: (0, 0),
            weights: Vec::new(),
        }
    }

    pub fn apodizer(&self) -> Apodizer {
        self.apodizer
    }

    /// Weights for a pulse of `length` samples peaking at `peak`, or `None`
    /// when no apodization is configured
    pub fn weights(&mut self, length: usize, peak: usize) -> Option<&[f64]> {
        if self.apodizer == Apodizer::None {
            return None;
        }
        if self.key != (length, peak) || self.weights.len() != length {
            let apodizer = self.apodizer;
            self.weights.clear();
            self.weights
                .extend((0..length).map(|i| apodizer.weight(i, length, peak)));
            self.key = (length, peak);
        }
        Some(&self.weights)
    }

    /// Multiply the first `weights.len()` samples of `signal` in place
    pub fn apply(&mut self, signal: &mut [f64], length: usize, peak: usize) {
        let length = length.min(signal.len());
        if let Some(weights) = self.weights(length, peak) {
            for (sample, &weight) in signal.iter_mut().zip(weights) {
                *sample *= weight;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_none_is_identity() {
        let mut window = ApodizationWindow::new(Apodizer::None);
        let mut signal = vec![1.0, 2.0, 3.0];
        window.apply(&mut signal, 3, 1);
        assert_eq!(signal, vec![1.0, 2.0, 3.0]);
        assert!(window.weights(3, 1).is_none());
    }

    #[test]
    fn test_triangular_peaks_at_crest() {
        let mut window = ApodizationWindow::new(Apodizer::Triangular);
        let weights = window.weights(5, 2).unwrap().to_vec();
        assert_relative_eq!(weights[0], 0.0);
        assert_relative_eq!(weights[1], 0.5);
        assert_relative_eq!(weights[2], 1.0);
        assert_relative_eq!(weights[3], 0.5);
        assert_relative_eq!(weights[4], 0.0);
    }

    #[test]
    fn test_hann_endpoints_and_center() {
        let mut window = ApodizationWindow::new(Apodizer::Hann);
        let weights = window.weights(5, 2).unwrap().to_vec();
        assert_relative_eq!(weights[0], 0.0, epsilon = 1e-12);
        assert_relative_eq!(weights[2], 1.0, epsilon = 1e-12);
        assert_relative_eq!(weights[4], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn test_hamming_endpoints_and_center() {
        let mut window = ApodizationWindow::new(Apodizer::Hamming);
        let weights = window.weights(5, 2).unwrap().to_vec();
        assert_relative_eq!(weights[0], 0.07672, epsilon = 1e-12);
        assert_relative_eq!(weights[2], 1.0, epsilon = 1e-12);
        assert_relative_eq!(weights[4], 0.07672, epsilon = 1e-12);
        assert_relative_eq!(weights[1], weights[3], epsilon = 1e-12);
    }

    #[test]
    fn test_apply_only_touches_pulse_region() {
        let mut window = ApodizationWindow::new(Apodizer::Triangular);
        let mut signal = vec![1.0; 8];
        window.apply(&mut signal, 5, 2);
        assert_relative_eq!(signal[2], 1.0);
        assert_relative_eq!(signal[4], 0.0);
        assert_eq!(&signal[5..], &[1.0, 1.0, 1.0]);
    }
}
