// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Gaussian Noise Generator
//!
//! Lightweight Gaussian white noise for synthetic pulse sequences:
//!
//! * Fast XORShift pseudo-random number generation
//! * Box-Muller transform for Gaussian distribution
//! * Deterministic output for a given seed
//!
//! ## Examples
//!
//! ```rust
//! use rust_interferometry::utility::noise_generator::NoiseGenerator;
//!
//! let mut generator = NoiseGenerator::new(12345);
//!
//! // 1000 samples of noise with a standard deviation of 0.05
//! let noise = generator.generate(1000, 0.05);
//! assert_eq!(noise.len(), 1000);
//! ```

use std::time::SystemTime;

/// Random number generator using the XORShift algorithm.
///
/// Not suitable for cryptographic purposes.
#[derive(Debug, Clone)]
pub struct NoiseGenerator {
    rng_state: u32,
}

impl NoiseGenerator {
    /// Creates a new noise generator with a given seed.
    ///
    /// The same seed always produces the same sequence. A zero seed is
    /// replaced by a fixed non-zero value since XORShift never leaves zero.
    pub fn new(seed: u32) -> Self {
        Self {
            rng_state: if seed == 0 { 0x9E37_79B9 } else { seed },
        }
    }

    /// Creates a new noise generator seeded from the system time
    pub fn new_from_system_time() -> Self {
        let seed = SystemTime::now()
            .duration_since(SystemTime::UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as u32;
        Self::new(seed)
    }

    /// Random value in [-1.0, 1.0]
    pub fn random_float(&mut self) -> f64 {
        self.rng_state ^= self.rng_state << 13;
        self.rng_state ^= self.rng_state >> 17;
        self.rng_state ^= self.rng_state << 5;

        (self.rng_state as f64 / u32::MAX as f64) * 2.0 - 1.0
    }

    /// Random value from a standard Gaussian distribution.
    ///
    /// Box-Muller: `z = sqrt(-2 ln(u1)) * cos(2π u2)` with `u1`, `u2` uniform
    /// in (0, 1).
    pub fn random_gaussian(&mut self) -> f64 {
        let u1 = (self.random_float() + 1.0) / 2.0;
        let u2 = (self.random_float() + 1.0) / 2.0;

        // Avoid ln(0)
        let u1 = u1.max(1e-12);

        (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
    }

    /// `count` samples of Gaussian noise with standard deviation `std_dev`
    pub fn generate(&mut self, count: usize, std_dev: f64) -> Vec<f64> {
        (0..count).map(|_| self.random_gaussian() * std_dev).collect()
    }

    /// Add Gaussian noise with standard deviation `std_dev` to `signal`
    pub fn add_noise(&mut self, signal: &mut [f64], std_dev: f64) {
        if std_dev == 0.0 {
            return;
        }
        for sample in signal {
            *sample += self.random_gaussian() * std_dev;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_same_seed_same_sequence() {
        let a = NoiseGenerator::new(42).generate(64, 1.0);
        let b = NoiseGenerator::new(42).generate(64, 1.0);
        assert_eq!(a, b);
    }

    #[test]
    fn test_random_float_range() {
        let mut generator = NoiseGenerator::new(7);
        for _ in 0..10_000 {
            let value = generator.random_float();
            assert!((-1.0..=1.0).contains(&value));
        }
    }

    #[test]
    fn test_zero_seed_still_varies() {
        let mut generator = NoiseGenerator::new(0);
        let first = generator.random_float();
        let second = generator.random_float();
        assert_ne!(first, second);
    }

    #[test]
    fn test_gaussian_statistics() {
        let samples = NoiseGenerator::new(12345).generate(50_000, 2.0);
        let mean = samples.iter().sum::<f64>() / samples.len() as f64;
        let variance =
            samples.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / samples.len() as f64;
        assert!(mean.abs() < 0.1, "mean {}", mean);
        assert!((variance.sqrt() - 2.0).abs() < 0.1, "std {}", variance.sqrt());
    }
}
