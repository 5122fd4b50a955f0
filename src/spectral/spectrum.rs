// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Phase-corrected spectrum container

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::FailureCategory;

/// Sum of one or more phase-corrected pulse spectra
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Spectrum {
    bins: Vec<Complex64>,
    pulse_count: u64,
}

impl Spectrum {
    /// Spectrum built from `pulse_count` pulses whose corrected bins summed to `bins`
    pub fn new(bins: Vec<Complex64>, pulse_count: u64) -> Self {
        Self { bins, pulse_count }
    }

    /// Spectrum of a single real-valued channel
    pub fn from_real(values: &[f64], pulse_count: u64) -> Self {
        Self::new(
            values.iter().map(|&re| Complex64::new(re, 0.0)).collect(),
            pulse_count,
        )
    }

    pub fn bins(&self) -> &[Complex64] {
        &self.bins
    }

    pub fn pulse_count(&self) -> u64 {
        self.pulse_count
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }

    /// Add another spectrum into this one, bin by bin
    pub fn absorb(&mut self, other: &Spectrum) -> Result<(), FailureCategory> {
        if other.bins.len() != self.bins.len() {
            return Err(FailureCategory::SpectrumLengthMismatch);
        }
        for (sum, bin) in self.bins.iter_mut().zip(&other.bins) {
            *sum += bin;
        }
        self.pulse_count += other.pulse_count;
        Ok(())
    }

    /// Per-pulse average of the accumulated bins
    pub fn average(&self) -> Spectrum {
        let divisor = self.pulse_count.max(1) as f64;
        Spectrum::new(self.bins.iter().map(|b| *b / divisor).collect(), 1)
    }

    pub fn real(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.re).collect()
    }

    pub fn imag(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.im).collect()
    }

    /// Squared magnitude of each bin
    pub fn intensity(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.norm_sqr()).collect()
    }

    pub fn magnitude(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.norm()).collect()
    }

    pub fn phase(&self) -> Vec<f64> {
        self.bins.iter().map(|b| b.arg()).collect()
    }

    /// Whether any bin carries an imaginary component
    pub fn has_imag(&self) -> bool {
        self.bins.iter().any(|b| b.im != 0.0)
    }

    /// Whether every bin is a finite number
    pub fn is_finite(&self) -> bool {
        self.bins.iter().all(|b| b.is_finite())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absorb_sums_bins_and_counts() {
        let mut total = Spectrum::from_real(&[1.0, 2.0], 1);
        total.absorb(&Spectrum::from_real(&[3.0, 4.0], 2)).unwrap();
        assert_eq!(total.real(), vec![4.0, 6.0]);
        assert_eq!(total.pulse_count(), 3);
        assert!(!total.has_imag());
    }

    #[test]
    fn test_absorb_rejects_length_mismatch() {
        let mut total = Spectrum::from_real(&[1.0, 2.0], 1);
        let err = total.absorb(&Spectrum::from_real(&[1.0], 1)).unwrap_err();
        assert_eq!(err, FailureCategory::SpectrumLengthMismatch);
        assert_eq!(total.real(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_average_and_accessors() {
        let spectrum = Spectrum::new(vec![Complex64::new(6.0, 8.0)], 2);
        let average = spectrum.average();
        assert_eq!(average.bins()[0], Complex64::new(3.0, 4.0));
        assert_eq!(spectrum.magnitude(), vec![10.0]);
        assert_eq!(spectrum.intensity(), vec![100.0]);
        assert!(spectrum.has_imag());
    }

    #[test]
    fn test_is_finite() {
        assert!(Spectrum::from_real(&[1.0], 1).is_finite());
        assert!(!Spectrum::from_real(&[f64::NAN], 1).is_finite());
    }
}
