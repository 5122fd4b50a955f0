// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Phase extraction for Mertz-style phase correction
//!
//! A [`PhaseExtractor`] decides which phase error is removed from every bin of
//! a transformed pulse. [`PhaseEstimator`] owns the scratch buffers needed to
//! compute it so that repeated calls do not allocate.

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use super::fft::FourierTransform;
use crate::error::FailureCategory;

/// Strategy used to obtain the phase array of a pulse
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PhaseExtractor {
    /// No correction, every phase is zero
    Zero,
    /// Phase of each bin of the full-resolution spectrum
    Fourier,
    /// Low-resolution phase from a short window around the crest,
    /// linearly interpolated onto the full spectrum
    CenterInterpolation { center_half_width: usize },
}

impl Default for PhaseExtractor {
    fn default() -> Self {
        PhaseExtractor::CenterInterpolation {
            center_half_width: 64,
        }
    }
}

/// Phase extractor together with its reusable working buffers
#[derive(Debug, Clone)]
pub struct PhaseEstimator {
    extractor: PhaseExtractor,
    // Periodic Hann weights for the center window, symmetric about the crest
    window: Vec<f64>,
    center: Vec<Complex64>,
    center_phase: Vec<f64>,
}

impl PhaseEstimator {
    pub fn new(extractor: PhaseExtractor) -> Self {
        Self {
            extractor,
            window: Vec::new(),
            center: Vec::new(),
            center_phase: Vec::new(),
        }
    }

    pub fn extractor(&self) -> PhaseExtractor {
        self.extractor
    }

    /// Fill `phase` with one angle per bin of `spectrum`.
    ///
    /// `pulse` is the zero-filled working buffer the spectrum was computed
    /// from and `crest_offset` the crest position inside it. `spectrum` holds
    /// the first `pulse.len() / 2` bins.
    pub fn extract(
        &mut self,
        transform: &mut dyn FourierTransform,
        pulse: &[f64],
        crest_offset: usize,
        spectrum: &[Complex64],
        phase: &mut [f64],
    ) -> Result<(), FailureCategory> {
        if phase.len() != spectrum.len() {
            return Err(FailureCategory::PhaseExtractionFailed);
        }

        match self.extractor {
            PhaseExtractor::Zero => phase.fill(0.0),
            PhaseExtractor::Fourier => {
                for (angle, bin) in phase.iter_mut().zip(spectrum) {
                    *angle = bin.arg();
                }
            }
            PhaseExtractor::CenterInterpolation { center_half_width } => {
                self.center_phase(transform, pulse, crest_offset, center_half_width)?;
                interpolate_phase(&self.center_phase, 2 * center_half_width, pulse.len(), phase);
            }
        }
        Ok(())
    }

    /// Phase of the positive half of the transformed center window
    fn center_phase(
        &mut self,
        transform: &mut dyn FourierTransform,
        pulse: &[f64],
        crest_offset: usize,
        half_width: usize,
    ) -> Result<(), FailureCategory> {
        let width = 2 * half_width;
        let start = crest_offset
            .checked_sub(half_width)
            .filter(|_| half_width > 0)
            .ok_or(FailureCategory::PhaseExtractionFailed)?;
        let burst = pulse
            .get(start..start + width)
            .ok_or(FailureCategory::PhaseExtractionFailed)?;

        self.center.clear();
        self.center
            .extend(burst.iter().map(|&x| Complex64::new(x, 0.0)));
        if self.window.len() != width {
            self.window = (0..width)
                .map(|i| 0.5 * (1.0 - (2.0 * std::f64::consts::PI * i as f64 / width as f64).cos()))
                .collect();
        }
        for (sample, &weight) in self.center.iter_mut().zip(&self.window) {
            *sample *= weight;
        }
        // Crest to index zero so the phase of a symmetric burst is flat
        self.center.rotate_left(half_width);
        transform.forward(&mut self.center);

        self.center_phase.clear();
        self.center_phase
            .extend(self.center[..=half_width].iter().map(|bin| bin.arg()));
        Ok(())
    }
}

/// Linearly interpolate the phase of a `center_length`-point spectrum onto
/// the first bins of a `full_length`-point spectrum
fn interpolate_phase(center_phase: &[f64], center_length: usize, full_length: usize, out: &mut [f64]) {
    let last = center_phase.len() - 1;
    let scale = center_length as f64 / full_length as f64;
    for (i, slot) in out.iter_mut().enumerate() {
        let x = i as f64 * scale;
        let lower = (x.floor() as usize).min(last);
        let upper = (lower + 1).min(last);
        let t = x - lower as f64;
        *slot = center_phase[lower] * (1.0 - t) + center_phase[upper] * t;
    }
}
