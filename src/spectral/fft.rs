// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! FFT implementation for pulse transforms

use std::sync::Arc;

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner, Length};

/// Trait for implementing the forward Fourier transform of a working buffer
///
/// The accumulator does not care how the transform is computed. Hosts may
/// supply their own implementation; [`RustFftTransform`] is the default.
pub trait FourierTransform: Send {
    /// Transform `buffer` in place (forward, unnormalized)
    fn forward(&mut self, buffer: &mut [Complex64]);
}

/// Forward FFT backed by `rustfft`, with plans and scratch cached per length
pub struct RustFftTransform {
    planner: FftPlanner<f64>,
    plan: Option<Arc<dyn Fft<f64>>>,
    scratch: Vec<Complex64>,
}

impl RustFftTransform {
    pub fn new() -> Self {
        Self {
            planner: FftPlanner::new(),
            plan: None,
            scratch: Vec::new(),
        }
    }

    fn plan_for(&mut self, length: usize) -> Arc<dyn Fft<f64>> {
        match &self.plan {
            Some(plan) if plan.len() == length => Arc::clone(plan),
            _ => {
                let plan = self.planner.plan_fft_forward(length);
                let scratch_len = plan.get_inplace_scratch_len();
                if self.scratch.len() < scratch_len {
                    self.scratch.resize(scratch_len, Complex64::new(0.0, 0.0));
                }
                self.plan = Some(Arc::clone(&plan));
                plan
            }
        }
    }
}

impl Default for RustFftTransform {
    fn default() -> Self {
        Self::new()
    }
}

impl FourierTransform for RustFftTransform {
    fn forward(&mut self, buffer: &mut [Complex64]) {
        if buffer.is_empty() {
            return;
        }
        let plan = self.plan_for(buffer.len());
        let scratch_len = plan.get_inplace_scratch_len();
        plan.process_with_scratch(buffer, &mut self.scratch[..scratch_len]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn naive_dft(input: &[Complex64]) -> Vec<Complex64> {
        let n = input.len();
        (0..n)
            .map(|k| {
                input
                    .iter()
                    .enumerate()
                    .map(|(t, &x)| {
                        let angle = -2.0 * std::f64::consts::PI * (k * t) as f64 / n as f64;
                        x * Complex64::new(angle.cos(), angle.sin())
                    })
                    .sum()
            })
            .collect()
    }

    #[test]
    fn test_matches_naive_dft() {
        let input: Vec<Complex64> = (0..12)
            .map(|i| Complex64::new((i as f64 * 0.7).sin(), 0.0))
            .collect();
        let expected = naive_dft(&input);

        let mut transform = RustFftTransform::new();
        let mut buffer = input.clone();
        transform.forward(&mut buffer);

        for (a, b) in buffer.iter().zip(&expected) {
            assert_relative_eq!(a.re, b.re, epsilon = 1e-9);
            assert_relative_eq!(a.im, b.im, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_replans_on_length_change() {
        let mut transform = RustFftTransform::new();
        let mut short = vec![Complex64::new(1.0, 0.0); 4];
        transform.forward(&mut short);
        assert_relative_eq!(short[0].re, 4.0, epsilon = 1e-12);

        let mut long = vec![Complex64::new(1.0, 0.0); 16];
        transform.forward(&mut long);
        assert_relative_eq!(long[0].re, 16.0, epsilon = 1e-12);
        assert_relative_eq!(long[1].norm(), 0.0, epsilon = 1e-9);
    }
}
