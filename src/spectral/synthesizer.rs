// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Phase correction of transformed pulses

use num_complex::Complex64;
use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// How a phase-corrected bin is written to the output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseSynthesizer {
    /// `out[i] = spectrum[i] * exp(-i * phase[i])`
    Complex,
    /// `out[i] = re * cos(phase[i]) + im * sin(phase[i])`, stored with a zero
    /// imaginary part
    #[default]
    Real,
}

impl PhaseSynthesizer {
    /// Write the phase-corrected `spectrum` into `out`.
    ///
    /// All three slices must have the same length; nothing is written when
    /// they differ.
    pub fn synthesize(
        &self,
        spectrum: &[Complex64],
        phase: &[f64],
        out: &mut [Complex64],
    ) -> Result<(), PipelineError> {
        if spectrum.len() != phase.len() || spectrum.len() != out.len() {
            return Err(PipelineError::contract(format!(
                "synthesizer length mismatch: spectrum {}, phase {}, output {}",
                spectrum.len(),
                phase.len(),
                out.len()
            )));
        }

        let bins = spectrum.iter().zip(phase).zip(out.iter_mut());
        match self {
            PhaseSynthesizer::Complex => {
                for ((&value, &angle), slot) in bins {
                    *slot = value * Complex64::from_polar(1.0, -angle);
                }
            }
            PhaseSynthesizer::Real => {
                for ((&value, &angle), slot) in bins {
                    let (sin, cos) = angle.sin_cos();
                    *slot = Complex64::new(value.re * cos + value.im * sin, 0.0);
                }
            }
        }
        Ok(())
    }

    /// Whether the corrected output carries an imaginary channel
    pub fn is_complex(&self) -> bool {
        matches!(self, PhaseSynthesizer::Complex)
    }
}
