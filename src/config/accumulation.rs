// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Accumulation configuration
//!
//! This module defines how every pulse sequence is sliced, zero filled,
//! apodized and phase corrected before being accumulated.

use serde::{Deserialize, Serialize};

use crate::preprocessing::Apodizer;
use crate::slicing::{CrestAlignment, Ruler};
use crate::spectral::{PhaseExtractor, PhaseSynthesizer};

/// Configuration of the per-sequence accumulation chain.
///
/// ```yaml
/// accumulation:
///   ruler:
///     type: min_common_length
///   synthesizer: real
///   zero_fill_factor: 1
///   apodizer: none
///   phase_extractor:
///     type: center_interpolation
///     center_half_width: 64
///   alignment:
///     type: center
///   auto_flip: false
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulationConfig {
    /// How the common slice length is measured from the crest positions
    #[serde(default)]
    pub ruler: Ruler,

    /// Complex or real-valued phase correction output
    #[serde(default)]
    pub synthesizer: PhaseSynthesizer,

    /// Zero filling exponent. The working buffer holds
    /// `2^(floor(log2(slice_length)) + zero_fill_factor)` samples.
    /// Must be at least 1.
    #[serde(default = "default_zero_fill_factor")]
    pub zero_fill_factor: u32,

    /// Window applied to every pulse before the transform
    #[serde(default)]
    pub apodizer: Apodizer,

    /// Source of the phase removed from every bin
    #[serde(default)]
    pub phase_extractor: PhaseExtractor,

    /// Position of the crest inside each slice
    #[serde(default = "default_alignment")]
    pub alignment: CrestAlignment,

    /// Negate corrected spectra whose mid band sums below zero
    #[serde(default)]
    pub auto_flip: bool,
}

fn default_zero_fill_factor() -> u32 {
    1
}

fn default_alignment() -> CrestAlignment {
    CrestAlignment::Center
}

impl Default for AccumulationConfig {
    fn default() -> Self {
        Self {
            ruler: Ruler::default(),
            synthesizer: PhaseSynthesizer::default(),
            zero_fill_factor: default_zero_fill_factor(),
            apodizer: Apodizer::default(),
            phase_extractor: PhaseExtractor::default(),
            alignment: default_alignment(),
            auto_flip: false,
        }
    }
}
