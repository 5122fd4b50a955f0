// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).
//!
//! Spectral module
//!
//! This module handles the frequency-domain side of the pipeline:
//! Fourier transform of working buffers, phase extraction, phase
//! correction and the corrected spectrum container.

pub mod fft;
pub mod phase;
pub mod spectrum;
pub mod synthesizer;

pub use fft::{FourierTransform, RustFftTransform};
pub use phase::{PhaseEstimator, PhaseExtractor};
pub use spectrum::Spectrum;
pub use synthesizer::PhaseSynthesizer;

/// Create the default Fourier transform
pub fn create_fourier_transform() -> Box<dyn FourierTransform> {
    Box::new(RustFftTransform::new())
}
