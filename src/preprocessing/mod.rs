// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).
//! Pulse preprocessing module
//!
//! This module prepares extracted pulses for the Fourier transform,
//! including zero filling and apodization.

pub mod apodizer;
pub mod zero_fill;

pub use apodizer::{ApodizationWindow, Apodizer};
pub use zero_fill::{zero_filled_length, PulsePreprocessor};

use crate::error::PipelineError;

/// Create a pulse preprocessor with the given zero fill factor
pub fn create_pulse_preprocessor(zero_fill_factor: u32) -> Result<PulsePreprocessor, PipelineError> {
    PulsePreprocessor::new(zero_fill_factor)
}

/// Create an apodization window with an empty weight cache
pub fn create_apodization_window(apodizer: Apodizer) -> ApodizationWindow {
    ApodizationWindow::new(apodizer)
}
