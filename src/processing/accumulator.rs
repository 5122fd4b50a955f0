// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Per-sequence pulse accumulation
//!
//! An [`Accumulator`] turns one pulse sequence into one phase-corrected
//! spectrum: crests are located, the sequence is cut into windows, every
//! window is zero filled, apodized, transformed and phase corrected, and the
//! corrected half spectra are summed. Failures never escape as errors; they
//! come back as [`AccumulationResult`] values so the stream keeps going.
//!
//! An accumulator owns all of its working buffers and must be used by one
//! worker at a time. Pipelines hand them out through an
//! [`ObjectPool`](super::pool::ObjectPool).

use std::sync::Arc;

use log::{debug, warn};
use num_complex::Complex64;

use super::result::AccumulationResult;
use crate::config::AccumulationConfig;
use crate::error::{FailureCategory, PipelineError};
use crate::preprocessing::{
    create_apodization_window, create_pulse_preprocessor, ApodizationWindow, PulsePreprocessor,
};
use crate::slicing::{CrestFinder, SliceInfo, Slicer};
use crate::spectral::{
    create_fourier_transform, FourierTransform, PhaseEstimator, PhaseSynthesizer, Spectrum,
};

/// Phase-correcting accumulator for one worker
pub struct Accumulator {
    crest_finder: Arc<dyn CrestFinder>,
    slicer: Slicer,
    preprocessor: PulsePreprocessor,
    apodization: ApodizationWindow,
    transform: Box<dyn FourierTransform>,
    phase: PhaseEstimator,
    synthesizer: PhaseSynthesizer,
    auto_flip: bool,

    complex_buffer: Vec<Complex64>,
    phase_array: Vec<f64>,
    corrected: Vec<Complex64>,
}

/// Validated settings from which independent accumulators are built
///
/// Construction checks the configuration once; [`AccumulatorFactory::create`]
/// is then infallible, which is what an object pool factory needs.
/// Accumulators from one factory share the working buffer capacity fixed by
/// the first pulse any of them sees, so their spectra always fold together.
#[derive(Clone)]
pub struct AccumulatorFactory {
    config: AccumulationConfig,
    crest_finder: Arc<dyn CrestFinder>,
    preprocessor: PulsePreprocessor,
}

impl AccumulatorFactory {
    pub fn new(config: &AccumulationConfig, crest_finder: Arc<dyn CrestFinder>) -> Result<Self, PipelineError> {
        Ok(Self {
            config: config.clone(),
            crest_finder,
            preprocessor: create_pulse_preprocessor(config.zero_fill_factor)?,
        })
    }

    /// Build a fresh accumulator with empty working buffers
    pub fn create(&self) -> Accumulator {
        let config = &self.config;
        Accumulator {
            crest_finder: Arc::clone(&self.crest_finder),
            slicer: Slicer::new(config.ruler, config.alignment),
            preprocessor: self.preprocessor.clone(),
            apodization: create_apodization_window(config.apodizer),
            transform: create_fourier_transform(),
            phase: PhaseEstimator::new(config.phase_extractor),
            synthesizer: config.synthesizer,
            auto_flip: config.auto_flip,
            complex_buffer: Vec::new(),
            phase_array: Vec::new(),
            corrected: Vec::new(),
        }
    }
}

impl Accumulator {
    /// Build an accumulator from its configuration section.
    ///
    /// Fails when the zero fill factor is zero.
    pub fn new(config: &AccumulationConfig, crest_finder: Arc<dyn CrestFinder>) -> Result<Self, PipelineError> {
        Ok(AccumulatorFactory::new(config, crest_finder)?.create())
    }

    /// Replace the Fourier transform used for every pulse
    pub fn with_transform(mut self, transform: Box<dyn FourierTransform>) -> Self {
        self.transform = transform;
        self
    }

    pub fn synthesizer(&self) -> PhaseSynthesizer {
        self.synthesizer
    }

    /// Locate crests with the configured finder and process the sequence
    pub fn process(&mut self, pulse_sequence: &[f64]) -> AccumulationResult {
        let crest_indices = self.crest_finder.find(pulse_sequence);
        match self.process_with_crests(pulse_sequence, &crest_indices) {
            Ok(result) => result,
            Err(e) => {
                // Finder output that breaks the slicing contract
                warn!("Crest finder returned unusable crests: {}", e);
                AccumulationResult::from_failure(FailureCategory::NoSliceValid, 1)
            }
        }
    }

    /// Process a sequence whose crest indices were computed by the caller.
    ///
    /// Pulse failures are returned as failed results. `Err` is reserved for
    /// contract violations such as unordered crest indices.
    pub fn process_with_crests(
        &mut self,
        pulse_sequence: &[f64],
        crest_indices: &[usize],
    ) -> Result<AccumulationResult, PipelineError> {
        if crest_indices.is_empty() {
            debug!("No crest in a sequence of {} samples", pulse_sequence.len());
            return Ok(AccumulationResult::from_failure(FailureCategory::NoPeakFound, 1));
        }

        match self.accumulate(pulse_sequence, crest_indices) {
            Ok(spectrum) => Ok(AccumulationResult::from_success(spectrum)),
            Err(PipelineError::Pulse(category)) => {
                debug!("Pulse sequence rejected: {}", category);
                Ok(AccumulationResult::from_failure(category, 1))
            }
            Err(e) => Err(e),
        }
    }

    fn accumulate(&mut self, pulse_sequence: &[f64], crest_indices: &[usize]) -> Result<Spectrum, PipelineError> {
        let (slice_length, slices) = self.slicer.slice(crest_indices, pulse_sequence.len())?;
        if slices.is_empty() {
            debug!(
                "No window of {} samples fits around {} crests",
                slice_length,
                crest_indices.len()
            );
            return Err(FailureCategory::NoSliceValid.into());
        }

        let mut sum: Vec<Complex64> = Vec::new();
        for slice in &slices {
            self.correct_pulse(pulse_sequence, slice)?;
            if sum.is_empty() {
                sum = self.corrected.clone();
            } else {
                for (total, bin) in sum.iter_mut().zip(&self.corrected) {
                    *total += bin;
                }
            }
        }

        Ok(Spectrum::new(sum, slices.len() as u64))
    }

    /// Correct one pulse window into `self.corrected`
    fn correct_pulse(&mut self, pulse_sequence: &[f64], slice: &SliceInfo) -> Result<(), PipelineError> {
        let pulse = self.preprocessor.retrieve(
            pulse_sequence,
            slice.start_index,
            slice.crest_offset,
            slice.length,
        )?;
        let length = pulse.len();
        let half = length / 2;

        self.complex_buffer.clear();
        self.complex_buffer
            .extend(pulse.iter().map(|&x| Complex64::new(x, 0.0)));
        if let Some(weights) = self
            .apodization
            .weights(slice.length.min(length), slice.crest_offset)
        {
            for (sample, &weight) in self.complex_buffer.iter_mut().zip(weights) {
                *sample *= weight;
            }
        }
        self.transform.forward(&mut self.complex_buffer);

        self.phase_array.resize(half, 0.0);
        self.corrected.resize(half, Complex64::new(0.0, 0.0));
        let spectrum = &self.complex_buffer[..half];

        self.phase.extract(
            self.transform.as_mut(),
            pulse,
            slice.crest_offset,
            spectrum,
            &mut self.phase_array,
        )?;
        self.synthesizer
            .synthesize(spectrum, &self.phase_array, &mut self.corrected)?;

        if self.corrected.iter().any(|bin| !bin.is_finite()) {
            return Err(FailureCategory::NonFiniteSpectrum.into());
        }

        if self.auto_flip {
            let reference: f64 = self.corrected[half / 4..half / 2].iter().map(|b| b.re).sum();
            if reference < 0.0 {
                for bin in &mut self.corrected {
                    *bin = -*bin;
                }
            }
        }
        Ok(())
    }
}
