// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Zero-filled pulse extraction

use std::sync::{Arc, OnceLock};

use crate::error::{FailureCategory, PipelineError};

/// Length of a pulse of `pulse_length` samples after zero filling.
///
/// The result is `2^(floor(log2(pulse_length)) + zero_fill_factor)`, which is
/// always at least `pulse_length` for a factor of one or more and doubles with
/// every increment of the factor.
pub fn zero_filled_length(pulse_length: usize, zero_fill_factor: u32) -> Result<usize, PipelineError> {
    if pulse_length == 0 {
        return Err(PipelineError::contract("pulse length must be positive"));
    }
    if zero_fill_factor == 0 {
        return Err(PipelineError::contract("zero fill factor must be at least 1"));
    }
    let floor_log2 = usize::BITS - 1 - pulse_length.leading_zeros();
    1usize
        .checked_shl(floor_log2 + zero_fill_factor)
        .filter(|&length| length > 0)
        .ok_or_else(|| PipelineError::contract("zero filled length overflows"))
}

/// Extracts pulses into a reusable zero-padded working buffer
///
/// The buffer capacity is fixed by the first pulse length seen and kept for
/// the lifetime of the instance. Longer pulses are truncated to the capacity
/// rather than growing the buffer. One instance must not be shared by two
/// concurrent workers.
///
/// Clones share the capacity but not the buffer: whichever clone sees a
/// pulse first fixes the capacity for all of them, so every spectrum built
/// from the same family has the same length.
#[derive(Debug, Clone)]
pub struct PulsePreprocessor {
    zero_fill_factor: u32,
    capacity: Arc<OnceLock<usize>>,
    // Empty until the first retrieve on this instance
    zero_filled_space: Vec<f64>,
}

impl PulsePreprocessor {
    /// Create a preprocessor with the given zero fill factor (must be >= 1)
    pub fn new(zero_fill_factor: u32) -> Result<Self, PipelineError> {
        if zero_fill_factor == 0 {
            return Err(PipelineError::contract("zero fill factor must be at least 1"));
        }
        Ok(Self {
            zero_fill_factor,
            capacity: Arc::new(OnceLock::new()),
            zero_filled_space: Vec::new(),
        })
    }

    pub fn zero_fill_factor(&self) -> u32 {
        self.zero_fill_factor
    }

    /// Capacity of the working buffer, once a pulse has fixed it
    pub fn capacity(&self) -> Option<usize> {
        self.capacity.get().copied()
    }

    /// Copy one pulse into the working buffer and zero the remainder.
    ///
    /// `min(pulse_length, capacity)` samples are copied from `raw` starting at
    /// `start_index`. The crest offset is carried for alignment-aware
    /// preprocessors and does not move the copy window here. The returned slice
    /// stays valid until the next call on the same instance.
    pub fn retrieve(
        &mut self,
        raw: &[f64],
        start_index: usize,
        _crest_offset: usize,
        pulse_length: usize,
    ) -> Result<&[f64], PipelineError> {
        if self.zero_filled_space.is_empty() {
            let capacity = match self.capacity.get() {
                Some(&capacity) => capacity,
                None => {
                    let length = zero_filled_length(pulse_length, self.zero_fill_factor)?;
                    *self.capacity.get_or_init(|| length)
                }
            };
            self.zero_filled_space = vec![0.0; capacity];
        }
        let space = &mut self.zero_filled_space;

        let safe_length = pulse_length.min(space.len());
        let source = start_index
            .checked_add(safe_length)
            .and_then(|end| raw.get(start_index..end))
            .ok_or(FailureCategory::InsufficientSamples)?;

        space[..safe_length].copy_from_slice(source);
        space[safe_length..].fill(0.0);

        Ok(space.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_filled_length() {
        assert_eq!(zero_filled_length(4, 1).unwrap(), 8);
        assert_eq!(zero_filled_length(5, 1).unwrap(), 8);
        assert_eq!(zero_filled_length(1000, 1).unwrap(), 1024);
        assert_eq!(zero_filled_length(1000, 2).unwrap(), 2048);
        assert_eq!(zero_filled_length(1024, 1).unwrap(), 2048);
        assert!(zero_filled_length(4, 0).is_err());
        assert!(zero_filled_length(0, 1).is_err());
    }

    #[test]
    fn test_zero_filled_length_is_monotonic_and_covers_pulse() {
        for pulse_length in [1usize, 3, 17, 255, 256, 4097] {
            let mut previous = 0;
            for factor in 1..5 {
                let length = zero_filled_length(pulse_length, factor).unwrap();
                assert!(length >= pulse_length);
                assert!(length > previous);
                previous = length;
            }
        }
    }

    #[test]
    fn test_retrieve_pads_with_zeros() {
        let mut preprocessor = PulsePreprocessor::new(1).unwrap();
        let raw: Vec<f64> = (1..=10).map(f64::from).collect();
        let pulse = preprocessor.retrieve(&raw, 0, 0, 4).unwrap();
        assert_eq!(pulse, &[1.0, 2.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_retrieve_reuses_buffer_and_clears_tail() {
        let mut preprocessor = PulsePreprocessor::new(1).unwrap();
        let raw: Vec<f64> = (1..=20).map(f64::from).collect();
        let first_ptr = preprocessor.retrieve(&raw, 0, 0, 6).unwrap().as_ptr();
        let pulse = preprocessor.retrieve(&raw, 10, 0, 4).unwrap();
        assert_eq!(pulse.as_ptr(), first_ptr);
        assert_eq!(pulse, &[11.0, 12.0, 13.0, 14.0, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_retrieve_truncates_longer_pulses() {
        let mut preprocessor = PulsePreprocessor::new(1).unwrap();
        let raw: Vec<f64> = (1..=40).map(f64::from).collect();
        preprocessor.retrieve(&raw, 0, 0, 4).unwrap();
        assert_eq!(preprocessor.capacity(), Some(8));

        let pulse = preprocessor.retrieve(&raw, 0, 0, 20).unwrap();
        assert_eq!(pulse.len(), 8);
        assert_eq!(pulse, &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0]);
    }

    #[test]
    fn test_clones_share_the_first_capacity() {
        let template = PulsePreprocessor::new(1).unwrap();
        let mut first = template.clone();
        let mut second = template.clone();
        let raw: Vec<f64> = (1..=40).map(f64::from).collect();

        assert_eq!(first.retrieve(&raw, 0, 0, 4).unwrap().len(), 8);
        // A longer pulse on another clone is truncated to the shared capacity
        let pulse = second.retrieve(&raw, 0, 0, 20).unwrap();
        assert_eq!(pulse.len(), 8);
        assert_eq!(template.capacity(), Some(8));

        // Unrelated preprocessors keep their own capacity
        let mut other = PulsePreprocessor::new(1).unwrap();
        assert_eq!(other.retrieve(&raw, 0, 0, 20).unwrap().len(), 32);
    }

    #[test]
    fn test_retrieve_past_end_fails() {
        let mut preprocessor = PulsePreprocessor::new(1).unwrap();
        let raw = vec![1.0; 10];
        let err = preprocessor.retrieve(&raw, 8, 0, 4).unwrap_err();
        assert_eq!(err, PipelineError::Pulse(FailureCategory::InsufficientSamples));
    }
}
