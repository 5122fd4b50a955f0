// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Per-sequence processing results
//!
//! A [`ProcessResult`] carries either the data produced from one pulse
//! sequence or the category of the failure that prevented it, together with
//! the number of occurrences of that failure.

use serde::{Deserialize, Serialize};

use crate::error::FailureCategory;
use crate::spectral::Spectrum;

/// Outcome of processing one pulse sequence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessResult<T> {
    data: Option<T>,
    exception: Option<FailureCategory>,
    exception_count: u64,
}

/// Result of running one pulse sequence through an accumulator
pub type AccumulationResult = ProcessResult<Spectrum>;

impl<T> ProcessResult<T> {
    /// Successful result wrapping `data`
    pub fn from_success(data: T) -> Self {
        Self {
            data: Some(data),
            exception: None,
            exception_count: 0,
        }
    }

    /// Failed result. A zero `count` reports no failure at all.
    pub fn from_failure(category: FailureCategory, count: u64) -> Self {
        Self {
            data: None,
            exception: (count != 0).then_some(category),
            exception_count: count,
        }
    }

    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }

    pub fn has_exception(&self) -> bool {
        self.exception.is_some()
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn into_data(self) -> Option<T> {
        self.data
    }

    pub fn exception(&self) -> Option<FailureCategory> {
        self.exception
    }

    pub fn exception_count(&self) -> u64 {
        if self.exception.is_some() {
            self.exception_count
        } else {
            0
        }
    }
}

impl ProcessResult<Spectrum> {
    pub fn has_spectrum(&self) -> bool {
        self.has_data()
    }

    pub fn spectrum(&self) -> Option<&Spectrum> {
        self.data()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success() {
        let result = ProcessResult::from_success(7);
        assert!(result.has_data());
        assert!(!result.has_exception());
        assert_eq!(result.data(), Some(&7));
        assert_eq!(result.exception_count(), 0);
    }

    #[test]
    fn test_failure() {
        let result: ProcessResult<u8> = ProcessResult::from_failure(FailureCategory::NoPeakFound, 3);
        assert!(!result.has_data());
        assert!(result.has_exception());
        assert_eq!(result.exception(), Some(FailureCategory::NoPeakFound));
        assert_eq!(result.exception_count(), 3);
    }

    #[test]
    fn test_zero_count_failure_behaves_as_no_failure() {
        let result: ProcessResult<u8> = ProcessResult::from_failure(FailureCategory::NoSliceValid, 0);
        assert!(!result.has_exception());
        assert!(!result.has_data());
        assert_eq!(result.exception(), None);
        assert_eq!(result.exception_count(), 0);
    }

    #[test]
    fn test_single_failure_counts_once() {
        let result: AccumulationResult = ProcessResult::from_failure(FailureCategory::InsufficientSamples, 1);
        assert!(!result.has_spectrum());
        assert_eq!(result.exception(), Some(FailureCategory::InsufficientSamples));
        assert_eq!(result.exception_count(), 1);
    }
}
