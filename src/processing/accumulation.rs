// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Running accumulation across pulse sequences
//!
//! [`SpectrumAccumulation`] folds every [`AccumulationResult`] into a running
//! spectrum and failure tally. Readers take an [`AccumulationSnapshot`], a
//! copy made under the lock, so they never observe a half-updated sum.

use std::sync::RwLock;

use chrono::{DateTime, Utc};
use log::debug;
use serde::{Deserialize, Serialize};

use super::result::AccumulationResult;
use crate::error::FailureCategory;
use crate::spectral::Spectrum;

#[derive(Debug, Default)]
struct AccumulationInner {
    spectrum: Option<Spectrum>,
    exception_count: u64,
    last_exception: Option<FailureCategory>,
    sequences_processed: u64,
}

/// Shared running spectrum with failure statistics
#[derive(Debug, Default)]
pub struct SpectrumAccumulation {
    inner: RwLock<AccumulationInner>,
}

/// Point-in-time copy of a [`SpectrumAccumulation`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccumulationSnapshot {
    pub spectrum: Option<Spectrum>,
    pub exception_count: u64,
    pub last_exception: Option<FailureCategory>,
    pub sequences_processed: u64,
    pub timestamp: DateTime<Utc>,
}

impl AccumulationSnapshot {
    pub fn has_spectrum(&self) -> bool {
        self.spectrum.is_some()
    }

    pub fn has_exception(&self) -> bool {
        self.last_exception.is_some()
    }

    /// Fraction of processed sequences that failed
    pub fn failure_rate(&self) -> f64 {
        if self.sequences_processed == 0 {
            0.0
        } else {
            self.exception_count as f64 / self.sequences_processed as f64
        }
    }
}

impl SpectrumAccumulation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one result into the running state
    pub fn absorb(&self, result: AccumulationResult) {
        let exception = result.exception();
        let count = result.exception_count();
        let spectrum = result.into_data();

        let mut guard = self.inner.write().unwrap_or_else(|e| e.into_inner());
        let inner = &mut *guard;
        inner.sequences_processed += 1;

        if let Some(category) = exception {
            inner.exception_count += count;
            inner.last_exception = Some(category);
            return;
        }

        let Some(spectrum) = spectrum else {
            return;
        };
        match &mut inner.spectrum {
            None => inner.spectrum = Some(spectrum),
            Some(total) => {
                if let Err(category) = total.absorb(&spectrum) {
                    debug!(
                        "Dropping spectrum of {} bins, accumulated spectrum has {}",
                        spectrum.len(),
                        total.len()
                    );
                    inner.exception_count += 1;
                    inner.last_exception = Some(category);
                }
            }
        }
    }

    /// Copy out the current state
    pub fn snapshot(&self) -> AccumulationSnapshot {
        let inner = self.inner.read().unwrap_or_else(|e| e.into_inner());
        AccumulationSnapshot {
            spectrum: inner.spectrum.clone(),
            exception_count: inner.exception_count,
            last_exception: inner.last_exception,
            sequences_processed: inner.sequences_processed,
            timestamp: Utc::now(),
        }
    }

    /// Forget everything accumulated so far
    pub fn reset(&self) {
        let mut inner = self.inner.write().unwrap_or_else(|e| e.into_inner());
        *inner = AccumulationInner::default();
    }
}
