// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Crest (centerburst) detection
//!
//! The accumulator only consumes crest indices. Detection is delegated to an
//! implementation of [`CrestFinder`] supplied by the host; a running-maximum
//! detector is provided for files and simulated sources.

use crate::config::CrestFinderConfig;

/// Trait for implementing crest detectors
pub trait CrestFinder: Send + Sync {
    /// Find the crest positions in a pulse sequence.
    ///
    /// The returned indices are strictly increasing. An empty list means no
    /// pulse was detected.
    fn find(&self, pulse_sequence: &[f64]) -> Vec<usize>;
}

/// Running-maximum crest detector
///
/// A local maximum is committed as a crest once `min_crest_distance` samples
/// have gone by without a larger value, provided it rises above
/// `vertical_threshold` and lies after `min_points_before_crest`.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdCrestFinder {
    vertical_threshold: f64,
    min_crest_distance: usize,
    min_points_before_crest: usize,
}

impl ThresholdCrestFinder {
    pub fn new(vertical_threshold: f64, min_crest_distance: usize, min_points_before_crest: usize) -> Self {
        Self {
            vertical_threshold,
            min_crest_distance,
            min_points_before_crest,
        }
    }

    pub fn from_config(config: &CrestFinderConfig) -> Self {
        Self::new(
            config.vertical_threshold,
            config.min_crest_distance,
            config.min_points_before_crest,
        )
    }
}

impl CrestFinder for ThresholdCrestFinder {
    fn find(&self, pulse_sequence: &[f64]) -> Vec<usize> {
        let mut crest_indices = Vec::new();
        let mut max_value = 0.0;
        let mut max_index = 0;

        for (i, &point) in pulse_sequence.iter().enumerate() {
            if point > max_value {
                max_value = point;
                max_index = i;
            }

            if i - max_index > self.min_crest_distance {
                if max_value > self.vertical_threshold && max_index > self.min_points_before_crest {
                    crest_indices.push(max_index);
                }
                max_value = 0.0;
                max_index = i;
            }
        }

        crest_indices
    }
}
