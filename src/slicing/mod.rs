// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Pulse slicing module
//!
//! This module turns the crest (centerburst) positions of a pulse sequence into
//! a list of fixed-length pulse windows:
//!
//! - [`Ruler`] measures the common window length from crest spacing
//! - [`CrestAlignment`] decides where the crest sits inside each window
//! - [`Slicer`] combines both and drops windows that do not fit the sequence
//! - [`CrestFinder`] is the seam to the external crest detector

pub mod crest_finder;
pub mod ruler;

pub use crest_finder::{CrestFinder, ThresholdCrestFinder};
pub use ruler::Ruler;

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Position of one pulse window inside a pulse sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliceInfo {
    /// Index of the first sample of the window in the pulse sequence
    pub start_index: usize,
    /// Number of samples in the window
    pub length: usize,
    /// Offset of the crest relative to `start_index`
    pub crest_offset: usize,
}

/// Where the crest is placed inside a pulse window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CrestAlignment {
    /// The window starts a fixed number of points before the crest
    Left { points_before_crest: usize },
    /// The crest sits in the middle of the window
    Center,
}

impl Default for CrestAlignment {
    fn default() -> Self {
        CrestAlignment::Left {
            points_before_crest: 0,
        }
    }
}

impl CrestAlignment {
    /// Offset of the crest inside a window of `slice_length` samples
    pub fn crest_offset(&self, slice_length: usize) -> usize {
        match *self {
            CrestAlignment::Left {
                points_before_crest,
            } => points_before_crest,
            CrestAlignment::Center => slice_length / 2,
        }
    }
}

/// Cuts a pulse sequence into windows of a common length
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Slicer {
    ruler: Ruler,
    alignment: CrestAlignment,
}

impl Slicer {
    pub fn new(ruler: Ruler, alignment: CrestAlignment) -> Self {
        Self { ruler, alignment }
    }

    pub fn ruler(&self) -> Ruler {
        self.ruler
    }

    /// Compute the windows for every crest whose window fits in the sequence.
    ///
    /// Returns the measured slice length along with the windows. The list is
    /// empty when no window fits; that case is left to the caller to report.
    pub fn slice(
        &self,
        crest_indices: &[usize],
        sequence_length: usize,
    ) -> Result<(usize, Vec<SliceInfo>), PipelineError> {
        let slice_length = self.ruler.measure(crest_indices, sequence_length)?;
        if slice_length == 0 {
            return Err(PipelineError::contract("slice length must be positive"));
        }
        let crest_offset = self.alignment.crest_offset(slice_length);

        let slices = crest_indices
            .iter()
            .filter_map(|&crest| crest.checked_sub(crest_offset))
            .filter(|&start| start + slice_length <= sequence_length)
            .map(|start_index| SliceInfo {
                start_index,
                length: slice_length,
                crest_offset,
            })
            .collect();

        Ok((slice_length, slices))
    }
}
