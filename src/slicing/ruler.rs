// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Slice length measurement
//!
//! A [`Ruler`] decides the common window length used to cut every pulse of a
//! pulse sequence, given the crest positions found in that sequence.

use serde::{Deserialize, Serialize};

use crate::error::PipelineError;

/// Strategy used to measure the slice length from crest positions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Ruler {
    /// Always returns the configured length, whatever the crests
    Fixed { length: usize },
    /// Truncated mean of the consecutive crest-to-crest distances
    AverageLength,
    /// Smallest consecutive crest-to-crest distance
    MinCommonLength,
}

impl Default for Ruler {
    fn default() -> Self {
        Ruler::MinCommonLength
    }
}

impl Ruler {
    /// Measure the slice length for a pulse sequence of `full_length` samples.
    ///
    /// With a single crest there is no interval to compare and the full
    /// sequence length is returned. An empty crest list is a contract
    /// violation. Crest indices are expected to be strictly increasing.
    pub fn measure(&self, crest_indices: &[usize], full_length: usize) -> Result<usize, PipelineError> {
        if crest_indices.is_empty() {
            return Err(PipelineError::contract(
                "ruler needs at least one crest index",
            ));
        }

        match *self {
            Ruler::Fixed { length } => Ok(length),
            _ if crest_indices.len() == 1 => Ok(full_length),
            Ruler::AverageLength => {
                let total: usize = intervals(crest_indices)?.sum();
                // Integer division truncates, matching historical outputs
                Ok(total / (crest_indices.len() - 1))
            }
            Ruler::MinCommonLength => Ok(intervals(crest_indices)?.min().unwrap_or(full_length)),
        }
    }
}

/// Consecutive crest-to-crest distances, checking the ordering on the way
fn intervals(crest_indices: &[usize]) -> Result<impl Iterator<Item = usize> + '_, PipelineError> {
    if crest_indices.windows(2).any(|pair| pair[1] <= pair[0]) {
        return Err(PipelineError::contract(
            "crest indices must be strictly increasing",
        ));
    }
    Ok(crest_indices.windows(2).map(|pair| pair[1] - pair[0]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_crest_returns_full_length() {
        assert_eq!(Ruler::AverageLength.measure(&[42], 5000).unwrap(), 5000);
        assert_eq!(Ruler::MinCommonLength.measure(&[42], 5000).unwrap(), 5000);
    }

    #[test]
    fn test_average_truncates() {
        // (10 + 15) / 2 = 12.5 -> 12
        assert_eq!(Ruler::AverageLength.measure(&[0, 10, 25], 100).unwrap(), 12);
    }

    #[test]
    fn test_min_common_length() {
        assert_eq!(Ruler::MinCommonLength.measure(&[0, 10, 25], 100).unwrap(), 10);
        assert_eq!(
            Ruler::MinCommonLength.measure(&[5, 105, 180, 300], 400).unwrap(),
            75
        );
    }

    #[test]
    fn test_fixed_ignores_inputs() {
        let ruler = Ruler::Fixed { length: 64 };
        assert_eq!(ruler.measure(&[0, 10, 25], 100).unwrap(), 64);
        assert_eq!(ruler.measure(&[3], 7).unwrap(), 64);
    }

    #[test]
    fn test_empty_crests_is_contract_violation() {
        for ruler in [Ruler::AverageLength, Ruler::MinCommonLength, Ruler::Fixed { length: 8 }] {
            let err = ruler.measure(&[], 100).unwrap_err();
            assert!(matches!(err, PipelineError::ContractViolation(_)));
        }
    }

    #[test]
    fn test_unordered_crests_rejected() {
        let err = Ruler::AverageLength.measure(&[10, 10, 30], 100).unwrap_err();
        assert!(matches!(err, PipelineError::ContractViolation(_)));
    }

    #[test]
    fn test_measure_does_not_mutate_input() {
        let crests = vec![0, 10, 25];
        let _ = Ruler::MinCommonLength.measure(&crests, 100);
        assert_eq!(crests, vec![0, 10, 25]);
    }
}
