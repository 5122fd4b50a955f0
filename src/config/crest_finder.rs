// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Crest finder configuration

use serde::{Deserialize, Serialize};

/// Settings of the running-maximum crest finder used for files and
/// simulated sources
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrestFinderConfig {
    /// A crest must rise strictly above this value
    #[serde(default = "default_vertical_threshold")]
    pub vertical_threshold: f64,

    /// Number of samples without a larger value before a maximum is
    /// committed as a crest
    #[serde(default = "default_min_crest_distance")]
    pub min_crest_distance: usize,

    /// Crests at or before this index are ignored
    #[serde(default = "default_min_points_before_crest")]
    pub min_points_before_crest: usize,
}

fn default_vertical_threshold() -> f64 {
    0.5
}

fn default_min_crest_distance() -> usize {
    500
}

fn default_min_points_before_crest() -> usize {
    100
}

impl Default for CrestFinderConfig {
    fn default() -> Self {
        Self {
            vertical_threshold: default_vertical_threshold(),
            min_crest_distance: default_min_crest_distance(),
            min_points_before_crest: default_min_points_before_crest(),
        }
    }
}
