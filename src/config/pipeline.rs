// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Pipeline sizing configuration

use serde::{Deserialize, Serialize};

/// Concurrency settings of the accumulation pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Number of parallel lanes, each with its own drain loop. Must be >= 1.
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Log a warning when a lane has more records waiting than this.
    /// Zero disables the warning.
    #[serde(default = "default_queue_warning_threshold")]
    pub queue_warning_threshold: usize,
}

fn default_workers() -> usize {
    4
}

fn default_queue_warning_threshold() -> usize {
    64
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
            queue_warning_threshold: default_queue_warning_threshold(),
        }
    }
}
