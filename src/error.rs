// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Error types shared by the accumulation pipeline
//!
//! Two families of failures exist:
//!
//! - [`PipelineError`] is returned as `Err` and reports caller misuse
//!   (contract violations, operating a stage while it is off).
//! - [`FailureCategory`] describes why a single pulse sequence could not be
//!   turned into a spectrum. It travels as data inside a
//!   [`ProcessResult`](crate::processing::ProcessResult) and never aborts the
//!   stream.

use serde::{Deserialize, Serialize};

/// Reason a pulse sequence failed to produce a corrected spectrum
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    #[error("no crest found in the pulse sequence")]
    NoPeakFound,
    #[error("no pulse window fits inside the pulse sequence")]
    NoSliceValid,
    #[error("not enough samples to extract the pulse window")]
    InsufficientSamples,
    #[error("phase extraction failed")]
    PhaseExtractionFailed,
    #[error("corrected spectrum contains non-finite values")]
    NonFiniteSpectrum,
    #[error("spectrum length does not match the accumulated spectrum")]
    SpectrumLengthMismatch,
}

/// Errors surfaced directly to the caller
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// A precondition of an operation was violated by the caller
    #[error("Contract violation: {0}")]
    ContractViolation(String),
    /// The stage is switched off and refuses new items
    #[error("Stage '{0}' is off")]
    StageOff(String),
    /// The stage has been shut down and its drain loop has exited
    #[error("Stage '{0}' is closed")]
    StageClosed(String),
    /// A pulse failure escaped as an error, for callers that use `?` directly
    #[error("Pulse processing failed: {0}")]
    Pulse(#[from] FailureCategory),
}

impl PipelineError {
    /// Shorthand for building a [`PipelineError::ContractViolation`]
    pub fn contract(message: impl Into<String>) -> Self {
        PipelineError::ContractViolation(message.into())
    }

    /// Whether the error denotes misuse of a stage state machine
    pub fn is_usage_error(&self) -> bool {
        matches!(self, PipelineError::StageOff(_) | PipelineError::StageClosed(_))
    }
}
