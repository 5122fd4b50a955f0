// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Rust interferogram accumulator library
//!
//! This library turns trains of interferometric pulses into one averaged,
//! phase-corrected spectrum. Pulse sequences are sliced around their crests,
//! zero filled, transformed, phase corrected and accumulated, while a
//! non-blocking producer/consumer front end keeps acquisition decoupled from
//! processing.

pub mod acquisition;
pub mod config;
pub mod daemon;
pub mod error;
pub mod preprocessing;
pub mod processing;
pub mod slicing;
pub mod spectral;
pub mod utility;

pub use error::{FailureCategory, PipelineError};
