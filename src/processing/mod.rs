// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Processing module
//!
//! This module turns pulse sequences into an accumulated spectrum:
//!
//! - [`Accumulator`]: one pulse sequence in, one [`AccumulationResult`] out
//! - [`SpectrumAccumulation`]: running sum and failure tally across sequences
//! - [`ObjectPool`]: reuse of accumulators between workers
//! - [`SpectrumPipeline`]: non-blocking multi-lane front end

pub mod accumulation;
pub mod accumulator;
pub mod pipeline;
pub mod pool;
pub mod result;

pub use accumulation::{AccumulationSnapshot, SpectrumAccumulation};
pub use accumulator::{Accumulator, AccumulatorFactory};
pub use pipeline::{PulseRecord, SpectrumPipeline};
pub use pool::{ObjectPool, PooledObject};
pub use result::{AccumulationResult, ProcessResult};
