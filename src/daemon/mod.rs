// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! # Daemon Module
//!
//! Runs the accumulator as a background service: an acquisition task feeds
//! pulse sequences to the pipeline without blocking and a report task logs
//! the accumulation state periodically.
//!
//! ## Usage
//!
//! ```no_run
//! use rust_interferometry::{config::Config, daemon::Daemon};
//!
//! async fn run() -> anyhow::Result<()> {
//!     let config = Config::from_file("config.yaml")?;
//!
//!     let mut daemon = Daemon::new();
//!     daemon.launch(&config).await?;
//!
//!     // Wait for shutdown signal (e.g., Ctrl+C)
//!     tokio::signal::ctrl_c().await?;
//!
//!     daemon.shutdown();
//!     daemon.join().await?;
//!
//!     Ok(())
//! }
//! ```

pub mod launch_daemon;

pub use launch_daemon::Daemon;
