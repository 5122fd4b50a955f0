// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration utilities
//!
//! This module provides utility functions for working with configuration
//! settings, including validation and schema management.

use anyhow::{Context, Result};
use log::{debug, warn};

use super::{Config, CONFIG_SCHEMA};
use crate::slicing::{CrestAlignment, Ruler};
use crate::spectral::PhaseExtractor;

/// Output the embedded JSON schema to the console.
///
/// This function is called when the `--show-config-schema` flag is provided
/// on the command line.
///
/// ```bash
/// ./rust_interferometry --show-config-schema > config_schema.json
/// ```
pub fn output_config_schema() -> Result<()> {
    let schema: serde_json::Value =
        serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;
    let formatted_schema =
        serde_json::to_string_pretty(&schema).context("Failed to format JSON schema")?;
    println!("{}", formatted_schema);
    Ok(())
}

/// Validates the configuration against rules the JSON schema cannot express.
///
/// - the zero fill factor is at least 1 and keeps the working buffer
///   addressable
/// - a fixed ruler has a positive length
/// - a center interpolation window has a positive half width
/// - the pipeline has at least one worker
/// - the simulated source produces at least one crest inside its sequence
/// - the simulated carrier stays below the Nyquist frequency
pub fn validate_specific_rules(config: &Config) -> Result<()> {
    debug!("Performing additional validation checks");

    let accumulation = &config.accumulation;
    if accumulation.zero_fill_factor == 0 {
        anyhow::bail!("zero_fill_factor must be at least 1");
    }
    if accumulation.zero_fill_factor > 16 {
        anyhow::bail!(
            "zero_fill_factor {} is too large",
            accumulation.zero_fill_factor
        );
    }

    if let Ruler::Fixed { length } = accumulation.ruler {
        if length == 0 {
            anyhow::bail!("Fixed ruler length must be positive");
        }
    }

    if let PhaseExtractor::CenterInterpolation { center_half_width } = accumulation.phase_extractor {
        if center_half_width == 0 {
            anyhow::bail!("center_half_width must be positive");
        }
        if let CrestAlignment::Left {
            points_before_crest,
        } = accumulation.alignment
        {
            if points_before_crest < center_half_width {
                // Every pulse would fail phase extraction
                warn!(
                    "points_before_crest ({}) is smaller than center_half_width ({})",
                    points_before_crest, center_half_width
                );
            }
        }
    }

    if config.pipeline.workers == 0 {
        anyhow::bail!("pipeline.workers must be at least 1");
    }

    let simulated = &config.acquisition.simulated;
    if simulated.pulse_period == 0 {
        anyhow::bail!("simulated.pulse_period must be positive");
    }
    if simulated.first_crest >= simulated.sequence_length {
        anyhow::bail!(
            "simulated.first_crest ({}) lies outside the sequence ({} samples)",
            simulated.first_crest,
            simulated.sequence_length
        );
    }
    if !(simulated.carrier_frequency > 0.0 && simulated.carrier_frequency < 0.5) {
        anyhow::bail!(
            "simulated.carrier_frequency must be in (0, 0.5), got {}",
            simulated.carrier_frequency
        );
    }

    Ok(())
}
