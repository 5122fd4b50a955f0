// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Configuration management for the interferogram accumulator
//!
//! This module provides functionality for loading, validating, and applying
//! configuration settings. The configuration is backed by a YAML file and
//! validated against a JSON schema before being deserialized.
//!
//! ## Configuration Structure
//!
//! - `accumulation`: Slicing, zero filling, apodization and phase correction
//! - `crest_finder`: Crest detection for files and simulated sources
//! - `pipeline`: Number of lanes and queue warning threshold
//! - `acquisition`: Input file or simulated source, record count and timing
//!
//! ## Usage
//!
//! ```no_run
//! use rust_interferometry::config::Config;
//! use std::path::Path;
//!
//! // Load config from file, creates a default if not found
//! let mut config = Config::from_file(Path::new("config.yaml")).unwrap();
//!
//! // Apply command line overrides if needed
//! config.apply_args(
//!     None,       // Input file
//!     Some(500),  // Records
//!     Some(8),    // Workers
//!     Some(2),    // Zero fill factor
//! );
//!
//! println!("Workers: {}", config.pipeline.workers);
//! ```

pub mod accumulation;
pub mod acquisition;
pub mod crest_finder;
pub mod pipeline;
pub mod utils;

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, error};
use serde::{Deserialize, Serialize};

pub use accumulation::AccumulationConfig;
pub use acquisition::{AcquisitionConfig, SimulatedSourceConfig};
pub use crest_finder::CrestFinderConfig;
pub use pipeline::PipelineConfig;
pub use utils::{output_config_schema, validate_specific_rules};

/// Embedded JSON schema used to validate configuration files
pub(crate) const CONFIG_SCHEMA: &str = include_str!("../../resources/config.schema.json");

/// Root configuration structure.
///
/// Every section falls back to its defaults when missing from the file, so
/// an empty document is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Per-sequence accumulation chain
    #[serde(default)]
    pub accumulation: AccumulationConfig,

    /// Crest detection settings
    #[serde(default)]
    pub crest_finder: CrestFinderConfig,

    /// Pipeline concurrency
    #[serde(default)]
    pub pipeline: PipelineConfig,

    /// Pulse sequence source and timing
    #[serde(default)]
    pub acquisition: AcquisitionConfig,
}

impl Config {
    /// Write a `<name>.sample.yaml` file with default values next to `path`
    fn create_sample_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        let sample_path = path.with_extension("sample.yaml");
        debug!("Creating sample configuration file at {:?}", sample_path);

        if let Some(parent) = sample_path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).with_context(|| {
                    format!(
                        "Failed to create parent directory for sample config at {:?}",
                        parent
                    )
                })?;
            }
        }

        Self::default()
            .save_to_file(&sample_path)
            .with_context(|| format!("Failed to save sample config to {:?}", sample_path))?;

        error!(
            "Sample configuration file created at {:?}\nPlease edit and rename it",
            sample_path
        );
        Ok(())
    }

    /// Load configuration from a file, creating a default one when absent
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(
                "Configuration file not found at {:?}, creating default",
                path
            );
            let default_config = Self::default();
            default_config.save_to_file(path)?;
            return Ok(default_config);
        }

        debug!("Loading configuration from {:?}", path);
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file at {:?}", path))?;
        Self::from_yaml_str(&contents).inspect_err(|_| {
            if let Err(e) = Self::create_sample_config(path) {
                error!("Failed to create sample config: {}", e);
            }
        })
    }

    /// Parse, validate and deserialize a YAML document
    pub fn from_yaml_str(contents: &str) -> Result<Self> {
        let yaml_value: serde_yml::Value =
            serde_yml::from_str(contents).context("Failed to parse YAML configuration")?;
        // An empty document is a valid, all-default configuration
        let json_value = match serde_json::to_value(&yaml_value)
            .context("Failed to convert YAML to JSON for validation")?
        {
            serde_json::Value::Null => serde_json::Value::Object(Default::default()),
            value => value,
        };

        let schema: serde_json::Value =
            serde_json::from_str(CONFIG_SCHEMA).context("Failed to parse JSON schema")?;
        let validator = jsonschema::draft202012::options()
            .should_validate_formats(true)
            .build(&schema)?;

        debug!("Validating configuration against schema");
        if let Err(error) = validator.validate(&json_value) {
            error!("Configuration validation error before deserialization");
            anyhow::bail!("Configuration validation failed: {}", error);
        }

        let config: Config = serde_json::from_value(json_value)
            .context("Failed to deserialize configuration")?;

        if let Err(err) = validate_specific_rules(&config) {
            error!("Configuration specific validation error: {}", err);
            return Err(err);
        }

        Ok(config)
    }

    /// Save the configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let yaml =
            serde_yml::to_string(self).context("Failed to serialize configuration to YAML")?;

        let mut file = File::create(path.as_ref())
            .with_context(|| format!("Failed to create config file at {:?}", path.as_ref()))?;

        file.write_all(yaml.as_bytes())
            .with_context(|| format!("Failed to write configuration to {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Apply command line arguments to override configuration values.
    ///
    /// Only arguments that were provided replace the loaded values.
    pub fn apply_args(
        &mut self,
        input_file: Option<PathBuf>,
        records: Option<u64>,
        workers: Option<usize>,
        zero_fill_factor: Option<u32>,
    ) {
        if let Some(file) = input_file {
            debug!("Overriding input file from command line: {:?}", file);
            self.acquisition.input_file = Some(file.to_string_lossy().to_string());
        }
        if let Some(records) = records {
            debug!("Overriding record count from command line: {}", records);
            self.acquisition.records = records;
        }
        if let Some(workers) = workers {
            debug!("Overriding worker count from command line: {}", workers);
            self.pipeline.workers = workers;
        }
        if let Some(factor) = zero_fill_factor {
            debug!("Overriding zero fill factor from command line: {}", factor);
            self.accumulation.zero_fill_factor = factor;
        }
    }
}
