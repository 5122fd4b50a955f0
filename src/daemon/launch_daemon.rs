// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::{Context, Result};
use log::{debug, error, info, warn};
use tokio::task::JoinHandle;
use tokio::time;

use crate::acquisition::{get_source, PulseSequenceSource};
use crate::config::Config;
use crate::processing::{AccumulationSnapshot, PulseRecord, SpectrumPipeline};
use crate::slicing::ThresholdCrestFinder;

/// Long-running acquisition and accumulation service
pub struct Daemon {
    tasks: Vec<JoinHandle<Result<()>>>,
    running: Arc<AtomicBool>,
    pipeline: Option<Arc<SpectrumPipeline>>,
}

impl Default for Daemon {
    fn default() -> Self {
        Self::new()
    }
}

impl Daemon {
    /// Create a new daemon instance
    pub fn new() -> Self {
        Daemon {
            tasks: Vec::new(),
            running: Arc::new(AtomicBool::new(true)),
            pipeline: None,
        }
    }

    /// Build the pipeline and start the acquisition and report tasks
    pub async fn launch(&mut self, config: &Config) -> Result<()> {
        let crest_finder = Arc::new(ThresholdCrestFinder::from_config(&config.crest_finder));
        let pipeline = Arc::new(
            SpectrumPipeline::new(&config.accumulation, &config.pipeline, crest_finder)
                .context("Failed to build the accumulation pipeline")?,
        );
        pipeline.start();
        self.pipeline = Some(Arc::clone(&pipeline));

        let source = get_source(&config.acquisition)?;
        self.start_data_acquisition(
            source,
            Arc::clone(&pipeline),
            Duration::from_millis(config.acquisition.interval_ms),
        );
        self.start_report(
            pipeline,
            Duration::from_millis(config.acquisition.report_interval_ms.max(1)),
        );

        Ok(())
    }

    /// Start the data acquisition task
    fn start_data_acquisition(
        &mut self,
        mut source: Box<dyn PulseSequenceSource>,
        pipeline: Arc<SpectrumPipeline>,
        interval: Duration,
    ) {
        info!("Starting data acquisition from {}", source.description());

        let running = self.running.clone();
        let task = tokio::spawn(async move {
            let mut submitted = 0u64;
            while running.load(Ordering::SeqCst) {
                let Some(sequence) = source.next_sequence()? else {
                    info!("Source exhausted after {} sequences", submitted);
                    break;
                };
                match pipeline.submit(PulseRecord::new(sequence)) {
                    Ok(()) => submitted += 1,
                    Err(e) if e.is_usage_error() => {
                        warn!("Pipeline no longer accepts sequences: {}", e);
                        break;
                    }
                    Err(e) => warn!("Sequence dropped: {}", e),
                }
                if !interval.is_zero() {
                    time::sleep(interval).await;
                } else {
                    tokio::task::yield_now().await;
                }
            }
            debug!("Acquisition task stopped");
            Ok::<(), anyhow::Error>(())
        });

        self.tasks.push(task);
    }

    /// Start a task that logs the accumulation state periodically
    fn start_report(&mut self, pipeline: Arc<SpectrumPipeline>, period: Duration) {
        debug!("Starting accumulation report every {:?}", period);

        let running = self.running.clone();
        let task = tokio::spawn(async move {
            while running.load(Ordering::SeqCst) {
                time::sleep(period).await;
                let snapshot = pipeline.snapshot();
                info!(
                    "Accumulated {} pulses from {} sequences, {} failures (last: {}), {} waiting",
                    snapshot.spectrum.as_ref().map_or(0, |s| s.pulse_count()),
                    snapshot.sequences_processed,
                    snapshot.exception_count,
                    snapshot
                        .last_exception
                        .map_or_else(|| "none".to_string(), |c| c.to_string()),
                    pipeline.pending_count()
                );
            }
            Ok::<(), anyhow::Error>(())
        });

        self.tasks.push(task);
    }

    /// Current accumulation state, once launched
    pub fn snapshot(&self) -> Option<AccumulationSnapshot> {
        self.pipeline.as_ref().map(|p| p.snapshot())
    }

    pub fn pipeline(&self) -> Option<Arc<SpectrumPipeline>> {
        self.pipeline.clone()
    }

    /// Stop all running tasks
    pub fn shutdown(&self) {
        info!("Shutting down daemon tasks");
        self.running.store(false, Ordering::SeqCst);
        if let Some(pipeline) = &self.pipeline {
            pipeline.stop();
        }
    }

    /// Wait for all tasks to complete, then drain and close the pipeline
    pub async fn join(self) -> Result<()> {
        for task in self.tasks {
            match task.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => error!("Task failed: {:#}", e),
                Err(e) => error!("Task panicked: {}", e),
            }
        }
        if let Some(pipeline) = self.pipeline {
            pipeline.shutdown().await;
        }
        Ok(())
    }
}
