// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Multi-lane accumulation pipeline
//!
//! Pulse records are dispatched round-robin over a fixed number of
//! [`Camera`] lanes. Each lane checks an [`Accumulator`] out of a shared
//! pool, processes the record and folds the result into one shared
//! [`SpectrumAccumulation`]. Order is preserved inside a lane only.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use log::{info, warn};

use super::accumulation::{AccumulationSnapshot, SpectrumAccumulation};
use super::accumulator::{Accumulator, AccumulatorFactory};
use super::pool::ObjectPool;
use crate::acquisition::camera::Camera;
use crate::config::{AccumulationConfig, PipelineConfig};
use crate::error::PipelineError;
use crate::slicing::CrestFinder;

/// One raw acquisition handed to the pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PulseRecord {
    pub samples: Vec<f64>,
    /// Crests computed upstream; the configured crest finder is used when absent
    pub crest_indices: Option<Vec<usize>>,
}

impl PulseRecord {
    pub fn new(samples: Vec<f64>) -> Self {
        Self {
            samples,
            crest_indices: None,
        }
    }

    pub fn with_crests(samples: Vec<f64>, crest_indices: Vec<usize>) -> Self {
        Self {
            samples,
            crest_indices: Some(crest_indices),
        }
    }
}

/// Accumulation pipeline fed by non-blocking submissions
pub struct SpectrumPipeline {
    lanes: Vec<Camera<PulseRecord>>,
    next_lane: AtomicUsize,
    pool: Arc<ObjectPool<Accumulator>>,
    accumulation: Arc<SpectrumAccumulation>,
    queue_warning_threshold: usize,
}

impl SpectrumPipeline {
    /// Build the lanes and the accumulator pool. Must run inside a tokio runtime.
    pub fn new(
        accumulation_config: &AccumulationConfig,
        pipeline_config: &PipelineConfig,
        crest_finder: Arc<dyn CrestFinder>,
    ) -> Result<Self, PipelineError> {
        if pipeline_config.workers == 0 {
            return Err(PipelineError::contract("pipeline needs at least one worker"));
        }

        let factory = AccumulatorFactory::new(accumulation_config, crest_finder)?;
        let pool = Arc::new(ObjectPool::new(move || factory.create()));
        let accumulation = Arc::new(SpectrumAccumulation::new());

        let lanes = (0..pipeline_config.workers)
            .map(|lane| {
                let pool = Arc::clone(&pool);
                let accumulation = Arc::clone(&accumulation);
                Camera::new(format!("lane-{}", lane), move |record: PulseRecord| {
                    let mut accumulator = pool.checkout();
                    let result = match &record.crest_indices {
                        None => accumulator.process(&record.samples),
                        Some(crests) => match accumulator.process_with_crests(&record.samples, crests) {
                            Ok(result) => result,
                            Err(e) => {
                                warn!("Record skipped: {}", e);
                                return;
                            }
                        },
                    };
                    accumulation.absorb(result);
                })
            })
            .collect();

        info!(
            "Spectrum pipeline created with {} lanes",
            pipeline_config.workers
        );

        Ok(Self {
            lanes,
            next_lane: AtomicUsize::new(0),
            pool,
            accumulation,
            queue_warning_threshold: pipeline_config.queue_warning_threshold,
        })
    }

    /// Accept submissions on every lane
    pub fn start(&self) {
        for lane in &self.lanes {
            lane.turn_on();
        }
    }

    /// Refuse new submissions; queued records are still processed
    pub fn stop(&self) {
        for lane in &self.lanes {
            lane.turn_off();
        }
    }

    pub fn is_running(&self) -> bool {
        self.lanes.iter().any(|lane| lane.is_on())
    }

    /// Enqueue a record on the next lane. Never blocks.
    pub fn submit(&self, record: PulseRecord) -> Result<(), PipelineError> {
        let index = self.next_lane.fetch_add(1, Ordering::Relaxed) % self.lanes.len();
        let lane = &self.lanes[index];
        lane.submit(record)?;

        let pending = lane.pending_count();
        if self.queue_warning_threshold > 0 && pending > self.queue_warning_threshold {
            warn!(
                "Lane '{}' has {} records waiting, processing is falling behind",
                lane.name(),
                pending
            );
        }
        Ok(())
    }

    /// Records submitted and not yet processed, over all lanes
    pub fn pending_count(&self) -> usize {
        self.lanes.iter().map(|lane| lane.pending_count()).sum()
    }

    pub fn snapshot(&self) -> AccumulationSnapshot {
        self.accumulation.snapshot()
    }

    pub fn accumulation(&self) -> Arc<SpectrumAccumulation> {
        Arc::clone(&self.accumulation)
    }

    pub fn pool(&self) -> &ObjectPool<Accumulator> {
        &self.pool
    }

    /// Wait until every lane has drained its queue
    pub async fn wait_idle(&self) {
        for lane in &self.lanes {
            lane.wait_idle().await;
        }
    }

    /// Stop, drain and join every lane
    pub async fn shutdown(&self) {
        for lane in &self.lanes {
            lane.shutdown().await;
        }
        info!(
            "Spectrum pipeline shut down after {} records",
            self.accumulation.snapshot().sequences_processed
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FailureCategory;
    use crate::slicing::{CrestAlignment, Ruler, ThresholdCrestFinder};
    use crate::spectral::{PhaseExtractor, PhaseSynthesizer};

    fn config() -> AccumulationConfig {
        AccumulationConfig {
            ruler: Ruler::Fixed { length: 200 },
            synthesizer: PhaseSynthesizer::Real,
            zero_fill_factor: 1,
            phase_extractor: PhaseExtractor::Zero,
            alignment: CrestAlignment::default(),
            ..AccumulationConfig::default()
        }
    }

    fn record(seed: f64) -> Vec<f64> {
        (0..1000).map(|i| (i as f64 * seed).sin()).collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_records_are_accumulated() {
        let pipeline = SpectrumPipeline::new(
            &config(),
            &PipelineConfig {
                workers: 3,
                queue_warning_threshold: 0,
            },
            Arc::new(ThresholdCrestFinder::new(0.5, 50, 10)),
        )
        .unwrap();
        pipeline.start();
        for _ in 0..12 {
            pipeline
                .submit(PulseRecord::with_crests(record(0.1), vec![100, 500]))
                .unwrap();
        }
        pipeline.submit(PulseRecord::with_crests(record(0.1), vec![])).unwrap();
        pipeline.wait_idle().await;

        let snapshot = pipeline.snapshot();
        assert_eq!(snapshot.sequences_processed, 13);
        assert_eq!(snapshot.exception_count, 1);
        assert_eq!(snapshot.last_exception, Some(FailureCategory::NoPeakFound));
        assert_eq!(snapshot.spectrum.unwrap().pulse_count(), 24);
        assert!(pipeline.pool().created_count() <= 3);

        pipeline.shutdown().await;
        assert!(!pipeline.is_running());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_lanes_agree_on_spectrum_length() {
        let config = AccumulationConfig {
            ruler: Ruler::AverageLength,
            ..config()
        };
        let pipeline = SpectrumPipeline::new(
            &config,
            &PipelineConfig {
                workers: 2,
                queue_warning_threshold: 0,
            },
            Arc::new(ThresholdCrestFinder::new(0.5, 50, 10)),
        )
        .unwrap();
        pipeline.start();

        // Slices of 1000 and 1030 samples zero fill to 1024 and 2048 on their own
        let samples: Vec<f64> = (0..2400).map(|i| (i as f64 * 0.1).sin()).collect();
        for _ in 0..50 {
            pipeline
                .submit(PulseRecord::with_crests(samples.clone(), vec![100, 1100]))
                .unwrap();
            pipeline
                .submit(PulseRecord::with_crests(samples.clone(), vec![100, 1130]))
                .unwrap();
        }
        pipeline.wait_idle().await;

        let snapshot = pipeline.snapshot();
        assert_eq!(snapshot.sequences_processed, 100);
        assert_eq!(snapshot.exception_count, 0);
        assert_eq!(snapshot.last_exception, None);
        assert_eq!(snapshot.spectrum.unwrap().pulse_count(), 200);

        pipeline.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_submit_before_start_is_rejected() {
        let pipeline = SpectrumPipeline::new(
            &config(),
            &PipelineConfig::default(),
            Arc::new(ThresholdCrestFinder::new(0.5, 50, 10)),
        )
        .unwrap();
        let err = pipeline.submit(PulseRecord::new(record(0.1))).unwrap_err();
        assert!(matches!(err, PipelineError::StageOff(_)));
        pipeline.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_zero_workers_rejected() {
        let result = SpectrumPipeline::new(
            &config(),
            &PipelineConfig {
                workers: 0,
                queue_warning_threshold: 0,
            },
            Arc::new(ThresholdCrestFinder::new(0.5, 50, 10)),
        );
        assert!(result.is_err());
    }
}
