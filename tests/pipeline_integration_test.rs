// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

use std::io::Write;
use std::sync::Arc;

use approx::assert_relative_eq;
use rust_interferometry::acquisition::{get_source_from_file, PulseSequenceSource, SimulatedSource};
use rust_interferometry::config::{AccumulationConfig, PipelineConfig, SimulatedSourceConfig};
use rust_interferometry::processing::{Accumulator, PulseRecord, SpectrumPipeline};
use rust_interferometry::slicing::{CrestAlignment, Ruler, ThresholdCrestFinder};
use rust_interferometry::spectral::{PhaseExtractor, PhaseSynthesizer};
use rust_interferometry::FailureCategory;

fn quiet_train() -> SimulatedSourceConfig {
    SimulatedSourceConfig {
        sequence_length: 8192,
        pulse_period: 2000,
        first_crest: 1000,
        noise_amplitude: 0.0,
        ..SimulatedSourceConfig::default()
    }
}

fn complex_config() -> AccumulationConfig {
    AccumulationConfig {
        ruler: Ruler::MinCommonLength,
        synthesizer: PhaseSynthesizer::Complex,
        zero_fill_factor: 1,
        phase_extractor: PhaseExtractor::CenterInterpolation {
            center_half_width: 64,
        },
        alignment: CrestAlignment::Center,
        ..AccumulationConfig::default()
    }
}

fn crest_finder() -> Arc<ThresholdCrestFinder> {
    Arc::new(ThresholdCrestFinder::new(0.5, 500, 100))
}

fn pipeline(workers: usize) -> SpectrumPipeline {
    SpectrumPipeline::new(
        &complex_config(),
        &PipelineConfig {
            workers,
            queue_warning_threshold: 0,
        },
        crest_finder(),
    )
    .unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_simulated_train_accumulates_to_carrier_peak() {
    let mut source = SimulatedSource::new(quiet_train(), 6);
    assert_eq!(source.crest_indices(), vec![1000, 3000, 5000, 7000]);

    let pipeline = pipeline(3);
    pipeline.start();
    let mut reference = None;
    while let Some(sequence) = source.next_sequence().unwrap() {
        reference.get_or_insert_with(|| sequence.clone());
        pipeline.submit(PulseRecord::new(sequence)).unwrap();
    }
    pipeline.wait_idle().await;

    let snapshot = pipeline.snapshot();
    assert_eq!(snapshot.sequences_processed, 6);
    assert_eq!(snapshot.exception_count, 0);
    let spectrum = snapshot.spectrum.unwrap();
    // Four 2000-sample windows per sequence, zero filled to 2048
    assert_eq!(spectrum.pulse_count(), 24);
    assert_eq!(spectrum.len(), 1024);

    // Noise-free sequences are identical, so the average matches one sequence
    let mut accumulator = Accumulator::new(&complex_config(), crest_finder()).unwrap();
    let single = accumulator.process(&reference.unwrap());
    let expected = single.spectrum().unwrap().average();
    let average = spectrum.average();
    for (a, e) in average.bins().iter().zip(expected.bins()) {
        assert_relative_eq!(a.re, e.re, epsilon = 1e-9);
        assert_relative_eq!(a.im, e.im, epsilon = 1e-9);
    }

    // 0.12 cycles per sample lands on bin 0.12 * 2048
    let magnitude = average.magnitude();
    let peak_bin = magnitude
        .iter()
        .enumerate()
        .fold(0, |best, (i, &m)| if m > magnitude[best] { i } else { best });
    assert!((244..=247).contains(&peak_bin), "peak at bin {}", peak_bin);

    pipeline.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_failed_sequences_are_counted_not_accumulated() {
    let mut source = SimulatedSource::new(quiet_train(), 4);
    let pipeline = pipeline(2);
    pipeline.start();

    while let Some(sequence) = source.next_sequence().unwrap() {
        pipeline.submit(PulseRecord::new(sequence)).unwrap();
        pipeline.submit(PulseRecord::new(vec![0.0; 8192])).unwrap();
    }
    pipeline.wait_idle().await;

    let snapshot = pipeline.snapshot();
    assert_eq!(snapshot.sequences_processed, 8);
    assert_eq!(snapshot.exception_count, 4);
    assert_eq!(snapshot.last_exception, Some(FailureCategory::NoPeakFound));
    assert_relative_eq!(snapshot.failure_rate(), 0.5);
    assert_eq!(snapshot.spectrum.unwrap().pulse_count(), 16);

    pipeline.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_text_file_source_feeds_pipeline() {
    let config = quiet_train();
    let mut simulated = SimulatedSource::new(config.clone(), 3);
    let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
    writeln!(file, "# three simulated sequences").unwrap();
    while let Some(sequence) = simulated.next_sequence().unwrap() {
        for value in sequence {
            writeln!(file, "{}", value).unwrap();
        }
    }
    file.flush().unwrap();

    let mut source = get_source_from_file(file.path(), config.sequence_length).unwrap();
    let pipeline = pipeline(1);
    pipeline.start();
    while let Some(sequence) = source.next_sequence().unwrap() {
        pipeline.submit(PulseRecord::new(sequence)).unwrap();
    }
    pipeline.wait_idle().await;

    let snapshot = pipeline.snapshot();
    assert_eq!(snapshot.sequences_processed, 3);
    assert!(!snapshot.has_exception());
    assert_eq!(snapshot.spectrum.unwrap().pulse_count(), 12);

    pipeline.shutdown().await;
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_pipeline_refuses_records_after_stop() {
    let pipeline = pipeline(2);
    pipeline.start();
    pipeline.stop();
    assert!(!pipeline.is_running());
    assert!(pipeline
        .submit(PulseRecord::new(vec![0.0; 16]))
        .unwrap_err()
        .is_usage_error());
    pipeline.shutdown().await;
    assert_eq!(pipeline.snapshot().sequences_processed, 0);
}
