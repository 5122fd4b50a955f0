// Copyright (c) 2025 Ronan LE MEILLAT, SCTG Development
// This file is part of the rust-photoacoustic project and is licensed under the
// SCTG Development Non-Commercial License v1.0 (see LICENSE.md for details).

//! Non-blocking producer/consumer stage
//!
//! A [`Camera`] decouples the thread that delivers raw pulse sequences from
//! the expensive per-sequence processing. `submit` only enqueues. A single
//! drain loop, owned by a blocking tokio task, consumes items in submission
//! order. The stage is *draining* while submitted items are not yet consumed
//! and *idle* otherwise.

use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use log::{debug, error, info, warn};
use tokio::sync::{mpsc, Notify};
use tokio::task::JoinHandle;

use crate::error::PipelineError;

/// Producer/consumer stage with exactly one drain loop
pub struct Camera<T> {
    name: String,
    sender: RwLock<Option<mpsc::UnboundedSender<T>>>,
    is_on: AtomicBool,
    /// Items submitted and not yet consumed
    pending: Arc<AtomicUsize>,
    idle: Arc<Notify>,
    drain_loop: Mutex<Option<JoinHandle<()>>>,
}

impl<T: Send + 'static> Camera<T> {
    /// Create a stage whose drain loop calls `consume` on every item.
    ///
    /// Must be called from within a tokio runtime. The stage starts off.
    pub fn new<F>(name: impl Into<String>, mut consume: F) -> Self
    where
        F: FnMut(T) + Send + 'static,
    {
        let name = name.into();
        let (sender, mut receiver) = mpsc::unbounded_channel::<T>();
        let pending = Arc::new(AtomicUsize::new(0));
        let idle = Arc::new(Notify::new());

        let loop_pending = pending.clone();
        let loop_idle = idle.clone();
        let loop_name = name.clone();
        let drain_loop = tokio::task::spawn_blocking(move || {
            debug!("Drain loop of '{}' started", loop_name);
            while let Some(item) = receiver.blocking_recv() {
                // A panicking item is dropped; the rest of the queue still drains
                if let Err(cause) = panic::catch_unwind(AssertUnwindSafe(|| consume(item))) {
                    error!(
                        "Stage '{}' dropped an item, consumer panicked: {}",
                        loop_name,
                        panic_message(cause.as_ref())
                    );
                }
                if loop_pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                    loop_idle.notify_waiters();
                }
            }
            debug!("Drain loop of '{}' exited", loop_name);
        });

        Self {
            name,
            sender: RwLock::new(Some(sender)),
            is_on: AtomicBool::new(false),
            pending,
            idle,
            drain_loop: Mutex::new(Some(drain_loop)),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Accept submissions
    pub fn turn_on(&self) {
        if !self.is_on.swap(true, Ordering::AcqRel) {
            info!("Stage '{}' turned on", self.name);
        }
    }

    /// Refuse new submissions; items already queued are still consumed
    pub fn turn_off(&self) {
        if self.is_on.swap(false, Ordering::AcqRel) {
            info!("Stage '{}' turned off", self.name);
        }
    }

    pub fn is_on(&self) -> bool {
        self.is_on.load(Ordering::Acquire)
    }

    /// Whether submitted items are still waiting to be consumed
    pub fn is_draining(&self) -> bool {
        self.pending_count() > 0
    }

    pub fn pending_count(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    /// Enqueue an item for the drain loop. Never blocks.
    pub fn submit(&self, item: T) -> Result<(), PipelineError> {
        if !self.is_on() {
            warn!("Submit to stage '{}' while it is off", self.name);
            return Err(PipelineError::StageOff(self.name.clone()));
        }

        let sender = self.sender.read().unwrap_or_else(|e| e.into_inner());
        let Some(sender) = sender.as_ref() else {
            return Err(PipelineError::StageClosed(self.name.clone()));
        };

        // Count before sending so the stage never looks idle with an item queued
        self.pending.fetch_add(1, Ordering::AcqRel);
        if sender.send(item).is_err() {
            if self.pending.fetch_sub(1, Ordering::AcqRel) == 1 {
                self.idle.notify_waiters();
            }
            return Err(PipelineError::StageClosed(self.name.clone()));
        }
        Ok(())
    }

    /// Wait until every item submitted so far has been consumed
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.idle.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();
            if self.pending_count() == 0 {
                return;
            }
            notified.await;
        }
    }

    /// Turn the stage off, let the drain loop finish the queue and exit
    pub async fn shutdown(&self) {
        self.turn_off();
        self.sender
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .take();

        let handle = self
            .drain_loop
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!("Drain loop of '{}' ended abnormally: {}", self.name, e);
            }
        }
        info!("Stage '{}' shut down", self.name);
    }
}

fn panic_message(cause: &(dyn std::any::Any + Send)) -> &str {
    cause
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| cause.downcast_ref::<String>().map(String::as_str))
        .unwrap_or("unknown cause")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_submit_while_off_is_rejected() {
        let camera = Camera::new("test", |_: u32| {});
        let err = camera.submit(1).unwrap_err();
        assert_eq!(err, PipelineError::StageOff("test".to_string()));
        assert!(err.is_usage_error());
        camera.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_items_consumed_in_order() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let camera = Camera::new("order", move |item: u32| {
            sink.lock().unwrap().push(item);
        });
        camera.turn_on();
        for i in 0..100 {
            camera.submit(i).unwrap();
        }
        camera.wait_idle().await;
        assert!(!camera.is_draining());
        assert_eq!(*seen.lock().unwrap(), (0..100).collect::<Vec<_>>());
        camera.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_submit_does_not_wait_for_slow_consumer() {
        let camera = Camera::new("slow", |_: u32| std::thread::sleep(Duration::from_millis(50)));
        camera.turn_on();
        let start = std::time::Instant::now();
        for i in 0..10 {
            camera.submit(i).unwrap();
        }
        assert!(start.elapsed() < Duration::from_millis(50));
        assert!(camera.is_draining());
        camera.wait_idle().await;
        camera.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_turn_off_finishes_queued_items() {
        let count = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&count);
        let camera = Camera::new("off", move |_: u32| {
            std::thread::sleep(Duration::from_millis(2));
            counter.fetch_add(1, Ordering::SeqCst);
        });
        camera.turn_on();
        for i in 0..20 {
            camera.submit(i).unwrap();
        }
        camera.turn_off();
        assert!(camera.submit(99).is_err());
        camera.wait_idle().await;
        assert_eq!(count.load(Ordering::SeqCst), 20);
        camera.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_panicking_item_does_not_stop_the_stage() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let camera = Camera::new("panics", move |item: u32| {
            if item == 1 {
                panic!("bad item {}", item);
            }
            sink.lock().unwrap().push(item);
        });
        camera.turn_on();
        camera.submit(1).unwrap();
        camera.submit(2).unwrap();

        tokio::time::timeout(Duration::from_secs(5), camera.wait_idle())
            .await
            .expect("stage never became idle");
        assert!(!camera.is_draining());
        assert_eq!(camera.pending_count(), 0);
        assert_eq!(*seen.lock().unwrap(), vec![2]);

        camera.submit(3).unwrap();
        camera.wait_idle().await;
        assert_eq!(*seen.lock().unwrap(), vec![2, 3]);
        camera.shutdown().await;
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_submit_after_shutdown_is_closed() {
        let camera = Camera::new("closed", |_: u32| {});
        camera.turn_on();
        camera.shutdown().await;
        camera.turn_on();
        assert_eq!(
            camera.submit(1).unwrap_err(),
            PipelineError::StageClosed("closed".to_string())
        );
    }
}
