#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Simulated progress heartbeat for sealpatch
//!
//! The elevation boundary runs the whole privileged script as one
//! opaque unit, so there is no real step-level progress to report.
//! This crate provides the labeled liveness signal instead: a ticking
//! percentage that climbs toward a ceiling while the script runs, hits
//! 100 only when the executor reports completion, and resets after a
//! short grace period. The percentage carries no completion semantics.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use sealpatch_config::ProgressConfig;
use sealpatch_events::{AppEvent, EventEmitter, EventSender, ProgressEvent};

/// Spawns heartbeat tasks configured from [`ProgressConfig`].
#[derive(Clone)]
pub struct ProgressEstimator {
    config: ProgressConfig,
    tx: Option<EventSender>,
}

impl EventEmitter for ProgressEstimator {
    fn event_sender(&self) -> Option<&EventSender> {
        self.tx.as_ref()
    }
}

impl ProgressEstimator {
    #[must_use]
    pub fn new(config: ProgressConfig, tx: Option<EventSender>) -> Self {
        Self { config, tx }
    }

    /// Start a heartbeat for `operation` and return its handle.
    ///
    /// Ticks are emitted every `tick_interval_ms`, climbing by
    /// `tick_increment` per tick and never exceeding `tick_ceiling`
    /// until [`ProgressHandle::complete`] is called.
    #[must_use]
    pub fn start(&self, operation: &str) -> ProgressHandle {
        let operation = operation.to_string();
        let percent = Arc::new(AtomicU8::new(0));
        let (done_tx, mut done_rx) = oneshot::channel::<()>();

        self.emit(AppEvent::Progress(ProgressEvent::Started {
            operation: operation.clone(),
        }));

        let estimator = self.clone();
        let shared = Arc::clone(&percent);
        let config = self.config.clone();
        let task = tokio::spawn(async move {
            let interval = Duration::from_millis(config.tick_interval_ms);
            loop {
                tokio::select! {
                    result = &mut done_rx => {
                        // A dropped handle means the operation was
                        // abandoned without an outcome; reset silently.
                        if result.is_ok() {
                            shared.store(100, Ordering::Relaxed);
                            estimator.emit(AppEvent::Progress(ProgressEvent::Completed {
                                operation: operation.clone(),
                            }));
                            tokio::time::sleep(Duration::from_millis(config.reset_grace_ms))
                                .await;
                        }
                        shared.store(0, Ordering::Relaxed);
                        estimator.emit(AppEvent::Progress(ProgressEvent::Reset {
                            operation,
                        }));
                        return;
                    }
                    () = tokio::time::sleep(interval) => {
                        let current = shared.load(Ordering::Relaxed);
                        let next = current
                            .saturating_add(config.tick_increment)
                            .min(config.tick_ceiling);
                        shared.store(next, Ordering::Relaxed);
                        estimator.emit(AppEvent::Progress(ProgressEvent::Tick {
                            operation: operation.clone(),
                            percent: next,
                        }));
                    }
                }
            }
        });

        ProgressHandle {
            percent,
            done: Some(done_tx),
            task,
        }
    }
}

/// Handle to one running heartbeat.
///
/// Dropping the handle without calling [`complete`](Self::complete)
/// resets the display without ever showing 100.
pub struct ProgressHandle {
    percent: Arc<AtomicU8>,
    done: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl ProgressHandle {
    /// Current simulated percentage.
    #[must_use]
    pub fn percent(&self) -> u8 {
        self.percent.load(Ordering::Relaxed)
    }

    /// Force 100, hold it through the grace period, then reset.
    ///
    /// Awaits the reset so callers observe a quiesced heartbeat.
    pub async fn complete(mut self) {
        if let Some(done) = self.done.take() {
            let _ = done.send(());
        }
        let _ = (&mut self.task).await;
    }
}

impl Drop for ProgressHandle {
    fn drop(&mut self) {
        self.done.take();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sealpatch_events::channel;
    use tokio::time::{advance, Duration};

    fn config() -> ProgressConfig {
        ProgressConfig {
            tick_interval_ms: 2000,
            tick_increment: 5,
            tick_ceiling: 95,
            reset_grace_ms: 3000,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn ticks_climb_and_cap_below_one_hundred() {
        let estimator = ProgressEstimator::new(config(), None);
        let handle = estimator.start("install");

        advance(Duration::from_millis(2001)).await;
        tokio::task::yield_now().await;
        assert_eq!(handle.percent(), 5);

        // Far past the point where 5%/tick would exceed the ceiling.
        advance(Duration::from_millis(2000 * 40)).await;
        tokio::task::yield_now().await;
        assert_eq!(handle.percent(), 95);

        handle.complete().await;
    }

    #[tokio::test(start_paused = true)]
    async fn completion_forces_one_hundred_then_resets() {
        let (tx, mut rx) = channel();
        let estimator = ProgressEstimator::new(config(), Some(tx));
        let handle = estimator.start("install");

        advance(Duration::from_millis(2001)).await;
        tokio::task::yield_now().await;
        handle.complete().await;

        let mut saw_completed = false;
        let mut saw_reset_after_completed = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Progress(ProgressEvent::Completed { .. }) => saw_completed = true,
                AppEvent::Progress(ProgressEvent::Reset { .. }) => {
                    saw_reset_after_completed = saw_completed;
                }
                _ => {}
            }
        }
        assert!(saw_completed);
        assert!(saw_reset_after_completed);
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_handle_resets_without_completing() {
        let (tx, mut rx) = channel();
        let estimator = ProgressEstimator::new(config(), Some(tx));
        let handle = estimator.start("install");

        advance(Duration::from_millis(2001)).await;
        tokio::task::yield_now().await;
        drop(handle);
        tokio::task::yield_now().await;

        let mut saw_completed = false;
        let mut saw_reset = false;
        while let Ok(event) = rx.try_recv() {
            match event {
                AppEvent::Progress(ProgressEvent::Completed { .. }) => saw_completed = true,
                AppEvent::Progress(ProgressEvent::Reset { .. }) => saw_reset = true,
                _ => {}
            }
        }
        assert!(!saw_completed);
        assert!(saw_reset);
    }
}
