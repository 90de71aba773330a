//! Runs a sweep on a background thread.
//!
//! Configuration errors and allocation failures are reported synchronously by
//! [`spawn_sweep`]; once the thread is running, the only way out is a
//! [`SweepCompletion`] on the completion channel.

use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread::{self, JoinHandle};

use anyhow::{anyhow, Context, Result};

use crate::config::SweepConfig;
use crate::divergence::ErrorLog;
use crate::error::SweepError;
use crate::progress::{CancelToken, ProgressEvent};
use crate::sweep::SweepEngine;
use crate::view::SweepResult;

/// Sent exactly once when the worker stops, whether it completed or was cancelled.
#[derive(Debug, Clone)]
pub struct SweepCompletion {
    pub result: SweepResult,
    pub errors: ErrorLog,
}

pub struct SweepHandle {
    cancel: CancelToken,
    progress: Receiver<ProgressEvent>,
    completion: Receiver<SweepCompletion>,
    thread: Option<JoinHandle<()>>,
}

/// Validates and allocates on the calling thread, then starts the worker.
pub fn spawn_sweep(config: SweepConfig) -> Result<SweepHandle, SweepError> {
    let engine = SweepEngine::new(config)?;
    let cancel = CancelToken::new();
    let (progress_tx, progress_rx) = mpsc::channel();
    let (completion_tx, completion_rx) = mpsc::channel();

    let worker_cancel = cancel.clone();
    let thread = thread::spawn(move || {
        let mut progress_tx = progress_tx;
        let mut errors: Option<ErrorLog> = None;
        let result = engine.run(&worker_cancel, &mut progress_tx, &mut errors);
        // The handle may already be gone; nobody is left to tell.
        let _ = completion_tx.send(SweepCompletion {
            result,
            errors: errors.unwrap_or_default(),
        });
    });

    Ok(SweepHandle {
        cancel,
        progress: progress_rx,
        completion: completion_rx,
        thread: Some(thread),
    })
}

impl SweepHandle {
    /// Requests cancellation; the worker stops before its next iteration.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    /// Next queued progress event, if any.
    pub fn try_progress(&self) -> Option<ProgressEvent> {
        self.progress.try_recv().ok()
    }

    /// Drains queued events and returns the latest one.
    pub fn latest_progress(&self) -> Option<ProgressEvent> {
        self.progress.try_iter().last()
    }

    /// Non-blocking poll for the completion message.
    pub fn try_completion(&mut self) -> Result<Option<SweepCompletion>> {
        match self.completion.try_recv() {
            Ok(completion) => {
                self.join_thread()?;
                Ok(Some(completion))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                self.join_thread()?;
                Err(anyhow!("sweep worker exited without reporting completion"))
            }
        }
    }

    /// Blocks until the worker has finished.
    pub fn wait(mut self) -> Result<SweepCompletion> {
        let completion = self
            .completion
            .recv()
            .context("sweep worker exited without reporting completion");
        self.join_thread()?;
        completion
    }

    fn join_thread(&mut self) -> Result<()> {
        if let Some(thread) = self.thread.take() {
            thread
                .join()
                .map_err(|_| anyhow!("sweep worker panicked"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::spawn_sweep;
    use crate::config::SweepConfig;
    use crate::grid::Range;
    use crate::progress::SweepPhase;
    use crate::view::SweepOutcome;

    #[test]
    fn worker_reports_completion_once() {
        let config = SweepConfig {
            r: Range::new(1.0, 1.4, 0.1),
            b: Range::new(0.3, 0.3, 0.1),
            n_iter: 10,
            draw_steps: 20,
            ..SweepConfig::default()
        };
        let handle = spawn_sweep(config).expect("spawn");
        let completion = handle.wait().expect("completion");
        assert_eq!(completion.result.outcome(), SweepOutcome::Completed);
        assert_eq!(completion.result.generations(), 20);
        assert!(completion.errors.is_empty());
    }

    #[test]
    fn progress_arrives_in_phase_order() {
        let config = SweepConfig {
            n_iter: 4,
            draw_steps: 3,
            ..SweepConfig::default()
        };
        let mut handle = spawn_sweep(config).expect("spawn");
        let completion = loop {
            if let Some(completion) = handle.try_completion().expect("worker alive") {
                break completion;
            }
            std::thread::yield_now();
        };
        assert!(!completion.result.is_cancelled());

        let events: Vec<_> = std::iter::from_fn(|| handle.try_progress()).collect();
        assert_eq!(events.len(), (1 + 5) + (1 + 3));
        assert!(events[..6].iter().all(|event| event.phase == SweepPhase::Stabilizing));
        assert!(events[6..].iter().all(|event| event.phase == SweepPhase::Recording));
    }

    #[test]
    fn latest_progress_is_the_final_recording_event() {
        let config = SweepConfig {
            n_iter: 2,
            draw_steps: 6,
            ..SweepConfig::default()
        };
        let mut handle = spawn_sweep(config).expect("spawn");
        let completion = loop {
            if let Some(completion) = handle.try_completion().expect("worker alive") {
                break completion;
            }
            std::thread::yield_now();
        };
        assert_eq!(completion.result.outcome(), SweepOutcome::Completed);

        let latest = handle.latest_progress().expect("events queued");
        assert_eq!(latest.phase, SweepPhase::Recording);
        assert_eq!((latest.current, latest.max), (6, 6));
        assert!(latest.has_drawable_points);

        // The channel is drained.
        assert!(handle.latest_progress().is_none());
        assert!(handle.try_progress().is_none());
    }

    #[test]
    fn cloned_cancel_token_stops_the_worker() {
        let config = SweepConfig {
            r: Range::new(0.0, 1.4, 0.001),
            b: Range::new(0.0, 0.4, 0.01),
            n_iter: 100_000,
            draw_steps: 10,
            ..SweepConfig::default()
        };
        let handle = spawn_sweep(config).expect("spawn");
        let token = handle.cancel_token();
        assert!(!token.is_cancelled());

        std::thread::spawn(move || token.cancel())
            .join()
            .expect("cancel thread");
        let completion = handle.wait().expect("completion");
        assert!(completion.result.is_cancelled());
    }

    #[test]
    fn invalid_config_is_rejected_before_spawning() {
        let config = SweepConfig {
            x0: f64::NAN,
            ..SweepConfig::default()
        };
        assert!(spawn_sweep(config).is_err());
    }

    #[test]
    fn cancelled_worker_still_completes() {
        let config = SweepConfig {
            r: Range::new(0.0, 1.4, 0.001),
            b: Range::new(0.0, 0.4, 0.01),
            n_iter: 100_000,
            draw_steps: 10,
            ..SweepConfig::default()
        };
        let handle = spawn_sweep(config).expect("spawn");
        handle.cancel();
        let completion = handle.wait().expect("completion");
        assert!(completion.result.is_cancelled());
        assert!(completion.result.generations() <= 10);
    }
}
