//! Cancellation and progress reporting between the sweep worker and its observers.

use std::sync::atomic::{AtomicBool, AtomicU8, AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};

use serde::{Deserialize, Serialize};

/// Cooperative cancellation flag shared between the worker and a controller.
///
/// The worker polls it at the top of every iteration; a set flag never
/// interrupts an iteration already in progress.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepPhase {
    Stabilizing,
    Recording,
    /// Frame-by-frame consumption by the renderer; never published by the engine.
    Drawing,
}

impl SweepPhase {
    pub fn status(self) -> &'static str {
        match self {
            SweepPhase::Stabilizing => "Reaching steady state (1/3)",
            SweepPhase::Recording => "Computing values for drawing (2/3)",
            SweepPhase::Drawing => "Drawing (3/3)",
        }
    }

    fn to_code(self) -> u8 {
        match self {
            SweepPhase::Stabilizing => 1,
            SweepPhase::Recording => 2,
            SweepPhase::Drawing => 3,
        }
    }

    fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(SweepPhase::Stabilizing),
            2 => Some(SweepPhase::Recording),
            3 => Some(SweepPhase::Drawing),
            _ => None,
        }
    }
}

/// One progress update, published at every iteration boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressEvent {
    pub phase: SweepPhase,
    pub current: usize,
    pub max: usize,
    pub has_drawable_points: bool,
}

impl ProgressEvent {
    pub fn status(&self) -> &'static str {
        self.phase.status()
    }
}

/// Receiver of progress events. Implementations must not block the worker.
pub trait ProgressSink {
    fn publish(&mut self, event: ProgressEvent);
}

impl ProgressSink for () {
    fn publish(&mut self, _event: ProgressEvent) {}
}

impl ProgressSink for Vec<ProgressEvent> {
    fn publish(&mut self, event: ProgressEvent) {
        self.push(event);
    }
}

impl ProgressSink for mpsc::Sender<ProgressEvent> {
    fn publish(&mut self, event: ProgressEvent) {
        // A consumer that hung up no longer cares about progress.
        let _ = self.send(event);
    }
}

impl<S: ProgressSink + ?Sized> ProgressSink for &mut S {
    fn publish(&mut self, event: ProgressEvent) {
        (**self).publish(event);
    }
}

/// Latest-value progress state that a UI can poll without draining a channel.
#[derive(Debug, Clone, Default)]
pub struct SharedProgress {
    inner: Arc<ProgressCells>,
}

#[derive(Debug, Default)]
struct ProgressCells {
    value: AtomicUsize,
    max: AtomicUsize,
    phase: AtomicU8,
    has_drawable_points: AtomicBool,
}

/// Point-in-time copy of a [`SharedProgress`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub value: usize,
    pub max: usize,
    pub phase: Option<SweepPhase>,
    pub has_drawable_points: bool,
}

impl ProgressSnapshot {
    pub fn status(&self) -> &'static str {
        self.phase.map_or("", SweepPhase::status)
    }
}

impl SharedProgress {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            value: self.inner.value.load(Ordering::Relaxed),
            max: self.inner.max.load(Ordering::Relaxed),
            phase: SweepPhase::from_code(self.inner.phase.load(Ordering::Relaxed)),
            has_drawable_points: self.inner.has_drawable_points.load(Ordering::Relaxed),
        }
    }

    /// Used by the renderer for the drawing stage, which it drives itself.
    pub fn set(&self, phase: SweepPhase, value: usize, max: usize) {
        self.inner.phase.store(phase.to_code(), Ordering::Relaxed);
        self.inner.max.store(max, Ordering::Relaxed);
        self.inner.value.store(value, Ordering::Relaxed);
    }
}

impl ProgressSink for SharedProgress {
    fn publish(&mut self, event: ProgressEvent) {
        self.set(event.phase, event.current, event.max);
        if event.has_drawable_points {
            self.inner.has_drawable_points.store(true, Ordering::Relaxed);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{CancelToken, ProgressEvent, ProgressSink, SharedProgress, SweepPhase};
    use std::sync::mpsc;

    fn event(phase: SweepPhase, current: usize, drawable: bool) -> ProgressEvent {
        ProgressEvent {
            phase,
            current,
            max: 10,
            has_drawable_points: drawable,
        }
    }

    #[test]
    fn cancel_token_is_shared_between_clones() {
        let token = CancelToken::new();
        let observer = token.clone();
        assert!(!observer.is_cancelled());
        token.cancel();
        assert!(observer.is_cancelled());
    }

    #[test]
    fn shared_progress_keeps_latest_value_and_sticky_drawable_flag() {
        let progress = SharedProgress::new();
        assert_eq!(progress.snapshot().phase, None);
        assert_eq!(progress.snapshot().status(), "");

        let mut sink = progress.clone();
        sink.publish(event(SweepPhase::Recording, 1, true));
        sink.publish(event(SweepPhase::Recording, 2, false));

        let snapshot = progress.snapshot();
        assert_eq!(snapshot.value, 2);
        assert_eq!(snapshot.max, 10);
        assert_eq!(snapshot.phase, Some(SweepPhase::Recording));
        assert!(snapshot.has_drawable_points);
        assert_eq!(snapshot.status(), "Computing values for drawing (2/3)");
    }

    #[test]
    fn channel_sink_ignores_disconnected_receiver() {
        let (mut sender, receiver) = mpsc::channel();
        sender.publish(event(SweepPhase::Stabilizing, 0, false));
        assert_eq!(receiver.try_recv().map(|e| e.current), Ok(0));
        drop(receiver);
        sender.publish(event(SweepPhase::Stabilizing, 1, false));
    }
}
