//! Keep-latest frame pipeline.
//!
//! A camera produces frames faster than they can always be processed.  The
//! producer and the tracker worker share a single-slot channel; when the
//! slot is still occupied the stale frame is evicted and replaced, so the
//! worker always sees the newest hand position and never builds a backlog.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use thiserror::Error;
use tracing::{debug, info};

use crate::hand::{FrameOutput, GestureTracker, TimedFrame};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("frame pipeline closed")]
    Closed,
    #[error("failed to spawn tracker worker: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("tracker worker panicked")]
    WorkerPanicked,
}

/// Frame counters shared between producer and worker.
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    pub frames_sent: AtomicU64,
    pub frames_evicted: AtomicU64,
    pub frames_processed: AtomicU64,
}

impl PipelineMetrics {
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            frames_sent: self.frames_sent.load(Ordering::Relaxed),
            frames_evicted: self.frames_evicted.load(Ordering::Relaxed),
            frames_processed: self.frames_processed.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub frames_sent: u64,
    pub frames_evicted: u64,
    pub frames_processed: u64,
}

/// Producer half of the single-slot channel.
#[derive(Clone)]
pub struct FrameSender {
    tx: Sender<TimedFrame>,
    // Used only to pull a stale frame out of a full slot.
    evict: Receiver<TimedFrame>,
    metrics: Arc<PipelineMetrics>,
}

impl FrameSender {
    /// Offer a frame without blocking, replacing any frame still pending.
    pub fn send(&self, frame: TimedFrame) -> Result<(), PipelineError> {
        let mut frame = frame;
        loop {
            match self.tx.try_send(frame) {
                Ok(()) => {
                    self.metrics.frames_sent.fetch_add(1, Ordering::Relaxed);
                    return Ok(());
                }
                Err(TrySendError::Full(rejected)) => {
                    // The worker may take the pending frame first; then the
                    // retry simply finds the slot free.
                    if let Ok(stale) = self.evict.try_recv() {
                        self.metrics.frames_evicted.fetch_add(1, Ordering::Relaxed);
                        debug!(t = stale.timestamp_s, "evicted stale frame");
                    }
                    frame = rejected;
                }
                Err(TrySendError::Disconnected(_)) => return Err(PipelineError::Closed),
            }
        }
    }

    pub fn metrics(&self) -> Arc<PipelineMetrics> {
        Arc::clone(&self.metrics)
    }
}

/// Create the single-slot channel.
pub fn keep_latest() -> (FrameSender, Receiver<TimedFrame>) {
    let (tx, rx) = bounded(1);
    let sender = FrameSender {
        tx,
        evict: rx.clone(),
        metrics: Arc::new(PipelineMetrics::default()),
    };
    (sender, rx)
}

/// Outputs the worker may queue before it blocks on a slow consumer.
///
/// While the worker is blocked the input slot keeps evicting, so a slow
/// reader costs skipped frames rather than a growing backlog.
pub const OUTPUT_CAPACITY: usize = 64;

/// Handle to the tracker worker thread.
pub struct Worker {
    outputs: Receiver<FrameOutput>,
    handle: thread::JoinHandle<GestureTracker>,
}

impl Worker {
    /// Outputs in the order their frames were processed.
    pub fn outputs(&self) -> &Receiver<FrameOutput> {
        &self.outputs
    }

    /// Wait for the worker to finish and take back the tracker.
    ///
    /// The worker stops once every `FrameSender` has been dropped.
    pub fn join(self) -> Result<GestureTracker, PipelineError> {
        self.handle.join().map_err(|_| PipelineError::WorkerPanicked)
    }
}

/// Start a worker that runs `tracker` over every frame reaching the slot.
pub fn spawn(tracker: GestureTracker) -> Result<(FrameSender, Worker), PipelineError> {
    let (sender, frames) = keep_latest();
    let metrics = sender.metrics();
    let (out_tx, outputs) = bounded(OUTPUT_CAPACITY);

    let handle = thread::Builder::new()
        .name("pinchpoint-tracker".into())
        .spawn(move || run_worker(tracker, frames, out_tx, metrics))?;

    Ok((sender, Worker { outputs, handle }))
}

fn run_worker(
    mut tracker: GestureTracker,
    frames: Receiver<TimedFrame>,
    outputs: Sender<FrameOutput>,
    metrics: Arc<PipelineMetrics>,
) -> GestureTracker {
    info!("tracker worker started");
    for frame in frames.iter() {
        let output = tracker.process(&frame);
        metrics.frames_processed.fetch_add(1, Ordering::Relaxed);
        if outputs.send(output).is_err() {
            debug!("output receiver dropped, stopping worker");
            break;
        }
    }
    let stats = metrics.snapshot();
    info!(
        sent = stats.frames_sent,
        evicted = stats.frames_evicted,
        processed = stats.frames_processed,
        "tracker worker stopped"
    );
    tracker
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;

    #[test]
    fn test_keep_latest_evicts_pending() {
        let (sender, rx) = keep_latest();
        for i in 0..3 {
            sender.send(TimedFrame::absent(i as f64)).unwrap();
        }
        assert_eq!(rx.try_recv().unwrap(), TimedFrame::absent(2.0));
        assert!(rx.try_recv().is_err());

        let stats = sender.metrics().snapshot();
        assert_eq!(stats.frames_sent, 3);
        assert_eq!(stats.frames_evicted, 2);
    }

    #[test]
    fn test_no_eviction_when_drained() {
        let (sender, rx) = keep_latest();
        sender.send(TimedFrame::absent(0.0)).unwrap();
        rx.recv().unwrap();
        sender.send(TimedFrame::absent(0.1)).unwrap();
        assert_eq!(rx.recv().unwrap(), TimedFrame::absent(0.1));
        assert_eq!(sender.metrics().snapshot().frames_evicted, 0);
    }

    #[test]
    fn test_worker_returns_tracker() {
        let tracker = GestureTracker::new(TrackerConfig::default());
        let (sender, worker) = spawn(tracker).unwrap();
        let metrics = sender.metrics();
        for i in 0..10 {
            sender.send(TimedFrame::absent(i as f64 * 0.033)).unwrap();
        }
        drop(sender);

        let outputs: Vec<FrameOutput> = worker.outputs().iter().collect();
        let tracker = worker.join().unwrap();

        let stats = metrics.snapshot();
        assert_eq!(stats.frames_sent, 10);
        assert_eq!(stats.frames_processed + stats.frames_evicted, 10);
        assert_eq!(outputs.len() as u64, stats.frames_processed);
        assert_eq!(tracker.frames_processed(), stats.frames_processed);
    }

    #[test]
    fn test_unread_outputs_stay_bounded() {
        let tracker = GestureTracker::new(TrackerConfig::default());
        let (sender, worker) = spawn(tracker).unwrap();
        assert_eq!(worker.outputs().capacity(), Some(OUTPUT_CAPACITY));

        // Nobody reads while the producer floods the slot.
        for i in 0..(OUTPUT_CAPACITY * 4) {
            sender.send(TimedFrame::absent(i as f64 * 0.001)).unwrap();
            assert!(worker.outputs().len() <= OUTPUT_CAPACITY);
        }
        let metrics = sender.metrics();
        drop(sender);

        let drained = worker.outputs().iter().count() as u64;
        worker.join().unwrap();
        let stats = metrics.snapshot();
        assert_eq!(drained, stats.frames_processed);
        assert_eq!(stats.frames_processed + stats.frames_evicted, stats.frames_sent);
    }
}
