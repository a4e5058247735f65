//! Gesture recognition from per-frame hand landmarks.
//!
//! `GestureTracker` owns all per-hand state: the pointer smoother, the
//! freeze policy, the four pinch channels and the hand-loss counter.  Each
//! call to `process` consumes one frame and yields exactly one
//! `FrameOutput`.  Callers must serialize frames; nothing here locks.

use std::collections::VecDeque;

use tracing::{debug, trace, warn};

use super::cursor::{CursorMapper, CursorPoint, CursorState};
use super::landmarks::{HandFrame, HandLandmark, Landmarks, TimedFrame};
use super::loss::HandLossHandler;
use super::one_euro::OneEuroFilter2D;
use super::pinch::{ChannelBank, PinchClassification, PinchDistances, PinchKind};
use crate::config::TrackerConfig;

/// Events that lost same-frame arbitration and wait for a free frame.
const MAX_DEFERRED_EVENTS: usize = 8;

// ── Events ─────────────────────────────────────────────────

/// Semantic gesture vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GestureKind {
    None,
    Click,
    LongPressStart,
    LongPressEnd,
    Back,
    Home,
    RecentApps,
    /// Part of the consumer vocabulary; no pinch currently produces it.
    Notifications,
    SwipeStart,
    Swiping,
    SwipeEnd,
    HandLost,
}

impl GestureKind {
    /// String representation for IPC.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Click => "click",
            Self::LongPressStart => "long-press-start",
            Self::LongPressEnd => "long-press-end",
            Self::Back => "back",
            Self::Home => "home",
            Self::RecentApps => "recent-apps",
            Self::Notifications => "notifications",
            Self::SwipeStart => "swipe-start",
            Self::Swiping => "swiping",
            Self::SwipeEnd => "swipe-end",
            Self::HandLost => "hand-lost",
        }
    }

    /// Whether the attached coordinate means anything to the consumer.
    pub fn is_positional(&self) -> bool {
        matches!(
            self,
            Self::Click
                | Self::LongPressStart
                | Self::LongPressEnd
                | Self::SwipeStart
                | Self::Swiping
                | Self::SwipeEnd
        )
    }
}

/// A gesture together with the cursor position it applies to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureEvent {
    pub kind: GestureKind,
    pub position: CursorPoint,
}

impl GestureEvent {
    pub fn new(kind: GestureKind, position: CursorPoint) -> Self {
        Self { kind, position }
    }

    pub fn none(position: CursorPoint) -> Self {
        Self::new(GestureKind::None, position)
    }
}

/// Result of processing one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameOutput {
    /// Reported (smoothed, possibly frozen) cursor position.
    pub cursor: CursorPoint,
    pub gesture: GestureEvent,
}

// ── Tracker ────────────────────────────────────────────────

/// Per-hand gesture recognition and cursor stabilization.
pub struct GestureTracker {
    config: TrackerConfig,
    smoother: OneEuroFilter2D,
    mapper: CursorMapper,
    cursor: CursorState,
    channels: ChannelBank,
    loss: HandLossHandler,
    deferred: VecDeque<GestureEvent>,
    frames_processed: u64,
    last_gesture: GestureKind,
}

impl GestureTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            smoother: OneEuroFilter2D::new(&config.smoothing),
            mapper: CursorMapper::new(config.cursor.clone()),
            cursor: CursorState::new(),
            channels: ChannelBank::new(&config.pinch),
            loss: HandLossHandler::new(&config.hand_loss),
            deferred: VecDeque::with_capacity(MAX_DEFERRED_EVENTS),
            frames_processed: 0,
            last_gesture: GestureKind::None,
            config,
        }
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    /// Process one frame and return the reported cursor and its event.
    pub fn process(&mut self, frame: &TimedFrame) -> FrameOutput {
        let output = match &frame.hand {
            HandFrame::Present(landmarks) => self.process_present(landmarks, frame.timestamp_s),
            HandFrame::Absent => self.process_absent(frame.timestamp_s),
        };
        self.frames_processed += 1;
        if output.gesture.kind != GestureKind::None && output.gesture.kind != self.last_gesture {
            debug!(
                event = output.gesture.kind.as_str(),
                x = output.gesture.position.x,
                y = output.gesture.position.y,
                "gesture"
            );
        }
        self.last_gesture = output.gesture.kind;
        output
    }

    fn process_present(&mut self, landmarks: &Landmarks, now_s: f64) -> FrameOutput {
        self.loss.on_present();

        let target = self.mapper.map(landmarks.get(HandLandmark::IndexTip));
        let (x, y) = self.smoother.filter((target.x, target.y), now_s);
        let live = CursorPoint::new(x, y);

        let distances = PinchDistances::measure(landmarks);
        let classification = PinchClassification::classify(&distances, &self.config.pinch);
        trace!(
            swipe = distances.swipe,
            click = distances.click,
            back = distances.back,
            pinky = distances.pinky,
            "pinch distances"
        );

        // Events of a freezing channel refer to the snapshot taken when it
        // was pressed, including on its release frame.
        let anchor = self.cursor.anchor();
        let results = self.channels.update(&classification, now_s);
        let reported = self.cursor.stabilize(live, classification.freezing());

        let candidates = results.map(|(kind, event)| {
            event.map(|event| {
                let position = if kind.freezes_cursor() {
                    anchor.unwrap_or(reported)
                } else {
                    reported
                };
                GestureEvent::new(event, position)
            })
        });
        let gesture = self.arbitrate(candidates, GestureEvent::none(reported));

        FrameOutput {
            cursor: reported,
            gesture,
        }
    }

    fn process_absent(&mut self, now_s: f64) -> FrameOutput {
        trace!(t = now_s, "no hand");
        let position = self.cursor.last();
        let finalized = self.loss.on_absent(&mut self.channels);
        self.cursor.release();

        let candidates =
            finalized.map(|(_, event)| event.map(|event| GestureEvent::new(event, position)));
        let fallback = if self.loss.is_lost() {
            GestureEvent::new(GestureKind::HandLost, position)
        } else {
            GestureEvent::none(position)
        };
        let gesture = self.arbitrate(candidates, fallback);

        FrameOutput {
            cursor: position,
            gesture,
        }
    }

    /// Pick the single event for this frame.
    ///
    /// Candidates arrive in channel priority order and the first one wins.
    /// `Swiping` is informational and yields to queued events.  Losers are
    /// queued and delivered on the next frame that has nothing of its own.
    fn arbitrate(
        &mut self,
        candidates: [Option<GestureEvent>; 4],
        fallback: GestureEvent,
    ) -> GestureEvent {
        let mut fresh: VecDeque<GestureEvent> = candidates.into_iter().flatten().collect();
        let swiping = match fresh.front() {
            Some(event) if event.kind == GestureKind::Swiping => fresh.pop_front(),
            _ => None,
        };

        let emitted = fresh
            .pop_front()
            .or_else(|| self.deferred.pop_front())
            .or(swiping)
            .unwrap_or(fallback);

        for event in fresh {
            self.defer(event);
        }
        emitted
    }

    fn defer(&mut self, event: GestureEvent) {
        debug!(event = event.kind.as_str(), "gesture deferred to next free frame");
        self.deferred.push_back(event);
        if self.deferred.len() > MAX_DEFERRED_EVENTS {
            if let Some(dropped) = self.deferred.pop_front() {
                warn!(event = dropped.kind.as_str(), "deferred gesture queue full, dropping oldest");
            }
        }
    }

    /// Channel currently mid-gesture, if any.
    pub fn active_channel(&self) -> Option<PinchKind> {
        self.channels.active()
    }

    /// Whether the reported cursor is currently frozen.
    pub fn is_frozen(&self) -> bool {
        self.cursor.is_frozen()
    }

    /// Last reported cursor position.
    pub fn cursor(&self) -> CursorPoint {
        self.cursor.last()
    }

    pub fn frames_processed(&self) -> u64 {
        self.frames_processed
    }

    /// Reset all gesture and filter state.
    pub fn reset(&mut self) {
        self.smoother.reset();
        self.cursor = CursorState::new();
        self.channels = ChannelBank::new(&self.config.pinch);
        self.loss.reset();
        self.deferred.clear();
        self.last_gesture = GestureKind::None;
    }

    /// Generate s-expression for IPC status.
    pub fn status_sexp(&self) -> String {
        let cursor = self.cursor.last();
        format!(
            "(:frames {} :active {} :frozen {} :absent-frames {} :deferred {} :x {:.1} :y {:.1})",
            self.frames_processed,
            self.channels
                .active()
                .map(|k| format!(":{}", k.as_str()))
                .unwrap_or_else(|| "nil".to_string()),
            if self.cursor.is_frozen() { "t" } else { "nil" },
            self.loss.absent_frames(),
            self.deferred.len(),
            cursor.x,
            cursor.y,
        )
    }

    /// Generate s-expression for IPC config.
    pub fn config_sexp(&self) -> String {
        let c = &self.config;
        format!(
            "(:min-cutoff {:.3} :beta {:.4} :derivative-cutoff {:.3} :screen-width {:.0} :screen-height {:.0} :sensitivity-x {:.2} :sensitivity-y {:.2} :swipe-threshold {:.3} :click-threshold {:.3} :back-threshold {:.3} :pinky-threshold {:.3} :click-hold-ms {:.0} :pinky-hold-ms {:.0} :hand-loss-frames {} :swipe-amplification {:.2})",
            c.smoothing.min_cutoff,
            c.smoothing.beta,
            c.smoothing.derivative_cutoff,
            c.cursor.screen_width,
            c.cursor.screen_height,
            c.cursor.sensitivity_x,
            c.cursor.sensitivity_y,
            c.pinch.swipe_threshold,
            c.pinch.click_threshold,
            c.pinch.back_threshold,
            c.pinch.pinky_threshold,
            c.pinch.click_hold_ms,
            c.pinch.pinky_hold_ms,
            c.hand_loss.threshold_frames,
            c.actions.swipe_amplification,
        )
    }
}

// ── Tests ──────────────────────────────────────────────────
