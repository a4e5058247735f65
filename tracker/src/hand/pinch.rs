//! Pinch classification and timed pinch channels.
//!
//! Four thumb-to-fingertip distances are resolved into at most one active
//! pinch per frame using a fixed priority (swipe > click > back > pinky).
//! Each pinch drives a `PinchChannel`, one generic edge/hold state machine
//! parameterized by the events it emits.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::gesture::GestureKind;
use super::landmarks::{HandLandmark, Landmarks};

// ── Pinch kinds ────────────────────────────────────────────

/// The four pinch channels, highest priority first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PinchKind {
    /// Thumb + index: drag.
    Swipe,
    /// Thumb + middle: tap or long press.
    Click,
    /// Thumb + ring: back.
    Back,
    /// Thumb + pinky: home or recents.
    Pinky,
}

impl PinchKind {
    /// All channels in priority order.
    pub const PRIORITY: [PinchKind; 4] = [Self::Swipe, Self::Click, Self::Back, Self::Pinky];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Swipe => "swipe",
            Self::Click => "click",
            Self::Back => "back",
            Self::Pinky => "pinky",
        }
    }

    /// Fingertip that meets the thumb for this pinch.
    pub fn digit(&self) -> HandLandmark {
        match self {
            Self::Swipe => HandLandmark::IndexTip,
            Self::Click => HandLandmark::MiddleTip,
            Self::Back => HandLandmark::RingTip,
            Self::Pinky => HandLandmark::PinkyTip,
        }
    }

    /// Whether the reported cursor holds still while this pinch is active.
    pub fn freezes_cursor(&self) -> bool {
        matches!(self, Self::Click | Self::Pinky)
    }
}

// ── Config ─────────────────────────────────────────────────

/// Distance thresholds and hold durations for the pinch channels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PinchConfig {
    /// Maximum thumb-index distance (normalized) for a swipe pinch.
    pub swipe_threshold: f32,
    /// Maximum thumb-middle distance for a click pinch.
    pub click_threshold: f32,
    /// Maximum thumb-ring distance for a back pinch.
    pub back_threshold: f32,
    /// Maximum thumb-pinky distance for a pinky pinch.
    pub pinky_threshold: f32,
    /// Time (ms) a click pinch must be held to become a long press.
    pub click_hold_ms: f64,
    /// Time (ms) a pinky pinch must be held to open recents.
    pub pinky_hold_ms: f64,
}

impl Default for PinchConfig {
    fn default() -> Self {
        Self {
            swipe_threshold: 0.06,
            click_threshold: 0.06,
            back_threshold: 0.06,
            pinky_threshold: 0.06,
            click_hold_ms: 500.0,
            pinky_hold_ms: 500.0,
        }
    }
}

impl PinchConfig {
    pub fn threshold(&self, kind: PinchKind) -> f32 {
        match kind {
            PinchKind::Swipe => self.swipe_threshold,
            PinchKind::Click => self.click_threshold,
            PinchKind::Back => self.back_threshold,
            PinchKind::Pinky => self.pinky_threshold,
        }
    }
}

// ── Classifier ─────────────────────────────────────────────

/// Thumb-to-fingertip distances for one frame, in normalized units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PinchDistances {
    pub swipe: f32,
    pub click: f32,
    pub back: f32,
    pub pinky: f32,
}

impl PinchDistances {
    pub fn measure(landmarks: &Landmarks) -> Self {
        let d = |kind: PinchKind| landmarks.distance(HandLandmark::ThumbTip, kind.digit());
        Self {
            swipe: d(PinchKind::Swipe),
            click: d(PinchKind::Click),
            back: d(PinchKind::Back),
            pinky: d(PinchKind::Pinky),
        }
    }

    pub fn get(&self, kind: PinchKind) -> f32 {
        match kind {
            PinchKind::Swipe => self.swipe,
            PinchKind::Click => self.click,
            PinchKind::Back => self.back,
            PinchKind::Pinky => self.pinky,
        }
    }
}

/// Per-channel active flags after priority resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PinchClassification {
    pub swipe: bool,
    pub click: bool,
    pub back: bool,
    pub pinky: bool,
}

impl PinchClassification {
    /// Resolve distances into at most one active channel.
    ///
    /// A lower-priority channel is forced inactive whenever a higher one
    /// is below its threshold, whatever its own distance.
    pub fn classify(distances: &PinchDistances, config: &PinchConfig) -> Self {
        let within = |kind: PinchKind| distances.get(kind) < config.threshold(kind);
        let swipe = within(PinchKind::Swipe);
        let click = !swipe && within(PinchKind::Click);
        let back = !swipe && !click && within(PinchKind::Back);
        let pinky = !swipe && !click && !back && within(PinchKind::Pinky);
        Self {
            swipe,
            click,
            back,
            pinky,
        }
    }

    pub fn is_active(&self, kind: PinchKind) -> bool {
        match kind {
            PinchKind::Swipe => self.swipe,
            PinchKind::Click => self.click,
            PinchKind::Back => self.back,
            PinchKind::Pinky => self.pinky,
        }
    }

    /// The single active channel, if any.
    pub fn active(&self) -> Option<PinchKind> {
        PinchKind::PRIORITY
            .into_iter()
            .find(|kind| self.is_active(*kind))
    }

    /// The active channel if it freezes the cursor.
    pub fn freezing(&self) -> Option<PinchKind> {
        self.active().filter(|kind| kind.freezes_cursor())
    }
}

// ── Timed channel ──────────────────────────────────────────

/// Tap-versus-hold disambiguation for a channel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HoldPolicy {
    /// Active time (ms) after which the pinch counts as a hold.
    pub threshold_ms: f64,
    /// Emitted once when the hold threshold is crossed.
    pub started: GestureKind,
    /// Emitted on release after a hold, if the channel has one.
    pub ended: Option<GestureKind>,
}

/// Events a channel emits at each point of its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelEvents {
    /// On the inactive → active edge.
    pub press: Option<GestureKind>,
    /// Every later active frame (channels without a hold policy only).
    pub sustain: Option<GestureKind>,
    /// On the active → inactive edge; for hold channels, the tap outcome.
    pub release: Option<GestureKind>,
    pub hold: Option<HoldPolicy>,
}

/// One pinch detector with edge and hold tracking.
#[derive(Debug, Clone)]
pub struct PinchChannel {
    kind: PinchKind,
    events: ChannelEvents,
    was_active: bool,
    hold_start_s: f64,
    hold_triggered: bool,
}

impl PinchChannel {
    pub fn new(kind: PinchKind, events: ChannelEvents) -> Self {
        Self {
            kind,
            events,
            was_active: false,
            hold_start_s: 0.0,
            hold_triggered: false,
        }
    }

    /// Thumb-index drag: start, continuous updates, end.
    pub fn swipe() -> Self {
        Self::new(
            PinchKind::Swipe,
            ChannelEvents {
                press: Some(GestureKind::SwipeStart),
                sustain: Some(GestureKind::Swiping),
                release: Some(GestureKind::SwipeEnd),
                hold: None,
            },
        )
    }

    /// Thumb-middle: tap on quick release, long press when held.
    pub fn click(hold_ms: f64) -> Self {
        Self::new(
            PinchKind::Click,
            ChannelEvents {
                press: None,
                sustain: None,
                release: Some(GestureKind::Click),
                hold: Some(HoldPolicy {
                    threshold_ms: hold_ms,
                    started: GestureKind::LongPressStart,
                    ended: Some(GestureKind::LongPressEnd),
                }),
            },
        )
    }

    /// Thumb-ring: single shot on press.
    pub fn back() -> Self {
        Self::new(
            PinchKind::Back,
            ChannelEvents {
                press: Some(GestureKind::Back),
                sustain: None,
                release: None,
                hold: None,
            },
        )
    }

    /// Thumb-pinky: home on tap, recents once held.
    pub fn pinky(hold_ms: f64) -> Self {
        Self::new(
            PinchKind::Pinky,
            ChannelEvents {
                press: None,
                sustain: None,
                release: Some(GestureKind::Home),
                hold: Some(HoldPolicy {
                    threshold_ms: hold_ms,
                    started: GestureKind::RecentApps,
                    ended: None,
                }),
            },
        )
    }

    pub fn kind(&self) -> PinchKind {
        self.kind
    }

    pub fn is_active(&self) -> bool {
        self.was_active
    }

    pub fn is_hold_triggered(&self) -> bool {
        self.hold_triggered
    }

    /// Advance the channel by one frame.
    pub fn update(&mut self, active: bool, now_s: f64) -> Option<GestureKind> {
        match (self.was_active, active) {
            (false, true) => {
                self.was_active = true;
                self.hold_start_s = now_s;
                self.hold_triggered = false;
                debug!(channel = self.kind.as_str(), "pinch pressed");
                self.events.press
            }
            (true, true) => match self.events.hold {
                Some(hold) => {
                    if self.hold_triggered {
                        return None;
                    }
                    let elapsed_ms = ((now_s - self.hold_start_s) * 1000.0).max(0.0);
                    if elapsed_ms >= hold.threshold_ms {
                        self.hold_triggered = true;
                        debug!(channel = self.kind.as_str(), elapsed_ms, "pinch held");
                        Some(hold.started)
                    } else {
                        None
                    }
                }
                None => self.events.sustain,
            },
            (true, false) => self.release(),
            (false, false) => None,
        }
    }

    /// Force the channel inactive and return its terminal event.
    ///
    /// Used both for a normal release edge and when the hand disappears
    /// mid-gesture.  Returns `None` when the channel is already inactive
    /// or has no pending obligation.
    pub fn release(&mut self) -> Option<GestureKind> {
        if !self.was_active {
            self.hold_triggered = false;
            return None;
        }
        self.was_active = false;
        let triggered = std::mem::take(&mut self.hold_triggered);
        debug!(channel = self.kind.as_str(), triggered, "pinch released");
        match self.events.hold {
            Some(hold) if triggered => hold.ended,
            _ => self.events.release,
        }
    }
}

// ── Channel bank ───────────────────────────────────────────

/// The four channels, updated together every frame.
#[derive(Debug, Clone)]
pub struct ChannelBank {
    pub swipe: PinchChannel,
    pub click: PinchChannel,
    pub back: PinchChannel,
    pub pinky: PinchChannel,
}

impl ChannelBank {
    pub fn new(config: &PinchConfig) -> Self {
        Self {
            swipe: PinchChannel::swipe(),
            click: PinchChannel::click(config.click_hold_ms),
            back: PinchChannel::back(),
            pinky: PinchChannel::pinky(config.pinky_hold_ms),
        }
    }

    fn in_priority_order(&mut self) -> [&mut PinchChannel; 4] {
        [
            &mut self.swipe,
            &mut self.click,
            &mut self.back,
            &mut self.pinky,
        ]
    }

    /// Update every channel; results are in priority order.
    pub fn update(
        &mut self,
        classification: &PinchClassification,
        now_s: f64,
    ) -> [(PinchKind, Option<GestureKind>); 4] {
        self.in_priority_order().map(|channel| {
            let kind = channel.kind();
            (kind, channel.update(classification.is_active(kind), now_s))
        })
    }

    /// Release every channel; results are in priority order.
    pub fn release_all(&mut self) -> [(PinchKind, Option<GestureKind>); 4] {
        self.in_priority_order()
            .map(|channel| (channel.kind(), channel.release()))
    }

    /// The channel currently mid-gesture, if any.
    pub fn active(&self) -> Option<PinchKind> {
        [&self.swipe, &self.click, &self.back, &self.pinky]
            .into_iter()
            .find(|c| c.is_active())
            .map(|c| c.kind())
    }
}
