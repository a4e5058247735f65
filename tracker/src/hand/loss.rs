//! Hand-loss handling.
//!
//! Counts consecutive frames without a hand and finalizes any pinch left
//! mid-gesture, so a tracking dropout never strands a started gesture.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::gesture::GestureKind;
use super::pinch::{ChannelBank, PinchKind};

/// Configuration for hand-loss reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HandLossConfig {
    /// Consecutive absent frames tolerated before `HandLost` is reported.
    pub threshold_frames: u32,
}

impl Default for HandLossConfig {
    fn default() -> Self {
        Self {
            threshold_frames: 5,
        }
    }
}

/// Consecutive-absence counter plus channel finalization.
#[derive(Debug, Clone)]
pub struct HandLossHandler {
    threshold_frames: u32,
    absent_frames: u32,
}

impl HandLossHandler {
    pub fn new(config: &HandLossConfig) -> Self {
        Self {
            threshold_frames: config.threshold_frames,
            absent_frames: 0,
        }
    }

    /// A frame with a hand arrived.
    pub fn on_present(&mut self) {
        if self.absent_frames > 0 {
            debug!(absent_frames = self.absent_frames, "hand reacquired");
        }
        self.absent_frames = 0;
    }

    /// A frame without a hand arrived.
    ///
    /// Every channel is released in priority order: an active swipe ends,
    /// a click resolves to a tap or closes its long press, a pinky tap
    /// resolves to home.  Back and a held pinky have nothing pending and are
    /// cleared silently.
    pub fn on_absent(&mut self, channels: &mut ChannelBank) -> [(PinchKind, Option<GestureKind>); 4] {
        self.absent_frames = self.absent_frames.saturating_add(1);
        if self.absent_frames == self.threshold_frames.saturating_add(1) {
            info!(absent_frames = self.absent_frames, "hand lost");
        }
        let finalized = channels.release_all();
        for (kind, event) in &finalized {
            if let Some(event) = event {
                debug!(
                    channel = kind.as_str(),
                    event = event.as_str(),
                    "gesture finalized on hand loss"
                );
            }
        }
        finalized
    }

    /// Whether the absence has lasted past the threshold.
    pub fn is_lost(&self) -> bool {
        self.absent_frames > self.threshold_frames
    }

    pub fn absent_frames(&self) -> u32 {
        self.absent_frames
    }

    pub fn reset(&mut self) {
        self.absent_frames = 0;
    }
}
