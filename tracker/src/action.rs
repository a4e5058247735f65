//! Consumer actions planned from the gesture stream.
//!
//! Gestures say what the hand did; actions say what the device should do.
//! The planner keeps the little state that needs: where the current swipe
//! started and whether hand loss has already been announced.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::hand::{CursorConfig, CursorPoint, FrameOutput, GestureKind};

/// Tuning for action planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionConfig {
    /// Drag vectors are scaled by this factor around their midpoint.
    pub swipe_amplification: f32,
}

impl Default for ActionConfig {
    fn default() -> Self {
        Self {
            swipe_amplification: 1.5,
        }
    }
}

/// System-level navigation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalAction {
    Back,
    Home,
    RecentApps,
    Notifications,
}

impl GlobalAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Back => "back",
            Self::Home => "home",
            Self::RecentApps => "recent-apps",
            Self::Notifications => "notifications",
        }
    }
}

/// An instruction for the input-injection layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    Tap(CursorPoint),
    LongPressStart(CursorPoint),
    LongPressEnd(CursorPoint),
    Drag { from: CursorPoint, to: CursorPoint },
    Global(GlobalAction),
    /// Tracking dropped; show degraded feedback.
    HandLost,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tap(_) => "tap",
            Self::LongPressStart(_) => "long-press-start",
            Self::LongPressEnd(_) => "long-press-end",
            Self::Drag { .. } => "drag",
            Self::Global(_) => "global",
            Self::HandLost => "hand-lost",
        }
    }
}

/// Turns `FrameOutput`s into at most one `Action` each.
#[derive(Debug, Clone)]
pub struct ActionPlanner {
    amplification: f32,
    screen_width: f32,
    screen_height: f32,
    swipe_origin: Option<CursorPoint>,
    lost_announced: bool,
}

impl ActionPlanner {
    pub fn new(actions: &ActionConfig, cursor: &CursorConfig) -> Self {
        Self {
            amplification: actions.swipe_amplification,
            screen_width: cursor.screen_width,
            screen_height: cursor.screen_height,
            swipe_origin: None,
            lost_announced: false,
        }
    }

    pub fn plan(&mut self, output: &FrameOutput) -> Option<Action> {
        let event = output.gesture;
        if event.kind != GestureKind::HandLost {
            self.lost_announced = false;
        }
        match event.kind {
            GestureKind::None | GestureKind::Swiping => None,
            GestureKind::Click => Some(Action::Tap(event.position)),
            GestureKind::LongPressStart => Some(Action::LongPressStart(event.position)),
            GestureKind::LongPressEnd => Some(Action::LongPressEnd(event.position)),
            GestureKind::Back => Some(Action::Global(GlobalAction::Back)),
            GestureKind::Home => Some(Action::Global(GlobalAction::Home)),
            GestureKind::RecentApps => Some(Action::Global(GlobalAction::RecentApps)),
            GestureKind::Notifications => Some(Action::Global(GlobalAction::Notifications)),
            GestureKind::SwipeStart => {
                if self.swipe_origin.is_some() {
                    warn!("swipe started twice, restarting from new origin");
                }
                self.swipe_origin = Some(event.position);
                None
            }
            GestureKind::SwipeEnd => match self.swipe_origin.take() {
                Some(origin) => {
                    let (from, to) = self.amplify(origin, event.position);
                    debug!(
                        from_x = from.x,
                        from_y = from.y,
                        to_x = to.x,
                        to_y = to.y,
                        "drag planned"
                    );
                    Some(Action::Drag { from, to })
                }
                None => {
                    warn!("swipe ended without a recorded origin, dropping");
                    None
                }
            },
            GestureKind::HandLost => {
                if self.lost_announced {
                    None
                } else {
                    self.lost_announced = true;
                    Some(Action::HandLost)
                }
            }
        }
    }

    /// Scale the drag about its midpoint and keep both ends on screen.
    fn amplify(&self, from: CursorPoint, to: CursorPoint) -> (CursorPoint, CursorPoint) {
        let mid_x = (from.x + to.x) / 2.0;
        let mid_y = (from.y + to.y) / 2.0;
        let k = self.amplification;
        let scale = |p: CursorPoint| {
            CursorPoint::new(
                (mid_x + (p.x - mid_x) * k).clamp(0.0, self.screen_width),
                (mid_y + (p.y - mid_y) * k).clamp(0.0, self.screen_height),
            )
        };
        (scale(from), scale(to))
    }

    /// Forget any swipe in progress.
    pub fn reset(&mut self) {
        self.swipe_origin = None;
        self.lost_announced = false;
    }
}
