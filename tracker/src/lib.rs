//! pinchpoint - pinch gestures and a steady cursor from hand landmarks.
//!
//! A camera-side landmark detector feeds 21-point hand frames in; the
//! tracker emits one smoothed cursor position and at most one gesture per
//! frame.  `action` turns those gestures into device actions, `ipc` speaks
//! the line protocol and `pipeline` decouples a fast producer from the
//! tracker.

pub mod action;
pub mod config;
pub mod hand;
pub mod ipc;
pub mod pipeline;

pub use action::{Action, ActionConfig, ActionPlanner, GlobalAction};
pub use config::{ConfigError, TrackerConfig};
pub use hand::{FrameOutput, GestureEvent, GestureKind, GestureTracker, TimedFrame};
