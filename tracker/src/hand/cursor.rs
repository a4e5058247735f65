//! Cursor mapping and freeze stabilization.
//!
//! `CursorMapper` turns the index fingertip into a mirrored,
//! sensitivity-scaled screen target.  `CursorState` decides what the
//! consumer sees: the live smoothed position, or a snapshot held while a
//! precision pinch is in progress.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::landmarks::Point2;
use super::pinch::PinchKind;

/// A position in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CursorPoint {
    pub x: f32,
    pub y: f32,
}

impl CursorPoint {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

// ── Mapper ─────────────────────────────────────────────────

/// Screen geometry and pointer gain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CursorConfig {
    /// Screen width in pixels.
    pub screen_width: f32,
    /// Screen height in pixels.
    pub screen_height: f32,
    /// Horizontal gain around the frame center (>1 amplifies movement).
    pub sensitivity_x: f32,
    /// Vertical gain around the frame center.
    pub sensitivity_y: f32,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            screen_width: 1080.0,
            screen_height: 2400.0,
            sensitivity_x: 1.5,
            sensitivity_y: 1.5,
        }
    }
}

/// Maps normalized fingertip positions to screen pixels.
#[derive(Debug, Clone)]
pub struct CursorMapper {
    config: CursorConfig,
}

impl CursorMapper {
    pub fn new(config: CursorConfig) -> Self {
        Self { config }
    }

    /// Map a normalized fingertip to a screen target.
    ///
    /// The front camera sees a mirror image, so x is flipped before the
    /// sensitivity gain is applied around the frame center.
    pub fn map(&self, tip: Point2) -> CursorPoint {
        let mx = 1.0 - tip.x;
        let sx = scale_about_center(mx, self.config.sensitivity_x);
        let sy = scale_about_center(tip.y, self.config.sensitivity_y);
        CursorPoint::new(
            sx * self.config.screen_width,
            sy * self.config.screen_height,
        )
    }

    pub fn config(&self) -> &CursorConfig {
        &self.config
    }
}

fn scale_about_center(v: f32, gain: f32) -> f32 {
    ((v - 0.5) * gain + 0.5).clamp(0.0, 1.0)
}

// ── Freeze policy ──────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Freeze {
    owner: PinchKind,
    anchor: CursorPoint,
}

/// Reported cursor position plus the active freeze, if any.
#[derive(Debug, Clone, Default)]
pub struct CursorState {
    last: CursorPoint,
    frozen: Option<Freeze>,
}

impl CursorState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decide the reported position for this frame.
    ///
    /// `freezing` is the active channel if it is one that freezes the
    /// cursor.  The snapshot is taken on the frame that channel becomes
    /// active and held until it releases.
    pub fn stabilize(&mut self, live: CursorPoint, freezing: Option<PinchKind>) -> CursorPoint {
        let reported = match (self.frozen, freezing) {
            (Some(freeze), Some(owner)) if freeze.owner == owner => freeze.anchor,
            (_, Some(owner)) => {
                debug!(channel = owner.as_str(), x = live.x, y = live.y, "cursor frozen");
                self.frozen = Some(Freeze {
                    owner,
                    anchor: live,
                });
                live
            }
            (Some(_), None) => {
                debug!("cursor released");
                self.frozen = None;
                live
            }
            (None, None) => live,
        };
        self.last = reported;
        reported
    }

    /// Snapshot held by the current freeze.
    pub fn anchor(&self) -> Option<CursorPoint> {
        self.frozen.map(|f| f.anchor)
    }

    /// Last position handed to the consumer.
    pub fn last(&self) -> CursorPoint {
        self.last
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen.is_some()
    }

    /// Drop the freeze without touching the last reported position.
    pub fn release(&mut self) {
        self.frozen = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper(sensitivity: f32) -> CursorMapper {
        CursorMapper::new(CursorConfig {
            screen_width: 1000.0,
            screen_height: 2000.0,
            sensitivity_x: sensitivity,
            sensitivity_y: sensitivity,
        })
    }

    #[test]
    fn test_center_maps_to_center() {
        let p = mapper(1.5).map(Point2::new(0.5, 0.5));
        assert_eq!(p, CursorPoint::new(500.0, 1000.0));
    }

    #[test]
    fn test_horizontal_mirror() {
        let p = mapper(1.0).map(Point2::new(0.2, 0.5));
        assert!((p.x - 800.0).abs() < 1e-3, "got {:?}", p);
    }

    #[test]
    fn test_sensitivity_amplifies_offset() {
        // 0.1 right of center in camera space -> 0.15 left on screen at 1.5x
        let p = mapper(1.5).map(Point2::new(0.6, 0.6));
        assert!((p.x - 350.0).abs() < 1e-3, "got {:?}", p);
        assert!((p.y - 1300.0).abs() < 1e-3, "got {:?}", p);
    }

    #[test]
    fn test_clamped_to_screen() {
        let p = mapper(3.0).map(Point2::new(0.95, 0.02));
        assert_eq!(p, CursorPoint::new(0.0, 0.0));
        let p = mapper(3.0).map(Point2::new(0.0, 1.0));
        assert_eq!(p, CursorPoint::new(1000.0, 2000.0));
    }

    #[test]
    fn test_live_tracking_without_freeze() {
        let mut state = CursorState::new();
        let a = state.stabilize(CursorPoint::new(1.0, 2.0), None);
        let b = state.stabilize(CursorPoint::new(3.0, 4.0), None);
        assert_eq!(a, CursorPoint::new(1.0, 2.0));
        assert_eq!(b, CursorPoint::new(3.0, 4.0));
        assert_eq!(state.last(), b);
        assert!(!state.is_frozen());
    }

    #[test]
    fn test_freeze_holds_onset_position() {
        let mut state = CursorState::new();
        state.stabilize(CursorPoint::new(10.0, 10.0), None);
        let onset = state.stabilize(CursorPoint::new(20.0, 20.0), Some(PinchKind::Click));
        let held = state.stabilize(CursorPoint::new(25.0, 31.0), Some(PinchKind::Click));
        assert_eq!(onset, CursorPoint::new(20.0, 20.0));
        assert_eq!(held, onset);
        assert_eq!(state.anchor(), Some(onset));

        let released = state.stabilize(CursorPoint::new(40.0, 40.0), None);
        assert_eq!(released, CursorPoint::new(40.0, 40.0));
        assert!(state.anchor().is_none());
    }

    #[test]
    fn test_new_owner_recaptures() {
        let mut state = CursorState::new();
        state.stabilize(CursorPoint::new(1.0, 1.0), Some(PinchKind::Click));
        let p = state.stabilize(CursorPoint::new(5.0, 5.0), Some(PinchKind::Pinky));
        assert_eq!(p, CursorPoint::new(5.0, 5.0));
        assert_eq!(state.anchor(), Some(p));
    }

    #[test]
    fn test_release_keeps_last() {
        let mut state = CursorState::new();
        state.stabilize(CursorPoint::new(7.0, 8.0), Some(PinchKind::Pinky));
        state.release();
        assert!(!state.is_frozen());
        assert_eq!(state.last(), CursorPoint::new(7.0, 8.0));
    }
}
