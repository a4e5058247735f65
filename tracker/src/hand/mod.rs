//! Hand tracking: landmarks in, cursor and gestures out.
//!
//! Provides:
//! - `landmarks`: the 21-point hand model and per-frame input
//! - `one_euro`: adaptive pointer smoothing
//! - `cursor`: fingertip-to-screen mapping and the freeze policy
//! - `pinch`: priority pinch classification and timed channels
//! - `loss`: hand-loss counting and gesture finalization
//! - `gesture`: the per-frame orchestrator (`GestureTracker`)

pub mod cursor;
pub mod gesture;
pub mod landmarks;
pub mod loss;
pub mod one_euro;
pub mod pinch;

pub use cursor::{CursorConfig, CursorMapper, CursorPoint, CursorState};
pub use gesture::{FrameOutput, GestureEvent, GestureKind, GestureTracker};
pub use landmarks::{HandFrame, HandLandmark, LandmarkError, Landmarks, Point2, TimedFrame};
pub use loss::{HandLossConfig, HandLossHandler};
pub use one_euro::{OneEuroFilter, OneEuroFilter2D, SmootherConfig};
pub use pinch::{
    ChannelBank, PinchChannel, PinchClassification, PinchConfig, PinchDistances, PinchKind,
};
