//! Line-oriented s-expression interface.
//!
//! Frames come in and events go out as one keyword plist per line.

pub mod dispatch;

pub use dispatch::{decode_frame, format_action, format_event, format_output, FrameError};
