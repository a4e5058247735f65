//! Frame decoding and event encoding.
//!
//! Input:
//! ```text
//! (:t 0.033 :landmarks ((0.41 0.52) (0.40 0.47) ...))
//! (:t 0.066 :landmarks nil)
//! ```
//! Output:
//! ```text
//! (:type :event :event :click :x 540.0 :y 1200.0)
//! (:type :action :action :tap :x 540.0 :y 1200.0)
//! ```

use lexpr::Value;
use thiserror::Error;
use tracing::warn;

use crate::action::Action;
use crate::hand::{
    FrameOutput, GestureEvent, HandFrame, LandmarkError, Landmarks, Point2, TimedFrame,
};

/// Reasons an input line cannot be turned into a frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FrameError {
    #[error("malformed s-expression: {0}")]
    Malformed(String),
    #[error("missing :t timestamp")]
    MissingTimestamp,
    #[error("non-finite timestamp {0}")]
    BadTimestamp(f64),
    #[error("landmark {index} is not a number")]
    NonNumeric { index: usize },
    #[error("odd number of landmark coordinates ({0})")]
    OddCoordinates(usize),
    #[error(transparent)]
    Landmarks(#[from] LandmarkError),
}

// ── Decoding ───────────────────────────────────────────────

/// Decode one input line.
///
/// A line without a usable timestamp is an error.  A line whose landmarks
/// are unusable still yields a frame, marked `Absent`, so the tracker keeps
/// counting time.
pub fn decode_frame(raw: &str) -> Result<TimedFrame, FrameError> {
    let value = lexpr::from_str(raw).map_err(|e| FrameError::Malformed(e.to_string()))?;

    let timestamp_s = get_float(&value, "t").ok_or(FrameError::MissingTimestamp)?;
    if !timestamp_s.is_finite() {
        return Err(FrameError::BadTimestamp(timestamp_s));
    }

    let hand = match get_value(&value, "landmarks") {
        Some(v) if !is_nil(v) => match decode_landmarks(v) {
            Ok(landmarks) => HandFrame::Present(landmarks),
            Err(e) => {
                warn!(t = timestamp_s, "treating frame as absent: {}", e);
                HandFrame::Absent
            }
        },
        _ => HandFrame::Absent,
    };

    Ok(TimedFrame { timestamp_s, hand })
}

/// Accepts `((x y) ...)` pairs or a flat `(x0 y0 x1 y1 ...)` list.
fn decode_landmarks(value: &Value) -> Result<Landmarks, FrameError> {
    let leaves = flatten_list(value);
    let coords = leaves
        .iter()
        .enumerate()
        .map(|(i, v)| v.as_f64().ok_or(FrameError::NonNumeric { index: i / 2 }))
        .collect::<Result<Vec<f64>, _>>()?;
    if coords.len() % 2 != 0 {
        return Err(FrameError::OddCoordinates(coords.len()));
    }
    let points = coords
        .chunks_exact(2)
        .map(|xy| Point2::new(xy[0] as f32, xy[1] as f32))
        .collect();
    Ok(Landmarks::new(points)?)
}

fn is_nil(value: &Value) -> bool {
    match value {
        Value::Nil | Value::Null => true,
        Value::Symbol(s) => s.as_ref() == "nil",
        _ => false,
    }
}

/// Find the value following `:key` in a plist.
///
/// The default lexpr parser reads `:key` as a symbol; keyword-enabled
/// parsers produce `Value::Keyword`.  Both are accepted.  Only key
/// positions are compared, so a value spelled like a key never matches.
fn get_value<'a>(value: &'a Value, key: &str) -> Option<&'a Value> {
    let prefixed = format!(":{}", key);
    let mut current = value;
    while let Value::Cons(pair) = current {
        let is_key = match pair.car() {
            Value::Keyword(k) => k.as_ref() == key,
            Value::Symbol(s) => s.as_ref() == prefixed,
            _ => false,
        };
        let Value::Cons(next) = pair.cdr() else {
            return None;
        };
        if is_key {
            return Some(next.car());
        }
        current = next.cdr();
    }
    None
}

/// Extract a keyword value as a string.
fn get_keyword(value: &Value, key: &str) -> Option<String> {
    get_value(value, key).map(|val| match val {
        Value::Keyword(v) => v.to_string(),
        Value::Symbol(v) => {
            let s: &str = v;
            s.strip_prefix(':').unwrap_or(s).to_string()
        }
        Value::String(v) => v.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(true) => "t".to_string(),
        Value::Bool(false) | Value::Null | Value::Nil => "nil".to_string(),
        other => other.to_string(),
    })
}

/// Extract a floating-point value from an s-expression plist.
fn get_float(value: &Value, key: &str) -> Option<f64> {
    get_keyword(value, key).and_then(|s| s.parse().ok())
}

/// Leaf values of a nested list, depth first.
fn flatten_list(value: &Value) -> Vec<&Value> {
    let mut result = Vec::new();
    fn walk<'a>(v: &'a Value, out: &mut Vec<&'a Value>) {
        match v {
            Value::Cons(pair) => {
                walk(pair.car(), out);
                walk(pair.cdr(), out);
            }
            Value::Vector(items) => {
                for item in items.iter() {
                    walk(item, out);
                }
            }
            Value::Null => {} // end of list
            other => out.push(other),
        }
    }
    walk(value, &mut result);
    result
}

// ── Encoding ───────────────────────────────────────────────

fn format_message(msg_type: &str, name: &str, fields: &[(&str, String)]) -> String {
    let mut s = format!("(:type :{} :{} :{}", msg_type, msg_type, name);
    for (key, val) in fields {
        s.push_str(&format!(" :{} {}", key, val));
    }
    s.push(')');
    s
}

fn coord(v: f32) -> String {
    format!("{:.1}", v)
}

/// Format a gesture event s-expression.
pub fn format_event(event: &GestureEvent) -> String {
    format_message(
        "event",
        event.kind.as_str(),
        &[("x", coord(event.position.x)), ("y", coord(event.position.y))],
    )
}

/// Format the per-frame output line.
pub fn format_output(output: &FrameOutput) -> String {
    format_event(&output.gesture)
}

/// Format a planned action s-expression.
pub fn format_action(action: &Action) -> String {
    let fields = match action {
        Action::Tap(p) | Action::LongPressStart(p) | Action::LongPressEnd(p) => {
            vec![("x", coord(p.x)), ("y", coord(p.y))]
        }
        Action::Drag { from, to } => vec![
            ("from-x", coord(from.x)),
            ("from-y", coord(from.y)),
            ("to-x", coord(to.x)),
            ("to-y", coord(to.y)),
        ],
        Action::Global(target) => vec![("target", format!(":{}", target.as_str()))],
        Action::HandLost => Vec::new(),
    };
    format_message("action", action.as_str(), &fields)
}
