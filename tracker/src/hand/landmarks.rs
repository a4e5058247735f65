//! Hand landmark data structures.
//!
//! Models the 21 normalized 2D points per hand produced by camera-based
//! landmark detectors.  Coordinates are fractions of the frame width and
//! height.  Only the five fingertips are consumed by gesture recognition.

use thiserror::Error;

// ── Landmark definitions ───────────────────────────────────

/// The 21 hand landmarks, in detector order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandLandmark {
    Wrist,
    ThumbCmc,
    ThumbMcp,
    ThumbIp,
    ThumbTip,
    IndexMcp,
    IndexPip,
    IndexDip,
    IndexTip,
    MiddleMcp,
    MiddlePip,
    MiddleDip,
    MiddleTip,
    RingMcp,
    RingPip,
    RingDip,
    RingTip,
    PinkyMcp,
    PinkyPip,
    PinkyDip,
    PinkyTip,
}

/// Total number of landmarks per hand.
pub const LANDMARK_COUNT: usize = 21;

impl HandLandmark {
    /// Convert landmark enum to array index (0-20).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// String representation for logs and s-expressions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Wrist => "wrist",
            Self::ThumbCmc => "thumb-cmc",
            Self::ThumbMcp => "thumb-mcp",
            Self::ThumbIp => "thumb-ip",
            Self::ThumbTip => "thumb-tip",
            Self::IndexMcp => "index-mcp",
            Self::IndexPip => "index-pip",
            Self::IndexDip => "index-dip",
            Self::IndexTip => "index-tip",
            Self::MiddleMcp => "middle-mcp",
            Self::MiddlePip => "middle-pip",
            Self::MiddleDip => "middle-dip",
            Self::MiddleTip => "middle-tip",
            Self::RingMcp => "ring-mcp",
            Self::RingPip => "ring-pip",
            Self::RingDip => "ring-dip",
            Self::RingTip => "ring-tip",
            Self::PinkyMcp => "pinky-mcp",
            Self::PinkyPip => "pinky-pip",
            Self::PinkyDip => "pinky-dip",
            Self::PinkyTip => "pinky-tip",
        }
    }
}

// ── Points ─────────────────────────────────────────────────

/// A normalized 2D landmark position.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2 {
    pub x: f32,
    pub y: f32,
}

impl Point2 {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(&self, other: &Point2) -> f32 {
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Reasons a landmark set is rejected.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LandmarkError {
    #[error("expected {expected} landmarks, got {got}")]
    WrongCount { expected: usize, got: usize },
    #[error("landmark {index} has a non-finite coordinate")]
    NonFinite { index: usize },
}

// ── Landmark set ───────────────────────────────────────────

/// A complete, validated set of 21 landmarks for one hand.
#[derive(Debug, Clone, PartialEq)]
pub struct Landmarks {
    points: [Point2; LANDMARK_COUNT],
}

impl Landmarks {
    /// Build a landmark set, checking count and finiteness.
    pub fn new(points: Vec<Point2>) -> Result<Self, LandmarkError> {
        let got = points.len();
        let points: [Point2; LANDMARK_COUNT] =
            points.try_into().map_err(|_| LandmarkError::WrongCount {
                expected: LANDMARK_COUNT,
                got,
            })?;
        if let Some(index) = points
            .iter()
            .position(|p| !p.x.is_finite() || !p.y.is_finite())
        {
            return Err(LandmarkError::NonFinite { index });
        }
        Ok(Self { points })
    }

    /// Position of a single landmark.
    pub fn get(&self, landmark: HandLandmark) -> Point2 {
        self.points[landmark.index()]
    }

    /// Distance between two landmarks in normalized space.
    pub fn distance(&self, a: HandLandmark, b: HandLandmark) -> f32 {
        self.get(a).distance(&self.get(b))
    }

    /// All points in detector order.
    pub fn points(&self) -> &[Point2; LANDMARK_COUNT] {
        &self.points
    }
}

// ── Frames ─────────────────────────────────────────────────

/// What the landmark source saw in one frame.
#[derive(Debug, Clone, PartialEq)]
pub enum HandFrame {
    Absent,
    Present(Landmarks),
}

impl HandFrame {
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }
}

/// A hand frame stamped with its capture time.
#[derive(Debug, Clone, PartialEq)]
pub struct TimedFrame {
    /// Monotonic capture time in seconds.
    pub timestamp_s: f64,
    pub hand: HandFrame,
}

impl TimedFrame {
    pub fn absent(timestamp_s: f64) -> Self {
        Self {
            timestamp_s,
            hand: HandFrame::Absent,
        }
    }

    pub fn present(timestamp_s: f64, landmarks: Landmarks) -> Self {
        Self {
            timestamp_s,
            hand: HandFrame::Present(landmarks),
        }
    }
}

/// Build a relaxed open hand: every landmark at (0.5, 0.5) except the
/// fingertips, which are spread far from the thumb.  Tests adjust
/// individual tips from here.
#[cfg(test)]
pub(crate) fn open_hand() -> Vec<Point2> {
    let mut points = vec![Point2::new(0.5, 0.5); LANDMARK_COUNT];
    points[HandLandmark::ThumbTip.index()] = Point2::new(0.30, 0.60);
    points[HandLandmark::IndexTip.index()] = Point2::new(0.45, 0.20);
    points[HandLandmark::MiddleTip.index()] = Point2::new(0.55, 0.18);
    points[HandLandmark::RingTip.index()] = Point2::new(0.65, 0.22);
    points[HandLandmark::PinkyTip.index()] = Point2::new(0.75, 0.30);
    points
}

// ── Tests ──────────────────────────────────────────────────
