//! Property tests for the gesture tracker over arbitrary frame streams.

use proptest::prelude::*;

use pinchpoint::hand::{
    HandLandmark, Landmarks, OneEuroFilter, PinchClassification, PinchConfig, PinchDistances,
    PinchKind, Point2, SmootherConfig,
};
use pinchpoint::{GestureKind, GestureTracker, TimedFrame, TrackerConfig};

const THUMB: Point2 = Point2::new(0.30, 0.60);

/// A hand whose fingertips sit the given distances from the thumb tip, each
/// in its own direction.
fn hand(distances: [f32; 4]) -> Landmarks {
    let mut points = vec![Point2::new(0.5, 0.5); 21];
    points[HandLandmark::ThumbTip.index()] = THUMB;
    for (i, kind) in PinchKind::PRIORITY.into_iter().enumerate() {
        let angle = -1.2 + 0.6 * i as f32;
        points[kind.digit().index()] = Point2::new(
            THUMB.x + distances[i] * angle.cos(),
            THUMB.y + distances[i] * angle.sin(),
        );
    }
    Landmarks::new(points).unwrap()
}

#[derive(Debug, Clone)]
enum Step {
    Absent(f64),
    Present(f64, [f32; 4]),
}

fn step() -> impl Strategy<Value = Step> {
    // Time deltas include repeats and small regressions.
    let dt = prop_oneof![Just(0.0), -0.02f64..0.0, 0.01f64..0.3];
    prop_oneof![
        1 => dt.clone().prop_map(Step::Absent),
        5 => (dt, prop::array::uniform4(0.0f32..0.12)).prop_map(|(dt, d)| Step::Present(dt, d)),
    ]
}

fn frames(steps: &[Step]) -> Vec<TimedFrame> {
    let mut t = 0.0;
    steps
        .iter()
        .map(|s| match s {
            Step::Absent(dt) => {
                t += dt;
                TimedFrame::absent(t)
            }
            Step::Present(dt, d) => {
                t += dt;
                TimedFrame::present(t, hand(*d))
            }
        })
        .collect()
}

fn count(kinds: &[GestureKind], kind: GestureKind) -> usize {
    kinds.iter().filter(|k| **k == kind).count()
}

proptest! {
    #[test]
    fn test_at_most_one_pinch_active(d in prop::array::uniform4(0.0f32..0.12)) {
        let distances = PinchDistances { swipe: d[0], click: d[1], back: d[2], pinky: d[3] };
        let config = PinchConfig::default();
        let c = PinchClassification::classify(&distances, &config);
        let active = PinchKind::PRIORITY.into_iter().filter(|k| c.is_active(*k)).count();
        prop_assert!(active <= 1);

        // The winner is the first channel below its threshold.
        let expected = PinchKind::PRIORITY
            .into_iter()
            .find(|k| distances.get(*k) < config.threshold(*k));
        prop_assert_eq!(c.active(), expected);
    }

    #[test]
    fn test_one_output_per_frame(steps in prop::collection::vec(step(), 0..60)) {
        let mut tracker = GestureTracker::new(TrackerConfig::default());
        let frames = frames(&steps);
        let outputs: Vec<_> = frames.iter().map(|f| tracker.process(f)).collect();
        prop_assert_eq!(outputs.len(), frames.len());
        prop_assert_eq!(tracker.frames_processed(), frames.len() as u64);
    }

    #[test]
    fn test_cursor_stays_on_screen(steps in prop::collection::vec(step(), 1..60)) {
        let config = TrackerConfig::default();
        let (w, h) = (config.cursor.screen_width, config.cursor.screen_height);
        let mut tracker = GestureTracker::new(config);
        for frame in frames(&steps) {
            let out = tracker.process(&frame);
            prop_assert!(out.cursor.x >= 0.0 && out.cursor.x <= w, "x = {}", out.cursor.x);
            prop_assert!(out.cursor.y >= 0.0 && out.cursor.y <= h, "y = {}", out.cursor.y);
        }
    }

    #[test]
    fn test_absent_frame_clears_every_channel(steps in prop::collection::vec(step(), 0..60)) {
        let mut tracker = GestureTracker::new(TrackerConfig::default());
        let frames = frames(&steps);
        for frame in &frames {
            tracker.process(frame);
        }
        let t = frames.last().map(|f| f.timestamp_s).unwrap_or(0.0) + 0.033;
        tracker.process(&TimedFrame::absent(t));
        prop_assert_eq!(tracker.active_channel(), None);
        prop_assert!(!tracker.is_frozen());
    }

    #[test]
    fn test_started_gestures_are_closed(steps in prop::collection::vec(step(), 0..40)) {
        let mut tracker = GestureTracker::new(TrackerConfig::default());
        let mut frames = frames(&steps);
        let t = frames.last().map(|f| f.timestamp_s).unwrap_or(0.0);
        // Enough absent frames to finalize every channel and drain deferrals.
        frames.extend((1..=12).map(|i| TimedFrame::absent(t + 0.033 * i as f64)));

        let mut presses = [0usize; 4];
        let mut kinds = Vec::with_capacity(frames.len());
        for frame in &frames {
            let before = tracker.active_channel();
            kinds.push(tracker.process(frame).gesture.kind);
            let after = tracker.active_channel();
            if let Some(kind) = after.filter(|_| after != before) {
                presses[kind as usize] += 1;
            }
        }
        prop_assert_eq!(tracker.active_channel(), None);

        let [swipes, clicks, backs, pinkies] = presses;
        prop_assert_eq!(count(&kinds, GestureKind::SwipeStart), swipes);
        prop_assert_eq!(count(&kinds, GestureKind::SwipeEnd), swipes);
        prop_assert_eq!(
            count(&kinds, GestureKind::Click) + count(&kinds, GestureKind::LongPressEnd),
            clicks
        );
        prop_assert_eq!(
            count(&kinds, GestureKind::LongPressStart),
            count(&kinds, GestureKind::LongPressEnd)
        );
        prop_assert_eq!(count(&kinds, GestureKind::Back), backs);
        prop_assert_eq!(
            count(&kinds, GestureKind::Home) + count(&kinds, GestureKind::RecentApps),
            pinkies
        );
        prop_assert_eq!(count(&kinds, GestureKind::Notifications), 0);
    }

    #[test]
    fn test_repeated_timestamp_is_idempotent(
        xs in prop::collection::vec(-1000.0f32..1000.0, 1..20),
        repeat in -1000.0f32..1000.0,
    ) {
        let mut filter = OneEuroFilter::new(&SmootherConfig::default());
        let mut t = 0.0;
        let mut last = 0.0;
        for x in &xs {
            last = filter.filter(*x, t);
            t += 1.0 / 30.0;
        }
        let t_last = t - 1.0 / 30.0;
        prop_assert_eq!(filter.filter(repeat, t_last), last);
    }
}
