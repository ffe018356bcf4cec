//! Repetition counting
//!
//! Each tracked exercise owns an independent two-state (up/down) machine; a
//! repetition is one complete down-to-up cycle. All registered exercises are
//! evaluated on every qualifying frame, so a pose that momentarily satisfies
//! one exercise's threshold cannot corrupt another exercise's state.

use crate::filter::{FilteredFrame, REP_COUNTING_LANDMARKS};
use crate::types::{Exercise, Landmark};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Average shoulder height (pixels) beyond which a push-up reads as down
pub const PUSHUP_DOWN_Y: f64 = 400.0;
/// Average shoulder height (pixels) below which a down push-up completes
pub const PUSHUP_UP_Y: f64 = 300.0;
/// Hip-below-knee margin (pixels) beyond which a squat reads as down
pub const SQUAT_DOWN_MARGIN: f64 = 60.0;
/// Hip-above-knee margin (pixels) beyond which a down squat completes
pub const SQUAT_UP_MARGIN: f64 = 50.0;

/// Two-state machine for one exercise
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepCounter {
    /// Completed repetitions
    pub count: u32,
    /// True while the tracked body segment is in the down position
    pub down: bool,
}

impl RepCounter {
    /// Zero the count and force the state to up, irrespective of prior state
    pub fn reset(&mut self) {
        self.count = 0;
        self.down = false;
    }

    /// Advance the machine given whether the frame reads as down or as up.
    /// Returns true when a repetition completed on this frame.
    fn advance(&mut self, reads_down: bool, reads_up: bool) -> bool {
        if !self.down && reads_down {
            self.down = true;
        } else if self.down && reads_up {
            self.down = false;
            self.count += 1;
            return true;
        }
        false
    }
}

/// Per-frame counting outcome for one exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepEvent {
    pub exercise: Exercise,
    pub count: u32,
}

/// Tracks registered exercises, each with its own state machine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepTracker {
    counters: BTreeMap<Exercise, RepCounter>,
}

impl RepTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an exercise for tracking. Idempotent; an already-registered
    /// exercise keeps its state.
    pub fn register(&mut self, exercise: Exercise) {
        self.counters.entry(exercise).or_default();
    }

    /// True if the exercise is registered
    pub fn is_registered(&self, exercise: Exercise) -> bool {
        self.counters.contains_key(&exercise)
    }

    /// Current count for an exercise (0 if unregistered)
    pub fn count(&self, exercise: Exercise) -> u32 {
        self.counters.get(&exercise).map_or(0, |c| c.count)
    }

    /// True while an exercise's machine is in the down state
    pub fn is_down(&self, exercise: Exercise) -> bool {
        self.counters.get(&exercise).is_some_and(|c| c.down)
    }

    /// Counts for all registered exercises
    pub fn counts(&self) -> BTreeMap<Exercise, u32> {
        self.counters
            .iter()
            .map(|(ex, c)| (*ex, c.count))
            .collect()
    }

    /// Reset one exercise's counter
    pub fn reset(&mut self, exercise: Exercise) {
        if let Some(counter) = self.counters.get_mut(&exercise) {
            counter.reset();
        }
    }

    /// Reset every registered counter
    pub fn reset_all(&mut self) {
        for counter in self.counters.values_mut() {
            counter.reset();
        }
    }

    /// Evaluate all registered exercises against one filtered frame.
    ///
    /// Counting only proceeds when all six required landmarks pass the
    /// confidence filter; otherwise the frame is a no-op and no machine
    /// changes state. Returns the repetitions completed on this frame.
    pub fn process_frame(&mut self, frame: &FilteredFrame) -> Vec<RepEvent> {
        if !frame.has_all(&REP_COUNTING_LANDMARKS) {
            return Vec::new();
        }

        let avg_shoulder_y = Self::pair_avg_y(frame, Landmark::LeftShoulder, Landmark::RightShoulder);
        let avg_hip_y = Self::pair_avg_y(frame, Landmark::LeftHip, Landmark::RightHip);
        let avg_knee_y = Self::pair_avg_y(frame, Landmark::LeftKnee, Landmark::RightKnee);

        let mut events = Vec::new();
        for (exercise, counter) in self.counters.iter_mut() {
            let completed = match exercise {
                Exercise::PushUp => counter.advance(
                    avg_shoulder_y > PUSHUP_DOWN_Y,
                    avg_shoulder_y < PUSHUP_UP_Y,
                ),
                Exercise::Squat => counter.advance(
                    avg_hip_y > avg_knee_y + SQUAT_DOWN_MARGIN,
                    avg_hip_y < avg_knee_y - SQUAT_UP_MARGIN,
                ),
            };
            if completed {
                events.push(RepEvent {
                    exercise: *exercise,
                    count: counter.count,
                });
            }
        }
        events
    }

    fn pair_avg_y(frame: &FilteredFrame, left: Landmark, right: Landmark) -> f64 {
        // has_all was checked by the caller; absent landmarks cannot occur here
        let l = frame.get(left).map_or(0.0, |kp| kp.y);
        let r = frame.get(right).map_or(0.0, |kp| kp.y);
        (l + r) / 2.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Keypoint, PoseFrame};

    /// Full six-landmark frame with given shoulder / hip / knee heights
    fn body_frame(shoulder_y: f64, hip_y: f64, knee_y: f64) -> FilteredFrame {
        let points = vec![
            Keypoint::new(Landmark::LeftShoulder, 80.0, shoulder_y, 0.9),
            Keypoint::new(Landmark::RightShoulder, 120.0, shoulder_y, 0.9),
            Keypoint::new(Landmark::LeftHip, 85.0, hip_y, 0.9),
            Keypoint::new(Landmark::RightHip, 115.0, hip_y, 0.9),
            Keypoint::new(Landmark::LeftKnee, 85.0, knee_y, 0.9),
            Keypoint::new(Landmark::RightKnee, 115.0, knee_y, 0.9),
        ];
        FilteredFrame::from_frame(&PoseFrame::new(points))
    }

    fn pushup_tracker() -> RepTracker {
        let mut tracker = RepTracker::new();
        tracker.register(Exercise::PushUp);
        tracker
    }

    #[test]
    fn test_pushup_full_cycle_counts_once() {
        let mut tracker = pushup_tracker();

        // Down at 420, back up at 290: exactly one rep, state ends up
        let events = tracker.process_frame(&body_frame(420.0, 500.0, 500.0));
        assert!(events.is_empty());
        assert!(tracker.is_down(Exercise::PushUp));

        let events = tracker.process_frame(&body_frame(290.0, 500.0, 500.0));
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].exercise, Exercise::PushUp);
        assert_eq!(tracker.count(Exercise::PushUp), 1);
        assert!(!tracker.is_down(Exercise::PushUp));
    }

    #[test]
    fn test_pushup_incomplete_oscillation_never_counts() {
        let mut tracker = pushup_tracker();

        // 420 <-> 350 never crosses the 300 up threshold
        for _ in 0..5 {
            tracker.process_frame(&body_frame(420.0, 500.0, 500.0));
            tracker.process_frame(&body_frame(350.0, 500.0, 500.0));
        }
        assert_eq!(tracker.count(Exercise::PushUp), 0);
        assert!(tracker.is_down(Exercise::PushUp));
    }

    #[test]
    fn test_squat_full_cycle_counts_once() {
        let mut tracker = RepTracker::new();
        tracker.register(Exercise::Squat);

        // hip 200 vs knee 100: diff 100 > 60 -> down
        tracker.process_frame(&body_frame(50.0, 200.0, 100.0));
        assert!(tracker.is_down(Exercise::Squat));

        // hip 100 vs knee 160: hip < knee - 50 -> up, one rep
        let events = tracker.process_frame(&body_frame(50.0, 100.0, 160.0));
        assert_eq!(events.len(), 1);
        assert_eq!(tracker.count(Exercise::Squat), 1);
    }

    #[test]
    fn test_low_confidence_landmark_freezes_all_state() {
        let mut tracker = pushup_tracker();
        tracker.register(Exercise::Squat);

        let mut points = vec![
            Keypoint::new(Landmark::LeftShoulder, 80.0, 420.0, 0.9),
            Keypoint::new(Landmark::RightShoulder, 120.0, 420.0, 0.9),
            Keypoint::new(Landmark::LeftHip, 85.0, 500.0, 0.9),
            Keypoint::new(Landmark::RightHip, 115.0, 500.0, 0.9),
            Keypoint::new(Landmark::LeftKnee, 85.0, 400.0, 0.9),
            Keypoint::new(Landmark::RightKnee, 115.0, 400.0, 0.9),
        ];
        points[4].score = 0.4; // one knee below threshold

        let frame = FilteredFrame::from_frame(&PoseFrame::new(points));
        let events = tracker.process_frame(&frame);

        assert!(events.is_empty());
        assert!(!tracker.is_down(Exercise::PushUp));
        assert!(!tracker.is_down(Exercise::Squat));
        assert_eq!(tracker.count(Exercise::PushUp), 0);
    }

    #[test]
    fn test_exercises_keep_independent_state() {
        let mut tracker = pushup_tracker();
        tracker.register(Exercise::Squat);

        // Shoulders at 420 put the push-up machine down; hips level with
        // knees leave the squat machine up.
        tracker.process_frame(&body_frame(420.0, 500.0, 500.0));
        assert!(tracker.is_down(Exercise::PushUp));
        assert!(!tracker.is_down(Exercise::Squat));

        // Deep hip drop puts the squat machine down without disturbing the
        // push-up machine.
        tracker.process_frame(&body_frame(420.0, 580.0, 500.0));
        assert!(tracker.is_down(Exercise::PushUp));
        assert!(tracker.is_down(Exercise::Squat));
    }

    #[test]
    fn test_reset_zeroes_count_and_forces_up() {
        let mut tracker = pushup_tracker();

        tracker.process_frame(&body_frame(420.0, 500.0, 500.0));
        tracker.process_frame(&body_frame(290.0, 500.0, 500.0));
        tracker.process_frame(&body_frame(420.0, 500.0, 500.0));
        assert_eq!(tracker.count(Exercise::PushUp), 1);
        assert!(tracker.is_down(Exercise::PushUp));

        tracker.reset(Exercise::PushUp);
        assert_eq!(tracker.count(Exercise::PushUp), 0);
        assert!(!tracker.is_down(Exercise::PushUp));
    }

    #[test]
    fn test_reset_all() {
        let mut tracker = pushup_tracker();
        tracker.register(Exercise::Squat);

        tracker.process_frame(&body_frame(420.0, 580.0, 500.0));
        tracker.reset_all();

        assert!(!tracker.is_down(Exercise::PushUp));
        assert!(!tracker.is_down(Exercise::Squat));
        assert_eq!(tracker.counts().values().sum::<u32>(), 0);
    }

    #[test]
    fn test_unregistered_exercise_reads_zero() {
        let tracker = pushup_tracker();
        assert_eq!(tracker.count(Exercise::Squat), 0);
        assert!(!tracker.is_registered(Exercise::Squat));
    }
}
