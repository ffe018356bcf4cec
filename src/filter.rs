//! Keypoint confidence filtering
//!
//! This module gates every downstream rule: only keypoints at or above the
//! confidence threshold participate in any decision. If a rule's required
//! landmarks are not all present post-filter, the frame yields no decision
//! for that rule - silently skipped, no error raised.

use crate::types::{Keypoint, Landmark, PoseFrame};
use std::collections::HashMap;

/// Minimum confidence for a keypoint to participate in any rule
pub const CONFIDENCE_THRESHOLD: f64 = 0.5;

/// Landmarks required for repetition counting
pub const REP_COUNTING_LANDMARKS: [Landmark; 6] = [
    Landmark::LeftShoulder,
    Landmark::RightShoulder,
    Landmark::LeftHip,
    Landmark::RightHip,
    Landmark::LeftKnee,
    Landmark::RightKnee,
];

/// One frame's keypoints after confidence filtering.
///
/// Confident keypoints are indexed by landmark; raw scores are kept for every
/// detected landmark because the stance rule reads knee confidence directly
/// (a knee below threshold is evidence of sitting, not missing data).
#[derive(Debug, Clone)]
pub struct FilteredFrame {
    confident: HashMap<Landmark, Keypoint>,
    raw_scores: HashMap<Landmark, f64>,
}

impl FilteredFrame {
    /// Filter a raw pose frame at the standard confidence threshold
    pub fn from_frame(frame: &PoseFrame) -> Self {
        Self::with_threshold(frame, CONFIDENCE_THRESHOLD)
    }

    /// Filter a raw pose frame at a caller-supplied threshold
    pub fn with_threshold(frame: &PoseFrame, threshold: f64) -> Self {
        let mut confident = HashMap::new();
        let mut raw_scores = HashMap::new();

        for kp in &frame.keypoints {
            raw_scores.insert(kp.name, kp.score);
            if kp.score >= threshold {
                confident.insert(kp.name, kp.clone());
            }
        }

        Self {
            confident,
            raw_scores,
        }
    }

    /// Get a confident keypoint by landmark, if present post-filter
    pub fn get(&self, landmark: Landmark) -> Option<&Keypoint> {
        self.confident.get(&landmark)
    }

    /// Raw model confidence for a landmark, regardless of the filter.
    /// Absent landmarks read as 0.
    pub fn raw_score(&self, landmark: Landmark) -> f64 {
        self.raw_scores.get(&landmark).copied().unwrap_or(0.0)
    }

    /// True if every listed landmark survived the filter
    pub fn has_all(&self, required: &[Landmark]) -> bool {
        required.iter().all(|l| self.confident.contains_key(l))
    }

    /// Resolve all listed landmarks at once, or nothing.
    ///
    /// This is the no-partial-decisions contract: a frame missing any
    /// required landmark produces no output for that rule.
    pub fn require(&self, required: &[Landmark]) -> Option<Vec<&Keypoint>> {
        required
            .iter()
            .map(|l| self.confident.get(l))
            .collect::<Option<Vec<_>>>()
    }

    /// Iterate over all confident keypoints (used to draw the overlay)
    pub fn confident_keypoints(&self) -> impl Iterator<Item = &Keypoint> {
        self.confident.values()
    }

    /// Number of confident keypoints in this frame
    pub fn confident_count(&self) -> usize {
        self.confident.len()
    }
}
