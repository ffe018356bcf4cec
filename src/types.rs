//! Core types for the Posekit analysis pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: raw pose frames, stance classification, posture reports, and
//! tracked exercises.

use serde::{Deserialize, Serialize};

/// Anatomical landmark identifiers (MoveNet 17-point layout)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Landmark {
    Nose,
    LeftEye,
    RightEye,
    LeftEar,
    RightEar,
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl Landmark {
    pub fn as_str(&self) -> &'static str {
        match self {
            Landmark::Nose => "nose",
            Landmark::LeftEye => "left_eye",
            Landmark::RightEye => "right_eye",
            Landmark::LeftEar => "left_ear",
            Landmark::RightEar => "right_ear",
            Landmark::LeftShoulder => "left_shoulder",
            Landmark::RightShoulder => "right_shoulder",
            Landmark::LeftElbow => "left_elbow",
            Landmark::RightElbow => "right_elbow",
            Landmark::LeftWrist => "left_wrist",
            Landmark::RightWrist => "right_wrist",
            Landmark::LeftHip => "left_hip",
            Landmark::RightHip => "right_hip",
            Landmark::LeftKnee => "left_knee",
            Landmark::RightKnee => "right_knee",
            Landmark::LeftAnkle => "left_ankle",
            Landmark::RightAnkle => "right_ankle",
        }
    }
}

/// A detected anatomical landmark with position (frame pixel space, y grows
/// downward) and model confidence (0-1)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keypoint {
    /// Landmark name
    pub name: Landmark,
    /// Horizontal position in pixels
    pub x: f64,
    /// Vertical position in pixels (larger = lower in frame)
    pub y: f64,
    /// Model confidence (0-1)
    pub score: f64,
}

impl Keypoint {
    pub fn new(name: Landmark, x: f64, y: f64, score: f64) -> Self {
        Self { name, x, y, score }
    }
}

/// One sampled video frame's worth of keypoints, as produced by the pose
/// source. Owned exclusively by the current analysis cycle; never persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PoseFrame {
    pub keypoints: Vec<Keypoint>,
}

impl PoseFrame {
    pub fn new(keypoints: Vec<Keypoint>) -> Self {
        Self { keypoints }
    }
}

/// Stance classification driving which posture rules apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stance {
    Sitting,
    Standing,
}

/// A posture issue detected by the classifier. Each variant carries a fixed
/// advice message shown (and optionally spoken) to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostureIssue {
    /// Nose sits lower in the frame than a shoulder (sitting)
    HeadForward,
    /// Shoulder heights differ by more than the asymmetry tolerance (sitting)
    UnevenShoulders,
    /// Hip heights differ by more than the asymmetry tolerance (sitting)
    UnevenHips,
    /// A shoulder sits lower in the frame than its hip (standing)
    Slouching,
    /// A hip sits lower in the frame than its knee (standing)
    LegsMisaligned,
}

impl PostureIssue {
    /// Fixed user-facing advice for this issue
    pub fn message(&self) -> &'static str {
        match self {
            PostureIssue::HeadForward => "Your head is leaning forward! Keep it straight.",
            PostureIssue::UnevenShoulders => "Your shoulders are uneven! Adjust your posture.",
            PostureIssue::UnevenHips => "Your hips are misaligned! Sit evenly.",
            PostureIssue::Slouching => "Keep your back straight! Avoid slouching.",
            PostureIssue::LegsMisaligned => {
                "Your legs are not properly aligned! Adjust your stance."
            }
        }
    }
}

/// Message shown when no posture issues are detected
pub const GOOD_POSTURE_MESSAGE: &str = "Good posture! Keep it up!";

/// Result of classifying one frame's posture
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostureReport {
    /// Stance decided for this frame
    pub stance: Stance,
    /// Zero or more issues, in rule evaluation order
    pub issues: Vec<PostureIssue>,
}

impl PostureReport {
    /// Compose the user-facing feedback text: issue messages joined by
    /// newlines, or the good-posture message when no issues were found.
    pub fn feedback_text(&self) -> String {
        if self.issues.is_empty() {
            GOOD_POSTURE_MESSAGE.to_string()
        } else {
            self.issues
                .iter()
                .map(|i| i.message())
                .collect::<Vec<_>>()
                .join("\n")
        }
    }
}

/// Tracked exercise identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exercise {
    PushUp,
    Squat,
}

impl Exercise {
    pub fn as_str(&self) -> &'static str {
        match self {
            Exercise::PushUp => "push_up",
            Exercise::Squat => "squat",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landmark_serialization() {
        let json = serde_json::to_string(&Landmark::LeftShoulder).unwrap();
        assert_eq!(json, "\"left_shoulder\"");

        let parsed: Landmark = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Landmark::LeftShoulder);
    }

    #[test]
    fn test_keypoint_deserialization() {
        let json = r#"{"name": "right_knee", "x": 120.5, "y": 380.0, "score": 0.92}"#;
        let kp: Keypoint = serde_json::from_str(json).unwrap();
        assert_eq!(kp.name, Landmark::RightKnee);
        assert_eq!(kp.y, 380.0);
        assert!(kp.score > 0.9);
    }

    #[test]
    fn test_feedback_text_no_issues() {
        let report = PostureReport {
            stance: Stance::Sitting,
            issues: vec![],
        };
        assert_eq!(report.feedback_text(), GOOD_POSTURE_MESSAGE);
    }

    #[test]
    fn test_feedback_text_joins_issues() {
        let report = PostureReport {
            stance: Stance::Sitting,
            issues: vec![PostureIssue::HeadForward, PostureIssue::UnevenShoulders],
        };
        let text = report.feedback_text();
        assert!(text.contains("head is leaning forward"));
        assert!(text.contains("shoulders are uneven"));
        assert_eq!(text.lines().count(), 2);
    }

    #[test]
    fn test_exercise_serialization() {
        let json = serde_json::to_string(&Exercise::PushUp).unwrap();
        assert_eq!(json, "\"push_up\"");
    }
}
