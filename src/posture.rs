//! Posture classification
//!
//! Stance is decided fresh every frame from knee confidence, then a fixed set
//! of geometric rules runs for that stance. Frame coordinates grow downward,
//! so "nose.y > shoulder.y" means the nose sits lower in the frame than the
//! shoulder.

use crate::filter::FilteredFrame;
use crate::types::{Landmark, PostureIssue, PostureReport, Stance};

/// Vertical asymmetry tolerance for shoulder and hip level checks (pixels)
pub const ASYMMETRY_TOLERANCE_PX: f64 = 20.0;

/// Landmarks the sitting rules read
const SITTING_LANDMARKS: [Landmark; 5] = [
    Landmark::Nose,
    Landmark::LeftShoulder,
    Landmark::RightShoulder,
    Landmark::LeftHip,
    Landmark::RightHip,
];

/// Landmarks the standing rules read
const STANDING_LANDMARKS: [Landmark; 6] = [
    Landmark::LeftShoulder,
    Landmark::RightShoulder,
    Landmark::LeftHip,
    Landmark::RightHip,
    Landmark::LeftKnee,
    Landmark::RightKnee,
];

/// Posture classifier. Stateless: stance is reevaluated every frame and is
/// never sticky across frames.
pub struct PostureClassifier;

impl PostureClassifier {
    /// Decide stance from raw knee confidence.
    ///
    /// Both knees below the confidence threshold reads as sitting - a camera
    /// framing only the upper body intentionally classifies as sitting.
    pub fn stance(frame: &FilteredFrame) -> Stance {
        let left = frame.get(Landmark::LeftKnee).is_some();
        let right = frame.get(Landmark::RightKnee).is_some();
        if !left && !right {
            Stance::Sitting
        } else {
            Stance::Standing
        }
    }

    /// Classify one filtered frame.
    ///
    /// Returns `None` when the stance's required landmarks are not all
    /// present post-filter: no report, no feedback update for this frame.
    pub fn classify(frame: &FilteredFrame) -> Option<PostureReport> {
        let stance = Self::stance(frame);

        let issues = match stance {
            Stance::Sitting => Self::sitting_issues(frame)?,
            Stance::Standing => Self::standing_issues(frame)?,
        };

        Some(PostureReport { stance, issues })
    }

    fn sitting_issues(frame: &FilteredFrame) -> Option<Vec<PostureIssue>> {
        let points = frame.require(&SITTING_LANDMARKS)?;
        let [nose, left_shoulder, right_shoulder, left_hip, right_hip] = points.as_slice() else {
            return None;
        };

        let mut issues = Vec::new();

        if nose.y > left_shoulder.y || nose.y > right_shoulder.y {
            issues.push(PostureIssue::HeadForward);
        }
        if (left_shoulder.y - right_shoulder.y).abs() > ASYMMETRY_TOLERANCE_PX {
            issues.push(PostureIssue::UnevenShoulders);
        }
        if (left_hip.y - right_hip.y).abs() > ASYMMETRY_TOLERANCE_PX {
            issues.push(PostureIssue::UnevenHips);
        }

        Some(issues)
    }

    fn standing_issues(frame: &FilteredFrame) -> Option<Vec<PostureIssue>> {
        let points = frame.require(&STANDING_LANDMARKS)?;
        let [left_shoulder, right_shoulder, left_hip, right_hip, left_knee, right_knee] =
            points.as_slice()
        else {
            return None;
        };

        let mut issues = Vec::new();

        if left_shoulder.y > left_hip.y || right_shoulder.y > right_hip.y {
            issues.push(PostureIssue::Slouching);
        }
        if left_hip.y > left_knee.y || right_hip.y > right_knee.y {
            issues.push(PostureIssue::LegsMisaligned);
        }

        Some(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Keypoint, PoseFrame};

    fn frame_from(points: &[(Landmark, f64, f64, f64)]) -> FilteredFrame {
        let frame = PoseFrame::new(
            points
                .iter()
                .map(|&(name, x, y, score)| Keypoint::new(name, x, y, score))
                .collect(),
        );
        FilteredFrame::from_frame(&frame)
    }

    fn sitting_base(nose_y: f64) -> Vec<(Landmark, f64, f64, f64)> {
        vec![
            (Landmark::Nose, 100.0, nose_y, 0.9),
            (Landmark::LeftShoulder, 80.0, 40.0, 0.9),
            (Landmark::RightShoulder, 120.0, 42.0, 0.9),
            (Landmark::LeftHip, 85.0, 150.0, 0.9),
            (Landmark::RightHip, 115.0, 152.0, 0.9),
            (Landmark::LeftKnee, 85.0, 250.0, 0.3),
            (Landmark::RightKnee, 115.0, 250.0, 0.3),
        ]
    }

    fn standing_base() -> Vec<(Landmark, f64, f64, f64)> {
        vec![
            (Landmark::LeftShoulder, 80.0, 200.0, 0.9),
            (Landmark::RightShoulder, 120.0, 202.0, 0.9),
            (Landmark::LeftHip, 85.0, 350.0, 0.9),
            (Landmark::RightHip, 115.0, 352.0, 0.9),
            (Landmark::LeftKnee, 85.0, 450.0, 0.9),
            (Landmark::RightKnee, 115.0, 452.0, 0.9),
        ]
    }

    #[test]
    fn test_low_confidence_knees_always_sitting() {
        // Knee positions are irrelevant once their confidence is sub-threshold
        let frame = frame_from(&sitting_base(30.0));
        assert_eq!(PostureClassifier::stance(&frame), Stance::Sitting);
    }

    #[test]
    fn test_one_confident_knee_is_standing() {
        let mut points = sitting_base(30.0);
        points[5].3 = 0.8; // left knee confident
        let frame = frame_from(&points);
        assert_eq!(PostureClassifier::stance(&frame), Stance::Standing);
    }

    #[test]
    fn test_head_forward_present_and_absent() {
        // nose.y = 50 below shoulder.y = 40 -> head forward
        let report = PostureClassifier::classify(&frame_from(&sitting_base(50.0))).unwrap();
        assert!(report.issues.contains(&PostureIssue::HeadForward));

        // nose.y = 30 above both shoulders -> no issue
        let report = PostureClassifier::classify(&frame_from(&sitting_base(30.0))).unwrap();
        assert!(!report.issues.contains(&PostureIssue::HeadForward));
    }

    #[test]
    fn test_uneven_shoulders() {
        let mut points = sitting_base(30.0);
        points[2].2 = 65.0; // right shoulder 25px below left
        let report = PostureClassifier::classify(&frame_from(&points)).unwrap();
        assert!(report.issues.contains(&PostureIssue::UnevenShoulders));
    }

    #[test]
    fn test_uneven_hips_tolerance_boundary() {
        let mut points = sitting_base(30.0);
        points[4].2 = 170.0; // exactly 20px difference: within tolerance
        let report = PostureClassifier::classify(&frame_from(&points)).unwrap();
        assert!(!report.issues.contains(&PostureIssue::UnevenHips));

        points[4].2 = 171.0; // 21px: violated
        let report = PostureClassifier::classify(&frame_from(&points)).unwrap();
        assert!(report.issues.contains(&PostureIssue::UnevenHips));
    }

    #[test]
    fn test_standing_slouching() {
        let mut points = standing_base();
        points[0].2 = 300.0; // left shoulder y
        points[2].2 = 250.0; // left hip y above it in frame
        let report = PostureClassifier::classify(&frame_from(&points)).unwrap();
        assert_eq!(report.stance, Stance::Standing);
        assert!(report.issues.contains(&PostureIssue::Slouching));

        // Reversed: shoulder above hip, no slouching
        let report = PostureClassifier::classify(&frame_from(&standing_base())).unwrap();
        assert!(!report.issues.contains(&PostureIssue::Slouching));
    }

    #[test]
    fn test_standing_leg_misalignment() {
        let mut points = standing_base();
        points[2].2 = 460.0; // left hip below left knee
        let report = PostureClassifier::classify(&frame_from(&points)).unwrap();
        assert!(report.issues.contains(&PostureIssue::LegsMisaligned));
    }

    #[test]
    fn test_good_standing_posture_no_issues() {
        let report = PostureClassifier::classify(&frame_from(&standing_base())).unwrap();
        assert!(report.issues.is_empty());
    }

    #[test]
    fn test_missing_required_landmark_skips_frame() {
        // Sitting stance but no hips detected at all
        let points = vec![
            (Landmark::Nose, 100.0, 30.0, 0.9),
            (Landmark::LeftShoulder, 80.0, 40.0, 0.9),
            (Landmark::RightShoulder, 120.0, 42.0, 0.9),
        ];
        assert!(PostureClassifier::classify(&frame_from(&points)).is_none());
    }

    #[test]
    fn test_standing_with_sub_threshold_hip_skips_frame() {
        let mut points = standing_base();
        points[3].3 = 0.4; // right hip below threshold
        assert!(PostureClassifier::classify(&frame_from(&points)).is_none());
    }
}
