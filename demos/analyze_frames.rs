//! Run a short recorded detection session and print the summary

use posekit::capabilities::{QueuedPoseSource, RecordingSpeechSink, RecordingSurface};
use posekit::session::{DetectionSession, SessionConfig};
use posekit::summary::SummaryEncoder;
use posekit::types::PoseFrame;
use posekit::DetectionController;

fn main() {
    let frames: Vec<PoseFrame> = [
        // Sitting, head leaning forward
        r#"{"keypoints": [
            {"name": "nose", "x": 100.0, "y": 55.0, "score": 0.9},
            {"name": "left_shoulder", "x": 80.0, "y": 40.0, "score": 0.9},
            {"name": "right_shoulder", "x": 120.0, "y": 42.0, "score": 0.9},
            {"name": "left_hip", "x": 85.0, "y": 150.0, "score": 0.9},
            {"name": "right_hip", "x": 115.0, "y": 152.0, "score": 0.9}
        ]}"#,
        // Sitting, corrected
        r#"{"keypoints": [
            {"name": "nose", "x": 100.0, "y": 30.0, "score": 0.9},
            {"name": "left_shoulder", "x": 80.0, "y": 40.0, "score": 0.9},
            {"name": "right_shoulder", "x": 120.0, "y": 42.0, "score": 0.9},
            {"name": "left_hip", "x": 85.0, "y": 150.0, "score": 0.9},
            {"name": "right_hip", "x": 115.0, "y": 152.0, "score": 0.9}
        ]}"#,
    ]
    .iter()
    .map(|json| serde_json::from_str(json).expect("valid frame JSON"))
    .collect();

    let controller = DetectionController::new(
        Box::new(QueuedPoseSource::new(frames)),
        Box::new(RecordingSpeechSink::new()),
        Box::new(RecordingSurface::new()),
        DetectionSession::new(SessionConfig::default()),
    );

    match controller.run() {
        Ok((exit, session)) => {
            eprintln!("loop exited: {exit:?}");
            match SummaryEncoder::new().encode_to_json(&session) {
                Ok(summary) => print!("{summary}"),
                Err(e) => eprintln!("Error: {e:?}"),
            }
        }
        Err(e) => eprintln!("Error: {e:?}"),
    }
}
