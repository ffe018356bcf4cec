//! Error types for Posekit

use thiserror::Error;

/// Errors that can occur while running the analysis engine
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Failed to parse pose frame: {0}")]
    ParseError(String),

    #[error("Invalid JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Pose source failure: {0}")]
    PoseSourceError(String),

    #[error("Speech capability unavailable: {0}")]
    SpeechUnavailable(String),

    #[error("Presentation surface failure: {0}")]
    SurfaceError(String),

    #[error("Encoding error: {0}")]
    EncodingError(String),

    #[error("Unknown exercise: {0}")]
    UnknownExercise(String),
}
