//! Posekit - On-device pose analysis engine for posture feedback and
//! repetition counting
//!
//! Posekit turns per-frame anatomical keypoints from an external pose model
//! into user feedback through a deterministic pipeline: confidence filtering
//! → stance classification → posture rules / rep counting → feedback and
//! session summary.
//!
//! ## Modules
//!
//! - **Posture**: sitting/standing stance and geometric posture rules
//! - **Reps**: per-exercise two-state repetition counters
//! - **Session/Controller**: session-scoped state and the cooperative frame loop

pub mod capabilities;
pub mod controller;
pub mod error;
pub mod filter;
pub mod posture;
pub mod reps;
pub mod session;
pub mod summary;
pub mod types;

// FFI bindings for C interop (always available for cdylib/staticlib builds)
pub mod ffi;

pub use controller::{DetectionController, LoopExit, StopFlag};
pub use error::EngineError;
pub use filter::{FilteredFrame, CONFIDENCE_THRESHOLD};
pub use posture::PostureClassifier;
pub use reps::{RepCounter, RepEvent, RepTracker};
pub use session::{DetectionSession, FrameAnalysis, SessionConfig};
pub use summary::{SessionSummary, SummaryEncoder};
pub use types::{
    Exercise, Keypoint, Landmark, PoseFrame, PostureIssue, PostureReport, Stance,
    GOOD_POSTURE_MESSAGE,
};

/// Engine version embedded in all summary payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for summary payloads
pub const PRODUCER_NAME: &str = "posekit";
