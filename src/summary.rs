//! Session summary encoding
//!
//! When a session ends, the embedding layer records what happened against
//! the user's activity log. This module encodes a finished
//! [`DetectionSession`] into a machine-readable JSON payload with producer
//! and timing metadata.

use crate::error::EngineError;
use crate::session::DetectionSession;
use crate::types::{Exercise, PostureIssue};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Summary payload schema version
pub const SUMMARY_VERSION: &str = "1.0.0";

/// Producer metadata embedded in every summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Frame accounting for one session
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FrameStats {
    /// Frames that entered the analysis step
    pub processed: u32,
    /// Frames polled but skipped while speech playback was active
    pub skipped: u32,
    /// Frames lost to pose-source failures
    pub failed: u32,
}

/// Complete session summary payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub summary_version: String,
    pub producer: SummaryProducer,
    pub session_id: String,
    pub started_at_utc: String,
    pub ended_at_utc: String,
    pub frames: FrameStats,
    /// Completed repetitions per tracked exercise
    pub rep_counts: BTreeMap<Exercise, u32>,
    /// How often each posture issue was flagged
    pub issue_counts: BTreeMap<PostureIssue, u32>,
    /// Feedback on display when the session ended
    pub last_feedback: Option<String>,
}

/// Encodes finished sessions into summary payloads
pub struct SummaryEncoder {
    instance_id: String,
}

impl Default for SummaryEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl SummaryEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Build the summary payload for a finished session
    pub fn encode(&self, session: &DetectionSession) -> SessionSummary {
        SessionSummary {
            summary_version: SUMMARY_VERSION.to_string(),
            producer: SummaryProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            session_id: session.session_id().to_string(),
            started_at_utc: session.started_at().to_rfc3339(),
            ended_at_utc: Utc::now().to_rfc3339(),
            frames: FrameStats {
                processed: session.frames_processed(),
                skipped: session.frames_skipped(),
                failed: session.frames_failed(),
            },
            rep_counts: session.rep_counts(),
            issue_counts: session.issue_counts().clone(),
            last_feedback: session.last_feedback().map(|s| s.to_string()),
        }
    }

    /// Encode to pretty JSON
    pub fn encode_to_json(&self, session: &DetectionSession) -> Result<String, EngineError> {
        let summary = self.encode(session);
        serde_json::to_string_pretty(&summary).map_err(EngineError::JsonError)
    }
}
