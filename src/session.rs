//! Detection session state
//!
//! All state that in a naive implementation would live in globals (current
//! stance, last spoken feedback, the speaking gate) is scoped here to one
//! session, so concurrent sessions can never leak state into each other.

use crate::filter::FilteredFrame;
use crate::posture::PostureClassifier;
use crate::reps::{RepEvent, RepTracker};
use crate::types::{Exercise, PoseFrame, PostureIssue, PostureReport, Stance};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Feedback shown when the pose source fails for a frame
pub const SOURCE_FAILURE_MESSAGE: &str = "Posture detection error. Try again.";

/// Session configuration
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Whether feedback should also be spoken
    pub voice_enabled: bool,
    /// Exercises to track for repetition counting
    pub exercises: Vec<Exercise>,
    /// Whether posture rules run (the rep-counter page tracks reps only)
    pub posture_enabled: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            voice_enabled: true,
            exercises: Vec::new(),
            posture_enabled: true,
        }
    }
}

/// What one frame's analysis produced
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct FrameAnalysis {
    /// Posture report, when the frame qualified for classification
    pub report: Option<PostureReport>,
    /// Feedback text to display (None = keep prior feedback)
    pub feedback: Option<String>,
    /// Text to hand to the speech sink (voice enabled and text changed)
    pub speak: Option<String>,
    /// Repetitions completed on this frame
    pub rep_events: Vec<RepEvent>,
    /// True when no decision was made (speech active or required landmarks
    /// missing post-filter)
    pub skipped: bool,
}

/// One detection session: filter, classifier, and rep tracker plus the
/// session-scoped feedback state.
#[derive(Debug)]
pub struct DetectionSession {
    session_id: String,
    started_at: DateTime<Utc>,
    voice_enabled: bool,
    posture_enabled: bool,
    tracker: RepTracker,
    stance: Option<Stance>,
    last_feedback: Option<String>,
    last_spoken: Option<String>,
    issue_counts: BTreeMap<PostureIssue, u32>,
    frames_processed: u32,
    frames_skipped: u32,
    frames_failed: u32,
}

impl DetectionSession {
    pub fn new(config: SessionConfig) -> Self {
        let mut tracker = RepTracker::new();
        for exercise in &config.exercises {
            tracker.register(*exercise);
        }

        Self {
            session_id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            voice_enabled: config.voice_enabled,
            posture_enabled: config.posture_enabled,
            tracker,
            stance: None,
            last_feedback: None,
            last_spoken: None,
            issue_counts: BTreeMap::new(),
            frames_processed: 0,
            frames_skipped: 0,
            frames_failed: 0,
        }
    }

    /// Analyze one frame.
    ///
    /// While speech playback is active (`speech_busy`) the analysis step is
    /// skipped entirely; the loop keeps polling but neither posture state nor
    /// rep counters change. A frame whose required landmarks fail the
    /// confidence filter likewise changes nothing - prior feedback stands.
    pub fn process_frame(&mut self, frame: &PoseFrame, speech_busy: bool) -> FrameAnalysis {
        if speech_busy {
            self.frames_skipped += 1;
            return FrameAnalysis {
                skipped: true,
                ..Default::default()
            };
        }

        let filtered = FilteredFrame::from_frame(frame);
        let rep_events = self.tracker.process_frame(&filtered);

        let mut analysis = FrameAnalysis {
            rep_events,
            ..Default::default()
        };

        if self.posture_enabled {
            match PostureClassifier::classify(&filtered) {
                Some(report) => {
                    self.stance = Some(report.stance);
                    for issue in &report.issues {
                        *self.issue_counts.entry(*issue).or_insert(0) += 1;
                    }

                    let text = report.feedback_text();
                    self.last_feedback = Some(text.clone());

                    // Never queue the same utterance twice in a row
                    if self.voice_enabled && self.last_spoken.as_deref() != Some(text.as_str()) {
                        analysis.speak = Some(text.clone());
                    }
                    analysis.feedback = Some(text);
                    analysis.report = Some(report);
                }
                None => {
                    analysis.skipped = true;
                }
            }
        }

        self.frames_processed += 1;
        analysis
    }

    /// Record a pose-source failure for this frame. Per-frame recoverable:
    /// the caller displays the returned message and continues on the next
    /// frame.
    pub fn record_source_failure(&mut self) -> &'static str {
        self.frames_failed += 1;
        SOURCE_FAILURE_MESSAGE
    }

    /// Note that an utterance was actually handed to the speech engine
    pub fn note_spoken(&mut self, text: &str) {
        self.last_spoken = Some(text.to_string());
    }

    /// Degrade to text-only feedback (speech engine found unavailable)
    pub fn disable_voice(&mut self) {
        self.voice_enabled = false;
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled
    }

    /// Reset a tracked exercise's counter (external reset trigger)
    pub fn reset_reps(&mut self, exercise: Exercise) {
        self.tracker.reset(exercise);
    }

    /// Reset every tracked exercise's counter
    pub fn reset_all_reps(&mut self) {
        self.tracker.reset_all();
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub fn stance(&self) -> Option<Stance> {
        self.stance
    }

    pub fn last_feedback(&self) -> Option<&str> {
        self.last_feedback.as_deref()
    }

    pub fn rep_count(&self, exercise: Exercise) -> u32 {
        self.tracker.count(exercise)
    }

    pub fn rep_counts(&self) -> BTreeMap<Exercise, u32> {
        self.tracker.counts()
    }

    pub fn issue_counts(&self) -> &BTreeMap<PostureIssue, u32> {
        &self.issue_counts
    }

    pub fn frames_processed(&self) -> u32 {
        self.frames_processed
    }

    pub fn frames_skipped(&self) -> u32 {
        self.frames_skipped
    }

    pub fn frames_failed(&self) -> u32 {
        self.frames_failed
    }
}
