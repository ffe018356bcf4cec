//! External collaborator seams
//!
//! The analysis core has no dependency on any camera, model runtime, UI
//! toolkit, or speech engine. Embedders supply these capabilities behind the
//! traits below; the crate ships simple in-memory implementations used by the
//! CLI and tests.

use crate::error::EngineError;
use crate::types::PoseFrame;
use std::collections::VecDeque;

/// Produces pose frames on request (camera + model inference).
///
/// A request may fail; a failure is fatal only to that frame, never to the
/// session loop. Frames arriving while a request is in flight are dropped by
/// the source, not queued.
pub trait PoseSource {
    /// Pull the next frame. `Ok(None)` means the stream ended.
    fn next_frame(&mut self) -> Result<Option<PoseFrame>, EngineError>;

    /// Release the underlying capture resource (stop camera tracks)
    fn stop(&mut self);
}

/// Plays spoken feedback. May be unavailable, in which case feedback
/// degrades to text-only.
pub trait SpeechSink {
    /// Start playing an utterance. Non-blocking; completion is observed by
    /// polling [`SpeechSink::is_busy`].
    fn speak(&mut self, text: &str) -> Result<(), EngineError>;

    /// True while an utterance is still playing
    fn is_busy(&self) -> bool;
}

/// Write-only presentation sinks: a 2-D overlay sized to the video frame and
/// a text region for feedback.
pub trait PresentationSurface {
    /// Draw a keypoint marker at frame coordinates
    fn draw_point(&mut self, x: f64, y: f64);

    /// Replace the feedback text
    fn set_feedback(&mut self, text: &str);
}

/// In-memory pose source backed by a queue of prepared frames
#[derive(Debug, Default)]
pub struct QueuedPoseSource {
    frames: VecDeque<PoseFrame>,
    stopped: bool,
}

impl QueuedPoseSource {
    pub fn new(frames: Vec<PoseFrame>) -> Self {
        Self {
            frames: frames.into(),
            stopped: false,
        }
    }

    pub fn push(&mut self, frame: PoseFrame) {
        self.frames.push_back(frame);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped
    }
}

impl PoseSource for QueuedPoseSource {
    fn next_frame(&mut self) -> Result<Option<PoseFrame>, EngineError> {
        if self.stopped {
            return Ok(None);
        }
        Ok(self.frames.pop_front())
    }

    fn stop(&mut self) {
        self.stopped = true;
        self.frames.clear();
    }
}

/// Speech sink that records utterances instead of playing them. Playback
/// completion is driven manually with [`RecordingSpeechSink::finish`].
#[derive(Debug, Default)]
pub struct RecordingSpeechSink {
    utterances: Vec<String>,
    busy: bool,
}

impl RecordingSpeechSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything spoken so far, in order
    pub fn utterances(&self) -> &[String] {
        &self.utterances
    }

    /// Mark the current utterance as finished playing
    pub fn finish(&mut self) {
        self.busy = false;
    }
}

impl SpeechSink for RecordingSpeechSink {
    fn speak(&mut self, text: &str) -> Result<(), EngineError> {
        self.utterances.push(text.to_string());
        self.busy = true;
        Ok(())
    }

    fn is_busy(&self) -> bool {
        self.busy
    }
}

/// Speech sink standing in for a platform with no speech engine
#[derive(Debug, Default)]
pub struct UnavailableSpeechSink;

impl SpeechSink for UnavailableSpeechSink {
    fn speak(&mut self, _text: &str) -> Result<(), EngineError> {
        Err(EngineError::SpeechUnavailable(
            "no speech engine on this platform".to_string(),
        ))
    }

    fn is_busy(&self) -> bool {
        false
    }
}

/// Presentation surface that records draw/text calls
#[derive(Debug, Default)]
pub struct RecordingSurface {
    pub points: Vec<(f64, f64)>,
    pub feedback: Option<String>,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PresentationSurface for RecordingSurface {
    fn draw_point(&mut self, x: f64, y: f64) {
        self.points.push((x, y));
    }

    fn set_feedback(&mut self, text: &str) {
        self.feedback = Some(text.to_string());
    }
}
