//! Frame loop orchestration
//!
//! A single cooperative control flow per session: pull a frame, draw the
//! confident keypoints, analyze, route feedback to the surface and (gated)
//! to the speech sink, repeat. A user-triggered stop flag is observed at the
//! top of each iteration, after which the camera is released.

use crate::capabilities::{PoseSource, PresentationSurface, SpeechSink};
use crate::error::EngineError;
use crate::filter::FilteredFrame;
use crate::session::DetectionSession;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop trigger observed by the frame loop
#[derive(Debug, Clone, Default)]
pub struct StopFlag(Arc<AtomicBool>);

impl StopFlag {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request the loop to exit on its next iteration
    pub fn trigger(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Why the frame loop exited
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopExit {
    /// Stop flag observed
    Stopped,
    /// Pose source reported end of stream
    StreamEnded,
}

/// Owns the capability objects and drives a detection session over them
pub struct DetectionController {
    source: Box<dyn PoseSource>,
    speech: Box<dyn SpeechSink>,
    surface: Box<dyn PresentationSurface>,
    session: DetectionSession,
    stop: StopFlag,
}

impl DetectionController {
    pub fn new(
        source: Box<dyn PoseSource>,
        speech: Box<dyn SpeechSink>,
        surface: Box<dyn PresentationSurface>,
        session: DetectionSession,
    ) -> Self {
        Self {
            source,
            speech,
            surface,
            session,
            stop: StopFlag::new(),
        }
    }

    /// Handle for requesting a stop from outside the loop
    pub fn stop_flag(&self) -> StopFlag {
        self.stop.clone()
    }

    pub fn session(&self) -> &DetectionSession {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut DetectionSession {
        &mut self.session
    }

    /// Run one loop iteration. `Ok(None)` means the loop should continue;
    /// `Ok(Some(_))` means it exited.
    pub fn step(&mut self) -> Result<Option<LoopExit>, EngineError> {
        if self.stop.is_set() {
            self.source.stop();
            return Ok(Some(LoopExit::Stopped));
        }

        let frame = match self.source.next_frame() {
            Ok(Some(frame)) => frame,
            Ok(None) => {
                self.source.stop();
                return Ok(Some(LoopExit::StreamEnded));
            }
            Err(_) => {
                // Fatal to the frame only; show the generic message and poll again
                let msg = self.session.record_source_failure();
                self.surface.set_feedback(msg);
                return Ok(None);
            }
        };

        let filtered = FilteredFrame::from_frame(&frame);
        for kp in filtered.confident_keypoints() {
            self.surface.draw_point(kp.x, kp.y);
        }

        let analysis = self.session.process_frame(&frame, self.speech.is_busy());

        if let Some(text) = &analysis.feedback {
            self.surface.set_feedback(text);
        }

        if let Some(text) = analysis.speak {
            match self.speech.speak(&text) {
                Ok(()) => self.session.note_spoken(&text),
                Err(EngineError::SpeechUnavailable(_)) => {
                    // Detected at call time: degrade to text-only for the
                    // rest of the session
                    self.session.disable_voice();
                }
                Err(e) => return Err(e),
            }
        }

        Ok(None)
    }

    /// Drive the loop to completion and hand the session back
    pub fn run(mut self) -> Result<(LoopExit, DetectionSession), EngineError> {
        loop {
            if let Some(exit) = self.step()? {
                return Ok((exit, self.session));
            }
        }
    }
}
