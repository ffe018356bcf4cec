//! FFI bindings for Posekit
//!
//! This module provides C-compatible functions for calling the engine from
//! other languages (the web/mobile shells that own the camera and UI). All
//! functions use C strings (null-terminated) and return allocated memory
//! that must be freed by the caller using `posekit_free_string`.

use std::cell::RefCell;
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

use crate::session::{DetectionSession, SessionConfig};
use crate::summary::SummaryEncoder;
use crate::types::{Exercise, PoseFrame};

// Thread-local storage for the last error message
thread_local! {
    static LAST_ERROR: RefCell<Option<CString>> = const { RefCell::new(None) };
}

fn set_last_error(msg: &str) {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = CString::new(msg).ok();
    });
}

fn clear_last_error() {
    LAST_ERROR.with(|e| {
        *e.borrow_mut() = None;
    });
}

/// Helper to convert C string to Rust string
unsafe fn cstr_to_string(ptr: *const c_char) -> Option<String> {
    if ptr.is_null() {
        return None;
    }
    CStr::from_ptr(ptr).to_str().ok().map(|s| s.to_string())
}

/// Helper to convert Rust string to C string (caller must free)
fn string_to_cstr(s: &str) -> *mut c_char {
    match CString::new(s) {
        Ok(cstr) => cstr.into_raw(),
        Err(_) => ptr::null_mut(),
    }
}

// ============================================================================
// Stateless API
// ============================================================================

/// Classify the posture in one frame JSON and return the report JSON.
///
/// # Safety
/// - `frame_json` must be a valid null-terminated C string.
/// - Returns a newly allocated string that must be freed with
///   `posekit_free_string`.
/// - Returns NULL on error; call `posekit_last_error` for the message.
#[no_mangle]
pub unsafe extern "C" fn posekit_analyze_frame(frame_json: *const c_char) -> *mut c_char {
    clear_last_error();

    let json = match cstr_to_string(frame_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid frame JSON pointer");
            return ptr::null_mut();
        }
    };

    let frame: PoseFrame = match serde_json::from_str(&json) {
        Ok(f) => f,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let filtered = crate::filter::FilteredFrame::from_frame(&frame);
    let report = crate::posture::PostureClassifier::classify(&filtered);

    match serde_json::to_string(&report) {
        Ok(s) => string_to_cstr(&s),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

// ============================================================================
// Stateful session API
// ============================================================================

/// Create a detection session.
///
/// `exercises_json` is a JSON array of exercise names (e.g.
/// `["push_up","squat"]`); pass NULL or `[]` to track none.
///
/// # Safety
/// - The returned handle must be destroyed with `posekit_session_destroy`.
#[no_mangle]
pub unsafe extern "C" fn posekit_session_create(
    exercises_json: *const c_char,
    voice_enabled: bool,
) -> *mut DetectionSession {
    clear_last_error();

    let exercises: Vec<Exercise> = match cstr_to_string(exercises_json) {
        Some(s) => match serde_json::from_str(&s) {
            Ok(v) => v,
            Err(e) => {
                set_last_error(&e.to_string());
                return ptr::null_mut();
            }
        },
        None => Vec::new(),
    };

    let session = DetectionSession::new(SessionConfig {
        voice_enabled,
        exercises,
        posture_enabled: true,
    });
    Box::into_raw(Box::new(session))
}

/// Process one frame in a session and return the analysis JSON.
///
/// # Safety
/// - `session` must be a handle from `posekit_session_create` that has not
///   been destroyed.
/// - `frame_json` must be a valid null-terminated C string.
/// - Returns NULL on error; the session stays usable.
#[no_mangle]
pub unsafe extern "C" fn posekit_session_process_frame(
    session: *mut DetectionSession,
    frame_json: *const c_char,
    speech_busy: bool,
) -> *mut c_char {
    clear_last_error();

    let Some(session) = session.as_mut() else {
        set_last_error("Null session handle");
        return ptr::null_mut();
    };

    let json = match cstr_to_string(frame_json) {
        Some(s) => s,
        None => {
            set_last_error("Invalid frame JSON pointer");
            return ptr::null_mut();
        }
    };

    let frame: PoseFrame = match serde_json::from_str(&json) {
        Ok(f) => f,
        Err(e) => {
            set_last_error(&e.to_string());
            return ptr::null_mut();
        }
    };

    let analysis = session.process_frame(&frame, speech_busy);
    if let Some(text) = &analysis.speak {
        session.note_spoken(text);
    }

    match serde_json::to_string(&analysis) {
        Ok(s) => string_to_cstr(&s),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Reset all rep counters in a session (external reset trigger).
///
/// # Safety
/// - `session` must be a live handle from `posekit_session_create`.
#[no_mangle]
pub unsafe extern "C" fn posekit_session_reset_reps(session: *mut DetectionSession) {
    if let Some(session) = session.as_mut() {
        session.reset_all_reps();
    }
}

/// Encode the session summary JSON without destroying the session.
///
/// # Safety
/// - `session` must be a live handle from `posekit_session_create`.
/// - Returned string must be freed with `posekit_free_string`.
#[no_mangle]
pub unsafe extern "C" fn posekit_session_summary(
    session: *const DetectionSession,
) -> *mut c_char {
    clear_last_error();

    let Some(session) = session.as_ref() else {
        set_last_error("Null session handle");
        return ptr::null_mut();
    };

    match SummaryEncoder::new().encode_to_json(session) {
        Ok(s) => string_to_cstr(&s),
        Err(e) => {
            set_last_error(&e.to_string());
            ptr::null_mut()
        }
    }
}

/// Destroy a session handle.
///
/// # Safety
/// - `session` must be a handle from `posekit_session_create`, destroyed at
///   most once. NULL is a no-op.
#[no_mangle]
pub unsafe extern "C" fn posekit_session_destroy(session: *mut DetectionSession) {
    if !session.is_null() {
        drop(Box::from_raw(session));
    }
}

// ============================================================================
// Error / memory management
// ============================================================================

/// Get the last error message, or NULL if none.
///
/// # Safety
/// - The returned pointer is owned by the library and valid until the next
///   FFI call on this thread; do not free it.
#[no_mangle]
pub unsafe extern "C" fn posekit_last_error() -> *const c_char {
    LAST_ERROR.with(|e| {
        e.borrow()
            .as_ref()
            .map(|c| c.as_ptr())
            .unwrap_or(ptr::null())
    })
}

/// Free a string returned by this library.
///
/// # Safety
/// - `s` must have been returned by a posekit FFI function and freed at most
///   once. NULL is a no-op.
#[no_mangle]
pub unsafe extern "C" fn posekit_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}
