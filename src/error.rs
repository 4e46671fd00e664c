//! Error taxonomy for the capture and recognition pipeline
//!
//! Every failure is caught at the boundary of the operation that produced it
//! and converted into a status update; nothing here ever crashes the process.

use thiserror::Error;

use crate::camera::FacingMode;

/// Failures while acquiring or operating a camera stream
#[derive(Debug, Error)]
pub enum CameraError {
    /// No device satisfies the exact facing-mode constraint.
    /// Recovered automatically once (environment -> user fallback).
    #[error("no camera satisfies facing mode '{0}'")]
    ConstraintUnsatisfiable(FacingMode),

    /// The user or platform refused camera access
    #[error("camera access denied: {0}")]
    AccessDenied(String),

    /// Any other hardware-level failure (device busy, unplugged, ...)
    #[error("camera hardware failure: {0}")]
    Hardware(String),
}

/// Failures while snapshotting a frame from the live stream
#[derive(Debug, Error)]
pub enum CaptureError {
    /// Capture was attempted without a live camera session.
    /// Fully recoverable by starting a camera.
    #[error("no active camera session")]
    NoActiveSession,

    /// The stream failed to produce a frame
    #[error("frame grab failed: {0}")]
    Frame(#[from] CameraError),
}

/// Failures while dispatching a recognition attempt
#[derive(Debug, Error)]
pub enum RecognizeError {
    /// Recognition was attempted before any frame was captured.
    /// Fully recoverable by capturing first.
    #[error("nothing captured yet")]
    NothingCaptured,

    /// A recognition attempt is already in flight; recognition is
    /// non-reentrant and overlapping calls are rejected outright
    #[error("a recognition attempt is already running")]
    Busy,

    /// The engine selector did not name a known pipeline
    #[error("unknown recognition engine '{0}'")]
    UnknownEngine(String),

    /// The local recognition engine itself faulted
    #[error("recognition engine failure: {0}")]
    Engine(String),

    /// The cloud service returned a structured error descriptor
    #[error("vision API error: {0}")]
    ApiReported(String),

    /// The cloud request never completed (distinct from an API-reported error)
    #[error("vision endpoint unreachable: {0}")]
    Transport(String),

    /// The captured frame could not be encoded for upload
    #[error("frame encoding failed: {0}")]
    Encode(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_error_names_facing_mode() {
        let err = CameraError::ConstraintUnsatisfiable(FacingMode::Environment);
        assert!(err.to_string().contains("environment"));
    }

    #[test]
    fn test_capture_error_wraps_camera_error() {
        let err: CaptureError = CameraError::Hardware("unplugged".into()).into();
        assert!(matches!(err, CaptureError::Frame(_)));
        assert!(err.to_string().contains("unplugged"));
    }

    #[test]
    fn test_transport_and_api_errors_are_distinct() {
        let api = RecognizeError::ApiReported("quota exceeded".into());
        let transport = RecognizeError::Transport("connection refused".into());
        assert_ne!(api.to_string(), transport.to_string());
    }
}
