//! Camera session state machine
//!
//! At most one hardware stream is ever open. Starting a new session releases
//! the previous stream before acquiring the next one, and every start request
//! carries a generation token so a slow, superseded request can never clobber
//! a newer active session.

use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::camera::{CameraDevice, FacingMode};
use crate::capture::{CapturedFrame, FrameStore};
use crate::error::{CameraError, CaptureError};
use crate::status::{Severity, StatusReporter};

use super::CameraStream;

/// Observable state of the camera session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionState {
    /// No stream has been requested yet, or the last one was released
    #[default]
    NoSession,
    /// A hardware stream request is in flight
    Starting,
    /// A live stream is available for capture
    Active,
    /// The last start attempt failed; only a new start/switch recovers
    Failed,
}

struct Inner {
    stream: Option<Box<dyn CameraStream>>,
    facing: FacingMode,
    state: SessionState,
    generation: u64,
}

/// Owns the single live capture stream and its lifecycle.
///
/// All hardware mutation (stop/replace) happens here; no other component
/// holds or releases the stream handle.
pub struct CameraSessionManager {
    device: Arc<dyn CameraDevice>,
    status: StatusReporter,
    store: FrameStore,
    inner: Mutex<Inner>,
}

impl CameraSessionManager {
    pub fn new(
        device: Arc<dyn CameraDevice>,
        store: FrameStore,
        status: StatusReporter,
    ) -> Self {
        Self {
            device,
            status,
            store,
            inner: Mutex::new(Inner {
                stream: None,
                facing: FacingMode::default(),
                state: SessionState::NoSession,
                generation: 0,
            }),
        }
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.inner.lock().state
    }

    /// Currently remembered facing mode
    pub fn facing(&self) -> FacingMode {
        self.inner.lock().facing
    }

    /// Request a hardware stream matching `facing` exactly.
    ///
    /// Any existing stream is released first. If no device satisfies the
    /// exact constraint and `facing` is the rear camera, retries exactly once
    /// with the front camera (laptops usually have no rear camera). Any other
    /// failure, or a second failure, leaves the session in `Failed`.
    pub async fn start(&self, facing: FacingMode) -> Result<(), CameraError> {
        let generation = {
            let mut inner = self.inner.lock();
            inner.generation += 1;
            // Release the previous hardware before requesting the new stream
            // so two streams never coexist.
            if let Some(stream) = inner.stream.take() {
                debug!("releasing previous {} camera stream", stream.facing());
            }
            inner.state = SessionState::Starting;
            inner.facing = facing;
            inner.generation
        };
        self.status
            .set(format!("Starting {facing} camera..."), Severity::Progress);

        let mut attempt = facing;
        let mut retried = false;
        loop {
            match self.device.open(attempt).await {
                Ok(stream) => {
                    let mut inner = self.inner.lock();
                    if inner.generation != generation {
                        // A newer start/switch superseded this request; the
                        // freshly opened stream is dropped, releasing it.
                        debug!("discarding stale camera stream for superseded request");
                        return Ok(());
                    }
                    inner.stream = Some(stream);
                    inner.facing = attempt;
                    inner.state = SessionState::Active;
                    drop(inner);
                    // A new session invalidates any prior capture.
                    self.store.invalidate();
                    self.status.set("Camera ready", Severity::Info);
                    return Ok(());
                }
                Err(CameraError::ConstraintUnsatisfiable(_))
                    if attempt == FacingMode::Environment && !retried =>
                {
                    {
                        let mut inner = self.inner.lock();
                        if inner.generation != generation {
                            debug!("superseded start request, skipping fallback");
                            return Ok(());
                        }
                        inner.facing = FacingMode::User;
                    }
                    warn!("rear camera unavailable, falling back to front camera");
                    self.status.set(
                        "Rear camera unavailable, trying front camera...",
                        Severity::Progress,
                    );
                    attempt = FacingMode::User;
                    retried = true;
                }
                Err(err) => {
                    let mut inner = self.inner.lock();
                    if inner.generation != generation {
                        debug!("superseded start request, ignoring late failure");
                        return Ok(());
                    }
                    inner.state = SessionState::Failed;
                    drop(inner);
                    self.status.set(
                        "Cannot access the camera. Check device permissions.",
                        Severity::Error,
                    );
                    return Err(err);
                }
            }
        }
    }

    /// Toggle the remembered facing mode and restart with the new one.
    ///
    /// This is the only way facing mode changes outside the fallback path.
    pub async fn switch_facing(&self) -> Result<(), CameraError> {
        let next = self.inner.lock().facing.toggled();
        debug!("switching camera facing to {}", next);
        self.start(next).await
    }

    /// Snapshot the current frame from the live stream.
    ///
    /// Only valid while `Active`; used by the frame-capture component, which
    /// owns the resulting buffer.
    pub fn grab_frame(&self) -> Result<CapturedFrame, CaptureError> {
        let mut inner = self.inner.lock();
        if inner.state != SessionState::Active {
            return Err(CaptureError::NoActiveSession);
        }
        let stream = inner.stream.as_mut().ok_or(CaptureError::NoActiveSession)?;
        Ok(stream.grab_frame()?)
    }
}
