//! Frame Capture Layer
//!
//! Snapshots the current live video frame into a static image buffer and
//! holds it until recognition consumes it. "A capture exists" is the sole
//! gate for recognition; the session manager clears it whenever a new
//! session becomes active.

pub mod frame;

use parking_lot::RwLock;
use std::sync::Arc;

use crate::camera::CameraSessionManager;
use crate::error::CaptureError;
use crate::status::{Severity, StatusReporter};

pub use frame::CapturedFrame;

/// Shared slot holding the most recent captured frame, if any.
///
/// Presence of a frame doubles as the captured flag. The session manager
/// invalidates it on every new session; the recognition dispatcher borrows
/// (clones) it without mutating.
#[derive(Debug, Clone, Default)]
pub struct FrameStore {
    inner: Arc<RwLock<Option<CapturedFrame>>>,
}

impl FrameStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the stored frame
    pub fn store(&self, frame: CapturedFrame) {
        *self.inner.write() = Some(frame);
    }

    /// Drop any stored frame (new session started)
    pub fn invalidate(&self) {
        *self.inner.write() = None;
    }

    /// Whether a capture currently exists
    pub fn has_capture(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Clone of the stored frame, if any
    pub fn snapshot(&self) -> Option<CapturedFrame> {
        self.inner.read().clone()
    }
}

/// Frame capture component: snapshots the live stream into the store
pub struct FrameCapture {
    session: Arc<CameraSessionManager>,
    store: FrameStore,
    status: StatusReporter,
}

impl FrameCapture {
    pub fn new(
        session: Arc<CameraSessionManager>,
        store: FrameStore,
        status: StatusReporter,
    ) -> Self {
        Self {
            session,
            store,
            status,
        }
    }

    /// Snapshot the current live frame at the stream's native resolution.
    ///
    /// Fails with [`CaptureError::NoActiveSession`] when no session is
    /// active; the caller surfaces that as a user prompt, not a crash.
    pub fn capture(&self) -> Result<(u32, u32), CaptureError> {
        let frame = self.session.grab_frame()?;
        let dimensions = frame.dimensions();
        self.store.store(frame);
        self.status.set(
            "Frame captured. Ready to recognize.",
            Severity::Success,
        );
        Ok(dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_starts_empty() {
        let store = FrameStore::new();
        assert!(!store.has_capture());
        assert!(store.snapshot().is_none());
    }

    #[test]
    fn test_store_and_invalidate() {
        let store = FrameStore::new();
        store.store(CapturedFrame::new(vec![0u8; 4], 1, 1));
        assert!(store.has_capture());

        store.invalidate();
        assert!(!store.has_capture());
    }

    #[test]
    fn test_snapshot_clones_frame() {
        let store = FrameStore::new();
        store.store(CapturedFrame::new(vec![1, 2, 3, 4], 1, 1));

        let snapshot = store.snapshot().unwrap();
        assert_eq!(snapshot.data, vec![1, 2, 3, 4]);
        // Original is still present after snapshotting
        assert!(store.has_capture());
    }
}
