//! Scripted camera collaborators for tests

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::Notify;

use crate::camera::{CameraDevice, CameraStream, FacingMode};
use crate::capture::CapturedFrame;
use crate::error::CameraError;

/// Native resolution of mock streams
pub const MOCK_WIDTH: u32 = 4;
pub const MOCK_HEIGHT: u32 = 6;

/// Behavior for one `open` call, consumed in order
pub enum OpenPlan {
    /// Return a stream immediately; the label shows up in drop log entries
    Succeed(&'static str),
    /// Exact facing constraint cannot be satisfied
    FailConstraint,
    /// Some other hardware failure
    FailHardware,
    /// Suspend until notified, then return a stream
    WaitThenSucceed(&'static str, Arc<Notify>),
}

/// Camera device whose `open` calls follow a scripted plan and append to a
/// shared event log ("open:<facing>", "drop:<label>").
pub struct MockDevice {
    plans: Mutex<VecDeque<OpenPlan>>,
    log: Arc<Mutex<Vec<String>>>,
}

impl MockDevice {
    pub fn new(plans: Vec<OpenPlan>) -> Self {
        Self {
            plans: Mutex::new(plans.into()),
            log: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn log(&self) -> Arc<Mutex<Vec<String>>> {
        self.log.clone()
    }

    fn stream(&self, label: &'static str, facing: FacingMode) -> Box<dyn CameraStream> {
        Box::new(MockStream {
            label,
            facing,
            log: self.log.clone(),
        })
    }
}

#[async_trait]
impl CameraDevice for MockDevice {
    async fn open(&self, facing: FacingMode) -> Result<Box<dyn CameraStream>, CameraError> {
        self.log.lock().push(format!("open:{facing}"));
        let plan = self
            .plans
            .lock()
            .pop_front()
            .unwrap_or(OpenPlan::Succeed("default"));
        match plan {
            OpenPlan::Succeed(label) => Ok(self.stream(label, facing)),
            OpenPlan::FailConstraint => Err(CameraError::ConstraintUnsatisfiable(facing)),
            OpenPlan::FailHardware => Err(CameraError::Hardware("device busy".into())),
            OpenPlan::WaitThenSucceed(label, gate) => {
                gate.notified().await;
                Ok(self.stream(label, facing))
            }
        }
    }
}

struct MockStream {
    label: &'static str,
    facing: FacingMode,
    log: Arc<Mutex<Vec<String>>>,
}

impl CameraStream for MockStream {
    fn facing(&self) -> FacingMode {
        self.facing
    }

    fn grab_frame(&mut self) -> Result<CapturedFrame, CameraError> {
        Ok(CapturedFrame::new(
            vec![128u8; (MOCK_WIDTH * MOCK_HEIGHT * 4) as usize],
            MOCK_WIDTH,
            MOCK_HEIGHT,
        ))
    }
}

impl Drop for MockStream {
    fn drop(&mut self) {
        self.log.lock().push(format!("drop:{}", self.label));
    }
}
