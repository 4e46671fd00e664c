//! Camera Layer
//!
//! Owns the lifecycle of the single live capture stream. The hardware itself
//! is an external collaborator behind the [`CameraDevice`] trait; this module
//! owns start/stop/switch sequencing, the environment -> user fallback, and
//! the guarantee that at most one stream is ever open.

pub mod session;
pub mod still_image;

#[cfg(test)]
pub(crate) mod testutil;

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::capture::frame::CapturedFrame;
use crate::error::CameraError;

pub use session::{CameraSessionManager, SessionState};
pub use still_image::StillImageCamera;

/// Logical camera selector: rear-facing (`environment`) vs front-facing (`user`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacingMode {
    /// Rear camera, the usual choice for photographing a card
    #[default]
    Environment,
    /// Front camera
    User,
}

impl FacingMode {
    /// The opposite facing mode
    pub fn toggled(self) -> Self {
        match self {
            FacingMode::Environment => FacingMode::User,
            FacingMode::User => FacingMode::Environment,
        }
    }
}

impl std::str::FromStr for FacingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "environment" => Ok(FacingMode::Environment),
            "user" => Ok(FacingMode::User),
            other => Err(format!("unknown facing mode '{other}'")),
        }
    }
}

impl fmt::Display for FacingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FacingMode::Environment => write!(f, "environment"),
            FacingMode::User => write!(f, "user"),
        }
    }
}

/// Camera hardware collaborator.
///
/// `open` must match the requested facing mode exactly; if no device
/// satisfies it, the implementation fails with
/// [`CameraError::ConstraintUnsatisfiable`] rather than substituting.
#[async_trait]
pub trait CameraDevice: Send + Sync {
    async fn open(&self, facing: FacingMode) -> Result<Box<dyn CameraStream>, CameraError>;
}

/// A live hardware stream. Dropping the stream releases the hardware.
pub trait CameraStream: Send {
    /// The facing mode this stream was opened with
    fn facing(&self) -> FacingMode;

    /// Snapshot the current visual frame at the stream's native resolution
    fn grab_frame(&mut self) -> Result<CapturedFrame, CameraError>;
}
