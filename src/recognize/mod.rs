//! Recognition Dispatcher
//!
//! Routes a captured frame to exactly one of two recognition pipelines
//! (local engine or cloud endpoint) and guarantees exactly one terminal
//! status update and at most one output-field write per invocation.
//! Recognition is non-reentrant: overlapping calls are rejected.

pub mod cloud;
pub mod local;
pub mod preprocess;

use std::fmt;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capture::{CapturedFrame, FrameStore};
use crate::config::RecognitionSettings;
use crate::error::RecognizeError;
use crate::status::{Severity, StatusReporter, TextField};

pub use cloud::{CloudVisionClient, HttpTransport, TextDetection, VisionTransport};
pub use local::{LocalOcrEngine, ProgressSink, TesseractCliEngine};

/// The user's choice between the two recognition pipelines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineSelector {
    /// In-process recognition engine
    #[default]
    LocalOcr,
    /// Remote text-detection endpoint
    CloudVision,
}

impl FromStr for EngineSelector {
    type Err = RecognizeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local-ocr" => Ok(EngineSelector::LocalOcr),
            "cloud-vision" => Ok(EngineSelector::CloudVision),
            other => Err(RecognizeError::UnknownEngine(other.to_string())),
        }
    }
}

impl fmt::Display for EngineSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineSelector::LocalOcr => write!(f, "local-ocr"),
            EngineSelector::CloudVision => write!(f, "cloud-vision"),
        }
    }
}

enum Outcome {
    /// Extracted text, possibly empty
    Text(String),
    /// The cloud service saw no text at all
    NoText,
}

/// Releases the busy flag on every exit path
struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Projects engine progress events into the status display
struct StatusProgress {
    status: StatusReporter,
}

impl ProgressSink for StatusProgress {
    fn progress(&self, fraction: f32) {
        let percent = (fraction * 100.0).floor() as u32;
        self.status
            .set(format!("Recognizing... ({percent}%)"), Severity::Progress);
    }
}

/// Routes captured frames into one of the two recognition pipelines
pub struct RecognitionDispatcher {
    local: Box<dyn LocalOcrEngine>,
    cloud: CloudVisionClient,
    store: FrameStore,
    status: StatusReporter,
    output: TextField,
    busy: AtomicBool,
    language: String,
    preprocess: bool,
}

impl RecognitionDispatcher {
    pub fn new(
        local: Box<dyn LocalOcrEngine>,
        cloud: CloudVisionClient,
        store: FrameStore,
        status: StatusReporter,
        output: TextField,
        settings: &RecognitionSettings,
    ) -> Self {
        Self {
            local,
            cloud,
            store,
            status,
            output,
            busy: AtomicBool::new(false),
            language: settings.language.clone(),
            preprocess: settings.preprocess,
        }
    }

    /// Run one recognition attempt over the captured frame.
    ///
    /// Requires a prior capture; rejects overlapping calls. On failure the
    /// output field is left untouched and the captured frame survives, so
    /// the user can retry without re-capturing.
    pub async fn recognize(&self, selector: EngineSelector) -> Result<(), RecognizeError> {
        if self.busy.swap(true, Ordering::Acquire) {
            return Err(RecognizeError::Busy);
        }
        let _guard = BusyGuard(&self.busy);

        let Some(frame) = self.store.snapshot() else {
            return Err(RecognizeError::NothingCaptured);
        };

        debug!("dispatching recognition to {}", selector);
        self.status.set("Recognizing...", Severity::Progress);

        let outcome = match selector {
            EngineSelector::LocalOcr => self.run_local(&frame).await,
            EngineSelector::CloudVision => self.run_cloud(&frame).await,
        };

        match outcome {
            Ok(Outcome::Text(text)) => {
                let engine = match selector {
                    EngineSelector::LocalOcr => "local engine",
                    EngineSelector::CloudVision => "cloud engine",
                };
                self.status
                    .set(format!("Recognition complete ({engine})"), Severity::Success);
                self.output.set(text);
                Ok(())
            }
            Ok(Outcome::NoText) => {
                self.status.set("No text detected.", Severity::Info);
                self.output.set("");
                Ok(())
            }
            Err(err) => {
                self.status.set(err.to_string(), Severity::Error);
                Err(err)
            }
        }
    }

    async fn run_local(&self, frame: &CapturedFrame) -> Result<Outcome, RecognizeError> {
        let frame = if self.preprocess {
            self.status.set("Preparing image...", Severity::Progress);
            CapturedFrame::new(
                preprocess::binarize_for_ocr(&frame.data, frame.width, frame.height),
                frame.width,
                frame.height,
            )
        } else {
            frame.clone()
        };

        let sink = StatusProgress {
            status: self.status.clone(),
        };
        let text = self.local.recognize(&frame, &self.language, &sink).await?;
        Ok(Outcome::Text(text))
    }

    async fn run_cloud(&self, frame: &CapturedFrame) -> Result<Outcome, RecognizeError> {
        match self.cloud.detect_text(frame).await? {
            TextDetection::Text(text) => Ok(Outcome::Text(text)),
            TextDetection::NoText => Ok(Outcome::NoText),
        }
    }
}
