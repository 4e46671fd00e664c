//! Local recognition engine seam
//!
//! The engine itself is an external collaborator: it takes a pixel buffer, a
//! language hint, and a progress-sink capability, and terminates with either
//! extracted text or a failure. The bundled adapter shells out to the
//! `tesseract` CLI; tests inject deterministic engines instead.

use async_trait::async_trait;
use tracing::debug;

use crate::capture::CapturedFrame;
use crate::error::RecognizeError;

/// Sink for fractional-completion progress events.
///
/// Injected rather than ambient so callers (and tests) decide how progress
/// is projected.
pub trait ProgressSink: Send + Sync {
    /// `fraction` is in `0.0..=1.0`
    fn progress(&self, fraction: f32);
}

/// External local recognition engine.
///
/// May emit zero or more progress events before terminating with extracted
/// text (possibly empty) or a failure.
#[async_trait]
pub trait LocalOcrEngine: Send + Sync {
    async fn recognize(
        &self,
        frame: &CapturedFrame,
        language: &str,
        progress: &dyn ProgressSink,
    ) -> Result<String, RecognizeError>;
}

/// Adapter around the `tesseract` command-line binary.
///
/// Writes the frame to a temporary PNG, runs `tesseract <file> stdout -l
/// <language>`, and returns the captured stdout. The CLI reports no
/// incremental progress, so no progress events are emitted.
pub struct TesseractCliEngine {
    binary: String,
}

impl TesseractCliEngine {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }
}

impl Default for TesseractCliEngine {
    fn default() -> Self {
        Self::new("tesseract")
    }
}

#[async_trait]
impl LocalOcrEngine for TesseractCliEngine {
    async fn recognize(
        &self,
        frame: &CapturedFrame,
        language: &str,
        _progress: &dyn ProgressSink,
    ) -> Result<String, RecognizeError> {
        let image =
            image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
                .ok_or_else(|| {
                    RecognizeError::Engine("pixel buffer does not match dimensions".into())
                })?;

        let input = std::env::temp_dir().join(format!("cardscan_{}.png", std::process::id()));
        image
            .save(&input)
            .map_err(|e| RecognizeError::Engine(format!("writing temp image: {e}")))?;

        debug!("running {} on {} (-l {})", self.binary, input.display(), language);
        let output = tokio::process::Command::new(&self.binary)
            .arg(&input)
            .arg("stdout")
            .arg("-l")
            .arg(language)
            .arg("--psm")
            .arg("3")
            .output()
            .await;
        let _ = std::fs::remove_file(&input);

        let output =
            output.map_err(|e| RecognizeError::Engine(format!("running {}: {e}", self.binary)))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(RecognizeError::Engine(format!(
                "{} exited with {}: {}",
                self.binary,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoopSink;
    impl ProgressSink for NoopSink {
        fn progress(&self, _fraction: f32) {}
    }

    fn test_frame() -> CapturedFrame {
        CapturedFrame::new(vec![255u8; 2 * 2 * 4], 2, 2)
    }

    #[tokio::test]
    async fn test_missing_binary_is_engine_failure() {
        let engine = TesseractCliEngine::new("cardscan-no-such-binary");
        let result = engine.recognize(&test_frame(), "jpn+eng", &NoopSink).await;
        assert!(matches!(result, Err(RecognizeError::Engine(_))));
    }

    #[tokio::test]
    async fn test_mismatched_buffer_is_engine_failure() {
        let engine = TesseractCliEngine::default();
        let frame = CapturedFrame {
            data: vec![0u8; 4],
            width: 2,
            height: 2,
            timestamp: std::time::Instant::now(),
        };
        let result = engine.recognize(&frame, "eng", &NoopSink).await;
        assert!(matches!(result, Err(RecognizeError::Engine(_))));
    }
}
