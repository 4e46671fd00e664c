//! Cloud text-detection path
//!
//! Encodes the captured frame as a base64 JPEG inside the `images:annotate`
//! JSON envelope, issues a single POST, and maps the structured response to
//! one of three outcomes: API-reported error, full-text annotation, or no
//! text detected. Transport failures are kept distinct from API errors.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::capture::CapturedFrame;
use crate::config::CloudSettings;
use crate::error::RecognizeError;

/// Request envelope for the annotate endpoint

#[derive(Debug, Serialize)]
pub struct AnnotateRequest {
    pub requests: Vec<ImageRequest>,
}

#[derive(Debug, Serialize)]
pub struct ImageRequest {
    pub image: ImageContent,
    pub features: Vec<Feature>,
}

#[derive(Debug, Serialize)]
pub struct ImageContent {
    /// Base64-encoded JPEG payload
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub kind: String,
}

/// Response envelope: either a top-level error, a full-text annotation in
/// the first per-image response, or neither.

#[derive(Debug, Default, Deserialize)]
pub struct AnnotateResponse {
    #[serde(default)]
    pub error: Option<ApiErrorBody>,
    #[serde(default)]
    pub responses: Vec<AnnotateResult>,
}

#[derive(Debug, Deserialize)]
pub struct ApiErrorBody {
    pub message: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct AnnotateResult {
    #[serde(rename = "fullTextAnnotation")]
    pub full_text_annotation: Option<FullTextAnnotation>,
}

#[derive(Debug, Deserialize)]
pub struct FullTextAnnotation {
    pub text: String,
}

/// Outcome of one cloud detection round trip
#[derive(Debug, PartialEq, Eq)]
pub enum TextDetection {
    /// Aggregated full-text annotation
    Text(String),
    /// The service saw no text; a valid empty result, not an error
    NoText,
}

/// Network transport seam so tests can script responses
#[async_trait]
pub trait VisionTransport: Send + Sync {
    async fn annotate(
        &self,
        url: &str,
        request: &AnnotateRequest,
    ) -> Result<AnnotateResponse, RecognizeError>;
}

/// reqwest-backed transport used in production
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for HttpTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisionTransport for HttpTransport {
    async fn annotate(
        &self,
        url: &str,
        request: &AnnotateRequest,
    ) -> Result<AnnotateResponse, RecognizeError> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| RecognizeError::Transport(e.to_string()))?;

        // The service reports its own failures inside the JSON body, so any
        // parseable body flows through; only transport-level problems land
        // in the Transport variant.
        response
            .json()
            .await
            .map_err(|e| RecognizeError::Transport(e.to_string()))
    }
}

/// Client for the cloud text-detection collaborator
pub struct CloudVisionClient {
    transport: Box<dyn VisionTransport>,
    endpoint: String,
}

impl CloudVisionClient {
    pub fn new(settings: &CloudSettings) -> Self {
        Self::with_transport(Box::new(HttpTransport::new()), settings.annotate_url())
    }

    pub fn with_transport(transport: Box<dyn VisionTransport>, endpoint: String) -> Self {
        Self {
            transport,
            endpoint,
        }
    }

    /// One round trip: encode, POST, branch on the structured response
    pub async fn detect_text(
        &self,
        frame: &CapturedFrame,
    ) -> Result<TextDetection, RecognizeError> {
        let jpeg = encode_jpeg(frame)?;
        debug!("uploading {}x{} frame ({} JPEG bytes)", frame.width, frame.height, jpeg.len());

        let request = AnnotateRequest {
            requests: vec![ImageRequest {
                image: ImageContent {
                    content: BASE64.encode(&jpeg),
                },
                features: vec![Feature {
                    kind: "TEXT_DETECTION".into(),
                }],
            }],
        };

        let response = self.transport.annotate(&self.endpoint, &request).await?;

        if let Some(error) = response.error {
            return Err(RecognizeError::ApiReported(error.message));
        }

        let annotation = response
            .responses
            .into_iter()
            .next()
            .and_then(|r| r.full_text_annotation);

        Ok(match annotation {
            Some(annotation) => TextDetection::Text(annotation.text),
            None => TextDetection::NoText,
        })
    }
}

/// Compress the RGBA frame into a JPEG payload
fn encode_jpeg(frame: &CapturedFrame) -> Result<Vec<u8>, RecognizeError> {
    let image = image::RgbaImage::from_raw(frame.width, frame.height, frame.data.clone())
        .ok_or_else(|| RecognizeError::Encode("pixel buffer does not match dimensions".into()))?;
    let rgb = image::DynamicImage::ImageRgba8(image).to_rgb8();

    let mut bytes = Vec::new();
    rgb.write_to(
        &mut std::io::Cursor::new(&mut bytes),
        image::ImageFormat::Jpeg,
    )
    .map_err(|e| RecognizeError::Encode(e.to_string()))?;
    Ok(bytes)
}

/// Transport scripted with canned JSON responses, shared by dispatcher tests
#[cfg(test)]
pub(crate) struct MockTransport {
    responses: parking_lot::Mutex<
        std::collections::VecDeque<Result<serde_json::Value, RecognizeError>>,
    >,
}

#[cfg(test)]
impl MockTransport {
    pub(crate) fn new(responses: Vec<Result<serde_json::Value, RecognizeError>>) -> Self {
        Self {
            responses: parking_lot::Mutex::new(responses.into()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl VisionTransport for MockTransport {
    async fn annotate(
        &self,
        _url: &str,
        _request: &AnnotateRequest,
    ) -> Result<AnnotateResponse, RecognizeError> {
        let next = self
            .responses
            .lock()
            .pop_front()
            .expect("unexpected annotate call");
        next.map(|value| serde_json::from_value(value).expect("scripted response must parse"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn test_frame() -> CapturedFrame {
        CapturedFrame::new(vec![255u8; 4 * 4 * 4], 4, 4)
    }

    fn client(responses: Vec<Result<serde_json::Value, RecognizeError>>) -> CloudVisionClient {
        CloudVisionClient::with_transport(
            Box::new(MockTransport::new(responses)),
            "https://vision.invalid/v1/images:annotate".into(),
        )
    }

    #[test]
    fn test_encode_jpeg_magic_bytes() {
        let jpeg = encode_jpeg(&test_frame()).unwrap();
        assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_encode_rejects_mismatched_buffer() {
        let frame = CapturedFrame {
            data: vec![0u8; 4],
            width: 2,
            height: 2,
            timestamp: std::time::Instant::now(),
        };
        assert!(matches!(
            encode_jpeg(&frame),
            Err(RecognizeError::Encode(_))
        ));
    }

    #[test]
    fn test_request_envelope_shape() {
        let request = AnnotateRequest {
            requests: vec![ImageRequest {
                image: ImageContent {
                    content: "aGVsbG8=".into(),
                },
                features: vec![Feature {
                    kind: "TEXT_DETECTION".into(),
                }],
            }],
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["requests"][0]["features"][0]["type"], "TEXT_DETECTION");
        assert_eq!(value["requests"][0]["image"]["content"], "aGVsbG8=");
    }

    #[test]
    fn test_parse_error_response() {
        let response: AnnotateResponse =
            serde_json::from_value(json!({"error": {"message": "X"}})).unwrap();
        assert_eq!(response.error.unwrap().message, "X");
    }

    #[test]
    fn test_parse_full_text_response() {
        let response: AnnotateResponse = serde_json::from_value(
            json!({"responses": [{"fullTextAnnotation": {"text": "Y"}}]}),
        )
        .unwrap();
        let annotation = response.responses[0].full_text_annotation.as_ref().unwrap();
        assert_eq!(annotation.text, "Y");
    }

    #[test]
    fn test_parse_empty_responses() {
        let response: AnnotateResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.error.is_none());
        assert!(response.responses.is_empty());

        let response: AnnotateResponse =
            serde_json::from_value(json!({"responses": [{}]})).unwrap();
        assert!(response.responses[0].full_text_annotation.is_none());
    }

    #[tokio::test]
    async fn test_detect_text_api_error() {
        let client = client(vec![Ok(json!({"error": {"message": "quota exceeded"}}))]);
        let result = client.detect_text(&test_frame()).await;
        match result {
            Err(RecognizeError::ApiReported(message)) => assert_eq!(message, "quota exceeded"),
            other => panic!("expected ApiReported, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_detect_text_full_annotation() {
        let client = client(vec![Ok(
            json!({"responses": [{"fullTextAnnotation": {"text": "Acme Corp"}}]}),
        )]);
        let detection = client.detect_text(&test_frame()).await.unwrap();
        assert_eq!(detection, TextDetection::Text("Acme Corp".into()));
    }

    #[tokio::test]
    async fn test_detect_text_nothing_found() {
        let client = client(vec![Ok(json!({"responses": [{}]}))]);
        let detection = client.detect_text(&test_frame()).await.unwrap();
        assert_eq!(detection, TextDetection::NoText);
    }

    #[tokio::test]
    async fn test_detect_text_transport_failure() {
        let client = client(vec![Err(RecognizeError::Transport(
            "connection refused".into(),
        ))]);
        let result = client.detect_text(&test_frame()).await;
        assert!(matches!(result, Err(RecognizeError::Transport(_))));
    }
}
