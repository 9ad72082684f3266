//! LLM Client: the single point of entry for all calls to the hosted multimodal model.
//!
//! ARCHITECTURAL RULE: No other module may call the inference API directly.
//! All model interactions MUST go through this module.
//!
//! Model: gpt-4.1 (hardcoded, not configurable)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

pub mod prompts;

const RESPONSES_PATH: &str = "/v1/responses";
/// The model used for every estimate. Must accept text and image input.
pub const MODEL: &str = "gpt-4.1";
/// Most deterministic sampling setting. A hint only; the hosted model is not ours.
const TEMPERATURE: f32 = 0.0;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Could not decode API response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// One typed part of a message's content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputPart {
    InputText { text: String },
    InputImage { image_url: String },
}

impl InputPart {
    pub fn text(text: impl Into<String>) -> Self {
        InputPart::InputText { text: text.into() }
    }

    pub fn image(image_url: impl Into<String>) -> Self {
        InputPart::InputImage {
            image_url: image_url.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ResponsesRequest<'a> {
    model: &'a str,
    input: Vec<InputMessage<'a>>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct InputMessage<'a> {
    role: &'a str,
    content: &'a [InputPart],
}

#[derive(Debug, Deserialize)]
pub struct LlmResponse {
    #[serde(default)]
    pub output: Vec<OutputItem>,
    pub usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
pub struct OutputItem {
    #[serde(rename = "type")]
    pub item_type: String,
    #[serde(default)]
    pub content: Vec<OutputContent>,
}

#[derive(Debug, Deserialize)]
pub struct OutputContent {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Usage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

impl LlmResponse {
    /// Joins every `output_text` part of every message item, trimmed.
    pub fn output_text(&self) -> String {
        self.output
            .iter()
            .filter(|item| item.item_type == "message")
            .flat_map(|item| item.content.iter())
            .filter(|c| c.content_type == "output_text")
            .filter_map(|c| c.text.as_deref())
            .collect::<String>()
            .trim()
            .to_string()
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Anything that can turn a system instruction plus user content into model text.
///
/// The estimator only depends on this trait, so the hosted model can be swapped
/// for a stub without touching callers.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    async fn complete(&self, system: &str, content: &[InputPart]) -> Result<String, LlmError>;
}

/// Wraps the Responses API of the hosted model. One request per call, no retries.
#[derive(Clone)]
pub struct LlmClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: String, timeout: Duration) -> Result<Self, LlmError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Makes a raw call to the model, returning the full response object.
    pub async fn call(&self, system: &str, content: &[InputPart]) -> Result<LlmResponse, LlmError> {
        let system_parts = [InputPart::text(system)];
        let request_body = ResponsesRequest {
            model: MODEL,
            input: vec![
                InputMessage {
                    role: "system",
                    content: &system_parts,
                },
                InputMessage {
                    role: "user",
                    content,
                },
            ],
            temperature: TEMPERATURE,
        };

        let response = self
            .client
            .post(format!("{}{RESPONSES_PATH}", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("LLM API returned {}: {}", status, body);
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let llm_response: LlmResponse = serde_json::from_str(&body)?;

        if let Some(usage) = &llm_response.usage {
            debug!(
                "LLM call succeeded: input_tokens={}, output_tokens={}",
                usage.input_tokens, usage.output_tokens
            );
        }

        Ok(llm_response)
    }
}

/// An answer with no text (e.g. a refusal) comes back as `""`; the caller decides what it means.
#[async_trait]
impl InferenceBackend for LlmClient {
    async fn complete(&self, system: &str, content: &[InputPart]) -> Result<String, LlmError> {
        Ok(self.call(system, content).await?.output_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> LlmClient {
        LlmClient::new("test-key".to_string(), server.uri(), DEFAULT_TIMEOUT).unwrap()
    }

    fn message_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "resp_1",
            "object": "response",
            "output": [{
                "type": "message",
                "role": "assistant",
                "content": [{"type": "output_text", "text": text, "annotations": []}]
            }],
            "usage": {"input_tokens": 120, "output_tokens": 30, "total_tokens": 150}
        })
    }

    #[test]
    fn test_input_parts_serialize_with_type_tags() {
        let parts = vec![
            InputPart::text("Job description: mow"),
            InputPart::image("data:image/jpeg;base64,YWJj"),
        ];
        let json = serde_json::to_value(&parts).unwrap();
        assert_eq!(
            json,
            serde_json::json!([
                {"type": "input_text", "text": "Job description: mow"},
                {"type": "input_image", "image_url": "data:image/jpeg;base64,YWJj"}
            ])
        );
    }

    #[test]
    fn test_output_text_skips_non_message_items() {
        let response: LlmResponse = serde_json::from_value(serde_json::json!({
            "output": [
                {"type": "reasoning", "summary": []},
                {"type": "message", "content": [
                    {"type": "output_text", "text": "  {\"summary\": "},
                    {"type": "refusal", "refusal": "no"},
                    {"type": "output_text", "text": "\"NA\"}\n"}
                ]}
            ]
        }))
        .unwrap();
        assert_eq!(response.output_text(), r#"{"summary": "NA"}"#);
        assert!(response.usage.is_none());
    }

    #[tokio::test]
    async fn test_request_shape_and_auth() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_partial_json(serde_json::json!({
                "model": MODEL,
                "temperature": 0.0,
                "input": [
                    {"role": "system", "content": [{"type": "input_text", "text": "be a planner"}]},
                    {"role": "user", "content": [{"type": "input_text", "text": "Job description: x"}]}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_body("hello")))
            .expect(1)
            .mount(&server)
            .await;

        let text = client_for(&server)
            .complete("be a planner", &[InputPart::text("Job description: x")])
            .await
            .unwrap();
        assert_eq!(text, "hello");
    }

    #[tokio::test]
    async fn test_api_error_message_is_extracted() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/v1/responses"))
            .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error"}
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete("sys", &[InputPart::text("x")])
            .await
            .unwrap_err();
        match err {
            LlmError::Api { status, message } => {
                assert_eq!(status, 401);
                assert_eq!(message, "Incorrect API key provided");
            }
            other => panic!("Expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_rate_limit_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete("sys", &[InputPart::text("x")])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Api { status: 429, ref message } if message == "slow down"));
    }

    #[tokio::test]
    async fn test_blank_output_is_returned_as_empty_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(message_body("   ")))
            .mount(&server)
            .await;

        let text = client_for(&server)
            .complete("sys", &[InputPart::text("x")])
            .await
            .unwrap();
        assert_eq!(text, "");
    }

    #[tokio::test]
    async fn test_refusal_only_output_is_empty_text() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "output": [{
                    "type": "message",
                    "role": "assistant",
                    "content": [{"type": "refusal", "refusal": "I can't help with that."}]
                }]
            })))
            .mount(&server)
            .await;

        let text = client_for(&server)
            .complete("sys", &[InputPart::text("x")])
            .await
            .unwrap();
        assert!(text.is_empty());
    }

    #[tokio::test]
    async fn test_non_json_success_body_is_decode_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete("sys", &[InputPart::text("x")])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Decode(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_applied() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(message_body("late"))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let client =
            LlmClient::new("k".to_string(), server.uri(), Duration::from_millis(50)).unwrap();
        let err = client
            .complete("sys", &[InputPart::text("x")])
            .await
            .unwrap_err();
        assert!(matches!(err, LlmError::Http(ref e) if e.is_timeout()));
    }
}
