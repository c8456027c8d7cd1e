use crate::constants::{endpoints, retry};
use crate::error::{ConsoleError, Result};
use crate::llm::traits::*;
use reqwest::header::HeaderValue;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

const GENERATE_FAILED: &str = "Failed to generate content";
const CHAT_FAILED: &str = "Failed to generate chat response";

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            base_url: endpoints::GEMINI_BASE_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ConsoleError::Config(format!("Failed to build HTTP client: {e}")))?;
        Ok(self)
    }

    fn endpoint(&self, model_id: &str) -> String {
        format!(
            "{}/models/{}:{}",
            self.base_url,
            model_id,
            endpoints::GENERATE_CONTENT_METHOD
        )
    }

    /// Build the JSON body for a generation request.
    pub fn build_request_body(
        history: &[Message],
        prompt: &str,
        parameters: &GenerationParameters,
    ) -> GenerateContentRequest {
        let mut contents: Vec<Content> = history
            .iter()
            .map(|m| Content::text(m.role, &m.content))
            .collect();
        contents.push(Content::text(Role::User, prompt));

        let params = parameters.sanitized();
        GenerateContentRequest {
            contents,
            generation_config: GenerationConfig {
                temperature: params.temperature,
                top_p: params.top_p,
                top_k: params.top_k,
                max_output_tokens: params.max_tokens,
            },
        }
    }

    async fn send(
        &self,
        model_id: &str,
        body: &GenerateContentRequest,
        fallback_message: &str,
    ) -> Result<String> {
        tracing::debug!(
            model = model_id,
            contents = body.contents.len(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint(model_id))
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let retry_after = parse_retry_after(response.headers().get(retry::RETRY_AFTER_HEADER));
            let body_text = response.text().await.unwrap_or_default();
            let message = server_error_message(&body_text)
                .unwrap_or_else(|| fallback_message.to_string());
            tracing::debug!(model = model_id, status = status.as_u16(), "generation rejected");
            return Err(ConsoleError::Generation {
                status: Some(status.as_u16()),
                message,
                retry_after,
            });
        }

        let response_text = response.text().await?;
        let payload: Value = serde_json::from_str(&response_text)
            .map_err(|e| ConsoleError::MalformedResponse(format!("response is not JSON: {e}")))?;

        parse_response(&payload)
    }
}

#[async_trait::async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(
        &self,
        model_id: &str,
        prompt: &str,
        parameters: &GenerationParameters,
    ) -> Result<String> {
        let body = Self::build_request_body(&[], prompt, parameters);
        self.send(model_id, &body, GENERATE_FAILED).await
    }

    async fn chat(
        &self,
        model_id: &str,
        history: &[Message],
        prompt: &str,
        parameters: &GenerationParameters,
    ) -> Result<String> {
        let body = Self::build_request_body(history, prompt, parameters);
        self.send(model_id, &body, CHAT_FAILED).await
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
pub struct Content {
    pub role: &'static str,
    pub parts: Vec<Part>,
}

impl Content {
    fn text(role: Role, text: &str) -> Self {
        Self {
            role: role.wire_name(),
            parts: vec![Part {
                text: text.to_string(),
            }],
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<PartResponse>>,
}

#[derive(Debug, Deserialize)]
struct PartResponse {
    text: Option<String>,
}

#[derive(Deserialize)]
struct ErrorWrapper {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Extract the generated text from a `generateContent` payload.
///
/// No candidates is `EmptyResponse`; a first candidate without parts is
/// `MalformedResponse`. A first part without `text` yields an empty string.
pub fn parse_response(raw: &Value) -> Result<String> {
    let response: GenerateContentResponse = serde_json::from_value(raw.clone())
        .map_err(|e| ConsoleError::MalformedResponse(e.to_string()))?;

    let candidate = response
        .candidates
        .and_then(|candidates| candidates.into_iter().next())
        .ok_or(ConsoleError::EmptyResponse)?;

    let first_part = candidate
        .content
        .and_then(|content| content.parts)
        .and_then(|parts| parts.into_iter().next())
        .ok_or_else(|| ConsoleError::MalformedResponse("candidate has no content parts".into()))?;

    Ok(first_part.text.unwrap_or_default())
}

fn server_error_message(body: &str) -> Option<String> {
    serde_json::from_str::<ErrorWrapper>(body)
        .ok()
        .and_then(|wrapper| wrapper.error.message)
        .filter(|message| !message.trim().is_empty())
}

/// Parse a `retry-after` header given in whole seconds.
pub fn parse_retry_after(header: Option<&HeaderValue>) -> Option<Duration> {
    let value = header?.to_str().ok()?;
    value.trim().parse::<u64>().ok().map(Duration::from_secs)
}
