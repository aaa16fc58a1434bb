use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::GatewayConfig, error::GatewayError, gateway::ModelGateway, request::ModelPayload,
};

const RESPONSE_MIME_TYPE: &str = "application/json";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest<'a> {
    pub contents: Vec<Content<'a>>,
    pub system_instruction: Content<'a>,
    pub generation_config: GenerationConfig<'a>,
}

#[derive(Debug, Serialize)]
pub struct Content<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<&'static str>,
    pub parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Part<'a> {
    Text {
        text: &'a str,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob<'a>,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Blob<'a> {
    pub mime_type: &'a str,
    pub data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig<'a> {
    pub response_mime_type: &'static str,
    pub response_schema: &'a Value,
}

impl<'a> From<&'a ModelPayload> for GenerateContentRequest<'a> {
    fn from(payload: &'a ModelPayload) -> Self {
        let mut parts = vec![Part::Text {
            text: &payload.prompt,
        }];
        if let Some(media) = &payload.media {
            parts.push(Part::InlineData {
                inline_data: Blob {
                    mime_type: &media.mime_type,
                    data: &media.payload,
                },
            });
        }

        Self {
            contents: vec![Content {
                role: Some("user"),
                parts,
            }],
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text {
                    text: payload.system_instruction,
                }],
            },
            generation_config: GenerationConfig {
                response_mime_type: RESPONSE_MIME_TYPE,
                response_schema: payload.schema.as_value(),
            },
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<CandidateContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: String,
}

impl GenerateContentResponse {
    /// Concatenated non-thought text of the first candidate.
    fn text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts
            .iter()
            .filter(|part| !part.thought)
            .filter_map(|part| part.text.as_deref())
            .collect();
        (!text.is_empty()).then_some(text)
    }

    fn empty_reason(&self) -> String {
        if let Some(reason) = self
            .prompt_feedback
            .as_ref()
            .and_then(|f| f.block_reason.as_deref())
        {
            return format!("prompt blocked: {reason}");
        }
        match self
            .candidates
            .first()
            .and_then(|c| c.finish_reason.as_deref())
        {
            Some(reason) => format!("no text in response (finish reason {reason})"),
            None => "no text in response".to_string(),
        }
    }
}

fn classify_failure(status: StatusCode, body: &str) -> GatewayError {
    let envelope = serde_json::from_str::<ErrorEnvelope>(body).ok();
    let message = envelope
        .as_ref()
        .map(|e| e.error.message.clone())
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| body.chars().take(200).collect());

    // Gemini answers a bad key with 400 INVALID_ARGUMENT rather than 401.
    let key_rejected = body.contains("API_KEY_INVALID") || message.contains("API key not valid");

    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN || key_rejected {
        return GatewayError::Auth { reason: message };
    }

    let message = match envelope.map(|e| e.error.status).filter(|s| !s.is_empty()) {
        Some(code) => format!("{code}: {message}"),
        None => message,
    };
    GatewayError::Model {
        status: Some(status.as_u16()),
        message,
    }
}

/// Gemini `generateContent` over HTTPS.
pub struct GeminiGateway {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl GeminiGateway {
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()?;
        Ok(Self { client, config })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }
}

#[async_trait]
impl ModelGateway for GeminiGateway {
    async fn invoke(&self, payload: &ModelPayload) -> Result<String, GatewayError> {
        let api_key = self.config.api_key()?;
        let body = GenerateContentRequest::from(payload);

        tracing::debug!(
            target: "infovar::gateway",
            model = %self.config.model,
            media = payload.has_media(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        tracing::debug!(target: "infovar::gateway", status = status.as_u16(), bytes = text.len(), "response received");

        if !status.is_success() {
            return Err(classify_failure(status, &text));
        }

        let parsed: GenerateContentResponse =
            serde_json::from_str(&text).map_err(|e| GatewayError::Model {
                status: Some(status.as_u16()),
                message: format!("unreadable response envelope: {e}"),
            })?;

        parsed.text().ok_or_else(|| GatewayError::Model {
            status: Some(status.as_u16()),
            message: parsed.empty_reason(),
        })
    }
}
