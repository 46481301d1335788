//! Gemini provider implementation for Story Weaver
//!
//! This module implements the Provider trait for Google's Gemini
//! `generateContent` REST endpoint, including search grounding, thinking
//! budgets and inline audio payloads.

use crate::config::GeminiConfig;
use crate::error::{Result, StoryWeaverError};
use crate::message::Source;
use crate::providers::{GenerationRequest, GenerationResponse, Provider};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Public Gemini API host
pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Title used when a grounding chunk has none
const DEFAULT_SOURCE_TITLE: &str = "Source";

/// Google Gemini API provider
///
/// # Examples
///
/// ```
/// use storyweaver::config::GeminiConfig;
/// use storyweaver::providers::GeminiProvider;
///
/// let config = GeminiConfig {
///     api_key: Some("test-key".to_string()),
///     ..Default::default()
/// };
/// let provider = GeminiProvider::new(config).unwrap();
/// assert_eq!(provider.api_base(), "https://generativelanguage.googleapis.com");
/// ```
pub struct GeminiProvider {
    client: Client,
    api_key: String,
    api_base: String,
}

/// Request body for `models/{model}:generateContent`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<GeminiTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

/// One content part; exactly one field is set
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<GeminiInlineData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    google_search: serde_json::Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ThinkingConfig {
    thinking_budget: u32,
}

/// Response body from `generateContent`
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiResponseContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponseContent {
    #[serde(default)]
    parts: Vec<GeminiResponsePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponsePart {
    #[serde(default)]
    text: Option<String>,
    /// Set on reasoning summaries returned alongside the answer
    #[serde(default)]
    thought: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}

#[derive(Debug, Deserialize)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}

#[derive(Debug, Deserialize)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

impl GeminiProvider {
    /// Create a new Gemini provider instance
    ///
    /// # Errors
    ///
    /// Returns `StoryWeaverError::MissingCredentials` if no API key is
    /// configured, or a provider error if the HTTP client cannot be built
    pub fn new(config: GeminiConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| {
                StoryWeaverError::MissingCredentials(
                    "gemini (set GEMINI_API_KEY or provider.gemini.api_key)".to_string(),
                )
            })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("storyweaver/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                StoryWeaverError::Provider(format!("Failed to create HTTP client: {}", e))
            })?;

        let api_base = config
            .api_base
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string())
            .trim_end_matches('/')
            .to_string();

        tracing::info!("Initialized Gemini provider: api_base={}", api_base);

        Ok(Self {
            client,
            api_key,
            api_base,
        })
    }

    /// Get the API base URL requests are sent to
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn endpoint(&self, model: &str) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.api_base, model
        )
    }
}

/// Build the wire request; an inline payload always precedes the text
fn build_request(request: &GenerationRequest) -> GeminiRequest {
    let mut parts = Vec::with_capacity(2);
    if let Some(inline) = &request.inline_data {
        parts.push(GeminiPart {
            inline_data: Some(GeminiInlineData {
                mime_type: inline.mime_type.clone(),
                data: inline.data.clone(),
            }),
            text: None,
        });
    }
    parts.push(GeminiPart {
        inline_data: None,
        text: Some(request.prompt.clone()),
    });

    let tools = if request.search_grounding {
        vec![GeminiTool {
            google_search: serde_json::json!({}),
        }]
    } else {
        Vec::new()
    };

    GeminiRequest {
        contents: vec![GeminiContent { parts }],
        tools,
        generation_config: request.thinking_budget.map(|budget| GenerationConfig {
            thinking_config: ThinkingConfig {
                thinking_budget: budget,
            },
        }),
    }
}

/// Flatten the first candidate into text and grounding sources
///
/// Thought parts are reasoning, not answer, and are left out of the text.
fn convert_response(response: GeminiResponse) -> GenerationResponse {
    let Some(candidate) = response.candidates.into_iter().next() else {
        return GenerationResponse::default();
    };

    let text = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter(|part| !part.thought)
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default();

    let sources = candidate
        .grounding_metadata
        .map(|metadata| {
            metadata
                .grounding_chunks
                .into_iter()
                .filter_map(|chunk| chunk.web)
                .filter_map(|web| {
                    let uri = web.uri.filter(|uri| !uri.is_empty())?;
                    let title = web
                        .title
                        .filter(|title| !title.is_empty())
                        .unwrap_or_else(|| DEFAULT_SOURCE_TITLE.to_string());
                    Some(Source { uri, title })
                })
                .collect()
        })
        .unwrap_or_default();

    GenerationResponse::with_sources(text, sources)
}

#[async_trait]
impl Provider for GeminiProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        let url = self.endpoint(&request.model);
        let body = build_request(request);

        tracing::debug!(
            model = %request.model,
            grounding = request.search_grounding,
            thinking_budget = ?request.thinking_budget,
            inline = request.inline_data.is_some(),
            "Sending Gemini request"
        );

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Gemini request failed: {}", e);
                StoryWeaverError::Provider(format!("Gemini request failed: {}", e))
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            tracing::error!("Gemini returned error {}: {}", status, error_text);
            return Err(StoryWeaverError::Provider(format!(
                "Gemini returned error {}: {}",
                status, error_text
            ))
            .into());
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            tracing::error!("Failed to parse Gemini response: {}", e);
            StoryWeaverError::Provider(format!("Failed to parse Gemini response: {}", e))
        })?;

        let converted = convert_response(gemini_response);
        tracing::debug!(
            "Gemini response: {} chars, {} sources",
            converted.text.len(),
            converted.sources.len()
        );

        Ok(converted)
    }

    fn name(&self) -> &'static str {
        "gemini"
    }
}
