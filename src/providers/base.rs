//! Base provider trait and common types for Story Weaver
//!
//! This module defines the Provider trait that language-model backends
//! implement, along with the request and response types exchanged with it.
//! A provider is an opaque request/response service: one prompt in, one
//! block of text (plus optional grounding sources) out.

use crate::error::Result;
use crate::message::Source;
use async_trait::async_trait;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// Binary payload sent alongside the prompt (e.g. recorded audio)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineData {
    /// MIME type of the payload, e.g. `audio/webm`
    pub mime_type: String,
    /// Base64-encoded payload
    pub data: String,
}

impl InlineData {
    /// Encode raw bytes as an inline payload
    ///
    /// # Examples
    ///
    /// ```
    /// use storyweaver::providers::InlineData;
    ///
    /// let data = InlineData::from_bytes("audio/webm", b"abc");
    /// assert_eq!(data.data, "YWJj");
    /// ```
    pub fn from_bytes(mime_type: impl Into<String>, bytes: &[u8]) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }
}

/// A single generation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    /// Model identifier
    pub model: String,
    /// Fully interpolated prompt text
    pub prompt: String,
    /// Thinking token budget, if any
    pub thinking_budget: Option<u32>,
    /// Ask the provider to ground the answer with web search
    pub search_grounding: bool,
    /// Optional binary payload placed before the prompt text
    pub inline_data: Option<InlineData>,
}

impl GenerationRequest {
    /// Create a plain text request for a model
    ///
    /// # Examples
    ///
    /// ```
    /// use storyweaver::providers::GenerationRequest;
    ///
    /// let request = GenerationRequest::new("gemini-2.5-flash", "Hello")
    ///     .with_thinking_budget(Some(1024))
    ///     .with_search_grounding(true);
    /// assert_eq!(request.thinking_budget, Some(1024));
    /// assert!(request.search_grounding);
    /// ```
    pub fn new(model: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            model: model.into(),
            prompt: prompt.into(),
            thinking_budget: None,
            search_grounding: false,
            inline_data: None,
        }
    }

    /// Set the thinking budget
    pub fn with_thinking_budget(mut self, budget: Option<u32>) -> Self {
        self.thinking_budget = budget;
        self
    }

    /// Enable or disable search grounding
    pub fn with_search_grounding(mut self, enabled: bool) -> Self {
        self.search_grounding = enabled;
        self
    }

    /// Attach an inline payload
    pub fn with_inline_data(mut self, data: InlineData) -> Self {
        self.inline_data = Some(data);
        self
    }
}

/// Text returned by a provider
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationResponse {
    /// Raw response text
    pub text: String,
    /// Grounding sources, empty when the provider reported none
    pub sources: Vec<Source>,
}

impl GenerationResponse {
    /// Create a response with no sources
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sources: Vec::new(),
        }
    }

    /// Create a response with grounding sources
    pub fn with_sources(text: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            text: text.into(),
            sources,
        }
    }
}

/// Provider trait for language-model backends
///
/// # Examples
///
/// ```no_run
/// use storyweaver::providers::{GenerationRequest, GenerationResponse, Provider};
/// use storyweaver::error::Result;
/// use async_trait::async_trait;
///
/// struct EchoProvider;
///
/// #[async_trait]
/// impl Provider for EchoProvider {
///     async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
///         Ok(GenerationResponse::new(request.prompt.clone()))
///     }
/// }
/// ```
#[async_trait]
pub trait Provider: Send + Sync {
    /// Run one generation request to completion
    ///
    /// # Errors
    ///
    /// Returns error if the API call fails or the response is invalid
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse>;

    /// Short backend name used in logs
    fn name(&self) -> &'static str {
        "provider"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_request_defaults() {
        let request = GenerationRequest::new("model", "prompt");
        assert_eq!(request.model, "model");
        assert_eq!(request.prompt, "prompt");
        assert!(request.thinking_budget.is_none());
        assert!(!request.search_grounding);
        assert!(request.inline_data.is_none());
    }

    #[test]
    fn test_generation_request_with_inline_data() {
        let request = GenerationRequest::new("model", "Transcribe this audio.")
            .with_inline_data(InlineData::from_bytes("audio/webm", &[0, 1, 2]));
        let data = request.inline_data.unwrap();
        assert_eq!(data.mime_type, "audio/webm");
        assert_eq!(data.data, "AAEC");
    }

    #[test]
    fn test_generation_response_constructors() {
        let plain = GenerationResponse::new("text");
        assert!(plain.sources.is_empty());

        let grounded = GenerationResponse::with_sources(
            "text",
            vec![Source {
                uri: "https://example.com".to_string(),
                title: "Example".to_string(),
            }],
        );
        assert_eq!(grounded.sources.len(), 1);
    }
}
