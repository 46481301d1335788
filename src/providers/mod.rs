//! Provider module for Story Weaver
//!
//! This module contains the language-model provider abstraction and the
//! Google Gemini implementation.

pub mod base;
pub mod gemini;

pub use base::{GenerationRequest, GenerationResponse, InlineData, Provider};
pub use gemini::GeminiProvider;

use crate::config::ProviderConfig;
use crate::error::{Result, StoryWeaverError};
use async_trait::async_trait;
use std::sync::Arc;

/// Create a provider instance based on configuration
///
/// # Errors
///
/// Returns error if the provider type is unknown or initialization fails
/// (for example, no API key is configured)
pub fn create_provider(config: &ProviderConfig) -> Result<Arc<dyn Provider>> {
    match config.provider_type.as_str() {
        "gemini" => Ok(Arc::new(GeminiProvider::new(config.gemini.clone())?)),
        other => Err(StoryWeaverError::Provider(format!("Unknown provider type: {}", other)).into()),
    }
}

/// Stand-in provider for commands that only read or reset sessions
///
/// Lets `history`, `clear` and `export` run without credentials. Any
/// generation attempt fails.
pub struct OfflineProvider;

#[async_trait]
impl Provider for OfflineProvider {
    async fn generate(&self, _request: &GenerationRequest) -> Result<GenerationResponse> {
        Err(StoryWeaverError::Provider("No provider configured for this command".to_string()).into())
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}
