//! Configuration management for Story Weaver
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::chat_mode::SearchMode;
use crate::error::{Result, StoryWeaverError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure for Story Weaver
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,
    /// Slot storage configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Story export configuration
    #[serde(default)]
    pub export: ExportConfig,
}

/// Provider configuration
///
/// Specifies which AI provider to use and its settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Type of provider to use
    #[serde(rename = "type", default = "default_provider_type")]
    pub provider_type: String,

    /// Google Gemini configuration
    #[serde(default)]
    pub gemini: GeminiConfig,
}

fn default_provider_type() -> String {
    "gemini".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            gemini: GeminiConfig::default(),
        }
    }
}

/// Model and reasoning settings for one request profile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModeConfig {
    /// Model identifier
    pub model: String,

    /// Thinking token budget, if the model should reason before answering
    #[serde(default)]
    pub thinking_budget: Option<u32>,
}

impl ModeConfig {
    fn new(model: &str, thinking_budget: Option<u32>) -> Self {
        Self {
            model: model.to_string(),
            thinking_budget,
        }
    }
}

/// Google Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key; usually supplied through `GEMINI_API_KEY` instead of the file
    #[serde(default)]
    pub api_key: Option<String>,

    /// Optional API base URL (useful for tests and local mocks)
    #[serde(default)]
    pub api_base: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// Quick mode: fast model with search grounding
    #[serde(default = "default_quick")]
    pub quick: ModeConfig,

    /// Deep mode: extended thinking
    #[serde(default = "default_deep")]
    pub deep: ModeConfig,

    /// Collab mode: collaborative analysis
    #[serde(default = "default_collab")]
    pub collab: ModeConfig,

    /// Scriptorium consultation
    #[serde(default = "default_scriptorium")]
    pub scriptorium: ModeConfig,

    /// Audio transcription
    #[serde(default = "default_transcription")]
    pub transcription: ModeConfig,
}

fn default_timeout_seconds() -> u64 {
    300
}

fn default_quick() -> ModeConfig {
    ModeConfig::new("gemini-2.5-flash", None)
}

fn default_deep() -> ModeConfig {
    ModeConfig::new("gemini-2.5-pro", Some(32768))
}

fn default_collab() -> ModeConfig {
    ModeConfig::new("gemini-2.5-pro", Some(16384))
}

fn default_scriptorium() -> ModeConfig {
    ModeConfig::new("gemini-2.5-pro", None)
}

fn default_transcription() -> ModeConfig {
    ModeConfig::new("gemini-2.5-flash", None)
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: None,
            timeout_seconds: default_timeout_seconds(),
            quick: default_quick(),
            deep: default_deep(),
            collab: default_collab(),
            scriptorium: default_scriptorium(),
            transcription: default_transcription(),
        }
    }
}

impl GeminiConfig {
    /// Settings for a library search mode
    pub fn mode(&self, mode: SearchMode) -> &ModeConfig {
        match mode {
            SearchMode::Quick => &self.quick,
            SearchMode::Deep => &self.deep,
            SearchMode::Collab => &self.collab,
        }
    }

    fn profiles(&self) -> [(&'static str, &ModeConfig); 5] {
        [
            ("quick", &self.quick),
            ("deep", &self.deep),
            ("collab", &self.collab),
            ("scriptorium", &self.scriptorium),
            ("transcription", &self.transcription),
        ]
    }
}

/// Slot storage configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Database directory; defaults to the platform data directory
    #[serde(default)]
    pub path: Option<PathBuf>,
}

/// Story export configuration
///
/// Page geometry is expressed in the same units as the printed layout:
/// the body begins at `first_page_top` on page one and `page_top` on later
/// pages, and a new page starts once the cursor passes `page_bottom`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Maximum characters per body line
    #[serde(default = "default_line_width")]
    pub line_width: usize,

    /// Directory exported documents are written to
    #[serde(default)]
    pub output_dir: Option<PathBuf>,

    /// Body start position on the first page
    #[serde(default = "default_first_page_top")]
    pub first_page_top: u32,

    /// Body start position on continuation pages
    #[serde(default = "default_page_top")]
    pub page_top: u32,

    /// Last usable position on a page
    #[serde(default = "default_page_bottom")]
    pub page_bottom: u32,

    /// Vertical advance per line
    #[serde(default = "default_line_height")]
    pub line_height: u32,
}

fn default_line_width() -> usize {
    90
}

fn default_first_page_top() -> u32 {
    55
}

fn default_page_top() -> u32 {
    20
}

fn default_page_bottom() -> u32 {
    280
}

fn default_line_height() -> u32 {
    5
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            line_width: default_line_width(),
            output_dir: None,
            first_page_top: default_first_page_top(),
            page_top: default_page_top(),
            page_bottom: default_page_bottom(),
            line_height: default_line_height(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| StoryWeaverError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| StoryWeaverError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(provider_type) = std::env::var("STORYWEAVER_PROVIDER") {
            self.provider.provider_type = provider_type;
        }

        // The dedicated variable wins over the conventional one.
        if let Ok(key) = std::env::var("STORYWEAVER_API_KEY") {
            self.provider.gemini.api_key = Some(key);
        } else if let Ok(key) = std::env::var("GEMINI_API_KEY") {
            self.provider.gemini.api_key = Some(key);
        }

        if let Ok(api_base) = std::env::var("STORYWEAVER_API_BASE") {
            tracing::debug!(api_base = %api_base, "Env override: STORYWEAVER_API_BASE");
            self.provider.gemini.api_base = Some(api_base);
        }

        if let Ok(model) = std::env::var("STORYWEAVER_QUICK_MODEL") {
            self.provider.gemini.quick.model = model;
        }

        if let Ok(model) = std::env::var("STORYWEAVER_DEEP_MODEL") {
            self.provider.gemini.deep.model = model;
        }

        if let Ok(model) = std::env::var("STORYWEAVER_COLLAB_MODEL") {
            self.provider.gemini.collab.model = model;
        }

        if let Ok(timeout) = std::env::var("STORYWEAVER_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.provider.gemini.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid STORYWEAVER_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(db) = std::env::var("STORYWEAVER_DB") {
            tracing::debug!(db = %db, "Env override: STORYWEAVER_DB");
            self.storage.path = Some(PathBuf::from(db));
        }

        if let Ok(width) = std::env::var("STORYWEAVER_EXPORT_LINE_WIDTH") {
            match width.parse::<usize>() {
                Ok(v) => self.export.line_width = v,
                Err(_) => tracing::warn!("Invalid STORYWEAVER_EXPORT_LINE_WIDTH: {}", width),
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(path) = &cli.storage_path {
            self.storage.path = Some(PathBuf::from(path));
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if any validation check fails
    pub fn validate(&self) -> Result<()> {
        if self.provider.provider_type.is_empty() {
            return Err(
                StoryWeaverError::Config("Provider type cannot be empty".to_string()).into(),
            );
        }

        let valid_providers = ["gemini"];
        if !valid_providers.contains(&self.provider.provider_type.as_str()) {
            return Err(StoryWeaverError::Config(format!(
                "Invalid provider type: {}. Must be one of: {}",
                self.provider.provider_type,
                valid_providers.join(", ")
            ))
            .into());
        }

        for (name, profile) in self.provider.gemini.profiles() {
            if profile.model.trim().is_empty() {
                return Err(StoryWeaverError::Config(format!(
                    "provider.gemini.{}.model cannot be empty",
                    name
                ))
                .into());
            }
        }

        if self.provider.gemini.timeout_seconds == 0 {
            return Err(StoryWeaverError::Config(
                "provider.gemini.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.export.line_width == 0 {
            return Err(StoryWeaverError::Config(
                "export.line_width must be greater than 0".to_string(),
            )
            .into());
        }

        if self.export.line_height == 0 {
            return Err(StoryWeaverError::Config(
                "export.line_height must be greater than 0".to_string(),
            )
            .into());
        }

        if self.export.first_page_top > self.export.page_bottom
            || self.export.page_top > self.export.page_bottom
        {
            return Err(StoryWeaverError::Config(
                "export page tops must not exceed export.page_bottom".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
