//! Search mode types and utilities
//!
//! This module defines the request profiles a library query can use:
//! - Quick mode: fast model with web search grounding
//! - Deep mode: extended thinking budget, several connected stories
//! - Collab mode: open-ended collaborative analysis, no story parsing

use crate::error::StoryWeaverError;
use colored::Colorize;
use std::fmt;
use std::str::FromStr;

/// Request profile for a library query
///
/// A mode only changes the prompt template and model parameters; the
/// session state machine is identical for all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Fast model with search grounding, focused on a named story
    #[default]
    Quick,

    /// Scholarly search for obscure, thematically connected stories
    Deep,

    /// Creative partnership for analysis and writing
    Collab,
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Quick => write!(f, "QUICK"),
            Self::Deep => write!(f, "DEEP"),
            Self::Collab => write!(f, "COLLAB"),
        }
    }
}

impl SearchMode {
    /// All modes, in menu order
    pub const ALL: [SearchMode; 3] = [Self::Quick, Self::Deep, Self::Collab];

    /// Parse a search mode from a string
    ///
    /// # Examples
    ///
    /// ```
    /// use storyweaver::chat_mode::SearchMode;
    ///
    /// let mode = SearchMode::parse_str("deep").unwrap();
    /// assert_eq!(mode, SearchMode::Deep);
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "quick" | "fast" | "search" => Ok(Self::Quick),
            "deep" | "thinking" => Ok(Self::Deep),
            "collab" | "creative" => Ok(Self::Collab),
            other => Err(format!("Unknown search mode: {}", other)),
        }
    }

    /// Lowercase name as used in configuration and on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Quick => "quick",
            Self::Deep => "deep",
            Self::Collab => "collab",
        }
    }

    /// Get a user-friendly description of this mode
    pub fn description(&self) -> &'static str {
        match self {
            Self::Quick => "Find a specific story fast, with web sources",
            Self::Deep => "Dig up obscure, thematically connected stories",
            Self::Collab => "Explore and write about literature together",
        }
    }

    /// Whether responses in this mode are searched for story blocks
    pub fn parses_stories(&self) -> bool {
        !matches!(self, Self::Collab)
    }

    /// Whether this mode asks the provider for search grounding
    pub fn uses_search_grounding(&self) -> bool {
        matches!(self, Self::Quick)
    }

    /// Get a colored tag representation of this mode
    ///
    /// # Examples
    ///
    /// ```ignore
    /// use storyweaver::chat_mode::SearchMode;
    ///
    /// println!("{}", SearchMode::Deep.colored_tag());  // "[DEEP]" in purple
    /// ```
    pub fn colored_tag(&self) -> String {
        match self {
            Self::Quick => format!("[{}]", "QUICK".cyan()),
            Self::Deep => format!("[{}]", "DEEP".purple()),
            Self::Collab => format!("[{}]", "COLLAB".green()),
        }
    }

    /// Format the interactive prompt for this mode
    ///
    /// # Examples
    ///
    /// ```
    /// use storyweaver::chat_mode::SearchMode;
    ///
    /// assert_eq!(SearchMode::Collab.format_prompt(), "[COLLAB] >> ");
    /// ```
    pub fn format_prompt(&self) -> String {
        format!("[{}] >> ", self)
    }

    /// Format the interactive prompt with a colored tag
    pub fn format_colored_prompt(&self) -> String {
        format!("{} >> ", self.colored_tag())
    }
}

impl FromStr for SearchMode {
    type Err = StoryWeaverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s).map_err(StoryWeaverError::InvalidMode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_mode_display() {
        assert_eq!(SearchMode::Quick.to_string(), "QUICK");
        assert_eq!(SearchMode::Deep.to_string(), "DEEP");
        assert_eq!(SearchMode::Collab.to_string(), "COLLAB");
    }

    #[test]
    fn test_search_mode_parse_case_insensitive() {
        assert_eq!(SearchMode::parse_str("QUICK").unwrap(), SearchMode::Quick);
        assert_eq!(SearchMode::parse_str(" Deep ").unwrap(), SearchMode::Deep);
        assert_eq!(SearchMode::parse_str("collab").unwrap(), SearchMode::Collab);
    }

    #[test]
    fn test_search_mode_parse_aliases() {
        assert_eq!(SearchMode::parse_str("search").unwrap(), SearchMode::Quick);
        assert_eq!(SearchMode::parse_str("thinking").unwrap(), SearchMode::Deep);
        assert_eq!(SearchMode::parse_str("creative").unwrap(), SearchMode::Collab);
    }

    #[test]
    fn test_search_mode_parse_invalid() {
        assert!(SearchMode::parse_str("invalid").is_err());
        assert!("nope".parse::<SearchMode>().is_err());
    }

    #[test]
    fn test_search_mode_from_str_round_trip() {
        for mode in SearchMode::ALL {
            assert_eq!(mode.as_str().parse::<SearchMode>().unwrap(), mode);
        }
    }

    #[test]
    fn test_default_mode_is_quick() {
        assert_eq!(SearchMode::default(), SearchMode::Quick);
    }

    #[test]
    fn test_only_collab_skips_story_parsing() {
        assert!(SearchMode::Quick.parses_stories());
        assert!(SearchMode::Deep.parses_stories());
        assert!(!SearchMode::Collab.parses_stories());
    }

    #[test]
    fn test_only_quick_uses_search_grounding() {
        assert!(SearchMode::Quick.uses_search_grounding());
        assert!(!SearchMode::Deep.uses_search_grounding());
        assert!(!SearchMode::Collab.uses_search_grounding());
    }

    #[test]
    fn test_colored_prompt_contains_mode() {
        for mode in SearchMode::ALL {
            let prompt = mode.format_colored_prompt();
            assert!(prompt.contains(mode.to_string().as_str()));
            assert!(prompt.ends_with(" >> "));
        }
    }
}
