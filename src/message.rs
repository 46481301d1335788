//! Conversation data model
//!
//! Messages, parsed stories, citations and grounding sources. A `Message`
//! is built once by a session and never mutated after it is appended.

use serde::{Deserialize, Serialize};
use std::fmt;
use ulid::Ulid;

/// Who produced a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Text typed by the user
    User,
    /// Text returned by the language model
    Ai,
    /// Greetings and fixed error notices
    System,
}

impl fmt::Display for Sender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Ai => write!(f, "ai"),
            Self::System => write!(f, "system"),
        }
    }
}

/// Work a story was taken from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Citation {
    /// Book or collection name
    pub title: String,
    /// Author name
    pub author: String,
}

/// A story extracted from model output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Story {
    /// Story title
    pub title: String,
    /// Full text or summary of the story
    pub content: String,
    /// Where the story comes from
    pub citation: Citation,
}

/// A web source reported by search grounding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    /// Source URI
    pub uri: String,
    /// Page title
    pub title: String,
}

/// A single entry in a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Unique identifier (`init` for greetings, otherwise `<prefix>-<ulid>`)
    pub id: String,
    /// Message author
    pub sender: Sender,
    /// Raw text
    pub content: String,
    /// Stories parsed from `content`, present only when at least one parsed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stories: Option<Vec<Story>>,
    /// Grounding sources, present only when the provider reported any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<Source>>,
}

impl Message {
    /// Creates a user message with a fresh id
    ///
    /// # Examples
    ///
    /// ```
    /// use storyweaver::message::{Message, Sender};
    ///
    /// let msg = Message::user("Tell me a fable");
    /// assert_eq!(msg.sender, Sender::User);
    /// assert!(msg.id.starts_with("user-"));
    /// ```
    pub fn user(content: impl Into<String>) -> Self {
        Self::plain(new_message_id("user"), Sender::User, content)
    }

    /// Creates an AI message carrying optional stories and sources
    ///
    /// Empty vectors are stored as absent so that consumers can rely on
    /// `stories.is_some()` meaning "at least one story".
    pub fn ai(content: impl Into<String>, stories: Vec<Story>, sources: Vec<Source>) -> Self {
        Self {
            id: new_message_id("ai"),
            sender: Sender::Ai,
            content: content.into(),
            stories: (!stories.is_empty()).then_some(stories),
            sources: (!sources.is_empty()).then_some(sources),
        }
    }

    /// Creates a system notice reporting a failed request
    pub fn error_notice(content: impl Into<String>) -> Self {
        Self::plain(new_message_id("err"), Sender::System, content)
    }

    /// Creates a greeting with the fixed `init` id
    pub fn greeting(sender: Sender, content: impl Into<String>) -> Self {
        Self::plain("init".to_string(), sender, content)
    }

    fn plain(id: String, sender: Sender, content: impl Into<String>) -> Self {
        Self {
            id,
            sender,
            content: content.into(),
            stories: None,
            sources: None,
        }
    }

    /// Stories attached to this message, or an empty slice
    pub fn stories(&self) -> &[Story] {
        self.stories.as_deref().unwrap_or_default()
    }

    /// Sources attached to this message, or an empty slice
    pub fn sources(&self) -> &[Source] {
        self.sources.as_deref().unwrap_or_default()
    }
}

/// Generate a message id of the form `<prefix>-<ulid>`
pub fn new_message_id(prefix: &str) -> String {
    format!("{}-{}", prefix, Ulid::new())
}
