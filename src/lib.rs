//! Story Weaver - story search and writing companion library
//!
//! This library forwards prompts to a hosted language model, parses the
//! structured story blocks in its replies, and keeps two persisted
//! conversations: the library (story search) and the scriptorium (a
//! treatise buffer with a consultation chat).
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `story_parser`: Extraction of labelled story blocks from model output
//! - `session`: Library and scriptorium session state machines
//! - `providers`: Language-model provider abstraction and the Gemini client
//! - `prompts`: Prompt templates per search mode and for the scriptorium
//! - `storage`: Durable key-value slots
//! - `preferences`: Theme and view mode
//! - `export`: Paginated story documents
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli` / `commands`: Command-line interface
//!
//! # Example
//!
//! ```no_run
//! use storyweaver::{Config, LibrarySession, SearchMode};
//! use storyweaver::providers::create_provider;
//! use storyweaver::storage::SlotStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let provider = create_provider(&config.provider)?;
//!     let library = LibrarySession::new(provider, SlotStore::open_default()?, config.provider.gemini);
//!     library.send_message("The Overcoat by Gogol", SearchMode::Quick).await;
//!     Ok(())
//! }
//! ```

pub mod chat_mode;
pub mod cli;
pub mod commands;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod message;
pub mod preferences;
pub mod prompts;
pub mod providers;
pub mod session;
pub mod storage;
pub mod story_parser;

// Re-export commonly used types
pub use chat_mode::SearchMode;
pub use config::Config;
pub use error::{Result, StoryWeaverError};
pub use message::{Citation, Message, Sender, Source, Story};
pub use session::{LibrarySession, Scriptorium, SendOutcome};
pub use story_parser::parse_stories;

#[cfg(test)]
pub mod test_utils;
