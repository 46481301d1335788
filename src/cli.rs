//! Command-line interface definition for Story Weaver
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for the library chat, the scriptorium, story export
//! and display preferences.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Story Weaver - find, read and write about stories with an LLM
#[derive(Parser, Debug, Clone)]
#[command(name = "storyweaver")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Override the slot database directory
    #[arg(long)]
    pub storage_path: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Story Weaver
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Send one query to the library and print the reply
    Ask {
        /// Query text
        text: String,

        /// Search mode: quick, deep or collab
        #[arg(short, long, default_value = "quick")]
        mode: String,
    },

    /// Follow up on a library story: more, similar or analyze
    FollowUp {
        /// Story number as listed by `history` (starting at 1)
        number: usize,

        /// more (quick summary), similar (deep search) or analyze (collab)
        #[arg(default_value = "more")]
        action: String,
    },

    /// Start an interactive session
    Chat {
        /// Initial search mode for the library: quick, deep or collab
        #[arg(short, long, default_value = "quick")]
        mode: String,

        /// Surface to open (library or scriptorium); defaults to the saved view
        #[arg(short, long)]
        surface: Option<String>,
    },

    /// Show the messages of a session
    History {
        /// Surface to show (library or scriptorium); defaults to the saved view
        #[arg(short, long)]
        surface: Option<String>,
    },

    /// Clear a session's messages
    Clear {
        /// Surface to clear (library or scriptorium); defaults to the saved view
        #[arg(short, long)]
        surface: Option<String>,
    },

    /// Work with the scriptorium treatise
    Scriptorium {
        /// Scriptorium subcommand
        #[command(subcommand)]
        command: ScriptoriumCommand,
    },

    /// Export a story from the library to a text document
    Export {
        /// Story number as listed by `history` (starting at 1)
        index: usize,

        /// Output file; defaults to the story title in the export directory
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Show or change the colour theme
    Theme {
        /// toggle, light or dark; omit to show the current theme
        action: Option<String>,
    },

    /// Show or change the saved view
    View {
        /// library or scriptorium; omit to show the current view
        mode: Option<String>,
    },
}

/// Scriptorium subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum ScriptoriumCommand {
    /// Ask about the current treatise
    Consult {
        /// Instruction or question
        instruction: String,
    },

    /// Print the treatise
    Show,

    /// Replace the treatise
    Set {
        /// New treatise text
        #[arg(conflicts_with = "file")]
        text: Option<String>,

        /// Read the new treatise from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Append a paragraph to the treatise
    Append {
        /// Text to append
        text: String,
    },

    /// Transcribe an audio file and append it to the treatise
    Transcribe {
        /// Audio file
        file: PathBuf,

        /// MIME type; guessed from the file extension when omitted
        #[arg(long)]
        mime_type: Option<String>,
    },

    /// Clear the treatise and the consultation history
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            storage_path: None,
            command: Commands::History { surface: None },
        }
    }
}
