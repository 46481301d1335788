//! Special commands parser for interactive chat
//!
//! Lines starting with `/` are handled by the chat loop instead of being
//! sent to the provider. Commands are case-insensitive; `exit` and `quit`
//! work without the slash.

use crate::chat_mode::SearchMode;
use crate::preferences::ViewMode;
use crate::prompts::StoryAction;
use thiserror::Error;

/// Errors that can occur when parsing special commands
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Unknown command was entered
    #[error("Unknown command: {0}\n\nType '/help' to see available commands")]
    UnknownCommand(String),

    /// Command was given an unsupported argument
    #[error("Unsupported argument for {command}: {arg}\n\nType '/help' to see valid usage")]
    UnsupportedArgument { command: String, arg: String },

    /// Command requires an argument but none was provided
    #[error("Command {command} requires an argument\n\nUsage: {usage}")]
    MissingArgument { command: String, usage: String },
}

/// Special commands that can be executed during interactive chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SpecialCommand {
    /// Switch the library search mode
    SwitchMode(SearchMode),

    /// Switch between the library and the scriptorium
    SwitchView(ViewMode),

    /// Clear the active session
    Clear,

    /// Print the active session's messages
    ShowHistory,

    /// Print the treatise
    ShowTreatise,

    /// Export a library story by number
    Export(usize),

    /// Run a follow-up action on a library story by number
    FollowUp(StoryAction, usize),

    /// Display current surface and mode
    ShowStatus,

    /// Display help information
    Help,

    /// Leave the chat loop
    Exit,

    /// Not a special command; send the text to the provider
    None,
}

fn missing(command: &str, usage: &str) -> CommandError {
    CommandError::MissingArgument {
        command: command.to_string(),
        usage: usage.to_string(),
    }
}

fn unsupported(command: &str, arg: &str) -> CommandError {
    CommandError::UnsupportedArgument {
        command: command.to_string(),
        arg: arg.to_string(),
    }
}

fn story_number(command: &str, arg: &str) -> Result<usize, CommandError> {
    match arg.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(unsupported(command, arg)),
    }
}

fn follow_up(command: &str, arg: &str, action: StoryAction) -> Result<SpecialCommand, CommandError> {
    if arg.is_empty() {
        return Err(missing(command, &format!("{} <story number>", command)));
    }
    story_number(command, arg).map(|n| SpecialCommand::FollowUp(action, n))
}

/// Parse a line of chat input
///
/// # Examples
///
/// ```
/// use storyweaver::commands::special_commands::{parse_special_command, SpecialCommand};
/// use storyweaver::chat_mode::SearchMode;
///
/// assert_eq!(
///     parse_special_command("/mode deep").unwrap(),
///     SpecialCommand::SwitchMode(SearchMode::Deep)
/// );
/// assert_eq!(parse_special_command("tell me a fable").unwrap(), SpecialCommand::None);
/// ```
pub fn parse_special_command(input: &str) -> Result<SpecialCommand, CommandError> {
    let trimmed = input.trim();
    let lower = trimmed.to_lowercase();

    if !trimmed.starts_with('/') {
        return Ok(match lower.as_str() {
            "exit" | "quit" => SpecialCommand::Exit,
            _ => SpecialCommand::None,
        });
    }

    let mut words = lower.split_whitespace();
    let command = words.next().unwrap_or_default();
    let arg = words.collect::<Vec<_>>().join(" ");

    match (command, arg.as_str()) {
        ("/quick", "") => Ok(SpecialCommand::SwitchMode(SearchMode::Quick)),
        ("/deep", "") => Ok(SpecialCommand::SwitchMode(SearchMode::Deep)),
        ("/collab", "") => Ok(SpecialCommand::SwitchMode(SearchMode::Collab)),
        ("/mode", "") => Err(missing("/mode", "/mode <quick|deep|collab>")),
        ("/mode", arg) => SearchMode::parse_str(arg)
            .map(SpecialCommand::SwitchMode)
            .map_err(|_| unsupported("/mode", arg)),

        ("/library", "") => Ok(SpecialCommand::SwitchView(ViewMode::Library)),
        ("/scriptorium", "") => Ok(SpecialCommand::SwitchView(ViewMode::Scriptorium)),
        ("/view", "") => Err(missing("/view", "/view <library|scriptorium>")),
        ("/view", arg) => arg
            .parse::<ViewMode>()
            .map(SpecialCommand::SwitchView)
            .map_err(|_| unsupported("/view", arg)),

        ("/export", "") => Err(missing("/export", "/export <story number>")),
        ("/export", arg) => story_number("/export", arg).map(SpecialCommand::Export),

        ("/more", arg) => follow_up("/more", arg, StoryAction::TellMeMore),
        ("/similar", arg) => follow_up("/similar", arg, StoryAction::FindSimilar),
        ("/analyze", arg) => follow_up("/analyze", arg, StoryAction::Analyze),

        ("/clear", "") => Ok(SpecialCommand::Clear),
        ("/history", "") => Ok(SpecialCommand::ShowHistory),
        ("/treatise", "") => Ok(SpecialCommand::ShowTreatise),
        ("/status", "") => Ok(SpecialCommand::ShowStatus),
        ("/help", "") | ("/?", "") => Ok(SpecialCommand::Help),
        ("/exit", "") | ("/quit", "") => Ok(SpecialCommand::Exit),

        _ => Err(CommandError::UnknownCommand(trimmed.to_string())),
    }
}

/// Display help information for special commands
pub fn print_help() {
    println!(
        r#"
Special Commands for Interactive Chat
=====================================

SEARCH MODE (library):
  /mode quick     - Find a specific story fast, with web sources
  /mode deep      - Dig up obscure, thematically connected stories
  /mode collab    - Explore and write about literature together
  /quick, /deep, /collab - Shorthands for /mode

SURFACE:
  /view library      - Switch to the library
  /view scriptorium  - Switch to the scriptorium
  /library, /scriptorium - Shorthands for /view

STORIES (library, numbered as in /history):
  /more <n>       - Detailed summary of story n (quick mode)
  /similar <n>    - Stories with themes similar to story n (deep mode)
  /analyze <n>    - Analyze story n together (collab mode)
  /export <n>     - Export story n to a text document

SESSION:
  /history        - Show the messages of the active surface
  /clear          - Clear the active surface
  /treatise       - Show the scriptorium treatise
  /status         - Show current surface and mode
  /help, /?       - Show this help message

SESSION CONTROL:
  exit, quit, /exit - Leave interactive mode

NOTES:
  - Commands are case-insensitive
  - Regular text (not starting with /) is sent to the model
  - In the scriptorium, every message is answered with the treatise in view
"#
    );
}
