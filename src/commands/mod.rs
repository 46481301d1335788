/*!
Command handlers for the CLI

This module provides the handlers invoked by the CLI entrypoint:

- `ask`         - Send one library query
- `follow_up`   - Follow-up action on a library story
- `chat`        - Interactive library and scriptorium loop
- `history`     - Print a session as a table
- `scriptorium` - Treatise editing, consultation and transcription
- `export`      - Write a library story to a text document
- `settings`    - Theme and view preferences, session clearing

Commands that never call the model open their sessions with
[`OfflineProvider`] so they work without credentials.
*/

use crate::chat_mode::SearchMode;
use crate::config::Config;
use crate::display::render_message;
use crate::error::{Result, StoryWeaverError};
use crate::preferences::{Preferences, ViewMode};
use crate::providers::{create_provider, OfflineProvider};
use crate::session::{LibrarySession, Scriptorium, SendOutcome};
use crate::storage::SlotStore;
use colored::Colorize;
use std::sync::Arc;

// Special commands parser for the chat loop
pub mod special_commands;

// History tables
pub mod history;

/// Open the slot store named by the configuration
pub fn open_store(config: &Config) -> Result<SlotStore> {
    match &config.storage.path {
        Some(path) => SlotStore::open(path),
        None => SlotStore::open_default(),
    }
}

/// Parse an explicit surface name, or fall back to the saved view
pub fn resolve_surface(store: &SlotStore, surface: Option<&str>) -> Result<ViewMode> {
    match surface {
        Some(name) => Ok(name.parse::<ViewMode>()?),
        None => Ok(Preferences::new(store.clone()).view_mode()),
    }
}

fn offline_library(config: &Config, store: SlotStore) -> LibrarySession {
    LibrarySession::new(
        Arc::new(OfflineProvider),
        store,
        config.provider.gemini.clone(),
    )
}

fn offline_scriptorium(config: &Config, store: SlotStore) -> Scriptorium {
    Scriptorium::new(
        Arc::new(OfflineProvider),
        store,
        config.provider.gemini.clone(),
    )
}

/// Print the result of a send and convert a failure into an error
fn report_outcome(outcome: SendOutcome) -> Result<()> {
    match outcome {
        SendOutcome::Replied(message) => {
            println!("\n{}", render_message(&message));
            Ok(())
        }
        SendOutcome::Failed(message) => {
            eprintln!("\n{}", render_message(&message));
            Err(StoryWeaverError::Provider(message.content).into())
        }
        SendOutcome::Rejected => {
            println!("{}", "Nothing to send.".yellow());
            Ok(())
        }
        SendOutcome::Discarded => {
            println!("{}", "The session was cleared before the reply arrived.".yellow());
            Ok(())
        }
    }
}

// Single query handler
pub mod ask {
    //! One-shot library query.

    use super::*;

    /// Send one query to the library and print the reply
    ///
    /// # Errors
    ///
    /// Returns error if the mode is unknown, the provider cannot be created,
    /// or the provider call fails
    pub async fn run_ask(config: Config, text: String, mode: String) -> Result<()> {
        let mode: SearchMode = mode.parse()?;
        let store = open_store(&config)?;
        let provider = create_provider(&config.provider)?;
        let library = LibrarySession::new(provider, store, config.provider.gemini.clone());

        println!("{} {}", mode.colored_tag(), "Searching the archive...".dimmed());
        report_outcome(library.send_message(&text, mode).await)
    }
}

// Story follow-up handler
pub mod follow_up {
    //! Follow-up actions on stories already in the library.

    use super::*;
    use crate::prompts::StoryAction;

    /// Run `action` on library story `number` and print the reply
    ///
    /// # Errors
    ///
    /// Returns error if the action is unknown, the story does not exist,
    /// the provider cannot be created, or the provider call fails
    pub async fn run_follow_up(config: Config, number: usize, action: String) -> Result<()> {
        let action: StoryAction = action.parse()?;
        let store = open_store(&config)?;
        let provider = create_provider(&config.provider)?;
        let library = LibrarySession::new(provider, store, config.provider.gemini.clone());

        if let Some(story) = library.story(number) {
            println!(
                "{} {}",
                action.mode().colored_tag(),
                action.query(&story).dimmed()
            );
        }
        report_outcome(library.follow_up(number, action).await?)
    }
}

// Interactive chat handler
pub mod chat {
    //! Interactive chat over both surfaces.
    //!
    //! Plain lines go to the active surface: library queries use the current
    //! search mode, scriptorium lines consult on the treatise. Lines starting
    //! with `/` are special commands.

    use super::special_commands::{parse_special_command, print_help, SpecialCommand};
    use super::*;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat
    pub async fn run_chat(config: Config, mode: String, surface: Option<String>) -> Result<()> {
        tracing::info!("Starting interactive chat");

        let mut mode: SearchMode = mode.parse()?;
        let store = open_store(&config)?;
        let preferences = Preferences::new(store.clone());
        let mut view = resolve_surface(&store, surface.as_deref())?;

        let provider = create_provider(&config.provider)?;
        let library = LibrarySession::new(
            Arc::clone(&provider),
            store.clone(),
            config.provider.gemini.clone(),
        );
        let scriptorium = Scriptorium::new(provider, store, config.provider.gemini.clone());

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(view, mode);
        print_last_message(view, &library, &scriptorium);

        loop {
            let prompt = match view {
                ViewMode::Library => mode.format_colored_prompt(),
                ViewMode::Scriptorium => format!("[{}] >> ", "SCRIPTORIUM".yellow()),
            };

            match rl.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(trimmed);

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::SwitchMode(new_mode) => {
                            let old = mode;
                            mode = new_mode;
                            println!("Switched from {} to {} mode\n", old, new_mode);
                            if view == ViewMode::Scriptorium {
                                println!(
                                    "{}",
                                    "Search modes apply to the library; use /library to switch."
                                        .dimmed()
                                );
                            }
                        }
                        SpecialCommand::SwitchView(new_view) => {
                            view = new_view;
                            if let Err(e) = preferences.set_view_mode(view) {
                                tracing::warn!("Failed to save view mode: {}", e);
                            }
                            println!("Now in the {}\n", view);
                            print_last_message(view, &library, &scriptorium);
                        }
                        SpecialCommand::Clear => {
                            match view {
                                ViewMode::Library => library.clear_history(),
                                ViewMode::Scriptorium => scriptorium.reset(),
                            }
                            print_last_message(view, &library, &scriptorium);
                        }
                        SpecialCommand::ShowHistory => {
                            let messages = match view {
                                ViewMode::Library => library.messages(),
                                ViewMode::Scriptorium => scriptorium.messages(),
                            };
                            for message in &messages {
                                println!("{}", render_message(message));
                            }
                        }
                        SpecialCommand::ShowTreatise => print_treatise(&scriptorium.treatise()),
                        SpecialCommand::Export(index) => {
                            match export::export_from(&library.messages(), index, &config, None) {
                                Ok(path) => println!(
                                    "{}",
                                    format!("Exported to {}", path.display()).green()
                                ),
                                Err(e) => eprintln!("{}", e.to_string().red()),
                            }
                        }
                        SpecialCommand::FollowUp(action, number) => {
                            if view == ViewMode::Scriptorium {
                                println!("{}", "Answering in the library.".dimmed());
                            }
                            println!("{}", action.mode().colored_tag());
                            match library.follow_up(number, action).await {
                                Ok(outcome) => {
                                    if let Some(message) = outcome.message() {
                                        println!("\n{}", render_message(message));
                                    }
                                }
                                Err(e) => eprintln!("{}", e.to_string().red()),
                            }
                        }
                        SpecialCommand::ShowStatus => {
                            print_status(view, mode, &preferences, &library, &scriptorium)
                        }
                        SpecialCommand::Help => print_help(),
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => {
                            let outcome = match view {
                                ViewMode::Library => library.send_message(trimmed, mode).await,
                                ViewMode::Scriptorium => scriptorium.consult(trimmed).await,
                            };
                            if let Some(message) = outcome.message() {
                                println!("\n{}", render_message(message));
                            }
                        }
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn print_welcome_banner(view: ViewMode, mode: SearchMode) {
        println!();
        println!("{}", "Story Weaver".bold());
        println!("Surface: {}  Mode: {}", view.to_string().cyan(), mode.colored_tag());
        println!("Type {} for commands, {} to leave.\n", "/help".cyan(), "exit".cyan());
    }

    fn print_last_message(view: ViewMode, library: &LibrarySession, scriptorium: &Scriptorium) {
        let messages = match view {
            ViewMode::Library => library.messages(),
            ViewMode::Scriptorium => scriptorium.messages(),
        };
        if let Some(last) = messages.last() {
            println!("{}", render_message(last));
        }
    }

    fn print_status(
        view: ViewMode,
        mode: SearchMode,
        preferences: &Preferences,
        library: &LibrarySession,
        scriptorium: &Scriptorium,
    ) {
        println!();
        println!("Surface:  {}", view.to_string().cyan());
        println!("Mode:     {} - {}", mode.colored_tag(), mode.description());
        println!("Theme:    {}", preferences.theme());
        println!("Library:  {} messages", library.messages().len());
        println!(
            "Treatise: {} words, {} messages",
            scriptorium.treatise().split_whitespace().count(),
            scriptorium.messages().len()
        );
        println!();
    }
}

/// Print the treatise, or a placeholder when it is empty
fn print_treatise(treatise: &str) {
    if treatise.trim().is_empty() {
        println!("{}", "The treatise is empty.".yellow());
    } else {
        println!("\n{}\n", treatise);
    }
}

// Scriptorium command handler
pub mod scriptorium {
    //! Treatise editing, consultation and transcription.

    use super::*;
    use crate::cli::ScriptoriumCommand;
    use rustyline::DefaultEditor;
    use std::path::Path;

    /// Handle a scriptorium subcommand
    pub async fn handle_scriptorium(config: Config, command: ScriptoriumCommand) -> Result<()> {
        let store = open_store(&config)?;

        match command {
            ScriptoriumCommand::Consult { instruction } => {
                let provider = create_provider(&config.provider)?;
                let scriptorium = Scriptorium::new(provider, store, config.provider.gemini.clone());
                report_outcome(scriptorium.consult(&instruction).await)
            }
            ScriptoriumCommand::Show => {
                print_treatise(&offline_scriptorium(&config, store).treatise());
                Ok(())
            }
            ScriptoriumCommand::Set { text, file } => {
                let text = match (text, file) {
                    (Some(text), _) => text,
                    (None, Some(file)) => std::fs::read_to_string(&file)?,
                    (None, None) => {
                        return Err(StoryWeaverError::Config(
                            "Provide the treatise text or --file".to_string(),
                        )
                        .into())
                    }
                };
                offline_scriptorium(&config, store).set_treatise(&text);
                println!("{}", "Treatise replaced.".green());
                Ok(())
            }
            ScriptoriumCommand::Append { text } => {
                offline_scriptorium(&config, store).append_to_treatise(&text);
                println!("{}", "Appended to the treatise.".green());
                Ok(())
            }
            ScriptoriumCommand::Transcribe { file, mime_type } => {
                let mime_type = match mime_type {
                    Some(mime) => mime,
                    None => guess_audio_mime(&file)?.to_string(),
                };
                let audio = std::fs::read(&file)?;
                let provider = create_provider(&config.provider)?;
                let scriptorium = Scriptorium::new(provider, store, config.provider.gemini.clone());
                let text = scriptorium.transcribe(&audio, &mime_type).await?;
                if text.is_empty() {
                    println!("{}", "Nothing was transcribed.".yellow());
                } else {
                    println!("{}\n\n{}", "Transcribed:".green(), text);
                }
                Ok(())
            }
            ScriptoriumCommand::Reset { yes } => {
                if !yes && !confirm("Clear your current work and history? [y/N] ")? {
                    println!("{}", "Reset cancelled.".yellow());
                    return Ok(());
                }
                offline_scriptorium(&config, store).reset();
                println!("{}", "Scriptorium reset.".green());
                Ok(())
            }
        }
    }

    fn confirm(prompt: &str) -> Result<bool> {
        let mut rl = DefaultEditor::new()?;
        match rl.readline(prompt) {
            Ok(answer) => Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")),
            Err(_) => Ok(false),
        }
    }

    /// MIME type for common audio file extensions
    pub fn guess_audio_mime(path: &Path) -> Result<&'static str> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let mime = match extension.as_str() {
            "webm" => "audio/webm",
            "mp3" => "audio/mpeg",
            "wav" => "audio/wav",
            "ogg" | "oga" => "audio/ogg",
            "m4a" | "mp4" => "audio/mp4",
            "flac" => "audio/flac",
            "aac" => "audio/aac",
            _ => {
                return Err(StoryWeaverError::Config(format!(
                    "Cannot guess the audio type of {}; pass --mime-type",
                    path.display()
                ))
                .into())
            }
        };
        Ok(mime)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_guess_audio_mime() {
            assert_eq!(guess_audio_mime(Path::new("memo.webm")).unwrap(), "audio/webm");
            assert_eq!(guess_audio_mime(Path::new("a/b/NOTE.MP3")).unwrap(), "audio/mpeg");
            assert!(guess_audio_mime(Path::new("notes.txt")).is_err());
            assert!(guess_audio_mime(Path::new("noext")).is_err());
        }
    }
}

// Export command handler
pub mod export {
    //! Story export by number.

    use super::*;
    use crate::display::collect_stories;
    use crate::export::write_story;
    use crate::message::Message;
    use std::path::{Path, PathBuf};

    /// Export library story `index` (1-based)
    pub fn handle_export(config: &Config, index: usize, out: Option<PathBuf>) -> Result<()> {
        let store = open_store(config)?;
        let messages = offline_library(config, store).messages();
        let path = export_from(&messages, index, config, out.as_deref())?;
        println!("{}", format!("Exported to {}", path.display()).green());
        Ok(())
    }

    /// Export story `index` (1-based) from a list of messages
    ///
    /// # Errors
    ///
    /// Returns `StoryWeaverError::StoryNotFound` if there is no such story,
    /// or `StoryWeaverError::Export` if the file cannot be written
    pub fn export_from(
        messages: &[Message],
        index: usize,
        config: &Config,
        out: Option<&Path>,
    ) -> Result<PathBuf> {
        let stories = collect_stories(messages);
        let story = index
            .checked_sub(1)
            .and_then(|i| stories.get(i))
            .ok_or(StoryWeaverError::StoryNotFound {
                number: index,
                available: stories.len(),
            })?;
        write_story(story, &config.export, out)
    }
}

// Preference and session-clearing handlers
pub mod settings {
    //! Theme, view mode and session clearing.

    use super::*;
    use crate::preferences::Theme;

    /// Show, toggle or set the theme
    pub fn handle_theme(config: &Config, action: Option<String>) -> Result<()> {
        let preferences = Preferences::new(open_store(config)?);
        let theme = match action.as_deref().map(|a| a.trim().to_lowercase()) {
            None => preferences.theme(),
            Some(action) if action == "toggle" => preferences.toggle_theme()?,
            Some(action) => {
                let theme: Theme = action.parse()?;
                preferences.set_theme(theme)?;
                theme
            }
        };
        println!("Theme: {}", theme.to_string().cyan());
        Ok(())
    }

    /// Show or set the saved view
    pub fn handle_view(config: &Config, mode: Option<String>) -> Result<()> {
        let preferences = Preferences::new(open_store(config)?);
        let view = match mode {
            None => preferences.view_mode(),
            Some(name) => {
                let view: ViewMode = name.parse()?;
                preferences.set_view_mode(view)?;
                view
            }
        };
        println!("View: {}", view.to_string().cyan());
        Ok(())
    }

    /// Clear a surface's session
    pub fn handle_clear(config: &Config, surface: Option<String>) -> Result<()> {
        let store = open_store(config)?;
        let surface = resolve_surface(&store, surface.as_deref())?;
        match surface {
            ViewMode::Library => offline_library(config, store).clear_history(),
            ViewMode::Scriptorium => offline_scriptorium(config, store).reset(),
        }
        println!("{}", format!("Cleared the {}.", surface).green());
        Ok(())
    }
}
