use crate::config::Config;
use crate::display::collect_stories;
use crate::error::Result;
use crate::message::{Message, Story};
use crate::preferences::ViewMode;
use chrono::{DateTime, Local};
use colored::Colorize;
use prettytable::{format, Table};
use ulid::Ulid;

const PREVIEW_CHARS: usize = 60;

/// Handle the `history` command
pub fn handle_history(config: &Config, surface: Option<String>) -> Result<()> {
    let store = super::open_store(config)?;
    let surface = super::resolve_surface(&store, surface.as_deref())?;

    let messages = match surface {
        ViewMode::Library => super::offline_library(config, store).messages(),
        ViewMode::Scriptorium => super::offline_scriptorium(config, store).messages(),
    };

    println!("\n{} history:", surface.to_string().bold());
    message_table(&messages).printstd();

    if surface == ViewMode::Library {
        let stories = collect_stories(&messages);
        if stories.is_empty() {
            println!("{}", "No stories found yet.".yellow());
        } else {
            println!("\nStories:");
            story_table(&stories).printstd();
            println!();
            println!(
                "Use {} to save a story as a document.",
                "storyweaver export <#>".cyan()
            );
        }
    }
    println!();

    Ok(())
}

/// Build a table of messages: number, time, sender, preview, story count
pub fn message_table(messages: &[Message]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "#".bold(),
        "Time".bold(),
        "From".bold(),
        "Message".bold(),
        "Stories".bold()
    ]);

    for (index, message) in messages.iter().enumerate() {
        let time = message_time(&message.id)
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        let stories = match message.stories().len() {
            0 => "-".to_string(),
            n => n.to_string(),
        };

        table.add_row(prettytable::row![
            index + 1,
            time,
            message.sender.to_string().cyan(),
            preview(&message.content),
            stories
        ]);
    }

    table
}

/// Build a numbered table of stories for export
pub fn story_table(stories: &[&Story]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "#".bold(),
        "Title".bold(),
        "Author".bold(),
        "Book".bold()
    ]);

    for (index, story) in stories.iter().enumerate() {
        table.add_row(prettytable::row![
            (index + 1).to_string().cyan(),
            story.title,
            story.citation.author,
            story.citation.title
        ]);
    }

    table
}

/// Creation time encoded in a `<prefix>-<ulid>` message id
///
/// Greetings (`init`) and ids from other sources have no time.
pub fn message_time(id: &str) -> Option<DateTime<Local>> {
    let (_, encoded) = id.split_once('-')?;
    let ulid = Ulid::from_string(encoded).ok()?;
    Some(DateTime::<Local>::from(ulid.datetime()))
}

/// First line of a message, shortened for table display
fn preview(content: &str) -> String {
    let first_line = content.lines().next().unwrap_or_default().trim();
    if first_line.chars().count() > PREVIEW_CHARS {
        let cut: String = first_line.chars().take(PREVIEW_CHARS - 3).collect();
        format!("{}...", cut)
    } else {
        first_line.to_string()
    }
}
