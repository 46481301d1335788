//! Terminal rendering of messages and stories
//!
//! A reply with parsed stories is shown as story cards; a reply without
//! stories falls back to its raw text.

use crate::message::{Message, Sender, Source, Story};
use colored::Colorize;

/// Label shown before a message
fn sender_label(sender: Sender) -> String {
    match sender {
        Sender::User => "You".cyan().bold().to_string(),
        Sender::Ai => "Weaver".magenta().bold().to_string(),
        Sender::System => "Archive".yellow().bold().to_string(),
    }
}

/// Render one message for the terminal
pub fn render_message(message: &Message) -> String {
    let mut out = format!("{}\n", sender_label(message.sender));

    if message.stories().is_empty() {
        out.push_str(&message.content);
        out.push('\n');
    } else {
        for (index, story) in message.stories().iter().enumerate() {
            if index > 0 {
                out.push('\n');
            }
            out.push_str(&render_story(story));
        }
    }

    if !message.sources().is_empty() {
        out.push('\n');
        out.push_str(&render_sources(message.sources()));
    }

    out
}

/// Render a story card: title, attribution, then the text
pub fn render_story(story: &Story) -> String {
    format!(
        "{}\n{}\n\n{}\n",
        story.title.bold().underline(),
        format!("{}, {}", story.citation.author, story.citation.title)
            .italic()
            .dimmed(),
        story.content
    )
}

/// Render grounding sources as a numbered list
pub fn render_sources(sources: &[Source]) -> String {
    let mut out = format!("{}\n", "Sources:".bold());
    for (index, source) in sources.iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} {}\n",
            index + 1,
            source.title,
            source.uri.blue().underline()
        ));
    }
    out
}

/// Every story in a session, in order, for numbering on export
pub fn collect_stories(messages: &[Message]) -> Vec<&Story> {
    messages.iter().flat_map(|m| m.stories()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Citation;

    fn story(title: &str) -> Story {
        Story {
            title: title.to_string(),
            content: format!("{} body", title),
            citation: Citation {
                title: "Book".to_string(),
                author: "Author".to_string(),
            },
        }
    }

    #[test]
    fn test_render_message_without_stories_shows_raw_text() {
        colored::control::set_override(false);
        let rendered = render_message(&Message::ai("plain answer", vec![], vec![]));
        assert!(rendered.contains("Weaver"));
        assert!(rendered.contains("plain answer"));
    }

    #[test]
    fn test_render_message_with_stories_shows_cards() {
        colored::control::set_override(false);
        let msg = Message::ai("## Title: raw", vec![story("One"), story("Two")], vec![]);
        let rendered = render_message(&msg);
        assert!(rendered.contains("One body"));
        assert!(rendered.contains("Two body"));
        assert!(rendered.contains("Author, Book"));
        assert!(!rendered.contains("## Title: raw"));
    }

    #[test]
    fn test_render_sources() {
        colored::control::set_override(false);
        let msg = Message::ai(
            "x",
            vec![],
            vec![Source {
                uri: "https://example.com".to_string(),
                title: "Example".to_string(),
            }],
        );
        let rendered = render_message(&msg);
        assert!(rendered.contains("Sources:"));
        assert!(rendered.contains("1. Example https://example.com"));
    }

    #[test]
    fn test_collect_stories_in_order() {
        let messages = vec![
            Message::user("q"),
            Message::ai("a", vec![story("A"), story("B")], vec![]),
            Message::ai("c", vec![story("C")], vec![]),
        ];
        let titles: Vec<&str> = collect_stories(&messages)
            .iter()
            .map(|s| s.title.as_str())
            .collect();
        assert_eq!(titles, vec!["A", "B", "C"]);
    }
}
