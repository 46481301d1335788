//! Story block parser for model output
//!
//! Models are asked to answer in a fixed, loosely structured format:
//!
//! ```text
//! ## Title: <title>
//! ### Author: <author>
//! ### Book: <book>
//! ### Story
//! <body, may span multiple lines>
//! ```
//!
//! Several blocks may be concatenated with a line containing `---`.
//! Parsing is deliberately forgiving: a block missing any of the four
//! fields is dropped without error, and an empty result simply means the
//! text carried no structured content.

use crate::message::{Citation, Story};
use regex::Regex;
use std::sync::OnceLock;

/// Literal separator between story blocks
pub const BLOCK_DELIMITER: &str = "---";

struct BlockPatterns {
    title: Regex,
    author: Regex,
    book: Regex,
    story: Regex,
}

fn patterns() -> &'static BlockPatterns {
    static PATTERNS: OnceLock<BlockPatterns> = OnceLock::new();
    PATTERNS.get_or_init(|| BlockPatterns {
        title: Regex::new(r"## Title: (.*)").expect("valid title pattern"),
        author: Regex::new(r"### Author: (.*)").expect("valid author pattern"),
        book: Regex::new(r"### Book: (.*)").expect("valid book pattern"),
        story: Regex::new(r"### Story\s*([\s\S]*)").expect("valid story pattern"),
    })
}

/// Parse every story block out of raw model text
///
/// Blocks are returned in source order. When no delimited block yields a
/// story, the whole untrimmed text is tried once as a single block.
///
/// # Examples
///
/// ```
/// use storyweaver::story_parser::parse_stories;
///
/// let text = "## Title: Fox\n### Author: Aesop\n### Book: Fables\n### Story\nA fox ran.\n---\n## Title: Crow\n### Author: Aesop\n### Book: Fables\n### Story\nA crow sang.";
/// let stories = parse_stories(text);
/// assert_eq!(stories.len(), 2);
/// assert_eq!(stories[0].title, "Fox");
/// assert_eq!(stories[1].title, "Crow");
/// ```
pub fn parse_stories(raw: &str) -> Vec<Story> {
    let stories: Vec<Story> = raw
        .split(BLOCK_DELIMITER)
        .map(str::trim)
        .filter(|block| !block.is_empty())
        .filter_map(extract_story)
        .collect();

    if !stories.is_empty() {
        return stories;
    }

    match extract_story(raw) {
        Some(story) => {
            tracing::debug!("Story parsed from undelimited text");
            vec![story]
        }
        None => Vec::new(),
    }
}

/// Extract a single story from one block of text
///
/// Returns `None` unless all four labelled fields are present.
pub fn extract_story(block: &str) -> Option<Story> {
    let p = patterns();
    let title = first_capture(&p.title, block)?;
    let author = first_capture(&p.author, block)?;
    let book = first_capture(&p.book, block)?;
    let content = first_capture(&p.story, block)?;

    Some(Story {
        title,
        content,
        citation: Citation {
            title: book,
            author,
        },
    })
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}
