//! Story export
//!
//! Lays a story out on fixed-geometry pages and writes it as a plain text
//! document: a centred header on the first page, the body word-wrapped
//! below it, and a form feed between pages. Export is one-way; exported
//! files are never read back.

use crate::config::ExportConfig;
use crate::error::{Result, StoryWeaverError};
use crate::message::Story;
use std::path::{Path, PathBuf};

/// Page separator in the rendered document
const PAGE_BREAK: char = '\u{0C}';

/// A story laid out into pages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportLayout {
    /// Story title
    pub title: String,
    /// `By: <author>` line
    pub byline: String,
    /// `From: <book>` line
    pub source_line: String,
    /// Body lines grouped by page; the first page always exists
    pub pages: Vec<Vec<String>>,
    width: usize,
}

impl ExportLayout {
    /// Lay out a story using the configured page geometry
    ///
    /// # Examples
    ///
    /// ```
    /// use storyweaver::config::ExportConfig;
    /// use storyweaver::export::ExportLayout;
    /// use storyweaver::message::{Citation, Story};
    ///
    /// let story = Story {
    ///     title: "The Fox".to_string(),
    ///     content: "A fox ran.".to_string(),
    ///     citation: Citation { title: "Fables".to_string(), author: "Aesop".to_string() },
    /// };
    /// let layout = ExportLayout::build(&story, &ExportConfig::default());
    /// assert_eq!(layout.pages.len(), 1);
    /// assert_eq!(layout.byline, "By: Aesop");
    /// ```
    pub fn build(story: &Story, config: &ExportConfig) -> Self {
        let lines = wrap_text(&story.content, config.line_width);
        let first = lines_per_page(config.first_page_top, config);
        let rest = lines_per_page(config.page_top, config);

        let mut pages = Vec::new();
        let mut remaining = lines.as_slice();
        let mut capacity = first;
        loop {
            let take = remaining.len().min(capacity);
            pages.push(remaining[..take].to_vec());
            remaining = &remaining[take..];
            if remaining.is_empty() {
                break;
            }
            capacity = rest;
        }

        Self {
            title: story.title.clone(),
            byline: format!("By: {}", story.citation.author),
            source_line: format!("From: {}", story.citation.title),
            pages,
            width: config.line_width,
        }
    }

    /// Number of pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Render the layout as a text document
    pub fn render(&self) -> String {
        let mut out = String::new();
        for (index, page) in self.pages.iter().enumerate() {
            if index == 0 {
                out.push_str(&center(&self.title, self.width));
                out.push('\n');
                out.push('\n');
                out.push_str(&center(&self.byline, self.width));
                out.push('\n');
                out.push_str(&center(&self.source_line, self.width));
                out.push_str("\n\n");
            } else {
                out.push(PAGE_BREAK);
            }
            for line in page {
                out.push_str(line);
                out.push('\n');
            }
        }
        out
    }
}

/// How many body lines fit between `top` and the page bottom
///
/// A line is drawn at every position up to and including `page_bottom`.
fn lines_per_page(top: u32, config: &ExportConfig) -> usize {
    if config.line_height == 0 || top > config.page_bottom {
        return 1;
    }
    ((config.page_bottom - top) / config.line_height + 1) as usize
}

fn center(text: &str, width: usize) -> String {
    let len = text.chars().count();
    if len >= width {
        return text.to_string();
    }
    format!("{}{}", " ".repeat((width - len) / 2), text)
}

/// Greedy word wrap that keeps explicit line breaks
///
/// Words longer than `width` are split across lines.
pub fn wrap_text(content: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in content.lines() {
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();

            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }

            if current_len > 0 && current_len + 1 + word.len() > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current_len += word.len();
            current.extend(word);
        }

        lines.push(current);
    }

    lines
}

/// File name for an exported story
///
/// Whitespace and path separators become `_`, so the name is always a
/// single component inside the export directory.
///
/// # Errors
///
/// Returns `StoryWeaverError::Export` when nothing usable is left of the
/// title (empty, `.` or `..`)
///
/// # Examples
///
/// ```
/// use storyweaver::export::export_filename;
///
/// assert_eq!(export_filename("The Fox and the Grapes").unwrap(), "The_Fox_and_the_Grapes.txt");
/// assert_eq!(export_filename("../x").unwrap(), ".._x.txt");
/// assert!(export_filename("..").is_err());
/// ```
pub fn export_filename(title: &str) -> Result<String> {
    let stem: String = title
        .trim()
        .chars()
        .map(|c| {
            if c.is_whitespace() || c == '/' || c == '\\' || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();

    if stem.is_empty() || stem == "." || stem == ".." {
        return Err(StoryWeaverError::Export(format!(
            "Cannot derive a file name from the title {:?}; pass --out",
            title
        ))
        .into());
    }
    Ok(format!("{}.txt", stem))
}

/// Lay out a story and write it to disk
///
/// The file goes to `out` when given, otherwise to the configured output
/// directory (or the current directory) under [`export_filename`].
///
/// # Errors
///
/// Returns `StoryWeaverError::Export` if the file cannot be written
pub fn write_story(story: &Story, config: &ExportConfig, out: Option<&Path>) -> Result<PathBuf> {
    let path = match out {
        Some(path) => path.to_path_buf(),
        None => config
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(export_filename(&story.title)?),
    };

    let layout = ExportLayout::build(story, config);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| {
            StoryWeaverError::Export(format!("Failed to create {}: {}", parent.display(), e))
        })?;
    }
    std::fs::write(&path, layout.render()).map_err(|e| {
        StoryWeaverError::Export(format!("Failed to write {}: {}", path.display(), e))
    })?;

    tracing::info!(
        "Exported \"{}\" ({} pages) to {}",
        story.title,
        layout.page_count(),
        path.display()
    );
    Ok(path)
}
