//! Prompt templates
//!
//! This module builds the text sent to the provider for each kind of
//! request: the three library search modes and the scriptorium surface.

pub mod library_prompt;
pub mod scriptorium_prompt;

pub use library_prompt::StoryAction;

use crate::chat_mode::SearchMode;

/// Builds the prompt for a library query in the given mode
///
/// The user text is interpolated verbatim inside double quotes.
///
/// # Examples
///
/// ```
/// use storyweaver::prompts::build_library_prompt;
/// use storyweaver::chat_mode::SearchMode;
///
/// let prompt = build_library_prompt(SearchMode::Quick, "The Overcoat");
/// assert!(prompt.contains("master librarian"));
/// assert!(prompt.contains("\"The Overcoat\""));
/// ```
pub fn build_library_prompt(mode: SearchMode, query: &str) -> String {
    match mode {
        SearchMode::Quick => library_prompt::generate_quick_prompt(query),
        SearchMode::Deep => library_prompt::generate_deep_prompt(query),
        SearchMode::Collab => library_prompt::generate_collab_prompt(query),
    }
}
