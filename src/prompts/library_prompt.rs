//! Library prompts
//!
//! One template per search mode. Quick and deep templates ask the model to
//! answer in the labelled story block format understood by
//! [`crate::story_parser`]; the collab template leaves the answer free-form.
//!
//! Parsed stories also offer follow-up actions. Each action phrases a new
//! query about the story and sends it in a fixed mode.

use crate::chat_mode::SearchMode;
use crate::error::StoryWeaverError;
use crate::message::Story;
use std::fmt;
use std::str::FromStr;

/// Quick mode template: find the named story, or a few thematic ones
const QUICK_TEMPLATE: &str = r#"You are a master librarian and storyteller.
**Crucial Rule:** Your absolute first priority is to identify if the user is asking for a *specific, named story, author, or book*. If they are, you MUST focus your entire effort on finding and presenting *that specific story*. Only if they ask for a theme or an idea should you search for multiple examples.

When you find the requested story:
- If it's short and in the public domain, present the full text.
- If it's under copyright or too long, provide a detailed summary.

You MUST format your response as follows, even if you only find one story. Use "---" as a separator if you find multiple thematically related stories (which you should only do if the user does not name a specific work).

## Title: [Title of the Story]
### Author: [Author's Name]
### Book: [Book or Collection Name]
### Story
[The full text or a detailed summary of the story here]

User query: "{query}""#;

/// Deep mode template: up to five obscure, connected stories
const DEEP_TEMPLATE: &str = r#"You are a literary scholar and mythologist with access to a vast digital library, equivalent to every book ever written. Your purpose is to unearth profound, obscure, and deeply resonant stories from the trenches of world literature. The user has a complex request. Your task is to perform a deep, multi-layered analysis of their query and provide up to 5 thematically connected stories.

Do not suggest common or obvious examples. Dig deeper. Find tales from forgotten texts, obscure folklore, dense novels, or philosophical works that contain powerful narratives.

For each story you find, you MUST follow this exact format and separate each story with "---":

## Title: [Title of the Story]
### Author: [Author's Name or "Traditional"]
### Book: [Book/Collection Name, including details if it's a small part of a larger work]
### Story
[Provide an in-depth, comprehensive summary of the story. If the story is long, capture its core narrative, themes, and emotional arc in detail. Do not be afraid to be thorough.]

---

User query: "{query}""#;

/// Collab mode template: dialogue rather than retrieval
const COLLAB_TEMPLATE: &str = r#"You are an insightful and collaborative literary analyst. Your role is to act as a creative partner to the user, helping them explore, analyze, and write about literature.

- Engage in a thoughtful dialogue. Ask clarifying questions if the user's query is ambiguous.
- Help the user brainstorm ideas, create outlines for essays, or co-write paragraphs of analysis.
- Discuss literary devices, character development, thematic depth, and historical context.
- When appropriate, quote or reference the text being discussed to support your points.
- Your tone should be encouraging, inquisitive, and scholarly, but accessible. Avoid simply giving a final answer; guide the user through the process of discovery.

The user wants to collaborate on the following topic: "{query}""#;

/// Generate the quick mode prompt for a user query
pub fn generate_quick_prompt(query: &str) -> String {
    QUICK_TEMPLATE.replace("{query}", query)
}

/// Generate the deep mode prompt for a user query
pub fn generate_deep_prompt(query: &str) -> String {
    DEEP_TEMPLATE.replace("{query}", query)
}

/// Generate the collab mode prompt for a user query
pub fn generate_collab_prompt(query: &str) -> String {
    COLLAB_TEMPLATE.replace("{query}", query)
}

/// Query asking for a detailed summary of a story
pub fn generate_tell_me_more_query(story: &Story) -> String {
    format!(
        "Tell me a detailed summary of \"{}\" from \"{}\" by {}.",
        story.title, story.citation.title, story.citation.author
    )
}

/// Query asking for stories with similar themes
pub fn generate_find_similar_query(story: &Story) -> String {
    format!("Find stories with themes similar to \"{}\".", story.title)
}

/// Query opening a collaborative analysis of a story
pub fn generate_analysis_query(story: &Story) -> String {
    format!(
        "Let's do a deep analysis of the themes and literary style of \"{}\" by {}. What are your initial thoughts?",
        story.title, story.citation.author
    )
}

/// Follow-up action on a parsed story
///
/// # Examples
///
/// ```
/// use storyweaver::chat_mode::SearchMode;
/// use storyweaver::prompts::StoryAction;
///
/// let action: StoryAction = "similar".parse().unwrap();
/// assert_eq!(action, StoryAction::FindSimilar);
/// assert_eq!(action.mode(), SearchMode::Deep);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoryAction {
    /// Detailed summary, quick mode
    TellMeMore,
    /// Thematically similar stories, deep mode
    FindSimilar,
    /// Collaborative analysis, collab mode
    Analyze,
}

impl StoryAction {
    /// All actions in display order
    pub const ALL: [StoryAction; 3] = [Self::TellMeMore, Self::FindSimilar, Self::Analyze];

    /// Search mode the follow-up query is sent in
    pub fn mode(&self) -> SearchMode {
        match self {
            Self::TellMeMore => SearchMode::Quick,
            Self::FindSimilar => SearchMode::Deep,
            Self::Analyze => SearchMode::Collab,
        }
    }

    /// Query text for this action on `story`
    pub fn query(&self, story: &Story) -> String {
        match self {
            Self::TellMeMore => generate_tell_me_more_query(story),
            Self::FindSimilar => generate_find_similar_query(story),
            Self::Analyze => generate_analysis_query(story),
        }
    }

    /// Short name used by the CLI and chat commands
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TellMeMore => "more",
            Self::FindSimilar => "similar",
            Self::Analyze => "analyze",
        }
    }
}

impl fmt::Display for StoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for StoryAction {
    type Err = StoryWeaverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "more" | "tell-me-more" => Ok(Self::TellMeMore),
            "similar" | "find-similar" => Ok(Self::FindSimilar),
            "analyze" | "analyse" => Ok(Self::Analyze),
            other => Err(StoryWeaverError::InvalidMode(format!(
                "Unknown story action: {} (expected more, similar or analyze)",
                other
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Citation;

    fn overcoat() -> Story {
        Story {
            title: "The Overcoat".to_string(),
            content: "Akaky Akakievich saves for a coat.".to_string(),
            citation: Citation {
                title: "Petersburg Tales".to_string(),
                author: "Nikolai Gogol".to_string(),
            },
        }
    }

    #[test]
    fn test_tell_me_more_query_is_quick() {
        let action = StoryAction::TellMeMore;
        assert_eq!(action.mode(), SearchMode::Quick);
        assert_eq!(
            action.query(&overcoat()),
            "Tell me a detailed summary of \"The Overcoat\" from \"Petersburg Tales\" by Nikolai Gogol."
        );
    }

    #[test]
    fn test_find_similar_query_is_deep() {
        let action = StoryAction::FindSimilar;
        assert_eq!(action.mode(), SearchMode::Deep);
        assert_eq!(
            action.query(&overcoat()),
            "Find stories with themes similar to \"The Overcoat\"."
        );
    }

    #[test]
    fn test_analysis_query_is_collab() {
        let action = StoryAction::Analyze;
        assert_eq!(action.mode(), SearchMode::Collab);
        assert_eq!(
            action.query(&overcoat()),
            "Let's do a deep analysis of the themes and literary style of \"The Overcoat\" by Nikolai Gogol. What are your initial thoughts?"
        );
    }

    #[test]
    fn test_story_action_names_round_trip() {
        for action in StoryAction::ALL {
            assert_eq!(action.as_str().parse::<StoryAction>().unwrap(), action);
        }
        assert_eq!("Tell-Me-More".parse::<StoryAction>().unwrap(), StoryAction::TellMeMore);
        assert!("summarize".parse::<StoryAction>().is_err());
    }

    #[test]
    fn test_quick_prompt_quotes_query() {
        let prompt = generate_quick_prompt("The Nose by Gogol");
        assert!(prompt.ends_with("User query: \"The Nose by Gogol\""));
        assert!(prompt.contains("## Title: [Title of the Story]"));
        assert!(prompt.contains("### Story"));
    }

    #[test]
    fn test_deep_prompt_asks_for_delimited_stories() {
        let prompt = generate_deep_prompt("betrayal among brothers");
        assert!(prompt.contains("up to 5 thematically connected stories"));
        assert!(prompt.contains("separate each story with \"---\""));
        assert!(prompt.contains("\"betrayal among brothers\""));
    }

    #[test]
    fn test_collab_prompt_has_no_block_format() {
        let prompt = generate_collab_prompt("Kafka's humour");
        assert!(!prompt.contains("## Title:"));
        assert!(prompt.ends_with("topic: \"Kafka's humour\""));
    }

    #[test]
    fn test_query_with_braces_is_inserted_verbatim() {
        let prompt = generate_quick_prompt("{odd} input");
        assert!(prompt.contains("\"{odd} input\""));
    }
}
