//! Library session
//!
//! The story-finding chat: every query is sent with the template and model
//! of the chosen [`SearchMode`], and replies are searched for story blocks.

use super::{ChatSession, SendOutcome};
use crate::chat_mode::SearchMode;
use crate::config::GeminiConfig;
use crate::error::{Result, StoryWeaverError};
use crate::message::{Message, Sender, Story};
use crate::prompts::{build_library_prompt, StoryAction};
use crate::providers::{GenerationRequest, Provider};
use crate::storage::{keys, SlotStore};
use crate::story_parser::parse_stories;
use std::sync::Arc;

/// Greeting shown in a fresh library
pub const WELCOME_GREETING: &str = "Welcome to the Story Weaver's archive. How can I help you? Ask for a specific story, or describe a theme you wish to explore.";

/// Greeting shown after the history is cleared
pub const CLEARED_GREETING: &str = "Archives cleared. How can I help you today?";

/// Notice appended when the provider call fails
pub const ERROR_NOTICE: &str =
    "There was an error processing your request. Please check the logs and try again.";

/// Persisted story-finding conversation
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use storyweaver::chat_mode::SearchMode;
/// use storyweaver::config::Config;
/// use storyweaver::providers::create_provider;
/// use storyweaver::session::LibrarySession;
/// use storyweaver::storage::SlotStore;
///
/// # async fn example() -> storyweaver::error::Result<()> {
/// let config = Config::default();
/// let provider = create_provider(&config.provider)?;
/// let session = LibrarySession::new(provider, SlotStore::open_default()?, config.provider.gemini);
/// session.send_message("The Overcoat by Gogol", SearchMode::Quick).await;
/// # Ok(())
/// # }
/// ```
pub struct LibrarySession {
    provider: Arc<dyn Provider>,
    chat: ChatSession,
    config: GeminiConfig,
}

impl LibrarySession {
    /// Open the library, restoring saved messages from the store
    pub fn new(provider: Arc<dyn Provider>, store: SlotStore, config: GeminiConfig) -> Self {
        let chat = ChatSession::open(store, keys::LIBRARY_MESSAGES, "library", || {
            Message::greeting(Sender::System, WELCOME_GREETING)
        });
        Self {
            provider,
            chat,
            config,
        }
    }

    /// Snapshot of the current messages
    pub fn messages(&self) -> Vec<Message> {
        self.chat.messages()
    }

    /// Whether a request is in flight
    pub fn is_loading(&self) -> bool {
        self.chat.is_loading()
    }

    /// Send a query in the given mode
    ///
    /// Blank input, or input arriving while another request is in flight,
    /// is rejected without touching the session. Otherwise the user
    /// message is appended, one provider call is made, and either the reply
    /// or a fixed error notice is appended.
    pub async fn send_message(&self, text: &str, mode: SearchMode) -> SendOutcome {
        let Some(ticket) = self.chat.begin(text) else {
            return SendOutcome::Rejected;
        };

        let profile = self.config.mode(mode);
        let request = GenerationRequest::new(&profile.model, build_library_prompt(mode, text))
            .with_thinking_budget(profile.thinking_budget)
            .with_search_grounding(mode.uses_search_grounding());

        tracing::info!(mode = %mode, model = %profile.model, "Sending library query");

        let (message, failed) = match self.provider.generate(&request).await {
            Ok(response) => {
                let stories = if mode.parses_stories() {
                    parse_stories(&response.text)
                } else {
                    Vec::new()
                };
                tracing::info!(
                    "Library reply: {} stories, {} sources",
                    stories.len(),
                    response.sources.len()
                );
                (Message::ai(response.text, stories, response.sources), false)
            }
            Err(e) => {
                tracing::error!("Library query failed: {:#}", e);
                (Message::error_notice(ERROR_NOTICE), true)
            }
        };

        self.chat.finish(ticket, message, failed)
    }

    /// Story `number` (1-based) across all replies, in message order
    pub fn story(&self, number: usize) -> Option<Story> {
        let index = number.checked_sub(1)?;
        self.chat
            .messages()
            .iter()
            .flat_map(|m| m.stories())
            .nth(index)
            .cloned()
    }

    /// Run a follow-up action on story `number`
    ///
    /// The action's query goes through [`send_message`](Self::send_message)
    /// in the action's own mode, so gating and persistence are unchanged.
    ///
    /// # Errors
    ///
    /// Returns `StoryWeaverError::StoryNotFound` if the library holds no
    /// such story
    pub async fn follow_up(&self, number: usize, action: StoryAction) -> Result<SendOutcome> {
        let story = self.story(number).ok_or_else(|| StoryWeaverError::StoryNotFound {
            number,
            available: self
                .chat
                .messages()
                .iter()
                .map(|m| m.stories().len())
                .sum(),
        })?;

        tracing::debug!(action = %action, title = %story.title, "Story follow-up");
        Ok(self.send_message(&action.query(&story), action.mode()).await)
    }

    /// Replace the history with the cleared greeting
    ///
    /// A reply still in flight when this is called is dropped on arrival.
    pub fn clear_history(&self) {
        self.chat
            .reset(Message::greeting(Sender::System, CLEARED_GREETING));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Source;
    use crate::providers::GenerationResponse;
    use crate::test_utils::{temp_store, ScriptedProvider};

    const TWO_STORIES: &str = "## Title: A\n### Author: X\n### Book: B\n### Story\nOne.\n---\n## Title: C\n### Author: Y\n### Book: D\n### Story\nTwo.";

    fn library(provider: Arc<ScriptedProvider>) -> LibrarySession {
        LibrarySession::new(provider, temp_store(), GeminiConfig::default())
    }

    #[test]
    fn test_fresh_library_has_welcome_greeting() {
        let session = library(ScriptedProvider::new());
        let messages = session.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].sender, Sender::System);
        assert_eq!(messages[0].content, WELCOME_GREETING);
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_quick_reply_parses_stories_and_sources() {
        let provider = ScriptedProvider::new();
        provider.push_reply(GenerationResponse::with_sources(
            TWO_STORIES,
            vec![Source {
                uri: "https://example.com".to_string(),
                title: "Example".to_string(),
            }],
        ));
        let session = library(provider.clone());

        let outcome = session.send_message("fables", SearchMode::Quick).await;
        let reply = outcome.message().unwrap();
        assert_eq!(reply.sender, Sender::Ai);
        assert_eq!(reply.content, TWO_STORIES);
        assert_eq!(reply.stories().len(), 2);
        assert_eq!(reply.sources().len(), 1);

        let messages = session.messages();
        assert_eq!(messages.len(), 3);
        assert_eq!(messages[1].sender, Sender::User);
        assert_eq!(messages[1].content, "fables");
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn test_request_follows_mode_profile() {
        let provider = ScriptedProvider::new();
        provider.push_reply(GenerationResponse::new("a"));
        provider.push_reply(GenerationResponse::new("b"));
        provider.push_reply(GenerationResponse::new("c"));
        let session = library(provider.clone());

        session.send_message("q", SearchMode::Quick).await;
        session.send_message("d", SearchMode::Deep).await;
        session.send_message("c", SearchMode::Collab).await;

        let requests = provider.requests();
        assert_eq!(requests[0].model, "gemini-2.5-flash");
        assert!(requests[0].search_grounding);
        assert_eq!(requests[0].thinking_budget, None);
        assert!(requests[0].prompt.contains("master librarian"));

        assert_eq!(requests[1].model, "gemini-2.5-pro");
        assert!(!requests[1].search_grounding);
        assert_eq!(requests[1].thinking_budget, Some(32768));

        assert_eq!(requests[2].thinking_budget, Some(16384));
        assert!(requests[2].prompt.contains("\"c\""));
    }

    #[tokio::test]
    async fn test_collab_reply_is_not_parsed() {
        let provider = ScriptedProvider::new();
        provider.push_reply(GenerationResponse::new(TWO_STORIES));
        let session = library(provider);

        let outcome = session.send_message("discuss", SearchMode::Collab).await;
        assert!(outcome.message().unwrap().stories.is_none());
    }

    #[tokio::test]
    async fn test_unstructured_reply_has_no_stories() {
        let provider = ScriptedProvider::new();
        provider.push_reply(GenerationResponse::new("I could not find that story."));
        let session = library(provider);

        let outcome = session.send_message("??", SearchMode::Deep).await;
        assert!(outcome.message().unwrap().stories.is_none());
    }

    #[tokio::test]
    async fn test_blank_input_is_rejected_without_provider_call() {
        let provider = ScriptedProvider::new();
        let session = library(provider.clone());

        assert_eq!(
            session.send_message("  \n ", SearchMode::Quick).await,
            SendOutcome::Rejected
        );
        assert_eq!(session.messages().len(), 1);
        assert!(provider.requests().is_empty());
    }

    #[tokio::test]
    async fn test_provider_failure_appends_error_notice() {
        let provider = ScriptedProvider::new();
        provider.push_error("quota exhausted");
        let session = library(provider);

        let outcome = session.send_message("q", SearchMode::Quick).await;
        let notice = match outcome {
            SendOutcome::Failed(message) => message,
            other => panic!("expected failure, got {:?}", other),
        };
        assert_eq!(notice.sender, Sender::System);
        assert_eq!(notice.content, ERROR_NOTICE);
        assert!(!notice.content.contains("quota"));
        assert!(!session.is_loading());
        assert_eq!(session.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_clear_history_leaves_one_greeting() {
        let provider = ScriptedProvider::new();
        provider.push_reply(GenerationResponse::new("x"));
        let session = library(provider);
        session.send_message("q", SearchMode::Quick).await;

        session.clear_history();
        let messages = session.messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, CLEARED_GREETING);
        assert_eq!(messages[0].sender, Sender::System);
    }

    #[tokio::test]
    async fn test_follow_up_actions_use_story_and_mode() {
        let provider = ScriptedProvider::new();
        provider.push_reply(GenerationResponse::new(TWO_STORIES));
        for _ in StoryAction::ALL {
            provider.push_reply(GenerationResponse::new("follow-up"));
        }
        let session = library(provider.clone());
        session.send_message("fables", SearchMode::Quick).await;

        assert_eq!(session.story(2).unwrap().title, "C");
        for action in StoryAction::ALL {
            let outcome = session.follow_up(2, action).await.unwrap();
            assert!(matches!(outcome, SendOutcome::Replied(_)));
        }

        let requests = provider.requests();
        assert_eq!(requests.len(), 4);

        assert_eq!(requests[1].model, "gemini-2.5-flash");
        assert!(requests[1].search_grounding);
        assert!(requests[1]
            .prompt
            .contains("Tell me a detailed summary of \"C\" from \"D\" by Y."));

        assert_eq!(requests[2].model, "gemini-2.5-pro");
        assert_eq!(requests[2].thinking_budget, Some(32768));
        assert!(requests[2]
            .prompt
            .contains("Find stories with themes similar to \"C\"."));

        assert_eq!(requests[3].thinking_budget, Some(16384));
        assert!(requests[3]
            .prompt
            .contains("literary style of \"C\" by Y. What are your initial thoughts?"));

        let messages = session.messages();
        assert_eq!(
            messages[3].content,
            "Tell me a detailed summary of \"C\" from \"D\" by Y."
        );
    }

    #[tokio::test]
    async fn test_follow_up_on_missing_story_fails_without_call() {
        let provider = ScriptedProvider::new();
        let session = library(provider.clone());

        assert!(session.story(0).is_none());
        let err = session
            .follow_up(1, StoryAction::TellMeMore)
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<StoryWeaverError>(),
            Some(StoryWeaverError::StoryNotFound {
                number: 1,
                available: 0
            })
        ));
        assert!(provider.requests().is_empty());
        assert_eq!(session.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_history_survives_reopen() {
        let store = temp_store();
        let provider = ScriptedProvider::new();
        provider.push_reply(GenerationResponse::new(TWO_STORIES));

        let session = LibrarySession::new(provider.clone(), store.clone(), GeminiConfig::default());
        session.send_message("fables", SearchMode::Quick).await;
        let before = session.messages();
        drop(session);

        let reopened = LibrarySession::new(provider, store, GeminiConfig::default());
        assert_eq!(reopened.messages(), before);
    }
}
