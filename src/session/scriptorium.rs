//! Scriptorium writing surface
//!
//! A treatise buffer plus a consultation chat. Every consultation embeds
//! the current treatise in the prompt; transcriptions of recorded audio are
//! appended to the treatise. Both live in their own slots, independent of
//! the library.

use super::{ChatSession, SendOutcome};
use crate::config::GeminiConfig;
use crate::error::{Result, StoryWeaverError};
use crate::message::{Message, Sender};
use crate::prompts::scriptorium_prompt::{generate_consult_prompt, TRANSCRIPTION_INSTRUCTION};
use crate::providers::{GenerationRequest, InlineData, Provider};
use crate::storage::{keys, SlotStore};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Greeting shown in a fresh or reset scriptorium
pub const READY_GREETING: &str =
    "I am ready. We can write, debate, or refine. The direction is yours.";

/// Notice appended when a consultation fails
pub const ERROR_NOTICE: &str = "I am having trouble consulting the archives right now.";

/// Separator placed between existing treatise text and appended text
const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Treatise buffer and consultation chat
pub struct Scriptorium {
    provider: Arc<dyn Provider>,
    store: SlotStore,
    chat: ChatSession,
    treatise: Mutex<String>,
    config: GeminiConfig,
}

impl Scriptorium {
    /// Open the scriptorium, restoring the treatise and messages
    pub fn new(provider: Arc<dyn Provider>, store: SlotStore, config: GeminiConfig) -> Self {
        let treatise = match store.read(keys::TREATISE) {
            Ok(text) => text.unwrap_or_default(),
            Err(e) => {
                tracing::warn!("Failed to read saved treatise: {}", e);
                String::new()
            }
        };

        let chat = ChatSession::open(store.clone(), keys::SCRIPTORIUM_MESSAGES, "scriptorium", || {
            Message::greeting(Sender::Ai, READY_GREETING)
        });

        Self {
            provider,
            store,
            chat,
            treatise: Mutex::new(treatise),
            config,
        }
    }

    fn lock_treatise(&self) -> MutexGuard<'_, String> {
        self.treatise.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn persist_treatise(&self, text: &str) {
        if let Err(e) = self.store.write(keys::TREATISE, text) {
            tracing::warn!("Failed to persist treatise: {}", e);
        }
    }

    /// Snapshot of the consultation messages
    pub fn messages(&self) -> Vec<Message> {
        self.chat.messages()
    }

    /// Whether a consultation is in flight
    pub fn is_loading(&self) -> bool {
        self.chat.is_loading()
    }

    /// Current treatise text
    pub fn treatise(&self) -> String {
        self.lock_treatise().clone()
    }

    /// Replace the treatise
    pub fn set_treatise(&self, text: &str) {
        let mut treatise = self.lock_treatise();
        *treatise = text.to_string();
        self.persist_treatise(&treatise);
    }

    /// Append text to the treatise
    ///
    /// A blank line separates the new text from existing content; nothing
    /// is inserted when the treatise is empty or whitespace.
    pub fn append_to_treatise(&self, text: &str) {
        let mut treatise = self.lock_treatise();
        *treatise = join_paragraphs(&treatise, text);
        self.persist_treatise(&treatise);
    }

    /// Ask the model about the current treatise
    ///
    /// Gating and loading rules match the library. Replies are never
    /// searched for story blocks.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::sync::Arc;
    /// use storyweaver::config::GeminiConfig;
    /// use storyweaver::providers::OfflineProvider;
    /// use storyweaver::session::{Scriptorium, SendOutcome};
    /// use storyweaver::storage::SlotStore;
    ///
    /// # tokio_test::block_on(async {
    /// let store = SlotStore::temporary().unwrap();
    /// let scriptorium = Scriptorium::new(Arc::new(OfflineProvider), store, GeminiConfig::default());
    ///
    /// let outcome = scriptorium.consult("Tighten the opening").await;
    /// assert!(matches!(outcome, SendOutcome::Failed(_)));
    /// assert!(!scriptorium.is_loading());
    /// # });
    /// ```
    pub async fn consult(&self, instruction: &str) -> SendOutcome {
        let Some(ticket) = self.chat.begin(instruction) else {
            return SendOutcome::Rejected;
        };

        let treatise = self.treatise();
        let profile = &self.config.scriptorium;
        let request =
            GenerationRequest::new(&profile.model, generate_consult_prompt(&treatise, instruction))
                .with_thinking_budget(profile.thinking_budget);

        tracing::info!(
            model = %profile.model,
            treatise_chars = treatise.len(),
            "Consulting scriptorium"
        );

        let (message, failed) = match self.provider.generate(&request).await {
            Ok(response) => (Message::ai(response.text, Vec::new(), Vec::new()), false),
            Err(e) => {
                tracing::error!("Scriptorium consultation failed: {:#}", e);
                (Message::error_notice(ERROR_NOTICE), true)
            }
        };

        self.chat.finish(ticket, message, failed)
    }

    /// Transcribe recorded audio and append the text to the treatise
    ///
    /// Returns the transcription. An empty transcription leaves the
    /// treatise unchanged, as does a reset issued while the request was in
    /// flight.
    ///
    /// # Errors
    ///
    /// Returns error if the audio is empty or the provider call fails; the
    /// treatise is not modified in either case
    pub async fn transcribe(&self, audio: &[u8], mime_type: &str) -> Result<String> {
        if audio.is_empty() {
            return Err(StoryWeaverError::Provider("No audio to transcribe".to_string()).into());
        }

        let generation = self.chat.generation();
        let profile = &self.config.transcription;
        let request = GenerationRequest::new(&profile.model, TRANSCRIPTION_INSTRUCTION)
            .with_thinking_budget(profile.thinking_budget)
            .with_inline_data(InlineData::from_bytes(mime_type, audio));

        tracing::info!(
            model = %profile.model,
            mime_type = %mime_type,
            bytes = audio.len(),
            "Transcribing audio"
        );

        let response = self.provider.generate(&request).await.map_err(|e| {
            tracing::error!("Transcription failed: {:#}", e);
            e
        })?;

        let text = response.text.trim().to_string();
        if text.is_empty() {
            tracing::info!("Transcription was empty; treatise unchanged");
        } else if generation != self.chat.generation() {
            tracing::info!("Transcription discarded: scriptorium was reset");
        } else {
            self.append_to_treatise(&text);
        }

        Ok(text)
    }

    /// Clear the treatise and restore the greeting
    pub fn reset(&self) {
        {
            let mut treatise = self.lock_treatise();
            treatise.clear();
            self.persist_treatise(&treatise);
        }
        self.chat.reset(Message::greeting(Sender::Ai, READY_GREETING));
    }
}

/// Join existing text and a new paragraph
///
/// # Examples
///
/// ```
/// use storyweaver::session::scriptorium::join_paragraphs;
///
/// assert_eq!(join_paragraphs("", "one"), "one");
/// assert_eq!(join_paragraphs("one", "two"), "one\n\ntwo");
/// ```
pub fn join_paragraphs(existing: &str, addition: &str) -> String {
    if existing.trim().is_empty() {
        format!("{}{}", existing, addition)
    } else {
        format!("{}{}{}", existing, PARAGRAPH_SEPARATOR, addition)
    }
}
