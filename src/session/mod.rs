//! Persisted conversation sessions
//!
//! A session is an ordered, append-only list of messages stored whole in
//! one slot. Both the library and the scriptorium build on [`ChatSession`],
//! which owns the message list, the loading flag and the reset generation.
//!
//! State sits behind a `std::sync::Mutex` that is only held for short
//! synchronous sections, never across the provider call, so a second send
//! issued while a request is in flight observes the loading flag and is
//! rejected rather than queued.

pub mod library;
pub mod scriptorium;

pub use library::LibrarySession;
pub use scriptorium::Scriptorium;

use crate::message::Message;
use crate::storage::SlotStore;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Result of a send or consult call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    /// The input was empty or a request was already in flight; nothing changed
    Rejected,
    /// The provider answered and its reply was appended
    Replied(Message),
    /// The provider failed and a fixed system notice was appended
    Failed(Message),
    /// The session was cleared while the request was in flight; the reply was dropped
    Discarded,
}

impl SendOutcome {
    /// The message appended by this call, if any besides the user's own
    pub fn message(&self) -> Option<&Message> {
        match self {
            Self::Replied(message) | Self::Failed(message) => Some(message),
            Self::Rejected | Self::Discarded => None,
        }
    }

    /// Whether the call was accepted and dispatched
    pub fn was_dispatched(&self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

#[derive(Debug)]
struct SessionState {
    messages: Vec<Message>,
    loading: bool,
    generation: u64,
}

/// Proof that a request was admitted, tagged with the generation it started in
#[derive(Debug, Clone, Copy)]
pub(crate) struct Ticket {
    generation: u64,
}

/// Message list with loading flag, reset generation and slot persistence
pub(crate) struct ChatSession {
    store: SlotStore,
    key: &'static str,
    label: &'static str,
    state: Mutex<SessionState>,
}

impl ChatSession {
    /// Hydrate from `key`, falling back to `greeting` when the slot is
    /// missing or cannot be decoded
    pub(crate) fn open(
        store: SlotStore,
        key: &'static str,
        label: &'static str,
        greeting: impl FnOnce() -> Message,
    ) -> Self {
        let messages = load_messages(&store, key, label).unwrap_or_else(|| vec![greeting()]);
        let session = Self {
            store,
            key,
            label,
            state: Mutex::new(SessionState {
                messages,
                loading: false,
                generation: 0,
            }),
        };
        session.persist(&session.lock().messages);
        session
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn messages(&self) -> Vec<Message> {
        self.lock().messages.clone()
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.lock().loading
    }

    pub(crate) fn generation(&self) -> u64 {
        self.lock().generation
    }

    /// Admit a request: append the user message and raise the loading flag
    ///
    /// Returns `None` when `text` is blank or a request is in flight.
    pub(crate) fn begin(&self, text: &str) -> Option<Ticket> {
        let mut state = self.lock();
        if state.loading {
            tracing::debug!("{} request rejected: already loading", self.label);
            return None;
        }
        if text.trim().is_empty() {
            tracing::debug!("{} request rejected: empty input", self.label);
            return None;
        }

        state.messages.push(Message::user(text));
        state.loading = true;
        self.persist(&state.messages);
        Some(Ticket {
            generation: state.generation,
        })
    }

    /// Complete a request admitted by [`begin`](Self::begin)
    ///
    /// The loading flag is always cleared. The message is appended only
    /// when the session has not been reset since the ticket was issued.
    pub(crate) fn finish(&self, ticket: Ticket, message: Message, failed: bool) -> SendOutcome {
        let mut state = self.lock();
        state.loading = false;

        if ticket.generation != state.generation {
            tracing::info!(
                "{} reply discarded: session was cleared while the request was in flight",
                self.label
            );
            return SendOutcome::Discarded;
        }

        state.messages.push(message.clone());
        self.persist(&state.messages);

        if failed {
            SendOutcome::Failed(message)
        } else {
            SendOutcome::Replied(message)
        }
    }

    /// Replace all messages with a single greeting and start a new generation
    pub(crate) fn reset(&self, greeting: Message) {
        let mut state = self.lock();
        state.generation += 1;
        state.messages = vec![greeting];
        self.persist(&state.messages);
        tracing::info!("{} session cleared", self.label);
    }

    fn persist(&self, messages: &[Message]) {
        let result = serde_json::to_string(messages)
            .map_err(anyhow::Error::from)
            .and_then(|json| self.store.write(self.key, &json));
        if let Err(e) = result {
            tracing::warn!("Failed to persist {} messages: {}", self.label, e);
        }
    }
}

/// Read a message array from a slot
///
/// Returns `None` (after logging) when the slot is missing, unreadable or
/// does not hold a JSON array of messages.
fn load_messages(store: &SlotStore, key: &str, label: &str) -> Option<Vec<Message>> {
    let raw = match store.read(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            tracing::warn!("Failed to read saved {} messages: {}", label, e);
            return None;
        }
    };

    match serde_json::from_str::<Vec<Message>>(&raw) {
        Ok(messages) => {
            tracing::debug!("Restored {} {} messages", messages.len(), label);
            Some(messages)
        }
        Err(e) => {
            tracing::warn!("Failed to parse saved {} messages: {}", label, e);
            None
        }
    }
}
