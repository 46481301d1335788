//! Test utilities for Story Weaver
//!
//! A scripted provider that replays canned replies and records every
//! request, plus small store helpers.

use crate::error::{Result, StoryWeaverError};
use crate::providers::{GenerationRequest, GenerationResponse, Provider};
use crate::storage::SlotStore;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Provider that returns queued results in order
///
/// When the queue is empty every call fails.
#[derive(Default)]
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<std::result::Result<GenerationResponse, String>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedProvider {
    /// Create a provider with no queued replies
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Queue a successful reply
    pub fn push_reply(&self, response: GenerationResponse) {
        self.replies.lock().unwrap().push_back(Ok(response));
    }

    /// Queue a failure
    pub fn push_error(&self, message: &str) {
        self.replies.lock().unwrap().push_back(Err(message.to_string()));
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Provider for ScriptedProvider {
    async fn generate(&self, request: &GenerationRequest) -> Result<GenerationResponse> {
        self.requests.lock().unwrap().push(request.clone());
        match self.replies.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(message)) => Err(StoryWeaverError::Provider(message).into()),
            None => Err(StoryWeaverError::Provider("no scripted reply".to_string()).into()),
        }
    }
}

/// Throwaway slot store
pub fn temp_store() -> SlotStore {
    SlotStore::temporary().expect("Failed to open temporary store")
}
