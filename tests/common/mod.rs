use async_trait::async_trait;
use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use storyweaver::providers::{GenerationRequest, GenerationResponse, Provider};
use storyweaver::storage::SlotStore;
use tempfile::TempDir;
use tokio::sync::Notify;

#[allow(dead_code)]
pub const ONE_STORY: &str =
    "## Title: The Fox\n### Author: Aesop\n### Book: Fables\n### Story\nA fox saw some grapes.";

#[allow(dead_code)]
pub fn create_temp_store() -> (SlotStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let store = SlotStore::open(tmp.path().join("slots")).expect("failed to open slot store");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Provider that blocks every call until released, counting calls
#[allow(dead_code)]
pub struct GatedProvider {
    pub calls: AtomicUsize,
    pub started: Notify,
    pub release: Notify,
    reply: String,
}

#[allow(dead_code)]
impl GatedProvider {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            started: Notify::new(),
            release: Notify::new(),
            reply: reply.to_string(),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Provider for GatedProvider {
    async fn generate(&self, _request: &GenerationRequest) -> anyhow::Result<GenerationResponse> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.started.notify_one();
        self.release.notified().await;
        Ok(GenerationResponse::new(self.reply.clone()))
    }
}

/// Provider that answers immediately with a fixed reply
#[allow(dead_code)]
pub struct FixedProvider {
    pub reply: String,
}

#[allow(dead_code)]
impl FixedProvider {
    pub fn new(reply: &str) -> Arc<Self> {
        Arc::new(Self {
            reply: reply.to_string(),
        })
    }
}

#[async_trait]
impl Provider for FixedProvider {
    async fn generate(&self, _request: &GenerationRequest) -> anyhow::Result<GenerationResponse> {
        Ok(GenerationResponse::new(self.reply.clone()))
    }
}
