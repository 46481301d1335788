//! End-to-end tests for the storyweaver binary
//!
//! Every test points the binary at its own slot database and a config path
//! that does not exist, so defaults plus environment apply.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use tempfile::TempDir;

use wiremock::matchers::{body_partial_json, body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use storyweaver::storage::{keys, SlotStore};

mod common;

const ENV_OVERRIDES: &[&str] = &[
    "GEMINI_API_KEY",
    "STORYWEAVER_API_KEY",
    "STORYWEAVER_API_BASE",
    "STORYWEAVER_PROVIDER",
    "STORYWEAVER_DB",
    "STORYWEAVER_QUICK_MODEL",
    "STORYWEAVER_DEEP_MODEL",
    "STORYWEAVER_COLLAB_MODEL",
    "STORYWEAVER_TIMEOUT_SECONDS",
    "STORYWEAVER_EXPORT_LINE_WIDTH",
    "COLORFGBG",
    "RUST_LOG",
];

fn storyweaver(data: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("storyweaver").unwrap();
    for var in ENV_OVERRIDES {
        cmd.env_remove(var);
    }
    cmd.env("NO_COLOR", "1")
        .arg("--config")
        .arg(data.path().join("missing.yaml"))
        .arg("--storage-path")
        .arg(data.path().join("slots"));
    cmd
}

#[test]
fn test_history_works_without_api_key() {
    let data = TempDir::new().unwrap();

    storyweaver(&data)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("library history"))
        .stdout(predicate::str::contains("Welcome to the Story Weaver's archive"))
        .stdout(predicate::str::contains("No stories found yet."));
}

#[test]
fn test_theme_defaults_to_dark_and_persists() {
    let data = TempDir::new().unwrap();

    storyweaver(&data)
        .arg("theme")
        .assert()
        .success()
        .stdout(predicate::str::contains("Theme: dark"));

    storyweaver(&data)
        .args(["theme", "toggle"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Theme: light"));

    storyweaver(&data)
        .arg("theme")
        .assert()
        .success()
        .stdout(predicate::str::contains("Theme: light"));
}

#[test]
fn test_invalid_theme_is_rejected() {
    let data = TempDir::new().unwrap();

    storyweaver(&data)
        .args(["theme", "sepia"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid mode"));
}

#[test]
fn test_saved_view_selects_history_surface() {
    let data = TempDir::new().unwrap();

    storyweaver(&data)
        .args(["view", "scriptorium"])
        .assert()
        .success()
        .stdout(predicate::str::contains("View: scriptorium"));

    storyweaver(&data)
        .arg("history")
        .assert()
        .success()
        .stdout(predicate::str::contains("scriptorium history"));
}

#[test]
fn test_treatise_set_append_show() {
    let data = TempDir::new().unwrap();

    storyweaver(&data)
        .args(["scriptorium", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The treatise is empty."));

    storyweaver(&data)
        .args(["scriptorium", "set", "The first paragraph."])
        .assert()
        .success();

    storyweaver(&data)
        .args(["scriptorium", "append", "The second paragraph."])
        .assert()
        .success();

    storyweaver(&data)
        .args(["scriptorium", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "The first paragraph.\n\nThe second paragraph.",
        ));

    storyweaver(&data)
        .args(["scriptorium", "reset", "--yes"])
        .assert()
        .success();

    storyweaver(&data)
        .args(["scriptorium", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The treatise is empty."));
}

#[test]
fn test_export_without_stories_fails() {
    let data = TempDir::new().unwrap();

    storyweaver(&data)
        .args(["export", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No story number 1"));
}

/// Seed the library slot with one saved reply holding "The Fox"
fn save_fox_story(data: &TempDir) {
    let store = SlotStore::open(data.path().join("slots")).unwrap();
    let saved = json!([
        {"id": "init", "sender": "system", "content": "Welcome"},
        {"id": "ai-1", "sender": "ai", "content": common::ONE_STORY,
         "stories": [{"title": "The Fox", "content": "A fox saw some grapes.",
                      "citation": {"title": "Fables", "author": "Aesop"}}]}
    ]);
    store.write(keys::LIBRARY_MESSAGES, &saved.to_string()).unwrap();
}

#[test]
fn test_export_writes_saved_story() {
    let data = TempDir::new().unwrap();
    save_fox_story(&data);
    let out = data.path().join("fox.txt");

    storyweaver(&data)
        .args(["export", "1", "--out"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Exported to"));

    let document = std::fs::read_to_string(&out).unwrap();
    assert!(document.contains("The Fox"));
    assert!(document.contains("A fox saw some grapes."));
}

#[test]
fn test_ask_with_unknown_mode_fails() {
    let data = TempDir::new().unwrap();

    storyweaver(&data)
        .env("GEMINI_API_KEY", "test-key")
        .args(["ask", "fox", "--mode", "leisurely"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Invalid mode"));
}

#[test]
fn test_ask_without_api_key_fails() {
    let data = TempDir::new().unwrap();

    storyweaver(&data)
        .args(["ask", "fox"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Missing credentials"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_ask_prints_parsed_story() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": common::ONE_STORY }] }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let data = TempDir::new().unwrap();

    storyweaver(&data)
        .env("GEMINI_API_KEY", "test-key")
        .env("STORYWEAVER_API_BASE", server.uri())
        .args(["ask", "The Fox and the Grapes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The Fox"))
        .stdout(predicate::str::contains("Aesop, Fables"));

    storyweaver(&data)
        .args(["history", "--surface", "library"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Stories:"));
}

#[test]
fn test_config_file_with_zero_timeout_is_rejected() {
    let (temp_dir, config_path) = common::temp_config_file(
        "provider:\n  type: gemini\n  gemini:\n    timeout_seconds: 0\n",
    );

    let mut cmd = Command::cargo_bin("storyweaver").unwrap();
    for var in ENV_OVERRIDES {
        cmd.env_remove(var);
    }
    cmd.arg("--config")
        .arg(config_path)
        .arg("--storage-path")
        .arg(temp_dir.path().join("slots"))
        .arg("history");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("timeout_seconds must be greater than 0"));
}

#[test]
fn test_config_file_with_unknown_provider_is_rejected() {
    let (temp_dir, config_path) = common::temp_config_file("provider:\n  type: ollama\n");

    let mut cmd = Command::cargo_bin("storyweaver").unwrap();
    for var in ENV_OVERRIDES {
        cmd.env_remove(var);
    }
    cmd.arg("--config")
        .arg(config_path)
        .arg("--storage-path")
        .arg(temp_dir.path().join("slots"))
        .arg("history");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("Invalid provider type: ollama"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_follow_up_similar_sends_deep_query() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-pro:generateContent"))
        .and(body_string_contains("Find stories with themes similar to"))
        .and(body_string_contains("The Fox"))
        .and(body_partial_json(json!({
            "generationConfig": { "thinkingConfig": { "thinkingBudget": 32768 } }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "parts": [{ "text": "## Title: The Crow\n### Author: Aesop\n### Book: Fables\n### Story\nA crow drops pebbles." }] }
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let data = TempDir::new().unwrap();
    save_fox_story(&data);

    storyweaver(&data)
        .env("GEMINI_API_KEY", "test-key")
        .env("STORYWEAVER_API_BASE", server.uri())
        .args(["follow-up", "1", "similar"])
        .assert()
        .success()
        .stdout(predicate::str::contains("The Crow"));

    // The follow-up query and reply are part of the library history
    storyweaver(&data)
        .args(["history", "--surface", "library"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Find stories with themes similar"));
}

#[test]
fn test_follow_up_unknown_story_fails() {
    let data = TempDir::new().unwrap();

    storyweaver(&data)
        .env("GEMINI_API_KEY", "test-key")
        .args(["follow-up", "3", "analyze"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("No story number 3"));
}

#[test]
fn test_follow_up_unknown_action_fails() {
    let data = TempDir::new().unwrap();

    storyweaver(&data)
        .env("GEMINI_API_KEY", "test-key")
        .args(["follow-up", "1", "summarize"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown story action"));
}
