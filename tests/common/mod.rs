#![allow(dead_code)]

use std::fs;
use std::process::{Command, Output};
use std::sync::atomic::{AtomicUsize, Ordering};

use bughive::entity::{TestCaseDraft, Ticket, TicketDraft, TicketPatch};
use bughive::error::{BugHiveError, Result};
use bughive::store::{DataClient, MemoryStore};
use bughive::types::{EntityId, TicketPriority, TicketStatus};
use tempfile::TempDir;

/// Helper struct to run bughive commands in an isolated temp directory
pub struct BugHiveTest {
    pub temp_dir: TempDir,
}

impl BugHiveTest {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp directory");
        let test = BugHiveTest { temp_dir };
        // Keep the theme preference inside the sandbox
        test.write_config("preferences_dir: prefs\n");
        test
    }

    pub fn run(&self, args: &[&str]) -> Output {
        Command::new(env!("CARGO_BIN_EXE_bughive"))
            .args(args)
            .current_dir(self.temp_dir.path())
            .env_remove("BUGHIVE_CONFIG")
            .env_remove("BUGHIVE_API_KEY")
            .env_remove("COLORFGBG")
            .env("NO_COLOR", "1")
            .output()
            .expect("Failed to execute bughive command")
    }

    pub fn run_success(&self, args: &[&str]) -> String {
        let output = self.run(args);
        if !output.status.success() {
            panic!(
                "Command {:?} failed with status {:?}\nstdout: {}\nstderr: {}",
                args,
                output.status,
                String::from_utf8_lossy(&output.stdout),
                String::from_utf8_lossy(&output.stderr)
            );
        }
        String::from_utf8_lossy(&output.stdout).to_string()
    }

    pub fn run_failure(&self, args: &[&str]) -> String {
        let output = self.run(args);
        assert!(
            !output.status.success(),
            "Expected command {:?} to fail, but it succeeded",
            args
        );
        String::from_utf8_lossy(&output.stderr).to_string()
    }

    /// Run with `--json` and parse stdout
    pub fn run_json(&self, args: &[&str]) -> serde_json::Value {
        let mut args = args.to_vec();
        args.push("--json");
        let stdout = self.run_success(&args);
        serde_json::from_str(&stdout)
            .unwrap_or_else(|e| panic!("Invalid JSON from {:?}: {}\n{}", args, e, stdout))
    }

    pub fn write_config(&self, content: &str) {
        let path = self.temp_dir.path().join("bughive.yaml");
        fs::write(path, content).expect("Failed to write config file");
    }

    pub fn write_seed(&self, content: &str) {
        let path = self.temp_dir.path().join("bughive.json");
        fs::write(path, content).expect("Failed to write seed file");
    }

    pub fn read_seed(&self) -> serde_json::Value {
        let path = self.temp_dir.path().join("bughive.json");
        let content = fs::read_to_string(path).expect("Failed to read seed file");
        serde_json::from_str(&content).expect("Seed file is not valid JSON")
    }

    pub fn seed_exists(&self) -> bool {
        self.temp_dir.path().join("bughive.json").exists()
    }

    pub fn read_file(&self, relative_path: &str) -> Option<String> {
        let path = self.temp_dir.path().join(relative_path);
        fs::read_to_string(path).ok()
    }
}

pub fn ticket_draft(title: &str, status: TicketStatus) -> TicketDraft {
    TicketDraft {
        title: title.to_string(),
        description: format!("{title} description"),
        priority: TicketPriority::Medium,
        status,
        steps_to_reproduce: "1. Open the page".to_string(),
        expected_behavior: "It works".to_string(),
        actual_behavior: "It does not".to_string(),
        ..Default::default()
    }
}

pub fn test_case_draft(title: &str, category: &str) -> TestCaseDraft {
    TestCaseDraft {
        title: title.to_string(),
        description: format!("{title} description"),
        category: category.to_string(),
        test_steps: vec!["Open the app".to_string(), "Check the result".to_string()],
        expected_result: "Result is shown".to_string(),
        assigned_to: "qa".to_string(),
        estimated_time: 10,
        ..Default::default()
    }
}

/// Ticket client that counts write calls and can be told to fail them
#[derive(Default)]
pub struct RecordingClient {
    inner: MemoryStore<Ticket>,
    inserts: AtomicUsize,
    updates: AtomicUsize,
    fail_updates: bool,
    fail_inserts: bool,
}

impl RecordingClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        RecordingClient {
            fail_updates: true,
            ..Self::default()
        }
    }

    pub fn failing_inserts() -> Self {
        RecordingClient {
            fail_inserts: true,
            ..Self::default()
        }
    }

    pub fn insert_calls(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn update_calls(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }
}

impl DataClient<Ticket> for RecordingClient {
    async fn fetch_all(&self) -> Result<Vec<Ticket>> {
        self.inner.fetch_all().await
    }

    async fn fetch(&self, id: &EntityId) -> Result<Ticket> {
        self.inner.fetch(id).await
    }

    async fn insert(&self, draft: TicketDraft) -> Result<Ticket> {
        self.inserts.fetch_add(1, Ordering::SeqCst);
        if self.fail_inserts {
            return Err(BugHiveError::Service("backend unavailable".to_string()));
        }
        self.inner.insert(draft).await
    }

    async fn update(
        &self,
        id: &EntityId,
        patch: TicketPatch,
        expected_version: Option<u64>,
    ) -> Result<Ticket> {
        self.updates.fetch_add(1, Ordering::SeqCst);
        if self.fail_updates {
            return Err(BugHiveError::Service("backend unavailable".to_string()));
        }
        self.inner.update(id, patch, expected_version).await
    }

    async fn remove(&self, id: &EntityId) -> Result<()> {
        self.inner.remove(id).await
    }
}
