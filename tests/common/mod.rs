//! Common test utilities for taskdeck integration tests.
//!
//! Provides `TestEnv` for isolated test environments that don't touch the
//! user's real data directory or session.

#![allow(dead_code)]

use assert_cmd::Command;
pub use tempfile::TempDir;

/// A test environment with isolated data storage and a fixed acting user.
///
/// Each `TestEnv` creates two temporary directories:
/// - `work_dir`: the working directory commands run in (reports land here)
/// - `data_dir`: holds the store, config, and state (via `TD_DATA_DIR`)
///
/// The `td()` method returns a `Command` that sets `TD_DATA_DIR` and
/// `TD_USER` per-invocation, making tests parallel-safe and keeping them
/// independent of any real login session.
pub struct TestEnv {
    pub work_dir: TempDir,
    pub data_dir: TempDir,
    pub user: String,
}

impl TestEnv {
    /// Create a new test environment acting as the user "alice".
    pub fn new() -> Self {
        Self::as_user("alice")
    }

    /// Create a new test environment acting as the given user.
    pub fn as_user(user: &str) -> Self {
        Self {
            work_dir: TempDir::new().unwrap(),
            data_dir: TempDir::new().unwrap(),
            user: user.to_string(),
        }
    }

    /// Get a Command for the td binary with isolated data directory.
    pub fn td(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_td"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("TD_DATA_DIR", self.data_dir.path());
        cmd.env("TD_USER", &self.user);
        cmd
    }

    /// Get a Command with no acting user (no `TD_USER`, no session).
    pub fn td_anonymous(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_td"));
        cmd.current_dir(self.work_dir.path());
        cmd.env("TD_DATA_DIR", self.data_dir.path());
        cmd.env_remove("TD_USER");
        cmd
    }

    /// Run a command and parse its JSON stdout.
    pub fn td_json(&self, args: &[&str]) -> serde_json::Value {
        let output = self.td().args(args).assert().success();
        let stdout = String::from_utf8_lossy(&output.get_output().stdout).to_string();
        serde_json::from_str(&stdout).unwrap()
    }

    /// Create a task with the given subtasks and return its id.
    pub fn add_task(&self, title: &str, subtasks: &[&str]) -> String {
        let mut args = vec!["task", "add", title];
        for subtask in subtasks {
            args.push("--subtask");
            args.push(subtask);
        }
        let result = self.td_json(&args);
        result["task"]["id"].as_str().unwrap().to_string()
    }

    /// Subtask ids of a task, in document order.
    pub fn subtask_ids(&self, task_id: &str) -> Vec<String> {
        let result = self.td_json(&["task", "show", task_id]);
        result["task"]["subtasks"]
            .as_array()
            .unwrap()
            .iter()
            .map(|s| s["id"].as_str().unwrap().to_string())
            .collect()
    }
}
