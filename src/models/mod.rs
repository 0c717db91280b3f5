//! Data models for taskdeck entities.
//!
//! This module defines the core data structures:
//! - `Task` - Top-level work items with a status and child subtasks
//! - `SubTask` - Checklist items belonging to exactly one task
//! - `TaskDocument` - The single per-user record holding the ordered task list
//!
//! Wire names (`taskList`, `createdAt`, ...) follow the hosted record shape so
//! documents exported from the hosted store import cleanly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Task status in the workflow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Running,
    Completed,
}

impl TaskStatus {
    /// All statuses in display order (running first, matching the board).
    pub fn all() -> &'static [TaskStatus] {
        &[
            TaskStatus::Running,
            TaskStatus::Pending,
            TaskStatus::Completed,
        ]
    }

    /// Next status in the pending -> running -> completed cycle.
    pub fn next(&self) -> TaskStatus {
        match self {
            TaskStatus::Pending => TaskStatus::Running,
            TaskStatus::Running => TaskStatus::Completed,
            TaskStatus::Completed => TaskStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Running => "running",
            TaskStatus::Completed => "completed",
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for TaskStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(TaskStatus::Pending),
            "running" => Ok(TaskStatus::Running),
            "completed" => Ok(TaskStatus::Completed),
            other => Err(format!(
                "Unknown status '{}' (expected pending, running, or completed)",
                other
            )),
        }
    }
}

/// A checklist item belonging to exactly one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Subtask title
    pub title: String,

    /// Whether the item is checked off
    #[serde(default)]
    pub completed: bool,
}

impl SubTask {
    /// Create a new unchecked subtask with a fresh UUID.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            completed: false,
        }
    }
}

/// A top-level work item with a status and child subtasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Unique identifier (UUID v4)
    pub id: String,

    /// Task title
    pub title: String,

    /// Current status
    #[serde(default)]
    pub status: TaskStatus,

    /// Child checklist items; deleted with the task
    #[serde(default)]
    pub subtasks: Vec<SubTask>,

    /// Creation timestamp (absent on records imported from older documents)
    #[serde(rename = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Task {
    /// Create a new pending task with a fresh UUID.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: title.into(),
            status: TaskStatus::default(),
            subtasks: Vec::new(),
            created_at: Some(Utc::now()),
        }
    }

    /// Number of completed subtasks.
    pub fn completed_count(&self) -> usize {
        self.subtasks.iter().filter(|s| s.completed).count()
    }

    /// True when the task has subtasks and every one is completed.
    pub fn all_subtasks_completed(&self) -> bool {
        !self.subtasks.is_empty() && self.subtasks.iter().all(|s| s.completed)
    }
}

/// The single per-user record: an ordered task list plus a server timestamp.
///
/// Ordering is significant only for same-status adjacency (move up/down).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TaskDocument {
    /// All tasks for the user, in board order
    #[serde(rename = "taskList", default)]
    pub task_list: Vec<Task>,

    /// When the document was last replaced
    #[serde(rename = "lastUpdated", skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl TaskDocument {
    /// Find a task by id.
    pub fn find(&self, task_id: &str) -> Option<&Task> {
        self.task_list.iter().find(|t| t.id == task_id)
    }

    /// Find a task by id, mutably.
    pub fn find_mut(&mut self, task_id: &str) -> Option<&mut Task> {
        self.task_list.iter_mut().find(|t| t.id == task_id)
    }

    /// Tasks with the given status, preserving document order.
    pub fn with_status(&self, status: TaskStatus) -> Vec<&Task> {
        self.task_list
            .iter()
            .filter(|t| t.status == status)
            .collect()
    }
}
