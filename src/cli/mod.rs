//! CLI argument definitions for taskdeck.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Extended version string shown by `td --version`, including build info
/// injected by the build script.
const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (commit ",
    env!("TD_GIT_COMMIT"),
    ", built ",
    env!("TD_BUILD_TIMESTAMP"),
    ")"
);

/// Taskdeck - a personal task manager for the command line.
///
/// Log in with `td auth login`, then manage tasks with `td task` and
/// `td subtask`, export reports with `td report`, or describe work in plain
/// English with `td assistant ask`.
#[derive(Parser, Debug)]
#[command(name = "td")]
#[command(author, version, long_version = LONG_VERSION)]
#[command(about = "A CLI personal task manager with subtasks, reports, and an AI assistant", long_about = None)]
pub struct Cli {
    /// Output in human-readable format instead of JSON
    #[arg(short = 'H', long = "human", global = true)]
    pub human_readable: bool,

    /// Data directory holding the store, config, and session state.
    /// Can also be set via the TD_DATA_DIR environment variable.
    #[arg(long = "data-dir", global = true, env = "TD_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Authentication commands (login, logout, status)
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Task management commands
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Subtask management commands
    Subtask {
        #[command(subcommand)]
        command: SubtaskCommands,
    },

    /// AI assistant commands (turn free text into structured tasks)
    Assistant {
        #[command(subcommand)]
        command: AssistantCommands,
    },

    /// Report export commands (Word documents)
    Report {
        #[command(subcommand)]
        command: ReportCommands,
    },
}

/// Auth subcommands
#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Sign in with email and password
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },

    /// Clear the stored session
    Logout {
        /// Also delete the user's task document from the local store
        #[arg(long)]
        purge: bool,
    },

    /// Show the current session
    Status,
}

/// Task subcommands
#[derive(Subcommand, Debug)]
pub enum TaskCommands {
    /// Create a new task (at least one subtask is required)
    Add {
        /// Task title
        title: String,

        /// Initial status (pending, running, completed)
        #[arg(short, long)]
        status: Option<String>,

        /// Subtask title (repeatable)
        #[arg(short = 't', long = "subtask")]
        subtasks: Vec<String>,
    },

    /// List tasks grouped by status
    List {
        /// Only show tasks with this status
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one task with its subtasks
    Show {
        /// Task ID
        id: String,
    },

    /// Set a task's status (pending, running, completed)
    Status {
        /// Task ID
        id: String,

        /// New status
        status: String,
    },

    /// Delete a task and all of its subtasks
    Delete {
        /// Task ID
        id: String,
    },

    /// Move a task up within its status group (no-op at the top)
    MoveUp {
        /// Task ID
        id: String,
    },

    /// Move a task down within its status group (no-op at the bottom)
    MoveDown {
        /// Task ID
        id: String,
    },
}

/// Subtask subcommands
#[derive(Subcommand, Debug)]
pub enum SubtaskCommands {
    /// Add a subtask to a task
    Add {
        /// Parent task ID
        task_id: String,

        /// Subtask title
        title: String,
    },

    /// Toggle a subtask's completed flag.
    ///
    /// When this leaves every subtask of the task completed, the task itself
    /// becomes completed. Un-toggling afterwards does not revert the task.
    Toggle {
        /// Parent task ID
        task_id: String,

        /// Subtask ID
        subtask_id: String,
    },

    /// Remove a subtask from a task
    Delete {
        /// Parent task ID
        task_id: String,

        /// Subtask ID
        subtask_id: String,
    },
}

/// Assistant subcommands
#[derive(Subcommand, Debug)]
pub enum AssistantCommands {
    /// Send free text to the assistant; mention existing tasks with @Title
    Ask {
        /// What you want to do, in plain English
        text: String,

        /// Add detected tasks (and ADD_SUBTASK actions) to your document
        #[arg(long)]
        apply: bool,
    },
}

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Export a todo-list document from selected subtasks of unfinished tasks
    Todo {
        /// Subtask ID to include (repeatable)
        #[arg(short = 's', long = "subtask")]
        subtasks: Vec<String>,

        /// Include every subtask of every unfinished task
        #[arg(long)]
        all: bool,

        /// Directory to write the document into (default: current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },

    /// Export a monthly-report document with review answers
    Monthly {
        /// Did you complete all tasks this month? (Yes/No)
        #[arg(long)]
        tasks_completed: String,

        /// Reason for incomplete tasks (required with --tasks-completed No)
        #[arg(long)]
        reason: Option<String>,

        /// New learnings this month
        #[arg(long)]
        learnings: String,

        /// Percentage of last month's target achieved
        #[arg(long)]
        target_percent: String,

        /// Suggestions for new tools or technology
        #[arg(long)]
        suggestions: String,

        /// Leave this task out of the report (repeatable)
        #[arg(long = "skip-task")]
        skip_tasks: Vec<String>,

        /// Leave this subtask out of the report (repeatable)
        #[arg(long = "skip-subtask")]
        skip_subtasks: Vec<String>,

        /// Advance this subtask's displayed status one step (repeatable)
        #[arg(long = "cycle-subtask")]
        cycle_subtasks: Vec<String>,

        /// Directory to write the document into (default: current directory)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
}
