//! Taskdeck - a personal task manager for the command line.
//!
//! This library provides the core functionality for the `td` CLI tool:
//! tasks with subtasks and a three-state status, a per-user document store,
//! Word-document report exporters, and an assistant that turns free text
//! into structured tasks via a hosted generative-text endpoint.

pub mod action_log;
pub mod assistant;
pub mod auth;
pub mod cli;
pub mod commands;
pub mod config;
pub mod models;
pub mod report;
pub mod storage;

/// Library-level error type for taskdeck operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Document export error: {0}")]
    Docx(#[from] docx_rs::DocxError),

    #[error(transparent)]
    Login(#[from] auth::LoginError),

    #[error("Not logged in: run `td auth login` first")]
    NotLoggedIn,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Document changed since it was read; re-run the command")]
    Conflict,

    #[error("{0}")]
    Other(String),
}

/// Result type alias for taskdeck operations.
pub type Result<T> = std::result::Result<T, Error>;
