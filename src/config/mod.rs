//! Configuration and session state for taskdeck.
//!
//! Two TOML files live under the data directory:
//!
//! ## config.toml - User preferences (safe to sync across machines)
//!
//! - `output-format` - "json" or "human"
//! - `user-name` - Display name override for report headers/filenames
//! - `[assistant]` - Generative endpoint base URL, model, API key
//! - `[auth]` - Identity provider base URL and API key
//!
//! ## state.toml - Session state (machine-specific, contains secrets)
//!
//! - The current login session: uid, name, email, id-token, logged-in-at
//!
//! `state.toml` is created with 0600 permissions (owner read/write only)
//! because it holds the identity token.
//!
//! ## Precedence
//!
//! For the user identity: `TD_USER` env > session state.
//! For API keys: env var > config file.

use crate::storage::resolve_data_dir;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Env var naming the acting user directly, bypassing the session file.
pub const USER_ENV: &str = "TD_USER";

/// Env var holding the generative-endpoint API key.
pub const ASSISTANT_KEY_ENV: &str = "TD_GEMINI_API_KEY";

/// Env var holding the identity-provider API key.
pub const AUTH_KEY_ENV: &str = "TD_AUTH_API_KEY";

/// Permissions for state.toml: owner read/write only.
#[cfg(unix)]
pub const STATE_FILE_MODE: u32 = 0o600;

/// Output format preference for CLI commands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON output (default, machine-readable)
    #[default]
    Json,
    /// Human-readable output
    Human,
}

/// Generative-endpoint settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AssistantConfig {
    pub api_base: String,
    pub model: String,
    pub api_key: Option<String>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: None,
        }
    }
}

impl AssistantConfig {
    /// API key with env-over-file precedence.
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(ASSISTANT_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone())
    }
}

/// Identity-provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct AuthConfig {
    pub api_base: String,
    pub api_key: Option<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            api_base: "https://identitytoolkit.googleapis.com/v1".to_string(),
            api_key: None,
        }
    }
}

impl AuthConfig {
    /// API key with env-over-file precedence.
    pub fn resolved_api_key(&self) -> Option<String> {
        std::env::var(AUTH_KEY_ENV)
            .ok()
            .filter(|k| !k.is_empty())
            .or_else(|| self.api_key.clone())
    }
}

/// User preferences stored in config.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Config {
    /// Default output format for CLI commands
    pub output_format: Option<OutputFormat>,

    /// Display name override for report headers and filenames
    pub user_name: Option<String>,

    pub assistant: AssistantConfig,

    pub auth: AuthConfig,
}

impl Config {
    /// Load config.toml from the data directory; missing file means defaults.
    pub fn load() -> Result<Self> {
        Self::load_from(&resolve_data_dir()?)
    }

    /// Load from an explicit directory (dependency injection for tests).
    pub fn load_from(data_dir: &Path) -> Result<Self> {
        let path = config_path(data_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write config.toml under the given directory.
    pub fn save_to(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)?;
        let raw = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(config_path(data_dir), raw)?;
        Ok(())
    }
}

/// The active login session, stored in state.toml.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Session {
    /// Stable user id from the identity provider; keys the store record
    pub uid: String,
    pub name: String,
    pub email: String,
    /// Identity token returned at login (not refreshed; re-login on expiry)
    pub id_token: String,
    pub logged_in_at: DateTime<Utc>,
}

/// Runtime state stored in state.toml.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct State {
    pub session: Option<Session>,
}

impl State {
    /// Load state.toml from the data directory; missing file means no session.
    pub fn load() -> Result<Self> {
        Self::load_from(&resolve_data_dir()?)
    }

    /// Load from an explicit directory (dependency injection for tests).
    pub fn load_from(data_dir: &Path) -> Result<Self> {
        let path = state_path(data_dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = fs::read_to_string(&path)?;
        toml::from_str(&raw).map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// Write state.toml with restrictive permissions.
    pub fn save(&self) -> Result<()> {
        self.save_to(&resolve_data_dir()?)
    }

    /// Write state.toml under the given directory.
    pub fn save_to(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)?;
        let path = state_path(data_dir);
        let raw = toml::to_string_pretty(self).map_err(|e| Error::Config(e.to_string()))?;
        fs::write(&path, raw)?;
        set_state_permissions(&path)?;
        Ok(())
    }
}

fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join("config.toml")
}

fn state_path(data_dir: &Path) -> PathBuf {
    data_dir.join("state.toml")
}

#[cfg(unix)]
fn set_state_permissions(path: &Path) -> Result<()> {
    use std::os::unix::fs::PermissionsExt;
    let perms = fs::Permissions::from_mode(STATE_FILE_MODE);
    fs::set_permissions(path, perms)?;
    Ok(())
}

#[cfg(not(unix))]
fn set_state_permissions(_path: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_config_is_default() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.assistant.model, "gemini-2.0-flash");
    }

    #[test]
    fn test_config_roundtrip() {
        let dir = TempDir::new().unwrap();
        let config = Config {
            output_format: Some(OutputFormat::Human),
            user_name: Some("Alice".to_string()),
            ..Config::default()
        };
        config.save_to(dir.path()).unwrap();

        let loaded = Config::load_from(dir.path()).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_state_roundtrip() {
        let dir = TempDir::new().unwrap();
        let state = State {
            session: Some(Session {
                uid: "u1".to_string(),
                name: "Alice".to_string(),
                email: "alice@example.com".to_string(),
                id_token: "tok".to_string(),
                logged_in_at: Utc::now(),
            }),
        };
        state.save_to(dir.path()).unwrap();

        let loaded = State::load_from(dir.path()).unwrap();
        assert_eq!(loaded.session.as_ref().unwrap().uid, "u1");
    }

    #[cfg(unix)]
    #[test]
    fn test_state_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let dir = TempDir::new().unwrap();
        State::default().save_to(dir.path()).unwrap();

        let mode = fs::metadata(dir.path().join("state.toml"))
            .unwrap()
            .permissions()
            .mode();
        assert_eq!(mode & 0o777, STATE_FILE_MODE);
    }

    #[test]
    #[serial_test::serial]
    fn test_env_api_key_wins_over_file() {
        std::env::remove_var(ASSISTANT_KEY_ENV);
        let config = AssistantConfig {
            api_key: Some("from-file".to_string()),
            ..AssistantConfig::default()
        };
        assert_eq!(config.resolved_api_key().as_deref(), Some("from-file"));

        std::env::set_var(ASSISTANT_KEY_ENV, "from-env");
        let resolved = config.resolved_api_key();
        std::env::remove_var(ASSISTANT_KEY_ENV);
        assert_eq!(resolved.as_deref(), Some("from-env"));
    }

    #[test]
    fn test_malformed_config_errors() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "output-format = [nonsense").unwrap();
        assert!(matches!(
            Config::load_from(dir.path()),
            Err(Error::Config(_))
        ));
    }
}
