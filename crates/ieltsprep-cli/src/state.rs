//! Local preferences: theme and the signed-in session.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use ieltsprep_core::model::Theme;
use ieltsprep_core::traits::AuthUser;

pub const STATE_FILE: &str = "state.toml";

/// The signed-in user, as remembered between runs.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub uid: String,
    /// "google", "apple" or "guest".
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id_token: String,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("uid", &self.uid)
            .field("method", &self.method)
            .field("display_name", &self.display_name)
            .field("id_token", &"***")
            .finish()
    }
}

impl Session {
    pub fn from_user(user: AuthUser, method: &str) -> Self {
        Self {
            uid: user.uid,
            method: method.to_string(),
            display_name: user.display_name,
            email: user.email,
            id_token: user.id_token,
        }
    }

    pub fn user(&self) -> AuthUser {
        AuthUser {
            uid: self.uid.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            id_token: self.id_token.clone(),
        }
    }

    /// Bearer token for the document store, if any.
    pub fn token(&self) -> Option<&str> {
        Some(self.id_token.as_str()).filter(|t| !t.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LocalState {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
}

impl LocalState {
    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(STATE_FILE)
    }

    /// Read the state file; a missing file is the default state.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = Self::path_in(dir);
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        let path = Self::path_in(dir);
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)
            .with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "state saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_file_is_default() {
        let dir = TempDir::new().unwrap();
        let state = LocalState::load(dir.path()).unwrap();
        assert_eq!(state, LocalState::default());
        assert_eq!(state.theme, Theme::Light);
    }

    #[test]
    fn save_and_reload() {
        let dir = TempDir::new().unwrap();
        let state = LocalState {
            theme: Theme::Dark,
            session: Some(Session {
                uid: "u1".into(),
                method: "google".into(),
                display_name: Some("Alex".into()),
                email: None,
                id_token: "tok".into(),
            }),
        };
        state.save(dir.path()).unwrap();
        assert_eq!(LocalState::load(dir.path()).unwrap(), state);
    }

    #[test]
    fn session_debug_hides_token() {
        let session = Session {
            uid: "u1".into(),
            method: "apple".into(),
            display_name: None,
            email: None,
            id_token: "very-secret".into(),
        };
        assert!(!format!("{session:?}").contains("very-secret"));
        assert_eq!(session.token(), Some("very-secret"));
    }
}
