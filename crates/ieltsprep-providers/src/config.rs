//! Configuration and provider factories.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use ieltsprep_core::exam::{ExamConfig, SectionTimings, TimeoutPolicy};
use ieltsprep_core::model::DEFAULT_VARIANT;
use ieltsprep_core::traits::{DocumentStore, EssayEvaluator, IdentityProvider};

use crate::file_store::FileStore;
use crate::firestore::FirestoreStore;
use crate::gemini::{GeminiEvaluator, DEFAULT_MODEL};
use crate::identity::FirebaseIdentity;
use crate::mock::{MemoryStore, MockEvaluator};

pub const FIREBASE_KEY_ENV: &str = "IELTSPREP_FIREBASE_KEY";
pub const GEMINI_KEY_ENV: &str = "IELTSPREP_GEMINI_KEY";
pub const STATE_DIR_ENV: &str = "IELTSPREP_STATE_DIR";

/// Where profiles and exam content live.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StoreConfig {
    Firestore {
        project_id: String,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        base_url: Option<String>,
    },
    File {
        /// Defaults to `store.json` in the state directory.
        #[serde(default)]
        path: Option<PathBuf>,
    },
    Memory,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig::File { path: None }
    }
}

impl std::fmt::Debug for StoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreConfig::Firestore {
                project_id,
                api_key,
                base_url,
            } => f
                .debug_struct("Firestore")
                .field("project_id", project_id)
                .field("api_key", &api_key.as_ref().map(|_| "***"))
                .field("base_url", base_url)
                .finish(),
            StoreConfig::File { path } => f.debug_struct("File").field("path", path).finish(),
            StoreConfig::Memory => f.write_str("Memory"),
        }
    }
}

/// Sign-in service settings.
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct IdentityConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default)]
    pub request_uri: Option<String>,
}

impl std::fmt::Debug for IdentityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityConfig")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("request_uri", &self.request_uri)
            .finish()
    }
}

/// Essay examiner settings.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum EvaluatorConfig {
    Gemini {
        #[serde(default)]
        api_key: String,
        #[serde(default = "default_model")]
        model: String,
        #[serde(default)]
        base_url: Option<String>,
    },
    /// Awards a fixed band offline.
    Mock {
        #[serde(default = "default_mock_score")]
        score: f64,
        #[serde(default = "default_mock_feedback")]
        feedback: String,
    },
}

impl Default for EvaluatorConfig {
    fn default() -> Self {
        EvaluatorConfig::Gemini {
            api_key: String::new(),
            model: default_model(),
            base_url: None,
        }
    }
}

impl std::fmt::Debug for EvaluatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EvaluatorConfig::Gemini {
                api_key: _,
                model,
                base_url,
            } => f
                .debug_struct("Gemini")
                .field("api_key", &"***")
                .field("model", model)
                .field("base_url", base_url)
                .finish(),
            EvaluatorConfig::Mock { score, feedback } => f
                .debug_struct("Mock")
                .field("score", score)
                .field("feedback", feedback)
                .finish(),
        }
    }
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}
fn default_mock_score() -> f64 {
    6.5
}
fn default_mock_feedback() -> String {
    "Offline examiner: the essay was not reviewed.".to_string()
}

/// Mock exam settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExamSettings {
    /// Document id under the `exams` collection.
    #[serde(default = "default_variant")]
    pub variant: String,
    #[serde(default = "default_reading_minutes")]
    pub reading_minutes: u32,
    #[serde(default = "default_listening_minutes")]
    pub listening_minutes: u32,
    #[serde(default = "default_writing_minutes")]
    pub writing_minutes: u32,
    #[serde(default = "default_speaking_minutes")]
    pub speaking_minutes: u32,
    #[serde(default)]
    pub timeout_policy: TimeoutPolicy,
}

fn default_variant() -> String {
    DEFAULT_VARIANT.to_string()
}
fn default_reading_minutes() -> u32 {
    10
}
fn default_listening_minutes() -> u32 {
    10
}
fn default_writing_minutes() -> u32 {
    15
}
fn default_speaking_minutes() -> u32 {
    5
}

impl Default for ExamSettings {
    fn default() -> Self {
        Self {
            variant: default_variant(),
            reading_minutes: default_reading_minutes(),
            listening_minutes: default_listening_minutes(),
            writing_minutes: default_writing_minutes(),
            speaking_minutes: default_speaking_minutes(),
            timeout_policy: TimeoutPolicy::default(),
        }
    }
}

impl ExamSettings {
    pub fn exam_config(&self) -> ExamConfig {
        ExamConfig {
            timings: SectionTimings {
                reading_secs: self.reading_minutes.saturating_mul(60),
                listening_secs: self.listening_minutes.saturating_mul(60),
                writing_secs: self.writing_minutes.saturating_mul(60),
                speaking_secs: self.speaking_minutes.saturating_mul(60),
            },
            timeout_policy: self.timeout_policy,
        }
    }
}

/// Top-level ieltsprep configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IeltsprepConfig {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
    #[serde(default)]
    pub evaluator: EvaluatorConfig,
    #[serde(default)]
    pub exam: ExamSettings,
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    let mut result = s.to_string();
    while let Some(start) = result.find("${") {
        if let Some(end) = result[start..].find('}') {
            let var_name = &result[start + 2..start + end];
            let value = std::env::var(var_name).unwrap_or_default();
            result = format!(
                "{}{}{}",
                &result[..start],
                value,
                &result[start + end + 1..]
            );
        } else {
            break;
        }
    }
    result
}

fn resolve_opt(s: &Option<String>) -> Option<String> {
    s.as_deref().map(resolve_env_vars)
}

impl IeltsprepConfig {
    /// Expand `${VAR}` references in keys, ids and URLs.
    fn resolve_env(&mut self) {
        self.store = match &self.store {
            StoreConfig::Firestore {
                project_id,
                api_key,
                base_url,
            } => StoreConfig::Firestore {
                project_id: resolve_env_vars(project_id),
                api_key: resolve_opt(api_key),
                base_url: resolve_opt(base_url),
            },
            StoreConfig::File { path } => StoreConfig::File {
                path: path
                    .as_ref()
                    .map(|p| PathBuf::from(resolve_env_vars(&p.to_string_lossy()))),
            },
            StoreConfig::Memory => StoreConfig::Memory,
        };

        self.identity.api_key = resolve_env_vars(&self.identity.api_key);
        self.identity.base_url = resolve_opt(&self.identity.base_url);
        self.identity.request_uri = resolve_opt(&self.identity.request_uri);

        if let EvaluatorConfig::Gemini {
            api_key, base_url, ..
        } = &mut self.evaluator
        {
            *api_key = resolve_env_vars(api_key);
            *base_url = resolve_opt(base_url);
        }
    }

    /// Apply `IELTSPREP_FIREBASE_KEY` / `IELTSPREP_GEMINI_KEY`.
    fn apply_env_overrides(&mut self) {
        if let Ok(key) = std::env::var(FIREBASE_KEY_ENV) {
            self.identity.api_key = key.clone();
            if let StoreConfig::Firestore { api_key, .. } = &mut self.store {
                *api_key = Some(key);
            }
        }
        if let Ok(key) = std::env::var(GEMINI_KEY_ENV) {
            if let EvaluatorConfig::Gemini { api_key, .. } = &mut self.evaluator {
                *api_key = key;
            }
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `ieltsprep.toml` in the current directory
/// 2. `~/.config/ieltsprep/config.toml`
///
/// Environment variable overrides: `IELTSPREP_FIREBASE_KEY`, `IELTSPREP_GEMINI_KEY`.
pub fn load_config() -> Result<IeltsprepConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<IeltsprepConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("ieltsprep.toml");
        if local.exists() {
            Some(local)
        } else {
            home_config_dir()
                .map(|dir| dir.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading config");
            parse_config(
                &std::fs::read_to_string(&path)
                    .with_context(|| format!("failed to read config: {}", path.display()))?,
            )
            .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => IeltsprepConfig::default(),
    };

    config.apply_env_overrides();
    config.resolve_env();
    Ok(config)
}

/// Parse a config document without touching the environment.
pub fn parse_config(content: &str) -> Result<IeltsprepConfig> {
    Ok(toml::from_str::<IeltsprepConfig>(content)?)
}

fn home_config_dir() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("ieltsprep"))
}

/// Directory for local state: `$IELTSPREP_STATE_DIR`, else `~/.config/ieltsprep`,
/// else `.ieltsprep` in the current directory.
pub fn state_dir() -> PathBuf {
    std::env::var(STATE_DIR_ENV)
        .ok()
        .filter(|d| !d.trim().is_empty())
        .map(PathBuf::from)
        .or_else(home_config_dir)
        .unwrap_or_else(|| PathBuf::from(".ieltsprep"))
}

/// Create the document store. `id_token` authorizes Firestore requests.
pub fn create_store(
    config: &StoreConfig,
    id_token: Option<&str>,
) -> Result<Arc<dyn DocumentStore>> {
    match config {
        StoreConfig::Firestore {
            project_id,
            api_key,
            base_url,
        } => {
            if project_id.trim().is_empty() {
                anyhow::bail!("[store] project_id is required for the firestore store");
            }
            let mut store = FirestoreStore::new(project_id, api_key.clone(), base_url.clone())?;
            if let Some(token) = id_token {
                store = store.with_id_token(token);
            }
            Ok(Arc::new(store))
        }
        StoreConfig::File { path } => {
            let path = path
                .clone()
                .unwrap_or_else(|| state_dir().join("store.json"));
            Ok(Arc::new(FileStore::new(path)))
        }
        StoreConfig::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

/// Create the essay examiner.
pub fn create_evaluator(config: &EvaluatorConfig) -> Result<Arc<dyn EssayEvaluator>> {
    match config {
        EvaluatorConfig::Gemini {
            api_key,
            model,
            base_url,
        } => Ok(Arc::new(GeminiEvaluator::new(
            api_key,
            Some(model.clone()),
            base_url.clone(),
        )?)),
        EvaluatorConfig::Mock { score, feedback } => {
            Ok(Arc::new(MockEvaluator::with_score(*score, feedback)))
        }
    }
}

/// Create the identity provider.
pub fn create_identity(config: &IdentityConfig) -> Result<Arc<dyn IdentityProvider>> {
    Ok(Arc::new(FirebaseIdentity::new(
        &config.api_key,
        config.base_url.clone(),
        config.request_uri.clone(),
    )?))
}
