//! Service traits for the external collaborators.
//!
//! Implemented by the `ieltsprep-providers` crate: a document store, an
//! identity provider and an essay examiner.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ServiceError;
use crate::grading::{EssayAssessment, EssayRequest};

/// A JSON object stored under `collection/id`.
pub type Document = Map<String, Value>;

// ---------------------------------------------------------------------------
// Document store
// ---------------------------------------------------------------------------

/// Keyed document reads and writes. Last write wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Human-readable backend name (e.g. "firestore").
    fn name(&self) -> &str;

    /// Read a document. `Ok(None)` means the document does not exist.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, ServiceError>;

    /// Create or replace a document.
    async fn set(&self, collection: &str, id: &str, doc: &Document) -> Result<(), ServiceError>;

    /// Write only the given top-level fields, creating the document if needed.
    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: &Document,
    ) -> Result<(), ServiceError>;
}

// ---------------------------------------------------------------------------
// Essay examiner
// ---------------------------------------------------------------------------

/// Grades a writing-section essay.
#[async_trait]
pub trait EssayEvaluator: Send + Sync {
    /// Human-readable provider name (e.g. "gemini").
    fn name(&self) -> &str;

    async fn evaluate(&self, request: &EssayRequest) -> Result<EssayAssessment, ServiceError>;
}

// ---------------------------------------------------------------------------
// Identity
// ---------------------------------------------------------------------------

/// The delegated sign-in mechanisms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SignInMethod {
    Google,
    Apple,
}

impl SignInMethod {
    /// Provider id understood by the identity service.
    pub fn provider_id(self) -> &'static str {
        match self {
            SignInMethod::Google => "google.com",
            SignInMethod::Apple => "apple.com",
        }
    }
}

impl fmt::Display for SignInMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignInMethod::Google => write!(f, "google"),
            SignInMethod::Apple => write!(f, "apple"),
        }
    }
}

impl FromStr for SignInMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "google" | "google.com" => Ok(SignInMethod::Google),
            "apple" | "apple.com" => Ok(SignInMethod::Apple),
            other => Err(format!("unknown sign-in method: {other}")),
        }
    }
}

/// A signed-in user.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    /// Bearer token for the document store.
    pub id_token: String,
}

impl fmt::Debug for AuthUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthUser")
            .field("uid", &self.uid)
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("id_token", &"***")
            .finish()
    }
}

/// Exchanges a delegated credential for an application identity.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Sign in with a credential obtained from `method` (an OAuth id token).
    async fn sign_in(&self, method: SignInMethod, credential: &str)
        -> Result<AuthUser, ServiceError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_in_method_parse() {
        assert_eq!("Google".parse::<SignInMethod>().unwrap(), SignInMethod::Google);
        assert_eq!("apple.com".parse::<SignInMethod>().unwrap(), SignInMethod::Apple);
        assert!("github".parse::<SignInMethod>().is_err());
        assert_eq!(SignInMethod::Apple.provider_id(), "apple.com");
    }

    #[test]
    fn auth_user_debug_masks_token() {
        let user = AuthUser {
            uid: "u1".into(),
            display_name: None,
            email: None,
            id_token: "secret-token".into(),
        };
        let debug = format!("{user:?}");
        assert!(!debug.contains("secret-token"));
        assert!(debug.contains("u1"));
    }
}
