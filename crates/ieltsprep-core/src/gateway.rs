//! Remote data gateway.
//!
//! Typed access to the two collections the application uses, on top of any
//! `DocumentStore`. Reads follow a read-or-seed pattern: a missing document is
//! created from a default and returned.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::content::fallback_exam;
use crate::error::ServiceError;
use crate::model::{
    ExamContent, ProfileUpdate, UserProfile, EXAMS_COLLECTION, USERS_COLLECTION,
};
use crate::traits::{AuthUser, Document, DocumentStore};

/// Where the exam content of a session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentSource {
    /// Read from the store.
    Remote,
    /// The store had no such variant; the built-in one was written to it.
    Seeded,
    /// The store could not be read; the built-in variant is used locally.
    Fallback,
}

/// Exam content together with its origin.
#[derive(Debug, Clone)]
pub struct LoadedContent {
    pub content: ExamContent,
    pub source: ContentSource,
}

fn to_document<T: Serialize>(value: &T) -> Result<Document, ServiceError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(ServiceError::MalformedResponse(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(ServiceError::MalformedResponse(e.to_string())),
    }
}

fn from_document<T: DeserializeOwned>(doc: Document, what: &str) -> Result<T, ServiceError> {
    serde_json::from_value(Value::Object(doc))
        .map_err(|e| ServiceError::MalformedResponse(format!("{what}: {e}")))
}

/// Typed reads and writes against the document store.
#[derive(Clone)]
pub struct DataGateway {
    store: Arc<dyn DocumentStore>,
}

impl DataGateway {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub fn store_name(&self) -> &str {
        self.store.name()
    }

    /// Fetch a profile without seeding.
    pub async fn fetch_profile(&self, uid: &str) -> Result<Option<UserProfile>, ServiceError> {
        match self.store.get(USERS_COLLECTION, uid).await? {
            Some(doc) => Ok(Some(from_document(doc, "user profile")?)),
            None => Ok(None),
        }
    }

    /// Fetch the signed-in user's profile, seeding a default one on first use.
    pub async fn load_or_seed_profile(&self, user: &AuthUser) -> Result<UserProfile, ServiceError> {
        if let Some(profile) = self.fetch_profile(&user.uid).await? {
            return Ok(profile);
        }

        let profile = UserProfile::seeded(user.display_name.clone().unwrap_or_default());
        self.store
            .set(USERS_COLLECTION, &user.uid, &to_document(&profile)?)
            .await?;
        tracing::info!(uid = %user.uid, "seeded new user profile");
        Ok(profile)
    }

    /// Write the present fields of `update`. Returns once the store acknowledged.
    pub async fn update_profile(&self, uid: &str, update: &ProfileUpdate) -> Result<(), ServiceError> {
        if update.is_empty() {
            return Ok(());
        }
        self.store
            .merge(USERS_COLLECTION, uid, &to_document(update)?)
            .await
    }

    /// Load an exam variant.
    ///
    /// Never fails: a missing variant is seeded from the built-in content and
    /// any read error falls back to it.
    pub async fn load_exam_content(&self, variant: &str) -> LoadedContent {
        let read = match self.store.get(EXAMS_COLLECTION, variant).await {
            Ok(Some(doc)) => from_document::<ExamContent>(doc, "exam content").map(Some),
            Ok(None) => Ok(None),
            Err(e) => Err(e),
        };

        match read {
            Ok(Some(content)) => LoadedContent {
                content,
                source: ContentSource::Remote,
            },
            Ok(None) => {
                let content = fallback_exam();
                let seeded = match to_document(&content) {
                    Ok(doc) => self.store.set(EXAMS_COLLECTION, variant, &doc).await,
                    Err(e) => Err(e),
                };
                if let Err(e) = seeded {
                    tracing::warn!(variant, "failed to seed exam content: {e}");
                }
                LoadedContent {
                    content,
                    source: ContentSource::Seeded,
                }
            }
            Err(e) => {
                tracing::warn!(variant, "using built-in exam content: {e}");
                LoadedContent {
                    content: fallback_exam(),
                    source: ContentSource::Fallback,
                }
            }
        }
    }
}

/// The profile shown to the user.
///
/// Changes only after the store acknowledged them; a failed write leaves the
/// displayed profile as it was.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileHandle {
    uid: String,
    profile: UserProfile,
}

impl ProfileHandle {
    pub fn new(uid: impl Into<String>, profile: UserProfile) -> Self {
        Self {
            uid: uid.into(),
            profile,
        }
    }

    pub fn uid(&self) -> &str {
        &self.uid
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    /// Write `update` through `gateway`, then apply it locally.
    pub async fn update(
        &mut self,
        gateway: &DataGateway,
        update: ProfileUpdate,
    ) -> Result<&UserProfile, ServiceError> {
        gateway.update_profile(&self.uid, &update).await?;
        self.profile.apply(&update);
        Ok(&self.profile)
    }
}
