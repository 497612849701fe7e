//! JSON file document store for offline use.
//!
//! The whole store is a single JSON object `{collection: {id: document}}`.
//! Every write rewrites the file through a temporary sibling and a rename.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::Mutex;

use ieltsprep_core::error::ServiceError;
use ieltsprep_core::traits::{Document, DocumentStore};

type Collections = Map<String, Value>;

/// File-backed `DocumentStore`.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<Collections, ServiceError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(ServiceError::Network(format!(
                    "failed to read {}: {e}",
                    self.path.display()
                )))
            }
        };
        if content.trim().is_empty() {
            return Ok(Map::new());
        }
        serde_json::from_str(&content).map_err(|e| {
            ServiceError::MalformedResponse(format!("{} is not a JSON object: {e}", self.path.display()))
        })
    }

    async fn save(&self, collections: &Collections) -> Result<(), ServiceError> {
        let io_err = |e: std::io::Error| {
            ServiceError::Network(format!("failed to write {}: {e}", self.path.display()))
        };
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(io_err)?;
        }
        let json = serde_json::to_string_pretty(collections)
            .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await.map_err(io_err)?;
        tokio::fs::rename(&tmp, &self.path).await.map_err(io_err)?;
        Ok(())
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        apply: impl FnOnce(&mut Document),
    ) -> Result<(), ServiceError> {
        let _guard = self.lock.lock().await;
        let mut collections = self.load().await?;
        let docs = collections
            .entry(collection.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        let Value::Object(docs) = docs else {
            return Err(ServiceError::MalformedResponse(format!(
                "collection {collection} is not an object"
            )));
        };
        let doc = docs
            .entry(id.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !doc.is_object() {
            *doc = Value::Object(Map::new());
        }
        if let Value::Object(doc) = doc {
            apply(doc);
        }
        self.save(&collections).await
    }
}

#[async_trait]
impl DocumentStore for FileStore {
    fn name(&self) -> &str {
        "file"
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, ServiceError> {
        let _guard = self.lock.lock().await;
        let collections = self.load().await?;
        match collections.get(collection).and_then(|docs| docs.get(id)) {
            None => Ok(None),
            Some(Value::Object(doc)) => Ok(Some(doc.clone())),
            Some(_) => Err(ServiceError::MalformedResponse(format!(
                "{collection}/{id} is not an object"
            ))),
        }
    }

    async fn set(&self, collection: &str, id: &str, doc: &Document) -> Result<(), ServiceError> {
        tracing::debug!(collection, id, path = %self.path.display(), "writing document");
        self.update(collection, id, |existing| *existing = doc.clone())
            .await
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: &Document,
    ) -> Result<(), ServiceError> {
        tracing::debug!(collection, id, fields = fields.len(), "merging document");
        self.update(collection, id, |existing| {
            for (k, v) in fields {
                existing.insert(k.clone(), v.clone());
            }
        })
        .await
    }
}
