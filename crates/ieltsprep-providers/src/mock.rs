//! In-process providers for tests and offline runs.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use ieltsprep_core::error::ServiceError;
use ieltsprep_core::grading::{EssayAssessment, EssayRequest, MAX_BAND};
use ieltsprep_core::traits::{Document, DocumentStore, EssayEvaluator};

/// An examiner that awards a fixed band without calling any API.
pub struct MockEvaluator {
    score: f64,
    feedback: String,
    fail: bool,
    /// Number of calls made.
    call_count: AtomicU32,
    /// Last request received.
    last_request: Mutex<Option<EssayRequest>>,
}

impl MockEvaluator {
    /// Create an examiner that always awards `score`.
    pub fn with_score(score: f64, feedback: &str) -> Self {
        Self {
            score: score.clamp(0.0, MAX_BAND),
            feedback: feedback.to_string(),
            fail: false,
            call_count: AtomicU32::new(0),
            last_request: Mutex::new(None),
        }
    }

    /// Create an examiner whose every call fails with a network error.
    pub fn unreachable() -> Self {
        Self {
            fail: true,
            ..Self::with_score(0.0, "")
        }
    }

    /// Get the number of calls made to this examiner.
    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    /// Get the last request made to this examiner.
    pub fn last_request(&self) -> Option<EssayRequest> {
        self.last_request
            .lock()
            .ok()
            .and_then(|last| last.clone())
    }
}

#[async_trait]
impl EssayEvaluator for MockEvaluator {
    fn name(&self) -> &str {
        "mock"
    }

    async fn evaluate(&self, request: &EssayRequest) -> Result<EssayAssessment, ServiceError> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        if let Ok(mut last) = self.last_request.lock() {
            *last = Some(request.clone());
        }

        if self.fail {
            return Err(ServiceError::Network("mock examiner unreachable".into()));
        }
        Ok(EssayAssessment {
            score: self.score,
            feedback: self.feedback.clone(),
        })
    }
}

/// A `DocumentStore` held in memory for the lifetime of the process.
#[derive(Default)]
pub struct MemoryStore {
    docs: Mutex<HashMap<(String, String), Document>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored documents.
    pub fn len(&self) -> usize {
        self.docs.lock().map(|docs| docs.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn with_docs<T>(
        &self,
        f: impl FnOnce(&mut HashMap<(String, String), Document>) -> T,
    ) -> Result<T, ServiceError> {
        let mut docs = self
            .docs
            .lock()
            .map_err(|_| ServiceError::Network("memory store lock poisoned".into()))?;
        Ok(f(&mut docs))
    }
}

fn key(collection: &str, id: &str) -> (String, String) {
    (collection.to_string(), id.to_string())
}

#[async_trait]
impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, ServiceError> {
        self.with_docs(|docs| docs.get(&key(collection, id)).cloned())
    }

    async fn set(&self, collection: &str, id: &str, doc: &Document) -> Result<(), ServiceError> {
        self.with_docs(|docs| {
            docs.insert(key(collection, id), doc.clone());
        })
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: &Document,
    ) -> Result<(), ServiceError> {
        self.with_docs(|docs| {
            let doc = docs.entry(key(collection, id)).or_default();
            for (k, v) in fields {
                doc.insert(k.clone(), v.clone());
            }
        })
    }
}
