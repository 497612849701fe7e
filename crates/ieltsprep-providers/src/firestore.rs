//! Firestore document store over the REST v1 API.
//!
//! Firestore wraps every field in a typed value (`{"stringValue": "x"}`,
//! `{"integerValue": "3"}`, ...). Documents cross the trait boundary as plain
//! JSON objects; the codec below translates in both directions.

use async_trait::async_trait;
use serde_json::{json, Map, Number, Value};
use tracing::instrument;

use ieltsprep_core::error::ServiceError;
use ieltsprep_core::traits::{Document, DocumentStore};

use crate::error::{check_status, google_error_message, http_client, send_error, ProviderError};

pub const DEFAULT_BASE_URL: &str = "https://firestore.googleapis.com";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Firestore-backed `DocumentStore`.
pub struct FirestoreStore {
    project_id: String,
    api_key: Option<String>,
    id_token: Option<String>,
    base_url: String,
    client: reqwest::Client,
}

impl FirestoreStore {
    pub fn new(
        project_id: &str,
        api_key: Option<String>,
        base_url: Option<String>,
    ) -> Result<Self, ProviderError> {
        Ok(Self {
            project_id: project_id.to_string(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            id_token: None,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            client: http_client(DEFAULT_TIMEOUT_SECS)?,
        })
    }

    /// Authorize requests as a signed-in user.
    pub fn with_id_token(mut self, id_token: impl Into<String>) -> Self {
        self.id_token = Some(id_token.into());
        self
    }

    fn document_url(&self, collection: &str, id: &str) -> Result<reqwest::Url, ProviderError> {
        let mut url = reqwest::Url::parse(&format!(
            "{}/v1/projects/{}/databases/(default)/documents/{}/{}",
            self.base_url, self.project_id, collection, id
        ))
        .map_err(|e| ProviderError::Client(format!("invalid document url: {e}")))?;
        if let Some(key) = &self.api_key {
            url.query_pairs_mut().append_pair("key", key);
        }
        Ok(url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.id_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn patch(&self, url: reqwest::Url, what: &str, doc: &Document) -> Result<(), ProviderError> {
        let body = json!({ "fields": encode_fields(doc) });
        let response = self
            .authorize(self.client.patch(url))
            .json(&body)
            .send()
            .await
            .map_err(|e| send_error(e, DEFAULT_TIMEOUT_SECS))?;
        check_status(response, what, google_error_message).await?;
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    fn name(&self) -> &str {
        "firestore"
    }

    #[instrument(skip(self), fields(project = %self.project_id))]
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, ServiceError> {
        let url = self.document_url(collection, id)?;
        let response = self
            .authorize(self.client.get(url))
            .send()
            .await
            .map_err(|e| send_error(e, DEFAULT_TIMEOUT_SECS))?;

        if response.status().as_u16() == 404 {
            return Ok(None);
        }
        let what = format!("{collection}/{id}");
        let response = check_status(response, &what, google_error_message).await?;

        let body: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("failed to parse document: {e}")))?;
        let fields = body.get("fields").cloned().unwrap_or_else(|| json!({}));
        Ok(Some(decode_fields(&fields)?))
    }

    #[instrument(skip(self, doc), fields(project = %self.project_id))]
    async fn set(&self, collection: &str, id: &str, doc: &Document) -> Result<(), ServiceError> {
        let url = self.document_url(collection, id)?;
        self.patch(url, &format!("{collection}/{id}"), doc).await?;
        Ok(())
    }

    #[instrument(skip(self, fields), fields(project = %self.project_id))]
    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: &Document,
    ) -> Result<(), ServiceError> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut url = self.document_url(collection, id)?;
        {
            let mut query = url.query_pairs_mut();
            for key in fields.keys() {
                query.append_pair("updateMask.fieldPaths", &field_path(key));
            }
        }
        self.patch(url, &format!("{collection}/{id}"), fields).await?;
        Ok(())
    }
}

/// Quote a field name that is not a plain identifier.
fn field_path(name: &str) -> String {
    let simple = name
        .chars()
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if simple {
        name.to_string()
    } else {
        format!("`{}`", name.replace('\\', "\\\\").replace('`', "\\`"))
    }
}

// ---------------------------------------------------------------------------
// Typed value codec
// ---------------------------------------------------------------------------

/// Encode a JSON object as a Firestore `fields` map.
pub fn encode_fields(doc: &Document) -> Value {
    Value::Object(
        doc.iter()
            .map(|(k, v)| (k.clone(), encode_value(v)))
            .collect(),
    )
}

pub fn encode_value(value: &Value) -> Value {
    match value {
        Value::Null => json!({ "nullValue": null }),
        Value::Bool(b) => json!({ "booleanValue": b }),
        Value::Number(n) => match n.as_i64() {
            Some(i) => json!({ "integerValue": i.to_string() }),
            None => json!({ "doubleValue": n.as_f64().unwrap_or_default() }),
        },
        Value::String(s) => json!({ "stringValue": s }),
        Value::Array(items) => {
            let values: Vec<Value> = items.iter().map(encode_value).collect();
            json!({ "arrayValue": { "values": values } })
        }
        Value::Object(map) => json!({ "mapValue": { "fields": encode_fields(map) } }),
    }
}

/// Decode a Firestore `fields` map into a JSON object.
pub fn decode_fields(fields: &Value) -> Result<Document, ProviderError> {
    let map = fields
        .as_object()
        .ok_or_else(|| ProviderError::InvalidResponse("document fields must be a map".into()))?;
    map.iter()
        .map(|(k, v)| Ok((k.clone(), decode_value(v)?)))
        .collect()
}

pub fn decode_value(value: &Value) -> Result<Value, ProviderError> {
    let invalid = |what: &str| ProviderError::InvalidResponse(format!("invalid {what}: {value}"));

    let (kind, inner) = value
        .as_object()
        .and_then(|m| m.iter().next())
        .ok_or_else(|| invalid("typed value"))?;

    match (kind.as_str(), inner) {
        ("nullValue", _) => Ok(Value::Null),
        ("booleanValue", Value::Bool(b)) => Ok(Value::Bool(*b)),
        ("integerValue", Value::String(s)) => s
            .parse::<i64>()
            .map(Value::from)
            .map_err(|_| invalid("integerValue")),
        ("integerValue", Value::Number(n)) => Ok(Value::Number(n.clone())),
        ("doubleValue", Value::Number(n)) => Ok(Value::Number(n.clone())),
        ("doubleValue", Value::String(s)) => s
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number)
            .ok_or_else(|| invalid("doubleValue")),
        ("stringValue" | "timestampValue" | "referenceValue" | "bytesValue", Value::String(s)) => {
            Ok(Value::String(s.clone()))
        }
        ("geoPointValue", Value::Object(point)) => Ok(Value::Object(point.clone())),
        ("arrayValue", Value::Object(array)) => match array.get("values") {
            Some(Value::Array(values)) => values
                .iter()
                .map(decode_value)
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            None => Ok(Value::Array(Vec::new())),
            Some(_) => Err(invalid("arrayValue")),
        },
        ("mapValue", Value::Object(map)) => match map.get("fields") {
            Some(fields) => decode_fields(fields).map(Value::Object),
            None => Ok(Value::Object(Map::new())),
        },
        _ => Err(invalid("typed value")),
    }
}
