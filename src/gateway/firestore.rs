use crate::error::StoreError;
use crate::storage::DocumentStore;
use crate::types::{Document, FieldValue};
use async_trait::async_trait;
use chrono::SecondsFormat;
use serde_json::{json, Map, Value};
use std::time::Duration;
use tracing::{debug, instrument};

const FIRESTORE_API: &str = "https://firestore.googleapis.com/v1";

/// Connection settings for the Firestore REST API.
/// Resolved from config.toml plus env:
/// - FIRESTORE_PROJECT_ID (overrides config)
/// - FIRESTORE_ACCESS_TOKEN (OAuth bearer token, required unless using the emulator)
/// - FIRESTORE_EMULATOR_HOST (e.g. localhost:8080, plain HTTP and no auth)
#[derive(Debug, Clone)]
pub struct FirestoreSettings {
    pub project_id: String,
    pub database: String,
    pub access_token: Option<String>,
    pub emulator_host: Option<String>,
}

impl FirestoreSettings {
    pub fn documents_root(&self) -> String {
        let base = match &self.emulator_host {
            Some(host) => format!("http://{}/v1", host.trim_end_matches('/')),
            None => FIRESTORE_API.to_string(),
        };
        format!(
            "{}/projects/{}/databases/{}/documents",
            base, self.project_id, self.database
        )
    }
}

pub struct FirestoreStore {
    client: reqwest::Client,
    settings: FirestoreSettings,
}

impl FirestoreStore {
    pub fn new(settings: FirestoreSettings, timeout: Duration) -> Result<Self, StoreError> {
        if settings.emulator_host.is_none() && settings.access_token.is_none() {
            return Err(StoreError::Credentials(
                "FIRESTORE_ACCESS_TOKEN is not set".to_string(),
            ));
        }
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, settings })
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match (&self.settings.emulator_host, &self.settings.access_token) {
            (None, Some(token)) => request.bearer_auth(token),
            _ => request,
        }
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<Value, StoreError> {
        let resp = self.authorize(request).send().await?;
        let status = resp.status();
        let body = resp.text().await.unwrap_or_default();
        if !status.is_success() {
            return Err(StoreError::Rejected {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_str(&body).map_err(|e| StoreError::Response(e.to_string()))
    }
}

#[async_trait]
impl DocumentStore for FirestoreStore {
    #[instrument(skip(self, document))]
    async fn add(&self, collection: &str, document: &Document) -> Result<String, StoreError> {
        let url = format!("{}/{}", self.settings.documents_root(), collection);
        let created = self
            .send(self.client.post(&url).json(&encode_document(document)))
            .await?;
        let id = document_id(&created)?;
        debug!("Firestore created {}/{}", collection, id);
        Ok(id)
    }

    #[instrument(skip(self, document))]
    async fn set(&self, collection: &str, id: &str, document: &Document) -> Result<(), StoreError> {
        let url = format!("{}/{}/{}", self.settings.documents_root(), collection, id);
        self.send(self.client.patch(&url).json(&encode_document(document)))
            .await?;
        debug!("Firestore wrote {}/{}", collection, id);
        Ok(())
    }
}

/// The document id is the last path segment of the returned resource name.
fn document_id(created: &Value) -> Result<String, StoreError> {
    created
        .get("name")
        .and_then(Value::as_str)
        .and_then(|name| name.rsplit('/').next())
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .ok_or_else(|| StoreError::Response(format!("no document name in {created}")))
}

pub fn encode_document(document: &Document) -> Value {
    json!({ "fields": encode_fields(document) })
}

fn encode_fields(fields: &Document) -> Value {
    let map: Map<String, Value> = fields
        .iter()
        .map(|(k, v)| (k.clone(), encode_value(v)))
        .collect();
    Value::Object(map)
}

/// Firestore typed-value encoding.
pub fn encode_value(value: &FieldValue) -> Value {
    match value {
        FieldValue::Null => json!({ "nullValue": null }),
        FieldValue::Bool(b) => json!({ "booleanValue": b }),
        // int64 travels as a decimal string
        FieldValue::Integer(i) => json!({ "integerValue": i.to_string() }),
        FieldValue::Double(d) => json!({ "doubleValue": d }),
        FieldValue::Timestamp(ts) => {
            json!({ "timestampValue": ts.to_rfc3339_opts(SecondsFormat::Secs, true) })
        }
        FieldValue::String(s) => json!({ "stringValue": s }),
        FieldValue::Array(values) if values.is_empty() => json!({ "arrayValue": {} }),
        FieldValue::Array(values) => {
            json!({ "arrayValue": { "values": values.iter().map(encode_value).collect::<Vec<_>>() } })
        }
        FieldValue::Map(fields) => json!({ "mapValue": { "fields": encode_fields(fields) } }),
    }
}
