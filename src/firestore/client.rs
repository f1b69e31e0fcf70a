// Firestore REST client: collection fetch, structured queries, and atomic
// batched writes.
//
// The client is constructed explicitly from the pasted connection
// credentials; construction failure is a typed error, not a null handle.
// Every bulk operation is submitted as one commit, so a batch either fully
// succeeds or the whole action fails.

use serde_json::json;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use crate::config::ProjectConfig;

use super::document::Document;
use super::query::{self, QuerySpec};
use super::value::Value;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

const FIRESTORE_API_URL: &str = "https://firestore.googleapis.com/v1";

/// Page size for the plain collection fetch. The console loads one page;
/// operators narrow large collections with queries instead of paging.
const LIST_PAGE_SIZE: u32 = 300;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum FirestoreError {
    #[error("invalid connection config: {0}")]
    InvalidConfig(String),

    #[error("network error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("malformed backend response: {0}")]
    MalformedResponse(String),

    #[error("document {0} not found")]
    NotFound(String),
}

// ---------------------------------------------------------------------------
// FirestoreClient
// ---------------------------------------------------------------------------

/// REST client bound to one project.
///
/// Stateless across calls: the optional bearer token is passed per request
/// so a sign-in or sign-out never mutates the shared client.
#[derive(Debug)]
pub struct FirestoreClient {
    http: reqwest::Client,
    base_url: String,
    project_id: String,
    api_key: String,
}

impl FirestoreClient {
    /// Construct a client from the pasted connection credentials.
    ///
    /// Validates the fields every request needs; a blank project id or API
    /// key is a configuration error surfaced before any network traffic.
    pub fn new(config: &ProjectConfig) -> Result<Self, FirestoreError> {
        Self::with_base_url(config, FIRESTORE_API_URL)
    }

    /// Construct against an alternate endpoint (tests point this at a local
    /// mock server).
    pub fn with_base_url(config: &ProjectConfig, base_url: &str) -> Result<Self, FirestoreError> {
        if config.project_id.trim().is_empty() {
            return Err(FirestoreError::InvalidConfig(
                "projectId is required".to_string(),
            ));
        }
        if config.api_key.trim().is_empty() {
            return Err(FirestoreError::InvalidConfig(
                "apiKey is required".to_string(),
            ));
        }
        Ok(FirestoreClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            project_id: config.project_id.trim().to_string(),
            api_key: config.api_key.trim().to_string(),
        })
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// The documents root for this project's default database.
    fn parent_path(&self) -> String {
        format!(
            "projects/{}/databases/(default)/documents",
            self.project_id
        )
    }

    /// Full resource name of a document.
    fn doc_name(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.parent_path(), collection, id)
    }

    // -----------------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------------

    /// Fetch the documents of a collection (one page, unordered).
    pub async fn list_documents(
        &self,
        collection: &str,
        token: Option<&str>,
    ) -> Result<Vec<Document>, FirestoreError> {
        let url = format!(
            "{}/{}/{}?key={}&pageSize={}",
            self.base_url,
            self.parent_path(),
            collection,
            self.api_key,
            LIST_PAGE_SIZE,
        );
        let body = self.send(self.http.get(&url), token).await?;
        let documents = body
            .get("documents")
            .and_then(|d| d.as_array())
            .map(|resources| {
                resources
                    .iter()
                    .filter_map(Document::from_resource)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        debug!(collection, count = documents.len(), "listed collection");
        Ok(documents)
    }

    /// Run a structured query against a collection.
    pub async fn run_query(
        &self,
        collection: &str,
        spec: &QuerySpec,
        token: Option<&str>,
    ) -> Result<Vec<Document>, FirestoreError> {
        let url = format!(
            "{}/{}:runQuery?key={}",
            self.base_url,
            self.parent_path(),
            self.api_key,
        );
        let request_body = query::structured_query(collection, spec);
        let body = self
            .send(self.http.post(&url).json(&request_body), token)
            .await?;

        // The response is an array of result entries; entries without a
        // `document` key (readTime-only progress markers) are skipped.
        let entries = body.as_array().ok_or_else(|| {
            FirestoreError::MalformedResponse("expected a result array".to_string())
        })?;
        let documents = entries
            .iter()
            .filter_map(|entry| entry.get("document"))
            .filter_map(Document::from_resource)
            .collect::<Vec<_>>();
        debug!(collection, count = documents.len(), "query returned");
        Ok(documents)
    }

    /// Fetch a single document by id.
    pub async fn get_document(
        &self,
        collection: &str,
        id: &str,
        token: Option<&str>,
    ) -> Result<Document, FirestoreError> {
        let url = format!(
            "{}/{}?key={}",
            self.base_url,
            self.doc_name(collection, id),
            self.api_key,
        );
        let body = self.send(self.http.get(&url), token).await?;
        Document::from_resource(&body).ok_or_else(|| FirestoreError::NotFound(id.to_string()))
    }

    // -----------------------------------------------------------------------
    // Batched writes
    // -----------------------------------------------------------------------

    /// Apply the same field edits and field deletions to every selected
    /// document, as one atomic commit.
    ///
    /// Returns the number of documents written.
    pub async fn batch_update(
        &self,
        collection: &str,
        ids: &[String],
        edits: &[(String, Value)],
        removed_fields: &[String],
        token: Option<&str>,
    ) -> Result<usize, FirestoreError> {
        let writes: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| build_update_write(&self.doc_name(collection, id), edits, removed_fields))
            .collect();
        self.commit(writes, token).await?;
        Ok(ids.len())
    }

    /// Copy every field of each selected document into a new document with
    /// a fresh identifier, as one atomic commit.
    pub async fn duplicate_documents(
        &self,
        collection: &str,
        ids: &[String],
        token: Option<&str>,
    ) -> Result<usize, FirestoreError> {
        let mut writes = Vec::with_capacity(ids.len());
        for id in ids {
            let source = self.get_document(collection, id, token).await?;
            let new_id = fresh_document_id();
            writes.push(build_duplicate_write(
                &self.doc_name(collection, &new_id),
                &source,
            ));
        }
        self.commit(writes, token).await?;
        Ok(ids.len())
    }

    /// Delete every selected document, as one atomic commit.
    pub async fn delete_documents(
        &self,
        collection: &str,
        ids: &[String],
        token: Option<&str>,
    ) -> Result<usize, FirestoreError> {
        let writes: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| json!({ "delete": self.doc_name(collection, id) }))
            .collect();
        self.commit(writes, token).await?;
        Ok(ids.len())
    }

    /// Submit a commit request. The backend applies the writes atomically.
    async fn commit(
        &self,
        writes: Vec<serde_json::Value>,
        token: Option<&str>,
    ) -> Result<(), FirestoreError> {
        let url = format!(
            "{}/{}:commit?key={}",
            self.base_url,
            self.parent_path(),
            self.api_key,
        );
        let body = json!({ "writes": writes });
        self.send(self.http.post(&url).json(&body), token).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Transport
    // -----------------------------------------------------------------------

    /// Send a request, attach the session token when present, and map
    /// non-success responses to a backend error with the human-readable
    /// message the backend provides.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        token: Option<&str>,
    ) -> Result<serde_json::Value, FirestoreError> {
        let request = match token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };
        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(FirestoreError::Backend {
                status: status.as_u16(),
                message: extract_backend_message(&text),
            });
        }
        serde_json::from_str(&text)
            .map_err(|e| FirestoreError::MalformedResponse(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Write builders
// ---------------------------------------------------------------------------

/// Build a masked update write.
///
/// Removed fields appear in the mask but not in the document, which is the
/// wire form of the field-deletion sentinel: the backend drops them.
pub fn build_update_write(
    doc_name: &str,
    edits: &[(String, Value)],
    removed_fields: &[String],
) -> serde_json::Value {
    let mut fields = serde_json::Map::new();
    for (field, value) in edits {
        fields.insert(field.clone(), super::value::to_wire(value));
    }
    let mut mask: Vec<&str> = edits.iter().map(|(field, _)| field.as_str()).collect();
    mask.extend(removed_fields.iter().map(String::as_str));
    json!({
        "update": { "name": doc_name, "fields": fields },
        "updateMask": { "fieldPaths": mask },
    })
}

/// Build a create-only write carrying a full copy of the source document's
/// fields. The precondition makes the commit fail rather than overwrite if
/// the fresh id already exists.
pub fn build_duplicate_write(new_doc_name: &str, source: &Document) -> serde_json::Value {
    json!({
        "update": { "name": new_doc_name, "fields": source.fields_to_wire() },
        "currentDocument": { "exists": false },
    })
}

/// Generate a fresh document identifier for duplication.
fn fresh_document_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Pull the backend's error message out of an error response body, falling
/// back to a snippet of the raw body.
fn extract_backend_message(body: &str) -> String {
    if let Ok(parsed) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(message) = parsed
            .get("error")
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }
        // Commit error bodies are arrays of per-write statuses.
        if let Some(message) = parsed
            .get(0)
            .and_then(|e| e.get("error"))
            .and_then(|e| e.get("message"))
            .and_then(|m| m.as_str())
        {
            return message.to_string();
        }
    }
    let snippet: String = body.chars().take(200).collect();
    if snippet.is_empty() {
        "no error detail provided".to_string()
    } else {
        snippet
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
