//! Google Drive API v3 client wrapper.
//!
//! One client per sync cycle, holding the bearer token for that cycle.
//! Uploads convert the ODT body into a native Google Doc; lookups are by
//! exact display name, first page only.

use async_trait::async_trait;
use orgdocs_core::{DocumentStore, SyncError};
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Drive document type created on upload.
pub const GOOGLE_DOC_MIME: &str = "application/vnd.google-apps.document";
/// Media type of the converted body we send.
pub const ODT_MIME: &str = "application/vnd.oasis.opendocument.text";

/// First (and only) page requested when listing by name.
const PAGE_SIZE: u32 = 30;

const API_BASE: &str = "https://www.googleapis.com/drive/v3";
const UPLOAD_BASE: &str = "https://www.googleapis.com/upload/drive/v3";

/// Listing response; only `id` and `name` are requested.
#[derive(Debug, Deserialize)]
struct FileList {
    #[serde(default)]
    files: Vec<FileRef>,
}

#[derive(Debug, Deserialize)]
struct FileRef {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

/// Google Drive API client, authorized for one sync cycle.
pub struct GDriveClient {
    http: reqwest::Client,
    token: String,
    api_base: String,
    upload_base: String,
}

impl GDriveClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            token: token.into(),
            api_base: API_BASE.to_string(),
            upload_base: UPLOAD_BASE.to_string(),
        }
    }

    /// Point the client at different API hosts (tests).
    pub fn with_base_urls(mut self, api_base: &str, upload_base: &str) -> Self {
        self.api_base = api_base.to_string();
        self.upload_base = upload_base.to_string();
        self
    }

    /// Identifiers of documents whose name equals `name` exactly.
    ///
    /// The remote query already matches on name, but its semantics are
    /// looser than exact, so results are filtered again client-side.
    #[instrument(skip(self), level = "debug")]
    pub async fn find_document_ids(&self, name: &str) -> anyhow::Result<Vec<String>> {
        let query = format!("name = \"{name}\"");
        let page_size = PAGE_SIZE.to_string();

        let resp = self
            .http
            .get(format!("{}/files", self.api_base))
            .bearer_auth(&self.token)
            .query(&[
                ("q", query.as_str()),
                ("pageSize", page_size.as_str()),
                ("fields", "nextPageToken, files(id, name)"),
            ])
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Google Drive list error {}: {}", status, body);
        }

        let list: FileList = resp.json().await?;
        let ids: Vec<String> = list
            .files
            .into_iter()
            .filter(|f| f.name == name)
            .map(|f| f.id)
            .collect();

        debug!("Found {} document(s) named {:?}", ids.len(), name);
        Ok(ids)
    }

    /// Create a new Google Doc named `name` from the ODT body.
    #[instrument(skip(self, content), level = "debug", fields(content_len = content.len()))]
    pub async fn create_document(&self, name: &str, content: &[u8]) -> anyhow::Result<String> {
        let form = Self::upload_form(name, content)?;

        let resp = self
            .http
            .post(format!("{}/files", self.upload_base))
            .bearer_auth(&self.token)
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Google Drive create error {}: {}", status, body);
        }

        let created: CreatedFile = resp.json().await?;
        debug!("Created document {:?} with id {}", name, created.id);
        Ok(created.id)
    }

    /// Replace the content of an existing document in place, keeping the
    /// display name and document type.
    #[instrument(skip(self, content), level = "debug", fields(content_len = content.len()))]
    pub async fn update_document(
        &self,
        file_id: &str,
        name: &str,
        content: &[u8],
    ) -> anyhow::Result<()> {
        let form = Self::upload_form(name, content)?;

        let resp = self
            .http
            .patch(format!("{}/files/{}", self.upload_base, file_id))
            .bearer_auth(&self.token)
            .query(&[("uploadType", "multipart")])
            .multipart(form)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Google Drive update error {}: {}", status, body);
        }

        debug!("Updated document {} ({} bytes)", file_id, content.len());
        Ok(())
    }

    /// Delete a document by identifier. Manual-cleanup helper for the
    /// ambiguous-name case; the watch pipeline never calls it.
    #[instrument(skip(self), level = "debug")]
    pub async fn delete_document(&self, file_id: &str) -> anyhow::Result<()> {
        let resp = self
            .http
            .delete(format!("{}/files/{}", self.api_base, file_id))
            .bearer_auth(&self.token)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("Google Drive delete error {}: {}", status, body);
        }

        debug!("Deleted document {}", file_id);
        Ok(())
    }

    /// Multipart body shared by create and update: JSON metadata part plus
    /// the ODT media part.
    fn upload_form(name: &str, content: &[u8]) -> anyhow::Result<Form> {
        let metadata = serde_json::json!({
            "name": name,
            "mimeType": GOOGLE_DOC_MIME,
        });

        let metadata_part = Part::text(metadata.to_string()).mime_str("application/json")?;
        let media_part = Part::bytes(content.to_vec()).mime_str(ODT_MIME)?;

        Ok(Form::new()
            .part("metadata", metadata_part)
            .part("media", media_part))
    }
}

#[async_trait]
impl DocumentStore for GDriveClient {
    async fn find_document_ids(&self, name: &str) -> Result<Vec<String>, SyncError> {
        GDriveClient::find_document_ids(self, name)
            .await
            .map_err(|e| SyncError::Remote(format!("{e:#}")))
    }

    async fn create_document(&self, name: &str, content: &[u8]) -> Result<String, SyncError> {
        GDriveClient::create_document(self, name, content)
            .await
            .map_err(|e| SyncError::Remote(format!("{e:#}")))
    }

    async fn update_document(
        &self,
        id: &str,
        name: &str,
        content: &[u8],
    ) -> Result<(), SyncError> {
        GDriveClient::update_document(self, id, name, content)
            .await
            .map_err(|e| SyncError::Remote(format!("{e:#}")))
    }
}
