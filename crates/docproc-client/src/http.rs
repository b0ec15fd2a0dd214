//! HTTP client for the ingestion backend's document, chat, export, and price-list endpoints.

use std::path::{Path, PathBuf};
use std::time::Duration;

use docproc_core::file_type;
use docproc_core::{
    ChatMessageJob, ChatMessageRequest, DocumentJob, ExportLink, InputError, PriceListHit,
    PriceListOptions, PriceListReceipt, PriceListSearchQuery, PriceListStatus, UploadFile,
    UploadReceipt,
};
use futures::StreamExt;
use reqwest::Url;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info};

use crate::ClientError;

/// Connection settings for [`ApiClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// e.g. `http://127.0.0.1:8000` (trailing slash is ignored).
    pub base_url: String,
    pub timeout: Duration,
    pub max_upload_bytes: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8000".to_string(),
            timeout: Duration::from_secs(60),
            max_upload_bytes: file_type::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

/// HTTP client for the backend's `/api` endpoints.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    max_upload_bytes: u64,
}

impl ApiClient {
    /// Create a client with default limits for the given base URL.
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_upload_bytes: file_type::DEFAULT_MAX_UPLOAD_BYTES,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("docproc/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_upload_bytes: config.max_upload_bytes,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Upload a document or image for processing.
    ///
    /// The file is checked locally first; nothing is sent if it is missing,
    /// empty, too large, or of an unsupported type.
    pub async fn upload_document(
        &self,
        path: &Path,
        progress_bar_id: Option<&str>,
    ) -> Result<UploadReceipt, ClientError> {
        let file = file_type::validate_document(Some(path), self.max_upload_bytes)?;
        let kind = file.kind();
        let url = self.url("/api/documents/upload");

        let mut form = Form::new()
            .part("file", file_part(&file).await?)
            .text("file_type", file.file_type_field());
        if let Some(id) = progress_bar_id.filter(|id| !id.is_empty()) {
            form = form.text("progress_bar_id", id.to_string());
        }

        info!(url = %url, file = %file.file_name, file_type = %file.file_type_field(), "uploading document");
        let resp = self.client.post(&url).multipart(form).send().await?;
        let default = format!("{} upload failed", kind.label());
        let receipt: UploadReceipt = read_json(resp, &default).await?;
        info!(id = %receipt.id, status = %receipt.status, "document accepted");
        Ok(receipt)
    }

    /// Fetch a document job's current state.
    pub async fn document(&self, id: &str) -> Result<DocumentJob, ClientError> {
        let url = self.url(&format!("/api/documents/{id}"));
        debug!(url = %url, "fetching document status");
        let resp = self.client.get(&url).send().await?;
        read_json(resp, "could not fetch processing status").await
    }

    /// Ask the backend to build a download for a processed document.
    pub async fn export_document(&self, id: &str) -> Result<ExportLink, ClientError> {
        let url = self.url(&format!("/api/documents/{id}/export"));
        self.export(&url).await
    }

    /// Submit free text for item extraction.
    pub async fn send_chat_message(&self, text: &str) -> Result<ChatMessageJob, ClientError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(InputError::EmptyMessage.into());
        }
        let url = self.url("/api/chat/message");
        info!(url = %url, chars = text.chars().count(), "sending chat message");
        let resp = self
            .client
            .post(&url)
            .json(&ChatMessageRequest { text })
            .send()
            .await?;
        let job: ChatMessageJob = read_json(resp, "message processing failed").await?;
        info!(id = %job.id, items = job.items.len(), "chat message processed");
        Ok(job)
    }

    pub async fn get_chat_message(&self, id: &str) -> Result<ChatMessageJob, ClientError> {
        let url = self.url(&format!("/api/chat/messages/{id}"));
        let resp = self.client.get(&url).send().await?;
        read_json(resp, "could not fetch chat message").await
    }

    pub async fn export_chat_message(&self, id: &str) -> Result<ExportLink, ClientError> {
        let url = self.url(&format!("/api/chat/messages/{id}/export"));
        self.export(&url).await
    }

    async fn export(&self, url: &str) -> Result<ExportLink, ClientError> {
        info!(url = %url, "requesting export");
        let resp = self.client.post(url).send().await?;
        let status = resp.status().as_u16();
        let link: ExportLink = read_json(resp, "export failed").await?;
        if link.download_url.trim().is_empty() {
            return Err(ClientError::Request {
                status,
                message: "export failed: response has no download_url".into(),
            });
        }
        info!(download_url = %link.download_url, "export ready");
        Ok(link)
    }

    /// Upload a price list for ingestion into the reference store.
    pub async fn upload_price_list(
        &self,
        path: &Path,
        options: &PriceListOptions,
    ) -> Result<PriceListReceipt, ClientError> {
        let file = file_type::validate_price_list(Some(path), self.max_upload_bytes)?;
        let url = self.url("/api/price-lists/upload");

        let mut form = Form::new().part("file", file_part(&file).await?);
        if let Some(supplier) = options.supplier() {
            form = form.text("supplier_id", supplier.to_string());
        }
        form = form
            .text("replace_existing", options.replace_existing.to_string())
            .text("clear_by_supplier", options.clear_by_supplier.to_string());

        info!(
            url = %url,
            file = %file.file_name,
            supplier = options.supplier().unwrap_or("-"),
            replace_existing = options.replace_existing,
            clear_by_supplier = options.clear_by_supplier,
            "uploading price list"
        );
        let resp = self.client.post(&url).multipart(form).send().await?;
        let receipt: PriceListReceipt = read_json(resp, "price list upload failed").await?;
        info!(id = %receipt.id, status = %receipt.status, "price list accepted");
        Ok(receipt)
    }

    pub async fn price_list_status(&self, id: &str) -> Result<PriceListStatus, ClientError> {
        let url = self.url(&format!("/api/price-lists/{id}/status"));
        debug!(url = %url, "fetching price list status");
        let resp = self.client.get(&url).send().await?;
        read_json(resp, "could not fetch price list status").await
    }

    /// Similarity search over ingested price-list items.
    pub async fn search_price_list(
        &self,
        query: &PriceListSearchQuery,
    ) -> Result<Vec<PriceListHit>, ClientError> {
        if query.query.trim().is_empty() {
            return Err(InputError::EmptyQuery.into());
        }
        let url = self.url("/api/price-list/search");
        info!(url = %url, query = %query.query, limit = query.limit, "searching price list");
        let resp = self.client.post(&url).json(query).send().await?;
        let hits: Vec<PriceListHit> = read_json(resp, "price list search failed").await?;
        info!(count = hits.len(), "search complete");
        Ok(hits)
    }

    /// Absolute form of a download URL the backend returned (usually `/api/exports/<name>`).
    ///
    /// Resolved against the base URL the way a browser follows a link.
    pub fn resolve_url(&self, url: &str) -> Result<Url, ClientError> {
        let base = Url::parse(&format!("{}/", self.base_url))
            .map_err(|e| ClientError::InvalidUrl(format!("base url {:?}: {e}", self.base_url)))?;
        base.join(url.trim())
            .map_err(|e| ClientError::InvalidUrl(format!("download url {url:?}: {e}")))
    }

    /// Stream an exported artifact into `dest_dir`, returning the written path.
    pub async fn download(&self, link: &ExportLink, dest_dir: &Path) -> Result<PathBuf, ClientError> {
        let url = self.resolve_url(&link.download_url)?;
        let file_name = download_file_name(link);
        let dest = dest_dir.join(&file_name);

        info!(url = %url, dest = %dest.display(), "downloading export");
        let resp = self.client.get(url).send().await?;
        let resp = check_status(resp, "download failed").await?;

        tokio::fs::create_dir_all(dest_dir).await?;
        let mut out = tokio::fs::File::create(&dest).await?;
        let mut stream = resp.bytes_stream();
        let mut written = 0u64;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            out.write_all(&chunk).await?;
        }
        out.flush().await?;

        info!(bytes = written, dest = %dest.display(), "download complete");
        Ok(dest)
    }
}

async fn file_part(file: &UploadFile) -> Result<Part, ClientError> {
    let bytes = tokio::fs::read(&file.path).await?;
    Ok(Part::bytes(bytes).file_name(file.file_name.clone()))
}

/// File name for a downloaded export: the backend's `export_filename`, else
/// the last segment of the URL path.
fn download_file_name(link: &ExportLink) -> String {
    let candidate = link
        .export_filename
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| {
            let path = link.download_url.split(['?', '#']).next().unwrap_or_default();
            path.rsplit('/').next().unwrap_or_default().to_string()
        });
    let name = candidate.rsplit(['/', '\\']).next().unwrap_or_default();
    if name.is_empty() || name == "." || name == ".." {
        "export.xlsx".to_string()
    } else {
        name.to_string()
    }
}

/// Return the response if it is 2xx, otherwise a [`ClientError::Request`] with the backend's detail.
async fn check_status(
    resp: reqwest::Response,
    default_message: &str,
) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = detail_message(&body).unwrap_or_else(|| default_message.to_string());
    Err(ClientError::Request {
        status: status.as_u16(),
        message,
    })
}

async fn read_json<T: DeserializeOwned>(
    resp: reqwest::Response,
    default_message: &str,
) -> Result<T, ClientError> {
    let resp = check_status(resp, default_message).await?;
    let bytes = resp.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Extract a FastAPI-style `detail` from an error body.
///
/// `detail` is either a string or a list of validation errors carrying `msg`.
pub(crate) fn detail_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    match value.get("detail")? {
        serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        serde_json::Value::Array(errors) => {
            let msgs: Vec<&str> = errors
                .iter()
                .filter_map(|e| e.get("msg").and_then(|m| m.as_str()))
                .collect();
            if msgs.is_empty() {
                None
            } else {
                Some(msgs.join("; "))
            }
        }
        _ => None,
    }
}
