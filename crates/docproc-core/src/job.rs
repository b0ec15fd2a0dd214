//! Job payloads exchanged with the ingestion backend.

use serde::{Deserialize, Serialize};

/// Processing state of a server-side job.
///
/// Transitions are one-way: `Processing` may become `Completed` or `Error`,
/// and a terminal state never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Processing,
    Completed,
    Error,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        !matches!(self, JobStatus::Processing)
    }

    /// Move to `next`, refusing to leave a terminal state.
    ///
    /// Re-observing the same terminal state is allowed.
    pub fn advance(self, next: JobStatus) -> Result<JobStatus, StatusRegression> {
        if self.is_terminal() && next != self {
            return Err(StatusRegression {
                from: self,
                to: next,
            });
        }
        Ok(next)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn completed() -> JobStatus {
    JobStatus::Completed
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("job status cannot move from {from} to {to}")]
pub struct StatusRegression {
    pub from: JobStatus,
    pub to: JobStatus,
}

/// One extracted record. `text` holds a JSON-encoded object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub text: String,
    /// Set when the backend correlated the record with its reference store.
    #[serde(default)]
    pub matched: bool,
}

impl Item {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            matched: false,
        }
    }
}

/// Response to `POST /api/documents/upload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub id: String,
    pub original_filename: String,
    #[serde(default = "completed")]
    pub status: JobStatus,
}

/// Document (or image) job as returned by `GET /api/documents/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentJob {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub original_filename: String,
    pub status: JobStatus,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Chat message results from `POST /api/chat/message`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessageJob {
    pub id: String,
    #[serde(default)]
    pub items: Vec<Item>,
    #[serde(default)]
    pub original_filename: Option<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
}

/// Body of `POST /api/chat/message`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatMessageRequest<'a> {
    pub text: &'a str,
}

/// Response to either export endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportLink {
    #[serde(default)]
    pub download_url: String,
    #[serde(default)]
    pub export_filename: Option<String>,
}
