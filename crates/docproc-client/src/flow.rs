//! End-to-end user flows: upload → poll → render, chat, price-list ingestion, export.
//!
//! Each flow takes the [`Session`] explicitly and records the id it produced,
//! so a later export knows what to ask for.

use std::future::Future;
use std::path::{Path, PathBuf};

use docproc_core::{
    ChatMessageJob, DocumentJob, FieldLayout, JobStatus, PriceListOptions, PriceListStatus,
    PriceListSummary, ResultTable, Session, UploadReceipt, render_items,
};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::poll::{PollPolicy, poll_until};
use crate::{ApiClient, ClientError};

/// Receives flow events as they happen. Every method defaults to a no-op.
pub trait Reporter {
    fn on_upload(&mut self, _receipt: &UploadReceipt) {}

    fn on_document_progress(&mut self, _job: &DocumentJob) {}

    fn on_price_list_progress(&mut self, _status: &PriceListStatus) {}

    /// Called once per flow, after the job completed.
    fn on_results(&mut self, _heading: &str, _table: &ResultTable) {}

    fn on_price_list(&mut self, _summary: &PriceListSummary) {}
}

/// Discards every event.
pub struct Silent;

impl Reporter for Silent {}

#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub job: DocumentJob,
    pub table: ResultTable,
}

#[derive(Debug, Clone)]
pub struct ChatOutcome {
    pub job: ChatMessageJob,
    pub table: ResultTable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportTarget {
    Document,
    ChatMessage,
}

pub struct Workflow<'a> {
    client: &'a ApiClient,
    cancel: CancellationToken,
    document_policy: PollPolicy,
    price_list_policy: PollPolicy,
}

impl<'a> Workflow<'a> {
    pub fn new(client: &'a ApiClient, cancel: CancellationToken) -> Self {
        Self {
            client,
            cancel,
            document_policy: PollPolicy::documents(),
            price_list_policy: PollPolicy::price_lists(),
        }
    }

    pub fn with_document_policy(mut self, policy: PollPolicy) -> Self {
        self.document_policy = policy;
        self
    }

    pub fn with_price_list_policy(mut self, policy: PollPolicy) -> Self {
        self.price_list_policy = policy;
        self
    }

    /// Upload a document or image, wait for processing, and render its items.
    pub async fn process_document(
        &self,
        session: &mut Session,
        path: &Path,
        progress_bar_id: Option<&str>,
        layout: FieldLayout,
        reporter: &mut impl Reporter,
    ) -> Result<DocumentOutcome, ClientError> {
        session.clear_document();
        let receipt = self
            .cancellable(self.client.upload_document(path, progress_bar_id))
            .await?;
        session.track_document(&receipt.id, &receipt.original_filename);
        reporter.on_upload(&receipt);

        let id = receipt.id.clone();
        let mut job = poll_until(
            &self.document_policy,
            &self.cancel,
            || self.client.document(&id),
            |job: &DocumentJob| reporter.on_document_progress(job),
        )
        .await?;

        if job.id.is_empty() {
            job.id = receipt.id.clone();
        }
        if job.original_filename.is_empty() {
            job.original_filename = receipt.original_filename.clone();
        }

        let table = render_items(&job.items, layout);
        info!(
            id = %job.id,
            items = job.items.len(),
            rendered = table.rows.len(),
            skipped = table.skipped,
            "document processed"
        );
        reporter.on_results(&job.original_filename, &table);
        Ok(DocumentOutcome { job, table })
    }

    /// Fetch a document's state once, rendering it if already completed.
    pub async fn document_status(
        &self,
        id: &str,
        layout: FieldLayout,
    ) -> Result<(DocumentJob, Option<ResultTable>), ClientError> {
        let job = self.cancellable(self.client.document(id)).await?;
        let table = match job.status {
            JobStatus::Completed => Some(render_items(&job.items, layout)),
            _ => None,
        };
        Ok((job, table))
    }

    /// Re-fetch a stored chat message and render its items.
    pub async fn chat_message(&self, id: &str) -> Result<ChatOutcome, ClientError> {
        let job = self.cancellable(self.client.get_chat_message(id)).await?;
        let table = render_items(&job.items, FieldLayout::Chat);
        Ok(ChatOutcome { job, table })
    }

    /// Send a chat message and render the extracted items.
    pub async fn process_chat(
        &self,
        session: &mut Session,
        text: &str,
        reporter: &mut impl Reporter,
    ) -> Result<ChatOutcome, ClientError> {
        let job = self.cancellable(self.client.send_chat_message(text)).await?;
        session.track_chat_message(&job.id);

        let table = render_items(&job.items, FieldLayout::Chat);
        info!(
            id = %job.id,
            rendered = table.rows.len(),
            skipped = table.skipped,
            "chat message processed"
        );
        reporter.on_results("Чат", &table);
        Ok(ChatOutcome { job, table })
    }

    /// Upload a price list and wait until ingestion finishes.
    pub async fn process_price_list(
        &self,
        session: &mut Session,
        path: &Path,
        options: &PriceListOptions,
        reporter: &mut impl Reporter,
    ) -> Result<PriceListSummary, ClientError> {
        let receipt = self
            .cancellable(self.client.upload_price_list(path, options))
            .await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        session.track_price_list(&receipt.id, &file_name);

        let mut summary = match receipt.status {
            JobStatus::Completed => receipt.inline_summary(),
            JobStatus::Error => {
                return Err(ClientError::Poll(
                    receipt
                        .error
                        .clone()
                        .unwrap_or_else(|| "price list processing failed".to_string()),
                ));
            }
            JobStatus::Processing => {
                let id = receipt.id.clone();
                let status = poll_until(
                    &self.price_list_policy,
                    &self.cancel,
                    || self.client.price_list_status(&id),
                    |status: &PriceListStatus| reporter.on_price_list_progress(status),
                )
                .await?;
                status.result.clone().unwrap_or_else(|| PriceListSummary {
                    id: Some(receipt.id.clone()),
                    filename: None,
                    date: None,
                    currency: None,
                    total_items: Some(status.total_items),
                    categories_count: None,
                    supplier_id: options.supplier().map(str::to_string),
                })
            }
        };

        if summary.filename.is_none() {
            summary.filename = Some(file_name);
        }
        info!(
            id = %receipt.id,
            total_items = summary.total_items.unwrap_or(0),
            "price list ingested"
        );
        reporter.on_price_list(&summary);
        Ok(summary)
    }

    /// Export the tracked document or chat message and download the artifact.
    ///
    /// `id` overrides the session; with neither, this fails before any request.
    pub async fn export(
        &self,
        session: &Session,
        target: ExportTarget,
        id: Option<&str>,
        dest_dir: &Path,
    ) -> Result<PathBuf, ClientError> {
        let id = match (id, target) {
            (Some(id), _) => id.to_string(),
            (None, ExportTarget::Document) => session.require_document()?.id.clone(),
            (None, ExportTarget::ChatMessage) => session.require_chat_message()?.id.clone(),
        };

        let link = match target {
            ExportTarget::Document => self.cancellable(self.client.export_document(&id)).await?,
            ExportTarget::ChatMessage => {
                self.cancellable(self.client.export_chat_message(&id)).await?
            }
        };
        self.cancellable(self.client.download(&link, dest_dir)).await
    }

    /// Race a request against the cancellation token.
    async fn cancellable<T>(
        &self,
        request: impl Future<Output = Result<T, ClientError>>,
    ) -> Result<T, ClientError> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(ClientError::Cancelled),
            r = request => r,
        }
    }
}
