//! Price-list ingestion payloads.
//!
//! Price-list status carries progress counters that document status lacks;
//! the two are kept as separate contracts.

use serde::{Deserialize, Serialize};

use crate::JobStatus;

/// Form options sent alongside the price-list file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PriceListOptions {
    pub supplier_id: Option<String>,
    pub replace_existing: bool,
    pub clear_by_supplier: bool,
}

impl PriceListOptions {
    /// Supplier id trimmed, or `None` when blank.
    pub fn supplier(&self) -> Option<&str> {
        self.supplier_id
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Aggregate statistics of an ingested price list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceListSummary {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub total_items: Option<u64>,
    #[serde(default)]
    pub categories_count: Option<u64>,
    #[serde(default)]
    pub supplier_id: Option<String>,
}

impl PriceListSummary {
    /// Human-readable confirmation of a finished upload.
    pub fn message(&self) -> String {
        let filename = self.filename.as_deref().unwrap_or("-");
        let mut msg = format!(
            "Прайс-лист \"{filename}\" успешно загружен. Добавлено {} товаров из {} категорий",
            self.total_items.unwrap_or(0),
            self.categories_count.unwrap_or(0),
        );
        if let Some(supplier) = self.supplier_id.as_deref().filter(|s| !s.is_empty()) {
            msg.push_str(&format!(" поставщика {supplier}"));
        }
        msg.push_str(&format!(
            ". Дата прайс-листа: {}, валюта: {}.",
            self.date.as_deref().unwrap_or("-"),
            self.currency.as_deref().unwrap_or("-"),
        ));
        msg
    }
}

/// Response to `POST /api/price-lists/upload`.
///
/// When processing finished synchronously the summary fields are filled in
/// directly and `status` is already terminal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceListReceipt {
    pub id: String,
    pub status: JobStatus,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(flatten)]
    pub summary: PriceListSummary,
}

impl PriceListReceipt {
    /// Summary built from the receipt itself, for uploads that did not need polling.
    pub fn inline_summary(&self) -> PriceListSummary {
        let mut summary = self.summary.clone();
        if summary.id.is_none() {
            summary.id = Some(self.id.clone());
        }
        summary
    }

    pub fn total_items(&self) -> Option<u64> {
        self.summary.total_items
    }
}

/// Response to `GET /api/price-lists/{id}/status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceListStatus {
    pub status: JobStatus,
    #[serde(default)]
    pub percent_complete: f64,
    #[serde(default)]
    pub processed_items: u64,
    #[serde(default)]
    pub total_items: u64,
    #[serde(default)]
    pub current_stage: Option<String>,
    #[serde(default)]
    pub result: Option<PriceListSummary>,
    #[serde(default)]
    pub error: Option<String>,
}

impl PriceListStatus {
    /// One-line progress description, e.g. `Обработано 40 из 100 товаров (Чтение прайс-листа)`.
    pub fn progress_line(&self) -> String {
        let mut line = if self.processed_items > 0 && self.total_items > 0 {
            format!(
                "Обработано {} из {} товаров",
                self.processed_items, self.total_items
            )
        } else {
            format!("{:.0}%", self.percent_complete.clamp(0.0, 100.0))
        };
        if let Some(stage) = self.current_stage.as_deref().filter(|s| !s.is_empty()) {
            line.push_str(&format!(" ({stage})"));
        }
        line
    }
}

/// Body of `POST /api/price-list/search`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceListSearchQuery {
    pub query: String,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub supplier_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl PriceListSearchQuery {
    pub const DEFAULT_LIMIT: u32 = 10;

    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            limit: Self::DEFAULT_LIMIT,
            supplier_id: None,
            min_price: None,
            max_price: None,
            category: None,
        }
    }
}

/// One similarity-search match from the price-list store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceListHit {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub article: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub subcategory: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub price_list_date: Option<String>,
}
