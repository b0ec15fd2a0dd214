//! Projection of job items into result-table rows.
//!
//! Document uploads, chat messages, and the older document view all render
//! through [`render_items`]; they differ only in their [`FieldLayout`].

use tracing::warn;

use crate::Item;
use crate::record::{ItemRecord, fields};

/// Cell text for a missing value.
pub const MISSING: &str = "-";
/// Text of the single row shown when nothing rendered.
pub const PLACEHOLDER: &str = "Нет результатов";
/// Currency shown next to a price that carries none.
pub const DEFAULT_CURRENCY: &str = "RUB";

pub const HEADERS: [&str; 3] = ["Наименование", "Количество", "Ед. изм."];

/// Which field names a result context reads, and whether it shows annotations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldLayout {
    #[default]
    Document,
    Chat,
    Legacy,
}

impl FieldLayout {
    pub fn quantity_keys(self) -> &'static [&'static str] {
        match self {
            FieldLayout::Document | FieldLayout::Legacy => {
                &[fields::QUANTITY, fields::QUANTITY_ALT]
            }
            FieldLayout::Chat => &[fields::QUANTITY_ALT, fields::QUANTITY],
        }
    }

    pub fn unit_keys(self) -> &'static [&'static str] {
        match self {
            FieldLayout::Document | FieldLayout::Legacy => &[fields::UNIT, fields::UNIT_ALT],
            FieldLayout::Chat => &[fields::UNIT_ALT, fields::UNIT],
        }
    }

    /// Match badge, article/category details, and price.
    pub fn shows_annotations(self) -> bool {
        !matches!(self, FieldLayout::Legacy)
    }
}

impl std::str::FromStr for FieldLayout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "document" => Ok(FieldLayout::Document),
            "chat" => Ok(FieldLayout::Chat),
            "legacy" => Ok(FieldLayout::Legacy),
            other => Err(format!("unknown layout {other:?} (expected document, chat, or legacy)")),
        }
    }
}

/// One rendered item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultRow {
    pub name: String,
    pub quantity: String,
    pub unit: String,
    pub matched: bool,
    /// e.g. `"87%"`.
    pub match_badge: Option<String>,
    /// e.g. `"Артикул: A-1 | Крепёж > Болты"`.
    pub details: Option<String>,
    /// e.g. `"12.5 RUB"`.
    pub price: Option<String>,
}

impl ResultRow {
    pub fn cells(&self) -> [&str; 3] {
        [&self.name, &self.quantity, &self.unit]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableRow<'a> {
    Item(&'a ResultRow),
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultTable {
    pub layout: FieldLayout,
    pub rows: Vec<ResultRow>,
    /// Items whose text failed to decode.
    pub skipped: usize,
}

impl ResultTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows as displayed: the item rows, or the placeholder when there are none.
    pub fn display_rows(&self) -> Vec<TableRow<'_>> {
        if self.rows.is_empty() {
            vec![TableRow::Placeholder]
        } else {
            self.rows.iter().map(TableRow::Item).collect()
        }
    }

    pub fn matched_count(&self) -> usize {
        self.rows.iter().filter(|r| r.matched).count()
    }
}

/// Render every decodable item; undecodable ones are logged and skipped.
pub fn render_items(items: &[Item], layout: FieldLayout) -> ResultTable {
    let mut rows = Vec::with_capacity(items.len());
    let mut skipped = 0usize;

    for (index, item) in items.iter().enumerate() {
        match ItemRecord::parse(&item.text) {
            Ok(record) => rows.push(render_record(&record, item.matched, layout)),
            Err(e) => {
                warn!(index, text = %item.text, error = %e, "could not parse item");
                skipped += 1;
            }
        }
    }

    ResultTable {
        layout,
        rows,
        skipped,
    }
}

pub fn render_record(record: &ItemRecord, matched: bool, layout: FieldLayout) -> ResultRow {
    let name = record.text(fields::NAME).unwrap_or_else(|| MISSING.to_string());
    let quantity = record
        .first_text(layout.quantity_keys())
        .unwrap_or_else(|| MISSING.to_string());
    let unit = record
        .first_text(layout.unit_keys())
        .unwrap_or_else(|| MISSING.to_string());

    let (match_badge, details, price) = if layout.shows_annotations() {
        (
            record.text(fields::MATCH_PERCENT).map(|p| format!("{p}%")),
            details(record),
            record.text(fields::PRICE).map(|p| {
                let currency = record
                    .text(fields::CURRENCY)
                    .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());
                format!("{p} {currency}")
            }),
        )
    } else {
        (None, None, None)
    };

    ResultRow {
        name,
        quantity,
        unit,
        matched,
        match_badge,
        details,
        price,
    }
}

fn details(record: &ItemRecord) -> Option<String> {
    let mut parts = Vec::with_capacity(2);
    if let Some(article) = record.text(fields::ARTICLE) {
        parts.push(format!("Артикул: {article}"));
    }
    if let Some(category) = record.text(fields::CATEGORY) {
        match record.text(fields::SUBCATEGORY) {
            Some(sub) => parts.push(format!("{category} > {sub}")),
            None => parts.push(category),
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" | "))
    }
}
