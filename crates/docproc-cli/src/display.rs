//! Terminal output for result tables, progress, and price-list summaries.
//!
//! Tables and summaries go to stdout; progress chatter goes to stderr so
//! piped output stays clean.

use docproc_client::Reporter;
use docproc_core::render::{HEADERS, PLACEHOLDER};
use docproc_core::{
    DocumentJob, PriceListHit, PriceListStatus, PriceListSummary, ResultTable, Session,
    TableRow, TrackedJob, UploadReceipt,
};

const NAME_WIDTH: usize = 40;
const QUANTITY_WIDTH: usize = 12;

/// [`Reporter`] that prints to the terminal.
#[derive(Default)]
pub struct TerminalReporter {
    polls: u32,
}

impl Reporter for TerminalReporter {
    fn on_upload(&mut self, receipt: &UploadReceipt) {
        self.polls = 0;
        eprintln!(
            "Файл \"{}\" загружен (id {}), идёт обработка...",
            receipt.original_filename, receipt.id
        );
    }

    fn on_document_progress(&mut self, _job: &DocumentJob) {
        self.polls += 1;
        eprintln!("  обработка... (проверка {})", self.polls);
    }

    fn on_price_list_progress(&mut self, status: &PriceListStatus) {
        eprintln!("  {}", status.progress_line());
    }

    fn on_results(&mut self, heading: &str, table: &ResultTable) {
        print!("{}", format_table(heading, table));
    }

    fn on_price_list(&mut self, summary: &PriceListSummary) {
        println!("{}", summary.message());
    }
}

/// Result table with header, one line per row, and an annotation line for
/// rows that carry a match badge, details, or price.
pub fn format_table(heading: &str, table: &ResultTable) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== {heading} ===\n"));
    out.push_str(&format!(
        "  {:<NAME_WIDTH$} {:<QUANTITY_WIDTH$} {}\n",
        HEADERS[0], HEADERS[1], HEADERS[2]
    ));

    for row in table.display_rows() {
        match row {
            TableRow::Placeholder => out.push_str(&format!("  {PLACEHOLDER}\n")),
            TableRow::Item(row) => {
                let marker = if row.matched { '*' } else { ' ' };
                out.push_str(&format!(
                    "{marker} {:<NAME_WIDTH$} {:<QUANTITY_WIDTH$} {}\n",
                    row.name, row.quantity, row.unit
                ));
                let notes: Vec<&str> = [&row.match_badge, &row.details, &row.price]
                    .into_iter()
                    .filter_map(|n| n.as_deref())
                    .collect();
                if !notes.is_empty() {
                    out.push_str(&format!("    {}\n", notes.join("   ")));
                }
            }
        }
    }

    out.push_str(&format!(
        "\n{} поз., с совпадением: {}",
        table.rows.len(),
        table.matched_count()
    ));
    if table.skipped > 0 {
        out.push_str(&format!(", не разобрано: {}", table.skipped));
    }
    out.push('\n');
    out
}

pub fn format_document_status(job: &DocumentJob) -> String {
    let mut out = String::new();
    out.push_str(&format!("  {:<26} {}\n", "id", job.id));
    if !job.original_filename.is_empty() {
        out.push_str(&format!("  {:<26} {}\n", "file", job.original_filename));
    }
    out.push_str(&format!("  {:<26} {}\n", "status", job.status));
    out.push_str(&format!("  {:<26} {}\n", "items", job.items.len()));
    if let Some(error) = job.error.as_deref() {
        out.push_str(&format!("  {:<26} {}\n", "error", error));
    }
    out
}

pub fn format_price_list_status(id: &str, status: &PriceListStatus) -> String {
    let mut out = String::new();
    out.push_str(&format!("  {:<26} {}\n", "id", id));
    out.push_str(&format!("  {:<26} {}\n", "status", status.status));
    out.push_str(&format!("  {:<26} {}\n", "progress", status.progress_line()));
    if let Some(error) = status.error.as_deref() {
        out.push_str(&format!("  {:<26} {}\n", "error", error));
    }
    out
}

pub fn format_hits(hits: &[PriceListHit]) -> String {
    if hits.is_empty() {
        return format!("  {PLACEHOLDER}\n");
    }
    let mut out = String::new();
    for hit in hits {
        let price = match (hit.price, hit.currency.as_deref()) {
            (Some(p), Some(c)) => format!("{p} {c}"),
            (Some(p), None) => p.to_string(),
            (None, _) => "-".to_string(),
        };
        out.push_str(&format!(
            "  {:<NAME_WIDTH$} {:>14} / {}\n",
            hit.name,
            price,
            hit.unit.as_deref().unwrap_or("-")
        ));

        let mut details = Vec::new();
        if let Some(article) = hit.article.as_deref() {
            details.push(format!("Артикул: {article}"));
        }
        match (hit.category.as_deref(), hit.subcategory.as_deref()) {
            (Some(c), Some(s)) => details.push(format!("{c} > {s}")),
            (Some(c), None) => details.push(c.to_string()),
            _ => {}
        }
        if let Some(date) = hit.price_list_date.as_deref() {
            details.push(format!("от {date}"));
        }
        if !details.is_empty() {
            out.push_str(&format!("    {}\n", details.join(" | ")));
        }
    }
    out
}

pub fn format_session(session: &Session) -> String {
    let mut out = String::new();
    for (label, job) in [
        ("document", &session.document),
        ("chat message", &session.chat_message),
        ("price list", &session.price_list),
    ] {
        out.push_str(&format!("  {:<26} {}\n", label, tracked(job.as_ref())));
    }
    out
}

fn tracked(job: Option<&TrackedJob>) -> String {
    let Some(job) = job else {
        return "-".to_string();
    };
    let when = job.tracked_at.format("%Y-%m-%d %H:%M:%S UTC");
    match job.filename.as_deref() {
        Some(name) => format!("{} ({name}, {when})", job.id),
        None => format!("{} ({when})", job.id),
    }
}
