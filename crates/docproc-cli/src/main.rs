mod display;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use docproc_client::{
    ApiClient, CancellationToken, ClientConfig, ExportTarget, PollPolicy, Workflow,
};
use docproc_core::file_type::DEFAULT_MAX_UPLOAD_BYTES;
use docproc_core::{FieldLayout, JobStatus, PriceListOptions, PriceListSearchQuery, Session};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::display::TerminalReporter;

#[derive(Parser)]
#[command(
    name = "docproc",
    version,
    about = "Upload documents and price lists to the docproc backend and fetch the results"
)]
struct Cli {
    /// Backend base URL
    #[arg(long, env = "DOCPROC_BASE_URL", default_value = "http://127.0.0.1:8000", global = true)]
    base_url: String,

    /// Where the current document / chat message / price list ids are kept
    #[arg(long, env = "DOCPROC_SESSION_FILE", default_value = ".docproc-session.json", global = true)]
    session_file: PathBuf,

    /// Per-request timeout
    #[arg(long, env = "DOCPROC_TIMEOUT_SECS", default_value_t = 60, global = true)]
    timeout_secs: u64,

    /// Consecutive failed status requests tolerated while polling
    #[arg(long, env = "DOCPROC_MAX_RETRIES", default_value_t = 5, global = true)]
    max_retries: u32,

    /// Largest file accepted for upload
    #[arg(long, env = "DOCPROC_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES, global = true)]
    max_upload_bytes: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a PDF, XLSX, or image and wait for the extracted items
    Upload {
        file: PathBuf,
        /// Progress bar id forwarded to the backend
        #[arg(long)]
        progress_id: Option<String>,
        /// Result layout: document, or legacy for the plain three-column view
        #[arg(long, default_value = "document", value_parser = parse_document_layout)]
        layout: FieldLayout,
    },
    /// Send free text for item extraction
    Chat {
        #[arg(required = true, num_args = 1..)]
        text: Vec<String>,
    },
    /// Show the state of a document (the current one by default)
    Status {
        id: Option<String>,
        /// Look up a chat message instead of a document
        #[arg(long)]
        chat: bool,
        /// Result layout for documents: document or legacy
        #[arg(long, default_value = "document", value_parser = parse_document_layout)]
        layout: FieldLayout,
    },
    /// Export results to a spreadsheet and download it
    Export {
        /// Export the current chat message instead of the current document
        #[arg(long)]
        chat: bool,
        /// Export this id instead of the one in the session
        #[arg(long)]
        id: Option<String>,
        /// Download directory
        #[arg(long, default_value = ".")]
        out: PathBuf,
    },
    /// Price-list ingestion and search
    #[command(subcommand)]
    PriceList(PriceListCommand),
    /// Show or reset the tracked ids
    Session {
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Subcommand)]
enum PriceListCommand {
    /// Upload a CSV, JSON, XLSX, or XLS price list and wait for ingestion
    Upload {
        file: PathBuf,
        #[arg(long)]
        supplier_id: Option<String>,
        #[arg(long)]
        replace_existing: bool,
        #[arg(long)]
        clear_by_supplier: bool,
    },
    /// Show ingestion progress (the current price list by default)
    Status { id: Option<String> },
    /// Similarity search over ingested price-list items
    Search {
        query: String,
        #[arg(long, default_value_t = PriceListSearchQuery::DEFAULT_LIMIT)]
        limit: u32,
        #[arg(long)]
        supplier_id: Option<String>,
        #[arg(long)]
        min_price: Option<f64>,
        #[arg(long)]
        max_price: Option<f64>,
        #[arg(long)]
        category: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,docproc_core=info,docproc_client=info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let config = ClientConfig {
        base_url: cli.base_url.clone(),
        timeout: Duration::from_secs(cli.timeout_secs),
        max_upload_bytes: cli.max_upload_bytes,
    };
    let client = ApiClient::from_config(&config).context("building HTTP client")?;

    let cancel = CancellationToken::new();
    let interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupted, cancelling");
            interrupt.cancel();
        }
    });

    let flow = Workflow::new(&client, cancel)
        .with_document_policy(PollPolicy::documents().with_max_retries(cli.max_retries))
        .with_price_list_policy(PollPolicy::price_lists().with_max_retries(cli.max_retries));

    let (mut session, reset) = open_session(&cli.command, &cli.session_file)?;
    let before = session.clone();

    info!(base_url = %client.base_url(), "docproc v{}", env!("CARGO_PKG_VERSION"));
    let result = run(cli.command, &flow, &client, &mut session).await;

    // Ids tracked before a failure are still worth keeping.
    if reset || session != before {
        session
            .save(&cli.session_file)
            .with_context(|| format!("saving session to {}", cli.session_file.display()))?;
    }
    result
}

/// Document results come in two layouts; the chat layout belongs to chat messages.
fn parse_document_layout(s: &str) -> Result<FieldLayout, String> {
    match s.parse::<FieldLayout>()? {
        FieldLayout::Chat => Err("expected document or legacy".to_string()),
        layout => Ok(layout),
    }
}

/// Load the session for `command`. `session --clear` starts empty without
/// reading the file, so it can replace one that no longer parses; the
/// returned flag asks for the file to be rewritten.
fn open_session(command: &Command, path: &Path) -> anyhow::Result<(Session, bool)> {
    if matches!(command, Command::Session { clear: true }) {
        return Ok((Session::new(), true));
    }
    let session = Session::load(path)
        .with_context(|| format!("loading session from {}", path.display()))?;
    Ok((session, false))
}

async fn run(
    command: Command,
    flow: &Workflow<'_>,
    client: &ApiClient,
    session: &mut Session,
) -> anyhow::Result<()> {
    let mut reporter = TerminalReporter::default();

    match command {
        Command::Upload {
            file,
            progress_id,
            layout,
        } => {
            flow.process_document(session, &file, progress_id.as_deref(), layout, &mut reporter)
                .await
                .with_context(|| format!("processing {}", file.display()))?;
        }
        Command::Chat { text } => {
            let text = text.join(" ");
            flow.process_chat(session, &text, &mut reporter)
                .await
                .context("processing chat message")?;
        }
        Command::Status { id, chat: true, .. } => {
            let id = match id {
                Some(id) => id,
                None => session.require_chat_message()?.id.clone(),
            };
            let outcome = flow
                .chat_message(&id)
                .await
                .with_context(|| format!("fetching chat message {id}"))?;
            print!("{}", display::format_table(&format!("Чат {id}"), &outcome.table));
        }
        Command::Status { id, layout, .. } => {
            let id = match id {
                Some(id) => id,
                None => session.require_document()?.id.clone(),
            };
            let (job, table) = flow
                .document_status(&id, layout)
                .await
                .with_context(|| format!("fetching document {id}"))?;
            print!("{}", display::format_document_status(&job));
            if let Some(table) = table {
                println!();
                print!("{}", display::format_table(&job.original_filename, &table));
            }
        }
        Command::Export { chat, id, out } => {
            let target = if chat {
                ExportTarget::ChatMessage
            } else {
                ExportTarget::Document
            };
            let saved = flow
                .export(session, target, id.as_deref(), &out)
                .await
                .context("exporting results")?;
            println!("Файл сохранён: {}", saved.display());
        }
        Command::PriceList(command) => run_price_list(command, flow, client, session).await?,
        Command::Session { clear } => {
            if clear {
                *session = Session::new();
            }
            print!("{}", display::format_session(session));
        }
    }
    Ok(())
}

async fn run_price_list(
    command: PriceListCommand,
    flow: &Workflow<'_>,
    client: &ApiClient,
    session: &mut Session,
) -> anyhow::Result<()> {
    match command {
        PriceListCommand::Upload {
            file,
            supplier_id,
            replace_existing,
            clear_by_supplier,
        } => {
            let options = PriceListOptions {
                supplier_id,
                replace_existing,
                clear_by_supplier,
            };
            flow.process_price_list(session, &file, &options, &mut TerminalReporter::default())
                .await
                .with_context(|| format!("ingesting price list {}", file.display()))?;
        }
        PriceListCommand::Status { id } => {
            let id = match id {
                Some(id) => id,
                None => session.require_price_list()?.id.clone(),
            };
            let status = client
                .price_list_status(&id)
                .await
                .with_context(|| format!("fetching price list {id}"))?;
            print!("{}", display::format_price_list_status(&id, &status));
            match status.status {
                JobStatus::Completed => {
                    if let Some(summary) = &status.result {
                        println!("{}", summary.message());
                    }
                }
                JobStatus::Error => bail!(
                    "price list {id} failed: {}",
                    status.error.as_deref().unwrap_or("no reason given")
                ),
                JobStatus::Processing => {}
            }
        }
        PriceListCommand::Search {
            query,
            limit,
            supplier_id,
            min_price,
            max_price,
            category,
        } => {
            let query = PriceListSearchQuery {
                limit,
                supplier_id,
                min_price,
                max_price,
                category,
                ..PriceListSearchQuery::new(query)
            };
            let hits = client
                .search_price_list(&query)
                .await
                .context("searching price list")?;
            print!("{}", display::format_hits(&hits));
        }
    }
    Ok(())
}
