//! End-to-end flows against a mocked ingestion backend.
//!
//! Uses wiremock to stand in for the document/chat/price-list API.

use std::path::PathBuf;
use std::time::Duration;

use docproc_client::{
    ApiClient, CancellationToken, ClientError, ExportTarget, PollPolicy, Reporter, Silent,
    Workflow,
};
use docproc_core::{
    DocumentJob, FieldLayout, InputError, PriceListOptions, PriceListSearchQuery,
    PriceListStatus, PriceListSummary, ResultTable, Session, TableRow, UploadReceipt,
};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Default)]
struct Recorder {
    uploads: Vec<String>,
    document_progress: usize,
    price_list_progress: Vec<String>,
    results: Vec<(String, ResultTable)>,
    price_lists: Vec<PriceListSummary>,
}

impl Reporter for Recorder {
    fn on_upload(&mut self, receipt: &UploadReceipt) {
        self.uploads.push(receipt.id.clone());
    }

    fn on_document_progress(&mut self, _job: &DocumentJob) {
        self.document_progress += 1;
    }

    fn on_price_list_progress(&mut self, status: &PriceListStatus) {
        self.price_list_progress.push(status.progress_line());
    }

    fn on_results(&mut self, heading: &str, table: &ResultTable) {
        self.results.push((heading.to_string(), table.clone()));
    }

    fn on_price_list(&mut self, summary: &PriceListSummary) {
        self.price_lists.push(summary.clone());
    }
}

fn quick_policy() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(10),
        max_retries: 3,
        backoff_base: Duration::from_millis(5),
        backoff_max: Duration::from_millis(20),
        max_polls: Some(50),
    }
}

fn fixture(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("failed to write fixture");
    path
}

fn processing() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({"id": "doc-1", "status": "processing"}))
}

async fn mount_upload(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/documents/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "doc-1",
            "original_filename": "invoice.pdf",
            "status": "processing"
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn document_flow_renders_once_after_completion() {
    let server = MockServer::start().await;
    mount_upload(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/documents/doc-1"))
        .respond_with(processing())
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/documents/doc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "doc-1",
            "original_filename": "invoice.pdf",
            "status": "completed",
            "items": [
                {"text": "{\"Наименование\":\"Bolt\",\"Количество\":5,\"Ед.изм.\":\"pcs\"}", "matched": true},
                {"text": "garbage"},
                {"text": "{\"Наименование\":\"Nut\",\"Кол-во\":10,\"Ед. изм.\":\"шт\",\"Цена\":3}"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "invoice.pdf", "%PDF-1.4 fake");

    let client = ApiClient::new(server.uri());
    let flow = Workflow::new(&client, CancellationToken::new()).with_document_policy(quick_policy());
    let mut session = Session::new();
    let mut recorder = Recorder::default();

    let outcome = flow
        .process_document(&mut session, &file, None, FieldLayout::Document, &mut recorder)
        .await
        .expect("document flow failed");

    assert_eq!(recorder.uploads, vec!["doc-1"]);
    assert_eq!(recorder.document_progress, 2);
    assert_eq!(recorder.results.len(), 1, "exactly one render");

    let (heading, table) = &recorder.results[0];
    assert_eq!(heading, "invoice.pdf");
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.skipped, 1);
    assert_eq!(table.rows[0].cells(), ["Bolt", "5", "pcs"]);
    assert!(table.rows[0].matched);
    assert_eq!(table.rows[1].cells(), ["Nut", "10", "шт"]);
    assert_eq!(table.rows[1].price.as_deref(), Some("3 RUB"));

    assert_eq!(outcome.job.items.len(), 3);
    assert_eq!(session.require_document().unwrap().id, "doc-1");
}

#[tokio::test]
async fn document_error_status_is_surfaced_without_render() {
    let server = MockServer::start().await;
    mount_upload(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/documents/doc-1"))
        .respond_with(processing())
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/documents/doc-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "error",
            "error": "Не удалось распознать документ"
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "invoice.pdf", "%PDF-1.4 fake");

    let client = ApiClient::new(server.uri());
    let flow = Workflow::new(&client, CancellationToken::new()).with_document_policy(quick_policy());
    let mut session = Session::new();
    let mut recorder = Recorder::default();

    let err = flow
        .process_document(&mut session, &file, None, FieldLayout::Document, &mut recorder)
        .await
        .unwrap_err();

    match err {
        ClientError::Poll(msg) => assert_eq!(msg, "Не удалось распознать документ"),
        other => panic!("expected Poll error, got {other:?}"),
    }
    assert!(recorder.results.is_empty(), "no render on error");
    assert_eq!(recorder.document_progress, 1);
}

#[tokio::test]
async fn transient_status_failures_are_retried() {
    let server = MockServer::start().await;
    mount_upload(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/documents/doc-1"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/documents/doc-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"status": "completed", "items": []})),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "invoice.pdf", "%PDF-1.4 fake");

    let client = ApiClient::new(server.uri());
    let flow = Workflow::new(&client, CancellationToken::new()).with_document_policy(quick_policy());
    let mut session = Session::new();
    let mut recorder = Recorder::default();

    let outcome = flow
        .process_document(&mut session, &file, None, FieldLayout::Legacy, &mut recorder)
        .await
        .expect("flow should survive transient failures");

    assert_eq!(outcome.job.id, "doc-1");
    assert_eq!(outcome.job.original_filename, "invoice.pdf");
    assert_eq!(outcome.table.display_rows(), vec![TableRow::Placeholder]);
    assert_eq!(recorder.results.len(), 1);
}

#[tokio::test]
async fn persistent_status_failures_exhaust_retries() {
    let server = MockServer::start().await;
    mount_upload(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/documents/doc-1"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"detail": "db down"})))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "invoice.pdf", "%PDF-1.4 fake");

    let client = ApiClient::new(server.uri());
    let flow = Workflow::new(&client, CancellationToken::new()).with_document_policy(quick_policy());

    let err = flow
        .process_document(&mut Session::new(), &file, None, FieldLayout::Document, &mut Silent)
        .await
        .unwrap_err();

    match err {
        ClientError::RetriesExhausted { attempts, last } => {
            assert_eq!(attempts, 4);
            assert!(last.to_string().contains("db down"));
        }
        other => panic!("expected RetriesExhausted, got {other:?}"),
    }
}

#[tokio::test]
async fn image_upload_sends_image_file_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/upload"))
        .and(body_string_contains("name=\"file_type\""))
        .and(body_string_contains("image"))
        .and(body_string_contains("name=\"progress_bar_id\""))
        .and(body_string_contains("filename=\"photo.PNG\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "img-1",
            "original_filename": "photo.PNG",
            "status": "processing"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "photo.PNG", "not really a png");

    let client = ApiClient::new(server.uri());
    let receipt = client
        .upload_document(&file, Some("pb-42"))
        .await
        .expect("upload failed");
    assert_eq!(receipt.id, "img-1");
    assert_eq!(receipt.original_filename, "photo.PNG");
}

#[tokio::test]
async fn upload_rejection_surfaces_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/upload"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "detail": "Неподдерживаемый формат документа. Разрешены: PDF, XLSX"
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "report.xlsx", "PK fake");

    let client = ApiClient::new(server.uri());
    match client.upload_document(&file, None).await {
        Err(ClientError::Request { status, message }) => {
            assert_eq!(status, 400);
            assert_eq!(message, "Неподдерживаемый формат документа. Разрешены: PDF, XLSX");
        }
        other => panic!("expected Request error, got {other:?}"),
    }
}

#[tokio::test]
async fn upload_rejection_without_detail_uses_default() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/upload"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "scan.jpg", "jpeg-ish");

    let client = ApiClient::new(server.uri());
    match client.upload_document(&file, None).await {
        Err(ClientError::Request { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "image upload failed");
        }
        other => panic!("expected Request error, got {other:?}"),
    }
}

#[tokio::test]
async fn oversized_upload_never_reaches_server() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "big.pdf", &"x".repeat(2048));

    let config = docproc_client::ClientConfig {
        base_url: server.uri(),
        max_upload_bytes: 1024,
        ..Default::default()
    };
    let client = ApiClient::from_config(&config).unwrap();
    let err = client.upload_document(&file, None).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Input(InputError::FileTooLarge { size: 2048, limit: 1024, .. })
    ));
}

#[tokio::test]
async fn chat_flow_then_export_downloads_artifact() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/message"))
        .and(body_json(json!({"text": "болт м8 10 шт"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg-9",
            "original_filename": "chat",
            "status": "completed",
            "items": [
                {"text": "{\"Наименование\":\"Болт М8\",\"Кол-во\":10,\"Ед. изм.\":\"шт\"}"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat/messages/msg-9/export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "export_filename": "chat_msg-9.xlsx",
            "download_url": "/api/exports/chat_msg-9.xlsx"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/exports/chat_msg-9.xlsx"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"PK\x03\x04xlsx".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let flow = Workflow::new(&client, CancellationToken::new());
    let mut session = Session::new();
    let mut recorder = Recorder::default();

    let outcome = flow
        .process_chat(&mut session, "  болт м8 10 шт ", &mut recorder)
        .await
        .expect("chat flow failed");
    assert_eq!(outcome.table.rows[0].cells(), ["Болт М8", "10", "шт"]);
    assert_eq!(recorder.results.len(), 1);
    assert_eq!(recorder.results[0].0, "Чат");

    let out = TempDir::new().unwrap();
    let saved = flow
        .export(&session, ExportTarget::ChatMessage, None, out.path())
        .await
        .expect("export failed");
    assert_eq!(saved, out.path().join("chat_msg-9.xlsx"));
    assert_eq!(std::fs::read(&saved).unwrap(), b"PK\x03\x04xlsx");
}

#[tokio::test]
async fn document_export_without_download_url_fails() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/doc-3/export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"export_filename": "x.xlsx"})))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let err = client.export_document("doc-3").await.unwrap_err();
    match err {
        ClientError::Request { status, message } => {
            assert_eq!(status, 200);
            assert!(message.contains("download_url"));
        }
        other => panic!("expected Request error, got {other:?}"),
    }
}

#[tokio::test]
async fn document_export_error_surfaces_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/missing/export"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "detail": "Документ с ID missing не найден"
        })))
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let flow = Workflow::new(&client, CancellationToken::new());
    let out = TempDir::new().unwrap();
    let err = flow
        .export(&Session::new(), ExportTarget::Document, Some("missing"), out.path())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Request { status: 404, ref message } if message.contains("не найден")));
}

#[tokio::test]
async fn price_list_flow_reports_progress_and_summary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/price-lists/upload"))
        .and(body_string_contains("name=\"supplier_id\""))
        .and(body_string_contains("acme"))
        .and(body_string_contains("name=\"replace_existing\""))
        .and(body_string_contains("name=\"clear_by_supplier\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pl-1",
            "status": "processing"
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/price-lists/pl-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "processing",
            "percent_complete": 40,
            "processed_items": 2,
            "total_items": 5,
            "current_stage": "Индексация"
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/price-lists/pl-1/status"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "completed",
            "percent_complete": 100,
            "processed_items": 5,
            "total_items": 5,
            "result": {
                "date": "2025-03-01",
                "currency": "RUB",
                "total_items": 5,
                "categories_count": 2,
                "supplier_id": "acme"
            }
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "acme.csv", "article,name,price\nA1,Bolt,1.5\n");

    let client = ApiClient::new(server.uri());
    let flow =
        Workflow::new(&client, CancellationToken::new()).with_price_list_policy(quick_policy());
    let mut session = Session::new();
    let mut recorder = Recorder::default();
    let options = PriceListOptions {
        supplier_id: Some("acme".into()),
        replace_existing: true,
        clear_by_supplier: false,
    };

    let summary = flow
        .process_price_list(&mut session, &file, &options, &mut recorder)
        .await
        .expect("price list flow failed");

    assert_eq!(
        recorder.price_list_progress,
        vec!["Обработано 2 из 5 товаров (Индексация)"]
    );
    assert_eq!(summary.filename.as_deref(), Some("acme.csv"));
    assert_eq!(summary.total_items, Some(5));
    assert_eq!(recorder.price_lists.len(), 1);
    assert_eq!(session.require_price_list().unwrap().id, "pl-1");
}

#[tokio::test]
async fn price_list_completed_on_upload_skips_polling() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/price-lists/upload"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "pl-2",
            "filename": "prices.json",
            "date": "2025-01-01",
            "currency": "USD",
            "total_items": 7,
            "categories_count": 3,
            "status": "completed"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "prices.json", "{}");

    let client = ApiClient::new(server.uri());
    let flow = Workflow::new(&client, CancellationToken::new());
    let summary = flow
        .process_price_list(
            &mut Session::new(),
            &file,
            &PriceListOptions::default(),
            &mut Silent,
        )
        .await
        .unwrap();
    assert_eq!(summary.id.as_deref(), Some("pl-2"));
    assert_eq!(summary.total_items, Some(7));
    assert_eq!(summary.currency.as_deref(), Some("USD"));
}

#[tokio::test]
async fn price_list_search_returns_hits() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/price-list/search"))
        .and(body_json(json!({"query": "болт", "limit": 3})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {
                "id": "A1",
                "article": "A1",
                "name": "Болт М8",
                "price": 1.5,
                "unit": "шт",
                "category": "Крепёж",
                "subcategory": "Болты",
                "currency": "RUB",
                "price_list_date": "2025-03-01"
            }
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let mut query = PriceListSearchQuery::new("болт");
    query.limit = 3;
    let hits = client.search_price_list(&query).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Болт М8");
    assert_eq!(hits[0].price, Some(1.5));
}

#[tokio::test]
async fn cancellation_interrupts_document_polling() {
    let server = MockServer::start().await;
    mount_upload(&server).await;
    Mock::given(method("GET"))
        .and(path("/api/documents/doc-1"))
        .respond_with(processing())
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "invoice.pdf", "%PDF-1.4 fake");

    let client = ApiClient::new(server.uri());
    let cancel = CancellationToken::new();
    let policy = PollPolicy {
        max_polls: None,
        ..quick_policy()
    };
    let flow = Workflow::new(&client, cancel.clone()).with_document_policy(policy);

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let err = flow
        .process_document(&mut Session::new(), &file, None, FieldLayout::Document, &mut Silent)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));
}

#[tokio::test]
async fn stored_chat_message_renders_with_chat_layout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/chat/messages/msg-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg-2",
            "items": [
                {"text": "{\"Наименование\":\"Шайба\",\"Кол-во\":100,\"Количество\":1,\"Ед. изм.\":\"шт\",\"Ед.изм.\":\"уп\"}"},
                {"text": "[1,2,3]"}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let flow = Workflow::new(&client, CancellationToken::new());
    let outcome = flow.chat_message("msg-2").await.unwrap();
    assert_eq!(outcome.job.id, "msg-2");
    assert_eq!(outcome.table.rows.len(), 1);
    assert_eq!(outcome.table.skipped, 1);
    assert_eq!(outcome.table.rows[0].cells(), ["Шайба", "100", "шт"]);
}

#[tokio::test]
async fn cancellation_interrupts_slow_upload() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "doc-1", "original_filename": "invoice.pdf"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let file = fixture(&dir, "invoice.pdf", "%PDF-1.4 fake");

    let client = ApiClient::new(server.uri());
    let cancel = CancellationToken::new();
    let flow = Workflow::new(&client, cancel.clone()).with_document_policy(quick_policy());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let mut session = Session::new();
    let start = std::time::Instant::now();
    let err = flow
        .process_document(&mut session, &file, None, FieldLayout::Document, &mut Silent)
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));
    assert!(start.elapsed() < Duration::from_secs(2), "took {:?}", start.elapsed());
    assert!(session.document.is_none());
}

#[tokio::test]
async fn cancellation_interrupts_slow_export() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/documents/doc-5/export"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"download_url": "/api/exports/doc-5.xlsx"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let cancel = CancellationToken::new();
    let flow = Workflow::new(&client, cancel.clone());

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    let out = TempDir::new().unwrap();
    let start = std::time::Instant::now();
    let err = flow
        .export(&Session::new(), ExportTarget::Document, Some("doc-5"), out.path())
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Cancelled));
    assert!(start.elapsed() < Duration::from_secs(2), "took {:?}", start.elapsed());
}

#[tokio::test]
async fn protocol_relative_download_url_uses_base_scheme() {
    let server = MockServer::start().await;
    let authority = server.uri().trim_start_matches("http://").to_string();
    Mock::given(method("POST"))
        .and(path("/api/documents/doc-6/export"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "download_url": format!("//{authority}/api/exports/doc-6.xlsx")
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/exports/doc-6.xlsx"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"xlsx".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let client = ApiClient::new(server.uri());
    let flow = Workflow::new(&client, CancellationToken::new());
    let out = TempDir::new().unwrap();
    let saved = flow
        .export(&Session::new(), ExportTarget::Document, Some("doc-6"), out.path())
        .await
        .unwrap();
    assert_eq!(saved, out.path().join("doc-6.xlsx"));
}
