// End-to-end tests for the scrape pipeline against a mock hub

use hubscrape_core::scrape::{EmptyRecordPolicy, ScrapeOptions, execute_scrape};
use hubscrape_core::table::OutputFormat;
use hubscrape_scanner::{FieldValue, HubClient, ScanError};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/html")
        .set_body_string(format!("<html><body>{}</body></html>", body))
}

fn props(json: &str) -> String {
    json.replace('"', "&quot;")
}

async fn mount_listing(server: &MockServer, page: u32, hrefs: &[&str]) {
    let cards: String = hrefs
        .iter()
        .map(|href| format!(r#"<a class="block p-2" href="{}">{}</a>"#, href, href))
        .collect();
    Mock::given(method("GET"))
        .and(path("/models"))
        .and(query_param("p", page.to_string()))
        .respond_with(html(&cards))
        .mount(server)
        .await;
}

async fn mount_detail(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(html(&body))
        .mount(server)
        .await;
}

/// Three models: one per markup generation plus one page without metadata.
async fn mock_hub() -> MockServer {
    let server = MockServer::start().await;
    mount_listing(&server, 0, &["/acme/bert-base", "/gpt2"]).await;
    mount_listing(&server, 1, &["/gone/model"]).await;
    mount_listing(&server, 2, &[]).await;

    mount_detail(
        &server,
        "/acme/bert-base",
        format!(
            r#"<div data-target="ModelHeaderActions" data-props="{}"></div>"#,
            props(
                r#"{"model":{"author":"acme","id":"acme/bert-base","likes":41,"tag_objs":[
                    {"type":"license","id":"mit"},
                    {"type":"pipeline_tag","id":"fill-mask","subType":"nlp"}]}}"#
            )
        ),
    )
    .await;

    mount_detail(
        &server,
        "/gpt2",
        format!(
            r#"<div data-target="LikeButton" data-props="{}"></div>
               <div data-target="ModelHeaderTags" data-props="{}"></div>"#,
            props(r#"{"repoId":"gpt2","likes":1200}"#),
            props(r#"{"tagObjs":[{"type":"language","id":"en"}]}"#)
        ),
    )
    .await;

    mount_detail(&server, "/gone/model", "<h1>404</h1>".to_string()).await;

    server
}

fn client_for(server: &MockServer) -> HubClient {
    HubClient::builder()
        .with_base_url(server.uri())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_scrape_keeps_empty_records_by_default() {
    let server = mock_hub().await;
    let options = ScrapeOptions {
        max_pages: 5,
        ..ScrapeOptions::default()
    };

    let (table, stats) = execute_scrape(client_for(&server), &options, None)
        .await
        .unwrap();

    assert_eq!(stats.urls_found, 3);
    assert_eq!(stats.records_kept, 3);
    assert_eq!(table.row_count(), 3);
    assert!(table.records()[2].is_empty());

    let first = &table.records()[0];
    assert_eq!(first.get("id"), Some(&FieldValue::from("acme/bert-base")));
    assert_eq!(first.get("subType"), Some(&FieldValue::from("nlp")));

    let second = &table.records()[1];
    assert_eq!(second.get("author"), Some(&FieldValue::Null));
    assert_eq!(second.get("model_name"), Some(&FieldValue::from("gpt2")));
}

#[tokio::test]
async fn test_scrape_can_skip_empty_records() {
    let server = mock_hub().await;
    let options = ScrapeOptions {
        max_pages: 5,
        empty_records: EmptyRecordPolicy::Skip,
        ..ScrapeOptions::default()
    };

    let (table, stats) = execute_scrape(client_for(&server), &options, None)
        .await
        .unwrap();

    assert_eq!(table.row_count(), 2);
    assert_eq!(stats.records_skipped, 1);
    assert!(table.records().iter().all(|r| !r.is_empty()));
}

#[tokio::test]
async fn test_scrape_respects_page_limit() {
    let server = mock_hub().await;
    let options = ScrapeOptions::default();

    let (table, stats) = execute_scrape(client_for(&server), &options, None)
        .await
        .unwrap();

    // Only page 0 is read with the default limit.
    assert_eq!(stats.urls_found, 2);
    assert_eq!(table.row_count(), 2);
}

#[tokio::test]
async fn test_scrape_reports_progress() {
    let server = mock_hub().await;
    let messages: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let messages_clone = messages.clone();
    let options = ScrapeOptions {
        max_pages: 5,
        delay: Duration::from_millis(1),
        ..ScrapeOptions::default()
    };

    execute_scrape(
        client_for(&server),
        &options,
        Some(Arc::new(move |msg: String| {
            messages_clone.lock().unwrap().push(msg);
        })),
    )
    .await
    .unwrap();

    let messages = messages.lock().unwrap();
    assert_eq!(messages[0], "Found 3 model urls");
    assert_eq!(messages.len(), 4);
    assert!(messages[3].starts_with("Scraped 3/3"));
}

#[tokio::test]
async fn test_scrape_continues_past_deleted_model() {
    let server = MockServer::start().await;
    mount_listing(&server, 0, &["/gpt2", "/deleted/model"]).await;
    mount_listing(&server, 1, &[]).await;
    mount_detail(
        &server,
        "/gpt2",
        format!(
            r#"<div data-target="LikeButton" data-props="{}"></div>"#,
            props(r#"{"repoId":"gpt2","likes":1200}"#)
        ),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/deleted/model"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let options = ScrapeOptions {
        max_pages: 5,
        ..ScrapeOptions::default()
    };
    let (table, stats) = execute_scrape(client_for(&server), &options, None)
        .await
        .unwrap();

    assert_eq!(stats.urls_found, 2);
    assert_eq!(table.row_count(), 2);
    assert_eq!(
        table.records()[0].get("model_name"),
        Some(&FieldValue::from("gpt2"))
    );
    assert!(table.records()[1].is_empty());
}

#[tokio::test]
async fn test_scrape_fails_fast_on_listing_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = execute_scrape(client_for(&server), &ScrapeOptions::default(), None)
        .await
        .unwrap_err();

    assert!(matches!(err, ScanError::Listing { page: 0, .. }));
}

#[tokio::test]
async fn test_scrape_output_round_trip() {
    let server = mock_hub().await;
    let options = ScrapeOptions {
        max_pages: 5,
        ..ScrapeOptions::default()
    };
    let (table, _) = execute_scrape(client_for(&server), &options, None)
        .await
        .unwrap();

    let dir = TempDir::new().unwrap();
    let out = dir.path().join("huggingface_models_dataset.csv");
    table.persist(&out, OutputFormat::Csv, "NA").unwrap();

    let mut reader = csv::Reader::from_path(&out).unwrap();
    let headers: Vec<String> = reader.headers().unwrap().iter().map(str::to_string).collect();
    assert_eq!(headers, table.columns());

    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[2].iter().all(|cell| cell == "NA"));
}
