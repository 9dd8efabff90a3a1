//! End-to-end checks through the HTTP router with the offline models and a mocked SearxNG.

use std::io::Cursor;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
};
use docx_rs::{Docx, Paragraph, Run};
use httpmock::{Method::GET, MockServer};
use plagscan::{api, config::Config, processing::PlagiarismService};
use serde_json::{Value, json};
use tower::ServiceExt;

const BOUNDARY: &str = "plagscan-pipeline-boundary";
const SENTENCE: &str = "Alpha beta gamma delta epsilon zeta eta theta iota kappa.";

async fn app_for(server: &MockServer) -> Router {
    let config = Config {
        search_url: server.base_url(),
        ..Config::default()
    };
    let service = PlagiarismService::new(&config)
        .await
        .expect("offline models load");
    api::create_router(Arc::new(service), config.max_upload_bytes)
}

fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
    let mut docx = Docx::new();
    for paragraph in paragraphs {
        docx = docx.add_paragraph(Paragraph::new().add_run(Run::new().add_text(*paragraph)));
    }
    let mut cursor = Cursor::new(Vec::new());
    docx.build().pack(&mut cursor).expect("pack docx");
    cursor.into_inner()
}

async fn upload(app: Router, filename: &str, content: &[u8]) -> (StatusCode, Value) {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    let response = app
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/check_plagiarism/")
                .header(
                    "content-type",
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(body))
                .expect("request"),
        )
        .await
        .expect("router response");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    (status, serde_json::from_slice(&bytes).expect("json body"))
}

#[tokio::test]
async fn snippet_identical_to_chunk_is_reported() {
    let server = MockServer::start_async().await;
    let paragraph = SENTENCE.repeat(4);
    let chunk = format!("{paragraph}\n");

    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/search").query_param("format", "json");
            then.status(200).json_body(json!({
                "results": [
                    { "url": "https://copied.example/essay", "content": chunk },
                    { "url": "https://other.example", "content": "Quantum harbor violet engine" }
                ]
            }));
        })
        .await;

    let app = app_for(&server).await;
    let (status, report) = upload(app, "essay.docx", &docx_bytes(&[paragraph.as_str()])).await;

    assert_eq!(status, StatusCode::OK, "{report}");
    mock.assert_hits_async(1).await;
    assert_eq!(report["plagiarism_percent"], 10);

    let matches = report["plagiarism_matches"].as_array().expect("matches");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0]["source"], "https://copied.example/essay");
    let similarity = matches[0]["similarity"].as_f64().expect("similarity");
    assert!((similarity - 100.0).abs() < 0.01, "similarity {similarity}");
    let expected_snippet: String = chunk.chars().take(200).collect();
    assert_eq!(matches[0]["snippet"], expected_snippet.as_str());
    assert!(!report["summary"].as_str().expect("summary").is_empty());
}

#[tokio::test]
async fn unrelated_results_score_zero_and_only_five_chunks_are_searched() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(200).json_body(json!({
                "results": [
                    { "url": "https://one.example", "content": "Quantum harbor violet engine" },
                    { "url": "https://two.example", "content": "Marble orchestra lantern" },
                    { "url": "https://three.example", "content": "Copper meadow bicycle" },
                    { "url": "https://four.example", "content": "Granite pepper sailboat" }
                ]
            }));
        })
        .await;

    let app = app_for(&server).await;
    let paragraphs = vec![SENTENCE; 51];
    let (status, report) = upload(app, "long.docx", &docx_bytes(&paragraphs)).await;

    assert_eq!(status, StatusCode::OK, "{report}");
    mock.assert_hits_async(5).await;
    assert_eq!(report["plagiarism_percent"], 0);
    assert_eq!(report["plagiarism_matches"], json!([]));
    assert!(!report["summary"].as_str().expect("summary").is_empty());
}

#[tokio::test]
async fn whitespace_only_document_is_a_client_error() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(200).json_body(json!({ "results": [] }));
        })
        .await;

    let app = app_for(&server).await;
    let (status, body) = upload(app, "blank.docx", &docx_bytes(&["", "   "])).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({ "error": "File has no readable text" }));
    mock.assert_hits_async(0).await;
}

#[tokio::test]
async fn unsupported_extension_is_a_server_error() {
    let server = MockServer::start_async().await;
    let app = app_for(&server).await;

    let (status, body) = upload(app, "notes.txt", b"plain text notes").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({ "error": "Unsupported file type. Use PDF or DOCX." }));
}

#[tokio::test]
async fn search_failure_aborts_without_partial_results() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/search");
            then.status(502).body("upstream engines unavailable");
        })
        .await;

    let app = app_for(&server).await;
    let (status, body) = upload(app, "essay.docx", &docx_bytes(&[SENTENCE])).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let message = body["error"].as_str().expect("error message");
    assert!(message.contains("502"), "{message}");
    assert!(body.get("plagiarism_matches").is_none());
}
