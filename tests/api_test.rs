//! HTTP API integration tests.
//!
//! Run against a [`TestHarness`] server on a random port with a fast stub
//! engine, exercising the full request/response contract.

mod common;

use std::sync::Arc;

use common::{upload_form, wait_for_terminal, FailingEngine, TestHarness};

// ---------------------------------------------------------------------------
// Health check
// ---------------------------------------------------------------------------

#[tokio::test]
async fn health_check_returns_200() {
    let (_harness, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/health"))
        .await
        .expect("request failed");
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "staffline");
}

// ---------------------------------------------------------------------------
// Synchronous conversion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn sync_convert_returns_musicxml() {
    let (harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/convert"))
        .multipart(upload_form("page.png", b"fake image data"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["status"], "success");
    assert!(!json["job_id"].as_str().unwrap().is_empty());

    let musicxml = json["musicxml"].as_str().unwrap();
    assert!(musicxml.contains("<score-partwise"));
    assert!(musicxml.contains("<measure"));
    assert!(musicxml.contains("<note>"));

    // The synchronous path stores nothing.
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn sync_convert_without_file_is_400() {
    let (harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let form = reqwest::multipart::Form::new().text("unrelated", "value");
    let resp = client
        .post(format!("http://{addr}/api/convert"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "validation_error");
    assert!(json["error"].as_str().unwrap().contains("no file uploaded"));

    // No job was created.
    assert!(harness.store.is_empty());
}

#[tokio::test]
async fn sync_convert_unsupported_format_is_400() {
    let (_harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/convert"))
        .multipart(upload_form("song.mp3", b"audio"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
}

#[tokio::test]
async fn sync_convert_engine_failure_is_502() {
    let (_harness, addr) = TestHarness::with_engine_server(Arc::new(FailingEngine)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/convert"))
        .multipart(upload_form("page.png", b"fake image data"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "engine_error");
}

// ---------------------------------------------------------------------------
// Asynchronous conversion
// ---------------------------------------------------------------------------

#[tokio::test]
async fn async_convert_accepts_then_completes() {
    let (_harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/convert/async"))
        .multipart(upload_form("page.png", b"fake image data"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 202);

    let json: serde_json::Value = resp.json().await.unwrap();
    let job_id = json["job_id"].as_str().unwrap().to_string();
    // At return time the job must not be terminal.
    let status = json["status"].as_str().unwrap();
    assert!(status == "pending" || status == "processing", "got {status}");
    assert!(json.get("musicxml").is_none());

    let finished = wait_for_terminal(&client, addr, &job_id).await;
    assert_eq!(finished["status"], "completed");
    let musicxml = finished["musicxml"].as_str().unwrap();
    assert!(musicxml.contains("<measure"));
    assert!(musicxml.contains("<note>"));
}

#[tokio::test]
async fn status_for_unknown_id_is_404() {
    let (_harness, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/api/jobs/does-not-exist"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "not_found");
}

#[tokio::test]
async fn repeated_status_reads_are_identical() {
    let (_harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/convert/async"))
        .multipart(upload_form("page.png", b"fake image data"))
        .send()
        .await
        .unwrap();
    let json: serde_json::Value = resp.json().await.unwrap();
    let job_id = json["job_id"].as_str().unwrap().to_string();

    let first = wait_for_terminal(&client, addr, &job_id).await;
    let second = wait_for_terminal(&client, addr, &job_id).await;
    assert_eq!(first["musicxml"], second["musicxml"]);
    assert_eq!(first["finished_at"], second["finished_at"]);
}

#[tokio::test]
async fn failed_job_reports_engine_message() {
    let (_harness, addr) = TestHarness::with_engine_server(Arc::new(FailingEngine)).await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/convert/async"))
        .multipart(upload_form("page.png", b"fake image data"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 202);
    let json: serde_json::Value = resp.json().await.unwrap();
    let job_id = json["job_id"].as_str().unwrap().to_string();

    let finished = wait_for_terminal(&client, addr, &job_id).await;
    assert_eq!(finished["status"], "failed");
    assert!(finished["error"]
        .as_str()
        .unwrap()
        .contains("deterministic test failure"));
    assert!(finished.get("musicxml").is_none());
}

// ---------------------------------------------------------------------------
// Download
// ---------------------------------------------------------------------------

#[tokio::test]
async fn download_before_completion_is_409() {
    // Slow engine so the job is still running when we ask.
    let (_harness, addr) = TestHarness::with_slow_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/convert/async"))
        .multipart(upload_form("page.png", b"fake image data"))
        .send()
        .await
        .unwrap();
    let json: serde_json::Value = resp.json().await.unwrap();
    let job_id = json["job_id"].as_str().unwrap();

    let resp = client
        .get(format!("http://{addr}/api/jobs/{job_id}/download"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["code"], "not_ready");
}

#[tokio::test]
async fn download_unknown_id_is_404() {
    let (_harness, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!(
        "http://{addr}/api/jobs/{}/download",
        uuid::Uuid::new_v4()
    ))
    .await
    .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn download_completed_job_streams_attachment() {
    let (_harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/convert/async"))
        .multipart(upload_form("page.png", b"fake image data"))
        .send()
        .await
        .unwrap();
    let json: serde_json::Value = resp.json().await.unwrap();
    let job_id = json["job_id"].as_str().unwrap().to_string();
    wait_for_terminal(&client, addr, &job_id).await;

    let resp = client
        .get(format!("http://{addr}/api/jobs/{job_id}/download"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["content-type"],
        "application/vnd.recordare.musicxml+xml"
    );
    let disposition = resp.headers()["content-disposition"].to_str().unwrap();
    assert!(disposition.contains(&format!("{job_id}.musicxml")));

    let body = resp.text().await.unwrap();
    assert!(body.contains("<score-partwise"));
}

#[tokio::test]
async fn deleted_artifact_is_410_and_record_unchanged() {
    let (harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("http://{addr}/api/convert/async"))
        .multipart(upload_form("page.png", b"fake image data"))
        .send()
        .await
        .unwrap();
    let json: serde_json::Value = resp.json().await.unwrap();
    let job_id = json["job_id"].as_str().unwrap().to_string();
    wait_for_terminal(&client, addr, &job_id).await;

    // Delete the artifact behind the registry's back.
    let record = harness.store.get(job_id.parse().unwrap()).unwrap();
    std::fs::remove_file(record.output_path.unwrap()).unwrap();

    let resp = client
        .get(format!("http://{addr}/api/jobs/{job_id}/download"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 410);

    // The stored record still says completed.
    let record = harness.store.get(job_id.parse().unwrap()).unwrap();
    assert_eq!(record.status, sl_core::JobStatus::Completed);
}

// ---------------------------------------------------------------------------
// Listing and introspection
// ---------------------------------------------------------------------------

#[tokio::test]
async fn list_jobs_contains_submissions() {
    let (_harness, addr) = TestHarness::with_server().await;
    let client = reqwest::Client::new();

    for i in 0..3 {
        client
            .post(format!("http://{addr}/api/convert/async"))
            .multipart(upload_form(&format!("page{i}.png"), b"fake image data"))
            .send()
            .await
            .unwrap();
    }

    let resp = reqwest::get(format!("http://{addr}/api/jobs")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let jobs: Vec<serde_json::Value> = resp.json().await.unwrap();
    assert_eq!(jobs.len(), 3);
}

#[tokio::test]
async fn dashboard_reports_worker_slots() {
    let (_harness, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/api/admin/dashboard"))
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let json: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(json["workers"]["slots"], 4);
    assert_eq!(json["engine"], "stub");
}

#[tokio::test]
async fn responses_carry_request_id() {
    let (_harness, addr) = TestHarness::with_server().await;

    let resp = reqwest::get(format!("http://{addr}/health")).await.unwrap();
    assert!(resp.headers().contains_key("x-request-id"));
}
