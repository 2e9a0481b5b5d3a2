mod common;

use axum::http::StatusCode as AxumStatus;
use axum::routing::post;
use axum::Router;
use common::TestApp;
use reqwest::StatusCode;

/// Spawn a stub Excel upstream that answers every request with the given
/// status and body, returning its URL.
async fn spawn_excel_stub(status: AxumStatus, body: &'static [u8]) -> String {
    let app = Router::new().route(
        "/generate-excel",
        post(move || async move { (status, body) }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub listener");
    let addr = listener.local_addr().expect("Failed to read stub address");

    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });

    format!("http://{}/generate-excel", addr)
}

#[tokio::test]
async fn excel_proxy_relays_spreadsheet_bytes() {
    let upstream = spawn_excel_stub(AxumStatus::OK, b"PK\x03\x04fake-xlsx").await;
    let app = TestApp::spawn_with(|config| {
        config.excel.url = upstream.clone();
    })
    .await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/generate-excel-proxy", app.address))
        .form(&[("content", "Test Case ID: TC001")])
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::OK, response.status());
    assert_eq!(
        response
            .headers()
            .get("content-type")
            .expect("Missing content-type")
            .to_str()
            .unwrap(),
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert_eq!(
        response
            .headers()
            .get("content-disposition")
            .expect("Missing content-disposition")
            .to_str()
            .unwrap(),
        "attachment; filename=test_cases.xlsx"
    );

    let bytes = response.bytes().await.expect("Failed to read body");
    assert_eq!(&bytes[..], &b"PK\x03\x04fake-xlsx"[..]);
}

#[tokio::test]
async fn excel_proxy_passes_upstream_error_status_through() {
    let upstream = spawn_excel_stub(AxumStatus::BAD_GATEWAY, b"ignored detail").await;
    let app = TestApp::spawn_with(|config| {
        config.excel.url = upstream.clone();
    })
    .await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/generate-excel-proxy", app.address))
        .form(&[("content", "whatever")])
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::BAD_GATEWAY, response.status());

    // The upstream body is discarded; the caller sees a generic detail.
    let body: serde_json::Value = response.json().await.expect("Failed to parse JSON");
    assert_eq!(body["error"], "Failed to generate Excel");
}

#[tokio::test]
async fn excel_proxy_maps_transport_failure_to_500() {
    // Reserve a port, then drop the listener so nothing answers there.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind probe listener");
    let dead_addr = listener.local_addr().expect("Failed to read probe address");
    drop(listener);

    let app = TestApp::spawn_with(move |config| {
        config.excel.url = format!("http://{}/generate-excel", dead_addr);
    })
    .await;

    let client = reqwest::Client::new();
    let response = client
        .post(format!("{}/generate-excel-proxy", app.address))
        .form(&[("content", "whatever")])
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, response.status());
}
