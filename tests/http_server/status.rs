use crate::http_server::helpers::*;

#[tokio::test]
async fn status_endpoint_reports_version_and_counters() {
    let server = TestServer::new().await;

    let resp = server.get("/status").await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(body["submissions_total"], 0);
    assert_eq!(body["failures_total"], 0);

    server.cleanup();
}

#[tokio::test]
async fn status_counters_track_submissions() {
    let server = TestServer::new().await;

    let ok = server.submit("1 + 1").await;
    assert_eq!(ok.status(), 200);
    let failed = server.submit("1 / 0").await;
    assert_eq!(failed.status(), 200);

    let body: serde_json::Value =
        server.get("/status").await.json().await.expect("Failed to parse JSON");
    assert_eq!(body["submissions_total"], 2);
    assert_eq!(body["failures_total"], 1);

    server.cleanup();
}
