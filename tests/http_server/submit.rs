use crate::http_server::helpers::*;

#[tokio::test]
async fn successful_submission_returns_output_and_return() {
    let server = TestServer::new().await;

    let resp = server.submit("40 + 2").await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    let object = body.as_object().expect("envelope should be an object");
    assert_eq!(object.keys().map(String::as_str).collect::<Vec<_>>(), vec!["output", "return"]);
    assert_eq!(body["output"], serde_json::json!([]));
    assert_eq!(body["return"], "42");

    server.cleanup();
}

#[tokio::test]
async fn syntax_error_returns_exception_only() {
    let server = TestServer::new().await;

    let resp = server.submit(r#"let x = "unterminated"#).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    let object = body.as_object().expect("envelope should be an object");
    assert_eq!(object.keys().map(String::as_str).collect::<Vec<_>>(), vec!["exception"]);
    assert!(body["exception"].as_str().unwrap().contains("compilation failed"));

    server.cleanup();
}

#[tokio::test]
async fn runtime_fault_returns_exception_with_message() {
    let server = TestServer::new().await;

    let resp = server.submit("1 / 0").await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert!(body.get("output").is_none());
    assert!(body.get("return").is_none());
    assert!(body["exception"].as_str().unwrap().to_lowercase().contains("zero"));

    server.cleanup();
}

#[tokio::test]
async fn printed_values_are_deduplicated_in_output() {
    let server = TestServer::new().await;

    let resp = server.submit(r#"print("hi"); print("hi"); "done""#).await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    assert_eq!(body["output"], serde_json::json!(["hi"]));
    assert_eq!(body["return"], "done");

    server.cleanup();
}

#[tokio::test]
async fn cluster_binding_is_visible_to_scripts() {
    let server = TestServer::new().await;

    let resp = server.submit("cluster.archive_count()").await;
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.expect("Failed to parse JSON");
    // The submission's own archive was announced before execution.
    assert_eq!(body["return"], "1");

    server.cleanup();
}
