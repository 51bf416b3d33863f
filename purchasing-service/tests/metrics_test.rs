//! Integration test for the metrics endpoint.

mod common;

use common::TestApp;

#[tokio::test]
async fn request_metrics_are_exported() {
    let app = TestApp::spawn().await;

    // Drive one request through the middleware stack first.
    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("request succeeds");
    assert_eq!(response.status(), 200);

    let body = app
        .client
        .get(format!("{}/metrics", app.address))
        .send()
        .await
        .expect("request succeeds")
        .text()
        .await
        .expect("text body");

    // The facade-recorded request counters must appear in the export, not
    // only the crate's own prometheus statics.
    assert!(
        body.contains("http_requests_total"),
        "missing request counter in: {body}"
    );
}
