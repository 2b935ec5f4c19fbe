use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;

use sam_awardee_collector::config::Config;
use sam_awardee_collector::server::{router, AppState};

fn state_with_output_dir(dir: &std::path::Path) -> AppState {
    let mut config = Config::default();
    config.collector.output_dir = dir.to_path_buf();
    AppState::new(config)
}

async fn get(state: AppState, uri: &str) -> (StatusCode, Value) {
    let response = router(state)
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_reports_liveness() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(state_with_output_dir(dir.path()), "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "sam-awardee-collector");
    assert!(body["uptimeSeconds"].is_number());
}

#[tokio::test]
async fn index_documents_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(state_with_output_dir(dir.path()), "/").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["endpoints"]["POST /scrape"].is_string());
    assert!(body["scrapeOptions"]["jurisdictions"].is_string());
}

#[tokio::test]
async fn unknown_route_returns_404_with_endpoint_list() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(state_with_output_dir(dir.path()), "/nope").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Endpoint not found");
    let endpoints = body["availableEndpoints"].as_array().unwrap();
    assert!(endpoints.contains(&Value::String("POST /scrape".to_string())));
}

#[tokio::test]
async fn results_listing_is_empty_without_reports() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(state_with_output_dir(dir.path()), "/results").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["count"], 0);
    assert!(body["files"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn latest_is_404_without_reports() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = get(state_with_output_dir(dir.path()), "/results/latest").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn latest_returns_persisted_report() {
    use sam_awardee_collector::jurisdictions::Jurisdiction;
    use sam_awardee_collector::report::{CollectionReport, JurisdictionResult};
    use sam_awardee_collector::storage;
    use std::collections::BTreeMap;

    let dir = tempfile::tempdir().unwrap();
    let ca = Jurisdiction::new("CA", "California");
    let mut results = BTreeMap::new();
    results.insert(
        "CA".to_string(),
        JurisdictionResult::collected(&ca, vec!["Acme Corp".to_string()]),
    );
    let report = CollectionReport::assemble(results, "1 selected state (CA)".to_string());
    storage::write_report(dir.path(), &report).unwrap();

    let state = state_with_output_dir(dir.path());

    let (status, body) = get(state.clone(), "/results/latest").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["summary"]["totalUniqueAwardees"], 1);
    assert_eq!(body["data"]["allUniqueAwardees"][0], "Acme Corp");
    assert!(body["filename"].as_str().unwrap().ends_with(".json"));

    let (status, body) = get(state, "/results").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["count"], 1);
    assert!(body["files"][0]["created"].is_string());
    assert!(body["files"][0]["modified"].is_string());
}
