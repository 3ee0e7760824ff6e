//! Integration tests for the progress endpoints

mod common;

use axum::http::StatusCode;
use common::{sample_snapshot, TestApp};

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::new(&["alice"]);

    let (status, body) = app.get("/health").await;

    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_unknown_profile_is_404() {
    let app = TestApp::new(&["alice"]);

    let (status, body) = app.get("/api/v1/progress/nobody").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"]["code"], "PROFILE_NOT_FOUND");
}

#[tokio::test]
async fn test_profile_without_snapshot_is_503() {
    let app = TestApp::new(&["alice"]);

    let (status, body) = app.get("/api/v1/progress/alice").await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body["error"]["code"], "SNAPSHOT_NOT_READY");
}

#[tokio::test]
async fn test_profile_report_json() {
    let app = TestApp::new(&["alice"]);
    app.seed_snapshot("alice", sample_snapshot("alice")).await;

    let (status, body) = app.get("/api/v1/progress/alice").await;

    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();

    let report = &body["report"];
    assert_eq!(report["username"], "alice");
    assert_eq!(report["start_weight_lbs"], 220.0);
    assert_eq!(report["current_weight_lbs"], 205.0);
    assert_eq!(report["goal_weight_lbs"], 170.0);
    assert_eq!(report["lost_lbs"], 15.0);
    assert_eq!(report["projection"]["status"], "projected");
    let waypoints = report["projection"]["waypoints"].as_array().unwrap();
    let weights: Vec<f64> = waypoints
        .iter()
        .map(|w| w["weight"].as_f64().unwrap())
        .collect();
    assert_eq!(weights, vec![200.0, 190.0, 180.0]);

    assert!(!body["updated"].is_null());
}

#[tokio::test]
async fn test_profile_report_text_matches_report() {
    let app = TestApp::new(&["alice"]);
    app.seed_snapshot("alice", sample_snapshot("alice")).await;

    let (status, body) = app.get("/api/v1/progress/alice/text").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.starts_with("Weight loss stats"));
    assert!(body.contains("MFP username: alice"));
    assert!(body.contains("Starting weight: 220 lbs"));
    assert!(body.contains("Goal weight: 170 lbs"));
    assert!(body.contains("[200 lbs]"));
}

#[tokio::test]
async fn test_text_endpoint_for_undefined_projection() {
    let mut snapshot = sample_snapshot("alice");
    // No elapsed days between start and latest weigh-in
    snapshot.latest_weight_date = snapshot.starting_weight_date;

    let app = TestApp::new(&["alice"]);
    app.seed_snapshot("alice", snapshot).await;

    let (status, body) = app.get("/api/v1/progress/alice/text").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("Projection unavailable"));
}

#[tokio::test]
async fn test_all_profiles_isolates_failures() {
    let app = TestApp::new(&["alice", "bob"]);
    app.seed_snapshot("alice", sample_snapshot("alice")).await;
    // bob has no snapshot yet

    let (status, body) = app.get("/api/v1/progress").await;

    assert_eq!(status, StatusCode::OK);
    let body: serde_json::Value = serde_json::from_str(&body).unwrap();

    assert_eq!(body["alice"]["report"]["username"], "alice");
    assert!(body["bob"]["error"]
        .as_str()
        .unwrap()
        .contains("no snapshot fetched yet"));
}
