//! Common test utilities for integration tests

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use chrono::{NaiveDate, Utc};
use secrecy::SecretString;
use tower::ServiceExt;
use weight_progress_backend::config::{
    AppConfig, FetchConfig, MfpConfig, Mode, ProfileConfig, ServerConfig,
};
use weight_progress_backend::routes;
use weight_progress_backend::state::AppState;
use weight_progress_shared::{Sex, Snapshot};

/// Test application wrapper
pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    /// Create a test application with the given profiles registered and
    /// no snapshots fetched yet.
    pub fn new(profiles: &[&str]) -> Self {
        let config = test_config(profiles);
        let state = AppState::new(config);
        let app = routes::create_router(state.clone());

        Self { app, state }
    }

    /// Store a snapshot for one profile, as a completed fetch would.
    pub async fn seed_snapshot(&self, name: &str, snapshot: Snapshot) {
        let mut registry = self.state.registry.write().await;
        registry
            .upsert_snapshot(name, snapshot, Utc::now())
            .expect("profile must be registered before seeding");
    }

    /// Make a GET request
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .method("GET")
            .uri(path)
            .body(Body::empty())
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body_str = String::from_utf8(body.to_vec()).unwrap();

        (status, body_str)
    }
}

/// A snapshot mid-way through a loss: 220 -> 205 over 60 days, goal 170.
pub fn sample_snapshot(username: &str) -> Snapshot {
    Snapshot {
        username: username.to_string(),
        sex: Sex::Male,
        height_in: 70.0,
        birthdate: NaiveDate::from_ymd_opt(1990, 6, 15).unwrap(),
        starting_weight_lbs: 220.0,
        starting_weight_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        goal_weight_lbs: 170.0,
        latest_weight_lbs: 205.0,
        latest_weight_date: NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(),
        measurements: vec![],
    }
}

fn test_config(profiles: &[&str]) -> AppConfig {
    AppConfig {
        mode: Mode::Server,
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        fetch: FetchConfig {
            interval_secs: 21600,
        },
        mfp: MfpConfig {
            base_url: "http://localhost".to_string(),
            api_url: "http://localhost".to_string(),
        },
        profiles: profiles
            .iter()
            .map(|name| ProfileConfig {
                name: name.to_string(),
                username: format!("{}@example.com", name),
                password: SecretString::new("test-password".to_string()),
            })
            .collect(),
    }
}
