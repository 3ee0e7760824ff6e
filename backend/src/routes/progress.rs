//! Progress report routes
//!
//! The JSON and plain-text endpoints serve the same freshly derived
//! report; the text body is the report's `Display` rendering, never a
//! second computation.

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    Json,
};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use serde_json::json;
use weight_progress_shared::{ProfileRegistry, ProgressReport};

/// One profile's report plus its fetch timestamp.
#[derive(Serialize)]
pub struct ProgressEnvelope {
    pub report: ProgressReport,
    pub updated: Option<DateTime<Utc>>,
}

/// Reports for every profile, keyed by name. A profile that cannot be
/// reported carries an `error` value instead of hiding the others.
///
/// Shared by the all-profiles endpoint and the one-shot CLI output.
pub fn progress_document(registry: &ProfileRegistry, today: NaiveDate) -> serde_json::Value {
    let mut document = serde_json::Map::new();
    for (name, result) in registry.project_all(today) {
        let value = match result {
            Ok(report) => {
                let updated = registry.get(&name).ok().and_then(|p| p.last_updated);
                json!({ "report": report, "updated": updated })
            }
            Err(err) => json!({ "error": err.to_string() }),
        };
        document.insert(name, value);
    }
    serde_json::Value::Object(document)
}

/// GET /api/v1/progress - All profiles' reports
pub async fn all_profiles(State(state): State<AppState>) -> Json<serde_json::Value> {
    let registry = state.registry.read().await;
    Json(progress_document(&registry, Utc::now().date_naive()))
}

/// GET /api/v1/progress/:name - One profile's report as JSON
pub async fn profile_json(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<Json<ProgressEnvelope>> {
    let registry = state.registry.read().await;
    let report = registry
        .project(&name, Utc::now().date_naive())
        .map_err(ApiError::from)?;
    let updated = registry.get(&name).map_err(ApiError::from)?.last_updated;

    Ok(Json(ProgressEnvelope { report, updated }))
}

/// GET /api/v1/progress/:name/text - One profile's report as plain text
pub async fn profile_text(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> ApiResult<String> {
    let registry = state.registry.read().await;
    let report = registry
        .project(&name, Utc::now().date_naive())
        .map_err(ApiError::from)?;

    Ok(report.to_string())
}
