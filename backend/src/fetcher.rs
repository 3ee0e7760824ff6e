//! Background snapshot refresh
//!
//! Profiles refresh concurrently, one task each; a failing profile is
//! logged and reported without aborting the rest of the cycle.

use crate::client::{Credentials, FetchError, SnapshotSource};
use crate::state::AppState;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tracing::{error, info, warn};
use weight_progress_shared::RegistryError;

/// Why one profile's refresh failed.
#[derive(Error, Debug)]
pub enum RefreshError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Registry(#[from] RegistryError),
}

/// Fetch every configured profile once, concurrently, and store the
/// results. Returns per-profile outcomes in no particular order.
pub async fn refresh_all(
    state: &AppState,
    source: Arc<dyn SnapshotSource>,
) -> Vec<(String, Result<(), RefreshError>)> {
    let mut tasks = JoinSet::new();
    for profile in &state.config.profiles {
        let source = source.clone();
        let name = profile.name.clone();
        let credentials = Credentials {
            username: profile.username.clone(),
            password: profile.password.clone(),
        };

        tasks.spawn(async move {
            let result = source.fetch_snapshot(&credentials).await;
            (name, result)
        });
    }

    let mut outcomes = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        let (name, result) = match joined {
            Ok(pair) => pair,
            Err(join_error) => {
                // A panicking fetch task loses only its own profile
                error!(error = %join_error, "fetch task failed to complete");
                continue;
            }
        };

        let outcome = match result {
            Ok(snapshot) => {
                let mut registry = state.registry.write().await;
                registry
                    .upsert_snapshot(&name, snapshot, Utc::now())
                    .map_err(RefreshError::from)
            }
            Err(fetch_error) => Err(RefreshError::from(fetch_error)),
        };

        match &outcome {
            Ok(()) => info!(profile = %name, "snapshot refreshed"),
            Err(err) => warn!(profile = %name, error = %err, "refresh failed"),
        }
        outcomes.push((name, outcome));
    }

    outcomes
}

/// Server-mode loop: refresh immediately, then on every interval tick.
pub async fn run_periodic(state: AppState, source: Arc<dyn SnapshotSource>, interval: Duration) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        refresh_all(&state, source.clone()).await;
    }
}
