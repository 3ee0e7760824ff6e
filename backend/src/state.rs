//! Application state management
//!
//! The registry holding per-profile snapshots is the only mutable state
//! in the process. It lives behind one `RwLock`: the background fetcher
//! takes the write lock for a single `upsert_snapshot` call, so request
//! handlers always observe either the previous complete snapshot or the
//! new one, never a mix.

use crate::config::AppConfig;
use std::sync::Arc;
use tokio::sync::RwLock;
use weight_progress_shared::ProfileRegistry;

/// Shared application state
///
/// All fields are Arc'd; cloning is O(1) across async tasks.
#[derive(Clone)]
pub struct AppState {
    /// Tracked profiles and their latest snapshots
    pub registry: Arc<RwLock<ProfileRegistry>>,
    /// Application configuration
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Create application state with the registry seeded from the
    /// configured profiles. Profiles start without a snapshot; the
    /// fetcher fills them in.
    pub fn new(config: AppConfig) -> Self {
        let mut registry = ProfileRegistry::new();
        for profile in &config.profiles {
            registry.register(&profile.name, &profile.name);
        }

        Self {
            registry: Arc::new(RwLock::new(registry)),
            config: Arc::new(config),
        }
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
