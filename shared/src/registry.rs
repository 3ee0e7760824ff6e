//! Profile registry
//!
//! Owns the set of tracked profiles in registration order. The registry
//! holds identity and the "current snapshot" pointer only; a snapshot is
//! replaced wholesale by `upsert_snapshot`, never mutated field by field.

use crate::errors::RegistryError;
use crate::projection::{ProgressProjector, ProgressReport};
use crate::snapshot::Snapshot;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// One tracked profile.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    /// Unique identifier, stable for the registry's lifetime.
    pub name: String,
    /// Opaque reference to auth material held by the fetch collaborator.
    pub credentials_ref: String,
    /// Latest raw data; `None` until the first successful fetch.
    pub snapshot: Option<Snapshot>,
    /// Timestamp of the most recent snapshot replacement.
    pub last_updated: Option<DateTime<Utc>>,
}

/// Registration-ordered set of profiles plus the projector used to
/// derive their reports.
#[derive(Debug, Clone, Default)]
pub struct ProfileRegistry {
    profiles: Vec<Profile>,
    projector: ProgressProjector,
}

impl ProfileRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projector(projector: ProgressProjector) -> Self {
        Self {
            profiles: Vec::new(),
            projector,
        }
    }

    /// Add a profile with no snapshot yet. Re-registering an existing
    /// name is a no-op; names are unique.
    pub fn register(&mut self, name: impl Into<String>, credentials_ref: impl Into<String>) {
        let name = name.into();
        if self.profiles.iter().any(|p| p.name == name) {
            return;
        }
        self.profiles.push(Profile {
            name,
            credentials_ref: credentials_ref.into(),
            snapshot: None,
            last_updated: None,
        });
    }

    /// Atomically replace a profile's snapshot and update its timestamp.
    pub fn upsert_snapshot(
        &mut self,
        name: &str,
        snapshot: Snapshot,
        fetched_at: DateTime<Utc>,
    ) -> Result<(), RegistryError> {
        let profile = self
            .profiles
            .iter_mut()
            .find(|p| p.name == name)
            .ok_or_else(|| RegistryError::ProfileNotFound(name.to_string()))?;

        profile.snapshot = Some(snapshot);
        profile.last_updated = Some(fetched_at);
        Ok(())
    }

    /// Look up a profile by name.
    pub fn get(&self, name: &str) -> Result<&Profile, RegistryError> {
        self.profiles
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| RegistryError::ProfileNotFound(name.to_string()))
    }

    /// All profiles in registration order.
    pub fn all(&self) -> &[Profile] {
        &self.profiles
    }

    pub fn len(&self) -> usize {
        self.profiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }

    /// Derive the report for one profile.
    pub fn project(&self, name: &str, today: NaiveDate) -> Result<ProgressReport, RegistryError> {
        let profile = self.get(name)?;
        let snapshot = profile
            .snapshot
            .as_ref()
            .ok_or_else(|| RegistryError::NoSnapshot(name.to_string()))?;

        self.projector
            .project(snapshot, today)
            .map_err(|source| RegistryError::Projection {
                name: name.to_string(),
                source,
            })
    }

    /// Derive reports for every profile, in registration order. One
    /// profile's failure never hides the others.
    pub fn project_all(
        &self,
        today: NaiveDate,
    ) -> Vec<(String, Result<ProgressReport, RegistryError>)> {
        self.profiles
            .iter()
            .map(|p| (p.name.clone(), self.project(&p.name, today)))
            .collect()
    }
}
