//! Error types for the weight-progress engine
//!
//! The engine never retries or defaults: every error carries enough
//! context (field, profile name) for the caller to report precisely.

use thiserror::Error;

/// Sex value outside `m`/`f`.
///
/// Raised when parsing the wire value at the fetch boundary; the typed
/// [`crate::snapshot::Sex`] enum keeps the formulas themselves total.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported sex value {0:?} (expected \"m\" or \"f\")")]
pub struct UnsupportedSexError(pub String);

/// Body-metric formula errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BodyMetricsError {
    #[error("hip girth is required for the female Navy body-fat formula")]
    MissingHip,
}

/// Trend estimation errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TrendError {
    #[error("cannot fit a trend to an empty series")]
    EmptySeries,

    #[error("point {index} is not a finite (x, y) pair")]
    InvalidPoint { index: usize },

    #[error("all points share the same x value; slope is undefined")]
    ZeroVariance,
}

/// Projection errors
///
/// Rate-derived fields going undefined is a *report state*
/// ([`crate::projection::Projection::Undefined`]), not an error; this
/// only covers failures to produce a report at all.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectError {
    #[error("trend estimation over the measurement history failed: {0}")]
    Trend(#[from] TrendError),
}

/// Profile registry errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    #[error("no snapshot fetched yet for profile: {0}")]
    NoSnapshot(String),

    #[error("projection failed for profile {name}: {source}")]
    Projection {
        name: String,
        #[source]
        source: ProjectError,
    },
}
