//! Snapshot fetching from the upstream service
//!
//! [`SnapshotSource`] is the seam between the engine and the network:
//! the fetcher and the tests only ever see the trait. [`MfpClient`] is
//! the real implementation against MyFitnessPal.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;
use weight_progress_shared::{Snapshot, UnsupportedSexError};

mod mfp;

pub use mfp::MfpClient;

/// Upstream login material for one profile.
#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: SecretString,
}

/// Errors from one fetch cycle against the upstream service.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("authentication failed for {username}")]
    AuthenticationFailed { username: String },

    #[error("login page did not contain an authenticity token")]
    TokenNotFound,

    /// A required wire field is absent or malformed; `field` is the
    /// dotted path into the response document.
    #[error("required field missing from response: {field}")]
    MissingField { field: String },

    #[error(transparent)]
    UnsupportedSex(#[from] UnsupportedSexError),

    #[error("unexpected status {status} from {url}")]
    UnexpectedStatus {
        status: reqwest::StatusCode,
        url: String,
    },

    #[error("http request failed: {0}")]
    Http(#[from] reqwest::Error),
}

impl FetchError {
    pub(crate) fn missing(field: impl Into<String>) -> Self {
        FetchError::MissingField {
            field: field.into(),
        }
    }
}

/// Anything that can produce a complete [`Snapshot`] for one profile.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    async fn fetch_snapshot(&self, credentials: &Credentials) -> Result<Snapshot, FetchError>;
}
