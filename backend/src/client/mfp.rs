//! MyFitnessPal client
//!
//! The upstream has no public API; this follows the site's own login
//! choreography: scrape the authenticity token from the landing page,
//! log in through the account form (success is a 302), then trade the
//! session cookie for a bearer token used against the JSON API.
//!
//! Base and API URLs are constructor parameters so tests can point the
//! client at a local mock server.

use super::{Credentials, FetchError, SnapshotSource};
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{header, RequestBuilder, StatusCode};
use secrecy::ExposeSecret;
use serde::Deserialize;
use weight_progress_shared::{Measurement, Sex, Snapshot, WeightUnit};

/// Client id the site's own frontend sends.
const CLIENT_ID: &str = "mfp-main-js";

/// The auth-token endpoint rejects requests without a browser UA.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0";

/// User-document sections the snapshot is assembled from.
const USER_FIELDS: [&str; 3] = ["account", "goal_preferences", "profiles"];

/// Real [`SnapshotSource`] implementation against MyFitnessPal.
pub struct MfpClient {
    http: reqwest::Client,
    base_url: String,
    api_url: String,
}

impl MfpClient {
    /// Build a client for the given site and API origins.
    pub fn new(base_url: impl Into<String>, api_url: impl Into<String>) -> Result<Self, FetchError> {
        // Redirects stay visible: the login POST signals success with a 302.
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(BROWSER_USER_AGENT)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_url: api_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Run the cookie-session login flow and obtain an API session.
    async fn login(&self, credentials: &Credentials) -> Result<AuthSession, FetchError> {
        let landing = self
            .http
            .get(format!("{}/", self.base_url))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        let token = extract_authenticity_token(&landing).ok_or(FetchError::TokenNotFound)?;

        let form = [
            ("utf8", "\u{2713}"),
            ("username", credentials.username.as_str()),
            ("password", credentials.password.expose_secret()),
            ("authenticity_token", token),
        ];
        let response = self
            .http
            .post(format!("{}/account/login", self.base_url))
            .form(&form)
            .send()
            .await?;

        if response.status() != StatusCode::FOUND {
            return Err(FetchError::AuthenticationFailed {
                username: credentials.username.clone(),
            });
        }

        let url = format!("{}/user/auth_token", self.base_url);
        let response = self
            .http
            .get(&url)
            .query(&[("refresh", "true")])
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: response.status(),
                url,
            });
        }

        Ok(response.json().await?)
    }

    fn authed(&self, request: RequestBuilder, session: &AuthSession) -> RequestBuilder {
        request
            .header(header::ACCEPT, "application/json")
            .header(
                header::AUTHORIZATION,
                format!("Bearer {}", session.access_token),
            )
            .header("mfp-client-id", CLIENT_ID)
            .header("mfp-user-id", &session.user_id)
    }

    async fn fetch_user_document(&self, session: &AuthSession) -> Result<UserDocument, FetchError> {
        let url = format!("{}/v2/users/{}", self.api_url, session.user_id);
        let query: Vec<(&str, &str)> = USER_FIELDS.iter().map(|f| ("fields[]", *f)).collect();

        let response = self
            .authed(self.http.get(&url).query(&query), session)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: response.status(),
                url,
            });
        }

        Ok(response.json().await?)
    }

    async fn fetch_measurements(
        &self,
        session: &AuthSession,
    ) -> Result<MeasurementsDocument, FetchError> {
        let url = format!("{}/v2/incubator/measurements", self.api_url);
        let response = self
            .authed(self.http.get(&url).query(&[("type", "weight")]), session)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: response.status(),
                url,
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl SnapshotSource for MfpClient {
    async fn fetch_snapshot(&self, credentials: &Credentials) -> Result<Snapshot, FetchError> {
        let session = self.login(credentials).await?;
        let user = self.fetch_user_document(&session).await?;
        let measurements = self.fetch_measurements(&session).await?;
        build_snapshot(user, measurements)
    }
}

/// Pull the hidden `authenticity_token` input out of the login page.
fn extract_authenticity_token(html: &str) -> Option<&str> {
    let pattern = regex_lite::Regex::new(r#"name="authenticity_token"[^>]*value="([^"]*)""#)
        .expect("authenticity token pattern is valid");
    pattern
        .captures(html)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}

// ============================================================================
// Wire shapes
// ============================================================================

#[derive(Debug, Deserialize)]
struct AuthSession {
    access_token: String,
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct UserDocument {
    item: Option<UserItem>,
}

#[derive(Debug, Deserialize)]
struct UserItem {
    username: Option<String>,
    #[serde(default)]
    profiles: Vec<WireProfile>,
    goal_preferences: Option<GoalPreferences>,
}

#[derive(Debug, Deserialize)]
struct WireProfile {
    sex: Option<String>,
    height: Option<WireQuantity>,
    birthdate: Option<NaiveDate>,
    starting_weight_date: Option<NaiveDate>,
    starting_weight: Option<WireQuantity>,
}

#[derive(Debug, Deserialize)]
struct GoalPreferences {
    weight_goal: Option<WireQuantity>,
}

#[derive(Debug, Deserialize)]
struct WireQuantity {
    value: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct MeasurementsDocument {
    #[serde(default)]
    items: Vec<WireMeasurement>,
}

#[derive(Debug, Deserialize)]
struct WireMeasurement {
    date: Option<NaiveDate>,
    value: Option<f64>,
    unit: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
    image_url: Option<String>,
}

/// Assemble a complete [`Snapshot`] from the two API documents. Every
/// required field that is absent fails with its dotted path.
fn build_snapshot(
    user: UserDocument,
    measurements: MeasurementsDocument,
) -> Result<Snapshot, FetchError> {
    let item = user.item.ok_or_else(|| FetchError::missing("item"))?;
    let username = item
        .username
        .ok_or_else(|| FetchError::missing("item.username"))?;
    let profile = item
        .profiles
        .into_iter()
        .next()
        .ok_or_else(|| FetchError::missing("item.profiles.0"))?;

    let sex: Sex = profile
        .sex
        .ok_or_else(|| FetchError::missing("item.profiles.0.sex"))?
        .parse()?;
    let height_in = profile
        .height
        .and_then(|q| q.value)
        .ok_or_else(|| FetchError::missing("item.profiles.0.height.value"))?;
    let birthdate = profile
        .birthdate
        .ok_or_else(|| FetchError::missing("item.profiles.0.birthdate"))?;
    let starting_weight_date = profile
        .starting_weight_date
        .ok_or_else(|| FetchError::missing("item.profiles.0.starting_weight_date"))?;
    let starting_weight_lbs = profile
        .starting_weight
        .and_then(|q| q.value)
        .ok_or_else(|| FetchError::missing("item.profiles.0.starting_weight.value"))?;
    let goal_weight_lbs = item
        .goal_preferences
        .and_then(|g| g.weight_goal)
        .and_then(|q| q.value)
        .ok_or_else(|| FetchError::missing("item.goal_preferences.weight_goal.value"))?;

    let mut entries = Vec::with_capacity(measurements.items.len());
    for (index, m) in measurements.items.into_iter().enumerate() {
        let date = m
            .date
            .ok_or_else(|| FetchError::missing(format!("items.{}.date", index)))?;
        let value = m
            .value
            .ok_or_else(|| FetchError::missing(format!("items.{}.value", index)))?;
        let unit: WeightUnit = m
            .unit
            .ok_or_else(|| FetchError::missing(format!("items.{}.unit", index)))?
            .parse()
            .map_err(|_| FetchError::missing(format!("items.{}.unit", index)))?;
        let kind = m
            .kind
            .ok_or_else(|| FetchError::missing(format!("items.{}.type", index)))?;

        entries.push(Measurement {
            date,
            value,
            unit,
            kind,
            image_url: m.image_url,
        });
    }

    // Oldest first, regardless of how the API ordered them
    entries.sort_by_key(|m| m.date);

    let latest = entries
        .last()
        .ok_or_else(|| FetchError::missing("items.0"))?;
    let (latest_weight_date, latest_weight_lbs) = (latest.date, latest.value);

    Ok(Snapshot {
        username,
        sex,
        height_in,
        birthdate,
        starting_weight_lbs,
        starting_weight_date,
        goal_weight_lbs,
        latest_weight_lbs,
        latest_weight_date,
        measurements: entries,
    })
}
