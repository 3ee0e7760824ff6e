//! Raw per-profile data as retrieved from the upstream service
//!
//! A [`Snapshot`] is immutable once built: the fetch client assembles a
//! complete one from API responses and the registry replaces the previous
//! snapshot wholesale. The engine only ever reads it.

use crate::errors::UnsupportedSexError;
use crate::units::WeightUnit;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Biological sex as reported by the upstream service.
///
/// The wire value is `"m"` or `"f"`; anything else fails at parse time
/// rather than becoming a sentinel deep inside the formulas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Sex {
    #[serde(rename = "m")]
    Male,
    #[serde(rename = "f")]
    Female,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Sex::Male => "m",
            Sex::Female => "f",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Sex {
    type Err = UnsupportedSexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "m" => Ok(Sex::Male),
            "f" => Ok(Sex::Female),
            other => Err(UnsupportedSexError(other.to_string())),
        }
    }
}

/// One weight reading from the measurement history.
///
/// Has no identity beyond its position in the ordered sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub date: NaiveDate,
    pub value: f64,
    pub unit: WeightUnit,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// Latest raw data for one profile, replaced wholesale on each
/// successful fetch. All weights are in pounds and heights in inches.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    pub username: String,
    pub sex: Sex,
    pub height_in: f64,
    pub birthdate: NaiveDate,
    pub starting_weight_lbs: f64,
    pub starting_weight_date: NaiveDate,
    pub goal_weight_lbs: f64,
    pub latest_weight_lbs: f64,
    pub latest_weight_date: NaiveDate,
    /// Chronological, oldest first; possibly empty.
    #[serde(default)]
    pub measurements: Vec<Measurement>,
}

impl Snapshot {
    /// Whole years between the birthdate and `today`.
    pub fn age_on(&self, today: NaiveDate) -> i32 {
        today.years_since(self.birthdate).unwrap_or(0) as i32
    }
}
