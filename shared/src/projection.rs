//! Progress projection
//!
//! [`ProgressProjector::project`] is the single entry point of the engine:
//! a pure function from one immutable [`Snapshot`] (plus an injected
//! `today`) to a complete [`ProgressReport`]. Rate-derived fields that
//! cannot be computed are an explicit [`Projection::Undefined`] state,
//! never a NaN or infinity.

use crate::body_metrics::{
    adjust_bmr, bmi, bmr_mifflin_st_jeor, body_fat_bmi_adult, classify_bmi, classify_bmi_risk,
    classify_body_fat, ActivityLevel, BmiClass, BmiRisk, BodyFatClass,
};
use crate::errors::ProjectError;
use crate::snapshot::Snapshot;
use crate::trend::{slope, TrendPoint};
use crate::units::UnitSystem;
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Long date format used by the plain-text rendering.
const DISPLAY_DATE: &str = "%A, %B %-d, %Y";

/// How the daily loss rate is estimated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateStrategy {
    /// Start weight vs latest weight over the elapsed days.
    #[default]
    TwoPoint,
    /// Least-squares slope over the full measurement history; more robust
    /// against noisy weigh-ins but requires a non-degenerate history.
    Regression,
}

/// Why the rate-derived fields are unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UndefinedReason {
    ZeroElapsedDays,
    NoDailyChange,
    MovingAwayFromGoal,
}

impl UndefinedReason {
    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            UndefinedReason::ZeroElapsedDays => {
                "no days elapsed between the starting and latest weigh-in"
            }
            UndefinedReason::NoDailyChange => "no recorded weight change yet",
            UndefinedReason::MovingAwayFromGoal => "recent change is moving away from the goal",
        }
    }
}

/// A BMI value with its classification and risk tier.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BmiReading {
    pub value: f64,
    pub class: BmiClass,
    pub risk: BmiRisk,
}

/// Activity-adjusted daily caloric needs, kcal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalorieNeeds {
    pub sedentary: i64,
    pub active: i64,
    pub very_active: i64,
}

/// An intermediate milestone: a multiple-of-ten weight between the
/// current weight and the goal, with its projected date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub weight: f64,
    pub to_lose: f64,
    pub days_remaining: i64,
    pub days_until: i64,
    pub date: NaiveDate,
    pub bmi: f64,
    pub bmi_class: BmiClass,
    pub risk: BmiRisk,
}

/// The rate-derived half of a report: either a usable projection or an
/// explicit statement of why there is none.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Projection {
    Projected {
        daily_average_lbs: f64,
        days_remaining: i64,
        goal_date: NaiveDate,
        /// Latest weight carried forward at the daily rate to `today`.
        extrapolated_weight_lbs: f64,
        /// Ordered from nearest (highest weight) to closest to goal.
        waypoints: Vec<Waypoint>,
    },
    Undefined {
        reason: UndefinedReason,
    },
}

impl Projection {
    pub fn is_projected(&self) -> bool {
        matches!(self, Projection::Projected { .. })
    }
}

/// The complete derived report for one profile.
///
/// Weight-like fields are rounded to one decimal, BMI to one decimal,
/// BMR/calories/day-counts to integers. Rounding is applied once when the
/// report is shaped; the arithmetic behind it runs at full precision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub username: String,
    pub start_weight_lbs: f64,
    pub current_weight_lbs: f64,
    pub goal_weight_lbs: f64,
    pub start_date: NaiveDate,
    pub days_since_start: i64,
    pub lost_lbs: f64,
    pub to_lose_lbs: f64,
    /// `None` when start and goal coincide and a percentage has no meaning.
    pub lost_percent: Option<f64>,
    pub starting_bmi: BmiReading,
    pub current_bmi: BmiReading,
    pub body_fat_percent: f64,
    pub body_fat_class: BodyFatClass,
    pub bmr: i64,
    pub calories: CalorieNeeds,
    pub days_since_last_weigh_in: i64,
    pub projection: Projection,
}

/// Derives a [`ProgressReport`] from a [`Snapshot`].
///
/// Deterministic and side-effect free; the caller injects `today` so that
/// recomputation is idempotent and testable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProgressProjector {
    strategy: RateStrategy,
}

impl ProgressProjector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(strategy: RateStrategy) -> Self {
        Self { strategy }
    }

    pub fn strategy(&self) -> RateStrategy {
        self.strategy
    }

    /// Derive the full report for one snapshot.
    pub fn project(
        &self,
        snapshot: &Snapshot,
        today: NaiveDate,
    ) -> Result<ProgressReport, ProjectError> {
        let start = snapshot.starting_weight_lbs;
        let latest = snapshot.latest_weight_lbs;
        let goal = snapshot.goal_weight_lbs;

        let days_since_start =
            (snapshot.latest_weight_date - snapshot.starting_weight_date).num_days();
        let days_since_last_weigh_in = (today - snapshot.latest_weight_date).num_days();

        let lost = start - latest;
        let to_lose = latest - goal;

        let daily_average: Result<f64, UndefinedReason> = match self.strategy {
            RateStrategy::TwoPoint => {
                if days_since_start == 0 {
                    Err(UndefinedReason::ZeroElapsedDays)
                } else {
                    Ok(lost / days_since_start as f64)
                }
            }
            RateStrategy::Regression => {
                let points = snapshot.measurements.iter().map(|m| {
                    TrendPoint::new(
                        (m.date - snapshot.starting_weight_date).num_days() as f64,
                        m.value,
                    )
                });
                // The fitted slope is weight change per day; the loss rate
                // is its negation.
                Ok(-slope(points)?)
            }
        };

        let projection = match daily_average {
            Err(reason) => Projection::Undefined { reason },
            Ok(rate) if rate == 0.0 => Projection::Undefined {
                reason: UndefinedReason::NoDailyChange,
            },
            Ok(rate) => {
                let days_remaining = to_lose / rate;
                if days_remaining < 0.0 {
                    Projection::Undefined {
                        reason: UndefinedReason::MovingAwayFromGoal,
                    }
                } else {
                    let days_remaining_rounded = days_remaining.round() as i64;
                    let extrapolated = latest - rate * days_since_last_weigh_in as f64;
                    Projection::Projected {
                        daily_average_lbs: round1(rate),
                        days_remaining: days_remaining_rounded,
                        goal_date: today + Duration::days(days_remaining_rounded),
                        extrapolated_weight_lbs: round1(extrapolated),
                        waypoints: waypoint_ladder(snapshot, rate, days_remaining, today),
                    }
                }
            }
        };

        let age = snapshot.age_on(today);
        let current_bmi_value = bmi(snapshot.height_in, latest, UnitSystem::Imperial);
        let body_fat = body_fat_bmi_adult(current_bmi_value, age, snapshot.sex);
        let bmr = bmr_mifflin_st_jeor(
            snapshot.sex,
            latest,
            snapshot.height_in,
            age,
            UnitSystem::Imperial,
        );

        let lost_percent = if start == goal {
            None
        } else {
            Some(round1(lost / (start - goal) * 100.0))
        };

        Ok(ProgressReport {
            username: snapshot.username.clone(),
            start_weight_lbs: round1(start),
            current_weight_lbs: round1(latest),
            goal_weight_lbs: round1(goal),
            start_date: snapshot.starting_weight_date,
            days_since_start,
            lost_lbs: round1(lost),
            to_lose_lbs: round1(to_lose),
            lost_percent,
            starting_bmi: bmi_reading(snapshot.height_in, start),
            current_bmi: bmi_reading(snapshot.height_in, latest),
            body_fat_percent: round1(body_fat),
            body_fat_class: classify_body_fat(snapshot.sex, body_fat),
            bmr: bmr.round() as i64,
            calories: CalorieNeeds {
                sedentary: adjust_bmr(bmr, ActivityLevel::Sedentary).round() as i64,
                active: adjust_bmr(bmr, ActivityLevel::Active).round() as i64,
                very_active: adjust_bmr(bmr, ActivityLevel::VeryActive).round() as i64,
            },
            days_since_last_weigh_in,
            projection,
        })
    }
}

/// Milestones at every multiple of ten between `floor(latest)` and the
/// goal, nearest first. Only generated once the current weight is within
/// striking distance (`latest > goal - 10`); each retained weight stays
/// strictly above `round(goal)`.
fn waypoint_ladder(
    snapshot: &Snapshot,
    rate: f64,
    days_remaining: f64,
    today: NaiveDate,
) -> Vec<Waypoint> {
    let latest = snapshot.latest_weight_lbs;
    let goal = snapshot.goal_weight_lbs;

    let mut waypoints = Vec::new();
    if latest <= goal - 10.0 {
        return waypoints;
    }

    let mut weight = latest.floor() as i64;
    let stop = goal.round() as i64;
    while weight > stop {
        if weight % 10 == 0 {
            let to_lose = weight as f64 - goal;
            let days_left = (to_lose / rate).round() as i64;
            let days_until = (days_remaining - days_left as f64).round() as i64;
            let bmi_value = bmi(snapshot.height_in, weight as f64, UnitSystem::Imperial);

            waypoints.push(Waypoint {
                weight: weight as f64,
                to_lose: round1(to_lose),
                days_remaining: days_left,
                days_until,
                date: today + Duration::days(days_until),
                bmi: round1(bmi_value),
                bmi_class: classify_bmi(bmi_value),
                risk: classify_bmi_risk(bmi_value),
            });
        }
        weight -= 1;
    }

    waypoints
}

fn bmi_reading(height_in: f64, weight_lbs: f64) -> BmiReading {
    let value = bmi(height_in, weight_lbs, UnitSystem::Imperial);
    BmiReading {
        value: round1(value),
        class: classify_bmi(value),
        risk: classify_bmi_risk(value),
    }
}

/// Presentation rounding to one decimal place.
fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

impl fmt::Display for ProgressReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Weight loss stats")?;
        writeln!(f)?;
        writeln!(f, "MFP username: {}", self.username)?;
        writeln!(f, "Starting weight: {} lbs", self.start_weight_lbs)?;
        writeln!(
            f,
            "Starting date: {} ({} days ago)",
            self.start_date.format(DISPLAY_DATE),
            self.days_since_start
        )?;
        writeln!(
            f,
            "Lost so far: {} lbs (currently at {} lbs)",
            self.lost_lbs, self.current_weight_lbs
        )?;
        writeln!(f, "Goal weight: {} lbs", self.goal_weight_lbs)?;
        match self.lost_percent {
            Some(percent) => writeln!(f, "Progress: {}%", percent)?,
            None => writeln!(f, "Progress: n/a")?,
        }
        writeln!(
            f,
            "Current BMI: {} ({})",
            self.current_bmi.value,
            self.current_bmi.class.description()
        )?;
        writeln!(
            f,
            "BMR: {} kcal (daily need: {} sedentary / {} active / {} very active)",
            self.bmr, self.calories.sedentary, self.calories.active, self.calories.very_active
        )?;

        match &self.projection {
            Projection::Projected {
                daily_average_lbs,
                days_remaining,
                goal_date,
                extrapolated_weight_lbs,
                waypoints,
            } => {
                writeln!(f, "Average daily loss: {} lbs", daily_average_lbs)?;
                writeln!(
                    f,
                    "Estimated current weight: {} lbs ({} days since last weigh-in)",
                    extrapolated_weight_lbs, self.days_since_last_weigh_in
                )?;
                write!(
                    f,
                    "Estimated success date: {} ({} days remaining)",
                    goal_date.format(DISPLAY_DATE),
                    days_remaining
                )?;

                if !waypoints.is_empty() {
                    write!(f, "\n\nWaypoints\n")?;
                    for wp in waypoints {
                        write!(f, "\n[{} lbs] {}", wp.weight, wp.date.format(DISPLAY_DATE))?;
                    }
                }
            }
            Projection::Undefined { reason } => {
                write!(f, "Projection unavailable: {}", reason.description())?;
            }
        }

        Ok(())
    }
}
