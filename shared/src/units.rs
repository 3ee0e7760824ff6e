//! Unit conversion module
//!
//! Weight data from the upstream service arrives in pounds and heights in
//! inches; the body-metric formulas want kilograms and centimeters. This
//! module provides type-safe unit handling with explicit conversion.
//!
//! # Design Principles
//!
//! 1. **Type Safety**: Units are explicit in types, not just f64
//! 2. **Conversion at Boundaries**: Convert inside the formulas, not in
//!    business logic
//! 3. **Pure Arithmetic**: No failure modes; non-numeric input (NaN)
//!    passes through

use serde::{Deserialize, Serialize};
use std::fmt;

/// Centimeters per inch.
pub const CM_PER_INCH: f64 = 2.54;

/// Pounds per kilogram.
pub const LBS_PER_KG: f64 = 2.2046;

/// Convert inches to centimeters.
pub fn inches_to_cm(inches: f64) -> f64 {
    inches * CM_PER_INCH
}

/// Convert a feet-and-inches height to centimeters.
pub fn feet_inches_to_cm(feet: f64, inches: f64) -> f64 {
    inches_to_cm(feet * 12.0 + inches)
}

/// Convert centimeters to inches.
pub fn cm_to_inches(cm: f64) -> f64 {
    cm / CM_PER_INCH
}

/// Convert pounds to kilograms.
pub fn lbs_to_kg(lbs: f64) -> f64 {
    lbs / LBS_PER_KG
}

/// Convert kilograms to pounds.
pub fn kg_to_lbs(kg: f64) -> f64 {
    kg * LBS_PER_KG
}

// ============================================================================
// Unit System
// ============================================================================

/// Which system a set of raw measurements is expressed in.
///
/// The upstream service reports imperial values, so that is the default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Imperial,
    Metric,
}

// ============================================================================
// Weight Units
// ============================================================================

/// Weight unit attached to a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Lbs,
    Kg,
}

impl WeightUnit {
    /// Convert from this unit to kilograms
    pub fn to_kg(&self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lbs => lbs_to_kg(value),
        }
    }

    /// Convert from kilograms to this unit
    pub fn from_kg(&self, kg: f64) -> f64 {
        match self {
            WeightUnit::Kg => kg,
            WeightUnit::Lbs => kg_to_lbs(kg),
        }
    }

    /// Get the unit abbreviation
    pub fn abbreviation(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lbs => "lbs",
        }
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl std::str::FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "kg" | "kilogram" | "kilograms" => Ok(WeightUnit::Kg),
            "lbs" | "lb" | "pound" | "pounds" => Ok(WeightUnit::Lbs),
            _ => Err(format!("Unknown weight unit: {}", s)),
        }
    }
}

// ============================================================================
// Height Units
// ============================================================================

/// Height unit attached to a measurement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeightUnit {
    #[default]
    Inches,
    /// Stored as total inches
    FeetInches,
    Cm,
}

impl HeightUnit {
    /// Convert from this unit to centimeters
    pub fn to_cm(&self, value: f64) -> f64 {
        match self {
            HeightUnit::Cm => value,
            HeightUnit::Inches | HeightUnit::FeetInches => inches_to_cm(value),
        }
    }

    /// Convert from centimeters to this unit
    pub fn from_cm(&self, cm: f64) -> f64 {
        match self {
            HeightUnit::Cm => cm,
            HeightUnit::Inches | HeightUnit::FeetInches => cm_to_inches(cm),
        }
    }

    /// Get the unit abbreviation
    pub fn abbreviation(&self) -> &'static str {
        match self {
            HeightUnit::Cm => "cm",
            HeightUnit::Inches => "in",
            HeightUnit::FeetInches => "ft/in",
        }
    }
}

impl fmt::Display for HeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

impl std::str::FromStr for HeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cm" | "centimeter" | "centimeters" => Ok(HeightUnit::Cm),
            "in" | "inch" | "inches" => Ok(HeightUnit::Inches),
            "ft" | "feet" | "ft/in" | "feet/inches" => Ok(HeightUnit::FeetInches),
            _ => Err(format!("Unknown height unit: {}", s)),
        }
    }
}
