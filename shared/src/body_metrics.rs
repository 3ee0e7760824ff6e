//! Body composition and energy calculations
//!
//! BMI with classification and risk tier, Mifflin-St Jeor basal metabolic
//! rate, activity-adjusted caloric needs, and body-fat estimators.
//!
//! # Design Principles
//!
//! 1. **Pure Functions**: All calculations are pure, no side effects
//! 2. **Evidence-Based**: Formulas from peer-reviewed research
//! 3. **Units First**: Conversion happens before a formula runs, never after

use crate::errors::BodyMetricsError;
use crate::snapshot::Sex;
use crate::units::{cm_to_inches, inches_to_cm, lbs_to_kg, UnitSystem};
use serde::{Deserialize, Serialize};

// ============================================================================
// BMI
// ============================================================================

/// BMI classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiClass {
    Underweight,
    Normal,
    Overweight,
    ObeseClass1,
    ObeseClass2,
    ObeseClass3,
}

impl BmiClass {
    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            BmiClass::Underweight => "underweight",
            BmiClass::Normal => "normal",
            BmiClass::Overweight => "overweight",
            BmiClass::ObeseClass1 => "obese I",
            BmiClass::ObeseClass2 => "obese II",
            BmiClass::ObeseClass3 => "obese III",
        }
    }
}

/// Health risk tier mirroring the BMI thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BmiRisk {
    Low,
    Moderate,
    High,
    VeryHigh,
    ExtremelyHigh,
}

impl BmiRisk {
    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            BmiRisk::Low => "low",
            BmiRisk::Moderate => "moderate",
            BmiRisk::High => "high",
            BmiRisk::VeryHigh => "very high",
            BmiRisk::ExtremelyHigh => "extremely high",
        }
    }

    /// The obesity class paired with this risk tier, if any
    pub fn obesity_class(&self) -> Option<BmiClass> {
        match self {
            BmiRisk::Low | BmiRisk::Moderate => None,
            BmiRisk::High => Some(BmiClass::ObeseClass1),
            BmiRisk::VeryHigh => Some(BmiClass::ObeseClass2),
            BmiRisk::ExtremelyHigh => Some(BmiClass::ObeseClass3),
        }
    }
}

/// Calculate BMI from height and weight
///
/// Formula: BMI = weight(kg) / height(m)²
///
/// Imperial inputs (inches, pounds) are converted internally.
pub fn bmi(height: f64, weight: f64, units: UnitSystem) -> f64 {
    let (weight_kg, height_cm) = match units {
        UnitSystem::Imperial => (lbs_to_kg(weight), inches_to_cm(height)),
        UnitSystem::Metric => (weight, height),
    };

    let height_m = height_cm / 100.0;
    weight_kg / (height_m * height_m)
}

/// Classify BMI into category
pub fn classify_bmi(bmi: f64) -> BmiClass {
    if bmi <= 18.5 {
        BmiClass::Underweight
    } else if bmi < 25.0 {
        BmiClass::Normal
    } else if bmi < 30.0 {
        BmiClass::Overweight
    } else if bmi < 35.0 {
        BmiClass::ObeseClass1
    } else if bmi < 40.0 {
        BmiClass::ObeseClass2
    } else {
        BmiClass::ObeseClass3
    }
}

/// Classify BMI into risk tier
pub fn classify_bmi_risk(bmi: f64) -> BmiRisk {
    if bmi < 25.0 {
        BmiRisk::Low
    } else if bmi < 30.0 {
        BmiRisk::Moderate
    } else if bmi < 35.0 {
        BmiRisk::High
    } else if bmi < 40.0 {
        BmiRisk::VeryHigh
    } else {
        BmiRisk::ExtremelyHigh
    }
}

// ============================================================================
// BMR and Caloric Needs
// ============================================================================

/// Activity level for caloric-need adjustment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    /// Little or no exercise
    #[default]
    Sedentary,
    /// Regular exercise a few days a week
    Active,
    /// Hard exercise most days
    VeryActive,
}

impl ActivityLevel {
    /// Get the activity multiplier applied to BMR
    pub fn multiplier(&self) -> f64 {
        match self {
            ActivityLevel::Sedentary => 1.3,
            ActivityLevel::Active => 1.5,
            ActivityLevel::VeryActive => 1.7,
        }
    }
}

/// Calculate Basal Metabolic Rate using the Mifflin-St Jeor equation
///
/// Men: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) + 5
/// Women: BMR = 10 × weight(kg) + 6.25 × height(cm) - 5 × age(y) - 161
pub fn bmr_mifflin_st_jeor(sex: Sex, weight: f64, height: f64, age: i32, units: UnitSystem) -> f64 {
    let (weight_kg, height_cm) = match units {
        UnitSystem::Imperial => (lbs_to_kg(weight), inches_to_cm(height)),
        UnitSystem::Metric => (weight, height),
    };

    let base = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * age as f64;
    match sex {
        Sex::Male => base + 5.0,
        Sex::Female => base - 161.0,
    }
}

/// Adjust BMR for an activity level
pub fn adjust_bmr(bmr: f64, activity: ActivityLevel) -> f64 {
    bmr * activity.multiplier()
}

// ============================================================================
// Body Fat Estimation
// ============================================================================

/// Body fat percentage via the US Navy circumference method
///
/// Girths are in the same unit system as the height. `hip` is required
/// for females and ignored for males.
pub fn body_fat_navy(
    sex: Sex,
    height: f64,
    neck: f64,
    abdomen: f64,
    hip: Option<f64>,
    units: UnitSystem,
) -> Result<f64, BodyMetricsError> {
    // The published coefficients expect inches
    let convert = |v: f64| match units {
        UnitSystem::Imperial => v,
        UnitSystem::Metric => cm_to_inches(v),
    };
    let height = convert(height);
    let neck = convert(neck);
    let abdomen = convert(abdomen);

    match sex {
        Sex::Male => {
            Ok(86.010 * (abdomen - neck).log10() - 70.041 * height.log10() + 36.76)
        }
        Sex::Female => {
            let hip = convert(hip.ok_or(BodyMetricsError::MissingHip)?);
            Ok(163.205 * (abdomen + hip - neck).log10() - 97.684 * height.log10() - 78.387)
        }
    }
}

/// Estimate adult body fat percentage from BMI
///
/// Formula: BF% = 1.20 × BMI + 0.23 × age - 10.8 × sex - 5.4
/// where sex = 1 for male, 0 for female
pub fn body_fat_bmi_adult(bmi: f64, age: i32, sex: Sex) -> f64 {
    let sex_factor = match sex {
        Sex::Male => 1.0,
        Sex::Female => 0.0,
    };
    1.20 * bmi + 0.23 * age as f64 - 10.8 * sex_factor - 5.4
}

/// Estimate child body fat percentage from BMI
pub fn body_fat_bmi_child(bmi: f64, age: i32, sex: Sex) -> f64 {
    let sex_factor = match sex {
        Sex::Male => 1.0,
        Sex::Female => 0.0,
    };
    1.51 * bmi - 0.70 * age as f64 - 3.6 * sex_factor + 1.4
}

/// Body fat classification band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyFatClass {
    Dangerous,
    Essential,
    Athlete,
    Fitness,
    Average,
    Obese,
}

impl BodyFatClass {
    /// Get a human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            BodyFatClass::Dangerous => "dangerously low",
            BodyFatClass::Essential => "essential fat",
            BodyFatClass::Athlete => "athlete",
            BodyFatClass::Fitness => "fitness",
            BodyFatClass::Average => "average",
            BodyFatClass::Obese => "obese",
        }
    }
}

/// Classify a body fat percentage; bands differ by sex
pub fn classify_body_fat(sex: Sex, percent: f64) -> BodyFatClass {
    match sex {
        Sex::Male => {
            if percent < 2.0 {
                BodyFatClass::Dangerous
            } else if percent < 6.0 {
                BodyFatClass::Essential
            } else if percent < 14.0 {
                BodyFatClass::Athlete
            } else if percent < 18.0 {
                BodyFatClass::Fitness
            } else if percent < 25.0 {
                BodyFatClass::Average
            } else {
                BodyFatClass::Obese
            }
        }
        Sex::Female => {
            if percent < 10.0 {
                BodyFatClass::Dangerous
            } else if percent < 14.0 {
                BodyFatClass::Essential
            } else if percent < 21.0 {
                BodyFatClass::Athlete
            } else if percent < 25.0 {
                BodyFatClass::Fitness
            } else if percent < 32.0 {
                BodyFatClass::Average
            } else {
                BodyFatClass::Obese
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    #[test]
    fn test_bmi_imperial() {
        // 70 in, 154 lbs -> BMI ~22.1
        let value = bmi(70.0, 154.0, UnitSystem::Imperial);
        assert!((value - 22.1).abs() < 0.1, "got {}", value);
        assert_eq!(classify_bmi(value), BmiClass::Normal);
    }

    #[test]
    fn test_bmi_metric() {
        // 70kg, 175cm -> BMI ~22.86
        let value = bmi(175.0, 70.0, UnitSystem::Metric);
        assert!((value - 22.86).abs() < 0.1);
    }

    #[rstest]
    #[case(18.5, BmiClass::Underweight)]
    #[case(18.6, BmiClass::Normal)]
    #[case(24.9, BmiClass::Normal)]
    #[case(29.9, BmiClass::Overweight)]
    #[case(30.0, BmiClass::ObeseClass1)]
    #[case(34.9, BmiClass::ObeseClass1)]
    #[case(35.0, BmiClass::ObeseClass2)]
    #[case(40.0, BmiClass::ObeseClass3)]
    fn test_bmi_class_boundaries(#[case] bmi: f64, #[case] expected: BmiClass) {
        assert_eq!(classify_bmi(bmi), expected);
    }

    #[rstest]
    #[case(22.0, BmiRisk::Low)]
    #[case(27.0, BmiRisk::Moderate)]
    #[case(32.0, BmiRisk::High)]
    #[case(37.0, BmiRisk::VeryHigh)]
    #[case(42.0, BmiRisk::ExtremelyHigh)]
    fn test_bmi_risk_tiers(#[case] bmi: f64, #[case] expected: BmiRisk) {
        assert_eq!(classify_bmi_risk(bmi), expected);
    }

    #[test]
    fn test_risk_pairs_with_obesity_class() {
        assert_eq!(BmiRisk::Low.obesity_class(), None);
        assert_eq!(BmiRisk::High.obesity_class(), Some(BmiClass::ObeseClass1));
        assert_eq!(
            BmiRisk::ExtremelyHigh.obesity_class(),
            Some(BmiClass::ObeseClass3)
        );
    }

    #[test]
    fn test_bmr_mifflin_closed_form() {
        // 180 lbs, 70 in, age 30
        let weight_kg = lbs_to_kg(180.0);
        let height_cm = inches_to_cm(70.0);

        let male = bmr_mifflin_st_jeor(Sex::Male, 180.0, 70.0, 30, UnitSystem::Imperial);
        let expected_male = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * 30.0 + 5.0;
        assert!((male - expected_male).abs() < 1e-9);

        let female = bmr_mifflin_st_jeor(Sex::Female, 180.0, 70.0, 30, UnitSystem::Imperial);
        let expected_female = 10.0 * weight_kg + 6.25 * height_cm - 5.0 * 30.0 - 161.0;
        assert!((female - expected_female).abs() < 1e-9);
    }

    #[test]
    fn test_adjust_bmr() {
        assert_eq!(adjust_bmr(2000.0, ActivityLevel::Sedentary), 2600.0);
        assert_eq!(adjust_bmr(2000.0, ActivityLevel::Active), 3000.0);
        assert_eq!(adjust_bmr(2000.0, ActivityLevel::VeryActive), 3400.0);
    }

    #[test]
    fn test_body_fat_navy_male() {
        // 70 in tall, 15 in neck, 36 in abdomen
        let bf = body_fat_navy(Sex::Male, 70.0, 15.0, 36.0, None, UnitSystem::Imperial).unwrap();
        let expected = 86.010 * (36.0f64 - 15.0).log10() - 70.041 * 70.0f64.log10() + 36.76;
        assert!((bf - expected).abs() < 1e-9);
    }

    #[test]
    fn test_body_fat_navy_female_requires_hip() {
        let err =
            body_fat_navy(Sex::Female, 65.0, 13.0, 30.0, None, UnitSystem::Imperial).unwrap_err();
        assert_eq!(err, BodyMetricsError::MissingHip);

        let bf = body_fat_navy(Sex::Female, 65.0, 13.0, 30.0, Some(38.0), UnitSystem::Imperial)
            .unwrap();
        assert!(bf > 0.0 && bf < 60.0);
    }

    #[test]
    fn test_body_fat_navy_metric_matches_imperial() {
        let imperial =
            body_fat_navy(Sex::Male, 70.0, 15.0, 36.0, None, UnitSystem::Imperial).unwrap();
        let metric = body_fat_navy(
            Sex::Male,
            inches_to_cm(70.0),
            inches_to_cm(15.0),
            inches_to_cm(36.0),
            None,
            UnitSystem::Metric,
        )
        .unwrap();
        assert!((imperial - metric).abs() < 1e-9);
    }

    #[rstest]
    #[case(Sex::Male, 10.0, BodyFatClass::Athlete)]
    #[case(Sex::Male, 20.0, BodyFatClass::Average)]
    #[case(Sex::Male, 26.0, BodyFatClass::Obese)]
    #[case(Sex::Female, 20.0, BodyFatClass::Athlete)]
    #[case(Sex::Female, 28.0, BodyFatClass::Average)]
    #[case(Sex::Female, 9.0, BodyFatClass::Dangerous)]
    fn test_body_fat_classification(
        #[case] sex: Sex,
        #[case] percent: f64,
        #[case] expected: BodyFatClass,
    ) {
        assert_eq!(classify_body_fat(sex, percent), expected);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        /// Property: BMI is always positive for valid inputs
        #[test]
        fn prop_bmi_positive(weight in 45.0f64..1100.0, height in 40.0f64..100.0) {
            prop_assert!(bmi(height, weight, UnitSystem::Imperial) > 0.0);
        }

        /// Property: Heavier weight = higher BMI (same height)
        #[test]
        fn prop_bmi_increases_with_weight(
            weight1 in 100.0f64..200.0,
            weight2 in 200.0f64..300.0,
            height in 55.0f64..80.0
        ) {
            let bmi1 = bmi(height, weight1, UnitSystem::Imperial);
            let bmi2 = bmi(height, weight2, UnitSystem::Imperial);
            prop_assert!(bmi2 > bmi1);
        }

        /// Property: Male BMR > Female BMR (same stats)
        #[test]
        fn prop_male_bmr_higher(
            weight in 100.0f64..250.0,
            height in 55.0f64..80.0,
            age in 18i32..80
        ) {
            let male = bmr_mifflin_st_jeor(Sex::Male, weight, height, age, UnitSystem::Imperial);
            let female = bmr_mifflin_st_jeor(Sex::Female, weight, height, age, UnitSystem::Imperial);
            prop_assert!(male > female);
        }

        /// Property: adjusted calories always exceed BMR
        #[test]
        fn prop_adjusted_exceeds_bmr(bmr in 800.0f64..3000.0) {
            prop_assert!(adjust_bmr(bmr, ActivityLevel::Sedentary) > bmr);
            prop_assert!(adjust_bmr(bmr, ActivityLevel::VeryActive)
                > adjust_bmr(bmr, ActivityLevel::Sedentary));
        }
    }
}
