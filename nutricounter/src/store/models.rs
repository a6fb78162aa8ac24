//! Store models
//!
//! Rust structs representing the per-user remote documents.
//! All models use serde for serialization to the store and frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::config;

/// Opaque identifier of an authenticated user, assigned by the
/// authentication collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserId(String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One logged food entry with macro and micronutrient fields.
///
/// The field shape matches the JSON payload produced by the nutrition
/// estimator. Numeric fields absent from a payload default to 0. All
/// values are grams except `calories` (kcal) and `sodium`, `vitamin_c`,
/// `calcium`, `iron` (mg).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NutrientRecord {
    /// Store-assigned identifier; empty until the record has been stored.
    /// Write paths address records by identifier separately, so an unset
    /// identifier never appears in a payload.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,
    #[serde(default)]
    pub food_name: String,
    #[serde(default)]
    pub portion_size: String,
    #[serde(default)]
    pub calories: f64,
    #[serde(default)]
    pub protein: f64,
    #[serde(default)]
    pub carbohydrates: f64,
    #[serde(default)]
    pub fat: f64,
    #[serde(default)]
    pub fiber: f64,
    #[serde(default)]
    pub sugar: f64,
    #[serde(default)]
    pub sodium: f64,
    #[serde(default)]
    pub vitamin_c: f64,
    #[serde(default)]
    pub calcium: f64,
    #[serde(default)]
    pub iron: f64,
    /// Server-assigned at write time; None until stored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logged_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[default]
    Female,
    Male,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Gender::Female => "female",
            Gender::Male => "male",
        }
    }
}

impl FromStr for Gender {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "female" => Ok(Gender::Female),
            "male" => Ok(Gender::Male),
            other => Err(format!("unknown gender: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityLevel {
    #[default]
    Sedentary,
    Light,
    Moderate,
    Active,
    VeryActive,
}

impl ActivityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityLevel::Sedentary => "sedentary",
            ActivityLevel::Light => "light",
            ActivityLevel::Moderate => "moderate",
            ActivityLevel::Active => "active",
            ActivityLevel::VeryActive => "very_active",
        }
    }
}

impl FromStr for ActivityLevel {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "sedentary" => Ok(ActivityLevel::Sedentary),
            "light" => Ok(ActivityLevel::Light),
            "moderate" => Ok(ActivityLevel::Moderate),
            "active" => Ok(ActivityLevel::Active),
            "very_active" => Ok(ActivityLevel::VeryActive),
            other => Err(format!("unknown activity level: {}", other)),
        }
    }
}

/// What the user wants their weight to do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    Lose,
    #[default]
    Maintain,
    Gain,
}

impl GoalKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            GoalKind::Lose => "lose",
            GoalKind::Maintain => "maintain",
            GoalKind::Gain => "gain",
        }
    }
}

impl FromStr for GoalKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "lose" => Ok(GoalKind::Lose),
            "maintain" => Ok(GoalKind::Maintain),
            "gain" => Ok(GoalKind::Gain),
            other => Err(format!("unknown goal: {}", other)),
        }
    }
}

/// User profile driving BMI and AI goal generation.
///
/// Age, height and weight are kept exactly as the user typed them and
/// parsed on use, so partially filled forms round-trip unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub age: String,
    #[serde(default)]
    pub gender: Gender,
    #[serde(default)]
    pub height_cm: String,
    #[serde(default)]
    pub weight_kg: String,
    #[serde(default)]
    pub activity_level: ActivityLevel,
    #[serde(default)]
    pub goal: GoalKind,
}

impl Profile {
    /// Body-mass index derived from height and weight, rounded to one
    /// decimal. None when either value is missing, unparseable or
    /// non-positive.
    pub fn bmi(&self) -> Option<f64> {
        let height_cm: f64 = self.height_cm.trim().parse().ok()?;
        let weight_kg: f64 = self.weight_kg.trim().parse().ok()?;
        if height_cm <= 0.0 || weight_kg <= 0.0 {
            return None;
        }
        let height_m = height_cm / 100.0;
        Some(((weight_kg / (height_m * height_m)) * 10.0).round() / 10.0)
    }

    /// Whether the fields required for AI goal generation are filled in.
    /// Goal generation is disabled at the boundary until they are.
    pub fn can_generate_goals(&self) -> bool {
        !self.age.trim().is_empty()
            && !self.height_cm.trim().is_empty()
            && !self.weight_kg.trim().is_empty()
    }
}

/// Daily macro targets. Replaced wholesale by manual edits or an AI
/// recommendation, never field-merged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goals {
    pub calories: u32,
    pub protein: u32,
    pub carbs: u32,
    pub fat: u32,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            calories: config::DEFAULT_CALORIE_GOAL,
            protein: config::DEFAULT_PROTEIN_GOAL,
            carbs: config::DEFAULT_CARBS_GOAL,
            fat: config::DEFAULT_FAT_GOAL,
        }
    }
}

/// The per-user document holding everything except the food log.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub profile: Profile,
    #[serde(default)]
    pub goals: Goals,
}
