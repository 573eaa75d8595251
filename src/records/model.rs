//! Daily fitness record schema.
//!
//! Field sets drifted between client revisions, so every nested field falls
//! back to its default when missing and unknown top-level fields are carried
//! through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One day of tracked nutrition and exercise, keyed by `date`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitnessRecord {
    /// ISO date (`YYYY-MM-DD`).
    pub date: String,

    #[serde(default)]
    pub user_profile: UserProfile,

    #[serde(default)]
    pub food_diary: Vec<FoodItem>,

    #[serde(default)]
    pub exercise_summary: ExerciseSummary,

    #[serde(default)]
    pub daily_total_stats: DailyTotalStats,

    #[serde(default)]
    pub ai_evaluation: AiEvaluation,

    /// Fields this schema does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl FitnessRecord {
    /// Create an empty record for the given date.
    pub fn new(date: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            user_profile: UserProfile::default(),
            food_diary: Vec::new(),
            exercise_summary: ExerciseSummary::default(),
            daily_total_stats: DailyTotalStats::default(),
            ai_evaluation: AiEvaluation::default(),
            extra: Map::new(),
        }
    }
}

/// Body metrics and calorie goals at the time of the record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub age: u32,
    pub weight_kg: f64,
    pub height_cm: f64,
    pub bmr_kcal: i32,
    pub tdee_maintenance_kcal: i32,
    pub target_lose_weight_kcal: i32,
    pub target_protein_g: i32,
    pub goal_calories: i32,
    pub maintenance_protein_target_g: i32,
}

/// A single food diary line.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoodItem {
    /// Free-form time of day, e.g. `"08:30"`.
    pub time: String,
    pub item: String,
    pub calories: i32,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseSummary {
    pub total_burned_calories: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cardio: Vec<ExerciseSession>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub strength: Vec<ExerciseSession>,
}

/// A cardio or strength session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExerciseSession {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_min: Option<u32>,

    pub calories_burned: i32,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
}

/// Aggregates computed by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DailyTotalStats {
    pub total_intake_calories: i32,
    pub total_burned_calories: i32,
    pub net_calories: i32,
    pub total_protein_g: f64,
    pub total_carbs_g: f64,
    pub total_fat_g: f64,
    pub protein_per_kg: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiEvaluation {
    pub muscle_maintenance: String,
    pub weight_loss_status: String,
    pub recommendation: String,
}
