//! AI goal generation
//!
//! Derives daily macro targets from the user's profile via the inference
//! endpoint. The recommendation replaces the goals wholesale; persisting
//! it alongside the profile is the session's job.

use serde::Deserialize;

use crate::ai::{first_json_object, InferenceClient};
use crate::error::{AppError, Result};
use crate::store::models::{Goals, Profile};

/// Shown when the generation call itself fails (network, HTTP status).
pub const GOALS_FAILED_MESSAGE: &str =
    "Failed to generate goals. Please check your inputs and API key.";

/// Shown when the reply arrived but carried no parseable goals.
pub const GOALS_PARSE_MESSAGE: &str = "Could not parse goals from the AI response.";

/// The recommendation as the model returns it; values may be fractional
/// and are rounded before use.
#[derive(Debug, Deserialize)]
struct RecommendedGoals {
    #[serde(default)]
    calories: f64,
    #[serde(default)]
    protein: f64,
    #[serde(default)]
    carbs: f64,
    #[serde(default)]
    fat: f64,
}

/// Client for the profile-to-goals inference call.
pub struct GoalGenerator {
    client: InferenceClient,
}

impl GoalGenerator {
    pub fn new(client: InferenceClient) -> Self {
        Self { client }
    }

    /// Generate recommended daily goals for `profile`.
    ///
    /// Callers only invoke this once age, height and weight are filled
    /// in; the boundary is a disabled control, not an error here.
    pub async fn generate(&self, profile: &Profile) -> Result<Goals> {
        let text = self.client.generate(&Self::prompt(profile)).await?;

        let object = first_json_object(&text)
            .ok_or_else(|| AppError::ParseResponse("no JSON object in goals reply".to_string()))?;

        let recommended: RecommendedGoals = serde_json::from_str(object)
            .map_err(|e| AppError::ParseResponse(format!("malformed goals object: {}", e)))?;

        let goals = Goals {
            calories: round_goal(recommended.calories),
            protein: round_goal(recommended.protein),
            carbs: round_goal(recommended.carbs),
            fat: round_goal(recommended.fat),
        };

        tracing::debug!(
            "Generated goals: {} kcal / {}g protein / {}g carbs / {}g fat",
            goals.calories,
            goals.protein,
            goals.carbs,
            goals.fat
        );

        Ok(goals)
    }

    /// Map a generation failure to its user-facing message.
    pub fn failure_message(error: &AppError) -> &'static str {
        if error.is_parse_failure() {
            GOALS_PARSE_MESSAGE
        } else {
            GOALS_FAILED_MESSAGE
        }
    }

    fn prompt(profile: &Profile) -> String {
        format!(
            r#"Act as an expert nutritionist. Based on the following user data, calculate their daily nutritional needs.
User Data:
- Age: {}
- Gender: {}
- Height: {} cm
- Weight: {} kg
- Activity Level: {} (options: sedentary, light, moderate, active, very_active)
- Primary Goal: {} weight (options: maintain, lose, gain)

Please provide a recommended daily intake for calories, protein (g), carbs (g), and fat (g).
Return the response ONLY in the following strict JSON format. Do not include any other text, explanations, or markdown formatting.

{{
  "calories": number,
  "protein": number,
  "carbs": number,
  "fat": number
}}"#,
            profile.age,
            profile.gender.as_str(),
            profile.height_cm,
            profile.weight_kg,
            profile.activity_level.as_str(),
            profile.goal.as_str()
        )
    }
}

/// Round to the nearest whole unit; targets are non-negative integers.
fn round_goal(value: f64) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}
