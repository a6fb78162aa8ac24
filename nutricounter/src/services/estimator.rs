//! Nutrition estimator
//!
//! Turns a free-text food description into a candidate record via the
//! inference endpoint. The reply is prose-tolerant: the first balanced
//! JSON object in the generated text is taken as the payload.

use crate::ai::{first_json_object, InferenceClient};
use crate::error::{AppError, Result};
use crate::store::models::NutrientRecord;

/// Shown when the analysis call itself fails (network, HTTP status).
pub const ANALYSIS_FAILED_MESSAGE: &str =
    "Failed to analyze food. Please check your API key and try again.";

/// Shown when the reply arrived but carried no parseable nutrition data.
pub const ANALYSIS_PARSE_MESSAGE: &str =
    "Could not parse nutrition data from the AI response.";

/// Client for the text-to-nutrition inference call.
pub struct NutritionEstimator {
    client: InferenceClient,
}

impl NutritionEstimator {
    pub fn new(client: InferenceClient) -> Self {
        Self { client }
    }

    /// Analyze one food description.
    ///
    /// Callers guard against empty input and concurrent calls; this
    /// issues exactly one request and never returns a partial result.
    pub async fn analyze(&self, food_input: &str) -> Result<NutrientRecord> {
        let text = self.client.generate(&Self::prompt(food_input)).await?;

        let object = first_json_object(&text).ok_or_else(|| {
            AppError::ParseResponse("no JSON object in nutrition reply".to_string())
        })?;

        let record: NutrientRecord = serde_json::from_str(object)
            .map_err(|e| AppError::ParseResponse(format!("malformed nutrition object: {}", e)))?;

        tracing::debug!(
            "Estimated nutrition for {:?}: {} kcal",
            record.food_name,
            record.calories
        );

        Ok(record)
    }

    /// Map an analysis failure to its user-facing message.
    pub fn failure_message(error: &AppError) -> &'static str {
        if error.is_parse_failure() {
            ANALYSIS_PARSE_MESSAGE
        } else {
            ANALYSIS_FAILED_MESSAGE
        }
    }

    fn prompt(food_input: &str) -> String {
        format!(
            r#"Analyze the nutrition content of: "{}".

Please provide a detailed breakdown in the following JSON format only (no other text):
{{
  "food_name": "name of the food",
  "portion_size": "portion size",
  "calories": number,
  "protein": number,
  "carbohydrates": number,
  "fat": number,
  "fiber": number,
  "sugar": number,
  "sodium": number,
  "vitamin_c": number,
  "calcium": number,
  "iron": number
}}

All nutrients should be in grams except calories (kcal), sodium (mg), vitamin_c (mg), calcium (mg), and iron (mg). Provide realistic estimates based on standard nutrition databases."#,
            food_input
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_string_contains, method};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn reply(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [
                { "content": { "role": "model", "parts": [ { "text": text } ] } }
            ]
        })
    }

    fn estimator_for(server: &MockServer) -> NutritionEstimator {
        NutritionEstimator::new(InferenceClient::new("test-key").with_base_url(server.uri()))
    }

    #[tokio::test]
    async fn parses_the_embedded_nutrition_object() {
        let server = MockServer::start().await;
        let generated = concat!(
            "Here is the breakdown you asked for:\n",
            r#"{"food_name":"white rice, cooked","portion_size":"1 cup","calories":206,"#,
            r#""protein":4.3,"carbohydrates":44.5,"fat":0.4,"fiber":0.6,"sugar":0.1,"#,
            r#""sodium":1.6,"vitamin_c":0,"calcium":16,"iron":1.9}"#,
            "\nEnjoy your meal!"
        );
        Mock::given(method("POST"))
            .and(body_string_contains("1 cup of rice"))
            .respond_with(ResponseTemplate::new(200).set_body_json(reply(generated)))
            .mount(&server)
            .await;

        let estimator = estimator_for(&server);
        let record = estimator.analyze("1 cup of rice").await.unwrap();

        assert_eq!(record.calories, 206.0);
        assert_eq!(record.food_name, "white rice, cooked");
        assert_eq!(record.portion_size, "1 cup");
        assert!(record.id.is_empty());
    }

    #[tokio::test]
    async fn reply_without_json_object_is_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(reply("I cannot estimate that, sorry.")),
            )
            .mount(&server)
            .await;

        let estimator = estimator_for(&server);
        let err = estimator.analyze("1 cup of rice").await.unwrap_err();

        assert!(err.is_parse_failure());
        assert_eq!(
            NutritionEstimator::failure_message(&err),
            ANALYSIS_PARSE_MESSAGE
        );
    }

    #[tokio::test]
    async fn malformed_object_is_the_same_parse_class() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(reply(r#"{"calories": "lots of"#)),
            )
            .mount(&server)
            .await;

        let estimator = estimator_for(&server);
        let err = estimator.analyze("mystery stew").await.unwrap_err();
        assert!(err.is_parse_failure());
    }

    #[tokio::test]
    async fn http_failure_maps_to_the_analysis_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400))
            .mount(&server)
            .await;

        let estimator = estimator_for(&server);
        let err = estimator.analyze("1 cup of rice").await.unwrap_err();

        assert_eq!(
            NutritionEstimator::failure_message(&err),
            ANALYSIS_FAILED_MESSAGE
        );
    }
}
