//! Integration tests for the NutriCounter core
//!
//! These tests verify end-to-end functionality including:
//! - Estimate, confirm and log reconciliation through live snapshots
//! - Edit and delete round-trips against the store
//! - Subscription teardown on logout
//! - Profile/goal persistence and the overview export

use std::sync::Arc;

use nutricounter::ai::InferenceClient;
use nutricounter::editor::NutrientField;
use nutricounter::services::estimator::ANALYSIS_PARSE_MESSAGE;
use nutricounter::services::Session;
use nutricounter::state::{MacroField, ProfileField};
use nutricounter::store::{MemoryStore, NutrientRecord, UserId, UserStore};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn reply(text: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [
            { "content": { "role": "model", "parts": [ { "text": text } ] } }
        ]
    })
}

fn rice_payload() -> &'static str {
    concat!(
        r#"{"food_name":"white rice, cooked","portion_size":"1 cup","calories":206,"#,
        r#""protein":4.3,"carbohydrates":44.5,"fat":0.4,"fiber":0.6,"sugar":0.1,"#,
        r#""sodium":1.6,"vitamin_c":0,"calcium":16,"iron":1.9}"#
    )
}

async fn login(store: &Arc<MemoryStore>, endpoint: &str) -> Session {
    let store: Arc<dyn UserStore> = store.clone();
    let inference = InferenceClient::new("test-key").with_base_url(endpoint);
    Session::login(store, inference, UserId::new("user-1")).await
}

#[tokio::test]
async fn estimate_confirm_and_reconcile_through_snapshot() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(rice_payload())))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let mut session = login(&store, &server.uri()).await;

    assert!(session.state().daily_log.is_empty());

    session.analyze_food("1 cup of rice").await;
    let estimate = session.state().estimate.as_ref().expect("estimate staged");
    assert_eq!(estimate.calories, 206.0);
    assert!(!session.state().analyzing);

    session.add_estimate_to_log().await;

    // The estimate is cleared and the log mirror now reflects the
    // snapshot the write triggered.
    assert!(session.state().estimate.is_none());
    assert_eq!(session.state().daily_log.len(), 1);
    let logged = &session.state().daily_log[0];
    assert_eq!(logged.food_name, "white rice, cooked");
    assert!(!logged.id.is_empty());
    assert!(logged.logged_at.is_some());
    assert_eq!(session.state().totals.calories, 206.0);
}

#[tokio::test]
async fn analysis_failure_clears_the_result_and_reports() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("no data for that")))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let mut session = login(&store, &server.uri()).await;

    session.analyze_food("mystery stew").await;

    assert!(session.state().estimate.is_none());
    assert_eq!(session.state().error.as_deref(), Some(ANALYSIS_PARSE_MESSAGE));
    assert!(session.state().daily_log.is_empty());
}

#[tokio::test]
async fn edited_record_round_trips_through_a_fresh_snapshot() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let user = UserId::new("user-1");

    store
        .add_food_record(
            &user,
            &NutrientRecord {
                food_name: "oatmeal".to_string(),
                portion_size: "1 bowl".to_string(),
                calories: 150.0,
                ..NutrientRecord::default()
            },
        )
        .await
        .unwrap();

    let mut session = login(&store, &server.uri()).await;
    let id = session.state().daily_log[0].id.clone();

    session.open_editor(&id);
    session.edit_field(NutrientField::Calories, "180");
    session.edit_field(NutrientField::Protein, "6.5");
    session.save_editor().await;

    assert!(session.state().editor.is_none());
    let reloaded = &session.state().daily_log[0];
    assert_eq!(reloaded.id, id);
    assert_eq!(reloaded.calories, 180.0);
    assert_eq!(reloaded.protein, 6.5);
    assert_eq!(reloaded.food_name, "oatmeal");
    assert_eq!(session.state().totals.calories, 180.0);

    // A second session sees the same record.
    let other = login(&store, &server.uri()).await;
    assert_eq!(other.state().daily_log[0].calories, 180.0);
}

#[tokio::test]
async fn deleted_record_never_reappears() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let user = UserId::new("user-1");

    store
        .add_food_record(
            &user,
            &NutrientRecord {
                food_name: "cookie".to_string(),
                calories: 90.0,
                ..NutrientRecord::default()
            },
        )
        .await
        .unwrap();

    let mut session = login(&store, &server.uri()).await;
    let id = session.state().daily_log[0].id.clone();

    session.open_editor(&id);

    // Deletion only proceeds through the explicit confirmation step.
    session.confirm_delete().await;
    assert_eq!(session.state().daily_log.len(), 1);

    session.request_delete();
    session.confirm_delete().await;

    assert!(session.state().editor.is_none());
    assert!(session.state().daily_log.is_empty());
    assert_eq!(session.state().totals.calories, 0.0);

    let other = login(&store, &server.uri()).await;
    assert!(other.state().daily_log.is_empty());
}

#[tokio::test]
async fn logout_cancels_the_subscription_synchronously() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let user = UserId::new("user-1");

    let mut session = login(&store, &server.uri()).await;
    session.logout();

    // A write after logout must not reach the session's mirror.
    store
        .add_food_record(
            &user,
            &NutrientRecord {
                food_name: "midnight snack".to_string(),
                calories: 400.0,
                ..NutrientRecord::default()
            },
        )
        .await
        .unwrap();

    session.apply_pending_snapshots();
    assert!(session.state().daily_log.is_empty());
    assert!(!session.next_snapshot().await);
}

#[tokio::test]
async fn profile_and_goal_edits_persist_together() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let user = UserId::new("user-1");

    let mut session = login(&store, &server.uri()).await;

    session.set_profile_field(ProfileField::HeightCm, "180").await;
    session.set_profile_field(ProfileField::WeightKg, "81").await;
    session.set_goal_field(MacroField::Calories, "1800").await;

    assert_eq!(session.state().bmi, Some(25.0));

    let document = store.load_user_document(&user).await.unwrap().unwrap();
    assert_eq!(document.profile.height_cm, "180");
    assert_eq!(document.profile.weight_kg, "81");
    assert_eq!(document.goals.calories, 1800);

    // Sibling fields survive single-field edits.
    assert_eq!(document.goals.protein, 120);
}

#[tokio::test]
async fn generated_goals_are_rounded_and_persisted() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(
            r#"{"calories": 2450.4, "protein": 149.6, "carbs": 275.5, "fat": 81.2}"#,
        )))
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let user = UserId::new("user-1");
    let mut session = login(&store, &server.uri()).await;

    // Disabled until the profile is filled in.
    session.generate_goals().await;
    assert_eq!(session.state().goals.calories, 2200);

    session.set_profile_field(ProfileField::Age, "30").await;
    session.set_profile_field(ProfileField::HeightCm, "180").await;
    session.set_profile_field(ProfileField::WeightKg, "80").await;
    session.generate_goals().await;

    assert_eq!(session.state().goals.calories, 2450);
    assert_eq!(session.state().goals.protein, 150);

    let document = store.load_user_document(&user).await.unwrap().unwrap();
    assert_eq!(document.goals.calories, 2450);
    assert_eq!(document.profile.age, "30");
}

#[tokio::test]
async fn failed_subscription_degrades_to_an_empty_log() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());

    store.set_fail_subscriptions(true);
    let session = login(&store, &server.uri()).await;

    assert!(session.state().daily_log.is_empty());
    assert!(session.state().error.is_some());

    // Retrying the login after the store recovers succeeds.
    store.set_fail_subscriptions(false);
    let retried = login(&store, &server.uri()).await;
    assert!(retried.state().error.is_none());
}

#[tokio::test]
async fn export_reflects_bmi_totals_and_log() {
    let server = MockServer::start().await;
    let store = Arc::new(MemoryStore::new());
    let user = UserId::new("user-1");

    store
        .add_food_record(
            &user,
            &NutrientRecord {
                food_name: "white rice, cooked".to_string(),
                portion_size: "1 cup".to_string(),
                calories: 206.0,
                ..NutrientRecord::default()
            },
        )
        .await
        .unwrap();

    let mut session = login(&store, &server.uri()).await;
    session.set_profile_field(ProfileField::HeightCm, "180").await;
    session.set_profile_field(ProfileField::WeightKg, "81").await;

    let csv = session.export_csv();

    assert!(csv.starts_with("Category,Item,Value,Unit/Target"));
    assert!(csv.contains("User Profile,BMI,25.0,"));
    assert!(csv.contains("Daily Totals,Calories,206,2200 kcal"));
    assert!(csv.contains("Logged Foods,\"white rice, cooked\",206,1 cup"));
}
