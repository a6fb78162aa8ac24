//! Counter session service
//!
//! Binds one authenticated user to the counter engine: bootstraps the
//! per-user document, owns the live log subscription, runs the effects
//! produced by state transitions, and exposes the operations the view
//! invokes. All remote failures are converted to user-facing messages on
//! the state; nothing here panics or propagates.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::ai::InferenceClient;
use crate::editor::NutrientField;
use crate::error::AppError;
use crate::services::estimator::NutritionEstimator;
use crate::services::export::{self, ExportRow};
use crate::services::goals::GoalGenerator;
use crate::state::{Action, CounterState, Effect, MacroField, ProfileField};
use crate::store::{UserDocument, UserId, UserStore};
use crate::sync::LogSubscription;

/// Shown when a write to the remote store fails; retrying the action is
/// always safe.
pub const SAVE_FAILED_MESSAGE: &str = "Could not save your changes. Please try again.";

/// Shown when the live food-log subscription cannot be established.
pub const LOG_UNAVAILABLE_MESSAGE: &str = "Could not load your food log. Please try again.";

/// One user's live counter session.
pub struct Session {
    user: UserId,
    store: Arc<dyn UserStore>,
    inference: InferenceClient,
    state: CounterState,
    subscription: Option<LogSubscription>,
}

impl Session {
    /// Open a session for `user`.
    ///
    /// Loads the per-user document, creating it with defaults on first
    /// login, and establishes the live log subscription. Store failures
    /// degrade rather than fail: the session opens with defaults, an
    /// empty log, and the error recorded on the state.
    pub async fn login(
        store: Arc<dyn UserStore>,
        inference: InferenceClient,
        user: UserId,
    ) -> Session {
        tracing::info!("Opening session for {}", user);

        let document = match store.load_user_document(&user).await {
            Ok(Some(document)) => document,
            Ok(None) => {
                let document = UserDocument::default();
                if let Err(e) = store.create_user_document(&user, &document).await {
                    tracing::warn!("Failed to bootstrap user document: {}", e);
                }
                document
            }
            Err(e) => {
                tracing::warn!("Failed to load user document: {}", e);
                UserDocument::default()
            }
        };

        let mut state = CounterState::new(document.profile, document.goals);

        let subscription = match store.subscribe_food_log(&user).await {
            Ok(subscription) => Some(subscription),
            Err(e) => {
                tracing::warn!("Failed to subscribe to food log: {}", e);
                state.reduce(Action::SubscriptionFailed {
                    message: LOG_UNAVAILABLE_MESSAGE.to_string(),
                });
                None
            }
        };

        let mut session = Session {
            user,
            store,
            inference,
            state,
            subscription,
        };

        // The store delivers the current snapshot on subscribe.
        session.apply_pending_snapshots();
        session
    }

    pub fn user(&self) -> &UserId {
        &self.user
    }

    pub fn state(&self) -> &CounterState {
        &self.state
    }

    /// Replace the inference credential used for subsequent AI calls.
    pub fn set_api_key(&mut self, api_key: impl Into<String>) {
        self.inference = self.inference.clone().with_api_key(api_key);
    }

    /// Apply every snapshot currently queued on the subscription.
    pub fn apply_pending_snapshots(&mut self) {
        let Some(subscription) = self.subscription.as_mut() else {
            return;
        };
        while let Some(snapshot) = subscription.try_next() {
            self.state.reduce(Action::SnapshotArrived(snapshot));
        }
    }

    /// Wait for the next snapshot and apply it. Returns false once the
    /// subscription has ended.
    pub async fn next_snapshot(&mut self) -> bool {
        let Some(subscription) = self.subscription.as_mut() else {
            return false;
        };
        match subscription.next().await {
            Some(snapshot) => {
                self.state.reduce(Action::SnapshotArrived(snapshot));
                true
            }
            None => false,
        }
    }

    /// Tear down the session on loss of identity. Cancellation of the
    /// live subscription is synchronous: no snapshot can mutate the
    /// state once this returns.
    pub fn logout(&mut self) {
        if let Some(mut subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.state.reduce(Action::LoggedOut);
        tracing::info!("Closed session for {}", self.user);
    }

    // ===== View operations =====

    /// Run the nutrition analysis for a food description and stage the
    /// result as the current estimate.
    pub async fn analyze_food(&mut self, input: &str) {
        let effects = self.state.reduce(Action::AnalyzeRequested {
            input: input.to_string(),
        });
        self.run_effects(effects).await;
    }

    /// Confirm the current estimate into the daily log.
    pub async fn add_estimate_to_log(&mut self) {
        let effects = self.state.reduce(Action::EstimateConfirmed);
        self.run_effects(effects).await;
    }

    /// Discard the current estimate.
    pub fn dismiss_estimate(&mut self) {
        self.state.reduce(Action::EstimateDismissed);
    }

    /// Change one profile field and persist profile and goals.
    pub async fn set_profile_field(&mut self, field: ProfileField, value: &str) {
        let effects = self.state.reduce(Action::ProfileEdited {
            field,
            value: value.to_string(),
        });
        self.run_effects(effects).await;
    }

    /// Change one goal field and persist profile and goals.
    pub async fn set_goal_field(&mut self, field: MacroField, raw: &str) {
        let effects = self.state.reduce(Action::GoalEdited {
            field,
            raw: raw.to_string(),
        });
        self.run_effects(effects).await;
    }

    /// Generate goals from the profile and persist them on success.
    pub async fn generate_goals(&mut self) {
        let effects = self.state.reduce(Action::GoalGenerationRequested);
        self.run_effects(effects).await;
    }

    /// Open the editor on a logged record.
    pub fn open_editor(&mut self, id: &str) {
        self.state.reduce(Action::EditRequested { id: id.to_string() });
    }

    /// Change one numeric field of the open draft.
    pub fn edit_field(&mut self, field: NutrientField, raw: &str) {
        self.state.reduce(Action::EditorFieldEdited {
            field,
            raw: raw.to_string(),
        });
    }

    /// Save the open draft back to the store and close the editor.
    pub async fn save_editor(&mut self) {
        let effects = self.state.reduce(Action::EditorSaveRequested);
        self.run_effects(effects).await;
    }

    /// Arm deletion of the edited record.
    pub fn request_delete(&mut self) {
        self.state.reduce(Action::EditorDeleteRequested);
    }

    /// Disarm a requested deletion, keeping the editor open.
    pub fn cancel_delete(&mut self) {
        self.state.reduce(Action::EditorDeleteCancelled);
    }

    /// Confirm an armed deletion and close the editor.
    pub async fn confirm_delete(&mut self) {
        let effects = self.state.reduce(Action::EditorDeleteConfirmed);
        self.run_effects(effects).await;
    }

    /// Close the editor without saving.
    pub fn close_editor(&mut self) {
        self.state.reduce(Action::EditorClosed);
    }

    /// Build the flat overview export for the current state.
    pub fn export_rows(&self) -> Vec<ExportRow> {
        export::overview_rows(
            self.state.bmi,
            &self.state.totals,
            &self.state.goals,
            &self.state.daily_log,
        )
    }

    /// Render the overview export as CSV.
    pub fn export_csv(&self) -> String {
        export::to_csv(&self.export_rows())
    }

    // ===== Effect interpreter =====

    /// Run effects in order, feeding completion actions back through the
    /// state. Store writes come back as new snapshots, which are applied
    /// before returning.
    async fn run_effects(&mut self, effects: Vec<Effect>) {
        let mut queue: VecDeque<Effect> = effects.into();

        while let Some(effect) = queue.pop_front() {
            match effect {
                Effect::PersistProfileAndGoals => {
                    let result = self
                        .store
                        .save_profile_and_goals(&self.user, &self.state.profile, &self.state.goals)
                        .await;
                    if let Err(e) = result {
                        tracing::warn!("Failed to persist profile and goals: {}", e);
                        self.state.error = Some(SAVE_FAILED_MESSAGE.to_string());
                    }
                }

                Effect::StartAnalysis { input, generation } => {
                    let estimator = NutritionEstimator::new(self.inference.clone());
                    let action = match estimator.analyze(&input).await {
                        Ok(record) => Action::AnalysisSucceeded { generation, record },
                        Err(e) => {
                            tracing::warn!("Food analysis failed: {}", e);
                            Action::AnalysisFailed {
                                generation,
                                message: NutritionEstimator::failure_message(&e).to_string(),
                            }
                        }
                    };
                    queue.extend(self.state.reduce(action));
                }

                Effect::StartGoalGeneration {
                    profile,
                    generation,
                } => {
                    let generator = GoalGenerator::new(self.inference.clone());
                    let action = match generator.generate(&profile).await {
                        Ok(goals) => Action::GoalGenerationSucceeded { generation, goals },
                        Err(e) => {
                            tracing::warn!("Goal generation failed: {}", e);
                            Action::GoalGenerationFailed {
                                generation,
                                message: GoalGenerator::failure_message(&e).to_string(),
                            }
                        }
                    };
                    queue.extend(self.state.reduce(action));
                }

                Effect::AppendRecord(record) => {
                    if let Err(e) = self.store.add_food_record(&self.user, &record).await {
                        tracing::warn!("Failed to append food record: {}", e);
                        self.state.error = Some(SAVE_FAILED_MESSAGE.to_string());
                    }
                }

                Effect::SaveRecord { id, record } => {
                    if let Err(e) = self.store.update_food_record(&self.user, &id, &record).await
                    {
                        tracing::warn!("Failed to update food record {}: {}", id, e);
                        self.state.error = Some(save_failure_message(&e));
                    }
                }

                Effect::DeleteRecord { id } => {
                    if let Err(e) = self.store.delete_food_record(&self.user, &id).await {
                        tracing::warn!("Failed to delete food record {}: {}", id, e);
                        self.state.error = Some(save_failure_message(&e));
                    }
                }
            }
        }

        self.apply_pending_snapshots();
    }
}

fn save_failure_message(error: &AppError) -> String {
    match error {
        // The record vanished under the editor; the next snapshot
        // already reflects that, no retry will bring it back.
        AppError::RecordNotFound(_) => {
            "That entry no longer exists in your log.".to_string()
        }
        _ => SAVE_FAILED_MESSAGE.to_string(),
    }
}
