//! Counter view state
//!
//! The reconciliation engine behind the main counter view. All view
//! state lives in one `CounterState`; every mutation is a transition
//! driven by an `Action` and returns the side effects the session must
//! run (remote writes, network calls). Transitions are pure — I/O lives
//! in the session service, never here.
//!
//! The log mirror is only ever replaced by snapshots from the live
//! subscription: local writes go to the store and come back as the next
//! snapshot, so there is no optimistic local append to reconcile.

use crate::aggregate::NutrientTotals;
use crate::editor::{FoodDraft, NutrientField};
use crate::store::models::{Goals, NutrientRecord, Profile};

/// Editable fields of the profile form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Age,
    Gender,
    HeightCm,
    WeightKg,
    ActivityLevel,
    Goal,
}

/// Editable fields of the manual goal form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacroField {
    Calories,
    Protein,
    Carbs,
    Fat,
}

/// Everything that can happen to the counter view.
#[derive(Debug, Clone)]
pub enum Action {
    /// A full log snapshot arrived on the live subscription.
    SnapshotArrived(Vec<NutrientRecord>),
    /// The live subscription could not be established.
    SubscriptionFailed { message: String },
    ProfileEdited { field: ProfileField, value: String },
    GoalEdited { field: MacroField, raw: String },
    AnalyzeRequested { input: String },
    AnalysisSucceeded { generation: u64, record: NutrientRecord },
    AnalysisFailed { generation: u64, message: String },
    /// The user confirmed the current estimate into the daily log.
    EstimateConfirmed,
    EstimateDismissed,
    GoalGenerationRequested,
    GoalGenerationSucceeded { generation: u64, goals: Goals },
    GoalGenerationFailed { generation: u64, message: String },
    EditRequested { id: String },
    EditorFieldEdited { field: NutrientField, raw: String },
    EditorSaveRequested,
    EditorDeleteRequested,
    EditorDeleteCancelled,
    EditorDeleteConfirmed,
    EditorClosed,
    LoggedOut,
}

/// Side effects a transition asks the session to perform.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Write profile and goals to the store in one combined write.
    PersistProfileAndGoals,
    StartAnalysis { input: String, generation: u64 },
    StartGoalGeneration { profile: Profile, generation: u64 },
    AppendRecord(NutrientRecord),
    SaveRecord { id: String, record: NutrientRecord },
    DeleteRecord { id: String },
}

/// The complete local state of the counter view: the eventually
/// consistent mirror of the remote data plus in-flight drafts and flags.
#[derive(Debug, Clone)]
pub struct CounterState {
    pub profile: Profile,
    pub goals: Goals,
    /// Read-only mirror of the remote log, newest first.
    pub daily_log: Vec<NutrientRecord>,
    /// Derived from `daily_log`; recomputed on every snapshot.
    pub totals: NutrientTotals,
    /// Derived from the profile; recomputed on every profile edit.
    pub bmi: Option<f64>,
    /// Candidate record from the estimator, awaiting confirm or dismiss.
    pub estimate: Option<NutrientRecord>,
    pub editor: Option<FoodDraft>,
    /// User-facing error message for the view, if any.
    pub error: Option<String>,
    pub analyzing: bool,
    pub generating_goals: bool,
    generation: u64,
}

impl CounterState {
    pub fn new(profile: Profile, goals: Goals) -> Self {
        let bmi = profile.bmi();
        Self {
            profile,
            goals,
            daily_log: Vec::new(),
            totals: NutrientTotals::default(),
            bmi,
            estimate: None,
            editor: None,
            error: None,
            analyzing: false,
            generating_goals: false,
            generation: 0,
        }
    }

    /// Identifier of the newest in-flight request. Responses tagged with
    /// an older generation are stale and must be discarded.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Apply one action, returning the effects to run.
    pub fn reduce(&mut self, action: Action) -> Vec<Effect> {
        match action {
            Action::SnapshotArrived(log) => {
                self.totals = NutrientTotals::from_log(&log);
                self.daily_log = log;
                Vec::new()
            }

            Action::SubscriptionFailed { message } => {
                self.daily_log.clear();
                self.totals = NutrientTotals::default();
                self.error = Some(message);
                Vec::new()
            }

            Action::ProfileEdited { field, value } => {
                self.apply_profile_edit(field, &value);
                self.bmi = self.profile.bmi();
                vec![Effect::PersistProfileAndGoals]
            }

            Action::GoalEdited { field, raw } => {
                let value: u32 = raw.trim().parse().unwrap_or(0);
                match field {
                    MacroField::Calories => self.goals.calories = value,
                    MacroField::Protein => self.goals.protein = value,
                    MacroField::Carbs => self.goals.carbs = value,
                    MacroField::Fat => self.goals.fat = value,
                }
                vec![Effect::PersistProfileAndGoals]
            }

            Action::AnalyzeRequested { input } => {
                if self.analyzing || input.trim().is_empty() {
                    return Vec::new();
                }
                self.analyzing = true;
                self.error = None;
                self.estimate = None;
                self.generation += 1;
                vec![Effect::StartAnalysis {
                    input,
                    generation: self.generation,
                }]
            }

            Action::AnalysisSucceeded { generation, record } => {
                if generation != self.generation {
                    return Vec::new();
                }
                self.analyzing = false;
                self.estimate = Some(record);
                Vec::new()
            }

            Action::AnalysisFailed {
                generation,
                message,
            } => {
                if generation != self.generation {
                    return Vec::new();
                }
                self.analyzing = false;
                self.estimate = None;
                self.error = Some(message);
                Vec::new()
            }

            Action::EstimateConfirmed => match self.estimate.take() {
                Some(record) => vec![Effect::AppendRecord(record)],
                None => Vec::new(),
            },

            Action::EstimateDismissed => {
                self.estimate = None;
                Vec::new()
            }

            Action::GoalGenerationRequested => {
                if self.generating_goals || !self.profile.can_generate_goals() {
                    return Vec::new();
                }
                self.generating_goals = true;
                self.error = None;
                self.generation += 1;
                vec![Effect::StartGoalGeneration {
                    profile: self.profile.clone(),
                    generation: self.generation,
                }]
            }

            Action::GoalGenerationSucceeded { generation, goals } => {
                if generation != self.generation {
                    return Vec::new();
                }
                self.generating_goals = false;
                self.goals = goals;
                vec![Effect::PersistProfileAndGoals]
            }

            Action::GoalGenerationFailed {
                generation,
                message,
            } => {
                if generation != self.generation {
                    return Vec::new();
                }
                self.generating_goals = false;
                self.error = Some(message);
                Vec::new()
            }

            Action::EditRequested { id } => {
                if let Some(record) = self.daily_log.iter().find(|record| record.id == id) {
                    self.editor = Some(FoodDraft::open(record.clone()));
                }
                Vec::new()
            }

            Action::EditorFieldEdited { field, raw } => {
                if let Some(draft) = self.editor.as_mut() {
                    draft.set_field(field, &raw);
                }
                Vec::new()
            }

            Action::EditorSaveRequested => match self.editor.take() {
                Some(draft) => vec![Effect::SaveRecord {
                    id: draft.id().to_string(),
                    record: draft.into_record(),
                }],
                None => Vec::new(),
            },

            Action::EditorDeleteRequested => {
                if let Some(draft) = self.editor.as_mut() {
                    draft.request_delete();
                }
                Vec::new()
            }

            Action::EditorDeleteCancelled => {
                if let Some(draft) = self.editor.as_mut() {
                    draft.cancel_delete();
                }
                Vec::new()
            }

            Action::EditorDeleteConfirmed => {
                match self.editor.take() {
                    Some(draft) if draft.delete_armed() => vec![Effect::DeleteRecord {
                        id: draft.id().to_string(),
                    }],
                    Some(draft) => {
                        // Not armed; keep the draft open.
                        self.editor = Some(draft);
                        Vec::new()
                    }
                    None => Vec::new(),
                }
            }

            Action::EditorClosed => {
                self.editor = None;
                Vec::new()
            }

            Action::LoggedOut => {
                self.generation += 1;
                self.analyzing = false;
                self.generating_goals = false;
                self.estimate = None;
                self.editor = None;
                self.daily_log.clear();
                self.totals = NutrientTotals::default();
                self.error = None;
                Vec::new()
            }
        }
    }

    fn apply_profile_edit(&mut self, field: ProfileField, value: &str) {
        match field {
            ProfileField::Age => self.profile.age = value.to_string(),
            ProfileField::HeightCm => self.profile.height_cm = value.to_string(),
            ProfileField::WeightKg => self.profile.weight_kg = value.to_string(),
            // Select inputs; unknown values leave the current choice.
            ProfileField::Gender => {
                if let Ok(gender) = value.parse() {
                    self.profile.gender = gender;
                }
            }
            ProfileField::ActivityLevel => {
                if let Ok(level) = value.parse() {
                    self.profile.activity_level = level;
                }
            }
            ProfileField::Goal => {
                if let Ok(goal) = value.parse() {
                    self.profile.goal = goal;
                }
            }
        }
    }
}
