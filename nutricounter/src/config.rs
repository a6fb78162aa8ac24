//! Application configuration constants
//!
//! Central location for all configuration constants, default values,
//! and limits used throughout the application.

// ===== Default Nutrition Goals =====

/// Default daily calorie target in kcal
pub const DEFAULT_CALORIE_GOAL: u32 = 2200;
/// Default daily protein target in grams
pub const DEFAULT_PROTEIN_GOAL: u32 = 120;
/// Default daily carbohydrate target in grams
pub const DEFAULT_CARBS_GOAL: u32 = 200;
/// Default daily fat target in grams
pub const DEFAULT_FAT_GOAL: u32 = 75;

// ===== Inference Endpoint =====

/// Base URL of the generative-AI endpoint used for nutrition analysis,
/// goal generation and coaching
pub const INFERENCE_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Model identifier appended to the base URL
pub const INFERENCE_MODEL: &str = "gemini-2.0-flash";

/// Per-request timeout for inference calls in seconds.
/// Generation can be slow; values below ~10s cause spurious failures.
pub const INFERENCE_TIMEOUT_SECS: u64 = 30;

// ===== Export =====

/// Default filename offered for the overview export
pub const EXPORT_FILENAME: &str = "nutricounter_overview.csv";
