//! Services module
//!
//! Business logic services coordinating between the view, the remote
//! store and the inference endpoint.

pub mod coach;
pub mod estimator;
pub mod export;
pub mod goals;
pub mod session;

pub use coach::{ChatMessage, ChatRole, HealthCoach};
pub use estimator::NutritionEstimator;
pub use export::ExportRow;
pub use goals::GoalGenerator;
pub use session::Session;
