//! Remote store seam
//!
//! The application keeps all durable state in a hosted per-user document
//! store: one document holding profile and goals, plus a food-log
//! collection ordered by `logged_at` descending. This module defines the
//! trait seam and the in-memory implementation used by tests and local
//! development.

pub mod memory;
pub mod models;

pub use memory::MemoryStore;
pub use models::*;

use async_trait::async_trait;

use crate::error::Result;
use crate::sync::LogSubscription;

/// Per-user document store with a live food-log feed.
///
/// Writes are full-document: update paths replace every field of the
/// target rather than merging. Log mutations are never reflected back to
/// the caller directly — they surface through the subscription's next
/// snapshot, which is the sole source of truth for the mirrored log.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Load the user's document, or None when the user has none yet.
    async fn load_user_document(&self, user: &UserId) -> Result<Option<UserDocument>>;

    /// Create the user's document. Fails if one already exists.
    async fn create_user_document(&self, user: &UserId, document: &UserDocument) -> Result<()>;

    /// Persist profile and goals together in a single write, replacing
    /// both fields of the user document.
    async fn save_profile_and_goals(
        &self,
        user: &UserId,
        profile: &Profile,
        goals: &Goals,
    ) -> Result<()>;

    /// Append a record to the food log. The store assigns the identifier
    /// and the logged-at timestamp; the assigned identifier is returned.
    async fn add_food_record(&self, user: &UserId, record: &NutrientRecord) -> Result<String>;

    /// Replace every field of an existing record except its identifier
    /// and logged-at timestamp.
    async fn update_food_record(
        &self,
        user: &UserId,
        id: &str,
        record: &NutrientRecord,
    ) -> Result<()>;

    /// Remove a record permanently.
    async fn delete_food_record(&self, user: &UserId, id: &str) -> Result<()>;

    /// Open a live subscription to the user's food log. The current
    /// snapshot is delivered immediately, then one per change.
    async fn subscribe_food_log(&self, user: &UserId) -> Result<LogSubscription>;
}
