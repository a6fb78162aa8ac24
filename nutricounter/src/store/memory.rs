//! In-memory store implementation
//!
//! Mirrors the hosted document store's observable behavior: ids and
//! timestamps are assigned on write, and every change republishes the
//! full ordered food log to all live subscriptions. Backs the test suite
//! and local development.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::models::{Goals, NutrientRecord, Profile, UserDocument, UserId};
use super::UserStore;
use crate::error::{AppError, Result};
use crate::sync::{self, LogSubscription, SnapshotPublisher};

#[derive(Default)]
struct UserEntry {
    document: Option<UserDocument>,
    log: Vec<NutrientRecord>,
    subscribers: Vec<SnapshotPublisher>,
}

impl UserEntry {
    /// Current log ordered by `logged_at` descending, the shape every
    /// snapshot carries.
    fn snapshot(&self) -> Vec<NutrientRecord> {
        let mut log = self.log.clone();
        log.sort_by(|a, b| b.logged_at.cmp(&a.logged_at));
        log
    }

    /// Republish the current snapshot to all live subscriptions and drop
    /// cancelled ones.
    fn publish(&mut self) {
        let snapshot = self.snapshot();
        self.subscribers
            .retain(|subscriber| subscriber.publish(snapshot.clone()));
    }
}

/// In-memory `UserStore`.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<UserId, UserEntry>>,
    fail_subscriptions: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subscription establishment fail, to exercise the degraded
    /// empty-log path.
    pub fn set_fail_subscriptions(&self, fail: bool) {
        self.fail_subscriptions.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn load_user_document(&self, user: &UserId) -> Result<Option<UserDocument>> {
        let users = self.users.read().await;
        Ok(users.get(user).and_then(|entry| entry.document.clone()))
    }

    async fn create_user_document(&self, user: &UserId, document: &UserDocument) -> Result<()> {
        let mut users = self.users.write().await;
        let entry = users.entry(user.clone()).or_default();

        if entry.document.is_some() {
            return Err(AppError::Store(format!(
                "user document already exists for {}",
                user
            )));
        }

        let mut document = document.clone();
        document.created_at = Some(Utc::now());
        entry.document = Some(document);

        tracing::debug!("Created user document for {}", user);
        Ok(())
    }

    async fn save_profile_and_goals(
        &self,
        user: &UserId,
        profile: &Profile,
        goals: &Goals,
    ) -> Result<()> {
        let mut users = self.users.write().await;
        let entry = users
            .get_mut(user)
            .filter(|entry| entry.document.is_some())
            .ok_or_else(|| AppError::Store(format!("no user document for {}", user)))?;

        if let Some(document) = entry.document.as_mut() {
            document.profile = profile.clone();
            document.goals = *goals;
        }

        tracing::debug!("Saved profile and goals for {}", user);
        Ok(())
    }

    async fn add_food_record(&self, user: &UserId, record: &NutrientRecord) -> Result<String> {
        let mut users = self.users.write().await;
        let entry = users.entry(user.clone()).or_default();

        let mut stored = record.clone();
        stored.id = Uuid::new_v4().to_string();
        stored.logged_at = Some(Utc::now());
        let id = stored.id.clone();

        entry.log.push(stored);
        entry.publish();

        tracing::debug!("Added food record {} for {}", id, user);
        Ok(id)
    }

    async fn update_food_record(
        &self,
        user: &UserId,
        id: &str,
        record: &NutrientRecord,
    ) -> Result<()> {
        let mut users = self.users.write().await;
        let entry = users
            .get_mut(user)
            .ok_or_else(|| AppError::RecordNotFound(id.to_string()))?;

        let existing = entry
            .log
            .iter_mut()
            .find(|candidate| candidate.id == id)
            .ok_or_else(|| AppError::RecordNotFound(id.to_string()))?;

        // Full replacement; only identity and the server timestamp survive.
        let mut updated = record.clone();
        updated.id = existing.id.clone();
        updated.logged_at = existing.logged_at;
        *existing = updated;

        entry.publish();

        tracing::debug!("Updated food record {} for {}", id, user);
        Ok(())
    }

    async fn delete_food_record(&self, user: &UserId, id: &str) -> Result<()> {
        let mut users = self.users.write().await;
        let entry = users
            .get_mut(user)
            .ok_or_else(|| AppError::RecordNotFound(id.to_string()))?;

        let before = entry.log.len();
        entry.log.retain(|candidate| candidate.id != id);

        if entry.log.len() == before {
            return Err(AppError::RecordNotFound(id.to_string()));
        }

        entry.publish();

        tracing::debug!("Deleted food record {} for {}", id, user);
        Ok(())
    }

    async fn subscribe_food_log(&self, user: &UserId) -> Result<LogSubscription> {
        if self.fail_subscriptions.load(Ordering::SeqCst) {
            return Err(AppError::Subscription(format!(
                "subscription refused for {}",
                user
            )));
        }

        let mut users = self.users.write().await;
        let entry = users.entry(user.clone()).or_default();

        let (publisher, subscription) = sync::channel();
        publisher.publish(entry.snapshot());
        entry.subscribers.push(publisher);

        tracing::debug!("Opened food-log subscription for {}", user);
        Ok(subscription)
    }
}
