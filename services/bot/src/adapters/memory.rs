//! services/bot/src/adapters/memory.rs
//!
//! A process-local implementation of the `DatabaseService` port. Used for
//! local runs without Postgres and as the storage behind the integration tests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tarot_core::domain::{
    NewUser, QuotaCounters, QuotaDecision, Reading, ReadingKind, Tier, User, UserId, ZodiacSign,
};
use tarot_core::ports::{DatabaseService, PortError, PortResult};
use tokio::sync::Mutex;

#[derive(Default)]
struct Tables {
    users: HashMap<UserId, User>,
    readings: Vec<Reading>,
}

#[derive(Default)]
pub struct InMemoryDb {
    tables: Mutex<Tables>,
}

impl InMemoryDb {
    pub fn new() -> Self {
        Self::default()
    }
}

fn not_found(user_id: UserId) -> PortError {
    PortError::NotFound(format!("User {} not found", user_id))
}

#[async_trait]
impl DatabaseService for InMemoryDb {
    async fn get_user(&self, user_id: UserId) -> PortResult<Option<User>> {
        Ok(self.tables.lock().await.users.get(&user_id).cloned())
    }

    async fn create_user(&self, new_user: &NewUser, now: DateTime<Utc>) -> PortResult<User> {
        let mut tables = self.tables.lock().await;
        let user = tables.users.entry(new_user.id).or_insert_with(|| User {
            id: new_user.id,
            name: String::new(),
            username: String::new(),
            birth_date: None,
            zodiac: None,
            tier: Tier::Free,
            quota: QuotaCounters::fresh(now),
            total_readings: 0,
            created_at: now,
        });
        user.name = new_user.name.clone();
        user.username = new_user.username.clone();
        user.birth_date = new_user.birth_date;
        user.zodiac = new_user.zodiac;
        Ok(user.clone())
    }

    async fn update_zodiac(&self, user_id: UserId, zodiac: ZodiacSign) -> PortResult<()> {
        let mut tables = self.tables.lock().await;
        let user = tables.users.get_mut(&user_id).ok_or_else(|| not_found(user_id))?;
        user.zodiac = Some(zodiac);
        Ok(())
    }

    async fn set_premium(&self, user_id: UserId, premium: bool) -> PortResult<()> {
        let mut tables = self.tables.lock().await;
        let user = tables.users.get_mut(&user_id).ok_or_else(|| not_found(user_id))?;
        user.tier = if premium { Tier::Premium } else { Tier::Free };
        Ok(())
    }

    async fn check_and_update_limits(
        &self,
        user_id: UserId,
        kind: ReadingKind,
        now: DateTime<Utc>,
    ) -> PortResult<QuotaDecision> {
        let mut tables = self.tables.lock().await;
        let user = tables.users.get_mut(&user_id).ok_or_else(|| not_found(user_id))?;
        let tier = user.tier;
        Ok(user.quota.check_and_consume(tier, kind, now))
    }

    async fn save_reading(&self, reading: &Reading) -> PortResult<()> {
        let mut tables = self.tables.lock().await;
        let user = tables
            .users
            .get_mut(&reading.user_id)
            .ok_or_else(|| not_found(reading.user_id))?;
        user.total_readings += 1;
        tables.readings.push(reading.clone());
        Ok(())
    }

    async fn get_user_readings(&self, user_id: UserId, limit: usize) -> PortResult<Vec<Reading>> {
        let tables = self.tables.lock().await;
        let mut readings: Vec<Reading> = tables
            .readings
            .iter()
            .filter(|reading| reading.user_id == user_id)
            .cloned()
            .collect();
        // Ties: later inserts come first.
        readings.sort_by_key(|reading| reading.created_at);
        readings.reverse();
        readings.truncate(limit);
        Ok(readings)
    }
}
