//! services/bot/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tarot_core::domain::{
    DrawnCard, NewUser, QuotaCounters, QuotaDecision, Reading, ReadingKind, Tier, User, UserId, ZodiacSign,
};
use tarot_core::ports::{DatabaseService, PortError, PortResult};
use tracing::debug;
use uuid::Uuid;

const USER_COLUMNS: &str = "user_id, name, username, birth_date, zodiac, is_premium, \
     daily_simple_used, daily_cardofday_used, last_reset, total_readings, created_at";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn storage_error(e: sqlx::Error) -> PortError {
    PortError::Storage(e.to_string())
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    user_id: i64,
    name: String,
    username: String,
    birth_date: Option<NaiveDate>,
    zodiac: Option<String>,
    is_premium: bool,
    daily_simple_used: i32,
    daily_cardofday_used: i32,
    last_reset: DateTime<Utc>,
    total_readings: i64,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.user_id,
            name: self.name,
            username: self.username,
            birth_date: self.birth_date,
            zodiac: self.zodiac.as_deref().and_then(ZodiacSign::parse),
            tier: if self.is_premium { Tier::Premium } else { Tier::Free },
            quota: QuotaCounters {
                daily_simple_used: self.daily_simple_used.max(0) as u32,
                daily_cardofday_used: self.daily_cardofday_used.max(0) as u32,
                last_reset: self.last_reset,
            },
            total_readings: self.total_readings.max(0) as u64,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ReadingRecord {
    id: Uuid,
    user_id: i64,
    kind: String,
    cards: Json<Vec<DrawnCard>>,
    question: Option<String>,
    interpretation: String,
    created_at: DateTime<Utc>,
}

impl ReadingRecord {
    fn to_domain(self) -> PortResult<Reading> {
        let kind = ReadingKind::parse(&self.kind).ok_or_else(|| {
            PortError::Unexpected(format!("Unknown reading kind '{}' in storage", self.kind))
        })?;
        Ok(Reading {
            id: self.id,
            user_id: self.user_id,
            kind,
            cards: self.cards.0,
            question: self.question,
            interpretation: self.interpretation,
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn get_user(&self, user_id: UserId) -> PortResult<Option<User>> {
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(record.map(UserRecord::to_domain))
    }

    async fn create_user(&self, new_user: &NewUser, now: DateTime<Utc>) -> PortResult<User> {
        // Quota counters and created_at stay untouched for returning users.
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (user_id, name, username, birth_date, zodiac, last_reset, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $6) \
             ON CONFLICT (user_id) DO UPDATE \
             SET name = EXCLUDED.name, username = EXCLUDED.username, \
                 birth_date = EXCLUDED.birth_date, zodiac = EXCLUDED.zodiac \
             RETURNING {USER_COLUMNS}"
        ))
        .bind(new_user.id)
        .bind(&new_user.name)
        .bind(&new_user.username)
        .bind(new_user.birth_date)
        .bind(new_user.zodiac.map(|zodiac| zodiac.as_str()))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(record.to_domain())
    }

    async fn update_zodiac(&self, user_id: UserId, zodiac: ZodiacSign) -> PortResult<()> {
        let result = sqlx::query("UPDATE users SET zodiac = $1 WHERE user_id = $2")
            .bind(zodiac.as_str())
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    async fn set_premium(&self, user_id: UserId, premium: bool) -> PortResult<()> {
        let result = sqlx::query("UPDATE users SET is_premium = $1 WHERE user_id = $2")
            .bind(premium)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(storage_error)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!("User {} not found", user_id)));
        }
        Ok(())
    }

    async fn check_and_update_limits(
        &self,
        user_id: UserId,
        kind: ReadingKind,
        now: DateTime<Utc>,
    ) -> PortResult<QuotaDecision> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        // The row lock serializes concurrent checks for the same user.
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE user_id = $1 FOR UPDATE"
        ))
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage_error)?
        .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;

        let user = record.to_domain();
        let mut counters = user.quota.clone();
        let decision = counters.check_and_consume(user.tier, kind, now);

        if counters != user.quota {
            sqlx::query(
                "UPDATE users SET daily_simple_used = $1, daily_cardofday_used = $2, last_reset = $3 \
                 WHERE user_id = $4",
            )
            .bind(counters.daily_simple_used as i32)
            .bind(counters.daily_cardofday_used as i32)
            .bind(counters.last_reset)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;
        }

        tx.commit().await.map_err(storage_error)?;
        debug!(user_id, kind = %kind, ?decision, "Quota counters updated.");
        Ok(decision)
    }

    async fn save_reading(&self, reading: &Reading) -> PortResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage_error)?;

        sqlx::query(
            "INSERT INTO readings (id, user_id, kind, cards, question, interpretation, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
        )
        .bind(reading.id)
        .bind(reading.user_id)
        .bind(reading.kind.as_str())
        .bind(Json(&reading.cards))
        .bind(reading.question.as_deref())
        .bind(&reading.interpretation)
        .bind(reading.created_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_error)?;

        sqlx::query("UPDATE users SET total_readings = total_readings + 1 WHERE user_id = $1")
            .bind(reading.user_id)
            .execute(&mut *tx)
            .await
            .map_err(storage_error)?;

        tx.commit().await.map_err(storage_error)?;
        Ok(())
    }

    async fn get_user_readings(&self, user_id: UserId, limit: usize) -> PortResult<Vec<Reading>> {
        let records = sqlx::query_as::<_, ReadingRecord>(
            "SELECT id, user_id, kind, cards, question, interpretation, created_at \
             FROM readings WHERE user_id = $1 ORDER BY created_at DESC LIMIT $2",
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_error)?;

        records.into_iter().map(ReadingRecord::to_domain).collect()
    }
}
