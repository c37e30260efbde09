//! crates/tarot_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use crate::domain::{NewUser, QuotaDecision, Reading, ReadingKind, User, UserId, ZodiacSign};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// The persistence collaborator failed or is unavailable.
    #[error("Storage error: {0}")]
    Storage(String),
    /// The interpretation generator timed out, failed in transport, or returned garbage.
    #[error("Generation error: {0}")]
    Generation(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---
    async fn get_user(&self, user_id: UserId) -> PortResult<Option<User>>;

    /// Inserts the profile, or overwrites it for a returning user, as one write.
    /// New rows start their quota window and `created_at` at `now`; existing
    /// counters and history are kept.
    async fn create_user(&self, new_user: &NewUser, now: DateTime<Utc>) -> PortResult<User>;

    async fn update_zodiac(&self, user_id: UserId, zodiac: ZodiacSign) -> PortResult<()>;

    async fn set_premium(&self, user_id: UserId, premium: bool) -> PortResult<()>;

    // --- Quota ---
    /// Applies `QuotaCounters::check_and_consume` to the stored counters as one
    /// atomic step per user. Fails with `NotFound` for unknown users.
    async fn check_and_update_limits(
        &self,
        user_id: UserId,
        kind: ReadingKind,
        now: DateTime<Utc>,
    ) -> PortResult<QuotaDecision>;

    // --- Readings ---
    /// Persists the reading and increments the user's cumulative reading count.
    async fn save_reading(&self, reading: &Reading) -> PortResult<()>;

    /// Most recent first.
    async fn get_user_readings(&self, user_id: UserId, limit: usize) -> PortResult<Vec<Reading>>;
}

#[async_trait]
pub trait InterpretationService: Send + Sync {
    /// Generates interpretation text for a prompt under the given system persona.
    async fn generate(&self, system_persona: &str, prompt: &str) -> PortResult<String>;
}

/// Source of wall-clock time. Injected so quota rollover can be simulated.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
