//! crates/tarot_core/src/quota.rs
//!
//! Daily usage rules for free and premium users.
//!
//! The rules live on `QuotaCounters` as pure functions so that every storage
//! adapter applies exactly the same semantics inside its own atomic section
//! (a row lock, a mutex). `QuotaLedger` is the thin service the orchestrator
//! talks to.

use crate::domain::{QuotaCounters, QuotaDecision, QuotaDenial, QuotaPool, ReadingKind, Tier, UserId};
use crate::ports::{Clock, DatabaseService, PortResult};
use chrono::{DateTime, TimeDelta, Utc};
use std::sync::Arc;
use tracing::debug;

/// Card-of-the-day draws a free user gets per day.
pub const DAILY_CARD_OF_DAY_LIMIT: u32 = 2;
/// Pooled single-question, three-card and advice readings per day.
pub const DAILY_SIMPLE_LIMIT: u32 = 2;

fn rollover_period() -> TimeDelta {
    TimeDelta::days(1)
}

impl QuotaCounters {
    /// Resets both counters when a full day has passed since the last reset.
    /// Returns whether a reset happened.
    pub fn roll_over(&mut self, now: DateTime<Utc>) -> bool {
        if now.signed_duration_since(self.last_reset) >= rollover_period() {
            self.daily_simple_used = 0;
            self.daily_cardofday_used = 0;
            self.last_reset = now;
            true
        } else {
            false
        }
    }

    fn evaluate(&self, tier: Tier, kind: ReadingKind) -> QuotaDecision {
        if tier == Tier::Premium {
            return QuotaDecision::Allowed;
        }
        match kind.quota_pool() {
            QuotaPool::CardOfDay if self.daily_cardofday_used >= DAILY_CARD_OF_DAY_LIMIT => {
                QuotaDecision::Denied(QuotaDenial::CardOfDayLimit)
            }
            QuotaPool::Simple if self.daily_simple_used >= DAILY_SIMPLE_LIMIT => {
                QuotaDecision::Denied(QuotaDenial::SimpleLimit)
            }
            QuotaPool::PremiumOnly => QuotaDecision::Denied(QuotaDenial::PremiumOnly),
            QuotaPool::CardOfDay | QuotaPool::Simple => QuotaDecision::Allowed,
        }
    }

    /// Applies the entitlement rules and, on success, consumes one slot.
    ///
    /// Premium users are always admitted and their counters are left untouched.
    pub fn check_and_consume(
        &mut self,
        tier: Tier,
        kind: ReadingKind,
        now: DateTime<Utc>,
    ) -> QuotaDecision {
        if tier == Tier::Premium {
            return QuotaDecision::Allowed;
        }

        self.roll_over(now);
        let decision = self.evaluate(tier, kind);
        if decision.is_allowed() {
            match kind.quota_pool() {
                QuotaPool::CardOfDay => self.daily_cardofday_used += 1,
                QuotaPool::Simple => self.daily_simple_used += 1,
                QuotaPool::PremiumOnly => {}
            }
        }
        decision
    }

    /// Same rules as `check_and_consume`, without touching the counters.
    pub fn peek(&self, tier: Tier, kind: ReadingKind, now: DateTime<Utc>) -> QuotaDecision {
        if tier == Tier::Premium {
            return QuotaDecision::Allowed;
        }
        let mut projected = self.clone();
        projected.roll_over(now);
        projected.evaluate(tier, kind)
    }
}

/// Entitlement checks backed by the persisted counters.
#[derive(Clone)]
pub struct QuotaLedger {
    db: Arc<dyn DatabaseService>,
    clock: Arc<dyn Clock>,
}

impl QuotaLedger {
    pub fn new(db: Arc<dyn DatabaseService>, clock: Arc<dyn Clock>) -> Self {
        Self { db, clock }
    }

    /// Atomically checks and consumes one slot for `user_id`.
    pub async fn check_and_consume(
        &self,
        user_id: UserId,
        kind: ReadingKind,
    ) -> PortResult<QuotaDecision> {
        let decision = self
            .db
            .check_and_update_limits(user_id, kind, self.clock.now())
            .await?;
        debug!(user_id, kind = %kind, ?decision, "Quota checked.");
        Ok(decision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn free_user_gets_two_cards_of_the_day() {
        let mut counters = QuotaCounters::fresh(t0());
        let now = t0() + TimeDelta::hours(1);
        assert_eq!(counters.check_and_consume(Tier::Free, ReadingKind::CardOfDay, now), QuotaDecision::Allowed);
        assert_eq!(counters.check_and_consume(Tier::Free, ReadingKind::CardOfDay, now), QuotaDecision::Allowed);
        assert_eq!(
            counters.check_and_consume(Tier::Free, ReadingKind::CardOfDay, now),
            QuotaDecision::Denied(QuotaDenial::CardOfDayLimit)
        );
        assert_eq!(counters.daily_cardofday_used, 2);
        assert_eq!(counters.daily_simple_used, 0);
    }

    #[test]
    fn simple_kinds_share_one_pool() {
        let simple = [ReadingKind::SingleQuestion, ReadingKind::ThreeCard, ReadingKind::Advice];
        for third in simple {
            let mut counters = QuotaCounters::fresh(t0());
            assert!(counters.check_and_consume(Tier::Free, ReadingKind::ThreeCard, t0()).is_allowed());
            assert!(counters.check_and_consume(Tier::Free, ReadingKind::Advice, t0()).is_allowed());
            assert_eq!(
                counters.check_and_consume(Tier::Free, third, t0()),
                QuotaDecision::Denied(QuotaDenial::SimpleLimit)
            );
        }
    }

    #[test]
    fn simple_pool_does_not_touch_card_of_the_day() {
        let mut counters = QuotaCounters::fresh(t0());
        counters.check_and_consume(Tier::Free, ReadingKind::SingleQuestion, t0());
        counters.check_and_consume(Tier::Free, ReadingKind::SingleQuestion, t0());
        assert!(counters.check_and_consume(Tier::Free, ReadingKind::CardOfDay, t0()).is_allowed());
    }

    #[test]
    fn premium_only_kinds_are_denied_to_free_users() {
        for kind in [ReadingKind::Deep5, ReadingKind::Deep7, ReadingKind::DeepPath, ReadingKind::Energy] {
            let mut counters = QuotaCounters::fresh(t0());
            assert_eq!(
                counters.check_and_consume(Tier::Free, kind, t0()),
                QuotaDecision::Denied(QuotaDenial::PremiumOnly)
            );
            assert_eq!(counters, QuotaCounters::fresh(t0()));
        }
    }

    #[test]
    fn counters_reset_after_a_full_day() {
        let mut counters = QuotaCounters::fresh(t0());
        for _ in 0..2 {
            counters.check_and_consume(Tier::Free, ReadingKind::CardOfDay, t0());
            counters.check_and_consume(Tier::Free, ReadingKind::ThreeCard, t0());
        }

        let almost = t0() + TimeDelta::hours(23) + TimeDelta::minutes(59);
        assert!(!counters.check_and_consume(Tier::Free, ReadingKind::CardOfDay, almost).is_allowed());

        let next_day = t0() + TimeDelta::days(1);
        let mut rolled = counters.clone();
        assert!(rolled.roll_over(next_day));
        assert_eq!(rolled.daily_cardofday_used, 0);
        assert_eq!(rolled.daily_simple_used, 0);
        assert_eq!(rolled.last_reset, next_day);

        assert!(counters.check_and_consume(Tier::Free, ReadingKind::CardOfDay, next_day).is_allowed());
        assert!(counters.check_and_consume(Tier::Free, ReadingKind::ThreeCard, next_day).is_allowed());
        assert_eq!(counters.last_reset, next_day);
    }

    #[test]
    fn rollover_happens_once_per_boundary() {
        let mut counters = QuotaCounters::fresh(t0());
        let next_day = t0() + TimeDelta::days(1);
        assert!(counters.roll_over(next_day));
        assert!(!counters.roll_over(next_day + TimeDelta::hours(5)));
    }

    #[test]
    fn premium_is_never_denied_and_never_counted() {
        let mut counters = QuotaCounters::fresh(t0());
        for kind in ReadingKind::ALL {
            for _ in 0..10 {
                assert!(counters.check_and_consume(Tier::Premium, kind, t0()).is_allowed());
            }
        }
        assert_eq!(counters, QuotaCounters::fresh(t0()));
    }

    #[test]
    fn peek_does_not_consume() {
        let mut counters = QuotaCounters::fresh(t0());
        counters.check_and_consume(Tier::Free, ReadingKind::CardOfDay, t0());
        counters.check_and_consume(Tier::Free, ReadingKind::CardOfDay, t0());

        assert_eq!(
            counters.peek(Tier::Free, ReadingKind::CardOfDay, t0()),
            QuotaDecision::Denied(QuotaDenial::CardOfDayLimit)
        );
        assert!(counters.peek(Tier::Free, ReadingKind::CardOfDay, t0() + TimeDelta::days(2)).is_allowed());
        assert_eq!(counters.daily_cardofday_used, 2);
        assert_eq!(counters.last_reset, t0());
    }
}
