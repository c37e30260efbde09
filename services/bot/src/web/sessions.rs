//! services/bot/src/web/sessions.rs
//!
//! Per-user dialogue state, keyed by user id.

use dashmap::DashMap;
use std::sync::Arc;
use tarot_core::domain::UserId;
use tarot_core::session::{step, Input, Session, StepContext, Transition};

/// Live sessions. Users without an entry are idle.
#[derive(Clone, Default)]
pub struct SessionStore {
    sessions: Arc<DashMap<UserId, Session>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one input to the user's session.
    ///
    /// The transition runs while the user's entry is locked, so concurrent
    /// events for the same user are applied one after another.
    pub fn advance(&self, user_id: UserId, input: Input, ctx: &StepContext<'_>) -> Transition {
        let transition = {
            let mut entry = self.sessions.entry(user_id).or_default();
            let current = std::mem::take(entry.value_mut());
            let transition = step(current, input, ctx);
            *entry.value_mut() = transition.next.clone();
            transition
        };
        self.sessions.remove_if(&user_id, |_, session| session.is_idle());
        transition
    }

    pub fn current(&self, user_id: UserId) -> Session {
        self.sessions
            .get(&user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    pub fn reset(&self, user_id: UserId) {
        self.sessions.remove(&user_id);
    }

    pub fn live_count(&self) -> usize {
        self.sessions.len()
    }
}
