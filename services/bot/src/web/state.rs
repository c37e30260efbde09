//! services/bot/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use crate::web::sessions::SessionStore;
use std::sync::Arc;
use tarot_core::deck::Deck;
use tarot_core::orchestrator::ReadingOrchestrator;
use tarot_core::ports::{Clock, DatabaseService, InterpretationService};

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub orchestrator: ReadingOrchestrator,
    pub sessions: SessionStore,
    pub clock: Arc<dyn Clock>,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        interpreter: Arc<dyn InterpretationService>,
        deck: Arc<Deck>,
        clock: Arc<dyn Clock>,
        config: Arc<Config>,
    ) -> Self {
        let orchestrator = ReadingOrchestrator::new(db.clone(), interpreter, deck, clock.clone());
        Self {
            db,
            orchestrator,
            sessions: SessionStore::new(),
            clock,
            config,
        }
    }
}
