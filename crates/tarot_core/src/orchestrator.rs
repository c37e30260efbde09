//! crates/tarot_core/src/orchestrator.rs
//!
//! Produces a complete reading: entitlement, draw, generation, persistence.
//!
//! The quota slot is consumed before any card is drawn and is not refunded
//! when generation fails. A failed generation persists nothing.

use crate::deck::Deck;
use crate::domain::{QuotaDecision, QuotaDenial, Reading, ReadingKind, User};
use crate::ports::{Clock, DatabaseService, InterpretationService, PortError, PortResult};
use crate::prompts::{build_request, PromptContext, TimeOfDay, ADVICE_PROMPT_QUESTION, ADVICE_SAVED_QUESTION};
use crate::quota::QuotaLedger;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

/// Result of one reading attempt that did not hit an infrastructure error.
#[derive(Debug, Clone)]
pub enum ReadingOutcome {
    Completed(Reading),
    Denied(QuotaDenial),
    /// The generator failed; the message is for logs, not for the user.
    Failed(String),
}

#[derive(Clone)]
pub struct ReadingOrchestrator {
    db: Arc<dyn DatabaseService>,
    interpreter: Arc<dyn InterpretationService>,
    deck: Arc<Deck>,
    ledger: QuotaLedger,
    clock: Arc<dyn Clock>,
}

impl ReadingOrchestrator {
    pub fn new(
        db: Arc<dyn DatabaseService>,
        interpreter: Arc<dyn InterpretationService>,
        deck: Arc<Deck>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ledger = QuotaLedger::new(db.clone(), clock.clone());
        Self {
            db,
            interpreter,
            deck,
            ledger,
            clock,
        }
    }

    /// Runs one reading of `kind` for `user`.
    ///
    /// `time_of_day` is the band the caller greets the user with, so the prompt
    /// and the greeting never disagree.
    ///
    /// Storage failures are returned as `Err`; denials and generation failures
    /// are ordinary outcomes.
    #[instrument(skip_all, fields(user_id = user.id, kind = %kind))]
    pub async fn produce(
        &self,
        user: &User,
        kind: ReadingKind,
        question: Option<String>,
        time_of_day: TimeOfDay,
    ) -> PortResult<ReadingOutcome> {
        if let QuotaDecision::Denied(reason) = self.ledger.check_and_consume(user.id, kind).await? {
            info!(reason = reason.as_str(), "Reading denied by quota.");
            return Ok(ReadingOutcome::Denied(reason));
        }

        let cards = self
            .deck
            .draw(kind.arity())
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let (prompt_question, saved_question) = match kind {
            ReadingKind::Advice => (
                Some(ADVICE_PROMPT_QUESTION.to_string()),
                Some(ADVICE_SAVED_QUESTION.to_string()),
            ),
            _ => (question.clone(), question),
        };

        let request = build_request(&PromptContext {
            kind,
            cards: &cards,
            question: prompt_question.as_deref(),
            time_of_day,
            user,
        });

        let interpretation = match self.interpreter.generate(request.persona, &request.prompt).await {
            Ok(text) => text,
            Err(PortError::Generation(reason)) => {
                warn!(%reason, "Interpretation failed; quota slot stays consumed.");
                return Ok(ReadingOutcome::Failed(reason));
            }
            Err(e) => return Err(e),
        };

        let reading = Reading {
            id: Uuid::new_v4(),
            user_id: user.id,
            kind,
            cards,
            question: saved_question,
            interpretation,
            created_at: self.clock.now(),
        };
        self.db.save_reading(&reading).await?;

        info!(reading_id = %reading.id, "Reading completed.");
        Ok(ReadingOutcome::Completed(reading))
    }
}
