//! services/bot/src/web/handler.rs
//!
//! Runs one inbound event through the session state machine and carries out
//! the resulting effect: registration writes, readings, history lookups.

use crate::web::protocol::OutboundMessage;
use crate::web::replies;
use crate::web::state::AppState;
use chrono::Local;
use tarot_core::domain::{NewUser, ReadingKind, User, UserId};
use tarot_core::orchestrator::ReadingOutcome;
use tarot_core::ports::PortResult;
use tarot_core::prompts::TimeOfDay;
use tarot_core::session::{Effect, Input, StepContext};
use tracing::{error, info, instrument};

/// Handles one event and returns the replies to relay, in order.
///
/// Infrastructure failures are logged, the user's session is dropped and a
/// generic apology is returned instead.
#[instrument(skip(state, username, input))]
pub async fn handle_input(
    state: &AppState,
    user_id: UserId,
    username: &str,
    input: Input,
) -> Vec<OutboundMessage> {
    match dispatch(state, user_id, username, input).await {
        Ok(messages) => messages,
        Err(e) => {
            error!("Failed to handle event: {:?}", e);
            state.sessions.reset(user_id);
            vec![replies::internal_error()]
        }
    }
}

async fn dispatch(
    state: &AppState,
    user_id: UserId,
    username: &str,
    input: Input,
) -> PortResult<Vec<OutboundMessage>> {
    let user = state.db.get_user(user_id).await?;
    let now = state.clock.now();

    // The session lock is released before any effect touches storage.
    let transition = state.sessions.advance(
        user_id,
        input,
        &StepContext {
            user: user.as_ref(),
            now,
        },
    );
    let choices = transition.next.choices();

    let messages = match (transition.effect, user) {
        (Effect::AskName, _) => vec![replies::ask_name()],
        (Effect::AskBirthDate { name }, _) => vec![replies::ask_birth_date(&name)],
        (Effect::AskZodiac, _) => vec![replies::ask_zodiac()],
        (Effect::Invalid(error), _) => vec![replies::invalid(error, choices)],
        (
            Effect::CompleteRegistration {
                name,
                birth_date,
                zodiac,
            },
            _,
        ) => {
            let profile = NewUser {
                id: user_id,
                name,
                username: username.to_string(),
                birth_date: Some(birth_date),
                zodiac: Some(zodiac),
            };
            state.db.create_user(&profile, now).await?;
            info!(zodiac = zodiac.as_str(), "User registered.");
            vec![replies::registration_complete(&profile.name, zodiac, birth_date)]
        }
        (Effect::Cancelled, _) => vec![replies::cancelled()],
        (Effect::ShowHelp, _) => vec![replies::help()],
        (Effect::Denied(reason), _) => vec![replies::denied(reason)],
        (Effect::RegistrationRequired, _) | (_, None) => vec![replies::registration_required()],
        (Effect::ShowMenu, Some(user)) => vec![replies::welcome_back(&user)],
        (Effect::AskSpreadKind, Some(user)) => vec![replies::ask_spread_kind(&user, choices)],
        (Effect::AskQuestion { kind }, Some(user)) => vec![replies::ask_question(&user, kind)],
        (Effect::ShowHistory, Some(_)) => {
            let readings = state
                .db
                .get_user_readings(user_id, state.config.history_limit)
                .await?;
            vec![replies::history(&readings)]
        }
        (Effect::Perform { kind, question }, Some(user)) => {
            let time_of_day = TimeOfDay::of(&now.with_timezone(&Local));
            perform(state, &user, kind, question, time_of_day).await?
        }
    };

    Ok(messages)
}

async fn perform(
    state: &AppState,
    user: &User,
    kind: ReadingKind,
    question: Option<String>,
    time_of_day: TimeOfDay,
) -> PortResult<Vec<OutboundMessage>> {
    let messages = match state.orchestrator.produce(user, kind, question, time_of_day).await? {
        ReadingOutcome::Completed(reading) => vec![
            replies::preparing(user, kind, time_of_day),
            replies::reading(&reading),
        ],
        ReadingOutcome::Denied(reason) => vec![replies::denied(reason)],
        ReadingOutcome::Failed(_) => vec![
            replies::preparing(user, kind, time_of_day),
            replies::generation_failed(kind),
        ],
    };
    Ok(messages)
}
