//! services/bot/src/web/protocol.rs
//!
//! Defines the message protocol between a messaging transport and the bot.
//!
//! A transport forwards one user event at a time and relays the replies back
//! to the user, rendering `choices` as whatever buttons it supports.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tarot_core::domain::{DrawnCard, Reading, ReadingKind};
use tarot_core::session::Input;
use utoipa::ToSchema;
use uuid::Uuid;

//=========================================================================================
// Messages Sent FROM the Transport TO the Bot
//=========================================================================================

/// One user event. Exactly one of `text` or `choice` should be set; `choice`
/// wins when both are present.
#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct InboundEvent {
    pub user_id: i64,
    /// Transport handle, stored at registration.
    #[serde(default)]
    pub username: Option<String>,
    /// Free text typed by the user, including commands such as `/start`.
    #[serde(default)]
    pub text: Option<String>,
    /// A machine choice id such as `three_card`, or a button label.
    #[serde(default)]
    pub choice: Option<String>,
}

impl InboundEvent {
    /// Normalizes the event into a state-machine input.
    pub fn input(&self) -> Option<Input> {
        match (&self.choice, &self.text) {
            (Some(choice), _) => Some(Input::from_choice(choice)),
            (None, Some(text)) => Some(Input::from_text(text)),
            (None, None) => None,
        }
    }
}

//=========================================================================================
// Messages Sent FROM the Bot TO the Transport
//=========================================================================================

/// One reply message with the choices valid after it.
#[derive(Serialize, Debug, Clone, PartialEq, Eq, ToSchema)]
pub struct OutboundMessage {
    pub text: String,
    pub choices: Vec<String>,
}

impl OutboundMessage {
    pub fn new(text: impl Into<String>, choices: Vec<String>) -> Self {
        Self {
            text: text.into(),
            choices,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }
}

//=========================================================================================
// REST Payloads
//=========================================================================================

#[derive(Serialize, Debug, ToSchema)]
pub struct DrawnCardView {
    pub id: u8,
    pub name: String,
    pub is_reversed: bool,
    pub position: Option<u8>,
    pub meaning: String,
}

impl From<&DrawnCard> for DrawnCardView {
    fn from(drawn: &DrawnCard) -> Self {
        Self {
            id: drawn.card.id,
            name: drawn.card.name.clone(),
            is_reversed: drawn.is_reversed,
            position: drawn.position,
            meaning: drawn.meaning().to_string(),
        }
    }
}

#[derive(Serialize, Debug, ToSchema)]
pub struct ReadingView {
    pub id: Uuid,
    #[schema(value_type = String, example = "three_card")]
    pub kind: ReadingKind,
    pub cards: Vec<DrawnCardView>,
    pub question: Option<String>,
    pub interpretation: String,
    pub created_at: DateTime<Utc>,
}

impl From<&Reading> for ReadingView {
    fn from(reading: &Reading) -> Self {
        Self {
            id: reading.id,
            kind: reading.kind,
            cards: reading.cards.iter().map(DrawnCardView::from).collect(),
            question: reading.question.clone(),
            interpretation: reading.interpretation.clone(),
            created_at: reading.created_at,
        }
    }
}

#[derive(Deserialize, Debug, ToSchema)]
pub struct PremiumRequest {
    pub premium: bool,
}
