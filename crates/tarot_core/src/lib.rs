pub mod deck;
pub mod domain;
pub mod orchestrator;
pub mod ports;
pub mod prompts;
pub mod quota;
pub mod session;

pub use deck::{Catalog, CatalogError, Deck, DeckError};
pub use domain::{
    Arcana, Card, DrawnCard, NewUser, QuotaCounters, QuotaDecision, QuotaDenial, Reading, ReadingKind, Tier,
    User, UserId, ZodiacSign,
};
pub use orchestrator::{ReadingOrchestrator, ReadingOutcome};
pub use ports::{Clock, DatabaseService, InterpretationService, PortError, PortResult, SystemClock};
pub use quota::QuotaLedger;
pub use session::{Effect, Input, MenuChoice, Session, StepContext, Transition};
