//! crates/tarot_core/src/session.rs
//!
//! The per-user dialogue state machine.
//!
//! `step` is a pure transition: it takes the current session, one normalized
//! input and a read-only context, and returns the next session together with
//! a single effect for the caller to execute. It never touches storage or the
//! generator; registration completion and readings are reported as effects.

use crate::domain::{QuotaDecision, QuotaDenial, ReadingKind, User, ZodiacSign};
use chrono::{DateTime, Datelike, NaiveDate, Utc};

pub const NAME_MIN_CHARS: usize = 2;
pub const NAME_MAX_CHARS: usize = 50;
pub const EARLIEST_BIRTH_YEAR: i32 = 1900;
pub const BIRTH_DATE_FORMAT: &str = "%d.%m.%Y";

const GENERAL_READING_WORDS: [&str; 3] = ["общий", "общее", "general"];

pub const CANCEL_LABEL: &str = "❌ Отменить";
pub const MAIN_MENU_LABEL: &str = "🏠 Главное меню";

//=========================================================================================
// Sessions
//=========================================================================================

/// The current dialogue of one user. `Idle` means no live session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Session {
    #[default]
    Idle,
    Registering(RegistrationStep),
    Reading(ReadingStep),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationStep {
    AwaitingName,
    AwaitingBirthDate(PendingName),
    AwaitingZodiac(PendingProfile),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingName {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingProfile {
    pub name: String,
    pub birth_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadingStep {
    /// Choosing among the deep spreads.
    AwaitingKind,
    AwaitingQuestion(PendingReading),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingReading {
    pub kind: ReadingKind,
}

impl Session {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    /// Labels of the choices that are valid in this state.
    pub fn choices(&self) -> Vec<String> {
        match self {
            Self::Idle => MenuChoice::MAIN_MENU.iter().map(|c| c.label().to_string()).collect(),
            Self::Registering(RegistrationStep::AwaitingZodiac(_)) => {
                ZodiacSign::ALL.iter().map(ZodiacSign::label).collect()
            }
            Self::Registering(_) => Vec::new(),
            Self::Reading(ReadingStep::AwaitingKind) => MenuChoice::DEEP_SPREADS
                .iter()
                .map(|c| c.label().to_string())
                .chain(std::iter::once(CANCEL_LABEL.to_string()))
                .collect(),
            Self::Reading(ReadingStep::AwaitingQuestion(_)) => vec![CANCEL_LABEL.to_string()],
        }
    }
}

//=========================================================================================
// Inputs
//=========================================================================================

/// Menu entries a user can select.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Reading(ReadingKind),
    /// Opens the deep-spread sub-menu.
    DeepSpread,
    History,
    Help,
}

impl MenuChoice {
    pub const MAIN_MENU: [MenuChoice; 8] = [
        MenuChoice::Reading(ReadingKind::CardOfDay),
        MenuChoice::Reading(ReadingKind::SingleQuestion),
        MenuChoice::Reading(ReadingKind::ThreeCard),
        MenuChoice::DeepSpread,
        MenuChoice::Reading(ReadingKind::Energy),
        MenuChoice::Reading(ReadingKind::Advice),
        MenuChoice::History,
        MenuChoice::Help,
    ];

    pub const DEEP_SPREADS: [MenuChoice; 3] = [
        MenuChoice::Reading(ReadingKind::Deep5),
        MenuChoice::Reading(ReadingKind::Deep7),
        MenuChoice::Reading(ReadingKind::DeepPath),
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Self::Reading(kind) => kind.as_str(),
            Self::DeepSpread => "deep_spread",
            Self::History => "history",
            Self::Help => "help",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Reading(ReadingKind::CardOfDay) => "✨ Карта дня",
            Self::Reading(ReadingKind::SingleQuestion) => "🔮 Один вопрос",
            Self::Reading(ReadingKind::ThreeCard) => "🌙 Расклад 3 карты",
            Self::Reading(ReadingKind::Deep5) => "🔮 Расклад 5 карт",
            Self::Reading(ReadingKind::Deep7) => "✨ Расклад 7 карт",
            Self::Reading(ReadingKind::DeepPath) => "🌟 Глубинный путь",
            Self::Reading(ReadingKind::Energy) => "💫 Моя энергетика",
            Self::Reading(ReadingKind::Advice) => "⭐ Совет Таро",
            Self::DeepSpread => "🔥 Глубокий расклад",
            Self::History => "📖 История чтений",
            Self::Help => "ℹ️ О боте",
        }
    }

    fn all() -> impl Iterator<Item = MenuChoice> {
        Self::MAIN_MENU.into_iter().chain(Self::DEEP_SPREADS)
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::all().find(|choice| choice.id() == id)
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::all().find(|choice| choice.label() == label)
    }
}

/// One normalized inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Start,
    Cancel,
    Menu(MenuChoice),
    Text(String),
}

impl Input {
    /// Interprets free text, recognizing commands and button labels.
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        let command = trimmed.split_whitespace().next().unwrap_or_default();
        match command {
            "/start" => return Self::Start,
            "/help" => return Self::Menu(MenuChoice::Help),
            "/cancel" => return Self::Cancel,
            _ => {}
        }
        if trimmed == CANCEL_LABEL || trimmed == MAIN_MENU_LABEL {
            return Self::Cancel;
        }
        match MenuChoice::from_label(trimmed) {
            Some(choice) => Self::Menu(choice),
            None => Self::Text(text.to_string()),
        }
    }

    /// Interprets a choice id sent by the transport; unknown ids fall back to text.
    pub fn from_choice(id: &str) -> Self {
        match id.trim() {
            "start" => Self::Start,
            "cancel" | "menu" => Self::Cancel,
            other => match MenuChoice::from_id(other) {
                Some(choice) => Self::Menu(choice),
                None => Self::from_text(other),
            },
        }
    }
}

//=========================================================================================
// Validation
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("name must be 2-50 characters")]
    NameLength,
    #[error("birth date must look like DD.MM.YYYY")]
    DateFormat,
    #[error("birth date must be between 1900 and today")]
    DateOutOfRange,
    #[error("not one of the twelve zodiac signs")]
    UnknownZodiac,
    #[error("not one of the offered spreads")]
    UnknownSpread,
    #[error("registration must be finished first")]
    RegistrationPending,
}

pub fn validate_name(text: &str) -> Result<String, ValidationError> {
    let name = text.trim();
    let chars = name.chars().count();
    if (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars) {
        Ok(name.to_string())
    } else {
        Err(ValidationError::NameLength)
    }
}

pub fn parse_birth_date(text: &str, today: NaiveDate) -> Result<NaiveDate, ValidationError> {
    let date = NaiveDate::parse_from_str(text.trim(), BIRTH_DATE_FORMAT)
        .map_err(|_| ValidationError::DateFormat)?;
    if date.year() < EARLIEST_BIRTH_YEAR || date > today {
        return Err(ValidationError::DateOutOfRange);
    }
    Ok(date)
}

/// The general-reading sentinel turns into "no question".
pub fn normalize_question(text: &str) -> Option<String> {
    let question = text.trim();
    let lowered = question.to_lowercase();
    if question.is_empty() || GENERAL_READING_WORDS.contains(&lowered.as_str()) {
        None
    } else {
        Some(question.to_string())
    }
}

//=========================================================================================
// Transitions
//=========================================================================================

/// What the caller must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    AskName,
    AskBirthDate { name: String },
    AskZodiac,
    /// Input rejected; re-prompt the current step.
    Invalid(ValidationError),
    CompleteRegistration {
        name: String,
        birth_date: NaiveDate,
        zodiac: ZodiacSign,
    },
    ShowMenu,
    Cancelled,
    RegistrationRequired,
    Denied(QuotaDenial),
    AskSpreadKind,
    AskQuestion { kind: ReadingKind },
    Perform {
        kind: ReadingKind,
        question: Option<String>,
    },
    ShowHistory,
    ShowHelp,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Session,
    pub effect: Effect,
}

impl Transition {
    fn to(next: Session, effect: Effect) -> Self {
        Self { next, effect }
    }

    fn idle(effect: Effect) -> Self {
        Self::to(Session::Idle, effect)
    }
}

/// Read-only facts a transition may depend on.
pub struct StepContext<'a> {
    pub user: Option<&'a User>,
    pub now: DateTime<Utc>,
}

impl StepContext<'_> {
    fn preview(&self, user: &User, kind: ReadingKind) -> QuotaDecision {
        user.quota.peek(user.tier, kind, self.now)
    }
}

/// Advances one user's dialogue by one input.
pub fn step(session: Session, input: Input, ctx: &StepContext<'_>) -> Transition {
    match (session, input) {
        (_, Input::Start) => start(ctx),
        (Session::Idle, Input::Cancel) => match ctx.user {
            Some(_) => Transition::idle(Effect::ShowMenu),
            None => Transition::idle(Effect::RegistrationRequired),
        },
        (_, Input::Cancel) => Transition::idle(Effect::Cancelled),
        (Session::Registering(registration), input) => register(registration, input, ctx),
        (Session::Reading(ReadingStep::AwaitingKind), Input::Menu(MenuChoice::Reading(kind)))
            if kind.is_deep() =>
        {
            Transition::to(
                Session::Reading(ReadingStep::AwaitingQuestion(PendingReading { kind })),
                Effect::AskQuestion { kind },
            )
        }
        (Session::Reading(ReadingStep::AwaitingKind), _) => Transition::to(
            Session::Reading(ReadingStep::AwaitingKind),
            Effect::Invalid(ValidationError::UnknownSpread),
        ),
        (Session::Reading(ReadingStep::AwaitingQuestion(pending)), Input::Text(text)) => {
            Transition::idle(Effect::Perform {
                kind: pending.kind,
                question: normalize_question(&text),
            })
        }
        (Session::Reading(ReadingStep::AwaitingQuestion(_)) | Session::Idle, Input::Menu(choice)) => {
            select(choice, ctx)
        }
        (Session::Idle, Input::Text(_)) => match ctx.user {
            Some(_) => Transition::idle(Effect::ShowMenu),
            None => Transition::idle(Effect::RegistrationRequired),
        },
    }
}

fn start(ctx: &StepContext<'_>) -> Transition {
    match ctx.user {
        Some(_) => Transition::idle(Effect::ShowMenu),
        None => Transition::to(
            Session::Registering(RegistrationStep::AwaitingName),
            Effect::AskName,
        ),
    }
}

fn register(step: RegistrationStep, input: Input, ctx: &StepContext<'_>) -> Transition {
    let text = match input {
        Input::Text(text) => text,
        _ => {
            return Transition::to(
                Session::Registering(step),
                Effect::Invalid(ValidationError::RegistrationPending),
            )
        }
    };

    match step {
        RegistrationStep::AwaitingName => match validate_name(&text) {
            Ok(name) => Transition::to(
                Session::Registering(RegistrationStep::AwaitingBirthDate(PendingName {
                    name: name.clone(),
                })),
                Effect::AskBirthDate { name },
            ),
            Err(error) => Transition::to(
                Session::Registering(RegistrationStep::AwaitingName),
                Effect::Invalid(error),
            ),
        },
        RegistrationStep::AwaitingBirthDate(pending) => {
            match parse_birth_date(&text, ctx.now.date_naive()) {
                Ok(birth_date) => Transition::to(
                    Session::Registering(RegistrationStep::AwaitingZodiac(PendingProfile {
                        name: pending.name,
                        birth_date,
                    })),
                    Effect::AskZodiac,
                ),
                Err(error) => Transition::to(
                    Session::Registering(RegistrationStep::AwaitingBirthDate(pending)),
                    Effect::Invalid(error),
                ),
            }
        }
        RegistrationStep::AwaitingZodiac(profile) => match ZodiacSign::parse(&text) {
            Some(zodiac) => Transition::idle(Effect::CompleteRegistration {
                name: profile.name,
                birth_date: profile.birth_date,
                zodiac,
            }),
            None => Transition::to(
                Session::Registering(RegistrationStep::AwaitingZodiac(profile)),
                Effect::Invalid(ValidationError::UnknownZodiac),
            ),
        },
    }
}

fn select(choice: MenuChoice, ctx: &StepContext<'_>) -> Transition {
    if choice == MenuChoice::Help {
        return Transition::idle(Effect::ShowHelp);
    }
    let Some(user) = ctx.user else {
        return Transition::idle(Effect::RegistrationRequired);
    };

    match choice {
        MenuChoice::Help => Transition::idle(Effect::ShowHelp),
        MenuChoice::History => Transition::idle(Effect::ShowHistory),
        MenuChoice::DeepSpread => match ctx.preview(user, ReadingKind::Deep5) {
            QuotaDecision::Denied(reason) => Transition::idle(Effect::Denied(reason)),
            QuotaDecision::Allowed => Transition::to(
                Session::Reading(ReadingStep::AwaitingKind),
                Effect::AskSpreadKind,
            ),
        },
        MenuChoice::Reading(kind) if kind.asks_question() => match ctx.preview(user, kind) {
            QuotaDecision::Denied(reason) => Transition::idle(Effect::Denied(reason)),
            QuotaDecision::Allowed => Transition::to(
                Session::Reading(ReadingStep::AwaitingQuestion(PendingReading { kind })),
                Effect::AskQuestion { kind },
            ),
        },
        // Immediate readings are checked atomically by the orchestrator.
        MenuChoice::Reading(kind) => Transition::idle(Effect::Perform {
            kind,
            question: None,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{QuotaCounters, Tier};
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap()
    }

    fn user(tier: Tier) -> User {
        User {
            id: 7,
            name: "Мария".to_string(),
            username: "maria".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1990, 3, 15),
            zodiac: Some(ZodiacSign::Pisces),
            tier,
            quota: QuotaCounters::fresh(now()),
            total_readings: 0,
            created_at: now(),
        }
    }

    fn anonymous() -> StepContext<'static> {
        StepContext { user: None, now: now() }
    }

    fn text(s: &str) -> Input {
        Input::Text(s.to_string())
    }

    fn awaiting_birth_date() -> Session {
        Session::Registering(RegistrationStep::AwaitingBirthDate(PendingName {
            name: "Алиса".to_string(),
        }))
    }

    fn awaiting_zodiac() -> Session {
        Session::Registering(RegistrationStep::AwaitingZodiac(PendingProfile {
            name: "Алиса".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1995, 7, 1).unwrap(),
        }))
    }

    #[test]
    fn start_registers_unknown_users() {
        let t = step(Session::Idle, Input::Start, &anonymous());
        assert_eq!(t.next, Session::Registering(RegistrationStep::AwaitingName));
        assert_eq!(t.effect, Effect::AskName);
    }

    #[test]
    fn start_offers_menu_to_known_users() {
        let known = user(Tier::Free);
        let ctx = StepContext { user: Some(&known), now: now() };
        let t = step(Session::Idle, Input::Start, &ctx);
        assert!(t.next.is_idle());
        assert_eq!(t.effect, Effect::ShowMenu);
    }

    #[test]
    fn name_length_is_checked_after_trimming() {
        let ctx = anonymous();
        let awaiting = Session::Registering(RegistrationStep::AwaitingName);

        let t = step(awaiting.clone(), text("A"), &ctx);
        assert_eq!(t.next, awaiting);
        assert_eq!(t.effect, Effect::Invalid(ValidationError::NameLength));

        let t = step(awaiting.clone(), text("   Al  "), &ctx);
        assert_eq!(
            t.next,
            Session::Registering(RegistrationStep::AwaitingBirthDate(PendingName {
                name: "Al".to_string()
            }))
        );
        assert_eq!(t.effect, Effect::AskBirthDate { name: "Al".to_string() });

        let long = "я".repeat(51);
        assert_eq!(step(awaiting.clone(), text(&long), &ctx).effect, Effect::Invalid(ValidationError::NameLength));
        let fifty = "я".repeat(50);
        assert_eq!(step(awaiting, text(&fifty), &ctx).effect, Effect::AskBirthDate { name: fifty });
    }

    #[test]
    fn birth_date_rules() {
        let ctx = anonymous();
        let cases = [
            ("31.02.1990", ValidationError::DateFormat),
            ("1990-03-15", ValidationError::DateFormat),
            ("вчера", ValidationError::DateFormat),
            ("15.03.1890", ValidationError::DateOutOfRange),
            ("16.06.2024", ValidationError::DateOutOfRange),
            ("01.01.2030", ValidationError::DateOutOfRange),
        ];
        for (input, error) in cases {
            let t = step(awaiting_birth_date(), text(input), &ctx);
            assert_eq!(t.next, awaiting_birth_date(), "{input}");
            assert_eq!(t.effect, Effect::Invalid(error), "{input}");
        }

        let t = step(awaiting_birth_date(), text("15.06.2024"), &ctx);
        assert_eq!(t.effect, Effect::AskZodiac);

        let t = step(awaiting_birth_date(), text("15.03.1990"), &ctx);
        assert_eq!(
            t.next,
            Session::Registering(RegistrationStep::AwaitingZodiac(PendingProfile {
                name: "Алиса".to_string(),
                birth_date: NaiveDate::from_ymd_opt(1990, 3, 15).unwrap(),
            }))
        );
    }

    #[test]
    fn zodiac_completes_registration() {
        let ctx = anonymous();
        let t = step(awaiting_zodiac(), text("Змееносец"), &ctx);
        assert_eq!(t.next, awaiting_zodiac());
        assert_eq!(t.effect, Effect::Invalid(ValidationError::UnknownZodiac));

        for sign in ZodiacSign::ALL {
            let t = step(awaiting_zodiac(), text(&sign.label()), &ctx);
            assert!(t.next.is_idle());
            assert_eq!(
                t.effect,
                Effect::CompleteRegistration {
                    name: "Алиса".to_string(),
                    birth_date: NaiveDate::from_ymd_opt(1995, 7, 1).unwrap(),
                    zodiac: sign,
                }
            );
        }

        let t = step(awaiting_zodiac(), Input::from_choice("scorpio"), &ctx);
        assert!(matches!(t.effect, Effect::CompleteRegistration { zodiac: ZodiacSign::Scorpio, .. }));
    }

    #[test]
    fn cancel_clears_any_live_session() {
        let known = user(Tier::Premium);
        let ctx = StepContext { user: Some(&known), now: now() };
        let live = [
            Session::Registering(RegistrationStep::AwaitingName),
            awaiting_birth_date(),
            awaiting_zodiac(),
            Session::Reading(ReadingStep::AwaitingKind),
            Session::Reading(ReadingStep::AwaitingQuestion(PendingReading {
                kind: ReadingKind::ThreeCard,
            })),
        ];
        for session in live {
            let t = step(session, Input::from_text(CANCEL_LABEL), &ctx);
            assert!(t.next.is_idle());
            assert_eq!(t.effect, Effect::Cancelled);
        }
    }

    #[test]
    fn start_mid_registration_restarts_from_scratch() {
        let t = step(awaiting_zodiac(), Input::from_text("/start"), &anonymous());
        assert_eq!(t.next, Session::Registering(RegistrationStep::AwaitingName));
        assert_eq!(t.effect, Effect::AskName);
    }

    #[test]
    fn menu_during_registration_keeps_the_step() {
        let t = step(awaiting_birth_date(), Input::from_text("✨ Карта дня"), &anonymous());
        assert_eq!(t.next, awaiting_birth_date());
        assert_eq!(t.effect, Effect::Invalid(ValidationError::RegistrationPending));
    }

    #[test]
    fn question_readings_wait_for_the_question() {
        let known = user(Tier::Free);
        let ctx = StepContext { user: Some(&known), now: now() };

        let t = step(Session::Idle, Input::from_text("🌙 Расклад 3 карты"), &ctx);
        let awaiting = Session::Reading(ReadingStep::AwaitingQuestion(PendingReading {
            kind: ReadingKind::ThreeCard,
        }));
        assert_eq!(t.next, awaiting);
        assert_eq!(t.effect, Effect::AskQuestion { kind: ReadingKind::ThreeCard });

        let t = step(awaiting.clone(), text("  Что с работой?  "), &ctx);
        assert!(t.next.is_idle());
        assert_eq!(
            t.effect,
            Effect::Perform {
                kind: ReadingKind::ThreeCard,
                question: Some("Что с работой?".to_string())
            }
        );

        let t = step(awaiting, text("Общий"), &ctx);
        assert_eq!(
            t.effect,
            Effect::Perform {
                kind: ReadingKind::ThreeCard,
                question: None
            }
        );
    }

    #[test]
    fn deep_spread_goes_through_kind_selection() {
        let premium = user(Tier::Premium);
        let ctx = StepContext { user: Some(&premium), now: now() };

        let t = step(Session::Idle, Input::from_choice("deep_spread"), &ctx);
        assert_eq!(t.next, Session::Reading(ReadingStep::AwaitingKind));
        assert_eq!(t.effect, Effect::AskSpreadKind);

        let t = step(t.next, text("что-то непонятное"), &ctx);
        assert_eq!(t.next, Session::Reading(ReadingStep::AwaitingKind));
        assert_eq!(t.effect, Effect::Invalid(ValidationError::UnknownSpread));

        let t = step(t.next, Input::from_choice("three_card"), &ctx);
        assert_eq!(t.next, Session::Reading(ReadingStep::AwaitingKind));

        let t = step(t.next, Input::from_text("🌟 Глубинный путь"), &ctx);
        assert_eq!(
            t.next,
            Session::Reading(ReadingStep::AwaitingQuestion(PendingReading {
                kind: ReadingKind::DeepPath
            }))
        );
        assert_eq!(t.effect, Effect::AskQuestion { kind: ReadingKind::DeepPath });
    }

    #[test]
    fn free_users_are_turned_away_before_a_dialogue_starts() {
        let free = user(Tier::Free);
        let ctx = StepContext { user: Some(&free), now: now() };

        let t = step(Session::Idle, Input::from_choice("deep_spread"), &ctx);
        assert!(t.next.is_idle());
        assert_eq!(t.effect, Effect::Denied(QuotaDenial::PremiumOnly));

        let mut spent = user(Tier::Free);
        spent.quota.daily_simple_used = 2;
        let ctx = StepContext { user: Some(&spent), now: now() };
        let t = step(Session::Idle, Input::from_choice("single_question"), &ctx);
        assert!(t.next.is_idle());
        assert_eq!(t.effect, Effect::Denied(QuotaDenial::SimpleLimit));
    }

    #[test]
    fn immediate_readings_perform_without_a_dialogue() {
        let free = user(Tier::Free);
        let ctx = StepContext { user: Some(&free), now: now() };
        for (choice, kind) in [
            ("card_of_day", ReadingKind::CardOfDay),
            ("advice", ReadingKind::Advice),
            ("energy", ReadingKind::Energy),
        ] {
            let t = step(Session::Idle, Input::from_choice(choice), &ctx);
            assert!(t.next.is_idle());
            assert_eq!(t.effect, Effect::Perform { kind, question: None });
        }
    }

    #[test]
    fn unregistered_users_must_register_first() {
        let t = step(Session::Idle, Input::from_choice("card_of_day"), &anonymous());
        assert_eq!(t.effect, Effect::RegistrationRequired);
        let t = step(Session::Idle, Input::from_text("/help"), &anonymous());
        assert_eq!(t.effect, Effect::ShowHelp);
    }

    #[test]
    fn choices_follow_the_state() {
        assert_eq!(Session::Idle.choices().len(), 8);
        assert_eq!(awaiting_zodiac().choices().len(), 12);
        assert!(awaiting_birth_date().choices().is_empty());
        assert_eq!(Session::Reading(ReadingStep::AwaitingKind).choices().len(), 4);
    }

    #[test]
    fn sentinel_detection() {
        assert_eq!(normalize_question("общее"), None);
        assert_eq!(normalize_question(" GENERAL "), None);
        assert_eq!(normalize_question("   "), None);
        assert_eq!(normalize_question("общий вопрос"), Some("общий вопрос".to_string()));
    }
}
