//! crates/tarot_core/src/domain.rs
//!
//! Defines the pure, core data structures for the reading service.
//! These structs are independent of any database or transport format.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Opaque numeric identity assigned by the messaging transport.
pub type UserId = i64;

//=========================================================================================
// Users
//=========================================================================================

/// Entitlement level governing quota rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Free,
    Premium,
}

/// Per-user daily usage counters. Mutated only through the rules in `quota.rs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaCounters {
    pub daily_simple_used: u32,
    pub daily_cardofday_used: u32,
    pub last_reset: DateTime<Utc>,
}

impl QuotaCounters {
    pub fn fresh(now: DateTime<Utc>) -> Self {
        Self {
            daily_simple_used: 0,
            daily_cardofday_used: 0,
            last_reset: now,
        }
    }
}

/// A registered user of the service.
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub birth_date: Option<NaiveDate>,
    pub zodiac: Option<ZodiacSign>,
    pub tier: Tier,
    pub quota: QuotaCounters,
    pub total_readings: u64,
    pub created_at: DateTime<Utc>,
}

/// Profile collected by the registration dialogue, written in one step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub id: UserId,
    pub name: String,
    pub username: String,
    pub birth_date: Option<NaiveDate>,
    pub zodiac: Option<ZodiacSign>,
}

impl User {
    pub fn is_premium(&self) -> bool {
        self.tier == Tier::Premium
    }
}

/// One of the twelve recognized zodiac categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ZodiacSign {
    Aries,
    Taurus,
    Gemini,
    Cancer,
    Leo,
    Virgo,
    Libra,
    Scorpio,
    Sagittarius,
    Capricorn,
    Aquarius,
    Pisces,
}

impl ZodiacSign {
    pub const ALL: [ZodiacSign; 12] = [
        ZodiacSign::Aries,
        ZodiacSign::Taurus,
        ZodiacSign::Gemini,
        ZodiacSign::Cancer,
        ZodiacSign::Leo,
        ZodiacSign::Virgo,
        ZodiacSign::Libra,
        ZodiacSign::Scorpio,
        ZodiacSign::Sagittarius,
        ZodiacSign::Capricorn,
        ZodiacSign::Aquarius,
        ZodiacSign::Pisces,
    ];

    /// Stable machine id, also used as the storage value.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Aries => "aries",
            Self::Taurus => "taurus",
            Self::Gemini => "gemini",
            Self::Cancer => "cancer",
            Self::Leo => "leo",
            Self::Virgo => "virgo",
            Self::Libra => "libra",
            Self::Scorpio => "scorpio",
            Self::Sagittarius => "sagittarius",
            Self::Capricorn => "capricorn",
            Self::Aquarius => "aquarius",
            Self::Pisces => "pisces",
        }
    }

    pub fn name_ru(&self) -> &'static str {
        match self {
            Self::Aries => "Овен",
            Self::Taurus => "Телец",
            Self::Gemini => "Близнецы",
            Self::Cancer => "Рак",
            Self::Leo => "Лев",
            Self::Virgo => "Дева",
            Self::Libra => "Весы",
            Self::Scorpio => "Скорпион",
            Self::Sagittarius => "Стрелец",
            Self::Capricorn => "Козерог",
            Self::Aquarius => "Водолей",
            Self::Pisces => "Рыбы",
        }
    }

    pub fn glyph(&self) -> &'static str {
        match self {
            Self::Aries => "♈️",
            Self::Taurus => "♉️",
            Self::Gemini => "♊️",
            Self::Cancer => "♋️",
            Self::Leo => "♌️",
            Self::Virgo => "♍️",
            Self::Libra => "♎️",
            Self::Scorpio => "♏️",
            Self::Sagittarius => "♐️",
            Self::Capricorn => "♑️",
            Self::Aquarius => "♒️",
            Self::Pisces => "♓️",
        }
    }

    /// The button label offered to the user, e.g. `♈️ Овен`.
    pub fn label(&self) -> String {
        format!("{} {}", self.glyph(), self.name_ru())
    }

    /// Recognizes a button label, a bare Russian name or a machine id.
    /// Leading glyphs and variation selectors are ignored.
    pub fn parse(input: &str) -> Option<Self> {
        let word: String = input
            .trim()
            .trim_start_matches(|c: char| !c.is_alphabetic())
            .trim()
            .to_lowercase();
        Self::ALL
            .into_iter()
            .find(|sign| sign.as_str() == word || sign.name_ru().to_lowercase() == word)
    }
}

impl fmt::Display for ZodiacSign {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name_ru())
    }
}

//=========================================================================================
// Cards
//=========================================================================================

/// Arcana class, used only to flag thematically significant spreads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Arcana {
    Major,
    Minor,
}

/// A static catalog entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Card {
    pub id: u8,
    pub name: String,
    pub upright: String,
    pub reversed: String,
    pub arcana: Arcana,
}

/// One catalog entry plus a per-draw orientation flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawnCard {
    pub card: Card,
    pub is_reversed: bool,
    /// 1-based position within the spread.
    pub position: Option<u8>,
}

impl DrawnCard {
    /// The meaning text matching this draw's orientation.
    pub fn meaning(&self) -> &str {
        if self.is_reversed {
            &self.card.reversed
        } else {
            &self.card.upright
        }
    }

    pub fn orientation_ru(&self) -> &'static str {
        if self.is_reversed {
            "перевёрнутая"
        } else {
            "прямая"
        }
    }
}

//=========================================================================================
// Readings
//=========================================================================================

/// Which counter (if any) a reading kind draws from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaPool {
    CardOfDay,
    Simple,
    PremiumOnly,
}

/// Every user-facing divination action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReadingKind {
    CardOfDay,
    SingleQuestion,
    ThreeCard,
    #[serde(rename = "deep_5")]
    Deep5,
    #[serde(rename = "deep_7")]
    Deep7,
    DeepPath,
    Advice,
    Energy,
}

impl ReadingKind {
    pub const ALL: [ReadingKind; 8] = [
        ReadingKind::CardOfDay,
        ReadingKind::SingleQuestion,
        ReadingKind::ThreeCard,
        ReadingKind::Deep5,
        ReadingKind::Deep7,
        ReadingKind::DeepPath,
        ReadingKind::Advice,
        ReadingKind::Energy,
    ];

    /// Number of cards in a reading of this kind.
    pub fn arity(&self) -> usize {
        match self {
            Self::CardOfDay | Self::SingleQuestion | Self::Advice => 1,
            Self::ThreeCard | Self::Energy => 3,
            Self::Deep5 => 5,
            Self::Deep7 | Self::DeepPath => 7,
        }
    }

    pub fn quota_pool(&self) -> QuotaPool {
        match self {
            Self::CardOfDay => QuotaPool::CardOfDay,
            Self::SingleQuestion | Self::ThreeCard | Self::Advice => QuotaPool::Simple,
            Self::Deep5 | Self::Deep7 | Self::DeepPath | Self::Energy => QuotaPool::PremiumOnly,
        }
    }

    /// Whether the dialogue asks the user for a question before drawing.
    pub fn asks_question(&self) -> bool {
        match self {
            Self::SingleQuestion | Self::ThreeCard | Self::Deep5 | Self::Deep7 | Self::DeepPath => {
                true
            }
            Self::CardOfDay | Self::Advice | Self::Energy => false,
        }
    }

    pub fn is_deep(&self) -> bool {
        matches!(self, Self::Deep5 | Self::Deep7 | Self::DeepPath)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CardOfDay => "card_of_day",
            Self::SingleQuestion => "single_question",
            Self::ThreeCard => "three_card",
            Self::Deep5 => "deep_5",
            Self::Deep7 => "deep_7",
            Self::DeepPath => "deep_path",
            Self::Advice => "advice",
            Self::Energy => "energy",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }

    /// Human-readable title used in history listings.
    pub fn title_ru(&self) -> &'static str {
        match self {
            Self::CardOfDay => "✨ Карта дня",
            Self::SingleQuestion => "🔮 Один вопрос",
            Self::ThreeCard => "🌙 Расклад 3 карты",
            Self::Deep5 => "🔮 Расклад 5 карт",
            Self::Deep7 => "✨ Расклад 7 карт",
            Self::DeepPath => "🌟 Глубинный путь",
            Self::Advice => "⭐ Совет Таро",
            Self::Energy => "💫 Моя энергетика",
        }
    }
}

impl fmt::Display for ReadingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Machine-readable reason attached to a quota denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuotaDenial {
    CardOfDayLimit,
    SimpleLimit,
    PremiumOnly,
}

impl QuotaDenial {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CardOfDayLimit => "card_of_day_limit",
            Self::SimpleLimit => "simple_limit",
            Self::PremiumOnly => "premium_only",
        }
    }
}

/// Outcome of an entitlement check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuotaDecision {
    Allowed,
    Denied(QuotaDenial),
}

impl QuotaDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Self::Allowed)
    }
}

/// A completed, persisted reading. Immutable once created.
#[derive(Debug, Clone)]
pub struct Reading {
    pub id: Uuid,
    pub user_id: UserId,
    pub kind: ReadingKind,
    pub cards: Vec<DrawnCard>,
    pub question: Option<String>,
    pub interpretation: String,
    pub created_at: DateTime<Utc>,
}
