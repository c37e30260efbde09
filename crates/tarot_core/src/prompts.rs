//! crates/tarot_core/src/prompts.rs
//!
//! Builds the generation request for a reading: the system persona and the
//! user prompt, both selected by reading kind.

use crate::domain::{Arcana, DrawnCard, ReadingKind, User};
use chrono::Timelike;

/// Question sent to the generator for an advice reading.
pub const ADVICE_PROMPT_QUESTION: &str = "Какой совет карты могут дать мне прямо сейчас?";
/// Question recorded on a persisted advice reading.
pub const ADVICE_SAVED_QUESTION: &str = "Совет Таро";

const GUIDE_PERSONA: &str = r#"Ты — живой, мягкий и мудрый Таро-проводник.
Твоя задача — чтобы человек почувствовал настоящее присутствие, внимание и эмоциональное тепло.
Ты отвечаешь как духовный наставник, а не как сухой алгоритм.

ТВОЙ СТИЛЬ:
- спокойный, уверенный, поддерживающий
- небольшая доля мистики, но без фанатизма
- короткие, аккуратные, красивые фразы
- используешь эмодзи только 1-2 за весь ответ
- всегда доброжелателен, без жёстких формулировок

СТРУКТУРА ОТВЕТА:
1. Краткое вступление с эмпатией (1 предложение)
2. Интерпретация карты в контексте вопроса (2-3 предложения)
3. Мягкий совет или направление (1-2 предложения)
4. Лёгкое ободрение (по желанию)

ВАЖНО:
- Никогда не предсказывай смерть, болезнь, плохие события
- Объём ответа: 150-250 слов
- Отвечай только на русском языке"#;

const DEEP_SPREAD_PERSONA: &str = r#"Ты — профессиональный таролог, который делает углублённые расклады Таро.

ТВОЙ СТИЛЬ:
- мягкий, духовный, уверенный
- простые и красивые формулировки
- без лишней эзотерики, только суть
- 1-2 эмодзи максимум
- никаких пугающих предсказаний

ОБЩИЕ ПРАВИЛА:
1. Всегда указывай названия всех карт расклада
2. Каждой карте дай краткое значение (1 предложение)
3. Интерпретируй карты связанно, как единую историю
4. Обязательно добавляй мягкий совет
5. Если выпадают старшие арканы — отмечай это

Отвечай глубоко, но легко, как будто говоришь с человеком лично.
Отвечай только на русском языке."#;

const ENERGY_PERSONA: &str = r#"Ты — тонкий проводник, который умеет читать энергетическое состояние человека через карты Таро.

ТВОЯ ЗАДАЧА:
Дать человеку описание его энергетики: эмоциональной, внутренней, внешней и духовной.

ТВОЙ ТОН:
- тёплый, поддерживающий
- мягкий, но уверенный
- живой, без клише

ИСПОЛЬЗУЙ образы света, движения, интуиции.
Не предсказывай судьбу напрямую и не говори про негатив жёстко.
Всегда завершай лёгкой фразой поддержки.
Отвечай только на русском языке."#;

//=========================================================================================
// Time of day
//=========================================================================================

/// Wall-clock hour bands that colour the prompt and the greeting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    /// 00:00–05:59
    DeepNight,
    /// 06:00–10:59
    Morning,
    /// 11:00–16:59
    Day,
    /// 17:00–20:59
    Evening,
    /// 21:00–23:59
    Late,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=5 => Self::DeepNight,
            6..=10 => Self::Morning,
            11..=16 => Self::Day,
            17..=20 => Self::Evening,
            _ => Self::Late,
        }
    }

    pub fn of<T: Timelike>(time: &T) -> Self {
        Self::from_hour(time.hour())
    }

    /// Contextual phrase inserted into the prompt.
    pub fn phrase(&self) -> &'static str {
        match self {
            Self::DeepNight => "в эту ночную тишину, когда Вселенная особенно чутка",
            Self::Morning => "в это утро, когда энергия дня только раскрывается",
            Self::Day => "в этот день, когда солнце на пике своей силы",
            Self::Evening => "в этот вечер, когда день начинает отпускать",
            Self::Late => "в это время, когда наступает час рефлексии",
        }
    }

    /// Opening line addressed to the user before a card of the day.
    pub fn greeting(&self, name: &str) -> String {
        match self {
            Self::DeepNight => format!(
                "Вижу, {name}, ты не спишь... Давай посмотрим, что карты скажут тебе в эту тихую ночь."
            ),
            Self::Morning => format!("Доброе утро, {name} ✨ Вытягиваю карту дня для тебя..."),
            Self::Day => format!("{name}, чувствую твою энергию... Сейчас вытяну карту для тебя."),
            Self::Evening => format!("Добрый вечер, {name}... Перемешиваю колоду."),
            Self::Late => format!("{name}, давай посмотрим, что карты хотят сказать тебе сегодня..."),
        }
    }
}

//=========================================================================================
// Per-kind tables
//=========================================================================================

/// System persona for the generator.
pub fn persona(kind: ReadingKind) -> &'static str {
    match kind {
        ReadingKind::CardOfDay
        | ReadingKind::SingleQuestion
        | ReadingKind::ThreeCard
        | ReadingKind::Advice => GUIDE_PERSONA,
        ReadingKind::Deep5 | ReadingKind::Deep7 | ReadingKind::DeepPath => DEEP_SPREAD_PERSONA,
        ReadingKind::Energy => ENERGY_PERSONA,
    }
}

/// Position labels, one per card, for spreads that have them.
pub fn position_labels(kind: ReadingKind) -> &'static [&'static str] {
    match kind {
        ReadingKind::ThreeCard => &["Прошлое", "Настоящее", "Будущее"],
        ReadingKind::Deep5 => &["Прошлое", "Настоящее", "Будущее", "Скрытые влияния", "Совет"],
        ReadingKind::Deep7 => &[
            "Внешние обстоятельства",
            "Внутренние ощущения",
            "Что помогает",
            "Что мешает",
            "Правильное действие",
            "К чему всё идёт",
            "Итог",
        ],
        ReadingKind::DeepPath => &[
            "Твоё текущее состояние",
            "Твоя главная блокировка",
            "Что поддерживает",
            "Главный урок",
            "Путь души",
            "Как действовать",
            "К чему приведёт путь",
        ],
        ReadingKind::CardOfDay
        | ReadingKind::SingleQuestion
        | ReadingKind::Advice
        | ReadingKind::Energy => &[],
    }
}

pub fn spread_title(kind: ReadingKind) -> &'static str {
    match kind {
        ReadingKind::CardOfDay => "Карта дня",
        ReadingKind::SingleQuestion => "Один вопрос",
        ReadingKind::ThreeCard => "Прошлое - Настоящее - Будущее",
        ReadingKind::Deep5 => "Расклад на 5 карт",
        ReadingKind::Deep7 => "Расклад на 7 карт",
        ReadingKind::DeepPath => "Глубинный путь",
        ReadingKind::Advice => "Совет Таро",
        ReadingKind::Energy => "Личная энергетика",
    }
}

/// Minimum count of major arcana that makes a spread worth a significance note.
pub fn significance_threshold(kind: ReadingKind) -> Option<usize> {
    match kind {
        ReadingKind::ThreeCard => Some(2),
        ReadingKind::Deep5 | ReadingKind::Deep7 | ReadingKind::DeepPath => Some(3),
        ReadingKind::CardOfDay
        | ReadingKind::SingleQuestion
        | ReadingKind::Advice
        | ReadingKind::Energy => None,
    }
}

pub fn major_arcana_count(cards: &[DrawnCard]) -> usize {
    cards
        .iter()
        .filter(|drawn| drawn.card.arcana == Arcana::Major)
        .count()
}

/// The annotation appended to the prompt when a spread is rich in major arcana.
pub fn significance_note(kind: ReadingKind, cards: &[DrawnCard]) -> Option<String> {
    let threshold = significance_threshold(kind)?;
    let majors = major_arcana_count(cards);
    if majors < threshold {
        return None;
    }
    let note = if kind.is_deep() {
        format!("(Выпало {majors} Старших Арканов — период особенно значимый)")
    } else {
        "(Заметь: выпало несколько Старших Арканов — период значимый, важный)".to_string()
    };
    Some(note)
}

//=========================================================================================
// Prompt construction
//=========================================================================================

/// What the interpretation generator receives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub persona: &'static str,
    pub prompt: String,
}

/// Everything a prompt may draw on.
pub struct PromptContext<'a> {
    pub kind: ReadingKind,
    pub cards: &'a [DrawnCard],
    pub question: Option<&'a str>,
    pub time_of_day: TimeOfDay,
    pub user: &'a User,
}

fn describe_spread(kind: ReadingKind, cards: &[DrawnCard]) -> String {
    let labels = position_labels(kind);
    cards
        .iter()
        .enumerate()
        .map(|(i, drawn)| {
            let line = format!("{} ({}) - {}", drawn.card.name, drawn.orientation_ru(), drawn.meaning());
            match labels.get(i) {
                Some(label) if kind.is_deep() => format!("{}) {label}: {line}", i + 1),
                Some(label) => format!("{label}: {line}"),
                None => format!("{}) {line}", i + 1),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn single_card_prompt(ctx: &PromptContext<'_>, drawn: &DrawnCard) -> String {
    let time = ctx.time_of_day.phrase();
    match ctx.question {
        Some(question) => format!(
            "Человек пришёл {time} с вопросом, который его волнует.\n\n\
             Его вопрос: \"{question}\"\n\n\
             Карта, которая пришла: {name} ({orientation})\n\
             Значение карты: {meaning}\n\n\
             Дай живую, тёплую интерпретацию. Почувствуй энергию вопроса. \
             Объясни, как эта карта отвечает и что она советует.\n\
             Будь эмпатичным, мягким, но честным. Используй максимум 1 эмодзи.",
            name = drawn.card.name,
            orientation = drawn.orientation_ru(),
            meaning = drawn.meaning(),
        ),
        None => format!(
            "Человек запросил Карту Дня {time}.\n\n\
             Карта: {name} ({orientation})\n\
             Значение: {meaning}\n\n\
             Дай живую, тёплую интерпретацию того, какую энергию несёт эта карта для сегодняшнего дня.\n\
             Будь поддерживающим, создай атмосферу заботы. Используй максимум 1 эмодзи.",
            name = drawn.card.name,
            orientation = drawn.orientation_ru(),
            meaning = drawn.meaning(),
        ),
    }
}

fn spread_prompt(ctx: &PromptContext<'_>) -> String {
    let time = ctx.time_of_day.phrase();
    let title = spread_title(ctx.kind);
    let mut cards_text = describe_spread(ctx.kind, ctx.cards);
    if let Some(note) = significance_note(ctx.kind, ctx.cards) {
        cards_text.push('\n');
        cards_text.push_str(&note);
    }

    let (volume, guide_question, guide_general) = if ctx.kind.is_deep() {
        (
            "350-450",
            "- Начни с эмпатии к вопросу\n\
             - Интерпретируй каждую позицию кратко (1-2 предложения)\n\
             - Свяжи все карты в единую историю\n\
             - Дай практичный мягкий совет\n\
             - Заверши поддержкой",
            "- Начни с тёплого обращения\n\
             - Интерпретируй каждую позицию кратко и ясно\n\
             - Покажи как карты связаны в общую картину\n\
             - Дай совет для роста\n\
             - Заверши ободрением",
        )
    } else {
        (
            "250-350",
            "- Начни с эмпатии к вопросу\n\
             - Объясни как прошлое привело к настоящему\n\
             - Что происходит сейчас в энергии\n\
             - К чему движется ситуация\n\
             - Мягкий совет",
            "- Начни с тёплого обращения\n\
             - Какие уроки принесло прошлое\n\
             - В каком месте человек сейчас\n\
             - Что ждёт впереди\n\
             - Послание для роста",
        )
    };

    match ctx.question {
        Some(question) => format!(
            "Человек пришёл {time} с важным вопросом.\n\n\
             Его вопрос: \"{question}\"\n\n\
             Расклад \"{title}\":\n{cards_text}\n\n\
             Дай живую, структурированную интерпретацию расклада:\n{guide_question}\n\n\
             Объём: {volume} слов. Используй максимум 1-2 эмодзи."
        ),
        None => format!(
            "Человек запросил общий расклад {time}.\n\n\
             Расклад \"{title}\":\n{cards_text}\n\n\
             Дай живую, мудрую интерпретацию жизненного пути:\n{guide_general}\n\n\
             Объём: {volume} слов. Используй максимум 1-2 эмодзи."
        ),
    }
}

fn energy_prompt(ctx: &PromptContext<'_>) -> String {
    let cards_text = ctx
        .cards
        .iter()
        .map(|drawn| {
            if drawn.is_reversed {
                format!("{} (перевёрнутая)", drawn.card.name)
            } else {
                drawn.card.name.clone()
            }
        })
        .collect::<Vec<_>>()
        .join(", ");
    let zodiac = ctx
        .user
        .zodiac
        .map(|sign| format!(", знак зодиака: {sign}"))
        .unwrap_or_default();

    format!(
        "Человек по имени {name}{zodiac} пришёл {time} для чтения личной энергетики.\n\n\
         Карты, которые пришли для чтения энергии: {cards_text}\n\n\
         Дай тёплое, тонкое описание энергетического состояния:\n\
         1) Общая энергетика сейчас\n\
         2) Что сильное в человеке\n\
         3) Что может вызывать напряжение\n\
         4) На что обратить внимание\n\
         5) Маленький совет\n\
         6) Ободряющая фраза\n\n\
         Объём: 200-300 слов. Используй 1-2 эмодзи.",
        name = ctx.user.name,
        time = ctx.time_of_day.phrase(),
    )
}

/// Selects the persona and renders the prompt for one reading.
pub fn build_request(ctx: &PromptContext<'_>) -> GenerationRequest {
    let prompt = match (ctx.kind, ctx.cards.first()) {
        (ReadingKind::Energy, _) => energy_prompt(ctx),
        (ReadingKind::CardOfDay | ReadingKind::SingleQuestion | ReadingKind::Advice, Some(drawn)) => {
            single_card_prompt(ctx, drawn)
        }
        _ => spread_prompt(ctx),
    };
    GenerationRequest {
        persona: persona(ctx.kind),
        prompt,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Card, QuotaCounters, Tier, ZodiacSign};
    use chrono::Utc;

    fn drawn(id: u8, arcana: Arcana, is_reversed: bool) -> DrawnCard {
        DrawnCard {
            card: Card {
                id,
                name: format!("Карта {id}"),
                upright: format!("прямое {id}"),
                reversed: format!("обратное {id}"),
                arcana,
            },
            is_reversed,
            position: None,
        }
    }

    fn user() -> User {
        User {
            id: 1,
            name: "Анна".to_string(),
            username: String::new(),
            birth_date: None,
            zodiac: Some(ZodiacSign::Leo),
            tier: Tier::Free,
            quota: QuotaCounters::fresh(Utc::now()),
            total_readings: 0,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn hour_bands() {
        assert_eq!(TimeOfDay::from_hour(0), TimeOfDay::DeepNight);
        assert_eq!(TimeOfDay::from_hour(5), TimeOfDay::DeepNight);
        assert_eq!(TimeOfDay::from_hour(6), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(10), TimeOfDay::Morning);
        assert_eq!(TimeOfDay::from_hour(11), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(16), TimeOfDay::Day);
        assert_eq!(TimeOfDay::from_hour(17), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(20), TimeOfDay::Evening);
        assert_eq!(TimeOfDay::from_hour(21), TimeOfDay::Late);
        assert_eq!(TimeOfDay::from_hour(23), TimeOfDay::Late);
    }

    #[test]
    fn labels_match_arity() {
        for kind in ReadingKind::ALL {
            let labels = position_labels(kind);
            assert!(labels.is_empty() || labels.len() == kind.arity(), "{kind}");
        }
    }

    #[test]
    fn three_card_prompt_uses_timeline_labels_and_orientation_meaning() {
        let cards = vec![
            drawn(30, Arcana::Minor, false),
            drawn(40, Arcana::Minor, true),
            drawn(50, Arcana::Minor, false),
        ];
        let user = user();
        let request = build_request(&PromptContext {
            kind: ReadingKind::ThreeCard,
            cards: &cards,
            question: Some("Что ждёт меня на работе?"),
            time_of_day: TimeOfDay::Morning,
            user: &user,
        });
        assert_eq!(request.persona, GUIDE_PERSONA);
        assert!(request.prompt.contains("Прошлое: Карта 30 (прямая) - прямое 30"));
        assert!(request.prompt.contains("Настоящее: Карта 40 (перевёрнутая) - обратное 40"));
        assert!(request.prompt.contains("\"Что ждёт меня на работе?\""));
        assert!(request.prompt.contains(TimeOfDay::Morning.phrase()));
        assert!(!request.prompt.contains("Старших Арканов"));
    }

    #[test]
    fn significance_note_thresholds() {
        let two_majors = vec![
            drawn(1, Arcana::Major, false),
            drawn(2, Arcana::Major, false),
            drawn(40, Arcana::Minor, false),
        ];
        assert!(significance_note(ReadingKind::ThreeCard, &two_majors).is_some());
        assert!(significance_note(ReadingKind::Energy, &two_majors).is_none());

        let mut five = two_majors.clone();
        five.push(drawn(41, Arcana::Minor, false));
        five.push(drawn(42, Arcana::Minor, false));
        assert!(significance_note(ReadingKind::Deep5, &five).is_none());

        five[4] = drawn(3, Arcana::Major, true);
        let note = significance_note(ReadingKind::Deep5, &five).unwrap();
        assert!(note.contains("Выпало 3"));
    }

    #[test]
    fn deep_path_prompt_numbers_positions() {
        let cards: Vec<DrawnCard> = (0..7).map(|i| drawn(22 + i, Arcana::Minor, false)).collect();
        let user = user();
        let request = build_request(&PromptContext {
            kind: ReadingKind::DeepPath,
            cards: &cards,
            question: None,
            time_of_day: TimeOfDay::Late,
            user: &user,
        });
        assert_eq!(request.persona, DEEP_SPREAD_PERSONA);
        assert!(request.prompt.contains("1) Твоё текущее состояние: Карта 22"));
        assert!(request.prompt.contains("7) К чему приведёт путь: Карта 28"));
        assert!(request.prompt.contains("общий расклад"));
    }

    #[test]
    fn energy_prompt_mentions_name_and_zodiac() {
        let cards = vec![
            drawn(0, Arcana::Major, true),
            drawn(30, Arcana::Minor, false),
            drawn(31, Arcana::Minor, false),
        ];
        let user = user();
        let request = build_request(&PromptContext {
            kind: ReadingKind::Energy,
            cards: &cards,
            question: None,
            time_of_day: TimeOfDay::DeepNight,
            user: &user,
        });
        assert_eq!(request.persona, ENERGY_PERSONA);
        assert!(request.prompt.contains("Анна, знак зодиака: Лев"));
        assert!(request.prompt.contains("Карта 0 (перевёрнутая), Карта 30, Карта 31"));
    }

    #[test]
    fn card_of_day_prompt_has_no_question() {
        let cards = vec![drawn(5, Arcana::Major, false)];
        let user = user();
        let request = build_request(&PromptContext {
            kind: ReadingKind::CardOfDay,
            cards: &cards,
            question: None,
            time_of_day: TimeOfDay::Day,
            user: &user,
        });
        assert!(request.prompt.starts_with("Человек запросил Карту Дня"));
        assert!(request.prompt.contains("Карта: Карта 5 (прямая)"));
    }
}
