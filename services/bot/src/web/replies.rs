//! services/bot/src/web/replies.rs
//!
//! User-facing texts. Everything the bot says is assembled here so the
//! handler only decides *which* reply to send.

use crate::web::protocol::OutboundMessage;
use chrono::NaiveDate;
use tarot_core::domain::{DrawnCard, QuotaDenial, Reading, ReadingKind, User, ZodiacSign};
use tarot_core::prompts::{position_labels, TimeOfDay};
use tarot_core::session::{ValidationError, CANCEL_LABEL};
use tarot_core::Session;

const THINKING_PHRASES: [&str; 4] = [
    "Чувствую энергию твоего вопроса... Вытягиваю карты.",
    "Перемешиваю колоду, настраиваюсь на твою ситуацию...",
    "Карты уже знают ответ... Сейчас я его увижу.",
    "Давай посмотрим, что карты хотят сказать тебе...",
];

const INTRO: &str = "Я — твой мистический проводник в мире Таро.\n\
    Каждая карта — это подсказка, которая помогает увидеть путь, успокоиться и принять верное решение.\n\n\
    Спроси то, что тебя волнует — и я дам тебе ясность.";

fn menu(text: impl Into<String>) -> OutboundMessage {
    OutboundMessage::new(text, Session::Idle.choices())
}

//=========================================================================================
// Registration
//=========================================================================================

pub fn ask_name() -> OutboundMessage {
    OutboundMessage::plain(format!("Приветствую тебя… ✨\n\n{INTRO}\n\nДля начала, как мне тебя называть?"))
}

pub fn ask_birth_date(name: &str) -> OutboundMessage {
    OutboundMessage::plain(format!(
        "Приятно познакомиться, {name}! 🌟\n\n\
         Укажи свою дату рождения в формате ДД.ММ.ГГГГ\n\
         (например: 15.03.1990)"
    ))
}

pub fn ask_zodiac() -> OutboundMessage {
    OutboundMessage::new(
        "Отлично! ✨\n\nТеперь выбери свой знак зодиака:",
        ZodiacSign::ALL.iter().map(ZodiacSign::label).collect(),
    )
}

pub fn registration_complete(name: &str, zodiac: ZodiacSign, birth_date: NaiveDate) -> OutboundMessage {
    menu(format!(
        "✨ Спасибо, {name}! Регистрация завершена.\n\n\
         🔮 Твой знак: {zodiac}\n\
         📅 Дата рождения: {}\n\n\
         Теперь карты готовы дать тебе ясность.\n\
         Что хочешь узнать сегодня?",
        birth_date.format("%d.%m.%Y")
    ))
}

/// Re-prompt for rejected input; `choices` are those of the unchanged step.
pub fn invalid(error: ValidationError, choices: Vec<String>) -> OutboundMessage {
    let text = match error {
        ValidationError::NameLength => "Пожалуйста, введи корректное имя (2-50 символов)",
        ValidationError::DateFormat => {
            "Неверный формат даты. Пожалуйста, используй формат ДД.ММ.ГГГГ\nНапример: 15.03.1990"
        }
        ValidationError::DateOutOfRange => "Пожалуйста, укажи корректную дату рождения",
        ValidationError::UnknownZodiac => "Пожалуйста, выбери знак зодиака с клавиатуры 👇",
        ValidationError::UnknownSpread => "Пожалуйста, выбери один из вариантов расклада с помощью кнопок 👇",
        ValidationError::RegistrationPending => {
            "Давай сначала закончим знакомство. Ответь, пожалуйста, на мой последний вопрос."
        }
    };
    OutboundMessage::new(text, choices)
}

pub fn registration_required() -> OutboundMessage {
    OutboundMessage::plain("Сначала нужно зарегистрироваться. Нажми /start")
}

//=========================================================================================
// Menu and navigation
//=========================================================================================

pub fn welcome_back(user: &User) -> OutboundMessage {
    menu(format!(
        "Приветствую тебя снова, {}… ✨\n\n{INTRO}\nЧто хочешь узнать сегодня?",
        user.name
    ))
}

pub fn cancelled() -> OutboundMessage {
    menu("Хорошо, возвращаемся в главное меню.")
}

pub fn help() -> OutboundMessage {
    menu(
        "ℹ️ О боте\n\n\
         Этот бот — цифровой таролог, созданный, чтобы давать ясность в важных ситуациях.\n\
         Он помогает увидеть энергию дня, понять направление событий и мягко подсказать, как действовать.\n\n\
         Доступные функции:\n\n\
         ✨ Карта дня — узнай энергию сегодняшнего дня\n\
         🔮 Один вопрос — получи ответ на конкретный вопрос (1 карта)\n\
         🌙 Расклад 3 карты — прошлое, настоящее, будущее\n\
         🔥 Глубокий расклад — расклады на 5, 7 карт или Глубинный путь\n\
         💫 Моя энергетика — чтение личной энергии и состояния\n\
         ⭐ Совет Таро — мгновенная подсказка от карт\n\
         📖 История чтений — просмотр предыдущих раскладов\n\n\
         Команды:\n\
         /start - начать работу с ботом\n\
         /help - эта справка\n\n\
         Задай свой вопрос — и карты подскажут путь.",
    )
}

pub fn ask_spread_kind(user: &User, choices: Vec<String>) -> OutboundMessage {
    OutboundMessage::new(
        format!(
            "{}, выбери глубину расклада:\n\n\
             🔮 5 карт — классический углублённый расклад\n\
             ✨ 7 карт — детальный взгляд на ситуацию\n\
             🌟 Глубинный путь — максимальная глубина, путь души\n\n\
             Какой расклад резонирует с тобой?",
            user.name
        ),
        choices,
    )
}

pub fn ask_question(user: &User, kind: ReadingKind) -> OutboundMessage {
    let text = match kind {
        ReadingKind::SingleQuestion => format!(
            "{}, я слушаю тебя.\n\n\
             Сформулируй свой вопрос так, как он звучит внутри.\n\
             Карта придёт именно та, которая нужна сейчас.",
            user.name
        ),
        ReadingKind::ThreeCard => format!(
            "{}, расклад из трёх карт — это взгляд на твой путь.\n\n\
             Прошлое, Настоящее, Будущее раскроются перед тобой.\n\n\
             Задай вопрос — или напиши 'общий' для общего чтения:",
            user.name
        ),
        _ => "Сформулируй свой вопрос или напиши 'общий' для общего чтения.\n\n\
              Чем глубже вопрос — тем точнее карты откроют путь."
            .to_string(),
    };
    OutboundMessage::new(text, vec![CANCEL_LABEL.to_string()])
}

//=========================================================================================
// Quota denials and failures
//=========================================================================================

pub fn denied(reason: QuotaDenial) -> OutboundMessage {
    let text = match reason {
        QuotaDenial::PremiumOnly => {
            "💎 Эта функция доступна только в Premium!\n\n\
             Premium включает:\n\
             ✨ Расклад 5 карт - глубокий анализ\n\
             ✨ Расклад 7 карт - детальное понимание\n\
             ✨ Глубинный путь - твоя судьба\n\
             ✨ Личная энергия - анализ состояния\n\
             ✨ Безлимитные простые расклады"
        }
        QuotaDenial::CardOfDayLimit => {
            "⏳ Лимит исчерпан!\n\n\
             Карта дня доступна 2 раза в сутки для бесплатного доступа.\n\n\
             💎 Premium: безлимитный доступ!"
        }
        QuotaDenial::SimpleLimit => {
            "⏳ Лимит исчерпан!\n\n\
             Простые расклады доступны 2 раза в сутки для бесплатного доступа.\n\n\
             💎 Premium: безлимитный доступ ко всем раскладам!"
        }
    };
    menu(text)
}

pub fn generation_failed(kind: ReadingKind) -> OutboundMessage {
    let text = match kind {
        ReadingKind::Energy => "😔 Прости, возникла ошибка при чтении энергии. Попробуй позже.",
        _ => "😔 Прости, возникла ошибка при чтении карт. Попробуй еще раз позже.",
    };
    menu(text)
}

pub fn internal_error() -> OutboundMessage {
    menu("😔 Что-то пошло не так. Попробуй еще раз позже.")
}

//=========================================================================================
// Readings
//=========================================================================================

/// The line shown while the cards are being drawn.
pub fn preparing(user: &User, kind: ReadingKind, time_of_day: TimeOfDay) -> OutboundMessage {
    let text = match kind {
        ReadingKind::CardOfDay => time_of_day.greeting(&user.name),
        ReadingKind::Advice => format!("{}, сейчас вытяну карту-совет для тебя...", user.name),
        ReadingKind::Energy => format!("{}, настраиваюсь на твою энергию... Сейчас увижу.", user.name),
        _ => THINKING_PHRASES[(user.total_readings % THINKING_PHRASES.len() as u64) as usize].to_string(),
    };
    OutboundMessage::plain(text)
}

fn card_name(drawn: &DrawnCard) -> String {
    if drawn.is_reversed {
        format!("{} (перевёрнутая)", drawn.card.name)
    } else {
        drawn.card.name.clone()
    }
}

fn question_line(reading: &Reading) -> String {
    format!("📝 Вопрос: {}", reading.question.as_deref().unwrap_or("Общее чтение"))
}

pub fn reading(reading: &Reading) -> OutboundMessage {
    let text = match (reading.kind, reading.cards.first()) {
        (ReadingKind::CardOfDay, Some(card)) => format!(
            "🌞 Твоя Карта Дня\n\n\
             Аркан: {}\nЗначение: {}\n\n\
             Что это значит для тебя:\n{}\n\n\
             ✨ Пусть энергия этого дня будет мягкой и благоприятной",
            card_name(card),
            card.meaning(),
            reading.interpretation
        ),
        (ReadingKind::SingleQuestion, Some(card)) => format!(
            "🔮 Ответ на твой вопрос\n\n{}\n\n\
             Аркан: {}\nСмысл карты: {}\n\n\
             В контексте твоего вопроса карта говорит:\n{}\n\n\
             ✨ Пусть ясность придёт легко и вовремя",
            question_line(reading),
            card_name(card),
            card.meaning(),
            reading.interpretation
        ),
        (ReadingKind::Advice, Some(card)) => format!(
            "⭐ Совет Таро на сейчас\n\n\
             Карта: {}\n\n\
             Послание карты:\n{}\n\n\
             🌙 Пусть этот совет поддержит тебя в нужный момент",
            card_name(card),
            reading.interpretation
        ),
        (ReadingKind::Energy, _) => format!(
            "💫 Твоя Энергетика Сейчас\n\nКарты энергии: {}\n\n{}",
            reading.cards.iter().map(card_name).collect::<Vec<_>>().join(", "),
            reading.interpretation
        ),
        (ReadingKind::ThreeCard, _) => {
            let labels = position_labels(ReadingKind::ThreeCard);
            let cards = reading
                .cards
                .iter()
                .enumerate()
                .map(|(i, card)| {
                    let label = labels.get(i).copied().unwrap_or_default().to_lowercase();
                    format!("{}) Карта {label} — {}\n   Значение: {}", i + 1, card_name(card), card.meaning())
                })
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "🌙 Твой расклад из 3 карт\n\n{}\n\n{cards}\n\n\
                 Что это значит для тебя:\n{}\n\n\
                 ✨ Пусть твой путь будет ясным и защищённым",
                question_line(reading),
                reading.interpretation
            )
        }
        (kind, _) => {
            let cards = reading
                .cards
                .iter()
                .enumerate()
                .map(|(i, card)| format!("{}. {}", i + 1, card_name(card)))
                .collect::<Vec<_>>()
                .join("\n");
            format!(
                "{}\n\n{}\n\nКарты расклада:\n{cards}\n\nИнтерпретация:\n\n{}",
                kind.title_ru(),
                question_line(reading),
                reading.interpretation
            )
        }
    };
    menu(text)
}

pub fn history(readings: &[Reading]) -> OutboundMessage {
    if readings.is_empty() {
        return menu(
            "📖 У тебя пока нет чтений.\n\n\
             Попробуй получить Карту Дня или сделать Расклад из 3 карт! 🔮",
        );
    }

    let lines = readings
        .iter()
        .enumerate()
        .map(|(i, reading)| {
            let cards = reading
                .cards
                .iter()
                .map(|drawn| {
                    if drawn.is_reversed {
                        format!("{} 🔄", drawn.card.name)
                    } else {
                        drawn.card.name.clone()
                    }
                })
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "{}) {} — {cards} {}",
                i + 1,
                reading.kind.title_ru(),
                reading.created_at.format("%d.%m.%Y")
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    menu(format!(
        "📖 Твоя История Чтений\n\nПоследние расклады:\n\n{lines}\n\n\
         ✨ Храни в памяти только то, что приносит пользу"
    ))
}
