//! crates/tarot_core/src/deck.rs
//!
//! The immutable card catalog and the sampler that draws from it.
//!
//! Every draw re-shuffles the full catalog independently: there is no
//! cross-call exhaustion state. Within one draw cards are taken without
//! replacement and each gets its own fair orientation coin.

use crate::domain::{Arcana, Card, DrawnCard};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

/// 22 major + 56 minor arcana.
pub const CATALOG_SIZE: usize = 78;

const EMBEDDED_CATALOG: &str = include_str!("../data/tarot_cards.json");

//=========================================================================================
// Errors
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Malformed catalog document: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("Catalog must hold {expected} cards, found {found}")]
    WrongSize { expected: usize, found: usize },
    #[error("Duplicate card id {0} in catalog")]
    DuplicateId(u8),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DeckError {
    #[error("Cannot draw {requested} cards from a catalog of {available}")]
    InsufficientCatalog { requested: usize, available: usize },
    #[error("A draw must take at least one card")]
    EmptyDraw,
}

//=========================================================================================
// Catalog
//=========================================================================================

#[derive(Deserialize)]
struct CatalogDocument {
    major_arcana: Vec<CardEntry>,
    #[serde(default)]
    minor_arcana: Vec<CardEntry>,
}

#[derive(Deserialize)]
struct CardEntry {
    id: u8,
    name: String,
    upright: String,
    reversed: String,
}

impl CardEntry {
    fn into_card(self, arcana: Arcana) -> Card {
        Card {
            id: self.id,
            name: self.name,
            upright: self.upright,
            reversed: self.reversed,
            arcana,
        }
    }
}

/// Process-wide, read-only snapshot of the drawable cards. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Catalog {
    cards: Arc<[Card]>,
}

impl Catalog {
    /// Loads the catalog shipped with the crate.
    pub fn embedded() -> Result<Self, CatalogError> {
        Self::from_json(EMBEDDED_CATALOG)
    }

    /// Parses a catalog document and checks its size and id uniqueness.
    pub fn from_json(document: &str) -> Result<Self, CatalogError> {
        let doc: CatalogDocument = serde_json::from_str(document)?;

        let cards: Vec<Card> = doc
            .major_arcana
            .into_iter()
            .map(|entry| entry.into_card(Arcana::Major))
            .chain(
                doc.minor_arcana
                    .into_iter()
                    .map(|entry| entry.into_card(Arcana::Minor)),
            )
            .collect();

        if cards.len() != CATALOG_SIZE {
            return Err(CatalogError::WrongSize {
                expected: CATALOG_SIZE,
                found: cards.len(),
            });
        }

        let mut seen = HashSet::with_capacity(cards.len());
        for card in &cards {
            if !seen.insert(card.id) {
                return Err(CatalogError::DuplicateId(card.id));
            }
        }

        Ok(Self {
            cards: cards.into(),
        })
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn get(&self, id: u8) -> Option<&Card> {
        self.cards.iter().find(|card| card.id == id)
    }
}

//=========================================================================================
// Deck
//=========================================================================================

/// Samples spreads from a catalog using an injected random source.
pub struct Deck {
    catalog: Catalog,
    rng: Mutex<StdRng>,
}

impl Deck {
    pub fn new(catalog: Catalog, rng: StdRng) -> Self {
        Self {
            catalog,
            rng: Mutex::new(rng),
        }
    }

    /// A deck seeded from the operating system's entropy source.
    pub fn from_os_rng(catalog: Catalog) -> Self {
        Self::new(catalog, StdRng::from_os_rng())
    }

    /// Draws `count` distinct cards, each with an independent orientation.
    pub fn draw(&self, count: usize) -> Result<Vec<DrawnCard>, DeckError> {
        if count == 0 {
            return Err(DeckError::EmptyDraw);
        }
        if count > self.catalog.len() {
            return Err(DeckError::InsufficientCatalog {
                requested: count,
                available: self.catalog.len(),
            });
        }

        // A poisoned generator is still a valid generator.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        let mut order: Vec<&Card> = self.catalog.cards().iter().collect();
        order.shuffle(&mut *rng);

        let drawn = order
            .into_iter()
            .take(count)
            .enumerate()
            .map(|(index, card)| DrawnCard {
                card: card.clone(),
                is_reversed: rng.random_bool(0.5),
                position: Some(index as u8 + 1),
            })
            .collect();

        Ok(drawn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeded_deck(seed: u64) -> Deck {
        Deck::new(Catalog::embedded().unwrap(), StdRng::seed_from_u64(seed))
    }

    #[test]
    fn embedded_catalog_has_full_deck() {
        let catalog = Catalog::embedded().unwrap();
        assert_eq!(catalog.len(), CATALOG_SIZE);
        let majors = catalog
            .cards()
            .iter()
            .filter(|card| card.arcana == Arcana::Major)
            .count();
        assert_eq!(majors, 22);
        assert!(catalog.cards().iter().all(|card| (card.id < 22) == (card.arcana == Arcana::Major)));
        assert_eq!(catalog.get(0).map(|c| c.name.as_str()), Some("Шут"));
    }

    #[test]
    fn catalog_rejects_wrong_size() {
        let doc = r#"{"major_arcana": [{"id": 0, "name": "Шут", "upright": "a", "reversed": "b"}]}"#;
        assert!(matches!(
            Catalog::from_json(doc),
            Err(CatalogError::WrongSize { expected: 78, found: 1 })
        ));
    }

    #[test]
    fn catalog_rejects_duplicate_ids() {
        let entries: Vec<String> = (0..78)
            .map(|i| {
                let id = if i == 77 { 0 } else { i };
                format!(r#"{{"id": {id}, "name": "c{i}", "upright": "u", "reversed": "r"}}"#)
            })
            .collect();
        let doc = format!(r#"{{"major_arcana": [{}]}}"#, entries.join(","));
        assert!(matches!(
            Catalog::from_json(&doc),
            Err(CatalogError::DuplicateId(0))
        ));
    }

    #[test]
    fn every_count_draws_distinct_cards() {
        let deck = seeded_deck(7);
        for count in 1..=CATALOG_SIZE {
            let drawn = deck.draw(count).unwrap();
            assert_eq!(drawn.len(), count);

            let ids: HashSet<u8> = drawn.iter().map(|d| d.card.id).collect();
            assert_eq!(ids.len(), count, "duplicate card in a draw of {count}");

            let positions: Vec<u8> = drawn.iter().filter_map(|d| d.position).collect();
            let expected: Vec<u8> = (1..=count as u8).collect();
            assert_eq!(positions, expected);
        }
    }

    #[test]
    fn drawing_more_than_the_catalog_fails() {
        let deck = seeded_deck(1);
        assert_eq!(
            deck.draw(79),
            Err(DeckError::InsufficientCatalog {
                requested: 79,
                available: 78
            })
        );
        assert_eq!(deck.draw(0), Err(DeckError::EmptyDraw));
    }

    #[test]
    fn orientation_is_roughly_fair() {
        let deck = seeded_deck(42);
        let mut reversed = 0usize;
        let trials = 2000;
        for _ in 0..trials {
            if deck.draw(1).unwrap()[0].is_reversed {
                reversed += 1;
            }
        }
        // Loose bounds; a biased coin would land far outside them.
        assert!((800..1200).contains(&reversed), "reversed = {reversed}");
    }

    #[test]
    fn draws_are_independent_between_calls() {
        let deck = seeded_deck(3);
        let mut seen_first = HashSet::new();
        for _ in 0..200 {
            seen_first.insert(deck.draw(3).unwrap()[0].card.id);
        }
        // Without re-shuffling the same card would always lead.
        assert!(seen_first.len() > 30);
    }
}
