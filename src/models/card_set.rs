//! A named set of flashcards, as shown in the selection list
use super::Flashcard;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardSet {
    pub name: String,
    pub cards: Vec<Flashcard>,
}

impl CardSet {
    pub fn new(name: impl Into<String>, cards: Vec<Flashcard>) -> Self {
        Self {
            name: name.into(),
            cards,
        }
    }

    pub fn add_card(&mut self, term: impl Into<String>, definition: impl Into<String>) {
        self.cards.push(Flashcard::new(term, definition));
    }

    /// Cards eligible for a study session, in set order.
    pub fn studyable(&self) -> impl Iterator<Item = &Flashcard> {
        self.cards.iter().filter(|card| !card.exclude)
    }
}

impl Default for CardSet {
    fn default() -> Self {
        Self {
            name: "My Set".to_string(),
            cards: Vec::new(),
        }
    }
}

impl fmt::Display for CardSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} Flashcard Set. Cards:", self.name)?;
        let width = self
            .cards
            .iter()
            .map(|card| card.term.chars().count())
            .max()
            .unwrap_or(0);
        for card in &self.cards {
            write!(f, "\n\t{:width$}: {}", card.term, card.definition, width = width)?;
        }
        Ok(())
    }
}

/// Every set available for selection, in display order.
pub type Catalog = Vec<CardSet>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_studyable_skips_excluded() {
        let set = CardSet::new(
            "Animals",
            vec![
                Flashcard::new("dog", "pies"),
                Flashcard::excluded("cat", "kot"),
                Flashcard::new("cow", "krowa"),
            ],
        );

        let terms: Vec<&str> = set.studyable().map(|c| c.term.as_str()).collect();
        assert_eq!(terms, vec!["dog", "cow"]);
    }

    #[test]
    fn test_add_card() {
        let mut set = CardSet::default();
        set.add_card("hello", "cześć");
        assert_eq!(set.cards.len(), 1);
        assert!(!set.cards[0].exclude);
    }

    #[test]
    fn test_display_aligns_terms() {
        let set = CardSet::new(
            "Polish",
            vec![Flashcard::new("a", "1"), Flashcard::new("abc", "2")],
        );
        assert_eq!(
            set.to_string(),
            "Polish Flashcard Set. Cards:\n\ta  : 1\n\tabc: 2"
        );
    }
}
