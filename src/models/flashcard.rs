//! Flashcard is a pair <term, definition>, optionally excluded from study sessions.
use serde::{Deserialize, Serialize};

/// Which of the two texts of a card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Side {
    Term,
    Definition,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::Term => Side::Definition,
            Side::Definition => Side::Term,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub term: String,
    pub definition: String,
    /// Present in its set but never dealt into a session.
    #[serde(default)]
    pub exclude: bool,
}

impl Flashcard {
    pub fn new(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            definition: definition.into(),
            exclude: false,
        }
    }

    pub fn excluded(term: impl Into<String>, definition: impl Into<String>) -> Self {
        Self {
            exclude: true,
            ..Self::new(term, definition)
        }
    }

    pub fn face(&self, side: Side) -> &str {
        match side {
            Side::Term => &self.term,
            Side::Definition => &self.definition,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flashcard_creation() {
        let card = Flashcard::new("hello", "cześć");

        assert_eq!(card.term, "hello");
        assert_eq!(card.definition, "cześć");
        assert!(!card.exclude);
    }

    #[test]
    fn test_excluded_card() {
        let card = Flashcard::excluded("hello", "cześć");
        assert!(card.exclude);
        assert_eq!(card.term, "hello");
    }

    #[test]
    fn test_face_selection() {
        let card = Flashcard::new("dog", "pies");
        assert_eq!(card.face(Side::Term), "dog");
        assert_eq!(card.face(Side::Definition), "pies");
        assert_eq!(card.face(Side::Term.other()), "pies");
    }
}
