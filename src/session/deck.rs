//! Builds the ordered deck for one study session from the selected sets.

use crate::models::{CardSet, Flashcard, SessionOptions};
use rand::Rng;
use rand::seq::SliceRandom;
use std::collections::HashSet;

/// Concatenates the studyable cards of every enabled set in catalog order,
/// then shuffles once if `options.randomize` is set.
///
/// Names in `enabled` that match no set are ignored. An empty result means
/// there is nothing to study and no session should be started.
pub fn build_deck<R: Rng + ?Sized>(
    catalog: &[CardSet],
    enabled: &HashSet<String>,
    options: &SessionOptions,
    rng: &mut R,
) -> Vec<Flashcard> {
    let mut deck: Vec<Flashcard> = catalog
        .iter()
        .filter(|set| enabled.contains(&set.name))
        .flat_map(|set| set.studyable().cloned())
        .collect();

    if options.randomize {
        deck.shuffle(rng);
    }

    deck
}

/// `build_deck` with the thread-local RNG.
pub fn build_deck_default(
    catalog: &[CardSet],
    enabled: &HashSet<String>,
    options: &SessionOptions,
) -> Vec<Flashcard> {
    build_deck(catalog, enabled, options, &mut rand::rng())
}
