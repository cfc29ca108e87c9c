//! Word-selection heuristics
//!
//! Stateless functions that decide what the agent should learn next. They
//! operate over the current store, the recent definition history, and the
//! set of words already looked up; nothing here holds state of its own.

use once_cell::sync::Lazy;
use rand::seq::IndexedRandom;
use rand::Rng;
use regex::Regex;
use std::collections::HashSet;
use tracing::debug;

use super::{DefinitionHistory, KnowledgeStore};

/// Returned when no informative next word can be derived from any source,
/// so the loop never stalls.
pub const FALLBACK_WORD: &str = "body";

/// Random history entries probed before giving up on the history.
const HISTORY_ATTEMPTS: usize = 10;

static NON_LETTERS: Lazy<Regex> = Lazy::new(|| Regex::new("[^a-zA-Z]").expect("static pattern"));

/// Remove every non-letter character and lower-case the rest.
pub fn strip_non_letters(token: &str) -> String {
    NON_LETTERS.replace_all(token, "").to_lowercase()
}

/// A word is worth learning only if it is non-empty, not the literal
/// "undefined" token, and longer than three characters.
pub fn is_valid_word(word: &str) -> bool {
    !word.is_empty() && word != "undefined" && word.len() > 3
}

/// Pick a uniformly random unexplored word out of a text.
///
/// Tokens are split on whitespace, stripped and validated, and filtered
/// against both the learned-words set and the store keys. Returns `None`
/// when the text holds nothing new.
pub fn find_most_interesting_word(
    text: &str,
    learned: &HashSet<String>,
    store: &KnowledgeStore,
) -> Option<String> {
    let candidates: Vec<String> = text
        .split_whitespace()
        .map(strip_non_letters)
        .filter(|word| is_valid_word(word) && !learned.contains(word) && !store.contains(word))
        .collect();
    candidates.choose(&mut rand::rng()).cloned()
}

/// Probe random history entries for an unexplored word.
///
/// Makes at most [`HISTORY_ATTEMPTS`] probes before delegating to
/// [`random_word`], so the call always terminates with a word.
pub fn word_from_previous_definitions(
    history: &DefinitionHistory,
    learned: &HashSet<String>,
    store: &KnowledgeStore,
) -> String {
    if history.is_empty() {
        return random_word(learned, store);
    }

    let mut rng = rand::rng();
    for _ in 0..HISTORY_ATTEMPTS {
        let index = rng.random_range(0..history.len());
        if let Some(text) = history.get(index) {
            if let Some(word) = find_most_interesting_word(text, learned, store) {
                return word;
            }
        }
    }

    debug!("no unexplored word in {HISTORY_ATTEMPTS} history probes");
    random_word(learned, store)
}

/// Pick a uniformly random learned word that is not yet a store key, or
/// the fixed [`FALLBACK_WORD`] when none qualifies.
pub fn random_word(learned: &HashSet<String>, store: &KnowledgeStore) -> String {
    let candidates: Vec<&String> = learned
        .iter()
        .filter(|word| is_valid_word(word) && !store.contains(word))
        .collect();
    candidates
        .choose(&mut rand::rng())
        .map(|word| (*word).clone())
        .unwrap_or_else(|| FALLBACK_WORD.to_string())
}
