//! Learning engine - autonomous word-learning core
//!
//! The engine repeats one cycle while in the Learning state: pick a word,
//! look it up, record what was learned, train the predictor on the pair of
//! current and next word, and choose where to go next. Failures never stop
//! the loop; they route the next pick through the definition history
//! instead. A user-facing message path composes replies from the same
//! store and learns unknown words on demand.

use chrono::{DateTime, Utc};
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::codec;
use crate::error::Result;
use crate::knowledge::{selector, store, DefinitionHistory, KnowledgeStore};
use crate::knowledge::history::DEFAULT_HISTORY_CAPACITY;
use crate::persistence::PersistenceGateway;
use crate::predictor::Predictor;
use crate::provider::DefinitionProvider;

/// Engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Pause between learning iterations, in milliseconds.
    pub interval_ms: u64,
    /// Maximum words held in the knowledge store.
    pub store_capacity: usize,
    /// Maximum related words tracked per entry.
    pub related_capacity: usize,
    /// Definition texts kept for fallback selection.
    pub history_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            interval_ms: 1000,
            store_capacity: store::DEFAULT_CAPACITY,
            related_capacity: store::DEFAULT_RELATED_CAPACITY,
            history_capacity: DEFAULT_HISTORY_CAPACITY,
        }
    }
}

/// Engine state. The engine toggles between the two indefinitely; there is
/// no terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineState {
    Idle,
    Learning,
}

impl std::fmt::Display for EngineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineState::Idle => write!(f, "Idle"),
            EngineState::Learning => write!(f, "Learning"),
        }
    }
}

/// Counters describing what the loop has done so far.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LearningStats {
    pub iterations: u64,
    pub words_learned: u64,
    pub lookup_failures: u64,
    pub predictions: u64,
    pub fallbacks: u64,
    pub last_word: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub last_iteration: Option<DateTime<Utc>>,
}

/// State shared between the engine handle and the loop task.
struct Shared {
    config: EngineConfig,
    state: RwLock<EngineState>,
    store: RwLock<KnowledgeStore>,
    history: RwLock<DefinitionHistory>,
    learned: RwLock<HashSet<String>>,
    stats: RwLock<LearningStats>,
    task: Mutex<Option<JoinHandle<()>>>,
    provider: Arc<dyn DefinitionProvider>,
    gateway: Arc<dyn PersistenceGateway>,
    predictor: Arc<dyn Predictor>,
}

/// The word-learning engine.
///
/// Cheap to clone; all clones share the same store, history, and loop.
#[derive(Clone)]
pub struct LearningEngine {
    shared: Arc<Shared>,
}

impl LearningEngine {
    pub fn new(
        config: EngineConfig,
        provider: Arc<dyn DefinitionProvider>,
        gateway: Arc<dyn PersistenceGateway>,
        predictor: Arc<dyn Predictor>,
    ) -> Self {
        let store = KnowledgeStore::new(config.store_capacity, config.related_capacity);
        let history = DefinitionHistory::new(config.history_capacity);
        Self {
            shared: Arc::new(Shared {
                config,
                state: RwLock::new(EngineState::Idle),
                store: RwLock::new(store),
                history: RwLock::new(history),
                learned: RwLock::new(HashSet::new()),
                stats: RwLock::new(LearningStats::default()),
                task: Mutex::new(None),
                provider,
                gateway,
                predictor,
            }),
        }
    }

    pub async fn state(&self) -> EngineState {
        *self.shared.state.read().await
    }

    pub async fn stats(&self) -> LearningStats {
        self.shared.stats.read().await.clone()
    }

    /// Complete, indented JSON serialization of the current store.
    pub async fn export(&self) -> Result<String> {
        self.shared.store.read().await.export_json()
    }

    /// Replace the in-memory store with the persisted blob.
    ///
    /// A failed load is logged and leaves an empty store, never an error;
    /// oversized blobs are cut down to the configured caps.
    pub async fn load(&self) {
        let loaded = match self.shared.gateway.load().await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "failed to load persisted knowledge, starting empty");
                BTreeMap::new()
            }
        };
        let mut store = self.shared.store.write().await;
        *store = KnowledgeStore::from_entries(
            loaded,
            self.shared.config.store_capacity,
            self.shared.config.related_capacity,
        );
        info!(words = store.len(), "knowledge store loaded");
    }

    /// Start the continuous learning loop from a seed word.
    ///
    /// Loads the persisted store, resets the predictor, and spawns the
    /// loop task. Calling this while the loop is already running is a
    /// no-op.
    pub async fn start(&self, seed: &str) {
        {
            let mut state = self.shared.state.write().await;
            if *state == EngineState::Learning {
                warn!("learning loop already running");
                return;
            }
            *state = EngineState::Learning;
        }

        self.load().await;
        self.shared.predictor.reset().await;

        let seed = selector::strip_non_letters(seed);
        let seed = if selector::is_valid_word(&seed) {
            seed
        } else {
            selector::FALLBACK_WORD.to_string()
        };
        self.shared.learned.write().await.insert(seed.clone());

        {
            let mut stats = self.shared.stats.write().await;
            *stats = LearningStats::default();
            stats.started_at = Some(Utc::now());
        }

        info!(%seed, "learning loop starting");

        let shared = self.shared.clone();
        let handle = tokio::spawn(async move {
            run_loop(shared, seed).await;
        });
        *self.shared.task.lock().await = Some(handle);
    }

    /// Stop the loop and persist the store.
    ///
    /// The stop is cooperative: the flag is observed once per iteration
    /// after the interval pause, so an in-flight iteration always
    /// completes. Persistence failures are logged and not retried.
    pub async fn stop(&self) {
        {
            let mut state = self.shared.state.write().await;
            if *state == EngineState::Learning {
                info!("learning loop stopping");
            }
            *state = EngineState::Idle;
        }

        let entries = self.shared.store.read().await.entries().clone();
        match self.shared.gateway.save(&entries).await {
            Ok(()) => info!(words = entries.len(), "knowledge store persisted"),
            Err(e) => warn!(error = %e, "failed to persist knowledge store"),
        }
    }

    /// Wait for the loop task to wind down after [`stop`](Self::stop).
    pub async fn join(&self) {
        let handle = self.shared.task.lock().await.take();
        if let Some(handle) = handle {
            if let Err(e) = handle.await {
                warn!(error = %e, "learning task aborted");
            }
        }
    }

    /// Compose a reply to a user message from the knowledge store.
    ///
    /// Known words contribute their definition, type, and one random
    /// related word; unknown words are learned on the spot, so this path
    /// mutates the store and trains the predictor just like the loop does.
    pub async fn send_message(&self, message: &str) -> String {
        let words: Vec<String> = message
            .split_whitespace()
            .map(selector::strip_non_letters)
            .filter(|word| selector::is_valid_word(word))
            .collect();

        let mut fragments: Vec<String> = Vec::new();
        for word in words {
            let known = {
                let store = self.shared.store.read().await;
                store.get(&word).map(|entry| {
                    let related: Vec<&String> = entry.related.keys().collect();
                    let pick = related.choose(&mut rand::rng()).map(|w| (*w).clone());
                    (entry.definition.clone(), entry.word_type.clone(), pick)
                })
            };

            match known {
                Some((definition, word_type, related)) => {
                    fragments.push(format!("{definition} ({word_type})"));
                    if let Some(related) = related {
                        fragments.push(related);
                    }
                }
                None => match learn_word(&self.shared, &word).await {
                    Ok(Some(next)) => fragments.push(next),
                    Ok(None) => {}
                    Err(e) => warn!(%word, error = %e, "failed to learn from message"),
                },
            }
        }

        fragments.join(" ").trim().to_string()
    }
}

/// One iteration per interval while the Learning flag holds; the flag is
/// re-checked after the pause, never mid-iteration.
async fn run_loop(shared: Arc<Shared>, seed: String) {
    let interval = Duration::from_millis(shared.config.interval_ms);
    let mut current = seed;
    info!("learning loop started");

    loop {
        let next = match learn_word(&shared, &current).await {
            Ok(Some(word)) => word,
            Ok(None) => match predict_next(&shared, &current).await {
                Ok(word) => {
                    shared.stats.write().await.predictions += 1;
                    debug!(from = %current, to = %word, "predictor chose the next word");
                    word
                }
                Err(e) => {
                    warn!(error = %e, "prediction failed, picking from previous definitions");
                    fallback_word(&shared).await
                }
            },
            Err(e) => {
                warn!(word = %current, error = %e, "iteration failed, picking from previous definitions");
                fallback_word(&shared).await
            }
        };

        {
            let mut stats = shared.stats.write().await;
            stats.iterations += 1;
            stats.last_word = Some(next.clone());
            stats.last_iteration = Some(Utc::now());
        }
        current = next;

        tokio::time::sleep(interval).await;
        if *shared.state.read().await != EngineState::Learning {
            break;
        }
    }

    info!("learning loop exited");
}

/// Learn one word and pick the next one to explore.
///
/// Invalid and already-known words skip the lookup entirely. A successful
/// lookup feeds the history, the store, the learned set, and (when the
/// text offers an unexplored word) the predictor. Lookup failures are
/// non-fatal; every failure path resolves to a word drawn from previous
/// definitions.
async fn learn_word(shared: &Arc<Shared>, word: &str) -> Result<Option<String>> {
    let clean = selector::strip_non_letters(word);
    let already_known = shared.store.read().await.contains(&clean);
    if !selector::is_valid_word(&clean) || already_known {
        debug!(word = %clean, "invalid or already known, picking a fresh word");
        return Ok(Some(fallback_word(shared).await));
    }

    let data = match shared.provider.lookup(&clean).await {
        Ok(data) => data,
        Err(e) => {
            warn!(word = %clean, error = %e, "definition lookup failed");
            shared.stats.write().await.lookup_failures += 1;
            return Ok(Some(fallback_word(shared).await));
        }
    };

    info!(word = %clean, word_type = %data.word_type, "learned definition");

    let combined = data.combined_text();
    shared.history.write().await.push(combined.clone());

    let related: Vec<String> = combined
        .split_whitespace()
        .map(selector::strip_non_letters)
        .filter(|w| selector::is_valid_word(w))
        .collect();

    shared
        .store
        .write()
        .await
        .upsert(&clean, &data.definition, &data.word_type, &related);
    shared.learned.write().await.insert(clean.clone());
    shared.stats.write().await.words_learned += 1;

    let interesting = {
        let store = shared.store.read().await;
        let learned = shared.learned.read().await;
        selector::find_most_interesting_word(&combined, &learned, &store)
    };

    match interesting {
        Some(next) => {
            let input = codec::encode(&clean);
            let output = codec::encode(&next);
            if let Err(e) = shared.predictor.train(&input, &output).await {
                warn!(error = %e, "predictor training failed");
            }
            Ok(Some(next))
        }
        None => Ok(Some(fallback_word(shared).await)),
    }
}

/// Encode the current word, ask the predictor, decode the answer.
async fn predict_next(shared: &Arc<Shared>, word: &str) -> Result<String> {
    let encoded = codec::encode(word);
    let predicted = shared.predictor.predict(&encoded).await?;
    Ok(codec::decode(&predicted))
}

/// Draw the next word from the definition history, counting the fallback.
async fn fallback_word(shared: &Arc<Shared>) -> String {
    let word = {
        let history = shared.history.read().await;
        let learned = shared.learned.read().await;
        let store = shared.store.read().await;
        selector::word_from_previous_definitions(&history, &learned, &store)
    };
    shared.stats.write().await.fallbacks += 1;
    word
}
