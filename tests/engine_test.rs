//! End-to-end tests for the learning engine against in-memory collaborators

use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::sleep;

use word_explorer::engine::{EngineConfig, EngineState, LearningEngine};
use word_explorer::error::{Error, Result};
use word_explorer::knowledge::KnowledgeEntry;
use word_explorer::persistence::PersistenceGateway;
use word_explorer::predictor::NearestPredictor;
use word_explorer::provider::{DefinitionProvider, WordData};

/// Serves canned definitions and records every lookup it sees.
struct FakeProvider {
    words: HashMap<String, WordData>,
    lookups: Mutex<Vec<String>>,
}

impl FakeProvider {
    fn new(entries: &[(&str, &str, Option<&str>, &str)]) -> Self {
        let words = entries
            .iter()
            .map(|(word, definition, wiki, word_type)| {
                (
                    word.to_string(),
                    WordData {
                        definition: definition.to_string(),
                        wiki: wiki.map(|w| w.to_string()),
                        word_type: word_type.to_string(),
                    },
                )
            })
            .collect();
        Self {
            words,
            lookups: Mutex::new(Vec::new()),
        }
    }

    fn empty() -> Self {
        Self::new(&[])
    }
}

#[async_trait]
impl DefinitionProvider for FakeProvider {
    async fn lookup(&self, word: &str) -> Result<WordData> {
        self.lookups.lock().unwrap().push(word.to_string());
        self.words
            .get(word)
            .cloned()
            .ok_or_else(|| Error::LookupNotFound {
                word: word.to_string(),
                message: "Word not found".to_string(),
            })
    }
}

/// In-memory gateway with switchable failure modes.
#[derive(Default)]
struct FakeGateway {
    preload: BTreeMap<String, KnowledgeEntry>,
    saved: Mutex<Vec<BTreeMap<String, KnowledgeEntry>>>,
    fail_save: bool,
    fail_load: bool,
}

impl FakeGateway {
    fn with_preload(preload: BTreeMap<String, KnowledgeEntry>) -> Self {
        Self {
            preload,
            ..Self::default()
        }
    }

    fn last_saved(&self) -> Option<BTreeMap<String, KnowledgeEntry>> {
        self.saved.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl PersistenceGateway for FakeGateway {
    async fn save(&self, entries: &BTreeMap<String, KnowledgeEntry>) -> Result<()> {
        if self.fail_save {
            return Err(Error::Persistence("save endpoint down".to_string()));
        }
        self.saved.lock().unwrap().push(entries.clone());
        Ok(())
    }

    async fn load(&self) -> Result<BTreeMap<String, KnowledgeEntry>> {
        if self.fail_load {
            return Err(Error::Persistence("load endpoint down".to_string()));
        }
        Ok(self.preload.clone())
    }
}

fn entry(definition: &str, word_type: &str, related: &[(&str, u32)], seconds: i64) -> KnowledgeEntry {
    KnowledgeEntry {
        definition: definition.to_string(),
        word_type: word_type.to_string(),
        related: related
            .iter()
            .map(|(word, count)| (word.to_string(), *count))
            .collect(),
        last_updated: Utc.timestamp_opt(1_700_000_000 + seconds, 0).unwrap(),
    }
}

fn fast_config() -> EngineConfig {
    EngineConfig {
        interval_ms: 5,
        ..EngineConfig::default()
    }
}

fn build_engine(provider: Arc<FakeProvider>, gateway: Arc<FakeGateway>) -> LearningEngine {
    LearningEngine::new(
        fast_config(),
        provider,
        gateway,
        Arc::new(NearestPredictor::new()),
    )
}

fn exported_entries(json: &str) -> BTreeMap<String, KnowledgeEntry> {
    serde_json::from_str(json).expect("export is valid JSON")
}

#[tokio::test]
async fn test_loop_learns_seed_word_and_persists_on_stop() {
    let provider = Arc::new(FakeProvider::new(&[(
        "spear",
        "sharp weapon thrown with force",
        Some("ancient hunting tool"),
        "noun",
    )]));
    let gateway = Arc::new(FakeGateway::default());
    let engine = build_engine(provider.clone(), gateway.clone());

    engine.start("Spear!").await;
    assert_eq!(engine.state().await, EngineState::Learning);

    sleep(Duration::from_millis(60)).await;
    engine.stop().await;
    engine.join().await;

    assert_eq!(engine.state().await, EngineState::Idle);
    assert!(provider.lookups.lock().unwrap().contains(&"spear".to_string()));

    let entries = exported_entries(&engine.export().await.unwrap());
    let spear = entries.get("spear").expect("seed word was learned");
    assert_eq!(spear.definition, "sharp weapon thrown with force");
    assert_eq!(spear.word_type, "noun");
    // related words come from the combined definition and wiki text
    assert!(spear.related.contains_key("weapon"));
    assert!(spear.related.contains_key("ancient"));

    let stats = engine.stats().await;
    assert!(stats.words_learned >= 1);
    assert!(stats.iterations >= 1);
    assert!(stats.started_at.is_some());

    let saved = gateway.last_saved().expect("stop persisted the store");
    assert!(saved.contains_key("spear"));
}

#[tokio::test]
async fn test_start_is_a_noop_while_learning() {
    let provider = Arc::new(FakeProvider::empty());
    let gateway = Arc::new(FakeGateway::default());
    let engine = build_engine(provider, gateway);

    engine.start("spear").await;
    let first_start = engine.stats().await.started_at;
    sleep(Duration::from_millis(10)).await;

    engine.start("other").await;
    assert_eq!(engine.stats().await.started_at, first_start);
    assert_eq!(engine.state().await, EngineState::Learning);

    engine.stop().await;
    engine.join().await;
}

#[tokio::test]
async fn test_loop_survives_lookup_failures() {
    let provider = Arc::new(FakeProvider::empty());
    let gateway = Arc::new(FakeGateway::default());
    let engine = build_engine(provider, gateway);

    engine.start("spear").await;
    sleep(Duration::from_millis(80)).await;

    let stats = engine.stats().await;
    assert_eq!(engine.state().await, EngineState::Learning);
    assert!(stats.iterations >= 2, "loop kept running past failures");
    assert!(stats.lookup_failures >= 2);
    assert!(stats.fallbacks >= 2);

    engine.stop().await;
    engine.join().await;
}

#[tokio::test]
async fn test_failed_save_leaves_store_untouched() {
    let provider = Arc::new(FakeProvider::new(&[(
        "spear",
        "sharp weapon thrown with force",
        None,
        "noun",
    )]));
    let gateway = Arc::new(FakeGateway {
        fail_save: true,
        ..FakeGateway::default()
    });
    let engine = build_engine(provider, gateway.clone());

    engine.start("spear").await;
    sleep(Duration::from_millis(40)).await;
    engine.stop().await;
    engine.join().await;

    assert_eq!(engine.state().await, EngineState::Idle);
    assert!(gateway.saved.lock().unwrap().is_empty());
    // the store itself is unaffected by the failed save
    let entries = exported_entries(&engine.export().await.unwrap());
    assert!(entries.contains_key("spear"));
}

#[tokio::test]
async fn test_failed_load_starts_with_empty_store() {
    let gateway = Arc::new(FakeGateway {
        fail_load: true,
        ..FakeGateway::default()
    });
    let engine = build_engine(Arc::new(FakeProvider::empty()), gateway);

    engine.load().await;
    assert_eq!(engine.export().await.unwrap(), "{}");
}

#[tokio::test]
async fn test_oversized_preload_is_cut_to_capacity() {
    let mut preload = BTreeMap::new();
    for i in 0..30 {
        preload.insert(
            format!("word{i:02}"),
            entry(&format!("def{i}"), "noun", &[], i as i64),
        );
    }
    let gateway = Arc::new(FakeGateway::with_preload(preload));
    let config = EngineConfig {
        interval_ms: 5,
        store_capacity: 10,
        ..EngineConfig::default()
    };
    let engine = LearningEngine::new(
        config,
        Arc::new(FakeProvider::empty()),
        gateway,
        Arc::new(NearestPredictor::new()),
    );

    engine.load().await;

    let entries = exported_entries(&engine.export().await.unwrap());
    assert_eq!(entries.len(), 10);
    // the ten most recently updated entries survive
    for i in 20..30 {
        assert!(entries.contains_key(&format!("word{i:02}")));
    }
}

#[tokio::test]
async fn test_response_composes_from_known_words() {
    let mut preload = BTreeMap::new();
    preload.insert(
        "hello".to_string(),
        entry(
            "a greeting used on meeting",
            "exclamation",
            &[("planet", 3)],
            0,
        ),
    );
    let gateway = Arc::new(FakeGateway::with_preload(preload));
    let engine = build_engine(Arc::new(FakeProvider::empty()), gateway);
    engine.load().await;

    let response = engine.send_message("hello").await;
    assert_eq!(response, "a greeting used on meeting (exclamation) planet");
}

#[tokio::test]
async fn test_response_learns_unknown_words_on_the_spot() {
    let mut preload = BTreeMap::new();
    preload.insert(
        "hello".to_string(),
        entry(
            "a greeting used on meeting",
            "exclamation",
            &[("planet", 3)],
            0,
        ),
    );
    let gateway = Arc::new(FakeGateway::with_preload(preload));
    let provider = Arc::new(FakeProvider::new(&[(
        "world",
        "the earth with every country",
        None,
        "noun",
    )]));
    let engine = build_engine(provider, gateway);
    engine.load().await;

    let response = engine.send_message("hello world").await;
    assert!(response.starts_with("a greeting used on meeting (exclamation) planet"));

    // chat learning mutates the store just like the loop does
    let entries = exported_entries(&engine.export().await.unwrap());
    let world = entries.get("world").expect("unknown word was learned");
    assert_eq!(world.word_type, "noun");

    // the trailing word comes from the fresh definition text
    let tail = response.split_whitespace().last().unwrap();
    assert!(["earth", "with", "every", "country"].contains(&tail));
}

#[tokio::test]
async fn test_invalid_message_words_are_ignored() {
    let gateway = Arc::new(FakeGateway::default());
    let engine = build_engine(Arc::new(FakeProvider::empty()), gateway);

    // every token is too short or strips to nothing
    let response = engine.send_message("a an 1 2 fox !!").await;
    assert_eq!(response, "");
}

#[tokio::test]
async fn test_stop_persists_words_learned_mid_chat() {
    let provider = Arc::new(FakeProvider::new(&[(
        "world",
        "the earth with every country",
        None,
        "noun",
    )]));
    let gateway = Arc::new(FakeGateway::default());
    let engine = build_engine(provider, gateway.clone());

    engine.send_message("world").await;
    engine.stop().await;

    let saved = gateway.last_saved().expect("stop persisted the store");
    assert!(saved.contains_key("world"));
}
