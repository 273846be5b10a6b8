//! In-memory implementations of the capability traits
//!
//! These doubles record every call so tests can assert on what the code under
//! test did without a real scheduler, Elasticsearch cluster or config file.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde_json::Value;
use watcher_core::{
    AppConfig, ConfigStore, EntryId, EntrySnapshot, Job, RecordSink, TriggerEngine, WatcherError,
    WatcherResult,
};

/// Sink that keeps every document in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    documents: Arc<Mutex<Vec<(String, Value)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn documents(&self) -> Vec<(String, Value)> {
        self.documents.lock().unwrap().clone()
    }

    /// Documents written to one index
    pub fn documents_in(&self, index: &str) -> Vec<Value> {
        self.documents
            .lock()
            .unwrap()
            .iter()
            .filter(|(i, _)| i == index)
            .map(|(_, document)| document.clone())
            .collect()
    }

    pub fn count(&self) -> usize {
        self.documents.lock().unwrap().len()
    }

    /// Waits until at least `count` documents arrived; sink writes are spawned
    pub async fn wait_for(&self, count: usize) -> bool {
        for _ in 0..100 {
            if self.count() >= count {
                return true;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        self.count() >= count
    }
}

#[async_trait]
impl RecordSink for MemorySink {
    async fn log(&self, index: &str, document: Value) -> WatcherResult<()> {
        self.documents
            .lock()
            .unwrap()
            .push((index.to_string(), document));
        Ok(())
    }
}

struct ManualEntry {
    cron: String,
    job: Job,
    prev: Option<DateTime<Local>>,
}

#[derive(Default)]
struct ManualState {
    next_id: u64,
    entries: BTreeMap<EntryId, ManualEntry>,
    running: bool,
    start_calls: usize,
    stop_calls: usize,
}

/// Trigger engine that only fires when the test asks it to
#[derive(Clone, Default)]
pub struct ManualTriggerEngine {
    state: Arc<Mutex<ManualState>>,
}

impl ManualTriggerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs the job of one registration to completion
    pub async fn fire(&self, id: EntryId) -> bool {
        let job = {
            let mut state = self.state.lock().unwrap();
            match state.entries.get_mut(&id) {
                Some(entry) => {
                    entry.prev = Some(Local::now());
                    entry.job.clone()
                }
                None => return false,
            }
        };
        job().await;
        true
    }

    /// Fires every registration once, in handle order
    pub async fn fire_all(&self) -> usize {
        let ids = self.ids();
        let mut fired = 0;
        for id in ids {
            if self.fire(id).await {
                fired += 1;
            }
        }
        fired
    }

    pub fn ids(&self) -> Vec<EntryId> {
        self.state.lock().unwrap().entries.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.state.lock().unwrap().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cron_of(&self, id: EntryId) -> Option<String> {
        self.state
            .lock()
            .unwrap()
            .entries
            .get(&id)
            .map(|entry| entry.cron.clone())
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().unwrap().running
    }

    pub fn start_calls(&self) -> usize {
        self.state.lock().unwrap().start_calls
    }

    pub fn stop_calls(&self) -> usize {
        self.state.lock().unwrap().stop_calls
    }
}

#[async_trait]
impl TriggerEngine for ManualTriggerEngine {
    fn register(&self, cron_expr: &str, job: Job) -> WatcherResult<EntryId> {
        let fields = cron_expr.split_whitespace().count();
        if !matches!(fields, 3 | 5 | 6 | 7) {
            return Err(WatcherError::invalid_cron(cron_expr, "unexpected field count"));
        }
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = EntryId(state.next_id);
        state.entries.insert(
            id,
            ManualEntry {
                cron: cron_expr.to_string(),
                job,
                prev: None,
            },
        );
        Ok(id)
    }

    fn deregister(&self, id: EntryId) {
        self.state.lock().unwrap().entries.remove(&id);
    }

    fn entry(&self, id: EntryId) -> Option<EntrySnapshot> {
        let state = self.state.lock().unwrap();
        let entry = state.entries.get(&id)?;
        Some(EntrySnapshot {
            id,
            prev: entry.prev,
            next: state.running.then(|| Local::now() + chrono::Duration::minutes(1)),
        })
    }

    fn start(&self) {
        let mut state = self.state.lock().unwrap();
        state.running = true;
        state.start_calls += 1;
    }

    async fn stop(&self) {
        let mut state = self.state.lock().unwrap();
        state.running = false;
        state.stop_calls += 1;
    }
}

/// Config store that keeps every saved snapshot
#[derive(Debug, Clone, Default)]
pub struct MemoryConfigStore {
    saved: Arc<Mutex<Vec<AppConfig>>>,
    fail: Arc<Mutex<bool>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every following save fail with a persistence error
    pub fn fail_saves(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }

    pub fn save_count(&self) -> usize {
        self.saved.lock().unwrap().len()
    }

    pub fn last_saved(&self) -> Option<AppConfig> {
        self.saved.lock().unwrap().last().cloned()
    }
}

#[async_trait]
impl ConfigStore for MemoryConfigStore {
    async fn save(&self, config: &AppConfig) -> WatcherResult<()> {
        if *self.fail.lock().unwrap() {
            return Err(WatcherError::Persistence("disk full".to_string()));
        }
        self.saved.lock().unwrap().push(config.clone());
        Ok(())
    }
}
