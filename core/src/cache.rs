use std::collections::HashMap;
use std::future::Future;

use parking_lot::Mutex;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::Result;

/// Identity of a cached server resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryKey {
    Events,
    EventsByType,
    Event(String),
    EventMessages(String),
    /// Private conversation, keyed by the other participant's id.
    Conversation(String),
    Friends,
    SentRequests,
    ReceivedRequests,
    Profile,
    User(String),
}

struct Entry {
    value: Value,
    stale: bool,
}

#[derive(Default)]
struct Inner {
    entries: HashMap<QueryKey, Entry>,
    generations: HashMap<QueryKey, u64>,
    epoch: u64,
}

impl Inner {
    fn generation(&self, key: &QueryKey) -> (u64, u64) {
        (self.epoch, self.generations.get(key).copied().unwrap_or(0))
    }
}

/// Client-side cache of server reads. Mutations never patch entries; they
/// mark them stale so the next read refetches.
#[derive(Default)]
pub struct QueryCache {
    inner: Mutex<Inner>,
}

impl QueryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the fresh cached value for `key`, or run `loader` and cache
    /// its result. A load that was overtaken by an invalidation is handed
    /// to the caller but not stored.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, loader: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if let Some(value) = self.fresh_value(&key) {
            if let Ok(hit) = serde_json::from_value(value) {
                debug!(?key, "cache hit");
                return Ok(hit);
            }
        }
        let started = self.inner.lock().generation(&key);
        let loaded = loader().await?;
        let value = serde_json::to_value(&loaded)?;
        let mut inner = self.inner.lock();
        if inner.generation(&key) == started {
            inner.entries.insert(key, Entry { value, stale: false });
        } else {
            warn!(?key, "discarding response invalidated while in flight");
        }
        Ok(loaded)
    }

    fn fresh_value(&self, key: &QueryKey) -> Option<Value> {
        let inner = self.inner.lock();
        inner
            .entries
            .get(key)
            .filter(|e| !e.stale)
            .map(|e| e.value.clone())
    }

    /// Cached value regardless of staleness.
    pub fn peek<T: DeserializeOwned>(&self, key: &QueryKey) -> Option<T> {
        let inner = self.inner.lock();
        inner
            .entries
            .get(key)
            .and_then(|e| serde_json::from_value(e.value.clone()).ok())
    }

    /// True when the key has never been loaded or was invalidated.
    pub fn is_stale(&self, key: &QueryKey) -> bool {
        self.inner.lock().entries.get(key).map_or(true, |e| e.stale)
    }

    pub fn invalidate(&self, keys: &[QueryKey]) {
        let mut inner = self.inner.lock();
        for key in keys {
            if let Some(entry) = inner.entries.get_mut(key) {
                entry.stale = true;
            }
            *inner.generations.entry(key.clone()).or_insert(0) += 1;
        }
        debug!(?keys, "invalidated");
    }

    /// Drop everything, e.g. on logout.
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.entries.clear();
        inner.epoch += 1;
    }
}
