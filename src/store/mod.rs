//! Reply cache
//!
//! Rendered pages are kept per request path together with their `ETag` and the
//! time they were written. An entry is served only while it is younger than the
//! configured TTL. Nothing is ever evicted; a stale entry simply stops being
//! served and is overwritten by the next successful render of that path.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use dashmap::DashMap;
use hyper::body::Bytes;

/// One cached reply
#[derive(Debug, Clone)]
pub struct CachedReply {
    pub etag: String,
    pub timestamp: DateTime<Utc>,
    pub body: Bytes,
}

/// Key-value backend for the reply cache
pub trait KvStore: Send + Sync {
    fn get(&self, key: &str) -> Option<CachedReply>;
    fn set(&self, key: &str, value: CachedReply);
}

/// In-process KV store
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: DashMap<String, CachedReply>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryStore {
    fn get(&self, key: &str) -> Option<CachedReply> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    fn set(&self, key: &str, value: CachedReply) {
        self.entries.insert(key.to_string(), value);
    }
}

/// TTL-bounded view over a [`KvStore`]
pub struct ReplyCache {
    store: Arc<dyn KvStore>,
    ttl: TimeDelta,
}

impl ReplyCache {
    pub fn new(store: Arc<dyn KvStore>, ttl: Duration) -> Self {
        Self {
            store,
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
        }
    }

    /// Fresh entry for `path`, if any
    pub fn lookup(&self, path: &str) -> Option<CachedReply> {
        self.lookup_at(path, Utc::now())
    }

    pub fn lookup_at(&self, path: &str, now: DateTime<Utc>) -> Option<CachedReply> {
        let entry = self.store.get(path)?;
        let fresh = entry
            .timestamp
            .checked_add_signed(self.ttl)
            .map_or(true, |expires| expires > now);
        fresh.then_some(entry)
    }

    pub fn store(&self, path: &str, etag: &str, body: Bytes) {
        self.store_at(path, etag, body, Utc::now());
    }

    pub fn store_at(&self, path: &str, etag: &str, body: Bytes, now: DateTime<Utc>) {
        self.store.set(
            path,
            CachedReply {
                etag: etag.to_string(),
                timestamp: now,
                body,
            },
        );
    }
}
