//! Keyed cache for query results.

use std::fmt;
use std::future::Future;
use std::time::Instant;

use dashmap::DashMap;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::error::ApiError;
use crate::policy::{CachePolicy, RetryPolicy};

/// Ordered parts identifying a cached read, e.g. `["appInfo", "12"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new(name: &str) -> Self {
        Self(vec![name.to_string()])
    }

    pub fn part(mut self, part: impl fmt::Display) -> Self {
        self.0.push(part.to_string());
        self
    }

    /// Append an optional part; absent values still occupy their position.
    pub fn part_opt<T: fmt::Display>(self, part: Option<T>) -> Self {
        match part {
            Some(p) => self.part(p),
            None => self.part("-"),
        }
    }

    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("/"))
    }
}

#[derive(Debug)]
struct CacheEntry {
    value: Value,
    updated_at: Instant,
    last_read: Instant,
}

pub struct QueryCache {
    entries: DashMap<QueryKey, CacheEntry>,
    policy: CachePolicy,
}

impl QueryCache {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            entries: DashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &CachePolicy {
        &self.policy
    }

    /// Serve `key` from the cache while fresh, otherwise run `op` under
    /// `retry` and cache its result. Failures are never cached.
    pub async fn fetch<T, F, Fut>(&self, key: QueryKey, retry: &RetryPolicy, op: F) -> Result<T, ApiError>
    where
        T: Serialize + DeserializeOwned,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        if let Some(value) = self.fresh(&key) {
            match serde_json::from_value(value) {
                Ok(cached) => {
                    debug!("Cache hit for {}", key);
                    return Ok(cached);
                }
                Err(e) => {
                    debug!("Dropping undecodable cache entry {}: {}", key, e);
                    self.entries.remove(&key);
                }
            }
        }

        let result = retry.run(op).await?;
        let now = Instant::now();
        self.entries.insert(
            key,
            CacheEntry {
                value: serde_json::to_value(&result)?,
                updated_at: now,
                last_read: now,
            },
        );
        Ok(result)
    }

    // Value of a fresh entry; marks it read and evicts it when idle too long.
    fn fresh(&self, key: &QueryKey) -> Option<Value> {
        let now = Instant::now();
        let mut entry = self.entries.get_mut(key)?;
        if now.duration_since(entry.last_read) >= self.policy.cache_time {
            drop(entry);
            self.entries.remove(key);
            return None;
        }
        entry.last_read = now;
        if now.duration_since(entry.updated_at) < self.policy.stale_time {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        self.entries.contains_key(key)
    }

    pub fn invalidate(&self, key: &QueryKey) {
        self.entries.remove(key);
    }

    /// Drop every entry whose key starts with `prefix`
    pub fn invalidate_prefix(&self, prefix: &QueryKey) {
        self.entries.retain(|key, _| !key.starts_with(prefix));
    }

    /// Remove entries that have not been read within the cache time
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let before = self.entries.len();
        self.entries
            .retain(|_, entry| now.duration_since(entry.last_read) < self.policy.cache_time);
        before - self.entries.len()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
