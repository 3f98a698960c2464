//! # Resource Cache
//!
//! Keyed cache of REST resources with prefix invalidation, the single place
//! every screen reads server state from.
//!
//! Entries are addressed by hierarchical [`ResourceKey`]s. Invalidation
//! works on key *prefixes*: one "mark order done" mutation invalidates the
//! specific order, every order list, and every user-scoped order list
//! without the caller enumerating the derived views. Prefixes map onto a
//! generation trie, so an invalidation is one counter bump at the prefix
//! node (O(depth)) instead of a sweep over all entries.
//!
//! Concurrent `fetch` calls for one key coalesce onto a single loader
//! invocation; followers wait on a oneshot handoff from the leader. A fetch
//! that was in flight when an overlapping invalidation landed is delivered
//! to its callers but never written back, enforced by comparing the
//! generation observed at fetch start with the generation at completion.

mod key;

pub use key::ResourceKey;

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::oneshot;

use crate::core::error::{CoreError, Result};

/// Cache tuning knobs.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Entries older than this are refetched by the next `fetch`.
    pub stale_after: Duration,
    /// Upper bound on stored entries; overflow evicts the
    /// least-recently-fetched entry.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_after: Duration::from_secs(30),
            max_entries: 256,
        }
    }
}

/// A cached resource as handed to readers.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub key: ResourceKey,
    pub data: Value,
    pub fetched_at: Instant,
}

impl CacheEntry {
    pub fn age(&self) -> Duration {
        self.fetched_at.elapsed()
    }

    pub fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        decode(&self.key, self.data.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

/// A write operation together with the cache prefixes it invalidates once
/// the backend confirms it.
#[derive(Debug, Clone)]
pub struct Mutation {
    pub kind: MutationKind,
    pub resource: &'static str,
    pub invalidates: Vec<ResourceKey>,
}

impl Mutation {
    pub fn create(resource: &'static str) -> Self {
        Self::new(MutationKind::Create, resource)
    }

    pub fn update(resource: &'static str) -> Self {
        Self::new(MutationKind::Update, resource)
    }

    pub fn delete(resource: &'static str) -> Self {
        Self::new(MutationKind::Delete, resource)
    }

    fn new(kind: MutationKind, resource: &'static str) -> Self {
        Self {
            kind,
            resource,
            invalidates: Vec::new(),
        }
    }

    pub fn invalidating<I>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = ResourceKey>,
    {
        self.invalidates.extend(prefixes);
        self
    }
}

type FetchResult = std::result::Result<Value, CoreError>;

#[derive(Default)]
struct GenNode {
    generation: u64,
    children: HashMap<String, GenNode>,
}

impl GenNode {
    /// Sum of the generation counters along the existing prefix chain of
    /// `segments`. Any invalidation at or above a key changes this sum.
    fn path_generation(&self, segments: &[String]) -> u64 {
        let mut total = self.generation;
        let mut node = self;
        for segment in segments {
            match node.children.get(segment) {
                Some(child) => {
                    total += child.generation;
                    node = child;
                }
                None => break,
            }
        }
        total
    }

    fn bump(&mut self, segments: &[String]) {
        let mut node = self;
        for segment in segments {
            node = node.children.entry(segment.clone()).or_default();
        }
        node.generation += 1;
    }
}

struct StoredEntry {
    data: Value,
    fetched_at: Instant,
    generation: u64,
}

#[derive(Default)]
struct InFlight {
    waiters: Vec<oneshot::Sender<FetchResult>>,
}

#[derive(Default)]
struct CacheState {
    generations: GenNode,
    entries: HashMap<ResourceKey, StoredEntry>,
    in_flight: HashMap<ResourceKey, InFlight>,
}

/// Process-wide resource cache handle. Cheap to clone; all clones share
/// state. Mutated only through `fetch`/`mutate`/`invalidate`/`flush`.
#[derive(Clone)]
pub struct ResourceCache {
    state: Arc<RwLock<CacheState>>,
    config: CacheConfig,
}

enum FetchRole {
    Hit(Value),
    Follower(oneshot::Receiver<FetchResult>),
    Leader(u64),
}

impl ResourceCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            state: Arc::new(RwLock::new(CacheState::default())),
            config,
        }
    }

    /// Synchronous lookup. Never triggers I/O. An entry invalidated since
    /// it was stored is a miss; an age-stale entry is still returned (the
    /// next `fetch` refreshes it).
    pub fn read(&self, key: &ResourceKey) -> Option<CacheEntry> {
        let state = self.state.read();
        let entry = state.entries.get(key)?;
        if entry.generation != state.generations.path_generation(key.segments()) {
            return None;
        }
        Some(CacheEntry {
            key: key.clone(),
            data: entry.data.clone(),
            fetched_at: entry.fetched_at,
        })
    }

    /// Whether `entry` has outlived the configured freshness window.
    pub fn is_stale(&self, entry: &CacheEntry) -> bool {
        entry.age() >= self.config.stale_after
    }

    /// Number of live (non-invalidated) entries.
    pub fn len(&self) -> usize {
        let state = self.state.read();
        state
            .entries
            .iter()
            .filter(|(key, entry)| {
                entry.generation == state.generations.path_generation(key.segments())
            })
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Return the cached value for `key`, or run `loader` to produce it.
    ///
    /// Concurrent calls for the same key share one loader invocation; every
    /// caller resolves from the same outcome. A result that was invalidated
    /// while in flight is handed to the callers but not written back, so a
    /// slow stale read can never win against a fresher invalidation. A
    /// failed load leaves the key absent; the next call retries.
    pub async fn fetch<T, F, Fut>(&self, key: ResourceKey, loader: F) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let role = {
            let mut state = self.state.write();
            let generation = state.generations.path_generation(key.segments());
            let cached = state
                .entries
                .get(&key)
                .map(|entry| (entry.data.clone(), entry.fetched_at, entry.generation));
            match cached {
                Some((data, fetched_at, entry_generation))
                    if entry_generation == generation
                        && fetched_at.elapsed() < self.config.stale_after =>
                {
                    FetchRole::Hit(data)
                }
                other => {
                    if matches!(other, Some((_, _, generation_then)) if generation_then != generation)
                    {
                        state.entries.remove(&key);
                    }
                    if let Some(flight) = state.in_flight.get_mut(&key) {
                        let (tx, rx) = oneshot::channel();
                        flight.waiters.push(tx);
                        FetchRole::Follower(rx)
                    } else {
                        state.in_flight.insert(key.clone(), InFlight::default());
                        FetchRole::Leader(generation)
                    }
                }
            }
        };

        match role {
            FetchRole::Hit(data) => decode(&key, data),
            FetchRole::Follower(rx) => match rx.await {
                Ok(outcome) => outcome.and_then(|data| decode(&key, data)),
                Err(_) => Err(CoreError::Cancelled),
            },
            FetchRole::Leader(generation) => {
                let mut guard = FlightGuard {
                    state: Arc::clone(&self.state),
                    key: key.clone(),
                    armed: true,
                };
                let result = loader().await;
                guard.armed = false;
                self.complete(&key, generation, result)
            }
        }
    }

    /// Execute a write and, once it succeeds, invalidate the declared
    /// prefixes in one step (no reader observes the write applied with
    /// stale entries still live).
    ///
    /// The write runs on a detached task: dropping the returned future does
    /// not cancel it, and its invalidations still apply. Invalidation is
    /// never applied optimistically.
    pub async fn mutate<T, F, Fut>(&self, mutation: Mutation, loader: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>> + Send + 'static,
    {
        let cache = self.clone();
        let fut = loader();
        let handle = tokio::spawn(async move {
            let result = fut.await;
            if result.is_ok() {
                cache.apply_mutation(&mutation);
            }
            result
        });
        match handle.await {
            Ok(result) => result,
            Err(join_error) if join_error.is_panic() => {
                std::panic::resume_unwind(join_error.into_panic())
            }
            Err(_) => Err(CoreError::Cancelled),
        }
    }

    /// Invalidate every entry whose key starts with `prefix`. One counter
    /// bump on the generation trie; entries are pruned lazily.
    pub fn invalidate(&self, prefix: &ResourceKey) {
        let mut state = self.state.write();
        state.generations.bump(prefix.segments());
        tracing::debug!(prefix = %prefix, "cache prefix invalidated");
    }

    /// Drop everything. Used on logout and on authentication rejection so
    /// no role-scoped resource leaks across identities.
    pub fn flush(&self) {
        let mut state = self.state.write();
        state.entries.clear();
        // Root bump fails the generation check of any fetch still in
        // flight, so a pre-logout read cannot repopulate the cache.
        state.generations.generation += 1;
        tracing::debug!("resource cache flushed");
    }

    fn apply_mutation(&self, mutation: &Mutation) {
        let mut state = self.state.write();
        for prefix in &mutation.invalidates {
            state.generations.bump(prefix.segments());
        }
        tracing::debug!(
            kind = ?mutation.kind,
            resource = mutation.resource,
            prefixes = mutation.invalidates.len(),
            "mutation invalidations applied"
        );
    }

    fn complete<T: Serialize>(
        &self,
        key: &ResourceKey,
        started_generation: u64,
        result: Result<T>,
    ) -> Result<T> {
        let outcome = match result {
            Ok(value) => match serde_json::to_value(&value) {
                Ok(json) => Ok((value, json)),
                Err(e) => Err(CoreError::Api(format!("failed to encode {key}: {e}"))),
            },
            Err(e) => Err(e),
        };

        let mut state = self.state.write();
        let waiters = state
            .in_flight
            .remove(key)
            .map(|flight| flight.waiters)
            .unwrap_or_default();

        match outcome {
            Ok((value, json)) => {
                let current = state.generations.path_generation(key.segments());
                if current == started_generation {
                    state.entries.insert(
                        key.clone(),
                        StoredEntry {
                            data: json.clone(),
                            fetched_at: Instant::now(),
                            generation: current,
                        },
                    );
                    enforce_capacity(&mut state, self.config.max_entries);
                } else {
                    tracing::debug!(key = %key, "fetch result invalidated while in flight, not stored");
                }
                for waiter in waiters {
                    let _ = waiter.send(Ok(json.clone()));
                }
                Ok(value)
            }
            Err(error) => {
                for waiter in waiters {
                    let _ = waiter.send(Err(error.clone()));
                }
                Err(error)
            }
        }
    }
}

/// Wakes coalesced followers if the leading fetch is dropped mid-flight,
/// instead of leaving them waiting on a sender that never fires.
struct FlightGuard {
    state: Arc<RwLock<CacheState>>,
    key: ResourceKey,
    armed: bool,
}

impl Drop for FlightGuard {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut state = self.state.write();
        if let Some(flight) = state.in_flight.remove(&self.key) {
            for waiter in flight.waiters {
                let _ = waiter.send(Err(CoreError::Cancelled));
            }
        }
    }
}

fn decode<T: DeserializeOwned>(key: &ResourceKey, data: Value) -> Result<T> {
    serde_json::from_value(data)
        .map_err(|e| CoreError::Api(format!("failed to decode cached {key}: {e}")))
}

fn enforce_capacity(state: &mut CacheState, max_entries: usize) {
    if state.entries.len() <= max_entries {
        return;
    }
    let CacheState {
        generations,
        entries,
        ..
    } = state;

    // Invalidated entries go first.
    let dead: Vec<ResourceKey> = entries
        .iter()
        .filter(|(key, entry)| entry.generation != generations.path_generation(key.segments()))
        .map(|(key, _)| key.clone())
        .collect();
    for key in dead {
        entries.remove(&key);
        if entries.len() <= max_entries {
            return;
        }
    }

    while entries.len() > max_entries {
        let oldest = entries
            .iter()
            .min_by_key(|(_, entry)| entry.fetched_at)
            .map(|(key, _)| key.clone());
        match oldest {
            Some(key) => {
                tracing::debug!(key = %key, "evicting least-recently-fetched entry");
                entries.remove(&key);
            }
            None => break,
        }
    }
}
