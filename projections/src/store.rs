//! Concurrent in-memory projection tables.
//!
//! Two table shapes, one per consistency policy:
//!
//! - [`LatestTable`]: latest-value (compacted) streams. One current record
//!   per key; a new record for a key structurally replaces the old one.
//! - [`HistoryTable`]: append-history (event log) streams. Every record is
//!   retained individually, indexed by its own identifier; re-delivery of an
//!   already-seen identifier is a no-op.
//!
//! # Concurrency
//!
//! Both tables shard their keyspace by key hash across independent
//! `RwLock<HashMap>` shards, so writers for unrelated keys never contend on
//! one lock and readers run concurrently with ingestion. A record is written
//! or read whole under its shard lock: readers never observe a torn value.
//! Listings and folds take shard read locks one at a time, so they see a
//! consistent snapshot per key but not across keys, which is all the query
//! contract requires.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

/// Number of lock shards per table. Power of two, sized so concurrent
/// consumer workers rarely collide.
const SHARD_COUNT: usize = 16;

fn shard_of(key: &str) -> usize {
    let mut hasher = DefaultHasher::new();
    key.hash(&mut hasher);
    (hasher.finish() as usize) % SHARD_COUNT
}

/// A record stored in an append-history table.
///
/// Gives the table the record's own identifier (for idempotent insert) and
/// its event timestamp (for the default newest-first ordering).
pub trait HistoryRecord {
    /// Domain-level unique identifier of this record.
    fn record_id(&self) -> &str;

    /// Event timestamp used for default ordering.
    fn recorded_at(&self) -> DateTime<Utc>;
}

/// Latest-value projection table: one current record per key.
///
/// Used for compacted streams (balances, accounts). `put` is an
/// unconditional overwrite; because the transport delivers events for a key
/// in log order and exactly one apply path runs per key at a time, the value
/// standing after replay is the payload of the newest event for that key.
#[derive(Debug)]
pub struct LatestTable<V> {
    shards: [RwLock<HashMap<String, V>>; SHARD_COUNT],
}

impl<V: Clone> LatestTable<V> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shards: std::array::from_fn(|_| RwLock::new(HashMap::new())),
        }
    }

    /// Store the current record for a key, replacing any prior record.
    pub fn put(&self, key: impl Into<String>, value: V) {
        let key = key.into();
        let mut shard = self.shards[shard_of(&key)]
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        shard.insert(key, value);
    }

    /// Get the current record for a key, or `None` if the key is absent.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<V> {
        let shard = self.shards[shard_of(key)]
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        shard.get(key).cloned()
    }

    /// List records matching `filter`, ordered by key ascending.
    #[must_use]
    pub fn list<F>(&self, filter: F) -> Vec<V>
    where
        F: Fn(&V) -> bool,
    {
        let mut entries = self.collect(&filter);
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries.into_iter().map(|(_, v)| v).collect()
    }

    /// List records matching `filter`, ordered by a caller-supplied
    /// comparator. Ties fall back to key ascending (stable sort).
    #[must_use]
    pub fn list_by<F, C>(&self, filter: F, cmp: C) -> Vec<V>
    where
        F: Fn(&V) -> bool,
        C: Fn(&V, &V) -> std::cmp::Ordering,
    {
        let mut entries = self.collect(&filter);
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries.sort_by(|(_, a), (_, b)| cmp(a, b));
        entries.into_iter().map(|(_, v)| v).collect()
    }

    /// Fold a caller-supplied reducer over the current snapshot.
    pub fn fold<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(A, &V) -> A,
    {
        let mut acc = init;
        for shard in &self.shards {
            let shard = shard.read().unwrap_or_else(PoisonError::into_inner);
            for value in shard.values() {
                acc = f(acc, value);
            }
        }
        acc
    }

    /// Number of keys currently stored.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.read().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    /// Whether the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all records. Used when a projection is rebuilt from scratch.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
    }

    fn collect<F>(&self, filter: &F) -> Vec<(String, V)>
    where
        F: Fn(&V) -> bool,
    {
        let mut entries = Vec::new();
        for shard in &self.shards {
            let shard = shard.read().unwrap_or_else(PoisonError::into_inner);
            for (key, value) in shard.iter() {
                if filter(value) {
                    entries.push((key.clone(), value.clone()));
                }
            }
        }
        entries
    }
}

impl<V: Clone> Default for LatestTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
struct HistoryEntry<V> {
    /// Table-wide insertion index, used to break ordering ties.
    inserted: u64,
    value: V,
}

/// Append-history projection table: every record retained individually.
///
/// The keyed map holds, per partition key, an index from record id to record.
/// `append` is idempotent: a record id that was already applied is left
/// untouched, which makes replay safe under at-least-once delivery.
#[derive(Debug)]
pub struct HistoryTable<V> {
    shards: [RwLock<HashMap<String, HashMap<String, HistoryEntry<V>>>>; SHARD_COUNT],
    insertions: AtomicU64,
}

impl<V: HistoryRecord + Clone> HistoryTable<V> {
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self {
            shards: std::array::from_fn(|_| RwLock::new(HashMap::new())),
            insertions: AtomicU64::new(0),
        }
    }

    /// Insert a record under a key, indexed by its own identifier.
    ///
    /// Returns `true` if the record was inserted, `false` if a record with
    /// the same identifier was already present (successful no-op).
    pub fn append(&self, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        let record_id = value.record_id().to_string();
        let mut shard = self.shards[shard_of(&key)]
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let records = shard.entry(key).or_default();
        if records.contains_key(&record_id) {
            return false;
        }
        let inserted = self.insertions.fetch_add(1, Ordering::Relaxed);
        records.insert(record_id, HistoryEntry { inserted, value });
        true
    }

    /// Get one record by key and record identifier.
    #[must_use]
    pub fn get(&self, key: &str, record_id: &str) -> Option<V> {
        let shard = self.shards[shard_of(key)]
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        shard
            .get(key)
            .and_then(|records| records.get(record_id))
            .map(|entry| entry.value.clone())
    }

    /// List records matching `filter`, newest first by event timestamp,
    /// ties broken by insertion order.
    #[must_use]
    pub fn list<F>(&self, filter: F) -> Vec<V>
    where
        F: Fn(&V) -> bool,
    {
        let mut entries = self.collect(&filter);
        entries.sort_by(|a, b| {
            b.value
                .recorded_at()
                .cmp(&a.value.recorded_at())
                .then_with(|| a.inserted.cmp(&b.inserted))
        });
        entries.into_iter().map(|e| e.value).collect()
    }

    /// List records matching `filter`, ordered by a caller-supplied
    /// comparator. Ties fall back to insertion order (stable sort).
    #[must_use]
    pub fn list_by<F, C>(&self, filter: F, cmp: C) -> Vec<V>
    where
        F: Fn(&V) -> bool,
        C: Fn(&V, &V) -> std::cmp::Ordering,
    {
        let mut entries = self.collect(&filter);
        entries.sort_by(|a, b| a.inserted.cmp(&b.inserted));
        entries.sort_by(|a, b| cmp(&a.value, &b.value));
        entries.into_iter().map(|e| e.value).collect()
    }

    /// Fold a caller-supplied reducer over the current snapshot.
    pub fn fold<A, F>(&self, init: A, mut f: F) -> A
    where
        F: FnMut(A, &V) -> A,
    {
        let mut acc = init;
        for shard in &self.shards {
            let shard = shard.read().unwrap_or_else(PoisonError::into_inner);
            for records in shard.values() {
                for entry in records.values() {
                    acc = f(acc, &entry.value);
                }
            }
        }
        acc
    }

    /// Total number of records across all keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| {
                s.read()
                    .unwrap_or_else(PoisonError::into_inner)
                    .values()
                    .map(HashMap::len)
                    .sum::<usize>()
            })
            .sum()
    }

    /// Whether the table holds no records.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all records. Used when a projection is rebuilt from scratch.
    pub fn clear(&self) {
        for shard in &self.shards {
            shard
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
    }

    fn collect<F>(&self, filter: &F) -> Vec<HistoryEntry<V>>
    where
        F: Fn(&V) -> bool,
    {
        let mut entries = Vec::new();
        for shard in &self.shards {
            let shard = shard.read().unwrap_or_else(PoisonError::into_inner);
            for records in shard.values() {
                for entry in records.values() {
                    if filter(&entry.value) {
                        entries.push(entry.clone());
                    }
                }
            }
        }
        entries
    }
}

impl<V: HistoryRecord + Clone> Default for HistoryTable<V> {
    fn default() -> Self {
        Self::new()
    }
}
