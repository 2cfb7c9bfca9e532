use itertools::Itertools;
use std::collections::TryReserveError;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::table::{try_copy, HashTable, DEFAULT_BUCKETS};

/// The Store owns every key-value binding held by the server. It is cheap to clone: clones share
/// the same table through reference counting.
///
/// Connections are served concurrently, so all access goes through [`Store::lock`]. Each command
/// takes the lock once, which makes a `set` or `remove` atomic with respect to any `get` or
/// `snapshot` running on another connection.
#[derive(Clone)]
pub struct Store {
    inner: Arc<Mutex<HashTable>>,
}

impl Store {
    pub fn new(buckets: usize) -> Store {
        Self {
            inner: Arc::new(Mutex::new(HashTable::new(buckets))),
        }
    }

    pub fn lock(&self) -> StoreLocked<'_> {
        // Table mutations never panic midway, so a poisoned table is still consistent.
        let table = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        StoreLocked { table }
    }
}

impl Default for Store {
    fn default() -> Self {
        Self::new(DEFAULT_BUCKETS)
    }
}

pub struct StoreLocked<'a> {
    table: MutexGuard<'a, HashTable>,
}

impl<'a> StoreLocked<'a> {
    pub fn set(&mut self, key: &str, value: &str) -> bool {
        self.table.set(key, value)
    }

    /// Returns a copy of the value, so nothing borrowed from the table outlives the lock.
    pub fn get(&self, key: &str) -> Option<String> {
        self.table.get(key).map(str::to_string)
    }

    pub fn remove(&mut self, key: &str) -> bool {
        self.table.remove(key)
    }

    pub fn size(&self) -> usize {
        self.table.len()
    }

    /// Copies every live entry, in bucket order.
    pub fn snapshot(&self) -> Result<Snapshot, TryReserveError> {
        let mut entries = Vec::new();
        entries.try_reserve_exact(self.table.len())?;

        for entry in self.table.iter() {
            entries.push((try_copy(&entry.key)?, try_copy(&entry.value)?));
        }

        Ok(Snapshot { entries })
    }
}

/// A point-in-time copy of the store, rendered as an object literal: `{"k1":"v1","k2":"v2"}`.
///
/// Keys and values are written as-is. The protocol has no escaping, so a client storing quotes
/// gets them back unescaped.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Snapshot {
    entries: Vec<(String, String)>,
}

impl Snapshot {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }
}

impl fmt::Display for Snapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let pairs = self.entries.iter().format_with(",", |(key, value), f| {
            f(&format_args!("\"{}\":\"{}\"", key, value))
        });
        write!(f, "{{{}}}", pairs)
    }
}
