// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! An in-memory [`ItemSource`] for exercising cursors without a server.

use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::cursor::{Bound, ItemSource};
use crate::error::{Error, RemoteError, Result};
use crate::item::Item;

/// Number of calls made to each fetch primitive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SourceCalls {
    pub next_bounded: usize,
    pub items_batch: usize,
}

/// Holds sorted items per database and answers fetches the way the server
/// does. Clones share state.
#[derive(Clone, Debug, Default)]
pub struct MemoryItemSource {
    inner: Arc<Mutex<MemoryState>>,
}

#[derive(Debug, Default)]
struct MemoryState {
    databases: BTreeMap<String, Vec<Item>>,
    calls: SourceCalls,
    pending_failure: Option<RemoteError>,
}

impl MemoryItemSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a database holding `items`.
    ///
    /// Items must be mutually comparable position by position; any that are
    /// not keep their given relative order.
    pub fn with_database(self, name: impl Into<String>, mut items: Vec<Item>) -> Self {
        items.sort_by(|a, b| a.try_cmp(b).unwrap_or(Ordering::Equal));
        items.dedup();
        self.state().databases.insert(name.into(), items);
        self
    }

    /// Makes the next fetch fail with the given remote error.
    pub fn fail_next(&self, code: u16, reason: impl Into<String>) {
        self.state().pending_failure = Some(RemoteError {
            code,
            reason: reason.into(),
        });
    }

    pub fn calls(&self) -> SourceCalls {
        self.state().calls
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        // A panicking test thread must not hide state from the others.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl MemoryState {
    fn items(&mut self, database: &str) -> Result<&[Item]> {
        if let Some(failure) = self.pending_failure.take() {
            return Err(Error::RemoteAccess(failure));
        }
        self.databases
            .get(database)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::remote(404, format!("Not Found {database}")))
    }
}

impl ItemSource for MemoryItemSource {
    fn next_bounded(&self, database: &str, item: &Item, bound: Bound) -> Result<Option<Item>> {
        let mut state = self.state();
        state.calls.next_bounded += 1;
        let prefix_len = bound.prefix_len(item);
        let prefix = item.prefix(prefix_len);
        for entry in state.items(database)? {
            if !entry.starts_with(prefix) {
                continue;
            }
            let carved = entry.truncated(bound.truncate_end(entry, prefix_len));
            if carved.try_cmp(item)? == Ordering::Greater {
                return Ok(Some(carved));
            }
        }
        Ok(None)
    }

    fn items_batch(&self, database: &str, item: &Item, limit: usize) -> Result<Vec<Item>> {
        let mut state = self.state();
        state.calls.items_batch += 1;
        let mut batch = Vec::new();
        for entry in state.items(database)? {
            if batch.len() == limit {
                break;
            }
            if entry.try_cmp(item)? != Ordering::Less {
                batch.push(entry.clone());
            }
        }
        Ok(batch)
    }
}
