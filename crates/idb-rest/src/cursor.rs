// Copyright 2025 StrongDM Inc
// SPDX-License-Identifier: Apache-2.0

//! Buffered iteration over a remote item space.
//!
//! Every "next" request is bounded by a prefix of the starting item: the
//! answer must share that prefix, and is truncated just past it. A
//! [`NextBuffer`] keeps a window of consecutive items fetched in one batch, so
//! most requests are answered without a round trip.

use tracing::debug;

use crate::config::{validate_buffer_size, CursorConfig};
use crate::error::{Error, Result};
use crate::item::Item;

/// How far a "next" request may move from its starting item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bound {
    /// Any following item.
    Item,
    /// The next tuple after the item's last tag.
    Tuple,
    /// The next value of the item's last component.
    Component,
}

impl Bound {
    pub fn name(self) -> &'static str {
        match self {
            Bound::Item => "item",
            Bound::Tuple => "tuple",
            Bound::Component => "component",
        }
    }

    /// Length of the prefix of `item` that every answer must share.
    pub fn prefix_len(self, item: &Item) -> usize {
        match self {
            Bound::Item => 0,
            Bound::Tuple => item.last_tuple_offset(),
            Bound::Component => item.len().saturating_sub(1),
        }
    }

    /// End offset at which `candidate` is cut once `from` components of
    /// prefix have been matched.
    pub fn truncate_end(self, candidate: &Item, from: usize) -> usize {
        match self {
            Bound::Item => candidate.len(),
            Bound::Tuple => candidate.tuple_end(from),
            Bound::Component => (from + 1).min(candidate.len()),
        }
    }

    fn carve(self, candidate: &Item, prefix_len: usize) -> Item {
        candidate.truncated(self.truncate_end(candidate, prefix_len))
    }
}

/// Remote fetch primitives a cursor is built on.
///
/// "Not found" is `Ok(None)` or an empty batch; transport failures are
/// [`Error::RemoteAccess`].
pub trait ItemSource {
    /// The first item after `item` within `bound`, already truncated.
    fn next_bounded(&self, database: &str, item: &Item, bound: Bound) -> Result<Option<Item>>;

    /// Up to `limit` consecutive items starting at `item`, inclusive.
    fn items_batch(&self, database: &str, item: &Item, limit: usize) -> Result<Vec<Item>>;
}

impl<S: ItemSource + ?Sized> ItemSource for &S {
    fn next_bounded(&self, database: &str, item: &Item, bound: Bound) -> Result<Option<Item>> {
        (**self).next_bounded(database, item, bound)
    }

    fn items_batch(&self, database: &str, item: &Item, limit: usize) -> Result<Vec<Item>> {
        (**self).items_batch(database, item, limit)
    }
}

enum Lookup {
    Found(Item),
    Exhausted,
    Miss,
}

/// A window of consecutive items from one database.
#[derive(Debug, Clone)]
pub struct NextBuffer {
    window: Vec<Item>,
    database: Option<String>,
    size: usize,
}

impl NextBuffer {
    pub fn new(config: &CursorConfig) -> Result<Self> {
        validate_buffer_size(config.buffer_size)?;
        Ok(Self {
            window: Vec::new(),
            database: None,
            size: config.buffer_size,
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of items currently held.
    pub fn len(&self) -> usize {
        self.window.len()
    }

    pub fn is_empty(&self) -> bool {
        self.window.is_empty()
    }

    /// Database the window was filled from, if any.
    pub fn database(&self) -> Option<&str> {
        self.database.as_deref()
    }

    /// Discards the window so the next request refetches.
    pub fn flush(&mut self) {
        debug!(discarded = self.window.len(), "flushing next-item window");
        self.window.clear();
    }

    /// Sets the batch size used by later refills.
    pub fn set_size(&mut self, size: usize) -> Result<()> {
        validate_buffer_size(size)?;
        self.size = size;
        Ok(())
    }

    pub fn configure(&mut self, flush: bool, size: Option<usize>) -> Result<()> {
        if let Some(size) = size {
            self.set_size(size)?;
        }
        if flush {
            self.flush();
        }
        Ok(())
    }

    /// Returns the item following `item` within `bound`, refilling the
    /// window from `source` when it cannot answer.
    pub fn next<S: ItemSource + ?Sized>(
        &mut self,
        source: &S,
        database: &str,
        item: &Item,
        bound: Bound,
    ) -> Result<Option<Item>> {
        if self.database.as_deref() != Some(database) {
            if self.database.is_some() {
                debug!(
                    database,
                    previous = ?self.database,
                    discarded = self.window.len(),
                    "database changed; discarding next-item window"
                );
            }
            self.window.clear();
            self.database = Some(database.to_string());
        }

        match self.lookup(item, bound) {
            Lookup::Found(next) => {
                debug!(bound = bound.name(), %item, "next-item window hit");
                return Ok(Some(next));
            }
            Lookup::Exhausted => {
                debug!(bound = bound.name(), %item, "next-item window exhausted prefix");
                return Ok(None);
            }
            Lookup::Miss => {
                debug!(bound = bound.name(), %item, window = self.window.len(), "next-item window miss");
            }
        }

        self.window.clear();
        let Some(successor) = source.next_bounded(database, item, bound)? else {
            return Ok(None);
        };
        self.window = source.items_batch(database, &successor, self.size)?;
        debug!(
            database,
            items = self.window.len(),
            size = self.size,
            "refilled next-item window"
        );

        let Some(candidate) = self.window.iter().take(2).find(|entry| *entry != item) else {
            return Ok(None);
        };
        let prefix_len = bound.prefix_len(item);
        if !candidate.starts_with(item.prefix(prefix_len)) {
            return Ok(None);
        }
        Ok(Some(bound.carve(candidate, prefix_len)))
    }

    fn lookup(&self, item: &Item, bound: Bound) -> Lookup {
        let Some(start) = self
            .window
            .iter()
            .position(|entry| entry.starts_with(item.as_slice()))
        else {
            return Lookup::Miss;
        };
        let prefix_len = bound.prefix_len(item);
        let prefix = item.prefix(prefix_len);
        for entry in &self.window[start..] {
            if !entry.starts_with(prefix) {
                return Lookup::Exhausted;
            }
            let carved = bound.carve(entry, prefix_len);
            if carved != *item {
                return Lookup::Found(carved);
            }
        }
        Lookup::Miss
    }
}

/// An [`ItemSource`] paired with a [`NextBuffer`] and a default database.
#[derive(Debug)]
pub struct Cursor<S> {
    source: S,
    buffer: NextBuffer,
    database: Option<String>,
}

impl<S: ItemSource> Cursor<S> {
    pub fn new(source: S, config: CursorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            buffer: NextBuffer::new(&config)?,
            database: config.database,
            source,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn buffer(&self) -> &NextBuffer {
        &self.buffer
    }

    pub fn into_source(self) -> S {
        self.source
    }

    pub fn configure_buffer(&mut self, flush: bool, size: Option<usize>) -> Result<()> {
        self.buffer.configure(flush, size)
    }

    pub fn next_item(&mut self, item: &Item) -> Result<Option<Item>> {
        self.next_in(None, item, Bound::Item, true)
    }

    pub fn next_tuple(&mut self, item: &Item) -> Result<Option<Item>> {
        self.next_in(None, item, Bound::Tuple, true)
    }

    pub fn next_component(&mut self, item: &Item) -> Result<Option<Item>> {
        self.next_in(None, item, Bound::Component, true)
    }

    /// The general form: an explicit database overrides the configured one,
    /// and unbuffered calls go straight to the source.
    pub fn next_in(
        &mut self,
        database: Option<&str>,
        item: &Item,
        bound: Bound,
        buffered: bool,
    ) -> Result<Option<Item>> {
        let database = database
            .or(self.database.as_deref())
            .ok_or_else(|| Error::value("no database given and none configured"))?;
        if buffered {
            self.buffer.next(&self.source, database, item, bound)
        } else {
            self.source.next_bounded(database, item, bound)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::is_remote_error;
    use crate::testing::MemoryItemSource;

    fn items(lines: &[&str]) -> Vec<Item> {
        lines.iter().map(|line| Item::parse(line).unwrap()).collect()
    }

    fn item(line: &str) -> Item {
        Item::parse(line).unwrap()
    }

    fn source() -> MemoryItemSource {
        MemoryItemSource::new().with_database(
            "demo/readonly",
            items(&[
                "E a 1",
                "E a 2",
                "E a 3 4",
                "E b 1",
                "F a 1",
            ]),
        )
    }

    fn buffer(size: usize) -> NextBuffer {
        NextBuffer::new(&CursorConfig::default().with_buffer_size(size)).unwrap()
    }

    #[test]
    fn bound_prefixes_and_ends() {
        let it = item("E a 1 2 b 3");
        assert_eq!(Bound::Item.prefix_len(&it), 0);
        assert_eq!(Bound::Tuple.prefix_len(&it), 5);
        assert_eq!(Bound::Component.prefix_len(&it), 5);
        assert_eq!(Bound::Tuple.truncate_end(&it, 2), 4);
        assert_eq!(Bound::Component.truncate_end(&it, 2), 3);
        assert_eq!(Bound::Item.truncate_end(&it, 2), 6);
        assert_eq!(Bound::Component.prefix_len(&Item::default()), 0);
    }

    #[test]
    fn window_serves_consecutive_items_without_refetch() {
        let source = source();
        let mut buf = buffer(10);
        let db = "demo/readonly";

        let mut seen = Vec::new();
        let mut current = Item::default();
        while let Some(next) = buf.next(&source, db, &current, Bound::Item).unwrap() {
            seen.push(next.to_string());
            current = next;
        }
        assert_eq!(seen, vec!["E a 1", "E a 2", "E a 3 4", "E b 1", "F a 1"]);
        let calls = source.calls();
        assert_eq!(calls.next_bounded, 2);
        assert_eq!(calls.items_batch, 1);
    }

    #[test]
    fn component_bound_stops_at_prefix_end() {
        let source = source();
        let mut buf = buffer(10);
        let db = "demo/readonly";
        assert_eq!(
            buf.next(&source, db, &item("E a 2"), Bound::Component).unwrap(),
            Some(item("E a 3"))
        );
        assert_eq!(
            buf.next(&source, db, &item("E a 3"), Bound::Component).unwrap(),
            None
        );
        assert_eq!(buf.database(), Some(db));
    }

    #[test]
    fn tuple_bound_skips_equal_tuples() {
        let source = MemoryItemSource::new().with_database(
            "db",
            items(&["E a 1 b 9", "E a 1 c 9", "E a 2", "E a 2 3"]),
        );
        let mut buf = buffer(10);
        assert_eq!(
            buf.next(&source, "db", &item("E a 1"), Bound::Tuple).unwrap(),
            Some(item("E a 2"))
        );
        assert_eq!(
            buf.next(&source, "db", &item("E a 2"), Bound::Tuple).unwrap(),
            Some(item("E a 2 3"))
        );
    }

    #[test]
    fn short_windows_refill() {
        let source = source();
        let mut buf = buffer(1);
        let db = "demo/readonly";
        let mut current = Item::default();
        let mut count = 0;
        while let Some(next) = buf.next(&source, db, &current, Bound::Item).unwrap() {
            current = next;
            count += 1;
        }
        assert_eq!(count, 5);
        assert!(source.calls().items_batch >= 5);
    }

    #[test]
    fn database_change_discards_window() {
        let source = source().with_database("other", items(&["X a 1"]));
        let mut buf = buffer(10);
        buf.next(&source, "demo/readonly", &Item::default(), Bound::Item)
            .unwrap();
        assert!(!buf.is_empty());
        assert_eq!(
            buf.next(&source, "other", &Item::default(), Bound::Item).unwrap(),
            Some(item("X a 1"))
        );
        assert_eq!(buf.database(), Some("other"));
    }

    #[test]
    fn flush_and_resize() {
        let source = source();
        let mut buf = buffer(10);
        buf.next(&source, "demo/readonly", &Item::default(), Bound::Item)
            .unwrap();
        buf.configure(true, Some(3)).unwrap();
        assert!(buf.is_empty());
        assert_eq!(buf.size(), 3);
        assert!(matches!(buf.set_size(0), Err(Error::Value(_))));
        assert_eq!(buf.size(), 3);
    }

    #[test]
    fn source_failures_propagate_and_clear_window() {
        let source = source();
        let mut buf = buffer(10);
        buf.next(&source, "demo/readonly", &Item::default(), Bound::Item)
            .unwrap();
        buf.flush();
        source.fail_next(503, "Service Unavailable");
        let err = buf
            .next(&source, "demo/readonly", &item("E a 1"), Bound::Item)
            .unwrap_err();
        assert!(is_remote_error(&err, 503));
        assert!(buf.is_empty());

        let missing = buf.next(&source, "nope", &Item::default(), Bound::Item);
        assert!(matches!(missing, Err(ref err) if is_remote_error(err, 404)));
    }

    #[test]
    fn cursor_uses_configured_database() {
        let config = CursorConfig::default().with_database("demo/readonly");
        let mut cursor = Cursor::new(source(), config).unwrap();
        assert_eq!(cursor.next_item(&Item::default()).unwrap(), Some(item("E a 1")));
        assert_eq!(cursor.next_component(&item("E a 1")).unwrap(), Some(item("E a 2")));
        assert_eq!(cursor.next_tuple(&item("E a 3")).unwrap(), Some(item("E a 3 4")));
        assert_eq!(
            cursor
                .next_in(None, &item("E b 1"), Bound::Item, false)
                .unwrap(),
            Some(item("F a 1"))
        );
        cursor.configure_buffer(true, None).unwrap();
        assert!(cursor.buffer().is_empty());
    }

    #[test]
    fn cursor_without_database_fails() {
        let mut cursor = Cursor::new(source(), CursorConfig::default()).unwrap();
        assert!(matches!(
            cursor.next_item(&Item::default()),
            Err(Error::Value(_))
        ));
        assert!(Cursor::new(source(), CursorConfig::default().with_buffer_size(0)).is_err());
    }
}
