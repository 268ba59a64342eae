//! Storage seam
//!
//! The sorted key-value store is an external collaborator. It is reached
//! through two traits:
//!
//! - [`Cursor`]: a lazy, closeable, fallible sequence
//! - [`RowScanner`]: runs a [`ScanRequest`] and returns a cursor of [`TripleRow`]s
//!
//! [`MemoryStore`] implements the seam over ordered in-memory maps, for tests
//! and embedders.

use crate::codec::ValueCodec;
use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::row::{TripleRow, TripleRowResolver};
use crate::statement::Statement;
use crate::strategy::ScanRequest;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::ops::Bound;
use std::sync::Arc;

/// Pull-based sequence with explicit release.
///
/// `try_next` returns `Ok(None)` once exhausted. `close` releases the
/// underlying resources and may be called more than once.
pub trait Cursor {
    type Item;
    type Error;

    fn try_next(&mut self) -> std::result::Result<Option<Self::Item>, Self::Error>;

    fn close(&mut self) -> std::result::Result<(), Self::Error>;
}

impl<C: Cursor + ?Sized> Cursor for Box<C> {
    type Item = C::Item;
    type Error = C::Error;

    fn try_next(&mut self) -> std::result::Result<Option<Self::Item>, Self::Error> {
        (**self).try_next()
    }

    fn close(&mut self) -> std::result::Result<(), Self::Error> {
        (**self).close()
    }
}

/// Executes scans against one physical store
pub trait RowScanner {
    type Cursor: Cursor<Item = TripleRow, Error = Error>;

    /// Rows of `request.layout` with keys in `request.range`, in key order,
    /// restricted to `request.column_family` when set.
    fn scan(&self, request: &ScanRequest) -> Result<Self::Cursor>;
}

impl<S: RowScanner + ?Sized> RowScanner for &S {
    type Cursor = S::Cursor;

    fn scan(&self, request: &ScanRequest) -> Result<Self::Cursor> {
        (**self).scan(request)
    }
}

impl<S: RowScanner + ?Sized> RowScanner for Arc<S> {
    type Cursor = S::Cursor;

    fn scan(&self, request: &ScanRequest) -> Result<Self::Cursor> {
        (**self).scan(request)
    }
}

/// (row, column family, column visibility)
type CellKey = (Vec<u8>, Vec<u8>, Vec<u8>);

/// In-memory store with one ordered map per layout
///
/// Clones share the same tables.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    config: IndexConfig,
    tables: Arc<RwLock<HashMap<Layout, BTreeMap<CellKey, Option<u64>>>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(IndexConfig::default())
    }
}

impl MemoryStore {
    pub fn new(config: IndexConfig) -> Self {
        Self {
            config,
            tables: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    fn resolver<'c>(&self, codec: &'c ValueCodec) -> TripleRowResolver<'c> {
        TripleRowResolver::new(codec, self.config.layouts()).with_hashed_rows(self.config.hashed_rows)
    }

    /// Write `stmt` to every enabled layout
    pub fn insert(&self, codec: &ValueCodec, stmt: &Statement) -> Result<()> {
        let rows = self.resolver(codec).serialize(stmt)?;
        let mut tables = self.tables.write();
        for (layout, row) in rows {
            let (key, ts) = cell(row);
            tables.entry(layout).or_default().insert(key, ts);
        }
        Ok(())
    }

    /// Remove `stmt` from every enabled layout. Returns whether any row existed.
    pub fn remove(&self, codec: &ValueCodec, stmt: &Statement) -> Result<bool> {
        let rows = self.resolver(codec).serialize(stmt)?;
        let mut tables = self.tables.write();
        let mut removed = false;
        for (layout, row) in rows {
            let (key, _) = cell(row);
            if let Some(table) = tables.get_mut(&layout) {
                removed |= table.remove(&key).is_some();
            }
        }
        Ok(removed)
    }

    /// Write a raw row to one layout
    pub fn insert_row(&self, layout: Layout, row: TripleRow) {
        let (key, ts) = cell(row);
        self.tables.write().entry(layout).or_default().insert(key, ts);
    }

    /// Number of rows stored for `layout`
    pub fn len(&self, layout: Layout) -> usize {
        self.tables.read().get(&layout).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self) -> bool {
        self.tables.read().values().all(BTreeMap::is_empty)
    }
}

fn cell(row: TripleRow) -> (CellKey, Option<u64>) {
    ((row.row, row.column_family, row.column_visibility), row.timestamp)
}

impl RowScanner for MemoryStore {
    type Cursor = MemoryCursor;

    fn scan(&self, request: &ScanRequest) -> Result<MemoryCursor> {
        let range = &request.range;
        if range.is_empty() {
            return Ok(MemoryCursor::new(Vec::new()));
        }

        let tables = self.tables.read();
        let Some(table) = tables.get(&request.layout) else {
            return Ok(MemoryCursor::new(Vec::new()));
        };

        let lower = Bound::Included((range.start.clone(), Vec::new(), Vec::new()));
        let upper = Bound::Excluded((range.stop.clone(), Vec::new(), Vec::new()));
        let rows: Vec<TripleRow> = table
            .range((lower, upper))
            .filter(|((_, cf, _), _)| {
                request
                    .column_family
                    .as_ref()
                    .map_or(true, |want| want == cf)
            })
            .map(|((row, cf, vis), ts)| TripleRow {
                row: row.clone(),
                column_family: cf.clone(),
                column_visibility: vis.clone(),
                timestamp: *ts,
            })
            .collect();

        tracing::trace!(
            table = %self.config.table_name(request.layout),
            rows = rows.len(),
            "memory scan"
        );
        Ok(MemoryCursor::new(rows))
    }
}

/// Cursor over a snapshot of scanned rows
#[derive(Debug)]
pub struct MemoryCursor {
    rows: std::vec::IntoIter<TripleRow>,
    closed: bool,
}

impl MemoryCursor {
    fn new(rows: Vec<TripleRow>) -> Self {
        Self {
            rows: rows.into_iter(),
            closed: false,
        }
    }
}

impl Cursor for MemoryCursor {
    type Item = TripleRow;
    type Error = Error;

    fn try_next(&mut self) -> Result<Option<TripleRow>> {
        if self.closed {
            return Ok(None);
        }
        Ok(self.rows.next())
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.rows = Vec::new().into_iter();
        Ok(())
    }
}
