//! Physical rows
//!
//! Every statement is written once per enabled layout. The row key holds the
//! layout's fields in order, joined by [`DELIM`](crate::key::DELIM):
//!
//! | Layout | Row key | Column family |
//! |--------|---------|---------------|
//! | SPO | `s 00 p 00 o` | context or empty |
//! | POS | `p 00 o 00 s` | context or empty |
//! | OSP | `o 00 s 00 p` | context or empty |
//! | CSPO | `c 00 s 00 p 00 o` | empty |
//! | CPOS | `c 00 p 00 o 00 s` | empty |
//! | COSP | `c 00 o 00 s 00 p` | empty |
//!
//! `o` is the object's typed encoding; the other fields are raw identifiers.
//!
//! In hashed mode each row key is prefixed with `row_hash(f1) 00`, the hex
//! SHA-256 of the layout's first field (see [`key::row_hash`]).

use crate::codec::ValueCodec;
use crate::error::{Error, Result};
use crate::key;
use crate::layout::{Layout, Position};
use crate::statement::Statement;
use crate::value::Value;

/// One key-value store row
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TripleRow {
    pub row: Vec<u8>,
    pub column_family: Vec<u8>,
    pub column_visibility: Vec<u8>,
    pub timestamp: Option<u64>,
}

/// Converts statements to and from the rows of a set of layouts
#[derive(Debug)]
pub struct TripleRowResolver<'a> {
    codec: &'a ValueCodec,
    layouts: Vec<Layout>,
    hashed_rows: bool,
}

impl<'a> TripleRowResolver<'a> {
    pub fn new(codec: &'a ValueCodec, layouts: impl Into<Vec<Layout>>) -> Self {
        Self {
            codec,
            layouts: layouts.into(),
            hashed_rows: false,
        }
    }

    /// Read and write rows prefixed with the hash of their first field
    pub fn with_hashed_rows(mut self, enabled: bool) -> Self {
        self.hashed_rows = enabled;
        self
    }

    pub fn layouts(&self) -> &[Layout] {
        &self.layouts
    }

    /// One row per enabled layout.
    ///
    /// Context-qualified layouts are skipped for statements in the default graph.
    pub fn serialize(&self, stmt: &Statement) -> Result<Vec<(Layout, TripleRow)>> {
        self.layouts
            .iter()
            .filter(|l| stmt.context().is_some() || !l.is_context_qualified())
            .map(|l| Ok((*l, self.serialize_layout(*l, stmt)?)))
            .collect()
    }

    /// Row for a single layout
    pub fn serialize_layout(&self, layout: Layout, stmt: &Statement) -> Result<TripleRow> {
        let mut fields = Vec::with_capacity(4);
        for position in layout.fields() {
            let value = match position {
                Position::Subject => stmt.subject(),
                Position::Predicate => stmt.predicate(),
                Position::Object => stmt.object(),
                Position::Context => stmt.context().ok_or_else(|| {
                    Error::invalid_argument(format!("{} row requires a context: {}", layout, stmt))
                })?,
            };
            fields.push(self.codec.encode_at(*position, value)?);
        }

        let column_family = match (layout.is_context_qualified(), stmt.context()) {
            (false, Some(c)) => self.codec.encode_at(Position::Context, c)?,
            _ => Vec::new(),
        };

        if self.hashed_rows {
            let hash = key::row_hash(&fields[0]);
            fields.insert(0, hash);
        }

        Ok(TripleRow {
            row: key::join_fields(&fields),
            column_family,
            column_visibility: stmt.visibility().map(<[u8]>::to_vec).unwrap_or_default(),
            timestamp: stmt.timestamp(),
        })
    }

    /// Inverse of [`serialize_layout`](Self::serialize_layout)
    pub fn deserialize(&self, layout: Layout, row: &TripleRow) -> Result<Statement> {
        let positions = layout.fields();
        let body = if self.hashed_rows {
            strip_row_hash(layout, &row.row)?
        } else {
            row.row.as_slice()
        };
        let fields = key::split_fields(body, positions.len()).ok_or_else(|| {
            Error::decode(format!(
                "{} row has fewer than {} fields: {:?}",
                layout,
                positions.len(),
                String::from_utf8_lossy(&row.row)
            ))
        })?;

        let mut subject = None;
        let mut predicate = None;
        let mut object = None;
        let mut context = None;
        for (position, bytes) in positions.iter().zip(fields) {
            let value = self.codec.decode(*position, bytes)?;
            match position {
                Position::Subject => subject = Some(value),
                Position::Predicate => predicate = Some(value),
                Position::Object => object = Some(value),
                Position::Context => context = Some(value),
            }
        }
        if !layout.is_context_qualified() {
            context = column_family_context(self.codec, &row.column_family)?;
        }

        let (Some(s), Some(p), Some(o)) = (subject, predicate, object) else {
            return Err(Error::decode(format!("{} row is missing a field", layout)));
        };
        let mut stmt = Statement::new(s, p, o)
            .with_context_opt(context)
            .with_visibility(row.column_visibility.clone());
        if let Some(ts) = row.timestamp {
            stmt = stmt.with_timestamp(ts);
        }
        Ok(stmt)
    }
}

/// Row key without its hash prefix, after checking the hash
fn strip_row_hash(layout: Layout, row: &[u8]) -> Result<&[u8]> {
    let bad = || {
        Error::decode(format!(
            "{} row does not carry a valid hash prefix: {:?}",
            layout,
            String::from_utf8_lossy(row)
        ))
    };
    let split = row.iter().position(|b| *b == key::DELIM).ok_or_else(bad)?;
    let (hash, body) = (&row[..split], &row[split + 1..]);
    let anchor = body.split(|b| *b == key::DELIM).next().unwrap_or_default();
    if key::row_hash(anchor) != hash {
        return Err(bad());
    }
    Ok(body)
}

/// Decode a context column family; empty is the default graph.
pub fn column_family_context(codec: &ValueCodec, cf: &[u8]) -> Result<Option<Value>> {
    if cf.is_empty() {
        return Ok(None);
    }
    codec.decode(Position::Context, cf).map(Some)
}
