//! Pattern queries over a row store
//!
//! [`QueryEngine::query`] picks the first registered layout able to answer a
//! pattern, plans its byte range, runs the scan and returns a lazy
//! [`StatementStream`] of decoded statements.
//!
//! Range-valued patterns are re-checked per statement: a range scan covers
//! the range's bytes, which for typed objects can include values of other
//! datatypes sharing the same prefix.

use crate::error::{QueryError, Result};
use std::sync::Arc;
use tristore_core::{
    Cursor, Error, IndexConfig, Layout, LayoutRegistry, RowScanner, Statement, TriplePattern,
    TripleRowResolver, ValueCodec,
};

/// Entry point for pattern scans
pub struct QueryEngine<S> {
    store: S,
    registry: LayoutRegistry,
    codec: Arc<ValueCodec>,
    config: IndexConfig,
}

impl<S: RowScanner> QueryEngine<S> {
    /// Engine over `store` with the standard codec and the layouts of `config`
    pub fn new(store: S, config: IndexConfig) -> Self {
        Self {
            store,
            registry: LayoutRegistry::from_config(&config),
            codec: Arc::new(ValueCodec::new()),
            config,
        }
    }

    /// Replace the codec (custom datatypes)
    pub fn with_codec(mut self, codec: ValueCodec) -> Self {
        self.codec = Arc::new(codec);
        self
    }

    pub fn codec(&self) -> &ValueCodec {
        &self.codec
    }

    pub(crate) fn shared_codec(&self) -> Arc<ValueCodec> {
        Arc::clone(&self.codec)
    }

    pub fn registry(&self) -> &LayoutRegistry {
        &self.registry
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Statements matching `pattern`, from the first applicable layout
    pub fn query(&self, pattern: &TriplePattern) -> Result<StatementStream<S::Cursor>> {
        let layouts = self.registry.applicable_layouts(pattern)?;
        let layout = layouts
            .first()
            .copied()
            .ok_or_else(|| Error::no_applicable_layout(pattern.to_string()))?;
        self.query_on(layout, pattern)
    }

    /// Statements matching `pattern`, scanned from `layout`
    pub fn query_on(&self, layout: Layout, pattern: &TriplePattern) -> Result<StatementStream<S::Cursor>> {
        let span = tracing::debug_span!(
            "query_scan",
            layout = %layout,
            table = %self.config.table_name(layout)
        );
        let _guard = span.enter();

        let strategy = self.registry.strategy(layout).ok_or_else(|| {
            Error::unsupported_pattern(layout.name(), "layout is not registered")
        })?;
        let request = strategy.scan_request(&self.codec, pattern)?;
        tracing::debug!(
            range = ?request.range,
            column_family = request.column_family.is_some(),
            "scan opened"
        );
        let cursor = self.store.scan(&request)?;

        let filter = (pattern.range_count() > 0).then(|| pattern.clone());
        Ok(StatementStream {
            inner: cursor,
            layout,
            codec: self.shared_codec(),
            hashed_rows: self.config.hashed_rows,
            filter,
            closed: false,
        })
    }
}

/// Decoded statements of one scan
pub struct StatementStream<C> {
    inner: C,
    layout: Layout,
    codec: Arc<ValueCodec>,
    hashed_rows: bool,
    filter: Option<TriplePattern>,
    closed: bool,
}

impl<C> StatementStream<C> {
    pub fn layout(&self) -> Layout {
        self.layout
    }
}

impl<C> Cursor for StatementStream<C>
where
    C: Cursor<Item = tristore_core::TripleRow, Error = Error>,
{
    type Item = Statement;
    type Error = QueryError;

    fn try_next(&mut self) -> Result<Option<Statement>> {
        if self.closed {
            return Err(QueryError::CursorClosed);
        }
        let resolver =
            TripleRowResolver::new(&self.codec, Vec::new()).with_hashed_rows(self.hashed_rows);
        while let Some(row) = self.inner.try_next()? {
            let stmt = resolver.deserialize(self.layout, &row)?;
            match &self.filter {
                Some(pattern) if !pattern.matches(&self.codec, &stmt)? => {
                    tracing::trace!(%stmt, "residual filter rejected statement");
                }
                _ => return Ok(Some(stmt)),
            }
        }
        Ok(None)
    }

    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.inner.close()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tristore_core::{MemoryStore, Value, ValueRange};

    fn engine() -> QueryEngine<MemoryStore> {
        let store = MemoryStore::default();
        let codec = ValueCodec::new();
        let p = Value::iri("urn:p");
        for (s, o) in [("urn:a", Value::int(1)), ("urn:b", Value::int(5)), ("urn:c", Value::literal("80000003"))] {
            store
                .insert(&codec, &Statement::new(Value::iri(s), p.clone(), o))
                .unwrap();
        }
        QueryEngine::new(store, IndexConfig::default())
    }

    fn collect<C: Cursor<Item = Statement, Error = QueryError>>(mut c: C) -> Vec<Statement> {
        let mut out = Vec::new();
        while let Some(s) = c.try_next().unwrap() {
            out.push(s);
        }
        c.close().unwrap();
        out
    }

    #[test]
    fn test_query_predicate() {
        let engine = engine();
        let stream = engine.query(&TriplePattern::predicate(Value::iri("urn:p"))).unwrap();
        assert_eq!(stream.layout(), Layout::Pos);
        assert_eq!(collect(stream).len(), 3);
    }

    #[test]
    fn test_query_range_filters_other_datatypes() {
        let engine = engine();
        let pattern = TriplePattern::predicate(Value::iri("urn:p"))
            .with_object(ValueRange::new(Value::int(0), Value::int(9)));
        let subjects: Vec<Value> = collect(engine.query(&pattern).unwrap())
            .iter()
            .map(|s| s.subject().clone())
            .collect();
        assert_eq!(subjects, vec![Value::iri("urn:a"), Value::iri("urn:b")]);
    }

    #[test]
    fn test_query_no_layout() {
        let engine = engine();
        let err = engine.query(&TriplePattern::new()).err().unwrap();
        assert!(matches!(err, QueryError::Core(Error::NoApplicableLayout(_))));
    }

    #[test]
    fn test_query_hashed_rows() {
        let config = IndexConfig::default().with_hashed_rows(true);
        let store = MemoryStore::new(config.clone());
        let codec = ValueCodec::new();
        for (s, p) in [("urn:a", "urn:p"), ("urn:b", "urn:p"), ("urn:a", "urn:q")] {
            store
                .insert(&codec, &Statement::new(Value::iri(s), Value::iri(p), Value::int(1)))
                .unwrap();
        }
        let engine = QueryEngine::new(store, config);

        let by_predicate = collect(engine.query(&TriplePattern::predicate(Value::iri("urn:p"))).unwrap());
        assert_eq!(by_predicate.len(), 2);
        let by_subject = collect(
            engine
                .query(&TriplePattern::new().with_subject(Value::iri("urn:a")))
                .unwrap(),
        );
        assert_eq!(by_subject.len(), 2);

        let anchor_range =
            TriplePattern::new().with_object(ValueRange::new(Value::int(0), Value::int(9)));
        assert!(matches!(
            engine.query(&anchor_range).err().unwrap(),
            QueryError::Core(Error::NoApplicableLayout(_))
        ));
    }

    #[test]
    fn test_closed_stream() {
        let engine = engine();
        let mut stream = engine.query(&TriplePattern::predicate(Value::iri("urn:p"))).unwrap();
        stream.close().unwrap();
        stream.close().unwrap();
        assert_eq!(stream.try_next(), Err(QueryError::CursorClosed));
    }
}
