//! Sort-merge join over pre-sorted statement streams
//!
//! Two join modes share one merge loop:
//!
//! - **Predicate join** (`join_predicates`): keyed on the object's typed
//!   encoding. Each input is a POS scan of one predicate, so it is already
//!   ordered by object. Emits the first input's statement for every object
//!   value present in all inputs.
//! - **Resource join** (`MergeJoin::join_resources`): keyed on the subject.
//!   Each input is a POS scan of one `(predicate, object)` pair, ordered by
//!   subject. Emits every subject present in all inputs.
//!
//! # Semantics
//!
//! The merge keeps one current item per input. Inputs whose key is below the
//! largest current key are advanced; once all keys agree the match is emitted
//! and every input advances on the following pull. Duplicate keys inside an
//! input therefore pair up positionally instead of producing a cross product.
//! The first exhausted input ends the join.
//!
//! # Lifecycle
//!
//! `Start -> Checking -> Emitting -> Checking ... -> Exhausted`. A child error
//! moves the join to `Exhausted` and is returned. An emitted match is never
//! lost to a failing child: the read past it happens on the next pull. `close()` closes each child
//! once and may be repeated; dropping an unclosed join closes its children.

use crate::engine::{QueryEngine, StatementStream};
use crate::error::{QueryError, Result};
use crate::peek::PeekableCursor;
use std::sync::Arc;
use tristore_core::{
    Cursor, Layout, Position, RowScanner, Statement, Term, TriplePattern, Value, ValueCodec,
    ValueRange,
};

/// Join progress
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinState {
    /// No input has been read
    Start,
    /// Aligning inputs on the largest current key
    Checking,
    /// All inputs agree; the next call emits
    Emitting,
    /// An input ran out, failed, or the join was closed
    Exhausted,
}

/// Which statement field the inputs are merged on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum JoinKey {
    Object,
    Subject,
}

impl JoinKey {
    fn name(&self) -> &'static str {
        match self {
            JoinKey::Object => "predicate",
            JoinKey::Subject => "resource",
        }
    }

    fn extract(&self, codec: &ValueCodec, stmt: &Statement) -> Result<Vec<u8>> {
        Ok(match self {
            JoinKey::Object => codec.encode(stmt.object())?,
            JoinKey::Subject => codec.encode_at(Position::Subject, stmt.subject())?,
        })
    }
}

struct Head {
    key: Vec<u8>,
    stmt: Statement,
}

/// Merge loop shared by both join modes
struct Merge<C: Cursor<Item = Statement>> {
    key: JoinKey,
    codec: Arc<ValueCodec>,
    inputs: Vec<C>,
    open: Vec<bool>,
    heads: Vec<Option<Head>>,
    state: JoinState,
    /// Every input still has to move past the last emitted match
    advance_pending: bool,
    closed: bool,
}

impl<C> Merge<C>
where
    C: Cursor<Item = Statement>,
    QueryError: From<C::Error>,
{
    fn new(key: JoinKey, codec: Arc<ValueCodec>, inputs: Vec<C>) -> Self {
        let n = inputs.len();
        Self {
            key,
            codec,
            inputs,
            open: vec![true; n],
            heads: (0..n).map(|_| None).collect(),
            state: JoinState::Start,
            advance_pending: false,
            closed: false,
        }
    }

    /// Read the next item of input `i`; false once it is exhausted.
    fn advance(&mut self, i: usize) -> Result<bool> {
        match self.inputs[i].try_next()? {
            Some(stmt) => {
                let key = self.key.extract(&self.codec, &stmt)?;
                self.heads[i] = Some(Head { key, stmt });
                Ok(true)
            }
            None => {
                self.heads[i] = None;
                tracing::debug!(mode = self.key.name(), input = i, "input exhausted, join complete");
                self.state = JoinState::Exhausted;
                Ok(false)
            }
        }
    }

    fn key_of(&self, i: usize) -> Option<&[u8]> {
        self.heads[i].as_ref().map(|h| h.key.as_slice())
    }

    fn next_match(&mut self) -> Result<Option<Statement>> {
        if self.closed {
            return Err(QueryError::CursorClosed);
        }
        match self.run() {
            Ok(found) => Ok(found),
            Err(e) => {
                tracing::debug!(mode = self.key.name(), error = %e, "merge join aborted");
                self.state = JoinState::Exhausted;
                self.heads.iter_mut().for_each(|h| *h = None);
                Err(e)
            }
        }
    }

    fn run(&mut self) -> Result<Option<Statement>> {
        let n = self.inputs.len();
        if std::mem::take(&mut self.advance_pending) && self.state == JoinState::Checking {
            for i in 0..n {
                if !self.advance(i)? {
                    return Ok(None);
                }
            }
        }
        loop {
            match self.state {
                JoinState::Start => {
                    for i in 0..n {
                        if !self.advance(i)? {
                            return Ok(None);
                        }
                    }
                    self.state = JoinState::Checking;
                }
                JoinState::Checking => {
                    let Some(mut max) = (0..n).filter_map(|i| self.key_of(i)).max().map(<[u8]>::to_vec)
                    else {
                        self.state = JoinState::Exhausted;
                        return Ok(None);
                    };
                    let mut aligned = true;
                    for i in 0..n {
                        while self.key_of(i).is_some_and(|k| k < max.as_slice()) {
                            if !self.advance(i)? {
                                return Ok(None);
                            }
                        }
                        if let Some(k) = self.key_of(i) {
                            if k > max.as_slice() {
                                max = k.to_vec();
                                aligned = false;
                            }
                        }
                    }
                    if aligned {
                        self.state = JoinState::Emitting;
                    }
                }
                JoinState::Emitting => {
                    let out = self.heads[0].take().map(|h| h.stmt);
                    tracing::trace!(mode = self.key.name(), "merge join emitting");
                    self.state = JoinState::Checking;
                    self.advance_pending = true;
                    return Ok(out);
                }
                JoinState::Exhausted => return Ok(None),
            }
        }
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        self.advance_pending = false;
        self.state = JoinState::Exhausted;
        self.heads.iter_mut().for_each(|h| *h = None);

        let mut first_err = None;
        for (input, open) in self.inputs.iter_mut().zip(self.open.iter_mut()) {
            if *open {
                *open = false;
                if let Err(e) = input.close() {
                    first_err.get_or_insert(QueryError::from(e));
                }
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}

impl<C: Cursor<Item = Statement>> Drop for Merge<C> {
    fn drop(&mut self) {
        for (input, open) in self.inputs.iter_mut().zip(self.open.iter_mut()) {
            if *open {
                *open = false;
                let _ = input.close();
            }
        }
    }
}

/// Statements whose object appears under every joined predicate
pub struct PredicateJoin<C: Cursor<Item = Statement>> {
    merge: Merge<C>,
}

impl<C> PredicateJoin<C>
where
    C: Cursor<Item = Statement>,
    QueryError: From<C::Error>,
{
    pub fn state(&self) -> JoinState {
        self.merge.state
    }
}

impl<C> Cursor for PredicateJoin<C>
where
    C: Cursor<Item = Statement>,
    QueryError: From<C::Error>,
{
    type Item = Statement;
    type Error = QueryError;

    fn try_next(&mut self) -> Result<Option<Statement>> {
        self.merge.next_match()
    }

    fn close(&mut self) -> Result<()> {
        self.merge.close()
    }
}

/// Subjects carrying every joined `(predicate, object)` pair
pub struct ResourceJoin<C: Cursor<Item = Statement>> {
    merge: Merge<C>,
}

impl<C> ResourceJoin<C>
where
    C: Cursor<Item = Statement>,
    QueryError: From<C::Error>,
{
    pub fn state(&self) -> JoinState {
        self.merge.state
    }
}

impl<C> Cursor for ResourceJoin<C>
where
    C: Cursor<Item = Statement>,
    QueryError: From<C::Error>,
{
    type Item = Value;
    type Error = QueryError;

    fn try_next(&mut self) -> Result<Option<Value>> {
        Ok(self.merge.next_match()?.map(|s| s.subject().clone()))
    }

    fn close(&mut self) -> Result<()> {
        self.merge.close()
    }
}

/// Join streams that are each sorted by object encoding.
///
/// Fails with `InvalidArgument` for fewer than two streams; the given
/// streams are closed in that case.
pub fn join_predicates<C>(codec: Arc<ValueCodec>, streams: Vec<C>) -> Result<PredicateJoin<C>>
where
    C: Cursor<Item = Statement>,
    QueryError: From<C::Error>,
{
    if streams.len() < 2 {
        let n = streams.len();
        close_all(streams);
        return Err(QueryError::invalid_argument(format!(
            "merge join needs at least 2 inputs, got {}",
            n
        )));
    }
    Ok(PredicateJoin {
        merge: Merge::new(JoinKey::Object, codec, streams),
    })
}

fn close_all<C: Cursor>(streams: Vec<C>) {
    for mut s in streams {
        let _ = s.close();
    }
}

/// A bound, non-range join key or `InvalidArgument`
fn scalar<'t>(term: &'t Term, what: &str) -> Result<&'t Value> {
    match term {
        Term::Scalar(v) => Ok(v),
        Term::Range(r) => Err(QueryError::invalid_argument(format!(
            "{} must not be a range: {}",
            what, r
        ))),
        Term::Unbound => Err(QueryError::invalid_argument(format!("{} must be bound", what))),
    }
}

/// Merge joins driven by a [`QueryEngine`]
pub struct MergeJoin<'a, S> {
    engine: &'a QueryEngine<S>,
}

impl<'a, S: RowScanner> MergeJoin<'a, S> {
    pub fn new(engine: &'a QueryEngine<S>) -> Self {
        Self { engine }
    }

    /// Statements sharing an object value across all `predicates`
    pub fn join_predicates(&self, predicates: &[Term]) -> Result<PredicateJoin<StatementStream<S::Cursor>>> {
        if predicates.len() < 2 {
            return Err(QueryError::invalid_argument(format!(
                "merge join needs at least 2 predicates, got {}",
                predicates.len()
            )));
        }
        let predicates = predicates
            .iter()
            .map(|p| scalar(p, "predicate"))
            .collect::<Result<Vec<_>>>()?;

        let span = tracing::debug_span!("merge_join", mode = "predicate", inputs = predicates.len());
        let _guard = span.enter();

        let mut streams = Vec::with_capacity(predicates.len());
        for p in predicates {
            let pattern = TriplePattern::predicate(p.clone());
            match self.engine.query_on(Layout::Pos, &pattern) {
                Ok(s) => streams.push(s),
                Err(e) => {
                    close_all(streams);
                    return Err(e);
                }
            }
        }
        join_predicates(self.engine.shared_codec(), streams)
    }

    /// Subjects having every `(predicate, object)` pair.
    ///
    /// Each pair after the first is scanned from the first subject of the
    /// previously opened scan onward. If any scan is empty the result is
    /// empty and the scans already opened are closed.
    #[allow(clippy::type_complexity)]
    pub fn join_resources(
        &self,
        pairs: &[(Term, Term)],
    ) -> Result<ResourceJoin<PeekableCursor<StatementStream<S::Cursor>>>> {
        if pairs.len() < 2 {
            return Err(QueryError::invalid_argument(format!(
                "merge join needs at least 2 predicate/object pairs, got {}",
                pairs.len()
            )));
        }
        let pairs = pairs
            .iter()
            .map(|(p, o)| Ok((scalar(p, "predicate")?, scalar(o, "object")?)))
            .collect::<Result<Vec<_>>>()?;

        let span = tracing::debug_span!("merge_join", mode = "resource", inputs = pairs.len());
        let _guard = span.enter();

        let codec = self.engine.shared_codec();
        let mut streams: Vec<PeekableCursor<StatementStream<S::Cursor>>> = Vec::with_capacity(pairs.len());
        let mut earliest: Option<Value> = None;
        for (p, o) in pairs {
            let mut pattern = TriplePattern::predicate_object(p.clone(), o.clone());
            if let Some(subject) = earliest.take() {
                pattern = pattern.with_subject(ValueRange::resources_from(subject));
            }

            let mut stream = match self.engine.query_on(Layout::Pos, &pattern) {
                Ok(s) => PeekableCursor::new(s),
                Err(e) => {
                    close_all(streams);
                    return Err(e);
                }
            };
            let peeked = stream.peek().map(|first| first.map(|s| s.subject().clone()));
            let first = match peeked {
                Ok(first) => first,
                Err(e) => {
                    streams.push(stream);
                    close_all(streams);
                    return Err(e);
                }
            };
            streams.push(stream);

            match first {
                Some(subject) => earliest = Some(subject),
                None => {
                    tracing::debug!(%pattern, "empty input, resource join is empty");
                    close_all(streams);
                    let mut merge = Merge::new(JoinKey::Subject, codec, Vec::new());
                    merge.state = JoinState::Exhausted;
                    return Ok(ResourceJoin { merge });
                }
            }
        }

        Ok(ResourceJoin {
            merge: Merge::new(JoinKey::Subject, codec, streams),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use tristore_core::Error;

    struct VecCursor {
        items: std::vec::IntoIter<Statement>,
        fail_at: Option<usize>,
        served: usize,
        closes: Rc<Cell<usize>>,
    }

    impl Cursor for VecCursor {
        type Item = Statement;
        type Error = QueryError;

        fn try_next(&mut self) -> Result<Option<Statement>> {
            if self.fail_at == Some(self.served) {
                return Err(Error::storage("scan failed").into());
            }
            self.served += 1;
            Ok(self.items.next())
        }

        fn close(&mut self) -> Result<()> {
            self.closes.set(self.closes.get() + 1);
            Ok(())
        }
    }

    fn stream(p: &str, objects: &[i32], closes: &Rc<Cell<usize>>) -> VecCursor {
        let items: Vec<Statement> = objects
            .iter()
            .enumerate()
            .map(|(i, o)| {
                Statement::new(
                    Value::iri(format!("urn:s{}", i)),
                    Value::iri(p),
                    Value::int(*o),
                )
            })
            .collect();
        VecCursor {
            items: items.into_iter(),
            fail_at: None,
            served: 0,
            closes: Rc::clone(closes),
        }
    }

    fn objects<C: Cursor<Item = Statement, Error = QueryError>>(join: &mut C) -> Vec<Value> {
        let mut out = Vec::new();
        while let Some(s) = join.try_next().unwrap() {
            out.push(s.object().clone());
        }
        out
    }

    fn codec() -> Arc<ValueCodec> {
        Arc::new(ValueCodec::new())
    }

    #[test]
    fn test_common_object_only() {
        let closes = Rc::new(Cell::new(0));
        let mut join = join_predicates(
            codec(),
            vec![stream("urn:p1", &[1, 3], &closes), stream("urn:p2", &[2, 3], &closes)],
        )
        .unwrap();
        assert_eq!(join.state(), JoinState::Start);
        assert_eq!(objects(&mut join), vec![Value::int(3)]);
        assert_eq!(join.state(), JoinState::Exhausted);

        join.close().unwrap();
        join.close().unwrap();
        assert_eq!(closes.get(), 2);
    }

    #[test]
    fn test_emits_first_input_statement() {
        let closes = Rc::new(Cell::new(0));
        let mut join = join_predicates(
            codec(),
            vec![
                stream("urn:p1", &[-4, 0, 7, 12], &closes),
                stream("urn:p2", &[-4, 7, 9, 12], &closes),
                stream("urn:p3", &[-5, -4, 1, 7, 12], &closes),
            ],
        )
        .unwrap();
        let first = join.try_next().unwrap().unwrap();
        assert_eq!(first.predicate(), &Value::iri("urn:p1"));
        assert_eq!(first.object(), &Value::int(-4));
        assert_eq!(objects(&mut join), vec![Value::int(7), Value::int(12)]);
    }

    #[test]
    fn test_duplicates_pair_positionally() {
        let closes = Rc::new(Cell::new(0));
        let mut join = join_predicates(
            codec(),
            vec![stream("urn:p1", &[3, 3, 3], &closes), stream("urn:p2", &[3, 3], &closes)],
        )
        .unwrap();
        assert_eq!(objects(&mut join), vec![Value::int(3), Value::int(3)]);
    }

    #[test]
    fn test_empty_input() {
        let closes = Rc::new(Cell::new(0));
        let mut join = join_predicates(
            codec(),
            vec![stream("urn:p1", &[1, 2], &closes), stream("urn:p2", &[], &closes)],
        )
        .unwrap();
        assert_eq!(join.try_next().unwrap(), None);
        assert_eq!(join.state(), JoinState::Exhausted);
        assert_eq!(join.try_next().unwrap(), None);
    }

    #[test]
    fn test_arity() {
        let closes = Rc::new(Cell::new(0));
        let err = join_predicates(codec(), vec![stream("urn:p1", &[1], &closes)])
            .err()
            .unwrap();
        assert!(matches!(err, QueryError::InvalidArgument(_)));
        assert_eq!(closes.get(), 1);

        let err = join_predicates::<VecCursor>(codec(), Vec::new()).err().unwrap();
        assert!(matches!(err, QueryError::InvalidArgument(_)));
    }

    #[test]
    fn test_child_error_aborts() {
        let closes = Rc::new(Cell::new(0));
        let mut failing = stream("urn:p2", &[1, 2, 3], &closes);
        failing.fail_at = Some(1);
        let mut join =
            join_predicates(codec(), vec![stream("urn:p1", &[2, 3], &closes), failing]).unwrap();

        let err = join.try_next().unwrap_err();
        assert_eq!(err, QueryError::Core(Error::storage("scan failed")));
        assert_eq!(join.state(), JoinState::Exhausted);
        assert_eq!(join.try_next().unwrap(), None);

        join.close().unwrap();
        assert_eq!(closes.get(), 2);
        assert_eq!(join.try_next().unwrap_err(), QueryError::CursorClosed);
    }

    #[test]
    fn test_match_survives_failing_read_ahead() {
        let closes = Rc::new(Cell::new(0));
        let mut failing = stream("urn:p2", &[1, 2], &closes);
        failing.fail_at = Some(1);
        let mut join =
            join_predicates(codec(), vec![stream("urn:p1", &[1, 2], &closes), failing]).unwrap();

        let first = join.try_next().unwrap().unwrap();
        assert_eq!(first.object(), &Value::int(1));
        assert_eq!(join.state(), JoinState::Checking);

        let err = join.try_next().unwrap_err();
        assert_eq!(err, QueryError::Core(Error::storage("scan failed")));
        assert_eq!(join.state(), JoinState::Exhausted);
        assert_eq!(join.try_next().unwrap(), None);
    }

    #[test]
    fn test_drop_closes_children() {
        let closes = Rc::new(Cell::new(0));
        {
            let mut join = join_predicates(
                codec(),
                vec![stream("urn:p1", &[1], &closes), stream("urn:p2", &[1], &closes)],
            )
            .unwrap();
            join.try_next().unwrap();
        }
        assert_eq!(closes.get(), 2);

        let closes = Rc::new(Cell::new(0));
        {
            let mut join = join_predicates(
                codec(),
                vec![stream("urn:p1", &[1], &closes), stream("urn:p2", &[1], &closes)],
            )
            .unwrap();
            join.close().unwrap();
        }
        assert_eq!(closes.get(), 2);
    }
}
