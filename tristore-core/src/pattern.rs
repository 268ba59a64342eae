//! Triple access patterns
//!
//! Use the builder methods to construct a pattern. Unset positions are
//! wildcards; the context is either a scalar or unbound.

use crate::codec::ValueCodec;
use crate::error::Result;
use crate::layout::Position;
use crate::range::ValueRange;
use crate::statement::Statement;
use crate::value::Value;
use std::fmt;

/// Binding of one statement position
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Term {
    #[default]
    Unbound,
    Scalar(Value),
    Range(ValueRange),
}

impl Term {
    pub fn is_bound(&self) -> bool {
        !matches!(self, Term::Unbound)
    }

    pub fn is_range(&self) -> bool {
        matches!(self, Term::Range(_))
    }

    pub fn as_scalar(&self) -> Option<&Value> {
        match self {
            Term::Scalar(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_range(&self) -> Option<&ValueRange> {
        match self {
            Term::Range(r) => Some(r),
            _ => None,
        }
    }

    /// Whether `value` at `position` satisfies this term.
    ///
    /// Scalars compare by encoding, so `"007"^^xsd:int` matches `7`.
    pub fn matches(&self, codec: &ValueCodec, position: Position, value: &Value) -> Result<bool> {
        match self {
            Term::Unbound => Ok(true),
            Term::Scalar(v) => {
                if !v.same_type(value) {
                    return Ok(false);
                }
                Ok(codec.encode_at(position, v)? == codec.encode_at(position, value)?)
            }
            Term::Range(r) => r.contains(codec, position, value),
        }
    }
}

impl From<Value> for Term {
    fn from(v: Value) -> Self {
        Term::Scalar(v)
    }
}

impl From<ValueRange> for Term {
    fn from(r: ValueRange) -> Self {
        Term::Range(r)
    }
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Term::Unbound => write!(f, "?"),
            Term::Scalar(v) => write!(f, "{}", v),
            Term::Range(r) => write!(f, "{}", r),
        }
    }
}

/// Borrowed view of the binding at one position, context included
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TermRef<'a> {
    Unbound,
    Scalar(&'a Value),
    Range(&'a ValueRange),
}

impl TermRef<'_> {
    pub fn is_bound(&self) -> bool {
        !matches!(self, TermRef::Unbound)
    }
}

/// Subject/predicate/object terms plus an optional context
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct TriplePattern {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
    pub context: Option<Value>,
}

impl TriplePattern {
    /// Create an empty pattern (matches everything)
    pub fn new() -> Self {
        Self::default()
    }

    /// Match a specific predicate
    pub fn predicate(p: Value) -> Self {
        Self::new().with_predicate(p)
    }

    /// Match a specific predicate and object
    pub fn predicate_object(p: Value, o: Value) -> Self {
        Self::new().with_predicate(p).with_object(o)
    }

    pub fn with_subject(mut self, term: impl Into<Term>) -> Self {
        self.subject = term.into();
        self
    }

    pub fn with_predicate(mut self, term: impl Into<Term>) -> Self {
        self.predicate = term.into();
        self
    }

    pub fn with_object(mut self, term: impl Into<Term>) -> Self {
        self.object = term.into();
        self
    }

    /// Restrict to a named graph; an empty identifier leaves the context unbound
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = (!context.data().is_empty()).then_some(context);
        self
    }

    /// Binding at `position`
    pub fn term(&self, position: Position) -> TermRef<'_> {
        let term = match position {
            Position::Subject => &self.subject,
            Position::Predicate => &self.predicate,
            Position::Object => &self.object,
            Position::Context => {
                return match &self.context {
                    Some(c) => TermRef::Scalar(c),
                    None => TermRef::Unbound,
                }
            }
        };
        match term {
            Term::Unbound => TermRef::Unbound,
            Term::Scalar(v) => TermRef::Scalar(v),
            Term::Range(r) => TermRef::Range(r),
        }
    }

    /// Number of range-valued positions
    pub fn range_count(&self) -> usize {
        [&self.subject, &self.predicate, &self.object]
            .iter()
            .filter(|t| t.is_range())
            .count()
    }

    /// Exact check of a statement against every bound position.
    pub fn matches(&self, codec: &ValueCodec, stmt: &Statement) -> Result<bool> {
        if let Some(c) = &self.context {
            if stmt.context() != Some(c) {
                return Ok(false);
            }
        }
        Ok(self.subject.matches(codec, Position::Subject, stmt.subject())?
            && self.predicate.matches(codec, Position::Predicate, stmt.predicate())?
            && self.object.matches(codec, Position::Object, stmt.object())?)
    }
}

impl fmt::Display for TriplePattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(c) = &self.context {
            write!(f, " {}", c)?;
        }
        write!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stmt(o: Value) -> Statement {
        Statement::new(Value::iri("urn:s"), Value::iri("urn:p"), o)
    }

    #[test]
    fn test_term_view() {
        let p = TriplePattern::predicate(Value::iri("urn:p")).with_context(Value::iri("urn:c"));
        assert_eq!(p.term(Position::Subject), TermRef::Unbound);
        assert_eq!(p.term(Position::Predicate), TermRef::Scalar(&Value::iri("urn:p")));
        assert_eq!(p.term(Position::Context), TermRef::Scalar(&Value::iri("urn:c")));
        assert_eq!(p.range_count(), 0);
    }

    #[test]
    fn test_empty_context_unbound() {
        let p = TriplePattern::new().with_context(Value::iri(""));
        assert!(p.context.is_none());
    }

    #[test]
    fn test_matches_scalar_by_encoding() {
        let codec = ValueCodec::new();
        let p = TriplePattern::predicate_object(Value::iri("urn:p"), Value::typed("007", tristore_vocab::xsd::INT));
        assert!(p.matches(&codec, &stmt(Value::int(7))).unwrap());
        assert!(!p.matches(&codec, &stmt(Value::int(8))).unwrap());
        assert!(!p.matches(&codec, &stmt(Value::long(7))).unwrap());
    }

    #[test]
    fn test_matches_range_and_context() {
        let codec = ValueCodec::new();
        let p = TriplePattern::predicate(Value::iri("urn:p"))
            .with_object(ValueRange::new(Value::int(1), Value::int(5)));
        assert_eq!(p.range_count(), 1);
        assert!(p.matches(&codec, &stmt(Value::int(3))).unwrap());
        assert!(!p.matches(&codec, &stmt(Value::int(6))).unwrap());
        assert!(!p.matches(&codec, &stmt(Value::literal("3"))).unwrap());

        let in_graph = p.clone().with_context(Value::iri("urn:c"));
        assert!(!in_graph.matches(&codec, &stmt(Value::int(3))).unwrap());
        assert!(in_graph
            .matches(&codec, &stmt(Value::int(3)).with_context(Value::iri("urn:c")))
            .unwrap());
    }

    #[test]
    fn test_display() {
        let p = TriplePattern::predicate(Value::iri("urn:p"));
        assert_eq!(p.to_string(), "(? <urn:p> ?)");
    }
}
