//! Statement - the fundamental data unit
//!
//! A statement is a single triple with an optional named graph and the
//! storage metadata carried alongside it:
//! - subject: resource
//! - predicate: resource
//! - object: any typed value
//! - context: named graph (`None` is the default graph)
//! - visibility: opaque column-visibility expression
//! - timestamp: row timestamp assigned by the store

use crate::value::Value;
use std::fmt;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Statement {
    subject: Value,
    predicate: Value,
    object: Value,
    context: Option<Value>,
    visibility: Option<Vec<u8>>,
    timestamp: Option<u64>,
}

impl Statement {
    /// Statement in the default graph with no metadata
    pub fn new(subject: Value, predicate: Value, object: Value) -> Self {
        Self {
            subject,
            predicate,
            object,
            context: None,
            visibility: None,
            timestamp: None,
        }
    }

    /// Place the statement in a named graph.
    ///
    /// An empty identifier is the default graph, since the row format cannot
    /// tell the two apart.
    pub fn with_context(mut self, context: Value) -> Self {
        self.context = (!context.data().is_empty()).then_some(context);
        self
    }

    /// Set or clear the context
    pub fn with_context_opt(self, context: Option<Value>) -> Self {
        match context {
            Some(c) => self.with_context(c),
            None => Self {
                context: None,
                ..self
            },
        }
    }

    /// Attach a visibility expression; empty means none
    pub fn with_visibility(mut self, visibility: impl Into<Vec<u8>>) -> Self {
        let v = visibility.into();
        self.visibility = (!v.is_empty()).then_some(v);
        self
    }

    pub fn with_timestamp(mut self, timestamp: u64) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn subject(&self) -> &Value {
        &self.subject
    }

    pub fn predicate(&self) -> &Value {
        &self.predicate
    }

    pub fn object(&self) -> &Value {
        &self.object
    }

    pub fn context(&self) -> Option<&Value> {
        self.context.as_ref()
    }

    pub fn visibility(&self) -> Option<&[u8]> {
        self.visibility.as_deref()
    }

    pub fn timestamp(&self) -> Option<u64> {
        self.timestamp
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.subject, self.predicate, self.object)?;
        if let Some(c) = &self.context {
            write!(f, " {}", c)?;
        }
        Ok(())
    }
}
