//! Typed RDF values
//!
//! A [`Value`] is either a resource identifier (IRI or blank node) or a
//! literal with a datatype IRI. Resources carry no datatype; literals always
//! carry one (plain literals are `xsd:string`).
//!
//! ## Ordering
//!
//! `Value` deliberately does not implement `Ord`. Semantic order only exists
//! within one datatype and is defined by the codec's byte encoding
//! (see [`crate::codec::ValueCodec`]).

use std::fmt;
use tristore_vocab::{xsd, xsd_local_name};

/// Resource or literal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    /// IRI or blank node identifier
    Resource,
    /// Literal with a datatype
    Literal,
}

/// Highest resource identifier; used as the open upper bound of subject ranges.
pub const LAST_RESOURCE: &str = "\u{10FFFF}";

/// An immutable typed RDF term
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Value {
    kind: ValueKind,
    data: String,
    datatype: Option<String>,
}

impl Value {
    /// Create a resource value (IRI or blank node)
    pub fn iri(data: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::Resource,
            data: data.into(),
            datatype: None,
        }
    }

    /// Create a plain literal (`xsd:string`)
    pub fn literal(data: impl Into<String>) -> Self {
        Self::typed(data, xsd::STRING)
    }

    /// Create a literal with an explicit datatype IRI
    pub fn typed(data: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            kind: ValueKind::Literal,
            data: data.into(),
            datatype: Some(datatype.into()),
        }
    }

    /// `xsd:int` literal
    pub fn int(v: i32) -> Self {
        Self::typed(v.to_string(), xsd::INT)
    }

    /// `xsd:long` literal
    pub fn long(v: i64) -> Self {
        Self::typed(v.to_string(), xsd::LONG)
    }

    /// `xsd:integer` literal
    pub fn integer(v: i64) -> Self {
        Self::typed(v.to_string(), xsd::INTEGER)
    }

    /// `xsd:double` literal; `-0.0` is written as `0`
    pub fn double(v: f64) -> Self {
        let v = if v == 0.0 { 0.0 } else { v };
        Self::typed(v.to_string(), xsd::DOUBLE)
    }

    /// `xsd:boolean` literal
    pub fn boolean(v: bool) -> Self {
        Self::typed(v.to_string(), xsd::BOOLEAN)
    }

    /// The largest resource identifier, for open-ended resource ranges
    pub fn last_resource() -> Self {
        Self::iri(LAST_RESOURCE)
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Lexical form (the identifier for resources)
    pub fn data(&self) -> &str {
        &self.data
    }

    /// Datatype IRI; `None` for resources
    pub fn datatype(&self) -> Option<&str> {
        self.datatype.as_deref()
    }

    pub fn is_resource(&self) -> bool {
        self.kind == ValueKind::Resource
    }

    pub fn is_literal(&self) -> bool {
        self.kind == ValueKind::Literal
    }

    /// Whether two values live in the same ordering domain (kind and datatype).
    pub fn same_type(&self, other: &Value) -> bool {
        self.kind == other.kind && self.datatype == other.datatype
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (&self.kind, self.datatype.as_deref()) {
            (ValueKind::Resource, _) => write!(f, "<{}>", self.data),
            (ValueKind::Literal, Some(dt)) if dt == xsd::STRING => write!(f, "{:?}", self.data),
            (ValueKind::Literal, Some(dt)) => match xsd_local_name(dt) {
                Some(local) => write!(f, "{:?}^^xsd:{}", self.data, local),
                None => write!(f, "{:?}^^<{}>", self.data, dt),
            },
            (ValueKind::Literal, None) => write!(f, "{:?}", self.data),
        }
    }
}
