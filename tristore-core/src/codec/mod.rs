//! Order-preserving value codec
//!
//! Converts [`Value`]s to byte strings whose byte order matches the semantic
//! order of the value's datatype, and back.
//!
//! ## Encoded forms
//!
//! | Position | Bytes |
//! |----------|-------|
//! | subject, predicate, context | raw UTF-8 identifier |
//! | object | `data ++ TYPE_DELIM ++ marker` |
//!
//! `data` comes from the datatype's [`TypeResolver`]; `marker` identifies the
//! resolver on decode. Data containing the row delimiter (`0x00`) or the type
//! delimiter (`0x01`) is rejected: either byte would sort a value ahead of its
//! own prefix and break both row splitting and range order.
//!
//! The codec is an ordinary value: build one with [`ValueCodec::new`] (standard
//! datatypes) or [`ValueCodec::builder`] and pass it by reference.

pub mod lexicode;
pub mod resolver;

pub use resolver::TypeResolver;

use crate::error::{Error, Result};
use crate::key::{DELIM, MAX_SENTINEL, TYPE_DELIM};
use crate::layout::Position;
use crate::value::Value;
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Immutable registry of type resolvers
pub struct ValueCodec {
    resolvers: Vec<Box<dyn TypeResolver>>,
    by_datatype: HashMap<&'static str, usize>,
    by_marker: HashMap<u8, usize>,
    resource: usize,
}

impl ValueCodec {
    /// Codec with the standard resolvers (resource, string, numerics, temporals, boolean)
    pub fn new() -> Self {
        Self::index(resolver::standard_resolvers())
    }

    /// Start from the standard resolvers and add or replace some
    pub fn builder() -> ValueCodecBuilder {
        ValueCodecBuilder {
            resolvers: resolver::standard_resolvers(),
        }
    }

    /// Check marker and datatype uniqueness and the presence of a resource resolver.
    fn validate(resolvers: &[Box<dyn TypeResolver>]) -> Result<()> {
        let mut markers = HashSet::new();
        let mut datatypes = HashSet::new();
        let mut resources = 0usize;

        for r in resolvers {
            let marker = r.marker();
            if marker == DELIM || marker == TYPE_DELIM || marker == MAX_SENTINEL {
                return Err(Error::invalid_argument(format!(
                    "marker {:#04x} collides with a reserved key byte",
                    marker
                )));
            }
            if !markers.insert(marker) {
                return Err(Error::invalid_argument(format!(
                    "duplicate marker {:#04x}",
                    marker
                )));
            }
            match r.datatype() {
                Some(dt) => {
                    if !datatypes.insert(dt) {
                        return Err(Error::invalid_argument(format!(
                            "duplicate resolver for {}",
                            dt
                        )));
                    }
                }
                None => resources += 1,
            }
        }

        match resources {
            1 => Ok(()),
            0 => Err(Error::invalid_argument("no resource resolver registered")),
            _ => Err(Error::invalid_argument("duplicate resource resolver")),
        }
    }

    /// Build the lookup tables. `resolvers` must already be valid.
    fn index(resolvers: Vec<Box<dyn TypeResolver>>) -> Self {
        let mut by_datatype = HashMap::new();
        let mut by_marker = HashMap::new();
        let mut resource = 0;
        for (idx, r) in resolvers.iter().enumerate() {
            by_marker.insert(r.marker(), idx);
            match r.datatype() {
                Some(dt) => {
                    by_datatype.insert(dt, idx);
                }
                None => resource = idx,
            }
        }
        Self {
            resolvers,
            by_datatype,
            by_marker,
            resource,
        }
    }

    /// Whether a datatype IRI can be encoded
    pub fn supports(&self, datatype: &str) -> bool {
        self.by_datatype.contains_key(datatype)
    }

    fn resolver_for(&self, value: &Value) -> Result<&dyn TypeResolver> {
        let idx = match value.datatype() {
            None => self.resource,
            Some(dt) => *self
                .by_datatype
                .get(dt)
                .ok_or_else(|| Error::unsupported_type(dt))?,
        };
        Ok(self.resolvers[idx].as_ref())
    }

    /// Typed serialization: `data ++ TYPE_DELIM ++ marker`.
    ///
    /// This is the object-position encoding and the join key for objects.
    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        let resolver = self.resolver_for(value)?;
        let mut out = resolver.serialize_data(value.data())?;
        check_delimiter(&out, value)?;
        out.reserve(2);
        out.push(TYPE_DELIM);
        out.push(resolver.marker());
        Ok(out)
    }

    /// Positional encoding used in row keys.
    ///
    /// Subject, predicate and context must be resources and are written as
    /// raw identifier bytes; the object uses [`encode`](Self::encode).
    pub fn encode_at(&self, position: Position, value: &Value) -> Result<Vec<u8>> {
        if position == Position::Object {
            return self.encode(value);
        }
        if !value.is_resource() {
            return Err(Error::invalid_value(format!(
                "{} must be a resource, got {}",
                position, value
            )));
        }
        let out = self.resolvers[self.resource].serialize_data(value.data())?;
        check_delimiter(&out, value)?;
        Ok(out)
    }

    /// Inverse of [`encode_at`](Self::encode_at).
    pub fn decode(&self, position: Position, bytes: &[u8]) -> Result<Value> {
        if position == Position::Object {
            return self.decode_typed(bytes);
        }
        let data = self.resolvers[self.resource].deserialize_data(bytes)?;
        Ok(Value::iri(data))
    }

    fn decode_typed(&self, bytes: &[u8]) -> Result<Value> {
        let len = bytes.len();
        if len < 2 || bytes[len - 2] != TYPE_DELIM {
            return Err(Error::decode(format!(
                "missing type suffix in {:?}",
                String::from_utf8_lossy(bytes)
            )));
        }
        let marker = bytes[len - 1];
        let idx = *self
            .by_marker
            .get(&marker)
            .ok_or_else(|| Error::unsupported_type(format!("marker {:#04x}", marker)))?;
        let resolver = self.resolvers[idx].as_ref();
        let data = resolver.deserialize_data(&bytes[..len - 2])?;
        Ok(match resolver.datatype() {
            None => Value::iri(data),
            Some(dt) => Value::typed(data, dt),
        })
    }
}

impl Default for ValueCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ValueCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut datatypes: Vec<&str> = self.by_datatype.keys().copied().collect();
        datatypes.sort_unstable();
        f.debug_struct("ValueCodec")
            .field("datatypes", &datatypes)
            .finish()
    }
}

fn check_delimiter(data: &[u8], value: &Value) -> Result<()> {
    if let Some(b) = data.iter().find(|b| **b == DELIM || **b == TYPE_DELIM) {
        return Err(Error::invalid_value(format!(
            "{} contains the reserved key byte {:#04x}",
            value, b
        )));
    }
    Ok(())
}

/// Builder for a [`ValueCodec`] with custom resolvers
pub struct ValueCodecBuilder {
    resolvers: Vec<Box<dyn TypeResolver>>,
}

impl ValueCodecBuilder {
    /// Register a resolver, replacing any existing one for the same datatype
    pub fn with_resolver(mut self, resolver: Box<dyn TypeResolver>) -> Self {
        let dt = resolver.datatype();
        self.resolvers.retain(|r| r.datatype() != dt);
        self.resolvers.push(resolver);
        self
    }

    /// Validate markers and datatypes and build the codec
    pub fn build(self) -> Result<ValueCodec> {
        ValueCodec::validate(&self.resolvers)?;
        Ok(ValueCodec::index(self.resolvers))
    }
}
