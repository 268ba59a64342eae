//! Value ranges over a single statement position
//!
//! A [`ValueRange`] is `{start, stop}` plus inclusivity flags. Ranges are
//! constructed inclusive on both ends; [`ValueRange::canonicalize`] orders the
//! endpoints by their encoded bytes, and [`ValueRange::encode`] produces the
//! byte endpoints consumed by [`crate::key::range_bounds`].

use crate::codec::ValueCodec;
use crate::error::{Error, Result};
use crate::key::EncodedRange;
use crate::layout::Position;
use crate::value::Value;
use std::fmt;

/// Range of values of one kind and datatype
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ValueRange {
    start: Value,
    stop: Value,
    start_inclusive: bool,
    stop_inclusive: bool,
}

impl ValueRange {
    /// Inclusive range `[start, stop]`
    pub fn new(start: Value, stop: Value) -> Self {
        Self {
            start,
            stop,
            start_inclusive: true,
            stop_inclusive: true,
        }
    }

    /// Resources from `start` up to [`crate::value::LAST_RESOURCE`]
    pub fn resources_from(start: Value) -> Self {
        Self::new(start, Value::last_resource())
    }

    /// Exclude the start value
    pub fn exclusive_start(mut self) -> Self {
        self.start_inclusive = false;
        self
    }

    /// Exclude the stop value
    pub fn exclusive_stop(mut self) -> Self {
        self.stop_inclusive = false;
        self
    }

    pub fn start(&self) -> &Value {
        &self.start
    }

    pub fn stop(&self) -> &Value {
        &self.stop
    }

    pub fn start_inclusive(&self) -> bool {
        self.start_inclusive
    }

    pub fn stop_inclusive(&self) -> bool {
        self.stop_inclusive
    }

    /// Degenerate range whose endpoints are the same value
    pub fn is_point(&self) -> bool {
        self.start == self.stop
    }

    /// Check endpoint types and order endpoints by encoded bytes.
    ///
    /// Swapping also swaps the inclusivity flags. Applying this to an already
    /// canonical range returns an equal range.
    pub fn canonicalize(&self, codec: &ValueCodec) -> Result<ValueRange> {
        if !self.start.same_type(&self.stop) {
            return Err(Error::invalid_range(format!(
                "endpoints differ in type: {} and {}",
                self.start, self.stop
            )));
        }
        let start = codec.encode(&self.start)?;
        let stop = codec.encode(&self.stop)?;
        if start > stop {
            return Ok(ValueRange {
                start: self.stop.clone(),
                stop: self.start.clone(),
                start_inclusive: self.stop_inclusive,
                stop_inclusive: self.start_inclusive,
            });
        }
        Ok(self.clone())
    }

    /// Canonicalize, then encode both endpoints for `position`.
    pub fn encode(&self, codec: &ValueCodec, position: Position) -> Result<EncodedRange> {
        let canonical = self.canonicalize(codec)?;
        Ok(EncodedRange {
            start: codec.encode_at(position, &canonical.start)?,
            stop: codec.encode_at(position, &canonical.stop)?,
            start_inclusive: canonical.start_inclusive,
            stop_inclusive: canonical.stop_inclusive,
        })
    }

    /// Whether `value`, found at `position`, lies inside the range.
    ///
    /// Values of a different kind or datatype never match.
    pub fn contains(&self, codec: &ValueCodec, position: Position, value: &Value) -> Result<bool> {
        if !value.same_type(&self.start) {
            return Ok(false);
        }
        let bounds = self.encode(codec, position)?;
        let v = codec.encode_at(position, value)?;
        let above = if bounds.start_inclusive {
            v >= bounds.start
        } else {
            v > bounds.start
        };
        let below = if bounds.stop_inclusive {
            v <= bounds.stop
        } else {
            v < bounds.stop
        };
        Ok(above && below)
    }
}

impl fmt::Display for ValueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let open = if self.start_inclusive { '[' } else { '(' };
        let close = if self.stop_inclusive { ']' } else { ')' };
        write!(f, "{}{}, {}{}", open, self.start, self.stop, close)
    }
}
