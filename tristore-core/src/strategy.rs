//! Per-layout scan planning
//!
//! A [`LayoutStrategy`] decides whether a [`TriplePattern`] can be answered
//! by one contiguous scan of its layout, and computes that scan's
//! [`ByteRange`].
//!
//! ## Applicability
//!
//! Walking the layout's field order, the bound fields must form a non-empty
//! prefix; at most one of them may be a range and it must be the last bound
//! field. Context-qualified layouts need the context bound (it is their
//! anchor). The other layouts never key on the context and apply it as a
//! column-family filter instead.
//!
//! Bound values must also have a plannable shape: subject, predicate and
//! context terms are resources, and both ends of a range share a type.
//! Applicability does not consult the codec, so `plan` can still fail for a
//! datatype the codec does not support or a lexical form it cannot parse.
//!
//! ## Bounds
//!
//! | Shape | start | stop |
//! |-------|-------|------|
//! | scalar prefix | `f1 00 .. fk 00` | `start FF` |
//! | all fields bound | `f1 00 .. fn` | `start 00 FF` |
//! | prefix + range | `f1 00 .. fk 00 lo` | `f1 00 .. fk 00 hi 00 FF` |
//! | anchor range | `lo` | `hi 00 FF` |
//!
//! With hashed rows every key starts with `row_hash(f1) 00`, so the anchor
//! must be a scalar and the bounds above are built behind that prefix.

use crate::codec::ValueCodec;
use crate::error::{Error, Result};
use crate::key::{self, ByteRange};
use crate::layout::{Layout, Position};
use crate::pattern::{TermRef, TriplePattern};

/// Everything the store needs to run one scan
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScanRequest {
    pub layout: Layout,
    pub range: ByteRange,
    /// Exact column family to keep; `None` keeps every family
    pub column_family: Option<Vec<u8>>,
}

/// Scan planner for one layout
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LayoutStrategy {
    layout: Layout,
    hashed_rows: bool,
}

impl LayoutStrategy {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            hashed_rows: false,
        }
    }

    /// Plan against rows prefixed with the hash of their anchor field
    pub fn with_hashed_rows(mut self, enabled: bool) -> Self {
        self.hashed_rows = enabled;
        self
    }

    pub fn layout(&self) -> Layout {
        self.layout
    }

    pub fn hashed_rows(&self) -> bool {
        self.hashed_rows
    }

    /// Whether [`plan`](Self::plan) succeeds for `pattern`, codec errors aside
    /// (unsupported datatype, unparseable lexical form, reserved key bytes)
    pub fn handles(&self, pattern: &TriplePattern) -> bool {
        self.bound_prefix(pattern).is_ok()
    }

    /// Number of leading bound fields, or why the pattern is not answerable.
    fn bound_prefix(&self, pattern: &TriplePattern) -> std::result::Result<usize, String> {
        let mut bound = 0;
        let mut gap: Option<Position> = None;
        let mut range: Option<Position> = None;

        for position in self.layout.fields() {
            match pattern.term(*position) {
                TermRef::Unbound => {
                    if bound == 0 {
                        return Err(format!("leading field {} is unbound", position));
                    }
                    gap.get_or_insert(*position);
                }
                term => {
                    check_shape(*position, term)?;
                    if let Some(g) = gap {
                        return Err(format!("{} is bound after unbound {}", position, g));
                    }
                    if let Some(r) = range {
                        return Err(format!("{} is bound after range field {}", position, r));
                    }
                    if let TermRef::Range(_) = term {
                        if bound == 0 && self.hashed_rows {
                            return Err(format!("anchor {} range cannot span hashed rows", position));
                        }
                        range = Some(*position);
                    }
                    bound += 1;
                }
            }
        }
        Ok(bound)
    }

    /// Byte range covering every row matching `pattern`.
    ///
    /// Fails with `UnsupportedPattern` exactly when [`handles`](Self::handles)
    /// is false; codec failures surface as the codec's own errors.
    pub fn plan(&self, codec: &ValueCodec, pattern: &TriplePattern) -> Result<ByteRange> {
        let bound = self
            .bound_prefix(pattern)
            .map_err(|reason| Error::unsupported_pattern(self.layout.name(), reason))?;
        let fields = self.layout.fields();

        let mut prefix: Vec<Vec<u8>> = Vec::with_capacity(bound + 1);
        for position in &fields[..bound] {
            match pattern.term(*position) {
                TermRef::Scalar(v) => {
                    let field = codec.encode_at(*position, v)?;
                    if prefix.is_empty() && self.hashed_rows {
                        prefix.push(key::row_hash(&field));
                    }
                    prefix.push(field);
                }
                TermRef::Range(r) => {
                    let encoded = r.encode(codec, *position)?;
                    let range = key::range_bounds(prefix.as_slice(), &encoded, &[]);
                    tracing::trace!(layout = %self.layout, %pattern, ?range, "planned range scan");
                    return Ok(range);
                }
                TermRef::Unbound => break,
            }
        }

        let complete = bound == fields.len();
        let range = key::prefix_bounds(prefix.as_slice(), complete);
        tracing::trace!(layout = %self.layout, %pattern, ?range, "planned prefix scan");
        Ok(range)
    }

    /// [`plan`](Self::plan) plus the layout and column-family filter
    pub fn scan_request(&self, codec: &ValueCodec, pattern: &TriplePattern) -> Result<ScanRequest> {
        let range = self.plan(codec, pattern)?;
        let column_family = match (&pattern.context, self.layout.is_context_qualified()) {
            (Some(c), false) => Some(codec.encode_at(Position::Context, c)?),
            _ => None,
        };
        Ok(ScanRequest {
            layout: self.layout,
            range,
            column_family,
        })
    }
}

/// Values `plan` could never encode at `position`, independent of the codec.
fn check_shape(position: Position, term: TermRef<'_>) -> std::result::Result<(), String> {
    let must_be_resource = position != Position::Object;
    match term {
        TermRef::Scalar(v) if must_be_resource && !v.is_resource() => {
            Err(format!("{} must be a resource, got {}", position, v))
        }
        TermRef::Range(r) if !r.start().same_type(r.stop()) => {
            Err(format!("{} range mixes types: {}", position, r))
        }
        TermRef::Range(r) if must_be_resource && !r.start().is_resource() => {
            Err(format!("{} range must span resources: {}", position, r))
        }
        _ => Ok(()),
    }
}
