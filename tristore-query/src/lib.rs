//! # tristore query
//!
//! Pattern queries and sort-merge joins over the layouts of `tristore-core`.
//!
//! - [`QueryEngine`]: plans a pattern against the first applicable layout and
//!   returns a lazy [`StatementStream`]
//! - [`PeekableCursor`]: one-item lookahead over any cursor
//! - [`MergeJoin`] / [`join_predicates`]: streaming joins of sorted inputs
//!
//! Every result is a [`Cursor`](tristore_core::Cursor): pull with `try_next`,
//! release with `close`.

pub mod engine;
pub mod error;
pub mod merge_join;
pub mod peek;

pub use engine::{QueryEngine, StatementStream};
pub use error::{QueryError, Result};
pub use merge_join::{join_predicates, JoinState, MergeJoin, PredicateJoin, ResourceJoin};
pub use peek::PeekableCursor;
