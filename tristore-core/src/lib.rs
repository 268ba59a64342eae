//! # tristore core
//!
//! Index encoding and range planning for a triple store layered on a sorted
//! column-family key-value store.
//!
//! This crate provides:
//! - Core types: `Value`, `Statement`, `ValueRange`, `TriplePattern`
//! - The order-preserving value codec
//! - Physical layouts (SPO, POS, OSP and the context-qualified variants)
//! - Per-layout scan planning and the layout registry
//! - The storage seam (`Cursor`, `RowScanner`) and an in-memory store
//!
//! ## Design Principles
//!
//! 1. **Byte order is semantic order**: every encoded value sorts like its datatype
//! 2. **No global state**: the codec is a value passed by reference
//! 3. **One range per pattern**: each plannable pattern maps to one `[start, stop)` scan
//!
//! ## Example
//!
//! ```
//! use tristore_core::{LayoutRegistry, TriplePattern, Value, ValueCodec};
//!
//! let codec = ValueCodec::new();
//! let registry = LayoutRegistry::default();
//! let pattern = TriplePattern::predicate(Value::iri("urn:p"));
//!
//! let layout = registry.applicable_layouts(&pattern).unwrap()[0];
//! let range = registry.strategy(layout).unwrap().plan(&codec, &pattern).unwrap();
//! assert_eq!(range.start, b"urn:p\x00".to_vec());
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod key;
pub mod layout;
pub mod pattern;
pub mod range;
pub mod registry;
pub mod row;
pub mod statement;
pub mod store;
pub mod strategy;
pub mod value;

// Re-export main types
pub use codec::{TypeResolver, ValueCodec, ValueCodecBuilder};
pub use config::IndexConfig;
pub use error::{Error, Result};
pub use key::{ByteRange, DELIM, MAX_SENTINEL, TYPE_DELIM};
pub use layout::{Layout, Position};
pub use pattern::{Term, TermRef, TriplePattern};
pub use range::ValueRange;
pub use registry::LayoutRegistry;
pub use row::{TripleRow, TripleRowResolver};
pub use statement::Statement;
pub use store::{Cursor, MemoryCursor, MemoryStore, RowScanner};
pub use strategy::{LayoutStrategy, ScanRequest};
pub use value::{Value, ValueKind, LAST_RESOURCE};
