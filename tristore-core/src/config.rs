//! Index configuration

use crate::layout::Layout;
use serde::{Deserialize, Serialize};

/// Default prefix for layout table names
pub const DEFAULT_TABLE_PREFIX: &str = "tristore_";

/// Configuration for the index layouts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Prefix prepended to each layout's table name
    ///
    /// Default: `"tristore_"`
    pub table_prefix: String,

    /// Also write and plan against the context-qualified layouts (CSPO, CPOS, COSP).
    ///
    /// Doubles the rows written for statements in named graphs.
    /// Default: false
    pub context_layouts: bool,

    /// Prefix every row with the hex SHA-256 of its anchor field.
    ///
    /// Spreads hot anchors across tablets; anchor ranges become unplannable.
    /// Default: false
    pub hashed_rows: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            table_prefix: DEFAULT_TABLE_PREFIX.to_string(),
            context_layouts: false,
            hashed_rows: false,
        }
    }
}

impl IndexConfig {
    pub fn new(table_prefix: impl Into<String>) -> Self {
        Self {
            table_prefix: table_prefix.into(),
            ..Default::default()
        }
    }

    /// Builder method to enable context-qualified layouts
    pub fn with_context_layouts(mut self, enabled: bool) -> Self {
        self.context_layouts = enabled;
        self
    }

    /// Builder method to enable hashed row prefixes
    pub fn with_hashed_rows(mut self, enabled: bool) -> Self {
        self.hashed_rows = enabled;
        self
    }

    /// Enabled layouts, standard ones first
    pub fn layouts(&self) -> Vec<Layout> {
        let mut layouts = Layout::standard().to_vec();
        if self.context_layouts {
            layouts.extend_from_slice(Layout::context_qualified());
        }
        layouts
    }

    /// Table holding `layout`'s rows
    pub fn table_name(&self, layout: Layout) -> String {
        format!("{}{}", self.table_prefix, layout.name())
    }
}
