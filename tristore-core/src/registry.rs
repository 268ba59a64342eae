//! Registered layout strategies
//!
//! The registry owns one [`LayoutStrategy`] per enabled layout and answers
//! which of them can serve a pattern. It does not rank them.

use crate::config::IndexConfig;
use crate::error::{Error, Result};
use crate::layout::Layout;
use crate::pattern::TriplePattern;
use crate::strategy::LayoutStrategy;

#[derive(Debug, Clone)]
pub struct LayoutRegistry {
    strategies: Vec<LayoutStrategy>,
}

impl LayoutRegistry {
    /// Registry over `layouts`, in the given order. Duplicates are dropped.
    pub fn new(layouts: &[Layout]) -> Self {
        let mut strategies: Vec<LayoutStrategy> = Vec::with_capacity(layouts.len());
        for layout in layouts {
            if !strategies.iter().any(|s| s.layout() == *layout) {
                strategies.push(LayoutStrategy::new(*layout));
            }
        }
        Self { strategies }
    }

    /// Registry over the configured layouts, planning for hashed rows if enabled
    pub fn from_config(config: &IndexConfig) -> Self {
        let mut registry = Self::new(&config.layouts());
        for strategy in &mut registry.strategies {
            *strategy = strategy.with_hashed_rows(config.hashed_rows);
        }
        registry
    }

    pub fn layouts(&self) -> impl Iterator<Item = Layout> + '_ {
        self.strategies.iter().map(LayoutStrategy::layout)
    }

    /// Strategy for `layout`, if registered
    pub fn strategy(&self, layout: Layout) -> Option<&LayoutStrategy> {
        self.strategies.iter().find(|s| s.layout() == layout)
    }

    /// Layouts able to answer `pattern`, in registration order
    pub fn applicable_layouts(&self, pattern: &TriplePattern) -> Result<Vec<Layout>> {
        let layouts: Vec<Layout> = self
            .strategies
            .iter()
            .filter(|s| s.handles(pattern))
            .map(LayoutStrategy::layout)
            .collect();
        if layouts.is_empty() {
            tracing::debug!(%pattern, "no layout handles pattern");
            return Err(Error::no_applicable_layout(pattern.to_string()));
        }
        Ok(layouts)
    }
}

impl Default for LayoutRegistry {
    fn default() -> Self {
        Self::from_config(&IndexConfig::default())
    }
}
