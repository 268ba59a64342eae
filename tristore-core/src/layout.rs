//! Physical index layouts
//!
//! Each layout is one sort order of the statement fields inside the row key:
//!
//! | Layout | Row key order | Use Case |
//! |--------|---------------|----------|
//! | SPO | s, p, o | Subject lookups |
//! | POS | p, o, s | Predicate and value lookups |
//! | OSP | o, s, p | Reverse lookups by object |
//! | CSPO | c, s, p, o | SPO within one named graph |
//! | CPOS | c, p, o, s | POS within one named graph |
//! | COSP | c, o, s, p | OSP within one named graph |
//!
//! The non-context layouts store the context in the column family instead of
//! the row key.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A statement field
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Position {
    Subject,
    Predicate,
    Object,
    Context,
}

impl Position {
    pub fn name(&self) -> &'static str {
        match self {
            Position::Subject => "subject",
            Position::Predicate => "predicate",
            Position::Object => "object",
            Position::Context => "context",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Layout enumeration
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    /// Subject-Predicate-Object
    Spo,
    /// Predicate-Object-Subject
    Pos,
    /// Object-Subject-Predicate
    Osp,
    /// Context-Subject-Predicate-Object
    Cspo,
    /// Context-Predicate-Object-Subject
    Cpos,
    /// Context-Object-Subject-Predicate
    Cosp,
}

use Position::{Context as C, Object as O, Predicate as P, Subject as S};

impl Layout {
    /// Get all layouts
    pub fn all() -> &'static [Layout] {
        &[
            Layout::Spo,
            Layout::Pos,
            Layout::Osp,
            Layout::Cspo,
            Layout::Cpos,
            Layout::Cosp,
        ]
    }

    /// Layouts written for every statement
    pub fn standard() -> &'static [Layout] {
        &[Layout::Spo, Layout::Pos, Layout::Osp]
    }

    /// Layouts keyed by context first
    pub fn context_qualified() -> &'static [Layout] {
        &[Layout::Cspo, Layout::Cpos, Layout::Cosp]
    }

    /// Row-key field order
    pub fn fields(&self) -> &'static [Position] {
        match self {
            Layout::Spo => &[S, P, O],
            Layout::Pos => &[P, O, S],
            Layout::Osp => &[O, S, P],
            Layout::Cspo => &[C, S, P, O],
            Layout::Cpos => &[C, P, O, S],
            Layout::Cosp => &[C, O, S, P],
        }
    }

    /// First field of the row key
    pub fn anchor(&self) -> Position {
        self.fields()[0]
    }

    pub fn is_context_qualified(&self) -> bool {
        self.anchor() == Position::Context
    }

    /// Get the short name of this layout
    pub fn name(&self) -> &'static str {
        match self {
            Layout::Spo => "spo",
            Layout::Pos => "pos",
            Layout::Osp => "osp",
            Layout::Cspo => "cspo",
            Layout::Cpos => "cpos",
            Layout::Cosp => "cosp",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl std::str::FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "spo" => Ok(Layout::Spo),
            "pos" => Ok(Layout::Pos),
            "osp" => Ok(Layout::Osp),
            "cspo" => Ok(Layout::Cspo),
            "cpos" => Ok(Layout::Cpos),
            "cosp" => Ok(Layout::Cosp),
            _ => Err(format!("Unknown layout: {}", s)),
        }
    }
}
