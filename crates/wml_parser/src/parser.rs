//! Parser entry points and collaborator seams
//!
//! [`DocumentParser`] owns the parse configuration and the themeable
//! color defaults; the per-context parsing methods live in the sibling
//! modules (`document`, `paragraph`, `run`, `table`, `drawing`,
//! `numbering`, `styles`, `settings`). Relationship resolution is a trait
//! so the packaging collaborator can plug in however it stores the
//! relationship part.

use crate::ColorDefaults;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parse configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParseOptions {
    /// Drop explicit table/cell widths.
    pub ignore_width: bool,
    /// Suppress floating-table positioning; tables flow inline.
    pub ignore_table_wrap: bool,
    /// Suppress floating-drawing positioning; drawings flow inline.
    pub ignore_image_wrap: bool,
    /// Emit diagnostics for unrecognized elements.
    pub debug: bool,
}

/// Whether a relationship target lives inside the package or outside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetMode {
    Internal,
    External,
}

/// A resolved relationship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub target: String,
    pub target_mode: TargetMode,
}

impl Relationship {
    pub fn internal(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            target_mode: TargetMode::Internal,
        }
    }

    pub fn external(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            target_mode: TargetMode::External,
        }
    }
}

/// Resolves relationship ids to targets. Resolution only - fetching the
/// target's content is the caller's job.
pub trait RelationshipResolver {
    fn resolve(&self, id: &str) -> Option<Relationship>;
}

impl RelationshipResolver for HashMap<String, Relationship> {
    fn resolve(&self, id: &str) -> Option<Relationship> {
        self.get(id).cloned()
    }
}

/// Resolver for documents parsed without their relationship part; every
/// reference degrades locally.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRelationships;

impl RelationshipResolver for NoRelationships {
    fn resolve(&self, _id: &str) -> Option<Relationship> {
        None
    }
}

/// The parser. One instance parses any number of documents; it holds no
/// per-document state.
#[derive(Debug, Clone, Default)]
pub struct DocumentParser {
    pub options: ParseOptions,
    pub defaults: ColorDefaults,
}

impl DocumentParser {
    pub fn new(options: ParseOptions) -> Self {
        Self {
            options,
            defaults: ColorDefaults::default(),
        }
    }

    pub fn with_defaults(options: ParseOptions, defaults: ColorDefaults) -> Self {
        Self { options, defaults }
    }

    /// Diagnostic for an element the dispatch tables do not know.
    /// Informational only - unrecognized content never aborts a parse.
    pub(crate) fn unknown(&self, context: &str, name: &str) {
        if self.options.debug {
            tracing::debug!(context, element = name, "unrecognized element");
        }
    }
}
