//! Style catalog and cascade resolution
//!
//! Styles arrive from the parser as partial definitions: CSS-like rulesets
//! for the renderer plus small typed property bags for the fields this
//! engine consumes itself (page-break-before, numbering bindings, keep
//! rules). [`StyleCatalog::resolve_inheritance`] follows each `based_on`
//! chain to its root and merges ancestors under the child, child winning
//! per key.

use crate::{Declarations, NumberingRef};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// =============================================================================
// Style target
// =============================================================================

/// What a style definition applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StyleTarget {
    Paragraph,
    Character,
    Table,
    Numbering,
}

impl StyleTarget {
    /// Parse the `type` attribute of a style definition.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "paragraph" => Some(StyleTarget::Paragraph),
            "character" => Some(StyleTarget::Character),
            "table" => Some(StyleTarget::Table),
            "numbering" => Some(StyleTarget::Numbering),
            _ => None,
        }
    }
}

// =============================================================================
// Rulesets
// =============================================================================

/// One selector + declarations block of a style definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ruleset {
    /// Target selector tag (`"p"`, `"r"`, `"table"`, `"td"`, …).
    pub target: String,
    /// Conditional modifier for table-style blocks (`"first-row"`, …).
    pub modifier: Option<String>,
    pub declarations: Declarations,
}

impl Ruleset {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
            modifier: None,
            declarations: Declarations::new(),
        }
    }

    pub fn with_modifier(mut self, modifier: impl Into<String>) -> Self {
        self.modifier = Some(modifier.into());
        self
    }
}

// =============================================================================
// Typed partial property bags
// =============================================================================

/// Engine-facing paragraph fields. Every field is optional; `merge` lets
/// the overriding side win only for fields it actually sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParagraphProperties {
    /// Paragraph always starts a new page.
    pub page_break_before: Option<bool>,
    /// Keep all lines of the paragraph on one page.
    pub keep_lines: Option<bool>,
    /// Keep this paragraph with the next one.
    pub keep_next: Option<bool>,
    /// Outline level (1-9 heading levels).
    pub outline_level: Option<u8>,
    /// Numbering binding.
    pub numbering: Option<NumberingRef>,
}

impl ParagraphProperties {
    /// Merge `other` on top of this bag; `other` wins per field it sets.
    pub fn merge(&self, other: &ParagraphProperties) -> ParagraphProperties {
        ParagraphProperties {
            page_break_before: other.page_break_before.or(self.page_break_before),
            keep_lines: other.keep_lines.or(self.keep_lines),
            keep_next: other.keep_next.or(self.keep_next),
            outline_level: other.outline_level.or(self.outline_level),
            numbering: other.numbering.clone().or_else(|| self.numbering.clone()),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.page_break_before.is_none()
            && self.keep_lines.is_none()
            && self.keep_next.is_none()
            && self.outline_level.is_none()
            && self.numbering.is_none()
    }
}

/// Vertical position of run text relative to the baseline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunVerticalAlign {
    Baseline,
    Superscript,
    Subscript,
}

/// Engine-facing run fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunProperties {
    pub vertical_align: Option<RunVerticalAlign>,
    /// Hidden text (`vanish`).
    pub hidden: Option<bool>,
}

impl RunProperties {
    /// Merge `other` on top of this bag; `other` wins per field it sets.
    pub fn merge(&self, other: &RunProperties) -> RunProperties {
        RunProperties {
            vertical_align: other.vertical_align.or(self.vertical_align),
            hidden: other.hidden.or(self.hidden),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.vertical_align.is_none() && self.hidden.is_none()
    }
}

// =============================================================================
// Style definition
// =============================================================================

/// A style as parsed from the style part, before or after resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleDefinition {
    pub id: String,
    pub name: Option<String>,
    pub target: Option<StyleTarget>,
    /// Inheritance parent.
    pub based_on: Option<String>,
    /// Companion style of the opposite target kind (paragraph style's
    /// character counterpart and vice versa). Never merged into this
    /// definition; appended at lookup time by `render_rulesets`.
    pub linked: Option<String>,
    pub rulesets: Vec<Ruleset>,
    /// Resolved engine-facing paragraph bag.
    pub paragraph: ParagraphProperties,
    /// Resolved engine-facing run bag.
    pub run: RunProperties,
    pub is_default: bool,
    pub hidden: bool,
    pub semi_hidden: bool,
    pub custom: bool,
}

impl StyleDefinition {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Look up the declarations of a ruleset by selector.
    pub fn ruleset(&self, target: &str) -> Option<&Ruleset> {
        self.rulesets
            .iter()
            .find(|r| r.target == target && r.modifier.is_none())
    }
}

// =============================================================================
// Style catalog
// =============================================================================

/// All style definitions of one document, keyed by id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleCatalog {
    styles: Vec<StyleDefinition>,
    by_id: HashMap<String, usize>,
}

impl StyleCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a definition, replacing any previous one with the same id.
    pub fn insert(&mut self, style: StyleDefinition) {
        match self.by_id.get(&style.id) {
            Some(&i) => self.styles[i] = style,
            None => {
                self.by_id.insert(style.id.clone(), self.styles.len());
                self.styles.push(style);
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&StyleDefinition> {
        self.by_id.get(id).map(|&i| &self.styles[i])
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &StyleDefinition> {
        self.styles.iter()
    }

    /// The default style for a target kind, if the document declares one.
    pub fn default_for(&self, target: StyleTarget) -> Option<&StyleDefinition> {
        self.styles
            .iter()
            .find(|s| s.is_default && s.target == Some(target))
    }

    /// Resolve every style's effective declarations by folding its
    /// `based_on` chain, base first, child last. A missing ancestor
    /// degrades to "no base style"; a cycle terminates at the repeated id.
    /// Runs once after parsing; definitions are read-only afterwards.
    pub fn resolve_inheritance(&mut self) {
        let resolved: Vec<_> = (0..self.styles.len())
            .map(|i| self.resolve_chain(i))
            .collect();
        for (i, (rulesets, paragraph, run)) in resolved.into_iter().enumerate() {
            let style = &mut self.styles[i];
            style.rulesets = rulesets;
            style.paragraph = paragraph;
            style.run = run;
        }
    }

    fn resolve_chain(&self, index: usize) -> (Vec<Ruleset>, ParagraphProperties, RunProperties) {
        let mut chain = vec![index];
        let mut visited: HashSet<&str> = HashSet::new();
        visited.insert(self.styles[index].id.as_str());

        let mut current = &self.styles[index];
        while let Some(base_id) = &current.based_on {
            if !visited.insert(base_id.as_str()) {
                tracing::warn!(style = %self.styles[index].id, base = %base_id,
                    "style inheritance cycle, stopping chain");
                break;
            }
            match self.by_id.get(base_id) {
                Some(&i) => {
                    chain.push(i);
                    current = &self.styles[i];
                }
                None => {
                    tracing::warn!(style = %current.id, base = %base_id,
                        "base style not found");
                    break;
                }
            }
        }

        let mut rulesets: Vec<Ruleset> = Vec::new();
        let mut paragraph = ParagraphProperties::default();
        let mut run = RunProperties::default();
        for &i in chain.iter().rev() {
            let style = &self.styles[i];
            merge_rulesets(&mut rulesets, &style.rulesets);
            paragraph = paragraph.merge(&style.paragraph);
            run = run.merge(&style.run);
        }
        (rulesets, paragraph, run)
    }

    /// Rulesets to apply when rendering content using `id`: the style's
    /// own resolved rulesets followed by its linked companion's. The
    /// companion's blocks are appended here, never stored back.
    pub fn render_rulesets(&self, id: &str) -> Vec<&Ruleset> {
        let mut out = Vec::new();
        if let Some(style) = self.get(id) {
            out.extend(style.rulesets.iter());
            if let Some(linked) = &style.linked {
                match self.get(linked) {
                    Some(companion) => out.extend(companion.rulesets.iter()),
                    None => tracing::warn!(style = %id, linked = %linked,
                        "linked style not found"),
                }
            }
        }
        out
    }
}

/// Merge `over` into `into`: matching (target, modifier) blocks are merged
/// key-by-key with `over` winning; blocks absent from `into` are adopted
/// as copies, so later mutation cannot reach the source definition.
fn merge_rulesets(into: &mut Vec<Ruleset>, over: &[Ruleset]) {
    for ruleset in over {
        match into
            .iter_mut()
            .find(|r| r.target == ruleset.target && r.modifier == ruleset.modifier)
        {
            Some(existing) => {
                for (key, value) in &ruleset.declarations {
                    existing.declarations.insert(key.clone(), value.clone());
                }
            }
            None => into.push(ruleset.clone()),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
