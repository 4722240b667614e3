//! Numbering catalog
//!
//! The source format defines numbering in two layers: abstract definitions
//! (templates owning up to nine levels) and concrete instances mapping a
//! public numbering id onto an abstract definition. The parser joins both
//! into this flat catalog keyed by (public id, level).

use crate::Declarations;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A paragraph's binding to a numbering definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberingRef {
    /// Public (concrete) numbering id.
    pub num_id: String,
    /// Level index, 0-8.
    pub level: u8,
}

/// What separates the number label from the paragraph text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LevelSuffix {
    #[default]
    Tab,
    Space,
    Nothing,
}

impl LevelSuffix {
    pub fn from_token(token: &str) -> Self {
        match token {
            "space" => LevelSuffix::Space,
            "nothing" => LevelSuffix::Nothing,
            _ => LevelSuffix::Tab,
        }
    }
}

/// One joined numbering level.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NumberingLevel {
    /// Public numbering id this level is reachable under.
    pub num_id: String,
    /// Abstract definition the level came from.
    pub abstract_id: String,
    /// Level index, 0-8.
    pub level: u8,
    /// Start value of the counter.
    pub start: u32,
    /// Raw number-format token (`"decimal"`, `"decimalZero"`, …).
    pub format: String,
    /// Label template; `%1`..`%9` reference ancestor-level counters.
    pub level_text: String,
    pub suffix: LevelSuffix,
    /// Picture-bullet id, resolved through the catalog's bullet map.
    pub bullet_picture: Option<String>,
    /// Paragraph style this level is bound to, if any.
    pub paragraph_style: Option<String>,
    pub paragraph_declarations: Declarations,
    pub run_declarations: Declarations,
}

/// Flat numbering catalog for one document. Lookups scan the level list;
/// real documents hold at most a few dozen joined levels.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NumberingCatalog {
    levels: Vec<NumberingLevel>,
    /// Picture-bullet id → image relationship id.
    pub picture_bullets: HashMap<String, String>,
}

impl NumberingCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a joined level, replacing any previous (num id, level) entry.
    pub fn insert(&mut self, level: NumberingLevel) {
        match self
            .levels
            .iter_mut()
            .find(|l| l.num_id == level.num_id && l.level == level.level)
        {
            Some(existing) => *existing = level,
            None => self.levels.push(level),
        }
    }

    pub fn get(&self, num_id: &str, level: u8) -> Option<&NumberingLevel> {
        self.levels
            .iter()
            .find(|l| l.num_id == num_id && l.level == level)
    }

    pub fn resolve(&self, reference: &NumberingRef) -> Option<&NumberingLevel> {
        self.get(&reference.num_id, reference.level)
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NumberingLevel> {
        self.levels.iter()
    }
}

/// Map a number-format token onto a CSS counter style. Unrecognized tokens
/// pass through unchanged so vendor formats survive to the renderer.
pub fn css_counter_format(format: &str) -> String {
    match format {
        "none" => "none",
        "bullet" => "disc",
        "decimal" => "decimal",
        "decimalZero" => "decimal-leading-zero",
        "lowerLetter" => "lower-alpha",
        "upperLetter" => "upper-alpha",
        "lowerRoman" => "lower-roman",
        "upperRoman" => "upper-roman",
        other => other,
    }
    .to_string()
}

/// Format a counter value for a number-format token. Formats with no
/// positional rendering (bullets, none, unknown vendor tokens) yield an
/// empty string and are the renderer's problem.
pub fn format_counter(format: &str, value: u32) -> String {
    match format {
        "decimal" => value.to_string(),
        "decimalZero" => format!("{:02}", value),
        "lowerLetter" => format_letter(value, false),
        "upperLetter" => format_letter(value, true),
        "lowerRoman" => format_roman(value, false),
        "upperRoman" => format_roman(value, true),
        _ => String::new(),
    }
}

/// a, b, … z, aa, ab, …
fn format_letter(value: u32, uppercase: bool) -> String {
    if value == 0 {
        return String::new();
    }
    let mut result = String::new();
    let mut n = value;
    while n > 0 {
        n -= 1;
        let c = ((n % 26) as u8 + if uppercase { b'A' } else { b'a' }) as char;
        result.insert(0, c);
        n /= 26;
    }
    result
}

fn format_roman(value: u32, uppercase: bool) -> String {
    const NUMERALS: [(u32, &str); 13] = [
        (1000, "m"),
        (900, "cm"),
        (500, "d"),
        (400, "cd"),
        (100, "c"),
        (90, "xc"),
        (50, "l"),
        (40, "xl"),
        (10, "x"),
        (9, "ix"),
        (5, "v"),
        (4, "iv"),
        (1, "i"),
    ];
    let mut n = value;
    let mut result = String::new();
    for (weight, numeral) in NUMERALS {
        while n >= weight {
            result.push_str(numeral);
            n -= weight;
        }
    }
    if uppercase {
        result.to_uppercase()
    } else {
        result
    }
}
