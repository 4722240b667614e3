//! WordprocessingML parser - element tree to typed document model
//!
//! This crate turns a parsed-XML element tree into the `doc_model` node
//! arena plus the style, numbering and settings catalogs. Dispatch is by
//! element local name within a known parent context; an unrecognized name
//! yields no node and never aborts parsing.

mod document;
mod drawing;
mod element;
mod error;
mod math;
mod numbering;
mod paragraph;
mod parser;
pub mod properties;
mod run;
mod settings;
mod styles;
mod table;
pub mod text;
pub mod units;

pub use document::PackageParts;
pub use element::*;
pub use error::*;
pub use parser::*;
pub use properties::{classes_from_cnf_mask, ColorDefaults};
