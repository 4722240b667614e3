//! Error types for the parser crate
//!
//! The parser itself never fails - malformed content degrades to defaults
//! with diagnostics. The only fallible surface is the element-tree
//! adapter, where raw XML handed in by the packaging collaborator may not
//! parse at all.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ParseError {
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),
}

pub type Result<T> = std::result::Result<T, ParseError>;
