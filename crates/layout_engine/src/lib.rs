//! Layout Engine - pagination of the document tree
//!
//! Turns the parsed body sequence into an ordered page list per section
//! breaks, manual breaks, and break heuristics. Measurement-dependent
//! splitting (line breaking, table overflow) is the rendering
//! collaborator's job; pages whose true break point needs measurement are
//! marked accordingly.

mod paginator;

pub use paginator::*;
