//! Document Model - typed document tree, styles, numbering, and sections
//!
//! This crate provides the data model of the viewer core: the node arena
//! the parser builds, the style catalog with cascade resolution, the
//! joined numbering catalog, section properties, and document settings.

mod node;
mod numbering;
mod section;
mod settings;
pub mod style;
mod tree;

pub use node::*;
pub use numbering::*;
pub use section::*;
pub use settings::*;
pub use style::*;
pub use tree::*;
