//! Section model - page setup, columns, header/footer references
//!
//! A section is a logical subdivision of the document with its own page
//! geometry. Its properties attach to the paragraph that terminates the
//! section (the final section's attach to the document root), so most
//! pages of a section borrow the properties of a later page.

use crate::Declarations;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Page geometry
// =============================================================================

/// Page orientation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Page size in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageSize {
    pub width: f32,
    pub height: f32,
    pub orientation: Orientation,
}

impl PageSize {
    /// US Letter (8.5" x 11") at 72 dpi.
    pub fn letter() -> Self {
        Self {
            width: 612.0,
            height: 792.0,
            orientation: Orientation::Portrait,
        }
    }
}

impl Default for PageSize {
    fn default() -> Self {
        Self::letter()
    }
}

/// Page margins in points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageMargins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
    /// Distance from the page edge to the header content.
    pub header: f32,
    /// Distance from the page edge to the footer content.
    pub footer: f32,
    pub gutter: f32,
}

impl PageMargins {
    /// 1 inch all around, half-inch header/footer bands.
    pub fn normal() -> Self {
        Self {
            top: 72.0,
            bottom: 72.0,
            left: 72.0,
            right: 72.0,
            header: 36.0,
            footer: 36.0,
            gutter: 0.0,
        }
    }
}

impl Default for PageMargins {
    fn default() -> Self {
        Self::normal()
    }
}

// =============================================================================
// Columns
// =============================================================================

/// One explicitly-sized column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Width in points.
    pub width: f32,
    /// Gutter after this column in points.
    pub space: f32,
}

/// Multi-column layout of a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Columns {
    pub count: u32,
    /// Default gutter in points.
    pub space: f32,
    pub separator: bool,
    pub equal_width: bool,
    /// Per-column specs when widths are unequal.
    pub columns: Vec<ColumnSpec>,
}

impl Default for Columns {
    fn default() -> Self {
        Self {
            count: 1,
            space: 36.0,
            separator: false,
            equal_width: true,
            columns: Vec::new(),
        }
    }
}

// =============================================================================
// Header/footer references
// =============================================================================

/// Which pages of the section a header/footer applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HeaderFooterKind {
    Default,
    Even,
    First,
}

impl HeaderFooterKind {
    pub fn from_token(token: &str) -> Self {
        match token {
            "even" => HeaderFooterKind::Even,
            "first" => HeaderFooterKind::First,
            _ => HeaderFooterKind::Default,
        }
    }
}

/// Reference to a header/footer part. Target resolution (the part's path)
/// happens at parse time through the relationship resolver; fetching the
/// part's content is the caller's job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeaderFooterRef {
    pub kind: HeaderFooterKind,
    pub rel_id: String,
    /// Resolved relationship target, when the id resolved.
    pub target: Option<String>,
}

// =============================================================================
// Section type and numbering
// =============================================================================

/// How a section begins relative to the preceding content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SectionType {
    Continuous,
    NextColumn,
    NextPage,
    EvenPage,
    OddPage,
}

impl SectionType {
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "continuous" => Some(SectionType::Continuous),
            "nextColumn" => Some(SectionType::NextColumn),
            "nextPage" => Some(SectionType::NextPage),
            "evenPage" => Some(SectionType::EvenPage),
            "oddPage" => Some(SectionType::OddPage),
            _ => None,
        }
    }

    /// Sections of these types render into the existing flow or column
    /// instead of starting a page.
    pub fn flows_inline(self) -> bool {
        matches!(self, SectionType::Continuous | SectionType::NextColumn)
    }
}

/// Page-number configuration of a section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageNumbering {
    pub start: Option<u32>,
    /// Raw number-format token, mapped by the renderer through
    /// [`crate::css_counter_format`].
    pub format: Option<String>,
}

/// Document-grid configuration (East Asian layout).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocGrid {
    pub grid_type: Option<String>,
    /// Line pitch in points.
    pub line_pitch: Option<f32>,
    pub char_space: Option<f32>,
}

// =============================================================================
// Section properties
// =============================================================================

/// Full page setup of one section. The `id` is generated at parse time and
/// shared by every page belonging to the section, including pages that
/// borrow these properties through the backward fill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionProperties {
    pub id: Uuid,
    pub page_size: PageSize,
    pub margins: PageMargins,
    pub columns: Option<Columns>,
    pub header_refs: Vec<HeaderFooterRef>,
    pub footer_refs: Vec<HeaderFooterRef>,
    pub page_numbering: Option<PageNumbering>,
    pub section_type: Option<SectionType>,
    pub doc_grid: Option<DocGrid>,
    /// Page-border declarations, when the section declares them.
    pub page_borders: Option<Declarations>,
    /// Section has a distinct first-page header/footer (`titlePg`).
    pub title_page: bool,
}

impl SectionProperties {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            page_size: PageSize::default(),
            margins: PageMargins::default(),
            columns: None,
            header_refs: Vec::new(),
            footer_refs: Vec::new(),
            page_numbering: None,
            section_type: None,
            doc_grid: None,
            page_borders: None,
            title_page: false,
        }
    }

    /// Content width in points (page width minus side margins).
    pub fn content_width(&self) -> f32 {
        self.page_size.width - self.margins.left - self.margins.right
    }

    pub fn header_ref(&self, kind: HeaderFooterKind) -> Option<&HeaderFooterRef> {
        self.header_refs.iter().find(|r| r.kind == kind)
    }

    pub fn footer_ref(&self, kind: HeaderFooterKind) -> Option<&HeaderFooterRef> {
        self.footer_refs.iter().find(|r| r.kind == kind)
    }
}

impl Default for SectionProperties {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_letter_normal() {
        let section = SectionProperties::new();
        assert_eq!(section.page_size.width, 612.0);
        assert_eq!(section.page_size.height, 792.0);
        assert_eq!(section.margins.top, 72.0);
        assert_eq!(section.content_width(), 612.0 - 144.0);
    }

    #[test]
    fn test_each_section_gets_distinct_identity() {
        let a = SectionProperties::new();
        let b = SectionProperties::new();
        assert_ne!(a.id, b.id);
        // Clones share identity - every page of a section carries the same id.
        assert_eq!(a.id, a.clone().id);
    }

    #[test]
    fn test_section_type_tokens() {
        assert_eq!(
            SectionType::from_token("continuous"),
            Some(SectionType::Continuous)
        );
        assert_eq!(
            SectionType::from_token("nextPage"),
            Some(SectionType::NextPage)
        );
        assert_eq!(SectionType::from_token("bogus"), None);
    }

    #[test]
    fn test_inline_flow_types() {
        assert!(SectionType::Continuous.flows_inline());
        assert!(SectionType::NextColumn.flows_inline());
        assert!(!SectionType::NextPage.flows_inline());
        assert!(!SectionType::OddPage.flows_inline());
    }

    #[test]
    fn test_header_lookup_by_kind() {
        let mut section = SectionProperties::new();
        section.header_refs.push(HeaderFooterRef {
            kind: HeaderFooterKind::First,
            rel_id: "rId7".to_string(),
            target: Some("header1.xml".to_string()),
        });
        assert!(section.header_ref(HeaderFooterKind::First).is_some());
        assert!(section.header_ref(HeaderFooterKind::Even).is_none());
    }
}
