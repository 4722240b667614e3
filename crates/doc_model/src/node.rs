//! Core node types for the document tree
//!
//! A parsed document is a tree of `Node`s stored in an arena (see
//! [`crate::DocumentTree`]). Every node carries the same common fields
//! (ordered children, a CSS-like declarations map, an optional style
//! reference and class modifiers); the per-kind payload lives in
//! [`NodeKind`].

use crate::{ParagraphProperties, RunProperties, SectionProperties};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque arena index of a node within a `DocumentTree`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    /// Position of the node in the arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// CSS-like declarations attached to a node or ruleset. Order-irrelevant.
pub type Declarations = HashMap<String, String>;

// =============================================================================
// Kind-specific property bags
// =============================================================================

/// Properties of the document root.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentProps {
    /// Section properties of the body-terminated (final) section. Earlier
    /// sections attach theirs to the paragraph that closes them.
    pub section: Option<SectionProperties>,
}

/// Properties of a paragraph node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ParagraphNodeProps {
    /// Section properties when this paragraph terminates a section.
    pub section: Option<SectionProperties>,
    /// Engine-facing paragraph fields from direct formatting.
    pub props: ParagraphProperties,
}

/// Properties of a run node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunNodeProps {
    /// Engine-facing run fields from direct formatting.
    pub props: RunProperties,
}

/// A decomposed text segment (one word, or one code point in CJK text).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TextProps {
    pub text: String,
}

/// One column of a table grid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableColumn {
    /// Converted width (e.g. `"120.00pt"`), when the grid declares one.
    pub width: Option<String>,
}

/// Properties of a table node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableProps {
    pub columns: Vec<TableColumn>,
    /// Declarations applied to every cell (cell margins from table
    /// properties land here rather than on each cell).
    pub cell_declarations: Declarations,
}

/// Properties of a table row.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TableRowProps {
    /// Row is a repeated header row (`tblHeader`).
    pub is_header: bool,
}

/// Vertical-merge state of a cell. Row spans are expressed as a `Restart`
/// cell followed by `Continue` cells in the same column; the consumer
/// resolves the actual span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalMerge {
    Restart,
    Continue,
}

/// Properties of a table cell.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableCellProps {
    pub vertical_merge: Option<VerticalMerge>,
    /// Horizontal span count (recorded, not expanded).
    pub grid_span: u32,
}

impl Default for TableCellProps {
    fn default() -> Self {
        Self {
            vertical_merge: None,
            grid_span: 1,
        }
    }
}

/// Properties of a hyperlink node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HyperlinkProps {
    /// Resolved target (relationship target for external links).
    pub href: Option<String>,
    /// In-document anchor name.
    pub anchor: Option<String>,
}

/// How surrounding text flows around an anchored drawing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WrapType {
    None,
    TopAndBottom,
    Square,
    Tight,
    Through,
}

/// Which side of an anchored drawing text may flow on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WrapSide {
    #[default]
    Both,
    Left,
    Right,
    Largest,
}

/// A point in page coordinates (points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// Properties of a drawing container (inline or anchored).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DrawingProps {
    /// Inline drawings flow with the text; anchored ones float.
    pub inline: bool,
    /// Rendered box width in points: declared extent plus effect-extent
    /// padding, grown to the rotated bounding box when rotated.
    pub box_width: f32,
    /// Rendered box height in points.
    pub box_height: f32,
    pub wrap: Option<WrapType>,
    pub wrap_side: WrapSide,
    /// Resolved tight/through wrap outline in points, already rescaled
    /// from the 21600-unit source square and translated to the anchor.
    pub wrap_polygon: Option<Vec<Point>>,
}

/// Properties of an image node.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageProps {
    /// Relationship id of the binary part; resolution to displayable data
    /// is the packaging collaborator's job.
    pub rel_id: Option<String>,
}

/// Kinds of run-level breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakKind {
    Page,
    Column,
    TextWrapping,
    /// Marker recorded by the producing application at the position where
    /// its own renderer last broke the page. Input to the pagination
    /// heuristic, never a hard break.
    LastRendered,
}

/// Properties of a symbol run child (`sym`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymbolProps {
    pub font: Option<String>,
    /// Hex character code as written in the source.
    pub code: Option<String>,
}

/// Complex-field state machine markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FieldCharKind {
    Begin,
    Separate,
    End,
}

/// Properties of a simple (single-element) field.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimpleFieldProps {
    pub instruction: String,
}

/// Bookmark marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookmarkProps {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Comment range/reference marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommentRef {
    pub id: Option<String>,
}

/// Tracked-change container metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RevisionProps {
    pub author: Option<String>,
    pub date: Option<String>,
}

/// Smart-tag container metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SmartTagProps {
    pub uri: Option<String>,
    pub element: Option<String>,
}

/// A legacy vector-graphics element.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VmlProps {
    /// Shape tag local name (`rect`, `oval`, `line`, `shape`, …).
    pub tag: String,
    pub stroke: Option<String>,
    pub fill: Option<String>,
}

/// Math-family node kinds: the OMML element surface collapsed onto the
/// structural roles the renderer distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MathKind {
    Math,
    MathParagraph,
    Fraction,
    Numerator,
    Denominator,
    Radical,
    Degree,
    Superscript,
    Subscript,
    SuperArgument,
    SubArgument,
    Base,
    Delimiter,
    Nary,
    Function,
    FunctionName,
    GroupChar,
    Matrix,
    MatrixRow,
    LimitLower,
    LimitUpper,
    Bar,
    BorderBox,
    Accent,
    Run,
}

// =============================================================================
// NodeKind
// =============================================================================

/// Tagged union over every node kind the parser produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum NodeKind {
    Document(DocumentProps),
    Paragraph(ParagraphNodeProps),
    Run(RunNodeProps),
    Text(TextProps),
    Table(TableProps),
    TableRow(TableRowProps),
    TableCell(TableCellProps),
    Hyperlink(HyperlinkProps),
    Drawing(DrawingProps),
    Image(ImageProps),
    Break(BreakKind),
    Tab,
    Symbol(SymbolProps),
    FieldChar(FieldCharKind),
    Instruction(TextProps),
    SimpleField(SimpleFieldProps),
    BookmarkStart(BookmarkProps),
    BookmarkEnd(BookmarkProps),
    CommentRangeStart(CommentRef),
    CommentRangeEnd(CommentRef),
    CommentReference(CommentRef),
    Inserted(RevisionProps),
    Deleted(RevisionProps),
    SmartTag(SmartTagProps),
    VmlElement(VmlProps),
    Math(MathKind),
}

impl NodeKind {
    /// Stable name used in diagnostics.
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Document(_) => "document",
            NodeKind::Paragraph(_) => "paragraph",
            NodeKind::Run(_) => "run",
            NodeKind::Text(_) => "text",
            NodeKind::Table(_) => "table",
            NodeKind::TableRow(_) => "row",
            NodeKind::TableCell(_) => "cell",
            NodeKind::Hyperlink(_) => "hyperlink",
            NodeKind::Drawing(_) => "drawing",
            NodeKind::Image(_) => "image",
            NodeKind::Break(_) => "break",
            NodeKind::Tab => "tab",
            NodeKind::Symbol(_) => "symbol",
            NodeKind::FieldChar(_) => "field-char",
            NodeKind::Instruction(_) => "instruction",
            NodeKind::SimpleField(_) => "simple-field",
            NodeKind::BookmarkStart(_) => "bookmark-start",
            NodeKind::BookmarkEnd(_) => "bookmark-end",
            NodeKind::CommentRangeStart(_) => "comment-range-start",
            NodeKind::CommentRangeEnd(_) => "comment-range-end",
            NodeKind::CommentReference(_) => "comment-reference",
            NodeKind::Inserted(_) => "inserted",
            NodeKind::Deleted(_) => "deleted",
            NodeKind::SmartTag(_) => "smart-tag",
            NodeKind::VmlElement(_) => "vml",
            NodeKind::Math(_) => "math",
        }
    }
}

// =============================================================================
// Node
// =============================================================================

/// A node in the document tree. Children are ordered; the parent
/// back-reference lives in the tree's parent table, not on the node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    pub kind: NodeKind,
    pub children: Vec<NodeId>,
    pub declarations: Declarations,
    /// Reference into the style catalog.
    pub style_id: Option<String>,
    /// Class modifiers (conditional table formatting and the like).
    pub class_list: Vec<String>,
}

impl Node {
    /// Create a node of the given kind with no children or declarations.
    pub fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            children: Vec::new(),
            declarations: Declarations::new(),
            style_id: None,
            class_list: Vec::new(),
        }
    }

    /// Convenience constructor for a text segment.
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(NodeKind::Text(TextProps { text: text.into() }))
    }

    pub fn is_paragraph(&self) -> bool {
        matches!(self.kind, NodeKind::Paragraph(_))
    }

    pub fn is_run(&self) -> bool {
        matches!(self.kind, NodeKind::Run(_))
    }

    pub fn is_table(&self) -> bool {
        matches!(self.kind, NodeKind::Table(_))
    }

    /// The paragraph bag, when this node is a paragraph.
    pub fn as_paragraph(&self) -> Option<&ParagraphNodeProps> {
        match &self.kind {
            NodeKind::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_paragraph_mut(&mut self) -> Option<&mut ParagraphNodeProps> {
        match &mut self.kind {
            NodeKind::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// Text payload, when this node carries one.
    pub fn text_content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(t) | NodeKind::Instruction(t) => Some(&t.text),
            _ => None,
        }
    }
}
