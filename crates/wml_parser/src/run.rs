//! Run parsing
//!
//! A run is the smallest unit of formatted text. Its children carry the
//! actual content: text (decomposed into segments), breaks, tabs, field
//! markers, drawings, and legacy vector graphics.

use crate::properties::parse_properties;
use crate::text::decompose;
use crate::{DocumentParser, RelationshipResolver, XmlElement};
use doc_model::{
    BreakKind, CommentRef, DocumentTree, FieldCharKind, Node, NodeId, NodeKind, RunNodeProps,
    RunProperties, RunVerticalAlign, SymbolProps, TextProps,
};

impl DocumentParser {
    pub(crate) fn parse_run(
        &self,
        tree: &mut DocumentTree,
        parent: NodeId,
        elem: &XmlElement,
        rels: &dyn RelationshipResolver,
    ) -> NodeId {
        let run_id = tree.push_child(parent, Node::new(NodeKind::Run(RunNodeProps::default())));
        for child in elem.elements() {
            match child.local_name.as_str() {
                "rPr" => self.parse_run_properties(tree, run_id, child),
                "t" => {
                    for segment in decompose(&child.text, child.preserves_space()) {
                        tree.push_child(run_id, Node::text(segment));
                    }
                }
                "delText" => {
                    for segment in decompose(&child.text, child.preserves_space()) {
                        tree.push_child(run_id, Node::text(segment));
                    }
                }
                "instrText" => {
                    tree.push_child(
                        run_id,
                        Node::new(NodeKind::Instruction(TextProps {
                            text: child.text.clone(),
                        })),
                    );
                }
                "br" => {
                    let kind = match child.attr("type") {
                        Some("page") => BreakKind::Page,
                        Some("column") => BreakKind::Column,
                        _ => BreakKind::TextWrapping,
                    };
                    tree.push_child(run_id, Node::new(NodeKind::Break(kind)));
                }
                "lastRenderedPageBreak" => {
                    tree.push_child(run_id, Node::new(NodeKind::Break(BreakKind::LastRendered)));
                }
                "cr" => {
                    tree.push_child(
                        run_id,
                        Node::new(NodeKind::Break(BreakKind::TextWrapping)),
                    );
                }
                "tab" => {
                    tree.push_child(run_id, Node::new(NodeKind::Tab));
                }
                "sym" => {
                    tree.push_child(
                        run_id,
                        Node::new(NodeKind::Symbol(SymbolProps {
                            font: child.attr("font").map(str::to_string),
                            code: child.attr("char").map(str::to_string),
                        })),
                    );
                }
                "noBreakHyphen" => {
                    tree.push_child(run_id, Node::text("\u{2011}"));
                }
                "softHyphen" => {
                    tree.push_child(run_id, Node::text("\u{00AD}"));
                }
                "fldChar" => {
                    let kind = match child.attr("fldCharType") {
                        Some("begin") => Some(FieldCharKind::Begin),
                        Some("separate") => Some(FieldCharKind::Separate),
                        Some("end") => Some(FieldCharKind::End),
                        _ => None,
                    };
                    if let Some(kind) = kind {
                        tree.push_child(run_id, Node::new(NodeKind::FieldChar(kind)));
                    }
                }
                "drawing" => self.parse_drawing(tree, run_id, child, rels),
                "pict" | "object" => self.parse_vml(tree, run_id, child),
                "commentReference" => {
                    tree.push_child(
                        run_id,
                        Node::new(NodeKind::CommentReference(CommentRef {
                            id: child.attr("id").map(str::to_string),
                        })),
                    );
                }
                name => self.unknown("run", name),
            }
        }
        run_id
    }

    /// Fold `rPr` into the run's declarations, intercepting the style
    /// reference and the engine-facing typed fields.
    fn parse_run_properties(&self, tree: &mut DocumentTree, run_id: NodeId, elem: &XmlElement) {
        let mut declarations = doc_model::Declarations::new();
        let mut props = RunProperties::default();
        let mut style_id = None;

        parse_properties(elem, &mut declarations, &self.defaults, |child, _| {
            match child.local_name.as_str() {
                "rStyle" => {
                    style_id = child.attr("val").map(str::to_string);
                    true
                }
                "vertAlign" => {
                    props.vertical_align = Some(match child.attr("val") {
                        Some("superscript") => RunVerticalAlign::Superscript,
                        Some("subscript") => RunVerticalAlign::Subscript,
                        _ => RunVerticalAlign::Baseline,
                    });
                    // The shared table still emits the declaration.
                    false
                }
                "vanish" => {
                    props.hidden = Some(child.is_on());
                    false
                }
                _ => false,
            }
        });

        let node = tree.node_mut(run_id);
        node.declarations = declarations;
        node.style_id = style_id;
        node.kind = NodeKind::Run(RunNodeProps { props });
    }
}
