//! Paragraph parsing
//!
//! Paragraphs own runs, hyperlinks, markers (bookmarks, comment ranges),
//! revision containers, math and simple fields. The paragraph properties
//! container is folded through the shared table, with the style
//! reference, numbering binding, conditional-formatting mask and a
//! terminal section-properties block intercepted.

use crate::properties::{classes_from_cnf_mask, parse_properties};
use crate::{DocumentParser, RelationshipResolver, XmlElement};
use doc_model::{
    BookmarkProps, CommentRef, Declarations, DocumentTree, HyperlinkProps, Node, NodeId, NodeKind,
    NumberingRef, ParagraphNodeProps, ParagraphProperties, RevisionProps, SimpleFieldProps,
    SmartTagProps,
};

impl DocumentParser {
    pub(crate) fn parse_paragraph(
        &self,
        tree: &mut DocumentTree,
        parent: NodeId,
        elem: &XmlElement,
        rels: &dyn RelationshipResolver,
    ) -> NodeId {
        let para_id = tree.push_child(
            parent,
            Node::new(NodeKind::Paragraph(ParagraphNodeProps::default())),
        );
        self.parse_paragraph_children(tree, para_id, elem, rels);
        para_id
    }

    /// Dispatch paragraph-level children. Factored out so structured
    /// content containers can splice their wrapped children in place.
    fn parse_paragraph_children(
        &self,
        tree: &mut DocumentTree,
        para_id: NodeId,
        elem: &XmlElement,
        rels: &dyn RelationshipResolver,
    ) {
        for child in elem.elements() {
            match child.local_name.as_str() {
                "pPr" => self.parse_paragraph_properties(tree, para_id, child, rels),
                "r" => {
                    self.parse_run(tree, para_id, child, rels);
                }
                "hyperlink" => self.parse_hyperlink(tree, para_id, child, rels),
                "bookmarkStart" => {
                    tree.push_child(
                        para_id,
                        Node::new(NodeKind::BookmarkStart(BookmarkProps {
                            id: child.attr("id").map(str::to_string),
                            name: child.attr("name").map(str::to_string),
                        })),
                    );
                }
                "bookmarkEnd" => {
                    tree.push_child(
                        para_id,
                        Node::new(NodeKind::BookmarkEnd(BookmarkProps {
                            id: child.attr("id").map(str::to_string),
                            name: None,
                        })),
                    );
                }
                "commentRangeStart" => {
                    tree.push_child(
                        para_id,
                        Node::new(NodeKind::CommentRangeStart(CommentRef {
                            id: child.attr("id").map(str::to_string),
                        })),
                    );
                }
                "commentRangeEnd" => {
                    tree.push_child(
                        para_id,
                        Node::new(NodeKind::CommentRangeEnd(CommentRef {
                            id: child.attr("id").map(str::to_string),
                        })),
                    );
                }
                "ins" => self.parse_revision(tree, para_id, child, rels, true),
                "del" => self.parse_revision(tree, para_id, child, rels, false),
                "smartTag" => {
                    let tag_id = tree.push_child(
                        para_id,
                        Node::new(NodeKind::SmartTag(SmartTagProps {
                            uri: child.attr("uri").map(str::to_string),
                            element: child.attr("element").map(str::to_string),
                        })),
                    );
                    self.parse_paragraph_children(tree, tag_id, child, rels);
                }
                "fldSimple" => {
                    let field_id = tree.push_child(
                        para_id,
                        Node::new(NodeKind::SimpleField(SimpleFieldProps {
                            instruction: child.attr("instr").unwrap_or_default().to_string(),
                        })),
                    );
                    self.parse_paragraph_children(tree, field_id, child, rels);
                }
                "oMath" | "oMathPara" => {
                    self.parse_math(tree, para_id, child);
                }
                "sdt" => {
                    if let Some(content) = child.element("sdtContent") {
                        self.parse_paragraph_children(tree, para_id, content, rels);
                    }
                }
                name => self.unknown("paragraph", name),
            }
        }
    }

    fn parse_paragraph_properties(
        &self,
        tree: &mut DocumentTree,
        para_id: NodeId,
        elem: &XmlElement,
        rels: &dyn RelationshipResolver,
    ) {
        let mut declarations = Declarations::new();
        let mut props = ParagraphProperties::default();
        let mut section = None;
        let mut style_id = None;
        let mut class_list = Vec::new();

        parse_properties(elem, &mut declarations, &self.defaults, |child, decl| {
            match child.local_name.as_str() {
                "pStyle" => {
                    style_id = child.attr("val").map(str::to_string);
                    true
                }
                "numPr" => {
                    let num_id = child
                        .element("numId")
                        .and_then(|n| n.attr("val"))
                        .map(str::to_string);
                    let level = child
                        .element("ilvl")
                        .and_then(|l| l.int_attr("val"))
                        .unwrap_or(0) as u8;
                    if let Some(num_id) = num_id {
                        props.numbering = Some(NumberingRef { num_id, level });
                    }
                    true
                }
                "sectPr" => {
                    section = Some(self.parse_section_properties(child, rels));
                    true
                }
                "cnfStyle" => {
                    if let Some(mask) = child.attr("val") {
                        class_list = classes_from_cnf_mask(mask);
                    }
                    true
                }
                "pageBreakBefore" => {
                    props.page_break_before = Some(child.is_on());
                    if child.is_on() {
                        decl.insert("break-before".to_string(), "page".to_string());
                    }
                    true
                }
                "keepNext" => {
                    props.keep_next = Some(child.is_on());
                    if child.is_on() {
                        decl.insert("break-after".to_string(), "avoid".to_string());
                    }
                    true
                }
                "keepLines" => {
                    props.keep_lines = Some(child.is_on());
                    if child.is_on() {
                        decl.insert("break-inside".to_string(), "avoid".to_string());
                    }
                    true
                }
                "outlineLvl" => {
                    props.outline_level =
                        child.int_attr("val").map(|level| level as u8 + 1);
                    true
                }
                // Paragraph-mark run properties do not style the content.
                "rPr" => true,
                _ => false,
            }
        });

        let node = tree.node_mut(para_id);
        node.declarations = declarations;
        node.style_id = style_id;
        node.class_list = class_list;
        node.kind = NodeKind::Paragraph(ParagraphNodeProps { section, props });
    }

    fn parse_hyperlink(
        &self,
        tree: &mut DocumentTree,
        parent: NodeId,
        elem: &XmlElement,
        rels: &dyn RelationshipResolver,
    ) {
        let anchor = elem.attr("anchor").map(str::to_string);
        let href = match elem.attr("id") {
            Some(rel_id) => match rels.resolve(rel_id) {
                Some(relationship) => Some(relationship.target),
                None => {
                    tracing::warn!(rel_id, "unresolved hyperlink relationship");
                    None
                }
            },
            None => anchor.as_ref().map(|a| format!("#{a}")),
        };
        let link_id = tree.push_child(
            parent,
            Node::new(NodeKind::Hyperlink(HyperlinkProps { href, anchor })),
        );
        for child in elem.elements() {
            match child.local_name.as_str() {
                "r" => {
                    self.parse_run(tree, link_id, child, rels);
                }
                name => self.unknown("hyperlink", name),
            }
        }
    }

    fn parse_revision(
        &self,
        tree: &mut DocumentTree,
        parent: NodeId,
        elem: &XmlElement,
        rels: &dyn RelationshipResolver,
        inserted: bool,
    ) {
        let props = RevisionProps {
            author: elem.attr("author").map(str::to_string),
            date: elem.attr("date").map(str::to_string),
        };
        let kind = if inserted {
            NodeKind::Inserted(props)
        } else {
            NodeKind::Deleted(props)
        };
        let revision_id = tree.push_child(parent, Node::new(kind));
        for child in elem.elements() {
            match child.local_name.as_str() {
                "r" => {
                    self.parse_run(tree, revision_id, child, rels);
                }
                name => self.unknown("revision", name),
            }
        }
    }
}
