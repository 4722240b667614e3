//! Document body and section-properties parsing

use crate::properties::border_declaration;
use crate::units::{to_points, LengthUsage};
use crate::{DocumentParser, RelationshipResolver, XmlElement};
use doc_model::{
    ColumnSpec, Columns, Declarations, DocGrid, DocumentTree, HeaderFooterKind, HeaderFooterRef,
    NodeKind, Orientation, PageNumbering, SectionProperties, SectionType,
};

/// The package parts this core consumes, as pre-parsed element trees.
/// Every part except the document itself is optional; a missing part
/// leaves the corresponding catalog at its defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageParts<'a> {
    pub document: Option<&'a XmlElement>,
    pub styles: Option<&'a XmlElement>,
    pub numbering: Option<&'a XmlElement>,
    pub settings: Option<&'a XmlElement>,
}

impl DocumentParser {
    /// Parse all package parts into one tree with resolved catalogs: the
    /// style cascade is resolved before the tree is handed out.
    pub fn parse_package(
        &self,
        parts: PackageParts<'_>,
        rels: &dyn RelationshipResolver,
    ) -> DocumentTree {
        let mut tree = match parts.document {
            Some(document) => self.parse_document(document, rels),
            None => DocumentTree::new(),
        };
        if let Some(styles) = parts.styles {
            tree.styles = self.parse_styles(styles);
            tree.styles.resolve_inheritance();
        }
        if let Some(numbering) = parts.numbering {
            tree.numbering = self.parse_numbering(numbering);
        }
        if let Some(settings) = parts.settings {
            tree.settings = self.parse_settings(settings);
        }
        tree
    }

    /// Parse a document (or bare body) element into a linked tree. Never
    /// fails: unrecognized content degrades with diagnostics.
    pub fn parse_document(
        &self,
        root: &XmlElement,
        rels: &dyn RelationshipResolver,
    ) -> DocumentTree {
        let mut tree = DocumentTree::new();
        let body = if root.local_name == "body" {
            Some(root)
        } else {
            root.element("body")
        };
        let Some(body) = body else {
            tracing::warn!(root = %root.local_name, "document has no body");
            return tree;
        };
        self.parse_body_children(&mut tree, body, rels);
        tree.link_parents();
        tree
    }

    fn parse_body_children(
        &self,
        tree: &mut DocumentTree,
        body: &XmlElement,
        rels: &dyn RelationshipResolver,
    ) {
        let root = tree.root();
        for child in body.elements() {
            match child.local_name.as_str() {
                "p" => {
                    self.parse_paragraph(tree, root, child, rels);
                }
                "tbl" => {
                    self.parse_table(tree, root, child, rels);
                }
                "sdt" => {
                    if let Some(content) = child.element("sdtContent") {
                        self.parse_body_children(tree, content, rels);
                    }
                }
                "sectPr" => {
                    // The body-terminal block governs the final section.
                    let section = self.parse_section_properties(child, rels);
                    if let NodeKind::Document(props) = &mut tree.node_mut(root).kind {
                        props.section = Some(section);
                    }
                }
                name => self.unknown("body", name),
            }
        }
    }

    pub(crate) fn parse_section_properties(
        &self,
        elem: &XmlElement,
        rels: &dyn RelationshipResolver,
    ) -> SectionProperties {
        let mut section = SectionProperties::new();
        for child in elem.elements() {
            match child.local_name.as_str() {
                "pgSz" => {
                    if let Some(width) = child
                        .attr("w")
                        .and_then(|v| to_points(v, LengthUsage::DXA))
                    {
                        section.page_size.width = width;
                    }
                    if let Some(height) = child
                        .attr("h")
                        .and_then(|v| to_points(v, LengthUsage::DXA))
                    {
                        section.page_size.height = height;
                    }
                    if child.attr("orient") == Some("landscape") {
                        section.page_size.orientation = Orientation::Landscape;
                    }
                }
                "pgMar" => {
                    let margins = &mut section.margins;
                    for (attr, slot) in [
                        ("top", &mut margins.top as &mut f32),
                        ("bottom", &mut margins.bottom),
                        ("left", &mut margins.left),
                        ("right", &mut margins.right),
                        ("header", &mut margins.header),
                        ("footer", &mut margins.footer),
                        ("gutter", &mut margins.gutter),
                    ] {
                        if let Some(points) = child
                            .attr(attr)
                            .and_then(|v| to_points(v, LengthUsage::DXA))
                        {
                            *slot = points;
                        }
                    }
                }
                "cols" => section.columns = Some(parse_columns(child)),
                "headerReference" | "footerReference" => {
                    let kind = HeaderFooterKind::from_token(child.attr("type").unwrap_or(""));
                    let Some(rel_id) = child.attr("id") else {
                        continue;
                    };
                    let target = match rels.resolve(rel_id) {
                        Some(relationship) => Some(relationship.target),
                        None => {
                            tracing::warn!(rel_id, "unresolved header/footer relationship");
                            None
                        }
                    };
                    let reference = HeaderFooterRef {
                        kind,
                        rel_id: rel_id.to_string(),
                        target,
                    };
                    if child.local_name == "headerReference" {
                        section.header_refs.push(reference);
                    } else {
                        section.footer_refs.push(reference);
                    }
                }
                "pgNumType" => {
                    section.page_numbering = Some(PageNumbering {
                        start: child.int_attr("start").map(|v| v as u32),
                        format: child.attr("fmt").map(str::to_string),
                    });
                }
                "type" => {
                    section.section_type =
                        child.attr("val").and_then(SectionType::from_token);
                }
                "docGrid" => {
                    section.doc_grid = Some(DocGrid {
                        grid_type: child.attr("type").map(str::to_string),
                        line_pitch: child
                            .attr("linePitch")
                            .and_then(|v| to_points(v, LengthUsage::DXA)),
                        char_space: child.float_attr("charSpace"),
                    });
                }
                "pgBorders" => {
                    let mut declarations = Declarations::new();
                    for side in child.elements() {
                        let key = match side.local_name.as_str() {
                            "top" => "border-top",
                            "bottom" => "border-bottom",
                            "left" => "border-left",
                            "right" => "border-right",
                            _ => continue,
                        };
                        if let Some(border) = border_declaration(side, &self.defaults) {
                            declarations.insert(key.to_string(), border);
                        }
                    }
                    if !declarations.is_empty() {
                        section.page_borders = Some(declarations);
                    }
                }
                "titlePg" => section.title_page = child.is_on(),
                name => self.unknown("section", name),
            }
        }
        section
    }
}

fn parse_columns(elem: &XmlElement) -> Columns {
    let mut columns = Columns {
        count: elem.int_attr("num").map(|v| v as u32).unwrap_or(1),
        separator: elem.bool_attr("sep", false),
        equal_width: elem.bool_attr("equalWidth", true),
        ..Default::default()
    };
    if let Some(space) = elem
        .attr("space")
        .and_then(|v| to_points(v, LengthUsage::DXA))
    {
        columns.space = space;
    }
    for col in elem.elements().filter(|c| c.local_name == "col") {
        columns.columns.push(ColumnSpec {
            width: col
                .attr("w")
                .and_then(|v| to_points(v, LengthUsage::DXA))
                .unwrap_or(0.0),
            space: col
                .attr("space")
                .and_then(|v| to_points(v, LengthUsage::DXA))
                .unwrap_or(0.0),
        });
    }
    if !columns.columns.is_empty() {
        columns.count = columns.columns.len() as u32;
        columns.equal_width = false;
    }
    columns
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoRelationships, ParseOptions, Relationship};
    use std::collections::HashMap;

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    #[test]
    fn test_body_parses_paragraphs_and_tables() {
        let parser = DocumentParser::new(ParseOptions::default());
        let root = XmlElement::parse(&format!(
            r#"<w:document {NS}>
                 <w:body>
                   <w:p><w:r><w:t>first</w:t></w:r></w:p>
                   <w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
                   <w:p><w:r><w:t>last</w:t></w:r></w:p>
                 </w:body>
               </w:document>"#
        ))
        .unwrap();
        let tree = parser.parse_document(&root, &NoRelationships);
        assert_eq!(tree.body().len(), 3);
        assert!(tree.node(tree.body()[0]).is_paragraph());
        assert!(tree.node(tree.body()[1]).is_table());
        assert_eq!(tree.text_of(tree.root()), "firstcelllast");
        // The linking pass ran.
        assert_eq!(tree.parent(tree.body()[1]), Some(tree.root()));
    }

    #[test]
    fn test_body_terminal_section_attaches_to_document() {
        let parser = DocumentParser::new(ParseOptions::default());
        let root = XmlElement::parse(&format!(
            r#"<w:document {NS}>
                 <w:body>
                   <w:p/>
                   <w:sectPr>
                     <w:pgSz w:w="11906" w:h="16838"/>
                     <w:pgMar w:top="1440" w:bottom="1440" w:left="1800" w:right="1800"/>
                   </w:sectPr>
                 </w:body>
               </w:document>"#
        ))
        .unwrap();
        let tree = parser.parse_document(&root, &NoRelationships);
        let section = match &tree.node(tree.root()).kind {
            NodeKind::Document(props) => props.section.as_ref().unwrap(),
            _ => panic!("expected document root"),
        };
        // A4 in twentieths of a point.
        assert!((section.page_size.width - 595.3).abs() < 0.1);
        assert_eq!(section.margins.left, 90.0);
    }

    #[test]
    fn test_section_header_reference_resolution() {
        let parser = DocumentParser::new(ParseOptions::default());
        let mut rels = HashMap::new();
        rels.insert(
            "rId3".to_string(),
            Relationship::internal("header1.xml"),
        );
        let elem = XmlElement::parse(&format!(
            r#"<w:sectPr {NS} xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
                 <w:headerReference w:type="first" r:id="rId3"/>
                 <w:footerReference w:type="default" r:id="rId9"/>
                 <w:titlePg/>
               </w:sectPr>"#
        ))
        .unwrap();
        let section = parser.parse_section_properties(&elem, &rels);
        assert!(section.title_page);
        let header = section.header_ref(HeaderFooterKind::First).unwrap();
        assert_eq!(header.target.as_deref(), Some("header1.xml"));
        // Unresolved footer reference degrades to a bare rel id.
        let footer = section.footer_ref(HeaderFooterKind::Default).unwrap();
        assert!(footer.target.is_none());
        assert_eq!(footer.rel_id, "rId9");
    }

    #[test]
    fn test_columns_with_explicit_widths() {
        let parser = DocumentParser::new(ParseOptions::default());
        let elem = XmlElement::parse(&format!(
            r#"<w:sectPr {NS}>
                 <w:cols w:num="2" w:space="708" w:equalWidth="0">
                   <w:col w:w="3000" w:space="708"/>
                   <w:col w:w="6000"/>
                 </w:cols>
                 <w:type w:val="continuous"/>
               </w:sectPr>"#
        ))
        .unwrap();
        let section = parser.parse_section_properties(&elem, &NoRelationships);
        let columns = section.columns.unwrap();
        assert_eq!(columns.count, 2);
        assert!(!columns.equal_width);
        assert_eq!(columns.columns[0].width, 150.0);
        assert_eq!(section.section_type, Some(SectionType::Continuous));
    }

    #[test]
    fn test_parse_package_stitches_catalogs() {
        let parser = DocumentParser::new(ParseOptions::default());
        let document = XmlElement::parse(&format!(
            r#"<w:document {NS}><w:body><w:p><w:r><w:t>x</w:t></w:r></w:p></w:body></w:document>"#
        ))
        .unwrap();
        let styles = XmlElement::parse(&format!(
            r#"<w:styles {NS}>
                 <w:style w:type="paragraph" w:styleId="Base">
                   <w:rPr><w:b/></w:rPr>
                 </w:style>
                 <w:style w:type="paragraph" w:styleId="Derived">
                   <w:basedOn w:val="Base"/>
                 </w:style>
               </w:styles>"#
        ))
        .unwrap();
        let settings = XmlElement::parse(&format!(
            r#"<w:settings {NS}><w:defaultTabStop w:val="720"/></w:settings>"#
        ))
        .unwrap();

        let tree = parser.parse_package(
            PackageParts {
                document: Some(&document),
                styles: Some(&styles),
                settings: Some(&settings),
                ..Default::default()
            },
            &NoRelationships,
        );
        assert_eq!(tree.body().len(), 1);
        assert_eq!(tree.settings.default_tab_stop, 36.0);
        // The cascade was resolved on the way out.
        let derived = tree.styles.get("Derived").unwrap();
        assert_eq!(
            derived
                .ruleset("r")
                .and_then(|r| r.declarations.get("font-weight"))
                .map(String::as_str),
            Some("bold")
        );
    }

    #[test]
    fn test_document_without_body_degrades_to_empty_tree() {
        let parser = DocumentParser::new(ParseOptions::default());
        let root = XmlElement::parse(&format!(r#"<w:document {NS}/>"#)).unwrap();
        let tree = parser.parse_document(&root, &NoRelationships);
        assert!(tree.body().is_empty());
    }

    #[test]
    fn test_noisy_document_parses_with_diagnostics_enabled() {
        // Unrecognized and vendor elements must only produce diagnostics,
        // never failures, even with a subscriber collecting them.
        let _ = tracing_subscriber::fmt()
            .with_env_filter("wml_parser=debug")
            .with_test_writer()
            .try_init();
        let parser = DocumentParser::new(ParseOptions {
            debug: true,
            ..Default::default()
        });
        let root = XmlElement::parse(&format!(
            r#"<w:document {NS}>
                 <w:body>
                   <w:customXmlBlock/>
                   <w:p>
                     <w:pPr><w:vendorThing w:val="?"/></w:pPr>
                     <w:r><w:mystery/><w:t>still parsed</w:t></w:r>
                     <w:futureFeature/>
                   </w:p>
                 </w:body>
               </w:document>"#
        ))
        .unwrap();
        let tree = parser.parse_document(&root, &NoRelationships);
        assert_eq!(tree.body().len(), 1);
        assert_eq!(tree.text_of(tree.root()), "stillparsed");
    }
}
