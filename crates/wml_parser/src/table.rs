//! Table parsing
//!
//! Grid columns first, then rows, then cells. A cell's vertical-merge
//! state is recorded as an enum for the consumer to resolve into row
//! spans; horizontal spans are recorded as counts, never expanded into
//! phantom cells.

use crate::properties::{classes_from_cnf_mask, parse_common_property, parse_properties};
use crate::units::{convert, LengthUsage};
use crate::{DocumentParser, RelationshipResolver, XmlElement};
use doc_model::{
    Declarations, DocumentTree, Node, NodeId, NodeKind, TableCellProps, TableColumn, TableProps,
    TableRowProps, VerticalMerge,
};

impl DocumentParser {
    pub(crate) fn parse_table(
        &self,
        tree: &mut DocumentTree,
        parent: NodeId,
        elem: &XmlElement,
        rels: &dyn RelationshipResolver,
    ) -> NodeId {
        let table_id = tree.push_child(parent, Node::new(NodeKind::Table(TableProps::default())));
        let mut props = TableProps::default();
        for child in elem.elements() {
            match child.local_name.as_str() {
                "tblPr" => self.parse_table_properties(tree, table_id, child, &mut props),
                "tblGrid" => {
                    for column in child.elements().filter(|c| c.local_name == "gridCol") {
                        let width = if self.options.ignore_width {
                            None
                        } else {
                            column.attr("w").and_then(|w| convert(w, LengthUsage::DXA))
                        };
                        props.columns.push(TableColumn { width });
                    }
                }
                "tr" => self.parse_table_row(tree, table_id, child, rels),
                name => self.unknown("table", name),
            }
        }
        tree.node_mut(table_id).kind = NodeKind::Table(props);
        table_id
    }

    fn parse_table_properties(
        &self,
        tree: &mut DocumentTree,
        table_id: NodeId,
        elem: &XmlElement,
        props: &mut TableProps,
    ) {
        let mut declarations = Declarations::new();
        let mut style_id = None;

        parse_properties(elem, &mut declarations, &self.defaults, |child, decl| {
            match child.local_name.as_str() {
                "tblStyle" => {
                    style_id = child.attr("val").map(str::to_string);
                    true
                }
                "tblCellMar" => {
                    // Margins apply to every cell, not to the table box.
                    parse_common_property(child, &mut props.cell_declarations, &self.defaults);
                    true
                }
                "tblW" if self.options.ignore_width => true,
                "tblpPr" => {
                    if !self.options.ignore_table_wrap {
                        parse_floating_table(child, decl);
                    }
                    true
                }
                _ => false,
            }
        });

        let node = tree.node_mut(table_id);
        node.declarations = declarations;
        node.style_id = style_id;
    }

    fn parse_table_row(
        &self,
        tree: &mut DocumentTree,
        table_id: NodeId,
        elem: &XmlElement,
        rels: &dyn RelationshipResolver,
    ) {
        let row_id = tree.push_child(
            table_id,
            Node::new(NodeKind::TableRow(TableRowProps::default())),
        );
        let mut props = TableRowProps::default();
        for child in elem.elements() {
            match child.local_name.as_str() {
                "trPr" => {
                    let mut declarations = Declarations::new();
                    let mut class_list = Vec::new();
                    parse_properties(child, &mut declarations, &self.defaults, |prop, _| {
                        match prop.local_name.as_str() {
                            "cnfStyle" => {
                                if let Some(mask) = prop.attr("val") {
                                    class_list = classes_from_cnf_mask(mask);
                                }
                                true
                            }
                            "tblHeader" => {
                                props.is_header = prop.is_on();
                                true
                            }
                            _ => false,
                        }
                    });
                    let node = tree.node_mut(row_id);
                    node.declarations = declarations;
                    node.class_list = class_list;
                }
                "tc" => self.parse_table_cell(tree, row_id, child, rels),
                name => self.unknown("row", name),
            }
        }
        tree.node_mut(row_id).kind = NodeKind::TableRow(props);
    }

    fn parse_table_cell(
        &self,
        tree: &mut DocumentTree,
        row_id: NodeId,
        elem: &XmlElement,
        rels: &dyn RelationshipResolver,
    ) {
        let cell_id = tree.push_child(
            row_id,
            Node::new(NodeKind::TableCell(TableCellProps::default())),
        );
        let mut props = TableCellProps::default();
        for child in elem.elements() {
            match child.local_name.as_str() {
                "tcPr" => {
                    let mut declarations = Declarations::new();
                    let mut class_list = Vec::new();
                    parse_properties(child, &mut declarations, &self.defaults, |prop, _| {
                        match prop.local_name.as_str() {
                            "vMerge" => {
                                // A bare marker continues the merge above;
                                // only an explicit restart opens one.
                                props.vertical_merge = match prop.attr("val") {
                                    Some("restart") => Some(VerticalMerge::Restart),
                                    _ => Some(VerticalMerge::Continue),
                                };
                                true
                            }
                            "gridSpan" => {
                                props.grid_span =
                                    prop.int_attr("val").map(|v| v as u32).unwrap_or(1);
                                true
                            }
                            "cnfStyle" => {
                                if let Some(mask) = prop.attr("val") {
                                    class_list = classes_from_cnf_mask(mask);
                                }
                                true
                            }
                            "tcW" if self.options.ignore_width => true,
                            _ => false,
                        }
                    });
                    let node = tree.node_mut(cell_id);
                    node.declarations = declarations;
                    node.class_list = class_list;
                }
                "p" => {
                    self.parse_paragraph(tree, cell_id, child, rels);
                }
                "tbl" => {
                    self.parse_table(tree, cell_id, child, rels);
                }
                "sdt" => {
                    if let Some(content) = child.element("sdtContent") {
                        for block in content.elements() {
                            match block.local_name.as_str() {
                                "p" => {
                                    self.parse_paragraph(tree, cell_id, block, rels);
                                }
                                "tbl" => {
                                    self.parse_table(tree, cell_id, block, rels);
                                }
                                name => self.unknown("cell", name),
                            }
                        }
                    }
                }
                name => self.unknown("cell", name),
            }
        }
        tree.node_mut(cell_id).kind = NodeKind::TableCell(props);
    }
}

/// Floating-table placement (`tblpPr`).
fn parse_floating_table(elem: &XmlElement, declarations: &mut Declarations) {
    let float = match elem.attr("tblpXSpec") {
        Some("right") => "right",
        _ => "left",
    };
    declarations.insert("float".to_string(), float.to_string());
    if let Some(x) = elem.attr("tblpX").and_then(|v| convert(v, LengthUsage::DXA)) {
        declarations.insert("margin-left".to_string(), x);
    }
    if let Some(y) = elem.attr("tblpY").and_then(|v| convert(v, LengthUsage::DXA)) {
        declarations.insert("margin-top".to_string(), y);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoRelationships, ParseOptions};

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn parse_table_xml(xml: &str, options: ParseOptions) -> (DocumentTree, NodeId) {
        let parser = DocumentParser::new(options);
        let elem = XmlElement::parse(xml).unwrap();
        let mut tree = DocumentTree::new();
        let root = tree.root();
        let table = parser.parse_table(&mut tree, root, &elem, &NoRelationships);
        (tree, table)
    }

    const SIMPLE_TABLE: &str = r#"
        <w:tbl NSDECL>
          <w:tblPr>
            <w:tblStyle w:val="TableGrid"/>
            <w:tblW w:w="5000" w:type="pct"/>
            <w:tblCellMar><w:left w:w="108" w:type="dxa"/></w:tblCellMar>
          </w:tblPr>
          <w:tblGrid><w:gridCol w:w="2880"/><w:gridCol w:w="2880"/></w:tblGrid>
          <w:tr>
            <w:trPr><w:tblHeader/></w:trPr>
            <w:tc>
              <w:tcPr><w:vMerge w:val="restart"/><w:gridSpan w:val="2"/></w:tcPr>
              <w:p><w:r><w:t>head</w:t></w:r></w:p>
            </w:tc>
          </w:tr>
          <w:tr>
            <w:tc>
              <w:tcPr><w:vMerge/></w:tcPr>
              <w:p><w:r><w:t>body</w:t></w:r></w:p>
            </w:tc>
          </w:tr>
        </w:tbl>"#;

    fn simple_table() -> String {
        SIMPLE_TABLE.replace("NSDECL", NS)
    }

    #[test]
    fn test_grid_and_style() {
        let (tree, table) = parse_table_xml(&simple_table(), ParseOptions::default());
        let node = tree.node(table);
        assert_eq!(node.style_id.as_deref(), Some("TableGrid"));
        assert_eq!(node.declarations.get("width").map(String::as_str), Some("100.00%"));
        match &node.kind {
            NodeKind::Table(props) => {
                assert_eq!(props.columns.len(), 2);
                assert_eq!(props.columns[0].width.as_deref(), Some("144.00pt"));
                assert_eq!(
                    props.cell_declarations.get("padding-left").map(String::as_str),
                    Some("5.40pt")
                );
            }
            _ => panic!("expected table"),
        }
    }

    #[test]
    fn test_vertical_merge_recorded_not_expanded() {
        let (tree, table) = parse_table_xml(&simple_table(), ParseOptions::default());
        let rows = tree.children(table);
        assert_eq!(rows.len(), 2);
        let first_cell = tree.children(rows[0])[0];
        let second_cell = tree.children(rows[1])[0];
        match &tree.node(first_cell).kind {
            NodeKind::TableCell(props) => {
                assert_eq!(props.vertical_merge, Some(VerticalMerge::Restart));
                assert_eq!(props.grid_span, 2);
            }
            _ => panic!("expected cell"),
        }
        match &tree.node(second_cell).kind {
            NodeKind::TableCell(props) => {
                assert_eq!(props.vertical_merge, Some(VerticalMerge::Continue));
                assert_eq!(props.grid_span, 1);
            }
            _ => panic!("expected cell"),
        }
    }

    #[test]
    fn test_header_row_flag() {
        let (tree, table) = parse_table_xml(&simple_table(), ParseOptions::default());
        let rows = tree.children(table);
        match &tree.node(rows[0]).kind {
            NodeKind::TableRow(props) => assert!(props.is_header),
            _ => panic!("expected row"),
        }
        match &tree.node(rows[1]).kind {
            NodeKind::TableRow(props) => assert!(!props.is_header),
            _ => panic!("expected row"),
        }
    }

    #[test]
    fn test_ignore_width_drops_widths() {
        let options = ParseOptions {
            ignore_width: true,
            ..Default::default()
        };
        let (tree, table) = parse_table_xml(&simple_table(), options);
        let node = tree.node(table);
        assert!(node.declarations.get("width").is_none());
        match &node.kind {
            NodeKind::Table(props) => assert!(props.columns[0].width.is_none()),
            _ => panic!("expected table"),
        }
    }

    #[test]
    fn test_cell_content_parses() {
        let (tree, table) = parse_table_xml(&simple_table(), ParseOptions::default());
        assert_eq!(tree.text_of(table), "headbody");
    }

    #[test]
    fn test_floating_table_suppressed_by_option() {
        let xml = format!(
            r#"<w:tbl {NS}>
                 <w:tblPr><w:tblpPr w:tblpXSpec="right" w:tblpY="720"/></w:tblPr>
                 <w:tr><w:tc><w:p/></w:tc></w:tr>
               </w:tbl>"#
        );
        let (tree, table) = parse_table_xml(&xml, ParseOptions::default());
        assert_eq!(
            tree.node(table).declarations.get("float").map(String::as_str),
            Some("right")
        );

        let options = ParseOptions {
            ignore_table_wrap: true,
            ..Default::default()
        };
        let (tree, table) = parse_table_xml(&xml, options);
        assert!(tree.node(table).declarations.get("float").is_none());
    }
}
