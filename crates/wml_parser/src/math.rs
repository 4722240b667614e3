//! Math (OMML) parsing
//!
//! Math content is preserved structurally: each OMML element maps onto a
//! [`MathKind`] node and its children recurse. Rendering the structures
//! (fraction bars, radicals, n-ary operators) is the rendering
//! collaborator's job.

use crate::{DocumentParser, XmlElement};
use doc_model::{DocumentTree, MathKind, Node, NodeId, NodeKind};

/// Map an OMML local name onto a math node kind.
fn math_kind(name: &str) -> Option<MathKind> {
    Some(match name {
        "oMath" => MathKind::Math,
        "oMathPara" => MathKind::MathParagraph,
        "f" => MathKind::Fraction,
        "num" => MathKind::Numerator,
        "den" => MathKind::Denominator,
        "rad" => MathKind::Radical,
        "deg" => MathKind::Degree,
        "sSup" => MathKind::Superscript,
        "sSub" => MathKind::Subscript,
        "sup" => MathKind::SuperArgument,
        "sub" => MathKind::SubArgument,
        "e" | "lim" => MathKind::Base,
        "d" => MathKind::Delimiter,
        "nary" => MathKind::Nary,
        "func" => MathKind::Function,
        "fName" => MathKind::FunctionName,
        "groupChr" => MathKind::GroupChar,
        "m" => MathKind::Matrix,
        "mr" => MathKind::MatrixRow,
        "limLow" => MathKind::LimitLower,
        "limUpp" => MathKind::LimitUpper,
        "bar" => MathKind::Bar,
        "borderBox" => MathKind::BorderBox,
        "acc" => MathKind::Accent,
        "r" => MathKind::Run,
        _ => return None,
    })
}

impl DocumentParser {
    /// Parse a math element into a math node, recursing structurally.
    /// Returns `None` (with a diagnostic) for OMML names outside the map.
    pub(crate) fn parse_math(
        &self,
        tree: &mut DocumentTree,
        parent: NodeId,
        elem: &XmlElement,
    ) -> Option<NodeId> {
        let kind = match math_kind(&elem.local_name) {
            Some(kind) => kind,
            None => {
                self.unknown("math", &elem.local_name);
                return None;
            }
        };
        let id = tree.push_child(parent, Node::new(NodeKind::Math(kind)));
        for child in elem.elements() {
            match child.local_name.as_str() {
                // Math text is literal; no word decomposition.
                "t" => {
                    tree.push_child(id, Node::text(child.text.clone()));
                }
                // Property bags carry presentation hints this model skips.
                "rPr" | "ctrlPr" | "fPr" | "radPr" | "sSupPr" | "sSubPr" | "dPr" | "naryPr"
                | "funcPr" | "groupChrPr" | "mPr" | "limLowPr" | "limUppPr" | "barPr"
                | "borderBoxPr" | "accPr" | "oMathParaPr" => {}
                _ => {
                    self.parse_math(tree, id, child);
                }
            }
        }
        Some(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;

    const M_NS: &str = r#"xmlns:m="http://schemas.openxmlformats.org/officeDocument/2006/math""#;

    #[test]
    fn test_fraction_structure() {
        let parser = DocumentParser::new(ParseOptions::default());
        let elem = XmlElement::parse(&format!(
            r#"<m:oMath {M_NS}>
                 <m:f>
                   <m:num><m:r><m:t>1</m:t></m:r></m:num>
                   <m:den><m:r><m:t>2</m:t></m:r></m:den>
                 </m:f>
               </m:oMath>"#
        ))
        .unwrap();
        let mut tree = DocumentTree::new();
        let root = tree.root();
        let math = parser.parse_math(&mut tree, root, &elem).unwrap();

        assert!(matches!(tree.node(math).kind, NodeKind::Math(MathKind::Math)));
        let fraction = tree.children(math)[0];
        assert!(matches!(
            tree.node(fraction).kind,
            NodeKind::Math(MathKind::Fraction)
        ));
        assert_eq!(tree.text_of(fraction), "12");
    }

    #[test]
    fn test_unknown_math_element_yields_no_node() {
        let parser = DocumentParser::new(ParseOptions::default());
        let elem = XmlElement::parse(&format!(r#"<m:mystery {M_NS}/>"#)).unwrap();
        let mut tree = DocumentTree::new();
        let root = tree.root();
        assert!(parser.parse_math(&mut tree, root, &elem).is_none());
        assert_eq!(tree.children(root).len(), 0);
    }
}
