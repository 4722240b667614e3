//! Generic element-tree abstraction
//!
//! The core consumes parsed XML as plain element values: named nodes with
//! ordered attributes and children. It never tokenizes raw XML itself;
//! [`XmlElement::parse`] and [`XmlElement::from_roxmltree`] are the
//! bridge the packaging collaborator (and every test) uses.

use crate::{ParseError, Result};

/// A parsed XML element. Names are local (prefix-free); the namespace
/// travels separately.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct XmlElement {
    pub local_name: String,
    pub namespace: Option<String>,
    /// Ordered (local name, value) attribute pairs.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    /// Directly-contained character data.
    pub text: String,
}

impl XmlElement {
    pub fn named(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            ..Default::default()
        }
    }

    /// Attribute value by local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn int_attr(&self, name: &str) -> Option<i64> {
        self.attr(name).and_then(|v| v.parse().ok())
    }

    pub fn float_attr(&self, name: &str) -> Option<f32> {
        self.attr(name).and_then(|v| v.parse().ok())
    }

    /// Boolean attribute with the format's absent-means-default
    /// convention: only `0`, `false`, `none` and `off` count as false.
    pub fn bool_attr(&self, name: &str, default: bool) -> bool {
        match self.attr(name) {
            Some(v) => !matches!(v, "0" | "false" | "none" | "off"),
            None => default,
        }
    }

    /// Toggle-element reading: `<b/>` is on, `<b val="false"/>` is off.
    pub fn is_on(&self) -> bool {
        self.bool_attr("val", true)
    }

    /// First child with the given local name.
    pub fn element(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.local_name == name)
    }

    /// All element children.
    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter()
    }

    /// Concatenated character data of this element and its descendants.
    pub fn text_content(&self) -> String {
        let mut out = self.text.clone();
        for child in &self.children {
            out.push_str(&child.text_content());
        }
        out
    }

    /// Whether the element asks for literal whitespace preservation.
    pub fn preserves_space(&self) -> bool {
        self.attr("space") == Some("preserve")
    }

    /// Convert a parsed roxmltree node into an element value.
    pub fn from_roxmltree(node: roxmltree::Node<'_, '_>) -> XmlElement {
        let mut element = XmlElement {
            local_name: node.tag_name().name().to_string(),
            namespace: node.tag_name().namespace().map(str::to_string),
            attributes: node
                .attributes()
                .map(|a| (a.name().to_string(), a.value().to_string()))
                .collect(),
            children: Vec::new(),
            text: String::new(),
        };
        for child in node.children() {
            if child.is_element() {
                element.children.push(Self::from_roxmltree(child));
            } else if child.is_text() {
                element.text.push_str(child.text().unwrap_or_default());
            }
        }
        element
    }

    /// Parse a raw XML string into its root element.
    pub fn parse(xml: &str) -> Result<XmlElement> {
        let document = roxmltree::Document::parse(xml).map_err(ParseError::Xml)?;
        Ok(Self::from_roxmltree(document.root_element()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    #[test]
    fn test_parse_builds_local_names() {
        let root =
            XmlElement::parse(&format!(r#"<w:p {NS}><w:r><w:t>hi</w:t></w:r></w:p>"#)).unwrap();
        assert_eq!(root.local_name, "p");
        let run = root.element("r").unwrap();
        assert_eq!(run.element("t").unwrap().text, "hi");
    }

    #[test]
    fn test_attr_by_local_name() {
        let root = XmlElement::parse(&format!(r#"<w:b {NS} w:val="false"/>"#)).unwrap();
        assert_eq!(root.attr("val"), Some("false"));
        assert!(!root.is_on());
    }

    #[test]
    fn test_bool_attr_absent_means_default() {
        let on = XmlElement::parse(&format!(r#"<w:b {NS}/>"#)).unwrap();
        assert!(on.is_on());
        let off = XmlElement::parse(&format!(r#"<w:b {NS} w:val="0"/>"#)).unwrap();
        assert!(!off.is_on());
    }

    #[test]
    fn test_preserves_space() {
        let t = XmlElement::parse(&format!(r#"<w:t {NS} xml:space="preserve"> x </w:t>"#)).unwrap();
        assert!(t.preserves_space());
        assert_eq!(t.text, " x ");
    }

    #[test]
    fn test_malformed_input_is_an_error() {
        assert!(XmlElement::parse("<w:p>").is_err());
    }

    #[test]
    fn test_text_content_recurses() {
        let root =
            XmlElement::parse(&format!(r#"<w:p {NS}><w:r><w:t>a</w:t><w:t>b</w:t></w:r></w:p>"#))
                .unwrap();
        assert_eq!(root.text_content(), "ab");
    }
}
