//! Style part parsing
//!
//! Each style carries rulesets for the renderer plus the typed bags the
//! engine consumes. Table styles additionally decode their conditional
//! formatting blocks into extra rulesets with a selector + modifier pair
//! matching the class list the content parsers emit for `cnfStyle`.

use crate::properties::parse_properties;
use crate::{DocumentParser, XmlElement};
use doc_model::{
    Declarations, NumberingRef, ParagraphProperties, Ruleset, RunProperties, RunVerticalAlign,
    StyleCatalog, StyleDefinition, StyleTarget,
};

/// Map a conditional-formatting block type onto (selector, modifier).
fn conditional_selector(block_type: &str) -> Option<(&'static str, &'static str)> {
    Some(match block_type {
        "firstRow" => ("tr", "first-row"),
        "lastRow" => ("tr", "last-row"),
        "firstCol" => ("td", "first-col"),
        "lastCol" => ("td", "last-col"),
        "band1Vert" => ("td", "odd-col"),
        "band2Vert" => ("td", "even-col"),
        "band1Horz" => ("tr", "odd-row"),
        "band2Horz" => ("tr", "even-row"),
        "neCell" => ("td", "ne-cell"),
        "nwCell" => ("td", "nw-cell"),
        "seCell" => ("td", "se-cell"),
        "swCell" => ("td", "sw-cell"),
        _ => return None,
    })
}

impl DocumentParser {
    pub fn parse_styles(&self, root: &XmlElement) -> StyleCatalog {
        let mut catalog = StyleCatalog::new();
        for child in root.elements() {
            match child.local_name.as_str() {
                "docDefaults" => {
                    if let Some(defaults) = self.parse_document_defaults(child) {
                        catalog.insert(defaults);
                    }
                }
                "style" => catalog.insert(self.parse_style(child)),
                "latentStyles" => {}
                name => self.unknown("styles", name),
            }
        }
        catalog
    }

    /// Document-wide defaults become a synthetic style the renderer
    /// applies beneath everything else.
    fn parse_document_defaults(&self, elem: &XmlElement) -> Option<StyleDefinition> {
        let mut style = StyleDefinition::new("docDefaults");
        if let Some(run_defaults) = elem
            .element("rPrDefault")
            .and_then(|d| d.element("rPr"))
        {
            let (ruleset, props) = self.parse_run_ruleset(run_defaults, "r");
            style.rulesets.push(ruleset);
            style.run = props;
        }
        if let Some(paragraph_defaults) = elem
            .element("pPrDefault")
            .and_then(|d| d.element("pPr"))
        {
            let (ruleset, props) = self.parse_paragraph_ruleset(paragraph_defaults, "p");
            style.rulesets.push(ruleset);
            style.paragraph = props;
        }
        if style.rulesets.is_empty() {
            None
        } else {
            Some(style)
        }
    }

    fn parse_style(&self, elem: &XmlElement) -> StyleDefinition {
        let mut style = StyleDefinition::new(elem.attr("styleId").unwrap_or_default());
        style.target = elem.attr("type").and_then(StyleTarget::from_token);
        style.is_default = elem.bool_attr("default", false);
        style.custom = elem.bool_attr("customStyle", false);

        for child in elem.elements() {
            match child.local_name.as_str() {
                "name" => style.name = child.attr("val").map(str::to_string),
                "basedOn" => style.based_on = child.attr("val").map(str::to_string),
                "link" => style.linked = child.attr("val").map(str::to_string),
                "hidden" => style.hidden = child.is_on(),
                "semiHidden" => style.semi_hidden = child.is_on(),
                "pPr" => {
                    let (ruleset, props) = self.parse_paragraph_ruleset(child, "p");
                    style.rulesets.push(ruleset);
                    style.paragraph = props;
                }
                "rPr" => {
                    let (ruleset, props) = self.parse_run_ruleset(child, "r");
                    style.rulesets.push(ruleset);
                    style.run = props;
                }
                "tblPr" => style.rulesets.push(self.parse_plain_ruleset(child, "table")),
                "trPr" => style.rulesets.push(self.parse_plain_ruleset(child, "tr")),
                "tcPr" => style.rulesets.push(self.parse_plain_ruleset(child, "td")),
                "tblStylePr" => {
                    if let Some(ruleset) = self.parse_conditional_block(child) {
                        style.rulesets.push(ruleset);
                    }
                }
                "next" | "uiPriority" | "qFormat" | "unhideWhenUsed" | "rsid" | "aliases"
                | "autoRedefine" | "locked" | "personal" => {}
                name => self.unknown("style", name),
            }
        }
        style
    }

    fn parse_paragraph_ruleset(
        &self,
        elem: &XmlElement,
        target: &str,
    ) -> (Ruleset, ParagraphProperties) {
        let mut ruleset = Ruleset::new(target);
        let mut props = ParagraphProperties::default();
        parse_properties(elem, &mut ruleset.declarations, &self.defaults, |child, decl| {
            match child.local_name.as_str() {
                "pageBreakBefore" => {
                    props.page_break_before = Some(child.is_on());
                    if child.is_on() {
                        decl.insert("break-before".to_string(), "page".to_string());
                    }
                    true
                }
                "keepNext" => {
                    props.keep_next = Some(child.is_on());
                    true
                }
                "keepLines" => {
                    props.keep_lines = Some(child.is_on());
                    true
                }
                "outlineLvl" => {
                    props.outline_level = child.int_attr("val").map(|level| level as u8 + 1);
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
                _ => false,
            }
        });
        (ruleset, props)
    }

    fn parse_run_ruleset(&self, elem: &XmlElement, target: &str) -> (Ruleset, RunProperties) {
        let mut ruleset = Ruleset::new(target);
        let mut props = RunProperties::default();
        parse_properties(elem, &mut ruleset.declarations, &self.defaults, |child, _| {
            match child.local_name.as_str() {
                "vertAlign" => {
                    props.vertical_align = Some(match child.attr("val") {
                        Some("superscript") => RunVerticalAlign::Superscript,
                        Some("subscript") => RunVerticalAlign::Subscript,
                        _ => RunVerticalAlign::Baseline,
                    });
                    false
                }
                "vanish" => {
                    props.hidden = Some(child.is_on());
                    false
                }
                _ => false,
            }
        });
        (ruleset, props)
    }

    fn parse_plain_ruleset(&self, elem: &XmlElement, target: &str) -> Ruleset {
        let mut ruleset = Ruleset::new(target);
        let mut declarations = Declarations::new();
        crate::properties::parse_properties_plain(elem, &mut declarations, &self.defaults);
        ruleset.declarations = declarations;
        ruleset
    }

    /// One of up to twelve conditional blocks of a table style. All its
    /// property containers fold into a single declarations map under the
    /// block's selector + modifier.
    fn parse_conditional_block(&self, elem: &XmlElement) -> Option<Ruleset> {
        let block_type = elem.attr("type")?;
        let Some((target, modifier)) = conditional_selector(block_type) else {
            self.unknown("table-style", block_type);
            return None;
        };
        let mut ruleset = Ruleset::new(target).with_modifier(modifier);
        for container in elem.elements() {
            crate::properties::parse_properties_plain(
                container,
                &mut ruleset.declarations,
                &self.defaults,
            );
        }
        Some(ruleset)
    }
}
