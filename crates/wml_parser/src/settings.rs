//! Settings part parsing

use crate::units::{to_points, LengthUsage};
use crate::{DocumentParser, XmlElement};
use doc_model::DocumentSettings;

impl DocumentParser {
    pub fn parse_settings(&self, root: &XmlElement) -> DocumentSettings {
        let mut settings = DocumentSettings::default();
        for child in root.elements() {
            match child.local_name.as_str() {
                "defaultTabStop" => {
                    if let Some(points) = child
                        .attr("val")
                        .and_then(|v| to_points(v, LengthUsage::DXA))
                    {
                        settings.default_tab_stop = points;
                    }
                }
                "evenAndOddHeaders" => {
                    settings.even_and_odd_headers = child.is_on();
                }
                "autoHyphenation" => {
                    settings.auto_hyphenation = child.is_on();
                }
                "footnotePr" => {
                    settings.footnote_number_format = child
                        .element("numFmt")
                        .and_then(|f| f.attr("val"))
                        .map(str::to_string);
                }
                "endnotePr" => {
                    settings.endnote_number_format = child
                        .element("numFmt")
                        .and_then(|f| f.attr("val"))
                        .map(str::to_string);
                }
                // The settings part is huge; everything else is noise to
                // this engine.
                _ => {}
            }
        }
        settings
    }
}
