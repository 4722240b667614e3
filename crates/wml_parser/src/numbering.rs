//! Numbering part parsing
//!
//! Abstract definitions own the levels; the concrete-numbering list maps
//! public ids onto abstract ids (optionally overriding level start
//! values). Both are joined here into the flat catalog keyed by
//! (public id, level).

use crate::drawing::find_descendant;
use crate::properties::parse_properties_plain;
use crate::{DocumentParser, XmlElement};
use doc_model::{Declarations, LevelSuffix, NumberingCatalog, NumberingLevel};
use std::collections::HashMap;

impl DocumentParser {
    pub fn parse_numbering(&self, root: &XmlElement) -> NumberingCatalog {
        let mut catalog = NumberingCatalog::new();
        let mut abstracts: HashMap<String, Vec<NumberingLevel>> = HashMap::new();
        let mut concretes: Vec<(String, String, HashMap<u8, u32>)> = Vec::new();

        for child in root.elements() {
            match child.local_name.as_str() {
                "abstractNum" => {
                    let Some(abstract_id) = child.attr("abstractNumId") else {
                        continue;
                    };
                    let levels = child
                        .elements()
                        .filter(|c| c.local_name == "lvl")
                        .map(|lvl| self.parse_numbering_level(lvl, abstract_id))
                        .collect();
                    abstracts.insert(abstract_id.to_string(), levels);
                }
                "num" => {
                    let Some(num_id) = child.attr("numId") else {
                        continue;
                    };
                    let Some(abstract_id) = child
                        .element("abstractNumId")
                        .and_then(|a| a.attr("val"))
                    else {
                        continue;
                    };
                    let mut start_overrides = HashMap::new();
                    for level_override in
                        child.elements().filter(|c| c.local_name == "lvlOverride")
                    {
                        let Some(level) = level_override.int_attr("ilvl") else {
                            continue;
                        };
                        if let Some(start) = level_override
                            .element("startOverride")
                            .and_then(|s| s.int_attr("val"))
                        {
                            start_overrides.insert(level as u8, start as u32);
                        }
                    }
                    concretes.push((
                        num_id.to_string(),
                        abstract_id.to_string(),
                        start_overrides,
                    ));
                }
                "numPicBullet" => {
                    let Some(bullet_id) = child.attr("numPicBulletId") else {
                        continue;
                    };
                    let rel_id = find_descendant(child, "imagedata")
                        .and_then(|image| image.attr("id"))
                        .or_else(|| {
                            find_descendant(child, "blip").and_then(|blip| blip.attr("embed"))
                        });
                    if let Some(rel_id) = rel_id {
                        catalog
                            .picture_bullets
                            .insert(bullet_id.to_string(), rel_id.to_string());
                    }
                }
                name => self.unknown("numbering", name),
            }
        }

        for (num_id, abstract_id, start_overrides) in concretes {
            let Some(levels) = abstracts.get(&abstract_id) else {
                tracing::warn!(num_id, abstract_id, "abstract numbering not found");
                continue;
            };
            for template in levels {
                let mut level = template.clone();
                level.num_id = num_id.clone();
                if let Some(&start) = start_overrides.get(&level.level) {
                    level.start = start;
                }
                catalog.insert(level);
            }
        }
        catalog
    }

    fn parse_numbering_level(&self, elem: &XmlElement, abstract_id: &str) -> NumberingLevel {
        let mut level = NumberingLevel {
            abstract_id: abstract_id.to_string(),
            level: elem.int_attr("ilvl").unwrap_or(0) as u8,
            start: 1,
            ..Default::default()
        };
        for child in elem.elements() {
            match child.local_name.as_str() {
                "start" => {
                    level.start = child.int_attr("val").unwrap_or(1) as u32;
                }
                "numFmt" => {
                    level.format = child.attr("val").unwrap_or_default().to_string();
                }
                "lvlText" => {
                    level.level_text = child.attr("val").unwrap_or_default().to_string();
                }
                "suff" => {
                    level.suffix = LevelSuffix::from_token(child.attr("val").unwrap_or(""));
                }
                "lvlPicBulletId" => {
                    level.bullet_picture = child.attr("val").map(str::to_string);
                }
                "pStyle" => {
                    level.paragraph_style = child.attr("val").map(str::to_string);
                }
                "lvlJc" => {
                    if let Some(value) = child.attr("val") {
                        level
                            .paragraph_declarations
                            .insert("text-align".to_string(), value.to_string());
                    }
                }
                "pPr" => {
                    let mut declarations = Declarations::new();
                    parse_properties_plain(child, &mut declarations, &self.defaults);
                    level.paragraph_declarations.extend(declarations);
                }
                "rPr" => {
                    parse_properties_plain(child, &mut level.run_declarations, &self.defaults);
                }
                name => self.unknown("numbering-level", name),
            }
        }
        level
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ParseOptions;

    const NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#;

    fn parse(xml: &str) -> NumberingCatalog {
        let parser = DocumentParser::new(ParseOptions::default());
        parser.parse_numbering(&XmlElement::parse(xml).unwrap())
    }

    #[test]
    fn test_join_concrete_onto_abstract() {
        let catalog = parse(&format!(
            r#"<w:numbering {NS}>
                 <w:abstractNum w:abstractNumId="0">
                   <w:lvl w:ilvl="0">
                     <w:start w:val="1"/>
                     <w:numFmt w:val="decimal"/>
                     <w:lvlText w:val="%1."/>
                   </w:lvl>
                   <w:lvl w:ilvl="1">
                     <w:start w:val="1"/>
                     <w:numFmt w:val="lowerLetter"/>
                     <w:lvlText w:val="%2)"/>
                   </w:lvl>
                 </w:abstractNum>
                 <w:num w:numId="5">
                   <w:abstractNumId w:val="0"/>
                 </w:num>
               </w:numbering>"#
        ));
        let level = catalog.get("5", 0).unwrap();
        assert_eq!(level.format, "decimal");
        assert_eq!(level.level_text, "%1.");
        assert_eq!(level.abstract_id, "0");
        assert_eq!(catalog.get("5", 1).unwrap().format, "lowerLetter");
        assert!(catalog.get("0", 0).is_none(), "abstract id is not public");
    }

    #[test]
    fn test_start_override() {
        let catalog = parse(&format!(
            r#"<w:numbering {NS}>
                 <w:abstractNum w:abstractNumId="0">
                   <w:lvl w:ilvl="0"><w:start w:val="1"/><w:numFmt w:val="decimal"/></w:lvl>
                 </w:abstractNum>
                 <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
                 <w:num w:numId="2">
                   <w:abstractNumId w:val="0"/>
                   <w:lvlOverride w:ilvl="0"><w:startOverride w:val="10"/></w:lvlOverride>
                 </w:num>
               </w:numbering>"#
        ));
        assert_eq!(catalog.get("1", 0).unwrap().start, 1);
        assert_eq!(catalog.get("2", 0).unwrap().start, 10);
    }

    #[test]
    fn test_missing_abstract_degrades() {
        let catalog = parse(&format!(
            r#"<w:numbering {NS}>
                 <w:num w:numId="1"><w:abstractNumId w:val="9"/></w:num>
               </w:numbering>"#
        ));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_level_property_bags() {
        let catalog = parse(&format!(
            r#"<w:numbering {NS}>
                 <w:abstractNum w:abstractNumId="0">
                   <w:lvl w:ilvl="0">
                     <w:numFmt w:val="bullet"/>
                     <w:lvlText w:val="•"/>
                     <w:pPr><w:ind w:left="720"/></w:pPr>
                     <w:rPr><w:rFonts w:ascii="Symbol"/></w:rPr>
                   </w:lvl>
                 </w:abstractNum>
                 <w:num w:numId="1"><w:abstractNumId w:val="0"/></w:num>
               </w:numbering>"#
        ));
        let level = catalog.get("1", 0).unwrap();
        assert_eq!(
            level
                .paragraph_declarations
                .get("padding-left")
                .map(String::as_str),
            Some("36.00pt")
        );
        assert_eq!(
            level.run_declarations.get("font-family").map(String::as_str),
            Some("Symbol")
        );
    }

    #[test]
    fn test_picture_bullet_map() {
        let catalog = parse(&format!(
            r#"<w:numbering {NS} xmlns:v="urn:schemas-microsoft-com:vml">
                 <w:numPicBullet w:numPicBulletId="0">
                   <w:pict><v:shape><v:imagedata r:id="rId9" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"/></v:shape></w:pict>
                 </w:numPicBullet>
               </w:numbering>"#
        ));
        assert_eq!(
            catalog.picture_bullets.get("0").map(String::as_str),
            Some("rId9")
        );
    }
}
