//! Shared property extraction
//!
//! One routine walks a property-container element (`pPr`, `rPr`, `tblPr`,
//! `trPr`, `tcPr`, numbering-level bags, style bags) and folds each
//! recognized child into a flat declarations map. Element-specific callers
//! intercept children they own (style references, numbering bindings,
//! terminal section properties) before the shared table runs, which lets
//! the table serve every container kind without duplication.

use crate::units::{convert, LengthUsage};
use crate::XmlElement;
use doc_model::Declarations;

/// Themeable defaults for the format's `auto` color values. Threaded as a
/// value through every parse call so parsing stays reentrant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorDefaults {
    pub auto_color: String,
    pub auto_shading: String,
    pub auto_border: String,
}

impl Default for ColorDefaults {
    fn default() -> Self {
        Self {
            auto_color: "black".to_string(),
            auto_shading: "white".to_string(),
            auto_border: "black".to_string(),
        }
    }
}

/// Walk a property container. `intercept` sees every child first and
/// returns `true` to claim it; unclaimed children go through the shared
/// table. Unrecognized children are a diagnostic, never an error.
pub fn parse_properties<F>(
    container: &XmlElement,
    declarations: &mut Declarations,
    defaults: &ColorDefaults,
    mut intercept: F,
) where
    F: FnMut(&XmlElement, &mut Declarations) -> bool,
{
    for child in container.elements() {
        if intercept(child, declarations) {
            continue;
        }
        if !parse_common_property(child, declarations, defaults) {
            tracing::debug!(element = %child.local_name, "unrecognized property");
        }
    }
}

/// Shared walk with no caller-specific interception.
pub fn parse_properties_plain(
    container: &XmlElement,
    declarations: &mut Declarations,
    defaults: &ColorDefaults,
) {
    parse_properties(container, declarations, defaults, |_, _| false);
}

fn set(declarations: &mut Declarations, key: &str, value: impl Into<String>) {
    declarations.insert(key.to_string(), value.into());
}

fn set_toggle(declarations: &mut Declarations, elem: &XmlElement, key: &str, on: &str, off: &str) {
    let value = if elem.is_on() { on } else { off };
    set(declarations, key, value);
}

/// Fold one recognized property child into the declarations map. Returns
/// `false` for unrecognized names.
pub fn parse_common_property(
    elem: &XmlElement,
    declarations: &mut Declarations,
    defaults: &ColorDefaults,
) -> bool {
    match elem.local_name.as_str() {
        "b" => set_toggle(declarations, elem, "font-weight", "bold", "normal"),
        "i" => set_toggle(declarations, elem, "font-style", "italic", "normal"),
        "caps" => set_toggle(declarations, elem, "text-transform", "uppercase", "none"),
        "smallCaps" => set_toggle(declarations, elem, "font-variant", "small-caps", "none"),
        "strike" | "dstrike" => {
            set_toggle(declarations, elem, "text-decoration", "line-through", "none")
        }
        "vanish" => {
            if elem.is_on() {
                set(declarations, "display", "none");
            }
        }
        "sz" => {
            if let Some(size) = elem.attr("val").and_then(|v| convert(v, LengthUsage::FONT_SIZE)) {
                set(declarations, "font-size", size);
            }
        }
        "color" => {
            if let Some(value) = elem.attr("val") {
                set(declarations, "color", color_value(value, &defaults.auto_color));
            }
        }
        "highlight" => {
            if let Some(value) = elem.attr("val") {
                if value != "none" {
                    set(declarations, "background-color", value);
                }
            }
        }
        "shd" => {
            let fill = elem.attr("fill").unwrap_or("auto");
            set(
                declarations,
                "background-color",
                color_value(fill, &defaults.auto_shading),
            );
        }
        "u" => parse_underline(elem, declarations, defaults),
        "rFonts" => {
            if let Some(fonts) = compose_fonts(elem) {
                set(declarations, "font-family", fonts);
            }
        }
        "vertAlign" => match elem.attr("val") {
            Some("superscript") => set(declarations, "vertical-align", "super"),
            Some("subscript") => set(declarations, "vertical-align", "sub"),
            _ => set(declarations, "vertical-align", "baseline"),
        },
        "jc" => {
            if let Some(value) = elem.attr("val") {
                set(declarations, "text-align", alignment_value(value));
            }
        }
        "ind" => parse_indentation(elem, declarations),
        "spacing" => parse_spacing(elem, declarations),
        "tabs" => parse_tab_stops(elem, declarations),
        "pBdr" | "tblBorders" | "tcBorders" => parse_borders(elem, declarations, defaults),
        "bdr" => {
            if let Some(border) = border_declaration(elem, defaults) {
                set(declarations, "border", border);
            }
        }
        "tblCellMar" | "tcMar" => parse_cell_margins(elem, declarations),
        "tblW" | "tcW" => {
            if let Some(width) = parse_measure(elem) {
                set(declarations, "width", width);
            }
        }
        "tblInd" => {
            if let Some(indent) = parse_measure(elem) {
                set(declarations, "margin-left", indent);
            }
        }
        "tblLayout" => {
            if elem.attr("type") == Some("fixed") {
                set(declarations, "table-layout", "fixed");
            }
        }
        "trHeight" => parse_row_height(elem, declarations),
        "vAlign" => {
            let value = match elem.attr("val") {
                Some("center") => "middle",
                Some("bottom") => "bottom",
                _ => "top",
            };
            set(declarations, "vertical-align", value);
        }
        // Recognized but intentionally without a declaration mapping.
        "bCs" | "iCs" | "szCs" | "lang" | "noProof" | "kern" | "webHidden" | "widowControl"
        | "tblLook" | "rtl" | "contextualSpacing" | "suppressAutoHyphens" => {}
        _ => return false,
    }
    true
}

// =============================================================================
// Value helpers
// =============================================================================

/// Resolve a color token: `auto` maps to the themeable default, a bare hex
/// sextet gets its `#`, named colors pass through.
pub fn color_value(value: &str, auto: &str) -> String {
    if value == "auto" {
        auto.to_string()
    } else if value.len() == 6 && value.chars().all(|c| c.is_ascii_hexdigit()) {
        format!("#{value}")
    } else {
        value.to_string()
    }
}

fn alignment_value(value: &str) -> &'static str {
    match value {
        "start" | "left" => "left",
        "end" | "right" => "right",
        "center" => "center",
        _ => "justify",
    }
}

/// Collapse the format's ~15 underline variants onto the six families the
/// renderer supports.
fn underline_family(value: &str) -> &'static str {
    match value {
        "single" | "words" | "thick" => "solid",
        "double" => "double",
        "dotted" | "dottedHeavy" => "dotted",
        "dash" | "dashedHeavy" | "dashLong" | "dashLongHeavy" | "dotDash" | "dashDotHeavy"
        | "dotDotDash" | "dashDotDotHeavy" => "dashed",
        "wave" | "wavyHeavy" | "wavyDouble" => "wavy",
        _ => "none",
    }
}

fn parse_underline(elem: &XmlElement, declarations: &mut Declarations, defaults: &ColorDefaults) {
    let family = underline_family(elem.attr("val").unwrap_or("none"));
    if family == "none" {
        set(declarations, "text-decoration", "none");
        return;
    }
    set(declarations, "text-decoration", "underline");
    set(declarations, "text-decoration-style", family);
    if let Some(color) = elem.attr("color") {
        set(
            declarations,
            "text-decoration-color",
            color_value(color, &defaults.auto_color),
        );
    }
}

/// Compose the font list from the four script slots, deduplicated in slot
/// order.
fn compose_fonts(elem: &XmlElement) -> Option<String> {
    let mut fonts: Vec<&str> = Vec::new();
    for slot in ["ascii", "hAnsi", "eastAsia", "cs"] {
        if let Some(font) = elem.attr(slot) {
            if !font.is_empty() && !fonts.contains(&font) {
                fonts.push(font);
            }
        }
    }
    if fonts.is_empty() {
        None
    } else {
        Some(fonts.join(", "))
    }
}

fn parse_indentation(elem: &XmlElement, declarations: &mut Declarations) {
    if let Some(left) = elem.attr("left").or_else(|| elem.attr("start")) {
        if let Some(value) = convert(left, LengthUsage::DXA) {
            set(declarations, "padding-left", value);
        }
    }
    if let Some(right) = elem.attr("right").or_else(|| elem.attr("end")) {
        if let Some(value) = convert(right, LengthUsage::DXA) {
            set(declarations, "padding-right", value);
        }
    }
    if let Some(first) = elem.attr("firstLine") {
        if let Some(value) = convert(first, LengthUsage::DXA) {
            set(declarations, "text-indent", value);
        }
    }
    if let Some(hanging) = elem.attr("hanging") {
        if let Some(points) = crate::units::to_points(hanging, LengthUsage::DXA) {
            set(declarations, "text-indent", format!("{:.2}pt", -points));
        }
    }
}

/// `spacing` is context-sensitive: with before/after/line attributes it is
/// paragraph spacing, with a bare `val` it is letter spacing.
fn parse_spacing(elem: &XmlElement, declarations: &mut Declarations) {
    let mut paragraph_spacing = false;
    if let Some(before) = elem.attr("before") {
        if let Some(value) = convert(before, LengthUsage::DXA) {
            set(declarations, "margin-top", value);
        }
        paragraph_spacing = true;
    }
    if let Some(after) = elem.attr("after") {
        if let Some(value) = convert(after, LengthUsage::DXA) {
            set(declarations, "margin-bottom", value);
        }
        paragraph_spacing = true;
    }
    if let Some(line) = elem.attr("line") {
        paragraph_spacing = true;
        match elem.attr("lineRule") {
            // 240ths of a line.
            None | Some("auto") => {
                if let Ok(multiple) = line.parse::<f32>() {
                    set(declarations, "line-height", format!("{:.2}", multiple / 240.0));
                }
            }
            _ => {
                if let Some(value) = convert(line, LengthUsage::DXA) {
                    set(declarations, "line-height", value);
                }
            }
        }
    }
    if !paragraph_spacing {
        if let Some(value) = elem.attr("val").and_then(|v| convert(v, LengthUsage::DXA)) {
            set(declarations, "letter-spacing", value);
        }
    }
}

fn parse_tab_stops(elem: &XmlElement, declarations: &mut Declarations) {
    let stops: Vec<String> = elem
        .elements()
        .filter(|tab| tab.local_name == "tab")
        .filter_map(|tab| {
            let kind = tab.attr("val").unwrap_or("left");
            if kind == "clear" {
                return None;
            }
            let position = tab.attr("pos").and_then(|p| convert(p, LengthUsage::DXA))?;
            Some(format!("{kind} {position}"))
        })
        .collect();
    if !stops.is_empty() {
        set(declarations, "tab-stops", stops.join("; "));
    }
}

fn border_style(value: &str) -> &'static str {
    match value {
        "nil" | "none" => "none",
        "dashed" | "dashSmallGap" | "dotDash" | "dotDotDash" => "dashed",
        "dotted" => "dotted",
        "double" | "doubleWave" | "triple" => "double",
        _ => "solid",
    }
}

/// One border side as a CSS shorthand (`0.50pt solid #FF0000`).
pub fn border_declaration(elem: &XmlElement, defaults: &ColorDefaults) -> Option<String> {
    let style = border_style(elem.attr("val")?);
    if style == "none" {
        return Some("none".to_string());
    }
    let size = elem
        .attr("sz")
        .and_then(|s| convert(s, LengthUsage::BORDER))
        .unwrap_or_else(|| "0.50pt".to_string());
    let color = color_value(elem.attr("color").unwrap_or("auto"), &defaults.auto_border);
    Some(format!("{size} {style} {color}"))
}

fn parse_borders(container: &XmlElement, declarations: &mut Declarations, defaults: &ColorDefaults) {
    for side in container.elements() {
        let key = match side.local_name.as_str() {
            "top" => "border-top",
            "bottom" => "border-bottom",
            "left" | "start" => "border-left",
            "right" | "end" => "border-right",
            // Inside edges apply between cells, not to the container box.
            _ => continue,
        };
        if let Some(border) = border_declaration(side, defaults) {
            set(declarations, key, border);
        }
    }
}

fn parse_cell_margins(container: &XmlElement, declarations: &mut Declarations) {
    for side in container.elements() {
        let key = match side.local_name.as_str() {
            "top" => "padding-top",
            "bottom" => "padding-bottom",
            "left" | "start" => "padding-left",
            "right" | "end" => "padding-right",
            _ => continue,
        };
        if let Some(value) = parse_measure(side) {
            set(declarations, key, value);
        }
    }
}

/// A `w`/`type` measure: dxa, pct, or auto.
fn parse_measure(elem: &XmlElement) -> Option<String> {
    let value = elem.attr("w")?;
    match elem.attr("type") {
        Some("pct") => convert(value, LengthUsage::PERCENT),
        Some("auto") => Some("auto".to_string()),
        _ => convert(value, LengthUsage::DXA),
    }
}

/// Row height: `exact` fixes the height, everything else is a minimum.
fn parse_row_height(elem: &XmlElement, declarations: &mut Declarations) {
    if let Some(value) = elem.attr("val").and_then(|v| convert(v, LengthUsage::DXA)) {
        let key = match elem.attr("hRule") {
            Some("exact") => "height",
            _ => "min-height",
        };
        set(declarations, key, value);
    }
}

// =============================================================================
// Conditional table formatting
// =============================================================================

const CNF_CLASSES: [&str; 12] = [
    "first-row",
    "last-row",
    "first-col",
    "last-col",
    "odd-col",
    "even-col",
    "odd-row",
    "even-row",
    "ne-cell",
    "nw-cell",
    "se-cell",
    "sw-cell",
];

/// Decode the conditional-formatting bit mask (`cnfStyle`) into a class
/// list; each set bit enables one positional class.
pub fn classes_from_cnf_mask(mask: &str) -> Vec<String> {
    mask.chars()
        .zip(CNF_CLASSES)
        .filter(|(bit, _)| *bit == '1')
        .map(|(_, class)| class.to_string())
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
