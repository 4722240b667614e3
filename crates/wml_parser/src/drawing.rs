//! Drawing and legacy vector-graphics parsing
//!
//! Drawings come in two placements: inline (flows with the text) and
//! anchored (floats relative to margin, page or column). Anchored
//! drawings carry a wrap policy; tight and through wraps additionally
//! carry an outline polygon whose source coordinates live in a fixed
//! 21600x21600 unit square and must be rescaled to the real extent.

use crate::units::{rotation_degrees, to_points, LengthUsage};
use crate::{DocumentParser, RelationshipResolver, XmlElement};
use doc_model::{
    Declarations, DocumentTree, DrawingProps, ImageProps, Node, NodeId, NodeKind, Point, VmlProps,
    WrapSide, WrapType,
};

/// Side length of the wrap-polygon source coordinate space.
const POLYGON_SPACE: f32 = 21600.0;

#[derive(Debug, Clone, Copy, PartialEq)]
enum HorizontalAlign {
    Left,
    Center,
    Right,
    Offset,
}

impl DocumentParser {
    pub(crate) fn parse_drawing(
        &self,
        tree: &mut DocumentTree,
        parent: NodeId,
        elem: &XmlElement,
        rels: &dyn RelationshipResolver,
    ) {
        for child in elem.elements() {
            match child.local_name.as_str() {
                "inline" => self.parse_drawing_placement(tree, parent, child, rels, true),
                "anchor" => {
                    let inline = self.options.ignore_image_wrap;
                    self.parse_drawing_placement(tree, parent, child, rels, inline);
                }
                name => self.unknown("drawing", name),
            }
        }
    }

    fn parse_drawing_placement(
        &self,
        tree: &mut DocumentTree,
        parent: NodeId,
        elem: &XmlElement,
        rels: &dyn RelationshipResolver,
        inline: bool,
    ) {
        // Rendered box: declared extent plus effect-extent padding.
        let (mut width, mut height) = extent_points(elem);
        let rotation = find_rotation(elem);
        if rotation != 0.0 {
            let (w, h) = rotated_bounds(width, height, rotation);
            width = w;
            height = h;
        }

        let mut props = DrawingProps {
            inline,
            box_width: width,
            box_height: height,
            ..Default::default()
        };
        let mut declarations = Declarations::new();
        declarations.insert("width".to_string(), format!("{width:.2}pt"));
        declarations.insert("height".to_string(), format!("{height:.2}pt"));

        if !inline {
            let (offset_x, align) = horizontal_position(elem);
            let offset_y = vertical_offset(elem);
            let (wrap, side, polygon) = wrap_policy(elem);
            props.wrap = wrap;
            props.wrap_side = side;
            self.apply_wrap_recipe(
                &mut declarations,
                elem,
                wrap,
                side,
                align,
                offset_x,
                offset_y,
            );
            if let Some(source) = polygon {
                let scaled = scale_polygon(&source, width, height, side, align);
                declarations.insert("shape-outside".to_string(), polygon_value(&scaled));
                props.wrap_polygon = Some(translate_polygon(&scaled, offset_x, offset_y));
            }
        }

        let drawing_id = tree.push_child(parent, Node::new(NodeKind::Drawing(props)));
        tree.node_mut(drawing_id).declarations = declarations;

        if let Some(rel_id) = find_image_reference(elem) {
            if rels.resolve(&rel_id).is_none() {
                tracing::debug!(rel_id, "image relationship not resolvable yet");
            }
            tree.push_child(
                drawing_id,
                Node::new(NodeKind::Image(ImageProps {
                    rel_id: Some(rel_id),
                })),
            );
        }
    }

    /// Positioning recipe keyed by wrap type, horizontal alignment and
    /// wrap side. Each combination gets its own offset/margin formula.
    #[allow(clippy::too_many_arguments)]
    fn apply_wrap_recipe(
        &self,
        declarations: &mut Declarations,
        elem: &XmlElement,
        wrap: Option<WrapType>,
        side: WrapSide,
        align: HorizontalAlign,
        offset_x: f32,
        offset_y: f32,
    ) {
        match wrap {
            // No wrap: the drawing sits at its absolute anchor position
            // and text ignores it entirely.
            None | Some(WrapType::None) => {
                declarations.insert("position".to_string(), "absolute".to_string());
                declarations.insert("left".to_string(), format!("{offset_x:.2}pt"));
                declarations.insert("top".to_string(), format!("{offset_y:.2}pt"));
            }
            // Text above and below only: a full-width block whose
            // horizontal placement comes from alignment or offset.
            Some(WrapType::TopAndBottom) => {
                declarations.insert("display".to_string(), "block".to_string());
                declarations.insert("clear".to_string(), "both".to_string());
                match align {
                    HorizontalAlign::Left => {
                        declarations.insert("margin-right".to_string(), "auto".to_string());
                    }
                    HorizontalAlign::Right => {
                        declarations.insert("margin-left".to_string(), "auto".to_string());
                    }
                    HorizontalAlign::Center => {
                        declarations.insert("margin-left".to_string(), "auto".to_string());
                        declarations.insert("margin-right".to_string(), "auto".to_string());
                    }
                    HorizontalAlign::Offset => {
                        declarations.insert("margin-left".to_string(), format!("{offset_x:.2}pt"));
                    }
                }
                declarations.insert("margin-top".to_string(), format!("{offset_y:.2}pt"));
            }
            // Square/tight/through: a float whose side is chosen from the
            // wrap side first, the alignment second; text distances
            // become margins on the text-facing sides.
            Some(WrapType::Square) | Some(WrapType::Tight) | Some(WrapType::Through) => {
                let float_right =
                    side == WrapSide::Left || align == HorizontalAlign::Right;
                declarations.insert(
                    "float".to_string(),
                    if float_right { "right" } else { "left" }.to_string(),
                );
                let dist_l = emu_attr(elem, "distL");
                let dist_r = emu_attr(elem, "distR");
                let dist_t = emu_attr(elem, "distT");
                let dist_b = emu_attr(elem, "distB");
                if float_right {
                    declarations.insert("margin-left".to_string(), format!("{dist_l:.2}pt"));
                } else {
                    declarations.insert("margin-right".to_string(), format!("{dist_r:.2}pt"));
                    if align == HorizontalAlign::Offset {
                        declarations.insert("margin-left".to_string(), format!("{offset_x:.2}pt"));
                    }
                }
                declarations.insert("margin-top".to_string(), format!("{dist_t:.2}pt"));
                declarations.insert("margin-bottom".to_string(), format!("{dist_b:.2}pt"));
            }
        }
    }

    /// Legacy vector graphics (`pict`): presentation attributes become
    /// declarations, nested image data becomes an image child.
    pub(crate) fn parse_vml(&self, tree: &mut DocumentTree, parent: NodeId, elem: &XmlElement) {
        for child in elem.elements() {
            match child.local_name.as_str() {
                "shape" | "rect" | "oval" | "line" | "roundrect" | "group" => {
                    let shape_id = tree.push_child(
                        parent,
                        Node::new(NodeKind::VmlElement(VmlProps {
                            tag: child.local_name.clone(),
                            stroke: child.attr("strokecolor").map(str::to_string),
                            fill: child.attr("fillcolor").map(str::to_string),
                        })),
                    );
                    if let Some(style) = child.attr("style") {
                        let declarations = &mut tree.node_mut(shape_id).declarations;
                        for pair in style.split(';') {
                            if let Some((key, value)) = pair.split_once(':') {
                                declarations
                                    .insert(key.trim().to_string(), value.trim().to_string());
                            }
                        }
                    }
                    for grandchild in child.elements() {
                        if grandchild.local_name == "imagedata" {
                            tree.push_child(
                                shape_id,
                                Node::new(NodeKind::Image(ImageProps {
                                    rel_id: grandchild.attr("id").map(str::to_string),
                                })),
                            );
                        }
                    }
                }
                "shapetype" => {}
                name => self.unknown("vml", name),
            }
        }
    }
}

// =============================================================================
// Geometry helpers
// =============================================================================

fn emu_attr(elem: &XmlElement, name: &str) -> f32 {
    elem.attr(name)
        .and_then(|v| to_points(v, LengthUsage::EMU))
        .unwrap_or(0.0)
}

/// Declared extent plus effect-extent padding, in points.
fn extent_points(elem: &XmlElement) -> (f32, f32) {
    let (mut width, mut height) = match elem.element("extent") {
        Some(extent) => (emu_attr(extent, "cx"), emu_attr(extent, "cy")),
        None => (0.0, 0.0),
    };
    if let Some(effect) = elem.element("effectExtent") {
        width += emu_attr(effect, "l") + emu_attr(effect, "r");
        height += emu_attr(effect, "t") + emu_attr(effect, "b");
    }
    (width, height)
}

/// Bounding box of a w x h rectangle rotated by `degrees`.
fn rotated_bounds(width: f32, height: f32, degrees: f32) -> (f32, f32) {
    let radians = degrees.to_radians();
    let (sin, cos) = (radians.sin().abs(), radians.cos().abs());
    (width * cos + height * sin, width * sin + height * cos)
}

/// Rotation in degrees from the shape transform, 0 when absent.
fn find_rotation(elem: &XmlElement) -> f32 {
    find_descendant(elem, "xfrm")
        .and_then(|xfrm| xfrm.attr("rot"))
        .and_then(rotation_degrees)
        .unwrap_or(0.0)
}

pub(crate) fn find_descendant<'a>(elem: &'a XmlElement, name: &str) -> Option<&'a XmlElement> {
    for child in elem.elements() {
        if child.local_name == name {
            return Some(child);
        }
        if let Some(found) = find_descendant(child, name) {
            return Some(found);
        }
    }
    None
}

fn horizontal_position(elem: &XmlElement) -> (f32, HorizontalAlign) {
    if let Some(position) = elem.element("positionH") {
        if let Some(offset) = position.element("posOffset") {
            return (
                to_points(&offset.text, LengthUsage::EMU).unwrap_or(0.0),
                HorizontalAlign::Offset,
            );
        }
        if let Some(align) = position.element("align") {
            return (
                0.0,
                match align.text.trim() {
                    "right" => HorizontalAlign::Right,
                    "center" => HorizontalAlign::Center,
                    _ => HorizontalAlign::Left,
                },
            );
        }
    }
    (0.0, HorizontalAlign::Left)
}

fn vertical_offset(elem: &XmlElement) -> f32 {
    elem.element("positionV")
        .and_then(|position| position.element("posOffset"))
        .and_then(|offset| to_points(&offset.text, LengthUsage::EMU))
        .unwrap_or(0.0)
}

fn wrap_side_from(elem: &XmlElement) -> WrapSide {
    match elem.attr("wrapText") {
        Some("left") => WrapSide::Left,
        Some("right") => WrapSide::Right,
        Some("largest") => WrapSide::Largest,
        _ => WrapSide::Both,
    }
}

type PolygonSource = Vec<(f32, f32)>;

/// The wrap policy: type, side, and the raw polygon for tight/through.
fn wrap_policy(elem: &XmlElement) -> (Option<WrapType>, WrapSide, Option<PolygonSource>) {
    for child in elem.elements() {
        let wrap = match child.local_name.as_str() {
            "wrapNone" => Some(WrapType::None),
            "wrapTopAndBottom" => Some(WrapType::TopAndBottom),
            "wrapSquare" => Some(WrapType::Square),
            "wrapTight" => Some(WrapType::Tight),
            "wrapThrough" => Some(WrapType::Through),
            _ => None,
        };
        if let Some(wrap) = wrap {
            let side = wrap_side_from(child);
            let polygon = child.element("wrapPolygon").map(polygon_points);
            return (Some(wrap), side, polygon);
        }
    }
    (None, WrapSide::Both, None)
}

/// Collect `start`/`lineTo` points in the 21600-unit source space.
fn polygon_points(polygon: &XmlElement) -> PolygonSource {
    polygon
        .elements()
        .filter(|p| p.local_name == "start" || p.local_name == "lineTo")
        .map(|p| {
            (
                p.float_attr("x").unwrap_or(0.0),
                p.float_attr("y").unwrap_or(0.0),
            )
        })
        .collect()
}

/// Rescale a source polygon to the actual extent. Four variants: identity
/// for a left-floated box (text wraps right), x-mirrored when the box
/// floats right (text wraps left), and the two symmetric-side cases
/// (both/largest) which keep the source orientation.
fn scale_polygon(
    source: &[(f32, f32)],
    width: f32,
    height: f32,
    side: WrapSide,
    align: HorizontalAlign,
) -> Vec<Point> {
    let mirror = side == WrapSide::Left || align == HorizontalAlign::Right;
    source
        .iter()
        .map(|&(x, y)| {
            let sx = x * width / POLYGON_SPACE;
            Point {
                x: if mirror { width - sx } else { sx },
                y: y * height / POLYGON_SPACE,
            }
        })
        .collect()
}

fn translate_polygon(points: &[Point], dx: f32, dy: f32) -> Vec<Point> {
    points
        .iter()
        .map(|p| Point {
            x: p.x + dx,
            y: p.y + dy,
        })
        .collect()
}

fn polygon_value(points: &[Point]) -> String {
    let coords: Vec<String> = points
        .iter()
        .map(|p| format!("{:.2}pt {:.2}pt", p.x, p.y))
        .collect();
    format!("polygon({})", coords.join(", "))
}

/// Relationship id of the first embedded picture.
fn find_image_reference(elem: &XmlElement) -> Option<String> {
    find_descendant(elem, "blip")
        .and_then(|blip| blip.attr("embed"))
        .map(str::to_string)
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{NoRelationships, ParseOptions};

    const NS: &str = concat!(
        r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
        r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
        r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main""#
    );

    fn parse_drawing_xml(xml: &str, options: ParseOptions) -> (DocumentTree, NodeId) {
        let parser = DocumentParser::new(options);
        let elem = XmlElement::parse(xml).unwrap();
        let mut tree = DocumentTree::new();
        let root = tree.root();
        parser.parse_drawing(&mut tree, root, &elem, &NoRelationships);
        let drawing = tree.children(root)[0];
        (tree, drawing)
    }

    #[test]
    fn test_inline_extent_with_effect_padding() {
        let (tree, drawing) = parse_drawing_xml(
            &format!(
                r#"<w:drawing {NS}>
                     <wp:inline>
                       <wp:extent cx="914400" cy="457200"/>
                       <wp:effectExtent l="12700" t="0" r="12700" b="0"/>
                     </wp:inline>
                   </w:drawing>"#
            ),
            ParseOptions::default(),
        );
        match &tree.node(drawing).kind {
            NodeKind::Drawing(props) => {
                assert!(props.inline);
                assert!((props.box_width - 74.0).abs() < 0.01);
                assert!((props.box_height - 36.0).abs() < 0.01);
            }
            _ => panic!("expected drawing"),
        }
    }

    #[test]
    fn test_rotation_grows_bounding_box() {
        let (tree, drawing) = parse_drawing_xml(
            &format!(
                r#"<w:drawing {NS}>
                     <wp:inline>
                       <wp:extent cx="1270000" cy="635000"/>
                       <a:graphic><a:graphicData><a:xfrm rot="5400000"/></a:graphicData></a:graphic>
                     </wp:inline>
                   </w:drawing>"#
            ),
            ParseOptions::default(),
        );
        // 90 degrees swaps the axes: 100pt x 50pt becomes 50pt x 100pt.
        match &tree.node(drawing).kind {
            NodeKind::Drawing(props) => {
                assert!((props.box_width - 50.0).abs() < 0.01);
                assert!((props.box_height - 100.0).abs() < 0.01);
            }
            _ => panic!("expected drawing"),
        }
    }

    #[test]
    fn test_anchored_square_wrap_floats() {
        let (tree, drawing) = parse_drawing_xml(
            &format!(
                r#"<w:drawing {NS}>
                     <wp:anchor distT="0" distB="0" distL="114300" distR="114300">
                       <wp:extent cx="914400" cy="914400"/>
                       <wp:positionH relativeFrom="margin"><wp:align>right</wp:align></wp:positionH>
                       <wp:wrapSquare wrapText="bothSides"/>
                     </wp:anchor>
                   </w:drawing>"#
            ),
            ParseOptions::default(),
        );
        let node = tree.node(drawing);
        assert_eq!(node.declarations.get("float").map(String::as_str), Some("right"));
        match &node.kind {
            NodeKind::Drawing(props) => {
                assert!(!props.inline);
                assert_eq!(props.wrap, Some(WrapType::Square));
            }
            _ => panic!("expected drawing"),
        }
    }

    #[test]
    fn test_tight_wrap_polygon_rescaled() {
        let (tree, drawing) = parse_drawing_xml(
            &format!(
                r#"<w:drawing {NS}>
                     <wp:anchor>
                       <wp:extent cx="1270000" cy="1270000"/>
                       <wp:positionH relativeFrom="column"><wp:posOffset>635000</wp:posOffset></wp:positionH>
                       <wp:positionV relativeFrom="paragraph"><wp:posOffset>0</wp:posOffset></wp:positionV>
                       <wp:wrapTight wrapText="bothSides">
                         <wp:wrapPolygon>
                           <wp:start x="0" y="0"/>
                           <wp:lineTo x="21600" y="0"/>
                           <wp:lineTo x="21600" y="21600"/>
                           <wp:lineTo x="0" y="21600"/>
                         </wp:wrapPolygon>
                       </wp:wrapTight>
                     </wp:anchor>
                   </w:drawing>"#
            ),
            ParseOptions::default(),
        );
        let node = tree.node(drawing);
        // 1270000 EMU = 100pt, so the unit square scales to 100x100pt.
        assert_eq!(
            node.declarations.get("shape-outside").map(String::as_str),
            Some("polygon(0.00pt 0.00pt, 100.00pt 0.00pt, 100.00pt 100.00pt, 0.00pt 100.00pt)")
        );
        match &node.kind {
            NodeKind::Drawing(props) => {
                // Stored polygon is translated by the 50pt anchor offset.
                let polygon = props.wrap_polygon.as_ref().unwrap();
                assert!((polygon[1].x - 150.0).abs() < 0.01);
            }
            _ => panic!("expected drawing"),
        }
    }

    #[test]
    fn test_ignore_image_wrap_forces_inline() {
        let options = ParseOptions {
            ignore_image_wrap: true,
            ..Default::default()
        };
        let (tree, drawing) = parse_drawing_xml(
            &format!(
                r#"<w:drawing {NS}>
                     <wp:anchor>
                       <wp:extent cx="914400" cy="914400"/>
                       <wp:wrapSquare wrapText="bothSides"/>
                     </wp:anchor>
                   </w:drawing>"#
            ),
            options,
        );
        let node = tree.node(drawing);
        assert!(node.declarations.get("float").is_none());
        match &node.kind {
            NodeKind::Drawing(props) => assert!(props.inline),
            _ => panic!("expected drawing"),
        }
    }

    #[test]
    fn test_embedded_image_reference() {
        let (tree, drawing) = parse_drawing_xml(
            &format!(
                r#"<w:drawing {NS}>
                     <wp:inline>
                       <wp:extent cx="914400" cy="914400"/>
                       <a:graphic><a:graphicData><a:blip r:embed="rId4"/></a:graphicData></a:graphic>
                     </wp:inline>
                   </w:drawing>"#
            ),
            ParseOptions::default(),
        );
        let image = tree.children(drawing)[0];
        match &tree.node(image).kind {
            NodeKind::Image(props) => assert_eq!(props.rel_id.as_deref(), Some("rId4")),
            _ => panic!("expected image"),
        }
    }

    #[test]
    fn test_vml_shape_with_style() {
        let parser = DocumentParser::new(ParseOptions::default());
        let elem = XmlElement::parse(&format!(
            r##"<w:pict {NS} xmlns:v="urn:schemas-microsoft-com:vml">
                 <v:rect style="width:20pt;height:10pt" strokecolor="#4472C4" fillcolor="red"/>
               </w:pict>"##
        ))
        .unwrap();
        let mut tree = DocumentTree::new();
        let root = tree.root();
        parser.parse_vml(&mut tree, root, &elem);
        let shape = tree.children(root)[0];
        let node = tree.node(shape);
        match &node.kind {
            NodeKind::VmlElement(props) => {
                assert_eq!(props.tag, "rect");
                assert_eq!(props.stroke.as_deref(), Some("#4472C4"));
                assert_eq!(props.fill.as_deref(), Some("red"));
            }
            _ => panic!("expected vml element"),
        }
        assert_eq!(node.declarations.get("width").map(String::as_str), Some("20pt"));
    }
}
