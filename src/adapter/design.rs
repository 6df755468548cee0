//! Structured-design adapter
//!
//! Consumes a design-tool export (one root tree with absolute geometry plus
//! bitmap and vector payloads keyed by reference) and produces a version-1
//! schema: a flat list of leaves positioned relative to the root's top-left.

use super::mask::{ellipse_path, masked_pair, path_from_svg, view_box_of, ChildRole, MaskCandidate};
use super::style::color_value;
use crate::color::Color;
use crate::config::DesignConfig;
use crate::ir::{
    Binding, BindingKind, ColorValue, ImageNode, Length, Mask, NodeKind, ObjectFit, Position, SchemaBuilder,
    ShapeKind, ShapeNode, Stroke, SvgNode, TemplateNode, TextAlign, TextNode, TokenDef, Typography,
};
use crate::{AssetStore, Canvas, Diagnostic, Error, Import, Result, SourceAdapter};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::LazyLock;

static BINDING_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").expect("valid regex"));

fn default_true() -> bool {
    true
}

fn default_one() -> f32 {
    1.0
}

/// Top-level design export
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignExport {
    pub name: String,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    /// Exactly one root tree
    pub nodes: Vec<DesignNode>,
    /// Bitmap payloads keyed by image reference (`data:` URI or base64)
    #[serde(default)]
    pub images: BTreeMap<String, String>,
    /// Raw vector markup keyed by node id
    #[serde(default)]
    pub svgs: BTreeMap<String, String>,
}

impl DesignExport {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DesignNodeType {
    Frame,
    Group,
    Component,
    ComponentSet,
    Instance,
    Section,
    Rectangle,
    Ellipse,
    Vector,
    Star,
    Line,
    RegularPolygon,
    BooleanOperation,
    Text,
    #[serde(other)]
    Other,
}

impl DesignNodeType {
    fn is_container(self) -> bool {
        matches!(
            self,
            DesignNodeType::Frame
                | DesignNodeType::Group
                | DesignNodeType::Component
                | DesignNodeType::ComponentSet
                | DesignNodeType::Instance
                | DesignNodeType::Section
        )
    }

    fn is_shape(self) -> bool {
        matches!(
            self,
            DesignNodeType::Rectangle
                | DesignNodeType::Ellipse
                | DesignNodeType::Vector
                | DesignNodeType::Star
                | DesignNodeType::Line
                | DesignNodeType::RegularPolygon
                | DesignNodeType::BooleanOperation
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaintType {
    Solid,
    Image,
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ScaleMode {
    Fill,
    Fit,
    Crop,
    Tile,
    Stretch,
}

/// Channels in the `0.0..=1.0` range
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DesignColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "default_one")]
    pub a: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignPaint {
    #[serde(rename = "type")]
    pub paint_type: PaintType,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<DesignColor>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opacity: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scale_mode: Option<ScaleMode>,
}

impl DesignPaint {
    pub fn solid(r: f32, g: f32, b: f32) -> Self {
        Self {
            paint_type: PaintType::Solid,
            visible: true,
            color: Some(DesignColor { r, g, b, a: 1.0 }),
            opacity: None,
            image_ref: None,
            scale_mode: None,
        }
    }

    pub fn image(image_ref: impl Into<String>) -> Self {
        Self {
            paint_type: PaintType::Image,
            visible: true,
            color: None,
            opacity: None,
            image_ref: Some(image_ref.into()),
            scale_mode: Some(ScaleMode::Fill),
        }
    }

    fn to_color(&self) -> Option<Color> {
        let c = self.color?;
        Some(Color::from_unit(c.r, c.g, c.b, c.a * self.opacity.unwrap_or(1.0)))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignTextStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height_px: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align_horizontal: Option<String>,
}

/// One node of the export tree; geometry is absolute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DesignNode {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type")]
    pub node_type: DesignNodeType,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fills: Vec<DesignPaint>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub strokes: Vec<DesignPaint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_weight: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub corner_radius: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<DesignTextStyle>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<DesignNode>,
}

impl DesignNode {
    pub fn new(id: impl Into<String>, node_type: DesignNodeType) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            node_type,
            visible: true,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            fills: Vec::new(),
            strokes: Vec::new(),
            stroke_weight: None,
            corner_radius: None,
            characters: None,
            style: None,
            children: Vec::new(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn bounds(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.x = x;
        self.y = y;
        self.width = width;
        self.height = height;
        self
    }

    pub fn fill(mut self, paint: DesignPaint) -> Self {
        self.fills.push(paint);
        self
    }

    pub fn child(mut self, child: DesignNode) -> Self {
        self.children.push(child);
        self
    }

    /// Field named by a `{{identifier}}` pattern in the display name.
    pub fn binding_field(&self) -> Option<&str> {
        BINDING_NAME.captures(&self.name).and_then(|c| c.get(1)).map(|m| m.as_str())
    }

    fn image_paint(&self) -> Option<&DesignPaint> {
        self.fills
            .iter()
            .find(|p| p.visible && p.paint_type == PaintType::Image && p.image_ref.is_some())
    }

    fn solid_fill(&self) -> Option<Color> {
        self.fills
            .iter()
            .filter(|p| p.visible && p.paint_type == PaintType::Solid)
            .find_map(DesignPaint::to_color)
    }
}

impl MaskCandidate for DesignNode {
    fn role(&self) -> ChildRole {
        let has_image = self.image_paint().is_some();
        match self.node_type {
            DesignNodeType::Rectangle if has_image => ChildRole::Image,
            t if t.is_shape() && !has_image => ChildRole::Shape,
            _ => ChildRole::Other,
        }
    }
}

/// Adapter for design-tool exports
#[derive(Debug, Clone, Default)]
pub struct DesignAdapter {
    config: DesignConfig,
}

impl DesignAdapter {
    pub fn new(config: DesignConfig) -> Self {
        Self { config }
    }
}

impl SourceAdapter for DesignAdapter {
    type Input = DesignExport;

    fn import(&self, schema_id: &str, export: &DesignExport) -> Result<Import> {
        let [root] = export.nodes.as_slice() else {
            return Err(Error::ImportError(format!(
                "design export must contain exactly one root node, found {}",
                export.nodes.len()
            )));
        };

        let mut assets = AssetStore::new();
        for (key, payload) in &export.images {
            assets.insert_encoded(key.clone(), payload)?;
        }

        let (width, height) = if export.width > 0.0 && export.height > 0.0 {
            (export.width, export.height)
        } else {
            (root.width, root.height)
        };
        let canvas = Canvas {
            width: width.round().max(0.0) as u32,
            height: height.round().max(0.0) as u32,
        };

        let mut build = Flatten {
            export,
            assets: &assets,
            tokens: &self.config.tokens,
            origin: (root.x, root.y),
            nodes: Vec::new(),
            diagnostics: Vec::new(),
        };
        build.background(root, root.visible);
        for child in &root.children {
            build.visit(child, None, root.visible);
        }
        let Flatten { nodes, diagnostics, .. } = build;
        log::debug!("design '{}' flattened into {} nodes", export.name, nodes.len());

        let title = self.config.title.clone().unwrap_or_else(|| export.name.clone());
        let schema = SchemaBuilder::flat(schema_id, canvas, nodes)
            .title(title)
            .tokens(self.config.tokens.clone())
            .variants(self.config.variants.clone())
            .build()?;

        log::info!(
            "imported design '{}' as '{}' ({} nodes, {} bindings, {} assets)",
            export.name,
            schema.id(),
            schema.node_count(),
            schema.bindings().len(),
            assets.len()
        );
        Ok(Import {
            schema,
            assets,
            diagnostics,
        })
    }
}

/// One flattening pass over an export tree
struct Flatten<'e> {
    export: &'e DesignExport,
    assets: &'e AssetStore,
    tokens: &'e BTreeMap<String, TokenDef>,
    origin: (f32, f32),
    nodes: Vec<TemplateNode>,
    diagnostics: Vec<Diagnostic>,
}

impl Flatten<'_> {
    fn place(&self, node: &DesignNode, kind: NodeKind, visible: bool) -> TemplateNode {
        let mut out = TemplateNode::new(node.id.clone(), kind)
            .with_name(node.name.clone())
            .at(node.x - self.origin.0, node.y - self.origin.1);
        out.visible = visible;
        out
    }

    fn color(&self, color: Color) -> ColorValue {
        color_value(&color.to_string(), self.tokens)
    }

    fn check_asset(&mut self, reference: &str, node_id: &str) {
        if !self.assets.contains(reference) {
            self.diagnostics.push(Diagnostic::missing_asset(reference, Some(node_id)));
        }
    }

    /// `inherited` carries a binding from a container hosting one text leaf.
    fn visit(&mut self, node: &DesignNode, inherited: Option<&str>, parent_visible: bool) {
        let visible = parent_visible && node.visible;
        let field = node.binding_field().or(inherited);

        match node.node_type {
            DesignNodeType::Text => {
                let text = self.text(node, field, visible);
                self.nodes.push(text);
            }
            t if t.is_container() => {
                if let Some((shape, image)) = masked_pair(&node.children) {
                    let field = field.or_else(|| image.binding_field()).or_else(|| shape.binding_field());
                    let svg = self.masked_group(node, shape, image, field, visible);
                    self.nodes.push(svg);
                    return;
                }
                let bound_image = self.background(node, visible);
                let hosted = match (node.binding_field(), node.children.as_slice()) {
                    (Some(f), [only]) if only.node_type == DesignNodeType::Text => Some(f),
                    (Some(f), _) if !bound_image => {
                        log::debug!("binding '{}' on container {} has no text leaf to host", f, node.id);
                        None
                    }
                    _ => None,
                };
                for child in &node.children {
                    self.visit(child, hosted, visible);
                }
            }
            _ if node.image_paint().is_some() => {
                let image = self.image(node, field, visible);
                self.nodes.push(image);
            }
            t if t.is_shape() => {
                if let Some(f) = field {
                    log::debug!("ignoring binding '{}' on static shape {}", f, node.id);
                }
                let shape = self.shape(node, visible);
                self.nodes.push(shape);
            }
            other => log::debug!("skipping unsupported {:?} node {}", other, node.id),
        }
    }

    /// Emit a container's own fill as a leaf; returns true when the fill is a
    /// bound image, which then consumes the container's binding.
    fn background(&mut self, node: &DesignNode, visible: bool) -> bool {
        if node.image_paint().is_some() {
            let image = self.image(node, node.binding_field(), visible);
            let bound = image.binding().is_some();
            self.nodes.push(image);
            return bound;
        }
        if let Some(color) = node.solid_fill() {
            let shape = ShapeNode {
                width: node.width,
                height: node.height,
                shape: ShapeKind::Rectangle {
                    corner_radius: node.corner_radius.unwrap_or(0.0),
                },
                fill: Some(self.color(color)),
                stroke: None,
            };
            let bg = self.place(node, NodeKind::Shape(shape), visible);
            self.nodes.push(bg);
        }
        false
    }

    fn text(&self, node: &DesignNode, field: Option<&str>, visible: bool) -> TemplateNode {
        let style = node.style.clone().unwrap_or_default();
        let defaults = Typography::default();
        let text = TextNode {
            width: Length::Px(node.width),
            height: Length::Px(node.height),
            content: node.characters.clone().unwrap_or_default(),
            font: Typography {
                family: style.font_family.unwrap_or(defaults.family),
                size: style.font_size.unwrap_or(defaults.size),
                weight: style.font_weight.map(|w| w.round() as u16).unwrap_or(defaults.weight),
                line_height: style.line_height_px,
            },
            align: match style.text_align_horizontal.as_deref() {
                Some("CENTER") => TextAlign::Center,
                Some("RIGHT") => TextAlign::Right,
                Some("JUSTIFIED") => TextAlign::Justify,
                _ => TextAlign::Left,
            },
            color: node.solid_fill().map(|c| self.color(c)).unwrap_or_default(),
            binding: field.map(|f| Binding::new(f, BindingKind::Text)),
            ..Default::default()
        };
        self.place(node, NodeKind::Text(text), visible)
    }

    fn image(&mut self, node: &DesignNode, field: Option<&str>, visible: bool) -> TemplateNode {
        let paint = node.image_paint();
        let src = paint.and_then(|p| p.image_ref.clone()).unwrap_or_default();
        self.check_asset(&src, &node.id);
        let image = ImageNode {
            width: Length::Px(node.width),
            height: Length::Px(node.height),
            src,
            fit: match paint.and_then(|p| p.scale_mode) {
                Some(ScaleMode::Fit) => ObjectFit::Contain,
                Some(ScaleMode::Stretch) => ObjectFit::Fill,
                Some(ScaleMode::Tile) => ObjectFit::None,
                _ => ObjectFit::Cover,
            },
            binding: field.map(|f| Binding::new(f, BindingKind::Image)),
            ..Default::default()
        };
        self.place(node, NodeKind::Image(image), visible)
    }

    fn shape(&self, node: &DesignNode, visible: bool) -> TemplateNode {
        let markup = self.export.svgs.get(&node.id);
        let shape = match node.node_type {
            DesignNodeType::Rectangle => ShapeKind::Rectangle {
                corner_radius: node.corner_radius.unwrap_or(0.0),
            },
            DesignNodeType::Ellipse => ShapeKind::Ellipse,
            _ => match markup.and_then(|m| path_from_svg(m)) {
                Some(path) => ShapeKind::Vector {
                    path,
                    view_box: markup.and_then(|m| view_box_of(m)),
                },
                None => {
                    log::debug!("vector {} has no markup, approximating with an ellipse", node.id);
                    ShapeKind::Ellipse
                }
            },
        };
        let stroke = node
            .strokes
            .iter()
            .filter(|p| p.visible && p.paint_type == PaintType::Solid)
            .find_map(DesignPaint::to_color)
            .map(|c| Stroke {
                color: self.color(c),
                width: node.stroke_weight.unwrap_or(1.0),
            });
        let shape = ShapeNode {
            width: node.width,
            height: node.height,
            shape,
            fill: node.solid_fill().map(|c| self.color(c)),
            stroke,
        };
        self.place(node, NodeKind::Shape(shape), visible)
    }

    /// Collapse a `{shape, image}` group into one clipped image.
    ///
    /// The mask outline comes from the shape's own markup, then the group's,
    /// then an ellipse over the shape's bounds (reported as a fallback).
    fn masked_group(
        &mut self,
        group: &DesignNode,
        shape: &DesignNode,
        image: &DesignNode,
        field: Option<&str>,
        visible: bool,
    ) -> TemplateNode {
        let shape_offset = Position {
            x: shape.x - group.x,
            y: shape.y - group.y,
        };
        let svgs = &self.export.svgs;
        let (path, offset) = if let Some(path) = svgs.get(&shape.id).and_then(|m| path_from_svg(m)) {
            (path, Some(shape_offset))
        } else if let Some(path) = svgs.get(&group.id).and_then(|m| path_from_svg(m)) {
            (path, None)
        } else {
            self.diagnostics.push(Diagnostic::mask_fallback(&group.id));
            (ellipse_path(shape.width, shape.height), Some(shape_offset))
        };

        let src = image.image_paint().and_then(|p| p.image_ref.clone());
        if let Some(src) = &src {
            self.check_asset(src, &group.id);
        }
        let svg = SvgNode {
            width: group.width,
            height: group.height,
            view_box: format!("0 0 {} {}", group.width, group.height),
            mask: Some(Mask {
                id: "mask".to_string(),
                path,
                offset: offset.filter(|o| o.x != 0.0 || o.y != 0.0),
            }),
            image: src,
            binding: field.map(|f| Binding::new(f, BindingKind::Image)),
        };
        self.place(group, NodeKind::Svg(svg), visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::DiagnosticKind;

    const PNG: &str = "iVBORw0KGgo=";

    fn export(root: DesignNode) -> DesignExport {
        let mut images = BTreeMap::new();
        images.insert("photo-ref".to_string(), PNG.to_string());
        DesignExport {
            name: "Event card".into(),
            width: 400.0,
            height: 300.0,
            nodes: vec![root],
            images,
            svgs: BTreeMap::new(),
        }
    }

    fn root() -> DesignNode {
        DesignNode::new("0:1", DesignNodeType::Frame).bounds(100.0, 50.0, 400.0, 300.0)
    }

    fn text(id: &str, name: &str, content: &str) -> DesignNode {
        let mut t = DesignNode::new(id, DesignNodeType::Text).named(name).bounds(120.0, 70.0, 200.0, 40.0);
        t.characters = Some(content.to_string());
        t
    }

    fn masked(id: &str, image_first: bool) -> DesignNode {
        let shape = DesignNode::new(format!("{}-shape", id), DesignNodeType::Ellipse).bounds(110.0, 60.0, 80.0, 80.0);
        let photo = DesignNode::new(format!("{}-photo", id), DesignNodeType::Rectangle)
            .bounds(110.0, 60.0, 80.0, 80.0)
            .fill(DesignPaint::image("photo-ref"));
        let group = DesignNode::new(id, DesignNodeType::Group).named("{{photo}}").bounds(110.0, 60.0, 80.0, 80.0);
        if image_first {
            group.child(photo).child(shape)
        } else {
            group.child(shape).child(photo)
        }
    }

    fn import(export: &DesignExport) -> Import {
        DesignAdapter::default().import("card", export).unwrap()
    }

    #[test]
    fn positions_are_relative_to_root() {
        let doc = export(root().child(text("1:1", "Title", "Hello")));
        let out = import(&doc);
        let node = out.schema.find("1:1").unwrap();
        assert_eq!(node.position, Some(Position { x: 20.0, y: 20.0 }));
        assert_eq!(out.schema.canvas(), Canvas { width: 400, height: 300 });
        assert_eq!(out.schema.title(), "Event card");
    }

    #[test]
    fn binding_comes_from_display_name() {
        let doc = export(root().child(text("1:1", "{{ eventTitle }}", "Placeholder Text")));
        let out = import(&doc);
        assert_eq!(out.schema.bindings()[0].field, "eventTitle");
        assert_eq!(out.schema.bindings()[0].kind, BindingKind::Text);
    }

    #[test]
    fn container_hosting_one_text_passes_its_binding_down() {
        let host = DesignNode::new("2:1", DesignNodeType::Frame)
            .named("{{venue}}")
            .bounds(100.0, 50.0, 200.0, 40.0)
            .child(text("2:2", "Label", "Venue"));
        let out = import(&export(root().child(host)));
        let entries = out.schema.bindings();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].node_id, "2:2");
        assert_eq!(entries[0].field, "venue");
    }

    #[test]
    fn masked_group_detection_is_order_independent() {
        let a = import(&export(root().child(masked("g", false))));
        let b = import(&export(root().child(masked("g", true))));
        for out in [&a, &b] {
            let node = out.schema.find("g").unwrap();
            let NodeKind::Svg(svg) = &node.kind else { panic!("expected svg, got {}", node.kind_name()) };
            assert_eq!(svg.image.as_deref(), Some("photo-ref"));
            assert_eq!(svg.binding.as_ref().unwrap().kind, BindingKind::Image);
            assert!(out.schema.find("g-shape").is_none());
        }
        assert_eq!(a.schema.find("g"), b.schema.find("g"));
        assert_eq!(a.diagnostics[0].kind, DiagnosticKind::MaskFallback);
    }

    #[test]
    fn three_children_are_not_a_masked_group() {
        let group = masked("g", false).child(text("g-caption", "Caption", "Hi"));
        let out = import(&export(root().child(group)));
        assert!(out.schema.find("g").is_none());
        assert_eq!(out.schema.find("g-shape").unwrap().kind_name(), "shape");
        assert_eq!(out.schema.find("g-photo").unwrap().kind_name(), "image");
    }

    #[test]
    fn mask_path_prefers_shape_then_group_markup() {
        let mut doc = export(root().child(masked("g", false)));
        doc.svgs.insert("g".into(), r#"<svg><path d="M0 0H1V1Z"/></svg>"#.into());
        let out = import(&doc);
        let NodeKind::Svg(svg) = &out.schema.find("g").unwrap().kind else { panic!() };
        assert_eq!(svg.mask.as_ref().unwrap().path, "M0 0H1V1Z");
        assert!(out.diagnostics.is_empty());

        doc.svgs.insert("g-shape".into(), r#"<svg><path d="M2 2H3V3Z"/></svg>"#.into());
        let out = import(&doc);
        let NodeKind::Svg(svg) = &out.schema.find("g").unwrap().kind else { panic!() };
        assert_eq!(svg.mask.as_ref().unwrap().path, "M2 2H3V3Z");
    }

    #[test]
    fn root_fill_becomes_background_shape() {
        let doc = export(root().fill(DesignPaint::solid(1.0, 1.0, 1.0)));
        let out = import(&doc);
        let bg = out.schema.find("0:1").unwrap();
        let NodeKind::Shape(shape) = &bg.kind else { panic!() };
        assert_eq!(shape.fill, Some(ColorValue::literal("#ffffff")));
        assert_eq!(bg.position, Some(Position { x: 0.0, y: 0.0 }));
    }

    #[test]
    fn fills_matching_a_token_become_references() {
        let mut config = DesignConfig::default();
        config.tokens.insert("primary".into(), TokenDef::editable("#ff0000"));
        let mut doc = export(root().child(text("1:1", "Title", "Hi")));
        doc.nodes[0].children[0].fills.push(DesignPaint::solid(1.0, 0.0, 0.0));
        let out = DesignAdapter::new(config).import("card", &doc).unwrap();
        let NodeKind::Text(t) = &out.schema.find("1:1").unwrap().kind else { panic!() };
        assert_eq!(t.color, ColorValue::token("primary"));
    }

    #[test]
    fn hidden_nodes_are_kept_hidden() {
        let mut hidden = text("1:1", "Title", "Hi");
        hidden.visible = false;
        let out = import(&export(root().child(hidden)));
        assert!(!out.schema.find("1:1").unwrap().visible);
    }

    #[test]
    fn images_are_recorded_and_missing_refs_reported() {
        let photo = DesignNode::new("3:1", DesignNodeType::Rectangle)
            .bounds(100.0, 50.0, 10.0, 10.0)
            .fill(DesignPaint::image("nope"));
        let out = import(&export(root().child(photo)));
        assert!(out.assets.contains("photo-ref"));
        assert_eq!(out.assets.len(), 1);
        assert_eq!(out.diagnostics[0].kind, DiagnosticKind::MissingAsset);
    }

    #[test]
    fn rejects_multiple_roots_and_bad_variants() {
        let mut doc = export(root());
        doc.nodes.push(root());
        assert!(matches!(DesignAdapter::default().import("x", &doc), Err(Error::ImportError(_))));

        let mut config = DesignConfig::default();
        config.variants.push(crate::ir::Variant::new("v", "V").hide("missing"));
        let err = DesignAdapter::new(config).import("x", &export(root())).unwrap_err();
        assert!(matches!(err, Error::DanglingReference { .. }));
    }
}
