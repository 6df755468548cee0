//! Template node kinds
//!
//! A `TemplateNode` carries the attributes every node shares (id, display
//! name, visibility, absolute position for flat schemas) and a `NodeKind`
//! payload selected by the `type` discriminant on the wire.

use super::binding::Binding;
use serde::{Deserialize, Serialize};
use std::fmt;

pub type NodeId = String;

fn default_visible() -> bool {
    true
}

fn is_true(v: &bool) -> bool {
    *v
}

fn is_zero(v: &f32) -> bool {
    *v == 0.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateNode {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default = "default_visible", skip_serializing_if = "is_true")]
    pub visible: bool,
    /// Offset from the canvas top-left; only used by version-1 (flat) schemas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(flatten)]
    pub kind: NodeKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum NodeKind {
    Frame(FrameNode),
    Flex(FlexNode),
    Box(BoxNode),
    Text(TextNode),
    Image(ImageNode),
    Svg(SvgNode),
    Shape(ShapeNode),
}

impl TemplateNode {
    pub fn new(id: impl Into<NodeId>, kind: NodeKind) -> Self {
        Self {
            id: id.into(),
            name: String::new(),
            visible: true,
            position: None,
            kind,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.position = Some(Position { x, y });
        self
    }

    pub fn kind_name(&self) -> &'static str {
        self.kind.name()
    }

    pub fn is_container(&self) -> bool {
        matches!(self.kind, NodeKind::Frame(_) | NodeKind::Flex(_) | NodeKind::Box(_))
    }

    pub fn children(&self) -> &[TemplateNode] {
        match &self.kind {
            NodeKind::Frame(f) => &f.children,
            NodeKind::Flex(f) => &f.children,
            NodeKind::Box(b) => &b.children,
            _ => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<TemplateNode>> {
        match &mut self.kind {
            NodeKind::Frame(f) => Some(&mut f.children),
            NodeKind::Flex(f) => Some(&mut f.children),
            NodeKind::Box(b) => Some(&mut b.children),
            _ => None,
        }
    }

    pub fn binding(&self) -> Option<&Binding> {
        match &self.kind {
            NodeKind::Text(t) => t.binding.as_ref(),
            NodeKind::Image(i) => i.binding.as_ref(),
            NodeKind::Svg(s) => s.binding.as_ref(),
            _ => None,
        }
    }

    /// Pre-order traversal over this node and its descendants.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a TemplateNode)) {
        f(self);
        for child in self.children() {
            child.walk(f);
        }
    }

    /// Pre-order search by id.
    pub fn find(&self, id: &str) -> Option<&TemplateNode> {
        if self.id == id {
            return Some(self);
        }
        self.children().iter().find_map(|c| c.find(id))
    }
}

impl NodeKind {
    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Frame(_) => "frame",
            NodeKind::Flex(_) => "flex",
            NodeKind::Box(_) => "box",
            NodeKind::Text(_) => "text",
            NodeKind::Image(_) => "image",
            NodeKind::Svg(_) => "svg",
            NodeKind::Shape(_) => "shape",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

/// A CSS-like length: pixels, percentage of the parent, or automatic.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "LengthRepr", into = "LengthRepr")]
pub enum Length {
    Px(f32),
    Percent(f32),
    #[default]
    Auto,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum LengthRepr {
    Number(f32),
    Keyword(String),
}

impl TryFrom<LengthRepr> for Length {
    type Error = String;

    fn try_from(repr: LengthRepr) -> std::result::Result<Self, Self::Error> {
        match repr {
            LengthRepr::Number(v) => Ok(Length::Px(v)),
            LengthRepr::Keyword(s) => Length::parse(&s).ok_or_else(|| format!("invalid length '{}'", s)),
        }
    }
}

impl From<Length> for LengthRepr {
    fn from(len: Length) -> Self {
        match len {
            Length::Px(v) => LengthRepr::Number(v),
            other => LengthRepr::Keyword(other.to_string()),
        }
    }
}

impl Length {
    /// Parse `auto`, `50%`, `120px` or a bare number (pixels).
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("auto") {
            return Some(Length::Auto);
        }
        if let Some(pct) = s.strip_suffix('%') {
            return pct.trim().parse().ok().map(Length::Percent);
        }
        let num = s.strip_suffix("px").unwrap_or(s);
        num.trim().parse().ok().map(Length::Px)
    }

    pub fn px(&self) -> Option<f32> {
        match self {
            Length::Px(v) => Some(*v),
            _ => None,
        }
    }
}

impl fmt::Display for Length {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Length::Px(v) => write!(f, "{}px", v),
            Length::Percent(v) => write!(f, "{}%", v),
            Length::Auto => f.write_str("auto"),
        }
    }
}

/// Padding or margin on four sides, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Insets {
    #[serde(default)]
    pub top: f32,
    #[serde(default)]
    pub right: f32,
    #[serde(default)]
    pub bottom: f32,
    #[serde(default)]
    pub left: f32,
}

impl Insets {
    pub fn uniform(v: f32) -> Self {
        Self { top: v, right: v, bottom: v, left: v }
    }

    pub fn is_zero(&self) -> bool {
        self.top == 0.0 && self.right == 0.0 && self.bottom == 0.0 && self.left == 0.0
    }
}

/// A color that is either written literally or looked up from the schema's tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Token { token: String },
    Literal(String),
}

impl ColorValue {
    pub fn literal(v: impl Into<String>) -> Self {
        ColorValue::Literal(v.into())
    }

    pub fn token(name: impl Into<String>) -> Self {
        ColorValue::Token { token: name.into() }
    }
}

impl Default for ColorValue {
    fn default() -> Self {
        ColorValue::Literal("#000000".to_string())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoxSizing {
    ContentBox,
    BorderBox,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlexDirection {
    #[default]
    Row,
    Column,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
    SpaceEvenly,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Align {
    Start,
    Center,
    End,
    #[default]
    Stretch,
    Baseline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObjectFit {
    #[default]
    Cover,
    Contain,
    Fill,
    None,
    ScaleDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageDisplay {
    #[default]
    Block,
    Inline,
}

/// Root container of a version-2 schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameNode {
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Insets::is_zero")]
    pub padding: Insets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<ColorValue>,
    #[serde(default)]
    pub children: Vec<TemplateNode>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlexNode {
    #[serde(default)]
    pub width: Length,
    #[serde(default)]
    pub height: Length,
    #[serde(default)]
    pub direction: FlexDirection,
    #[serde(default)]
    pub justify: Justify,
    #[serde(default)]
    pub align: Align,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub gap: f32,
    #[serde(default, skip_serializing_if = "Insets::is_zero")]
    pub padding: Insets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<ColorValue>,
    #[serde(default)]
    pub overflow: Overflow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_sizing: Option<BoxSizing>,
    #[serde(default)]
    pub children: Vec<TemplateNode>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxNode {
    #[serde(default)]
    pub width: Length,
    #[serde(default)]
    pub height: Length,
    #[serde(default, skip_serializing_if = "Insets::is_zero")]
    pub padding: Insets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<ColorValue>,
    #[serde(default)]
    pub overflow: Overflow,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub box_sizing: Option<BoxSizing>,
    #[serde(default)]
    pub children: Vec<TemplateNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    pub family: String,
    pub size: f32,
    #[serde(default = "Typography::default_weight")]
    pub weight: u16,
    /// Line height in pixels
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f32>,
}

impl Typography {
    fn default_weight() -> u16 {
        400
    }
}

impl Default for Typography {
    fn default() -> Self {
        Self {
            family: "sans-serif".to_string(),
            size: 16.0,
            weight: 400,
            line_height: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextNode {
    #[serde(default)]
    pub width: Length,
    #[serde(default)]
    pub height: Length,
    pub content: String,
    #[serde(default)]
    pub font: Typography,
    #[serde(default)]
    pub align: TextAlign,
    #[serde(default)]
    pub color: ColorValue,
    #[serde(default, skip_serializing_if = "Insets::is_zero")]
    pub margin: Insets,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<Binding>,
}

impl TextNode {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageNode {
    #[serde(default)]
    pub width: Length,
    #[serde(default)]
    pub height: Length,
    /// Asset key or URI of the image shown when no binding value overrides it
    pub src: String,
    #[serde(default)]
    pub fit: ObjectFit,
    #[serde(default)]
    pub display: ImageDisplay,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<Binding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mask {
    pub id: String,
    pub path: String,
    /// Translation applied to `path` inside the node's viewBox
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offset: Option<Position>,
}

/// A clipped image: the mask path cuts the embedded image to shape.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SvgNode {
    pub width: f32,
    pub height: f32,
    pub view_box: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mask: Option<Mask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub binding: Option<Binding>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ShapeKind {
    #[serde(rename_all = "camelCase")]
    Rectangle {
        #[serde(default, skip_serializing_if = "is_zero")]
        corner_radius: f32,
    },
    Ellipse,
    #[serde(rename_all = "camelCase")]
    Vector {
        path: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        view_box: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub color: ColorValue,
    pub width: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShapeNode {
    pub width: f32,
    pub height: f32,
    pub shape: ShapeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<ColorValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<Stroke>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::binding::BindingKind;

    #[test]
    fn node_kind_is_discriminated_by_type_field() {
        let json = r##"{"id":"t1","type":"text","content":"Hi","color":{"token":"primary"}}"##;
        let node: TemplateNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.kind_name(), "text");
        assert!(node.visible);
        match &node.kind {
            NodeKind::Text(t) => {
                assert_eq!(t.content, "Hi");
                assert_eq!(t.color, ColorValue::token("primary"));
            }
            other => panic!("unexpected kind {:?}", other),
        }
    }

    #[test]
    fn lengths_accept_numbers_and_keywords() {
        let json = r#"{"id":"i","type":"image","src":"logo","width":120,"height":"auto"}"#;
        let node: TemplateNode = serde_json::from_str(json).unwrap();
        let NodeKind::Image(img) = &node.kind else { panic!("expected image") };
        assert_eq!(img.width, Length::Px(120.0));
        assert_eq!(img.height, Length::Auto);
        assert_eq!(Length::parse("50%"), Some(Length::Percent(50.0)));
        assert_eq!(Length::parse("wide"), None);
    }

    #[test]
    fn walk_is_pre_order() {
        let leaf_a = TemplateNode::new("a", NodeKind::Text(TextNode::new("A")));
        let leaf_b = TemplateNode::new("b", NodeKind::Text(TextNode::new("B")));
        let inner = TemplateNode::new(
            "inner",
            NodeKind::Box(BoxNode { children: vec![leaf_a], ..Default::default() }),
        );
        let outer = TemplateNode::new(
            "outer",
            NodeKind::Flex(FlexNode { children: vec![inner, leaf_b], ..Default::default() }),
        );
        let mut seen = Vec::new();
        outer.walk(&mut |n| seen.push(n.id.as_str()));
        assert_eq!(seen, vec!["outer", "inner", "a", "b"]);
        assert!(outer.find("b").is_some());
    }

    #[test]
    fn binding_accessor_reaches_leaf_payloads() {
        let mut text = TextNode::new("Placeholder Text");
        text.binding = Some(Binding::new("eventTitle", BindingKind::Text));
        let node = TemplateNode::new("t", NodeKind::Text(text));
        assert_eq!(node.binding().map(|b| b.field.as_str()), Some("eventTitle"));
    }
}
