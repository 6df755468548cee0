//! Single pre-order pass from resolved nodes to markup

use super::html::{escape_attr, px, text_with_breaks, Style};
use crate::adapter::mask::view_box_size;
use crate::assets::AssetResolver;
use crate::color::Color;
use crate::ir::{
    Align, BindingKind, BoxNode, BoxSizing, FlexDirection, FlexNode, FrameNode, ImageDisplay, ImageNode, Insets,
    Justify, Length, NodeKind, ObjectFit, Overflow, ShapeKind, ShapeNode, SvgNode, TemplateNode, TextAlign, TextNode,
};
use crate::resolve::{apply_text, ResolvedBindings, TokenResolver};
use crate::{Diagnostic, DiagnosticKind, Result};

pub(crate) struct Emitter<'a> {
    pub tokens: &'a TokenResolver<'a>,
    pub bindings: &'a ResolvedBindings,
    pub assets: &'a dyn AssetResolver,
    pub diagnostics: Vec<Diagnostic>,
    pub out: String,
}

impl<'a> Emitter<'a> {
    pub fn new(tokens: &'a TokenResolver<'a>, bindings: &'a ResolvedBindings, assets: &'a dyn AssetResolver) -> Self {
        Self {
            tokens,
            bindings,
            assets,
            diagnostics: Vec::new(),
            out: String::new(),
        }
    }

    pub fn node(&mut self, node: &TemplateNode) -> Result<()> {
        if !node.visible {
            return Ok(());
        }
        match &node.kind {
            NodeKind::Frame(f) => self.frame(node, f),
            NodeKind::Flex(f) => self.flex(node, f),
            NodeKind::Box(b) => self.block(node, b),
            NodeKind::Text(t) => self.text(node, t),
            NodeKind::Image(i) => self.image(node, i),
            NodeKind::Svg(s) => self.svg(node, s),
            NodeKind::Shape(s) => self.shape(node, s),
        }
    }

    fn children(&mut self, nodes: &[TemplateNode]) -> Result<()> {
        for child in nodes {
            self.node(child)?;
        }
        Ok(())
    }

    fn open(&mut self, tag: &str, node: &TemplateNode, style: &Style) {
        self.out.push_str(&format!(
            "<{} data-node-id=\"{}\"{}>",
            tag,
            escape_attr(&node.id),
            style.attr()
        ));
    }

    fn frame(&mut self, node: &TemplateNode, f: &FrameNode) -> Result<()> {
        let mut style = Style::new();
        style
            .set("position", "relative")
            .set("width", px(f.width as f32))
            .set("height", px(f.height as f32))
            .set("overflow", "hidden")
            .set("box-sizing", "border-box");
        padding(&mut style, &f.padding);
        if let Some(bg) = &f.background {
            style.set("background", self.tokens.css(bg)?);
        }
        self.open("div", node, &style);
        self.children(&f.children)?;
        self.out.push_str("</div>");
        Ok(())
    }

    fn flex(&mut self, node: &TemplateNode, f: &FlexNode) -> Result<()> {
        let mut style = placed(node);
        style
            .set("display", "flex")
            .set(
                "flex-direction",
                match f.direction {
                    FlexDirection::Row => "row",
                    FlexDirection::Column => "column",
                },
            )
            .set("justify-content", justify_css(f.justify))
            .set("align-items", align_css(f.align));
        if f.gap != 0.0 {
            style.set("gap", px(f.gap));
        }
        self.container_style(&mut style, f.width, f.height, &f.padding, f.background.as_ref(), f.overflow, f.box_sizing)?;
        self.open("div", node, &style);
        self.children(&f.children)?;
        self.out.push_str("</div>");
        Ok(())
    }

    fn block(&mut self, node: &TemplateNode, b: &BoxNode) -> Result<()> {
        let mut style = placed(node);
        style.set("display", "block");
        self.container_style(&mut style, b.width, b.height, &b.padding, b.background.as_ref(), b.overflow, b.box_sizing)?;
        self.open("div", node, &style);
        self.children(&b.children)?;
        self.out.push_str("</div>");
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    fn container_style(
        &self,
        style: &mut Style,
        width: Length,
        height: Length,
        pad: &Insets,
        background: Option<&crate::ir::ColorValue>,
        overflow: Overflow,
        box_sizing: Option<BoxSizing>,
    ) -> Result<()> {
        size(style, width, height);
        padding(style, pad);
        if let Some(bg) = background {
            style.set("background", self.tokens.css(bg)?);
        }
        if overflow == Overflow::Hidden {
            style.set("overflow", "hidden");
        }
        if let Some(bs) = box_sizing {
            style.set(
                "box-sizing",
                match bs {
                    BoxSizing::BorderBox => "border-box",
                    BoxSizing::ContentBox => "content-box",
                },
            );
        }
        Ok(())
    }

    fn text(&mut self, node: &TemplateNode, t: &TextNode) -> Result<()> {
        let mut content = t.content.clone();
        let mut color = self.tokens.css(&t.color)?;

        if let (Some(binding), Some(resolved)) = (&t.binding, self.bindings.get(&node.id)) {
            match binding.kind {
                BindingKind::Text => content = apply_text(&t.content, binding, &resolved.value),
                BindingKind::Color => match resolved.value.parse::<Color>() {
                    Ok(c) => color = c.to_string(),
                    Err(_) => self.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::InvalidBindingValue,
                        &resolved.field,
                        Some(&node.id),
                    )),
                },
                BindingKind::Image => self.diagnostics.push(Diagnostic::new(
                    DiagnosticKind::InvalidBindingValue,
                    &resolved.field,
                    Some(&node.id),
                )),
            }
        }

        let mut style = placed(node);
        size(&mut style, t.width, t.height);
        margin(&mut style, &t.margin);
        style
            .set("font-family", format!("'{}'", t.font.family.replace('\'', "")))
            .set("font-size", px(t.font.size))
            .set("font-weight", t.font.weight.to_string())
            .set_opt("line-height", t.font.line_height.map(px))
            .set(
                "text-align",
                match t.align {
                    TextAlign::Left => "left",
                    TextAlign::Center => "center",
                    TextAlign::Right => "right",
                    TextAlign::Justify => "justify",
                },
            )
            .set("color", color);
        self.open("div", node, &style);
        self.out.push_str(&text_with_breaks(&content));
        self.out.push_str("</div>");
        Ok(())
    }

    /// Source reference after binding resolution (image kind only).
    fn image_reference(&self, node: &TemplateNode, fallback: &str) -> String {
        match (node.binding(), self.bindings.get(&node.id)) {
            (Some(b), Some(resolved)) if b.kind == BindingKind::Image => resolved.value.clone(),
            _ => fallback.to_string(),
        }
    }

    /// Inline a reference as a data URI; unknown references stay as written.
    fn inline(&mut self, reference: &str, node_id: &str) -> String {
        if reference.starts_with("data:") {
            return reference.to_string();
        }
        match self.assets.asset(reference) {
            Some(asset) => asset.to_data_uri(),
            None => {
                self.diagnostics.push(Diagnostic::missing_asset(reference, Some(node_id)));
                reference.to_string()
            }
        }
    }

    fn image(&mut self, node: &TemplateNode, i: &ImageNode) -> Result<()> {
        let reference = self.image_reference(node, &i.src);
        let src = self.inline(&reference, &node.id);
        let mut style = placed(node);
        size(&mut style, i.width, i.height);
        style
            .set("object-fit", fit_css(i.fit))
            .set(
                "display",
                match i.display {
                    ImageDisplay::Block => "block",
                    ImageDisplay::Inline => "inline-block",
                },
            );
        self.out.push_str(&format!(
            "<img data-node-id=\"{}\" src=\"{}\" alt=\"\"{}>",
            escape_attr(&node.id),
            escape_attr(&src),
            style.attr()
        ));
        Ok(())
    }

    fn svg(&mut self, node: &TemplateNode, s: &SvgNode) -> Result<()> {
        let (vb_w, vb_h) = view_box_size(&s.view_box).unwrap_or((s.width, s.height));
        let mut style = placed(node);
        style.set("display", "block");
        self.out.push_str(&format!(
            "<svg data-node-id=\"{}\" xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"{}\"{}>",
            escape_attr(&node.id),
            s.width,
            s.height,
            escape_attr(&s.view_box),
            style.attr()
        ));

        let mask_id = s.mask.as_ref().map(|m| format!("{}-{}", node.id, m.id));
        if let (Some(mask), Some(id)) = (&s.mask, &mask_id) {
            let transform = mask
                .offset
                .filter(|o| o.x != 0.0 || o.y != 0.0)
                .map(|o| format!(" transform=\"translate({} {})\"", o.x, o.y))
                .unwrap_or_default();
            self.out.push_str(&format!(
                "<defs><mask id=\"{}\"><path d=\"{}\" fill=\"#ffffff\"{}/></mask></defs>",
                escape_attr(id),
                escape_attr(&mask.path),
                transform
            ));
        }

        let reference = match &s.image {
            Some(src) => Some(self.image_reference(node, src)),
            None => self
                .bindings
                .get(&node.id)
                .filter(|_| node.binding().map(|b| b.kind) == Some(BindingKind::Image))
                .map(|r| r.value.clone()),
        };
        if let Some(reference) = reference {
            let href = self.inline(&reference, &node.id);
            let mask_attr = mask_id
                .map(|id| format!(" mask=\"url(#{})\"", escape_attr(&id)))
                .unwrap_or_default();
            self.out.push_str(&format!(
                "<image href=\"{}\" x=\"0\" y=\"0\" width=\"{}\" height=\"{}\" preserveAspectRatio=\"xMidYMid slice\"{}/>",
                escape_attr(&href),
                vb_w,
                vb_h,
                mask_attr
            ));
        }
        self.out.push_str("</svg>");
        Ok(())
    }

    fn shape(&mut self, node: &TemplateNode, s: &ShapeNode) -> Result<()> {
        let fill = match &s.fill {
            Some(c) => self.tokens.css(c)?,
            None => "none".to_string(),
        };
        let stroke = match &s.stroke {
            Some(st) => format!(
                " stroke=\"{}\" stroke-width=\"{}\"",
                escape_attr(&self.tokens.css(&st.color)?),
                st.width
            ),
            None => String::new(),
        };
        let view_box = match &s.shape {
            ShapeKind::Vector { view_box: Some(vb), .. } => vb.clone(),
            _ => format!("0 0 {} {}", s.width, s.height),
        };
        let mut style = placed(node);
        style.set("display", "block");
        self.out.push_str(&format!(
            "<svg data-node-id=\"{}\" xmlns=\"http://www.w3.org/2000/svg\" width=\"{}\" height=\"{}\" viewBox=\"{}\"{}>",
            escape_attr(&node.id),
            s.width,
            s.height,
            escape_attr(&view_box),
            style.attr()
        ));
        let fill = escape_attr(&fill);
        match &s.shape {
            ShapeKind::Rectangle { corner_radius } => {
                let rx = if *corner_radius > 0.0 {
                    format!(" rx=\"{}\"", corner_radius)
                } else {
                    String::new()
                };
                self.out.push_str(&format!(
                    "<rect x=\"0\" y=\"0\" width=\"{}\" height=\"{}\"{} fill=\"{}\"{}/>",
                    s.width, s.height, rx, fill, stroke
                ));
            }
            ShapeKind::Ellipse => {
                self.out.push_str(&format!(
                    "<ellipse cx=\"{}\" cy=\"{}\" rx=\"{}\" ry=\"{}\" fill=\"{}\"{}/>",
                    s.width / 2.0,
                    s.height / 2.0,
                    s.width / 2.0,
                    s.height / 2.0,
                    fill,
                    stroke
                ));
            }
            ShapeKind::Vector { path, .. } => {
                self.out.push_str(&format!(
                    "<path d=\"{}\" fill=\"{}\"{}/>",
                    escape_attr(path),
                    fill,
                    stroke
                ));
            }
        }
        self.out.push_str("</svg>");
        Ok(())
    }
}

/// Style seeded with absolute placement for flat (version-1) nodes.
fn placed(node: &TemplateNode) -> Style {
    let mut style = Style::new();
    if let Some(pos) = node.position {
        style
            .set("position", "absolute")
            .set("left", px(pos.x))
            .set("top", px(pos.y));
    }
    style
}

fn size(style: &mut Style, width: Length, height: Length) {
    if width != Length::Auto {
        style.set("width", width.to_string());
    }
    if height != Length::Auto {
        style.set("height", height.to_string());
    }
}

fn insets_css(i: &Insets) -> String {
    format!("{} {} {} {}", px(i.top), px(i.right), px(i.bottom), px(i.left))
}

fn padding(style: &mut Style, i: &Insets) {
    if !i.is_zero() {
        style.set("padding", insets_css(i));
    }
}

fn margin(style: &mut Style, i: &Insets) {
    if !i.is_zero() {
        style.set("margin", insets_css(i));
    }
}

fn justify_css(j: Justify) -> &'static str {
    match j {
        Justify::Start => "flex-start",
        Justify::Center => "center",
        Justify::End => "flex-end",
        Justify::SpaceBetween => "space-between",
        Justify::SpaceAround => "space-around",
        Justify::SpaceEvenly => "space-evenly",
    }
}

fn align_css(a: Align) -> &'static str {
    match a {
        Align::Start => "flex-start",
        Align::Center => "center",
        Align::End => "flex-end",
        Align::Stretch => "stretch",
        Align::Baseline => "baseline",
    }
}

fn fit_css(f: ObjectFit) -> &'static str {
    match f {
        ObjectFit::Cover => "cover",
        ObjectFit::Contain => "contain",
        ObjectFit::Fill => "fill",
        ObjectFit::None => "none",
        ObjectFit::ScaleDown => "scale-down",
    }
}
