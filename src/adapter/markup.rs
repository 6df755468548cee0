//! Markup adapter
//!
//! Parses one freeform markup document with inline styles into a version-2
//! schema. The root is the element sized to the configured canvas; every
//! element below it becomes a Flex or Box container, a run of Text leaves,
//! an Image, a masked Svg or a static vector Shape.

use super::heuristics::BindingInference;
use super::mask::{
    element_path, ellipse_path, masked_pair, outline_elements, view_box_size, ChildRole, MaskCandidate, SHAPE_TAGS,
};
use super::style::{self, color_value, InlineStyle};
use crate::config::MarkupConfig;
use crate::ir::{
    Binding, BindingKind, BoxNode, ColorValue, FlexNode, FrameNode, ImageDisplay, ImageNode, Length, Mask, NodeId,
    NodeIdAllocator, NodeKind, SchemaBuilder, ShapeKind, ShapeNode, SvgNode, TemplateNode, TextAlign, TextNode,
    Typography, Variant, VariantOverride,
};
use crate::{AssetStore, Canvas, Diagnostic, DiagnosticKind, Error, Import, Result, SourceAdapter};
use scraper::{ElementRef, Html, Selector};

/// Elements that never produce nodes
const IGNORED_TAGS: [&str; 10] = [
    "script", "style", "head", "meta", "link", "title", "template", "noscript", "br", "iframe",
];

/// Elements that may appear inside a text leaf without breaking it up
const INLINE_TAGS: [&str; 18] = [
    "span", "b", "strong", "em", "i", "u", "s", "small", "sup", "sub", "mark", "a", "br", "code", "abbr", "time",
    "label", "font",
];

fn is_bold_tag(tag: &str) -> bool {
    matches!(tag, "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "b" | "strong" | "th")
}

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| Error::ParseError(format!("invalid selector '{}': {:?}", css, e)))
}

/// Local-name attribute lookup that also finds namespaced ones (`xlink:href`).
fn attr<'a>(el: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value()
        .attrs()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, v)| v)
}

fn dimension(el: &ElementRef<'_>, style: &InlineStyle, prop: &str) -> Option<Length> {
    style.length(prop).or_else(|| attr(el, prop).and_then(Length::parse))
}

/// Typography and color inherited down the element tree
#[derive(Debug, Clone, Default)]
struct TextContext {
    font: Typography,
    align: TextAlign,
    color: ColorValue,
}

impl TextContext {
    fn inherit(&self, tag: &str, style: &InlineStyle, config: &MarkupConfig) -> Self {
        let mut next = self.clone();
        if let Some(size) = style.get("font-size").and_then(|v| style::font_size(v, self.font.size)) {
            next.font.size = size;
        }
        if let Some(family) = style.get("font-family").and_then(style::font_family) {
            next.font.family = family;
        }
        match style.get("font-weight").and_then(style::font_weight) {
            Some(weight) => next.font.weight = weight,
            None if is_bold_tag(tag) => next.font.weight = 700,
            None => {}
        }
        if let Some(lh) = style.get("line-height") {
            next.font.line_height = style::line_height(lh, next.font.size);
        }
        if let Some(align) = style.text_align() {
            next.align = align;
        }
        if let Some(color) = style.get("color") {
            next.color = color_value(color, &config.tokens);
        }
        next
    }
}

/// One graphic element inside an inline `<svg>`
struct SvgLeaf<'a>(ElementRef<'a>);

impl MaskCandidate for SvgLeaf<'_> {
    fn role(&self) -> ChildRole {
        let name = self.0.value().name();
        if name == "image" {
            return ChildRole::Image;
        }
        let pattern_fill = attr(&self.0, "fill").map(|f| f.trim_start().starts_with("url(")).unwrap_or(false);
        if SHAPE_TAGS.contains(&name) && !pattern_fill {
            ChildRole::Shape
        } else {
            ChildRole::Other
        }
    }
}

/// Adapter for markup documents
#[derive(Debug, Clone, Default)]
pub struct MarkupAdapter {
    config: MarkupConfig,
}

impl MarkupAdapter {
    pub fn new(config: MarkupConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MarkupConfig {
        &self.config
    }
}

impl SourceAdapter for MarkupAdapter {
    type Input = str;

    fn import(&self, schema_id: &str, markup: &str) -> Result<Import> {
        let config = &self.config;
        let doc = Html::parse_document(markup);
        let root = find_root(&doc, config.canvas)?;

        let mut walk = Walk {
            config,
            inference: BindingInference::new(config)?,
            ids: NodeIdAllocator::new(),
            emitted: Vec::new(),
            diagnostics: Vec::new(),
        };
        let frame = walk.frame(root);
        let variants = walk.variants(&doc)?;
        log::debug!("markup walk allocated {} node ids", walk.ids.allocated());

        let title = config
            .title
            .clone()
            .or_else(|| document_title(&doc))
            .unwrap_or_else(|| schema_id.to_string());
        let schema = SchemaBuilder::tree(schema_id, config.canvas, frame)
            .title(title)
            .tokens(config.tokens.clone())
            .variants(variants)
            .build()?;

        log::info!(
            "imported markup as '{}' ({} nodes, {} bindings, {} variants)",
            schema.id(),
            schema.node_count(),
            schema.bindings().len(),
            schema.variants().len()
        );
        Ok(Import {
            schema,
            assets: AssetStore::new(),
            diagnostics: walk.diagnostics,
        })
    }
}

/// The element whose inline width and height equal the canvas.
fn find_root(doc: &Html, canvas: Canvas) -> Result<ElementRef<'_>> {
    let styled = selector("[style]")?;
    doc.select(&styled)
        .find(|el| {
            let style = InlineStyle::parse(el.value().attr("style").unwrap_or(""));
            style.px("width") == Some(canvas.width as f32) && style.px("height") == Some(canvas.height as f32)
        })
        .ok_or_else(|| Error::ImportError(format!("no root element sized {} found", canvas)))
}

fn document_title(doc: &Html) -> Option<String> {
    let title = Selector::parse("title").ok()?;
    let text = doc.select(&title).next()?.text().collect::<String>();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Whitespace-collapsed lines of a text leaf, split at `<br>`.
fn text_lines(el: ElementRef<'_>) -> Vec<String> {
    let mut lines = vec![String::new()];
    for node in el.descendants() {
        if let Some(text) = node.value().as_text() {
            if let Some(current) = lines.last_mut() {
                current.push_str(text);
            }
        } else if node.value().as_element().map(|e| e.name()) == Some("br") {
            lines.push(String::new());
        }
    }
    lines
        .iter()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .filter(|l| !l.is_empty())
        .collect()
}

/// Only inline descendants and at least one non-blank text run.
fn is_text_leaf(el: ElementRef<'_>) -> bool {
    let mut has_text = false;
    for node in el.descendants().skip(1) {
        if let Some(text) = node.value().as_text() {
            has_text |= !text.trim().is_empty();
        } else if let Some(child) = node.value().as_element() {
            if !INLINE_TAGS.contains(&child.name()) {
                return false;
            }
        }
    }
    has_text
}

/// State for one import: id allocation, inference and the element-to-node map
struct Walk<'d, 'c> {
    config: &'c MarkupConfig,
    inference: BindingInference<'c>,
    ids: NodeIdAllocator,
    /// Node ids emitted for each source element, for variant selectors
    emitted: Vec<(ElementRef<'d>, Vec<NodeId>)>,
    diagnostics: Vec<Diagnostic>,
}

impl<'d> Walk<'d, '_> {
    fn frame(&mut self, root: ElementRef<'d>) -> TemplateNode {
        let style = InlineStyle::parse(root.value().attr("style").unwrap_or(""));
        let ctx = TextContext::default().inherit(root.value().name(), &style, self.config);
        let id = self.ids.next_id("frame");
        let wrapper = style.is_flex().then(|| self.ids.next_id("flex"));
        let children = self.children(root, &ctx);

        let children = match wrapper {
            Some(flex_id) => vec![TemplateNode::new(
                flex_id,
                NodeKind::Flex(FlexNode {
                    width: Length::Percent(100.0),
                    height: Length::Percent(100.0),
                    direction: style.direction(),
                    justify: style.justify(),
                    align: style.align(),
                    gap: style.gap(),
                    children,
                    ..Default::default()
                }),
            )],
            None => children,
        };
        let frame = FrameNode {
            width: self.config.canvas.width,
            height: self.config.canvas.height,
            padding: style.insets("padding"),
            background: style.background().map(|bg| color_value(bg, &self.config.tokens)),
            children,
        };
        self.emitted.push((root, vec![id.clone()]));
        TemplateNode::new(id, NodeKind::Frame(frame))
    }

    fn children(&mut self, parent: ElementRef<'d>, ctx: &TextContext) -> Vec<TemplateNode> {
        let mut out = Vec::new();
        for child in parent.children() {
            if let Some(text) = child.value().as_text() {
                let content = text.split_whitespace().collect::<Vec<_>>().join(" ");
                if !content.is_empty() {
                    out.push(self.text_node(content, ctx, &InlineStyle::default(), false));
                }
            } else if let Some(el) = ElementRef::wrap(child) {
                self.element(el, ctx, &mut out);
            }
        }
        out
    }

    fn element(&mut self, el: ElementRef<'d>, parent: &TextContext, out: &mut Vec<TemplateNode>) {
        let tag = el.value().name();
        if IGNORED_TAGS.contains(&tag) {
            return;
        }
        let style = InlineStyle::parse(el.value().attr("style").unwrap_or(""));
        let ctx = parent.inherit(tag, &style, self.config);

        let start = out.len();
        match tag {
            "img" => out.push(self.image(el, &style)),
            "svg" => out.extend(self.svg(el, &style)),
            _ if is_text_leaf(el) => {
                let lines = text_lines(el);
                let sized = lines.len() == 1;
                for line in lines {
                    out.push(self.text_node(line, &ctx, &style, sized));
                }
            }
            _ => out.push(self.container(el, &style, &ctx)),
        }
        if style.is_hidden() {
            log::debug!("<{}> is hidden by default", tag);
            for node in &mut out[start..] {
                node.visible = false;
            }
        }
        let ids = out[start..].iter().map(|n| n.id.clone()).collect();
        self.emitted.push((el, ids));
    }

    fn container(&mut self, el: ElementRef<'d>, style: &InlineStyle, ctx: &TextContext) -> TemplateNode {
        let flex = style.is_flex();
        let id = self.ids.next_id(if flex { "flex" } else { "box" });
        let children = self.children(el, ctx);
        let width = style.length("width").unwrap_or_default();
        let height = style.length("height").unwrap_or_default();
        let padding = style.insets("padding");
        let background = style.background().map(|bg| color_value(bg, &self.config.tokens));

        let kind = if flex {
            NodeKind::Flex(FlexNode {
                width,
                height,
                direction: style.direction(),
                justify: style.justify(),
                align: style.align(),
                gap: style.gap(),
                padding,
                background,
                overflow: style.overflow(),
                box_sizing: style.box_sizing(),
                children,
            })
        } else {
            NodeKind::Box(BoxNode {
                width,
                height,
                padding,
                background,
                overflow: style.overflow(),
                box_sizing: style.box_sizing(),
                children,
            })
        };
        TemplateNode::new(id, kind)
    }

    /// `sized` applies the element's own width/height (single-line leaves only).
    fn text_node(&mut self, content: String, ctx: &TextContext, style: &InlineStyle, sized: bool) -> TemplateNode {
        let binding = self.inference.infer(&content);
        let text = TextNode {
            width: if sized { style.length("width").unwrap_or_default() } else { Length::Auto },
            height: if sized { style.length("height").unwrap_or_default() } else { Length::Auto },
            content,
            font: ctx.font.clone(),
            align: ctx.align,
            color: ctx.color.clone(),
            margin: style.insets("margin"),
            binding,
        };
        TemplateNode::new(self.ids.next_id("text"), NodeKind::Text(text))
    }

    /// Map an image source to a static asset key and/or an image binding.
    fn image_source(&self, raw: &str) -> (String, Option<Binding>) {
        let src = self
            .config
            .static_assets
            .iter()
            .find(|r| !r.source_contains.is_empty() && raw.contains(r.source_contains.as_str()))
            .map(|r| r.asset.clone())
            .unwrap_or_else(|| raw.to_string());
        let binding = self
            .config
            .image_fields
            .iter()
            .find(|r| !r.source_contains.is_empty() && raw.contains(r.source_contains.as_str()))
            .map(|r| Binding::new(r.field.clone(), BindingKind::Image));
        (src, binding)
    }

    fn image(&mut self, el: ElementRef<'d>, style: &InlineStyle) -> TemplateNode {
        let raw = attr(&el, "src").or_else(|| attr(&el, "data-src")).unwrap_or("");
        let (src, binding) = self.image_source(raw);
        let image = ImageNode {
            width: dimension(&el, style, "width").unwrap_or_default(),
            height: dimension(&el, style, "height").unwrap_or_default(),
            src,
            fit: style.object_fit(),
            display: match style.get("display") {
                Some("inline") | Some("inline-block") => ImageDisplay::Inline,
                _ => ImageDisplay::Block,
            },
            binding,
        };
        TemplateNode::new(self.ids.next_id("image"), NodeKind::Image(image))
    }

    /// A `{shape, image}` pair becomes a masked Svg, anything else with an
    /// outline a static vector Shape. Outline-less vectors are dropped.
    fn svg(&mut self, el: ElementRef<'d>, style: &InlineStyle) -> Option<TemplateNode> {
        let declared_box = attr(&el, "viewBox");
        let box_size = declared_box.and_then(view_box_size);
        let width = dimension(&el, style, "width")
            .and_then(|l| l.px())
            .or(box_size.map(|b| b.0))
            .unwrap_or(0.0);
        let height = dimension(&el, style, "height")
            .and_then(|l| l.px())
            .or(box_size.map(|b| b.1))
            .unwrap_or(0.0);
        let view_box = declared_box
            .map(str::to_string)
            .unwrap_or_else(|| format!("0 0 {} {}", width, height));

        let leaves: Vec<SvgLeaf<'d>> = el
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|e| e.value().name() == "image" || SHAPE_TAGS.contains(&e.value().name()))
            .filter(|e| {
                !e.ancestors()
                    .filter_map(ElementRef::wrap)
                    .any(|a| a.value().name() == "pattern")
            })
            .map(SvgLeaf)
            .collect();

        if let Some((shape, image)) = masked_pair(&leaves) {
            let id = self.ids.next_id("svg");
            let path = match element_path(&shape.0) {
                Some(path) => path,
                None => {
                    self.diagnostics.push(Diagnostic::mask_fallback(&id));
                    let (w, h) = box_size.unwrap_or((width, height));
                    ellipse_path(w, h)
                }
            };
            let mask_id = shape
                .0
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|a| a.value().name().eq_ignore_ascii_case("mask") || a.value().name().eq_ignore_ascii_case("clippath"))
                .and_then(|a| a.value().attr("id"))
                .unwrap_or("mask")
                .to_string();
            let (src, binding) = self.image_source(attr(&image.0, "href").unwrap_or(""));
            let svg = SvgNode {
                width,
                height,
                view_box,
                mask: Some(Mask {
                    id: mask_id,
                    path,
                    offset: None,
                }),
                image: (!src.is_empty()).then_some(src),
                binding,
            };
            return Some(TemplateNode::new(id, NodeKind::Svg(svg)));
        }

        let outline = outline_elements(el);
        let path: Vec<String> = outline.iter().filter_map(element_path).collect();
        if path.is_empty() {
            log::debug!("skipping <svg> without an outline");
            return None;
        }
        let fill = outline
            .iter()
            .find_map(|e| attr(e, "fill"))
            .or_else(|| attr(&el, "fill"))
            .unwrap_or("#000000");
        let shape = ShapeNode {
            width,
            height,
            shape: ShapeKind::Vector {
                path: path.join(" "),
                view_box: Some(view_box),
            },
            fill: (fill != "none").then(|| color_value(fill, &self.config.tokens)),
            stroke: None,
        };
        Some(TemplateNode::new(self.ids.next_id("shape"), NodeKind::Shape(shape)))
    }

    /// Resolve selector-based variants to the node ids emitted for matches.
    fn variants(&mut self, doc: &'d Html) -> Result<Vec<Variant>> {
        let mut variants = Vec::with_capacity(self.config.variants.len());
        for rule in &self.config.variants {
            let mut variant = Variant::new(rule.id.clone(), rule.name.clone());
            for o in &rule.overrides {
                let sel = selector(&o.selector)?;
                let before = variant.overrides.len();
                for matched in doc.select(&sel) {
                    let emitted = self.emitted.iter().find(|(el, _)| el.id() == matched.id());
                    for node_id in emitted.map(|(_, ids)| ids.as_slice()).unwrap_or_default() {
                        variant.overrides.push(VariantOverride {
                            node_id: node_id.clone(),
                            operation: o.operation,
                        });
                    }
                }
                if variant.overrides.len() == before {
                    self.diagnostics.push(Diagnostic::new(
                        DiagnosticKind::UnmatchedVariantSelector,
                        &o.selector,
                        None,
                    ));
                }
            }
            variants.push(variant);
        }
        Ok(variants)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ImageFieldRule, ReplacementRule, SelectorOverride, StaticAssetRule, VariantRule};
    use crate::ir::{FlexDirection, TokenDef, VisibilityOp};

    const DOC: &str = r##"<!DOCTYPE html>
<html><head><title>Meetup card</title></head>
<body>
<div style="width:400px;height:300px;display:flex;flex-direction:column;padding:20px;background:#3D9DFF">
  <h1 style="font-size:32px;color:#ffffff">Placeholder Text</h1>
  <p>Friday, 12 September</p>
  <div class="speaker speaker-1" style="display:flex;gap:12px">
    <img src="/static/avatar-placeholder.png" style="width:64px;height:64px">
    <div><span>Ada Lovelace</span><br><span>Role @ Company</span></div>
  </div>
  <div class="speaker speaker-2" style="display:flex;gap:12px">
    <img src="/static/avatar-placeholder.png" style="width:64px;height:64px">
    <div><span>Ada Lovelace</span><br><span>Role @ Company</span></div>
  </div>
  <svg width="100" height="100" viewBox="0 0 100 100"><image href="/img/venue.png" width="100" height="100"/><circle cx="50" cy="50" r="50"/></svg>
  <img src="/static/logo.svg" style="width:80px">
  <svg width="10" height="10"><rect width="10" height="10" fill="var(--primary)"/></svg>
</div>
</body></html>"##;

    fn config() -> MarkupConfig {
        let mut cfg = MarkupConfig {
            canvas: Canvas { width: 400, height: 300 },
            ..Default::default()
        };
        cfg.tokens.insert("primary".into(), TokenDef::editable("#3D9DFF"));
        cfg.replacements.push(ReplacementRule::literal("people[].role", "Role @ Company"));
        cfg.image_fields.push(ImageFieldRule {
            source_contains: "avatar".into(),
            field: "people[].photo".into(),
        });
        cfg.static_assets.push(StaticAssetRule {
            source_contains: "logo.svg".into(),
            asset: "logo".into(),
        });
        cfg.variants.push(VariantRule {
            id: "one".into(),
            name: "1 speaker".into(),
            overrides: vec![
                SelectorOverride { selector: ".speaker-2".into(), operation: VisibilityOp::Hide },
                SelectorOverride { selector: ".nothing".into(), operation: VisibilityOp::Hide },
            ],
        });
        cfg
    }

    fn import() -> Import {
        MarkupAdapter::new(config()).import("meetup", DOC).unwrap()
    }

    fn texts(import: &Import) -> Vec<(String, Option<String>)> {
        let mut out = Vec::new();
        import.schema.walk(&mut |n| {
            if let NodeKind::Text(t) = &n.kind {
                out.push((t.content.clone(), t.binding.as_ref().map(|b| b.field.clone())));
            }
        });
        out
    }

    #[test]
    fn root_becomes_frame_with_flex_wrapper() {
        let out = import();
        let root = out.schema.root().unwrap();
        let NodeKind::Frame(frame) = &root.kind else { panic!("expected frame") };
        assert_eq!((frame.width, frame.height), (400, 300));
        assert_eq!(frame.background, Some(ColorValue::token("primary")));
        assert_eq!(frame.padding.top, 20.0);
        assert_eq!(frame.children.len(), 1);
        let NodeKind::Flex(wrapper) = &frame.children[0].kind else { panic!("expected flex wrapper") };
        assert_eq!(wrapper.direction, FlexDirection::Column);
        assert_eq!(out.schema.title(), "Meetup card");
    }

    #[test]
    fn text_leaves_are_not_wrapped_and_split_at_breaks() {
        let out = import();
        let texts = texts(&out);
        assert_eq!(
            texts,
            vec![
                ("Placeholder Text".to_string(), Some("title".to_string())),
                ("Friday, 12 September".to_string(), Some("date".to_string())),
                ("Ada Lovelace".to_string(), Some("people[].name".to_string())),
                ("Role @ Company".to_string(), Some("people[].role".to_string())),
                ("Ada Lovelace".to_string(), Some("people[].name".to_string())),
                ("Role @ Company".to_string(), Some("people[].role".to_string())),
            ]
        );
        // the speaker row holds the avatar and two text nodes directly
        let row = &out.schema.root().unwrap().children()[0].children()[2];
        assert_eq!(row.kind_name(), "flex");
        let kinds: Vec<_> = row.children().iter().map(|c| c.kind_name()).collect();
        assert_eq!(kinds, ["image", "text", "text"]);
    }

    #[test]
    fn typography_is_inherited_and_headings_are_bold() {
        let out = import();
        let heading = out.schema.find("text-3").unwrap();
        let NodeKind::Text(t) = &heading.kind else { panic!() };
        assert_eq!(t.font.size, 32.0);
        assert_eq!(t.font.weight, 700);
        assert_eq!(t.color, ColorValue::literal("#ffffff"));
    }

    #[test]
    fn images_map_to_assets_and_bindings() {
        let out = import();
        let mut images = Vec::new();
        out.schema.walk(&mut |n| {
            if let NodeKind::Image(i) = &n.kind {
                images.push((i.src.clone(), i.binding.as_ref().map(|b| b.field.clone())));
            }
        });
        assert_eq!(images[0], ("/static/avatar-placeholder.png".to_string(), Some("people[].photo".to_string())));
        assert_eq!(images[2], ("logo".to_string(), None));
    }

    #[test]
    fn vector_pairs_become_masked_svgs() {
        let out = import();
        let mut svgs = Vec::new();
        let mut shapes = Vec::new();
        out.schema.walk(&mut |n| match &n.kind {
            NodeKind::Svg(s) => svgs.push(s.clone()),
            NodeKind::Shape(s) => shapes.push(s.clone()),
            _ => {}
        });
        assert_eq!(svgs.len(), 1);
        assert_eq!(svgs[0].image.as_deref(), Some("/img/venue.png"));
        assert_eq!(svgs[0].mask.as_ref().unwrap().path, "M0 50A50 50 0 1 0 100 50A50 50 0 1 0 0 50Z");
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].fill, Some(ColorValue::token("primary")));
    }

    #[test]
    fn variant_selectors_map_to_emitted_ids() {
        let out = import();
        let variant = out.schema.variant("one").unwrap();
        assert_eq!(variant.overrides.len(), 1);
        let hidden = out.schema.find(&variant.overrides[0].node_id).unwrap();
        assert_eq!(hidden.kind_name(), "flex");
        assert_eq!(hidden.children().len(), 3);

        let unmatched: Vec<_> = out
            .diagnostics
            .iter()
            .filter(|d| d.kind == DiagnosticKind::UnmatchedVariantSelector)
            .collect();
        assert_eq!(unmatched.len(), 1);
        assert_eq!(unmatched[0].subject, ".nothing");
    }

    #[test]
    fn hidden_elements_are_kept_for_show_overrides() {
        let doc = r#"<div style="width:400px;height:300px">
  <p class="s1">Ada Lovelace</p>
  <p class="s3" style="display:none">Grace Hopper</p>
</div>"#;
        let mut cfg = config();
        cfg.variants = vec![VariantRule {
            id: "three".into(),
            name: "3 speakers".into(),
            overrides: vec![SelectorOverride { selector: ".s3".into(), operation: VisibilityOp::Show }],
        }];
        let out = MarkupAdapter::new(cfg).import("x", doc).unwrap();

        let variant = out.schema.variant("three").unwrap();
        assert_eq!(variant.overrides.len(), 1);
        let row = out.schema.find(&variant.overrides[0].node_id).unwrap();
        assert!(!row.visible);
        assert_eq!(texts(&out)[1].0, "Grace Hopper");
        assert!(out.diagnostics.is_empty());
    }

    #[test]
    fn ids_are_reproducible() {
        assert_eq!(import().schema, import().schema);
    }

    #[test]
    fn missing_root_is_an_import_error() {
        let err = MarkupAdapter::new(config()).import("x", "<div style=\"width:10px\"></div>").unwrap_err();
        assert!(matches!(err, Error::ImportError(_)));
    }

    #[test]
    fn bad_selector_is_a_parse_error() {
        let mut cfg = config();
        cfg.variants[0].overrides[0].selector = "[[".into();
        let err = MarkupAdapter::new(cfg).import("x", DOC).unwrap_err();
        assert!(matches!(err, Error::ParseError(_)));
    }
}
