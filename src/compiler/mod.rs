//! Compiler: resolved IR to one self-contained markup document
//!
//! Compilation is a pure function of (schema, variant, tokens, submission,
//! assets): it applies the variant, resolves tokens and bindings, then walks
//! the tree once. Every referenced asset is inlined as a `data:` URI so the
//! output needs no network access.

mod emit;
pub mod html;

use crate::assets::AssetResolver;
use crate::config::{CompileConfig, FontFace};
use crate::ir::{SchemaVersion, TemplateSchema};
use crate::resolve::{apply_variant, BindingResolver, TokenResolver};
use crate::{Diagnostic, FillRequest, Result};
use emit::Emitter;
use html::{escape_attr, escape_text, px};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Markup ready for the external renderer, plus non-fatal diagnostics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompiledDocument {
    pub schema_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    pub width: u32,
    pub height: u32,
    pub html: String,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl CompiledDocument {
    /// Hex-encoded SHA-256 of the markup
    pub fn digest(&self) -> String {
        hex::encode(Sha256::digest(self.html.as_bytes()))
    }

    /// Diagnostics for bindings that kept their placeholder
    pub fn unresolved(&self) -> impl Iterator<Item = &Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == crate::DiagnosticKind::UnresolvedBinding)
    }
}

#[derive(Debug, Clone, Default)]
pub struct Compiler {
    config: CompileConfig,
}

impl Compiler {
    pub fn new(config: CompileConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CompileConfig {
        &self.config
    }

    /// Compile `schema` filled with `request`.
    ///
    /// Fails on an unknown variant, an unknown or invalid token; unresolved
    /// bindings and missing assets only produce diagnostics.
    pub fn compile(
        &self,
        schema: &TemplateSchema,
        request: &FillRequest,
        assets: &dyn AssetResolver,
    ) -> Result<CompiledDocument> {
        let nodes = apply_variant(schema, request.variant.as_deref())?;
        let tokens = TokenResolver::new(schema.tokens(), &request.tokens)?;
        let bindings = BindingResolver::new(&request.submission).resolve_tree(&nodes);

        let mut emitter = Emitter::new(&tokens, &bindings, assets);
        let canvas = schema.canvas();
        match schema.version() {
            SchemaVersion::V1 => {
                emitter.out.push_str(&format!(
                    "<div data-schema-id=\"{}\" style=\"position:relative;width:{};height:{};overflow:hidden\">",
                    escape_attr(schema.id()),
                    px(canvas.width as f32),
                    px(canvas.height as f32)
                ));
                for node in &nodes {
                    emitter.node(node)?;
                }
                emitter.out.push_str("</div>");
            }
            SchemaVersion::V2 => {
                for node in &nodes {
                    emitter.node(node)?;
                }
            }
        }
        let body = std::mem::take(&mut emitter.out);
        let mut diagnostics = bindings.diagnostics.clone();
        diagnostics.append(&mut emitter.diagnostics);

        let head_css = self.font_css(assets, &mut diagnostics);
        let html = format!(
            "<!DOCTYPE html><html lang=\"{}\"><head><meta charset=\"utf-8\"><title>{}</title><style>{}html,body{{margin:0;padding:0;width:{};height:{};overflow:hidden}}</style></head><body>{}</body></html>",
            escape_attr(&self.config.lang),
            escape_text(schema.title()),
            head_css,
            px(canvas.width as f32),
            px(canvas.height as f32),
            body
        );

        log::info!(
            "compiled schema '{}' ({} bytes, {} diagnostics)",
            schema.id(),
            html.len(),
            diagnostics.len()
        );

        Ok(CompiledDocument {
            schema_id: schema.id().to_string(),
            variant: request.variant.clone(),
            width: canvas.width,
            height: canvas.height,
            html,
            diagnostics,
        })
    }

    fn font_css(&self, assets: &dyn AssetResolver, diagnostics: &mut Vec<Diagnostic>) -> String {
        let mut css = String::new();
        for face in &self.config.fonts {
            match assets.asset(&face.asset) {
                Some(asset) => css.push_str(&font_face_rule(face, &asset.to_data_uri(), &asset.mime)),
                None => diagnostics.push(Diagnostic::missing_asset(&face.asset, None)),
            }
        }
        if let Some(extra) = &self.config.font_css {
            css.push_str(extra);
        }
        css
    }
}

fn font_face_rule(face: &FontFace, data_uri: &str, mime: &str) -> String {
    let format = match mime {
        "font/woff2" => "woff2",
        "font/woff" => "woff",
        "font/otf" => "opentype",
        _ => "truetype",
    };
    format!(
        "@font-face{{font-family:'{}';font-weight:{};font-style:{};src:url({}) format('{}')}}",
        face.family.replace('\'', ""),
        face.weight,
        face.style,
        data_uri,
        format
    )
}

/// Cache key for a compiled document: schema id, variant, token overrides
/// and a hash of the submission.
pub fn cache_key(schema_id: &str, request: &FillRequest) -> Result<String> {
    let mut hasher = Sha256::new();
    hasher.update(schema_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(request.variant.as_deref().unwrap_or("").as_bytes());
    hasher.update([0u8]);
    for (name, value) in &request.tokens {
        hasher.update(name.as_bytes());
        hasher.update(b"=");
        hasher.update(value.as_bytes());
        hasher.update([0u8]);
    }
    hasher.update(serde_json::to_vec(&request.submission)?);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{Asset, AssetStore};
    use crate::ir::{
        Binding, BindingKind, ColorValue, FrameNode, ImageNode, Mask, NodeKind, SchemaBuilder, ShapeKind, ShapeNode,
        SvgNode, TemplateNode, TextNode, TokenDef, Variant,
    };
    use crate::{Canvas, DiagnosticKind};

    fn canvas() -> Canvas {
        Canvas { width: 400, height: 300 }
    }

    fn flat_schema() -> TemplateSchema {
        let mut title = TextNode::new("Placeholder Text");
        title.color = ColorValue::token("primary");
        title.binding = Some(Binding::new("eventTitle", BindingKind::Text).with_placeholder("Placeholder Text"));
        let mut logo = ImageNode { src: "logo-placeholder".into(), ..Default::default() };
        logo.binding = Some(Binding::new("logo", BindingKind::Image));
        SchemaBuilder::flat(
            "launch",
            canvas(),
            vec![
                TemplateNode::new("title", NodeKind::Text(title)).at(10.0, 20.0),
                TemplateNode::new("logo", NodeKind::Image(logo)).at(0.0, 0.0),
            ],
        )
        .token("primary", TokenDef::editable("#3D9DFF"))
        .variant(Variant::new("no-logo", "No logo").hide("logo"))
        .build()
        .unwrap()
    }

    #[test]
    fn flat_schema_places_nodes_absolutely() {
        let req = FillRequest::from_json(r#"{"eventTitle": "Launch Night"}"#).unwrap();
        let doc = Compiler::default().compile(&flat_schema(), &req, &AssetStore::new()).unwrap();
        assert!(doc.html.contains("position:absolute;left:10px;top:20px"));
        assert!(doc.html.contains(">Launch Night</div>"));
        assert!(doc.html.contains("color:#3d9dff"));
        assert!(!doc.html.contains("Placeholder Text"));
    }

    #[test]
    fn unresolved_image_keeps_placeholder_and_reports() {
        let req = FillRequest::from_json(r#"{"eventTitle": "Launch Night"}"#).unwrap();
        let doc = Compiler::default().compile(&flat_schema(), &req, &AssetStore::new()).unwrap();
        assert!(doc.html.contains("src=\"logo-placeholder\""));
        let unresolved: Vec<String> = doc.unresolved().map(|d| d.to_string()).collect();
        assert_eq!(unresolved, vec!["unresolved binding: logo"]);
        assert!(doc.diagnostics.iter().any(|d| d.kind == DiagnosticKind::MissingAsset));
    }

    #[test]
    fn variant_hides_nodes_from_output() {
        let req = FillRequest::default().with_variant("no-logo");
        let doc = Compiler::default().compile(&flat_schema(), &req, &AssetStore::new()).unwrap();
        assert!(!doc.html.contains("data-node-id=\"logo\""));
        assert_eq!(doc.unresolved().count(), 1);
    }

    #[test]
    fn token_override_and_unknown_token() {
        let req = FillRequest::default().with_token("primary", "#ff0000");
        let doc = Compiler::default().compile(&flat_schema(), &req, &AssetStore::new()).unwrap();
        assert!(doc.html.contains("color:#ff0000"));

        let req = FillRequest::default().with_token("accent", "#ff0000");
        assert!(Compiler::default().compile(&flat_schema(), &req, &AssetStore::new()).is_err());
    }

    #[test]
    fn masked_svg_inlines_image_and_unique_mask_id() {
        let svg = SvgNode {
            width: 100.0,
            height: 100.0,
            view_box: "0 0 100 100".into(),
            mask: Some(Mask { id: "mask".into(), path: "M0 0H100V100H0Z".into(), offset: None }),
            image: Some("photo".into()),
            binding: None,
        };
        let shape = ShapeNode {
            width: 10.0,
            height: 10.0,
            shape: ShapeKind::Ellipse,
            fill: Some(ColorValue::literal("#000")),
            stroke: None,
        };
        let root = TemplateNode::new(
            "root",
            NodeKind::Frame(FrameNode {
                width: 400,
                height: 300,
                padding: Default::default(),
                background: Some(ColorValue::literal("#ffffff")),
                children: vec![
                    TemplateNode::new("photo-slot", NodeKind::Svg(svg)),
                    TemplateNode::new("dot", NodeKind::Shape(shape)),
                ],
            }),
        );
        let schema = SchemaBuilder::tree("t", canvas(), root).build().unwrap();
        let mut assets = AssetStore::new();
        assets.insert("photo", Asset::new("image/png", vec![0x89, b'P', b'N', b'G']));
        let doc = Compiler::default().compile(&schema, &FillRequest::default(), &assets).unwrap();
        assert!(doc.html.contains("<mask id=\"photo-slot-mask\">"));
        assert!(doc.html.contains("mask=\"url(#photo-slot-mask)\""));
        assert!(doc.html.contains("href=\"data:image/png;base64,"));
        assert!(doc.html.contains("<ellipse cx=\"5\" cy=\"5\" rx=\"5\" ry=\"5\" fill=\"#000\"/>"));
        assert!(doc.diagnostics.is_empty());
    }

    #[test]
    fn compilation_is_deterministic() {
        let req = FillRequest::from_json(r#"{"eventTitle": "Launch Night", "dynamicFields": {"a": 1}}"#).unwrap();
        let c = Compiler::default();
        let a = c.compile(&flat_schema(), &req, &AssetStore::new()).unwrap();
        let b = c.compile(&flat_schema(), &req, &AssetStore::new()).unwrap();
        assert_eq!(a.html, b.html);
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn fonts_are_embedded_or_reported() {
        let config = CompileConfig {
            fonts: vec![
                FontFace { family: "Inter".into(), weight: 700, style: "normal".into(), asset: "inter-bold".into() },
                FontFace { family: "Gone".into(), weight: 400, style: "normal".into(), asset: "gone".into() },
            ],
            ..Default::default()
        };
        let mut assets = AssetStore::new();
        assets.insert("inter-bold", Asset::from_bytes(b"wOF2....".to_vec()));
        let doc = Compiler::new(config).compile(&flat_schema(), &FillRequest::default(), &assets).unwrap();
        assert!(doc.html.contains("@font-face{font-family:'Inter';font-weight:700"));
        assert!(doc.html.contains("format('woff2')"));
        assert!(doc.diagnostics.iter().any(|d| d.kind == DiagnosticKind::MissingAsset && d.subject == "gone"));
    }

    #[test]
    fn cache_key_tracks_every_input() {
        let base = FillRequest::from_json(r#"{"eventTitle": "A"}"#).unwrap();
        let k1 = cache_key("s", &base).unwrap();
        assert_eq!(k1, cache_key("s", &base).unwrap());
        assert_ne!(k1, cache_key("other", &base).unwrap());
        assert_ne!(k1, cache_key("s", &base.clone().with_variant("v")).unwrap());
        assert_ne!(k1, cache_key("s", &base.clone().with_token("primary", "#fff")).unwrap());
        let changed = FillRequest::from_json(r#"{"eventTitle": "B"}"#).unwrap();
        assert_ne!(k1, cache_key("s", &changed).unwrap());
    }
}
