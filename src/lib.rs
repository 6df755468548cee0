//! RFox Template Engine
//!
//! Turns visual designs into parametrized templates and fills them with
//! submitted data, producing self-contained markup for a headless renderer.
//!
//! # Features
//!
//! - **Node-graph IR**: one validated schema shape for every input source
//! - **Adapters**: structured design exports and freeform markup documents
//!   normalize into the same [`ir::TemplateSchema`]
//! - **Binding inference**: fields are detected from `{{name}}` layer names
//!   or from an ordered list of text heuristics
//! - **Deterministic compiler**: identical inputs always produce
//!   byte-identical, fully inlined markup
//!
//! # Example
//!
//! ```
//! use rftemplate::ir::{Binding, BindingKind, NodeKind, SchemaBuilder, TemplateNode, TextNode};
//! use rftemplate::{compiler::Compiler, AssetStore, Canvas, FillRequest};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut title = TextNode::new("Placeholder Text");
//! title.binding = Some(Binding::new("eventTitle", BindingKind::Text));
//! let schema = SchemaBuilder::flat(
//!     "launch",
//!     Canvas { width: 1080, height: 1080 },
//!     vec![TemplateNode::new("title", NodeKind::Text(title)).at(40.0, 40.0)],
//! )
//! .build()?;
//!
//! let request = FillRequest::from_json(r#"{"eventTitle": "Launch Night"}"#)?;
//! let doc = Compiler::default().compile(&schema, &request, &AssetStore::new())?;
//! assert!(doc.html.contains("Launch Night"));
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub mod error;
pub use error::{Error, Result};

pub mod adapter;
pub mod assets;
pub mod color;
pub mod compiler;
pub mod config;
pub mod ir;
pub mod render;
pub mod resolve;
pub mod store;

pub use assets::{Asset, AssetResolver, AssetStore, Layered};
pub use compiler::{CompiledDocument, Compiler};
pub use config::{CompileConfig, Config, DesignConfig, MarkupConfig};
pub use resolve::binding::Submission;
pub use store::SchemaStore;

/// Canvas dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Default for Canvas {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1080,
        }
    }
}

impl fmt::Display for Canvas {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Category of a non-fatal condition reported next to a successful result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DiagnosticKind {
    /// A bound field had no value in the submission; the placeholder stays
    UnresolvedBinding,
    /// Neither the mask shape nor its group had vector markup; an ellipse was used
    MaskFallback,
    /// A referenced asset could not be found for inlining
    MissingAsset,
    /// A variant selector matched no emitted node
    UnmatchedVariantSelector,
    /// A submitted value could not be applied to its binding kind
    InvalidBindingValue,
}

/// A non-fatal condition (unresolved binding, degraded mask, missing asset)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Field name, asset key or selector the diagnostic is about
    pub subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_id: Option<String>,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, subject: impl Into<String>, node_id: Option<&str>) -> Self {
        let d = Self {
            kind,
            subject: subject.into(),
            node_id: node_id.map(str::to_string),
        };
        log::warn!("{}", d);
        d
    }

    pub fn unresolved_binding(field: &str, node_id: &str) -> Self {
        Self::new(DiagnosticKind::UnresolvedBinding, field, Some(node_id))
    }

    pub fn mask_fallback(node_id: &str) -> Self {
        Self::new(DiagnosticKind::MaskFallback, node_id, Some(node_id))
    }

    pub fn missing_asset(reference: &str, node_id: Option<&str>) -> Self {
        Self::new(DiagnosticKind::MissingAsset, reference, node_id)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DiagnosticKind::UnresolvedBinding => write!(f, "unresolved binding: {}", self.subject),
            DiagnosticKind::MaskFallback => {
                write!(f, "mask fallback: {} has no vector markup, using ellipse", self.subject)
            }
            DiagnosticKind::MissingAsset => write!(f, "missing asset: {}", self.subject),
            DiagnosticKind::UnmatchedVariantSelector => {
                write!(f, "variant selector matched no node: {}", self.subject)
            }
            DiagnosticKind::InvalidBindingValue => write!(f, "invalid value for binding: {}", self.subject),
        }
    }
}

/// Result of one adapter run: the validated schema plus the assets it references
#[derive(Debug, Clone)]
pub struct Import {
    pub schema: ir::TemplateSchema,
    pub assets: AssetStore,
    pub diagnostics: Vec<Diagnostic>,
}

/// Core trait for source adapters
///
/// An adapter normalizes one external input shape into a validated
/// [`ir::TemplateSchema`]. Each run is independent: adapters hold only
/// configuration and allocate node ids per call.
pub trait SourceAdapter {
    /// The external input this adapter consumes
    type Input: ?Sized;

    /// Build and validate a schema with the given id
    fn import(&self, schema_id: &str, input: &Self::Input) -> Result<Import>;
}

/// Per-render inputs: submitted data, chosen variant and token overrides
///
/// None of these are stored in the schema; the same schema is filled with a
/// fresh `FillRequest` on every render.
///
/// # Examples
///
/// ```
/// let req = rftemplate::FillRequest::from_json(r#"{"eventTitle": "Launch"}"#).unwrap();
/// assert!(req.variant.is_none());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FillRequest {
    #[serde(default)]
    pub submission: Submission,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub tokens: BTreeMap<String, String>,
}

impl FillRequest {
    pub fn new(submission: Submission) -> Self {
        Self {
            submission,
            ..Default::default()
        }
    }

    /// Build a request from submission JSON only
    pub fn from_json(submission_json: &str) -> Result<Self> {
        Ok(Self::new(serde_json::from_str(submission_json)?))
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = Some(variant.into());
        self
    }

    pub fn with_token(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.tokens.insert(name.into(), value.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_canvas() {
        let canvas = Canvas::default();
        assert_eq!(canvas.width, 1080);
        assert_eq!(canvas.height, 1080);
        assert_eq!(canvas.to_string(), "1080x1080");
    }

    #[test]
    fn test_diagnostic_display() {
        let d = Diagnostic::unresolved_binding("logo", "image-2");
        assert_eq!(d.to_string(), "unresolved binding: logo");
        assert_eq!(d.node_id.as_deref(), Some("image-2"));
    }

    #[test]
    fn test_fill_request_builders() {
        let req = FillRequest::default().with_variant("one").with_token("primary", "#ff0000");
        assert_eq!(req.variant.as_deref(), Some("one"));
        assert_eq!(req.tokens.get("primary").map(String::as_str), Some("#ff0000"));
    }
}
