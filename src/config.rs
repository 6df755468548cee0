//! Configuration for the markup adapter and the compiler
//!
//! Everything here deserializes from camelCase JSON so a single config file
//! can drive the command-line tool.

use crate::ir::{BindingKind, TokenDef, Variant, VisibilityOp};
use crate::{Canvas, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Top-level configuration file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    #[serde(default)]
    pub markup: MarkupConfig,
    #[serde(default)]
    pub design: DesignConfig,
    #[serde(default)]
    pub compile: CompileConfig,
}

impl Config {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| Error::ConfigError(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json(&raw)
    }
}

/// How a replacement rule recognizes its text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Pattern {
    /// Matched as a substring of the trimmed text, case-sensitive.
    ///
    /// `"Acme"` also claims `"Engineer @ Acme"`; use the full placeholder
    /// text, or a `^...$` regex, to match a whole line only.
    Literal(String),
    /// Regular expression; the first match is the placeholder literal
    Regex(String),
}

/// Caller-supplied rule tying a text pattern to a named field
///
/// Checked before any heuristic. A field with an open slot (`people[].role`)
/// takes the next list index on every match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplacementRule {
    pub field: String,
    pub pattern: Pattern,
    #[serde(default = "default_text_kind")]
    pub kind: BindingKind,
}

fn default_text_kind() -> BindingKind {
    BindingKind::Text
}

impl ReplacementRule {
    pub fn literal(field: impl Into<String>, literal: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            pattern: Pattern::Literal(literal.into()),
            kind: BindingKind::Text,
        }
    }

    pub fn regex(field: impl Into<String>, regex: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            pattern: Pattern::Regex(regex.into()),
            kind: BindingKind::Text,
        }
    }
}

/// Image sources containing `source_contains` are a known static asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaticAssetRule {
    pub source_contains: String,
    pub asset: String,
}

/// Image sources containing `source_contains` are bound to `field`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFieldRule {
    pub source_contains: String,
    pub field: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SelectorOverride {
    pub selector: String,
    pub operation: VisibilityOp,
}

/// Variant declared against the markup document with CSS selectors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantRule {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub overrides: Vec<SelectorOverride>,
}

/// Field paths assigned by the built-in text heuristics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeuristicFields {
    pub placeholder: String,
    pub date: String,
    pub hours: String,
    pub address: String,
    pub city: String,
    pub role: String,
    pub name: String,
    pub talk: String,
}

impl Default for HeuristicFields {
    fn default() -> Self {
        Self {
            placeholder: "title".to_string(),
            date: "date".to_string(),
            hours: "time".to_string(),
            address: "address".to_string(),
            city: "city".to_string(),
            role: "people[].role".to_string(),
            name: "people[].name".to_string(),
            talk: "people[].talk".to_string(),
        }
    }
}

/// Configuration for the markup adapter
///
/// # Examples
///
/// ```
/// let cfg = rftemplate::MarkupConfig::default();
/// assert_eq!(cfg.canvas.width, 1080);
/// assert!(cfg.placeholder_markers.iter().any(|m| m == "Placeholder"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarkupConfig {
    /// Size of the root container to look for
    pub canvas: Canvas,
    /// Display title for the schema; defaults to the document `<title>`
    pub title: Option<String>,
    pub replacements: Vec<ReplacementRule>,
    pub placeholder_markers: Vec<String>,
    pub static_assets: Vec<StaticAssetRule>,
    pub image_fields: Vec<ImageFieldRule>,
    /// Declared tokens; colors equal to a default become token references
    pub tokens: BTreeMap<String, TokenDef>,
    pub variants: Vec<VariantRule>,
    pub heuristic_fields: HeuristicFields,
}

impl Default for MarkupConfig {
    fn default() -> Self {
        Self {
            canvas: Canvas::default(),
            title: None,
            replacements: Vec::new(),
            placeholder_markers: vec!["Placeholder".to_string(), "Lorem ipsum".to_string()],
            static_assets: Vec::new(),
            image_fields: Vec::new(),
            tokens: BTreeMap::new(),
            variants: Vec::new(),
            heuristic_fields: HeuristicFields::default(),
        }
    }
}

/// Options for the structured-design adapter
///
/// Design exports carry stable node ids, so variants name nodes directly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DesignConfig {
    /// Display title for the schema; defaults to the export's name
    pub title: Option<String>,
    pub tokens: BTreeMap<String, TokenDef>,
    pub variants: Vec<Variant>,
}

/// A font embedded into every compiled document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontFace {
    pub family: String,
    #[serde(default = "default_weight")]
    pub weight: u16,
    #[serde(default = "default_style")]
    pub style: String,
    /// Asset key holding the font file
    pub asset: String,
}

fn default_weight() -> u16 {
    400
}

fn default_style() -> String {
    "normal".to_string()
}

/// Configuration for the compiler
///
/// # Examples
///
/// ```
/// let cfg = rftemplate::CompileConfig::default();
/// assert_eq!(cfg.lang, "en");
/// assert!(cfg.fonts.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileConfig {
    pub fonts: Vec<FontFace>,
    /// Already-inlined font-face stylesheet appended to the document head
    pub font_css: Option<String>,
    pub lang: String,
}

impl Default for CompileConfig {
    fn default() -> Self {
        Self {
            fonts: Vec::new(),
            font_css: None,
            lang: "en".to_string(),
        }
    }
}
