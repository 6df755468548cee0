//! `TemplateSchema` and the validation gate every persisted schema passes
//!
//! A schema can only be obtained through [`SchemaBuilder::build`] or by
//! deserializing the wire format, and both paths run the same checks:
//!
//! 1. node ids are unique;
//! 2. variant overrides and binding index rows reference existing nodes;
//! 3. the canvas is non-empty;
//! 4. version 1 is a flat list of leaves, version 2 is rooted at one Frame.
//!
//! Violations are rejected, never repaired.

use super::binding::{BindingEntry, FieldPath};
use super::node::{NodeKind, TemplateNode};
use crate::{color::Color, Canvas, Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum SchemaVersion {
    /// Flat list of absolutely positioned leaves (legacy)
    V1,
    /// Nested tree rooted at a Frame with flex/box layout
    V2,
}

impl TryFrom<u8> for SchemaVersion {
    type Error = String;

    fn try_from(v: u8) -> std::result::Result<Self, Self::Error> {
        match v {
            1 => Ok(SchemaVersion::V1),
            2 => Ok(SchemaVersion::V2),
            other => Err(format!("unsupported schema version {}", other)),
        }
    }
}

impl From<SchemaVersion> for u8 {
    fn from(v: SchemaVersion) -> u8 {
        match v {
            SchemaVersion::V1 => 1,
            SchemaVersion::V2 => 2,
        }
    }
}

/// A named color token.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    #[serde(default)]
    pub editable: bool,
    /// Derived tokens are computed from another token on every resolution
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derive: Option<Derivation>,
}

impl TokenDef {
    pub fn editable(default: impl Into<String>) -> Self {
        Self {
            default: Some(default.into()),
            editable: true,
            derive: None,
        }
    }

    pub fn fixed(default: impl Into<String>) -> Self {
        Self {
            default: Some(default.into()),
            editable: false,
            derive: None,
        }
    }

    pub fn lighten(from: impl Into<String>, percent: f32) -> Self {
        Self {
            default: None,
            editable: false,
            derive: Some(Derivation::Lighten {
                from: from.into(),
                percent,
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase")]
pub enum Derivation {
    Lighten { from: String, percent: f32 },
}

impl Derivation {
    pub fn source(&self) -> &str {
        match self {
            Derivation::Lighten { from, .. } => from,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisibilityOp {
    Hide,
    Show,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VariantOverride {
    pub node_id: String,
    pub operation: VisibilityOp,
}

/// A named set of hide/show overrides, e.g. "1 speaker" vs "3 speakers".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Variant {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub overrides: Vec<VariantOverride>,
}

impl Variant {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            overrides: Vec::new(),
        }
    }

    pub fn hide(mut self, node_id: impl Into<String>) -> Self {
        self.overrides.push(VariantOverride {
            node_id: node_id.into(),
            operation: VisibilityOp::Hide,
        });
        self
    }

    pub fn show(mut self, node_id: impl Into<String>) -> Self {
        self.overrides.push(VariantOverride {
            node_id: node_id.into(),
            operation: VisibilityOp::Show,
        });
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateSchema {
    id: String,
    title: String,
    canvas: Canvas,
    version: SchemaVersion,
    #[serde(skip_serializing_if = "Option::is_none")]
    root: Option<TemplateNode>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    nodes: Vec<TemplateNode>,
    tokens: BTreeMap<String, TokenDef>,
    variants: Vec<Variant>,
    bindings: Vec<BindingEntry>,
}

/// Wire shape of a persisted schema; converted through the validation gate.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchemaRepr {
    id: String,
    #[serde(default)]
    title: String,
    canvas: Canvas,
    version: SchemaVersion,
    #[serde(default)]
    root: Option<TemplateNode>,
    #[serde(default)]
    nodes: Vec<TemplateNode>,
    #[serde(default)]
    tokens: BTreeMap<String, TokenDef>,
    #[serde(default)]
    variants: Vec<Variant>,
    #[serde(default)]
    bindings: Vec<BindingEntry>,
}

impl<'de> Deserialize<'de> for TemplateSchema {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let repr = SchemaRepr::deserialize(deserializer)?;
        let builder = SchemaBuilder {
            id: repr.id,
            title: repr.title,
            canvas: repr.canvas,
            version: repr.version,
            root: repr.root,
            nodes: repr.nodes,
            tokens: repr.tokens,
            variants: repr.variants,
        };
        builder
            .build_with_index(&repr.bindings)
            .map_err(serde::de::Error::custom)
    }
}

impl TemplateSchema {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn canvas(&self) -> Canvas {
        self.canvas
    }

    pub fn version(&self) -> SchemaVersion {
        self.version
    }

    pub fn root(&self) -> Option<&TemplateNode> {
        self.root.as_ref()
    }

    /// Top-level nodes: the flat list for version 1, the Frame for version 2.
    pub fn top_level(&self) -> &[TemplateNode] {
        match &self.root {
            Some(root) => std::slice::from_ref(root),
            None => &self.nodes,
        }
    }

    pub fn tokens(&self) -> &BTreeMap<String, TokenDef> {
        &self.tokens
    }

    pub fn variants(&self) -> &[Variant] {
        &self.variants
    }

    pub fn variant(&self, id: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.id == id)
    }

    /// Every bound node with its field and kind, in pre-order.
    pub fn bindings(&self) -> &[BindingEntry] {
        &self.bindings
    }

    pub fn find(&self, id: &str) -> Option<&TemplateNode> {
        self.top_level().iter().find_map(|n| n.find(id))
    }

    /// Pre-order traversal over every node.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a TemplateNode)) {
        for node in self.top_level() {
            node.walk(f);
        }
    }

    pub fn node_count(&self) -> usize {
        let mut n = 0;
        self.walk(&mut |_| n += 1);
        n
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Collects the parts of a schema and validates them on `build`.
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    id: String,
    title: String,
    canvas: Canvas,
    version: SchemaVersion,
    root: Option<TemplateNode>,
    nodes: Vec<TemplateNode>,
    tokens: BTreeMap<String, TokenDef>,
    variants: Vec<Variant>,
}

impl SchemaBuilder {
    /// Version-1 schema over a flat list of positioned leaves.
    pub fn flat(id: impl Into<String>, canvas: Canvas, nodes: Vec<TemplateNode>) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            canvas,
            version: SchemaVersion::V1,
            root: None,
            nodes,
            tokens: BTreeMap::new(),
            variants: Vec::new(),
        }
    }

    /// Version-2 schema rooted at `root`, which must be a Frame.
    pub fn tree(id: impl Into<String>, canvas: Canvas, root: TemplateNode) -> Self {
        Self {
            id: id.into(),
            title: String::new(),
            canvas,
            version: SchemaVersion::V2,
            root: Some(root),
            nodes: Vec::new(),
            tokens: BTreeMap::new(),
            variants: Vec::new(),
        }
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn token(mut self, name: impl Into<String>, def: TokenDef) -> Self {
        self.tokens.insert(name.into(), def);
        self
    }

    pub fn tokens(mut self, tokens: BTreeMap<String, TokenDef>) -> Self {
        self.tokens.extend(tokens);
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variants.push(variant);
        self
    }

    pub fn variants(mut self, variants: Vec<Variant>) -> Self {
        self.variants.extend(variants);
        self
    }

    pub fn build(self) -> Result<TemplateSchema> {
        self.build_with_index(&[])
    }

    /// Validate and build; `stored_index` rows (from a persisted schema) must
    /// reference existing nodes and are then replaced by the recomputed index.
    fn build_with_index(self, stored_index: &[BindingEntry]) -> Result<TemplateSchema> {
        if self.canvas.width == 0 || self.canvas.height == 0 {
            return Err(Error::InvalidCanvas {
                width: i64::from(self.canvas.width),
                height: i64::from(self.canvas.height),
            });
        }

        check_structure(self.version, self.root.as_ref(), &self.nodes)?;

        let top: &[TemplateNode] = match &self.root {
            Some(root) => std::slice::from_ref(root),
            None => &self.nodes,
        };

        let mut ids: HashSet<&str> = HashSet::new();
        let mut duplicate = None;
        let mut bindings = Vec::new();
        let mut bad_path = None;
        for node in top {
            node.walk(&mut |n| {
                if !ids.insert(n.id.as_str()) && duplicate.is_none() {
                    duplicate = Some(n.id.clone());
                }
                if let Some(b) = n.binding() {
                    if FieldPath::parse(&b.field).is_err() && bad_path.is_none() {
                        bad_path = Some(b.field.clone());
                    }
                    bindings.push(BindingEntry {
                        node_id: n.id.clone(),
                        field: b.field.clone(),
                        kind: b.kind,
                    });
                }
            });
        }
        if let Some(id) = duplicate {
            return Err(Error::DuplicateNodeId(id));
        }
        if let Some(path) = bad_path {
            return Err(Error::InvalidFieldPath(path));
        }

        for entry in stored_index {
            if !ids.contains(entry.node_id.as_str()) {
                return Err(Error::DanglingReference {
                    node_id: entry.node_id.clone(),
                    referrer: format!("binding index entry for '{}'", entry.field),
                });
            }
        }

        let mut variant_ids = HashSet::new();
        for variant in &self.variants {
            if !variant_ids.insert(variant.id.as_str()) {
                return Err(Error::StructureError(format!("duplicate variant id '{}'", variant.id)));
            }
            for ov in &variant.overrides {
                if !ids.contains(ov.node_id.as_str()) {
                    return Err(Error::DanglingReference {
                        node_id: ov.node_id.clone(),
                        referrer: format!("variant '{}'", variant.id),
                    });
                }
            }
        }

        check_tokens(&self.tokens)?;

        Ok(TemplateSchema {
            id: self.id,
            title: self.title,
            canvas: self.canvas,
            version: self.version,
            root: self.root,
            nodes: self.nodes,
            tokens: self.tokens,
            variants: self.variants,
            bindings,
        })
    }
}

fn check_structure(version: SchemaVersion, root: Option<&TemplateNode>, nodes: &[TemplateNode]) -> Result<()> {
    match version {
        SchemaVersion::V1 => {
            if root.is_some() {
                return Err(Error::StructureError("version 1 schemas have no root frame".into()));
            }
            if let Some(n) = nodes.iter().find(|n| n.is_container()) {
                return Err(Error::StructureError(format!(
                    "version 1 schemas are flat; node '{}' is a {} container",
                    n.id,
                    n.kind_name()
                )));
            }
        }
        SchemaVersion::V2 => {
            let root = root.ok_or_else(|| Error::StructureError("version 2 schemas need a root frame".into()))?;
            if !nodes.is_empty() {
                return Err(Error::StructureError("version 2 schemas keep all nodes under the root frame".into()));
            }
            if !matches!(root.kind, NodeKind::Frame(_)) {
                return Err(Error::StructureError(format!(
                    "root '{}' must be a frame, found {}",
                    root.id,
                    root.kind_name()
                )));
            }
            let mut nested = None;
            for child in root.children() {
                child.walk(&mut |n| {
                    if matches!(n.kind, NodeKind::Frame(_)) && nested.is_none() {
                        nested = Some(n.id.clone());
                    }
                });
            }
            if let Some(id) = nested {
                return Err(Error::StructureError(format!("frame '{}' is only allowed as the root", id)));
            }
        }
    }
    Ok(())
}

fn check_tokens(tokens: &BTreeMap<String, TokenDef>) -> Result<()> {
    for (name, def) in tokens {
        match (&def.default, &def.derive) {
            (None, None) => {
                return Err(Error::StructureError(format!("token '{}' has neither a default nor a derivation", name)));
            }
            (Some(_), Some(_)) => {
                return Err(Error::StructureError(format!("derived token '{}' cannot store a default", name)));
            }
            (Some(value), None) => {
                value.parse::<Color>()?;
            }
            (None, Some(derivation)) => {
                if !tokens.contains_key(derivation.source()) {
                    return Err(Error::StructureError(format!(
                        "token '{}' derives from unknown token '{}'",
                        name,
                        derivation.source()
                    )));
                }
            }
        }
    }

    // A derivation chain longer than the token count must revisit a token.
    for name in tokens.keys() {
        let mut current = name.as_str();
        let mut steps = 0;
        while let Some(d) = tokens.get(current).and_then(|t| t.derive.as_ref()) {
            current = d.source();
            steps += 1;
            if steps > tokens.len() {
                return Err(Error::StructureError(format!("token '{}' has a cyclic derivation", name)));
            }
        }
    }
    Ok(())
}
