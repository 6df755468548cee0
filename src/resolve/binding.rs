//! Field value lookup for bound nodes
//!
//! Lookup order for a field path `F`:
//! 1. a literal top-level value (the key `F` itself, or the structured walk
//!    `people -> [0] -> role` through the submitted values);
//! 2. the same lookup inside `dynamicFields`;
//! 3. nothing: the node keeps its placeholder and an
//!    `unresolved binding` diagnostic is reported.
//!
//! Open slots (`people[].role`) are numbered per path in traversal order, so
//! repeated identical placeholders take successive list entries.

use crate::ir::{Binding, FieldPath, NodeId, PathSegment, TemplateNode};
use crate::Diagnostic;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, HashMap};

/// Submitted form data
///
/// Fixed-column fields arrive at the top level; schema-specific fields live
/// under `dynamicFields`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    #[serde(default, rename = "dynamicFields", skip_serializing_if = "Map::is_empty")]
    pub dynamic_fields: Map<String, Value>,
    #[serde(flatten)]
    pub values: Map<String, Value>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueSource {
    Literal,
    Dynamic,
}

impl Submission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), value.into());
        self
    }

    pub fn with_dynamic(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.dynamic_fields.insert(key.into(), value.into());
        self
    }

    /// Look a path up, literal values first, then dynamic fields.
    pub fn lookup(&self, path: &FieldPath) -> Option<(String, ValueSource)> {
        let raw = path.to_string();
        if let Some(v) = lookup_in(&self.values, &raw, path) {
            return Some((v, ValueSource::Literal));
        }
        lookup_in(&self.dynamic_fields, &raw, path).map(|v| (v, ValueSource::Dynamic))
    }
}

fn lookup_in(map: &Map<String, Value>, raw: &str, path: &FieldPath) -> Option<String> {
    if let Some(text) = map.get(raw).and_then(scalar_text) {
        return Some(text);
    }
    let mut segments = path.segments().iter();
    let mut current = match segments.next() {
        Some(PathSegment::Key(k)) => map.get(k)?,
        _ => return None,
    };
    for seg in segments {
        current = match seg {
            PathSegment::Key(k) => current.get(k.as_str())?,
            PathSegment::Index(i) => current.get(*i)?,
            PathSegment::Slot => return None,
        };
    }
    scalar_text(current)
}

/// Blank strings count as "not supplied".
fn scalar_text(v: &Value) -> Option<String> {
    match v {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedValue {
    /// Concrete path the value came from (slots filled in)
    pub field: String,
    pub value: String,
}

/// Values for every visible bound node, plus the diagnostics for those left unresolved
#[derive(Debug, Clone, Default)]
pub struct ResolvedBindings {
    pub values: BTreeMap<NodeId, ResolvedValue>,
    pub diagnostics: Vec<Diagnostic>,
}

impl ResolvedBindings {
    pub fn get(&self, node_id: &str) -> Option<&ResolvedValue> {
        self.values.get(node_id)
    }
}

/// Resolves bindings one occurrence at a time, numbering open slots as it goes
pub struct BindingResolver<'s> {
    submission: &'s Submission,
    slots: HashMap<String, usize>,
}

impl<'s> BindingResolver<'s> {
    pub fn new(submission: &'s Submission) -> Self {
        Self {
            submission,
            slots: HashMap::new(),
        }
    }

    /// Concrete path for this occurrence; consumes a slot index when the path has one.
    fn concrete_path(&mut self, field: &str) -> Option<FieldPath> {
        let path = FieldPath::parse(field).ok()?;
        if !path.has_slot() {
            return Some(path);
        }
        let counter = self.slots.entry(field.to_string()).or_insert(0);
        let filled = path.fill_slot(*counter);
        *counter += 1;
        Some(filled)
    }

    pub fn resolve(&mut self, binding: &Binding) -> std::result::Result<ResolvedValue, String> {
        let path = match self.concrete_path(&binding.field) {
            Some(p) => p,
            None => return Err(binding.field.clone()),
        };
        let field = path.to_string();
        match self.submission.lookup(&path) {
            Some((value, source)) => {
                log::debug!("binding {} resolved from {:?} value", field, source);
                Ok(ResolvedValue { field, value })
            }
            None => Err(field),
        }
    }

    /// Resolve every visible bound node under `nodes`, in pre-order.
    pub fn resolve_tree(mut self, nodes: &[TemplateNode]) -> ResolvedBindings {
        let mut out = ResolvedBindings::default();
        for node in nodes {
            self.visit(node, &mut out);
        }
        out
    }

    fn visit(&mut self, node: &TemplateNode, out: &mut ResolvedBindings) {
        if !node.visible {
            return;
        }
        if let Some(binding) = node.binding() {
            match self.resolve(binding) {
                Ok(v) => {
                    out.values.insert(node.id.clone(), v);
                }
                Err(field) => out.diagnostics.push(Diagnostic::unresolved_binding(&field, &node.id)),
            }
        }
        for child in node.children() {
            self.visit(child, out);
        }
    }
}

/// Apply a resolved text value: replace one occurrence of the placeholder
/// literal when the content carries it, otherwise the whole content.
pub fn apply_text(content: &str, binding: &Binding, value: &str) -> String {
    match binding.placeholder.as_deref() {
        Some(literal) if !literal.is_empty() && content.contains(literal) => content.replacen(literal, value, 1),
        _ => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{BindingKind, NodeKind, TextNode};
    use serde_json::json;

    fn bound_text(id: &str, content: &str, field: &str) -> TemplateNode {
        let mut t = TextNode::new(content);
        t.binding = Some(Binding::new(field, BindingKind::Text).with_placeholder(content));
        TemplateNode::new(id, NodeKind::Text(t))
    }

    #[test]
    fn literal_value_wins_over_dynamic_field() {
        let sub = Submission::new()
            .with_value("eventTitle", "Literal")
            .with_dynamic("eventTitle", "Dynamic");
        let path = FieldPath::parse("eventTitle").unwrap();
        assert_eq!(sub.lookup(&path), Some(("Literal".to_string(), ValueSource::Literal)));
    }

    #[test]
    fn dynamic_fields_are_the_fallback() {
        let sub = Submission::new().with_dynamic("venueNote", "Back entrance");
        let path = FieldPath::parse("venueNote").unwrap();
        assert_eq!(sub.lookup(&path).map(|v| v.1), Some(ValueSource::Dynamic));
    }

    #[test]
    fn blank_literal_falls_through() {
        let sub = Submission::new().with_value("city", "  ").with_dynamic("city", "Berlin");
        let path = FieldPath::parse("city").unwrap();
        assert_eq!(sub.lookup(&path).unwrap().0, "Berlin");
    }

    #[test]
    fn indexed_paths_walk_lists_positionally() {
        let sub: Submission = serde_json::from_value(json!({
            "people": [{"role": "Engineer @ Acme"}, {"role": "Designer @ Acme"}],
            "dynamicFields": {"extra": 3}
        }))
        .unwrap();
        let path = FieldPath::parse("people[1].role").unwrap();
        assert_eq!(sub.lookup(&path).unwrap().0, "Designer @ Acme");
        assert_eq!(sub.lookup(&FieldPath::parse("extra").unwrap()).unwrap().0, "3");
        assert!(sub.lookup(&FieldPath::parse("people[5].role").unwrap()).is_none());
    }

    #[test]
    fn repeated_slot_placeholders_take_successive_entries() {
        let sub: Submission = serde_json::from_value(json!({
            "people": [{"role": "Engineer @ Acme"}, {"role": "Designer @ Acme"}]
        }))
        .unwrap();
        let nodes = vec![
            bound_text("a", "Role @ Company", "people[].role"),
            bound_text("b", "Role @ Company", "people[].role"),
        ];
        let resolved = BindingResolver::new(&sub).resolve_tree(&nodes);
        assert_eq!(resolved.get("a").unwrap().value, "Engineer @ Acme");
        assert_eq!(resolved.get("a").unwrap().field, "people[0].role");
        assert_eq!(resolved.get("b").unwrap().value, "Designer @ Acme");
        assert!(resolved.diagnostics.is_empty());
    }

    #[test]
    fn hidden_nodes_neither_resolve_nor_consume_slots() {
        let sub: Submission = serde_json::from_value(json!({"people": [{"name": "Ada Lovelace"}]})).unwrap();
        let mut hidden = bound_text("a", "Jane Doe", "people[].name");
        hidden.visible = false;
        let nodes = vec![hidden, bound_text("b", "Jane Doe", "people[].name")];
        let resolved = BindingResolver::new(&sub).resolve_tree(&nodes);
        assert!(resolved.get("a").is_none());
        assert_eq!(resolved.get("b").unwrap().value, "Ada Lovelace");
    }

    #[test]
    fn missing_values_are_reported_not_fatal() {
        let nodes = vec![bound_text("t", "Placeholder", "eventTitle")];
        let resolved = BindingResolver::new(&Submission::new()).resolve_tree(&nodes);
        assert!(resolved.values.is_empty());
        assert_eq!(resolved.diagnostics[0].to_string(), "unresolved binding: eventTitle");
    }

    #[test]
    fn apply_text_replaces_one_placeholder_occurrence() {
        let b = Binding::new("eventTitle", BindingKind::Text).with_placeholder("Placeholder Text");
        assert_eq!(apply_text("Join: Placeholder Text", &b, "Launch"), "Join: Launch");
        assert_eq!(apply_text("Something else", &b, "Launch"), "Launch");
    }
}
