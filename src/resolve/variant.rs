//! Variant application: hide/show overrides on a copy of the tree

use crate::ir::{TemplateNode, TemplateSchema, Variant, VisibilityOp};
use crate::{Error, Result};
use std::collections::HashMap;

/// Final visibility per overridden node id. Overrides apply in list order,
/// so a later entry for the same node wins.
pub fn visibility_overrides(variant: &Variant) -> HashMap<&str, bool> {
    let mut map = HashMap::new();
    for ov in &variant.overrides {
        map.insert(ov.node_id.as_str(), ov.operation == VisibilityOp::Show);
    }
    map
}

/// Top-level nodes of `schema` with the chosen variant's visibility applied.
///
/// `None` keeps every node at its stored visibility. The stored schema is
/// never mutated.
pub fn apply_variant(schema: &TemplateSchema, variant_id: Option<&str>) -> Result<Vec<TemplateNode>> {
    let mut nodes = schema.top_level().to_vec();
    let Some(id) = variant_id else {
        return Ok(nodes);
    };
    let variant = schema
        .variant(id)
        .ok_or_else(|| Error::UnknownVariant(id.to_string()))?;
    let overrides = visibility_overrides(variant);
    for node in &mut nodes {
        set_visibility(node, &overrides);
    }
    log::debug!("applied variant '{}' ({} overrides)", id, overrides.len());
    Ok(nodes)
}

fn set_visibility(node: &mut TemplateNode, overrides: &HashMap<&str, bool>) {
    if let Some(visible) = overrides.get(node.id.as_str()) {
        node.visible = *visible;
    }
    if let Some(children) = node.children_mut() {
        for child in children {
            set_visibility(child, overrides);
        }
    }
}
