//! Bindings and field paths
//!
//! A field path is a dotted, optionally array-indexed string such as
//! `eventTitle`, `people[0].role` or `people[].role`. The empty index `[]`
//! is an open slot: each occurrence in a document takes the next list entry.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BindingKind {
    Text,
    Image,
    Color,
}

impl fmt::Display for BindingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BindingKind::Text => "text",
            BindingKind::Image => "image",
            BindingKind::Color => "color",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Binding {
    pub field: String,
    pub kind: BindingKind,
    /// Literal the binding was inferred from; resolution replaces one
    /// occurrence of it instead of the whole content
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
}

impl Binding {
    pub fn new(field: impl Into<String>, kind: BindingKind) -> Self {
        Self {
            field: field.into(),
            kind,
            placeholder: None,
        }
    }

    pub fn with_placeholder(mut self, literal: impl Into<String>) -> Self {
        self.placeholder = Some(literal.into());
        self
    }
}

/// One row of a schema's binding index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingEntry {
    pub node_id: String,
    pub field: String,
    pub kind: BindingKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
    Slot,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<PathSegment>,
}

impl FieldPath {
    pub fn parse(raw: &str) -> Result<Self> {
        let invalid = || Error::InvalidFieldPath(raw.to_string());
        if raw.trim().is_empty() {
            return Err(invalid());
        }

        let mut segments = Vec::new();
        for part in raw.split('.') {
            let (key, mut rest) = match part.find('[') {
                Some(i) => (&part[..i], &part[i..]),
                None => (part, ""),
            };
            if !is_identifier(key) {
                return Err(invalid());
            }
            segments.push(PathSegment::Key(key.to_string()));

            while !rest.is_empty() {
                let close = rest.find(']').ok_or_else(invalid)?;
                if !rest.starts_with('[') {
                    return Err(invalid());
                }
                let inner = &rest[1..close];
                if inner.is_empty() {
                    segments.push(PathSegment::Slot);
                } else {
                    let idx = inner.parse::<usize>().map_err(|_| invalid())?;
                    segments.push(PathSegment::Index(idx));
                }
                rest = &rest[close + 1..];
            }
        }
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[PathSegment] {
        &self.segments
    }

    pub fn has_slot(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, PathSegment::Slot))
    }

    /// Replace the first open slot with a concrete index.
    pub fn fill_slot(&self, index: usize) -> FieldPath {
        let mut filled = false;
        let segments = self
            .segments
            .iter()
            .map(|s| match s {
                PathSegment::Slot if !filled => {
                    filled = true;
                    PathSegment::Index(index)
                }
                other => other.clone(),
            })
            .collect();
        FieldPath { segments }
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, seg) in self.segments.iter().enumerate() {
            match seg {
                PathSegment::Key(k) if i == 0 => f.write_str(k)?,
                PathSegment::Key(k) => write!(f, ".{}", k)?,
                PathSegment::Index(n) => write!(f, "[{}]", n)?,
                PathSegment::Slot => f.write_str("[]")?,
            }
        }
        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}
