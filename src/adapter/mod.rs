//! Source adapters
//!
//! Each adapter normalizes one external input shape into a validated
//! [`TemplateSchema`](crate::ir::TemplateSchema):
//!
//! - [`DesignAdapter`]: design-tool exports with absolute geometry, producing
//!   a flat version-1 schema
//! - [`MarkupAdapter`]: markup documents with inline styles, producing a
//!   version-2 Frame tree

pub mod design;
pub mod heuristics;
pub mod markup;
pub mod mask;
pub mod style;

pub use design::{DesignAdapter, DesignExport, DesignNode, DesignNodeType, DesignPaint};
pub use heuristics::{classify, BindingInference, TextClass, HEURISTICS};
pub use markup::MarkupAdapter;
