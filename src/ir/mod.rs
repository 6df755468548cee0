//! Intermediate representation shared by both adapters and the compiler

pub mod binding;
pub mod ids;
pub mod node;
pub mod schema;

pub use binding::{Binding, BindingEntry, BindingKind, FieldPath, PathSegment};
pub use ids::NodeIdAllocator;
pub use node::{
    Align, BoxNode, BoxSizing, ColorValue, FlexDirection, FlexNode, FrameNode, ImageDisplay, ImageNode, Insets,
    Justify, Length, Mask, NodeId, NodeKind, ObjectFit, Overflow, Position, ShapeKind, ShapeNode, Stroke, SvgNode,
    TemplateNode, TextAlign, TextNode, Typography,
};
pub use schema::{
    Derivation, SchemaBuilder, SchemaVersion, TemplateSchema, TokenDef, Variant, VariantOverride, VisibilityOp,
};
