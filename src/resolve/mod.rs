//! Per-render resolution: field values, variant visibility, token colors

pub mod binding;
pub mod token;
pub mod variant;

pub use binding::{apply_text, BindingResolver, ResolvedBindings, ResolvedValue, Submission};
pub use token::TokenResolver;
pub use variant::apply_variant;
