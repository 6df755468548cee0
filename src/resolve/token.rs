//! Token resolution
//!
//! A token value comes from, in order: a render-time override, the stored
//! default. Derived tokens are recomputed from their source on every call
//! and never stored.

use crate::color::Color;
use crate::ir::{ColorValue, Derivation, TokenDef};
use crate::{Error, Result};
use std::collections::BTreeMap;

pub struct TokenResolver<'a> {
    tokens: &'a BTreeMap<String, TokenDef>,
    overrides: BTreeMap<String, Color>,
}

impl<'a> TokenResolver<'a> {
    /// Validate overrides against the declarations.
    ///
    /// Overriding an unknown token, a derived token or a non-editable token
    /// fails, as does an override that is not a color.
    pub fn new(tokens: &'a BTreeMap<String, TokenDef>, overrides: &BTreeMap<String, String>) -> Result<Self> {
        let mut parsed = BTreeMap::new();
        for (name, value) in overrides {
            let def = tokens.get(name).ok_or_else(|| Error::UnknownToken(name.clone()))?;
            if def.derive.is_some() || !def.editable {
                return Err(Error::TokenNotEditable(name.clone()));
            }
            parsed.insert(name.clone(), value.parse::<Color>()?);
        }
        Ok(Self {
            tokens,
            overrides: parsed,
        })
    }

    pub fn resolve(&self, name: &str) -> Result<Color> {
        self.resolve_depth(name, 0)
    }

    fn resolve_depth(&self, name: &str, depth: usize) -> Result<Color> {
        if depth > self.tokens.len() {
            return Err(Error::StructureError(format!("token '{}' has a cyclic derivation", name)));
        }
        let def = self.tokens.get(name).ok_or_else(|| Error::UnknownToken(name.to_string()))?;
        if let Some(derivation) = &def.derive {
            return match derivation {
                Derivation::Lighten { from, percent } => Ok(self.resolve_depth(from, depth + 1)?.lighten(*percent)),
            };
        }
        if let Some(color) = self.overrides.get(name) {
            return Ok(*color);
        }
        match &def.default {
            Some(value) => value.parse(),
            None => Err(Error::TokenWithoutValue(name.to_string())),
        }
    }

    /// CSS value for a style color. Literals pass through untouched.
    pub fn css(&self, value: &ColorValue) -> Result<String> {
        match value {
            ColorValue::Literal(v) => Ok(v.clone()),
            ColorValue::Token { token } => Ok(self.resolve(token)?.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens() -> BTreeMap<String, TokenDef> {
        let mut t = BTreeMap::new();
        t.insert("primary".to_string(), TokenDef::editable("#3D9DFF"));
        t.insert("secondary".to_string(), TokenDef::lighten("primary", 25.0));
        t.insert("ink".to_string(), TokenDef::fixed("#111111"));
        t
    }

    #[test]
    fn override_beats_default() {
        let t = tokens();
        let mut ov = BTreeMap::new();
        ov.insert("primary".to_string(), "#ff0000".to_string());
        let r = TokenResolver::new(&t, &ov).unwrap();
        assert_eq!(r.resolve("primary").unwrap(), Color::rgb(255, 0, 0));
        let r = TokenResolver::new(&t, &BTreeMap::new()).unwrap();
        assert_eq!(r.resolve("primary").unwrap().to_string(), "#3d9dff");
    }

    #[test]
    fn derived_token_is_stable_and_lighter() {
        let t = tokens();
        let r = TokenResolver::new(&t, &BTreeMap::new()).unwrap();
        let primary = r.resolve("primary").unwrap();
        let first = r.resolve("secondary").unwrap();
        let second = r.resolve("secondary").unwrap();
        assert_eq!(first, second);
        assert!(first.r >= primary.r && first.g >= primary.g && first.b >= primary.b);
        assert_ne!(first, primary);
    }

    #[test]
    fn derived_token_follows_overridden_source() {
        let t = tokens();
        let mut ov = BTreeMap::new();
        ov.insert("primary".to_string(), "#000000".to_string());
        let r = TokenResolver::new(&t, &ov).unwrap();
        assert_eq!(r.resolve("secondary").unwrap(), Color::BLACK.lighten(25.0));
    }

    #[test]
    fn unknown_tokens_are_fatal() {
        let t = tokens();
        let r = TokenResolver::new(&t, &BTreeMap::new()).unwrap();
        assert!(matches!(r.css(&ColorValue::token("accent")), Err(Error::UnknownToken(_))));

        let mut ov = BTreeMap::new();
        ov.insert("accent".to_string(), "#fff".to_string());
        assert!(matches!(TokenResolver::new(&t, &ov), Err(Error::UnknownToken(_))));
    }

    #[test]
    fn fixed_and_derived_tokens_reject_overrides() {
        let t = tokens();
        for name in ["ink", "secondary"] {
            let mut ov = BTreeMap::new();
            ov.insert(name.to_string(), "#fff".to_string());
            assert!(matches!(TokenResolver::new(&t, &ov), Err(Error::TokenNotEditable(_))));
        }
    }

    #[test]
    fn literals_pass_through() {
        let t = tokens();
        let r = TokenResolver::new(&t, &BTreeMap::new()).unwrap();
        assert_eq!(r.css(&ColorValue::literal("transparent")).unwrap(), "transparent");
    }
}
