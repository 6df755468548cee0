//! Inline CSS declarations
//!
//! Markup documents express all styling through `style` attributes. This
//! module turns one attribute into typed values and maps colors onto
//! declared tokens.

use crate::color;
use crate::ir::{
    Align, BoxSizing, ColorValue, FlexDirection, Insets, Justify, Length, ObjectFit, Overflow, TextAlign, TokenDef,
};
use regex::Regex;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static VAR_REF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^var\(\s*--([A-Za-z0-9_-]+)\s*(?:,\s*(.+))?\)$").expect("valid regex"));

/// Parsed `style` attribute; later declarations override earlier ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlineStyle {
    decls: BTreeMap<String, String>,
}

impl InlineStyle {
    pub fn parse(style: &str) -> Self {
        let mut decls = BTreeMap::new();
        for decl in split_declarations(style) {
            if let Some((prop, value)) = decl.split_once(':') {
                let prop = prop.trim().to_ascii_lowercase();
                let value = value.trim().trim_end_matches("!important").trim();
                if !prop.is_empty() && !value.is_empty() {
                    decls.insert(prop, value.to_string());
                }
            }
        }
        Self { decls }
    }

    pub fn get(&self, prop: &str) -> Option<&str> {
        self.decls.get(prop).map(String::as_str)
    }

    pub fn length(&self, prop: &str) -> Option<Length> {
        self.get(prop).and_then(Length::parse)
    }

    pub fn px(&self, prop: &str) -> Option<f32> {
        self.length(prop).and_then(|l| l.px())
    }

    /// `padding`/`margin` shorthand with per-side longhands applied on top.
    pub fn insets(&self, prop: &str) -> Insets {
        let mut insets = self.get(prop).map(parse_insets).unwrap_or_default();
        let sides: [(&str, &mut f32); 4] = [
            ("top", &mut insets.top),
            ("right", &mut insets.right),
            ("bottom", &mut insets.bottom),
            ("left", &mut insets.left),
        ];
        for (side, slot) in sides {
            if let Some(v) = self.px(&format!("{}-{}", prop, side)) {
                *slot = v;
            }
        }
        insets
    }

    pub fn is_flex(&self) -> bool {
        matches!(self.get("display"), Some("flex") | Some("inline-flex"))
    }

    pub fn is_hidden(&self) -> bool {
        self.get("display") == Some("none") || self.get("visibility") == Some("hidden")
    }

    pub fn direction(&self) -> FlexDirection {
        match self.get("flex-direction") {
            Some(d) if d.starts_with("column") => FlexDirection::Column,
            _ => FlexDirection::Row,
        }
    }

    pub fn justify(&self) -> Justify {
        match self.get("justify-content").unwrap_or("") {
            "center" => Justify::Center,
            "flex-end" | "end" | "right" => Justify::End,
            "space-between" => Justify::SpaceBetween,
            "space-around" => Justify::SpaceAround,
            "space-evenly" => Justify::SpaceEvenly,
            _ => Justify::Start,
        }
    }

    pub fn align(&self) -> Align {
        match self.get("align-items").unwrap_or("") {
            "center" => Align::Center,
            "flex-start" | "start" => Align::Start,
            "flex-end" | "end" => Align::End,
            "baseline" => Align::Baseline,
            _ => Align::Stretch,
        }
    }

    pub fn gap(&self) -> f32 {
        self.get("gap")
            .and_then(|g| g.split_whitespace().next())
            .and_then(Length::parse)
            .and_then(|l| l.px())
            .unwrap_or(0.0)
    }

    pub fn overflow(&self) -> Overflow {
        match self.get("overflow") {
            Some("hidden") | Some("clip") => Overflow::Hidden,
            _ => Overflow::Visible,
        }
    }

    pub fn box_sizing(&self) -> Option<BoxSizing> {
        match self.get("box-sizing")? {
            "border-box" => Some(BoxSizing::BorderBox),
            "content-box" => Some(BoxSizing::ContentBox),
            _ => None,
        }
    }

    pub fn text_align(&self) -> Option<TextAlign> {
        match self.get("text-align")? {
            "left" | "start" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" | "end" => Some(TextAlign::Right),
            "justify" => Some(TextAlign::Justify),
            _ => None,
        }
    }

    pub fn object_fit(&self) -> ObjectFit {
        match self.get("object-fit").unwrap_or("") {
            "contain" => ObjectFit::Contain,
            "fill" => ObjectFit::Fill,
            "none" => ObjectFit::None,
            "scale-down" => ObjectFit::ScaleDown,
            _ => ObjectFit::Cover,
        }
    }

    /// Background color from `background-color` or a plain `background`.
    pub fn background(&self) -> Option<&str> {
        self.get("background-color").or_else(|| self.get("background"))
    }
}

/// Split on `;` outside parentheses so `url(data:...;base64,...)` survives.
fn split_declarations(style: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let (mut depth, mut start) = (0usize, 0usize);
    for (i, c) in style.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ';' if depth == 0 => {
                out.push(&style[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    out.push(&style[start..]);
    out
}

fn parse_insets(value: &str) -> Insets {
    let v: Vec<f32> = value
        .split_whitespace()
        .map(|p| Length::parse(p).and_then(|l| l.px()).unwrap_or(0.0))
        .collect();
    match v.as_slice() {
        [a] => Insets::uniform(*a),
        [tb, lr] => Insets { top: *tb, right: *lr, bottom: *tb, left: *lr },
        [t, lr, b] => Insets { top: *t, right: *lr, bottom: *b, left: *lr },
        [t, r, b, l, ..] => Insets { top: *t, right: *r, bottom: *b, left: *l },
        [] => Insets::default(),
    }
}

/// Font size in pixels; `em` is relative to `parent`, `rem` to 16px.
pub fn font_size(value: &str, parent: f32) -> Option<f32> {
    let v = value.trim();
    let num = |s: &str| s.trim().parse::<f32>().ok();
    if let Some(n) = v.strip_suffix("rem") {
        return num(n).map(|n| n * 16.0);
    }
    if let Some(n) = v.strip_suffix("em") {
        return num(n).map(|n| n * parent);
    }
    if let Some(n) = v.strip_suffix("pt") {
        return num(n).map(|n| n * 4.0 / 3.0);
    }
    if let Some(n) = v.strip_suffix('%') {
        return num(n).map(|n| n / 100.0 * parent);
    }
    num(v.strip_suffix("px").unwrap_or(v))
}

pub fn font_weight(value: &str) -> Option<u16> {
    match value.trim() {
        "normal" => Some(400),
        "bold" => Some(700),
        "lighter" => Some(300),
        "bolder" => Some(800),
        other => other.parse().ok(),
    }
}

/// Line height in pixels; unitless and percentage values scale `font_size`.
pub fn line_height(value: &str, font_size: f32) -> Option<f32> {
    let v = value.trim();
    if v == "normal" {
        return None;
    }
    if let Some(pct) = v.strip_suffix('%') {
        return pct.trim().parse::<f32>().ok().map(|p| p / 100.0 * font_size);
    }
    if let Some(px) = v.strip_suffix("px") {
        return px.trim().parse().ok();
    }
    v.parse::<f32>().ok().map(|m| m * font_size)
}

/// First family in a `font-family` list, unquoted.
pub fn font_family(value: &str) -> Option<String> {
    let first = value.split(',').next()?.trim().trim_matches(|c| c == '"' || c == '\'');
    (!first.is_empty()).then(|| first.to_string())
}

/// Map a CSS color onto a declared token when possible.
///
/// `var(--name)` references a declared token directly; a literal equal to a
/// token's stored default becomes that token. Anything else stays literal.
pub fn color_value(raw: &str, tokens: &BTreeMap<String, TokenDef>) -> ColorValue {
    let raw = raw.trim();
    if let Some(caps) = VAR_REF.captures(raw) {
        let name = &caps[1];
        if tokens.contains_key(name) {
            return ColorValue::token(name);
        }
        if let Some(fallback) = caps.get(2) {
            return color_value(fallback.as_str(), tokens);
        }
        return ColorValue::literal(raw);
    }
    if let Some(normalized) = color::normalize(raw) {
        let hit = tokens.iter().find(|(_, def)| {
            def.derive.is_none() && def.default.as_deref().and_then(color::normalize).as_deref() == Some(&normalized)
        });
        if let Some((name, _)) = hit {
            return ColorValue::token(name.clone());
        }
    }
    ColorValue::literal(raw)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_declarations_case_insensitively() {
        let s = InlineStyle::parse("Width: 1080px; height:1080px;DISPLAY:flex");
        assert_eq!(s.length("width"), Some(Length::Px(1080.0)));
        assert!(s.is_flex());
    }

    #[test]
    fn keeps_semicolons_inside_urls() {
        let s = InlineStyle::parse("background:url(data:image/png;base64,AAAA);color:red");
        assert_eq!(s.get("background"), Some("url(data:image/png;base64,AAAA)"));
        assert_eq!(s.get("color"), Some("red"));
    }

    #[test]
    fn padding_shorthand_and_longhand() {
        let s = InlineStyle::parse("padding: 10px 20px; padding-left: 5px");
        assert_eq!(s.insets("padding"), Insets { top: 10.0, right: 20.0, bottom: 10.0, left: 5.0 });
        assert_eq!(InlineStyle::parse("padding:1px 2px 3px 4px").insets("padding").left, 4.0);
    }

    #[test]
    fn font_units() {
        assert_eq!(font_size("2em", 20.0), Some(40.0));
        assert_eq!(font_size("1.5rem", 20.0), Some(24.0));
        assert_eq!(font_size("18px", 20.0), Some(18.0));
        assert_eq!(line_height("1.5", 20.0), Some(30.0));
        assert_eq!(line_height("normal", 20.0), None);
        assert_eq!(font_weight("bold"), Some(700));
        assert_eq!(font_family("\"Inter\", sans-serif").as_deref(), Some("Inter"));
    }

    #[test]
    fn colors_map_to_tokens() {
        let mut tokens = BTreeMap::new();
        tokens.insert("primary".to_string(), TokenDef::editable("#3D9DFF"));
        tokens.insert("secondary".to_string(), TokenDef::lighten("primary", 25.0));

        assert_eq!(color_value("var(--primary)", &tokens), ColorValue::token("primary"));
        assert_eq!(color_value("rgb(61, 157, 255)", &tokens), ColorValue::token("primary"));
        assert_eq!(color_value("var(--accent, #3d9dff)", &tokens), ColorValue::token("primary"));
        assert_eq!(color_value("#ffffff", &tokens), ColorValue::literal("#ffffff"));
        assert_eq!(color_value("var(--accent)", &tokens), ColorValue::literal("var(--accent)"));
    }
}
