//! Small helpers for writing HTML/SVG text: escaping and inline style lists

pub fn escape_text(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Escaped text with line breaks turned into `<br>`.
pub fn text_with_breaks(s: &str) -> String {
    s.lines().map(escape_text).collect::<Vec<_>>().join("<br>")
}

pub fn px(v: f32) -> String {
    format!("{}px", v)
}

/// Ordered list of CSS declarations rendered into a `style` attribute.
#[derive(Debug, Default)]
pub struct Style {
    decls: Vec<(&'static str, String)>,
}

impl Style {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, property: &'static str, value: impl Into<String>) -> &mut Self {
        self.decls.push((property, value.into()));
        self
    }

    pub fn set_opt(&mut self, property: &'static str, value: Option<String>) -> &mut Self {
        if let Some(v) = value {
            self.decls.push((property, v));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    /// ` style="..."` including the leading space, or nothing when empty.
    pub fn attr(&self) -> String {
        if self.decls.is_empty() {
            return String::new();
        }
        let body = self
            .decls
            .iter()
            .map(|(k, v)| format!("{}:{}", k, v))
            .collect::<Vec<_>>()
            .join(";");
        format!(" style=\"{}\"", escape_attr(&body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(escape_text("a < b & c"), "a &lt; b &amp; c");
        assert_eq!(escape_attr("say \"hi\""), "say &quot;hi&quot;");
    }

    #[test]
    fn line_breaks_become_br() {
        assert_eq!(text_with_breaks("one\ntwo <3"), "one<br>two &lt;3");
    }

    #[test]
    fn style_renders_in_insertion_order() {
        let mut s = Style::new();
        s.set("width", px(10.0)).set("color", "#fff").set_opt("gap", None);
        assert_eq!(s.attr(), " style=\"width:10px;color:#fff\"");
        assert_eq!(Style::new().attr(), "");
    }
}
