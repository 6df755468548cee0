//! Binding inference for markup text
//!
//! Caller-supplied replacement rules are tried first. Text no rule claims
//! goes through [`HEURISTICS`], an ordered list of pure matchers where the
//! first hit wins. The order is kept as-is for compatibility with existing
//! imports; it is not a ranked judgement of which matcher is most reliable.

use crate::config::{HeuristicFields, MarkupConfig, Pattern, ReplacementRule};
use crate::ir::{Binding, BindingKind, FieldPath};
use crate::{Error, Result};
use regex::Regex;
use std::sync::LazyLock;

static WEEKDAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(monday|tuesday|wednesday|thursday|friday|saturday|sunday)\b").expect("valid regex")
});

static MONTH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(january|february|march|april|may|june|july|august|september|october|november|december)\b")
        .expect("valid regex")
});

static HOURS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(opening hours|open daily|doors open|hours|o'clock)\b|\b\d{1,2}(:\d{2})?\s?(am|pm)\b")
        .expect("valid regex")
});

static STREET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(street|avenue|road|boulevard|lane|square|straße|strasse|platz)\b|\b(st|ave|rd|blvd|str)\.")
        .expect("valid regex")
});

static CITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r"^\d{4,5}\s+\p{Lu}[\p{L}\- ]+$",
        r"|^\p{Lu}[\p{L} .]+,\s*\p{Lu}{2}\s+\d{5}(-\d{4})?$",
        r"|\b[A-Z]{1,2}\d[A-Z\d]?\s*\d[A-Z]{2}\b",
    ))
    .expect("valid regex")
});

static PERSON_NAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\p{Lu}\p{Ll}+(-\p{Lu}\p{Ll}+)?\s+\p{Lu}\p{Ll}+(-\p{Lu}\p{Ll}+)?$").expect("valid regex")
});

/// Shortest text treated as a talk or description caption
pub const MIN_CAPTION_CHARS: usize = 20;

/// What a heuristic decided a text node is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextClass {
    Placeholder,
    Date,
    Hours,
    Address,
    City,
    Role,
    PersonName,
    Talk,
}

impl TextClass {
    pub fn field<'f>(&self, fields: &'f HeuristicFields) -> &'f str {
        match self {
            TextClass::Placeholder => &fields.placeholder,
            TextClass::Date => &fields.date,
            TextClass::Hours => &fields.hours,
            TextClass::Address => &fields.address,
            TextClass::City => &fields.city,
            TextClass::Role => &fields.role,
            TextClass::PersonName => &fields.name,
            TextClass::Talk => &fields.talk,
        }
    }
}

/// A matcher sees trimmed text and the configured placeholder markers.
pub type Heuristic = fn(&str, &[String]) -> Option<TextClass>;

/// Evaluated in order; first match wins.
pub const HEURISTICS: [Heuristic; 8] = [
    placeholder_marker,
    weekday_date,
    opening_hours,
    street_address,
    city_line,
    role_line,
    person_name,
    talk_caption,
];

pub fn classify(text: &str, markers: &[String]) -> Option<TextClass> {
    HEURISTICS.iter().find_map(|h| h(text, markers))
}

fn placeholder_marker(text: &str, markers: &[String]) -> Option<TextClass> {
    markers
        .iter()
        .any(|m| !m.is_empty() && text.contains(m.as_str()))
        .then_some(TextClass::Placeholder)
}

fn weekday_date(text: &str, _: &[String]) -> Option<TextClass> {
    (WEEKDAY.is_match(text) && MONTH.is_match(text)).then_some(TextClass::Date)
}

fn opening_hours(text: &str, _: &[String]) -> Option<TextClass> {
    HOURS.is_match(text).then_some(TextClass::Hours)
}

fn street_address(text: &str, _: &[String]) -> Option<TextClass> {
    STREET.is_match(text).then_some(TextClass::Address)
}

fn city_line(text: &str, _: &[String]) -> Option<TextClass> {
    CITY.is_match(text).then_some(TextClass::City)
}

fn role_line(text: &str, _: &[String]) -> Option<TextClass> {
    text.contains('@').then_some(TextClass::Role)
}

fn person_name(text: &str, _: &[String]) -> Option<TextClass> {
    PERSON_NAME.is_match(text).then_some(TextClass::PersonName)
}

fn talk_caption(text: &str, _: &[String]) -> Option<TextClass> {
    (text.chars().count() >= MIN_CAPTION_CHARS && !text.contains(':')).then_some(TextClass::Talk)
}

enum Matcher {
    Literal(String),
    Regex(Regex),
}

impl Matcher {
    /// The matched placeholder literal inside `text`.
    fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        match self {
            Matcher::Literal(lit) => text.find(lit.as_str()).map(|i| &text[i..i + lit.len()]),
            Matcher::Regex(re) => re.find(text).map(|m| m.as_str()).filter(|m| !m.is_empty()),
        }
    }
}

struct CompiledRule<'c> {
    matcher: Matcher,
    rule: &'c ReplacementRule,
    /// Field has an open list slot and may bind any number of nodes
    open_slot: bool,
    claimed: bool,
}

/// Replacement rules compiled once per import, plus the heuristic settings.
pub struct BindingInference<'c> {
    rules: Vec<CompiledRule<'c>>,
    markers: &'c [String],
    fields: &'c HeuristicFields,
}

impl<'c> BindingInference<'c> {
    pub fn new(config: &'c MarkupConfig) -> Result<Self> {
        let mut rules = Vec::with_capacity(config.replacements.len());
        for rule in &config.replacements {
            let path = FieldPath::parse(&rule.field)
                .map_err(|_| Error::ConfigError(format!("invalid field path '{}' in replacement rule", rule.field)))?;
            let matcher = match &rule.pattern {
                Pattern::Literal(lit) if lit.is_empty() => {
                    return Err(Error::ConfigError(format!("empty literal for field '{}'", rule.field)))
                }
                Pattern::Literal(lit) => Matcher::Literal(lit.clone()),
                Pattern::Regex(re) => Matcher::Regex(
                    Regex::new(re).map_err(|e| Error::ConfigError(format!("invalid pattern '{}': {}", re, e)))?,
                ),
            };
            rules.push(CompiledRule {
                matcher,
                rule,
                open_slot: path.has_slot(),
                claimed: false,
            });
        }
        for class in [
            TextClass::Placeholder,
            TextClass::Date,
            TextClass::Hours,
            TextClass::Address,
            TextClass::City,
            TextClass::Role,
            TextClass::PersonName,
            TextClass::Talk,
        ] {
            let field = class.field(&config.heuristic_fields);
            FieldPath::parse(field)
                .map_err(|_| Error::ConfigError(format!("invalid heuristic field path '{}'", field)))?;
        }
        Ok(Self {
            rules,
            markers: &config.placeholder_markers,
            fields: &config.heuristic_fields,
        })
    }

    /// Binding for one text node's content, if any matcher claims it.
    ///
    /// Call once per text node in document order. A rule with a concrete
    /// field path (`people[1].role`) is used up by its first match, so the
    /// next identical text goes to the next rule with a matching pattern.
    /// Once every matching rule is used up the first one binds again.
    pub fn infer(&mut self, text: &str) -> Option<Binding> {
        let text = text.trim();
        if text.is_empty() {
            return None;
        }
        let mut chosen = None;
        for (i, compiled) in self.rules.iter().enumerate() {
            let Some(literal) = compiled.matcher.find(text) else {
                continue;
            };
            if compiled.open_slot || !compiled.claimed {
                chosen = Some((i, literal));
                break;
            }
            chosen.get_or_insert((i, literal));
        }
        if let Some((i, literal)) = chosen {
            let compiled = &mut self.rules[i];
            compiled.claimed = true;
            log::trace!("rule '{}' matched {:?}", compiled.rule.field, literal);
            return Some(Binding::new(compiled.rule.field.clone(), compiled.rule.kind).with_placeholder(literal));
        }
        let class = classify(text, self.markers)?;
        log::trace!("heuristic {:?} matched {:?}", class, text);
        Some(Binding::new(class.field(self.fields), BindingKind::Text).with_placeholder(text))
    }
}
