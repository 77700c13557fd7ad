//! Restricted CSS parsing.
//!
//! Accepts `selector-list { declarations }` rules with simple selectors and
//! the three supported properties. At-rules, comments, compound selectors and
//! unknown properties are discarded.

use crate::model::{FontWeight, Property, PropertyMap, Selector, StyleRule, TextAlign};
use regex::Regex;
use std::sync::OnceLock;

fn comment_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)/\*.*?\*/").expect("comment pattern"))
}

fn rule_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"([^{}]+)\{([^{}]*)\}").expect("rule pattern"))
}

/// Parse a stylesheet into rules, in declaration order.
///
/// A selector list produces one rule per simple selector, each with the same
/// declarations. Rules without any recognized declaration are dropped.
pub fn parse_stylesheet(css: &str) -> Vec<StyleRule> {
    let css = comment_regex().replace_all(css, " ");
    let css = strip_at_rules(&css);

    let mut rules = Vec::new();
    for caps in rule_regex().captures_iter(&css) {
        let properties = parse_declarations(&caps[2]);
        if properties.is_empty() {
            continue;
        }
        for part in caps[1].split(',') {
            match Selector::parse(part) {
                Some(selector) => rules.push(StyleRule::new(selector, properties)),
                None => log::trace!("Ignoring unsupported selector {:?}", part.trim()),
            }
        }
    }
    rules
}

/// Parse a declaration block (`text-align: right; width: 20%`).
pub fn parse_declarations(block: &str) -> PropertyMap {
    let mut map = PropertyMap::new();
    for declaration in block.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        match parse_property(name, value) {
            Some(property) => map.set(property),
            None => log::trace!("Ignoring declaration {:?}", declaration.trim()),
        }
    }
    map
}

fn parse_property(name: &str, value: &str) -> Option<Property> {
    let value = value.trim();
    let value = value
        .strip_suffix("!important")
        .map(str::trim_end)
        .unwrap_or(value);

    match name.trim().to_ascii_lowercase().as_str() {
        "text-align" => TextAlign::parse(value).map(Property::TextAlign),
        "font-weight" => FontWeight::parse(value).map(Property::FontWeight),
        "width" => parse_percent(value).map(Property::WidthPercent),
        _ => None,
    }
}

/// Parse a percentage value (`25%`, `12.5 %`). Other units are rejected.
pub fn parse_percent(value: &str) -> Option<f32> {
    let number = value.trim().strip_suffix('%')?.trim();
    let pct = number.parse::<f32>().ok()?;
    (pct.is_finite() && pct >= 0.0).then_some(pct)
}

/// Remove `@media`, `@font-face`, `@import` and other at-rules, including
/// nested blocks.
fn strip_at_rules(css: &str) -> String {
    let mut out = String::with_capacity(css.len());
    let mut chars = css.chars().peekable();
    let mut depth = 0usize;

    while let Some(c) = chars.next() {
        if c == '@' && depth == 0 {
            // Skip to the end of the statement or the matching close brace
            let mut inner = 0usize;
            for c in chars.by_ref() {
                match c {
                    ';' if inner == 0 => break,
                    '{' => inner += 1,
                    '}' => {
                        inner = inner.saturating_sub(1);
                        if inner == 0 {
                            break;
                        }
                    }
                    _ => {}
                }
            }
            continue;
        }
        match c {
            '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            _ => {}
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_rules() {
        let rules = parse_stylesheet(
            "h1 { text-align: center; } .amount { text-align: right; font-weight: bold }",
        );
        assert_eq!(rules.len(), 2);
        assert_eq!(rules[0].selector, Selector::Tag("h1".into()));
        assert_eq!(rules[0].properties.text_align, Some(TextAlign::Center));
        assert_eq!(rules[1].selector, Selector::Class("amount".into()));
        assert!(rules[1].properties.is_bold());
    }

    #[test]
    fn test_selector_list_expands() {
        let rules = parse_stylesheet("h1, .title, #head { text-align: center }");
        assert_eq!(rules.len(), 3);
        assert!(rules
            .iter()
            .all(|r| r.properties.text_align == Some(TextAlign::Center)));
    }

    #[test]
    fn test_unsupported_dropped() {
        let rules = parse_stylesheet(
            "/* c { text-align: right } */ table td { text-align: right } \
             a:hover { text-align: left } p { color: red; margin: 0 }",
        );
        assert!(rules.is_empty());
    }

    #[test]
    fn test_at_rules_stripped() {
        let css = "@import url(x.css); @media print { td { text-align: right } } \
                   td { text-align: center }";
        let rules = parse_stylesheet(css);
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].properties.text_align, Some(TextAlign::Center));
    }

    #[test]
    fn test_declarations() {
        let map = parse_declarations("width: 25%; text-align: Right !important; font-weight: 700");
        assert_eq!(map.width_percent, Some(25.0));
        assert_eq!(map.text_align, Some(TextAlign::Right));
        assert!(map.is_bold());
    }

    #[test]
    fn test_percent_only() {
        assert_eq!(parse_percent("12.5%"), Some(12.5));
        assert_eq!(parse_percent("120px"), None);
        assert_eq!(parse_percent("-5%"), None);
        assert!(parse_declarations("width: 100px").is_empty());
    }
}
