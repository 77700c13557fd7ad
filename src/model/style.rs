//! Style table types.
//!
//! Only a closed set of properties survives parsing: `text-align`,
//! `font-weight` and percentage `width`. The cascade is a flat overlay
//! (tag rules, then class rules, then id rules, then the inline style) with
//! no specificity arithmetic and no inheritance.

use super::ElementInfo;
use serde::{Deserialize, Serialize};

/// Horizontal text alignment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Left-aligned (default)
    #[default]
    Left,
    /// Centered
    Center,
    /// Right-aligned
    Right,
    /// Justified
    Justify,
}

impl TextAlign {
    /// Parse a CSS `text-align` value.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "left" | "start" => Some(TextAlign::Left),
            "center" => Some(TextAlign::Center),
            "right" | "end" => Some(TextAlign::Right),
            "justify" => Some(TextAlign::Justify),
            _ => None,
        }
    }

    /// Field block justification code.
    pub fn code(self) -> char {
        match self {
            TextAlign::Left => 'L',
            TextAlign::Center => 'C',
            TextAlign::Right => 'R',
            TextAlign::Justify => 'J',
        }
    }
}

/// Font weight.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

impl FontWeight {
    /// Parse a CSS `font-weight` value. Numeric weights of 600 and above are bold.
    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim().to_ascii_lowercase();
        match value.as_str() {
            "normal" | "lighter" => Some(FontWeight::Normal),
            "bold" | "bolder" => Some(FontWeight::Bold),
            other => other.parse::<u32>().ok().map(|w| {
                if w >= 600 {
                    FontWeight::Bold
                } else {
                    FontWeight::Normal
                }
            }),
        }
    }
}

/// A single recognized declaration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Property {
    TextAlign(TextAlign),
    FontWeight(FontWeight),
    /// `width` given as a percentage of the containing width
    WidthPercent(f32),
}

/// Resolved property values for one element. Unset keys are `None`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyMap {
    pub text_align: Option<TextAlign>,
    pub font_weight: Option<FontWeight>,
    pub width_percent: Option<f32>,
}

impl PropertyMap {
    /// Create an empty property map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a single property.
    pub fn set(&mut self, property: Property) {
        match property {
            Property::TextAlign(a) => self.text_align = Some(a),
            Property::FontWeight(w) => self.font_weight = Some(w),
            Property::WidthPercent(p) => self.width_percent = Some(p),
        }
    }

    /// Set a property and return self.
    pub fn with(mut self, property: Property) -> Self {
        self.set(property);
        self
    }

    /// Overlay `other` onto this map; keys set in `other` win.
    pub fn overlay(&mut self, other: &PropertyMap) {
        if other.text_align.is_some() {
            self.text_align = other.text_align;
        }
        if other.font_weight.is_some() {
            self.font_weight = other.font_weight;
        }
        if other.width_percent.is_some() {
            self.width_percent = other.width_percent;
        }
    }

    /// Check if no property is set.
    pub fn is_empty(&self) -> bool {
        self.text_align.is_none() && self.font_weight.is_none() && self.width_percent.is_none()
    }

    /// Whether the resolved weight is bold.
    pub fn is_bold(&self) -> bool {
        self.font_weight == Some(FontWeight::Bold)
    }
}

/// A simple selector. Compound selectors and combinators are never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Selector {
    Tag(String),
    Class(String),
    Id(String),
}

impl Selector {
    /// Parse a simple selector (`p`, `.total`, `#barcode`).
    ///
    /// Returns `None` for anything more complex than a single tag, class or id.
    pub fn parse(text: &str) -> Option<Self> {
        let text = text.trim();
        let (kind, name) = match text.chars().next()? {
            '.' => ('.', &text[1..]),
            '#' => ('#', &text[1..]),
            _ => (' ', text),
        };

        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return None;
        }

        Some(match kind {
            '.' => Selector::Class(name.to_string()),
            '#' => Selector::Id(name.to_string()),
            _ => Selector::Tag(name.to_ascii_lowercase()),
        })
    }

    fn matches(&self, element: &ElementInfo) -> bool {
        match self {
            Selector::Tag(tag) => element.tag == *tag,
            Selector::Class(class) => element.has_class(class),
            Selector::Id(id) => element.id.as_deref() == Some(id.as_str()),
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Selector::Tag(_) => 0,
            Selector::Class(_) => 1,
            Selector::Id(_) => 2,
        }
    }
}

/// A selector with its declarations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleRule {
    pub selector: Selector,
    pub properties: PropertyMap,
}

impl StyleRule {
    pub fn new(selector: Selector, properties: PropertyMap) -> Self {
        Self {
            selector,
            properties,
        }
    }
}

/// Rules collected from every `<style>` block, in declaration order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StyleTable {
    rules: Vec<StyleRule>,
}

impl StyleTable {
    /// Create an empty style table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a rule.
    pub fn add_rule(&mut self, rule: StyleRule) {
        self.rules.push(rule);
    }

    /// Append rules from another stylesheet, after the existing ones.
    pub fn extend(&mut self, rules: impl IntoIterator<Item = StyleRule>) {
        self.rules.extend(rules);
    }

    /// All rules in declaration order.
    pub fn rules(&self) -> &[StyleRule] {
        &self.rules
    }

    /// Number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Check if there are no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Resolve the flat property map for an element.
    ///
    /// Overlay order is fixed: tag rules, class rules, id rules, then the
    /// element's inline style. Within one group, later declarations win.
    pub fn resolve(&self, element: &ElementInfo) -> PropertyMap {
        let mut resolved = PropertyMap::new();
        for rank in 0..=2 {
            for rule in self
                .rules
                .iter()
                .filter(|r| r.selector.rank() == rank && r.selector.matches(element))
            {
                resolved.overlay(&rule.properties);
            }
        }
        resolved.overlay(&element.inline_style);
        resolved
    }
}
