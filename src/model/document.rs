//! Document-level types.

use super::{PropertyMap, StyleTable, Table};
use serde::{Deserialize, Serialize};

/// Elements that carry no printable content. They stay in the tree but are
/// skipped by every traversal.
const NON_CONTENT_TAGS: &[&str] = &[
    "head", "style", "script", "meta", "link", "title", "noscript", "template",
];

/// Identity and inline style of an element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
    /// Lowercase tag name
    pub tag: String,

    /// `id` attribute
    pub id: Option<String>,

    /// Class list, in attribute order
    pub classes: Vec<String>,

    /// Declarations from the `style` attribute
    pub inline_style: PropertyMap,
}

impl ElementInfo {
    /// Create info for a bare tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    /// Set the class list and return self.
    pub fn with_classes<S: Into<String>>(mut self, classes: impl IntoIterator<Item = S>) -> Self {
        self.classes = classes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the id and return self.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Check whether the element carries a class.
    pub fn has_class(&self, class: &str) -> bool {
        self.classes.iter().any(|c| c == class)
    }

    /// Whether this element is skipped at traversal time.
    pub fn is_non_content(&self) -> bool {
        NON_CONTENT_TAGS.contains(&self.tag.as_str())
    }

    /// Heading level for `h1`..`h6`.
    pub fn heading_level(&self) -> Option<u8> {
        let level = self.tag.strip_prefix('h')?.parse::<u8>().ok()?;
        (1..=6).contains(&level).then_some(level)
    }
}

/// A generic element with children.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Block {
    pub info: ElementInfo,
    pub children: Vec<Node>,
}

impl Block {
    /// Create an empty block.
    pub fn new(info: ElementInfo) -> Self {
        Self {
            info,
            children: Vec::new(),
        }
    }

    /// Add a child and return self.
    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    /// The block's own text: non-blank direct text children joined by a space.
    pub fn direct_text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                Node::Text(text) if !text.trim().is_empty() => Some(text.trim()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// A node of the document tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Node {
    /// Whitespace-collapsed text
    Text(String),
    /// Any element other than a table
    Block(Block),
    /// A data table
    Table(Table),
}

/// A parsed HTML document.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Document {
    /// Top-level nodes
    pub nodes: Vec<Node>,

    /// Rules collected from `<style>` blocks
    pub styles: StyleTable,

    /// Barcode payload lifted from the marker element
    pub barcode: Option<String>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level node.
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    /// Check if the document has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Barcode payload, if it is present and usable.
    ///
    /// An empty payload or the literal `none` means no barcode.
    pub fn barcode_data(&self) -> Option<&str> {
        self.barcode
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty() && !d.eq_ignore_ascii_case("none"))
    }

    /// All tables in document order, skipping non-content subtrees.
    pub fn tables(&self) -> Vec<&Table> {
        let mut tables = Vec::new();
        let mut stack: Vec<&Node> = self.nodes.iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node {
                Node::Table(table) => tables.push(table),
                Node::Block(block) if !block.info.is_non_content() => {
                    stack.extend(block.children.iter().rev());
                }
                _ => {}
            }
        }
        tables
    }

    /// Printable text of the whole document, one entry per text node.
    pub fn plain_text(&self) -> String {
        let mut parts = Vec::new();
        let mut stack: Vec<&Node> = self.nodes.iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node {
                Node::Text(text) if !text.trim().is_empty() => parts.push(text.trim().to_string()),
                Node::Block(block) if !block.info.is_non_content() => {
                    stack.extend(block.children.iter().rev());
                }
                Node::Table(table) => parts.push(table.plain_text()),
                _ => {}
            }
        }
        parts.join("\n")
    }
}
