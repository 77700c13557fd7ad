//! Document model types for HTML label content.
//!
//! This module defines the intermediate representation between HTML parsing
//! and label rendering: a tree of text, block and table nodes plus the style
//! table collected from `<style>` blocks.

mod document;
mod style;
mod table;

pub use document::{Block, Document, ElementInfo, Node};
pub use style::{FontWeight, Property, PropertyMap, Selector, StyleRule, StyleTable, TextAlign};
pub use table::{
    looks_numeric, ColumnSpec, RowSection, Table, TableCell, TableRow, TableStructure,
};
