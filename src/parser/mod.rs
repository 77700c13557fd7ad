//! HTML and CSS parsing module.

pub mod css;
mod html;
mod options;

pub use html::{collapse_whitespace, parse_html};
pub use options::{ParseOptions, DEFAULT_MAX_DEPTH};
