//! Parsing options and configuration.

/// Default nesting limit for the document tree.
pub const DEFAULT_MAX_DEPTH: usize = 512;

/// Options for parsing HTML documents.
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// `id` of the element carrying the barcode payload
    pub barcode_id: String,

    /// Attribute of that element holding the payload
    pub barcode_attribute: String,

    /// Elements nested deeper than this are dropped
    pub max_depth: usize,
}

impl ParseOptions {
    /// Create new parse options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the barcode marker id.
    pub fn with_barcode_id(mut self, id: impl Into<String>) -> Self {
        self.barcode_id = id.into();
        self
    }

    /// Set the barcode payload attribute.
    pub fn with_barcode_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.barcode_attribute = attribute.into();
        self
    }

    /// Set the nesting limit.
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth.max(1);
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            barcode_id: "barcode".to_string(),
            barcode_attribute: "data-barcode".to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
