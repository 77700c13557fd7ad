//! ZPL renderer.
//!
//! Walks the document model top to bottom with an explicit work stack and
//! keeps a single vertical cursor. Every text field goes through the
//! [`YPositionRegistry`], so no two fields are placed closer than the line
//! spacing plus the font height.

use super::canvas::Canvas;
use super::fonts::{FontRole, FontTable};
use super::options::LabelConfig;
use super::result::RenderStats;
use super::text::{render_text, YPositionRegistry, MIN_LINE_SPACING};
use super::zpl::{postamble, preamble, BarcodeField};
use crate::model::{Block, Document, Node, StyleTable, TextAlign};

/// Elements whose own text is laid out as a paragraph.
const TEXT_BLOCK_TAGS: &[&str] = &[
    "div", "p", "h1", "h2", "h3", "h4", "h5", "h6", "li", "section", "header", "footer",
    "article",
];

/// Gap after a paragraph's own text.
pub const BLOCK_GAP: u32 = 5;
/// Gap after a table.
pub const TABLE_GAP: u32 = 20;

/// Rendered command stream before validation.
#[derive(Debug, Clone)]
pub struct RenderOutput {
    pub content: String,
    pub stats: RenderStats,
}

/// Renders one document onto one canvas.
pub struct ZplRenderer<'a> {
    pub(super) canvas: Canvas,
    pub(super) fonts: FontTable,
    pub(super) config: &'a LabelConfig,
    pub(super) styles: &'a StyleTable,
    pub(super) registry: YPositionRegistry,
    pub(super) commands: Vec<String>,
    pub(super) stats: RenderStats,
    y: u32,
}

impl<'a> ZplRenderer<'a> {
    /// Create a renderer. The canvas height must already be decided.
    pub fn new(config: &'a LabelConfig, canvas: Canvas, styles: &'a StyleTable) -> Self {
        Self {
            canvas,
            fonts: config.fonts,
            config,
            styles,
            registry: YPositionRegistry::new(),
            commands: Vec::new(),
            stats: RenderStats::default(),
            y: canvas.margin_dots,
        }
    }

    /// Render the document into a complete label format.
    pub fn render(mut self, doc: &Document) -> RenderOutput {
        self.commands
            .extend(preamble(&self.canvas, &self.config.encoding, self.config.print_speed));

        if let Some(data) = doc.barcode_data() {
            let barcode = BarcodeField::top_right(&self.canvas, data);
            if barcode.data.is_empty() {
                log::warn!("Barcode payload has no encodable characters, skipping");
            } else {
                self.commands.push(barcode.to_command());
                self.y = barcode.content_start();
                self.stats.barcode = true;
            }
        }

        self.walk(&doc.nodes);

        self.commands.extend(postamble());
        self.stats.final_y = self.y;
        if self.y > self.canvas.height_dots {
            log::warn!(
                "Content ends at {} dots, beyond label length {}",
                self.y,
                self.canvas.height_dots
            );
        }

        RenderOutput {
            content: self.commands.join("\n"),
            stats: self.stats,
        }
    }

    fn walk(&mut self, nodes: &[Node]) {
        let mut stack: Vec<&Node> = nodes.iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node {
                Node::Text(text) => self.loose_text(text),
                Node::Table(table) => {
                    let x = self.canvas.margin_dots;
                    self.y = self.render_table(table, x, self.y).saturating_add(TABLE_GAP);
                }
                Node::Block(block) => {
                    if block.info.is_non_content() {
                        continue;
                    }
                    if TEXT_BLOCK_TAGS.contains(&block.info.tag.as_str()) {
                        self.text_block(block);
                        stack.extend(
                            block
                                .children
                                .iter()
                                .rev()
                                .filter(|c| !matches!(c, Node::Text(_))),
                        );
                    } else {
                        stack.extend(block.children.iter().rev());
                    }
                }
            }
        }
    }

    /// A paragraph or heading's own text, across the usable width.
    fn text_block(&mut self, block: &Block) {
        let text = block.direct_text();
        let role = block
            .info
            .heading_level()
            .map(FontRole::for_heading)
            .unwrap_or(FontRole::Normal);
        let props = self.styles.resolve(&block.info);
        let align = props.text_align.unwrap_or_default();

        let x = self.canvas.margin_dots;
        let width = self.canvas.usable_width();
        if let Some(new_y) = self.emit_text(&text, x, self.y, role, width, align, props.is_bold()) {
            self.y = new_y.saturating_add(BLOCK_GAP);
        }
    }

    /// Text outside any paragraph or cell.
    fn loose_text(&mut self, text: &str) {
        let x = self.canvas.margin_dots;
        let width = self.canvas.usable_width();
        if let Some(new_y) =
            self.emit_text(text, x, self.y, FontRole::Normal, width, TextAlign::Left, false)
        {
            self.y = new_y.saturating_add(MIN_LINE_SPACING);
        }
    }

    /// Lay out one field and append it. Returns the y below it, or `None`
    /// when the text is blank.
    #[allow(clippy::too_many_arguments)]
    pub(super) fn emit_text(
        &mut self,
        text: &str,
        x: u32,
        y: u32,
        role: FontRole,
        width: u32,
        align: TextAlign,
        bold: bool,
    ) -> Option<u32> {
        let font = self.fonts.get(role);
        let (field, new_y) = render_text(
            &mut self.registry,
            &self.canvas,
            text,
            x,
            y,
            font,
            width,
            align,
        );
        let field = field?;
        self.commands.push(field.to_string());
        self.stats.text_fields += 1;
        if bold {
            self.stats.bold_fields += 1;
        }
        Some(new_y)
    }

    /// Append a horizontal rule across `width` dots.
    pub(super) fn rule(&mut self, x: u32, y: u32, width: u32) {
        self.commands.push(format!("^FO{},{}^GB{},1,1^FS", x, y, width));
        self.stats.rules += 1;
    }
}
