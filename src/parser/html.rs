//! HTML to document model conversion.
//!
//! Parsing goes through html5ever's tree builder, which recovers from the
//! malformed markup order templates tend to produce (unclosed cells, missing
//! `<html>`/`<body>`, stray rows). The resulting DOM is then lowered into the
//! typed model in one pass; style sheets are collected on the way and applied
//! to `<col>` width hints once the whole document has been seen.

use super::css;
use super::ParseOptions;
use crate::model::{
    Block, ColumnSpec, Document, ElementInfo, Node, RowSection, StyleTable, Table, TableCell,
    TableRow,
};
use html5ever::tendril::TendrilSink;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// HTML caps colspan at 1000 and rowspan at 65534.
const MAX_COLSPAN: usize = 1000;
const MAX_ROWSPAN: usize = 65534;

/// Tags that start a new line when flattened into cell text.
const CELL_BREAK_TAGS: &[&str] = &["p", "div", "li"];

/// Parse an HTML string into a document.
///
/// Never fails: any input, including an empty string, produces a document.
pub fn parse_html(html: &str, options: &ParseOptions) -> Document {
    let opts = ParseOpts {
        tree_builder: TreeBuilderOpts {
            exact_errors: false,
            scripting_enabled: false,
            ..TreeBuilderOpts::default()
        },
        ..ParseOpts::default()
    };
    let dom = parse_document(RcDom::default(), opts).one(html);

    let mut lowering = Lowering::new(options);
    let nodes = lowering.lower(&dom.document);
    let mut doc = Document {
        nodes,
        styles: lowering.styles,
        barcode: lowering.barcode,
    };
    resolve_column_hints(&mut doc);

    log::debug!(
        "Parsed document: {} style rules, {} tables, barcode {}",
        doc.styles.len(),
        doc.tables().len(),
        if doc.barcode_data().is_some() { "present" } else { "absent" }
    );
    doc
}

struct Lowering<'a> {
    options: &'a ParseOptions,
    styles: StyleTable,
    barcode: Option<String>,
    truncated: bool,
}

/// An element whose children are being lowered.
struct Frame {
    info: Option<ElementInfo>,
    children: Vec<Handle>,
    next: usize,
    nodes: Vec<Node>,
    depth: usize,
}

impl Frame {
    fn new(info: Option<ElementInfo>, handle: &Handle, depth: usize) -> Self {
        Self {
            info,
            children: handle.children.borrow().clone(),
            next: 0,
            nodes: Vec::new(),
            depth,
        }
    }

    fn next_child(&mut self) -> Option<Handle> {
        let child = self.children.get(self.next).cloned();
        self.next += 1;
        child
    }
}

impl<'a> Lowering<'a> {
    fn new(options: &'a ParseOptions) -> Self {
        Self {
            options,
            styles: StyleTable::new(),
            barcode: None,
            truncated: false,
        }
    }

    /// Lower the children of `root` with an explicit stack of open
    /// elements. A frame collects the nodes of one element; when its
    /// children run out it is closed into a block on its parent.
    fn lower(&mut self, root: &Handle) -> Vec<Node> {
        let mut stack = vec![Frame::new(None, root, 0)];

        loop {
            let Some(frame) = stack.last_mut() else {
                return Vec::new();
            };

            let Some(child) = frame.next_child() else {
                let Some(done) = stack.pop() else {
                    return Vec::new();
                };
                match stack.last_mut() {
                    Some(parent) => match done.info {
                        Some(info) => parent.nodes.push(Node::Block(Block {
                            info,
                            children: done.nodes,
                        })),
                        None => parent.nodes.extend(done.nodes),
                    },
                    None => return done.nodes,
                }
                continue;
            };

            let depth = frame.depth + 1;
            match &child.data {
                NodeData::Text { contents } => {
                    let text = collapse_whitespace(&contents.borrow());
                    if !text.is_empty() {
                        frame.nodes.push(Node::Text(text));
                    }
                }
                NodeData::Document => {
                    if self.within_depth(depth) {
                        stack.push(Frame::new(None, &child, depth));
                    }
                }
                NodeData::Element { .. } => {
                    let Some(info) = element_info(&child) else {
                        continue;
                    };
                    if info.id.as_deref() == Some(self.options.barcode_id.as_str()) {
                        if self.barcode.is_none() {
                            self.barcode = attribute(&child, &self.options.barcode_attribute);
                        }
                        continue;
                    }
                    match info.tag.as_str() {
                        "style" => {
                            let sheet = raw_text(&child);
                            self.styles.extend(css::parse_stylesheet(&sheet));
                            frame
                                .nodes
                                .push(Node::Block(Block::new(info).with_child(Node::Text(sheet))));
                        }
                        "table" => {
                            let table = self.table(&child, info);
                            if let Some(frame) = stack.last_mut() {
                                frame.nodes.push(Node::Table(table));
                            }
                        }
                        "br" => {}
                        _ => {
                            if self.within_depth(depth) {
                                stack.push(Frame::new(Some(info), &child, depth));
                            } else {
                                frame.nodes.push(Node::Block(Block::new(info)));
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }

    /// Whether children at `depth` are still lowered. Warns once when not.
    fn within_depth(&mut self, depth: usize) -> bool {
        if depth <= self.options.max_depth {
            return true;
        }
        if !self.truncated {
            log::warn!(
                "Document nesting exceeds {} levels; deeper content dropped",
                self.options.max_depth
            );
            self.truncated = true;
        }
        false
    }

    fn table(&mut self, handle: &Handle, info: ElementInfo) -> Table {
        let mut table = Table::new(info);
        for child in handle.children.borrow().iter() {
            let Some(child_info) = element_info(child) else {
                continue;
            };
            match child_info.tag.as_str() {
                "thead" | "tbody" | "tfoot" => {
                    let section = match child_info.tag.as_str() {
                        "thead" => RowSection::Head,
                        "tfoot" => RowSection::Foot,
                        _ => RowSection::Body,
                    };
                    for row in child.children.borrow().iter() {
                        if let Some(row) = self.row(row, section) {
                            table.add_row(row);
                        }
                    }
                }
                "tr" => {
                    if let Some(row) = self.row(child, RowSection::Body) {
                        table.add_row(row);
                    }
                }
                "colgroup" => {
                    for col in child.children.borrow().iter() {
                        if let Some(spec) = column_spec(col) {
                            table.columns.push(spec);
                        }
                    }
                }
                "col" => table.columns.extend(column_spec(child)),
                _ => {}
            }
        }
        table
    }

    fn row(&mut self, handle: &Handle, section: RowSection) -> Option<TableRow> {
        let info = element_info(handle).filter(|i| i.tag == "tr")?;
        let mut cells = Vec::new();
        for child in handle.children.borrow().iter() {
            let Some(cell_info) = element_info(child) else {
                continue;
            };
            if cell_info.tag != "td" && cell_info.tag != "th" {
                continue;
            }
            let text = self.cell_text(child);
            cells.push(TableCell {
                is_header: cell_info.tag == "th",
                colspan: span_attribute(child, "colspan", MAX_COLSPAN),
                rowspan: span_attribute(child, "rowspan", MAX_ROWSPAN),
                has_line_break: text.contains('\n'),
                text,
                info: cell_info,
            });
        }

        let is_header =
            section == RowSection::Head || (!cells.is_empty() && cells.iter().all(|c| c.is_header));
        Some(TableRow {
            info,
            cells,
            is_header,
            section,
        })
    }

    /// Flatten a cell's descendants to text. `<br>` and block boundaries
    /// become `\n`; nested tables are skipped.
    fn cell_text(&mut self, handle: &Handle) -> String {
        let mut raw = String::new();
        let mut stack: Vec<Handle> = handle.children.borrow().iter().rev().cloned().collect();

        while let Some(node) = stack.pop() {
            match &node.data {
                NodeData::Text { contents } => raw.push_str(&contents.borrow()),
                NodeData::Element { .. } => {
                    let Some(info) = element_info(&node) else {
                        continue;
                    };
                    if info.id.as_deref() == Some(self.options.barcode_id.as_str()) {
                        if self.barcode.is_none() {
                            self.barcode = attribute(&node, &self.options.barcode_attribute);
                        }
                        continue;
                    }
                    if info.tag == "br" || CELL_BREAK_TAGS.contains(&info.tag.as_str()) {
                        raw.push('\n');
                    }
                    if info.tag == "table" || info.is_non_content() {
                        continue;
                    }
                    stack.extend(node.children.borrow().iter().rev().cloned());
                }
                _ => {}
            }
        }

        raw.split('\n')
            .map(collapse_whitespace)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Collapse runs of whitespace to one space and trim the ends.
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_info(handle: &Handle) -> Option<ElementInfo> {
    let NodeData::Element { name, attrs, .. } = &handle.data else {
        return None;
    };

    let mut info = ElementInfo::new(name.local.as_ref().to_ascii_lowercase());
    for attr in attrs.borrow().iter() {
        match &*attr.name.local {
            "id" => {
                let id = attr.value.trim();
                if !id.is_empty() {
                    info.id = Some(id.to_string());
                }
            }
            "class" => {
                info.classes = attr.value.split_whitespace().map(String::from).collect();
            }
            "style" => info.inline_style = css::parse_declarations(&attr.value),
            _ => {}
        }
    }
    Some(info)
}

fn attribute(handle: &Handle, name: &str) -> Option<String> {
    let NodeData::Element { attrs, .. } = &handle.data else {
        return None;
    };
    let attrs = attrs.borrow();
    attrs
        .iter()
        .find(|a| a.name.local.as_ref().eq_ignore_ascii_case(name))
        .map(|a| a.value.to_string())
}

fn span_attribute(handle: &Handle, name: &str, max: usize) -> usize {
    attribute(handle, name)
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(1)
        .clamp(1, max)
}

fn column_spec(handle: &Handle) -> Option<ColumnSpec> {
    let info = element_info(handle).filter(|i| i.tag == "col")?;
    Some(ColumnSpec {
        span: span_attribute(handle, "span", MAX_COLSPAN),
        width_attr: attribute(handle, "width").and_then(|w| css::parse_percent(&w)),
        info,
    })
}

/// Text content of a raw-text element such as `<style>`.
fn raw_text(handle: &Handle) -> String {
    let mut text = String::new();
    for child in handle.children.borrow().iter() {
        if let NodeData::Text { contents } = &child.data {
            text.push_str(&contents.borrow());
        }
    }
    text
}

/// Fill `column_hints` on every table from its `<col>` elements, now that
/// every style sheet in the document is known.
fn resolve_column_hints(doc: &mut Document) {
    let styles = &doc.styles;
    let mut stack: Vec<&mut Node> = doc.nodes.iter_mut().collect();
    while let Some(node) = stack.pop() {
        match node {
            Node::Table(table) => {
                let mut hints = Vec::new();
                for spec in &table.columns {
                    let hint = styles.resolve(&spec.info).width_percent.or(spec.width_attr);
                    hints.extend(std::iter::repeat(hint).take(spec.span));
                }
                table.column_hints = hints;
            }
            Node::Block(block) => stack.extend(block.children.iter_mut()),
            Node::Text(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TextAlign;

    fn parse(html: &str) -> Document {
        parse_html(html, &ParseOptions::default())
    }

    #[test]
    fn test_empty_input() {
        let doc = parse("");
        assert!(doc.tables().is_empty());
        assert!(doc.plain_text().is_empty());
    }

    #[test]
    fn test_whitespace_collapsed() {
        let doc = parse("<p>  Order \n\n   42  </p>");
        assert_eq!(doc.plain_text(), "Order 42");
    }

    #[test]
    fn test_styles_collected_from_all_blocks() {
        let doc = parse(
            "<html><head><style>h1 { text-align: center }</style></head>\
             <body><style>.total { text-align: right }</style><h1>T</h1></body></html>",
        );
        assert_eq!(doc.styles.len(), 2);
        assert_eq!(
            doc.styles.resolve(&ElementInfo::new("h1")).text_align,
            Some(TextAlign::Center)
        );
        // Style text is not printable content
        assert_eq!(doc.plain_text(), "T");
    }

    #[test]
    fn test_barcode_lifted() {
        let doc = parse(
            "<div id=\"barcode\" data-barcode=\"123456789012\">ignored</div><p>Body</p>",
        );
        assert_eq!(doc.barcode_data(), Some("123456789012"));
        assert_eq!(doc.plain_text(), "Body");
    }

    #[test]
    fn test_table_structure() {
        let doc = parse(
            "<table><thead><tr><th>Lp.</th><th>Name</th></tr></thead>\
             <tbody><tr><td>1</td><td>Widget<br>SKU-1</td></tr>\
             <tr><td colspan=\"2\">Total</td></tr></tbody></table>",
        );
        let tables = doc.tables();
        assert_eq!(tables.len(), 1);
        let table = tables[0];
        assert_eq!(table.row_count(), 3);
        assert!(table.rows[0].is_header);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.rows[1].cells[1].text, "Widget\nSKU-1");
        assert!(table.rows[1].cells[1].has_line_break);
        assert_eq!(table.rows[2].cells[0].colspan, 2);
    }

    #[test]
    fn test_unclosed_cells_recovered() {
        let doc = parse("<table><tr><td>a<td>b<tr><td>c<td>d</table>");
        let table = doc.tables()[0];
        assert_eq!(table.row_count(), 2);
        assert_eq!(table.column_count(), 2);
        assert_eq!(table.rows[1].cells[1].text, "d");
    }

    #[test]
    fn test_invalid_spans_clamped() {
        let doc = parse("<table><tr><td colspan=\"0\" rowspan=\"x\">a</td></tr></table>");
        let cell = &doc.tables()[0].rows[0].cells[0];
        assert_eq!(cell.colspan, 1);
        assert_eq!(cell.rowspan, 1);
    }

    #[test]
    fn test_column_hints_from_style_and_attribute() {
        let doc = parse(
            "<style>.qty { width: 20% }</style>\
             <table><colgroup><col style=\"width: 50%\"><col class=\"qty\"><col width=\"30%\"></colgroup>\
             <tr><td>a</td><td>b</td><td>c</td></tr></table>",
        );
        let table = doc.tables()[0];
        assert_eq!(table.complete_hints(), Some(vec![50.0, 20.0, 30.0]));
    }

    #[test]
    fn test_uppercase_markup() {
        let doc = parse(
            "<DIV ID=\"barcode\" DATA-BARCODE=\"A-1\"></DIV>\
             <TABLE><TR><TD COLSPAN=\"2\" CLASS=\"Total\">x</TD></TR></TABLE>",
        );
        assert_eq!(doc.barcode_data(), Some("A-1"));
        let cell = &doc.tables()[0].rows[0].cells[0];
        assert_eq!(cell.info.tag, "td");
        assert_eq!(cell.colspan, 2);
        assert!(cell.info.has_class("Total"));
    }

    #[test]
    fn test_deep_nesting_within_limit() {
        let html = format!("{}deep{}", "<div>".repeat(300), "</div>".repeat(300));
        let doc = parse(&html);
        assert_eq!(doc.plain_text(), "deep");
    }

    #[test]
    fn test_depth_limit() {
        let html = format!("{}deep{}", "<div>".repeat(40), "</div>".repeat(40));
        let doc = parse_html(&html, &ParseOptions::new().with_max_depth(10));
        assert!(!doc.plain_text().contains("deep"));
    }
}
