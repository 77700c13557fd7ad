//! Structural validation and repair of label command streams.
//!
//! The validator checks that a stream holds exactly one `^XA` .. `^XZ`
//! format and reports anything that would make a printer drop or misprint
//! it. [`repair`] rewrites a stream into one that always validates.
//!
//! Neither function fails: any input, including binary garbage decoded as
//! text, produces a report.

use crate::error::Result;
use crate::render::{to_json, JsonFormat};
use serde::{Deserialize, Serialize};

const START: &str = "^XA";
const END: &str = "^XZ";

/// Print speed inserted by [`repair`] when none is set.
pub const DEFAULT_PRINT_SPEED: &str = "^PR3";

/// How serious an issue is. Only errors fail validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

/// What an issue is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    EmptyStream,
    MissingFormat,
    MultipleFormats,
    UnbalancedMarkers,
    ContentOutsideFormat,
    NoFieldData,
    FieldWithoutOrigin,
    NoPrintSpeed,
}

/// A single finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    pub severity: Severity,
    pub kind: IssueKind,
    pub message: String,
}

impl Issue {
    fn new(severity: Severity, kind: IssueKind, message: impl Into<String>) -> Self {
        Self {
            severity,
            kind,
            message: message.into(),
        }
    }
}

/// Outcome of [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    /// No error-level issues
    pub success: bool,

    pub issues: Vec<Issue>,

    /// Complete `^XA` .. `^XZ` formats found
    pub label_count: usize,
}

impl ValidationReport {
    fn from_issues(issues: Vec<Issue>, label_count: usize) -> Self {
        Self {
            success: !issues.iter().any(|i| i.severity == Severity::Error),
            issues,
            label_count,
        }
    }

    /// Issues of error severity.
    pub fn errors(&self) -> impl Iterator<Item = &Issue> {
        self.with_severity(Severity::Error)
    }

    /// Issues of warning severity.
    pub fn warnings(&self) -> impl Iterator<Item = &Issue> {
        self.with_severity(Severity::Warning)
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &Issue> {
        self.issues.iter().filter(move |i| i.severity == severity)
    }

    /// Whether an issue of this kind was reported.
    pub fn has(&self, kind: IssueKind) -> bool {
        self.issues.iter().any(|i| i.kind == kind)
    }

    /// Serialize the report.
    pub fn to_json(&self, format: JsonFormat) -> Result<String> {
        to_json(self, format)
    }
}

/// Outcome of [`repair`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RepairResult {
    /// Whether the repaired content validates
    pub success: bool,

    /// What was changed, in the order it was applied
    pub fixed_issues: Vec<String>,

    /// The repaired stream
    pub content: String,
}

/// Byte ranges of complete formats, markers included, plus marker counts.
struct Formats {
    pairs: Vec<(usize, usize)>,
    starts: usize,
    ends: usize,
}

fn scan(stream: &str) -> Formats {
    let mut markers: Vec<(usize, bool)> = stream
        .match_indices(START)
        .map(|(i, _)| (i, true))
        .chain(stream.match_indices(END).map(|(i, _)| (i, false)))
        .collect();
    markers.sort_unstable();

    let starts = markers.iter().filter(|(_, s)| *s).count();
    let ends = markers.len() - starts;

    let mut pairs = Vec::new();
    let mut open = None;
    for (pos, is_start) in markers {
        match (is_start, open) {
            (true, None) => open = Some(pos),
            (false, Some(start)) => {
                pairs.push((start, pos + END.len()));
                open = None;
            }
            // stray start inside an open format, or end without a start
            _ => {}
        }
    }

    Formats {
        pairs,
        starts,
        ends,
    }
}

/// Text outside every complete format.
fn outside_text(stream: &str, pairs: &[(usize, usize)]) -> String {
    let mut out = String::new();
    let mut last = 0;
    for &(start, end) in pairs {
        out.push_str(&stream[last..start]);
        last = end;
    }
    out.push_str(&stream[last..]);
    out
}

/// Validate a command stream.
pub fn validate(stream: &str) -> ValidationReport {
    let mut issues = Vec::new();
    if stream.trim().is_empty() {
        issues.push(Issue::new(
            Severity::Error,
            IssueKind::EmptyStream,
            "Stream is empty",
        ));
        return ValidationReport::from_issues(issues, 0);
    }

    let formats = scan(stream);
    let label_count = formats.pairs.len();

    if formats.pairs.is_empty() {
        let message = match (formats.starts, formats.ends) {
            (0, 0) => "No ^XA/^XZ format markers".to_string(),
            (s, 0) => format!("{} ^XA without a closing ^XZ", s),
            (0, e) => format!("{} ^XZ without an opening ^XA", e),
            (s, e) => format!("{} ^XA and {} ^XZ never form a complete format", s, e),
        };
        issues.push(Issue::new(Severity::Error, IssueKind::MissingFormat, message));
    } else {
        if formats.pairs.len() > 1 {
            issues.push(Issue::new(
                Severity::Error,
                IssueKind::MultipleFormats,
                format!("Expected one label format, found {}", formats.pairs.len()),
            ));
        }
        if formats.starts != formats.ends {
            issues.push(Issue::new(
                Severity::Error,
                IssueKind::UnbalancedMarkers,
                format!(
                    "Marker counts differ: {} ^XA, {} ^XZ",
                    formats.starts, formats.ends
                ),
            ));
        }
        if !outside_text(stream, &formats.pairs).trim().is_empty() {
            issues.push(Issue::new(
                Severity::Warning,
                IssueKind::ContentOutsideFormat,
                "Content outside ^XA/^XZ is ignored by the printer",
            ));
        }
    }

    if !stream.contains("^FD") {
        issues.push(Issue::new(
            Severity::Warning,
            IssueKind::NoFieldData,
            "No field data (^FD), the label prints blank",
        ));
    }
    if stream.contains("^FS") && !stream.contains("^FO") {
        issues.push(Issue::new(
            Severity::Warning,
            IssueKind::FieldWithoutOrigin,
            "Field separators (^FS) without any field origin (^FO)",
        ));
    }
    if !stream.contains("^PR") {
        issues.push(Issue::new(
            Severity::Info,
            IssueKind::NoPrintSpeed,
            "No print speed (^PR), printer default applies",
        ));
    }

    ValidationReport::from_issues(issues, label_count)
}

/// Remove every format marker, including ones formed by earlier removals.
fn strip_markers(text: &str) -> (String, bool) {
    let mut out = text.to_string();
    let mut changed = false;
    while out.contains(START) || out.contains(END) {
        out = out.replace(START, "").replace(END, "");
        changed = true;
    }
    (out, changed)
}

/// Rewrite a stream into a single valid format.
pub fn repair(stream: &str) -> RepairResult {
    let formats = scan(stream);
    let mut fixed_issues = Vec::new();

    let body = match formats.pairs.first() {
        Some(&(start, end)) => {
            if formats.pairs.len() > 1 {
                fixed_issues.push(format!(
                    "Dropped {} extra label format(s)",
                    formats.pairs.len() - 1
                ));
            }
            if !outside_text(stream, &formats.pairs).trim().is_empty() {
                fixed_issues.push("Removed content outside ^XA/^XZ".to_string());
            }
            let (inner, stray) = strip_markers(&stream[start + START.len()..end - END.len()]);
            if stray {
                fixed_issues.push("Removed stray ^XA inside the format".to_string());
            }
            inner
        }
        None => {
            let (inner, _) = strip_markers(stream);
            fixed_issues.push("Wrapped content in ^XA/^XZ".to_string());
            inner
        }
    };

    let mut body = body.trim().to_string();
    if !body.contains("^PR") {
        body = if body.is_empty() {
            DEFAULT_PRINT_SPEED.to_string()
        } else {
            format!("{}\n{}", DEFAULT_PRINT_SPEED, body)
        };
        fixed_issues.push(format!("Added default print speed ({})", DEFAULT_PRINT_SPEED));
    }

    let content = format!("{}\n{}\n{}", START, body, END);
    let report = validate(&content);
    if !fixed_issues.is_empty() {
        log::warn!("Repaired label format: {}", fixed_issues.join("; "));
    }

    RepairResult {
        success: report.success,
        fixed_issues,
        content,
    }
}
