//! Integration tests for validation and repair.

use html2zpl::{convert, convert_with_report, repair, validate, IssueKind, LabelConfig, Severity};
use std::fs;

#[test]
fn test_two_formats_repaired_to_first() {
    let stream = "^XA\n^FO10,10^A0N,25,25^FDfirst^FS\n^XZ\n^XA\n^FO10,10^A0N,25,25^FDsecond^FS\n^XZ";

    let report = validate(stream);
    assert!(!report.success);
    assert_eq!(report.label_count, 2);
    assert!(report.has(IssueKind::MultipleFormats));

    let result = repair(stream);
    assert!(result.success);
    assert!(result.content.contains("^FDfirst^FS"));
    assert!(!result.content.contains("^FDsecond^FS"));
    assert!(result.content.contains("^PR3"));

    let after = validate(&result.content);
    assert!(after.success);
    assert_eq!(after.label_count, 1);
}

#[test]
fn test_repair_always_validates() {
    let inputs = [
        "",
        "   ",
        "^XA",
        "^XZ",
        "^XZ^XA",
        "^XA^XA^XZ",
        "^XA^XZ^XZ",
        "^XA^XZ^XA^XZ^XA^XZ",
        "^X^XAA",
        "^XA^X^XZZ",
        "^^XAXZ",
        "plain text without commands",
        "^FO1,1^FDdata^FS",
        "\u{0}\u{1}\u{feff}binary\u{7f}",
        "^XA\n^PR5\n^FO1,1^FDok^FS\n^XZ\ntrailing",
    ];
    for input in inputs {
        let result = repair(input);
        assert!(result.success, "repair({:?}) gave {:?}", input, result.content);
        let report = validate(&result.content);
        assert!(report.success, "{:?}", report.issues);
        assert_eq!(report.label_count, 1);
    }
}

#[test]
fn test_repair_keeps_existing_speed() {
    let result = repair("^XA\n^PR5\n^FO1,1^FDok^FS\n^XZ\ntrailing");
    assert!(!result.content.contains("^PR3"));
    assert!(!result.content.contains("trailing"));
    assert_eq!(result.fixed_issues.len(), 1);
}

#[test]
fn test_converter_output_is_valid() {
    let html = "<h1>Invoice</h1><table><tr><td>1</td><td>Item</td></tr></table>";
    let result = convert_with_report(html, &LabelConfig::default()).unwrap();
    assert!(result.report.success);
    assert_eq!(result.report.errors().count(), 0);
    assert_eq!(result.report.warnings().count(), 0);
    // no speed configured, so only the informational note remains
    assert_eq!(result.report.issues.len(), 1);
    assert_eq!(result.report.issues[0].severity, Severity::Info);

    let with_speed = LabelConfig::default().with_print_speed(3);
    let result = convert_with_report(html, &with_speed).unwrap();
    assert!(result.report.issues.is_empty());
}

#[test]
fn test_empty_document_has_no_field_data() {
    let result = convert_with_report("", &LabelConfig::default()).unwrap();
    assert!(result.report.success);
    assert!(result.report.has(IssueKind::NoFieldData));
}

#[test]
fn test_command_text_in_content_is_escaped() {
    let zpl = convert("<p>^XZ^XA~JR under_score</p>", &LabelConfig::default()).unwrap();
    let report = validate(&zpl);
    assert!(report.success);
    assert_eq!(report.label_count, 1);
    assert!(zpl.contains("^FH^FD_5EXZ_5EXA_7EJR under_5Fscore^FS"));
}

#[test]
fn test_validate_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.zpl");
    fs::write(&path, "^FO1,1^FDx^FS\n^XZ").unwrap();

    let content = fs::read_to_string(&path).unwrap();
    assert!(!validate(&content).success);

    fs::write(&path, repair(&content).content).unwrap();
    let content = fs::read_to_string(&path).unwrap();
    assert!(validate(&content).success);
}

#[test]
fn test_report_json_shape() {
    let json = validate("^XA^XA^FDx^FS^XZ")
        .to_json(html2zpl::JsonFormat::Pretty)
        .unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(value["success"], false);
    assert_eq!(value["label_count"], 1);
    assert!(value["issues"]
        .as_array()
        .unwrap()
        .iter()
        .any(|i| i["kind"] == "unbalanced_markers" && i["severity"] == "error"));
}
