//! Integration tests for the sheetfill CLI
//!
//! These tests verify the merge round-trip on disk: template in, filled
//! workbook out.

use std::fs;
use std::io::{Cursor, Write};

use serde_json::json;
use tempfile::TempDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use sheetfill_cli::{merge_command, MissingMode};
use sheetfill_xlsx::XlsxArchive;

/// Create a minimal valid XLSX template for testing
fn create_test_template() -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    let mut zip = ZipWriter::new(&mut buffer);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Stored);

    zip.start_file("[Content_Types].xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  <Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>
  <Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>
</Types>"#).unwrap();

    zip.start_file("_rels/.rels", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>"#).unwrap();

    zip.start_file("xl/workbook.xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">
  <sheets><sheet name="Sheet1" sheetId="1" r:id="rId1"/></sheets>
</workbook>"#).unwrap();

    zip.start_file("xl/_rels/workbook.xml.rels", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/>
</Relationships>"#).unwrap();

    zip.start_file("xl/worksheets/sheet1.xml", options).unwrap();
    zip.write_all(br#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <sheetData>
    <row r="1">
      <c r="A1" t="inlineStr"><is><t>Hello {{name}}, total {{order.total}}</t></is></c>
      <c r="B1" t="inlineStr"><is><t>{{order.total}}</t></is></c>
      <c r="C1" t="inlineStr"><is><t>{{absent}}</t></is></c>
    </row>
  </sheetData>
</worksheet>"#).unwrap();

    zip.finish().unwrap();
    buffer.into_inner()
}

fn sheet_text(path: &std::path::Path) -> String {
    let archive = XlsxArchive::from_bytes(&fs::read(path).unwrap()).unwrap();
    String::from_utf8_lossy(archive.get("xl/worksheets/sheet1.xml").unwrap()).into_owned()
}

#[test]
fn test_merge_round_trip() {
    let dir = TempDir::new().unwrap();
    let template_path = dir.path().join("template.xlsx");
    let output_path = dir.path().join("export.xlsx");
    fs::write(&template_path, create_test_template()).unwrap();

    let data = json!({"name": "Stanley", "order": {"total": 199.99}});
    merge_command(&template_path, &output_path, &data, MissingMode::Empty).unwrap();

    let sheet = sheet_text(&output_path);
    assert!(
        sheet.contains("Hello Stanley, total 199.99"),
        "sheet: {sheet}"
    );
    // lone numeric placeholder becomes a typed cell
    assert!(sheet.contains(r#"<c r="B1"><v>199.99</v></c>"#));
    // unresolved placeholder cleared
    assert!(sheet.contains(r#"<c r="C1" t="inlineStr"><is><t/></is></c>"#));
}

#[test]
fn test_merge_keep_mode_preserves_tokens() {
    let dir = TempDir::new().unwrap();
    let template_path = dir.path().join("template.xlsx");
    let output_path = dir.path().join("export.xlsx");
    fs::write(&template_path, create_test_template()).unwrap();

    merge_command(&template_path, &output_path, &json!({}), MissingMode::Keep).unwrap();

    let sheet = sheet_text(&output_path);
    assert!(sheet.contains("Hello {{name}}, total {{order.total}}"));
    assert!(sheet.contains("{{absent}}"));
}

#[test]
fn test_merge_missing_template_fails() {
    let dir = TempDir::new().unwrap();
    let result = merge_command(
        &dir.path().join("nope.xlsx"),
        &dir.path().join("out.xlsx"),
        &json!({}),
        MissingMode::Empty,
    );
    assert!(result.is_err());
}

#[test]
fn test_merge_corrupt_template_fails_without_output() {
    let dir = TempDir::new().unwrap();
    let template_path = dir.path().join("template.xlsx");
    let output_path = dir.path().join("export.xlsx");
    fs::write(&template_path, b"not a workbook").unwrap();

    let result = merge_command(&template_path, &output_path, &json!({}), MissingMode::Empty);
    assert!(result.is_err());
    assert!(!output_path.exists());
}
