//! Template merge orchestration

use serde_json::Value;

use sheetfill_core::ReplacePolicy;

use crate::archive::XlsxArchive;
use crate::error::Result;
use crate::shared::SharedStrings;
use crate::sheet::rewrite_sheet;

/// MIME type of XLSX workbooks.
pub const XLSX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// Merge a JSON data context into every `{{ placeholder }}` of an XLSX
/// template.
///
/// Visits every worksheet of the workbook; string cells whose text carries
/// a placeholder are rewritten according to `policy`, everything else is
/// preserved byte-for-byte. Malformed input surfaces as a load error and
/// produces no output; per-cell oddities never fail the merge, the cell is
/// simply left untouched.
///
/// # Example
///
/// ```no_run
/// use serde_json::json;
/// use sheetfill_core::ReplacePolicy;
/// use sheetfill_xlsx::merge_template;
///
/// let template = std::fs::read("template.xlsx")?;
/// let merged = merge_template(&template, &json!({"name": "Stanley"}), &ReplacePolicy::new())?;
/// std::fs::write("export.xlsx", merged)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub fn merge_template(template: &[u8], data: &Value, policy: &ReplacePolicy) -> Result<Vec<u8>> {
    let mut archive = XlsxArchive::from_bytes(template)?;

    let shared = match archive.shared_strings_xml() {
        Some(xml) => SharedStrings::parse(xml)?,
        None => SharedStrings::default(),
    };

    for part in archive.worksheet_parts() {
        let Some(xml) = archive.get(&part) else {
            continue;
        };
        if let Some(rewritten) = rewrite_sheet(xml, &shared, data, policy)? {
            archive.set(part, rewritten);
        }
    }

    archive.to_bytes()
}
