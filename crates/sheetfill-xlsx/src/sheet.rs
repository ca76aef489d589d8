//! Worksheet rewriting
//!
//! Streams a worksheet part event by event, replaying everything verbatim
//! except string cells whose text carries a placeholder. Rewritten string
//! results become inline strings so the shared-string table never needs to
//! change; single-expression cells resolving to numbers or booleans are
//! written back as typed values.

use std::collections::HashSet;

use quick_xml::events::{BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use serde_json::Value;

use sheetfill_core::{resolve, single_expression, substitute, ReplacePolicy, PLACEHOLDER_OPEN};

use crate::cell::{classify, CellValue, RawCell};
use crate::error::{Result, XlsxError};
use crate::shared::{collect_subtree, skip_subtree, text_until_end, SharedStrings, StringItem};

/// Planned replacement for one cell.
#[derive(Debug)]
enum Rewrite {
    /// Replay the original events untouched
    Keep,
    /// Replace with an inline plain string
    Text(String),
    /// Replace with an inline rich string, style properties preserved
    Rich {
        props_xml: Option<String>,
        text: String,
    },
    /// Replace with a typed numeric value
    Number(serde_json::Number),
    /// Replace with a typed boolean value
    Bool(bool),
}

/// Rewrite one worksheet part against the data context.
///
/// Returns `Some(bytes)` when at least one cell changed, `None` when the
/// sheet is untouched (so the caller can keep the original part bytes).
pub fn rewrite_sheet(
    xml: &[u8],
    shared: &SharedStrings,
    context: &Value,
    policy: &ReplacePolicy,
) -> Result<Option<Vec<u8>>> {
    let hyperlinks = hyperlink_refs(xml)?;

    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);
    let mut writer = Writer::new(Vec::new());

    let mut buf = Vec::new();
    let mut in_sheet_data = false;
    let mut changed = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) if in_sheet_data && e.local_name().as_ref() == b"c" => {
                let start = e.into_owned();
                let subtree = collect_subtree(&mut reader)?;
                let cell = parse_cell(start, subtree)?;
                match plan_rewrite(&cell, shared, &hyperlinks, context, policy) {
                    Rewrite::Keep => replay(&mut writer, &cell.events)?,
                    plan => {
                        write_cell(&mut writer, &cell, plan)?;
                        changed = true;
                    }
                }
            }
            Event::Start(e) => {
                if e.local_name().as_ref() == b"sheetData" {
                    in_sheet_data = true;
                }
                writer.write_event(Event::Start(e.into_owned()))?;
            }
            Event::End(e) => {
                if e.local_name().as_ref() == b"sheetData" {
                    in_sheet_data = false;
                }
                writer.write_event(Event::End(e.into_owned()))?;
            }
            Event::Eof => break,
            other => writer.write_event(other.into_owned())?,
        }
        buf.clear();
    }

    Ok(changed.then(|| writer.into_inner()))
}

/// Collect the targets of every `<hyperlink ref="…">` in the sheet.
///
/// Hyperlink elements follow the sheet data, so this runs as a separate
/// pass before any cell is visited.
fn hyperlink_refs(xml: &[u8]) -> Result<HashSet<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut refs = HashSet::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e) if e.local_name().as_ref() == b"hyperlink" => {
                if let Some(target) = get_attr(&e, b"ref") {
                    refs.insert(target);
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(refs)
}

/// Assemble a `RawCell` from its start tag and inner subtree.
fn parse_cell(start: BytesStart<'static>, subtree: Vec<Event<'static>>) -> Result<RawCell> {
    let reference = get_attr(&start, b"r");
    let cell_type = get_attr(&start, b"t");

    let mut has_formula = false;
    let mut value = None;
    let mut inline = None;

    let mut i = 0;
    while i < subtree.len() {
        match &subtree[i] {
            Event::Start(e) => match e.local_name().as_ref() {
                b"f" => {
                    has_formula = true;
                    i = skip_subtree(&subtree, i);
                }
                b"v" => {
                    let (text, next) = text_until_end(&subtree, i + 1);
                    value = Some(text);
                    i = next;
                }
                b"is" => {
                    let end = skip_subtree(&subtree, i);
                    inline = Some(StringItem::from_events(&subtree[i + 1..end - 1])?);
                    i = end;
                }
                _ => i = skip_subtree(&subtree, i),
            },
            Event::Empty(e) => {
                match e.local_name().as_ref() {
                    b"f" => has_formula = true,
                    b"is" => inline = Some(StringItem::Plain(String::new())),
                    _ => {}
                }
                i += 1;
            }
            _ => i += 1,
        }
    }

    let end_name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut events = Vec::with_capacity(subtree.len() + 2);
    events.push(Event::Start(start));
    events.extend(subtree);
    events.push(Event::End(BytesEnd::new(end_name)));

    Ok(RawCell {
        events,
        reference,
        cell_type,
        has_formula,
        value,
        inline,
    })
}

/// Decide what to do with a cell.
fn plan_rewrite(
    cell: &RawCell,
    shared: &SharedStrings,
    hyperlinks: &HashSet<String>,
    context: &Value,
    policy: &ReplacePolicy,
) -> Rewrite {
    let shape = classify(cell, shared, hyperlinks);

    let text = match &shape {
        CellValue::PlainText(t) | CellValue::Hyperlink(t) => t.clone(),
        CellValue::RichText(runs) => runs.iter().map(|r| r.text.as_str()).collect(),
        CellValue::Opaque => return Rewrite::Keep,
    };
    if !text.contains(PLACEHOLDER_OPEN) {
        return Rewrite::Keep;
    }

    match shape {
        CellValue::Hyperlink(text) => {
            let replaced = substitute(&text, context, policy);
            if replaced == text {
                Rewrite::Keep
            } else {
                Rewrite::Text(replaced.into_owned())
            }
        }
        CellValue::RichText(runs) => {
            // only single-run rich text is rewritten; multi-run stays opaque
            if runs.len() != 1 {
                return Rewrite::Keep;
            }
            let run = &runs[0];
            let replaced = substitute(&run.text, context, policy);
            if replaced == run.text {
                Rewrite::Keep
            } else {
                Rewrite::Rich {
                    props_xml: run.props_xml.clone(),
                    text: replaced.into_owned(),
                }
            }
        }
        CellValue::PlainText(text) => plan_plain(&text, context, policy),
        CellValue::Opaque => Rewrite::Keep,
    }
}

/// Plain-string branch: a cell holding exactly one placeholder keeps the
/// resolved value's type for numbers and booleans; mixed content goes
/// through generic substitution.
fn plan_plain(text: &str, context: &Value, policy: &ReplacePolicy) -> Rewrite {
    if let Some(expression) = single_expression(text) {
        return match resolve(context, expression).filter(|v| !v.is_null()) {
            Some(Value::Number(n)) => Rewrite::Number(n.clone()),
            Some(Value::Bool(b)) => Rewrite::Bool(*b),
            Some(Value::String(s)) => Rewrite::Text(s.clone()),
            Some(other) => Rewrite::Text(policy.stringify(other)),
            None => {
                let replacement = policy.missing_text(expression, text);
                if replacement == text {
                    Rewrite::Keep
                } else {
                    Rewrite::Text(replacement)
                }
            }
        };
    }

    let replaced = substitute(text, context, policy);
    if replaced == text {
        Rewrite::Keep
    } else {
        Rewrite::Text(replaced.into_owned())
    }
}

fn replay(writer: &mut Writer<Vec<u8>>, events: &[Event<'static>]) -> Result<()> {
    for event in events {
        writer.write_event(event.clone())?;
    }
    Ok(())
}

/// Emit the replacement cell, preserving every original attribute except
/// the value type.
fn write_cell(writer: &mut Writer<Vec<u8>>, cell: &RawCell, plan: Rewrite) -> Result<()> {
    let Some(Event::Start(original)) = cell.events.first() else {
        return Err(XlsxError::InvalidStructure("cell without start tag".into()));
    };
    let name = String::from_utf8_lossy(original.name().as_ref()).into_owned();

    let mut c = BytesStart::new(name.clone());
    for attr in original.attributes().filter_map(|a| a.ok()) {
        if attr.key.as_ref() != b"t" {
            c.push_attribute(attr);
        }
    }

    match plan {
        Rewrite::Keep => replay(writer, &cell.events)?,
        Rewrite::Number(number) => {
            writer.write_event(Event::Start(c))?;
            writer.write_event(Event::Start(BytesStart::new("v")))?;
            writer.write_event(Event::Text(BytesText::new(&number.to_string())))?;
            writer.write_event(Event::End(BytesEnd::new("v")))?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        Rewrite::Bool(flag) => {
            c.push_attribute(("t", "b"));
            writer.write_event(Event::Start(c))?;
            writer.write_event(Event::Start(BytesStart::new("v")))?;
            writer.write_event(Event::Text(BytesText::new(if flag { "1" } else { "0" })))?;
            writer.write_event(Event::End(BytesEnd::new("v")))?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        Rewrite::Text(text) => {
            c.push_attribute(("t", "inlineStr"));
            writer.write_event(Event::Start(c))?;
            writer.write_event(Event::Start(BytesStart::new("is")))?;
            write_t(writer, &text)?;
            writer.write_event(Event::End(BytesEnd::new("is")))?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
        Rewrite::Rich { props_xml, text } => {
            c.push_attribute(("t", "inlineStr"));
            writer.write_event(Event::Start(c))?;
            writer.write_event(Event::Start(BytesStart::new("is")))?;
            writer.write_event(Event::Start(BytesStart::new("r")))?;
            if let Some(props) = props_xml {
                // captured verbatim at parse time, written back verbatim
                writer.write_event(Event::Text(BytesText::from_escaped(props)))?;
            }
            write_t(writer, &text)?;
            writer.write_event(Event::End(BytesEnd::new("r")))?;
            writer.write_event(Event::End(BytesEnd::new("is")))?;
            writer.write_event(Event::End(BytesEnd::new(name)))?;
        }
    }
    Ok(())
}

fn write_t(writer: &mut Writer<Vec<u8>>, text: &str) -> Result<()> {
    if text.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("t")))?;
        return Ok(());
    }
    let mut t = BytesStart::new("t");
    if text.trim() != text {
        t.push_attribute(("xml:space", "preserve"));
    }
    writer.write_event(Event::Start(t))?;
    writer.write_event(Event::Text(BytesText::new(text)))?;
    writer.write_event(Event::End(BytesEnd::new("t")))?;
    Ok(())
}

fn get_attr(e: &BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| a.key.as_ref() == name)
        .and_then(|a| String::from_utf8(a.value.to_vec()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rewrite(xml: &str, context: Value) -> Option<String> {
        let shared = SharedStrings::default();
        let policy = ReplacePolicy::new();
        rewrite_sheet(xml.as_bytes(), &shared, &context, &policy)
            .unwrap()
            .map(|bytes| String::from_utf8(bytes).unwrap())
    }

    #[test]
    fn test_untouched_sheet_returns_none() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1"><v>42</v></c></row></sheetData></worksheet>"#;
        assert_eq!(rewrite(xml, json!({})), None);
    }

    #[test]
    fn test_inline_mixed_text_substituted() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1" s="3" t="inlineStr"><is><t>Hi {{name}}!</t></is></c></row></sheetData></worksheet>"#;
        let out = rewrite(xml, json!({"name": "Ada"})).unwrap();
        assert!(out.contains(r#"<c r="A1" s="3" t="inlineStr"><is><t>Hi Ada!</t></is></c>"#));
    }

    #[test]
    fn test_single_expression_number_becomes_typed_cell() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1" s="2" t="inlineStr"><is><t>{{order.total}}</t></is></c></row></sheetData></worksheet>"#;
        let out = rewrite(xml, json!({"order": {"total": 199.99}})).unwrap();
        assert!(out.contains(r#"<c r="A1" s="2"><v>199.99</v></c>"#));
    }

    #[test]
    fn test_single_expression_bool_becomes_typed_cell() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>{{active}}</t></is></c></row></sheetData></worksheet>"#;
        let out = rewrite(xml, json!({"active": true})).unwrap();
        assert!(out.contains(r#"<c r="A1" t="b"><v>1</v></c>"#));
    }

    #[test]
    fn test_single_expression_missing_becomes_empty_string() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>{{missing.path}}</t></is></c></row></sheetData></worksheet>"#;
        let out = rewrite(xml, json!({})).unwrap();
        assert!(out.contains(r#"<c r="A1" t="inlineStr"><is><t/></is></c>"#));
    }

    #[test]
    fn test_formula_cell_untouched() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1" t="str"><f>CONCAT("{{a}}")</f><v>{{a}}</v></c></row></sheetData></worksheet>"#;
        assert_eq!(rewrite(xml, json!({"a": 1})), None);
    }

    #[test]
    fn test_rich_single_run_keeps_props() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><r><rPr><b/></rPr><t>{{name}}</t></r></is></c></row></sheetData></worksheet>"#;
        let out = rewrite(xml, json!({"name": "Ada"})).unwrap();
        assert!(out.contains(
            r#"<c r="A1" t="inlineStr"><is><r><rPr><b/></rPr><t>Ada</t></r></is></c>"#
        ));
    }

    #[test]
    fn test_rich_multi_run_untouched() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><r><t>{{a}}</t></r><r><rPr><b/></rPr><t>x</t></r></is></c></row></sheetData></worksheet>"#;
        assert_eq!(rewrite(xml, json!({"a": 1})), None);
    }

    #[test]
    fn test_hyperlink_cell_text_substituted_link_untouched() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>{{name}}</t></is></c></row></sheetData><hyperlinks><hyperlink ref="A1" r:id="rId1"/></hyperlinks></worksheet>"#;
        let out = rewrite(xml, json!({"name": "Stanley"})).unwrap();
        // hyperlink forces the string branch even for a lone placeholder
        assert!(out.contains(r#"<c r="A1" t="inlineStr"><is><t>Stanley</t></is></c>"#));
        assert!(out.contains(r#"<hyperlink ref="A1" r:id="rId1"/>"#));
    }

    #[test]
    fn test_whitespace_result_preserved() {
        let xml = r#"<worksheet><sheetData><row r="1"><c r="A1" t="inlineStr"><is><t>{{pad}}</t></is></c></row></sheetData></worksheet>"#;
        let out = rewrite(xml, json!({"pad": " x "})).unwrap();
        assert!(out.contains(r#"<t xml:space="preserve"> x </t>"#));
    }
}
