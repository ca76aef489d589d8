//! DOCX body to HTML conversion (word/document.xml)
//!
//! Best-effort fidelity: paragraphs, heading styles, bold/italic runs,
//! hyperlinks and tables. Everything else is dropped. The output feeds the
//! headless-browser print pipeline, not an archival format.

use std::collections::HashMap;
use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use zip::read::ZipArchive;

use crate::error::{PdfError, Result};

const DOCUMENT_PART: &str = "word/document.xml";
const DOCUMENT_RELS_PART: &str = "word/_rels/document.xml.rels";

/// Convert the body of a DOCX document to an HTML fragment.
pub fn docx_to_html(docx: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(docx))?;

    let document_xml = read_part(&mut archive, DOCUMENT_PART)?
        .ok_or_else(|| PdfError::InvalidDocx(format!("missing {DOCUMENT_PART}")))?;
    let links = match read_part(&mut archive, DOCUMENT_RELS_PART)? {
        Some(rels) => hyperlink_targets(&rels)?,
        None => HashMap::new(),
    };

    body_to_html(&document_xml, &links)
}

/// Wrap an HTML fragment in a printable standalone page.
pub fn wrap_page(body_html: &str) -> String {
    concat!(
        "<!doctype html><html><head>",
        "<meta charset=\"utf-8\">",
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">",
        "<style>",
        "body { font-family: -apple-system, Segoe UI, Roboto, Helvetica, Arial, sans-serif; margin: 32px; color: #111; }",
        "table { border-collapse: collapse; }",
        "td, th { border: 1px solid #ddd; padding: 6px 8px; }",
        "img { max-width: 100%; }",
        "</style></head><body>"
    )
    .to_string()
        + body_html
        + "</body></html>"
}

fn read_part<R: Read + std::io::Seek>(
    archive: &mut ZipArchive<R>,
    name: &str,
) -> Result<Option<Vec<u8>>> {
    match archive.by_name(name) {
        Ok(mut file) => {
            let mut contents = Vec::new();
            file.read_to_end(&mut contents)?;
            Ok(Some(contents))
        }
        Err(zip::result::ZipError::FileNotFound) => Ok(None),
        Err(err) => Err(err.into()),
    }
}

/// Map relationship ids to external hyperlink targets.
fn hyperlink_targets(rels_xml: &[u8]) -> Result<HashMap<String, String>> {
    let mut reader = Reader::from_reader(rels_xml);
    reader.config_mut().trim_text(true);

    let mut targets = HashMap::new();
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) | Event::Empty(e)
                if e.local_name().as_ref() == b"Relationship" =>
            {
                let mut id = None;
                let mut target = None;
                let mut is_link = false;
                for attr in e.attributes().filter_map(|a| a.ok()) {
                    match attr.key.as_ref() {
                        b"Id" => id = attr.unescape_value().ok().map(|s| s.to_string()),
                        b"Target" => target = attr.unescape_value().ok().map(|s| s.to_string()),
                        b"Type" => {
                            is_link = attr
                                .unescape_value()
                                .map(|t| t.ends_with("/hyperlink"))
                                .unwrap_or(false)
                        }
                        _ => {}
                    }
                }
                if is_link {
                    if let (Some(id), Some(target)) = (id, target) {
                        targets.insert(id, target);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(targets)
}

fn body_to_html(xml: &[u8], links: &HashMap<String, String>) -> Result<String> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut html = String::new();
    let mut buf = Vec::new();

    let mut in_body = false;
    let mut paragraph_tag: Option<&'static str> = None;
    let mut in_text = false;
    let mut bold = false;
    let mut italic = false;
    let mut run_open = false;
    let mut link_open = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"body" => in_body = true,
                b"tbl" if in_body => html.push_str("<table>"),
                b"tr" if in_body => html.push_str("<tr>"),
                b"tc" if in_body => html.push_str("<td>"),
                b"p" if in_body => {
                    paragraph_tag = Some("p");
                    html.push_str("<p>");
                }
                b"pStyle" => retag_paragraph(&mut html, &mut paragraph_tag, &e),
                b"hyperlink" if in_body => {
                    let href = get_attr(&e, b"id")
                        .and_then(|id| links.get(&id).cloned())
                        .or_else(|| get_attr(&e, b"anchor").map(|a| format!("#{a}")));
                    match href {
                        Some(href) => {
                            html.push_str("<a href=\"");
                            html.push_str(&escape_html(&href));
                            html.push_str("\">");
                            link_open = true;
                        }
                        None => link_open = false,
                    }
                }
                b"r" if in_body => {
                    bold = false;
                    italic = false;
                    run_open = false;
                }
                b"b" => bold = !is_off(&e),
                b"i" => italic = !is_off(&e),
                b"t" if in_body => {
                    open_run(&mut html, &mut run_open, bold, italic);
                    in_text = true;
                }
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"b" => bold = !is_off(&e),
                b"i" => italic = !is_off(&e),
                b"br" if in_body => html.push_str("<br>"),
                b"pStyle" => retag_paragraph(&mut html, &mut paragraph_tag, &e),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"body" => in_body = false,
                b"tbl" if in_body => html.push_str("</table>"),
                b"tr" if in_body => html.push_str("</tr>"),
                b"tc" if in_body => html.push_str("</td>"),
                b"p" if in_body => {
                    if let Some(tag) = paragraph_tag.take() {
                        html.push_str("</");
                        html.push_str(tag);
                        html.push('>');
                    }
                }
                b"hyperlink" if in_body => {
                    if link_open {
                        html.push_str("</a>");
                        link_open = false;
                    }
                }
                b"r" if in_body => close_run(&mut html, &mut run_open, bold, italic),
                b"t" => in_text = false,
                _ => {}
            },
            Event::Text(e) => {
                if in_body && in_text {
                    let text = e.unescape().unwrap_or_default();
                    html.push_str(&escape_html(&text));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }
    Ok(html)
}

/// Swap a freshly opened `<p>` for a heading tag when the paragraph style
/// asks for one.
fn retag_paragraph(
    html: &mut String,
    paragraph_tag: &mut Option<&'static str>,
    e: &quick_xml::events::BytesStart,
) {
    if let Some(tag) = heading_tag(get_attr(e, b"val").as_deref()) {
        if *paragraph_tag == Some("p") && html.ends_with("<p>") {
            html.truncate(html.len() - 3);
            html.push('<');
            html.push_str(tag);
            html.push('>');
            *paragraph_tag = Some(tag);
        }
    }
}

fn heading_tag(style_id: Option<&str>) -> Option<&'static str> {
    match style_id {
        Some("Heading1") => Some("h1"),
        Some("Heading2") => Some("h2"),
        Some("Heading3") => Some("h3"),
        Some("Heading4") => Some("h4"),
        Some("Heading5") => Some("h5"),
        Some("Heading6") => Some("h6"),
        Some("Title") => Some("h1"),
        _ => None,
    }
}

fn open_run(html: &mut String, run_open: &mut bool, bold: bool, italic: bool) {
    if *run_open {
        return;
    }
    if bold {
        html.push_str("<strong>");
    }
    if italic {
        html.push_str("<em>");
    }
    *run_open = true;
}

fn close_run(html: &mut String, run_open: &mut bool, bold: bool, italic: bool) {
    if !*run_open {
        return;
    }
    if italic {
        html.push_str("</em>");
    }
    if bold {
        html.push_str("</strong>");
    }
    *run_open = false;
}

fn is_off(e: &quick_xml::events::BytesStart) -> bool {
    matches!(
        get_attr(e, b"val").as_deref(),
        Some("0") | Some("false") | Some("none")
    )
}

fn get_attr(e: &quick_xml::events::BytesStart, name: &[u8]) -> Option<String> {
    e.attributes()
        .filter_map(|a| a.ok())
        .find(|a| {
            let key = a.key.as_ref();
            key == name || key.ends_with(name) && key.get(key.len() - name.len() - 1) == Some(&b':')
        })
        .and_then(|a| String::from_utf8(a.value.to_vec()).ok())
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;
    use zip::ZipWriter;

    fn build_docx(document_xml: &str) -> Vec<u8> {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        let options = SimpleFileOptions::default();

        zip.start_file("[Content_Types].xml", options).unwrap();
        zip.write_all(br#"<?xml version="1.0"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"/>"#).unwrap();
        zip.start_file("word/document.xml", options).unwrap();
        zip.write_all(document_xml.as_bytes()).unwrap();
        zip.start_file("word/_rels/document.xml.rels", options)
            .unwrap();
        zip.write_all(br#"<?xml version="1.0"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId5" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink" Target="https://example.com" TargetMode="External"/>
</Relationships>"#).unwrap();
        zip.finish().unwrap();
        buffer.into_inner()
    }

    #[test]
    fn test_paragraphs_and_headings() {
        let docx = build_docx(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:pPr><w:pStyle w:val="Heading1"/></w:pPr><w:r><w:t>Report</w:t></w:r></w:p>
<w:p><w:r><w:t>Hello world</w:t></w:r></w:p>
</w:body></w:document>"#,
        );
        let html = docx_to_html(&docx).unwrap();
        assert!(html.contains("<h1>Report</h1>"), "html: {html}");
        assert!(html.contains("<p>Hello world</p>"));
    }

    #[test]
    fn test_bold_italic_runs() {
        let docx = build_docx(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:r><w:rPr><w:b/><w:i/></w:rPr><w:t>strong</w:t></w:r></w:p>
</w:body></w:document>"#,
        );
        let html = docx_to_html(&docx).unwrap();
        assert!(html.contains("<strong><em>strong</em></strong>"), "html: {html}");
    }

    #[test]
    fn test_hyperlink_resolved_from_relationships() {
        let docx = build_docx(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><w:body>
<w:p><w:hyperlink r:id="rId5"><w:r><w:t>link</w:t></w:r></w:hyperlink></w:p>
</w:body></w:document>"#,
        );
        let html = docx_to_html(&docx).unwrap();
        assert!(
            html.contains(r#"<a href="https://example.com">link</a>"#),
            "html: {html}"
        );
    }

    #[test]
    fn test_table_markup() {
        let docx = build_docx(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:tbl><w:tr><w:tc><w:p><w:r><w:t>cell</w:t></w:r></w:p></w:tc></w:tr></w:tbl>
</w:body></w:document>"#,
        );
        let html = docx_to_html(&docx).unwrap();
        assert!(html.contains("<table><tr><td><p>cell</p></td></tr></table>"));
    }

    #[test]
    fn test_text_is_escaped() {
        let docx = build_docx(
            r#"<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>
<w:p><w:r><w:t>a &lt; b &amp; c</w:t></w:r></w:p>
</w:body></w:document>"#,
        );
        let html = docx_to_html(&docx).unwrap();
        assert!(html.contains("<p>a &lt; b &amp; c</p>"), "html: {html}");
    }

    #[test]
    fn test_missing_document_part_is_invalid() {
        let mut buffer = Cursor::new(Vec::new());
        let mut zip = ZipWriter::new(&mut buffer);
        zip.start_file("other.xml", SimpleFileOptions::default())
            .unwrap();
        zip.write_all(b"<x/>").unwrap();
        zip.finish().unwrap();

        let err = docx_to_html(&buffer.into_inner()).unwrap_err();
        assert!(matches!(err, PdfError::InvalidDocx(_)));
    }

    #[test]
    fn test_wrap_page_is_standalone() {
        let page = wrap_page("<p>x</p>");
        assert!(page.starts_with("<!doctype html>"));
        assert!(page.contains("<p>x</p>"));
        assert!(page.ends_with("</body></html>"));
    }
}
