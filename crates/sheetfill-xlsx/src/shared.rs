//! Shared-string table and string item parsing
//!
//! Worksheet cells store text either inline (`<is>`) or as an index into the
//! workbook's shared-string table (`xl/sharedStrings.xml`). Both use the same
//! item markup: a direct `<t>` for plain text, or a sequence of `<r>` runs
//! for rich text. Run properties (`<rPr>`) are captured verbatim so styling
//! survives a rewrite untouched.

use std::io::BufRead;

use quick_xml::events::Event;
use quick_xml::{Reader, Writer};

use crate::error::{Result, XlsxError};

/// A styled fragment of a rich-text item
#[derive(Debug, Clone, PartialEq)]
pub struct RichRun {
    /// The run's text content
    pub text: String,
    /// The run's `<rPr>` properties markup, captured verbatim
    pub props_xml: Option<String>,
}

/// One string item, as stored in the shared table or inline in a cell
#[derive(Debug, Clone, PartialEq)]
pub enum StringItem {
    /// Plain text
    Plain(String),
    /// Rich text runs, in order
    Rich(Vec<RichRun>),
    /// Phonetic annotations or markup the engine declines to interpret
    Opaque,
}

impl StringItem {
    /// Concatenated text of the item, if its shape is recognized
    pub fn text(&self) -> Option<String> {
        match self {
            StringItem::Plain(s) => Some(s.clone()),
            StringItem::Rich(runs) => Some(runs.iter().map(|r| r.text.as_str()).collect()),
            StringItem::Opaque => None,
        }
    }

    /// Build an item from the events between its start and end tags
    pub(crate) fn from_events(events: &[Event<'static>]) -> Result<Self> {
        let mut direct: Option<String> = None;
        let mut runs = Vec::new();
        let mut opaque = false;

        let mut i = 0;
        while i < events.len() {
            match &events[i] {
                Event::Start(e) => match e.local_name().as_ref() {
                    b"t" => {
                        let (text, next) = text_until_end(events, i + 1);
                        direct.get_or_insert_with(String::new).push_str(&text);
                        i = next;
                    }
                    b"r" => {
                        let (run, next) = parse_run(events, i + 1)?;
                        match run {
                            Some(run) => runs.push(run),
                            None => opaque = true,
                        }
                        i = next;
                    }
                    // rPh, phoneticPr and anything else unrecognized
                    _ => {
                        opaque = true;
                        i = skip_subtree(events, i);
                    }
                },
                Event::Empty(e) => {
                    match e.local_name().as_ref() {
                        b"t" => {
                            direct.get_or_insert_with(String::new);
                        }
                        _ => opaque = true,
                    }
                    i += 1;
                }
                _ => i += 1,
            }
        }

        if opaque {
            return Ok(StringItem::Opaque);
        }
        Ok(match (direct, runs.is_empty()) {
            (Some(text), true) => StringItem::Plain(text),
            (None, false) => StringItem::Rich(runs),
            (None, true) => StringItem::Plain(String::new()),
            // direct text mixed with runs is not a shape we rewrite
            (Some(_), false) => StringItem::Opaque,
        })
    }
}

/// Parsed shared-string table
#[derive(Debug, Default)]
pub struct SharedStrings {
    items: Vec<StringItem>,
}

impl SharedStrings {
    /// Parse `xl/sharedStrings.xml`
    pub fn parse(xml: &[u8]) -> Result<Self> {
        let mut reader = Reader::from_reader(xml);
        reader.config_mut().trim_text(false);

        let mut items = Vec::new();
        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf)? {
                Event::Start(e) if e.local_name().as_ref() == b"si" => {
                    let subtree = collect_subtree(&mut reader)?;
                    items.push(StringItem::from_events(&subtree)?);
                }
                Event::Empty(e) if e.local_name().as_ref() == b"si" => {
                    items.push(StringItem::Plain(String::new()));
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }
        Ok(Self { items })
    }

    /// Look up an item by its table index
    pub fn get(&self, index: usize) -> Option<&StringItem> {
        self.items.get(index)
    }

    /// Number of items in the table
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Parse one `<r>` run from the events following its start tag.
///
/// Returns the run and the index just past its end tag, or `None` for a run
/// carrying markup we do not recognize.
fn parse_run(events: &[Event<'static>], start: usize) -> Result<(Option<RichRun>, usize)> {
    let mut text = String::new();
    let mut props_xml = None;
    let mut recognized = true;

    let mut i = start;
    while i < events.len() {
        match &events[i] {
            Event::Start(e) => match e.local_name().as_ref() {
                b"t" => {
                    let (t, next) = text_until_end(events, i + 1);
                    text.push_str(&t);
                    i = next;
                }
                b"rPr" => {
                    let (raw, next) = capture_raw(events, i)?;
                    props_xml = Some(raw);
                    i = next;
                }
                _ => {
                    recognized = false;
                    i = skip_subtree(events, i);
                }
            },
            Event::Empty(e) => {
                match e.local_name().as_ref() {
                    b"t" => {}
                    b"rPr" => {
                        let (raw, _) = capture_raw(events, i)?;
                        props_xml = Some(raw);
                    }
                    _ => recognized = false,
                }
                i += 1;
            }
            Event::End(_) => {
                let run = recognized.then_some(RichRun { text, props_xml });
                return Ok((run, i + 1));
            }
            _ => i += 1,
        }
    }
    Ok((None, events.len()))
}

/// Collect the subtree following a start tag, up to (excluding) its
/// matching end tag. The reader is left positioned just past the end tag.
pub(crate) fn collect_subtree<R: BufRead>(reader: &mut Reader<R>) -> Result<Vec<Event<'static>>> {
    let mut events = Vec::new();
    let mut depth = 1u32;
    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                depth += 1;
                events.push(Event::Start(e.into_owned()));
            }
            Event::End(e) => {
                depth -= 1;
                if depth == 0 {
                    break;
                }
                events.push(Event::End(e.into_owned()));
            }
            Event::Eof => {
                return Err(XlsxError::InvalidStructure("unexpected end of XML".into()));
            }
            other => events.push(other.into_owned()),
        }
        buf.clear();
    }
    Ok(events)
}

/// Index just past the matching end tag of the element starting at `start`.
pub(crate) fn skip_subtree(events: &[Event<'static>], start: usize) -> usize {
    if matches!(events.get(start), Some(Event::Empty(_))) {
        return start + 1;
    }
    let mut depth = 1usize;
    let mut i = start + 1;
    while i < events.len() {
        match &events[i] {
            Event::Start(_) => depth += 1,
            Event::End(_) => {
                depth -= 1;
                if depth == 0 {
                    return i + 1;
                }
            }
            _ => {}
        }
        i += 1;
    }
    events.len()
}

/// Accumulate text content from `start` until the enclosing end tag.
/// Returns the text and the index just past that end tag.
pub(crate) fn text_until_end(events: &[Event<'static>], start: usize) -> (String, usize) {
    let mut text = String::new();
    let mut i = start;
    while i < events.len() {
        match &events[i] {
            Event::Text(e) => text.push_str(&e.unescape().unwrap_or_default()),
            Event::End(_) => return (text, i + 1),
            _ => {}
        }
        i += 1;
    }
    (text, i)
}

/// Serialize the element starting at `start` (and its subtree) verbatim.
/// Returns the XML text and the index just past the element.
pub(crate) fn capture_raw(events: &[Event<'static>], start: usize) -> Result<(String, usize)> {
    let end = skip_subtree(events, start);
    let mut writer = Writer::new(Vec::new());
    for event in &events[start..end] {
        writer.write_event(event.clone())?;
    }
    let xml = String::from_utf8_lossy(&writer.into_inner()).into_owned();
    Ok((xml, end))
}
