//! Cell-value classification
//!
//! A cell's shape is computed from its raw markup before any mutation.
//! Everything the engine does not recognize is `Opaque` and stays untouched,
//! favoring non-corruption over completeness.

use std::collections::HashSet;

use quick_xml::events::Event;

use crate::shared::{RichRun, SharedStrings, StringItem};

/// A raw `<c>` element captured from a worksheet, carrying everything needed
/// to classify it or replay it verbatim.
#[derive(Debug)]
pub(crate) struct RawCell {
    /// The full `<c>…</c>` event subtree, for verbatim replay
    pub events: Vec<Event<'static>>,
    /// Cell reference (`r` attribute), e.g. `B2`
    pub reference: Option<String>,
    /// The `t` type attribute, if any
    pub cell_type: Option<String>,
    /// Whether the cell carries a formula
    pub has_formula: bool,
    /// Text content of `<v>`
    pub value: Option<String>,
    /// Parsed `<is>` inline string, if any
    pub inline: Option<StringItem>,
}

/// Shape of a cell's value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// A plain text cell (inline or shared string)
    PlainText(String),
    /// Rich text runs
    RichText(Vec<RichRun>),
    /// A text cell targeted by a `<hyperlink>` element; only its text is
    /// ever rewritten, the link itself stays untouched
    Hyperlink(String),
    /// A value the engine declines to rewrite: formulas, numbers, dates,
    /// errors, or any unrecognized markup
    Opaque,
}

pub(crate) fn classify(
    cell: &RawCell,
    shared: &SharedStrings,
    hyperlinks: &HashSet<String>,
) -> CellValue {
    if cell.has_formula {
        return CellValue::Opaque;
    }

    let item = match cell.cell_type.as_deref() {
        Some("s") => {
            let looked_up = cell
                .value
                .as_deref()
                .and_then(|v| v.trim().parse::<usize>().ok())
                .and_then(|index| shared.get(index));
            match looked_up {
                Some(item) => item.clone(),
                None => return CellValue::Opaque,
            }
        }
        Some("inlineStr") => match &cell.inline {
            Some(item) => item.clone(),
            None => return CellValue::Opaque,
        },
        // numbers, booleans, dates, errors, cached formula strings
        _ => return CellValue::Opaque,
    };

    let is_link = cell
        .reference
        .as_deref()
        .is_some_and(|r| hyperlinks.contains(r));

    match item {
        StringItem::Plain(text) if is_link => CellValue::Hyperlink(text),
        StringItem::Plain(text) => CellValue::PlainText(text),
        // hyperlink display text may be styled; substitution coerces it
        StringItem::Rich(runs) if is_link => {
            CellValue::Hyperlink(runs.iter().map(|r| r.text.as_str()).collect())
        }
        StringItem::Rich(runs) => CellValue::RichText(runs),
        StringItem::Opaque => CellValue::Opaque,
    }
}
