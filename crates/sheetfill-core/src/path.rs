//! Accessor-path parsing and resolution
//!
//! A path expression addresses a value inside a nested JSON structure using
//! dotted and bracketed segments, e.g. `user.name` or `items[0].price`.

use serde_json::Value;

/// Parse a raw path expression into its lookup tokens.
///
/// The expression is split on `.` and `[...]` delimiters. Bracket interiors
/// become a token with one pair of matching surrounding quotes stripped, so
/// `items["first name"]` yields `items` and `first name`. Empty dot-separated
/// segments are dropped; a bracket always contributes a token, even an empty
/// one (which can never resolve).
pub fn parse_path(raw: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut buf = String::new();
    let mut chars = raw.chars();

    while let Some(ch) = chars.next() {
        match ch {
            '.' => {
                if !buf.is_empty() {
                    tokens.push(std::mem::take(&mut buf));
                }
            }
            '[' => {
                if !buf.is_empty() {
                    tokens.push(std::mem::take(&mut buf));
                }
                let mut inner = String::new();
                for c in chars.by_ref() {
                    if c == ']' {
                        break;
                    }
                    inner.push(c);
                }
                tokens.push(strip_quotes(&inner).to_string());
            }
            _ => buf.push(ch),
        }
    }
    if !buf.is_empty() {
        tokens.push(buf);
    }
    tokens
}

/// Strip one pair of matching surrounding quotes, if present.
fn strip_quotes(s: &str) -> &str {
    let bytes = s.as_bytes();
    if bytes.len() >= 2 {
        let (first, last) = (bytes[0], bytes[bytes.len() - 1]);
        if (first == b'\'' && last == b'\'') || (first == b'"' && last == b'"') {
            return &s[1..s.len() - 1];
        }
    }
    s
}

/// Resolve a path expression against a JSON context.
///
/// Walks the context token by token: objects are indexed by key, arrays by
/// numeric index. Returns `None` ("missing") when any segment is absent, an
/// array index is malformed or out of range, or the walk steps through an
/// explicit null. A final null value is returned as-is; callers that treat
/// null as missing filter it themselves.
///
/// Never fails: an empty expression or a null context simply resolves to
/// `None`.
pub fn resolve<'a>(context: &'a Value, expression: &str) -> Option<&'a Value> {
    if expression.is_empty() || context.is_null() {
        return None;
    }
    let mut current = context;
    for token in parse_path(expression) {
        current = match current {
            Value::Object(map) => map.get(&token)?,
            Value::Array(items) => items.get(token.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
