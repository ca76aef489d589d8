//! `{{ placeholder }}` substitution over plain text

use std::borrow::Cow;
use std::sync::OnceLock;

use regex::{Captures, Regex};
use serde_json::Value;

use crate::path::resolve;
use crate::policy::ReplacePolicy;

/// Opening marker of a placeholder token.
pub const PLACEHOLDER_OPEN: &str = "{{";

fn placeholder_re() -> &'static Regex {
    static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{\{\s*([^}]+?)\s*\}\}").unwrap())
}

fn single_expression_re() -> &'static Regex {
    static SINGLE_RE: OnceLock<Regex> = OnceLock::new();
    SINGLE_RE.get_or_init(|| Regex::new(r"^\{\{\s*([^}]+?)\s*\}\}$").unwrap())
}

/// Replace every `{{ path }}` token in `text` with its resolved value.
///
/// Tokens are non-greedy and may not nest; the expression body is trimmed
/// before resolution. Absent and null results go through the policy's
/// missing handling, everything else through its stringifier.
///
/// Text without an opening marker is returned borrowed, unchanged.
pub fn substitute<'a>(text: &'a str, context: &Value, policy: &ReplacePolicy) -> Cow<'a, str> {
    if !text.contains(PLACEHOLDER_OPEN) {
        return Cow::Borrowed(text);
    }
    placeholder_re().replace_all(text, |caps: &Captures| {
        let expression = caps[1].trim();
        match resolve(context, expression).filter(|v| !v.is_null()) {
            Some(value) => policy.stringify(value),
            None => policy.missing_text(expression, &caps[0]),
        }
    })
}

/// If the whole of `text` is exactly one placeholder token, return the
/// trimmed inner expression.
pub fn single_expression(text: &str) -> Option<&str> {
    single_expression_re()
        .captures(text)
        .map(|caps| caps.get(1).map(|m| m.as_str()).unwrap_or_default())
}
