//! Replacement policy
//!
//! Controls what substitution does with unresolved placeholders and how
//! resolved values are turned into text.

use std::fmt;

use serde_json::Value;

/// Callback stringifying a resolved value.
pub type StringifyFn = Box<dyn Fn(&Value) -> String + Send + Sync>;

/// Callback invoked with the raw trimmed expression of an unresolved
/// placeholder.
pub type MissingFn = Box<dyn Fn(&str) -> String + Send + Sync>;

/// Behavior when a placeholder path cannot be resolved.
#[derive(Default)]
pub enum OnMissing {
    /// Replace the token with an empty string.
    #[default]
    Empty,
    /// Leave the literal `{{expr}}` token in place.
    Keep,
    /// Ask a callback for the replacement text.
    Custom(MissingFn),
}

impl fmt::Debug for OnMissing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OnMissing::Empty => f.write_str("Empty"),
            OnMissing::Keep => f.write_str("Keep"),
            OnMissing::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// Substitution configuration.
///
/// # Example
///
/// ```
/// use sheetfill_core::{OnMissing, ReplacePolicy};
///
/// let policy = ReplacePolicy::new().on_missing(OnMissing::Keep);
/// ```
#[derive(Default)]
pub struct ReplacePolicy {
    on_missing: OnMissing,
    value_to_string: Option<StringifyFn>,
}

impl ReplacePolicy {
    /// Policy with defaults: missing placeholders become empty strings,
    /// values stringify via [`default_to_string`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the missing-placeholder behavior.
    pub fn on_missing(mut self, on_missing: OnMissing) -> Self {
        self.on_missing = on_missing;
        self
    }

    /// Override stringification of resolved values.
    pub fn value_to_string(mut self, f: StringifyFn) -> Self {
        self.value_to_string = Some(f);
        self
    }

    /// Stringify a resolved value according to this policy.
    pub fn stringify(&self, value: &Value) -> String {
        match &self.value_to_string {
            Some(f) => f(value),
            None => default_to_string(value),
        }
    }

    /// Replacement text for an unresolved placeholder.
    ///
    /// `expression` is the raw trimmed path text, `literal` the full
    /// `{{ … }}` token as it appeared in the input.
    pub fn missing_text(&self, expression: &str, literal: &str) -> String {
        match &self.on_missing {
            OnMissing::Empty => String::new(),
            OnMissing::Keep => literal.to_string(),
            OnMissing::Custom(f) => f(expression),
        }
    }
}

impl fmt::Debug for ReplacePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplacePolicy")
            .field("on_missing", &self.on_missing)
            .field(
                "value_to_string",
                &self.value_to_string.as_ref().map(|_| "custom"),
            )
            .finish()
    }
}

/// Default stringification of resolved values.
///
/// Strings pass through verbatim, objects and arrays render as their JSON
/// text, numbers and booleans via their native display form. Null renders
/// empty (substitution treats it as missing before this is ever reached).
pub fn default_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_to_string_scalars() {
        assert_eq!(default_to_string(&json!("x")), "x");
        assert_eq!(default_to_string(&json!(199.99)), "199.99");
        assert_eq!(default_to_string(&json!(42)), "42");
        assert_eq!(default_to_string(&json!(true)), "true");
    }

    #[test]
    fn test_default_to_string_compound_renders_json() {
        assert_eq!(default_to_string(&json!({"a": 1})), r#"{"a":1}"#);
        assert_eq!(default_to_string(&json!([1, 2])), "[1,2]");
    }

    #[test]
    fn test_missing_text_policies() {
        let empty = ReplacePolicy::new();
        assert_eq!(empty.missing_text("a.b", "{{a.b}}"), "");

        let keep = ReplacePolicy::new().on_missing(OnMissing::Keep);
        assert_eq!(keep.missing_text("a.b", "{{a.b}}"), "{{a.b}}");

        let custom = ReplacePolicy::new()
            .on_missing(OnMissing::Custom(Box::new(|expr| format!("<{expr}>"))));
        assert_eq!(custom.missing_text("a.b", "{{a.b}}"), "<a.b>");
    }

    #[test]
    fn test_custom_stringify() {
        let policy =
            ReplacePolicy::new().value_to_string(Box::new(|v| format!("[{}]", default_to_string(v))));
        assert_eq!(policy.stringify(&json!(1)), "[1]");
    }
}
