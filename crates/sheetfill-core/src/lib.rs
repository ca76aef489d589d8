//! sheetfill-core - Placeholder resolution for templated documents
//!
//! Core library for sheetfill, providing accessor-path resolution over JSON
//! data and `{{ placeholder }}` substitution with configurable policies.
//!
//! # Example
//!
//! ```
//! use serde_json::json;
//! use sheetfill_core::{substitute, ReplacePolicy};
//!
//! let data = json!({"name": "Stanley", "order": {"total": 199.99}});
//! let policy = ReplacePolicy::new();
//!
//! let out = substitute("Hello {{name}}, total {{order.total}}", &data, &policy);
//! assert_eq!(out, "Hello Stanley, total 199.99");
//! ```

pub mod path;
pub mod policy;
pub mod substitute;

// Re-export main types and functions
pub use path::{parse_path, resolve};
pub use policy::{default_to_string, MissingFn, OnMissing, ReplacePolicy, StringifyFn};
pub use substitute::{single_expression, substitute, PLACEHOLDER_OPEN};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, "0.1.0");
    }
}
