//! # sheetfill-xlsx
//!
//! XLSX template merging for sheetfill.
//!
//! This crate provides functionality to:
//! - Load and re-serialize XLSX workbook containers
//! - Classify cell values (plain, rich text, hyperlinked, opaque)
//! - Merge a JSON data context into `{{ placeholder }}` tokens across all
//!   worksheets, preserving styling and everything it does not recognize
//!
//! ## Example
//!
//! ```no_run
//! use serde_json::json;
//! use sheetfill_core::{OnMissing, ReplacePolicy};
//! use sheetfill_xlsx::merge_template;
//!
//! let template = std::fs::read("invoice.xlsx")?;
//! let policy = ReplacePolicy::new().on_missing(OnMissing::Keep);
//! let merged = merge_template(&template, &json!({"customer": "ACME"}), &policy)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod archive;
pub mod cell;
pub mod error;
pub mod merge;
pub mod shared;
pub mod sheet;

pub use archive::XlsxArchive;
pub use cell::CellValue;
pub use error::{Result, XlsxError};
pub use merge::{merge_template, XLSX_MIME};
pub use shared::{RichRun, SharedStrings, StringItem};
pub use sheet::rewrite_sheet;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
