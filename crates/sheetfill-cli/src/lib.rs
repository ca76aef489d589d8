//! sheetfill CLI - Command-line interface library
//!
//! This library provides the CLI functionality for sheetfill:
//! - Merge: fill an XLSX template with JSON data
//! - Pdf: convert a DOCX document to PDF
//! - Serve: run the HTTP service
//!
//! # Binary Usage
//!
//! ```bash
//! # Merge a template
//! sheetfill merge template.xlsx --output export.xlsx --data '{"name":"Stanley"}'
//!
//! # Convert a document
//! sheetfill pdf report.docx --engine libreoffice
//!
//! # Run the HTTP service
//! sheetfill serve --port 3000
//! ```

pub mod app;

// Re-export main entry point and types
pub use app::{merge_command, pdf_command, run_cli, serve_command, MissingMode};
