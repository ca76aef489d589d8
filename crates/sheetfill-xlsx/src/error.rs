//! Error types for XLSX operations

use thiserror::Error;

/// Errors that can occur while loading, rewriting or serializing a workbook
#[derive(Error, Debug)]
pub enum XlsxError {
    /// Error reading or writing the ZIP container
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error reading or writing files
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing XML content
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Required part not found in the container
    #[error("Required part not found: {0}")]
    MissingPart(String),

    /// Invalid workbook structure
    #[error("Invalid workbook structure: {0}")]
    InvalidStructure(String),
}

/// Result type for XLSX operations
pub type Result<T> = std::result::Result<T, XlsxError>;
