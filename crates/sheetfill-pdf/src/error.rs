//! Error types for PDF conversion

use thiserror::Error;

/// Result type for PDF operations
pub type Result<T> = std::result::Result<T, PdfError>;

/// Errors that can occur during DOCX to PDF conversion
#[derive(Error, Debug)]
pub enum PdfError {
    /// Input bytes are not a DOCX document
    #[error("Invalid DOCX input: {0}")]
    InvalidDocx(String),

    /// Error reading the DOCX container
    #[error("Archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// Error parsing document XML
    #[error("XML parsing error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Unknown engine name
    #[error("Unknown engine: {0} (expected auto, libreoffice or chromium)")]
    UnknownEngine(String),

    /// Requested engine is not installed
    #[error("Conversion engine not available: {0}")]
    EngineUnavailable(String),

    /// The external engine ran but did not produce a PDF
    #[error("Conversion failed: {0}")]
    Conversion(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
