//! sheetfill-pdf - DOCX to PDF conversion
//!
//! Pure orchestration of two interchangeable external engines:
//!
//! 1. **LibreOffice** - `soffice --headless --convert-to pdf`, highest
//!    fidelity, used whenever the binary is discoverable
//! 2. **Chromium** - the DOCX body is converted to HTML in-process and
//!    printed by a headless browser
//!
//! # Example
//!
//! ```no_run
//! use sheetfill_pdf::{docx_to_pdf, Engine};
//!
//! let docx = std::fs::read("report.docx")?;
//! let pdf = docx_to_pdf(&docx, Engine::Auto)?;
//! std::fs::write("report.pdf", pdf)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod engine;
mod error;
mod html;

pub use engine::{find_chromium, find_soffice, Engine, ENGINE_ENV_VAR};
pub use error::{PdfError, Result};
pub use html::{docx_to_html, wrap_page};

/// MIME type of converted documents.
pub const PDF_MIME: &str = "application/pdf";

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Convert a DOCX document to PDF.
///
/// `Engine::Auto` prefers LibreOffice and falls back to the Chromium
/// pipeline; the named engines error when their binary is not installed.
/// Input that is not a DOCX container fails before any engine runs.
pub fn docx_to_pdf(docx: &[u8], engine: Engine) -> Result<Vec<u8>> {
    // both backends need a well-formed container; the HTML conversion also
    // serves as the fail-fast validation for the LibreOffice path
    let body_html = docx_to_html(docx)?;

    match engine {
        Engine::Auto => {
            if let Some(soffice) = find_soffice() {
                return engine::convert_with_libreoffice(docx, &soffice);
            }
            print_html(&body_html)
        }
        Engine::LibreOffice => {
            let soffice = find_soffice().ok_or_else(|| {
                PdfError::EngineUnavailable(
                    "LibreOffice (soffice) not found on PATH".to_string(),
                )
            })?;
            engine::convert_with_libreoffice(docx, &soffice)
        }
        Engine::Chromium => print_html(&body_html),
    }
}

fn print_html(body_html: &str) -> Result<Vec<u8>> {
    let chromium = find_chromium().ok_or_else(|| {
        PdfError::EngineUnavailable("no Chromium or Chrome binary found on PATH".to_string())
    })?;
    engine::print_with_chromium(&wrap_page(body_html), &chromium)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_input_fails_before_any_engine() {
        let err = docx_to_pdf(b"not a docx", Engine::Auto).unwrap_err();
        assert!(matches!(err, PdfError::Archive(_)));
    }
}
