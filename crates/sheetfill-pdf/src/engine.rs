//! Rendering engines
//!
//! Two interchangeable backends convert a document to PDF: LibreOffice
//! (`soffice`, higher fidelity) and a headless Chromium printing the HTML
//! rendition. Both are external processes; this module only discovers and
//! drives them through a scratch directory.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::str::FromStr;

use crate::error::{PdfError, Result};

/// Environment variable overriding the engine selection.
pub const ENGINE_ENV_VAR: &str = "WORD_TO_PDF_ENGINE";

/// Fixed install location probed on macOS when `soffice` is not on PATH.
const SOFFICE_MAC_PATH: &str = "/Applications/LibreOffice.app/Contents/MacOS/soffice";

const CHROMIUM_CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
];

/// Rendering backend selection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Engine {
    /// Prefer LibreOffice when discoverable, fall back to Chromium
    #[default]
    Auto,
    /// LibreOffice only; error when `soffice` is not installed
    LibreOffice,
    /// DOCX to HTML, printed by a headless Chromium
    Chromium,
}

impl FromStr for Engine {
    type Err = PdfError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "auto" => Ok(Engine::Auto),
            "libreoffice" | "soffice" => Ok(Engine::LibreOffice),
            "chromium" | "chrome" => Ok(Engine::Chromium),
            other => Err(PdfError::UnknownEngine(other.to_string())),
        }
    }
}

impl Engine {
    /// Resolve the engine from an explicit request, the `WORD_TO_PDF_ENGINE`
    /// environment variable, or the default.
    pub fn resolve(explicit: Option<&str>) -> Result<Self> {
        match explicit {
            Some(name) => name.parse(),
            None => match std::env::var(ENGINE_ENV_VAR) {
                Ok(name) if !name.is_empty() => name.parse(),
                _ => Ok(Engine::Auto),
            },
        }
    }
}

/// Locate a runnable `soffice` binary.
pub fn find_soffice() -> Option<PathBuf> {
    if probe("soffice") {
        return Some(PathBuf::from("soffice"));
    }
    if Path::new(SOFFICE_MAC_PATH).exists() && probe(SOFFICE_MAC_PATH) {
        return Some(PathBuf::from(SOFFICE_MAC_PATH));
    }
    None
}

/// Locate a runnable Chromium/Chrome binary.
pub fn find_chromium() -> Option<PathBuf> {
    CHROMIUM_CANDIDATES
        .iter()
        .copied()
        .find(|candidate| probe(candidate))
        .map(PathBuf::from)
}

fn probe(command: impl AsRef<OsStr>) -> bool {
    Command::new(command)
        .arg("--version")
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

/// Convert a DOCX document with LibreOffice through a scratch directory.
pub fn convert_with_libreoffice(docx: &[u8], soffice: &Path) -> Result<Vec<u8>> {
    let dir = tempfile::Builder::new().prefix("docx2pdf-").tempdir()?;
    let input = dir.path().join("input.docx");
    fs::write(&input, docx)?;

    let status = Command::new(soffice)
        .args([
            "--headless",
            "--nologo",
            "--nolockcheck",
            "--nodefault",
            "--nofirststartwizard",
            "--convert-to",
            "pdf:writer_pdf_Export",
            "--outdir",
        ])
        .arg(dir.path())
        .arg(&input)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if !status.success() {
        return Err(PdfError::Conversion(format!("soffice exited with {status}")));
    }

    let output = dir.path().join("input.pdf");
    fs::read(&output).map_err(|_| {
        PdfError::Conversion("soffice finished without producing a PDF".to_string())
    })
}

/// Print a standalone HTML page to PDF with a headless Chromium.
pub fn print_with_chromium(page_html: &str, chromium: &Path) -> Result<Vec<u8>> {
    let dir = tempfile::Builder::new().prefix("html2pdf-").tempdir()?;
    let input = dir.path().join("input.html");
    let output = dir.path().join("output.pdf");
    fs::write(&input, page_html)?;

    let status = Command::new(chromium)
        .args(["--headless", "--disable-gpu", "--no-sandbox", "--no-pdf-header-footer"])
        .arg(format!("--print-to-pdf={}", output.display()))
        .arg(&input)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()?;
    if !status.success() {
        return Err(PdfError::Conversion(format!(
            "chromium exited with {status}"
        )));
    }

    fs::read(&output).map_err(|_| {
        PdfError::Conversion("chromium finished without producing a PDF".to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_parsing() {
        assert_eq!("auto".parse::<Engine>().unwrap(), Engine::Auto);
        assert_eq!("LibreOffice".parse::<Engine>().unwrap(), Engine::LibreOffice);
        assert_eq!("chromium".parse::<Engine>().unwrap(), Engine::Chromium);
        assert!(matches!(
            "wkhtmltopdf".parse::<Engine>(),
            Err(PdfError::UnknownEngine(_))
        ));
    }

    #[test]
    fn test_explicit_resolve_beats_default() {
        assert_eq!(Engine::resolve(Some("chromium")).unwrap(), Engine::Chromium);
        assert!(Engine::resolve(Some("nope")).is_err());
    }

    #[test]
    fn test_probe_missing_binary() {
        assert!(!probe("definitely-not-a-real-binary-name"));
    }
}
