//! CLI Application logic
//!
//! Contains the command-line interface implementation.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value;

use sheetfill_core::{OnMissing, ReplacePolicy};
use sheetfill_pdf::{docx_to_pdf, Engine};
use sheetfill_xlsx::merge_template;

/// Behavior for unresolved placeholders
#[derive(Debug, Clone, Copy, Default, ValueEnum)]
pub enum MissingMode {
    /// Replace unresolved placeholders with an empty string
    #[default]
    Empty,
    /// Leave the literal placeholder token in place
    Keep,
}

impl From<MissingMode> for OnMissing {
    fn from(mode: MissingMode) -> Self {
        match mode {
            MissingMode::Empty => OnMissing::Empty,
            MissingMode::Keep => OnMissing::Keep,
        }
    }
}

#[derive(Parser)]
#[command(name = "sheetfill")]
#[command(author, version, about = "Fill spreadsheet templates, convert documents", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Merge JSON data into an XLSX template
    Merge {
        /// Input XLSX template
        template: PathBuf,

        /// Output XLSX file
        #[arg(short, long, default_value = "output.xlsx")]
        output: PathBuf,

        /// JSON data to merge, inline
        #[arg(short, long)]
        data: Option<String>,

        /// JSON data to merge, from a file
        #[arg(long, conflicts_with = "data")]
        data_file: Option<PathBuf>,

        /// What to do with placeholders that resolve to nothing
        #[arg(long, value_enum, default_value = "empty")]
        on_missing: MissingMode,
    },

    /// Convert a DOCX document to PDF
    Pdf {
        /// Input DOCX file
        input: PathBuf,

        /// Output PDF file (defaults to the input name with .pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rendering engine (auto, libreoffice or chromium)
        #[arg(short, long, default_value = "auto")]
        engine: String,
    },

    /// Run the HTTP service
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value_t = 3000)]
        port: u16,
    },
}

/// Run the CLI application
///
/// This is the main entry point for the command-line interface.
/// It parses arguments and dispatches to the appropriate command.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Merge {
            template,
            output,
            data,
            data_file,
            on_missing,
        } => {
            let data = load_data(data.as_deref(), data_file.as_deref())?;
            merge_command(&template, &output, &data, on_missing)?;
        }
        Commands::Pdf {
            input,
            output,
            engine,
        } => {
            pdf_command(&input, output.as_deref(), &engine)?;
        }
        Commands::Serve { port } => {
            serve_command(port)?;
        }
    }

    Ok(())
}

/// Parse the merge data from the inline argument or a file. No data means
/// an empty context (every placeholder resolves as missing).
fn load_data(inline: Option<&str>, file: Option<&Path>) -> Result<Value> {
    let text = match (inline, file) {
        (Some(inline), _) => inline.to_string(),
        (None, Some(path)) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read data file: {}", path.display()))?,
        (None, None) => return Ok(Value::Object(Default::default())),
    };
    serde_json::from_str(&text).context("Invalid JSON data")
}

/// Execute the merge command
pub fn merge_command(
    template: &Path,
    output: &Path,
    data: &Value,
    on_missing: MissingMode,
) -> Result<()> {
    if !template.exists() {
        anyhow::bail!("Template file not found: {}", template.display());
    }

    let bytes = fs::read(template)
        .with_context(|| format!("Failed to read template: {}", template.display()))?;

    let policy = ReplacePolicy::new().on_missing(on_missing.into());
    let merged = merge_template(&bytes, data, &policy)
        .with_context(|| format!("Failed to merge template: {}", template.display()))?;

    fs::write(output, merged)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;
    println!("Wrote {}", output.display());

    Ok(())
}

/// Execute the pdf command
pub fn pdf_command(input: &Path, output: Option<&Path>, engine: &str) -> Result<()> {
    if !input.exists() {
        anyhow::bail!("Input file not found: {}", input.display());
    }

    let engine: Engine = engine.parse()?;
    let docx = fs::read(input)
        .with_context(|| format!("Failed to read input: {}", input.display()))?;

    let pdf = docx_to_pdf(&docx, engine)
        .with_context(|| format!("Failed to convert: {}", input.display()))?;

    let output = match output {
        Some(path) => path.to_path_buf(),
        None => input.with_extension("pdf"),
    };
    fs::write(&output, pdf)
        .with_context(|| format!("Failed to write output: {}", output.display()))?;
    println!("Wrote {}", output.display());

    Ok(())
}

/// Execute the serve command
pub fn serve_command(port: u16) -> Result<()> {
    sheetfill_server::init_tracing();

    let runtime = tokio::runtime::Runtime::new().context("Failed to start async runtime")?;
    runtime
        .block_on(sheetfill_server::run_server(port))
        .context("Server error")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_data_defaults_to_empty_object() {
        let data = load_data(None, None).unwrap();
        assert_eq!(data, Value::Object(Default::default()));
    }

    #[test]
    fn test_load_data_rejects_invalid_json() {
        assert!(load_data(Some("{broken"), None).is_err());
    }

    #[test]
    fn test_missing_mode_maps_to_policy() {
        assert!(matches!(OnMissing::from(MissingMode::Empty), OnMissing::Empty));
        assert!(matches!(OnMissing::from(MissingMode::Keep), OnMissing::Keep));
    }
}
