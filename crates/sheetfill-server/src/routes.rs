//! Route handlers
//!
//! The handlers map engine failures to user-visible status codes; the
//! engines themselves never format responses. Client mistakes (bad JSON,
//! missing upload, unknown engine) are 400s with a short message, anything
//! else is a generic 500.

use axum::extract::{DefaultBodyLimit, Multipart, Query};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use serde_json::Value;

use sheetfill_core::ReplacePolicy;
use sheetfill_pdf::{docx_to_pdf, Engine, PDF_MIME};
use sheetfill_xlsx::{merge_template, XLSX_MIME};

/// Uploaded workbooks routinely exceed the 2 MiB default body limit.
const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Build the service router.
pub fn router() -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/export", post(export))
        .route("/word-to-pdf", post(word_to_pdf))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
}

async fn health() -> &'static str {
    "ok"
}

async fn export(mut form: Multipart) -> Response {
    let mut template: Option<Vec<u8>> = None;
    let mut json_text: Option<String> = None;

    while let Ok(Some(field)) = form.next_field().await {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("template") => template = field.bytes().await.ok().map(|b| b.to_vec()),
            Some("json") => json_text = field.text().await.ok(),
            _ => {}
        }
    }

    let data: Value = match json_text {
        Some(text) if !text.trim().is_empty() => match serde_json::from_str(&text) {
            Ok(value) => value,
            Err(_) => return (StatusCode::BAD_REQUEST, "Invalid JSON").into_response(),
        },
        _ => Value::Object(Default::default()),
    };
    let Some(template) = template else {
        return (StatusCode::BAD_REQUEST, "Missing template file").into_response();
    };

    match merge_template(&template, &data, &ReplacePolicy::new()) {
        Ok(workbook) => attachment(XLSX_MIME, "export.xlsx", workbook),
        Err(err) => {
            tracing::error!("export failed: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Failed to export Excel").into_response()
        }
    }
}

#[derive(Debug, Deserialize)]
struct PdfQuery {
    engine: Option<String>,
}

async fn word_to_pdf(Query(query): Query<PdfQuery>, mut form: Multipart) -> Response {
    let mut docx: Option<Vec<u8>> = None;

    while let Ok(Some(field)) = form.next_field().await {
        let name = field.name().map(str::to_string);
        if name.as_deref() == Some("docx") {
            docx = field.bytes().await.ok().map(|b| b.to_vec());
        }
    }

    let Some(docx) = docx else {
        return (StatusCode::BAD_REQUEST, "Missing DOCX file").into_response();
    };
    let engine = match Engine::resolve(query.engine.as_deref()) {
        Ok(engine) => engine,
        Err(err) => return (StatusCode::BAD_REQUEST, err.to_string()).into_response(),
    };

    // external engines block on process IO
    let converted = tokio::task::spawn_blocking(move || docx_to_pdf(&docx, engine)).await;
    match converted {
        Ok(Ok(pdf)) => attachment(PDF_MIME, "export.pdf", pdf),
        Ok(Err(err)) => {
            tracing::error!("word-to-pdf failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to convert Word to PDF",
            )
                .into_response()
        }
        Err(err) => {
            tracing::error!("word-to-pdf worker panicked: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to convert Word to PDF",
            )
                .into_response()
        }
    }
}

fn attachment(mime: &str, filename: &str, bytes: Vec<u8>) -> Response {
    (
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}
