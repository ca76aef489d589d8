//! sheetfill-server - HTTP surface for document generation
//!
//! Endpoints:
//! - `POST /export` - multipart form with a `template` XLSX file and a
//!   `json` text field; responds with the merged workbook
//! - `POST /word-to-pdf` - multipart form with a `docx` file; responds with
//!   the converted PDF (`?engine=` selects the backend)
//! - `GET /health` - liveness probe

pub mod routes;

use std::net::SocketAddr;

use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

pub use routes::router;

/// Bind and serve until the process is stopped.
pub async fn run_server(port: u16) -> std::io::Result<()> {
    let app = router()
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("listening on http://{addr}");
    axum::serve(listener, app).await
}

/// Install the default tracing subscriber, honoring `RUST_LOG`.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
