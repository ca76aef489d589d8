//! sheetfill HTTP server binary
//!
//! This is a thin wrapper around the library's `run_server()` function.
//! The listen port comes from the `PORT` environment variable (default
//! 3000), matching the usual deployment convention.

#[tokio::main]
async fn main() -> std::io::Result<()> {
    sheetfill_server::init_tracing();

    let port = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);

    sheetfill_server::run_server(port).await
}
