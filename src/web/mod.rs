use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    routing::{get, post},
};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::warn;

use crate::{Config, Ctx};

pub mod bill;
mod error;

pub type Result<T> = std::result::Result<T, error::Error>;

pub fn router(ctx: Ctx, cfg: &Config) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins(&cfg.allowed_origins))
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(hello))
        .route("/health", get(health))
        .route("/api/llm/", post(bill::rest::extract_bill))
        .route("/api/llm", post(bill::rest::extract_bill))
        .layer(DefaultBodyLimit::max(cfg.max_upload_bytes))
        .layer(cors)
        .with_state(ctx)
}

fn allowed_origins(origins: &[String]) -> AllowOrigin {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("Ignoring invalid CORS origin {origin}: {e}");
                None
            }
        })
        .collect();
    AllowOrigin::list(parsed)
}

async fn hello() -> &'static str {
    "Hello world"
}

async fn health() -> &'static str {
    "OK"
}
