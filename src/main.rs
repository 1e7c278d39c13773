use axum::extract::FromRef;
use config::{Environment, File};
use std::{env, str::FromStr, sync::Arc};
use tracing::{error, info, level_filters::LevelFilter};
use tracing_subscriber::{Layer, layer::SubscriberExt};

use crate::llm::{BillExtractor, openai::OpenAiClient};

mod llm;
mod web;

#[derive(Clone, Debug, serde::Deserialize)]
pub struct Config {
    pub address: std::net::SocketAddr,
    pub log_level: String,
    pub allowed_origins: Vec<String>,
    pub max_upload_bytes: usize,
    pub openai: OpenAiConfig,
}

#[derive(Clone, serde::Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

// keep the credential out of logs
impl std::fmt::Debug for OpenAiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl Config {
    pub fn new() -> Self {
        let s = config::Config::builder()
            .add_source(File::with_name(&format!(
                "{}/config/config.toml",
                env!("CARGO_MANIFEST_DIR")
            )))
            .add_source(Environment::with_prefix("BILLSCAN").separator("__"))
            .set_override_option("openai.api_key", env::var("OPENAI_API_KEY").ok())
            .expect("failed to set api key override")
            .build()
            .expect("failed to build config");

        s.try_deserialize().expect("failed to parse config")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, FromRef)]
pub struct Ctx {
    pub extractor: Arc<dyn BillExtractor>,
}

impl Ctx {
    pub fn new(cfg: &Config) -> Result<Self, anyhow::Error> {
        let client = OpenAiClient::new(&cfg.openai)?;
        Ok(Self {
            extractor: Arc::new(client),
        })
    }
}

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    dotenvy::dotenv().ok();
    let cfg = Config::new();

    tracing_log::LogTracer::init().expect("LogTracer init");
    let level_filter = LevelFilter::from_str(&cfg.log_level).expect("log level");
    let stdout_log = tracing_subscriber::fmt::layer().with_filter(level_filter);
    let subscriber = tracing_subscriber::registry().with(stdout_log);
    tracing::subscriber::set_global_default(subscriber)
        .expect("tracing::subscriber::set_global_default");

    if let Ok(listener) = tokio::net::TcpListener::bind(&cfg.address).await {
        info!(
            "Server running at http://{} with model={} and log-level={}",
            cfg.address, cfg.openai.model, cfg.log_level
        );
        let ctx = Ctx::new(&cfg)?;
        let router = web::router(ctx, &cfg);
        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_handler())
            .await?;
    } else {
        error!("Failed to bind to listen address {}", &cfg.address);
    }

    Ok(())
}

async fn shutdown_handler() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("to install ctrl_c handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
