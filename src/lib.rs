pub mod backend;
pub mod config;
pub mod error;
pub mod model;
pub mod pages;
pub mod richtext;
pub mod state;
pub mod web;

use tracing_subscriber::{EnvFilter, fmt::time::ChronoLocal};

use backend::HttpBackend;
use config::Config;
use error::Result;
use state::AppState;

pub async fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_target(false)
        .with_timer(ChronoLocal::new("%Y-%m-%d %H:%M:%S%.3f".to_string()))
        .with_env_filter(EnvFilter::from_env("EPAGE_LOG"))
        .init();

    let config = Config::load()?;
    tracing::info!(backend = %config.backend_url, "using backend");

    let backend = HttpBackend::new(&config.backend_url)?;
    let app = AppState::new(backend, config.site);

    web::run_server(app, &config.listen).await
}
