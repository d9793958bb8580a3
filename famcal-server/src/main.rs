mod routes;
mod state;

use anyhow::Result;
use famcal_core::config::FamcalConfig;
use std::net::SocketAddr;
use tracing_subscriber::EnvFilter;

use crate::state::AppState;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let json = std::env::var("FAMCAL_LOG_JSON")
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let config = FamcalConfig::load()?;
    let state = AppState::new(&config)?;
    let app = routes::app(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], config.server_port));
    tracing::info!(%addr, events_file = %config.events_path().display(), "famcal-server listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
