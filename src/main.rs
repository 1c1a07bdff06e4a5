// =============================================================================
// tickerdeck — Main Entry Point
// =============================================================================
//
// Boot order: environment, settings, upstream clients, watchlist, then the
// HTTP API. Provider API keys come from the environment only; an engine
// started without them still serves, with every upstream fetch degrading.
// =============================================================================

// ── Module declarations ──────────────────────────────────────────────────────
mod api;
mod app_state;
mod config;
mod indicators;
mod series;
mod sources;
mod types;
mod watchlist;

use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::app_state::AppState;
use crate::config::Settings;
use crate::sources::alpha_vantage::AlphaVantageClient;
use crate::sources::news::NewsClient;
use crate::watchlist::WatchlistStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("╔══════════════════════════════════════════════════════════╗");
    info!("║            tickerdeck — Starting Up                      ║");
    info!("╚══════════════════════════════════════════════════════════╝");

    let mut settings = Settings::load("settings.json").unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load settings, using defaults");
        Settings::default()
    });

    // Override bind address from env if available.
    if let Ok(addr) = std::env::var("TICKERDECK_BIND_ADDR") {
        settings.bind_addr = addr;
    }

    // ── 2. Upstream clients ──────────────────────────────────────────────
    let av_key = std::env::var("ALPHAVANTAGE_API_KEY").unwrap_or_default();
    if av_key.is_empty() {
        warn!("ALPHAVANTAGE_API_KEY is not set; market data fetches will fail upstream");
    }
    let news_key = std::env::var("NEWSAPI_API_KEY").unwrap_or_default();
    if news_key.is_empty() {
        warn!("NEWSAPI_API_KEY is not set; news fetches will fail upstream");
    }

    let market = AlphaVantageClient::new(av_key, settings.alpha_vantage_base_url.clone());
    let news = NewsClient::new(
        news_key,
        settings.news_base_url.clone(),
        settings.news_page_size,
    );

    // ── 3. Watchlist ─────────────────────────────────────────────────────
    let watchlist = WatchlistStore::open_file(&settings.watchlist_path)?;
    info!(
        path = %settings.watchlist_path,
        symbols = ?watchlist.symbols(),
        "Watchlist ready"
    );

    // ── 4. Build shared state ────────────────────────────────────────────
    let bind_addr = settings.bind_addr.clone();
    let state = Arc::new(AppState::new(market, news, watchlist));

    // ── 5. Start the API server ──────────────────────────────────────────
    let api_state = state.clone();

    tokio::spawn(async move {
        let app = api::rest::router(api_state);
        let listener = tokio::net::TcpListener::bind(&bind_addr)
            .await
            .expect("Failed to bind API server");
        info!(addr = %bind_addr, "API server listening");
        axum::serve(listener, app)
            .await
            .expect("API server failed");
    });

    info!("All subsystems running. Press Ctrl+C to stop.");

    // ── 6. Graceful shutdown ─────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received — stopping gracefully");

    info!("tickerdeck shut down complete.");
    Ok(())
}
