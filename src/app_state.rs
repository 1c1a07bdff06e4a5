// =============================================================================
// Central Application State — tickerdeck dashboard engine
// =============================================================================
//
// Everything the HTTP handlers need, behind a single `Arc<AppState>`: the two
// upstream clients and the watchlist store. Settings are consumed at boot;
// nothing is reconfigured at runtime. The upstream clients are cheaply
// cloneable (reqwest pools internally); the watchlist guards its own interior
// mutability.
// =============================================================================

use crate::sources::alpha_vantage::AlphaVantageClient;
use crate::sources::news::NewsClient;
use crate::watchlist::WatchlistStore;

/// Shared application state for all async tasks and handlers.
pub struct AppState {
    // ── Upstream clients ────────────────────────────────────────────────
    pub market: AlphaVantageClient,
    pub news: NewsClient,

    // ── Watchlist ───────────────────────────────────────────────────────
    pub watchlist: WatchlistStore,

    // ── Timing ──────────────────────────────────────────────────────────
    /// Instant when the engine was started. Used for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Tie the subsystems together. The returned value is typically wrapped
    /// in `Arc` immediately.
    pub fn new(market: AlphaVantageClient, news: NewsClient, watchlist: WatchlistStore) -> Self {
        Self {
            market,
            news,
            watchlist,
            start_time: std::time::Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}
