// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`. Upstream failures degrade instead of
// erroring: a dead quote provider yields `quote: null`, a dead news provider
// an empty array, so the dashboard keeps rendering whatever panels still have
// data. Only watchlist persistence failures surface as HTTP errors.
//
// CORS is configured permissively for development; tighten `allowed_origins`
// in production.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
    Router,
};
use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::warn;

use crate::app_state::AppState;
use crate::indicators::macd::{calculate_macd, MacdPoint};
use crate::indicators::rsi::{calculate_rsi, RsiPoint};
use crate::indicators::sma::calculate_sma;
use crate::series::{ChartRange, Series};
use crate::types::{CompanyOverview, Interval, Quote};

/// Moving-average windows drawn on the price chart.
const CHART_MA_SHORT: usize = 20;
const CHART_MA_LONG: usize = 50;
/// RSI lookback.
const RSI_PERIODS: usize = 14;
/// MACD short / long / signal periods.
const MACD_SHORT: usize = 12;
const MACD_LONG: usize = 26;
const MACD_SIGNAL: usize = 9;

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // ── Health ──────────────────────────────────────────────────
        .route("/api/v1/health", get(health))
        // ── Market data ─────────────────────────────────────────────
        .route("/api/v1/quote/:symbol", get(stock_card))
        .route("/api/v1/chart/:symbol", get(chart))
        .route("/api/v1/indicators/:symbol", get(indicators))
        .route("/api/v1/news/:symbol", get(news))
        // ── Watchlist ───────────────────────────────────────────────
        .route("/api/v1/watchlist", get(watchlist_symbols))
        .route("/api/v1/watchlist", post(watchlist_add))
        .route("/api/v1/watchlist/cards", get(watchlist_cards))
        .route("/api/v1/watchlist/:symbol", delete(watchlist_remove))
        // ── Middleware & State ───────────────────────────────────────
        .layer(cors)
        .with_state(state)
}

/// Collapse an upstream failure into `None`, logging it. The dashboard
/// renders a missing panel rather than losing the whole view.
fn degrade<T>(symbol: &str, what: &str, result: anyhow::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(symbol, what, error = %e, "upstream fetch failed; degrading");
            None
        }
    }
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    server_time: i64,
    uptime_secs: u64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok",
        server_time: Utc::now().timestamp_millis(),
        uptime_secs: state.uptime_secs(),
    })
}

// =============================================================================
// Stock card: quote + company overview
// =============================================================================

#[derive(Serialize)]
struct StockCardResponse {
    symbol: String,
    quote: Option<Quote>,
    overview: Option<CompanyOverview>,
}

/// The two fetches run concurrently and degrade independently; a symbol with
/// a live quote but no fundamentals still yields a usable card.
async fn stock_card(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    let symbol = symbol.trim().to_uppercase();

    let (quote, overview) = tokio::join!(
        state.market.fetch_quote(&symbol),
        state.market.fetch_overview(&symbol),
    );

    Json(StockCardResponse {
        quote: degrade(&symbol, "quote", quote),
        overview: degrade(&symbol, "overview", overview),
        symbol,
    })
}

// =============================================================================
// Price chart: windowed series + chart moving averages
// =============================================================================

#[derive(Debug, Deserialize)]
struct ChartQuery {
    #[serde(default)]
    range: ChartRange,
}

#[derive(Serialize)]
struct ChartPoint {
    date: DateTime<Utc>,
    price: f64,
    open: Option<f64>,
    high: Option<f64>,
    low: Option<f64>,
    close: Option<f64>,
    volume: Option<u64>,
    ma20: Option<f64>,
    ma50: Option<f64>,
}

#[derive(Serialize)]
struct ChartResponse {
    symbol: String,
    range: ChartRange,
    points: Vec<ChartPoint>,
}

/// The moving averages are computed over the *clipped* window, matching the
/// chart display: zooming into 1W recomputes MA20 from the visible points.
async fn chart(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
    Query(query): Query<ChartQuery>,
) -> impl IntoResponse {
    let symbol = symbol.trim().to_uppercase();

    let interval = match query.range {
        ChartRange::Day => Interval::Intraday,
        _ => Interval::Daily,
    };

    let series = degrade(
        &symbol,
        "time series",
        state.market.fetch_time_series(&symbol, interval).await,
    )
    .unwrap_or_else(Series::empty);

    let clipped = series.clipped(query.range, Utc::now());

    let ma_short = calculate_sma(&clipped, CHART_MA_SHORT).unwrap_or_default();
    let ma_long = calculate_sma(&clipped, CHART_MA_LONG).unwrap_or_default();

    let points = clipped
        .points()
        .iter()
        .enumerate()
        .map(|(i, p)| ChartPoint {
            date: p.date,
            price: p.price,
            open: p.open,
            high: p.high,
            low: p.low,
            close: p.close,
            volume: p.volume,
            ma20: ma_short.get(i).and_then(|ip| ip.value),
            ma50: ma_long.get(i).and_then(|ip| ip.value),
        })
        .collect();

    Json(ChartResponse {
        symbol,
        range: query.range,
        points,
    })
}

// =============================================================================
// Technical indicators: RSI(14) + MACD(12,26,9)
// =============================================================================

#[derive(Serialize)]
struct IndicatorsResponse {
    symbol: String,
    rsi: Vec<RsiPoint>,
    macd: Vec<MacdPoint>,
}

/// Indicators always run over the full daily history, not a chart window;
/// a short history simply yields empty arrays.
async fn indicators(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    let symbol = symbol.trim().to_uppercase();

    let series = degrade(
        &symbol,
        "time series",
        state
            .market
            .fetch_time_series(&symbol, Interval::Daily)
            .await,
    )
    .unwrap_or_else(Series::empty);

    let rsi = calculate_rsi(&series, RSI_PERIODS).unwrap_or_default();
    let macd = calculate_macd(&series, MACD_SHORT, MACD_LONG, MACD_SIGNAL).unwrap_or_default();

    Json(IndicatorsResponse { symbol, rsi, macd })
}

// =============================================================================
// News
// =============================================================================

async fn news(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> impl IntoResponse {
    let symbol = symbol.trim().to_uppercase();

    let items = degrade(&symbol, "news", state.news.fetch_news(&symbol).await).unwrap_or_default();
    Json(items)
}

// =============================================================================
// Watchlist
// =============================================================================

async fn watchlist_symbols(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.watchlist.symbols())
}

#[derive(Deserialize)]
struct WatchlistAddRequest {
    symbol: String,
}

#[derive(Serialize)]
struct WatchlistAddResponse {
    added: bool,
    symbols: Vec<String>,
}

/// `added: false` means the symbol was already tracked; that is a no-op, not
/// an error, matching the add form's behavior.
async fn watchlist_add(
    State(state): State<Arc<AppState>>,
    Json(req): Json<WatchlistAddRequest>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    if req.symbol.trim().is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({ "error": "symbol must not be empty" })),
        ));
    }

    match state.watchlist.add(&req.symbol) {
        Ok(added) => Ok(Json(WatchlistAddResponse {
            added,
            symbols: state.watchlist.symbols(),
        })),
        Err(e) => {
            warn!(error = %e, "watchlist add failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": format!("{e}") })),
            ))
        }
    }
}

#[derive(Serialize)]
struct WatchlistRemoveResponse {
    removed: bool,
    symbols: Vec<String>,
}

async fn watchlist_remove(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, Json<serde_json::Value>)> {
    match state.watchlist.remove(&symbol) {
        Ok(removed) => Ok(Json(WatchlistRemoveResponse {
            removed,
            symbols: state.watchlist.symbols(),
        })),
        Err(e) => {
            warn!(error = %e, "watchlist remove failed");
            Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": format!("{e}") })),
            ))
        }
    }
}

#[derive(Serialize)]
struct WatchlistCard {
    symbol: String,
    quote: Option<Quote>,
    overview: Option<CompanyOverview>,
}

/// One card per tracked symbol, all fetched concurrently. Each card degrades
/// on its own; one dead symbol never blanks the others.
async fn watchlist_cards(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let symbols = state.watchlist.symbols();

    let fetches = symbols.into_iter().map(|symbol| {
        let market = state.market.clone();
        async move {
            let (quote, overview) = tokio::join!(
                market.fetch_quote(&symbol),
                market.fetch_overview(&symbol),
            );
            WatchlistCard {
                quote: degrade(&symbol, "quote", quote),
                overview: degrade(&symbol, "overview", overview),
                symbol,
            }
        }
    });

    let cards: Vec<WatchlistCard> = join_all(fetches).await;
    Json(cards)
}
