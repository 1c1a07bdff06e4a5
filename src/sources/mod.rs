// =============================================================================
// Upstream Data Sources
// =============================================================================
//
// HTTP clients for the two providers the dashboard depends on: Alpha Vantage
// for quotes, time series, and company fundamentals, and NewsAPI for
// headlines. Both clients surface failures as errors; degrading to empty
// panels is the API layer's call, not theirs.
// =============================================================================

pub mod alpha_vantage;
pub mod news;
