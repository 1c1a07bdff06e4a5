// =============================================================================
// HTTP API Module
// =============================================================================
//
// REST endpoints serving the dashboard frontend. The engine binds locally and
// serves a single client, so there is no authentication layer.
// =============================================================================

pub mod rest;
