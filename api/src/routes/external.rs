//! Routes backed by third-party APIs
//!
//! The adapters already return plain `f64` rows, so these pass them through.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;

use super::respond;
use crate::AppState;

mod defaults {
    pub const COIN: &str = "HYPE";
    pub const INTERVAL: &str = "1h";
    pub const DAYS: u32 = 7;
}

/// Query parameters for candles
#[derive(Debug, Deserialize)]
pub struct CandleParams {
    pub coin: Option<String>,
    pub interval: Option<String>,
    pub days: Option<u32>,
}

/// GET /api/yields
pub async fn get_yields(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    respond(state.service.market_yields().await, |rows| rows.to_vec())
}

/// GET /api/candles
/// Daily notional volume for a perp, e.g. `?coin=HYPE&interval=1h&days=7`
pub async fn get_candles(
    State(state): State<Arc<AppState>>,
    Query(params): Query<CandleParams>,
) -> impl IntoResponse {
    let coin = params.coin.as_deref().unwrap_or(defaults::COIN);
    let interval = params.interval.as_deref().unwrap_or(defaults::INTERVAL);
    let days = params.days.unwrap_or(defaults::DAYS);

    respond(
        state.service.notional_volume(coin, interval, days).await,
        |rows| rows.to_vec(),
    )
}

/// GET /api/testnet
pub async fn get_testnet(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    respond(state.service.testnet_stats().await, |rows| rows.to_vec())
}
