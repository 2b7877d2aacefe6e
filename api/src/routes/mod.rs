//! API route definitions
//!
//! Every data route answers `{ "data": ..., "warnings": [...] }`. A source
//! that failed shows up as a warning next to whatever data could still be
//! produced; the request itself does not fail.

pub mod all_time;
pub mod external;
pub mod nlp;
pub mod pendle;
pub mod refresh;
pub mod users;

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Json, Router,
};
use bigdecimal::BigDecimal;
use processor::Fetched;
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Response envelope
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
    pub warnings: Vec<String>,
}

/// Build the envelope from a fetch outcome, converting its data with `f`
pub fn respond<U, T: Serialize>(fetched: Fetched<U>, f: impl FnOnce(U) -> T) -> Json<ApiResponse<T>> {
    let warnings = fetched.warnings();
    for warning in &warnings {
        tracing::warn!("Serving degraded data: {warning}");
    }

    Json(ApiResponse {
        data: f(fetched.data),
        warnings,
    })
}

/// Helper to convert BigDecimal to f64
pub fn bd_to_f64(bd: &BigDecimal) -> f64 {
    bd.to_string().parse().unwrap_or(0.0)
}

/// Lookback for windowed routes; clamped to `1..=MAX_DAYS`
#[derive(Debug, Default, Deserialize)]
pub struct DaysParams {
    pub days: Option<u32>,
}

/// Create all API routes
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new()
        // Headline figures
        .route("/kpis", get(pendle::get_kpis))
        // Pendle routes
        .route("/pendle/flows", get(pendle::get_flows))
        .route("/pendle/volume", get(pendle::get_volume))
        .route("/pendle/markets", get(pendle::get_markets))
        .route("/pendle/swaps", get(pendle::get_swaps))
        .route("/pendle/lp", get(pendle::get_lp_events))
        .route("/pendle/rewards", get(pendle::get_rewards))
        // nLP routes
        .route("/nlp/tvl", get(nlp::get_tvl))
        .route("/nlp/volume", get(nlp::get_volume))
        .route("/nlp/holders", get(nlp::get_holders))
        .route("/users", get(users::get_user_stats))
        .route("/all-time", get(all_time::get_all_time))
        // Third-party sources
        .route("/yields", get(external::get_yields))
        .route("/candles", get(external::get_candles))
        .route("/testnet", get(external::get_testnet))
        .route("/refresh", post(refresh::post_refresh))
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use processor::FetchIssue;

    use super::*;

    #[test]
    fn test_bd_to_f64() {
        assert_eq!(bd_to_f64(&BigDecimal::from_str("12.345").unwrap()), 12.345);
        assert_eq!(bd_to_f64(&BigDecimal::from(0)), 0.0);
    }

    #[test]
    fn test_envelope_carries_warnings() {
        let fetched = Fetched::degraded(
            vec![1u64, 2],
            vec![FetchIssue::HeadUnavailable {
                source: "wNLP transfers".to_string(),
            }],
        );

        let Json(body) = respond(fetched, |rows| rows.len());
        let encoded = serde_json::to_value(&body).unwrap();

        assert_eq!(encoded["data"], 2);
        assert_eq!(
            encoded["warnings"][0],
            "wNLP transfers: block height unavailable, no data fetched"
        );
    }
}
