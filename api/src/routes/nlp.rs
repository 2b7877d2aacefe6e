//! wNLP token routes

use std::sync::Arc;

use analytics_store::entity::series::{HolderRow, TransferVolumeRow, TvlRow};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Serialize;

use super::{bd_to_f64, respond, DaysParams};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct TvlItem {
    pub date: String,
    pub daily_change: f64,
    pub tvl: f64,
}

impl From<&TvlRow> for TvlItem {
    fn from(r: &TvlRow) -> Self {
        Self {
            date: r.date.to_string(),
            daily_change: bd_to_f64(&r.daily_change),
            tvl: bd_to_f64(&r.tvl),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TransferVolumeItem {
    pub date: String,
    pub volume: f64,
    pub num_transfers: u64,
}

impl From<&TransferVolumeRow> for TransferVolumeItem {
    fn from(r: &TransferVolumeRow) -> Self {
        Self {
            date: r.date.to_string(),
            volume: bd_to_f64(&r.volume),
            num_transfers: r.num_transfers,
        }
    }
}

/// Holder response item
#[derive(Debug, Serialize)]
pub struct HolderItem {
    pub holder: String,
    pub balance: f64,
    pub pct_supply: f64,
}

impl From<&HolderRow> for HolderItem {
    fn from(r: &HolderRow) -> Self {
        Self {
            holder: r.holder.to_string(),
            balance: bd_to_f64(&r.balance),
            pct_supply: bd_to_f64(&r.pct_supply),
        }
    }
}

/// GET /api/nlp/tvl
/// Running mint-minus-burn balance per day
pub async fn get_tvl(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DaysParams>,
) -> impl IntoResponse {
    let days = state.service.settings().lookback_days(params.days);

    respond(state.service.nlp_tvl(days).await, |rows| {
        rows.iter().map(TvlItem::from).collect::<Vec<_>>()
    })
}

/// GET /api/nlp/volume
pub async fn get_volume(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DaysParams>,
) -> impl IntoResponse {
    let days = state.service.settings().lookback_days(params.days);

    respond(state.service.daily_nlp_volume(days).await, |rows| {
        rows.iter().map(TransferVolumeItem::from).collect::<Vec<_>>()
    })
}

/// GET /api/nlp/holders
///
/// Balances are only as complete as the window, so this route looks back as
/// far as allowed unless told otherwise.
pub async fn get_holders(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DaysParams>,
) -> impl IntoResponse {
    let settings = state.service.settings();
    let days = settings.lookback_days(params.days.or(Some(settings.max_days)));

    respond(state.service.top_holders(days).await, |rows| {
        rows.iter().map(HolderItem::from).collect::<Vec<_>>()
    })
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use alloy::primitives::address;
    use bigdecimal::BigDecimal;

    use super::*;

    #[test]
    fn test_holder_item_formats_address() {
        let row = HolderRow {
            holder: address!("00000000000000000000000000000000000000aa"),
            balance: BigDecimal::from_str("1234.5").unwrap(),
            pct_supply: BigDecimal::from_str("61.73").unwrap(),
        };

        let item = HolderItem::from(&row);

        assert_eq!(item.holder.to_lowercase(), "0x00000000000000000000000000000000000000aa");
        assert_eq!(item.balance, 1234.5);
        assert_eq!(item.pct_supply, 61.73);
    }
}
