//! Pendle market routes

use std::sync::Arc;

use analytics_store::entity::{
    series::{FlowRow, KpiSummary, MarketBreakdownRow, VolumeRow},
    LpEvent, RewardClaim, SwapEvent,
};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Serialize;

use super::{bd_to_f64, respond, DaysParams};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct KpiResponse {
    pub tvl: f64,
    pub on_chain_supply: Option<f64>,
    pub volume_7d: f64,
    pub total_fees: f64,
    pub total_users: u64,
    pub pendle_deposits: f64,
    pub pendle_withdrawals: f64,
    pub pendle_volume: f64,
}

impl From<KpiSummary> for KpiResponse {
    fn from(k: KpiSummary) -> Self {
        Self {
            tvl: bd_to_f64(&k.tvl),
            on_chain_supply: k.on_chain_supply.as_ref().map(bd_to_f64),
            volume_7d: bd_to_f64(&k.volume_7d),
            total_fees: bd_to_f64(&k.total_fees),
            total_users: k.total_users,
            pendle_deposits: bd_to_f64(&k.pendle_deposits),
            pendle_withdrawals: bd_to_f64(&k.pendle_withdrawals),
            pendle_volume: bd_to_f64(&k.pendle_volume),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct FlowItem {
    pub date: String,
    pub deposits: f64,
    pub withdrawals: f64,
    pub net_flow: f64,
}

impl From<&FlowRow> for FlowItem {
    fn from(r: &FlowRow) -> Self {
        Self {
            date: r.date.to_string(),
            deposits: bd_to_f64(&r.deposits),
            withdrawals: bd_to_f64(&r.withdrawals),
            net_flow: bd_to_f64(&r.net_flow),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VolumeItem {
    pub date: String,
    pub volume: f64,
    pub fees: f64,
    pub num_swaps: u64,
    pub traders: u64,
}

impl From<&VolumeRow> for VolumeItem {
    fn from(r: &VolumeRow) -> Self {
        Self {
            date: r.date.to_string(),
            volume: bd_to_f64(&r.volume),
            fees: bd_to_f64(&r.fees),
            num_swaps: r.num_swaps,
            traders: r.traders,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MarketItem {
    pub market: String,
    pub volume: f64,
    pub fees: f64,
    pub num_swaps: u64,
    pub traders: u64,
    pub lp_minted: f64,
    pub lp_burned: f64,
}

impl From<&MarketBreakdownRow> for MarketItem {
    fn from(r: &MarketBreakdownRow) -> Self {
        Self {
            market: r.market.clone(),
            volume: bd_to_f64(&r.volume),
            fees: bd_to_f64(&r.fees),
            num_swaps: r.num_swaps,
            traders: r.traders,
            lp_minted: bd_to_f64(&r.lp_minted),
            lp_burned: bd_to_f64(&r.lp_burned),
        }
    }
}

/// Swap response item
#[derive(Debug, Serialize)]
pub struct SwapItem {
    pub timestamp: String,
    pub block: u64,
    pub tx_hash: String,
    pub market: String,
    pub caller: String,
    pub receiver: String,
    pub net_pt_out: f64,
    pub net_sy_out: f64,
    pub fee: f64,
    pub volume: f64,
}

impl From<&SwapEvent> for SwapItem {
    fn from(s: &SwapEvent) -> Self {
        Self {
            timestamp: s.timestamp.to_rfc3339(),
            block: s.block,
            tx_hash: s.tx_hash.to_string(),
            market: s.market.clone(),
            caller: s.caller.to_string(),
            receiver: s.receiver.to_string(),
            net_pt_out: bd_to_f64(&s.net_pt_out),
            net_sy_out: bd_to_f64(&s.net_sy_out),
            fee: bd_to_f64(&s.fee),
            volume: bd_to_f64(&s.volume),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct LpItem {
    pub timestamp: String,
    pub block: u64,
    pub tx_hash: String,
    pub market: String,
    pub user: String,
    pub lp_amount: f64,
    pub action: &'static str,
}

impl From<&LpEvent> for LpItem {
    fn from(e: &LpEvent) -> Self {
        Self {
            timestamp: e.timestamp.to_rfc3339(),
            block: e.block,
            tx_hash: e.tx_hash.to_string(),
            market: e.market.clone(),
            user: e.user.to_string(),
            lp_amount: bd_to_f64(&e.lp_amount),
            action: e.action.as_str(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RewardItem {
    pub timestamp: String,
    pub block: u64,
    pub tx_hash: String,
    pub market: String,
    pub user: String,
}

impl From<&RewardClaim> for RewardItem {
    fn from(c: &RewardClaim) -> Self {
        Self {
            timestamp: c.timestamp.to_rfc3339(),
            block: c.block,
            tx_hash: c.tx_hash.to_string(),
            market: c.market.clone(),
            user: c.user.to_string(),
        }
    }
}

/// GET /api/kpis
pub async fn get_kpis(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DaysParams>,
) -> impl IntoResponse {
    let days = state.service.settings().lookback_days(params.days);

    respond(state.service.kpi_summary(days).await, KpiResponse::from)
}

/// GET /api/pendle/flows
/// Daily SY deposits and withdrawals
pub async fn get_flows(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DaysParams>,
) -> impl IntoResponse {
    let days = state.service.settings().lookback_days(params.days);

    respond(state.service.daily_pendle_flows(days).await, |rows| {
        rows.iter().map(FlowItem::from).collect::<Vec<_>>()
    })
}

/// GET /api/pendle/volume
pub async fn get_volume(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DaysParams>,
) -> impl IntoResponse {
    let days = state.service.settings().lookback_days(params.days);

    respond(state.service.daily_volume(days).await, |rows| {
        rows.iter().map(VolumeItem::from).collect::<Vec<_>>()
    })
}

/// GET /api/pendle/markets
/// Per-market swap and liquidity breakdown
pub async fn get_markets(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DaysParams>,
) -> impl IntoResponse {
    let days = state.service.settings().lookback_days(params.days);

    respond(state.service.market_breakdown(days).await, |rows| {
        rows.iter().map(MarketItem::from).collect::<Vec<_>>()
    })
}

/// GET /api/pendle/swaps
pub async fn get_swaps(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DaysParams>,
) -> impl IntoResponse {
    let days = state.service.settings().lookback_days(params.days);

    respond(state.service.market_swaps(days).await, |swaps| {
        swaps.iter().map(SwapItem::from).collect::<Vec<_>>()
    })
}

/// GET /api/pendle/lp
pub async fn get_lp_events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DaysParams>,
) -> impl IntoResponse {
    let days = state.service.settings().lookback_days(params.days);

    respond(state.service.lp_events(days).await, |events| {
        events.iter().map(LpItem::from).collect::<Vec<_>>()
    })
}

/// GET /api/pendle/rewards
pub async fn get_rewards(
    State(state): State<Arc<AppState>>,
    Query(params): Query<DaysParams>,
) -> impl IntoResponse {
    let days = state.service.settings().lookback_days(params.days);

    respond(state.service.reward_claims(days).await, |claims| {
        claims.iter().map(RewardItem::from).collect::<Vec<_>>()
    })
}
