use std::{collections::BTreeMap, sync::Arc};

use analytics_store::entity::ContractTotals;
use axum::{extract::State, response::IntoResponse};
use serde::Serialize;

use super::{bd_to_f64, respond};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct ContractTotalsItem {
    pub deposits: f64,
    pub withdrawals: f64,
    pub volume: f64,
    pub transfer_count: u64,
    pub unique_users: usize,
    pub last_scanned_block: Option<u64>,
}

impl From<&ContractTotals> for ContractTotalsItem {
    fn from(t: &ContractTotals) -> Self {
        Self {
            deposits: bd_to_f64(&t.deposits),
            withdrawals: bd_to_f64(&t.withdrawals),
            volume: bd_to_f64(&t.volume),
            transfer_count: t.transfer_count,
            unique_users: t.unique_users,
            last_scanned_block: t.last_scanned_block,
        }
    }
}

/// All-time response; the per-contract user sets stay on the server
#[derive(Debug, Serialize)]
pub struct AllTimeResponse {
    pub contracts: BTreeMap<String, ContractTotalsItem>,
    pub total_unique_users: usize,
    pub timestamp: Option<String>,
}

/// GET /api/all-time
pub async fn get_all_time(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    respond(state.service.all_time_totals().await, |totals| AllTimeResponse {
        contracts: totals
            .contracts
            .iter()
            .map(|(name, totals)| (name.clone(), ContractTotalsItem::from(totals)))
            .collect(),
        total_unique_users: totals.total_unique_users,
        timestamp: totals.timestamp.map(|ts| ts.to_rfc3339()),
    })
}
