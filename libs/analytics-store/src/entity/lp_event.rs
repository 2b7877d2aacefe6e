use alloy::primitives::{Address, B256};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LpAction {
    Mint,
    Burn,
}

impl LpAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LpAction::Mint => "mint",
            LpAction::Burn => "burn",
        }
    }
}

/// Liquidity added to or removed from a Pendle market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LpEvent {
    pub timestamp: DateTime<Utc>,
    pub block: u64,
    pub tx_hash: B256,
    pub market: String,
    pub user: Address,
    pub lp_amount: BigDecimal,
    pub action: LpAction,
}

impl LpEvent {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}
