use alloy::primitives::{Address, B256};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Pendle market Swap
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapEvent {
    pub timestamp: DateTime<Utc>,
    pub block: u64,
    pub tx_hash: B256,
    /// Market label the emitting contract maps to
    pub market: String,
    pub caller: Address,
    pub receiver: Address,
    pub net_pt_out: BigDecimal,
    pub net_sy_out: BigDecimal,
    pub fee: BigDecimal,
    /// |net_sy_out|
    pub volume: BigDecimal,
}

impl SwapEvent {
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}
