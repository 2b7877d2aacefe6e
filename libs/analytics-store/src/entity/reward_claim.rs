use alloy::primitives::{Address, B256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// RedeemRewards emitted by a Pendle market
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardClaim {
    pub timestamp: DateTime<Utc>,
    pub block: u64,
    pub tx_hash: B256,
    pub market: String,
    pub user: Address,
}
