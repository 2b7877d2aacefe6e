//! RedeemRewards(address indexed user, uint256[] rewardsOut)
//!
//! Only the claimant is kept; reward amounts are a dynamic array and are
//! not reported.

use analytics_store::{
    entity::{LogEntry, RewardClaim},
    Market,
};
use chrono::{DateTime, Utc};

use crate::decoder::decode_address;

pub fn decode(log: &LogEntry, market: &Market, timestamp: DateTime<Utc>) -> RewardClaim {
    RewardClaim {
        timestamp,
        block: log.block_number,
        tx_hash: log.tx_hash,
        market: market.label.clone(),
        user: decode_address(log.topic(1)),
    }
}
