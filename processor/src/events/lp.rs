//! Pendle market liquidity events
//!
//! Mint(address indexed receiver, uint256 netLpMinted, ...)
//! Burn(address indexed receiverSy, address indexed receiverPt, uint256 netLpBurned, ...)
//!
//! Both carry the user in topics[1] and the LP amount in word 0.

use analytics_store::{
    entity::{LogEntry, LpAction, LpEvent},
    Market,
};
use chrono::{DateTime, Utc};

use crate::decoder::{decode_address, decode_uint, scale_amount};

pub fn decode(
    log: &LogEntry,
    market: &Market,
    action: LpAction,
    timestamp: DateTime<Utc>,
) -> LpEvent {
    LpEvent {
        timestamp,
        block: log.block_number,
        tx_hash: log.tx_hash,
        market: market.label.clone(),
        user: decode_address(log.topic(1)),
        lp_amount: scale_amount(decode_uint(&log.data, 0), market.decimals),
        action,
    }
}
