//! Swap event decoder
//!
//! Event signature: Swap(address indexed caller, address indexed receiver,
//! int256 netPtOut, int256 netSyOut, uint256 netSyFee, uint256 netSyToReserve)
//!
//! Data layout (each 32 bytes):
//! - word 0: netPtOut (signed)
//! - word 1: netSyOut (signed)
//! - word 2: netSyFee

use analytics_store::{
    entity::{LogEntry, SwapEvent},
    Market,
};
use chrono::{DateTime, Utc};

use crate::decoder::{decode_address, decode_signed_int, decode_uint, scale_amount, scale_signed};

pub fn decode(log: &LogEntry, market: &Market, timestamp: DateTime<Utc>) -> SwapEvent {
    let net_pt_out = scale_signed(decode_signed_int(&log.data, 0), market.decimals);
    let net_sy_out = scale_signed(decode_signed_int(&log.data, 1), market.decimals);
    let fee = scale_amount(decode_uint(&log.data, 2), market.decimals);

    SwapEvent {
        timestamp,
        block: log.block_number,
        tx_hash: log.tx_hash,
        market: market.label.clone(),
        caller: decode_address(log.topic(1)),
        receiver: decode_address(log.topic(2)),
        net_pt_out,
        volume: net_sy_out.abs(),
        net_sy_out,
        fee,
    }
}
