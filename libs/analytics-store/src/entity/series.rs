//! Aggregate shapes handed to the presentation layer
//!
//! Each series is a `Vec` of rows, so an empty result still carries its
//! columns in the type.

use alloy::primitives::Address;
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily SY deposits and withdrawals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlowRow {
    pub date: NaiveDate,
    pub deposits: BigDecimal,
    pub withdrawals: BigDecimal,
    pub net_flow: BigDecimal,
}

/// Daily swap activity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VolumeRow {
    pub date: NaiveDate,
    pub volume: BigDecimal,
    pub fees: BigDecimal,
    pub num_swaps: u64,
    /// Distinct callers that day
    pub traders: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TvlRow {
    pub date: NaiveDate,
    pub daily_change: BigDecimal,
    /// Running sum of `daily_change` from the start of the window
    pub tvl: BigDecimal,
}

/// Daily plain (non mint/burn) transfer volume
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferVolumeRow {
    pub date: NaiveDate,
    pub volume: BigDecimal,
    pub num_transfers: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HolderRow {
    pub holder: Address,
    pub balance: BigDecimal,
    /// Share of the summed (post-dust) balances, 2 dp
    pub pct_supply: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRow {
    pub date: NaiveDate,
    pub daily_users: u64,
    pub nlp_users: u64,
    pub pendle_users: u64,
    /// Running sum of `daily_users`; a user active on two days counts twice
    pub cumulative_users: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketBreakdownRow {
    pub market: String,
    pub volume: BigDecimal,
    pub fees: BigDecimal,
    pub num_swaps: u64,
    pub traders: u64,
    pub lp_minted: BigDecimal,
    pub lp_burned: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KpiSummary {
    /// Window mints minus burns
    pub tvl: BigDecimal,
    /// Instantaneous `totalSupply()` when the node answered
    pub on_chain_supply: Option<BigDecimal>,
    pub volume_7d: BigDecimal,
    pub total_fees: BigDecimal,
    pub total_users: u64,
    pub pendle_deposits: BigDecimal,
    pub pendle_withdrawals: BigDecimal,
    pub pendle_volume: BigDecimal,
}

/// Yield data for one market from the yield-market API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YieldRow {
    pub market: String,
    pub address: String,
    pub expiry: Option<String>,
    pub liquidity: f64,
    pub implied_apy: f64,
    pub underlying_apy: f64,
}

/// Daily notional volume from exchange candles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotionalRow {
    pub date: NaiveDate,
    pub notional_volume: f64,
    pub num_trades: u64,
    /// Close of the last candle of the day
    pub close: f64,
}

/// One simulator's figures within a testnet season
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestnetRow {
    pub season: String,
    pub simulator: String,
    pub users: u64,
    pub volume: f64,
    pub trades: u64,
}
