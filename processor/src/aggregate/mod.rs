//! Aggregation engine
//!
//! Pure functions from classified records to row series. None of them fail:
//! empty input yields an empty `Vec` of the right row type.

pub mod flows;
pub mod holders;
pub mod kpi;
pub mod markets;
pub mod totals;
pub mod tvl;
pub mod users;
pub mod volume;

pub use flows::daily_flows;
pub use holders::{holder_balances, top_holders};
pub use kpi::{kpi_summary, KpiInputs};
pub use markets::market_breakdown;
pub use totals::{contract_totals, fold_transfers};
pub use tvl::tvl_curve;
pub use users::{distinct_users, user_stats};
pub use volume::{daily_transfer_volume, daily_volume};

use bigdecimal::BigDecimal;

/// Round for display; applied only to final figures
pub(crate) fn round_dp(value: &BigDecimal, digits: i64) -> BigDecimal {
    value.round(digits)
}

#[cfg(test)]
pub(crate) mod fixtures {
    use std::str::FromStr;

    use alloy::primitives::{Address, B256};
    use analytics_store::entity::{DecodedTransfer, SwapEvent, TransferKind};
    use bigdecimal::BigDecimal;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    pub fn dec(raw: &str) -> BigDecimal {
        BigDecimal::from_str(raw).unwrap()
    }

    pub fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 11, d).unwrap()
    }

    pub fn at(d: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, d, hour, 0, 0).unwrap()
    }

    pub fn user(n: u8) -> Address {
        Address::with_last_byte(n)
    }

    pub fn transfer(
        d: u32,
        from: Address,
        to: Address,
        amount: &str,
        kind: TransferKind,
    ) -> DecodedTransfer {
        DecodedTransfer {
            timestamp: at(d, 12),
            block: d as u64 * 1000,
            tx_hash: B256::with_last_byte(d as u8),
            from,
            to,
            amount: dec(amount),
            kind,
        }
    }

    pub fn mint(d: u32, to: Address, amount: &str) -> DecodedTransfer {
        transfer(d, Address::ZERO, to, amount, TransferKind::Mint)
    }

    pub fn burn(d: u32, from: Address, amount: &str) -> DecodedTransfer {
        transfer(d, from, Address::ZERO, amount, TransferKind::Burn)
    }

    pub fn send(d: u32, from: Address, to: Address, amount: &str) -> DecodedTransfer {
        transfer(d, from, to, amount, TransferKind::Transfer)
    }

    pub fn swap(d: u32, market: &str, caller: Address, sy_out: &str, fee: &str) -> SwapEvent {
        let net_sy_out = dec(sy_out);
        SwapEvent {
            timestamp: at(d, 9),
            block: d as u64 * 1000 + 1,
            tx_hash: B256::with_last_byte(d as u8),
            market: market.to_string(),
            caller,
            receiver: caller,
            net_pt_out: -net_sy_out.clone(),
            volume: net_sy_out.abs(),
            net_sy_out,
            fee: dec(fee),
        }
    }
}
