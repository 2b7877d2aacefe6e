use std::collections::{BTreeMap, HashSet};

use alloy::primitives::Address;
use analytics_store::entity::{
    series::{TransferVolumeRow, VolumeRow},
    DecodedTransfer, SwapEvent, TransferKind,
};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

#[derive(Default)]
struct SwapDay {
    volume: BigDecimal,
    fees: BigDecimal,
    swaps: u64,
    traders: HashSet<Address>,
}

/// Daily swap volume, fees, swap count and distinct callers
pub fn daily_volume(swaps: &[SwapEvent]) -> Vec<VolumeRow> {
    let mut days: BTreeMap<NaiveDate, SwapDay> = BTreeMap::new();

    for swap in swaps {
        let day = days.entry(swap.date()).or_default();
        day.volume += &swap.volume;
        day.fees += &swap.fee;
        day.swaps += 1;
        day.traders.insert(swap.caller);
    }

    days.into_iter()
        .map(|(date, day)| VolumeRow {
            date,
            volume: day.volume,
            fees: day.fees,
            num_swaps: day.swaps,
            traders: day.traders.len() as u64,
        })
        .collect()
}

/// Daily volume of plain transfers, excluding mints and burns
pub fn daily_transfer_volume(transfers: &[DecodedTransfer]) -> Vec<TransferVolumeRow> {
    let mut days: BTreeMap<NaiveDate, (BigDecimal, u64)> = BTreeMap::new();

    for transfer in transfers.iter().filter(|t| t.kind == TransferKind::Transfer) {
        let (volume, count) = days.entry(transfer.date()).or_default();
        *volume += &transfer.amount;
        *count += 1;
    }

    days.into_iter()
        .map(|(date, (volume, num_transfers))| TransferVolumeRow {
            date,
            volume,
            num_transfers,
        })
        .collect()
}
