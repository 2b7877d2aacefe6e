use std::collections::{BTreeSet, HashMap};

use alloy::primitives::Address;
use analytics_store::{
    entity::{series::MarketBreakdownRow, LpAction, LpEvent, SwapEvent},
    Market,
};
use bigdecimal::BigDecimal;

#[derive(Default)]
struct MarketActivity {
    volume: BigDecimal,
    fees: BigDecimal,
    swaps: u64,
    traders: BTreeSet<Address>,
    lp_minted: BigDecimal,
    lp_burned: BigDecimal,
}

/// One row per configured market, in configuration order, even when idle.
///
/// Events tagged with a label outside `markets` are ignored.
pub fn market_breakdown(
    markets: &[Market],
    swaps: &[SwapEvent],
    lp_events: &[LpEvent],
) -> Vec<MarketBreakdownRow> {
    let mut activity: HashMap<&str, MarketActivity> = markets
        .iter()
        .map(|market| (market.label.as_str(), MarketActivity::default()))
        .collect();

    for swap in swaps {
        if let Some(entry) = activity.get_mut(swap.market.as_str()) {
            entry.volume += &swap.volume;
            entry.fees += &swap.fee;
            entry.swaps += 1;
            entry.traders.insert(swap.caller);
        }
    }

    for event in lp_events {
        if let Some(entry) = activity.get_mut(event.market.as_str()) {
            match event.action {
                LpAction::Mint => entry.lp_minted += &event.lp_amount,
                LpAction::Burn => entry.lp_burned += &event.lp_amount,
            }
        }
    }

    markets
        .iter()
        .filter_map(|market| {
            let entry = activity.remove(market.label.as_str())?;
            Some(MarketBreakdownRow {
                market: market.label.clone(),
                volume: entry.volume,
                fees: entry.fees,
                num_swaps: entry.swaps,
                traders: entry.traders.len() as u64,
                lp_minted: entry.lp_minted,
                lp_burned: entry.lp_burned,
            })
        })
        .collect()
}
