use std::{collections::HashMap, str::FromStr};

use alloy::primitives::Address;
use analytics_store::entity::{series::HolderRow, DecodedTransfer};
use bigdecimal::{BigDecimal, Zero};

use super::round_dp;

/// Balances below this are dropped from the holder table
const DUST_THRESHOLD: &str = "0.01";

pub const TOP_HOLDERS: usize = 20;

/// Net balance per address (received minus sent), zero address excluded.
///
/// Summed over every holder this equals mints minus burns exactly.
pub fn holder_balances(transfers: &[DecodedTransfer]) -> HashMap<Address, BigDecimal> {
    let mut balances: HashMap<Address, BigDecimal> = HashMap::new();

    for transfer in transfers {
        if transfer.to != Address::ZERO {
            *balances.entry(transfer.to).or_default() += &transfer.amount;
        }
        if transfer.from != Address::ZERO {
            *balances.entry(transfer.from).or_default() -= &transfer.amount;
        }
    }

    balances
}

/// Largest `limit` holders after dust filtering, with their share of the
/// remaining summed balance.
pub fn top_holders(transfers: &[DecodedTransfer], limit: usize) -> Vec<HolderRow> {
    let dust = BigDecimal::from_str(DUST_THRESHOLD).unwrap_or_default();

    let mut holders: Vec<(Address, BigDecimal)> = holder_balances(transfers)
        .into_iter()
        .filter(|(_, balance)| *balance > dust)
        .collect();

    let total: BigDecimal = holders.iter().map(|(_, balance)| balance).sum();

    holders.sort_by(|(a_addr, a_bal), (b_addr, b_bal)| {
        b_bal.cmp(a_bal).then_with(|| a_addr.cmp(b_addr))
    });

    holders
        .into_iter()
        .take(limit)
        .map(|(holder, balance)| {
            let pct_supply = if total.is_zero() {
                BigDecimal::zero()
            } else {
                round_dp(&(&balance / &total * BigDecimal::from(100)), 2)
            };

            HolderRow {
                holder,
                balance,
                pct_supply,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::*;

    fn activity() -> Vec<DecodedTransfer> {
        vec![
            mint(1, user(1), "100"),
            mint(1, user(2), "50"),
            send(2, user(1), user(3), "25.5"),
            burn(3, user(2), "10"),
            send(3, user(3), user(4), "0.005"),
            mint(4, user(5), "0.009"),
        ]
    }

    #[test]
    fn test_balances_conserve_supply() {
        let transfers = activity();

        let sum: BigDecimal = holder_balances(&transfers).values().sum();

        let minted: BigDecimal = transfers
            .iter()
            .filter(|t| t.kind.is_inflow())
            .map(|t| &t.amount)
            .sum();
        let burned: BigDecimal = transfers
            .iter()
            .filter(|t| t.kind.is_outflow())
            .map(|t| &t.amount)
            .sum();
        assert_eq!(sum, minted - burned);
    }

    #[test]
    fn test_top_holders_sorted_without_dust() {
        let rows = top_holders(&activity(), TOP_HOLDERS);

        let holders: Vec<_> = rows.iter().map(|row| row.holder).collect();
        assert_eq!(holders, vec![user(1), user(2), user(3)]);
        assert!(!holders.contains(&Address::ZERO));
        assert_eq!(rows[0].balance, dec("74.5"));
        for pair in rows.windows(2) {
            assert!(pair[0].balance > pair[1].balance);
        }

        let pct: BigDecimal = rows.iter().map(|row| &row.pct_supply).sum();
        assert!(pct <= dec("100.01"));
    }

    #[test]
    fn test_limit() {
        let transfers: Vec<_> = (1..=30).map(|n| mint(1, user(n), &n.to_string())).collect();

        let rows = top_holders(&transfers, TOP_HOLDERS);

        assert_eq!(rows.len(), 20);
        assert_eq!(rows[0].holder, user(30));
    }

    #[test]
    fn test_only_outflows_yields_nothing() {
        let transfers = vec![burn(1, user(1), "5")];

        assert!(top_holders(&transfers, TOP_HOLDERS).is_empty());
        assert!(top_holders(&[], TOP_HOLDERS).is_empty());
    }
}
