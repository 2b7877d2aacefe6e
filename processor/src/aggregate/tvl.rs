use std::collections::BTreeMap;

use analytics_store::entity::{series::TvlRow, DecodedTransfer};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

/// Cumulative mints minus burns per date.
///
/// The running sum starts at zero on the first date in `transfers`, so for a
/// windowed fetch this is the change since the window opened, not the supply.
pub fn tvl_curve(transfers: &[DecodedTransfer]) -> Vec<TvlRow> {
    let mut changes: BTreeMap<NaiveDate, BigDecimal> = BTreeMap::new();

    for transfer in transfers {
        if transfer.kind.is_inflow() {
            *changes.entry(transfer.date()).or_default() += &transfer.amount;
        } else if transfer.kind.is_outflow() {
            *changes.entry(transfer.date()).or_default() -= &transfer.amount;
        }
    }

    let mut tvl = BigDecimal::default();
    changes
        .into_iter()
        .map(|(date, daily_change)| {
            tvl += &daily_change;
            TvlRow {
                date,
                daily_change,
                tvl: tvl.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::*;

    #[test]
    fn test_curve_accumulates_in_date_order() {
        // Deliberately out of order
        let transfers = vec![
            burn(3, user(1), "40"),
            mint(1, user(1), "100"),
            send(2, user(1), user(2), "999"),
            mint(3, user(2), "15"),
            burn(2, user(2), "10"),
        ];

        let curve = tvl_curve(&transfers);

        let dates: Vec<_> = curve.iter().map(|row| row.date).collect();
        assert_eq!(dates, vec![day(1), day(2), day(3)]);
        assert_eq!(curve[1].daily_change, dec("-10"));
        assert_eq!(curve[2].daily_change, dec("-25"));
        assert_eq!(curve[2].tvl, dec("65"));
    }

    #[test]
    fn test_final_tvl_is_net_supply_change() {
        let transfers = vec![
            mint(1, user(1), "12.345"),
            mint(4, user(2), "0.655"),
            burn(5, user(1), "3"),
        ];

        let curve = tvl_curve(&transfers);

        let last = curve.last().unwrap();
        assert_eq!(last.tvl, dec("10"));
        for pair in curve.windows(2) {
            let rising = pair[1].tvl >= pair[0].tvl;
            assert_eq!(rising, pair[1].daily_change >= dec("0"));
        }
    }

    #[test]
    fn test_empty_input() {
        assert!(tvl_curve(&[]).is_empty());
    }
}
