use std::collections::{BTreeMap, BTreeSet};

use alloy::primitives::Address;
use analytics_store::entity::{series::UserRow, DecodedTransfer, SwapEvent};
use chrono::NaiveDate;

#[derive(Default)]
struct ActiveDay {
    nlp: BTreeSet<Address>,
    pendle: BTreeSet<Address>,
}

/// Per-day distinct users of nLP transfers (both parties) and Pendle swaps (caller).
///
/// `cumulative_users` is a running sum of `daily_users`, so someone active on
/// three days adds three. The dashboard has always reported it this way.
pub fn user_stats(transfers: &[DecodedTransfer], swaps: &[SwapEvent]) -> Vec<UserRow> {
    let mut days: BTreeMap<NaiveDate, ActiveDay> = BTreeMap::new();

    for transfer in transfers {
        for party in [transfer.from, transfer.to] {
            if party != Address::ZERO {
                days.entry(transfer.date()).or_default().nlp.insert(party);
            }
        }
    }

    for swap in swaps {
        days.entry(swap.date()).or_default().pendle.insert(swap.caller);
    }

    let mut cumulative_users = 0;
    days.into_iter()
        .map(|(date, day)| {
            let daily_users = day.nlp.union(&day.pendle).count() as u64;
            cumulative_users += daily_users;

            UserRow {
                date,
                daily_users,
                nlp_users: day.nlp.len() as u64,
                pendle_users: day.pendle.len() as u64,
                cumulative_users,
            }
        })
        .collect()
}

/// Every non-zero address seen in `transfers` or as a swap caller
pub fn distinct_users(transfers: &[DecodedTransfer], swaps: &[SwapEvent]) -> BTreeSet<Address> {
    transfers
        .iter()
        .flat_map(|transfer| [transfer.from, transfer.to])
        .chain(swaps.iter().map(|swap| swap.caller))
        .filter(|address| *address != Address::ZERO)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::fixtures::*;

    #[test]
    fn test_daily_users_dedup_across_products() {
        let transfers = vec![
            mint(1, user(1), "10"),
            send(1, user(1), user(2), "1"),
            send(2, user(2), user(1), "1"),
        ];
        let swaps = vec![
            swap(1, "26 Dec 2025", user(1), "5", "0"),
            swap(1, "26 Dec 2025", user(3), "5", "0"),
        ];

        let rows = user_stats(&transfers, &swaps);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].nlp_users, 2);
        assert_eq!(rows[0].pendle_users, 2);
        assert_eq!(rows[0].daily_users, 3);
        assert_eq!(rows[1].daily_users, 2);
    }

    #[test]
    fn test_cumulative_is_sum_of_daily_counts() {
        let transfers = vec![
            send(1, user(1), user(2), "1"),
            send(2, user(1), user(2), "1"),
            send(3, user(1), user(2), "1"),
        ];

        let rows = user_stats(&transfers, &[]);

        // Same two users each day
        assert_eq!(rows.last().unwrap().cumulative_users, 6);
        assert_eq!(distinct_users(&transfers, &[]).len(), 2);
    }

    #[test]
    fn test_zero_address_never_counted() {
        let transfers = vec![mint(1, user(1), "1"), burn(1, user(1), "1")];

        let users = distinct_users(&transfers, &[]);

        assert_eq!(users.into_iter().collect::<Vec<_>>(), vec![user(1)]);
        assert!(user_stats(&[], &[]).is_empty());
    }
}
