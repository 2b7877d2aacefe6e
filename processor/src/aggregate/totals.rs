use analytics_store::entity::ContractTotals;

use crate::events::transfer::TransferLog;

/// Fold `transfers` into existing totals, as an incremental scan does
pub fn fold_transfers<'a>(
    totals: &mut ContractTotals,
    transfers: impl IntoIterator<Item = &'a TransferLog>,
) {
    for transfer in transfers {
        totals.record(transfer.kind, transfer.from, transfer.to, &transfer.amount);
    }
}

pub fn contract_totals(transfers: &[TransferLog]) -> ContractTotals {
    let mut totals = ContractTotals::default();
    fold_transfers(&mut totals, transfers);
    totals
}

#[cfg(test)]
mod tests {
    use alloy::primitives::B256;
    use analytics_store::entity::DecodedTransfer;

    use super::*;
    use crate::aggregate::fixtures::*;

    fn untimed(transfer: DecodedTransfer) -> TransferLog {
        TransferLog {
            block: transfer.block,
            tx_hash: B256::ZERO,
            from: transfer.from,
            to: transfer.to,
            amount: transfer.amount,
            kind: transfer.kind,
        }
    }

    #[test]
    fn test_incremental_fold_matches_single_pass() {
        let transfers: Vec<TransferLog> = vec![
            mint(1, user(1), "10"),
            send(2, user(1), user(2), "4"),
            burn(3, user(2), "1"),
        ]
        .into_iter()
        .map(untimed)
        .collect();

        let mut incremental = contract_totals(&transfers[..1]);
        fold_transfers(&mut incremental, &transfers[1..]);

        assert_eq!(incremental, contract_totals(&transfers));
        assert_eq!(incremental.deposits, dec("10"));
        assert_eq!(incremental.withdrawals, dec("1"));
        assert_eq!(incremental.volume, dec("4"));
        assert_eq!(incremental.unique_users, 2);
    }

    #[test]
    fn test_empty_input() {
        let totals = contract_totals(&[]);

        assert_eq!(totals.transfer_count, 0);
        assert!(totals.users.is_empty());
    }
}
