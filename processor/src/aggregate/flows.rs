use std::collections::BTreeMap;

use analytics_store::entity::{series::FlowRow, DecodedTransfer};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;

/// Daily SY deposits and withdrawals; dates with only plain transfers are omitted.
pub fn daily_flows(transfers: &[DecodedTransfer]) -> Vec<FlowRow> {
    let mut days: BTreeMap<NaiveDate, (BigDecimal, BigDecimal)> = BTreeMap::new();

    for transfer in transfers {
        if transfer.kind.is_inflow() {
            days.entry(transfer.date()).or_default().0 += &transfer.amount;
        } else if transfer.kind.is_outflow() {
            days.entry(transfer.date()).or_default().1 += &transfer.amount;
        }
    }

    days.into_iter()
        .map(|(date, (deposits, withdrawals))| FlowRow {
            date,
            net_flow: &deposits - &withdrawals,
            deposits,
            withdrawals,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;
    use analytics_store::entity::TransferKind;

    use super::*;
    use crate::aggregate::fixtures::*;

    #[test]
    fn test_daily_flows() {
        let transfers = vec![
            transfer(1, Address::ZERO, user(1), "100", TransferKind::Deposit),
            transfer(1, user(2), Address::ZERO, "30", TransferKind::Withdrawal),
            transfer(2, user(1), Address::ZERO, "5.5", TransferKind::Withdrawal),
            transfer(3, user(1), user(2), "1000", TransferKind::Transfer),
        ];

        let rows = daily_flows(&transfers);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, day(1));
        assert_eq!(rows[0].net_flow, dec("70"));
        assert_eq!(rows[1].deposits, dec("0"));
        assert_eq!(rows[1].net_flow, dec("-5.5"));
    }

    #[test]
    fn test_empty_input() {
        assert!(daily_flows(&[]).is_empty());
    }
}
