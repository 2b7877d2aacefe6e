use analytics_store::entity::{series::KpiSummary, DecodedTransfer, SwapEvent, TransferKind};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Duration, Utc};

use super::{distinct_users, round_dp};

/// Records one KPI computation reads from
pub struct KpiInputs<'a> {
    pub nlp_transfers: &'a [DecodedTransfer],
    pub sy_transfers: &'a [DecodedTransfer],
    pub swaps: &'a [SwapEvent],
    pub on_chain_supply: Option<BigDecimal>,
}

fn sum_of(transfers: &[DecodedTransfer], kind: TransferKind) -> BigDecimal {
    transfers
        .iter()
        .filter(|transfer| transfer.kind == kind)
        .map(|transfer| &transfer.amount)
        .sum()
}

/// Headline figures for the selected window; `volume_7d` only counts swaps
/// in the seven days before `now`.
pub fn kpi_summary(inputs: &KpiInputs<'_>, now: DateTime<Utc>) -> KpiSummary {
    let tvl = sum_of(inputs.nlp_transfers, TransferKind::Mint)
        - sum_of(inputs.nlp_transfers, TransferKind::Burn);

    let week_ago = now - Duration::days(7);
    let volume_7d: BigDecimal = inputs
        .swaps
        .iter()
        .filter(|swap| swap.timestamp >= week_ago)
        .map(|swap| &swap.volume)
        .sum();
    let pendle_volume: BigDecimal = inputs.swaps.iter().map(|swap| &swap.volume).sum();
    let total_fees: BigDecimal = inputs.swaps.iter().map(|swap| &swap.fee).sum();

    KpiSummary {
        tvl: round_dp(&tvl, 2),
        on_chain_supply: inputs.on_chain_supply.as_ref().map(|supply| round_dp(supply, 2)),
        volume_7d: round_dp(&volume_7d, 2),
        total_fees: round_dp(&total_fees, 4),
        total_users: distinct_users(inputs.nlp_transfers, inputs.swaps).len() as u64,
        pendle_deposits: round_dp(&sum_of(inputs.sy_transfers, TransferKind::Deposit), 2),
        pendle_withdrawals: round_dp(&sum_of(inputs.sy_transfers, TransferKind::Withdrawal), 2),
        pendle_volume: round_dp(&pendle_volume, 2),
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::Address;

    use super::*;
    use crate::aggregate::fixtures::*;

    #[test]
    fn test_kpi_summary() {
        let nlp = vec![
            mint(1, user(1), "100.126"),
            burn(9, user(1), "20"),
            send(9, user(1), user(2), "5"),
        ];
        let sy = vec![
            transfer(2, Address::ZERO, user(3), "40", TransferKind::Deposit),
            transfer(3, user(3), Address::ZERO, "15.333", TransferKind::Withdrawal),
        ];
        let swaps = vec![
            swap(1, "26 Dec 2025", user(4), "30", "0.00012"),
            swap(9, "26 Dec 2025", user(1), "-12.346", "0.1"),
        ];
        let inputs = KpiInputs {
            nlp_transfers: &nlp,
            sy_transfers: &sy,
            swaps: &swaps,
            on_chain_supply: Some(dec("1234.5678")),
        };

        let kpi = kpi_summary(&inputs, at(10, 0));

        assert_eq!(kpi.tvl, dec("80.13"));
        assert_eq!(kpi.volume_7d, dec("12.35"));
        assert_eq!(kpi.pendle_volume, dec("42.35"));
        assert_eq!(kpi.total_fees, dec("0.1001"));
        assert_eq!(kpi.total_users, 3);
        assert_eq!(kpi.pendle_deposits, dec("40"));
        assert_eq!(kpi.pendle_withdrawals, dec("15.33"));
        assert_eq!(kpi.on_chain_supply, Some(dec("1234.57")));
    }

    #[test]
    fn test_empty_window_is_all_zero() {
        let inputs = KpiInputs {
            nlp_transfers: &[],
            sy_transfers: &[],
            swaps: &[],
            on_chain_supply: None,
        };

        let kpi = kpi_summary(&inputs, Utc::now());

        assert_eq!(kpi.tvl, dec("0"));
        assert_eq!(kpi.total_users, 0);
        assert!(kpi.on_chain_supply.is_none());
    }
}
