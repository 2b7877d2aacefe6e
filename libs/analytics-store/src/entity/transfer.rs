use alloy::primitives::{Address, B256};
use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Semantic type of an ERC-20 Transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferKind {
    Mint,
    Burn,
    Deposit,
    Withdrawal,
    Transfer,
}

impl TransferKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferKind::Mint => "mint",
            TransferKind::Burn => "burn",
            TransferKind::Deposit => "deposit",
            TransferKind::Withdrawal => "withdrawal",
            TransferKind::Transfer => "transfer",
        }
    }

    /// Sent from the zero address
    pub fn is_inflow(&self) -> bool {
        matches!(self, TransferKind::Mint | TransferKind::Deposit)
    }

    /// Sent to the zero address
    pub fn is_outflow(&self) -> bool {
        matches!(self, TransferKind::Burn | TransferKind::Withdrawal)
    }
}

/// Which labels a token's zero-address transfers receive.
///
/// The event itself is identical for both; only the emitting contract decides
/// whether a mint is a "mint" (base token) or a "deposit" (yield wrapper).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelSet {
    /// mint / burn
    Supply,
    /// deposit / withdrawal
    Vault,
}

impl LabelSet {
    pub fn inflow(&self) -> TransferKind {
        match self {
            LabelSet::Supply => TransferKind::Mint,
            LabelSet::Vault => TransferKind::Deposit,
        }
    }

    pub fn outflow(&self) -> TransferKind {
        match self {
            LabelSet::Supply => TransferKind::Burn,
            LabelSet::Vault => TransferKind::Withdrawal,
        }
    }
}

/// A classified Transfer with its block time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedTransfer {
    pub timestamp: DateTime<Utc>,
    pub block: u64,
    pub tx_hash: B256,
    pub from: Address,
    pub to: Address,
    /// Human units (raw value scaled by the token's decimals)
    pub amount: BigDecimal,
    pub kind: TransferKind,
}

impl DecodedTransfer {
    /// UTC calendar date of the block
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_sets() {
        assert_eq!(LabelSet::Supply.inflow(), TransferKind::Mint);
        assert_eq!(LabelSet::Supply.outflow(), TransferKind::Burn);
        assert_eq!(LabelSet::Vault.inflow(), TransferKind::Deposit);
        assert_eq!(LabelSet::Vault.outflow(), TransferKind::Withdrawal);
    }

    #[test]
    fn test_flow_direction() {
        assert!(TransferKind::Deposit.is_inflow());
        assert!(TransferKind::Burn.is_outflow());
        assert!(!TransferKind::Transfer.is_inflow());
        assert!(!TransferKind::Transfer.is_outflow());
    }
}
