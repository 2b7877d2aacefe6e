//! Transfer event decoder
//!
//! Event signature: Transfer(address indexed from, address indexed to, uint256 value)
//!
//! Topics layout:
//! - topics[1]: from
//! - topics[2]: to
//!
//! Data layout:
//! - word 0: value

use alloy::primitives::{Address, B256};
use analytics_store::{
    entity::{DecodedTransfer, LabelSet, LogEntry, TransferKind},
    TrackedToken,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};

use crate::decoder::{decode_address, decode_uint, scale_amount};

/// Zero-address sentinel convention; `from` is checked first.
pub fn classify(from: Address, to: Address, labels: LabelSet) -> TransferKind {
    if from == Address::ZERO {
        labels.inflow()
    } else if to == Address::ZERO {
        labels.outflow()
    } else {
        TransferKind::Transfer
    }
}

/// A classified Transfer before its block time is known.
///
/// All-time totals fold these directly and never pay for timestamp lookups.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferLog {
    pub block: u64,
    pub tx_hash: B256,
    pub from: Address,
    pub to: Address,
    pub amount: BigDecimal,
    pub kind: TransferKind,
}

impl TransferLog {
    pub fn at(self, timestamp: DateTime<Utc>) -> DecodedTransfer {
        DecodedTransfer {
            timestamp,
            block: self.block,
            tx_hash: self.tx_hash,
            from: self.from,
            to: self.to,
            amount: self.amount,
            kind: self.kind,
        }
    }
}

pub fn decode(log: &LogEntry, token: &TrackedToken) -> TransferLog {
    let from = decode_address(log.topic(1));
    let to = decode_address(log.topic(2));

    TransferLog {
        block: log.block_number,
        tx_hash: log.tx_hash,
        from,
        to,
        amount: scale_amount(decode_uint(&log.data, 0), token.decimals),
        kind: classify(from, to, token.labels),
    }
}
