// Raw chain input
pub mod log_entry;

// Classified records
pub mod lp_event;
pub mod reward_claim;
pub mod swap;
pub mod transfer;

// Derived outputs
pub mod all_time_totals;
pub mod series;

// Re-exports for convenience
pub use log_entry::LogEntry;

pub use lp_event::{LpAction, LpEvent};
pub use reward_claim::RewardClaim;
pub use swap::SwapEvent;
pub use transfer::{DecodedTransfer, LabelSet, TransferKind};

pub use all_time_totals::{AllTimeTotals, ContractTotals};
