pub mod cache;
pub mod entity;
pub mod error;
pub mod settings;
pub mod snapshot;

// Re-export commonly used types
pub use cache::{CacheNamespace, TtlCache};
pub use entity::{
    AllTimeTotals, ContractTotals, DecodedTransfer, LabelSet, LogEntry, LpAction, LpEvent,
    RewardClaim, SwapEvent, TransferKind,
};
pub use error::StoreError;
pub use settings::{Market, Settings, TrackedToken};
pub use snapshot::SnapshotStore;

/// Load `.env` (if present) and build the process settings from the environment.
pub fn initialize_settings() -> Result<Settings, StoreError> {
    dotenvy::dotenv().ok();

    let settings = Settings::from_env()?;
    tracing::debug!(rpc_url = %settings.rpc_url, chain_id = settings.chain_id, "Settings loaded");

    Ok(settings)
}
