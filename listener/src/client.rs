use std::{borrow::Cow, future::Future, time::Duration};

use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, Bytes, U256, U64},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::Filter,
    transports::{BoxTransport, TransportError, TransportResult},
};
use analytics_store::{entity::LogEntry, settings::ScanSettings};
use serde::Deserialize;
use tokio::time::sleep;

use crate::{
    error::AppError,
    service::{BlockWindow, LogQuery},
};

/// `totalSupply()`
const TOTAL_SUPPLY_SELECTOR: &str = "0x18160ddd";

/// Read-only access to a node.
///
/// Implementations report failures; the tolerant defaults (0 head, wall-clock
/// time, empty windows) are applied by the functions in [`crate::service`].
pub trait ChainReader: Send + Sync {
    fn block_number(&self) -> impl Future<Output = Result<u64, AppError>> + Send;

    /// `None` when the node does not know the block
    fn block_timestamp(
        &self,
        block: u64,
    ) -> impl Future<Output = Result<Option<u64>, AppError>> + Send;

    /// Logs of one window, inclusive on both ends
    fn logs(
        &self,
        query: &LogQuery,
        window: BlockWindow,
    ) -> impl Future<Output = Result<Vec<LogEntry>, AppError>> + Send;

    fn total_supply(&self, token: Address) -> impl Future<Output = Result<U256, AppError>> + Send;
}

/// Only the field we read from `eth_getBlockByNumber`
#[derive(Debug, Deserialize)]
struct BlockHeader {
    timestamp: U64,
}

/// Check if an error is a rate limit error
fn is_rate_limited(err: &TransportError) -> bool {
    let err_str = err.to_string().to_lowercase();
    err_str.contains("429")
        || err_str.contains("rate limit")
        || err_str.contains("too many requests")
        || err_str.contains("-32005")
        || err_str.contains("limit exceeded")
}

/// Build the `eth_getLogs` filter for one window
fn build_filter(query: &LogQuery, window: BlockWindow) -> Filter {
    Filter::new()
        .from_block(BlockNumberOrTag::Number(window.from))
        .to_block(BlockNumberOrTag::Number(window.to))
        .address(query.address)
        .event_signature(query.topic0)
}

/// [`ChainReader`] over an alloy provider, retrying rate-limited calls with
/// exponential backoff
pub struct NodeClient<P> {
    provider: P,
    max_retries: u32,
    base_delay: Duration,
}

impl NodeClient<RootProvider<BoxTransport>> {
    pub async fn connect(rpc_url: &str, scan: &ScanSettings) -> Result<Self, AppError> {
        let provider = ProviderBuilder::new()
            .on_builtin(rpc_url)
            .await
            .map_err(|err| AppError::Connect {
                url: rpc_url.to_string(),
                reason: err.to_string(),
            })?;

        tracing::info!(rpc_url, "Connected to node");
        Ok(Self::new(provider, scan))
    }
}

impl<P: Provider> NodeClient<P> {
    pub fn new(provider: P, scan: &ScanSettings) -> Self {
        Self {
            provider,
            max_retries: scan.max_retries.max(1),
            base_delay: scan.request_delay.max(Duration::from_millis(50)),
        }
    }

    async fn with_retry<T, F, Fut>(&self, method: &str, call: F) -> Result<T, AppError>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = TransportResult<T>>,
    {
        for attempt in 0..self.max_retries {
            match call().await {
                Ok(value) => return Ok(value),
                Err(err) if is_rate_limited(&err) => {
                    let backoff = self.base_delay * 2_u32.saturating_pow(attempt);
                    tracing::warn!(
                        method,
                        attempt = attempt + 1,
                        max_retries = self.max_retries,
                        "{}, backing off for {}ms",
                        AppError::RateLimited,
                        backoff.as_millis()
                    );
                    sleep(backoff).await;
                }
                Err(err) => return Err(AppError::RpcError(format!("{method}: {err}"))),
            }
        }

        Err(AppError::MaxRetriesExceeded(self.max_retries))
    }
}

impl<P: Provider> ChainReader for NodeClient<P> {
    async fn block_number(&self) -> Result<u64, AppError> {
        let head: U64 = self
            .with_retry("eth_blockNumber", || {
                self.provider
                    .raw_request(Cow::Borrowed("eth_blockNumber"), ())
            })
            .await?;

        Ok(head.to::<u64>())
    }

    async fn block_timestamp(&self, block: u64) -> Result<Option<u64>, AppError> {
        let header: Option<BlockHeader> = self
            .with_retry("eth_getBlockByNumber", || {
                self.provider.raw_request(
                    Cow::Borrowed("eth_getBlockByNumber"),
                    (BlockNumberOrTag::Number(block), false),
                )
            })
            .await?;

        Ok(header.map(|header| header.timestamp.to::<u64>()))
    }

    async fn logs(&self, query: &LogQuery, window: BlockWindow) -> Result<Vec<LogEntry>, AppError> {
        let filter = build_filter(query, window);
        let logs = self
            .with_retry("eth_getLogs", || self.provider.get_logs(&filter))
            .await?;

        Ok(logs.into_iter().map(LogEntry::from).collect())
    }

    async fn total_supply(&self, token: Address) -> Result<U256, AppError> {
        let call = serde_json::json!({ "to": token, "data": TOTAL_SUPPLY_SELECTOR });
        let raw: Bytes = self
            .with_retry("eth_call", || {
                self.provider.raw_request(
                    Cow::Borrowed("eth_call"),
                    (call.clone(), BlockNumberOrTag::Latest),
                )
            })
            .await?;

        Ok(U256::try_from_be_slice(&raw).unwrap_or_default())
    }
}
