use std::{
    collections::{BTreeSet, HashMap},
    time::Duration,
};

use alloy::primitives::{Address, B256};
use analytics_store::{entity::LogEntry, settings::ScanSettings};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::sleep;

use crate::client::ChainReader;

/// Inclusive block range of one `eth_getLogs` request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct BlockWindow {
    pub from: u64,
    pub to: u64,
}

/// Contract address plus topic-0 filter
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogQuery {
    pub address: Address,
    pub topic0: B256,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailedWindow {
    pub window: BlockWindow,
    pub reason: String,
}

/// Outcome of a paginated log fetch.
///
/// A failed window contributes no logs and the scan carries on, so a scan can
/// finish with fewer logs than exist on chain. Callers decide whether a
/// non-empty `failed_windows` is acceptable.
#[derive(Debug, Clone, Default)]
pub struct LogScan {
    pub logs: Vec<LogEntry>,
    pub failed_windows: Vec<FailedWindow>,
    /// The head could not be read, so nothing was requested
    pub head_unavailable: bool,
}

impl LogScan {
    pub fn is_complete(&self) -> bool {
        !self.head_unavailable && self.failed_windows.is_empty()
    }
}

/// Split `[from, to]` into windows ending at `min(start + batch_size, to)`.
///
/// `from=1000, to=2500, batch_size=900` yields `[1000,1900]` and `[1901,2500]`.
pub fn block_windows(from: u64, to: u64, batch_size: u64) -> impl Iterator<Item = BlockWindow> {
    let mut next = Some(from).filter(|start| *start <= to);

    std::iter::from_fn(move || {
        let start = next?;
        let end = start.saturating_add(batch_size).min(to);
        next = end.checked_add(1).filter(|following| *following <= to);

        Some(BlockWindow { from: start, to: end })
    })
}

/// Latest block height, or 0 when the node cannot be reached.
///
/// 0 means "unavailable", never genesis.
pub async fn current_block<C: ChainReader>(client: &C) -> u64 {
    match client.block_number().await {
        Ok(head) => head,
        Err(err) => {
            tracing::warn!("Cannot read block height: {err}");
            0
        }
    }
}

/// Unix timestamp of `block`, falling back to the wall clock
pub async fn block_timestamp<C: ChainReader>(client: &C, block: u64) -> u64 {
    match client.block_timestamp(block).await {
        Ok(Some(timestamp)) => timestamp,
        Ok(None) => {
            tracing::warn!(block, "Block not found, using wall clock");
            Utc::now().timestamp().max(0) as u64
        }
        Err(err) => {
            tracing::warn!(block, "Cannot read block timestamp, using wall clock: {err}");
            Utc::now().timestamp().max(0) as u64
        }
    }
}

/// Estimate the block produced at `target` by extrapolating back from the head
/// at a fixed block rate.
///
/// Not a search: the estimate can land before the true block, so callers get a
/// few extra blocks at the start of their range.
pub async fn block_for_timestamp<C: ChainReader>(
    client: &C,
    target: u64,
    blocks_per_second: f64,
) -> u64 {
    let head = current_block(client).await;
    if head == 0 {
        return 1;
    }

    let head_time = block_timestamp(client, head).await;
    let elapsed = head_time.saturating_sub(target) as f64;
    let blocks_back = (elapsed * blocks_per_second) as u64;

    head.saturating_sub(blocks_back).max(1)
}

/// Fetch every log matching `query` in `[from, to]` (head when `to` is `None`),
/// one window at a time with `scan.request_delay` between requests.
pub async fn fetch_logs<C: ChainReader>(
    client: &C,
    query: &LogQuery,
    from: u64,
    to: Option<u64>,
    scan: &ScanSettings,
) -> LogScan {
    let to = match to {
        Some(to) => to,
        None => current_block(client).await,
    };

    if to == 0 {
        return LogScan {
            head_unavailable: true,
            ..Default::default()
        };
    }

    let mut result = LogScan::default();

    for window in block_windows(from, to, scan.batch_size) {
        match client.logs(query, window).await {
            Ok(mut logs) => result.logs.append(&mut logs),
            Err(err) => {
                tracing::warn!(
                    address = %query.address,
                    from = window.from,
                    to = window.to,
                    "Log window failed, continuing without it: {err}"
                );
                result.failed_windows.push(FailedWindow {
                    window,
                    reason: err.to_string(),
                });
            }
        }

        pause(scan.request_delay).await;
    }

    tracing::debug!(
        address = %query.address,
        logs = result.logs.len(),
        failed = result.failed_windows.len(),
        "Fetched logs for blocks {from} to {to}"
    );

    result
}

/// Resolve each distinct block of `logs` once.
pub async fn block_times<C: ChainReader>(
    client: &C,
    logs: &[LogEntry],
    delay: Duration,
) -> HashMap<u64, DateTime<Utc>> {
    let blocks: BTreeSet<u64> = logs.iter().map(|log| log.block_number).collect();
    let mut times = HashMap::with_capacity(blocks.len());

    for block in blocks {
        let timestamp = block_timestamp(client, block).await;
        let time = DateTime::from_timestamp(timestamp as i64, 0).unwrap_or_else(Utc::now);
        times.insert(block, time);

        pause(delay).await;
    }

    times
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}
