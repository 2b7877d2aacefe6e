//! All-time totals per tracked token
//!
//! Two ways to produce them:
//! - [`refresh_from_rpc`]: incremental `eth_getLogs` scan resumed from the
//!   persisted `last_scanned_block`, bounded per run.
//! - [`refresh_from_explorer`]: full re-fetch of the explorer transfer listing,
//!   nothing carried over between runs.

use std::time::Duration;

use analytics_store::{
    entity::{AllTimeTotals, ContractTotals},
    Settings, SnapshotStore, TrackedToken,
};
use chrono::Utc;
use data_adapters::ExplorerClient;
use listener::{
    service::{block_windows, current_block},
    BlockWindow, ChainReader, LogQuery,
};
use tokio::time::sleep;

use crate::{
    aggregate::{contract_totals, fold_transfers},
    events::{topics, transfer},
    outcome::{FetchIssue, Fetched},
};

pub const RPC_CATEGORY: &str = "rpc_scan";
pub const EXPLORER_CATEGORY: &str = "explorer";

/// Scan `token` forward from where `previous` stopped, up to `head`.
///
/// Stops at the first failed window so `last_scanned_block` never skips
/// over missing data; the next run retries from there.
pub async fn scan_contract<C: ChainReader>(
    client: &C,
    token: &TrackedToken,
    previous: Option<ContractTotals>,
    head: u64,
    settings: &Settings,
) -> Fetched<ContractTotals> {
    let mut totals = previous.unwrap_or_default();
    let start = totals
        .last_scanned_block
        .map(|block| block + 1)
        .unwrap_or(token.deployment_block);

    let query = LogQuery {
        address: token.address,
        topic0: topics::TRANSFER,
    };
    let mut issues = Vec::new();
    let mut scanned = 0;

    for window in block_windows(start, head, settings.scan.batch_size)
        .take(settings.all_time.max_windows as usize)
    {
        match client.logs(&query, window).await {
            Ok(logs) => {
                let transfers: Vec<_> = logs.iter().map(|log| transfer::decode(log, token)).collect();
                fold_transfers(&mut totals, &transfers);
                totals.last_scanned_block = Some(window.to);
                scanned += 1;
            }
            Err(err) => {
                tracing::warn!(
                    token = token.name,
                    from = window.from,
                    to = window.to,
                    "All-time scan halted at failed window: {err}"
                );
                issues.push(window_issue(token, window, err.to_string()));
                break;
            }
        }

        pause(settings.scan.request_delay).await;
    }

    let behind = totals.last_scanned_block.map_or(true, |reached| reached < head);
    if issues.is_empty() && start <= head && behind {
        tracing::warn!(
            token = token.name,
            reached = ?totals.last_scanned_block,
            head,
            "Window budget spent before head, resuming next refresh"
        );
        issues.push(behind_issue(token, totals.last_scanned_block, head));
    }
    tracing::debug!(token = token.name, windows = scanned, "All-time scan finished");

    Fetched::degraded(totals, issues)
}

fn window_issue(token: &TrackedToken, window: BlockWindow, reason: String) -> FetchIssue {
    FetchIssue::FailedWindow {
        source: format!("{} all-time", token.name),
        from: window.from,
        to: window.to,
        reason,
    }
}

fn behind_issue(token: &TrackedToken, reached: Option<u64>, head: u64) -> FetchIssue {
    FetchIssue::BehindHead {
        source: format!("{} all-time", token.name),
        reached,
        head,
    }
}

/// Contracts in a stored RPC snapshot that trail `head` by more than one
/// refresh can cover
pub fn lagging_contracts(totals: &AllTimeTotals, head: u64, settings: &Settings) -> Vec<FetchIssue> {
    let budget = settings
        .scan
        .batch_size
        .saturating_add(1)
        .saturating_mul(settings.all_time.max_windows);

    settings
        .tracked_tokens()
        .into_iter()
        .filter_map(|token| {
            let reached = totals
                .contracts
                .get(&token.name)
                .and_then(|contract| contract.last_scanned_block);
            let lag = reached.map_or(head, |reached| head.saturating_sub(reached));

            (reached.is_none() || lag > budget).then(|| behind_issue(token, reached, head))
        })
        .collect()
}

/// Advance the RPC snapshot and persist it, including partial progress
pub async fn refresh_from_rpc<C: ChainReader>(
    client: &C,
    settings: &Settings,
    snapshot: &SnapshotStore,
) -> Fetched<AllTimeTotals> {
    let mut previous = snapshot.category(RPC_CATEGORY).await.unwrap_or_default();

    let head = current_block(client).await;
    if head == 0 {
        return Fetched::degraded(
            previous,
            vec![FetchIssue::HeadUnavailable {
                source: "all-time scan".to_string(),
            }],
        );
    }

    let mut totals = AllTimeTotals::default();
    let mut issues = Vec::new();

    for token in settings.tracked_tokens() {
        let prior = previous.contracts.remove(&token.name);
        let scanned = scan_contract(client, token, prior, head, settings).await;

        issues.extend(scanned.issues);
        totals.contracts.insert(token.name.clone(), scanned.data);
    }
    totals.seal(Utc::now());

    if let Err(err) = snapshot.store(RPC_CATEGORY, totals.clone()).await {
        tracing::error!("Cannot persist all-time snapshot: {err}");
        issues.push(FetchIssue::Snapshot {
            reason: err.to_string(),
        });
    }

    Fetched::degraded(totals, issues)
}

/// Rebuild the explorer snapshot from scratch.
///
/// When any token's listing fails the previous snapshot is kept untouched and
/// returned with the failure attached.
pub async fn refresh_from_explorer(
    explorer: &ExplorerClient,
    settings: &Settings,
    snapshot: &SnapshotStore,
) -> Fetched<AllTimeTotals> {
    let mut totals = AllTimeTotals::default();
    let mut issues = Vec::new();

    for token in settings.tracked_tokens() {
        let listing = match explorer.token_transfers(token.address, token.decimals).await {
            Ok(listing) => listing,
            Err(err) => {
                tracing::warn!(token = token.name, "Explorer refresh failed: {err}");
                let previous = snapshot.category(EXPLORER_CATEGORY).await.unwrap_or_default();
                return Fetched::degraded(
                    previous,
                    vec![FetchIssue::Adapter {
                        source: format!("{} explorer listing", token.name),
                        reason: err.to_string(),
                    }],
                );
            }
        };

        if listing.truncated {
            issues.push(FetchIssue::Truncated {
                source: format!("{} explorer listing", token.name),
                pages: listing.pages,
            });
        }

        let transfers: Vec<_> = listing
            .transfers
            .into_iter()
            .map(|item| transfer::TransferLog {
                block: item.block,
                tx_hash: item.tx_hash,
                kind: transfer::classify(item.from, item.to, token.labels),
                from: item.from,
                to: item.to,
                amount: item.amount,
            })
            .collect();

        totals
            .contracts
            .insert(token.name.clone(), contract_totals(&transfers));
    }
    totals.seal(Utc::now());

    if let Err(err) = snapshot.store(EXPLORER_CATEGORY, totals.clone()).await {
        tracing::error!("Cannot persist all-time snapshot: {err}");
        issues.push(FetchIssue::Snapshot {
            reason: err.to_string(),
        });
    }

    Fetched::degraded(totals, issues)
}

async fn pause(delay: Duration) {
    if !delay.is_zero() {
        sleep(delay).await;
    }
}
