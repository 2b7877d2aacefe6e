//! Analytics service
//!
//! Owns the node client, adapters, cache and snapshot store, and exposes one
//! method per dashboard dataset. Windowed fetches are cached under
//! `{dataset}_{days}`; only complete fetches are cached so a degraded result
//! is retried on the next read.

use std::{future::Future, sync::Arc};

use alloy::primitives::Address;
use analytics_store::{
    entity::{
        series::{
            FlowRow, HolderRow, KpiSummary, MarketBreakdownRow, NotionalRow, TestnetRow,
            TransferVolumeRow, TvlRow, UserRow, VolumeRow, YieldRow,
        },
        AllTimeTotals, DecodedTransfer, LogEntry, LpEvent, RewardClaim, SwapEvent,
    },
    settings::AllTimeSource,
    CacheNamespace, Settings, SnapshotStore, TrackedToken, TtlCache,
};
use bigdecimal::BigDecimal;
use chrono::Utc;
use data_adapters::{AdapterError, Adapters};
use listener::{
    service::{block_for_timestamp, block_times, current_block, fetch_logs},
    ChainReader, LogQuery,
};

use crate::{
    aggregate::{self, holders::TOP_HOLDERS, KpiInputs},
    all_time::{self, EXPLORER_CATEGORY, RPC_CATEGORY},
    decoder::scale_amount,
    error::AppError,
    events::{decode_event, ChainEvent, DecodeContext, EventKind},
    outcome::{FetchIssue, Fetched},
};

type Shared<T> = Fetched<Arc<Vec<T>>>;

pub struct AnalyticsService<C> {
    client: C,
    adapters: Adapters,
    settings: Settings,
    ctx: DecodeContext,
    cache: TtlCache,
    snapshot: SnapshotStore,
}

impl<C: ChainReader> AnalyticsService<C> {
    pub fn new(client: C, adapters: Adapters, settings: Settings) -> Self {
        Self {
            ctx: DecodeContext::new(&settings),
            cache: TtlCache::new(&settings.cache),
            snapshot: SnapshotStore::new(&settings.snapshot_path),
            client,
            adapters,
            settings,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Return the cached value under `key`, or run `fetch` and cache it when complete
    async fn cached<T, Fut>(&self, key: &str, namespace: CacheNamespace, fetch: Fut) -> Fetched<Arc<T>>
    where
        T: Send + Sync + 'static,
        Fut: Future<Output = Fetched<T>>,
    {
        let outcome = self
            .cache
            .get_or_try_fetch(namespace, key, move || async move {
                let fetched = fetch.await;
                if fetched.is_complete() {
                    Ok(fetched.data)
                } else {
                    Err(fetched)
                }
            })
            .await;

        match outcome {
            Ok(data) => Fetched::complete(data),
            Err(degraded) => degraded.map(Arc::new),
        }
    }

    /// Logs of `kind` emitted by `address` over the last `days` days
    async fn recent_logs(
        &self,
        source: &str,
        address: Address,
        kind: EventKind,
        days: u32,
    ) -> Fetched<Vec<LogEntry>> {
        let target = Utc::now().timestamp() - i64::from(days) * 86_400;
        let from_block =
            block_for_timestamp(&self.client, target.max(0) as u64, self.settings.blocks_per_second)
                .await;

        let query = LogQuery {
            address,
            topic0: kind.topic0(),
        };
        let scan = fetch_logs(&self.client, &query, from_block, None, &self.settings.scan).await;
        let issues = FetchIssue::from_scan(source, &scan);

        Fetched::degraded(scan.logs, issues)
    }

    /// Resolve block times once per block, then decode and keep what `pick` accepts
    async fn decode_logs<T>(
        &self,
        mut logs: Vec<LogEntry>,
        pick: impl Fn(ChainEvent) -> Option<T>,
    ) -> Vec<T> {
        logs.sort_by_key(|log| (log.block_number, log.log_index));
        let times = block_times(&self.client, &logs, self.settings.scan.timestamp_delay).await;

        logs.iter()
            .filter_map(|log| {
                let timestamp = times.get(&log.block_number).copied().unwrap_or_else(Utc::now);
                match decode_event(log, &self.ctx, timestamp) {
                    Ok(event) => pick(event),
                    Err(err) => {
                        tracing::warn!(block = log.block_number, tx = %log.tx_hash, "Skipping log: {err}");
                        None
                    }
                }
            })
            .collect()
    }

    async fn token_transfers(&self, token: &TrackedToken, days: u32) -> Fetched<Vec<DecodedTransfer>> {
        let source = format!("{} transfers", token.name);
        let logs = self.recent_logs(&source, token.address, EventKind::Transfer, days).await;

        let transfers = self
            .decode_logs(logs.data, |event| match event {
                ChainEvent::Transfer(transfer) => Some(transfer),
                _ => None,
            })
            .await;

        Fetched::degraded(transfers, logs.issues)
    }

    /// Logs of `kinds` across every configured market
    async fn market_logs(&self, kinds: &[EventKind], days: u32) -> Fetched<Vec<LogEntry>> {
        let mut logs = Vec::new();
        let mut issues = Vec::new();

        for market in &self.settings.markets {
            for kind in kinds {
                let source = format!("{} {kind:?} events", market.label);
                let fetched = self.recent_logs(&source, market.address, *kind, days).await;
                logs.extend(fetched.data);
                issues.extend(fetched.issues);
            }
        }

        Fetched::degraded(logs, issues)
    }

    pub async fn nlp_transfers(&self, days: u32) -> Shared<DecodedTransfer> {
        let days = self.settings.lookback_days(Some(days));
        let key = format!("nlp_transfers_{days}");

        self.cached(&key, CacheNamespace::Recent, self.token_transfers(&self.settings.nlp, days))
            .await
    }

    pub async fn sy_transfers(&self, days: u32) -> Shared<DecodedTransfer> {
        let days = self.settings.lookback_days(Some(days));
        let key = format!("sy_transfers_{days}");

        self.cached(&key, CacheNamespace::Recent, self.token_transfers(&self.settings.sy, days))
            .await
    }

    pub async fn market_swaps(&self, days: u32) -> Shared<SwapEvent> {
        let days = self.settings.lookback_days(Some(days));
        let key = format!("pendle_swaps_{days}");

        self.cached(&key, CacheNamespace::Recent, async {
            let logs = self.market_logs(&[EventKind::Swap], days).await;
            let swaps = self
                .decode_logs(logs.data, |event| match event {
                    ChainEvent::Swap(swap) => Some(swap),
                    _ => None,
                })
                .await;
            Fetched::degraded(swaps, logs.issues)
        })
        .await
    }

    pub async fn lp_events(&self, days: u32) -> Shared<LpEvent> {
        let days = self.settings.lookback_days(Some(days));
        let key = format!("pendle_lp_{days}");

        self.cached(&key, CacheNamespace::Recent, async {
            let logs = self.market_logs(&[EventKind::Mint, EventKind::Burn], days).await;
            let events = self
                .decode_logs(logs.data, |event| match event {
                    ChainEvent::Lp(event) => Some(event),
                    _ => None,
                })
                .await;
            Fetched::degraded(events, logs.issues)
        })
        .await
    }

    pub async fn reward_claims(&self, days: u32) -> Shared<RewardClaim> {
        let days = self.settings.lookback_days(Some(days));
        let key = format!("rewards_{days}");

        self.cached(&key, CacheNamespace::Recent, async {
            let logs = self.market_logs(&[EventKind::RedeemRewards], days).await;
            let claims = self
                .decode_logs(logs.data, |event| match event {
                    ChainEvent::RewardClaim(claim) => Some(claim),
                    _ => None,
                })
                .await;
            Fetched::degraded(claims, logs.issues)
        })
        .await
    }

    /// Instantaneous wNLP `totalSupply()`, bypassing the windowed curve
    pub async fn on_chain_supply(&self) -> Fetched<Option<BigDecimal>> {
        let token = &self.settings.nlp;
        let supply = self
            .cache
            .get_or_try_fetch(CacheNamespace::Recent, "nlp_total_supply", || async {
                let raw = self.client.total_supply(token.address).await?;
                Ok::<_, listener::AppError>(scale_amount(raw, token.decimals))
            })
            .await;

        match supply {
            Ok(supply) => Fetched::complete(Some(supply.as_ref().clone())),
            Err(err) => {
                tracing::warn!(token = token.name, "Cannot read total supply: {err}");
                Fetched::degraded(
                    None,
                    vec![FetchIssue::ChainRead {
                        source: format!("{} totalSupply", token.name),
                        reason: err.to_string(),
                    }],
                )
            }
        }
    }

    pub async fn daily_pendle_flows(&self, days: u32) -> Fetched<Vec<FlowRow>> {
        self.sy_transfers(days)
            .await
            .map(|transfers| aggregate::daily_flows(&transfers))
    }

    pub async fn daily_volume(&self, days: u32) -> Fetched<Vec<VolumeRow>> {
        self.market_swaps(days)
            .await
            .map(|swaps| aggregate::daily_volume(&swaps))
    }

    pub async fn nlp_tvl(&self, days: u32) -> Fetched<Vec<TvlRow>> {
        self.nlp_transfers(days)
            .await
            .map(|transfers| aggregate::tvl_curve(&transfers))
    }

    pub async fn daily_nlp_volume(&self, days: u32) -> Fetched<Vec<TransferVolumeRow>> {
        self.nlp_transfers(days)
            .await
            .map(|transfers| aggregate::daily_transfer_volume(&transfers))
    }

    pub async fn top_holders(&self, days: u32) -> Fetched<Vec<HolderRow>> {
        self.nlp_transfers(days)
            .await
            .map(|transfers| aggregate::top_holders(&transfers, TOP_HOLDERS))
    }

    pub async fn user_stats(&self, days: u32) -> Fetched<Vec<UserRow>> {
        let transfers = self.nlp_transfers(days).await;
        let swaps = self.market_swaps(days).await;

        transfers
            .zip(swaps)
            .map(|(transfers, swaps)| aggregate::user_stats(&transfers, &swaps))
    }

    pub async fn market_breakdown(&self, days: u32) -> Fetched<Vec<MarketBreakdownRow>> {
        let swaps = self.market_swaps(days).await;
        let lp_events = self.lp_events(days).await;

        swaps.zip(lp_events).map(|(swaps, lp_events)| {
            aggregate::market_breakdown(&self.settings.markets, &swaps, &lp_events)
        })
    }

    pub async fn kpi_summary(&self, days: u32) -> Fetched<KpiSummary> {
        let nlp = self.nlp_transfers(days).await;
        let sy = self.sy_transfers(days).await;
        let swaps = self.market_swaps(days).await;
        let supply = self.on_chain_supply().await;

        nlp.zip(sy).zip(swaps).zip(supply).map(|(((nlp, sy), swaps), supply)| {
            let inputs = KpiInputs {
                nlp_transfers: &nlp,
                sy_transfers: &sy,
                swaps: &swaps,
                on_chain_supply: supply,
            };
            aggregate::kpi_summary(&inputs, Utc::now())
        })
    }

    fn all_time_key(&self) -> &'static str {
        match self.settings.all_time.source {
            AllTimeSource::Rpc => RPC_CATEGORY,
            AllTimeSource::Explorer => EXPLORER_CATEGORY,
        }
    }

    /// Snapshot totals for the configured source; scans only when no snapshot exists yet
    pub async fn all_time_totals(&self) -> Fetched<Arc<AllTimeTotals>> {
        let category = self.all_time_key();
        let key = format!("all_time_{category}");

        self.cached(&key, CacheNamespace::AllTime, async {
            match self.snapshot.category(category).await {
                Some(totals) if !totals.is_empty() => self.stored_totals(totals).await,
                _ => self.run_all_time_refresh().await,
            }
        })
        .await
    }

    /// A stored RPC snapshot that has fallen behind is served with a warning
    async fn stored_totals(&self, totals: AllTimeTotals) -> Fetched<AllTimeTotals> {
        if self.settings.all_time.source != AllTimeSource::Rpc {
            return Fetched::complete(totals);
        }

        let head = current_block(&self.client).await;
        if head == 0 {
            return Fetched::complete(totals);
        }

        let issues = all_time::lagging_contracts(&totals, head, &self.settings);
        Fetched::degraded(totals, issues)
    }

    /// Recompute all-time totals now, updating snapshot and cache
    pub async fn refresh_all_time(&self) -> Fetched<Arc<AllTimeTotals>> {
        let key = format!("all_time_{}", self.all_time_key());
        self.cache.remove(CacheNamespace::AllTime, &key).await;

        self.cached(&key, CacheNamespace::AllTime, self.run_all_time_refresh())
            .await
    }

    async fn run_all_time_refresh(&self) -> Fetched<AllTimeTotals> {
        tracing::info!(source = self.all_time_key(), "Refreshing all-time totals");

        match self.settings.all_time.source {
            AllTimeSource::Rpc => {
                all_time::refresh_from_rpc(&self.client, &self.settings, &self.snapshot).await
            }
            AllTimeSource::Explorer => {
                all_time::refresh_from_explorer(&self.adapters.explorer, &self.settings, &self.snapshot)
                    .await
            }
        }
    }

    /// Drop every cached dataset; with `reset_snapshot`, also forget all-time progress
    pub async fn refresh(&self, reset_snapshot: bool) -> Result<(), AppError> {
        self.cache.clear();
        tracing::info!(reset_snapshot, "Cache cleared");

        if reset_snapshot {
            self.snapshot.reset().await?;
        }

        Ok(())
    }

    fn adapter_issue(source: &str, err: &AdapterError) -> FetchIssue {
        tracing::warn!(source, "Adapter failed: {err}");
        FetchIssue::Adapter {
            source: source.to_string(),
            reason: err.to_string(),
        }
    }

    async fn cached_external<T, Fut>(&self, key: &str, source: &str, fetch: Fut) -> Shared<T>
    where
        T: Send + Sync + 'static,
        Fut: Future<Output = Result<Vec<T>, AdapterError>>,
    {
        self.cached(key, CacheNamespace::External, async {
            match fetch.await {
                Ok(rows) => Fetched::complete(rows),
                Err(err) => Fetched::degraded(Vec::new(), vec![Self::adapter_issue(source, &err)]),
            }
        })
        .await
    }

    pub async fn market_yields(&self) -> Shared<YieldRow> {
        self.cached_external(
            "pendle_yields",
            "yield markets",
            self.adapters.pendle.market_yields(&self.settings.markets),
        )
        .await
    }

    pub async fn notional_volume(&self, coin: &str, interval: &str, days: u32) -> Shared<NotionalRow> {
        let days = self.settings.lookback_days(Some(days));
        let key = format!("candles_{coin}_{interval}_{days}");

        self.cached_external(
            &key,
            "candles",
            self.adapters
                .hyperliquid
                .daily_notional(coin, interval, days, Utc::now()),
        )
        .await
    }

    pub async fn testnet_stats(&self) -> Shared<TestnetRow> {
        self.cached_external("testnet_stats", "testnet analytics", self.adapters.testnet.season_rows())
            .await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use alloy::primitives::{address, Address, I256, U256};
    use listener::testing::MockChain;

    use super::*;
    use crate::events::{
        fixtures::{log, topic_for, words},
        topics,
    };

    const HEAD: u64 = 100_000;
    const ALICE: Address = address!("00000000000000000000000000000000000000a1");
    const BOB: Address = address!("00000000000000000000000000000000000000b2");

    fn e18(units: u64) -> U256 {
        U256::from(units) * U256::from(10).pow(U256::from(18))
    }

    fn settings(test: &str) -> Settings {
        let mut settings = Settings::default();
        settings.scan.request_delay = Duration::ZERO;
        settings.scan.timestamp_delay = Duration::ZERO;
        settings.scan.batch_size = 5_000;
        settings.snapshot_path = std::env::temp_dir()
            .join(format!("processor-service-{}-{test}", std::process::id()))
            .join("all_time_totals.json");
        settings
    }

    /// Head stamped at the current wall clock, two seconds per block
    fn chain() -> MockChain {
        let now = Utc::now().timestamp() as u64;
        MockChain::new(HEAD).with_clock(now - HEAD * 2, 2)
    }

    fn service(chain: MockChain, settings: Settings) -> AnalyticsService<MockChain> {
        let adapters = Adapters::new(&settings).unwrap();
        AnalyticsService::new(chain, adapters, settings)
    }

    fn transfer_log(token: Address, block: u64, from: Address, to: Address, units: u64) -> LogEntry {
        log(
            token,
            block,
            vec![topics::TRANSFER, topic_for(from), topic_for(to)],
            words(&[e18(units)]),
        )
    }

    fn swap_log(market: Address, block: u64, caller: Address, sy_out: i64) -> LogEntry {
        let sy_out = I256::try_from(sy_out).unwrap() * I256::try_from(10u64.pow(18)).unwrap();
        log(
            market,
            block,
            vec![topics::SWAP, topic_for(caller), topic_for(caller)],
            words(&[(-sy_out).into_raw(), sy_out.into_raw(), e18(1) / U256::from(10)]),
        )
    }

    #[tokio::test]
    async fn test_second_read_within_ttl_hits_cache() {
        let settings = settings("cache");
        let nlp = settings.nlp.address;
        let chain = chain().with_logs(vec![transfer_log(nlp, 99_000, Address::ZERO, ALICE, 5)]);
        let service = service(chain, settings);

        let first = service.nlp_transfers(1).await;
        let requests = service.client.requested_windows().len();
        let second = service.nlp_transfers(1).await;

        assert!(first.is_complete());
        assert_eq!(first.data.len(), 1);
        assert!(Arc::ptr_eq(&first.data, &second.data));
        assert_eq!(service.client.requested_windows().len(), requests);
    }

    #[tokio::test]
    async fn test_degraded_fetch_is_retried() {
        let settings = settings("degraded");
        let chain = chain().rejecting_logs();
        let service = service(chain, settings);

        let first = service.sy_transfers(1).await;
        let requests = service.client.requested_windows().len();
        let second = service.sy_transfers(1).await;

        assert!(!first.is_complete());
        assert!(first.data.is_empty());
        assert_eq!(second.warnings().len(), requests);
        assert_eq!(service.client.requested_windows().len(), requests * 2);
    }

    #[tokio::test]
    async fn test_offline_node_yields_empty_series_with_warning() {
        let service = service(MockChain::offline(), settings("offline"));

        let tvl = service.nlp_tvl(7).await;

        assert!(tvl.data.is_empty());
        assert!(matches!(tvl.issues[0], FetchIssue::HeadUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_kpi_summary_from_chain() {
        let settings = settings("kpi");
        let market = settings.markets[0].address;
        let chain = chain()
            .with_logs(vec![
                transfer_log(settings.nlp.address, 98_000, Address::ZERO, ALICE, 100),
                transfer_log(settings.nlp.address, 98_500, ALICE, BOB, 30),
                transfer_log(settings.nlp.address, 99_000, BOB, Address::ZERO, 10),
                transfer_log(settings.sy.address, 98_200, Address::ZERO, ALICE, 40),
                swap_log(market, 99_500, ALICE, 12),
            ])
            .with_total_supply(settings.nlp.address, e18(1_000));
        let service = service(chain, settings);

        let kpi = service.kpi_summary(1).await;

        assert!(kpi.is_complete(), "{:?}", kpi.warnings());
        assert_eq!(kpi.data.tvl, BigDecimal::from(90));
        assert_eq!(kpi.data.on_chain_supply, Some(BigDecimal::from(1_000)));
        assert_eq!(kpi.data.volume_7d, BigDecimal::from(12));
        assert_eq!(kpi.data.total_users, 2);
        assert_eq!(kpi.data.pendle_deposits, BigDecimal::from(40));

        // Timestamps resolved once per distinct block across all fetches
        let lookups = service.client.timestamp_lookups();
        assert_eq!(lookups.iter().filter(|block| **block == 98_000).count(), 1);
    }

    #[tokio::test]
    async fn test_market_breakdown_tags_markets() {
        let settings = settings("markets");
        let second = settings.markets[1].address;
        let chain = chain().with_logs(vec![swap_log(second, 99_900, BOB, -3)]);
        let service = service(chain, settings);

        let rows = service.market_breakdown(1).await.data;

        assert_eq!(rows[0].num_swaps, 0);
        assert_eq!(rows[1].market, "25 Jun 2026");
        assert_eq!(rows[1].volume, BigDecimal::from(3));
    }

    #[tokio::test]
    async fn test_refresh_clears_cache() {
        let settings = settings("refresh");
        let service = service(chain(), settings);

        service.nlp_transfers(1).await;
        let requests = service.client.requested_windows().len();

        service.refresh(false).await.unwrap();
        service.nlp_transfers(1).await;

        assert_eq!(service.client.requested_windows().len(), requests * 2);
    }

    #[tokio::test]
    async fn test_all_time_served_from_snapshot_after_first_scan() {
        let settings = settings("all-time");
        let path = settings.snapshot_path.clone();
        let nlp = settings.nlp.address;
        let chain = MockChain::new(2_000).with_logs(vec![transfer_log(nlp, 10, Address::ZERO, ALICE, 3)]);
        let service = service(chain, settings);

        let first = service.all_time_totals().await;
        assert!(first.is_complete());
        assert_eq!(first.data.contracts["wNLP"].deposits, BigDecimal::from(3));

        service.refresh(false).await.unwrap();
        let requests = service.client.requested_windows().len();
        let second = service.all_time_totals().await;

        assert_eq!(second.data.contracts["wNLP"].last_scanned_block, Some(2_000));
        assert_eq!(service.client.requested_windows().len(), requests);

        service.refresh(true).await.unwrap();
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }

    #[tokio::test]
    async fn test_lagging_snapshot_is_served_with_warning() {
        let mut settings = settings("lagging");
        settings.all_time.max_windows = 1;
        let path = settings.snapshot_path.clone();
        let nlp = settings.nlp.address;
        let chain = chain().with_logs(vec![transfer_log(nlp, 10, Address::ZERO, ALICE, 3)]);
        let service = service(chain, settings);

        // One window of 5_000 blocks per refresh against a head of 100_000
        let scanned = service.all_time_totals().await;
        assert!(!scanned.is_complete());
        assert_eq!(scanned.data.contracts["wNLP"].last_scanned_block, Some(5_000));

        let served = service.all_time_totals().await;
        assert!(!served.is_complete());
        assert_eq!(served.data.contracts["wNLP"].deposits, BigDecimal::from(3));
        assert!(served
            .warnings()
            .iter()
            .any(|warning| warning.contains("wNLP all-time: scanned to block 5000 of 100000")));

        service.refresh(true).await.unwrap();
        let _ = std::fs::remove_dir_all(path.parent().unwrap());
    }
}
