//! Scripted node for tests
//!
//! `MockChain` answers from an in-memory log list and records every request so
//! tests can assert on pagination, timestamp batching and cache hits.

use std::{
    collections::{HashMap, HashSet},
    sync::{Mutex, MutexGuard, PoisonError},
};

use alloy::primitives::{Address, U256};
use analytics_store::entity::LogEntry;

use crate::{
    client::ChainReader,
    error::AppError,
    service::{BlockWindow, LogQuery},
};

#[derive(Debug, Default)]
struct Calls {
    windows: Vec<BlockWindow>,
    timestamp_lookups: Vec<u64>,
    supply_lookups: usize,
}

pub struct MockChain {
    head: Option<u64>,
    genesis_time: u64,
    seconds_per_block: u64,
    logs: Vec<LogEntry>,
    failing: HashSet<(u64, u64)>,
    reject_logs: bool,
    supplies: HashMap<Address, U256>,
    calls: Mutex<Calls>,
}

impl MockChain {
    pub fn new(head: u64) -> Self {
        Self {
            head: Some(head),
            genesis_time: 1_700_000_000,
            seconds_per_block: 2,
            logs: Vec::new(),
            failing: HashSet::new(),
            reject_logs: false,
            supplies: HashMap::new(),
            calls: Mutex::new(Calls::default()),
        }
    }

    /// Every call fails
    pub fn offline() -> Self {
        Self {
            head: None,
            ..Self::new(0)
        }
    }

    /// Block `n` is stamped `genesis_time + n * seconds_per_block`
    pub fn with_clock(mut self, genesis_time: u64, seconds_per_block: u64) -> Self {
        self.genesis_time = genesis_time;
        self.seconds_per_block = seconds_per_block;
        self
    }

    pub fn with_logs(mut self, logs: Vec<LogEntry>) -> Self {
        self.logs.extend(logs);
        self
    }

    pub fn failing_window(mut self, from: u64, to: u64) -> Self {
        self.failing.insert((from, to));
        self
    }

    /// Head and timestamps answer, every log request fails
    pub fn rejecting_logs(mut self) -> Self {
        self.reject_logs = true;
        self
    }

    pub fn with_total_supply(mut self, token: Address, supply: U256) -> Self {
        self.supplies.insert(token, supply);
        self
    }

    fn calls(&self) -> MutexGuard<'_, Calls> {
        self.calls.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Windows passed to `logs`, in call order
    pub fn requested_windows(&self) -> Vec<BlockWindow> {
        self.calls().windows.clone()
    }

    pub fn timestamp_lookups(&self) -> Vec<u64> {
        self.calls().timestamp_lookups.clone()
    }

    pub fn supply_lookups(&self) -> usize {
        self.calls().supply_lookups
    }

    fn offline_error() -> AppError {
        AppError::RpcError("connection refused".to_string())
    }
}

impl ChainReader for MockChain {
    async fn block_number(&self) -> Result<u64, AppError> {
        self.head.ok_or_else(Self::offline_error)
    }

    async fn block_timestamp(&self, block: u64) -> Result<Option<u64>, AppError> {
        self.calls().timestamp_lookups.push(block);

        let head = self.head.ok_or_else(Self::offline_error)?;
        Ok((block <= head).then(|| self.genesis_time + block * self.seconds_per_block))
    }

    async fn logs(&self, query: &LogQuery, window: BlockWindow) -> Result<Vec<LogEntry>, AppError> {
        self.calls().windows.push(window);

        if self.head.is_none()
            || self.reject_logs
            || self.failing.contains(&(window.from, window.to))
        {
            return Err(AppError::RpcError(format!(
                "window {}-{} rejected",
                window.from, window.to
            )));
        }

        Ok(self
            .logs
            .iter()
            .filter(|log| log.address == query.address)
            .filter(|log| log.topic0() == Some(&query.topic0))
            .filter(|log| (window.from..=window.to).contains(&log.block_number))
            .cloned()
            .collect())
    }

    async fn total_supply(&self, token: Address) -> Result<U256, AppError> {
        self.calls().supply_lookups += 1;

        self.head.ok_or_else(Self::offline_error)?;
        Ok(self.supplies.get(&token).copied().unwrap_or_default())
    }
}
