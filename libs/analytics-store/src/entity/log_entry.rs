use alloy::{
    primitives::{Address, Bytes, B256},
    rpc::types::Log,
};
use serde::{Deserialize, Serialize};

/// LogEntry as returned by `eth_getLogs`, before any decoding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub block_number: u64,
    pub tx_hash: B256,
    pub log_index: u32,
    /// Emitting contract
    pub address: Address,
    /// topics[0] is the event signature; up to three indexed arguments follow
    pub topics: Vec<B256>,
    pub data: Bytes,
}

impl LogEntry {
    pub fn topic0(&self) -> Option<&B256> {
        self.topics.first()
    }

    pub fn topic(&self, index: usize) -> Option<&B256> {
        self.topics.get(index)
    }
}

impl From<Log> for LogEntry {
    fn from(log: Log) -> Self {
        Self {
            block_number: log.block_number.unwrap_or_default(),
            tx_hash: log.transaction_hash.unwrap_or_default(),
            log_index: log.log_index.unwrap_or_default() as u32,
            address: log.inner.address,
            topics: log.inner.data.topics().to_vec(),
            data: log.inner.data.data.clone(),
        }
    }
}
