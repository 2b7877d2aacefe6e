//! Process settings
//!
//! Every value comes from an environment variable with a compiled-in default,
//! so a bare `cargo run` talks to the public HyperEVM endpoint with the
//! deployed Nunchi contracts.

use std::{env, path::PathBuf, str::FromStr, time::Duration};

use alloy::primitives::{address, Address};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{entity::LabelSet, error::StoreError};

mod defaults {
    use alloy::primitives::{address, Address};

    pub const RPC_URL: &str = "https://hyperliquid.drpc.org";
    pub const CHAIN_ID: u64 = 999;
    // HyperEVM produces a block roughly every 2 seconds
    pub const BLOCKS_PER_SECOND: f64 = 0.5;

    pub const LOG_BATCH_SIZE: u64 = 900;
    pub const RPC_DELAY_MS: u64 = 100;
    pub const TIMESTAMP_DELAY_MS: u64 = 50;
    pub const MAX_RETRIES: u32 = 3;

    pub const CACHE_TTL_SECS: u64 = 300;
    pub const ALL_TIME_CACHE_TTL_SECS: u64 = 3600;
    pub const EXTERNAL_CACHE_TTL_SECS: u64 = 600;
    pub const CACHE_MAX_ENTRIES: usize = 100;

    pub const SNAPSHOT_PATH: &str = "data/all_time_totals.json";
    pub const DEFAULT_DAYS: u32 = 1;
    pub const MAX_DAYS: u32 = 90;
    pub const TOKEN_DECIMALS: u8 = 18;

    pub const WNLP: Address = address!("4Cc221cf1444333510a634CE0D8209D2D11B9bbA");
    pub const SY_WNLP: Address = address!("9b7430dB2C59247E861702B5C85131eEaf03aED3");

    pub const ALL_TIME_MAX_WINDOWS: u64 = 500;
    pub const ALL_TIME_REFRESH_SECS: u64 = 900;

    pub const HTTP_TIMEOUT_SECS: u64 = 30;
    pub const PENDLE_API_URL: &str = "https://api-v2.pendle.finance/core";
    pub const HYPERLIQUID_API_URL: &str = "https://api.hyperliquid.xyz/info";
    pub const EXPLORER_API_URL: &str = "https://www.hyperscan.com/api/v2";
    pub const EXPLORER_MAX_PAGES: u32 = 200;
}

/// A token whose Transfer events are scanned and classified.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedToken {
    pub name: String,
    pub address: Address,
    /// Labels given to zero-address transfers of this token
    pub labels: LabelSet,
    pub decimals: u8,
    /// First block worth scanning for all-time totals
    pub deployment_block: u64,
}

/// A Pendle market deployment for wNLP.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Market {
    /// Human label, e.g. "26 Dec 2025"
    pub label: String,
    pub address: Address,
    pub pt: Address,
    #[serde(default)]
    pub yt: Option<Address>,
    pub expiry: NaiveDate,
    /// Decimals of the SY amounts reported by the market's events
    #[serde(default = "default_decimals")]
    pub decimals: u8,
}

fn default_decimals() -> u8 {
    defaults::TOKEN_DECIMALS
}

/// Where all-time totals come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllTimeSource {
    /// Incremental `eth_getLogs` scan resumed from the persisted marker
    Rpc,
    /// Full re-fetch of the explorer's transfer listing on every refresh
    Explorer,
}

impl FromStr for AllTimeSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "rpc" => Ok(Self::Rpc),
            "explorer" | "hyperscan" => Ok(Self::Explorer),
            other => Err(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScanSettings {
    /// Blocks added to the start of a window to get its end (inclusive)
    pub batch_size: u64,
    pub request_delay: Duration,
    pub timestamp_delay: Duration,
    pub max_retries: u32,
}

#[derive(Debug, Clone)]
pub struct CacheSettings {
    pub recent_ttl: Duration,
    pub all_time_ttl: Duration,
    pub external_ttl: Duration,
    pub max_entries: usize,
}


#[derive(Debug, Clone)]
pub struct AllTimeSettings {
    pub source: AllTimeSource,
    /// Upper bound on windows scanned per refresh; progress is persisted between runs
    pub max_windows: u64,
    pub refresh_interval: Duration,
}

#[derive(Debug, Clone)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub pendle_api_url: String,
    pub hyperliquid_api_url: String,
    pub testnet_api_url: Option<String>,
    pub explorer_api_url: String,
    pub explorer_max_pages: u32,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub rpc_url: String,
    pub chain_id: u64,
    pub blocks_per_second: f64,
    pub scan: ScanSettings,
    pub cache: CacheSettings,
    pub snapshot_path: PathBuf,
    pub default_days: u32,
    pub max_days: u32,
    /// wNLP, the base liquidity token (mint/burn labels)
    pub nlp: TrackedToken,
    /// SY-wNLP, the Pendle yield wrapper (deposit/withdrawal labels)
    pub sy: TrackedToken,
    pub markets: Vec<Market>,
    pub all_time: AllTimeSettings,
    pub http: HttpSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rpc_url: defaults::RPC_URL.to_string(),
            chain_id: defaults::CHAIN_ID,
            blocks_per_second: defaults::BLOCKS_PER_SECOND,
            scan: ScanSettings {
                batch_size: defaults::LOG_BATCH_SIZE,
                request_delay: Duration::from_millis(defaults::RPC_DELAY_MS),
                timestamp_delay: Duration::from_millis(defaults::TIMESTAMP_DELAY_MS),
                max_retries: defaults::MAX_RETRIES,
            },
            cache: CacheSettings {
                recent_ttl: Duration::from_secs(defaults::CACHE_TTL_SECS),
                all_time_ttl: Duration::from_secs(defaults::ALL_TIME_CACHE_TTL_SECS),
                external_ttl: Duration::from_secs(defaults::EXTERNAL_CACHE_TTL_SECS),
                max_entries: defaults::CACHE_MAX_ENTRIES,
            },
            snapshot_path: PathBuf::from(defaults::SNAPSHOT_PATH),
            default_days: defaults::DEFAULT_DAYS,
            max_days: defaults::MAX_DAYS,
            nlp: TrackedToken {
                name: "wNLP".to_string(),
                address: defaults::WNLP,
                labels: LabelSet::Supply,
                decimals: defaults::TOKEN_DECIMALS,
                deployment_block: 0,
            },
            sy: TrackedToken {
                name: "SY_wNLP".to_string(),
                address: defaults::SY_WNLP,
                labels: LabelSet::Vault,
                decimals: defaults::TOKEN_DECIMALS,
                deployment_block: 0,
            },
            markets: default_markets(),
            all_time: AllTimeSettings {
                source: AllTimeSource::Rpc,
                max_windows: defaults::ALL_TIME_MAX_WINDOWS,
                refresh_interval: Duration::from_secs(defaults::ALL_TIME_REFRESH_SECS),
            },
            http: HttpSettings {
                timeout: Duration::from_secs(defaults::HTTP_TIMEOUT_SECS),
                pendle_api_url: defaults::PENDLE_API_URL.to_string(),
                hyperliquid_api_url: defaults::HYPERLIQUID_API_URL.to_string(),
                testnet_api_url: None,
                explorer_api_url: defaults::EXPLORER_API_URL.to_string(),
                explorer_max_pages: defaults::EXPLORER_MAX_PAGES,
            },
        }
    }
}

fn default_markets() -> Vec<Market> {
    vec![
        Market {
            label: "26 Dec 2025".to_string(),
            address: address!("07a50aEc9B49cD605e66B0cA7e39d781E6Ae0b79"),
            pt: address!("17a885bb988353f430141890b41f787debc3e107"),
            yt: Some(address!("1f6EA7A91477523b9EAD6DB13f1373eAEB312952")),
            expiry: NaiveDate::from_ymd_opt(2025, 12, 26).unwrap_or_default(),
            decimals: defaults::TOKEN_DECIMALS,
        },
        Market {
            label: "25 Jun 2026".to_string(),
            address: address!("c1ef65d86f82d5a8160b577a150f65d52d6b266f"),
            pt: address!("4eb660811bcb71174b04a1f102f784efe794a66b"),
            yt: None,
            expiry: NaiveDate::from_ymd_opt(2026, 6, 25).unwrap_or_default(),
            decimals: defaults::TOKEN_DECIMALS,
        },
    ]
}

/// Parse `key` from the environment, falling back to `default` when unset.
fn var_or<T: FromStr>(key: &str, default: T) -> Result<T, StoreError> {
    match env::var(key) {
        Ok(raw) => raw.trim().parse::<T>().map_err(|_| StoreError::InvalidSetting {
            key: key.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, StoreError> {
        let base = Self::default();

        let token_decimals = var_or("TOKEN_DECIMALS", defaults::TOKEN_DECIMALS)?;

        let markets = match env::var("PENDLE_MARKETS") {
            Ok(raw) => serde_json::from_str::<Vec<Market>>(&raw).map_err(|_| {
                StoreError::InvalidSetting {
                    key: "PENDLE_MARKETS".to_string(),
                    value: raw,
                }
            })?,
            Err(_) => base
                .markets
                .into_iter()
                .map(|market| Market {
                    decimals: token_decimals,
                    ..market
                })
                .collect(),
        };

        let testnet_api_url = env::var("TESTNET_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty());

        Ok(Self {
            rpc_url: var_or("RPC_URL", base.rpc_url)?,
            chain_id: var_or("CHAIN_ID", base.chain_id)?,
            blocks_per_second: var_or("BLOCKS_PER_SECOND", base.blocks_per_second)?,
            scan: ScanSettings {
                batch_size: var_or("LOG_BATCH_SIZE", defaults::LOG_BATCH_SIZE)?,
                request_delay: Duration::from_millis(var_or(
                    "RPC_DELAY_MS",
                    defaults::RPC_DELAY_MS,
                )?),
                timestamp_delay: Duration::from_millis(var_or(
                    "TIMESTAMP_DELAY_MS",
                    defaults::TIMESTAMP_DELAY_MS,
                )?),
                max_retries: var_or("MAX_RETRIES", defaults::MAX_RETRIES)?,
            },
            cache: CacheSettings {
                recent_ttl: Duration::from_secs(var_or("CACHE_TTL_SECS", defaults::CACHE_TTL_SECS)?),
                all_time_ttl: Duration::from_secs(var_or(
                    "ALL_TIME_CACHE_TTL_SECS",
                    defaults::ALL_TIME_CACHE_TTL_SECS,
                )?),
                external_ttl: Duration::from_secs(var_or(
                    "EXTERNAL_CACHE_TTL_SECS",
                    defaults::EXTERNAL_CACHE_TTL_SECS,
                )?),
                max_entries: var_or("CACHE_MAX_ENTRIES", defaults::CACHE_MAX_ENTRIES)?,
            },
            snapshot_path: var_or("SNAPSHOT_PATH", base.snapshot_path)?,
            default_days: var_or("DEFAULT_DAYS", base.default_days)?,
            max_days: var_or("MAX_DAYS", base.max_days)?,
            nlp: TrackedToken {
                address: var_or("WNLP_ADDRESS", base.nlp.address)?,
                decimals: token_decimals,
                deployment_block: var_or("WNLP_DEPLOY_BLOCK", base.nlp.deployment_block)?,
                ..base.nlp
            },
            sy: TrackedToken {
                address: var_or("SY_WNLP_ADDRESS", base.sy.address)?,
                decimals: token_decimals,
                deployment_block: var_or("SY_WNLP_DEPLOY_BLOCK", base.sy.deployment_block)?,
                ..base.sy
            },
            markets,
            all_time: AllTimeSettings {
                source: var_or("ALL_TIME_SOURCE", base.all_time.source)?,
                max_windows: var_or("ALL_TIME_MAX_WINDOWS", base.all_time.max_windows)?,
                refresh_interval: Duration::from_secs(var_or(
                    "ALL_TIME_REFRESH_SECS",
                    defaults::ALL_TIME_REFRESH_SECS,
                )?),
            },
            http: HttpSettings {
                timeout: Duration::from_secs(var_or(
                    "HTTP_TIMEOUT_SECS",
                    defaults::HTTP_TIMEOUT_SECS,
                )?),
                pendle_api_url: var_or("PENDLE_API_URL", base.http.pendle_api_url)?,
                hyperliquid_api_url: var_or("HYPERLIQUID_API_URL", base.http.hyperliquid_api_url)?,
                testnet_api_url,
                explorer_api_url: var_or("EXPLORER_API_URL", base.http.explorer_api_url)?,
                explorer_max_pages: var_or("EXPLORER_MAX_PAGES", base.http.explorer_max_pages)?,
            },
        })
    }

    /// Tokens scanned for all-time totals, in reporting order.
    pub fn tracked_tokens(&self) -> [&TrackedToken; 2] {
        [&self.nlp, &self.sy]
    }

    /// Clamp a requested lookback to `1..=max_days`, using the default when absent.
    pub fn lookback_days(&self, requested: Option<u32>) -> u32 {
        requested
            .unwrap_or(self.default_days)
            .clamp(1, self.max_days.max(1))
    }
}
