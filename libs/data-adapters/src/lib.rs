//! Third-party data sources
//!
//! Each adapter wraps one HTTP API and normalises its response into the row
//! shapes in [`analytics_store::entity::series`]. Transport and decode
//! failures come back as [`AdapterError`]; callers decide how to degrade.

pub mod error;
pub mod explorer;
pub mod hyperliquid;
pub mod pendle;
pub mod testnet;

pub use error::AdapterError;
pub use explorer::{ExplorerClient, ExplorerListing, ExplorerTransfer};
pub use hyperliquid::HyperliquidClient;
pub use pendle::PendleClient;
pub use testnet::TestnetClient;

use analytics_store::Settings;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;

/// Every adapter, sharing one connection pool
#[derive(Debug, Clone)]
pub struct Adapters {
    pub pendle: PendleClient,
    pub hyperliquid: HyperliquidClient,
    pub testnet: TestnetClient,
    pub explorer: ExplorerClient,
}

impl Adapters {
    pub fn new(settings: &Settings) -> Result<Self, AdapterError> {
        let http = reqwest::Client::builder()
            .timeout(settings.http.timeout)
            .user_agent(concat!("nlp-analytics/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            pendle: PendleClient::new(http.clone(), &settings.http.pendle_api_url, settings.chain_id),
            hyperliquid: HyperliquidClient::new(http.clone(), &settings.http.hyperliquid_api_url),
            testnet: TestnetClient::new(http.clone(), settings.http.testnet_api_url.as_deref()),
            explorer: ExplorerClient::new(
                http,
                &settings.http.explorer_api_url,
                settings.http.explorer_max_pages,
            ),
        })
    }
}

/// Check the status and decode the JSON body of `response`
pub(crate) async fn read_json<T: DeserializeOwned>(
    source_name: &'static str,
    response: Result<Response, reqwest::Error>,
) -> Result<T, AdapterError> {
    let response = response.map_err(|error| AdapterError::Http { source_name, error })?;

    let status = response.status();
    if status != StatusCode::OK {
        return Err(AdapterError::Status {
            source_name,
            status: status.as_u16(),
        });
    }

    let body = response
        .bytes()
        .await
        .map_err(|error| AdapterError::Http { source_name, error })?;

    serde_json::from_slice(&body).map_err(|err| AdapterError::Decode {
        source_name,
        reason: err.to_string(),
    })
}

/// Numbers some APIs send as strings
pub(crate) mod lenient {
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(f64),
        Text(String),
        Missing(()),
    }

    pub fn f64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Ok(match Raw::deserialize(deserializer)? {
            Raw::Number(value) => value,
            Raw::Text(text) => text.trim().parse().unwrap_or_default(),
            Raw::Missing(()) => 0.0,
        })
    }

    pub fn u64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        f64(deserializer).map(|value| value.max(0.0) as u64)
    }
}
