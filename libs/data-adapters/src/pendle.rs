//! Yield-market listing
//!
//! `GET {base}/v1/{chain_id}/markets/active` lists every active market on the
//! chain; only the configured ones are kept and labelled by configuration.

use alloy::primitives::Address;
use analytics_store::{entity::series::YieldRow, Market};
use reqwest::Client;
use serde::Deserialize;

use crate::{lenient, read_json, AdapterError};

const SOURCE: &str = "pendle";

#[derive(Debug, Deserialize)]
pub(crate) struct MarketList {
    #[serde(default)]
    markets: Vec<ListedMarket>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListedMarket {
    address: String,
    #[serde(default)]
    expiry: Option<String>,
    #[serde(default)]
    details: MarketDetails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketDetails {
    #[serde(default, deserialize_with = "lenient::f64")]
    liquidity: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    implied_apy: f64,
    #[serde(default, deserialize_with = "lenient::f64")]
    underlying_apy: f64,
}

#[derive(Debug, Clone)]
pub struct PendleClient {
    http: Client,
    base_url: String,
    chain_id: u64,
}

impl PendleClient {
    pub fn new(http: Client, base_url: &str, chain_id: u64) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            chain_id,
        }
    }

    /// Current liquidity and APYs of `markets`, in configuration order
    pub async fn market_yields(&self, markets: &[Market]) -> Result<Vec<YieldRow>, AdapterError> {
        let url = format!("{}/v1/{}/markets/active", self.base_url, self.chain_id);
        tracing::debug!(url, "Fetching yield markets");

        let listing: MarketList = read_json(SOURCE, self.http.get(&url).send().await).await?;
        Ok(yield_rows(listing, markets))
    }
}

pub(crate) fn yield_rows(listing: MarketList, markets: &[Market]) -> Vec<YieldRow> {
    markets
        .iter()
        .filter_map(|market| {
            let listed = listing
                .markets
                .iter()
                .find(|listed| same_address(&listed.address, &market.address))?;

            Some(YieldRow {
                market: market.label.clone(),
                address: market.address.to_string(),
                expiry: listed
                    .expiry
                    .clone()
                    .or_else(|| Some(market.expiry.to_string())),
                liquidity: listed.details.liquidity,
                implied_apy: listed.details.implied_apy,
                underlying_apy: listed.details.underlying_apy,
            })
        })
        .collect()
}

/// Listing addresses may carry a `{chain}-` prefix and any casing
fn same_address(listed: &str, configured: &Address) -> bool {
    let bare = listed.rsplit('-').next().unwrap_or(listed);
    bare.parse::<Address>().is_ok_and(|address| &address == configured)
}
