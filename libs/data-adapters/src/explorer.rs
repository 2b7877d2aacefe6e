//! Block-explorer token transfer listing
//!
//! `GET {base}/tokens/{address}/transfers` returns newest-first pages of
//! `items`; the next page is requested by echoing `next_page_params` back as
//! query parameters until it comes back `null`.

use std::str::FromStr;

use alloy::primitives::{Address, B256};
use bigdecimal::BigDecimal;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{read_json, AdapterError};

const SOURCE: &str = "explorer";

#[derive(Debug, Deserialize)]
pub(crate) struct TransferPage {
    #[serde(default)]
    items: Vec<RawTransfer>,
    #[serde(default)]
    next_page_params: Option<Map<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct RawTransfer {
    #[serde(default)]
    block_number: u64,
    #[serde(alias = "tx_hash", default)]
    transaction_hash: B256,
    from: Party,
    to: Party,
    total: Total,
}

#[derive(Debug, Deserialize)]
struct Party {
    hash: Address,
}

#[derive(Debug, Deserialize)]
struct Total {
    #[serde(default)]
    value: Option<String>,
}

/// One transfer from the listing, amount already scaled by token decimals
#[derive(Debug, Clone, PartialEq)]
pub struct ExplorerTransfer {
    pub block: u64,
    pub tx_hash: B256,
    pub from: Address,
    pub to: Address,
    pub amount: BigDecimal,
}

#[derive(Debug, Clone, Default)]
pub struct ExplorerListing {
    pub transfers: Vec<ExplorerTransfer>,
    pub pages: u32,
    /// Stopped at the page limit with more pages available
    pub truncated: bool,
}

#[derive(Debug, Clone)]
pub struct ExplorerClient {
    http: Client,
    base_url: String,
    max_pages: u32,
}

impl ExplorerClient {
    pub fn new(http: Client, base_url: &str, max_pages: u32) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_pages: max_pages.max(1),
        }
    }

    /// Every transfer of `token`, following the page cursor up to the page limit
    pub async fn token_transfers(
        &self,
        token: Address,
        decimals: u8,
    ) -> Result<ExplorerListing, AdapterError> {
        let url = format!("{}/tokens/{token}/transfers", self.base_url);
        let mut listing = ExplorerListing::default();
        let mut cursor: Vec<(String, String)> = Vec::new();

        loop {
            let response = self.http.get(&url).query(&cursor).send().await;
            let page: TransferPage = read_json(SOURCE, response).await?;
            listing.pages += 1;

            listing
                .transfers
                .extend(page.items.into_iter().map(|raw| scale(raw, decimals)));

            let Some(next) = page.next_page_params else {
                break;
            };
            if listing.pages >= self.max_pages {
                tracing::warn!(%token, pages = listing.pages, "Explorer page limit reached");
                listing.truncated = true;
                break;
            }
            cursor = page_query(&next);
        }

        tracing::debug!(
            %token,
            transfers = listing.transfers.len(),
            pages = listing.pages,
            "Fetched explorer transfers"
        );
        Ok(listing)
    }
}

fn scale(raw: RawTransfer, decimals: u8) -> ExplorerTransfer {
    let value = raw.total.value.unwrap_or_default();
    let amount = BigDecimal::from_str(&format!("{}e-{decimals}", value.trim()))
        .unwrap_or_default();

    ExplorerTransfer {
        block: raw.block_number,
        tx_hash: raw.transaction_hash,
        from: raw.from.hash,
        to: raw.to.hash,
        amount,
    }
}

/// Cursor object as flat query pairs; nulls are dropped
pub(crate) fn page_query(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .filter_map(|(key, value)| {
            let value = match value {
                Value::Null => return None,
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            Some((key.clone(), value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use alloy::primitives::address;
    use serde_json::json;

    use super::*;

    #[test]
    fn test_parse_page() {
        let raw = json!({
            "items": [{
                "block_number": 1234,
                "transaction_hash": "0x00000000000000000000000000000000000000000000000000000000000000aa",
                "from": {"hash": "0x0000000000000000000000000000000000000000"},
                "to": {"hash": "0x00000000000000000000000000000000000000a1"},
                "total": {"value": "2500000000000000000", "decimals": "18"},
                "timestamp": "2025-11-01T12:00:00.000000Z"
            }],
            "next_page_params": {"block_number": 1200, "index": 3, "items_count": 50}
        });

        let page: TransferPage = serde_json::from_value(raw).unwrap();
        let transfer = scale(page.items.into_iter().next().unwrap(), 18);

        assert_eq!(transfer.block, 1234);
        assert_eq!(transfer.from, Address::ZERO);
        assert_eq!(transfer.to, address!("00000000000000000000000000000000000000a1"));
        assert_eq!(transfer.amount, BigDecimal::from_str("2.5").unwrap());
        assert!(page.next_page_params.is_some());
    }

    #[test]
    fn test_last_page_has_null_cursor() {
        let page: TransferPage =
            serde_json::from_value(json!({"items": [], "next_page_params": null})).unwrap();

        assert!(page.next_page_params.is_none());
    }

    #[test]
    fn test_page_query_flattens_cursor() {
        let cursor = json!({"block_number": 1200, "index": 3, "token": "0xabc", "gone": null});

        let mut query = page_query(cursor.as_object().unwrap());
        query.sort();

        assert_eq!(
            query,
            vec![
                ("block_number".to_string(), "1200".to_string()),
                ("index".to_string(), "3".to_string()),
                ("token".to_string(), "0xabc".to_string()),
            ]
        );
    }
}
