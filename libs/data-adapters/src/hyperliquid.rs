//! Perpetual-exchange candles
//!
//! `POST /info {"type":"candleSnapshot","req":{...}}` returns candles with
//! prices and volume as decimal strings. They are folded into one
//! [`NotionalRow`] per UTC day, notional being `volume * close` per candle.

use std::collections::BTreeMap;

use analytics_store::entity::series::NotionalRow;
use chrono::{DateTime, NaiveDate, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{lenient, read_json, AdapterError};

const SOURCE: &str = "hyperliquid";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// Open time, epoch millis
    #[serde(rename = "t")]
    pub open_time: i64,
    #[serde(rename = "c", deserialize_with = "lenient::f64", default)]
    pub close: f64,
    /// Base-asset volume
    #[serde(rename = "v", deserialize_with = "lenient::f64", default)]
    pub volume: f64,
    #[serde(rename = "n", deserialize_with = "lenient::u64", default)]
    pub trades: u64,
}

#[derive(Debug, Clone)]
pub struct HyperliquidClient {
    http: Client,
    info_url: String,
}

impl HyperliquidClient {
    pub fn new(http: Client, info_url: &str) -> Self {
        Self {
            http,
            info_url: info_url.to_string(),
        }
    }

    pub async fn candles(
        &self,
        coin: &str,
        interval: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Candle>, AdapterError> {
        let body = json!({
            "type": "candleSnapshot",
            "req": {
                "coin": coin,
                "interval": interval,
                "startTime": start.timestamp_millis(),
                "endTime": end.timestamp_millis(),
            }
        });
        tracing::debug!(coin, interval, "Fetching candles");

        read_json(SOURCE, self.http.post(&self.info_url).json(&body).send().await).await
    }

    /// Daily notional volume for `coin` over the last `days` days
    pub async fn daily_notional(
        &self,
        coin: &str,
        interval: &str,
        days: u32,
        now: DateTime<Utc>,
    ) -> Result<Vec<NotionalRow>, AdapterError> {
        let start = now - chrono::Duration::days(i64::from(days));
        let candles = self.candles(coin, interval, start, now).await?;

        Ok(daily_notional(candles))
    }
}

pub fn daily_notional(mut candles: Vec<Candle>) -> Vec<NotionalRow> {
    candles.sort_by_key(|candle| candle.open_time);

    let mut days: BTreeMap<NaiveDate, NotionalRow> = BTreeMap::new();

    for candle in candles {
        let Some(opened) = DateTime::from_timestamp_millis(candle.open_time) else {
            tracing::warn!(open_time = candle.open_time, "Candle with invalid open time skipped");
            continue;
        };
        let date = opened.date_naive();

        let row = days.entry(date).or_insert_with(|| NotionalRow {
            date,
            notional_volume: 0.0,
            num_trades: 0,
            close: 0.0,
        });
        row.notional_volume += candle.volume * candle.close;
        row.num_trades += candle.trades;
        row.close = candle.close;
    }

    days.into_values().collect()
}
