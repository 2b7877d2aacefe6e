//! Off-chain testnet analytics
//!
//! The API nests simulators under seasons; rows are flattened to one per
//! (season, simulator).

use analytics_store::entity::series::TestnetRow;
use reqwest::Client;
use serde::Deserialize;

use crate::{lenient, read_json, AdapterError};

const SOURCE: &str = "testnet";

#[derive(Debug, Deserialize)]
pub(crate) struct TestnetReport {
    #[serde(default)]
    seasons: Vec<Season>,
}

#[derive(Debug, Deserialize)]
struct Season {
    name: String,
    #[serde(default)]
    simulators: Vec<Simulator>,
}

#[derive(Debug, Deserialize)]
struct Simulator {
    name: String,
    #[serde(default, deserialize_with = "lenient::u64")]
    users: u64,
    #[serde(default, deserialize_with = "lenient::f64")]
    volume: f64,
    #[serde(default, deserialize_with = "lenient::u64")]
    trades: u64,
}

#[derive(Debug, Clone)]
pub struct TestnetClient {
    http: Client,
    url: Option<String>,
}

impl TestnetClient {
    pub fn new(http: Client, url: Option<&str>) -> Self {
        Self {
            http,
            url: url.map(str::to_string),
        }
    }

    pub async fn season_rows(&self) -> Result<Vec<TestnetRow>, AdapterError> {
        let url = self.url.as_deref().ok_or(AdapterError::NotConfigured("TESTNET_API_URL"))?;

        let report: TestnetReport = read_json(SOURCE, self.http.get(url).send().await).await?;
        Ok(flatten(report))
    }
}

pub(crate) fn flatten(report: TestnetReport) -> Vec<TestnetRow> {
    report
        .seasons
        .into_iter()
        .flat_map(|season| {
            let Season { name, simulators } = season;
            simulators.into_iter().map(move |simulator| TestnetRow {
                season: name.clone(),
                simulator: simulator.name,
                users: simulator.users,
                volume: simulator.volume,
                trades: simulator.trades,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flatten_nested_seasons() {
        let raw = r#"{"seasons":[
            {"name":"Season 1","simulators":[
                {"name":"perps","users":120,"volume":"50000.5","trades":900},
                {"name":"spot","users":"40","volume":10}
            ]},
            {"name":"Season 2","simulators":[]}
        ]}"#;

        let rows = flatten(serde_json::from_str(raw).unwrap());

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].season, "Season 1");
        assert_eq!(rows[0].volume, 50_000.5);
        assert_eq!(rows[1].simulator, "spot");
        assert_eq!(rows[1].users, 40);
        assert_eq!(rows[1].trades, 0);
    }

    #[tokio::test]
    async fn test_unconfigured_source() {
        let client = TestnetClient::new(Client::new(), None);

        assert!(matches!(
            client.season_rows().await,
            Err(AdapterError::NotConfigured(_))
        ));
    }
}
