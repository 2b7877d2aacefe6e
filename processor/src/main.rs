use std::error::Error;

use analytics_store::initialize_settings;
use data_adapters::Adapters;
use listener::NodeClient;
use processor::AnalyticsService;
use tokio::time::sleep;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod defaults {
    pub const LOG_FILTER: &str = "processor=info,listener=info,analytics_store=info";
}

/// Keeps the all-time snapshot current so API reads never pay for a scan
#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| defaults::LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = initialize_settings()?;
    let client = NodeClient::connect(&settings.rpc_url, &settings.scan).await?;
    let adapters = Adapters::new(&settings)?;

    let interval = settings.all_time.refresh_interval;
    tracing::info!(
        source = ?settings.all_time.source,
        interval_secs = interval.as_secs(),
        "All-time refresher started"
    );

    let service = AnalyticsService::new(client, adapters, settings);

    loop {
        let refreshed = service.refresh_all_time().await;

        if refreshed.is_complete() {
            tracing::info!(
                users = refreshed.data.total_unique_users,
                "All-time totals refreshed"
            );
        } else {
            for warning in refreshed.warnings() {
                tracing::warn!("All-time refresh degraded: {warning}");
            }
        }

        tracing::debug!("Sleeping for {} seconds...", interval.as_secs());
        sleep(interval).await;
    }
}
