//! nLP Analytics API Server
//!
//! REST API endpoints for the analytics dashboard.

use std::{env, net::SocketAddr, sync::Arc};

use alloy::{providers::RootProvider, transports::BoxTransport};
use analytics_store::initialize_settings;
use axum::{routing::get, Router};
use data_adapters::Adapters;
use listener::NodeClient;
use processor::AnalyticsService;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod routes;

pub type Service = AnalyticsService<NodeClient<RootProvider<BoxTransport>>>;

/// Application state shared across handlers
pub struct AppState {
    pub service: Service,
}

mod defaults {
    pub const API_PORT: &str = "8080";
    pub const API_HOST: &str = "0.0.0.0";
    pub const LOG_FILTER: &str = "api=debug,processor=info,listener=info,tower_http=debug";
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| defaults::LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting nLP Analytics API Server...");

    let settings = initialize_settings()?;
    let client = NodeClient::connect(&settings.rpc_url, &settings.scan).await?;
    let adapters = Adapters::new(&settings)?;

    let state = Arc::new(AppState {
        service: AnalyticsService::new(client, adapters, settings),
    });

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .nest("/api", routes::api_routes())
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        );

    let port = env::var("API_PORT")
        .unwrap_or_else(|_| defaults::API_PORT.to_string())
        .parse::<u16>()
        .unwrap_or(8080);

    let host = env::var("API_HOST").unwrap_or_else(|_| defaults::API_HOST.to_string());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Root endpoint - API information
async fn root() -> axum::response::Html<&'static str> {
    axum::response::Html(r#"
<!DOCTYPE html>
<html>
<head>
    <title>nLP Analytics API</title>
    <style>
        body { font-family: system-ui, sans-serif; max-width: 800px; margin: 50px auto; padding: 20px; background: #1a1a2e; color: #eee; }
        h1 { color: #f5a623; }
        a { color: #4fc3f7; }
        code { background: #333; padding: 2px 6px; border-radius: 4px; }
        .endpoint { margin: 10px 0; padding: 10px; background: #252540; border-radius: 8px; }
        .method { color: #4caf50; font-weight: bold; }
    </style>
</head>
<body>
    <h1>nLP Analytics API</h1>
    <p>wNLP and Pendle market activity on HyperEVM. Windowed routes take <code>?days=N</code>.</p>

    <div class="endpoint">
        <span class="method">GET</span> <a href="/health">/health</a> - Health check
    </div>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/kpis">/api/kpis</a> - Headline figures
    </div>

    <h3>Pendle</h3>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/pendle/flows">/api/pendle/flows</a> - Daily SY deposits and withdrawals
    </div>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/pendle/volume">/api/pendle/volume</a> - Daily swap volume and fees
    </div>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/pendle/markets">/api/pendle/markets</a> - Per-market breakdown
    </div>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/pendle/swaps">/api/pendle/swaps</a> - Swaps
    </div>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/pendle/lp">/api/pendle/lp</a> - Liquidity events
    </div>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/pendle/rewards">/api/pendle/rewards</a> - Reward claims
    </div>

    <h3>wNLP</h3>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/nlp/tvl">/api/nlp/tvl</a> - TVL curve
    </div>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/nlp/volume">/api/nlp/volume</a> - Daily transfer volume
    </div>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/nlp/holders">/api/nlp/holders</a> - Top holders
    </div>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/users">/api/users</a> - Daily users
    </div>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/all-time">/api/all-time</a> - All-time totals
    </div>

    <h3>External</h3>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/yields">/api/yields</a> - Market yields
    </div>
    <div class="endpoint">
        <span class="method">GET</span> <code>/api/candles?coin=HYPE&amp;interval=1h&amp;days=7</code> - Daily notional volume
    </div>
    <div class="endpoint">
        <span class="method">GET</span> <a href="/api/testnet">/api/testnet</a> - Testnet seasons
    </div>
    <div class="endpoint">
        <span class="method">POST</span> <code>/api/refresh?snapshot=true</code> - Clear caches
    </div>
</body>
</html>
    "#)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
