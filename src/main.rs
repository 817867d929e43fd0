//! El Amigo POS - point-of-sale and inventory service

use std::sync::Arc;

use anyhow::Result;
use elamigo_pos::api::{self, AppState};
use elamigo_pos::config::Config;
use elamigo_pos::publish::NatsEventSink;
use elamigo_pos::repository::Stores;
use elamigo_pos::seed;
use elamigo_pos::session::FileSessionStore;
use elamigo_pos::suggest::{GeminiModel, OrderSuggester, UnconfiguredModel};
use elamigo_pos::Ledger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    let stores = Stores::in_memory();
    if config.seed_demo_data {
        seed::seed_demo_data(&stores);
    }

    let mut ledger = Ledger::new(stores);
    if let Some(path) = &config.session_file {
        tracing::info!(path = %path.display(), "persisting sessions to file");
        ledger = ledger.with_sessions(Arc::new(FileSessionStore::new(path)));
    }
    if let Some(url) = &config.nats_url {
        match async_nats::connect(url.as_str()).await {
            Ok(client) => {
                tracing::info!(%url, "publishing domain events to NATS");
                ledger = ledger.with_event_sink(Arc::new(NatsEventSink::new(client)));
            }
            Err(e) => tracing::warn!(%url, error = %e, "NATS unavailable, domain events will be dropped"),
        }
    }

    let suggester = match &config.gemini_api_key {
        Some(key) => OrderSuggester::new(GeminiModel::new(key).with_base_url(&config.ai_base_url).with_model(&config.ai_model)),
        None => {
            tracing::warn!("GEMINI_API_KEY not set, order suggestions are disabled");
            OrderSuggester::new(UnconfiguredModel)
        }
    };

    let app = api::router(AppState::new(ledger, suggester));
    let addr = config.listen_addr();
    tracing::info!("🚀 El Amigo POS listening on {}", addr);
    axum::serve(tokio::net::TcpListener::bind(addr).await?, app).await?;
    Ok(())
}
