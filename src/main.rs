use std::sync::Arc;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use payment_events::config::AppConfig;
use payment_events::domain::payment::{PaymentCommandHandler, PaymentEvent};
use payment_events::event_sourcing::store::{EventStore, InMemoryEventStore};
use payment_events::http::{self, AppState};
use payment_events::metrics::Metrics;

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Default to INFO level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true).with_thread_ids(true))
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,payment_events=debug"))
        )
        .init();

    tracing::info!("Starting payment event service");

    // === 1. Configuration ===
    let config = AppConfig::from_env()?;
    tracing::info!(
        host = %config.host,
        port = config.port,
        link_domain = %config.payment_link_domain,
        "Configuration loaded"
    );

    // === 2. Initialize Prometheus metrics ===
    let metrics = Arc::new(Metrics::new()?);
    tracing::info!("Metrics registry created with {} metrics", metrics.registry().gather().len());

    // === 3. Event store ===
    let event_store: Arc<dyn EventStore<PaymentEvent>> =
        Arc::new(InMemoryEventStore::<PaymentEvent>::new("Payment"));

    // === 4. Command handler ===
    let handler = Arc::new(PaymentCommandHandler::new(
        event_store,
        config.payment_link_domain.clone(),
        metrics.clone(),
    ));

    // === 5. HTTP API ===
    http::start_server(AppState { handler, metrics }, &config.host, config.port).await?;

    tracing::info!("Payment event service stopped");
    Ok(())
}
