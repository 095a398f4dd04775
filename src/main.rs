use std::sync::Arc;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use callflow::config::AppConfig;
use callflow::handlers;
use callflow::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();
    if config.admin_token == "changeme" {
        tracing::warn!("ADMIN_TOKEN is not set, operator endpoints use the default token");
    }
    tracing::info!(
        agent = %config.agent_name,
        voice = %config.agent_voice,
        state_listing = config.include_state_listing,
        "call flow agent configured"
    );

    let state = Arc::new(AppState::new(config.clone()));
    tokio::spawn(evict_ended_calls(
        Arc::clone(&state),
        chrono::Duration::seconds(config.ended_call_ttl_secs as i64),
    ));
    let app = handlers::router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn evict_ended_calls(state: Arc<AppState>, ttl: chrono::Duration) {
    let mut tick = tokio::time::interval(Duration::from_secs(60));
    loop {
        tick.tick().await;
        match state.calls.evict_ended(ttl, chrono::Utc::now()) {
            Ok(0) => {}
            Ok(evicted) => tracing::info!(evicted, "evicted ended calls"),
            Err(e) => tracing::error!(error = %e, "failed to evict ended calls"),
        }
    }
}
