use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;

use axum::Router;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gateway_api::auth::tokens::MemoryTokens;
use gateway_api::config::Config;
use gateway_api::db::history::MemoryHistory;
use gateway_api::engine::{MemoryEngine, Topic};
use gateway_api::AppState;

#[tokio::main]
async fn main() {
    // Load .env file (silently skip if missing)
    if dotenvy::dotenv().is_err() {
        let env_path = Path::new(env!("CARGO_MANIFEST_DIR")).join(".env");
        let _ = dotenvy::from_path(env_path);
    }

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env();

    // In-memory collaborators; swap in real adapters for production.
    let engine = Arc::new(MemoryEngine::new());
    let tokens = Arc::new(MemoryTokens::new());
    let history = Arc::new(MemoryHistory::new());

    let state = AppState::new(config, engine.clone(), tokens, history);
    let addr = SocketAddr::from((state.config.bind_addr, state.config.port));
    let _background = gateway_api::gateway::start(&state);

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .merge(gateway_api::routes::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state.clone());

    tracing::info!(%addr, "gateway-api listening");

    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!(%addr, %err, "failed to bind");
            std::process::exit(1);
        }
    };

    let shutdown = {
        let state = state.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("ctrl-c received; announcing shutdown");
                engine.events().publish(Topic::Shutdown, Value::Null);
                state.shutdown.tripped().await;
            }
        }
    };

    if let Err(err) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await
    {
        tracing::error!(%err, "server error");
    }

    // Let open sockets deliver `update` and queued engine calls finish.
    state.tasks.close();
    if tokio::time::timeout(state.config.shutdown_drain, state.tasks.wait())
        .await
        .is_err()
    {
        tracing::warn!(remaining = state.tasks.len(), "shutdown drain timed out");
    }
}
