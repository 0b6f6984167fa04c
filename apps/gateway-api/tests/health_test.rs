use std::sync::Arc;

use axum_test::TestServer;
use serde_json::Value;

use gateway_api::auth::tokens::MemoryTokens;
use gateway_api::config::Config;
use gateway_api::db::history::MemoryHistory;
use gateway_api::engine::MemoryEngine;
use gateway_api::AppState;

fn test_state() -> AppState {
    AppState::new(
        Config::default(),
        Arc::new(MemoryEngine::new()),
        Arc::new(MemoryTokens::new()),
        Arc::new(MemoryHistory::new()),
    )
}

#[tokio::test]
async fn health_reports_ok() {
    let state = test_state();
    let server = TestServer::new(gateway_api::routes::router().with_state(state)).unwrap();

    let resp = server.get("/health").await;
    resp.assert_status_ok();
    let body: Value = resp.json();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["joined"], 0);
}

#[tokio::test]
async fn health_reports_shutdown() {
    let state = test_state();
    state.shutdown.trigger();
    let server = TestServer::new(gateway_api::routes::router().with_state(state)).unwrap();

    let body: Value = server.get("/health").await.json();
    assert_eq!(body["status"], "shutting_down");
}
