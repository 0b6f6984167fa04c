#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{Map, Value};
use tokio::net::TcpStream;
use tokio::sync::broadcast;
use tokio::time;
use tokio_tungstenite::{tungstenite, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

use gateway_api::auth::tokens::{MemoryTokens, TokenError, TokenValidator};
use gateway_api::config::Config;
use gateway_api::db::history::{HistoryStore, MemoryHistory, StoreError};
use gateway_api::engine::{EngineError, EngineEvent, GameEngine, MemoryEngine};
use gateway_api::models::{AuthenticatedUser, GameRecord};
use gateway_api::AppState;

pub type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

// ---------------------------------------------------------------------------
// Instrumented collaborators
// ---------------------------------------------------------------------------

/// Wraps [`MemoryEngine`], counting calls and optionally failing them with an
/// unclassified error.
pub struct RecordingEngine {
    pub inner: MemoryEngine,
    pub place_bet_calls: AtomicUsize,
    pub cash_out_calls: AtomicUsize,
    pub failing: AtomicBool,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            inner: MemoryEngine::new(),
            place_bet_calls: AtomicUsize::new(0),
            cash_out_calls: AtomicUsize::new(0),
            failing: AtomicBool::new(false),
        }
    }

    pub fn fail_calls(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn cash_outs(&self) -> usize {
        self.cash_out_calls.load(Ordering::SeqCst)
    }

    pub fn bets(&self) -> usize {
        self.place_bet_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GameEngine for RecordingEngine {
    fn info(&self) -> Map<String, Value> {
        self.inner.info()
    }

    async fn place_bet(
        &self,
        user: &AuthenticatedUser,
        amount: u64,
        auto_cash_out: Option<u64>,
    ) -> Result<(), EngineError> {
        self.place_bet_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(EngineError::Failure("simulated outage".to_string()));
        }
        self.inner.place_bet(user, amount, auto_cash_out).await
    }

    async fn cash_out(&self, user: &AuthenticatedUser) -> Result<(), EngineError> {
        self.cash_out_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(EngineError::Failure("simulated outage".to_string()));
        }
        self.inner.cash_out(user).await
    }

    fn update_auto_cash_out(&self, user: &AuthenticatedUser, amount: Option<u64>) {
        self.inner.update_auto_cash_out(user, amount)
    }

    fn subscribe(&self) -> broadcast::Receiver<Arc<EngineEvent>> {
        self.inner.subscribe()
    }
}

/// Wraps [`MemoryTokens`], counting validator calls and optionally failing
/// them as if the token service were unreachable.
pub struct CountingTokens {
    pub inner: MemoryTokens,
    pub calls: AtomicUsize,
    pub unavailable: AtomicBool,
}

impl CountingTokens {
    pub fn new() -> Self {
        Self {
            inner: MemoryTokens::new(),
            calls: AtomicUsize::new(0),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn fail_calls(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

#[async_trait]
impl TokenValidator for CountingTokens {
    async fn validate_one_time_token(&self, token: Uuid) -> Result<AuthenticatedUser, TokenError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(TokenError::Unavailable(
                "connection to token store refused".to_string(),
            ));
        }
        self.inner.validate_one_time_token(token).await
    }
}

pub struct FailingHistory;

#[async_trait]
impl HistoryStore for FailingHistory {
    async fn game_history(&self) -> Result<Vec<GameRecord>, StoreError> {
        Err(StoreError("database is down".to_string()))
    }
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

pub struct TestGateway {
    pub addr: SocketAddr,
    pub state: AppState,
    pub engine: Arc<RecordingEngine>,
    pub tokens: Arc<CountingTokens>,
}

impl TestGateway {
    pub fn issue_token(&self, user: AuthenticatedUser) -> String {
        self.tokens.inner.issue(user).to_string()
    }
}

pub async fn start_gateway() -> TestGateway {
    start_gateway_with_history(Arc::new(MemoryHistory::new())).await
}

/// Start an actual TCP server for WebSocket testing. The server runs in the
/// background.
pub async fn start_gateway_with_history(history: Arc<dyn HistoryStore>) -> TestGateway {
    let engine = Arc::new(RecordingEngine::new());
    let tokens = Arc::new(CountingTokens::new());
    let state = AppState::new(Config::default(), engine.clone(), tokens.clone(), history);
    gateway_api::gateway::start(&state);

    let app = gateway_api::routes::router().with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    TestGateway {
        addr,
        state,
        engine,
        tokens,
    }
}

pub fn user(id: i64, username: &str, balance_satoshis: i64) -> AuthenticatedUser {
    AuthenticatedUser {
        id,
        username: username.to_string(),
        balance_satoshis,
    }
}

// ---------------------------------------------------------------------------
// Client helpers
// ---------------------------------------------------------------------------

pub async fn connect(addr: SocketAddr) -> Ws {
    let url = format!("ws://{addr}/socket");
    let (ws, _) = tokio_tungstenite::connect_async(&url)
        .await
        .expect("ws connect");
    ws
}

pub async fn send(ws: &mut Ws, event: &str, args: Value, ack: Option<u64>) {
    let mut frame = serde_json::json!({ "event": event, "args": args });
    if let Some(id) = ack {
        frame["ack"] = id.into();
    }
    ws.send(tungstenite::Message::Text(frame.to_string().into()))
        .await
        .expect("send frame");
}

pub async fn send_raw(ws: &mut Ws, text: &str) {
    ws.send(tungstenite::Message::Text(text.to_string().into()))
        .await
        .expect("send raw frame");
}

/// Next JSON frame from the server.
pub async fn recv(ws: &mut Ws) -> Value {
    loop {
        let msg = time::timeout(Duration::from_secs(5), ws.next())
            .await
            .expect("timeout waiting for frame")
            .expect("stream ended")
            .expect("ws read error");
        match msg {
            tungstenite::Message::Text(text) => {
                return serde_json::from_str(&text).expect("parse frame");
            }
            tungstenite::Message::Ping(_) | tungstenite::Message::Pong(_) => continue,
            other => panic!("unexpected frame: {other:?}"),
        }
    }
}

/// Next frame that is not a relayed engine event.
pub async fn recv_direct(ws: &mut Ws) -> Value {
    loop {
        let frame = recv(ws).await;
        match frame["event"].as_str() {
            Some("player_bet") | Some("cashed_out") => continue,
            _ => return frame,
        }
    }
}

/// Assert nothing arrives for a short while.
pub async fn expect_silence(ws: &mut Ws) {
    if let Ok(Some(Ok(msg))) = time::timeout(Duration::from_millis(300), ws.next()).await {
        panic!("expected no frame, got {msg:?}");
    }
}

/// Send `join(info)` and return the ack reply.
pub async fn join(ws: &mut Ws, info: Value) -> Value {
    send(ws, "join", serde_json::json!([info]), Some(1)).await;
    let reply = recv(ws).await;
    assert_eq!(reply["ack"], 1, "expected join ack, got {reply}");
    reply
}

/// Poll `check` until it holds or a second passes.
pub async fn eventually(mut check: impl FnMut() -> bool) {
    time::timeout(Duration::from_secs(1), async {
        while !check() {
            time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition never held");
}
