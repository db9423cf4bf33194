//! End-to-end tests over real HTTP: an in-process axum server plays the
//! remote advisor backend, and the core's monitor + dispatcher run against
//! it through the production reqwest client.

use axum::{extract::Json, routing::get, routing::post, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::CorsLayer;

use financeguru_core::advisor::CATEGORY_RULES;
use financeguru_core::{
    BackendClient, ChatBackend, ConnectivityMonitor, ConnectivityState, Dispatcher,
    DispatcherOptions, MessageSource, Sender, SessionStore, StatusCell,
};

const PROBE_TIMEOUT: Duration = Duration::from_millis(500);
const CHAT_TIMEOUT: Duration = Duration::from_millis(500);

async fn spawn_backend(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, router.layer(CorsLayer::permissive()))
            .await
            .unwrap();
    });

    addr
}

/// An address nothing listens on, for offline scenarios.
async fn dead_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    listener.local_addr().unwrap()
}

fn client_for(addr: SocketAddr) -> Arc<dyn ChatBackend> {
    Arc::new(
        BackendClient::new(format!("http://{}", addr), PROBE_TIMEOUT, CHAT_TIMEOUT).unwrap(),
    )
}

fn dispatcher_for(
    backend: Arc<dyn ChatBackend>,
    status: Arc<StatusCell>,
) -> Dispatcher {
    Dispatcher::new(
        backend,
        status,
        Arc::new(RwLock::new(SessionStore::in_memory())),
        DispatcherOptions {
            chat_timeout: CHAT_TIMEOUT,
            fallback_delay: Duration::ZERO,
            history_window: 10,
        },
    )
}

fn healthy_router() -> Router {
    Router::new()
        .route(
            "/api/health",
            get(|| async { Json(serde_json::json!({"status": "ok"})) }),
        )
        .route(
            "/api/chat",
            post(|Json(body): Json<serde_json::Value>| async move {
                assert!(body["user_input"].is_string());
                assert!(body["user_id"].as_str().unwrap().starts_with("user_"));
                Json(serde_json::json!({
                    "response": "Buy index funds.",
                    "demo_mode": false
                }))
            }),
        )
}

#[tokio::test]
async fn probe_maps_ok_payload_to_connected() {
    let addr = spawn_backend(healthy_router()).await;
    let status = Arc::new(StatusCell::default());
    let monitor = ConnectivityMonitor::new(client_for(addr), Arc::clone(&status), PROBE_TIMEOUT);

    assert_eq!(monitor.probe().await, ConnectivityState::Connected);
    assert_eq!(status.get(), ConnectivityState::Connected);
}

#[tokio::test]
async fn probe_maps_other_payload_to_degraded() {
    let router = Router::new().route(
        "/api/health",
        get(|| async { Json(serde_json::json!({"status": "maintenance"})) }),
    );
    let addr = spawn_backend(router).await;
    let monitor = ConnectivityMonitor::new(
        client_for(addr),
        Arc::new(StatusCell::default()),
        PROBE_TIMEOUT,
    );

    assert_eq!(monitor.probe().await, ConnectivityState::Degraded);
}

#[tokio::test]
async fn probe_maps_unreachable_backend_to_offline() {
    let addr = dead_addr().await;
    let monitor = ConnectivityMonitor::new(
        client_for(addr),
        Arc::new(StatusCell::default()),
        PROBE_TIMEOUT,
    );

    assert_eq!(monitor.probe().await, ConnectivityState::Offline);
}

#[tokio::test]
async fn probe_maps_http_error_to_offline() {
    let router = Router::new().route(
        "/api/health",
        get(|| async { (axum::http::StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
    );
    let addr = spawn_backend(router).await;
    let monitor = ConnectivityMonitor::new(
        client_for(addr),
        Arc::new(StatusCell::default()),
        PROBE_TIMEOUT,
    );

    assert_eq!(monitor.probe().await, ConnectivityState::Offline);
}

#[tokio::test]
async fn send_round_trips_through_remote_backend() {
    let addr = spawn_backend(healthy_router()).await;
    let status = Arc::new(StatusCell::new(ConnectivityState::Connected));
    let dispatcher = dispatcher_for(client_for(addr), status);

    let bot = dispatcher.send("How should I invest?").await.unwrap();
    assert_eq!(bot.text, "Buy index funds.");
    assert_eq!(bot.source, Some(MessageSource::RemoteAi));

    let session = dispatcher.session_snapshot().await;
    assert_eq!(session.history.len(), 3);
    assert_eq!(session.history[1].sender, Sender::User);
    assert_eq!(session.history[2].sender, Sender::Bot);
}

#[tokio::test]
async fn demo_and_annotation_fields_survive_the_wire() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async {
            Json(serde_json::json!({
                "response": "Markets closed up 1.2% today.",
                "demo_mode": true,
                "market_data_included": true,
                "sentiment_analysis": {"sentiment": "positive"}
            }))
        }),
    );
    let addr = spawn_backend(router).await;
    let status = Arc::new(StatusCell::new(ConnectivityState::Connected));
    let dispatcher = dispatcher_for(client_for(addr), status);

    let bot = dispatcher.send("how did markets do").await.unwrap();
    assert_eq!(bot.source, Some(MessageSource::RemoteDemo));
    assert!(bot.market_data_included);
    assert_eq!(bot.sentiment.as_deref(), Some("positive"));
}

#[tokio::test]
async fn malformed_chat_payload_triggers_fallback() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async { Json(serde_json::json!({"unexpected": "shape"})) }),
    );
    let addr = spawn_backend(router).await;
    let status = Arc::new(StatusCell::new(ConnectivityState::Connected));
    let dispatcher = dispatcher_for(client_for(addr), Arc::clone(&status));

    let bot = dispatcher.send("How do I start investing?").await.unwrap();
    assert_eq!(bot.source, Some(MessageSource::LocalFallback));
    assert_eq!(bot.text, CATEGORY_RULES[0].advice);
    assert_eq!(status.get(), ConnectivityState::Offline);
}

#[tokio::test]
async fn chat_http_error_triggers_fallback() {
    let router = Router::new().route(
        "/api/chat",
        post(|| async { (axum::http::StatusCode::BAD_GATEWAY, "nope") }),
    );
    let addr = spawn_backend(router).await;
    let status = Arc::new(StatusCell::new(ConnectivityState::Connected));
    let dispatcher = dispatcher_for(client_for(addr), Arc::clone(&status));

    let bot = dispatcher.send("help me budget").await.unwrap();
    assert_eq!(bot.source, Some(MessageSource::LocalFallback));
    assert_eq!(status.get(), ConnectivityState::Offline);
}

#[tokio::test]
async fn offline_probe_then_send_answers_locally() {
    // Scenario from the contract: the health probe finds nothing listening,
    // so the next send never attempts the remote call and the reply is the
    // investing advisory text.
    let addr = dead_addr().await;
    let status = Arc::new(StatusCell::default());
    let backend = client_for(addr);
    let monitor =
        ConnectivityMonitor::new(Arc::clone(&backend), Arc::clone(&status), PROBE_TIMEOUT);

    assert_eq!(monitor.probe().await, ConnectivityState::Offline);

    let started = std::time::Instant::now();
    let dispatcher = dispatcher_for(backend, Arc::clone(&status));
    let bot = dispatcher.send("How do I start investing?").await.unwrap();

    assert_eq!(bot.source, Some(MessageSource::LocalFallback));
    assert_eq!(bot.text, CATEGORY_RULES[0].advice);
    // No remote attempt: well under the connect-failure budget.
    assert!(started.elapsed() < PROBE_TIMEOUT);
}

#[tokio::test]
async fn recovery_after_backend_comes_back() {
    let status = Arc::new(StatusCell::new(ConnectivityState::Offline));

    let addr = spawn_backend(healthy_router()).await;
    let backend = client_for(addr);
    let monitor =
        ConnectivityMonitor::new(Arc::clone(&backend), Arc::clone(&status), PROBE_TIMEOUT);

    // Manual re-check flips the state; the following send goes remote.
    assert_eq!(monitor.probe().await, ConnectivityState::Connected);

    let dispatcher = dispatcher_for(backend, status);
    let bot = dispatcher.send("and now?").await.unwrap();
    assert_eq!(bot.source, Some(MessageSource::RemoteAi));
}

#[tokio::test]
async fn periodic_monitor_tracks_backend_over_http() {
    let addr = spawn_backend(healthy_router()).await;
    let status = Arc::new(StatusCell::default());
    let monitor = ConnectivityMonitor::new(client_for(addr), Arc::clone(&status), PROBE_TIMEOUT);

    monitor.start(Duration::from_millis(50));

    // Sample until the first cycle lands on a terminal value.
    let mut state = status.get();
    for _ in 0..50 {
        if state == ConnectivityState::Connected {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        state = status.get();
    }
    assert_eq!(state, ConnectivityState::Connected);

    monitor.shutdown();
}
