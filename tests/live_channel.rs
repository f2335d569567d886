//! Push channel against a local WebSocket server.

mod common;

use std::sync::Arc;

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use docdesk::app::App;
use docdesk::component::Component;
use docdesk::live::backoff::ReconnectConfig;
use docdesk::live::conn::ConnState;
use docdesk::live::{Dispatcher, LiveChannel};
use docdesk::page::Page;
use docdesk::state::{lock, shared, Config};

use common::{eventually, FakeBackend};

/// One entry per accepted connection: frames to send, then either close or
/// hold the socket until the client goes away.
struct Script {
    frames: Vec<&'static str>,
    close: bool,
}

async fn serve(scripts: Vec<Script>) -> (String, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let handle = tokio::spawn(async move {
        for script in scripts {
            let (stream, _) = listener.accept().await.unwrap();
            let mut ws = accept_async(stream).await.unwrap();
            for frame in script.frames {
                ws.send(Message::Text(frame.to_string())).await.unwrap();
            }
            if script.close {
                let _ = ws.close(None).await;
            } else {
                while let Some(Ok(_)) = ws.next().await {}
            }
        }
    });
    (format!("ws://{}/ws", addr), handle)
}

fn fast_reconnect() -> ReconnectConfig {
    ReconnectConfig {
        base_delay_ms: 20,
        max_delay_ms: 100,
        jitter_factor: 0.0,
        max_attempts: None,
    }
}

#[tokio::test]
async fn frames_update_tracked_regions() {
    let (url, _server) = serve(vec![Script {
        frames: vec![
            r#"{"type":"verification_update","result":{"status":"verified","riskScore":0.05}}"#,
            r#"{"type":"chart_refresh"}"#,
            "garbage",
            r#"{"type":"payment_update","payment":{"transactionId":"T9","amount":42,"currency":"USD","status":"completed","timestamp":1700000000000}}"#,
            r#"{"type":"dashboard_update","stats":{"documentsProcessed":12,"pendingVerification":3,"completedPayments":8}}"#,
        ],
        close: false,
    }])
    .await;

    let state = shared(Page::new());
    let channel = LiveChannel::new(&url, fast_reconnect(), Dispatcher::new(state.clone()));
    channel.attach();

    eventually("stats frame", || lock(&state).page.stats.documents_processed == "12").await;
    assert_eq!(channel.state(), ConnState::Connected);

    {
        let st = lock(&state);
        assert!(st.page.verification_status.contains("Status: verified"));
        assert_eq!(st.page.payment_history.len(), 1);
        assert!(st.page.payment_history[0].contains("42 USD"));
        assert_eq!(st.page.stats.completed_payments, "8");
    }

    channel.shutdown().await;
    assert_eq!(channel.state(), ConnState::Disconnected);
    assert!(!channel.is_running());
    assert!(!channel.is_attached());
}

#[tokio::test]
async fn reconnects_after_server_closes() {
    let (url, _server) = serve(vec![
        Script {
            frames: vec![r#"{"type":"dashboard_update","stats":{"documentsProcessed":1,"pendingVerification":0,"completedPayments":0}}"#],
            close: true,
        },
        Script {
            frames: vec![r#"{"type":"dashboard_update","stats":{"documentsProcessed":2,"pendingVerification":0,"completedPayments":0}}"#],
            close: false,
        },
    ])
    .await;

    let state = shared(Page::new());
    let channel = LiveChannel::new(&url, fast_reconnect(), Dispatcher::new(state.clone()));
    let mut states = channel.subscribe();
    channel.attach();

    eventually("second connection", || lock(&state).page.stats.documents_processed == "2").await;
    eventually("connected", || channel.state() == ConnState::Connected).await;
    assert!(channel.is_running());

    assert!(states.has_changed().unwrap());

    channel.shutdown().await;
    assert_eq!(channel.state(), ConnState::Disconnected);
}

#[tokio::test]
async fn gives_up_after_max_attempts() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let state = shared(Page::new());
    let channel = LiveChannel::new(
        &format!("ws://{}/ws", addr),
        ReconnectConfig {
            base_delay_ms: 5,
            max_delay_ms: 20,
            jitter_factor: 0.0,
            max_attempts: Some(2),
        },
        Dispatcher::new(state.clone()),
    );
    channel.attach();

    eventually("task to end", || !channel.is_running()).await;
    assert_eq!(channel.state(), ConnState::Disconnected);
    assert!(!channel.is_attached());
    assert_eq!(lock(&state).page, Page::new());

    channel.attach();
    assert!(channel.is_attached());
    eventually("second task to end", || !channel.is_running()).await;
    assert!(!channel.is_attached());
}

#[tokio::test]
async fn reattach_after_giving_up_reaches_server() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let state = shared(Page::new());
    let channel = LiveChannel::new(
        &format!("ws://{}/ws", addr),
        ReconnectConfig {
            base_delay_ms: 5,
            max_delay_ms: 20,
            jitter_factor: 0.0,
            max_attempts: Some(1),
        },
        Dispatcher::new(state.clone()),
    );
    channel.attach();
    eventually("task to end", || !channel.is_running()).await;

    let listener = TcpListener::bind(addr).await.unwrap();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        ws.send(Message::Text(
            r#"{"type":"dashboard_update","stats":{"documentsProcessed":5,"pendingVerification":0,"completedPayments":0}}"#.to_string(),
        ))
        .await
        .unwrap();
        while let Some(Ok(_)) = ws.next().await {}
    });

    channel.attach();
    eventually("stats after re-attach", || lock(&state).page.stats.documents_processed == "5").await;
    assert_eq!(channel.state(), ConnState::Connected);

    channel.shutdown().await;
    server.abort();
}

#[tokio::test]
async fn shutdown_while_dialing_ends_disconnected() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let channel = LiveChannel::new(
        &format!("ws://{}/ws", addr),
        ReconnectConfig {
            base_delay_ms: 1000,
            max_delay_ms: 1000,
            jitter_factor: 0.0,
            max_attempts: None,
        },
        Dispatcher::new(shared(Page::new())),
    );
    channel.attach();
    assert!(channel.is_attached());

    channel.shutdown().await;
    assert_eq!(channel.state(), ConnState::Disconnected);
    assert!(!channel.is_running());
}

#[tokio::test]
async fn app_attach_opens_channel_and_dispose_closes_it() {
    let (url, _server) = serve(vec![Script {
        frames: vec![r#"{"type":"payment_update","payment":{"transactionId":"P1","status":"processing","message":"Payment processing"}}"#],
        close: false,
    }])
    .await;

    let cfg = Config {
        ws_url: url,
        reconnect: fast_reconnect(),
        ..Config::default()
    };
    let app = App::new(&cfg, Arc::new(FakeBackend::new()));
    app.attach();

    eventually("payment push", || app.snapshot().payment_history.len() == 1).await;
    let page = app.snapshot();
    assert_eq!(page.charts.len(), 2);
    assert!(page.payment_history[0].contains("Payment processing"));
    assert!(app.upload().is_attached());

    app.dispose().await;
    assert_eq!(app.live().state(), ConnState::Disconnected);
    assert!(!app.upload().is_attached());
    assert!(!app.navigation().is_attached());
}
