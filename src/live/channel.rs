use std::sync::{Arc, Mutex};

use futures_util::StreamExt;
use serde_json::json;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use super::backoff::ReconnectConfig;
use super::conn::{apply_event, ConnEvent, ConnState, Connection};
use super::Dispatcher;
use crate::component::Component;
use crate::logging::{log, log_transition, obj, v_str, Domain, Level};

struct Running {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

/// The one process-wide push socket. Attaching spawns the reconnect loop on
/// the current tokio runtime; inbound frames go to the dispatcher and
/// nothing is ever sent.
pub struct LiveChannel {
    url: String,
    reconnect: ReconnectConfig,
    dispatcher: Dispatcher,
    status: Arc<watch::Sender<ConnState>>,
    running: Mutex<Option<Running>>,
}

impl LiveChannel {
    pub fn new(url: &str, reconnect: ReconnectConfig, dispatcher: Dispatcher) -> Self {
        let (status, _) = watch::channel(ConnState::Disconnected);
        Self {
            url: url.to_string(),
            reconnect,
            dispatcher,
            status: Arc::new(status),
            running: Mutex::new(None),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn state(&self) -> ConnState {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnState> {
        self.status.subscribe()
    }

    /// False once the socket task has ended, including after giving up on
    /// reconnecting.
    pub fn is_running(&self) -> bool {
        match self.running.lock() {
            Ok(g) => g.as_ref().map(|r| !r.task.is_finished()).unwrap_or(false),
            Err(poisoned) => poisoned
                .into_inner()
                .as_ref()
                .map(|r| !r.task.is_finished())
                .unwrap_or(false),
        }
    }

    /// Dispose and wait for the socket task to finish.
    pub async fn shutdown(&self) {
        let running = self.take_running();
        if let Some(r) = running {
            let _ = r.shutdown.send(true);
            let _ = r.task.await;
        }
    }

    fn take_running(&self) -> Option<Running> {
        match self.running.lock() {
            Ok(mut g) => g.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }
}

impl Component for LiveChannel {
    fn name(&self) -> &'static str {
        "live"
    }

    fn attach(&self) {
        let mut running = match self.running.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        if running.as_ref().is_some_and(|r| !r.task.is_finished()) {
            return;
        }
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = tokio::spawn(run(
            self.url.clone(),
            self.reconnect.clone(),
            self.dispatcher.clone(),
            self.status.clone(),
            shutdown_rx,
        ));
        *running = Some(Running { shutdown, task });
    }

    fn dispose(&self) {
        if let Some(r) = self.take_running() {
            let _ = r.shutdown.send(true);
        }
    }

    /// A task that gave up reconnecting counts as detached; `attach` starts
    /// a fresh one.
    fn is_attached(&self) -> bool {
        self.is_running()
    }
}

fn step(conn: &mut Connection, event: ConnEvent, status: &watch::Sender<ConnState>) {
    let prev = conn.state;
    if let Err(e) = apply_event(conn, event) {
        log(Level::Warn, Domain::Live, "conn_transition_rejected", obj(&[("msg", v_str(&e.msg))]));
        return;
    }
    if prev != conn.state {
        log_transition(prev.as_str(), conn.state.as_str(), conn.failed_dials);
    }
    status.send_replace(conn.state);
}

async fn run(
    url: String,
    reconnect: ReconnectConfig,
    dispatcher: Dispatcher,
    status: Arc<watch::Sender<ConnState>>,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut conn = Connection::new();

    loop {
        if *shutdown.borrow() {
            break;
        }
        step(&mut conn, ConnEvent::Dial, &status);

        let dialed = tokio::select! {
            r = connect_async(url.as_str()) => r,
            _ = shutdown.changed() => break,
        };

        match dialed {
            Ok((mut ws, _)) => {
                step(&mut conn, ConnEvent::Opened, &status);
                loop {
                    tokio::select! {
                        frame = ws.next() => match frame {
                            Some(Ok(Message::Text(text))) => {
                                dispatcher.dispatch_text(&text);
                            }
                            Some(Ok(Message::Binary(bytes))) => match String::from_utf8(bytes) {
                                Ok(text) => {
                                    dispatcher.dispatch_text(&text);
                                }
                                Err(_) => log(Level::Warn, Domain::Live, "binary_frame_dropped", obj(&[])),
                            },
                            Some(Ok(Message::Close(_))) | None => break,
                            Some(Ok(_)) => {}
                            Some(Err(e)) => {
                                log(Level::Error, Domain::Live, "socket_error", obj(&[("msg", v_str(&e.to_string()))]));
                                break;
                            }
                        },
                        _ = shutdown.changed() => {
                            let _ = ws.close(None).await;
                            step(&mut conn, ConnEvent::Dispose, &status);
                            return;
                        }
                    }
                }
                step(&mut conn, ConnEvent::Dropped, &status);
            }
            Err(e) => {
                log(
                    Level::Warn,
                    Domain::Live,
                    "dial_failed",
                    obj(&[("msg", v_str(&e.to_string())), ("url", v_str(&url))]),
                );
                step(&mut conn, ConnEvent::DialFailed, &status);
            }
        }

        if reconnect.exhausted(conn.failed_dials) {
            log(
                Level::Error,
                Domain::Live,
                "reconnect_exhausted",
                obj(&[("failed_dials", json!(conn.failed_dials))]),
            );
            break;
        }
        let delay = reconnect.delay_for_attempt(conn.failed_dials.saturating_sub(1));
        log(
            Level::Info,
            Domain::Live,
            "reconnect_scheduled",
            obj(&[("delay_ms", json!(delay.as_millis() as u64))]),
        );
        tokio::select! {
            _ = sleep(delay) => {}
            _ = shutdown.changed() => break,
        }
    }

    step(&mut conn, ConnEvent::Dispose, &status);
}
