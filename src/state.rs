use std::sync::{Arc, Mutex, MutexGuard};

use url::Url;

use crate::live::backoff::ReconnectConfig;
use crate::logging::log_superseded;
use crate::page::Page;
use crate::sequencer::{Sequencer, Ticket};

pub const DEFAULT_API_BASE: &str = "http://localhost:8001";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub api_base: String,
    pub ws_url: String,
    /// `None` leaves HTTP requests without a deadline.
    pub request_timeout_secs: Option<u64>,
    pub reconnect: ReconnectConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            ws_url: derive_ws_url(DEFAULT_API_BASE).unwrap_or_else(|| "ws://localhost:8001/ws".to_string()),
            request_timeout_secs: None,
            reconnect: ReconnectConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let api_base = std::env::var("API_BASE").unwrap_or_else(|_| DEFAULT_API_BASE.to_string());
        let ws_url = std::env::var("WS_URL")
            .ok()
            .or_else(|| derive_ws_url(&api_base))
            .unwrap_or_else(|| Config::default().ws_url);
        Self {
            api_base,
            ws_url,
            request_timeout_secs: std::env::var("REQUEST_TIMEOUT_SECS").ok().and_then(|v| v.parse().ok()),
            reconnect: ReconnectConfig::from_env(),
        }
    }
}

/// `http://host:port/...` becomes `ws://host:port/ws` (`https` becomes `wss`).
pub fn derive_ws_url(api_base: &str) -> Option<String> {
    let mut url = Url::parse(api_base).ok()?;
    let scheme = match url.scheme() {
        "https" => "wss",
        "http" => "ws",
        _ => return None,
    };
    url.set_scheme(scheme).ok()?;
    url.set_path("/ws");
    url.set_query(None);
    Some(url.to_string())
}

/// Everything the flows and the push channel write to.
#[derive(Debug, Default)]
pub struct AppState {
    pub page: Page,
    pub seq: Sequencer,
}

impl AppState {
    /// Runs `write` against the page unless `ticket` has been superseded.
    pub fn apply(&mut self, ticket: Ticket, write: impl FnOnce(&mut Page)) -> bool {
        if self.seq.admit(ticket) {
            write(&mut self.page);
            return true;
        }
        log_superseded(
            ticket.stream.as_str(),
            ticket.seq,
            self.seq.last_applied(ticket.stream),
        );
        false
    }
}

pub type Shared = Arc<Mutex<AppState>>;

pub fn shared(page: Page) -> Shared {
    Arc::new(Mutex::new(AppState {
        page,
        seq: Sequencer::new(),
    }))
}

/// Writers never hold the lock across an await, so a poisoned lock still
/// guards a consistent page.
pub fn lock(state: &Shared) -> MutexGuard<'_, AppState> {
    match state.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}
