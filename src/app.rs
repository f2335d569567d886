use std::path::PathBuf;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::json;

use crate::api::{Backend, FileSet, PaymentForm};
use crate::component::Component;
use crate::flows::{PaymentFlow, UploadFlow};
use crate::live::{Dispatcher, LiveChannel};
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::nav::Navigation;
use crate::page::{dashboard_charts, Page};
use crate::reporter::Reporter;
use crate::state::{lock, shared, Config, Shared};

/// User interactions, one per DOM event the page listens for.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum UiEvent {
    NavClick { target: String },
    DragOver,
    DragLeave,
    DropFiles { paths: Vec<PathBuf> },
    PickFiles { paths: Vec<PathBuf> },
    SubmitPayment {
        #[serde(flatten)]
        form: PaymentForm,
    },
    CheckPayment { id: String },
    CheckDocument { id: String },
    Snapshot,
}

impl UiEvent {
    /// Parses one driver line. Blank lines give `None`; malformed JSON is
    /// logged as `bad_event` and also gives `None`.
    pub fn from_line(line: &str) -> Option<UiEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        match serde_json::from_str(line) {
            Ok(event) => Some(event),
            Err(err) => {
                log(
                    Level::Warn,
                    Domain::System,
                    "bad_event",
                    obj(&[("msg", v_str(&err.to_string())), ("line", v_str(line))]),
                );
                None
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            UiEvent::NavClick { .. } => "nav_click",
            UiEvent::DragOver => "drag_over",
            UiEvent::DragLeave => "drag_leave",
            UiEvent::DropFiles { .. } => "drop_files",
            UiEvent::PickFiles { .. } => "pick_files",
            UiEvent::SubmitPayment { .. } => "submit_payment",
            UiEvent::CheckPayment { .. } => "check_payment",
            UiEvent::CheckDocument { .. } => "check_document",
            UiEvent::Snapshot => "snapshot",
        }
    }
}

/// All components, built once and sharing one page.
#[derive(Clone)]
pub struct App {
    state: Shared,
    reporter: Arc<Reporter>,
    nav: Arc<Navigation>,
    upload: UploadFlow,
    payment: PaymentFlow,
    live: Arc<LiveChannel>,
}

impl App {
    pub fn new(cfg: &Config, backend: Arc<dyn Backend>) -> Self {
        Self::with_page(cfg, backend, Page::new())
    }

    pub fn with_page(cfg: &Config, backend: Arc<dyn Backend>, page: Page) -> Self {
        let state = shared(page);
        let reporter = Arc::new(Reporter::new());
        Self {
            nav: Arc::new(Navigation::new(state.clone())),
            upload: UploadFlow::new(backend.clone(), state.clone(), reporter.clone()),
            payment: PaymentFlow::new(backend, state.clone(), reporter.clone()),
            live: Arc::new(LiveChannel::new(
                &cfg.ws_url,
                cfg.reconnect.clone(),
                Dispatcher::new(state.clone()),
            )),
            state,
            reporter,
        }
    }

    /// Loads the dashboard charts, registers every handler and opens the
    /// push channel. Must run inside a tokio runtime.
    pub fn attach(&self) {
        lock(&self.state).page.charts = dashboard_charts();
        self.nav.attach();
        self.upload.attach();
        self.payment.attach();
        self.live.attach();
        log(
            Level::Info,
            Domain::System,
            "attached",
            obj(&[("ws_url", v_str(self.live.url()))]),
        );
    }

    pub async fn dispose(&self) {
        self.nav.dispose();
        self.upload.dispose();
        self.payment.dispose();
        self.live.shutdown().await;
        log(Level::Info, Domain::System, "disposed", obj(&[]));
    }

    pub async fn handle(&self, event: UiEvent) {
        log(
            Level::Debug,
            Domain::System,
            "ui_event",
            obj(&[("kind", v_str(event.kind()))]),
        );
        match event {
            UiEvent::NavClick { target } => {
                self.nav.click(&target);
            }
            UiEvent::DragOver => self.upload.drag_over(),
            UiEvent::DragLeave => self.upload.drag_leave(),
            UiEvent::DropFiles { paths } => {
                if let Some(files) = self.read_files(&paths) {
                    self.upload.drop_files(files).await;
                }
            }
            UiEvent::PickFiles { paths } => {
                if let Some(files) = self.read_files(&paths) {
                    self.upload.pick_files(files).await;
                }
            }
            UiEvent::SubmitPayment { form } => self.payment.submit_payment(&form).await,
            UiEvent::CheckPayment { id } => self.payment.check_status(&id).await,
            UiEvent::CheckDocument { id } => self.upload.check_document(&id).await,
            UiEvent::Snapshot => {
                let page = self.snapshot();
                log(
                    Level::Info,
                    Domain::System,
                    "snapshot",
                    obj(&[
                        ("digest", v_str(&page.digest())),
                        ("page", json!(page)),
                    ]),
                );
            }
        }
    }

    fn read_files(&self, paths: &[PathBuf]) -> Option<FileSet> {
        match FileSet::from_paths(paths) {
            Ok(files) => Some(files),
            Err(e) => {
                self.reporter
                    .error(&format!("File upload failed: could not read file: {}", e));
                None
            }
        }
    }

    pub fn snapshot(&self) -> Page {
        lock(&self.state).page.clone()
    }

    pub fn state(&self) -> &Shared {
        &self.state
    }

    pub fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    pub fn navigation(&self) -> &Navigation {
        &self.nav
    }

    pub fn upload(&self) -> &UploadFlow {
        &self.upload
    }

    pub fn payment(&self) -> &PaymentFlow {
        &self.payment
    }

    pub fn live(&self) -> &LiveChannel {
        &self.live
    }
}
