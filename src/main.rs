use std::sync::Arc;

use anyhow::Result;
use tokio::io::{self, AsyncBufReadExt, BufReader};

use docdesk::api::{Backend, HttpBackend};
use docdesk::app::{App, UiEvent};
use docdesk::logging::{log, obj, v_str, Domain, Level};
use docdesk::state::Config;

/// Reads one JSON `UiEvent` per stdin line and feeds it to the page.
/// `{"type":"snapshot"}` prints the current page as JSON on stdout.
#[tokio::main]
async fn main() -> Result<()> {
    let cfg = Config::from_env();
    let backend = Arc::new(HttpBackend::new(&cfg)?);

    match backend.health().await {
        Ok(h) => log(Level::Info, Domain::System, "backend_health", obj(&[("status", v_str(&h.status))])),
        Err(e) => log(Level::Warn, Domain::System, "backend_unreachable", obj(&[("msg", v_str(&e.to_string()))])),
    }

    let app = App::new(&cfg, backend);
    app.attach();

    let mut lines = BufReader::new(io::stdin()).lines();
    let mut inflight = Vec::new();
    while let Some(line) = lines.next_line().await? {
        let Some(event) = UiEvent::from_line(&line) else {
            continue;
        };
        if let UiEvent::Snapshot = event {
            println!("{}", serde_json::to_string_pretty(&app.snapshot())?);
            continue;
        }
        let app = app.clone();
        inflight.push(tokio::spawn(async move { app.handle(event).await }));
        inflight.retain(|h| !h.is_finished());
    }

    for h in inflight {
        let _ = h.await;
    }
    app.dispose().await;
    Ok(())
}
