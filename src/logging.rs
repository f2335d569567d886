//! Structured logging for the docdesk client.
//!
//! One JSON object per line: run id, sequence number, level, domain, event,
//! lifted correlation keys and a `data` map. Lines go to stdout (stderr from
//! warn up). With `LOG_DIR` set, they are also appended under
//! `<LOG_DIR>/<run_id>/`, debug and trace to `trace.jsonl`, the rest to
//! `events.jsonl`. The reporter's notices are ordinary records here.
//!
//! Filters are read once: `LOG_LEVEL` (default `info`) and `LOG_DOMAINS`
//! (comma list or `all`).

use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, OnceLock};
use std::time::Instant;

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use serde::Serialize;
use serde_json::{json, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
}

impl FromStr for Level {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.trim().to_ascii_lowercase().as_str() {
            "trace" => Level::Trace,
            "debug" => Level::Debug,
            "info" => Level::Info,
            "warn" | "warning" => Level::Warn,
            "error" => Level::Error,
            "fatal" => Level::Fatal,
            _ => return Err(()),
        })
    }
}

impl Level {
    pub fn as_str(&self) -> &'static str {
        match self {
            Level::Trace => "trace",
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
            Level::Fatal => "fatal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    Nav,
    Upload,
    Verify,
    Payment,
    Live,
    Render,
    System,
    /// Request timings from `ProfileScope`.
    Profile,
}

impl Domain {
    pub const ALL: [Domain; 8] = [
        Domain::Nav,
        Domain::Upload,
        Domain::Verify,
        Domain::Payment,
        Domain::Live,
        Domain::Render,
        Domain::System,
        Domain::Profile,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Nav => "nav",
            Domain::Upload => "upload",
            Domain::Verify => "verify",
            Domain::Payment => "payment",
            Domain::Live => "live",
            Domain::Render => "render",
            Domain::System => "system",
            Domain::Profile => "profile",
        }
    }
}

struct Filter {
    min: Level,
    domains: Vec<Domain>,
}

impl Filter {
    fn parse(level: Option<&str>, domains: Option<&str>) -> Self {
        let min = level.and_then(|l| l.parse().ok()).unwrap_or(Level::Info);
        let domains = match domains.map(str::trim) {
            None | Some("") | Some("all") => Domain::ALL.to_vec(),
            Some(list) => Domain::ALL
                .iter()
                .copied()
                .filter(|d| list.split(',').any(|name| name.trim() == d.as_str()))
                .collect(),
        };
        Self { min, domains }
    }

    fn admits(&self, level: Level, domain: Domain) -> bool {
        level >= self.min && self.domains.contains(&domain)
    }
}

fn filter() -> &'static Filter {
    static FILTER: OnceLock<Filter> = OnceLock::new();
    FILTER.get_or_init(|| {
        Filter::parse(
            std::env::var("LOG_LEVEL").ok().as_deref(),
            std::env::var("LOG_DOMAINS").ok().as_deref(),
        )
    })
}

static SEQ: AtomicU64 = AtomicU64::new(0);

struct RunLog {
    id: String,
    files: Option<RunFiles>,
}

struct RunFiles {
    events: Mutex<BufWriter<File>>,
    trace: Mutex<BufWriter<File>>,
}

impl RunFiles {
    fn open(dir: &Path, run_id: &str) -> std::io::Result<Self> {
        fs::create_dir_all(dir)?;
        fs::write(
            dir.join("manifest.json"),
            json!({
                "run_id": run_id,
                "started": ts_now(),
                "pid": process::id(),
                "crate": env!("CARGO_PKG_NAME"),
                "version": env!("CARGO_PKG_VERSION"),
            })
            .to_string(),
        )?;
        let append = |name: &str| -> std::io::Result<Mutex<BufWriter<File>>> {
            let f = OpenOptions::new()
                .create(true)
                .append(true)
                .open(dir.join(name))?;
            Ok(Mutex::new(BufWriter::new(f)))
        };
        Ok(Self {
            events: append("events.jsonl")?,
            trace: append("trace.jsonl")?,
        })
    }

    fn write(&self, level: Level, line: &str) {
        let sink = if level <= Level::Debug {
            &self.trace
        } else {
            &self.events
        };
        if let Ok(mut w) = sink.lock() {
            let _ = writeln!(w, "{}", line).and_then(|_| w.flush());
        }
    }
}

fn run_log() -> &'static RunLog {
    static RUN: OnceLock<RunLog> = OnceLock::new();
    RUN.get_or_init(|| {
        let id = std::env::var("RUN_ID")
            .unwrap_or_else(|_| format!("dd-{}-{}", ts_epoch_ms(), process::id()));
        let files = std::env::var("LOG_DIR").ok().and_then(|base| {
            let dir = PathBuf::from(base).join(&id);
            match RunFiles::open(&dir, &id) {
                Ok(files) => Some(files),
                Err(err) => {
                    eprintln!("[log] cannot open {}: {}", dir.display(), err);
                    None
                }
            }
        });
        RunLog { id, files }
    })
}

pub fn ts_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn ts_epoch_ms() -> u64 {
    Utc::now().timestamp_millis().max(0) as u64
}

pub fn run_id() -> &'static str {
    &run_log().id
}

const REDACT: [&str; 5] = ["authorization", "cookie", "api_key", "token", "password"];
const LIFTED: [&str; 3] = ["stream", "ticket", "endpoint"];

#[derive(Serialize)]
struct Record<'a> {
    ts: String,
    run_id: &'a str,
    seq: u64,
    lvl: &'static str,
    domain: &'static str,
    event: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    msg: Option<Value>,
    #[serde(flatten)]
    lifted: Map<String, Value>,
    data: Map<String, Value>,
}

fn redact(fields: &mut Map<String, Value>) {
    for (key, value) in fields.iter_mut() {
        if REDACT.iter().any(|r| key.eq_ignore_ascii_case(r)) {
            *value = Value::String("[REDACTED]".into());
        }
    }
}

fn build_line(level: Level, domain: Domain, event: &str, mut data: Map<String, Value>) -> String {
    redact(&mut data);
    let msg = data.remove("msg");
    let mut lifted = Map::new();
    for key in LIFTED {
        if let Some(v) = data.remove(key) {
            lifted.insert(key.to_string(), v);
        }
    }
    let record = Record {
        ts: ts_now(),
        run_id: run_id(),
        seq: SEQ.fetch_add(1, Ordering::Relaxed),
        lvl: level.as_str(),
        domain: domain.as_str(),
        event,
        msg,
        lifted,
        data,
    };
    serde_json::to_string(&record).unwrap_or_else(|e| {
        json!({"lvl": "error", "event": "log_encode_failed", "msg": e.to_string()}).to_string()
    })
}

pub fn log(level: Level, domain: Domain, event: &str, fields: Map<String, Value>) {
    if !filter().admits(level, domain) {
        return;
    }
    let line = build_line(level, domain, event, fields);
    if let Some(files) = &run_log().files {
        files.write(level, &line);
    }
    if level >= Level::Warn {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

pub fn log_request(domain: Domain, method: &str, endpoint: &str) {
    log(
        Level::Debug,
        domain,
        "request",
        obj(&[("method", v_str(method)), ("endpoint", v_str(endpoint))]),
    );
}

/// Non-2xx answers are logged at warn.
pub fn log_response(domain: Domain, endpoint: &str, status: u16) {
    let level = match status {
        200..=299 => Level::Debug,
        _ => Level::Warn,
    };
    log(
        level,
        domain,
        "response",
        obj(&[("endpoint", v_str(endpoint)), ("status", json!(status))]),
    );
}

pub fn log_render(region: &str, digest: &str) {
    log(
        Level::Trace,
        Domain::Render,
        "region_write",
        obj(&[("region", v_str(region)), ("digest", v_str(digest))]),
    );
}

pub fn log_superseded(stream: &str, ticket: u64, applied: u64) {
    log(
        Level::Info,
        Domain::Render,
        "superseded",
        obj(&[
            ("stream", v_str(stream)),
            ("ticket", json!(ticket)),
            ("applied", json!(applied)),
        ]),
    );
}

pub fn log_transition(prev: &str, next: &str, failed_dials: u32) {
    log(
        Level::Info,
        Domain::Live,
        "conn_state",
        obj(&[
            ("from", v_str(prev)),
            ("to", v_str(next)),
            ("failed_dials", json!(failed_dials)),
        ]),
    );
}

pub fn obj(pairs: &[(&str, Value)]) -> Map<String, Value> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect()
}

pub fn v_str(s: &str) -> Value {
    Value::String(s.to_string())
}

pub fn v_num(n: f64) -> Value {
    json!(n)
}

/// Logs the elapsed time of a scope when dropped. `PROFILE_SAMPLE` in
/// `[0, 1]` keeps that fraction of scopes; unset keeps all.
pub struct ProfileScope {
    label: &'static str,
    started: Instant,
    context: Option<Map<String, Value>>,
}

impl ProfileScope {
    pub fn with_context(label: &'static str, fields: &[(&str, Value)]) -> Self {
        let sampled = filter().admits(Level::Trace, Domain::Profile) && sample(profile_rate());
        Self {
            label,
            started: Instant::now(),
            context: sampled.then(|| obj(fields)),
        }
    }
}

fn profile_rate() -> f64 {
    static RATE: OnceLock<f64> = OnceLock::new();
    *RATE.get_or_init(|| {
        std::env::var("PROFILE_SAMPLE")
            .ok()
            .and_then(|v| v.parse::<f64>().ok())
            .unwrap_or(1.0)
            .clamp(0.0, 1.0)
    })
}

fn sample(rate: f64) -> bool {
    rate >= 1.0 || (rate > 0.0 && rand::thread_rng().gen_bool(rate))
}

impl Drop for ProfileScope {
    fn drop(&mut self) {
        let Some(mut fields) = self.context.take() else {
            return;
        };
        fields.insert("label".into(), v_str(self.label));
        fields.insert(
            "elapsed_ms".into(),
            v_num(self.started.elapsed().as_secs_f64() * 1000.0),
        );
        log(Level::Trace, Domain::Profile, "elapsed", fields);
    }
}
