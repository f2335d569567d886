use std::sync::Mutex;

use serde::Serialize;

use crate::logging::{log, obj, ts_now, v_str, Domain, Level};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub ts: String,
}

/// The single sink for flow outcomes. Notices are logged and kept in memory;
/// nothing is drawn on the page.
#[derive(Debug, Default)]
pub struct Reporter {
    notices: Mutex<Vec<Notice>>,
}

impl Reporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn success(&self, message: &str) {
        log(Level::Info, Domain::System, "success", obj(&[("msg", v_str(message))]));
        self.push(NoticeKind::Success, message);
    }

    pub fn error(&self, message: &str) {
        log(Level::Error, Domain::System, "error", obj(&[("msg", v_str(message))]));
        self.push(NoticeKind::Error, message);
    }

    pub fn notices(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(n) => n.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn errors(&self) -> Vec<String> {
        self.messages(NoticeKind::Error)
    }

    pub fn successes(&self) -> Vec<String> {
        self.messages(NoticeKind::Success)
    }

    fn messages(&self, kind: NoticeKind) -> Vec<String> {
        self.notices()
            .into_iter()
            .filter(|n| n.kind == kind)
            .map(|n| n.message)
            .collect()
    }

    fn push(&self, kind: NoticeKind, message: &str) {
        let notice = Notice {
            kind,
            message: message.to_string(),
            ts: ts_now(),
        };
        match self.notices.lock() {
            Ok(mut n) => n.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}
