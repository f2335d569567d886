//! Push channel: typed server messages, the dispatcher that renders them, and
//! the reconnecting socket task.

use serde::Deserialize;
use serde_json::json;

use crate::api::{DashboardStats, PaymentRecord, VerificationResult};
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::sequencer::Stream;
use crate::state::{lock, Shared};

pub mod backoff;
mod channel;
pub mod conn;

pub use channel::LiveChannel;

/// Inbound frames, discriminated by `type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PushMessage {
    VerificationUpdate { result: VerificationResult },
    PaymentUpdate { payment: PaymentRecord },
    DashboardUpdate { stats: DashboardStats },
    #[serde(other)]
    Unknown,
}

impl PushMessage {
    pub fn kind(&self) -> &'static str {
        match self {
            PushMessage::VerificationUpdate { .. } => "verification_update",
            PushMessage::PaymentUpdate { .. } => "payment_update",
            PushMessage::DashboardUpdate { .. } => "dashboard_update",
            PushMessage::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dispatch {
    Applied(Stream),
    Superseded(Stream),
    Ignored,
    Malformed,
}

#[derive(Clone)]
pub struct Dispatcher {
    state: Shared,
}

impl Dispatcher {
    pub fn new(state: Shared) -> Self {
        Self { state }
    }

    pub fn dispatch_text(&self, text: &str) -> Dispatch {
        match serde_json::from_str::<PushMessage>(text) {
            Ok(msg) => self.dispatch(msg),
            Err(e) => {
                log(
                    Level::Warn,
                    Domain::Live,
                    "malformed_frame",
                    obj(&[("error", v_str(&e.to_string())), ("len", json!(text.len()))]),
                );
                Dispatch::Malformed
            }
        }
    }

    pub fn dispatch(&self, msg: PushMessage) -> Dispatch {
        log(
            Level::Debug,
            Domain::Live,
            "push",
            obj(&[("kind", v_str(msg.kind()))]),
        );
        let mut st = lock(&self.state);
        let (stream, applied) = match &msg {
            PushMessage::VerificationUpdate { result } => {
                let ticket = st.seq.ticket(Stream::Verification);
                (ticket.stream, st.apply(ticket, |p| p.set_verification(result)))
            }
            PushMessage::PaymentUpdate { payment } => {
                let ticket = st.seq.ticket(Stream::Payment);
                (ticket.stream, st.apply(ticket, |p| p.prepend_payment(payment)))
            }
            PushMessage::DashboardUpdate { stats } => {
                let ticket = st.seq.ticket(Stream::Stats);
                (ticket.stream, st.apply(ticket, |p| p.set_stats(stats)))
            }
            PushMessage::Unknown => return Dispatch::Ignored,
        };
        if applied {
            Dispatch::Applied(stream)
        } else {
            Dispatch::Superseded(stream)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;
    use crate::state::shared;

    #[test]
    fn test_parse_known_and_unknown_types() {
        let msg: PushMessage = serde_json::from_str(
            r#"{"type":"dashboard_update","stats":{"documentsProcessed":5,"pendingVerification":"2","completedPayments":9}}"#,
        )
        .unwrap();
        assert_eq!(
            msg,
            PushMessage::DashboardUpdate {
                stats: DashboardStats {
                    documents_processed: "5".into(),
                    pending_verification: "2".into(),
                    completed_payments: "9".into(),
                }
            }
        );

        let unknown: PushMessage =
            serde_json::from_str(r#"{"type":"chart_refresh","data":[1,2,3]}"#).unwrap();
        assert_eq!(unknown, PushMessage::Unknown);
    }

    #[test]
    fn test_unknown_type_leaves_regions_identical() {
        let state = shared(Page::new());
        let d = Dispatcher::new(state.clone());
        d.dispatch_text(r#"{"type":"verification_update","result":{"status":"verified","riskScore":3}}"#);
        let before = lock(&state).page.clone();

        assert_eq!(d.dispatch_text(r#"{"type":"mystery","result":{"status":"x"}}"#), Dispatch::Ignored);
        let after = lock(&state).page.clone();
        assert_eq!(before.digest(), after.digest());
        assert_eq!(before, after);
    }

    #[test]
    fn test_malformed_frames_ignored() {
        let state = shared(Page::new());
        let d = Dispatcher::new(state.clone());
        let before = lock(&state).page.digest();
        assert_eq!(d.dispatch_text("not json"), Dispatch::Malformed);
        assert_eq!(d.dispatch_text(r#"{"type":"payment_update"}"#), Dispatch::Malformed);
        assert_eq!(lock(&state).page.digest(), before);
    }

    #[test]
    fn test_each_type_reaches_its_region() {
        let state = shared(Page::new());
        let d = Dispatcher::new(state.clone());

        assert_eq!(
            d.dispatch_text(r#"{"type":"verification_update","result":{"status":"processing","message":"Document verification in progress"}}"#),
            Dispatch::Applied(Stream::Verification)
        );
        assert_eq!(
            d.dispatch_text(r#"{"type":"payment_update","payment":{"status":"processing","message":"Payment processing"}}"#),
            Dispatch::Applied(Stream::Payment)
        );
        assert_eq!(
            d.dispatch_text(r#"{"type":"dashboard_update","stats":{"documentsProcessed":1,"pendingVerification":0,"completedPayments":4}}"#),
            Dispatch::Applied(Stream::Stats)
        );

        let st = lock(&state);
        assert!(st.page.verification_status.contains("Status: processing"));
        assert_eq!(st.page.payment_history.len(), 1);
        assert!(st.page.payment_history[0].contains("Payment processing"));
        assert_eq!(st.page.stats.completed_payments, "4");
    }
}
