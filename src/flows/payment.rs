use std::sync::Arc;

use crate::api::{Backend, PaymentForm, PaymentRequest};
use crate::component::{Component, Lifecycle};
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::reporter::Reporter;
use crate::sequencer::Stream;
use crate::state::{lock, Shared};

/// Payment form submission. Fields are forwarded unvalidated and no
/// idempotency key is sent, so a resubmission after a timeout may charge
/// twice.
#[derive(Clone)]
pub struct PaymentFlow {
    backend: Arc<dyn Backend>,
    state: Shared,
    reporter: Arc<Reporter>,
    lifecycle: Arc<Lifecycle>,
}

impl PaymentFlow {
    pub fn new(backend: Arc<dyn Backend>, state: Shared, reporter: Arc<Reporter>) -> Self {
        Self {
            backend,
            state,
            reporter,
            lifecycle: Arc::new(Lifecycle::new()),
        }
    }

    pub async fn submit_payment(&self, form: &PaymentForm) {
        if !self.lifecycle.accepts(Domain::Payment, self.name(), "submit") {
            return;
        }
        let body = PaymentRequest::from(form);
        let ticket = lock(&self.state).seq.ticket(Stream::Payment);
        log(
            Level::Info,
            Domain::Payment,
            "payment_submit",
            obj(&[
                ("amount", v_str(&body.amount)),
                ("currency", v_str(&body.currency)),
                ("method", v_str(&body.payment_method)),
            ]),
        );
        match self.backend.process_payment(&body).await {
            Ok(record) => {
                lock(&self.state).apply(ticket, |page| page.prepend_payment(&record));
                self.reporter.success("Payment processed successfully");
            }
            Err(e) => self.reporter.error(&format!("Payment failed: {}", e)),
        }
    }

    /// On-demand lookup; the page never polls this.
    pub async fn check_status(&self, payment_id: &str) {
        match self.backend.payment_status(payment_id).await {
            Ok(status) => self
                .reporter
                .success(&format!("Payment {}: {}", status.id, status.status)),
            Err(e) => self
                .reporter
                .error(&format!("Payment status lookup failed: {}", e)),
        }
    }
}

impl Component for PaymentFlow {
    fn name(&self) -> &'static str {
        "payment"
    }

    fn attach(&self) {
        self.lifecycle.attach();
    }

    fn dispose(&self) {
        self.lifecycle.dispose();
    }

    fn is_attached(&self) -> bool {
        self.lifecycle.is_attached()
    }
}
