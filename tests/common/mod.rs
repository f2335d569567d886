#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Notify;

use docdesk::api::{
    Backend, FileSet, HealthStatus, PaymentRecord, PaymentRequest, ResourceStatus, UploadResponse,
    UploadedFile, VerificationResult, VerifyRequest,
};
use docdesk::error::{ApiError, ApiResult};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Upload(Vec<String>),
    Verify(VerifyRequest),
    Payment(PaymentRequest),
    PaymentStatus(String),
    DocumentStatus(String),
    Health,
}

/// Scripted backend. `Err(msg)` replies become the matching `ApiError`.
pub struct FakeBackend {
    pub upload_reply: Mutex<Result<UploadResponse, String>>,
    pub verify_reply: Mutex<Result<VerificationResult, String>>,
    pub payment_reply: Mutex<Result<PaymentRecord, String>>,
    pub calls: Mutex<Vec<Call>>,
    /// When set, `verify` signals `verify_entered` and waits for `verify_release`.
    pub hold_verify: AtomicBool,
    pub verify_entered: Notify,
    pub verify_release: Notify,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self {
            upload_reply: Mutex::new(Ok(UploadResponse { files: vec![] })),
            verify_reply: Mutex::new(Ok(VerificationResult::default())),
            payment_reply: Mutex::new(Ok(PaymentRecord::default())),
            calls: Mutex::new(Vec::new()),
            hold_verify: AtomicBool::new(false),
            verify_entered: Notify::new(),
            verify_release: Notify::new(),
        }
    }

    pub fn with_upload(self, reply: Result<UploadResponse, String>) -> Self {
        *self.upload_reply.lock().unwrap() = reply;
        self
    }

    pub fn with_verify(self, reply: Result<VerificationResult, String>) -> Self {
        *self.verify_reply.lock().unwrap() = reply;
        self
    }

    pub fn with_payment(self, reply: Result<PaymentRecord, String>) -> Self {
        *self.payment_reply.lock().unwrap() = reply;
        self
    }

    pub fn holding_verify(self) -> Self {
        self.hold_verify.store(true, Ordering::SeqCst);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn verify_calls(&self) -> Vec<VerifyRequest> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Verify(v) => Some(v),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn upload(&self, files: &FileSet) -> ApiResult<UploadResponse> {
        self.record(Call::Upload(
            files.names().into_iter().map(String::from).collect(),
        ));
        self.upload_reply.lock().unwrap().clone().map_err(ApiError::Upload)
    }

    async fn verify(&self, req: &VerifyRequest) -> ApiResult<VerificationResult> {
        self.record(Call::Verify(req.clone()));
        if self.hold_verify.load(Ordering::SeqCst) {
            self.verify_entered.notify_one();
            self.verify_release.notified().await;
        }
        self.verify_reply
            .lock()
            .unwrap()
            .clone()
            .map_err(ApiError::Verification)
    }

    async fn process_payment(&self, req: &PaymentRequest) -> ApiResult<PaymentRecord> {
        self.record(Call::Payment(req.clone()));
        self.payment_reply.lock().unwrap().clone().map_err(ApiError::Payment)
    }

    async fn payment_status(&self, payment_id: &str) -> ApiResult<ResourceStatus> {
        self.record(Call::PaymentStatus(payment_id.to_string()));
        Ok(ResourceStatus {
            id: payment_id.to_string(),
            status: "processing".to_string(),
        })
    }

    async fn document_status(&self, document_id: &str) -> ApiResult<ResourceStatus> {
        self.record(Call::DocumentStatus(document_id.to_string()));
        Err(ApiError::Status("404 Not Found".to_string()))
    }

    async fn health(&self) -> ApiResult<HealthStatus> {
        self.record(Call::Health);
        Ok(HealthStatus {
            status: "healthy".to_string(),
        })
    }
}

pub fn pending(names: &[&str]) -> Vec<UploadedFile> {
    names
        .iter()
        .map(|n| UploadedFile::new(n, "pending"))
        .collect()
}

pub fn file_set(names: &[&str]) -> FileSet {
    FileSet::new(
        names
            .iter()
            .map(|n| docdesk::api::FilePart {
                name: n.to_string(),
                bytes: format!("%PDF-{}", n).into_bytes(),
            })
            .collect(),
    )
}

/// Polls `check` until it holds or five seconds pass.
pub async fn eventually<F: Fn() -> bool>(what: &str, check: F) {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !check() {
        if tokio::time::Instant::now() > deadline {
            panic!("timed out waiting for {}", what);
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
