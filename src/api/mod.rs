use async_trait::async_trait;
use url::Url;

use crate::error::ApiResult;

mod http;
pub mod types;

pub use http::HttpBackend;
pub use types::{
    DashboardStats, FilePart, FileSet, HealthStatus, PaymentForm, PaymentRecord, PaymentRequest,
    ResourceStatus, UploadResponse, UploadedFile, VerificationResult, VerifyRequest,
};

/// Absolute URLs for every backend route, resolved once from the base URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub upload: Url,
    pub verify: Url,
    pub payment: Url,
    /// Declared by the backend but never called by the page flows.
    pub payment_status: Url,
    pub health: Url,
    base: Url,
}

impl Endpoints {
    pub fn new(base: &str) -> ApiResult<Self> {
        let base = Url::parse(base)?;
        Ok(Self {
            upload: base.join("/api/documents/upload")?,
            verify: base.join("/api/verify")?,
            payment: base.join("/api/payments/process")?,
            payment_status: base.join("/api/payments/status")?,
            health: base.join("/health")?,
            base,
        })
    }

    pub fn payment_by_id(&self, id: &str) -> ApiResult<Url> {
        Ok(self.base.join(&format!("/api/payments/{}", id))?)
    }

    pub fn document_by_id(&self, id: &str) -> ApiResult<Url> {
        Ok(self.base.join(&format!("/api/documents/{}", id))?)
    }
}

/// The remote service the page talks to.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn upload(&self, files: &FileSet) -> ApiResult<UploadResponse>;
    async fn verify(&self, req: &VerifyRequest) -> ApiResult<VerificationResult>;
    async fn process_payment(&self, req: &PaymentRequest) -> ApiResult<PaymentRecord>;
    async fn payment_status(&self, payment_id: &str) -> ApiResult<ResourceStatus>;
    async fn document_status(&self, document_id: &str) -> ApiResult<ResourceStatus>;
    async fn health(&self) -> ApiResult<HealthStatus>;
}
