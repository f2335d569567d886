use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use url::Url;

use crate::api::{
    Backend, Endpoints, FileSet, HealthStatus, PaymentRecord, PaymentRequest, ResourceStatus,
    UploadResponse, VerificationResult, VerifyRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::logging::{log_request, log_response, v_str, Domain, ProfileScope};
use crate::state::Config;

pub struct HttpBackend {
    client: Client,
    endpoints: Endpoints,
}

impl HttpBackend {
    pub fn new(cfg: &Config) -> ApiResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = cfg.request_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        Ok(Self {
            client: builder.build().map_err(|e| ApiError::Client(e.to_string()))?,
            endpoints: Endpoints::new(&cfg.api_base)?,
        })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn send<T: DeserializeOwned + Send>(
        &self,
        domain: Domain,
        method: &str,
        endpoint: &Url,
        req: RequestBuilder,
        wrap: fn(String) -> ApiError,
    ) -> ApiResult<T> {
        log_request(domain, method, endpoint.as_str());
        let _scope = ProfileScope::with_context("http", &[("endpoint", v_str(endpoint.as_str()))]);

        let resp = req.send().await.map_err(|e| wrap(e.to_string()))?;
        let status = resp.status();
        log_response(domain, endpoint.as_str(), status.as_u16());
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(wrap(failure_text(status, &body)));
        }
        resp.json::<T>().await.map_err(|e| wrap(e.to_string()))
    }
}

fn failure_text(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, body)
    }
}

#[async_trait::async_trait]
impl Backend for HttpBackend {
    async fn upload(&self, files: &FileSet) -> ApiResult<UploadResponse> {
        let mut form = Form::new();
        for part in &files.parts {
            form = form.part(
                "files",
                Part::bytes(part.bytes.clone()).file_name(part.name.clone()),
            );
        }
        let url = &self.endpoints.upload;
        let req = self.client.post(url.clone()).multipart(form);
        self.send(Domain::Upload, "POST", url, req, ApiError::Upload).await
    }

    async fn verify(&self, body: &VerifyRequest) -> ApiResult<VerificationResult> {
        let url = &self.endpoints.verify;
        let req = self.client.post(url.clone()).json(body);
        self.send(Domain::Verify, "POST", url, req, ApiError::Verification)
            .await
    }

    async fn process_payment(&self, body: &PaymentRequest) -> ApiResult<PaymentRecord> {
        let url = &self.endpoints.payment;
        let req = self.client.post(url.clone()).json(body);
        self.send(Domain::Payment, "POST", url, req, ApiError::Payment)
            .await
    }

    async fn payment_status(&self, payment_id: &str) -> ApiResult<ResourceStatus> {
        let url = self.endpoints.payment_by_id(payment_id)?;
        let req = self.client.get(url.clone());
        self.send(Domain::Payment, "GET", &url, req, ApiError::Status)
            .await
    }

    async fn document_status(&self, document_id: &str) -> ApiResult<ResourceStatus> {
        let url = self.endpoints.document_by_id(document_id)?;
        let req = self.client.get(url.clone());
        self.send(Domain::Upload, "GET", &url, req, ApiError::Status)
            .await
    }

    async fn health(&self) -> ApiResult<HealthStatus> {
        let url = &self.endpoints.health;
        let req = self.client.get(url.clone());
        self.send(Domain::System, "GET", url, req, ApiError::Health)
            .await
    }
}
