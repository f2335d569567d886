use std::sync::Arc;

use serde_json::json;

use crate::api::{Backend, FileSet, UploadedFile, VerifyRequest};
use crate::component::{Component, Lifecycle};
use crate::error::ApiResult;
use crate::logging::{log, obj, v_str, Domain, Level};
use crate::reporter::Reporter;
use crate::sequencer::Stream;
use crate::state::{lock, Shared};

/// Dropzone and file picker: upload one batch, then verify it.
#[derive(Clone)]
pub struct UploadFlow {
    backend: Arc<dyn Backend>,
    state: Shared,
    reporter: Arc<Reporter>,
    lifecycle: Arc<Lifecycle>,
}

impl UploadFlow {
    pub fn new(backend: Arc<dyn Backend>, state: Shared, reporter: Arc<Reporter>) -> Self {
        Self {
            backend,
            state,
            reporter,
            lifecycle: Arc::new(Lifecycle::new()),
        }
    }

    pub fn drag_over(&self) {
        if self.lifecycle.accepts(Domain::Upload, self.name(), "dragover") {
            lock(&self.state).page.dropzone_dragover = true;
        }
    }

    pub fn drag_leave(&self) {
        if self.lifecycle.accepts(Domain::Upload, self.name(), "dragleave") {
            lock(&self.state).page.dropzone_dragover = false;
        }
    }

    pub async fn drop_files(&self, files: FileSet) {
        if !self.lifecycle.accepts(Domain::Upload, self.name(), "drop") {
            return;
        }
        lock(&self.state).page.dropzone_dragover = false;
        self.submit_files(&files).await;
    }

    pub async fn pick_files(&self, files: FileSet) {
        if !self.lifecycle.accepts(Domain::Upload, self.name(), "change") {
            return;
        }
        self.submit_files(&files).await;
    }

    /// Upload, render the returned list, then verify it. Failures end at the
    /// reporter; verification only runs after a successful upload.
    pub async fn submit_files(&self, files: &FileSet) {
        match self.upload(files).await {
            Ok(uploaded) => self.request_verification(&uploaded).await,
            Err(e) => self.reporter.error(&format!("File upload failed: {}", e)),
        }
    }

    async fn upload(&self, files: &FileSet) -> ApiResult<Vec<UploadedFile>> {
        log(
            Level::Info,
            Domain::Upload,
            "upload_start",
            obj(&[
                ("count", json!(files.len())),
                ("names", json!(files.names())),
            ]),
        );
        let resp = self.backend.upload(files).await?;
        lock(&self.state).page.set_uploaded_files(&resp.files);
        Ok(resp.files)
    }

    pub async fn request_verification(&self, files: &[UploadedFile]) {
        let ticket = lock(&self.state).seq.ticket(Stream::Verification);
        let body = VerifyRequest {
            files: files.to_vec(),
        };
        log(
            Level::Info,
            Domain::Verify,
            "verify_start",
            obj(&[("count", json!(files.len())), ("ticket", json!(ticket.seq))]),
        );
        match self.backend.verify(&body).await {
            Ok(result) => {
                lock(&self.state).apply(ticket, |page| page.set_verification(&result));
            }
            Err(e) => self.reporter.error(&format!("Verification failed: {}", e)),
        }
    }

    pub async fn check_document(&self, document_id: &str) {
        match self.backend.document_status(document_id).await {
            Ok(status) => self
                .reporter
                .success(&format!("Document {}: {}", status.id, status.status)),
            Err(e) => {
                log(
                    Level::Warn,
                    Domain::Upload,
                    "document_lookup_failed",
                    obj(&[("document_id", v_str(document_id))]),
                );
                self.reporter.error(&format!("Document lookup failed: {}", e))
            }
        }
    }
}

impl Component for UploadFlow {
    fn name(&self) -> &'static str {
        "upload"
    }

    fn attach(&self) {
        self.lifecycle.attach();
    }

    fn dispose(&self) {
        self.lifecycle.dispose();
        lock(&self.state).page.dropzone_dragover = false;
    }

    fn is_attached(&self) -> bool {
        self.lifecycle.is_attached()
    }
}
