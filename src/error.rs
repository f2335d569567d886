use thiserror::Error;

/// Client-side failures. Each variant only says that a request did not
/// succeed; transport errors, 4xx and 5xx are not distinguished.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Upload failed: {0}")]
    Upload(String),

    #[error("Verification failed: {0}")]
    Verification(String),

    #[error("Payment failed: {0}")]
    Payment(String),

    #[error("Status lookup failed: {0}")]
    Status(String),

    #[error("Health check failed: {0}")]
    Health(String),

    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("Invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

pub type ApiResult<T> = Result<T, ApiError>;
