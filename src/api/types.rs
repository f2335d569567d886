use std::path::Path;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// One file object from the upload response. Fields other than `name` and
/// `status` are kept in `extra` so the verify body echoes the object as sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    pub name: String,
    pub status: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UploadedFile {
    pub fn new(name: &str, status: &str) -> Self {
        Self {
            name: name.to_string(),
            status: status.to_string(),
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct UploadResponse {
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifyRequest {
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationResult {
    #[serde(default)]
    pub status: String,
    /// Absent on the backend's "processing" push frames.
    #[serde(default, deserialize_with = "lenient_score")]
    pub risk_score: Option<f64>,
    #[serde(default)]
    pub issues: Option<Vec<String>>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRequest {
    pub amount: String,
    pub currency: String,
    pub payment_method: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentRecord {
    #[serde(default)]
    pub transaction_id: String,
    #[serde(default, deserialize_with = "display_text")]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub status: String,
    /// Epoch milliseconds.
    #[serde(default, deserialize_with = "epoch_millis")]
    pub timestamp: Option<i64>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    #[serde(default, deserialize_with = "display_text")]
    pub documents_processed: String,
    #[serde(default, deserialize_with = "display_text")]
    pub pending_verification: String,
    #[serde(default, deserialize_with = "display_text")]
    pub completed_payments: String,
}

/// `GET /api/payments/{id}` and `GET /api/documents/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ResourceStatus {
    #[serde(alias = "payment_id", alias = "document_id")]
    pub id: String,
    pub status: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub status: String,
}

/// Raw values of the payment form. Nothing is validated; empty strings are
/// forwarded as-is.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct PaymentForm {
    #[serde(default)]
    pub amount: String,
    #[serde(default)]
    pub currency: String,
    #[serde(default)]
    pub method: String,
}

impl From<&PaymentForm> for PaymentRequest {
    fn from(form: &PaymentForm) -> Self {
        Self {
            amount: form.amount.clone(),
            currency: form.currency.clone(),
            payment_method: form.method.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Files captured from a drop or the file picker, sent as one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    pub parts: Vec<FilePart>,
}

impl FileSet {
    pub fn new(parts: Vec<FilePart>) -> Self {
        Self { parts }
    }

    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> std::io::Result<Self> {
        let mut parts = Vec::with_capacity(paths.len());
        for path in paths {
            let path = path.as_ref();
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.to_string_lossy().into_owned());
            parts.push(FilePart {
                name,
                bytes: std::fs::read(path)?,
            });
        }
        Ok(Self { parts })
    }

    pub fn names(&self) -> Vec<&str> {
        self.parts.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }
}

fn display_text<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    })
}

fn lenient_score<'de, D: Deserializer<'de>>(d: D) -> Result<Option<f64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn epoch_millis<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(match Value::deserialize(d)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}
