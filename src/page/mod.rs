//! In-memory page: sections, navigation links and the display regions the
//! flows write into. Regions hold rendered HTML fragments.

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::api::{DashboardStats, PaymentRecord, UploadedFile, VerificationResult};
use crate::logging::log_render;

pub mod charts;
pub mod render;

pub use charts::{dashboard_charts, Chart, ChartKind};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub id: String,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NavLink {
    pub target: String,
    pub label: String,
    pub active: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Region {
    UploadedFiles,
    VerificationStatus,
    PaymentHistory,
    Stats,
}

impl Region {
    /// Regions written by push messages.
    pub const TRACKED: [Region; 3] = [
        Region::VerificationStatus,
        Region::PaymentHistory,
        Region::Stats,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::UploadedFiles => "uploaded_files",
            Region::VerificationStatus => "verification_status",
            Region::PaymentHistory => "payment_history",
            Region::Stats => "stats",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page {
    pub sections: Vec<Section>,
    pub nav_links: Vec<NavLink>,
    pub dropzone_dragover: bool,
    pub uploaded_files: String,
    pub verification_status: String,
    /// Newest entry first.
    pub payment_history: Vec<String>,
    pub stats: DashboardStats,
    pub charts: Vec<Chart>,
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

impl Page {
    pub fn new() -> Self {
        Self::with_sections(&[
            ("dashboard", "Dashboard"),
            ("documents", "Documents"),
            ("verification", "Verification"),
            ("payments", "Payments"),
        ])
    }

    /// First section starts active.
    pub fn with_sections(sections: &[(&str, &str)]) -> Self {
        Self {
            sections: sections
                .iter()
                .enumerate()
                .map(|(i, (id, _))| Section {
                    id: id.to_string(),
                    active: i == 0,
                })
                .collect(),
            nav_links: sections
                .iter()
                .enumerate()
                .map(|(i, (id, label))| NavLink {
                    target: id.to_string(),
                    label: label.to_string(),
                    active: i == 0,
                })
                .collect(),
            dropzone_dragover: false,
            uploaded_files: String::new(),
            verification_status: String::new(),
            payment_history: Vec::new(),
            stats: DashboardStats {
                documents_processed: "0".to_string(),
                pending_verification: "0".to_string(),
                completed_payments: "0".to_string(),
            },
            charts: Vec::new(),
        }
    }

    pub fn has_section(&self, id: &str) -> bool {
        self.sections.iter().any(|s| s.id == id)
    }

    pub fn active_section(&self) -> Option<&str> {
        self.sections.iter().find(|s| s.active).map(|s| s.id.as_str())
    }

    pub fn active_link(&self) -> Option<&str> {
        self.nav_links
            .iter()
            .find(|l| l.active)
            .map(|l| l.target.as_str())
    }

    pub fn set_uploaded_files(&mut self, files: &[UploadedFile]) {
        self.uploaded_files = render::uploaded_files(files);
        self.logged(Region::UploadedFiles);
    }

    pub fn set_verification(&mut self, result: &VerificationResult) {
        self.verification_status = render::verification_card(result);
        self.logged(Region::VerificationStatus);
    }

    pub fn prepend_payment(&mut self, payment: &PaymentRecord) {
        self.payment_history.insert(0, render::payment_entry(payment));
        self.logged(Region::PaymentHistory);
    }

    pub fn set_stats(&mut self, stats: &DashboardStats) {
        self.stats = stats.clone();
        self.logged(Region::Stats);
    }

    pub fn region_html(&self, region: Region) -> String {
        match region {
            Region::UploadedFiles => self.uploaded_files.clone(),
            Region::VerificationStatus => self.verification_status.clone(),
            Region::PaymentHistory => self.payment_history.concat(),
            Region::Stats => render::stats(&self.stats),
        }
    }

    pub fn region_digest(&self, region: Region) -> String {
        hex::encode(Sha256::digest(self.region_html(region).as_bytes()))
    }

    /// SHA-256 over the push-written regions.
    pub fn digest(&self) -> String {
        let mut hasher = Sha256::new();
        for region in Region::TRACKED {
            hasher.update(region.as_str().as_bytes());
            hasher.update([0u8]);
            hasher.update(self.region_html(region).as_bytes());
            hasher.update([0u8]);
        }
        hex::encode(hasher.finalize())
    }

    fn logged(&self, region: Region) {
        log_render(region.as_str(), &self.region_digest(region));
    }
}
