use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartKind {
    Line,
    Doughnut,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: Option<String>,
    pub data: Vec<f64>,
    pub colors: Vec<String>,
    pub tension: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chart {
    pub canvas_id: String,
    pub kind: ChartKind,
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
    pub responsive: bool,
    pub maintain_aspect_ratio: bool,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Static dashboard datasets; the backend does not feed these.
pub fn dashboard_charts() -> Vec<Chart> {
    vec![
        Chart {
            canvas_id: "timelineChart".to_string(),
            kind: ChartKind::Line,
            labels: strings(&["Jan", "Feb", "Mar", "Apr", "May", "Jun"]),
            datasets: vec![Dataset {
                label: Some("Documents Processed".to_string()),
                data: vec![12.0, 19.0, 3.0, 5.0, 2.0, 3.0],
                colors: strings(&["#2563eb"]),
                tension: Some(0.4),
            }],
            responsive: true,
            maintain_aspect_ratio: false,
        },
        Chart {
            canvas_id: "documentTypesChart".to_string(),
            kind: ChartKind::Doughnut,
            labels: strings(&["Invoices", "Receipts", "Contracts", "Other"]),
            datasets: vec![Dataset {
                label: None,
                data: vec![30.0, 25.0, 20.0, 25.0],
                colors: strings(&["#2563eb", "#10b981", "#f59e0b", "#6b7280"]),
                tension: None,
            }],
            responsive: true,
            maintain_aspect_ratio: false,
        },
    ]
}
