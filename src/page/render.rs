//! HTML fragments for the page regions. Server strings are escaped.

use chrono::{DateTime, Local, Utc};

use crate::api::{DashboardStats, PaymentRecord, UploadedFile, VerificationResult};

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn uploaded_files(files: &[UploadedFile]) -> String {
    files
        .iter()
        .map(|f| {
            let name = escape_html(&f.name);
            let status = escape_html(&f.status);
            format!(
                "<li class=\"upload-item\"><span>{}</span><span class=\"status {}\">{}</span></li>",
                name, status, status
            )
        })
        .collect::<Vec<_>>()
        .join("")
}

pub fn verification_card(result: &VerificationResult) -> String {
    let status = escape_html(&result.status);
    let risk = result
        .risk_score
        .map(|r| r.to_string())
        .unwrap_or_else(|| "n/a".to_string());
    let mut html = format!(
        "<div class=\"status-card {}\"><h4>Document Verification</h4><p>Status: {}</p><p>Risk Score: {}</p>",
        status, status, risk
    );
    if let Some(message) = &result.message {
        html.push_str(&format!("<p>{}</p>", escape_html(message)));
    }
    if let Some(issues) = &result.issues {
        html.push_str("<ul class=\"issues-list\">");
        for issue in issues {
            html.push_str(&format!("<li>{}</li>", escape_html(issue)));
        }
        html.push_str("</ul>");
    }
    html.push_str("</div>");
    html
}

pub fn payment_entry(payment: &PaymentRecord) -> String {
    let date = payment
        .timestamp
        .and_then(format_timestamp)
        .unwrap_or_else(|| "n/a".to_string());
    let mut details = format!(
        "<h4>Transaction ID: {}</h4><p>Amount: {} {}</p><p>Status: {}</p><p>Date: {}</p>",
        escape_html(&payment.transaction_id),
        escape_html(&payment.amount),
        escape_html(&payment.currency),
        escape_html(&payment.status),
        escape_html(&date),
    );
    if let Some(message) = &payment.message {
        details.push_str(&format!("<p>{}</p>", escape_html(message)));
    }
    format!(
        "<div class=\"payment-entry\"><div class=\"payment-details\">{}</div></div>",
        details
    )
}

pub fn stats(stats: &DashboardStats) -> String {
    format!(
        "<span id=\"docsProcessed\">{}</span><span id=\"pendingVerification\">{}</span><span id=\"completedPayments\">{}</span>",
        escape_html(&stats.documents_processed),
        escape_html(&stats.pending_verification),
        escape_html(&stats.completed_payments),
    )
}

/// Local date-time in the `M/D/YYYY, h:mm:ss AM` shape.
pub fn format_timestamp(epoch_ms: i64) -> Option<String> {
    let utc = DateTime::<Utc>::from_timestamp_millis(epoch_ms)?;
    Some(
        utc.with_timezone(&Local)
            .format("%-m/%-d/%Y, %-I:%M:%S %p")
            .to_string(),
    )
}
