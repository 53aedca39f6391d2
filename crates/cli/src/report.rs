//! Human-readable summaries printed at the end of each command.

use chrono::NaiveDate;
use serde::Serialize;

use drivetube_core::{
    DailyCounter, HistoryEntry, LedgerError, LedgerStore, PendingCandidates, UploadReport,
};

const RULE: &str = "============================================================";

/// Snapshot of the ledger for `drivetube status`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusSummary {
    pub processed_count: usize,
    pub history_count: usize,
    pub uploads_today: u32,
    pub last_upload: Option<HistoryEntry>,
}

impl StatusSummary {
    /// Read all three records. Nothing is written.
    pub fn load(ledger: &dyn LedgerStore, today: NaiveDate) -> Result<Self, LedgerError> {
        let processed = ledger.load_processed()?;
        let history = ledger.load_history()?;
        let uploads_today = ledger
            .load_daily_counter()?
            .map(|c: DailyCounter| c.count_on(today))
            .unwrap_or(0);

        Ok(Self {
            processed_count: processed.len(),
            history_count: history.len(),
            uploads_today,
            last_upload: history.last().cloned(),
        })
    }
}

pub fn upload_lines(report: &UploadReport) -> Vec<String> {
    vec![
        RULE.to_string(),
        "UPLOAD SUCCESSFUL".to_string(),
        RULE.to_string(),
        format!("Title:           {}", report.title),
        format!("URL:             {}", report.watch_url),
        format!("Source file:     {}", report.candidate.name),
        format!("File size:       {:.1} MB", report.file_size_mb),
        format!("Uploads today:   {}", report.daily_count),
        format!("Total uploaded:  {}", report.processed_count),
        format!("Remaining:       {}", report.remaining),
        RULE.to_string(),
    ]
}

pub fn pending_lines(pending: &PendingCandidates) -> Vec<String> {
    let mut lines = vec![format!(
        "{} of {} video(s) not uploaded yet ({} already processed)",
        pending.unprocessed.len(),
        pending.total_candidates,
        pending.processed_count
    )];
    for candidate in &pending.unprocessed {
        if candidate.is_shortcut() {
            lines.push(format!(
                "  {}  {} (shortcut to {})",
                candidate.id, candidate.name, candidate.real_id
            ));
        } else {
            lines.push(format!("  {}  {}", candidate.id, candidate.name));
        }
    }
    lines
}

pub fn status_lines(status: &StatusSummary) -> Vec<String> {
    let mut lines = vec![
        format!("Uploaded videos: {}", status.processed_count),
        format!("History entries: {}", status.history_count),
        format!("Uploads today:   {}", status.uploads_today),
    ];
    match &status.last_upload {
        Some(entry) => {
            lines.push(format!(
                "Last upload:     {} ({})",
                entry.title,
                entry.timestamp.format("%Y-%m-%d %H:%M:%S")
            ));
            lines.push(format!("                 {}", entry.source_file_name));
        }
        None => lines.push("Last upload:     none".to_string()),
    }
    lines
}
