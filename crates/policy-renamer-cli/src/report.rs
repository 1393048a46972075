//! Final record listing printed once a run has settled.

use clap::ValueEnum;
use serde::Serialize;

use policy_renamer::{FileRecord, FileStatus, Summary};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    Table,
    Json,
}

#[derive(Serialize)]
struct Report<'a> {
    summary: &'a Summary,
    records: &'a [FileRecord],
}

pub fn render(
    format: ReportFormat,
    records: &[FileRecord],
    summary: &Summary,
) -> serde_json::Result<String> {
    match format {
        ReportFormat::Table => Ok(render_table(records, summary)),
        ReportFormat::Json => serde_json::to_string_pretty(&Report { summary, records }),
    }
}

fn status_label(status: FileStatus) -> &'static str {
    match status {
        FileStatus::Pending => "PENDING",
        FileStatus::Processing => "PROCESSING",
        FileStatus::Success => "OK",
        FileStatus::Error => "ERROR",
    }
}

fn render_table(records: &[FileRecord], summary: &Summary) -> String {
    let original_width = records
        .iter()
        .map(|r| r.original_name.chars().count())
        .chain(std::iter::once("ORIGINAL".len()))
        .max()
        .unwrap_or(0);

    let mut out = format!("{:<10}  {:<original_width$}  RESULT\n", "STATUS", "ORIGINAL");
    for record in records {
        let result = match (record.status, &record.error_detail) {
            (FileStatus::Error, Some(detail)) => detail.clone(),
            (FileStatus::Success, _) if record.concept.is_none() => {
                format!("{} (no policy name found)", record.derived_name)
            }
            _ => record.derived_name.clone(),
        };
        out.push_str(&format!(
            "{:<10}  {:<original_width$}  {}\n",
            status_label(record.status),
            record.original_name,
            result
        ));
    }

    out.push_str(&format!(
        "\n{} file(s): {} renamed or kept, {} failed",
        summary.total, summary.success, summary.error
    ));
    if !summary.is_settled() {
        out.push_str(&format!(
            ", {} still in progress",
            summary.pending + summary.processing
        ));
    }
    out.push('\n');
    out
}
