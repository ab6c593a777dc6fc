use crate::domain::model::{CheckReport, ServiceFilter};
use crate::utils::error::Result;

/// Human-readable view of a report.
///
/// With records: the summary, every record, then the records of the selected
/// service when one is chosen. Without: a warning and the raw output.
pub fn render_report(report: &CheckReport) -> Result<String> {
    let mut lines = vec![format!(
        "✅ Completed in {:.2} seconds!",
        report.run.elapsed_seconds()
    )];

    let (records, summary) = match (report.outcome.records(), report.outcome.summary()) {
        (Some(records), Some(summary)) if !records.is_empty() => (records, summary),
        _ => return Ok(raw_fallback(lines, report)),
    };

    lines.push("### Summary:".to_string());
    lines.push(serde_json::to_string_pretty(summary)?);
    tracing::debug!("Filter choices: {:?}", summary.filter_choices());

    lines.push("### Detailed Results (JSON):".to_string());
    lines.push(serde_json::to_string_pretty(records)?);

    if let ServiceFilter::Named(service) = &report.filter {
        lines.push(format!("### Results for {}:", service));
        lines.push(serde_json::to_string_pretty(&report.filtered_records())?);
    }

    Ok(lines.join("\n"))
}

fn raw_fallback(mut lines: Vec<String>, report: &CheckReport) -> String {
    lines.push("⚠️ No results found or data could not be parsed.".to_string());
    lines.push("### Raw Output:".to_string());
    lines.push(report.run.raw_output.clone());
    lines.join("\n")
}
