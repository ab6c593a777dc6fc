use crate::domain::model::{Outcome, ServiceRecord, Summary, NO_RESULTS_SENTINEL};

/// Interprets raw tool output as a JSON array of objects.
///
/// Anything else (the empty-output sentinel, malformed JSON, a JSON value
/// that is not an array, or an array holding non-objects) yields
/// `Outcome::Unparsed` and the caller falls back to the raw text.
pub fn summarize(raw_output: &str) -> Outcome {
    if raw_output == NO_RESULTS_SENTINEL {
        tracing::debug!("Tool produced no output, skipping JSON parsing");
        return Outcome::Unparsed;
    }

    let records: Vec<ServiceRecord> = match serde_json::from_str(raw_output) {
        Ok(records) => records,
        Err(e) => {
            tracing::debug!("Output is not a JSON array of objects: {}", e);
            return Outcome::Unparsed;
        }
    };

    let summary = Summary::from_records(&records);
    tracing::debug!("Parsed {} service records", summary.total_found);
    Outcome::Parsed { records, summary }
}
