use crate::utils::error::{CheckError, Result};
use crate::utils::validation::is_valid_email;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_COMMAND: &str = "holehe";

/// Stands in for empty standard output. Never parsed as JSON.
pub const NO_RESULTS_SENTINEL: &str = "No results found.";

/// Name reported for a record without a usable `name` field.
pub const UNKNOWN_SERVICE: &str = "Unknown";

pub const ALL_SERVICES: &str = "All";

/// An address that passed the syntactic check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct EmailAddress(String);

impl EmailAddress {
    pub fn parse(candidate: &str) -> Result<Self> {
        if is_valid_email(candidate) {
            Ok(Self(candidate.to_string()))
        } else {
            Err(CheckError::InvalidEmailFormat {
                email: candidate.to_string(),
            })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub program: String,
    pub email: EmailAddress,
}

impl CommandSpec {
    pub fn new(program: impl Into<String>, email: EmailAddress) -> Self {
        Self {
            program: program.into(),
            email,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    pub raw_output: String,
    pub elapsed: Duration,
}

impl RunResult {
    /// Builds a result from captured stdout, substituting the sentinel for empty output.
    pub fn from_stdout(stdout: String, elapsed: Duration) -> Self {
        let raw_output = if stdout.is_empty() {
            NO_RESULTS_SENTINEL.to_string()
        } else {
            stdout
        };
        Self {
            raw_output,
            elapsed,
        }
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

/// One entry of the tool's JSON output, fields kept in emitted order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceRecord {
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl ServiceRecord {
    pub fn new(data: serde_json::Map<String, serde_json::Value>) -> Self {
        Self { data }
    }

    /// The `name` field as displayed: strings verbatim, other values as JSON text.
    pub fn name(&self) -> Option<String> {
        match self.data.get("name") {
            None | Some(serde_json::Value::Null) => None,
            Some(serde_json::Value::String(s)) => Some(s.clone()),
            Some(other) => Some(other.to_string()),
        }
    }

    pub fn display_name(&self) -> String {
        self.name().unwrap_or_else(|| UNKNOWN_SERVICE.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Summary {
    #[serde(rename = "Total Accounts Found")]
    pub total_found: usize,
    #[serde(rename = "Services")]
    pub services: Vec<String>,
}

impl Summary {
    pub fn from_records(records: &[ServiceRecord]) -> Self {
        Self {
            total_found: records.len(),
            services: records.iter().map(ServiceRecord::display_name).collect(),
        }
    }

    /// Filter choices offered to the user: "All" then every service in order.
    pub fn filter_choices(&self) -> Vec<String> {
        std::iter::once(ALL_SERVICES.to_string())
            .chain(self.services.iter().cloned())
            .collect()
    }
}

/// What the summarizer made of the raw output.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Parsed {
        records: Vec<ServiceRecord>,
        summary: Summary,
    },
    Unparsed,
}

impl Outcome {
    pub fn records(&self) -> Option<&[ServiceRecord]> {
        match self {
            Outcome::Parsed { records, .. } => Some(records),
            Outcome::Unparsed => None,
        }
    }

    pub fn summary(&self) -> Option<&Summary> {
        match self {
            Outcome::Parsed { summary, .. } => Some(summary),
            Outcome::Unparsed => None,
        }
    }

    /// True when there is at least one record to show.
    pub fn has_records(&self) -> bool {
        self.records().is_some_and(|records| !records.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ServiceFilter {
    #[default]
    All,
    Named(String),
}

impl ServiceFilter {
    pub fn matches(&self, record: &ServiceRecord) -> bool {
        match self {
            ServiceFilter::All => true,
            ServiceFilter::Named(name) => record.name().as_deref() == Some(name.as_str()),
        }
    }

    pub fn apply<'a>(&self, records: &'a [ServiceRecord]) -> Vec<&'a ServiceRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

impl From<&str> for ServiceFilter {
    fn from(value: &str) -> Self {
        if value == ALL_SERVICES {
            ServiceFilter::All
        } else {
            ServiceFilter::Named(value.to_string())
        }
    }
}

impl fmt::Display for ServiceFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServiceFilter::All => f.write_str(ALL_SERVICES),
            ServiceFilter::Named(name) => f.write_str(name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

impl ExportFormat {
    /// Formats built from parsed records. The raw text download is always written.
    pub const STRUCTURED: [ExportFormat; 2] = [ExportFormat::Json, ExportFormat::Csv];
    pub const STRUCTURED_NAMES: [&'static str; 2] = ["json", "csv"];

    pub fn mime_type(self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Text => "text/plain",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "text",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = CheckError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "text" => Ok(ExportFormat::Text),
            other => Err(CheckError::UnsupportedFormat {
                format: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input of one check: the address as typed, an optional tool override and a filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRequest {
    pub email: String,
    pub command: Option<String>,
    pub filter: ServiceFilter,
}

impl CheckRequest {
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            command: None,
            filter: ServiceFilter::All,
        }
    }

    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = Some(command.into());
        self
    }

    pub fn with_filter(mut self, filter: ServiceFilter) -> Self {
        self.filter = filter;
        self
    }
}

/// Everything one check produced. Built fresh per request.
#[derive(Debug, Clone)]
pub struct CheckReport {
    pub email: EmailAddress,
    pub run: RunResult,
    pub outcome: Outcome,
    pub filter: ServiceFilter,
    pub checked_at: DateTime<Utc>,
}

impl CheckReport {
    /// Records narrowed to the selected service; all of them for "All".
    pub fn filtered_records(&self) -> Vec<ServiceRecord> {
        self.outcome
            .records()
            .map(|records| self.filter.apply(records).into_iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Machine-readable view printed by `--json`. `filtered` is only set
    /// when a single service is selected.
    pub fn to_json(&self) -> serde_json::Value {
        let filtered = match (&self.filter, self.outcome.records()) {
            (ServiceFilter::Named(_), Some(_)) => Some(self.filtered_records()),
            _ => None,
        };
        serde_json::json!({
            "email": self.email,
            "checked_at": self.checked_at.to_rfc3339(),
            "elapsed_seconds": self.run.elapsed_seconds(),
            "parsed": self.outcome.records().is_some(),
            "summary": self.outcome.summary(),
            "results": self.outcome.records(),
            "filter": self.filter.to_string(),
            "filtered": filtered,
            "raw_output": self.run.raw_output,
        })
    }
}

/// An in-memory download: contents, content type and suggested file name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportBuffer {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub mime_type: &'static str,
}
