use crate::domain::model::{CheckReport, EmailAddress, ExportBuffer, ExportFormat, ServiceRecord};
use crate::utils::error::{CheckError, Result};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::Value;
use std::collections::HashSet;
use std::io::Write;
use zip::write::{FileOptions, ZipWriter};

/// What a download is built from.
#[derive(Debug, Clone, Copy)]
pub enum ExportData<'a> {
    Records(&'a [ServiceRecord]),
    Value(&'a Value),
    Text(&'a str),
}

/// Serializes `data` into an in-memory buffer. `format` must be one of
/// `json`, `csv` or `text`; anything else is `UnsupportedFormat`.
pub fn export(data: ExportData<'_>, filename_hint: &str, format: &str) -> Result<ExportBuffer> {
    let format: ExportFormat = format.parse()?;
    export_as(data, filename_hint, format)
}

pub fn export_as(data: ExportData<'_>, filename_hint: &str, format: ExportFormat) -> Result<ExportBuffer> {
    let bytes = match format {
        ExportFormat::Json => to_pretty_json(&data)?,
        ExportFormat::Csv => to_csv(&data)?,
        ExportFormat::Text => to_text(&data)?,
    };

    tracing::debug!("Prepared {} ({} bytes, {})", filename_hint, bytes.len(), format.mime_type());
    Ok(ExportBuffer {
        filename: filename_hint.to_string(),
        bytes,
        mime_type: format.mime_type(),
    })
}

impl Serialize for ExportData<'_> {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            ExportData::Records(records) => records.serialize(serializer),
            ExportData::Value(value) => value.serialize(serializer),
            ExportData::Text(text) => text.serialize(serializer),
        }
    }
}

fn to_pretty_json(data: &ExportData<'_>) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
    data.serialize(&mut ser)?;
    Ok(buf)
}

fn invalid_shape(format: ExportFormat, reason: &str) -> CheckError {
    CheckError::InvalidShape {
        format: format.to_string(),
        reason: reason.to_string(),
    }
}

fn to_csv(data: &ExportData<'_>) -> Result<Vec<u8>> {
    let rows: Vec<&serde_json::Map<String, Value>> = match data {
        ExportData::Records(records) => records.iter().map(|r| &r.data).collect(),
        ExportData::Value(Value::Array(items)) => items
            .iter()
            .map(|item| {
                item.as_object()
                    .ok_or_else(|| invalid_shape(ExportFormat::Csv, "every element must be an object"))
            })
            .collect::<Result<_>>()?,
        ExportData::Value(_) | ExportData::Text(_) => {
            return Err(invalid_shape(ExportFormat::Csv, "expected a sequence of records"));
        }
    };

    // Columns are the union of keys, in the order they are first seen.
    let mut seen = HashSet::new();
    let mut columns: Vec<&str> = Vec::new();
    for row in &rows {
        for key in row.keys() {
            if seen.insert(key.as_str()) {
                columns.push(key);
            }
        }
    }

    let mut wtr = csv::Writer::from_writer(Vec::new());
    if !columns.is_empty() {
        wtr.write_record(&columns)?;
    }
    for row in &rows {
        wtr.write_record(columns.iter().map(|column| csv_cell(row.get(*column))))?;
    }

    wtr.into_inner()
        .map_err(|e| CheckError::IoError(e.into_error()))
}

fn csv_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

fn to_text(data: &ExportData<'_>) -> Result<Vec<u8>> {
    match data {
        ExportData::Text(text) => Ok(text.as_bytes().to_vec()),
        ExportData::Value(Value::String(text)) => Ok(text.as_bytes().to_vec()),
        _ => Err(invalid_shape(ExportFormat::Text, "expected plain text")),
    }
}

/// Download name for `email` in `format`, e.g. `a@b.io_results.json`.
pub fn download_filename(email: &EmailAddress, format: ExportFormat) -> String {
    match format {
        ExportFormat::Json => format!("{}_results.json", email),
        ExportFormat::Csv => format!("{}_results.csv", email),
        ExportFormat::Text => format!("{}_raw_output.txt", email),
    }
}

pub fn archive_filename(email: &EmailAddress) -> String {
    format!("{}_results.zip", email)
}

impl CheckReport {
    /// Downloads offered for this report.
    ///
    /// JSON and CSV of the full record sequence come first, when selected and
    /// when there is at least one parsed record. The filter only narrows what
    /// is displayed. The raw output is always last.
    pub fn downloads(&self, formats: &[ExportFormat]) -> Result<Vec<ExportBuffer>> {
        let mut buffers = Vec::new();

        if let Some(records) = self.outcome.records().filter(|records| !records.is_empty()) {
            for format in ExportFormat::STRUCTURED {
                if formats.contains(&format) {
                    let filename = download_filename(&self.email, format);
                    buffers.push(export_as(ExportData::Records(records), &filename, format)?);
                }
            }
        }

        let raw_name = download_filename(&self.email, ExportFormat::Text);
        buffers.push(export_as(
            ExportData::Text(&self.run.raw_output),
            &raw_name,
            ExportFormat::Text,
        )?);

        Ok(buffers)
    }
}

/// Bundles several downloads into one zip buffer.
pub fn bundle_archive(buffers: &[ExportBuffer], filename: &str) -> Result<ExportBuffer> {
    tracing::debug!("Creating ZIP archive with {} files", buffers.len());

    let bytes = {
        let mut zip = ZipWriter::new(std::io::Cursor::new(Vec::new()));
        for buffer in buffers {
            zip.start_file::<_, ()>(buffer.filename.as_str(), FileOptions::default())?;
            zip.write_all(&buffer.bytes)?;
        }
        zip.finish()?.into_inner()
    };

    Ok(ExportBuffer {
        filename: filename.to_string(),
        bytes,
        mime_type: "application/zip",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::ServiceFilter;
    use serde_json::json;

    fn records(value: Value) -> Vec<ServiceRecord> {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_json_export_round_trips() {
        let data = json!([{"name": "twitter", "exists": true}, {"name": "github", "others": {"x": [1, 2]}}]);
        let buffer = export(ExportData::Value(&data), "out.json", "json").unwrap();

        assert_eq!(buffer.mime_type, "application/json");
        assert_eq!(buffer.filename, "out.json");
        let decoded: Value = serde_json::from_slice(&buffer.bytes).unwrap();
        assert_eq!(decoded, data);
    }

    #[test]
    fn test_json_export_uses_four_space_indent() {
        let recs = records(json!([{"name": "a"}]));
        let buffer = export(ExportData::Records(&recs), "out.json", "json").unwrap();
        let text = String::from_utf8(buffer.bytes).unwrap();
        assert_eq!(text, "[\n    {\n        \"name\": \"a\"\n    }\n]");
    }

    #[test]
    fn test_csv_export_uses_key_union() {
        let recs = records(json!([{"name": "a", "x": 1}, {"name": "b"}]));
        let buffer = export(ExportData::Records(&recs), "out.csv", "csv").unwrap();

        assert_eq!(buffer.mime_type, "text/csv");
        let text = String::from_utf8(buffer.bytes).unwrap();
        assert_eq!(text, "name,x\na,1\nb,\n");
    }

    #[test]
    fn test_csv_export_late_columns_and_quoting() {
        let recs = records(json!([
            {"name": "a"},
            {"name": "b, inc", "exists": true, "emailrecovery": null}
        ]));
        let buffer = export(ExportData::Records(&recs), "out.csv", "csv").unwrap();
        let text = String::from_utf8(buffer.bytes).unwrap();
        assert_eq!(text, "name,exists,emailrecovery\na,,\n\"b, inc\",true,\n");
    }

    #[test]
    fn test_csv_export_rejects_non_tabular() {
        let scalar = json!({"a": 1});
        assert!(matches!(
            export(ExportData::Value(&scalar), "out.csv", "csv"),
            Err(CheckError::InvalidShape { .. })
        ));

        let mixed = json!([{"a": 1}, 2]);
        assert!(matches!(
            export(ExportData::Value(&mixed), "out.csv", "csv"),
            Err(CheckError::InvalidShape { .. })
        ));

        assert!(matches!(
            export(ExportData::Text("hello"), "out.csv", "csv"),
            Err(CheckError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_text_export_is_verbatim() {
        let buffer = export(ExportData::Text("hello"), "out.txt", "text").unwrap();
        assert_eq!(buffer.bytes, b"hello");
        assert_eq!(buffer.mime_type, "text/plain");

        let recs = records(json!([]));
        assert!(matches!(
            export(ExportData::Records(&recs), "out.txt", "text"),
            Err(CheckError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_unknown_format_is_unsupported() {
        let data = json!([]);
        assert!(matches!(
            export(ExportData::Value(&data), "out.xml", "xml"),
            Err(CheckError::UnsupportedFormat { format }) if format == "xml"
        ));
        assert!(matches!(
            export(ExportData::Text("hello"), "out", "CSV"),
            Err(CheckError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_download_filenames() {
        let email = EmailAddress::parse("user@example.com").unwrap();
        assert_eq!(download_filename(&email, ExportFormat::Json), "user@example.com_results.json");
        assert_eq!(download_filename(&email, ExportFormat::Csv), "user@example.com_results.csv");
        assert_eq!(download_filename(&email, ExportFormat::Text), "user@example.com_raw_output.txt");
        assert_eq!(archive_filename(&email), "user@example.com_results.zip");
    }

    fn report(raw: &str) -> CheckReport {
        let run = crate::domain::model::RunResult::from_stdout(raw.to_string(), std::time::Duration::ZERO);
        CheckReport {
            email: EmailAddress::parse("user@example.com").unwrap(),
            outcome: crate::core::summarize::summarize(&run.raw_output),
            run,
            filter: ServiceFilter::All,
            checked_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_downloads_for_parsed_output() {
        let parsed = report(r#"[{"name":"twitter","exists":true}]"#);
        let buffers = parsed.downloads(&[ExportFormat::Json, ExportFormat::Csv]).unwrap();

        let names: Vec<&str> = buffers.iter().map(|b| b.filename.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "user@example.com_results.json",
                "user@example.com_results.csv",
                "user@example.com_raw_output.txt"
            ]
        );
        assert_eq!(buffers[1].bytes, b"name,exists\ntwitter,true\n");
    }

    #[test]
    fn test_downloads_respect_format_selection() {
        let parsed = report(r#"[{"name":"twitter"}]"#);
        let buffers = parsed.downloads(&[ExportFormat::Csv]).unwrap();
        assert_eq!(buffers.len(), 2);
        assert_eq!(buffers[0].mime_type, "text/csv");
    }

    #[test]
    fn test_downloads_raw_only_when_unparsed() {
        let unparsed = report("");
        let buffers = unparsed.downloads(&[ExportFormat::Json, ExportFormat::Csv]).unwrap();
        assert_eq!(buffers.len(), 1);
        assert_eq!(buffers[0].bytes, b"No results found.");

        let empty = report("[]");
        assert_eq!(empty.downloads(&[ExportFormat::Json]).unwrap().len(), 1);
    }

    #[test]
    fn test_downloads_ignore_service_filter() {
        let mut narrowed = report(r#"[{"name":"twitter","exists":true},{"name":"github","exists":false}]"#);
        narrowed.filter = ServiceFilter::from("github");
        assert_eq!(narrowed.filtered_records().len(), 1);

        let buffers = narrowed.downloads(&[ExportFormat::Json, ExportFormat::Csv]).unwrap();

        let json: Value = serde_json::from_slice(&buffers[0].bytes).unwrap();
        assert_eq!(
            json,
            json!([{"name": "twitter", "exists": true}, {"name": "github", "exists": false}])
        );
        assert_eq!(buffers[1].bytes, b"name,exists\ntwitter,true\ngithub,false\n");
    }

    #[test]
    fn test_bundle_archive_contains_every_buffer() {
        let buffers = vec![
            export(ExportData::Text("raw"), "raw.txt", "text").unwrap(),
            export(ExportData::Value(&json!([])), "results.json", "json").unwrap(),
        ];
        let archive = bundle_archive(&buffers, "all.zip").unwrap();
        assert_eq!(archive.mime_type, "application/zip");

        let mut zip = zip::ZipArchive::new(std::io::Cursor::new(archive.bytes)).unwrap();
        assert_eq!(zip.len(), 2);

        let mut content = String::new();
        std::io::Read::read_to_string(&mut zip.by_name("raw.txt").unwrap(), &mut content).unwrap();
        assert_eq!(content, "raw");
    }
}
