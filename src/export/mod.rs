//! Export stub
//!
//! Serializes a JSON value into a downloadable file: pretty JSON, a
//! single-row CSV built from the object's keys, or a plain-text report.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    Json,
    Csv,
    Text,
}

impl ExportFormat {
    pub fn all() -> &'static [ExportFormat] {
        &[ExportFormat::Json, ExportFormat::Csv, ExportFormat::Text]
    }

    pub fn mime_type(&self) -> &'static str {
        match self {
            ExportFormat::Json => "application/json",
            ExportFormat::Csv => "text/csv",
            ExportFormat::Text => "text/plain",
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Text => "txt",
        }
    }
}

impl std::str::FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "csv" => Ok(ExportFormat::Csv),
            "text" | "txt" => Ok(ExportFormat::Text),
            other => Err(ExportError::UnsupportedFormat(other.to_string())),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unsupported export format: {0}")]
    UnsupportedFormat(String),

    #[error("Failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// A rendered export ready to be served as an attachment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportFile {
    pub filename: String,
    pub mime_type: String,
    pub content: String,
}

pub fn export_filename(kind: &str, timestamp: i64, format: ExportFormat) -> String {
    format!("mental-model-{}-{}.{}", kind, timestamp, format.extension())
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Header row of object keys plus one row of stringified values.
/// Non-object values export as a single `value` column.
pub fn to_csv(value: &Value) -> String {
    let (headers, row): (Vec<String>, Vec<String>) = match value {
        Value::Object(map) => map
            .iter()
            .map(|(k, v)| (csv_field(k), csv_field(&stringify(v))))
            .unzip(),
        other => (vec!["value".to_string()], vec![csv_field(&stringify(other))]),
    };

    format!("{}\n{}\n", headers.join(","), row.join(","))
}

pub fn to_text(title: &str, value: &Value) -> Result<String, ExportError> {
    let body = serde_json::to_string_pretty(value)?;
    let underline = "=".repeat(title.chars().count());
    Ok(format!("{}\n{}\n\n{}\n", title, underline, body))
}

/// Render `value` in `format`, naming the file after `kind` and `timestamp`
pub fn export_value(
    title: &str,
    kind: &str,
    value: &Value,
    format: ExportFormat,
    timestamp: i64,
) -> Result<ExportFile, ExportError> {
    let content = match format {
        ExportFormat::Json => serde_json::to_string_pretty(value)?,
        ExportFormat::Csv => to_csv(value),
        ExportFormat::Text => to_text(title, value)?,
    };

    Ok(ExportFile {
        filename: export_filename(kind, timestamp, format),
        mime_type: format.mime_type().to_string(),
        content,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_round_trip() {
        let value = json!({"model": "Inversion", "score": 82, "steps": ["a", "b"]});
        let file = export_value("Report", "solution", &value, ExportFormat::Json, 1700000000).unwrap();
        let parsed: Value = serde_json::from_str(&file.content).unwrap();
        assert_eq!(parsed, value);
        assert_eq!(file.filename, "mental-model-solution-1700000000.json");
        assert_eq!(file.mime_type, "application/json");
    }

    #[test]
    fn test_csv_quotes_special_characters() {
        let value = json!({"name": "Occam's Razor", "note": "simple, \"fast\"", "count": 3});
        let csv = to_csv(&value);
        let mut lines = csv.lines();
        assert_eq!(lines.next(), Some("count,name,note"));
        assert_eq!(lines.next(), Some("3,Occam's Razor,\"simple, \"\"fast\"\"\""));
    }

    #[test]
    fn test_csv_nested_values_are_stringified() {
        let csv = to_csv(&json!({"steps": ["one", "two"]}));
        assert_eq!(csv, "steps\n\"[\"\"one\"\",\"\"two\"\"]\"\n");
    }

    #[test]
    fn test_text_has_title_underline_and_body() {
        let text = to_text("Results", &json!({"a": 1})).unwrap();
        assert!(text.starts_with("Results\n=======\n\n{"));
    }

    #[test]
    fn test_format_parsing_and_metadata() {
        assert_eq!("TXT".parse::<ExportFormat>().unwrap(), ExportFormat::Text);
        assert!("pdf".parse::<ExportFormat>().is_err());
        assert_eq!(ExportFormat::Csv.mime_type(), "text/csv");
        assert_eq!(export_filename("report", 5, ExportFormat::Text), "mental-model-report-5.txt");
    }
}
