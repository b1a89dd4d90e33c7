//! CSV and JSON renderings of a scored batch.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Result;
use crate::matrix::EisenhowerMatrix;
use crate::task::{ScoreSource, ScoredTask};

/// Output format for a batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown format '{other}' (expected text, json or csv)")),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

const CSV_HEADER: &str = "rank,task,score,priority,urgency,importance,quadrant,source,reasoning";

/// Quote a CSV field when it contains a delimiter, quote or line break.
fn csv_field(value: &str) -> String {
    if value.contains(&[',', '"', '\n', '\r'][..]) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Render a batch as CSV, one row per task in batch order.
///
/// Rows end with CRLF.
pub fn to_csv(results: &[ScoredTask]) -> String {
    let mut out = String::with_capacity(64 * (results.len() + 1));
    out.push_str(CSV_HEADER);
    out.push_str("\r\n");

    for (i, r) in results.iter().enumerate() {
        let quadrant = r.quadrant.map(|q| q.key()).unwrap_or("");
        let row = [
            (i + 1).to_string(),
            csv_field(&r.task),
            r.score.to_string(),
            r.priority.to_string(),
            format!("{:.2}", r.urgency),
            format!("{:.2}", r.importance),
            quadrant.to_string(),
            r.source.to_string(),
            csv_field(&r.reasoning),
        ];
        out.push_str(&row.join(","));
        out.push_str("\r\n");
    }
    out
}

/// Render a batch as a pretty-printed JSON array of flat records.
pub fn to_json(results: &[ScoredTask]) -> Result<String> {
    Ok(serde_json::to_string_pretty(results)?)
}

/// JSON document wrapping a batch.
#[derive(Debug, Serialize, Deserialize)]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    /// Absent for an empty batch
    pub source: Option<ScoreSource>,
    pub results: Vec<ScoredTask>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix: Option<EisenhowerMatrix>,
}

impl Report {
    pub fn new(results: &[ScoredTask], matrix: Option<&EisenhowerMatrix>) -> Self {
        Self {
            generated_at: Utc::now(),
            source: results.first().map(|r| r.source),
            results: results.to_vec(),
            matrix: matrix.cloned(),
        }
    }
}

/// Render a batch, and optionally its matrix, as a JSON report.
pub fn to_json_report(results: &[ScoredTask], matrix: Option<&EisenhowerMatrix>) -> Result<String> {
    Ok(serde_json::to_string_pretty(&Report::new(results, matrix))?)
}
