//! Writing work items as JSON or CSV

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::model::{Timestamp, WorkItem};

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Json,
    Csv,
}

impl OutputFormat {
    pub const VARIANTS: [&'static str; 2] = ["json", "csv"];

    pub fn as_str(&self) -> &'static str {
        match self {
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        }
    }

    /// Case-insensitive lookup
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "json" => Some(OutputFormat::Json),
            "csv" => Some(OutputFormat::Csv),
            _ => None,
        }
    }
}

const CSV_HEADER: [&str; 16] = [
    "key",
    "summary",
    "requested_by",
    "requested_by_email",
    "assigned_to",
    "class_of_service",
    "current_state",
    "category",
    "created_on",
    "last_modified",
    "is_done",
    "accepted_on",
    "commitment_point",
    "committed_on",
    "delivered_on",
    "lead_time",
];

/// Open the destination: a file, or stdout for `None` and `-`
pub fn open(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(p) if p != Path::new("-") => Ok(Box::new(BufWriter::new(File::create(p)?))),
        _ => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

/// Write all items in the given format
pub fn write_items<W: Write>(out: &mut W, items: &[WorkItem], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(out, items)?,
        OutputFormat::Csv => write_csv(out, items)?,
    }
    out.flush()?;
    Ok(())
}

fn write_json<W: Write>(out: &mut W, items: &[WorkItem]) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, items)?;
    writeln!(out)?;
    Ok(())
}

fn write_csv<W: Write>(out: &mut W, items: &[WorkItem]) -> Result<()> {
    writeln!(out, "{}", CSV_HEADER.join(","))?;

    for item in items {
        let row = [
            item.key.clone(),
            item.summary.clone(),
            item.requested_by.name.clone(),
            item.requested_by.email.clone(),
            item.assigned_to.as_ref().map(|u| u.name.clone()).unwrap_or_default(),
            item.class_of_service.clone().unwrap_or_default(),
            item.current_state.name.clone(),
            item.current_state.category.as_str().to_string(),
            item.created_on.to_rfc3339(),
            item.last_modified.to_rfc3339(),
            item.is_done.to_string(),
            timestamp(item.accepted_on),
            item.commitment_point.clone().unwrap_or_default(),
            timestamp(item.committed_on),
            timestamp(item.delivered_on),
            item.lead_time.map(|d| d.to_string()).unwrap_or_default(),
        ];
        let fields: Vec<String> = row.iter().map(|f| csv_field(f)).collect();
        writeln!(out, "{}", fields.join(","))?;
    }

    Ok(())
}

fn timestamp(ts: Option<Timestamp>) -> String {
    ts.map(|t| t.to_rfc3339()).unwrap_or_default()
}

/// Quote a CSV field when it contains a delimiter, quote or line break
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
