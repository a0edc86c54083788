use serde::Serialize;
use serde_json::Value;

use crate::runner::PathResult;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
    Jsonl,
}

impl OutputFormat {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "txt" => Some(Self::Text),
            "json" => Some(Self::Json),
            "jsonl" | "ndjson" | "lines" => Some(Self::Jsonl),
            _ => None,
        }
    }
}

pub fn infer_format_from_path(path: &str) -> Option<OutputFormat> {
    let lower = path.trim().to_lowercase();
    if lower.ends_with(".jsonl") || lower.ends_with(".ndjson") {
        return Some(OutputFormat::Jsonl);
    }
    if lower.ends_with(".json") {
        return Some(OutputFormat::Json);
    }
    if lower.ends_with(".txt") {
        return Some(OutputFormat::Text);
    }
    None
}

#[derive(Clone, Debug, Serialize)]
pub struct OutputRecord<'a> {
    pub path: &'a str,
    pub url: &'a str,
    pub pages: u32,
    pub stop: String,
    pub dropped_pages: Vec<u32>,
    pub records: &'a [Value],
}

pub fn build_records(results: &[PathResult]) -> Vec<OutputRecord<'_>> {
    results
        .iter()
        .map(|r| OutputRecord {
            path: &r.path,
            url: &r.outcome.url,
            pages: r.outcome.pages,
            stop: r.outcome.stop.label(),
            dropped_pages: r.outcome.diagnostics.iter().map(|d| d.page).collect(),
            records: &r.outcome.records,
        })
        .collect()
}

pub fn render_text(records: &[OutputRecord<'_>]) -> Vec<u8> {
    let mut out = String::new();
    for r in records {
        out.push_str(&format!("# {} ({} records)\n", r.path, r.records.len()));
        for record in r.records {
            out.push_str(&record.to_string());
            out.push('\n');
        }
    }
    out.into_bytes()
}

pub fn render_json(records: &[OutputRecord<'_>]) -> Vec<u8> {
    let mut out = serde_json::to_vec_pretty(records).unwrap_or_else(|_| b"[]".to_vec());
    out.push(b'\n');
    out
}

pub fn render_jsonl(records: &[OutputRecord<'_>]) -> Vec<u8> {
    let mut out = String::new();
    for record in records.iter().flat_map(|r| r.records.iter()) {
        out.push_str(&record.to_string());
        out.push('\n');
    }
    out.into_bytes()
}

pub fn render(format: OutputFormat, records: &[OutputRecord<'_>]) -> Vec<u8> {
    match format {
        OutputFormat::Text => render_text(records),
        OutputFormat::Json => render_json(records),
        OutputFormat::Jsonl => render_jsonl(records),
    }
}
