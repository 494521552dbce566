//! Checks captured telemetry payloads against the event schema.
//!
//! A file holds either a single event object or an array of them.

use anyhow::{Context, Result};
use gainz_core::validate_telemetry;
use serde_json::Value;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadReport {
    pub label: String,
    /// Event kind on success, schema violation otherwise.
    pub outcome: Result<String, String>,
}

impl PayloadReport {
    fn check(label: String, payload: &Value) -> Self {
        let outcome = validate_telemetry(&payload.to_string())
            .map(|event| event.kind().to_string())
            .map_err(|err| err.to_string());
        Self { label, outcome }
    }
}

/// Validate every payload in `path`.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not JSON at all.
pub fn validate_file(path: &Path) -> Result<Vec<PayloadReport>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let name = path.display().to_string();
    validate_document(&name, &text).with_context(|| format!("parsing {}", path.display()))
}

fn validate_document(name: &str, text: &str) -> Result<Vec<PayloadReport>> {
    let document: Value = serde_json::from_str(text)?;
    Ok(match document {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, item)| PayloadReport::check(format!("{name}[{i}]"), item))
            .collect(),
        other => vec![PayloadReport::check(name.to_string(), &other)],
    })
}

/// Validate all files, turning unreadable ones into failed reports.
pub fn validate_files<P: AsRef<Path>>(paths: &[P]) -> Vec<PayloadReport> {
    paths
        .iter()
        .flat_map(|path| {
            let path = path.as_ref();
            validate_file(path).unwrap_or_else(|err| {
                log::warn!("{err:#}");
                vec![PayloadReport {
                    label: path.display().to_string(),
                    outcome: Err(format!("{err:#}")),
                }]
            })
        })
        .collect()
}
