//! Strict structural validation for telemetry payloads arriving at the
//! receiving service. Anything outside the exact shape is rejected, never
//! coerced.

use thiserror::Error;

use crate::telemetry::{BasicTelemetryEvent, TelemetryEvent, TelemetryKind};

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("payload does not match the telemetry schema: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("expected a {expected} payload, got {found}")]
    WrongKind {
        expected: TelemetryKind,
        found: TelemetryKind,
    },
}

/// Validate a payload of either kind.
///
/// # Errors
///
/// Returns [`SchemaError::Malformed`] for unknown or missing fields, values
/// outside the enumerations, non-numeric or unrounded metrics, or an unknown
/// `kind`.
pub fn validate_telemetry(json: &str) -> Result<TelemetryEvent, SchemaError> {
    Ok(serde_json::from_str(json)?)
}

/// Validate a basic telemetry payload.
///
/// # Errors
///
/// Returns [`SchemaError::WrongKind`] for a rich tuning payload and
/// [`SchemaError::Malformed`] for anything structurally invalid.
pub fn validate_basic_telemetry(json: &str) -> Result<BasicTelemetryEvent, SchemaError> {
    match validate_telemetry(json)? {
        TelemetryEvent::Basic(event) => Ok(event),
        other => Err(SchemaError::WrongKind {
            expected: TelemetryKind::Basic,
            found: other.kind(),
        }),
    }
}
