//! What a consent record allows the app to do.
use serde::{Deserialize, Serialize};

use crate::consent::{ConsentRecord, TelemetryLevel};

/// Capabilities derived from a [`ConsentRecord`]. Never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
    pub can_send_basic_telemetry: bool,
    pub can_send_rich_telemetry: bool,
    /// Only ever granted together with rich telemetry.
    pub can_store_api_key_remotely: bool,
}

impl Capabilities {
    #[must_use]
    pub const fn from_consent(consent: &ConsentRecord) -> Self {
        let active = consent.is_active();
        let rich = active && matches!(consent.telemetry_level, TelemetryLevel::Rich);
        Self {
            can_send_basic_telemetry: active
                && matches!(
                    consent.telemetry_level,
                    TelemetryLevel::Basic | TelemetryLevel::Rich
                ),
            can_send_rich_telemetry: rich,
            can_store_api_key_remotely: rich,
        }
    }
}

/// Derive capabilities from a consent record.
#[must_use]
pub const fn capabilities_from_consent(consent: &ConsentRecord) -> Capabilities {
    Capabilities::from_consent(consent)
}
