//! Display-only view of the consent state for the settings panel.
use serde::{Deserialize, Serialize};

use crate::consent::{ConsentRecord, TelemetryLevel};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UiConsentState {
    pub telemetry_level: TelemetryLevel,
    pub consent_level_label: String,
    /// Mirrors API key presence; unrelated to consent.
    pub can_use_auto_mode: bool,
}

/// Label for a telemetry level.
///
/// Keyed off the level alone: a revoked rich record still reads
/// "Telemetry: Rich" until the level itself is reset.
#[must_use]
pub const fn consent_level_label(level: TelemetryLevel) -> &'static str {
    match level {
        TelemetryLevel::None => "Local Only",
        TelemetryLevel::Basic => "Telemetry: Basic",
        TelemetryLevel::Rich => "Telemetry: Rich",
    }
}

#[must_use]
pub fn ui_consent_state(consent: &ConsentRecord, has_api_key: bool) -> UiConsentState {
    UiConsentState {
        telemetry_level: consent.telemetry_level,
        consent_level_label: consent_level_label(consent.telemetry_level).to_string(),
        can_use_auto_mode: has_api_key,
    }
}
