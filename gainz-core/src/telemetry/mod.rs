//! Optional telemetry: event shapes, the consent gate, and the strict schema
//! applied where payloads are received.

pub mod basic;
pub mod gate;
pub mod rich;
pub mod schema;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use basic::{
    BasicTelemetryEvent, Buckets, EnergyBudget, EventJumpType, EventMode, GymTier, HappyTarget,
    Prediction, RoundedMetrics, StatBand,
};
pub use gate::{DropReason, GateDecision, TelemetryTransport, send_telemetry};
pub use rich::{Adherence, GainSample, PredictionError, RichTuningEvent};
pub use schema::{SchemaError, validate_basic_telemetry, validate_telemetry};

/// Version stamped into outgoing events.
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// A telemetry candidate, discriminated by `kind` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum TelemetryEvent {
    #[serde(rename = "basic_telemetry")]
    Basic(BasicTelemetryEvent),
    #[serde(rename = "rich_tuning")]
    RichTuning(RichTuningEvent),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TelemetryKind {
    Basic,
    RichTuning,
}

impl TelemetryKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Basic => "basic_telemetry",
            Self::RichTuning => "rich_tuning",
        }
    }
}

impl fmt::Display for TelemetryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TelemetryEvent {
    #[must_use]
    pub const fn kind(&self) -> TelemetryKind {
        match self {
            Self::Basic(_) => TelemetryKind::Basic,
            Self::RichTuning(_) => TelemetryKind::RichTuning,
        }
    }

    /// Serialize for the transport.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

impl From<BasicTelemetryEvent> for TelemetryEvent {
    fn from(value: BasicTelemetryEvent) -> Self {
        Self::Basic(value)
    }
}

impl From<RichTuningEvent> for TelemetryEvent {
    fn from(value: RichTuningEvent) -> Self {
        Self::RichTuning(value)
    }
}
