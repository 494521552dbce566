//! Consent gate in front of the telemetry transport.
//!
//! Missing consent is the normal case for most users, so a dropped event is not
//! an error. Emission is fire-and-forget: the caller learns nothing about
//! delivery and nothing is retried.

use crate::capabilities::Capabilities;
use crate::consent::ConsentRecord;
use crate::telemetry::{TelemetryEvent, TelemetryKind};

/// Delivers serialized events off the device.
pub trait TelemetryTransport {
    type Error: std::error::Error;

    /// Hand over one JSON payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload could not be handed over. The gate logs
    /// it and does not retry.
    fn submit(&self, payload: String) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    NoBasicConsent,
    NoRichConsent,
    Unserializable,
}

/// What the gate did with a candidate. Informational only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Submitted,
    Dropped(DropReason),
}

impl GateDecision {
    #[must_use]
    pub const fn was_submitted(self) -> bool {
        matches!(self, Self::Submitted)
    }
}

/// Forward `event` to `transport` if `consent` allows its kind.
pub fn send_telemetry<T>(
    consent: &ConsentRecord,
    event: &TelemetryEvent,
    transport: &T,
) -> GateDecision
where
    T: TelemetryTransport + ?Sized,
{
    let caps = Capabilities::from_consent(consent);
    let kind = event.kind();

    let denied = match kind {
        TelemetryKind::Basic if !caps.can_send_basic_telemetry => Some(DropReason::NoBasicConsent),
        TelemetryKind::RichTuning if !caps.can_send_rich_telemetry => {
            Some(DropReason::NoRichConsent)
        }
        _ => None,
    };
    if let Some(reason) = denied {
        log::debug!("dropping {kind} event: {reason:?}");
        return GateDecision::Dropped(reason);
    }

    let payload = match event.to_json() {
        Ok(payload) => payload,
        Err(err) => {
            log::error!("failed to serialize {kind} event: {err}");
            return GateDecision::Dropped(DropReason::Unserializable);
        }
    };

    if let Err(err) = transport.submit(payload) {
        log::warn!("telemetry transport rejected {kind} event: {err}");
    }
    GateDecision::Submitted
}
