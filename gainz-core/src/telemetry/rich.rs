//! Predicted-versus-observed tuning data, sent only with rich consent.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::numbers::round_sig_figs;
use crate::telemetry::basic::{Buckets, EventJumpType, ensure_rounded};

const SIG_FIGS: u32 = 3;

/// How closely the player followed the plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Adherence {
    Exact,
    Close,
    Approx,
    Messy,
}

/// Rounded gain figures for one side of the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawGainSample")]
pub struct GainSample {
    gain_total: f64,
    gain_per_energy: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawGainSample {
    gain_total: f64,
    gain_per_energy: f64,
}

impl TryFrom<RawGainSample> for GainSample {
    type Error = String;

    fn try_from(raw: RawGainSample) -> Result<Self, Self::Error> {
        Ok(Self {
            gain_total: ensure_rounded(
                "gainTotal",
                raw.gain_total,
                round_sig_figs(raw.gain_total, SIG_FIGS),
            )?,
            gain_per_energy: ensure_rounded(
                "gainPerEnergy",
                raw.gain_per_energy,
                round_sig_figs(raw.gain_per_energy, SIG_FIGS),
            )?,
        })
    }
}

impl GainSample {
    #[must_use]
    pub fn rounded(gain_total: f64, gain_per_energy: f64) -> Self {
        Self {
            gain_total: round_sig_figs(gain_total, SIG_FIGS),
            gain_per_energy: round_sig_figs(gain_per_energy, SIG_FIGS),
        }
    }

    #[must_use]
    pub const fn gain_total(&self) -> f64 {
        self.gain_total
    }

    #[must_use]
    pub const fn gain_per_energy(&self) -> f64 {
        self.gain_per_energy
    }
}

/// Observed minus predicted, as an absolute delta and a fraction of the prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct PredictionError {
    delta_abs: f64,
    delta_pct: f64,
}

impl PredictionError {
    /// `delta_pct` is a fraction (-0.12 means 12% under) and is 0 when nothing was predicted.
    #[must_use]
    pub fn between(predicted: &GainSample, observed: &GainSample) -> Self {
        let delta = observed.gain_total - predicted.gain_total;
        let pct = if predicted.gain_total == 0.0 {
            0.0
        } else {
            delta / predicted.gain_total
        };
        Self {
            delta_abs: round_sig_figs(delta, SIG_FIGS),
            delta_pct: round_sig_figs(pct, SIG_FIGS),
        }
    }

    #[must_use]
    pub const fn delta_abs(&self) -> f64 {
        self.delta_abs
    }

    #[must_use]
    pub const fn delta_pct(&self) -> f64 {
        self.delta_pct
    }
}

/// Rich tuning event. Like the basic event it has no identifier fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RichTuningEvent {
    pub app_version: String,
    pub ts: DateTime<Utc>,
    pub jump_type: EventJumpType,
    pub buckets: Buckets,
    pub predicted: GainSample,
    pub observed: GainSample,
    pub error: PredictionError,
    pub adherence: Adherence,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

impl RichTuningEvent {
    /// Build an event; `error` is derived and blank notes are dropped.
    #[allow(clippy::too_many_arguments)]
    #[must_use]
    pub fn new(
        app_version: impl Into<String>,
        ts: DateTime<Utc>,
        jump_type: EventJumpType,
        buckets: Buckets,
        predicted: GainSample,
        observed: GainSample,
        adherence: Adherence,
        notes: Option<&str>,
    ) -> Self {
        Self {
            app_version: app_version.into(),
            ts,
            jump_type,
            buckets,
            error: PredictionError::between(&predicted, &observed),
            predicted,
            observed,
            adherence,
            notes: notes
                .map(str::trim)
                .filter(|n| !n.is_empty())
                .map(str::to_string),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::basic::GymTier;
    use chrono::TimeZone;

    fn buckets() -> Buckets {
        Buckets::from_context(120_000_000.0, GymTier::Premium, 60_000.0, 250.0)
    }

    #[test]
    fn error_is_derived_from_samples() {
        let event = RichTuningEvent::new(
            "0.1.0",
            Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
            EventJumpType::Edvd,
            buckets(),
            GainSample::rounded(100_000.0, 50.0),
            GainSample::rounded(88_000.0, 44.0),
            Adherence::Close,
            Some("  stacked perks late  "),
        );
        assert!((event.error.delta_abs() - -12_000.0).abs() < 1e-9);
        assert!((event.error.delta_pct() - -0.12).abs() < 1e-12);
        assert_eq!(event.notes.as_deref(), Some("stacked perks late"));
    }

    #[test]
    fn zero_prediction_has_zero_pct() {
        let error = PredictionError::between(
            &GainSample::rounded(0.0, 0.0),
            &GainSample::rounded(500.0, 1.0),
        );
        assert!((error.delta_abs() - 500.0).abs() < 1e-9);
        assert!(error.delta_pct().abs() < f64::EPSILON);
    }

    #[test]
    fn blank_notes_are_dropped() {
        let event = RichTuningEvent::new(
            "0.1.0",
            Utc.with_ymd_and_hms(2026, 3, 2, 10, 0, 0).unwrap(),
            EventJumpType::Candy,
            buckets(),
            GainSample::rounded(1.0, 1.0),
            GainSample::rounded(1.0, 1.0),
            Adherence::Exact,
            Some("   "),
        );
        assert!(event.notes.is_none());
        let value = serde_json::to_value(&event).unwrap();
        assert!(value.get("notes").is_none());
        assert_eq!(value["adherence"], "exact");
        assert_eq!(value["error"]["deltaPct"], 0.0);
    }
}
