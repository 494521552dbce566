//! Anonymous usage telemetry.
//!
//! Every numeric value is bucketed or rounded before it is placed in an event.
//! The types here only expose constructors that do that work, so a precise
//! stat total or cost cannot be put on the wire by accident.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::calculator::{CalcState, InputMode, JumpType};
use crate::numbers::{round_sig_figs, round_to_nearest};

const COST_STEP: f64 = 100.0;
const GAIN_SIG_FIGS: u32 = 3;

/// How the run was configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventMode {
    #[serde(rename = "api-assisted")]
    ApiAssisted,
    #[serde(rename = "manual")]
    Manual,
}

impl EventMode {
    /// Only auto input on a recipe jump counts as API assisted.
    #[must_use]
    pub const fn from_calc(state: &CalcState) -> Self {
        match (state.jump_type, state.input_mode) {
            (JumpType::Manual, _) | (_, InputMode::Manual) => Self::Manual,
            (_, InputMode::Auto) => Self::ApiAssisted,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventJumpType {
    #[serde(rename = "edvd")]
    Edvd,
    #[serde(rename = "candy")]
    Candy,
    #[serde(rename = "99k")]
    NinetyNineK,
    #[serde(rename = "custom")]
    Custom,
}

impl From<JumpType> for EventJumpType {
    fn from(value: JumpType) -> Self {
        match value {
            JumpType::Manual => Self::Custom,
            JumpType::Candy => Self::Candy,
            JumpType::Edvd => Self::Edvd,
            JumpType::NinetyNineK => Self::NinetyNineK,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StatBand {
    #[serde(rename = "0-50m")]
    UpTo50M,
    #[serde(rename = "50-200m")]
    UpTo200M,
    #[serde(rename = "200m-1b")]
    UpTo1B,
    #[serde(rename = "1b+")]
    Over1B,
}

impl StatBand {
    /// Bucket a battle stat total. Negative or non-finite totals land in the lowest band.
    #[must_use]
    pub fn from_total(total: f64) -> Self {
        if !total.is_finite() || total < 50_000_000.0 {
            Self::UpTo50M
        } else if total < 200_000_000.0 {
            Self::UpTo200M
        } else if total < 1_000_000_000.0 {
            Self::UpTo1B
        } else {
            Self::Over1B
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum GymTier {
    Basic,
    Premium,
    Specialist,
    #[default]
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HappyTarget {
    #[serde(rename = "0-10k")]
    UpTo10K,
    #[serde(rename = "10k-50k")]
    UpTo50K,
    #[serde(rename = "50k-100k")]
    UpTo100K,
    #[serde(rename = "100k+")]
    Over100K,
}

impl HappyTarget {
    #[must_use]
    pub fn from_happy(happy: f64) -> Self {
        if !happy.is_finite() || happy < 10_000.0 {
            Self::UpTo10K
        } else if happy < 50_000.0 {
            Self::UpTo50K
        } else if happy < 100_000.0 {
            Self::UpTo100K
        } else {
            Self::Over100K
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyBudget {
    #[serde(rename = "0-199")]
    UpTo199,
    #[serde(rename = "200-299")]
    UpTo299,
    #[serde(rename = "300-399")]
    UpTo399,
    #[serde(rename = "400+")]
    Over400,
}

impl EnergyBudget {
    #[must_use]
    pub fn from_energy(energy: f64) -> Self {
        if !energy.is_finite() || energy < 200.0 {
            Self::UpTo199
        } else if energy < 300.0 {
            Self::UpTo299
        } else if energy < 400.0 {
            Self::UpTo399
        } else {
            Self::Over400
        }
    }
}

/// Coarse context of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct Buckets {
    pub stat_band: StatBand,
    pub gym_tier: GymTier,
    pub happy_target: HappyTarget,
    pub energy_budget: EnergyBudget,
}

impl Buckets {
    #[must_use]
    pub fn from_context(stat_total: f64, gym_tier: GymTier, happy: f64, energy: f64) -> Self {
        Self {
            stat_band: StatBand::from_total(stat_total),
            gym_tier,
            happy_target: HappyTarget::from_happy(happy),
            energy_budget: EnergyBudget::from_energy(energy),
        }
    }
}

/// Raw figures produced by the estimator for one configuration.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub gain_total: f64,
    pub gain_per_energy: f64,
    pub gain_per_dollar: f64,
    pub cost_per_happy: f64,
    pub cost_per_energy: f64,
}

/// Cost and efficiency figures safe to transmit.
///
/// Input is only accepted when every figure is already at the precision
/// [`RoundedMetrics::from_prediction`] would produce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RawRoundedMetrics")]
pub struct RoundedMetrics {
    cost_per_happy: f64,
    cost_per_energy: f64,
    predicted_gain_per_energy: f64,
    predicted_gain_per_dollar: f64,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RawRoundedMetrics {
    cost_per_happy: f64,
    cost_per_energy: f64,
    predicted_gain_per_energy: f64,
    predicted_gain_per_dollar: f64,
}

impl TryFrom<RawRoundedMetrics> for RoundedMetrics {
    type Error = String;

    fn try_from(raw: RawRoundedMetrics) -> Result<Self, Self::Error> {
        Ok(Self {
            cost_per_happy: ensure_rounded(
                "costPerHappy",
                raw.cost_per_happy,
                round_to_nearest(raw.cost_per_happy, COST_STEP),
            )?,
            cost_per_energy: ensure_rounded(
                "costPerEnergy",
                raw.cost_per_energy,
                round_to_nearest(raw.cost_per_energy, COST_STEP),
            )?,
            predicted_gain_per_energy: ensure_rounded(
                "predictedGainPerEnergy",
                raw.predicted_gain_per_energy,
                round_sig_figs(raw.predicted_gain_per_energy, GAIN_SIG_FIGS),
            )?,
            predicted_gain_per_dollar: ensure_rounded(
                "predictedGainPerDollar",
                raw.predicted_gain_per_dollar,
                round_sig_figs(raw.predicted_gain_per_dollar, GAIN_SIG_FIGS),
            )?,
        })
    }
}

/// Accept `value` only if it matches its rounded form, up to float noise.
pub(crate) fn ensure_rounded(field: &str, value: f64, rounded: f64) -> Result<f64, String> {
    let scale = value.abs().max(rounded.abs());
    if value.is_finite() && (value - rounded).abs() <= 1e-9 * scale {
        Ok(value)
    } else {
        Err(format!("{field} is not rounded: {value}"))
    }
}

impl RoundedMetrics {
    /// Costs go to the nearest 100, gains to three significant figures.
    #[must_use]
    pub fn from_prediction(prediction: &Prediction) -> Self {
        Self {
            cost_per_happy: round_to_nearest(prediction.cost_per_happy, COST_STEP),
            cost_per_energy: round_to_nearest(prediction.cost_per_energy, COST_STEP),
            predicted_gain_per_energy: round_sig_figs(prediction.gain_per_energy, GAIN_SIG_FIGS),
            predicted_gain_per_dollar: round_sig_figs(prediction.gain_per_dollar, GAIN_SIG_FIGS),
        }
    }

    #[must_use]
    pub const fn cost_per_happy(&self) -> f64 {
        self.cost_per_happy
    }

    #[must_use]
    pub const fn cost_per_energy(&self) -> f64 {
        self.cost_per_energy
    }

    #[must_use]
    pub const fn predicted_gain_per_energy(&self) -> f64 {
        self.predicted_gain_per_energy
    }

    #[must_use]
    pub const fn predicted_gain_per_dollar(&self) -> f64 {
        self.predicted_gain_per_dollar
    }
}

/// Anonymous estimator usage event.
///
/// Carries no field for an API key, player id, name, faction, IP address or
/// device id. Unknown fields are rejected on input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct BasicTelemetryEvent {
    pub app_version: String,
    pub ts: DateTime<Utc>,
    pub mode: EventMode,
    pub jump_type: EventJumpType,
    pub buckets: Buckets,
    pub rounded: RoundedMetrics,
}

impl BasicTelemetryEvent {
    #[must_use]
    pub fn new(
        app_version: impl Into<String>,
        ts: DateTime<Utc>,
        mode: EventMode,
        jump_type: EventJumpType,
        buckets: Buckets,
        rounded: RoundedMetrics,
    ) -> Self {
        Self {
            app_version: app_version.into(),
            ts,
            mode,
            jump_type,
            buckets,
            rounded,
        }
    }

    /// Describe a calculator run.
    #[must_use]
    pub fn from_run(
        app_version: impl Into<String>,
        ts: DateTime<Utc>,
        state: &CalcState,
        buckets: Buckets,
        prediction: &Prediction,
    ) -> Self {
        Self::new(
            app_version,
            ts,
            EventMode::from_calc(state),
            EventJumpType::from(state.jump_type),
            buckets,
            RoundedMetrics::from_prediction(prediction),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_band_edges() {
        assert_eq!(StatBand::from_total(0.0), StatBand::UpTo50M);
        assert_eq!(StatBand::from_total(49_999_999.0), StatBand::UpTo50M);
        assert_eq!(StatBand::from_total(50_000_000.0), StatBand::UpTo200M);
        assert_eq!(StatBand::from_total(200_000_000.0), StatBand::UpTo1B);
        assert_eq!(StatBand::from_total(1_000_000_000.0), StatBand::Over1B);
        assert_eq!(StatBand::from_total(f64::NAN), StatBand::UpTo50M);
    }

    #[test]
    fn happy_and_energy_edges() {
        assert_eq!(HappyTarget::from_happy(9_999.0), HappyTarget::UpTo10K);
        assert_eq!(HappyTarget::from_happy(10_000.0), HappyTarget::UpTo50K);
        assert_eq!(HappyTarget::from_happy(99_999.0), HappyTarget::UpTo100K);
        assert_eq!(HappyTarget::from_happy(100_000.0), HappyTarget::Over100K);
        assert_eq!(EnergyBudget::from_energy(150.0), EnergyBudget::UpTo199);
        assert_eq!(EnergyBudget::from_energy(200.0), EnergyBudget::UpTo299);
        assert_eq!(EnergyBudget::from_energy(399.5), EnergyBudget::UpTo399);
        assert_eq!(EnergyBudget::from_energy(1_000.0), EnergyBudget::Over400);
    }

    #[test]
    fn rounding_hides_precise_values() {
        let rounded = RoundedMetrics::from_prediction(&Prediction {
            gain_total: 123_456.0,
            gain_per_energy: 12.345_67,
            gain_per_dollar: 0.000_123_45,
            cost_per_happy: 3_456.0,
            cost_per_energy: 51_249.0,
        });
        assert!((rounded.cost_per_happy() - 3_500.0).abs() < 1e-9);
        assert!((rounded.cost_per_energy() - 51_200.0).abs() < 1e-9);
        assert!((rounded.predicted_gain_per_energy() - 12.3).abs() < 1e-9);
        assert!((rounded.predicted_gain_per_dollar() - 0.000_123).abs() < 1e-12);
    }

    #[test]
    fn mode_follows_calculator_state() {
        let mut state = CalcState::initial(true);
        assert_eq!(EventMode::from_calc(&state), EventMode::ApiAssisted);
        state.input_mode = InputMode::Manual;
        assert_eq!(EventMode::from_calc(&state), EventMode::Manual);
        let manual = CalcState::initial(false);
        assert_eq!(EventMode::from_calc(&manual), EventMode::Manual);
        assert_eq!(EventJumpType::from(manual.jump_type), EventJumpType::Custom);
    }

    #[test]
    fn serializes_wire_names() {
        let buckets = Buckets::from_context(75_000_000.0, GymTier::Specialist, 99_999.0, 450.0);
        let value = serde_json::to_value(buckets).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "statBand": "50-200m",
                "gymTier": "specialist",
                "happyTarget": "50k-100k",
                "energyBudget": "400+"
            })
        );
    }
}
