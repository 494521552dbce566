//! Consent settings panel and telemetry reporting for the host page.
//!
//! Raw estimator figures cross from JavaScript into Rust and are bucketed or
//! rounded here, before any event exists.

use chrono::{DateTime, Utc};
use gainz_core::telemetry::{
    APP_VERSION, Adherence, BasicTelemetryEvent, Buckets, EventJumpType, GainSample, GymTier,
    Prediction, RichTuningEvent,
};
use gainz_core::{
    CalcState, CompanionEngine, POLICY_VALID_AS_OF, POLICY_VERSION, TelemetryEvent, TelemetryLevel,
};
use serde::{Deserialize, Serialize};
use wasm_bindgen::prelude::*;

use crate::dom::to_js_error;
use crate::session::CalcSession;
use crate::storage::{WebConsentStorage, WebKeyVault};
use crate::transport::FetchTransport;

pub type WebEngine = CompanionEngine<WebConsentStorage, WebKeyVault, FetchTransport>;

/// Create a web-compatible engine backed by `localStorage` and `fetch`.
#[must_use]
pub fn create_web_engine() -> WebEngine {
    CompanionEngine::new(
        WebConsentStorage,
        WebKeyVault::default(),
        FetchTransport::default(),
    )
}

/// Context of a run as entered or pulled on the page.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunContext {
    pub stat_total: f64,
    #[serde(default)]
    pub gym_tier: GymTier,
    pub happy: f64,
    pub energy: f64,
}

impl RunContext {
    #[must_use]
    pub fn buckets(&self) -> Buckets {
        Buckets::from_context(self.stat_total, self.gym_tier, self.happy, self.energy)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GainFigures {
    pub gain_total: f64,
    pub gain_per_energy: f64,
}

/// What the player reported after a jump.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TuningReport {
    pub context: RunContext,
    pub predicted: GainFigures,
    pub observed: GainFigures,
    pub adherence: Adherence,
    #[serde(default)]
    pub notes: Option<String>,
}

#[must_use]
pub fn basic_event(
    state: &CalcState,
    context: &RunContext,
    prediction: &Prediction,
    ts: DateTime<Utc>,
) -> TelemetryEvent {
    BasicTelemetryEvent::from_run(APP_VERSION, ts, state, context.buckets(), prediction).into()
}

#[must_use]
pub fn tuning_event(state: &CalcState, report: &TuningReport, ts: DateTime<Utc>) -> TelemetryEvent {
    RichTuningEvent::new(
        APP_VERSION,
        ts,
        EventJumpType::from(state.jump_type),
        report.context.buckets(),
        GainSample::rounded(report.predicted.gain_total, report.predicted.gain_per_energy),
        GainSample::rounded(report.observed.gain_total, report.observed.gain_per_energy),
        report.adherence,
        report.notes.as_deref(),
    )
    .into()
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PolicyInfo {
    version: &'static str,
    valid_as_of: &'static str,
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(Into::into)
}

#[wasm_bindgen]
pub struct ConsentPanel {
    engine: WebEngine,
}

#[wasm_bindgen]
impl ConsentPanel {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> Self {
        Self {
            engine: create_web_engine(),
        }
    }

    #[wasm_bindgen(js_name = policyInfo)]
    pub fn policy_info() -> Result<JsValue, JsValue> {
        to_js(&PolicyInfo {
            version: POLICY_VERSION,
            valid_as_of: POLICY_VALID_AS_OF,
        })
    }

    #[wasm_bindgen(js_name = uiState)]
    pub fn ui_state(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.ui_consent_state().map_err(to_js_error)?)
    }

    pub fn capabilities(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.capabilities().map_err(to_js_error)?)
    }

    #[wasm_bindgen(js_name = acknowledgePolicy)]
    pub fn acknowledge_policy(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.acknowledge_policy(Utc::now()).map_err(to_js_error)?)
    }

    #[wasm_bindgen(js_name = optIn)]
    pub fn opt_in(&self, level: &str) -> Result<JsValue, JsValue> {
        let level: TelemetryLevel = level
            .parse()
            .map_err(|()| to_js_error(format!("unknown telemetry level: {level}")))?;
        to_js(&self.engine.opt_in(level, Utc::now()).map_err(to_js_error)?)
    }

    pub fn revoke(&self) -> Result<JsValue, JsValue> {
        to_js(&self.engine.revoke(Utc::now()).map_err(to_js_error)?)
    }

    #[wasm_bindgen(js_name = storeApiKeyRemotely)]
    pub fn store_api_key_remotely(&self, api_key: &str) -> Result<(), JsValue> {
        self.engine
            .store_api_key_remotely(api_key)
            .map_err(to_js_error)
    }

    /// Offer a basic event for the session's current configuration.
    /// Resolves to whether it was handed to the network.
    #[wasm_bindgen(js_name = reportRun)]
    pub fn report_run(
        &self,
        session: &CalcSession,
        context: JsValue,
        prediction: JsValue,
    ) -> Result<bool, JsValue> {
        let context: RunContext = serde_wasm_bindgen::from_value(context)?;
        let prediction: Prediction = serde_wasm_bindgen::from_value(prediction)?;
        let event = basic_event(session.current(), &context, &prediction, Utc::now());
        let decision = self.engine.send_telemetry(&event).map_err(to_js_error)?;
        Ok(decision.was_submitted())
    }

    #[wasm_bindgen(js_name = reportTuning)]
    pub fn report_tuning(&self, session: &CalcSession, report: JsValue) -> Result<bool, JsValue> {
        let report: TuningReport = serde_wasm_bindgen::from_value(report)?;
        let event = tuning_event(session.current(), &report, Utc::now());
        let decision = self.engine.send_telemetry(&event).map_err(to_js_error)?;
        Ok(decision.was_submitted())
    }
}

impl Default for ConsentPanel {
    fn default() -> Self {
        Self::new()
    }
}
