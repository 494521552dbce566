//! Calculator session exported to JavaScript.
//!
//! The host page owns one session per calculator widget and calls one method
//! per user action. Every method returns the new state as a plain object.

use gainz_core::{
    CalcState, Calculator, InputMode, JumpType, ManualScaffold, ScaffoldTable, SystemAutoPull,
};
use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::prelude::*;

use crate::dom::to_js_error;

const BUNDLED_SCAFFOLDS: &str = include_str!("../static/data/scaffolds.json");

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("unknown jump type: {0}")]
    JumpType(String),
    #[error("unknown input mode: {0}")]
    InputMode(String),
    #[error("unknown scaffold: {0}")]
    Scaffold(String),
    #[error("invalid calculator data: {0}")]
    Data(#[from] serde_json::Error),
}

#[wasm_bindgen]
pub struct CalcSession {
    calculator: Calculator<SystemAutoPull, ScaffoldTable>,
    state: CalcState,
}

impl CalcSession {
    /// Start a session with the bundled scaffold defaults.
    ///
    /// # Errors
    /// Returns an error if the bundled scaffold table is malformed.
    pub fn with_bundled_scaffolds(has_api_key: bool) -> Result<Self, SessionError> {
        let scaffolds = ScaffoldTable::from_json(BUNDLED_SCAFFOLDS)?;
        let calculator = Calculator::with_collaborators(SystemAutoPull, scaffolds);
        let state = calculator.initial_state(has_api_key);
        Ok(Self { calculator, state })
    }

    /// Resume a persisted state, then reconcile it with the current key status.
    ///
    /// The stored value is normalized first, so an edited or stale record
    /// cannot bring back a zero jump count or auto input without a key.
    ///
    /// # Errors
    /// Returns an error if `json` is not a calculator state.
    pub fn resume(json: &str, has_api_key: bool) -> Result<Self, SessionError> {
        let mut session = Self::with_bundled_scaffolds(has_api_key)?;
        let stored = serde_json::from_str::<CalcState>(json)?.normalized();
        session.state = session.calculator.set_has_api_key(&stored, has_api_key);
        Ok(session)
    }

    #[must_use]
    pub const fn current(&self) -> &CalcState {
        &self.state
    }

    pub fn apply_jump_type(&mut self, jump_type: JumpType) -> &CalcState {
        self.state = self.calculator.select_jump_type(&self.state, jump_type);
        &self.state
    }

    pub fn apply_input_mode(&mut self, input_mode: InputMode) -> &CalcState {
        self.state = self.calculator.select_input_mode(&self.state, input_mode);
        &self.state
    }

    pub fn apply_scaffold(&mut self, scaffold: ManualScaffold) -> &CalcState {
        self.state = self
            .calculator
            .select_manual_scaffold(&self.state, scaffold);
        &self.state
    }

    pub fn apply_has_api_key(&mut self, has_api_key: bool) -> &CalcState {
        self.state = self.calculator.set_has_api_key(&self.state, has_api_key);
        &self.state
    }

    pub fn apply_jumps_count(&mut self, jumps: f64) -> &CalcState {
        self.state = self.calculator.set_jumps_count(&self.state, jumps);
        &self.state
    }

    pub fn apply_touch(&mut self, field_id: &str) -> &CalcState {
        self.state = self.calculator.touch(&self.state, field_id);
        &self.state
    }

    pub fn apply_field(&mut self, field_id: &str, value: f64) -> &CalcState {
        self.state = self.calculator.set_field(&self.state, field_id, value);
        &self.state
    }
}

/// # Errors
/// Returns [`SessionError::JumpType`] for values other than `manual`, `candy`, `edvd`, `99k`.
pub fn parse_jump_type(value: &str) -> Result<JumpType, SessionError> {
    value
        .parse()
        .map_err(|()| SessionError::JumpType(value.to_string()))
}

/// # Errors
/// Returns [`SessionError::InputMode`] for values other than `auto` and `manual`.
pub fn parse_input_mode(value: &str) -> Result<InputMode, SessionError> {
    value
        .parse()
        .map_err(|()| SessionError::InputMode(value.to_string()))
}

/// # Errors
/// Returns [`SessionError::Scaffold`] for values other than `candy`, `edvd`, `99k`.
pub fn parse_scaffold(value: &str) -> Result<ManualScaffold, SessionError> {
    value
        .parse()
        .map_err(|()| SessionError::Scaffold(value.to_string()))
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(Into::into)
}

#[wasm_bindgen]
impl CalcSession {
    #[wasm_bindgen(constructor)]
    pub fn create(has_api_key: bool) -> Result<Self, JsValue> {
        Self::with_bundled_scaffolds(has_api_key).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = fromJson)]
    pub fn from_json(json: &str, has_api_key: bool) -> Result<Self, JsValue> {
        Self::resume(json, has_api_key).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = toJson)]
    pub fn to_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = state)]
    pub fn state_js(&self) -> Result<JsValue, JsValue> {
        to_js(&self.state)
    }

    #[wasm_bindgen(js_name = selectJumpType)]
    pub fn select_jump_type(&mut self, value: &str) -> Result<JsValue, JsValue> {
        let jump_type = parse_jump_type(value).map_err(to_js_error)?;
        to_js(self.apply_jump_type(jump_type))
    }

    #[wasm_bindgen(js_name = selectInputMode)]
    pub fn select_input_mode(&mut self, value: &str) -> Result<JsValue, JsValue> {
        let input_mode = parse_input_mode(value).map_err(to_js_error)?;
        to_js(self.apply_input_mode(input_mode))
    }

    #[wasm_bindgen(js_name = selectManualScaffold)]
    pub fn select_manual_scaffold(&mut self, value: &str) -> Result<JsValue, JsValue> {
        let scaffold = parse_scaffold(value).map_err(to_js_error)?;
        to_js(self.apply_scaffold(scaffold))
    }

    #[wasm_bindgen(js_name = setHasApiKey)]
    pub fn set_has_api_key(&mut self, has_api_key: bool) -> Result<JsValue, JsValue> {
        to_js(self.apply_has_api_key(has_api_key))
    }

    #[wasm_bindgen(js_name = setJumpsCount)]
    pub fn set_jumps_count(&mut self, jumps: f64) -> Result<JsValue, JsValue> {
        to_js(self.apply_jumps_count(jumps))
    }

    pub fn touch(&mut self, field_id: &str) -> Result<JsValue, JsValue> {
        to_js(self.apply_touch(field_id))
    }

    #[wasm_bindgen(js_name = setField)]
    pub fn set_field(&mut self, field_id: &str, value: f64) -> Result<JsValue, JsValue> {
        to_js(self.apply_field(field_id, value))
    }

    /// Whether pulled data may be shown as authoritative.
    #[wasm_bindgen(js_name = snapshotIsAuthoritative)]
    pub fn snapshot_is_authoritative(&self) -> bool {
        self.state.snapshot_is_authoritative()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gainz_core::Notice;

    #[test]
    fn bundled_session_starts_from_key_status() {
        let session = CalcSession::with_bundled_scaffolds(false).unwrap();
        assert_eq!(session.current().jump_type, JumpType::Manual);
        assert_eq!(session.current().input_mode, InputMode::Manual);
    }

    #[test]
    fn manual_scaffold_uses_bundled_defaults() {
        let mut session = CalcSession::with_bundled_scaffolds(false).unwrap();
        let state = session.apply_scaffold(ManualScaffold::Edvd);
        assert_eq!(state.fields.get("items.edvdCount"), Some(&5.0));
    }

    #[test]
    fn resume_reconciles_a_removed_key() {
        let mut session = CalcSession::with_bundled_scaffolds(true).unwrap();
        session.apply_jump_type(JumpType::Candy);
        assert_eq!(session.current().input_mode, InputMode::Auto);
        let json = serde_json::to_string(session.current()).unwrap();

        let resumed = CalcSession::resume(&json, false).unwrap();
        assert_eq!(resumed.current().input_mode, InputMode::Manual);
        assert_eq!(resumed.current().last_notice, Some(Notice::ApiKeyRemoved));
        assert!(CalcSession::resume("{}", true).is_err());
    }

    #[test]
    fn resume_repairs_an_invalid_stored_state() {
        let json = r#"{
            "jumpType": "edvd",
            "inputMode": "auto",
            "manualScaffold": "candy",
            "jumpsCount": 0,
            "hasApiKey": false,
            "snapshotAt": null,
            "lastNotice": null
        }"#;
        let resumed = CalcSession::resume(json, false).unwrap();
        let state = resumed.current();
        assert_eq!(state.input_mode, InputMode::Manual);
        assert!(!state.has_api_key);
        assert_eq!(state.jumps_count, 1);
        assert!(!resumed.snapshot_is_authoritative());
    }

    #[test]
    fn selector_values_parse_or_fail() {
        assert_eq!(parse_jump_type("99k").unwrap(), JumpType::NinetyNineK);
        assert_eq!(parse_input_mode("auto").unwrap(), InputMode::Auto);
        assert_eq!(parse_scaffold("candy").unwrap(), ManualScaffold::Candy);
        assert!(matches!(
            parse_scaffold("manual"),
            Err(SessionError::Scaffold(value)) if value == "manual"
        ));
        assert!(parse_jump_type("custom").is_err());
    }
}
