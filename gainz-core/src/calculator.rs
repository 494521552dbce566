//! Jump calculator configuration state machine.
//!
//! Row 1 of the calculator picks the jump type. Row 2 is contextual: an input
//! mode selector (auto/manual) for recipe jump types, or a scaffold selector
//! when the jump type is manual. Every transition borrows the current
//! [`CalcState`] and returns a new one; none of them can fail. Requests that
//! cannot be honoured are downgraded to the nearest valid state and explained
//! through [`CalcState::last_notice`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::numbers::coerce_count;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum JumpType {
    #[serde(rename = "manual")]
    Manual,
    #[serde(rename = "candy")]
    Candy,
    #[serde(rename = "edvd")]
    Edvd,
    #[serde(rename = "99k")]
    NinetyNineK,
}

impl JumpType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::Candy => "candy",
            Self::Edvd => "edvd",
            Self::NinetyNineK => "99k",
        }
    }
}

impl fmt::Display for JumpType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JumpType {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "manual" => Ok(Self::Manual),
            "candy" => Ok(Self::Candy),
            "edvd" => Ok(Self::Edvd),
            "99k" => Ok(Self::NinetyNineK),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    Auto,
    Manual,
}

impl InputMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Manual => "manual",
        }
    }
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InputMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "auto" => Ok(Self::Auto),
            "manual" => Ok(Self::Manual),
            _ => Err(()),
        }
    }
}

/// Recipe a manual configuration was seeded from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ManualScaffold {
    #[serde(rename = "candy")]
    Candy,
    #[serde(rename = "edvd")]
    Edvd,
    #[serde(rename = "99k")]
    NinetyNineK,
}

impl ManualScaffold {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Candy => "candy",
            Self::Edvd => "edvd",
            Self::NinetyNineK => "99k",
        }
    }

    /// The scaffold matching a recipe jump type; `None` for manual.
    #[must_use]
    pub const fn from_jump_type(jump_type: JumpType) -> Option<Self> {
        match jump_type {
            JumpType::Manual => None,
            JumpType::Candy => Some(Self::Candy),
            JumpType::Edvd => Some(Self::Edvd),
            JumpType::NinetyNineK => Some(Self::NinetyNineK),
        }
    }
}

impl fmt::Display for ManualScaffold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ManualScaffold {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<JumpType>()
            .ok()
            .and_then(Self::from_jump_type)
            .ok_or(())
    }
}

/// Explanation of an automatic adjustment made by the last transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Notice {
    ApiKeyRemoved,
    AutoRequiresApiKey,
}

impl Notice {
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ApiKeyRemoved => "API key removed; switched to Manual mode.",
            Self::AutoRequiresApiKey => "Auto mode requires an API key.",
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl TryFrom<String> for Notice {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        [Self::ApiKeyRemoved, Self::AutoRequiresApiKey]
            .into_iter()
            .find(|notice| notice.message() == value)
            .ok_or_else(|| format!("unknown notice: {value}"))
    }
}

impl From<Notice> for String {
    fn from(value: Notice) -> Self {
        value.message().to_string()
    }
}

/// The estimation configuration the user is building.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CalcState {
    pub jump_type: JumpType,
    /// Used when `jump_type` is not manual.
    pub input_mode: InputMode,
    /// Used when `jump_type` is manual.
    pub manual_scaffold: ManualScaffold,
    pub jumps_count: u32,
    /// Supplied by the key storage collaborator.
    pub has_api_key: bool,
    /// Time of the last automated batch pull of stats, perks and prices.
    pub snapshot_at: Option<DateTime<Utc>>,
    /// Field ids the user edited. Scaffolds never overwrite these.
    #[serde(default)]
    pub touched: BTreeSet<String>,
    /// Manual input values keyed by stable field id, e.g. `user.maxHappy`.
    #[serde(default)]
    pub fields: BTreeMap<String, f64>,
    pub last_notice: Option<Notice>,
}

impl CalcState {
    #[must_use]
    pub fn initial(has_api_key: bool) -> Self {
        Self {
            jump_type: if has_api_key {
                JumpType::Candy
            } else {
                JumpType::Manual
            },
            input_mode: if has_api_key {
                InputMode::Auto
            } else {
                InputMode::Manual
            },
            manual_scaffold: ManualScaffold::Candy,
            jumps_count: 1,
            has_api_key,
            snapshot_at: None,
            touched: BTreeSet::new(),
            fields: BTreeMap::new(),
            last_notice: None,
        }
    }

    /// Whether downstream consumers may treat `snapshot_at` data as the source
    /// of truth instead of user-entered fields.
    #[must_use]
    pub const fn snapshot_is_authoritative(&self) -> bool {
        !matches!(self.jump_type, JumpType::Manual)
            && matches!(self.input_mode, InputMode::Auto)
            && self.snapshot_at.is_some()
    }

    /// Restore the state invariants on a value that did not come from a
    /// transition, such as a persisted state read back from storage.
    ///
    /// The jump count is coerced to at least 1, auto input without a key
    /// drops to manual, and a snapshot only survives on a recipe in auto mode.
    #[must_use]
    pub fn normalized(mut self) -> Self {
        self.jumps_count = self.jumps_count.max(1);
        if !self.has_api_key {
            self.input_mode = InputMode::Manual;
        }
        if self.jump_type == JumpType::Manual || self.input_mode == InputMode::Manual {
            self.snapshot_at = None;
        }
        self
    }

    #[must_use]
    pub fn is_touched(&self, field_id: &str) -> bool {
        self.touched.contains(field_id)
    }

    fn begin(&self) -> Self {
        let mut next = self.clone();
        next.last_notice = None;
        next
    }
}

/// Requests a batch pull of stats, perks and prices.
///
/// The pull itself is fire-and-forget; the returned instant is recorded as
/// the snapshot time.
pub trait AutoPull {
    fn request_snapshot(&self) -> DateTime<Utc>;
}

/// Stamps snapshot requests with the wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAutoPull;

impl AutoPull for SystemAutoPull {
    fn request_snapshot(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

impl<F> AutoPull for F
where
    F: Fn() -> DateTime<Utc>,
{
    fn request_snapshot(&self) -> DateTime<Utc> {
        self()
    }
}

/// Supplies default field values for a scaffold.
pub trait ScaffoldSource {
    fn defaults(&self, scaffold: ManualScaffold) -> Vec<(String, f64)>;
}

/// Data-driven scaffold defaults, keyed by scaffold then field id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ScaffoldTable {
    #[serde(default)]
    pub scaffolds: BTreeMap<ManualScaffold, BTreeMap<String, f64>>,
}

impl ScaffoldTable {
    /// Load scaffold defaults from JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON does not describe a scaffold table.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl ScaffoldSource for ScaffoldTable {
    fn defaults(&self, scaffold: ManualScaffold) -> Vec<(String, f64)> {
        self.scaffolds
            .get(&scaffold)
            .map(|fields| {
                fields
                    .iter()
                    .map(|(id, value)| (id.clone(), *value))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl<F> ScaffoldSource for F
where
    F: Fn(ManualScaffold) -> Vec<(String, f64)>,
{
    fn defaults(&self, scaffold: ManualScaffold) -> Vec<(String, f64)> {
        self(scaffold)
    }
}

/// Applies user actions to [`CalcState`] values.
#[derive(Debug, Clone, Default)]
pub struct Calculator<P = SystemAutoPull, S = ScaffoldTable> {
    auto_pull: P,
    scaffolds: S,
}

impl Calculator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl<P, S> Calculator<P, S>
where
    P: AutoPull,
    S: ScaffoldSource,
{
    pub const fn with_collaborators(auto_pull: P, scaffolds: S) -> Self {
        Self {
            auto_pull,
            scaffolds,
        }
    }

    #[must_use]
    pub fn initial_state(&self, has_api_key: bool) -> CalcState {
        CalcState::initial(has_api_key)
    }

    /// React to the API key appearing or disappearing.
    #[must_use]
    pub fn set_has_api_key(&self, state: &CalcState, has_api_key: bool) -> CalcState {
        let mut next = state.begin();
        let previous = next.has_api_key;
        next.has_api_key = has_api_key;

        if previous == has_api_key {
            return next;
        }

        // Manual jumps never use auto pulls.
        if next.jump_type == JumpType::Manual {
            if !has_api_key {
                next.input_mode = InputMode::Manual;
            }
            next.snapshot_at = None;
            return next;
        }

        if !has_api_key {
            if next.input_mode == InputMode::Auto {
                next.last_notice = Some(Notice::ApiKeyRemoved);
            }
            next.input_mode = InputMode::Manual;
            next.snapshot_at = None;
            return next;
        }

        next.input_mode = InputMode::Auto;
        self.refresh_snapshot(&mut next);
        next
    }

    /// Row 1: pick the jump calculation type.
    #[must_use]
    pub fn select_jump_type(&self, state: &CalcState, jump_type: JumpType) -> CalcState {
        let mut next = state.begin();
        next.jump_type = jump_type;

        if jump_type == JumpType::Manual {
            // Leaving a recipe seeds the manual scaffold with it.
            if let Some(prior) = ManualScaffold::from_jump_type(state.jump_type) {
                next.manual_scaffold = prior;
            }
            let scaffold = next.manual_scaffold;
            self.populate_scaffold(&mut next, scaffold);
            return next;
        }

        next.input_mode = if next.has_api_key {
            InputMode::Auto
        } else {
            InputMode::Manual
        };
        self.sync_snapshot(&mut next);
        next
    }

    /// Row 2 when the jump type is manual.
    #[must_use]
    pub fn select_manual_scaffold(&self, state: &CalcState, scaffold: ManualScaffold) -> CalcState {
        let mut next = state.begin();
        next.manual_scaffold = scaffold;
        self.populate_scaffold(&mut next, scaffold);
        next
    }

    /// Row 2 when the jump type is a recipe.
    #[must_use]
    pub fn select_input_mode(&self, state: &CalcState, input_mode: InputMode) -> CalcState {
        let mut next = state.begin();

        if input_mode == InputMode::Auto && !next.has_api_key {
            next.input_mode = InputMode::Manual;
            next.snapshot_at = None;
            next.last_notice = Some(Notice::AutoRequiresApiKey);
            return next;
        }

        next.input_mode = input_mode;
        self.sync_snapshot(&mut next);
        next
    }

    #[must_use]
    pub fn set_jumps_count(&self, state: &CalcState, jumps: f64) -> CalcState {
        let mut next = state.begin();
        next.jumps_count = coerce_count(jumps);
        next
    }

    /// Mark a field as user-owned so scaffolds leave it alone.
    #[must_use]
    pub fn touch(&self, state: &CalcState, field_id: &str) -> CalcState {
        let mut next = state.begin();
        next.touched.insert(field_id.to_string());
        next
    }

    /// Record a user edit. Non-finite values only mark the field as touched.
    #[must_use]
    pub fn set_field(&self, state: &CalcState, field_id: &str, value: f64) -> CalcState {
        let mut next = self.touch(state, field_id);
        if value.is_finite() {
            next.fields.insert(field_id.to_string(), value);
        }
        next
    }

    fn sync_snapshot(&self, state: &mut CalcState) {
        if state.input_mode == InputMode::Auto {
            self.refresh_snapshot(state);
        } else {
            state.snapshot_at = None;
        }
    }

    fn refresh_snapshot(&self, state: &mut CalcState) {
        let at = self.auto_pull.request_snapshot();
        log::debug!("snapshot refresh requested for {} at {at}", state.jump_type);
        state.snapshot_at = Some(at);
    }

    fn populate_scaffold(&self, state: &mut CalcState, scaffold: ManualScaffold) {
        for (field_id, value) in self.scaffolds.defaults(scaffold) {
            if state.touched.contains(&field_id) {
                log::trace!("scaffold {scaffold} skipped touched field {field_id}");
                continue;
            }
            state.fields.insert(field_id, value);
        }
        // Scaffolded values are user-owned; no pulled data backs them.
        state.snapshot_at = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::cell::RefCell;

    fn pulled_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap()
    }

    fn calculator() -> Calculator<fn() -> DateTime<Utc>, ScaffoldTable> {
        Calculator::with_collaborators(pulled_at as fn() -> DateTime<Utc>, ScaffoldTable::default())
    }

    fn recipe_state(has_api_key: bool, input_mode: InputMode) -> CalcState {
        CalcState {
            jump_type: JumpType::Candy,
            input_mode,
            has_api_key,
            snapshot_at: (input_mode == InputMode::Auto).then(pulled_at),
            ..CalcState::initial(has_api_key)
        }
    }

    #[test]
    fn initial_state_depends_on_key() {
        let with_key = CalcState::initial(true);
        assert_eq!(with_key.jump_type, JumpType::Candy);
        assert_eq!(with_key.input_mode, InputMode::Auto);
        assert_eq!(with_key.manual_scaffold, ManualScaffold::Candy);
        assert_eq!(with_key.jumps_count, 1);
        assert!(with_key.snapshot_at.is_none());
        assert!(with_key.touched.is_empty());
        assert!(with_key.last_notice.is_none());

        let without = CalcState::initial(false);
        assert_eq!(without.jump_type, JumpType::Manual);
        assert_eq!(without.input_mode, InputMode::Manual);
    }

    #[test]
    fn key_removed_while_manual_leaves_no_auto_mode() {
        let calc = calculator();
        let manual = calc.select_jump_type(&CalcState::initial(true), JumpType::Manual);
        assert_eq!(manual.input_mode, InputMode::Auto);

        let next = calc.set_has_api_key(&manual, false);
        assert_eq!(next.jump_type, JumpType::Manual);
        assert_eq!(next.input_mode, InputMode::Manual);
        assert!(!next.has_api_key);
        assert_eq!(next.snapshot_at, None);
        assert!(next.last_notice.is_none());
    }

    #[test]
    fn normalized_restores_invariants() {
        let state = CalcState {
            jump_type: JumpType::Edvd,
            input_mode: InputMode::Auto,
            jumps_count: 0,
            snapshot_at: Some(pulled_at()),
            ..CalcState::initial(false)
        }
        .normalized();
        assert_eq!(state.jumps_count, 1);
        assert_eq!(state.input_mode, InputMode::Manual);
        assert_eq!(state.snapshot_at, None);

        let valid = CalcState {
            snapshot_at: Some(pulled_at()),
            jumps_count: 4,
            ..CalcState::initial(true)
        };
        assert_eq!(valid.clone().normalized(), valid);
    }

    #[test]
    fn auto_without_key_is_downgraded() {
        let calc = calculator();
        for jump_type in [JumpType::Candy, JumpType::Edvd, JumpType::NinetyNineK] {
            let state = CalcState {
                jump_type,
                snapshot_at: Some(pulled_at()),
                ..CalcState::initial(false)
            };
            let next = calc.select_input_mode(&state, InputMode::Auto);
            assert_eq!(next.input_mode, InputMode::Manual);
            assert_eq!(next.snapshot_at, None);
            assert_eq!(
                next.last_notice.map(Notice::message),
                Some("Auto mode requires an API key.")
            );
        }
    }

    #[test]
    fn selecting_auto_with_key_refreshes_snapshot() {
        let calc = calculator();
        let state = recipe_state(true, InputMode::Manual);
        let next = calc.select_input_mode(&state, InputMode::Auto);
        assert_eq!(next.input_mode, InputMode::Auto);
        assert_eq!(next.snapshot_at, Some(pulled_at()));
        assert!(next.snapshot_is_authoritative());

        let back = calc.select_input_mode(&next, InputMode::Manual);
        assert_eq!(back.input_mode, InputMode::Manual);
        assert_eq!(back.snapshot_at, None);
        assert!(!back.snapshot_is_authoritative());
    }

    #[test]
    fn unchanged_key_is_a_no_op() {
        let calc = calculator();
        let state = recipe_state(true, InputMode::Auto);
        let next = calc.set_has_api_key(&state, true);
        assert_eq!(next.input_mode, state.input_mode);
        assert_eq!(next.snapshot_at, state.snapshot_at);
        assert_eq!(next, state);
    }

    #[test]
    fn unchanged_key_still_clears_notice() {
        let calc = calculator();
        let state = CalcState {
            last_notice: Some(Notice::AutoRequiresApiKey),
            ..CalcState::initial(false)
        };
        let next = calc.set_has_api_key(&state, false);
        assert!(next.last_notice.is_none());
    }

    #[test]
    fn key_appearing_in_manual_jump_keeps_manual() {
        let calc = calculator();
        let state = CalcState::initial(false);
        let next = calc.set_has_api_key(&state, true);
        assert_eq!(next.jump_type, JumpType::Manual);
        assert!(next.has_api_key);
        assert!(next.snapshot_at.is_none());
        assert!(next.last_notice.is_none());
    }

    #[test]
    fn key_removed_in_auto_switches_to_manual() {
        let calc = calculator();
        let state = recipe_state(true, InputMode::Auto);
        let next = calc.set_has_api_key(&state, false);
        assert_eq!(next.input_mode, InputMode::Manual);
        assert_eq!(next.snapshot_at, None);
        assert_eq!(
            next.last_notice.map(Notice::message),
            Some("API key removed; switched to Manual mode.")
        );
    }

    #[test]
    fn key_removed_in_manual_input_has_no_notice() {
        let calc = calculator();
        let state = recipe_state(true, InputMode::Manual);
        let next = calc.set_has_api_key(&state, false);
        assert_eq!(next.input_mode, InputMode::Manual);
        assert!(next.last_notice.is_none());
    }

    #[test]
    fn key_appearing_on_recipe_snaps_to_auto() {
        let calc = calculator();
        let state = recipe_state(false, InputMode::Manual);
        let next = calc.set_has_api_key(&state, true);
        assert_eq!(next.input_mode, InputMode::Auto);
        assert_eq!(next.snapshot_at, Some(pulled_at()));
    }

    #[test]
    fn going_manual_mirrors_prior_recipe() {
        let calc = calculator();
        let state = CalcState {
            jump_type: JumpType::Edvd,
            ..CalcState::initial(true)
        };
        let manual = calc.select_jump_type(&state, JumpType::Manual);
        assert_eq!(manual.jump_type, JumpType::Manual);
        assert_eq!(manual.manual_scaffold, ManualScaffold::Edvd);
        assert!(manual.snapshot_at.is_none());

        let restored = calc.select_jump_type(&manual, JumpType::Edvd);
        assert_eq!(restored.jump_type, JumpType::Edvd);
        assert_eq!(restored.input_mode, InputMode::Auto);
        assert_eq!(restored.snapshot_at, Some(pulled_at()));
    }

    #[test]
    fn manual_to_manual_keeps_scaffold() {
        let calc = calculator();
        let state = CalcState {
            manual_scaffold: ManualScaffold::NinetyNineK,
            ..CalcState::initial(false)
        };
        let next = calc.select_jump_type(&state, JumpType::Manual);
        assert_eq!(next.manual_scaffold, ManualScaffold::NinetyNineK);
    }

    #[test]
    fn recipe_without_key_defaults_to_manual_input() {
        let calc = calculator();
        let state = CalcState::initial(false);
        let next = calc.select_jump_type(&state, JumpType::NinetyNineK);
        assert_eq!(next.input_mode, InputMode::Manual);
        assert!(next.snapshot_at.is_none());
        assert!(next.last_notice.is_none());
    }

    #[test]
    fn jumps_count_is_clamped() {
        let calc = calculator();
        let state = CalcState::initial(false);
        for input in [0.0, -5.0, f64::NAN, 0.9] {
            assert_eq!(calc.set_jumps_count(&state, input).jumps_count, 1, "{input}");
        }
        assert_eq!(calc.set_jumps_count(&state, 3.7).jumps_count, 3);
    }

    #[test]
    fn touch_is_idempotent_and_additive() {
        let calc = calculator();
        let state = CalcState::initial(false);
        let once = calc.touch(&state, "user.maxHappy");
        let twice = calc.touch(&once, "user.maxHappy");
        let other = calc.touch(&twice, "items.edvd.count");
        assert_eq!(twice.touched, once.touched);
        assert_eq!(other.touched.len(), 2);
        assert!(state.touched.is_empty());
    }

    #[test]
    fn scaffold_population_skips_touched_fields() {
        let writes = RefCell::new(Vec::new());
        let source = |scaffold: ManualScaffold| {
            writes.borrow_mut().push(scaffold);
            vec![
                ("user.maxHappy".to_string(), 99_999.0),
                ("items.edvd.count".to_string(), 5.0),
            ]
        };
        let calc = Calculator::with_collaborators(pulled_at, source);

        let state = calc.set_field(&CalcState::initial(false), "user.maxHappy", 4_000.0);
        let next = calc.select_manual_scaffold(&state, ManualScaffold::Edvd);

        assert_eq!(writes.borrow().as_slice(), &[ManualScaffold::Edvd]);
        assert!(next.is_touched("user.maxHappy"));
        assert_eq!(next.fields.get("user.maxHappy"), Some(&4_000.0));
        assert_eq!(next.fields.get("items.edvd.count"), Some(&5.0));
        assert_eq!(next.manual_scaffold, ManualScaffold::Edvd);
    }

    #[test]
    fn set_field_ignores_non_finite_values() {
        let calc = calculator();
        let next = calc.set_field(&CalcState::initial(false), "user.energy", f64::NAN);
        assert!(next.is_touched("user.energy"));
        assert!(!next.fields.contains_key("user.energy"));
    }

    #[test]
    fn scaffold_table_loads_from_json() {
        let table = ScaffoldTable::from_json(
            r#"{ "scaffolds": { "99k": { "user.targetHappy": 99999 }, "candy": {} } }"#,
        )
        .unwrap();
        assert_eq!(
            table.defaults(ManualScaffold::NinetyNineK),
            vec![("user.targetHappy".to_string(), 99_999.0)]
        );
        assert!(table.defaults(ManualScaffold::Candy).is_empty());
        assert!(table.defaults(ManualScaffold::Edvd).is_empty());
    }

    #[test]
    fn state_round_trips_through_json() {
        let calc = calculator();
        let state = calc.touch(&CalcState::initial(false), "user.maxHappy");
        let state = calc.select_input_mode(&state, InputMode::Auto);
        let json = serde_json::to_value(&state).unwrap();
        assert_eq!(json["jumpType"], "manual");
        assert_eq!(json["lastNotice"], "Auto mode requires an API key.");
        assert_eq!(json["touched"], serde_json::json!(["user.maxHappy"]));
        let back: CalcState = serde_json::from_value(json).unwrap();
        assert_eq!(back, state);
    }

    #[test]
    fn parses_selector_values() {
        assert_eq!("99k".parse::<JumpType>(), Ok(JumpType::NinetyNineK));
        assert_eq!("edvd".parse::<ManualScaffold>(), Ok(ManualScaffold::Edvd));
        assert!("manual".parse::<ManualScaffold>().is_err());
        assert_eq!("auto".parse::<InputMode>(), Ok(InputMode::Auto));
        assert!("sideways".parse::<InputMode>().is_err());
    }
}
