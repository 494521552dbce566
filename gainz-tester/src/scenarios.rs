//! Catalog of logic scenarios run against `gainz-core`.
//!
//! Each scenario is a plain function over the shared assets that returns an
//! error describing the first broken expectation.

use anyhow::{Result, ensure};
use chrono::{DateTime, TimeZone, Utc};
use gainz_core::telemetry::{
    APP_VERSION, Adherence, BasicTelemetryEvent, Buckets, EnergyBudget, EventJumpType, EventMode,
    GainSample, GymTier, HappyTarget, Prediction, RichTuningEvent, RoundedMetrics, StatBand,
};
use gainz_core::{
    CalcState, Calculator, Capabilities, CompanionEngine, ConsentRecord, ConsentStorage,
    GateDecision, InputMode, JumpType, KeyVault, ManualScaffold, Notice, PolicyVersion,
    ScaffoldTable, TelemetryEvent, TelemetryLevel, TelemetryTransport, Theme, ThemePreferences,
    ThemeStore, send_telemetry, validate_basic_telemetry,
};
use std::cell::{Cell, RefCell};
use std::convert::Infallible;
use std::rc::Rc;

use crate::assets::TesterAssets;

pub type ScenarioCheck = fn(&TesterAssets) -> Result<()>;

#[derive(Debug, Clone, Copy)]
pub struct TestScenario {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub check: ScenarioCheck,
}

impl TestScenario {
    /// Run the check once.
    ///
    /// # Errors
    ///
    /// Returns the first expectation the scenario found broken.
    pub fn run(&self, assets: &TesterAssets) -> Result<()> {
        (self.check)(assets)
    }
}

pub fn catalog() -> Vec<TestScenario> {
    vec![
        TestScenario {
            key: "revoked-consent",
            name: "Revoked Consent Grants Nothing",
            description: "revocation clears every capability",
            check: revoked_consent,
        },
        TestScenario {
            key: "consent-tiers",
            name: "Consent Tier Capabilities",
            description: "basic and rich consent unlock the expected capabilities",
            check: consent_tiers,
        },
        TestScenario {
            key: "auto-without-key",
            name: "Auto Mode Without API Key",
            description: "auto request without a key downgrades to manual with a notice",
            check: auto_without_key,
        },
        TestScenario {
            key: "key-removed",
            name: "API Key Removed In Auto Mode",
            description: "losing the key forces manual input and clears the snapshot",
            check: key_removed,
        },
        TestScenario {
            key: "key-unchanged",
            name: "Unchanged Key Is A No-op",
            description: "re-reporting the same key status keeps mode and snapshot",
            check: key_unchanged,
        },
        TestScenario {
            key: "recipe-to-manual",
            name: "Recipe To Manual Scaffold",
            description: "switching to manual mirrors the recipe and keeps touched fields",
            check: recipe_to_manual,
        },
        TestScenario {
            key: "jumps-count",
            name: "Jumps Count Coercion",
            description: "jump counts are truncated and floored at one",
            check: jumps_count,
        },
        TestScenario {
            key: "gate-basic-only",
            name: "Gate Blocks Rich Under Basic Consent",
            description: "rich tuning events never reach the transport with basic consent",
            check: gate_basic_only,
        },
        TestScenario {
            key: "schema-strict",
            name: "Strict Telemetry Schema",
            description: "identifier fields and out-of-range buckets are rejected",
            check: schema_strict,
        },
        TestScenario {
            key: "bucketing",
            name: "Bucketing And Rounding",
            description: "precise figures never appear in outgoing events",
            check: bucketing,
        },
        TestScenario {
            key: "policy-renewal",
            name: "Policy Renewal",
            description: "material policy bumps require fresh consent, patches do not",
            check: policy_renewal,
        },
        TestScenario {
            key: "engine-revocation",
            name: "Revocation Deletes Remote Key",
            description: "revoking through the engine deletes the off-device key",
            check: engine_revocation,
        },
        TestScenario {
            key: "theme-store",
            name: "Theme Store Contract",
            description: "saved preference wins and system changes stop after a choice",
            check: theme_store,
        },
    ]
}

pub fn find_scenario(key: &str) -> Option<TestScenario> {
    catalog().into_iter().find(|scenario| scenario.key == key)
}

pub fn list_scenarios() -> Vec<(&'static str, &'static str)> {
    catalog()
        .into_iter()
        .map(|scenario| (scenario.key, scenario.description))
        .collect()
}

fn at(minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, 12, minute, 0)
        .single()
        .unwrap_or_default()
}

fn snapshot_time() -> DateTime<Utc> {
    at(30)
}

fn calculator(assets: &TesterAssets) -> Calculator<fn() -> DateTime<Utc>, ScaffoldTable> {
    Calculator::with_collaborators(
        snapshot_time as fn() -> DateTime<Utc>,
        assets.scaffolds.clone(),
    )
}

fn consent(level: TelemetryLevel) -> Result<ConsentRecord> {
    Ok(ConsentRecord::default()
        .acknowledge_policy(at(0))
        .opt_in(level, at(1))?)
}

fn revoked_consent(_assets: &TesterAssets) -> Result<()> {
    for level in [
        TelemetryLevel::None,
        TelemetryLevel::Basic,
        TelemetryLevel::Rich,
    ] {
        let record = consent(level)?.revoke(at(2));
        ensure!(
            Capabilities::from_consent(&record) == Capabilities::default(),
            "revoked {level} record still grants capabilities"
        );
    }
    Ok(())
}

fn consent_tiers(_assets: &TesterAssets) -> Result<()> {
    let rich = Capabilities::from_consent(&consent(TelemetryLevel::Rich)?);
    ensure!(
        rich.can_send_basic_telemetry && rich.can_send_rich_telemetry,
        "rich consent must allow both event kinds"
    );
    ensure!(
        rich.can_store_api_key_remotely,
        "rich consent must allow remote key storage"
    );

    let basic = Capabilities::from_consent(&consent(TelemetryLevel::Basic)?);
    ensure!(basic.can_send_basic_telemetry, "basic consent must allow basic events");
    ensure!(
        !basic.can_send_rich_telemetry && !basic.can_store_api_key_remotely,
        "basic consent must not unlock rich capabilities"
    );

    let never_opted = Capabilities::from_consent(&ConsentRecord::default().acknowledge_policy(at(0)));
    ensure!(
        never_opted == Capabilities::default(),
        "viewing the policy alone must not grant anything"
    );
    Ok(())
}

fn auto_without_key(assets: &TesterAssets) -> Result<()> {
    let calc = calculator(assets);
    let state = CalcState {
        jump_type: JumpType::Candy,
        input_mode: InputMode::Manual,
        ..calc.initial_state(false)
    };
    let next = calc.select_input_mode(&state, InputMode::Auto);
    ensure!(next.input_mode == InputMode::Manual, "input mode should stay manual");
    ensure!(next.snapshot_at.is_none(), "no snapshot without a key");
    ensure!(
        next.last_notice == Some(Notice::AutoRequiresApiKey),
        "expected the auto-requires-key notice, got {:?}",
        next.last_notice
    );
    Ok(())
}

fn key_removed(assets: &TesterAssets) -> Result<()> {
    let calc = calculator(assets);
    let state = calc.select_jump_type(&calc.initial_state(true), JumpType::Edvd);
    ensure!(
        state.input_mode == InputMode::Auto && state.snapshot_at == Some(snapshot_time()),
        "recipe with a key should start in auto with a snapshot"
    );
    let next = calc.set_has_api_key(&state, false);
    ensure!(next.input_mode == InputMode::Manual, "input mode should drop to manual");
    ensure!(next.snapshot_at.is_none(), "snapshot should be cleared");
    ensure!(
        next.last_notice == Some(Notice::ApiKeyRemoved),
        "expected the key-removed notice, got {:?}",
        next.last_notice
    );
    Ok(())
}

fn key_unchanged(assets: &TesterAssets) -> Result<()> {
    let calc = calculator(assets);
    let state = calc.select_jump_type(&calc.initial_state(true), JumpType::Candy);
    let next = calc.set_has_api_key(&state, true);
    ensure!(next.input_mode == state.input_mode, "input mode changed");
    ensure!(next.snapshot_at == state.snapshot_at, "snapshot changed");
    ensure!(next.last_notice.is_none(), "notice should be cleared");
    Ok(())
}

fn recipe_to_manual(assets: &TesterAssets) -> Result<()> {
    let calc = calculator(assets);
    let state = calc.select_jump_type(&calc.initial_state(true), JumpType::NinetyNineK);
    let state = calc.set_field(&state, "config.targetHappy", 80_000.0);
    let manual = calc.select_jump_type(&state, JumpType::Manual);

    ensure!(manual.jump_type == JumpType::Manual, "jump type should be manual");
    ensure!(
        manual.manual_scaffold == ManualScaffold::NinetyNineK,
        "scaffold should mirror the prior recipe, got {}",
        manual.manual_scaffold
    );
    ensure!(
        !manual.snapshot_is_authoritative(),
        "snapshot must not be authoritative in manual"
    );
    ensure!(
        manual.fields.get("config.targetHappy") == Some(&80_000.0),
        "touched field was overwritten"
    );
    Ok(())
}

fn jumps_count(assets: &TesterAssets) -> Result<()> {
    let calc = calculator(assets);
    let state = calc.initial_state(false);
    for (input, expected) in [
        (0.0, 1),
        (-5.0, 1),
        (f64::NAN, 1),
        (0.9, 1),
        (3.7, 3),
    ] {
        let got = calc.set_jumps_count(&state, input).jumps_count;
        ensure!(got == expected, "jumps {input} gave {got}, expected {expected}");
    }
    Ok(())
}

#[derive(Default)]
struct CountingTransport {
    calls: Cell<usize>,
}

impl TelemetryTransport for CountingTransport {
    type Error = Infallible;

    fn submit(&self, _payload: String) -> Result<(), Self::Error> {
        self.calls.set(self.calls.get() + 1);
        Ok(())
    }
}

fn sample_buckets() -> Buckets {
    Buckets::from_context(150_000_000.0, GymTier::Premium, 60_000.0, 320.0)
}

fn sample_rich_event() -> TelemetryEvent {
    RichTuningEvent::new(
        APP_VERSION,
        at(5),
        EventJumpType::Edvd,
        sample_buckets(),
        GainSample::rounded(100_000.0, 50.0),
        GainSample::rounded(95_000.0, 47.5),
        Adherence::Exact,
        None,
    )
    .into()
}

fn gate_basic_only(_assets: &TesterAssets) -> Result<()> {
    let transport = CountingTransport::default();
    let record = consent(TelemetryLevel::Basic)?;
    let decision = send_telemetry(&record, &sample_rich_event(), &transport);
    ensure!(
        !decision.was_submitted(),
        "rich event passed the gate: {decision:?}"
    );
    ensure!(transport.calls.get() == 0, "transport was called");
    Ok(())
}

fn schema_strict(_assets: &TesterAssets) -> Result<()> {
    let event = BasicTelemetryEvent::new(
        APP_VERSION,
        at(5),
        EventMode::Manual,
        EventJumpType::Custom,
        sample_buckets(),
        RoundedMetrics::from_prediction(&Prediction::default()),
    );
    let valid = serde_json::to_value(TelemetryEvent::from(event))?;
    ensure!(
        validate_basic_telemetry(&valid.to_string()).is_ok(),
        "well-formed event rejected"
    );

    for field in ["apiKey", "tornUserId", "username", "factionName", "ipAddress", "deviceId"] {
        let mut tampered = valid.clone();
        tampered[field] = serde_json::Value::from("x");
        ensure!(
            validate_basic_telemetry(&tampered.to_string()).is_err(),
            "payload with {field} accepted"
        );
    }

    let mut exact = valid;
    exact["buckets"]["statBand"] = serde_json::Value::from("153421987");
    ensure!(
        validate_basic_telemetry(&exact.to_string()).is_err(),
        "unbucketed stat total accepted"
    );
    Ok(())
}

fn bucketing(_assets: &TesterAssets) -> Result<()> {
    let buckets = Buckets::from_context(999_999_999.0, GymTier::Specialist, 100_000.0, 199.0);
    ensure!(buckets.stat_band == StatBand::UpTo1B, "stat band edge");
    ensure!(buckets.happy_target == HappyTarget::Over100K, "happy edge");
    ensure!(buckets.energy_budget == EnergyBudget::UpTo199, "energy edge");

    let rounded = RoundedMetrics::from_prediction(&Prediction {
        gain_total: 7_654_321.0,
        gain_per_energy: 2_345.678,
        gain_per_dollar: 0.001_234_5,
        cost_per_happy: 4_321.0,
        cost_per_energy: 98_765.0,
    });
    ensure!(
        (rounded.cost_per_happy() - 4_300.0).abs() < 1e-9,
        "cost per happy {}",
        rounded.cost_per_happy()
    );
    ensure!(
        (rounded.cost_per_energy() - 98_800.0).abs() < 1e-9,
        "cost per energy {}",
        rounded.cost_per_energy()
    );
    ensure!(
        (rounded.predicted_gain_per_energy() - 2_350.0).abs() < 1e-9,
        "gain per energy {}",
        rounded.predicted_gain_per_energy()
    );
    Ok(())
}

fn policy_renewal(_assets: &TesterAssets) -> Result<()> {
    let record = consent(TelemetryLevel::Rich)?;
    ensure!(
        !record.requires_renewal(&PolicyVersion::new(1, 0, 9)),
        "patch bump should not require renewal"
    );
    ensure!(
        record.requires_renewal(&PolicyVersion::new(1, 1, 0)),
        "minor bump should require renewal"
    );
    let renewed = record.supersede(&PolicyVersion::new(2, 0, 0));
    ensure!(!renewed.is_active(), "superseded record must not be active");
    ensure!(
        Capabilities::from_consent(&renewed) == Capabilities::default(),
        "superseded record must not grant capabilities"
    );
    Ok(())
}

#[derive(Clone, Default)]
struct MemoryStorage {
    record: Rc<RefCell<Option<ConsentRecord>>>,
}

impl ConsentStorage for MemoryStorage {
    type Error = Infallible;

    fn load_consent(&self) -> Result<Option<ConsentRecord>, Self::Error> {
        Ok(self.record.borrow().clone())
    }

    fn save_consent(&self, record: &ConsentRecord) -> Result<(), Self::Error> {
        *self.record.borrow_mut() = Some(record.clone());
        Ok(())
    }
}

#[derive(Clone, Default)]
struct MemoryVault {
    remote: Rc<RefCell<Option<String>>>,
}

impl KeyVault for MemoryVault {
    type Error = Infallible;

    fn has_local_key(&self) -> bool {
        true
    }

    fn store_remote(&self, api_key: &str) -> Result<(), Self::Error> {
        *self.remote.borrow_mut() = Some(api_key.to_string());
        Ok(())
    }

    fn delete_remote(&self) -> Result<(), Self::Error> {
        self.remote.borrow_mut().take();
        Ok(())
    }
}

fn engine_revocation(_assets: &TesterAssets) -> Result<()> {
    let vault = MemoryVault::default();
    let engine = CompanionEngine::new(
        MemoryStorage::default(),
        vault.clone(),
        CountingTransport::default(),
    );
    ensure!(
        engine.store_api_key_remotely("key").is_err(),
        "remote key storage allowed without consent"
    );
    engine.acknowledge_policy(at(0))?;
    engine.opt_in(TelemetryLevel::Rich, at(1))?;
    engine.store_api_key_remotely("key")?;
    ensure!(vault.remote.borrow().is_some(), "key was not stored");

    engine.revoke(at(2))?;
    ensure!(vault.remote.borrow().is_none(), "remote key survived revocation");
    let decision = engine.send_telemetry(&sample_rich_event())?;
    ensure!(
        matches!(decision, GateDecision::Dropped(_)),
        "telemetry sent after revocation"
    );
    Ok(())
}

#[derive(Clone, Default)]
struct MemoryPrefs {
    saved: Rc<Cell<Option<Theme>>>,
}

impl ThemePreferences for MemoryPrefs {
    fn load(&self) -> Option<Theme> {
        self.saved.get()
    }

    fn save(&self, theme: Theme) {
        self.saved.set(Some(theme));
    }
}

fn theme_store(_assets: &TesterAssets) -> Result<()> {
    let prefs = MemoryPrefs::default();
    let mut store = ThemeStore::init(prefs.clone(), Theme::Light);
    ensure!(store.current() == Theme::Light, "system theme not used");

    let seen = Rc::new(Cell::new(0_u32));
    let counter = Rc::clone(&seen);
    store.subscribe(move |_| counter.set(counter.get() + 1));
    store.on_system_change(Theme::Dark);
    ensure!(store.current() == Theme::Dark, "system change not followed");

    store.set(Theme::Light);
    store.on_system_change(Theme::Dark);
    ensure!(store.current() == Theme::Light, "explicit choice overridden");
    ensure!(prefs.load() == Some(Theme::Light), "choice not persisted");
    ensure!(seen.get() == 3, "expected 3 notifications, got {}", seen.get());

    let reloaded = ThemeStore::init(prefs, Theme::Dark);
    ensure!(reloaded.current() == Theme::Light, "saved preference ignored");
    Ok(())
}
