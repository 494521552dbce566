//! Torn Gainz Core
//!
//! Platform-agnostic logic for the Torn Gainz companion tool: the consent
//! record, capability derivation, the telemetry gate and schema, and the jump
//! calculator's configuration state machine. This crate has no browser or
//! network dependencies; platforms plug in through the traits below.

pub mod calculator;
pub mod capabilities;
pub mod consent;
pub mod numbers;
pub mod policy;
pub mod telemetry;
pub mod theme;
pub mod ui_consent;

use chrono::{DateTime, Utc};
use thiserror::Error;

// Re-export commonly used types
pub use calculator::{
    AutoPull, CalcState, Calculator, InputMode, JumpType, ManualScaffold, Notice, ScaffoldSource,
    ScaffoldTable, SystemAutoPull,
};
pub use capabilities::{Capabilities, capabilities_from_consent};
pub use consent::{ConsentError, ConsentRecord, TelemetryLevel};
pub use policy::{POLICY_VALID_AS_OF, POLICY_VERSION, PolicyVersion, PolicyVersionError};
pub use telemetry::{
    GateDecision, SchemaError, TelemetryEvent, TelemetryKind, TelemetryTransport, send_telemetry,
    validate_basic_telemetry, validate_telemetry,
};
pub use theme::{SubscriptionId, THEME_STORAGE_KEY, Theme, ThemePreferences, ThemeStore};
pub use ui_consent::{UiConsentState, consent_level_label, ui_consent_state};

/// Persists the single consent record of this device.
/// Platform-specific implementations should provide this
pub trait ConsentStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load the stored record, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read.
    fn load_consent(&self) -> Result<Option<ConsentRecord>, Self::Error>;

    /// Replace the stored record.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn save_consent(&self, record: &ConsentRecord) -> Result<(), Self::Error>;
}

/// Owner of the user's Torn API key.
pub trait KeyVault {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether a key is available on this device.
    fn has_local_key(&self) -> bool;

    /// Keep a copy of the key off-device.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote store rejects the key.
    fn store_remote(&self, api_key: &str) -> Result<(), Self::Error>;

    /// Delete any off-device copy. Deleting a missing key succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the remote store cannot be reached.
    fn delete_remote(&self) -> Result<(), Self::Error>;
}

#[derive(Debug, Error)]
pub enum EngineError<S, V>
where
    S: std::error::Error + 'static,
    V: std::error::Error + 'static,
{
    #[error("consent storage failed: {0}")]
    Storage(#[source] S),
    #[error("key vault failed: {0}")]
    Vault(#[source] V),
    #[error(transparent)]
    Consent(#[from] ConsentError),
    #[error("storing the API key off-device requires rich telemetry consent")]
    RemoteKeyStorageNotPermitted,
}

type EngineResult<T, S, V> =
    Result<T, EngineError<<S as ConsentStorage>::Error, <V as KeyVault>::Error>>;

/// Ties consent, key storage and telemetry delivery together for one device.
pub struct CompanionEngine<S, V, T>
where
    S: ConsentStorage,
    V: KeyVault,
    T: TelemetryTransport,
{
    storage: S,
    vault: V,
    transport: T,
    policy: PolicyVersion,
}

impl<S, V, T> CompanionEngine<S, V, T>
where
    S: ConsentStorage,
    V: KeyVault,
    T: TelemetryTransport,
{
    /// Create an engine bound to the current policy version.
    pub fn new(storage: S, vault: V, transport: T) -> Self {
        Self::with_policy(storage, vault, transport, PolicyVersion::current())
    }

    pub const fn with_policy(storage: S, vault: V, transport: T, policy: PolicyVersion) -> Self {
        Self {
            storage,
            vault,
            transport,
            policy,
        }
    }

    #[must_use]
    pub const fn policy(&self) -> &PolicyVersion {
        &self.policy
    }

    /// The record in force.
    ///
    /// A record accepted under a materially different policy is replaced by a
    /// fresh one, so the user has to view the policy and opt in again.
    ///
    /// # Errors
    ///
    /// Returns an error if the storage cannot be read or the replacement
    /// cannot be written.
    pub fn consent(&self) -> EngineResult<ConsentRecord, S, V> {
        let Some(stored) = self.storage.load_consent().map_err(EngineError::Storage)? else {
            return Ok(ConsentRecord::new(self.policy.to_string()));
        };
        if !stored.requires_renewal(&self.policy) {
            return Ok(stored);
        }
        log::info!(
            "policy changed from {} to {}; consent must be renewed",
            stored.policy_version,
            self.policy
        );
        let renewed = stored.supersede(&self.policy);
        self.persist(&renewed)?;
        Ok(renewed)
    }

    /// Capabilities of the record in force.
    ///
    /// # Errors
    ///
    /// Returns an error if the consent record cannot be loaded.
    pub fn capabilities(&self) -> EngineResult<Capabilities, S, V> {
        Ok(Capabilities::from_consent(&self.consent()?))
    }

    /// Consent section of the settings screen.
    ///
    /// # Errors
    ///
    /// Returns an error if the consent record cannot be loaded.
    pub fn ui_consent_state(&self) -> EngineResult<UiConsentState, S, V> {
        Ok(ui_consent_state(&self.consent()?, self.vault.has_local_key()))
    }

    /// # Errors
    ///
    /// Returns an error if the record cannot be loaded or saved.
    pub fn acknowledge_policy(&self, at: DateTime<Utc>) -> EngineResult<ConsentRecord, S, V> {
        let next = self.consent()?.acknowledge_policy(at);
        self.persist(&next)?;
        Ok(next)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::Consent`] if the policy was never viewed, or a
    /// storage error if the record cannot be loaded or saved.
    pub fn opt_in(
        &self,
        level: TelemetryLevel,
        at: DateTime<Utc>,
    ) -> EngineResult<ConsentRecord, S, V> {
        let next = self.consent()?.opt_in(level, at)?;
        self.persist(&next)?;
        log::info!("telemetry consent granted at level {level}");
        Ok(next)
    }

    /// Revoke consent and delete any API key stored off-device.
    ///
    /// The revocation is saved before the vault is asked to delete the key.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the revocation cannot be saved, or a vault
    /// error if the remote key cannot be deleted.
    pub fn revoke(&self, at: DateTime<Utc>) -> EngineResult<ConsentRecord, S, V> {
        let next = self.consent()?.revoke(at);
        self.persist(&next)?;
        self.vault.delete_remote().map_err(EngineError::Vault)?;
        log::info!("telemetry consent revoked");
        Ok(next)
    }

    /// # Errors
    ///
    /// Returns [`EngineError::RemoteKeyStorageNotPermitted`] without active
    /// rich consent, or a vault error if the key is rejected.
    pub fn store_api_key_remotely(&self, api_key: &str) -> EngineResult<(), S, V> {
        if !self.capabilities()?.can_store_api_key_remotely {
            return Err(EngineError::RemoteKeyStorageNotPermitted);
        }
        self.vault.store_remote(api_key).map_err(EngineError::Vault)
    }

    /// Offer an event to the telemetry gate.
    ///
    /// # Errors
    ///
    /// Returns an error only if the consent record cannot be loaded; gate
    /// drops and transport failures are not errors.
    pub fn send_telemetry(&self, event: &TelemetryEvent) -> EngineResult<GateDecision, S, V> {
        let consent = self.consent()?;
        Ok(send_telemetry(&consent, event, &self.transport))
    }

    /// Calculator state for a fresh page, seeded from the vault.
    #[must_use]
    pub fn initial_calc_state<P, Sc>(&self, calculator: &Calculator<P, Sc>) -> CalcState
    where
        P: AutoPull,
        Sc: ScaffoldSource,
    {
        calculator.initial_state(self.vault.has_local_key())
    }

    fn persist(&self, record: &ConsentRecord) -> EngineResult<(), S, V> {
        self.storage
            .save_consent(record)
            .map_err(EngineError::Storage)
    }
}
