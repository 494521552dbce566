//! User consent records for optional telemetry.
//!
//! A record is replaced, never edited in place: every action returns a new
//! value so callers can persist the whole record atomically.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::policy::{POLICY_VERSION, PolicyVersion};

/// Tier of optional usage-data sharing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TelemetryLevel {
    #[default]
    None,
    Basic,
    Rich,
}

impl TelemetryLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Basic => "basic",
            Self::Rich => "rich",
        }
    }
}

impl fmt::Display for TelemetryLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TelemetryLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "none" => Ok(Self::None),
            "basic" => Ok(Self::Basic),
            "rich" => Ok(Self::Rich),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConsentError {
    #[error("the data policy must be viewed before telemetry can be enabled")]
    PolicyNotViewed,
}

/// The user's telemetry choice and policy acknowledgment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
    pub policy_version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub policy_viewed_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent_given_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub telemetry_level: TelemetryLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Default for ConsentRecord {
    fn default() -> Self {
        Self::new(POLICY_VERSION)
    }
}

impl ConsentRecord {
    /// Fresh record under `policy_version` with nothing granted.
    #[must_use]
    pub fn new(policy_version: impl Into<String>) -> Self {
        Self {
            policy_version: policy_version.into(),
            policy_viewed_at: None,
            consent_given_at: None,
            telemetry_level: TelemetryLevel::None,
            revoked_at: None,
        }
    }

    /// Consent was given and has not been revoked since.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.consent_given_at.is_some() && self.revoked_at.is_none()
    }

    /// Record that the policy text was shown. The first view wins.
    #[must_use]
    pub fn acknowledge_policy(&self, at: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        if next.policy_viewed_at.is_none() {
            next.policy_viewed_at = Some(at);
        }
        next
    }

    /// Opt in at `level`.
    ///
    /// A revoked record is not reopened; opting in again starts a new consent
    /// period with a fresh `consent_given_at`.
    ///
    /// # Errors
    ///
    /// Returns [`ConsentError::PolicyNotViewed`] if the policy was never shown.
    pub fn opt_in(&self, level: TelemetryLevel, at: DateTime<Utc>) -> Result<Self, ConsentError> {
        if self.policy_viewed_at.is_none() {
            return Err(ConsentError::PolicyNotViewed);
        }
        Ok(Self {
            policy_version: self.policy_version.clone(),
            policy_viewed_at: self.policy_viewed_at,
            consent_given_at: Some(at),
            telemetry_level: level,
            revoked_at: None,
        })
    }

    /// Revoke consent. The level and consent time are kept as history.
    #[must_use]
    pub fn revoke(&self, at: DateTime<Utc>) -> Self {
        let mut next = self.clone();
        if next.revoked_at.is_none() {
            next.revoked_at = Some(at);
        }
        next
    }

    /// Whether this record predates a material change to `current`.
    ///
    /// An unparsable stored version is treated as material.
    #[must_use]
    pub fn requires_renewal(&self, current: &PolicyVersion) -> bool {
        self.policy_version
            .parse::<PolicyVersion>()
            .map_or(true, |stored| current.is_material_change_from(&stored))
    }

    /// Start a new record under `current`, keeping only the level preference.
    #[must_use]
    pub fn supersede(&self, current: &PolicyVersion) -> Self {
        Self {
            telemetry_level: self.telemetry_level,
            ..Self::new(current.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 9, hour, 0, 0).unwrap()
    }

    #[test]
    fn fresh_record_is_inactive() {
        let record = ConsentRecord::default();
        assert_eq!(record.policy_version, POLICY_VERSION);
        assert_eq!(record.telemetry_level, TelemetryLevel::None);
        assert!(!record.is_active());
    }

    #[test]
    fn opt_in_requires_policy_view() {
        let record = ConsentRecord::default();
        assert_eq!(
            record.opt_in(TelemetryLevel::Basic, at(1)),
            Err(ConsentError::PolicyNotViewed)
        );

        let viewed = record.acknowledge_policy(at(1));
        let opted = viewed.opt_in(TelemetryLevel::Basic, at(2)).unwrap();
        assert!(opted.is_active());
        assert_eq!(opted.consent_given_at, Some(at(2)));
        assert_eq!(opted.policy_viewed_at, Some(at(1)));
    }

    #[test]
    fn acknowledge_keeps_first_view() {
        let record = ConsentRecord::default()
            .acknowledge_policy(at(1))
            .acknowledge_policy(at(5));
        assert_eq!(record.policy_viewed_at, Some(at(1)));
    }

    #[test]
    fn revoke_keeps_history() {
        let record = ConsentRecord::default()
            .acknowledge_policy(at(1))
            .opt_in(TelemetryLevel::Rich, at(2))
            .unwrap()
            .revoke(at(3))
            .revoke(at(4));
        assert!(!record.is_active());
        assert_eq!(record.telemetry_level, TelemetryLevel::Rich);
        assert_eq!(record.consent_given_at, Some(at(2)));
        assert_eq!(record.revoked_at, Some(at(3)));

        let renewed = record.opt_in(TelemetryLevel::Basic, at(6)).unwrap();
        assert!(renewed.is_active());
        assert_eq!(renewed.revoked_at, None);
    }

    #[test]
    fn renewal_follows_material_changes() {
        let record = ConsentRecord::new("1.0.0");
        assert!(!record.requires_renewal(&PolicyVersion::new(1, 0, 2)));
        assert!(record.requires_renewal(&PolicyVersion::new(1, 1, 0)));
        assert!(ConsentRecord::new("garbage").requires_renewal(&PolicyVersion::new(1, 0, 0)));
    }

    #[test]
    fn supersede_drops_timestamps() {
        let record = ConsentRecord::default()
            .acknowledge_policy(at(1))
            .opt_in(TelemetryLevel::Rich, at(2))
            .unwrap();
        let next = record.supersede(&PolicyVersion::new(2, 0, 0));
        assert_eq!(next.policy_version, "2.0.0");
        assert_eq!(next.telemetry_level, TelemetryLevel::Rich);
        assert!(next.policy_viewed_at.is_none());
        assert!(!next.is_active());
    }

    #[test]
    fn wire_format_uses_camel_case() {
        let record = ConsentRecord::default()
            .acknowledge_policy(at(1))
            .opt_in(TelemetryLevel::Basic, at(2))
            .unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["policyVersion"], "1.0.0");
        assert_eq!(value["telemetryLevel"], "basic");
        assert!(value.get("revokedAt").is_none());
        let back: ConsentRecord = serde_json::from_value(value).unwrap();
        assert_eq!(back, record);
    }
}
