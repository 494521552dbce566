//! Data retention and telemetry policy versioning.
//!
//! The policy text itself is rendered by the front-end; the core only needs to
//! know which version is current and whether a change between two versions is
//! material enough to require renewed consent.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Version of the policy shipped with this build.
pub const POLICY_VERSION: &str = "1.0.0";

/// Human-readable date the current policy took effect.
pub const POLICY_VALID_AS_OF: &str = "February 9th, 2026";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyVersionError {
    #[error("policy version '{0}' must have the form MAJOR.MINOR.PATCH")]
    Shape(String),
    #[error("policy version component '{component}' in '{version}' is not a number")]
    Component { version: String, component: String },
}

/// Semantic version of a policy document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PolicyVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

impl PolicyVersion {
    #[must_use]
    pub const fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Version of the policy compiled into this build.
    #[must_use]
    pub fn current() -> Self {
        POLICY_VERSION.parse().unwrap_or(Self::new(1, 0, 0))
    }

    /// Major or minor bumps expand collection or usage and need fresh consent.
    /// Patch bumps are clarifications only.
    #[must_use]
    pub const fn is_material_change_from(&self, previous: &Self) -> bool {
        self.major != previous.major || self.minor != previous.minor
    }
}

impl fmt::Display for PolicyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for PolicyVersion {
    type Err = PolicyVersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let parts: Vec<&str> = trimmed.split('.').collect();
        let [major, minor, patch] = parts.as_slice() else {
            return Err(PolicyVersionError::Shape(s.to_string()));
        };
        let parse = |component: &str| {
            component
                .parse::<u32>()
                .map_err(|_| PolicyVersionError::Component {
                    version: s.to_string(),
                    component: component.to_string(),
                })
        };
        Ok(Self::new(parse(*major)?, parse(*minor)?, parse(*patch)?))
    }
}

impl TryFrom<String> for PolicyVersion {
    type Error = PolicyVersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PolicyVersion> for String {
    fn from(value: PolicyVersion) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_current_policy() {
        assert_eq!(PolicyVersion::current(), PolicyVersion::new(1, 0, 0));
        assert_eq!(PolicyVersion::current().to_string(), POLICY_VERSION);
    }

    #[test]
    fn rejects_malformed_versions() {
        assert!(matches!(
            "1.0".parse::<PolicyVersion>(),
            Err(PolicyVersionError::Shape(_))
        ));
        assert!(matches!(
            "1.x.0".parse::<PolicyVersion>(),
            Err(PolicyVersionError::Component { .. })
        ));
        assert!("1.0.0.1".parse::<PolicyVersion>().is_err());
    }

    #[test]
    fn patch_bumps_are_not_material() {
        let base = PolicyVersion::new(1, 0, 0);
        assert!(!PolicyVersion::new(1, 0, 3).is_material_change_from(&base));
        assert!(PolicyVersion::new(1, 1, 0).is_material_change_from(&base));
        assert!(PolicyVersion::new(2, 0, 0).is_material_change_from(&base));
    }

    #[test]
    fn serializes_as_plain_string() {
        let json = serde_json::to_string(&PolicyVersion::new(1, 2, 3)).unwrap();
        assert_eq!(json, "\"1.2.3\"");
        let back: PolicyVersion = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PolicyVersion::new(1, 2, 3));
        assert!(serde_json::from_str::<PolicyVersion>("\"one\"").is_err());
    }
}
