use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Lifecycle status of an issued credential.
///
/// Valid transitions: Active → Revoked. Revoked is terminal; there is no
/// un-revoke operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialStatus {
    Active,
    Revoked,
}

impl CredentialStatus {
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Revoked)
    }

    /// Guard a status transition, rejecting anything but Active → Revoked.
    pub fn transition(self, next: CredentialStatus) -> Result<CredentialStatus, CoreError> {
        match (self, next) {
            (CredentialStatus::Active, CredentialStatus::Revoked) => Ok(next),
            (from, to) => Err(CoreError::InvalidStatusTransition { from, to }),
        }
    }
}

impl fmt::Display for CredentialStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Revoked => write!(f, "REVOKED"),
        }
    }
}

/// Trust status reported by online verification.
///
/// `Unknown` is the degraded answer when the persistent store cannot be
/// consulted; it is distinct from both Active and Revoked so callers can
/// tell "could not corroborate" apart from a definitive answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrustStatus {
    Active,
    Revoked,
    Unknown,
}

impl From<CredentialStatus> for TrustStatus {
    fn from(status: CredentialStatus) -> Self {
        match status {
            CredentialStatus::Active => TrustStatus::Active,
            CredentialStatus::Revoked => TrustStatus::Revoked,
        }
    }
}

impl fmt::Display for TrustStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Active => write!(f, "ACTIVE"),
            Self::Revoked => write!(f, "REVOKED"),
            Self::Unknown => write!(f, "UNKNOWN"),
        }
    }
}
