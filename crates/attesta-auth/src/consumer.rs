use std::collections::HashSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What a consumer is allowed to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    MintCredential,
    VerifyCredential,
    RevokeCredential,
    ManageApiKeys,
    All,
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MintCredential => write!(f, "mint_credential"),
            Self::VerifyCredential => write!(f, "verify_credential"),
            Self::RevokeCredential => write!(f, "revoke_credential"),
            Self::ManageApiKeys => write!(f, "manage_api_keys"),
            Self::All => write!(f, "all"),
        }
    }
}

/// Kind of integration partner a key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsumerType {
    Institution,
    Partner,
    Admin,
}

/// A registered API consumer.
///
/// `key_hash` is the Argon2id hash of the key's secret part; the secret
/// itself exists only in the one-time issuance response. `is_active` is the
/// only mutable field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConsumer {
    pub id: Uuid,
    pub name: String,
    pub key_prefix: String,
    pub key_hash: String,
    pub consumer_type: ConsumerType,
    pub permissions: HashSet<Permission>,
    pub linked_institution_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Immutable caller identity attached to a request after successful
/// validation, consumed by downstream authorization checks.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub consumer_id: Uuid,
    pub name: String,
    pub consumer_type: ConsumerType,
    pub permissions: HashSet<Permission>,
    pub linked_institution_id: Option<String>,
}

impl AuthContext {
    pub fn has_permission(&self, required: Permission) -> bool {
        self.permissions.contains(&Permission::All) || self.permissions.contains(&required)
    }
}
