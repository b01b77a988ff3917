use std::collections::HashSet;

use chrono::Utc;
use dashmap::DashMap;
use uuid::Uuid;

use crate::consumer::{ApiConsumer, AuthContext, ConsumerType, Permission};
use crate::error::AuthError;
use crate::secret::{hash_secret, verify_secret};

/// Leading scheme tag of every key: `acp_<prefix>_<secret>`.
const KEY_SCHEME: &str = "acp";

/// A freshly issued key. The plaintext appears here once and is never
/// reconstructible afterwards.
#[derive(Debug, Clone)]
pub struct IssuedKey {
    pub consumer_id: Uuid,
    pub api_key: String,
}

/// Validates API keys and attaches caller identity to requests.
///
/// Consumers are indexed by their public key prefix; the registry is loaded
/// from persistent storage at startup and updated administratively.
#[derive(Default)]
pub struct ApiKeyGateway {
    consumers: DashMap<String, ApiConsumer>,
}

impl ApiKeyGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a consumer loaded from storage.
    pub fn register(&self, consumer: ApiConsumer) {
        tracing::info!(prefix = %consumer.key_prefix, name = %consumer.name, "api consumer registered");
        self.consumers.insert(consumer.key_prefix.clone(), consumer);
    }

    /// Create a consumer and issue its key. Returns the plaintext exactly
    /// once alongside the storable consumer row.
    pub fn create_key(
        &self,
        name: &str,
        consumer_type: ConsumerType,
        permissions: HashSet<Permission>,
        linked_institution_id: Option<String>,
    ) -> Result<(IssuedKey, ApiConsumer), AuthError> {
        let prefix_part = hex::encode(rand::random::<[u8; 4]>());
        let secret = hex::encode(rand::random::<[u8; 16]>());
        let key_prefix = format!("{KEY_SCHEME}_{prefix_part}");
        let api_key = format!("{key_prefix}_{secret}");

        let consumer = ApiConsumer {
            id: Uuid::now_v7(),
            name: name.to_string(),
            key_prefix,
            key_hash: hash_secret(&secret)?,
            consumer_type,
            permissions,
            linked_institution_id,
            is_active: true,
            created_at: Utc::now(),
        };
        self.register(consumer.clone());

        Ok((
            IssuedKey {
                consumer_id: consumer.id,
                api_key,
            },
            consumer,
        ))
    }

    /// Validate a presented key and build the request's auth context.
    ///
    /// A deactivated consumer takes the same path as an unknown prefix.
    pub fn validate(&self, presented: &str) -> Result<AuthContext, AuthError> {
        let presented = presented.trim();
        if presented.is_empty() {
            return Err(AuthError::MissingKey);
        }

        let parts: Vec<&str> = presented.split('_').collect();
        if parts.len() != 3 || parts[0] != KEY_SCHEME {
            return Err(AuthError::Unauthorized);
        }
        let key_prefix = format!("{}_{}", parts[0], parts[1]);
        let secret = parts[2];

        let consumer = match self.consumers.get(&key_prefix) {
            Some(consumer) if consumer.is_active => consumer.clone(),
            _ => return Err(AuthError::Unauthorized),
        };

        if !verify_secret(secret, &consumer.key_hash)? {
            tracing::warn!(prefix = %key_prefix, "api key secret mismatch");
            return Err(AuthError::Unauthorized);
        }

        Ok(AuthContext {
            consumer_id: consumer.id,
            name: consumer.name.clone(),
            consumer_type: consumer.consumer_type,
            permissions: consumer.permissions.clone(),
            linked_institution_id: consumer.linked_institution_id.clone(),
        })
    }

    /// Authorization check for a validated request.
    pub fn require_permission(
        &self,
        context: &AuthContext,
        required: Permission,
    ) -> Result<(), AuthError> {
        if context.has_permission(required) {
            Ok(())
        } else {
            Err(AuthError::Forbidden { required })
        }
    }

    /// Deactivate a key by prefix. Subsequent validations treat it as
    /// not-found.
    pub fn deactivate(&self, key_prefix: &str) -> bool {
        match self.consumers.get_mut(key_prefix) {
            Some(mut consumer) => {
                consumer.is_active = false;
                true
            }
            None => false,
        }
    }

    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }
}
