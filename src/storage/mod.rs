mod file;

pub use file::FileSessionStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::StoreError;
use crate::providers::ProviderKind;

/// The slice of session state that survives an app restart. Only enough to
/// route a warm-start resume to the right adapter; no key material and no
/// provider tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedSession {
    pub provider: ProviderKind,
    pub address: String,
    pub connected_at: DateTime<Utc>,
}

impl PersistedSession {
    pub fn new(provider: ProviderKind, address: impl Into<String>) -> Self {
        Self {
            provider,
            address: address.into(),
            connected_at: Utc::now(),
        }
    }
}

/// Durable store for the persisted session record.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self) -> Result<Option<PersistedSession>, StoreError>;
    async fn save(&self, session: &PersistedSession) -> Result<(), StoreError>;
    async fn clear(&self) -> Result<(), StoreError>;
}
