use serde::{Deserialize, Serialize};

use crate::providers::ProviderKind;

/// Provider-private connection state. The orchestrator and pipeline treat
/// this as an opaque token; only the adapter that minted it reads it back.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawHandle(String);

impl RawHandle {
    pub fn new(inner: impl Into<String>) -> Self {
        Self(inner.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The active wallet connection: which provider it came from and the base58
/// address it signs for. Immutable once minted; a new login mints a new
/// handle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletHandle {
    provider: ProviderKind,
    address: String,
    raw: RawHandle,
}

impl WalletHandle {
    pub fn new(provider: ProviderKind, address: impl Into<String>, raw: RawHandle) -> Self {
        Self {
            provider,
            address: address.into(),
            raw,
        }
    }

    pub fn provider(&self) -> ProviderKind {
        self.provider
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn raw(&self) -> &RawHandle {
        &self.raw
    }
}

/// Two handles are the same connection when provider and address match; the
/// opaque payload does not participate.
impl PartialEq for WalletHandle {
    fn eq(&self, other: &Self) -> bool {
        self.provider == other.provider && self.address == other.address
    }
}

impl Eq for WalletHandle {}
