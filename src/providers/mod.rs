mod embedded_a;
mod embedded_b;
mod external_app;
mod remote_key;
pub mod sdk;

pub use embedded_a::EmbeddedAAdapter;
pub use embedded_b::EmbeddedBAdapter;
pub use external_app::ExternalAppAdapter;
pub use remote_key::RemoteKeyAdapter;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::{AuthError, SignerError};
use crate::transaction::Signer;
use crate::wallet::{RawHandle, WalletHandle};

/// The wallet providers the application can authenticate against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderKind {
    /// Embedded wallet SDK with explicit wallet creation and recovery.
    EmbeddedA,
    /// Embedded wallet SDK with modal auth and multi-wallet accounts.
    EmbeddedB,
    /// Server-held keys reached through a credential-issuance service.
    RemoteKeyService,
    /// An external wallet application that keeps keys on-device.
    ExternalApp,
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProviderKind::EmbeddedA => "embedded-a",
            ProviderKind::EmbeddedB => "embedded-b",
            ProviderKind::RemoteKeyService => "remote-key-service",
            ProviderKind::ExternalApp => "external-app",
        };
        f.write_str(name)
    }
}

/// How the user wants to authenticate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginMethod {
    Email,
    Sms,
    Google,
    Apple,
}

/// Raw credential material supplied by the caller for a login attempt. Which
/// fields matter depends on the method and provider.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub contact: Option<String>,
    pub otp_code: Option<String>,
    pub oidc_token: Option<String>,
}

/// A successful provider authentication, before the orchestrator mints a
/// [`WalletHandle`] from it.
#[derive(Debug, Clone)]
pub struct AuthResult {
    pub provider: ProviderKind,
    pub address: String,
    pub user_id: Option<String>,
    pub raw: RawHandle,
}

impl AuthResult {
    pub fn into_handle(self) -> WalletHandle {
        WalletHandle::new(self.provider, self.address, self.raw)
    }
}

/// Outcome of [`WalletAdapter::authenticate`]: either a live connection or a
/// challenge the caller must answer before the connection opens.
#[derive(Debug, Clone)]
pub enum AuthOutcome {
    Connected(AuthResult),
    ChallengePending(OtpChallenge),
}

/// An open OTP challenge. Single-use: one verification attempt consumes it
/// whether or not the code was right.
#[derive(Debug, Clone)]
pub struct OtpChallenge {
    pub challenge_id: String,
    pub org_id: String,
    pub target_public_key_hex: String,
}

/// Uniform surface every wallet provider implements. Adapters own all
/// provider-specific state and error shapes; nothing provider-specific
/// crosses this boundary.
#[async_trait]
pub trait WalletAdapter: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Runs the provider's login flow for the given method.
    async fn authenticate(
        &self,
        method: LoginMethod,
        credentials: &Credentials,
    ) -> Result<AuthOutcome, AuthError>;

    /// Answers an OTP challenge previously returned by [`authenticate`].
    /// Providers without a challenge phase keep the default.
    ///
    /// [`authenticate`]: WalletAdapter::authenticate
    async fn verify_challenge(
        &self,
        _challenge: &OtpChallenge,
        _code: &str,
    ) -> Result<AuthResult, AuthError> {
        Err(AuthError::Provider(
            "provider has no challenge flow".to_string(),
        ))
    }

    /// Resolves a signer for the connected wallet. Providers that cannot
    /// sign in-app return [`SignerError::Unsupported`].
    async fn signer(&self, handle: &WalletHandle) -> Result<Box<dyn Signer>, SignerError>;

    /// Ends the provider-side session.
    async fn logout(&self) -> Result<(), AuthError>;

    /// Whether the provider still holds a usable session.
    async fn has_valid_session(&self) -> bool;

    /// Attempts to rebuild a connection from provider-side session state,
    /// without user interaction.
    async fn resume(&self) -> Option<AuthResult>;
}

/// Lookup table from provider kind to adapter. Cheap to clone and share.
#[derive(Clone)]
pub struct AdapterRegistry {
    inner: Arc<HashMap<ProviderKind, Arc<dyn WalletAdapter>>>,
}

impl AdapterRegistry {
    pub fn new(adapters: impl IntoIterator<Item = Arc<dyn WalletAdapter>>) -> Self {
        let inner = adapters
            .into_iter()
            .map(|adapter| (adapter.kind(), adapter))
            .collect();
        Self {
            inner: Arc::new(inner),
        }
    }

    pub fn get(&self, kind: ProviderKind) -> Option<Arc<dyn WalletAdapter>> {
        self.inner.get(&kind).cloned()
    }

    pub fn kinds(&self) -> Vec<ProviderKind> {
        self.inner.keys().copied().collect()
    }
}
