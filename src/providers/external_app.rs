use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::{info, instrument, warn};

use crate::errors::{AuthError, SignerError};
use crate::providers::sdk::{AppIdentity, ExternalAuthorizer, SdkError};
use crate::providers::{
    AuthOutcome, AuthResult, Credentials, LoginMethod, ProviderKind, WalletAdapter,
};
use crate::transaction::Signer;
use crate::utils::AddressCodec;
use crate::wallet::{RawHandle, WalletHandle};

/// Adapter for an external wallet application. Authorization hands back the
/// accounts the user approved; the keys stay in the external app, so this
/// provider never produces an in-app signer.
pub struct ExternalAppAdapter {
    authorizer: Arc<dyn ExternalAuthorizer>,
    cluster: String,
    identity: AppIdentity,
    connected: Mutex<Option<String>>,
}

impl ExternalAppAdapter {
    pub fn new(authorizer: Arc<dyn ExternalAuthorizer>, cluster: &str, identity: AppIdentity) -> Self {
        Self {
            authorizer,
            cluster: cluster.to_string(),
            identity,
            connected: Mutex::new(None),
        }
    }

    fn classify(err: SdkError) -> AuthError {
        match err {
            SdkError::Cancelled => AuthError::UserCancelled,
            SdkError::Network(m) => AuthError::Network(m),
            SdkError::Unavailable(m) => AuthError::ProviderUnavailable(m),
            SdkError::Rejected(m) => AuthError::CredentialRejected(m),
            SdkError::Other(m) => AuthError::Provider(m),
        }
    }
}

#[async_trait]
impl WalletAdapter for ExternalAppAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::ExternalApp
    }

    #[instrument(skip(self, _credentials), fields(provider = %self.kind()))]
    async fn authenticate(
        &self,
        _method: LoginMethod,
        _credentials: &Credentials,
    ) -> Result<AuthOutcome, AuthError> {
        let accounts = self
            .authorizer
            .authorize(&self.cluster, &self.identity)
            .await
            .map_err(Self::classify)?;

        let account = accounts.into_iter().next().ok_or_else(|| {
            AuthError::Provider("authorization returned no accounts".to_string())
        })?;

        // The protocol allows base58 or base64 account identifiers
        // depending on platform.
        let key = AddressCodec::from_flexible(&account.address).ok_or_else(|| {
            AuthError::CredentialRejected("invalid account address format".to_string())
        })?;
        let address = key.to_string();

        *self.connected.lock().await = Some(address.clone());
        info!(%address, "external wallet authorized");

        Ok(AuthOutcome::Connected(AuthResult {
            provider: self.kind(),
            address: address.clone(),
            user_id: None,
            raw: RawHandle::new(address),
        }))
    }

    async fn signer(&self, _handle: &WalletHandle) -> Result<Box<dyn Signer>, SignerError> {
        Err(SignerError::Unsupported(
            "external wallet holds the keys; no local signer".to_string(),
        ))
    }

    async fn logout(&self) -> Result<(), AuthError> {
        *self.connected.lock().await = None;
        if let Err(err) = self.authorizer.deauthorize().await {
            warn!(error = %err.message(), "deauthorize failed");
            return Err(Self::classify(err));
        }
        Ok(())
    }

    async fn has_valid_session(&self) -> bool {
        self.connected.lock().await.is_some()
    }

    async fn resume(&self) -> Option<AuthResult> {
        let address = self.connected.lock().await.clone()?;
        Some(AuthResult {
            provider: self.kind(),
            address: address.clone(),
            user_id: None,
            raw: RawHandle::new(address),
        })
    }
}
