use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, instrument, warn};

use crate::errors::{AuthError, SignerError};
use crate::providers::sdk::{EmbeddedSdkA, EmbeddedWalletState, SdkError, SdkUser};
use crate::providers::{
    AuthOutcome, AuthResult, Credentials, LoginMethod, ProviderKind, WalletAdapter,
};
use crate::transaction::Signer;
use crate::wallet::{RawHandle, WalletHandle};

/// Adapter for the first embedded-wallet SDK. Wallet creation is explicit:
/// after login the wallet may not exist yet, or may need a vendor-driven
/// recovery before it can sign.
pub struct EmbeddedAAdapter {
    sdk: Arc<dyn EmbeddedSdkA>,
}

impl EmbeddedAAdapter {
    pub fn new(sdk: Arc<dyn EmbeddedSdkA>) -> Self {
        Self { sdk }
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

    async fn login(&self, method: LoginMethod, credentials: &Credentials) -> Result<SdkUser, AuthError> {
        match method {
            LoginMethod::Google => self.sdk.login_oauth("google").await,
            LoginMethod::Apple => self.sdk.login_oauth("apple").await,
            LoginMethod::Email | LoginMethod::Sms => {
                let contact = credentials
                    .contact
                    .as_deref()
                    .ok_or_else(|| AuthError::CredentialRejected("contact is required".into()))?;
                let channel = if method == LoginMethod::Email { "email" } else { "sms" };
                self.sdk
                    .login(channel, contact, credentials.otp_code.as_deref())
                    .await
            }
        }
        .map_err(Self::classify)
    }

    /// Drives the wallet to a connected state, creating it when it does not
    /// exist yet. A concurrent creation on another device surfaces as an
    /// "already exists" rejection; re-querying resolves it.
    async fn ensure_wallet(&self) -> Result<String, AuthError> {
        match self.sdk.wallet_state().await.map_err(Self::classify)? {
            EmbeddedWalletState::Connected { address } => return Ok(address),
            EmbeddedWalletState::NeedsRecovery => {
                return Err(AuthError::Provider(
                    "wallet requires recovery before it can be used".to_string(),
                ));
            }
            EmbeddedWalletState::NotCreated => {}
        }

        info!("no embedded wallet yet, creating one");
        if let Err(err) = self.sdk.create_wallet().await {
            if !err.message().contains("already exists") {
                return Err(Self::classify(err));
            }
            warn!("wallet creation raced an existing wallet, re-querying");
        }

        match self.sdk.wallet_state().await.map_err(Self::classify)? {
            EmbeddedWalletState::Connected { address } => Ok(address),
            EmbeddedWalletState::NeedsRecovery => Err(AuthError::Provider(
                "wallet requires recovery before it can be used".to_string(),
            )),
            EmbeddedWalletState::NotCreated => Err(AuthError::Provider(
                "wallet still absent after creation".to_string(),
            )),
        }
    }
}

#[async_trait]
impl WalletAdapter for EmbeddedAAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::EmbeddedA
    }

    #[instrument(skip(self, credentials), fields(provider = %self.kind()))]
    async fn authenticate(
        &self,
        method: LoginMethod,
        credentials: &Credentials,
    ) -> Result<AuthOutcome, AuthError> {
        let user = self.login(method, credentials).await?;
        let address = self.ensure_wallet().await?;

        info!(user_id = %user.id, %address, "embedded wallet connected");

        Ok(AuthOutcome::Connected(AuthResult {
            provider: self.kind(),
            address,
            user_id: Some(user.id.clone()),
            raw: RawHandle::new(user.id),
        }))
    }

    async fn signer(&self, _handle: &WalletHandle) -> Result<Box<dyn Signer>, SignerError> {
        if self.sdk.current_user().await.is_none() {
            return Err(SignerError::NotConnected);
        }

        self.sdk.native_signer().await.map_err(|e| match e {
            SdkError::Cancelled => SignerError::UserRejected,
            SdkError::Unavailable(m) => SignerError::ProviderUnavailable(m),
            other => SignerError::Signing(other.message().to_string()),
        })
    }

    async fn logout(&self) -> Result<(), AuthError> {
        self.sdk.logout().await.map_err(Self::classify)
    }

    async fn has_valid_session(&self) -> bool {
        self.sdk.current_user().await.is_some()
    }

    async fn resume(&self) -> Option<AuthResult> {
        let user = self.sdk.current_user().await?;
        match self.sdk.wallet_state().await {
            Ok(EmbeddedWalletState::Connected { address }) => Some(AuthResult {
                provider: self.kind(),
                address,
                user_id: Some(user.id.clone()),
                raw: RawHandle::new(user.id),
            }),
            _ => None,
        }
    }
}
