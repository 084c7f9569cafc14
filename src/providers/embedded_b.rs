use std::sync::Arc;

use async_trait::async_trait;
use solana_sdk::pubkey::Pubkey;
use tracing::{debug, info, instrument, warn};

use crate::errors::{AuthError, SignerError};
use crate::providers::sdk::{
    EmbeddedSdkB, NativeSigner, SdkError, SdkWallet, WalletCreateParams,
};
use crate::providers::{
    AuthOutcome, AuthResult, Credentials, LoginMethod, ProviderKind, WalletAdapter,
};
use crate::rpc::Network;
use crate::transaction::{DecodedTransaction, Signer, SignerRequest, SignerResponse};
use crate::utils::{poll_until, AddressCodec, PollConfig};
use crate::wallet::{RawHandle, WalletHandle};

/// Adapter for the second embedded-wallet SDK. Its auth modal completes out
/// of band, so login polls for the authenticated user within a fixed
/// ceiling. Accounts can hold several wallets; the primary one signs.
pub struct EmbeddedBAdapter {
    sdk: Arc<dyn EmbeddedSdkB>,
    network: Arc<dyn Network>,
    poll: PollConfig,
    cluster: String,
}

impl EmbeddedBAdapter {
    pub fn new(
        sdk: Arc<dyn EmbeddedSdkB>,
        network: Arc<dyn Network>,
        poll: PollConfig,
        cluster: &str,
    ) -> Self {
        Self {
            sdk,
            network,
            poll,
            cluster: cluster.to_string(),
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

    /// Resolves the wallet that signs for this account: the primary wallet,
    /// else the first known wallet (promoted best-effort), else a freshly
    /// created one.
    async fn ensure_wallet(&self) -> Result<SdkWallet, AuthError> {
        if let Some(wallet) = self.sdk.primary_wallet().await {
            return Ok(wallet);
        }

        if let Some(wallet) = self.sdk.user_wallets().await.into_iter().next() {
            if let Err(err) = self.sdk.set_primary(&wallet.id).await {
                warn!(wallet_id = %wallet.id, error = %err.message(), "could not promote wallet to primary");
            }
            return Ok(wallet);
        }

        info!("account has no wallets, creating one");
        self.create_wallet().await
    }

    async fn create_wallet(&self) -> Result<SdkWallet, AuthError> {
        match self.sdk.create_wallet(&WalletCreateParams::default()).await {
            Ok(wallet) => Ok(wallet),
            Err(err) if err.message().contains("chain") && err.message().contains("required") => {
                // Some SDK builds refuse a bare create and want every chain
                // field spelled out. Retry once fully explicit.
                debug!("bare wallet create refused, retrying with explicit chain parameters");
                self.sdk
                    .create_wallet(&WalletCreateParams::explicit_solana(&self.cluster))
                    .await
                    .map_err(Self::classify)
            }
            Err(err) if err.message().contains("already exists") => {
                warn!("wallet creation raced an existing wallet, re-querying");
                self.sdk
                    .user_wallets()
                    .await
                    .into_iter()
                    .next()
                    .ok_or_else(|| {
                        AuthError::Provider("wallet reported as existing but not listed".into())
                    })
            }
            Err(err) => Err(Self::classify(err)),
        }
    }

    fn result_for(&self, user_id: String, wallet: &SdkWallet) -> AuthResult {
        AuthResult {
            provider: self.kind(),
            address: wallet.address.clone(),
            user_id: Some(user_id),
            raw: RawHandle::new(wallet.id.clone()),
        }
    }
}

#[async_trait]
impl WalletAdapter for EmbeddedBAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::EmbeddedB
    }

    #[instrument(skip(self, _credentials), fields(provider = %self.kind()))]
    async fn authenticate(
        &self,
        method: LoginMethod,
        _credentials: &Credentials,
    ) -> Result<AuthOutcome, AuthError> {
        match method {
            LoginMethod::Google => self.sdk.social_connect("google").await,
            LoginMethod::Apple => self.sdk.social_connect("apple").await,
            LoginMethod::Email | LoginMethod::Sms => self.sdk.open_auth_modal().await,
        }
        .map_err(Self::classify)?;

        // The modal resolves on the provider's side; poll until the SDK
        // reports an authenticated user or the ceiling elapses.
        let sdk = self.sdk.clone();
        let user = poll_until(self.poll, "authenticated user", move || {
            let sdk = sdk.clone();
            async move { sdk.authenticated_user().await }
        })
        .await?;

        let wallet = self.ensure_wallet().await?;
        info!(user_id = %user.id, address = %wallet.address, "embedded wallet connected");

        Ok(AuthOutcome::Connected(self.result_for(user.id, &wallet)))
    }

    async fn signer(&self, handle: &WalletHandle) -> Result<Box<dyn Signer>, SignerError> {
        if self.sdk.authenticated_user().await.is_none() {
            return Err(SignerError::NotConnected);
        }

        let wallet = SdkWallet {
            id: handle.raw().as_str().to_string(),
            address: handle.address().to_string(),
        };

        let fee_payer = AddressCodec::from_flexible(handle.address())
            .ok_or_else(|| SignerError::Signing("wallet address is not a valid key".into()))?;

        let native = self.sdk.native_signer(&wallet).await.map_err(|e| match e {
            SdkError::Cancelled => SignerError::UserRejected,
            SdkError::Unavailable(m) => SignerError::ProviderUnavailable(m),
            other => SignerError::Signing(other.message().to_string()),
        })?;

        Ok(Box::new(FallbackSigner {
            native,
            network: self.network.clone(),
            fee_payer,
        }))
    }

    async fn logout(&self) -> Result<(), AuthError> {
        self.sdk.logout().await.map_err(Self::classify)
    }

    async fn has_valid_session(&self) -> bool {
        self.sdk.authenticated_user().await.is_some()
    }

    async fn resume(&self) -> Option<AuthResult> {
        let user = self.sdk.authenticated_user().await?;
        let wallet = self.sdk.primary_wallet().await?;
        Some(self.result_for(user.id, &wallet))
    }
}

/// Signer that prefers the SDK's atomic sign-and-send, falling back to a
/// manual sign-then-submit when the atomic path is refused.
struct FallbackSigner {
    native: Box<dyn NativeSigner>,
    network: Arc<dyn Network>,
    fee_payer: Pubkey,
}

impl FallbackSigner {
    fn map_sdk(err: SdkError) -> SignerError {
        match err {
            SdkError::Cancelled => SignerError::UserRejected,
            SdkError::Unavailable(m) => SignerError::ProviderUnavailable(m),
            other => SignerError::Signing(other.message().to_string()),
        }
    }

    /// Fills in whatever a draft is missing before handing it to the SDK:
    /// the connected wallet pays fees, and a fresh blockhash is fetched when
    /// absent.
    async fn prepare(&self, decoded: DecodedTransaction) -> Result<DecodedTransaction, SignerError> {
        let DecodedTransaction::Draft(mut draft) = decoded else {
            return Ok(decoded);
        };

        if draft.fee_payer.is_none() {
            draft.fee_payer = Some(self.fee_payer);
        }
        if draft.recent_blockhash.is_none() {
            draft.recent_blockhash = Some(self.network.latest_blockhash().await?);
        }

        Ok(DecodedTransaction::Draft(draft))
    }

    async fn sign_then_submit(
        &self,
        decoded: DecodedTransaction,
    ) -> Result<SignerResponse, SignerError> {
        let prepared = self.prepare(decoded).await?;
        let signed = self.native.sign(&prepared).await.map_err(Self::map_sdk)?;

        if !signed.is_signed() {
            return Err(SignerError::Signing(
                "provider returned an unsigned transaction".to_string(),
            ));
        }

        let bytes = signed
            .serialize()
            .map_err(|e| SignerError::Signing(e.to_string()))?;
        let signature = self.network.send_raw_transaction(&bytes).await?;
        Ok(SignerResponse::Submitted(signature))
    }

    async fn sign_only(&self, decoded: DecodedTransaction) -> Result<SignerResponse, SignerError> {
        let prepared = self.prepare(decoded).await?;
        let signed = self.native.sign(&prepared).await.map_err(Self::map_sdk)?;

        if !signed.is_signed() {
            return Err(SignerError::Signing(
                "provider returned an unsigned transaction".to_string(),
            ));
        }

        Ok(SignerResponse::Signed(signed))
    }
}

#[async_trait]
impl Signer for FallbackSigner {
    async fn request(&self, request: SignerRequest<'_>) -> Result<SignerResponse, SignerError> {
        match request {
            SignerRequest::SignTransaction { descriptor } => {
                let decoded = descriptor
                    .decode()
                    .map_err(|e| SignerError::Signing(e.to_string()))?;
                self.sign_only(decoded).await
            }
            SignerRequest::SignAndSendTransaction { descriptor } => {
                let decoded = descriptor
                    .decode()
                    .map_err(|e| SignerError::Signing(e.to_string()))?;

                match self.native.sign_and_send(&decoded).await {
                    Ok(signature) => Ok(SignerResponse::Submitted(signature)),
                    Err(SdkError::Cancelled) => Err(SignerError::UserRejected),
                    Err(err) => {
                        warn!(
                            error = %err.message(),
                            "atomic sign-and-send refused, falling back to manual submission"
                        );
                        self.sign_then_submit(decoded).await
                    }
                }
            }
        }
    }
}
