use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use solana_sdk::signature::{Keypair, Signer as _};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::api::{CredentialBundle, CredentialService};
use crate::errors::{AuthError, SignerError};
use crate::providers::{
    AuthOutcome, AuthResult, Credentials, LoginMethod, OtpChallenge, ProviderKind, WalletAdapter,
};
use crate::transaction::Signer;
use crate::utils::AddressCodec;
use crate::wallet::{RawHandle, WalletHandle};

/// Adapter for the remote key service: keys live server-side and sessions
/// are opened by redeeming an OTP challenge or an OAuth token against the
/// credential-issuance service.
///
/// Every login attempt generates a fresh local keypair whose public half the
/// service binds the credential bundle to. Challenges are single-use; one
/// verification attempt consumes the pending key regardless of outcome.
pub struct RemoteKeyAdapter {
    api: Arc<dyn CredentialService>,
    sessions: Mutex<HashMap<String, CredentialBundle>>,
    pending_keys: Mutex<HashMap<String, Vec<u8>>>,
    connected: Mutex<Option<String>>,
}

impl RemoteKeyAdapter {
    pub fn new(api: Arc<dyn CredentialService>) -> Self {
        Self {
            api,
            sessions: Mutex::new(HashMap::new()),
            pending_keys: Mutex::new(HashMap::new()),
            connected: Mutex::new(None),
        }
    }

    fn session_key(org_id: &str) -> String {
        format!("remote-key/session/{org_id}")
    }

    async fn open_session(&self, org_id: &str, bundle: CredentialBundle, address: String) {
        self.sessions
            .lock()
            .await
            .insert(Self::session_key(org_id), bundle);
        *self.connected.lock().await = Some(address);
    }

    /// Drops whatever session a previous attempt left behind. Clearing an
    /// absent session is a no-op, not an error.
    async fn clear_stale_session(&self) {
        let mut sessions = self.sessions.lock().await;
        if !sessions.is_empty() {
            debug!(count = sessions.len(), "clearing stale sessions before new attempt");
            sessions.clear();
        }
        *self.connected.lock().await = None;
    }
}

#[async_trait]
impl WalletAdapter for RemoteKeyAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::RemoteKeyService
    }

    #[instrument(skip(self, credentials), fields(provider = %self.kind()))]
    async fn authenticate(
        &self,
        method: LoginMethod,
        credentials: &Credentials,
    ) -> Result<AuthOutcome, AuthError> {
        // Any session a previous attempt opened is invalid once a new one
        // starts.
        self.clear_stale_session().await;

        // Fresh key material per attempt; the public half scopes whatever
        // credential the service mints.
        let keypair = Keypair::new();
        let target_public_key_hex = hex::encode(keypair.pubkey().to_bytes());

        match method {
            LoginMethod::Email | LoginMethod::Sms => {
                let contact = credentials
                    .contact
                    .as_deref()
                    .ok_or_else(|| AuthError::CredentialRejected("contact is required".into()))?;
                let otp_type = if method == LoginMethod::Email {
                    "OTP_TYPE_EMAIL"
                } else {
                    "OTP_TYPE_SMS"
                };

                let init = self.api.init_challenge(otp_type, contact).await?;

                self.pending_keys
                    .lock()
                    .await
                    .insert(init.otp_id.clone(), keypair.to_bytes().to_vec());

                info!(otp_id = %init.otp_id, "challenge opened");
                Ok(AuthOutcome::ChallengePending(OtpChallenge {
                    challenge_id: init.otp_id,
                    org_id: init.organization_id,
                    target_public_key_hex,
                }))
            }
            LoginMethod::Google | LoginMethod::Apple => {
                let token = credentials
                    .oidc_token
                    .as_deref()
                    .ok_or_else(|| AuthError::CredentialRejected("OIDC token is required".into()))?;
                let provider_name = if method == LoginMethod::Google { "google" } else { "apple" };

                let bundle = self
                    .api
                    .oauth_token(token, provider_name, &target_public_key_hex)
                    .await?;

                let address = AddressCodec::from_hex_key(&target_public_key_hex).to_string();
                self.open_session("oauth", bundle, address.clone()).await;

                info!(%address, "remote key session opened via oauth");
                Ok(AuthOutcome::Connected(AuthResult {
                    provider: self.kind(),
                    address,
                    user_id: None,
                    raw: RawHandle::new(target_public_key_hex),
                }))
            }
        }
    }

    #[instrument(skip(self, code), fields(provider = %self.kind(), challenge_id = %challenge.challenge_id))]
    async fn verify_challenge(
        &self,
        challenge: &OtpChallenge,
        code: &str,
    ) -> Result<AuthResult, AuthError> {
        // Take the pending key before touching the service so the challenge
        // is consumed whether verification succeeds or fails.
        let taken = self
            .pending_keys
            .lock()
            .await
            .remove(&challenge.challenge_id);

        if taken.is_none() {
            return Err(AuthError::CredentialRejected(
                "challenge already consumed or unknown".to_string(),
            ));
        }

        let bundle = self
            .api
            .verify_challenge(
                &challenge.challenge_id,
                code,
                &challenge.org_id,
                &challenge.target_public_key_hex,
            )
            .await?;

        let address = AddressCodec::from_hex_key(&challenge.target_public_key_hex).to_string();
        self.open_session(&challenge.org_id, bundle, address.clone())
            .await;

        info!(%address, "remote key session opened");
        Ok(AuthResult {
            provider: self.kind(),
            address,
            user_id: None,
            raw: RawHandle::new(challenge.target_public_key_hex.clone()),
        })
    }

    async fn signer(&self, _handle: &WalletHandle) -> Result<Box<dyn Signer>, SignerError> {
        // Keys never leave the service; there is no in-app signing path.
        Err(SignerError::Unsupported(
            "remote key service exposes no transaction signer".to_string(),
        ))
    }

    async fn logout(&self) -> Result<(), AuthError> {
        self.sessions.lock().await.clear();
        self.pending_keys.lock().await.clear();
        *self.connected.lock().await = None;
        Ok(())
    }

    async fn has_valid_session(&self) -> bool {
        self.connected.lock().await.is_some()
    }

    async fn resume(&self) -> Option<AuthResult> {
        let address = self.connected.lock().await.clone()?;
        if self.sessions.lock().await.is_empty() {
            warn!("connected address present but no session bundle, not resuming");
            return None;
        }
        Some(AuthResult {
            provider: self.kind(),
            address,
            user_id: None,
            raw: RawHandle::default(),
        })
    }
}
