//! In-memory stand-ins for the vendor SDKs, the credential service, and the
//! RPC network, shared by the integration tests.

#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::signature::{Keypair, Signature, Signer as KeypairSigner};

use solana_wallet_core::api::{ChallengeInit, CredentialBundle, CredentialService};
use solana_wallet_core::errors::{AuthError, SignerError};
use solana_wallet_core::providers::sdk::{
    AppIdentity, AuthorizedAccount, EmbeddedSdkA, EmbeddedSdkB, EmbeddedWalletState,
    ExternalAuthorizer, NativeSigner, SdkError, SdkUser, SdkWallet, WalletCreateParams,
};
use solana_wallet_core::rpc::Network;
use solana_wallet_core::transaction::{
    DecodedTransaction, SignedTransaction, Signer, SignerRequest, SignerResponse,
};

pub fn test_identity() -> AppIdentity {
    AppIdentity {
        name: "Test App".into(),
        uri: "https://example.com".into(),
        icon: "favicon.ico".into(),
    }
}

// ---------------------------------------------------------------------------
// Network

pub struct MockNetwork {
    pub blockhash: Hash,
    pub sent: Mutex<Vec<(Vec<u8>, Signature)>>,
    pub confirm: AtomicBool,
}

impl MockNetwork {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            blockhash: Hash::new_unique(),
            sent: Mutex::new(Vec::new()),
            confirm: AtomicBool::new(true),
        })
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

#[async_trait]
impl Network for MockNetwork {
    async fn latest_blockhash(&self) -> Result<Hash, SignerError> {
        Ok(self.blockhash)
    }

    async fn send_raw_transaction(&self, bytes: &[u8]) -> Result<Signature, SignerError> {
        let signature = Signature::new_unique();
        self.sent.lock().unwrap().push((bytes.to_vec(), signature));
        Ok(signature)
    }

    async fn is_confirmed(&self, _signature: &Signature) -> Result<bool, SignerError> {
        Ok(self.confirm.load(Ordering::SeqCst))
    }
}

// ---------------------------------------------------------------------------
// Embedded SDK A

pub struct MockSdkA {
    pub keypair: Keypair,
    pub network: Arc<MockNetwork>,
    pub reject_credentials: bool,
    pub cancel: bool,
    pub fail_logout: bool,
    pub needs_recovery: bool,
    pub create_races_existing: bool,
    pub user: Mutex<Option<SdkUser>>,
    pub wallet_created: AtomicBool,
    pub authenticate_calls: AtomicU32,
}

impl MockSdkA {
    pub fn new(network: Arc<MockNetwork>) -> Self {
        Self {
            keypair: Keypair::new(),
            network,
            reject_credentials: false,
            cancel: false,
            fail_logout: false,
            needs_recovery: false,
            create_races_existing: false,
            user: Mutex::new(None),
            wallet_created: AtomicBool::new(false),
            authenticate_calls: AtomicU32::new(0),
        }
    }

    pub fn address(&self) -> String {
        self.keypair.pubkey().to_string()
    }

    fn login_result(&self) -> Result<SdkUser, SdkError> {
        self.authenticate_calls.fetch_add(1, Ordering::SeqCst);
        if self.cancel {
            return Err(SdkError::Cancelled);
        }
        if self.reject_credentials {
            return Err(SdkError::Rejected("bad credentials".into()));
        }
        let user = SdkUser { id: "user-a".into() };
        *self.user.lock().unwrap() = Some(user.clone());
        Ok(user)
    }
}

#[async_trait]
impl EmbeddedSdkA for MockSdkA {
    async fn login_oauth(&self, _provider: &str) -> Result<SdkUser, SdkError> {
        self.login_result()
    }

    async fn login(
        &self,
        _method: &str,
        _contact: &str,
        _code: Option<&str>,
    ) -> Result<SdkUser, SdkError> {
        self.login_result()
    }

    async fn current_user(&self) -> Option<SdkUser> {
        self.user.lock().unwrap().clone()
    }

    async fn wallet_state(&self) -> Result<EmbeddedWalletState, SdkError> {
        if self.needs_recovery {
            return Ok(EmbeddedWalletState::NeedsRecovery);
        }
        if self.wallet_created.load(Ordering::SeqCst) {
            Ok(EmbeddedWalletState::Connected {
                address: self.address(),
            })
        } else {
            Ok(EmbeddedWalletState::NotCreated)
        }
    }

    async fn create_wallet(&self) -> Result<SdkWallet, SdkError> {
        if self.create_races_existing {
            // Another device won the creation race; the wallet exists even
            // though this call is refused.
            self.wallet_created.store(true, Ordering::SeqCst);
            return Err(SdkError::Other("wallet already exists".into()));
        }
        self.wallet_created.store(true, Ordering::SeqCst);
        Ok(SdkWallet {
            id: "wallet-a".into(),
            address: self.address(),
        })
    }

    async fn native_signer(&self) -> Result<Box<dyn Signer>, SdkError> {
        Ok(Box::new(MockAtomicSigner {
            keypair: self.keypair.insecure_clone(),
            network: self.network.clone(),
        }))
    }

    async fn logout(&self) -> Result<(), SdkError> {
        *self.user.lock().unwrap() = None;
        if self.fail_logout {
            return Err(SdkError::Network("logout endpoint unreachable".into()));
        }
        Ok(())
    }
}

/// Signer used by the first embedded SDK mock: completes drafts, signs with
/// the mock keypair, and submits through the mock network.
pub struct MockAtomicSigner {
    pub keypair: Keypair,
    pub network: Arc<MockNetwork>,
}

impl MockAtomicSigner {
    async fn complete_and_sign(
        &self,
        decoded: DecodedTransaction,
    ) -> Result<SignedTransaction, SignerError> {
        match decoded {
            DecodedTransaction::Draft(mut draft) => {
                if draft.fee_payer.is_none() {
                    draft.fee_payer = Some(self.keypair.pubkey());
                }
                let blockhash = match draft.recent_blockhash {
                    Some(hash) => hash,
                    None => {
                        let hash = self.network.latest_blockhash().await?;
                        draft.recent_blockhash = Some(hash);
                        hash
                    }
                };
                let mut tx = draft
                    .compile()
                    .map_err(|e| SignerError::Signing(e.to_string()))?;
                tx.sign(&[&self.keypair], blockhash);
                Ok(SignedTransaction::Legacy(tx))
            }
            DecodedTransaction::Legacy(mut tx) => {
                let blockhash = tx.message.recent_blockhash;
                tx.sign(&[&self.keypair], blockhash);
                Ok(SignedTransaction::Legacy(tx))
            }
            DecodedTransaction::Versioned(tx) => Ok(SignedTransaction::Versioned(tx)),
        }
    }
}

#[async_trait]
impl Signer for MockAtomicSigner {
    async fn request(&self, request: SignerRequest<'_>) -> Result<SignerResponse, SignerError> {
        match request {
            SignerRequest::SignTransaction { descriptor } => {
                let decoded = descriptor
                    .decode()
                    .map_err(|e| SignerError::Signing(e.to_string()))?;
                Ok(SignerResponse::Signed(self.complete_and_sign(decoded).await?))
            }
            SignerRequest::SignAndSendTransaction { descriptor } => {
                let decoded = descriptor
                    .decode()
                    .map_err(|e| SignerError::Signing(e.to_string()))?;
                let signed = self.complete_and_sign(decoded).await?;
                let bytes = signed
                    .serialize()
                    .map_err(|e| SignerError::Signing(e.to_string()))?;
                let signature = self.network.send_raw_transaction(&bytes).await?;
                Ok(SignerResponse::Submitted(signature))
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Embedded SDK B

pub struct MockSdkB {
    pub keypair: Keypair,
    pub network: Arc<MockNetwork>,
    pub auth_ready_after_polls: AtomicU32,
    pub atomic_fails: bool,
    pub cancel_signing: bool,
    pub user: Mutex<Option<SdkUser>>,
    pub wallets: Mutex<Vec<SdkWallet>>,
    pub fail_chain_required_once: AtomicBool,
    pub create_calls: AtomicU32,
}

impl MockSdkB {
    pub fn new(network: Arc<MockNetwork>) -> Self {
        Self {
            keypair: Keypair::new(),
            network,
            auth_ready_after_polls: AtomicU32::new(0),
            atomic_fails: false,
            cancel_signing: false,
            user: Mutex::new(None),
            wallets: Mutex::new(Vec::new()),
            fail_chain_required_once: AtomicBool::new(false),
            create_calls: AtomicU32::new(0),
        }
    }

    pub fn address(&self) -> String {
        self.keypair.pubkey().to_string()
    }
}

#[async_trait]
impl EmbeddedSdkB for MockSdkB {
    async fn open_auth_modal(&self) -> Result<(), SdkError> {
        Ok(())
    }

    async fn social_connect(&self, _provider: &str) -> Result<(), SdkError> {
        Ok(())
    }

    async fn authenticated_user(&self) -> Option<SdkUser> {
        if let Some(user) = self.user.lock().unwrap().clone() {
            return Some(user);
        }
        let remaining = self.auth_ready_after_polls.load(Ordering::SeqCst);
        if remaining == 0 {
            let user = SdkUser { id: "user-b".into() };
            *self.user.lock().unwrap() = Some(user.clone());
            Some(user)
        } else {
            self.auth_ready_after_polls.store(remaining - 1, Ordering::SeqCst);
            None
        }
    }

    async fn primary_wallet(&self) -> Option<SdkWallet> {
        self.wallets.lock().unwrap().first().cloned()
    }

    async fn user_wallets(&self) -> Vec<SdkWallet> {
        self.wallets.lock().unwrap().clone()
    }

    async fn create_wallet(&self, params: &WalletCreateParams) -> Result<SdkWallet, SdkError> {
        self.create_calls.fetch_add(1, Ordering::SeqCst);

        if self.fail_chain_required_once.swap(false, Ordering::SeqCst) && params.chain.is_none() {
            return Err(SdkError::Rejected("chain parameter required".into()));
        }

        let wallet = SdkWallet {
            id: "wallet-b".into(),
            address: self.address(),
        };
        self.wallets.lock().unwrap().push(wallet.clone());
        Ok(wallet)
    }

    async fn set_primary(&self, _wallet_id: &str) -> Result<(), SdkError> {
        Ok(())
    }

    async fn native_signer(&self, _wallet: &SdkWallet) -> Result<Box<dyn NativeSigner>, SdkError> {
        Ok(Box::new(MockNativeSignerB {
            keypair: self.keypair.insecure_clone(),
            network: self.network.clone(),
            atomic_fails: self.atomic_fails,
            cancel_signing: self.cancel_signing,
        }))
    }

    async fn logout(&self) -> Result<(), SdkError> {
        *self.user.lock().unwrap() = None;
        Ok(())
    }
}

/// Native signer for the second embedded SDK mock. The sign path insists on
/// a fully formed draft, mirroring an SDK that refuses to fill in fields.
pub struct MockNativeSignerB {
    pub keypair: Keypair,
    pub network: Arc<MockNetwork>,
    pub atomic_fails: bool,
    pub cancel_signing: bool,
}

#[async_trait]
impl NativeSigner for MockNativeSignerB {
    async fn sign_and_send(&self, tx: &DecodedTransaction) -> Result<Signature, SdkError> {
        if self.cancel_signing {
            return Err(SdkError::Cancelled);
        }
        if self.atomic_fails {
            return Err(SdkError::Other("signAndSendTransaction not supported".into()));
        }

        let signed = self.sign(tx).await?;
        let bytes = signed
            .serialize()
            .map_err(|e| SdkError::Other(e.to_string()))?;
        self.network
            .send_raw_transaction(&bytes)
            .await
            .map_err(|e| SdkError::Other(e.to_string()))
    }

    async fn sign(&self, tx: &DecodedTransaction) -> Result<SignedTransaction, SdkError> {
        if self.cancel_signing {
            return Err(SdkError::Cancelled);
        }

        match tx {
            DecodedTransaction::Draft(draft) => {
                if !draft.is_complete() {
                    return Err(SdkError::Other(
                        "transaction missing feePayer or recentBlockhash".into(),
                    ));
                }
                let blockhash = draft.recent_blockhash.unwrap();
                let mut tx = draft
                    .compile()
                    .map_err(|e| SdkError::Other(e.to_string()))?;
                tx.sign(&[&self.keypair], blockhash);
                Ok(SignedTransaction::Legacy(tx))
            }
            DecodedTransaction::Legacy(tx) => {
                let mut tx = tx.clone();
                let blockhash = tx.message.recent_blockhash;
                tx.sign(&[&self.keypair], blockhash);
                Ok(SignedTransaction::Legacy(tx))
            }
            DecodedTransaction::Versioned(tx) => Ok(SignedTransaction::Versioned(tx.clone())),
        }
    }
}

// ---------------------------------------------------------------------------
// Credential service

pub struct MockCredentialService {
    pub valid_code: String,
    pub consumed: Mutex<HashSet<String>>,
    pub unavailable: bool,
}

impl MockCredentialService {
    pub fn new() -> Self {
        Self {
            valid_code: "123456".into(),
            consumed: Mutex::new(HashSet::new()),
            unavailable: false,
        }
    }
}

#[async_trait]
impl CredentialService for MockCredentialService {
    async fn init_challenge(
        &self,
        _otp_type: &str,
        _contact: &str,
    ) -> Result<ChallengeInit, AuthError> {
        if self.unavailable {
            return Err(AuthError::ProviderUnavailable("service down".into()));
        }
        Ok(ChallengeInit {
            otp_id: "c1".into(),
            organization_id: "o1".into(),
        })
    }

    async fn verify_challenge(
        &self,
        otp_id: &str,
        otp_code: &str,
        _organization_id: &str,
        _target_public_key: &str,
    ) -> Result<CredentialBundle, AuthError> {
        // One attempt burns the challenge server-side too.
        if !self.consumed.lock().unwrap().insert(otp_id.to_string()) {
            return Err(AuthError::CredentialRejected("challenge expired".into()));
        }
        if otp_code != self.valid_code {
            return Err(AuthError::CredentialRejected("wrong code".into()));
        }
        Ok(CredentialBundle("bundle".into()))
    }

    async fn oauth_token(
        &self,
        _oidc_token: &str,
        _provider_name: &str,
        _target_public_key: &str,
    ) -> Result<CredentialBundle, AuthError> {
        if self.unavailable {
            return Err(AuthError::ProviderUnavailable("service down".into()));
        }
        Ok(CredentialBundle("bundle".into()))
    }
}

// ---------------------------------------------------------------------------
// External wallet app

pub struct MockAuthorizer {
    pub keypair: Keypair,
    pub cancel: bool,
    pub base64_address: bool,
    pub fail_deauthorize: bool,
}

impl MockAuthorizer {
    pub fn new() -> Self {
        Self {
            keypair: Keypair::new(),
            cancel: false,
            base64_address: true,
            fail_deauthorize: false,
        }
    }

    pub fn address(&self) -> String {
        self.keypair.pubkey().to_string()
    }
}

#[async_trait]
impl ExternalAuthorizer for MockAuthorizer {
    async fn authorize(
        &self,
        _cluster: &str,
        _identity: &AppIdentity,
    ) -> Result<Vec<AuthorizedAccount>, SdkError> {
        if self.cancel {
            return Err(SdkError::Cancelled);
        }

        use base64::engine::general_purpose::STANDARD;
        use base64::Engine;

        let address = if self.base64_address {
            STANDARD.encode(self.keypair.pubkey().to_bytes())
        } else {
            self.address()
        };

        Ok(vec![AuthorizedAccount { address }])
    }

    async fn deauthorize(&self) -> Result<(), SdkError> {
        if self.fail_deauthorize {
            return Err(SdkError::Network("session endpoint unreachable".into()));
        }
        Ok(())
    }
}
