//! Seam traits over the vendor SDKs the embedded and external providers
//! wrap. The adapters in this module's siblings contain all of the flow
//! logic; these traits carry only the calls the vendor libraries expose.

use async_trait::async_trait;
use solana_sdk::signature::Signature;

use crate::transaction::{DecodedTransaction, SignedTransaction, Signer};

/// Failure shape shared by the vendor SDK seams. Adapters classify these
/// into [`AuthError`] / [`SignerError`] variants at the boundary.
///
/// [`AuthError`]: crate::errors::AuthError
/// [`SignerError`]: crate::errors::SignerError
#[derive(Debug, Clone)]
pub enum SdkError {
    /// The user dismissed the vendor UI.
    Cancelled,
    Network(String),
    Unavailable(String),
    Rejected(String),
    Other(String),
}

impl SdkError {
    pub fn message(&self) -> &str {
        match self {
            SdkError::Cancelled => "cancelled",
            SdkError::Network(m)
            | SdkError::Unavailable(m)
            | SdkError::Rejected(m)
            | SdkError::Other(m) => m,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SdkUser {
    pub id: String,
}

/// Embedded-wallet state as reported by the first embedded SDK.
#[derive(Debug, Clone)]
pub enum EmbeddedWalletState {
    NotCreated,
    /// The wallet exists but its key material needs a recovery flow the
    /// vendor UI must drive.
    NeedsRecovery,
    Connected {
        address: String,
    },
}

#[derive(Debug, Clone)]
pub struct SdkWallet {
    pub id: String,
    pub address: String,
}

/// Parameters for wallet creation on the second embedded SDK. Some SDK
/// builds require every chain field to be explicit.
#[derive(Debug, Clone, Default)]
pub struct WalletCreateParams {
    pub chain: Option<String>,
    pub network: Option<String>,
    pub chain_id: Option<String>,
    pub chain_name: Option<String>,
}

impl WalletCreateParams {
    /// Fully explicit Solana parameters, used when a bare create is refused.
    pub fn explicit_solana(cluster: &str) -> Self {
        Self {
            chain: Some("solana".to_string()),
            network: Some(cluster.to_string()),
            chain_id: Some(format!("solana:{cluster}")),
            chain_name: Some("Solana".to_string()),
        }
    }
}

/// First embedded-wallet vendor SDK: OAuth or code-based login, one wallet
/// per user, explicit creation, native signing.
#[async_trait]
pub trait EmbeddedSdkA: Send + Sync {
    async fn login_oauth(&self, provider: &str) -> Result<SdkUser, SdkError>;
    async fn login(&self, method: &str, contact: &str, code: Option<&str>)
        -> Result<SdkUser, SdkError>;
    async fn current_user(&self) -> Option<SdkUser>;
    async fn wallet_state(&self) -> Result<EmbeddedWalletState, SdkError>;
    async fn create_wallet(&self) -> Result<SdkWallet, SdkError>;
    async fn native_signer(&self) -> Result<Box<dyn Signer>, SdkError>;
    async fn logout(&self) -> Result<(), SdkError>;
}

/// Second embedded-wallet vendor SDK: modal-driven auth that completes out
/// of band, multiple wallets per user with a primary, and a native signer
/// that prefers an atomic sign-and-send.
#[async_trait]
pub trait EmbeddedSdkB: Send + Sync {
    async fn open_auth_modal(&self) -> Result<(), SdkError>;
    async fn social_connect(&self, provider: &str) -> Result<(), SdkError>;
    async fn authenticated_user(&self) -> Option<SdkUser>;
    async fn primary_wallet(&self) -> Option<SdkWallet>;
    async fn user_wallets(&self) -> Vec<SdkWallet>;
    async fn create_wallet(&self, params: &WalletCreateParams) -> Result<SdkWallet, SdkError>;
    async fn set_primary(&self, wallet_id: &str) -> Result<(), SdkError>;
    async fn native_signer(&self, wallet: &SdkWallet) -> Result<Box<dyn NativeSigner>, SdkError>;
    async fn logout(&self) -> Result<(), SdkError>;
}

/// The second embedded SDK's signing surface.
#[async_trait]
pub trait NativeSigner: Send + Sync {
    /// Atomic sign-and-submit. May be refused by some SDK builds.
    async fn sign_and_send(&self, tx: &DecodedTransaction) -> Result<Signature, SdkError>;

    /// Sign only. Requires the transaction to be fully formed.
    async fn sign(&self, tx: &DecodedTransaction) -> Result<SignedTransaction, SdkError>;
}

/// Identity presented to an external wallet application during
/// authorization.
#[derive(Debug, Clone)]
pub struct AppIdentity {
    pub name: String,
    pub uri: String,
    pub icon: String,
}

#[derive(Debug, Clone)]
pub struct AuthorizedAccount {
    /// Account identifier as the external app returned it; may be base58 or
    /// base64.
    pub address: String,
}

/// Protocol seam to an external wallet application.
#[async_trait]
pub trait ExternalAuthorizer: Send + Sync {
    async fn authorize(
        &self,
        cluster: &str,
        identity: &AppIdentity,
    ) -> Result<Vec<AuthorizedAccount>, SdkError>;

    async fn deauthorize(&self) -> Result<(), SdkError>;
}
