use thiserror::Error;

pub type Result<T, E = CoreError> = std::result::Result<T, E>;

/// Failures produced by a provider adapter during the login life-cycle.
///
/// Adapters classify every raw SDK/transport failure into one of these
/// variants before it crosses the adapter boundary; the orchestrator never
/// inspects provider-specific error shapes.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The user backed out of the flow. Never shown as an alert.
    #[error("login cancelled by user")]
    UserCancelled,

    /// Transport failure or timeout while talking to the provider.
    #[error("network error: {0}")]
    Network(String),

    /// The provider back-end is unreachable or not initialized.
    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// Bad or expired OTP, rejected OAuth token, malformed credentials.
    #[error("credentials rejected: {0}")]
    CredentialRejected(String),

    /// SDK-internal failure (e.g. a wallet-creation race that could not be
    /// recovered).
    #[error("provider error: {0}")]
    Provider(String),
}

impl AuthError {
    /// Whether this error may be surfaced to the user as an alert.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, AuthError::UserCancelled)
    }
}

/// Failures produced while resolving or driving a [`Signer`].
///
/// [`Signer`]: crate::transaction::Signer
#[derive(Debug, Clone, Error)]
pub enum SignerError {
    #[error("wallet not connected")]
    NotConnected,

    #[error("unsupported operation: {0}")]
    Unsupported(String),

    #[error("provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The user declined the signing request in the provider UI.
    #[error("user rejected the signing request")]
    UserRejected,

    #[error("signing failed: {0}")]
    Signing(String),

    /// The network refused the submitted transaction. Carries simulation
    /// logs when the RPC error exposes them.
    #[error("submission failed: {message}")]
    Submission {
        message: String,
        logs: Option<Vec<String>>,
    },
}

/// Terminal errors reported by the transaction pipeline to its caller.
#[derive(Debug, Clone, Error)]
pub enum PipelineError {
    #[error("no signer available: {0}")]
    SignerUnavailable(String),

    #[error("user rejected the transaction")]
    UserRejected,

    #[error("transaction submission failed: {message}")]
    SubmissionFailed {
        message: String,
        logs: Option<Vec<String>>,
    },

    #[error("confirmation timed out for signature {0}")]
    ConfirmationTimeout(String),

    #[error("invalid transaction descriptor: {0}")]
    InvalidDescriptor(String),
}

impl From<SignerError> for PipelineError {
    fn from(err: SignerError) -> Self {
        match err {
            SignerError::NotConnected => {
                PipelineError::SignerUnavailable("wallet not connected".to_string())
            }
            SignerError::Unsupported(msg) | SignerError::ProviderUnavailable(msg) => {
                PipelineError::SignerUnavailable(msg)
            }
            SignerError::UserRejected => PipelineError::UserRejected,
            SignerError::Signing(msg) => PipelineError::SubmissionFailed {
                message: msg,
                logs: None,
            },
            SignerError::Submission { message, logs } => {
                PipelineError::SubmissionFailed { message, logs }
            }
        }
    }
}

/// Session-store failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("session store io: {0}")]
    Io(#[from] std::io::Error),

    #[error("session store codec: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Umbrella error for crate-level entry points.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Signer(#[from] SignerError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("configuration error: {0}")]
    Config(String),
}
