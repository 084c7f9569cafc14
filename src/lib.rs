//! Wallet-provider abstraction and transaction-signing core for a mobile
//! Solana application.
//!
//! Four wallet providers sit behind one [`WalletAdapter`] surface: two
//! embedded-wallet SDKs, a remote key service reached through a
//! credential-issuance back-end, and external wallet applications. The
//! [`AuthOrchestrator`] owns the login life-cycle and the single active
//! wallet; the [`TransactionPipeline`] signs and submits transactions
//! without knowing which provider is behind the wallet.

pub mod api;
pub mod auth;
pub mod errors;
pub mod providers;
pub mod rpc;
pub mod storage;
pub mod transaction;
pub mod utils;
pub mod wallet;

pub use auth::{AuthOrchestrator, AuthPhase, AuthSnapshot, LoginFlow};
pub use errors::{AuthError, CoreError, PipelineError, Result, SignerError};
pub use providers::{
    AdapterRegistry, AuthResult, Credentials, LoginMethod, OtpChallenge, ProviderKind,
    WalletAdapter,
};
pub use transaction::{SendOptions, TransactionDescriptor, TransactionPipeline};
pub use wallet::WalletHandle;
