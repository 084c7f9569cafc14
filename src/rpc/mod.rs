mod client;

pub use client::RpcNetwork;

use async_trait::async_trait;
use solana_sdk::hash::Hash;
use solana_sdk::signature::Signature;

use crate::errors::SignerError;

/// Narrow view of the Solana RPC surface the signing paths need. Kept as a
/// trait so tests can substitute an in-memory network.
#[async_trait]
pub trait Network: Send + Sync {
    async fn latest_blockhash(&self) -> Result<Hash, SignerError>;

    /// Submits pre-serialized transaction bytes and returns the signature.
    async fn send_raw_transaction(&self, bytes: &[u8]) -> Result<Signature, SignerError>;

    /// Whether the signature has reached confirmed commitment.
    async fn is_confirmed(&self, signature: &Signature) -> Result<bool, SignerError>;
}
