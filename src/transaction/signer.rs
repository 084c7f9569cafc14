use async_trait::async_trait;
use solana_sdk::signature::Signature;

use crate::errors::SignerError;
use crate::transaction::descriptor::{SignedTransaction, TransactionDescriptor};

/// A request handed to a provider-backed signer.
#[derive(Debug, Clone)]
pub enum SignerRequest<'a> {
    /// Sign only; the caller submits the bytes itself.
    SignTransaction { descriptor: &'a TransactionDescriptor },

    /// Sign and submit in one step, returning the network signature.
    SignAndSendTransaction { descriptor: &'a TransactionDescriptor },
}

#[derive(Debug, Clone)]
pub enum SignerResponse {
    Signed(SignedTransaction),
    Submitted(Signature),
}

/// Uniform signing interface over every wallet provider. Each adapter
/// resolves one of these for its active session; the pipeline never learns
/// which provider is behind it.
#[async_trait]
pub trait Signer: Send + Sync {
    async fn request(&self, request: SignerRequest<'_>) -> Result<SignerResponse, SignerError>;
}
