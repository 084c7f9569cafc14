use std::time::Duration;

use async_trait::async_trait;
use solana_client::client_error::{ClientError, ClientErrorKind};
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_client::rpc_request::{RpcError, RpcResponseErrorData};
use solana_sdk::commitment_config::CommitmentConfig;
use solana_sdk::hash::Hash;
use solana_sdk::signature::Signature;
use solana_sdk::transaction::{Transaction, VersionedTransaction};
use tracing::debug;

use crate::errors::SignerError;
use crate::rpc::Network;

/// [`Network`] implementation backed by a Solana JSON-RPC endpoint at
/// confirmed commitment.
pub struct RpcNetwork {
    client: RpcClient,
}

impl RpcNetwork {
    pub fn new(rpc_url: &str) -> Self {
        let client = RpcClient::new_with_timeout_and_commitment(
            rpc_url.to_string(),
            Duration::from_secs(30),
            CommitmentConfig::confirmed(),
        );
        Self { client }
    }

    fn classify(err: ClientError) -> SignerError {
        if let ClientErrorKind::RpcError(RpcError::RpcResponseError {
            data: RpcResponseErrorData::SendTransactionPreflightFailure(sim),
            message,
            ..
        }) = &err.kind
        {
            return SignerError::Submission {
                message: message.clone(),
                logs: sim.logs.clone(),
            };
        }

        SignerError::Submission {
            message: err.to_string(),
            logs: None,
        }
    }
}

#[async_trait]
impl Network for RpcNetwork {
    async fn latest_blockhash(&self) -> Result<Hash, SignerError> {
        self.client
            .get_latest_blockhash()
            .await
            .map_err(|e| SignerError::ProviderUnavailable(format!("blockhash fetch failed: {e}")))
    }

    async fn send_raw_transaction(&self, bytes: &[u8]) -> Result<Signature, SignerError> {
        // Versioned and legacy transactions arrive on the same path; the
        // byte prefix decides which shape deserializes.
        if let Ok(tx) = bincode::deserialize::<VersionedTransaction>(bytes) {
            debug!(size = bytes.len(), "submitting versioned transaction");
            return self.client.send_transaction(&tx).await.map_err(Self::classify);
        }

        let tx: Transaction = bincode::deserialize(bytes).map_err(|e| SignerError::Submission {
            message: format!("unrecognized transaction bytes: {e}"),
            logs: None,
        })?;
        debug!(size = bytes.len(), "submitting legacy transaction");
        self.client.send_transaction(&tx).await.map_err(Self::classify)
    }

    async fn is_confirmed(&self, signature: &Signature) -> Result<bool, SignerError> {
        let statuses = self
            .client
            .get_signature_statuses(&[*signature])
            .await
            .map_err(|e| SignerError::ProviderUnavailable(format!("status fetch failed: {e}")))?;

        Ok(statuses
            .value
            .first()
            .and_then(|status| status.as_ref())
            .map(|status| status.satisfies_commitment(CommitmentConfig::confirmed()))
            .unwrap_or(false))
    }
}
