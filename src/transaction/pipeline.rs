use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use solana_sdk::signature::Signature;
use tracing::{debug, info, instrument, warn};

use crate::errors::PipelineError;
use crate::providers::AdapterRegistry;
use crate::rpc::Network;
use crate::transaction::descriptor::TransactionDescriptor;
use crate::transaction::signer::{SignerRequest, SignerResponse};
use crate::wallet::WalletHandle;

/// Status messages are free-form progress text, except that anything
/// error-shaped is collapsed to a single generic line before reaching the
/// caller's UI.
pub type StatusCallback = Arc<dyn Fn(&str) + Send + Sync>;

const GENERIC_FAILURE_STATUS: &str = "transaction failed";

#[derive(Clone)]
pub struct SendOptions {
    /// Wait for confirmed commitment after submission.
    pub confirm: bool,
    pub max_confirm_attempts: u32,
    pub confirm_delay: Duration,
    pub on_status: Option<StatusCallback>,
}

impl Default for SendOptions {
    fn default() -> Self {
        Self {
            confirm: true,
            max_confirm_attempts: 3,
            confirm_delay: Duration::from_secs(2),
            on_status: None,
        }
    }
}

/// Provider-agnostic signing and submission front door. Resolves a signer
/// through the adapter registry, drives it, and optionally waits for
/// confirmation within bounded retries.
pub struct TransactionPipeline {
    adapters: AdapterRegistry,
    network: Arc<dyn Network>,
}

impl TransactionPipeline {
    pub fn new(adapters: AdapterRegistry, network: Arc<dyn Network>) -> Self {
        Self { adapters, network }
    }

    /// Signs and submits a transaction for the given wallet, returning the
    /// network signature. The descriptor is never mutated.
    #[instrument(skip(self, descriptor, options), fields(provider = %handle.provider(), address = %handle.address()))]
    pub async fn sign_and_send(
        &self,
        handle: &WalletHandle,
        descriptor: &TransactionDescriptor,
        options: &SendOptions,
    ) -> Result<Signature, PipelineError> {
        let reporter = StatusReporter::new(options.on_status.clone());
        reporter.report("preparing transaction");

        let adapter = self.adapters.get(handle.provider()).ok_or_else(|| {
            PipelineError::SignerUnavailable(format!(
                "no adapter registered for provider {}",
                handle.provider()
            ))
        })?;

        let signer = adapter.signer(handle).await.map_err(PipelineError::from)?;

        reporter.report("requesting signature");
        let response = signer
            .request(SignerRequest::SignAndSendTransaction { descriptor })
            .await
            .map_err(|err| {
                reporter.report_failure(&err.to_string());
                PipelineError::from(err)
            })?;

        let signature = match response {
            SignerResponse::Submitted(signature) => signature,
            SignerResponse::Signed(_) => {
                // The signer contract for sign-and-send is submission; a
                // signed-only response means the provider broke it.
                reporter.report_failure("signer did not submit");
                return Err(PipelineError::SubmissionFailed {
                    message: "signer returned a signed transaction without submitting it"
                        .to_string(),
                    logs: None,
                });
            }
        };

        info!(%signature, "transaction submitted");
        reporter.report("transaction submitted");

        if options.confirm {
            self.confirm(&signature, options, &reporter).await?;
            reporter.report("transaction confirmed");
        }

        Ok(signature)
    }

    async fn confirm(
        &self,
        signature: &Signature,
        options: &SendOptions,
        reporter: &StatusReporter,
    ) -> Result<(), PipelineError> {
        let attempts = options.max_confirm_attempts.max(1);

        for attempt in 1..=attempts {
            reporter.report("awaiting confirmation");

            match self.network.is_confirmed(signature).await {
                Ok(true) => {
                    debug!(%signature, attempt, "confirmed");
                    return Ok(());
                }
                Ok(false) => debug!(%signature, attempt, "not yet confirmed"),
                Err(err) => warn!(%signature, attempt, error = %err, "confirmation probe failed"),
            }

            if attempt < attempts {
                tokio::time::sleep(options.confirm_delay).await;
            }
        }

        reporter.report_failure("confirmation timed out");
        Err(PipelineError::ConfirmationTimeout(signature.to_string()))
    }
}

/// Wraps the caller's status callback: panics inside the callback are
/// swallowed, and raw error text never reaches the UI.
struct StatusReporter {
    callback: Option<StatusCallback>,
}

impl StatusReporter {
    fn new(callback: Option<StatusCallback>) -> Self {
        Self { callback }
    }

    fn report(&self, status: &str) {
        self.emit(filter_status(status));
    }

    fn report_failure(&self, detail: &str) {
        debug!(detail, "reporting failure status");
        self.emit(GENERIC_FAILURE_STATUS);
    }

    fn emit(&self, status: &str) {
        let Some(callback) = &self.callback else {
            return;
        };

        if catch_unwind(AssertUnwindSafe(|| callback(status))).is_err() {
            warn!("status callback panicked");
        }
    }
}

/// Collapses error-shaped status text to the generic failure line.
fn filter_status(status: &str) -> &str {
    let lowered = status.to_lowercase();
    if lowered.contains("error") || lowered.contains("fail") || lowered.contains("reject") {
        GENERIC_FAILURE_STATUS
    } else {
        status
    }
}
