mod descriptor;
mod pipeline;
mod signer;

pub use descriptor::{DecodedTransaction, LegacyDraft, SignedTransaction, TransactionDescriptor};
pub use pipeline::{SendOptions, StatusCallback, TransactionPipeline};
pub use signer::{Signer, SignerRequest, SignerResponse};
