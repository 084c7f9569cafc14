use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use solana_sdk::hash::Hash;
use solana_sdk::instruction::Instruction;
use solana_sdk::message::{Message, VersionedMessage};
use solana_sdk::pubkey::Pubkey;
use solana_sdk::transaction::{Transaction, VersionedTransaction};

use crate::errors::PipelineError;

/// Caller-facing description of a transaction to sign. Descriptors are
/// immutable inputs; signers work on decoded copies and never write back.
#[derive(Debug, Clone)]
pub enum TransactionDescriptor {
    /// An instruction list plus optional fee payer and blockhash. Missing
    /// fields are filled in by the signer at signing time.
    Raw(LegacyDraft),

    /// A base64-encoded serialized transaction, versioned or legacy.
    Base64(String),

    /// An already-built versioned transaction.
    Versioned(VersionedTransaction),
}

/// A legacy transaction that may not yet have a fee payer or blockhash.
#[derive(Debug, Clone, Default)]
pub struct LegacyDraft {
    pub instructions: Vec<Instruction>,
    pub fee_payer: Option<Pubkey>,
    pub recent_blockhash: Option<Hash>,
}

impl LegacyDraft {
    pub fn new(instructions: Vec<Instruction>) -> Self {
        Self {
            instructions,
            fee_payer: None,
            recent_blockhash: None,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.fee_payer.is_some() && self.recent_blockhash.is_some()
    }

    /// Compiles the draft into an unsigned legacy transaction. Requires the
    /// fee payer and blockhash to be present.
    pub fn compile(&self) -> Result<Transaction, PipelineError> {
        let fee_payer = self
            .fee_payer
            .ok_or_else(|| PipelineError::InvalidDescriptor("draft is missing a fee payer".into()))?;
        let blockhash = self.recent_blockhash.ok_or_else(|| {
            PipelineError::InvalidDescriptor("draft is missing a recent blockhash".into())
        })?;

        let message = Message::new_with_blockhash(&self.instructions, Some(&fee_payer), &blockhash);
        Ok(Transaction::new_unsigned(message))
    }
}

/// A descriptor decoded into a concrete in-memory form, ready for a signer.
#[derive(Debug, Clone)]
pub enum DecodedTransaction {
    Draft(LegacyDraft),
    Legacy(Transaction),
    Versioned(VersionedTransaction),
}

impl TransactionDescriptor {
    /// Decodes the descriptor without mutating it. Base64 payloads are
    /// tried as versioned transactions first; legacy payloads deserialize
    /// through the versioned envelope and are unwrapped back to legacy.
    pub fn decode(&self) -> Result<DecodedTransaction, PipelineError> {
        match self {
            TransactionDescriptor::Raw(draft) => {
                if draft.instructions.is_empty() {
                    return Err(PipelineError::InvalidDescriptor(
                        "draft contains no instructions".into(),
                    ));
                }
                Ok(DecodedTransaction::Draft(draft.clone()))
            }
            TransactionDescriptor::Versioned(tx) => Ok(DecodedTransaction::Versioned(tx.clone())),
            TransactionDescriptor::Base64(encoded) => {
                let bytes = STANDARD.decode(encoded).map_err(|e| {
                    PipelineError::InvalidDescriptor(format!("invalid base64 payload: {e}"))
                })?;
                Self::decode_bytes(&bytes)
            }
        }
    }

    fn decode_bytes(bytes: &[u8]) -> Result<DecodedTransaction, PipelineError> {
        if let Ok(versioned) = bincode::deserialize::<VersionedTransaction>(bytes) {
            return Ok(match versioned.message {
                VersionedMessage::Legacy(message) => DecodedTransaction::Legacy(Transaction {
                    signatures: versioned.signatures,
                    message,
                }),
                message @ VersionedMessage::V0(_) => {
                    DecodedTransaction::Versioned(VersionedTransaction {
                        signatures: versioned.signatures,
                        message,
                    })
                }
            });
        }

        bincode::deserialize::<Transaction>(bytes)
            .map(DecodedTransaction::Legacy)
            .map_err(|e| {
                PipelineError::InvalidDescriptor(format!("unrecognized transaction bytes: {e}"))
            })
    }
}

/// A fully signed transaction ready for wire submission.
#[derive(Debug, Clone)]
pub enum SignedTransaction {
    Legacy(Transaction),
    Versioned(VersionedTransaction),
}

impl SignedTransaction {
    pub fn serialize(&self) -> Result<Vec<u8>, PipelineError> {
        let bytes = match self {
            SignedTransaction::Legacy(tx) => bincode::serialize(tx),
            SignedTransaction::Versioned(tx) => bincode::serialize(tx),
        };
        bytes.map_err(|e| PipelineError::InvalidDescriptor(format!("serialization failed: {e}")))
    }

    /// Whether every required signature slot carries a non-default
    /// signature.
    pub fn is_signed(&self) -> bool {
        let signatures = match self {
            SignedTransaction::Legacy(tx) => &tx.signatures,
            SignedTransaction::Versioned(tx) => &tx.signatures,
        };
        !signatures.is_empty() && signatures.iter().all(|sig| *sig != Default::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::{Keypair, Signer as _};
    use solana_sdk::system_instruction;

    fn sample_draft() -> (Keypair, LegacyDraft) {
        let payer = Keypair::new();
        let instruction = system_instruction::transfer(&payer.pubkey(), &Pubkey::new_unique(), 1);
        (payer, LegacyDraft::new(vec![instruction]))
    }

    #[test]
    fn test_draft_compile_requires_fee_payer_and_blockhash() {
        let (_, draft) = sample_draft();
        assert!(!draft.is_complete());
        assert!(draft.compile().is_err());
    }

    #[test]
    fn test_draft_compile_complete() {
        let (payer, mut draft) = sample_draft();
        draft.fee_payer = Some(payer.pubkey());
        draft.recent_blockhash = Some(Hash::new_unique());

        let tx = draft.compile().unwrap();
        assert_eq!(tx.message.account_keys[0], payer.pubkey());
    }

    #[test]
    fn test_decode_base64_legacy() {
        let (payer, mut draft) = sample_draft();
        draft.fee_payer = Some(payer.pubkey());
        let blockhash = Hash::new_unique();
        draft.recent_blockhash = Some(blockhash);

        let mut tx = draft.compile().unwrap();
        tx.sign(&[&payer], blockhash);
        let encoded = STANDARD.encode(bincode::serialize(&tx).unwrap());

        match TransactionDescriptor::Base64(encoded).decode().unwrap() {
            DecodedTransaction::Legacy(decoded) => assert_eq!(decoded, tx),
            other => panic!("expected legacy, got {other:?}"),
        }
    }

    #[test]
    fn test_decode_base64_rejects_garbage() {
        let err = TransactionDescriptor::Base64("@@@".into()).decode().unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDescriptor(_)));

        let err = TransactionDescriptor::Base64(STANDARD.encode(b"nonsense"))
            .decode()
            .unwrap_err();
        assert!(matches!(err, PipelineError::InvalidDescriptor(_)));
    }

    #[test]
    fn test_decode_empty_draft_rejected() {
        let descriptor = TransactionDescriptor::Raw(LegacyDraft::default());
        assert!(descriptor.decode().is_err());
    }

    #[test]
    fn test_signed_transaction_detects_missing_signatures() {
        let (payer, mut draft) = sample_draft();
        draft.fee_payer = Some(payer.pubkey());
        let blockhash = Hash::new_unique();
        draft.recent_blockhash = Some(blockhash);

        let mut tx = draft.compile().unwrap();
        assert!(!SignedTransaction::Legacy(tx.clone()).is_signed());

        tx.sign(&[&payer], blockhash);
        assert!(SignedTransaction::Legacy(tx).is_signed());
    }
}
