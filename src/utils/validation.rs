use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use solana_sdk::pubkey::Pubkey;
use tracing::warn;

/// Address parsing and validation helpers shared by the provider adapters.
pub struct AddressCodec;

impl AddressCodec {
    /// Validates a base58 Solana address: expected length band and a decode
    /// to exactly 32 bytes.
    pub fn validate(address: &str) -> bool {
        if address.len() < 32 || address.len() > 44 {
            return false;
        }

        match bs58::decode(address).into_vec() {
            Ok(bytes) => bytes.len() == 32,
            Err(_) => false,
        }
    }

    /// Parses an account identifier that may arrive base58- or
    /// base64-encoded. External wallet protocols on some platforms return
    /// base64; base58 is tried first since it is the canonical form.
    pub fn from_flexible(raw: &str) -> Option<Pubkey> {
        if let Ok(bytes) = bs58::decode(raw).into_vec() {
            if let Ok(key) = Pubkey::try_from(bytes.as_slice()) {
                return Some(key);
            }
        }

        if let Ok(bytes) = STANDARD.decode(raw) {
            if let Ok(key) = Pubkey::try_from(bytes.as_slice()) {
                return Some(key);
            }
        }

        None
    }

    /// Converts a hex-encoded public key (as issued by the remote key
    /// service) into a base58 address.
    ///
    /// When the input is not valid 32-byte hex, falls back to a
    /// deterministic mapping so the same input always yields the same
    /// address: each character's code point taken modulo 256, first 32
    /// bytes, zero-padded.
    pub fn from_hex_key(hex_key: &str) -> Pubkey {
        let trimmed = hex_key.trim_start_matches("0x");

        if let Ok(bytes) = hex::decode(trimmed) {
            if bytes.len() == 32 {
                let mut array = [0u8; 32];
                array.copy_from_slice(&bytes);
                return Pubkey::new_from_array(array);
            }
        }

        warn!(len = hex_key.len(), "hex key not a 32-byte value, deriving fallback address");

        let mut array = [0u8; 32];
        for (slot, ch) in array.iter_mut().zip(hex_key.chars()) {
            *slot = (ch as u32 % 256) as u8;
        }
        Pubkey::new_from_array(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use solana_sdk::signature::{Keypair, Signer as _};

    #[test]
    fn test_validate_accepts_real_address() {
        let address = Keypair::new().pubkey().to_string();
        assert!(AddressCodec::validate(&address));
    }

    #[test]
    fn test_validate_rejects_garbage() {
        assert!(!AddressCodec::validate(""));
        assert!(!AddressCodec::validate("short"));
        assert!(!AddressCodec::validate("0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl0OIl"));
        assert!(!AddressCodec::validate(&"A".repeat(50)));
    }

    #[test]
    fn test_from_flexible_base58() {
        let key = Keypair::new().pubkey();
        assert_eq!(AddressCodec::from_flexible(&key.to_string()), Some(key));
    }

    #[test]
    fn test_from_flexible_base64_fallback() {
        let key = Keypair::new().pubkey();
        let encoded = STANDARD.encode(key.to_bytes());
        assert_eq!(AddressCodec::from_flexible(&encoded), Some(key));
    }

    #[test]
    fn test_from_flexible_rejects_invalid() {
        assert_eq!(AddressCodec::from_flexible("not-an-address!!"), None);
    }

    #[test]
    fn test_from_hex_key_round_trip() {
        let key = Keypair::new().pubkey();
        let hex_key = hex::encode(key.to_bytes());
        assert_eq!(AddressCodec::from_hex_key(&hex_key), key);
        assert_eq!(AddressCodec::from_hex_key(&format!("0x{hex_key}")), key);
    }

    #[test]
    fn test_from_hex_key_fallback_is_deterministic() {
        let first = AddressCodec::from_hex_key("not hex at all");
        let second = AddressCodec::from_hex_key("not hex at all");
        assert_eq!(first, second);

        let other = AddressCodec::from_hex_key("different input");
        assert_ne!(first, other);
    }
}
