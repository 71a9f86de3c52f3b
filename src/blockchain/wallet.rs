//! Signing identities and transaction signing.
//!
//! # Security
//! - Private keys come from the caller per dispatch and are never stored
//! - Keys are never logged or serialized; `Debug` output redacts them

use alloy::consensus::{SignableTransaction, TxEnvelope};
use alloy::eips::eip2718::Encodable2718;
use alloy::network::TxSignerSync;
use alloy::primitives::{Address, Bytes};
use alloy::signers::local::PrivateKeySigner;

use crate::blockchain::transaction::{RawTransaction, SignedTransaction};
use crate::blockchain::types::{BlockchainError, BlockchainResult};

/// Address plus the private key that controls it.
#[derive(Clone)]
pub struct SigningIdentity {
    /// `0x`-prefixed hex address.
    pub address: String,
    /// Hex private key, with or without `0x`.
    pub private_key: String,
}

impl SigningIdentity {
    pub fn new(address: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            private_key: private_key.into(),
        }
    }
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigningIdentity")
            .field("address", &self.address)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// A local signer checked against the address it claims to sign for.
#[derive(Debug, Clone)]
pub struct Wallet {
    signer: PrivateKeySigner,
}

impl Wallet {
    /// Create a wallet from a hex-encoded private key string.
    ///
    /// # Arguments
    /// * `private_key_hex` - Hex string (with or without 0x prefix)
    pub fn from_private_key(private_key_hex: &str) -> BlockchainResult<Self> {
        let key_hex = private_key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid private key format: {}", e)))?;

        Ok(Self { signer })
    }

    /// Create a wallet for `identity`, rejecting keys that do not control
    /// `identity.address`.
    pub fn from_identity(identity: &SigningIdentity) -> BlockchainResult<Self> {
        let claimed: Address = identity
            .address
            .trim()
            .parse()
            .map_err(|e| BlockchainError::Wallet(format!("Invalid signer address '{}': {}", identity.address, e)))?;

        let wallet = Self::from_private_key(&identity.private_key)?;
        if wallet.address() != claimed {
            return Err(BlockchainError::Wallet(format!(
                "Private key does not control address {}",
                claimed
            )));
        }
        Ok(wallet)
    }

    /// Get the wallet's address.
    pub fn address(&self) -> Address {
        self.signer.address()
    }

    /// Sign `tx` as an EIP-155 legacy transaction and encode it for broadcast.
    ///
    /// Takes the transaction by value; it cannot be reused after signing.
    pub fn sign_transaction(&self, tx: RawTransaction) -> BlockchainResult<SignedTransaction> {
        let nonce = tx.nonce;
        let mut legacy = tx.into_legacy();
        let signature = self
            .signer
            .sign_transaction_sync(&mut legacy)
            .map_err(|e| BlockchainError::Signing(e.to_string()))?;

        let signed = legacy.into_signed(signature);
        let hash = *signed.hash();
        let envelope = TxEnvelope::Legacy(signed);

        Ok(SignedTransaction {
            hash,
            nonce,
            raw: Bytes::from(envelope.encoded_2718()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::U256;

    // Well-known test private key (Anvil's first account)
    const TEST_PRIVATE_KEY: &str = "ac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TEST_ADDRESS: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";

    fn raw_tx(nonce: u64) -> RawTransaction {
        RawTransaction {
            to: Address::repeat_byte(0x22),
            nonce,
            gas_price: 0,
            gas_limit: 4_700_000,
            value: U256::ZERO,
            data: Bytes::from_static(&[0xde, 0xad, 0xbe, 0xef]),
            chain_id: 10,
        }
    }

    #[test]
    fn test_wallet_from_private_key() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        assert_eq!(
            wallet.address().to_string().to_lowercase(),
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266"
        );
    }

    #[test]
    fn test_wallet_with_0x_prefix() {
        let wallet = Wallet::from_private_key(&format!("0x{}", TEST_PRIVATE_KEY)).unwrap();
        assert_eq!(wallet.address(), TEST_ADDRESS.parse::<Address>().unwrap());
    }

    #[test]
    fn test_invalid_private_key() {
        let result = Wallet::from_private_key("invalid_key");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Invalid private key"));
    }

    #[test]
    fn test_identity_address_must_match_key() {
        let ok = SigningIdentity::new(TEST_ADDRESS.to_lowercase(), TEST_PRIVATE_KEY);
        assert!(Wallet::from_identity(&ok).is_ok());

        let wrong = SigningIdentity::new(Address::repeat_byte(0x01).to_string(), TEST_PRIVATE_KEY);
        let err = Wallet::from_identity(&wrong).unwrap_err();
        assert!(err.to_string().contains("does not control"));
    }

    #[test]
    fn test_debug_redacts_key() {
        let identity = SigningIdentity::new(TEST_ADDRESS, TEST_PRIVATE_KEY);
        let printed = format!("{identity:?}");
        assert!(!printed.contains(TEST_PRIVATE_KEY));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_sign_transaction() {
        let wallet = Wallet::from_private_key(TEST_PRIVATE_KEY).unwrap();
        let first = wallet.sign_transaction(raw_tx(0)).unwrap();
        let second = wallet.sign_transaction(raw_tx(1)).unwrap();

        assert_eq!(first.nonce, 0);
        assert!(!first.raw.is_empty());
        assert_ne!(first.hash, second.hash);

        // Deterministic signatures (RFC 6979)
        let again = wallet.sign_transaction(raw_tx(0)).unwrap();
        assert_eq!(first.raw, again.raw);
    }
}
