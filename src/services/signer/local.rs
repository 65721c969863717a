use alloy::{
    consensus::{SignableTransaction, TxLegacy},
    network::TxSigner,
    primitives::{Address, FixedBytes},
    signers::{k256::ecdsa::SigningKey, local::LocalSigner as AlloyLocalSignerClient},
};
use async_trait::async_trait;

use super::{SignedTransaction, Signer, SignerError};
use crate::models::EvmTransactionData;

/// Signer holding a secp256k1 key in process memory.
pub struct LocalSigner {
    local_signer_client: AlloyLocalSignerClient<SigningKey>,
}

impl LocalSigner {
    /// Creates a signer from a hex-encoded 32-byte private key, with or
    /// without a `0x` prefix.
    pub fn from_hex_key(key: &str) -> Result<Self, SignerError> {
        let raw_key = hex::decode(key.trim().trim_start_matches("0x"))
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;

        if raw_key.len() != 32 {
            return Err(SignerError::InvalidKey(format!(
                "expected 32 key bytes, got {}",
                raw_key.len()
            )));
        }

        let key_bytes = FixedBytes::from_slice(&raw_key);
        let local_signer_client = AlloyLocalSignerClient::from_bytes(&key_bytes)
            .map_err(|e| SignerError::InvalidKey(e.to_string()))?;

        Ok(Self {
            local_signer_client,
        })
    }
}

#[async_trait]
impl Signer for LocalSigner {
    async fn address(&self) -> Result<Address, SignerError> {
        Ok(self.local_signer_client.address())
    }

    async fn sign_transaction(
        &self,
        tx: &EvmTransactionData,
    ) -> Result<SignedTransaction, SignerError> {
        let mut unsigned_tx = TxLegacy::try_from(tx)?;

        let signature = self
            .local_signer_client
            .sign_transaction(&mut unsigned_tx)
            .await
            .map_err(|e| SignerError::Signing(e.to_string()))?;

        let signed_tx = unsigned_tx.into_signed(signature);

        let mut raw = Vec::new();
        signed_tx.rlp_encode(&mut raw);

        Ok(SignedTransaction {
            hash: signed_tx.hash().to_string(),
            raw,
        })
    }
}
