//!
//! The signing boundary. The engine hands out digests and receives raw signatures,
//! it never holds key material itself.
//!

use crate::imports::*;
use crate::krc20::COMPRESSED_PUBLIC_KEY_SIZE;
use secp256k1::{Message, PublicKey, SECP256K1, SecretKey};

/// Signs transaction digests on behalf of the wallet.
#[async_trait]
pub trait Signer: Send + Sync {
    /// Returns one signature per digest, in order: compact `r || s` for ECDSA keys,
    /// without a recovery id or sighash type.
    async fn sign(&self, hashes: &[Hash], public_key: &[u8]) -> Result<Vec<Vec<u8>>>;
}

/// Compresses a secp256k1 public key. Some wallets report keys in the 65-byte
/// uncompressed form, while scripts and addresses use the 33-byte form.
pub fn compress_public_key(public_key: &[u8]) -> Result<[u8; COMPRESSED_PUBLIC_KEY_SIZE]> {
    PublicKey::from_slice(public_key).map(|key| key.serialize()).map_err(|_| Error::InvalidPublicKey)
}

/// A [`Signer`] holding a secp256k1 secret key in memory. Signatures are deterministic (RFC 6979).
pub struct KeypairSigner {
    secret_key: SecretKey,
    public_key: [u8; COMPRESSED_PUBLIC_KEY_SIZE],
}

impl KeypairSigner {
    pub fn new(secret_key: SecretKey) -> Self {
        let public_key = secret_key.public_key(SECP256K1).serialize();
        Self { secret_key, public_key }
    }

    pub fn try_from_slice(secret_key: &[u8]) -> Result<Self> {
        Ok(Self::new(SecretKey::from_slice(secret_key)?))
    }

    pub fn public_key(&self) -> &[u8; COMPRESSED_PUBLIC_KEY_SIZE] {
        &self.public_key
    }

    pub fn sign_hash(&self, hash: &Hash) -> Result<Vec<u8>> {
        let message = Message::from_digest_slice(&hash.as_bytes())?;
        Ok(SECP256K1.sign_ecdsa(&message, &self.secret_key).serialize_compact().to_vec())
    }
}

#[async_trait]
impl Signer for KeypairSigner {
    async fn sign(&self, hashes: &[Hash], public_key: &[u8]) -> Result<Vec<Vec<u8>>> {
        if compress_public_key(public_key)? != self.public_key {
            return Err(Error::InvalidPublicKey);
        }
        hashes.iter().map(|hash| self.sign_hash(hash)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secp256k1::ecdsa::Signature;

    fn hex(s: &str) -> Vec<u8> {
        let mut bytes = vec![0u8; s.len() / 2];
        faster_hex::hex_decode(s.as_bytes(), &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_compress_public_key() {
        let compressed = hex("03401b9e9d698388da082f3692b10d40b7a846c5f15f2a29e63e11f5647bd01deb");
        let key = PublicKey::from_slice(&compressed).unwrap();
        let uncompressed = key.serialize_uncompressed();

        assert_eq!(compress_public_key(&uncompressed).unwrap().as_slice(), compressed.as_slice());
        assert_eq!(compress_public_key(&compressed).unwrap().as_slice(), compressed.as_slice());
        assert!(matches!(compress_public_key(&compressed[1..]), Err(Error::InvalidPublicKey)));
        assert!(matches!(compress_public_key(&[0u8; 33]), Err(Error::InvalidPublicKey)));
    }

    #[tokio::test]
    async fn test_keypair_signer() {
        let signer = KeypairSigner::try_from_slice(&[7u8; 32]).unwrap();
        let hashes = [Hash::from_bytes([1u8; 32]), Hash::from_bytes([2u8; 32])];
        let signatures = signer.sign(&hashes, signer.public_key()).await.unwrap();
        assert_eq!(signatures.len(), 2);

        let public_key = PublicKey::from_slice(signer.public_key()).unwrap();
        for (hash, signature) in hashes.iter().zip(signatures.iter()) {
            assert_eq!(signature.len(), 64);
            let message = Message::from_digest_slice(&hash.as_bytes()).unwrap();
            let signature = Signature::from_compact(signature).unwrap();
            SECP256K1.verify_ecdsa(&message, &signature, &public_key).unwrap();
        }

        // deterministic nonces
        assert_eq!(signer.sign(&hashes, signer.public_key()).await.unwrap(), signatures);

        let other = KeypairSigner::try_from_slice(&[8u8; 32]).unwrap();
        assert!(matches!(signer.sign(&hashes, other.public_key()).await, Err(Error::InvalidPublicKey)));
        assert!(matches!(KeypairSigner::try_from_slice(&[0u8; 32]), Err(Error::Secp256k1(_))));
    }
}
