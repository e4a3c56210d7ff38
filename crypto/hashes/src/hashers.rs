use crate::{Hash, HASH_SIZE};
use sha2::{Digest, Sha256};

pub trait HasherBase {
    fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self;
}

pub trait Hasher: HasherBase + Clone + Default {
    fn finalize(self) -> Hash;

    fn reset(&mut self);

    #[inline(always)]
    fn hash<A: AsRef<[u8]>>(data: A) -> Hash {
        let mut hasher = Self::default();
        hasher.update(data);
        hasher.finalize()
    }
}

macro_rules! blake2b_hasher {
    ($(struct $name:ident => $domain_sep:literal),+ $(,)? ) => {$(
        /// BLAKE2b-256 keyed with a fixed domain separation string.
        #[derive(Clone)]
        pub struct $name(blake2b_simd::State);

        impl $name {
            #[inline(always)]
            pub fn new() -> Self {
                Self(blake2b_simd::Params::new().hash_length(HASH_SIZE).key($domain_sep).to_state())
            }

            pub const DOMAIN: &'static [u8] = $domain_sep;
        }

        impl Default for $name {
            #[inline(always)]
            fn default() -> Self {
                Self::new()
            }
        }

        impl HasherBase for $name {
            #[inline(always)]
            fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self {
                self.0.update(data.as_ref());
                self
            }
        }

        impl Hasher for $name {
            #[inline(always)]
            fn finalize(self) -> Hash {
                let mut out = [0u8; HASH_SIZE];
                out.copy_from_slice(self.0.finalize().as_bytes());
                Hash::from_bytes(out)
            }

            #[inline(always)]
            fn reset(&mut self) {
                *self = Self::new();
            }
        }
    )*};
}

blake2b_hasher! {
    struct TransactionHash => b"TransactionHash",
    struct TransactionID => b"TransactionID",
    struct TransactionSigningHash => b"TransactionSigningHash",
}

/// `sha256(sha256("TransactionSigningHashECDSA") || data)`, the digest that ECDSA signers sign.
#[derive(Clone)]
pub struct TransactionSigningHashECDSA(Sha256);

impl TransactionSigningHashECDSA {
    const DOMAIN: &'static [u8] = b"TransactionSigningHashECDSA";
    const DOMAIN_HASH: [u8; HASH_SIZE] = sha2_const_stable::Sha256::new().update(Self::DOMAIN).finalize();

    #[inline(always)]
    pub fn new() -> Self {
        let mut state = Sha256::new();
        state.update(Self::DOMAIN_HASH);
        Self(state)
    }
}

impl Default for TransactionSigningHashECDSA {
    #[inline(always)]
    fn default() -> Self {
        Self::new()
    }
}

impl HasherBase for TransactionSigningHashECDSA {
    #[inline(always)]
    fn update<A: AsRef<[u8]>>(&mut self, data: A) -> &mut Self {
        self.0.update(data.as_ref());
        self
    }
}

impl Hasher for TransactionSigningHashECDSA {
    #[inline(always)]
    fn finalize(self) -> Hash {
        Hash::from_bytes(self.0.finalize().into())
    }

    #[inline(always)]
    fn reset(&mut self) {
        *self = Self::new();
    }
}
