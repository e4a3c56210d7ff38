mod hashers;

use borsh::{BorshDeserialize, BorshSerialize};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt::{Debug, Display, Formatter};
use std::str::{self, FromStr};

pub use hashers::*;

pub const HASH_SIZE: usize = 32;

pub const ZERO_HASH: Hash = Hash([0u8; HASH_SIZE]);

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash, Default, BorshSerialize, BorshDeserialize)]
pub struct Hash([u8; HASH_SIZE]);

impl Hash {
    #[inline(always)]
    pub const fn from_bytes(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }

    #[inline(always)]
    pub const fn as_bytes(&self) -> [u8; HASH_SIZE] {
        self.0
    }

    /// Builds a hash from a slice, returning `None` unless it is exactly [`HASH_SIZE`] bytes long.
    pub fn try_from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; HASH_SIZE]>::try_from(bytes).ok().map(Hash)
    }

    pub fn to_hex(&self) -> String {
        faster_hex::hex_string(&self.0)
    }
}

impl AsRef<[u8]> for Hash {
    #[inline(always)]
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl AsRef<[u8; HASH_SIZE]> for Hash {
    #[inline(always)]
    fn as_ref(&self) -> &[u8; HASH_SIZE] {
        &self.0
    }
}

impl From<[u8; HASH_SIZE]> for Hash {
    fn from(bytes: [u8; HASH_SIZE]) -> Self {
        Hash(bytes)
    }
}

impl Display for Hash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut hex = [0u8; HASH_SIZE * 2];
        faster_hex::hex_encode(&self.0, &mut hex).expect("The output is exactly twice the size of the input");
        f.write_str(str::from_utf8(&hex).expect("hex is always valid UTF-8"))
    }
}

impl Debug for Hash {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

impl FromStr for Hash {
    type Err = faster_hex::Error;

    fn from_str(hash_str: &str) -> Result<Self, Self::Err> {
        if hash_str.len() != HASH_SIZE * 2 {
            return Err(faster_hex::Error::InvalidLength(hash_str.len()));
        }
        let mut bytes = [0u8; HASH_SIZE];
        faster_hex::hex_decode(hash_str.as_bytes(), &mut bytes)?;
        Ok(Hash(bytes))
    }
}

impl Serialize for Hash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        if serializer.is_human_readable() { serializer.serialize_str(&self.to_hex()) } else { Serialize::serialize(&self.0, serializer) }
    }
}

impl<'de> Deserialize<'de> for Hash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = <Cow<'de, str> as Deserialize>::deserialize(deserializer)?;
            Hash::from_str(&s).map_err(serde::de::Error::custom)
        } else {
            Ok(Hash(<[u8; HASH_SIZE] as Deserialize>::deserialize(deserializer)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Hash;
    use std::str::FromStr;

    #[test]
    fn test_hash_basics() {
        let hash_str = "414f096361040f27e3ebfd02965c27d1492a69880dbf1544bf213e7159709134";
        let hash = Hash::from_str(hash_str).unwrap();
        assert_eq!(hash_str, hash.to_string());
        assert_eq!(hash, Hash::from_str(hash_str).unwrap());
        assert_ne!(hash, Hash::from_str("5f7deb4c490de237e0dcc9dae4216f80247a671ca30eaab411d2963c6e070113").unwrap());

        let odd_str = "414f096361040f27e3ebfd02965c27d1492a69880dbf1544bf213e715970913";
        let bad_char = "z14f096361040f27e3ebfd02965c27d1492a69880dbf1544bf213e7159709134";
        assert!(Hash::from_str(odd_str).is_err());
        assert!(Hash::from_str(bad_char).is_err());

        assert!(Hash::try_from_slice(&[0u8; 31]).is_none());
        assert_eq!(Hash::try_from_slice(&hash.as_bytes()), Some(hash));
    }

    #[test]
    fn test_hash_rejects_wrong_length() {
        let hash_str = "414f096361040f27e3ebfd02965c27d1492a69880dbf1544bf213e7159709134";
        assert!(matches!(Hash::from_str(&format!("{hash_str}00")), Err(faster_hex::Error::InvalidLength(66))));
        assert!(matches!(Hash::from_str(&hash_str[..62]), Err(faster_hex::Error::InvalidLength(62))));
        assert!(Hash::from_str("").is_err());
    }

    #[test]
    fn test_hash_serde_as_hex() {
        let hash = Hash::from_bytes([7u8; 32]);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", "07".repeat(32)));
        assert_eq!(serde_json::from_str::<Hash>(&json).unwrap(), hash);
    }
}
