//!
//! Kaspa address encoding: `<prefix>:<bech32 payload>`, where the payload carries
//! a version byte followed by a public key or script hash.
//!

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::SmallVec;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use thiserror::Error;

mod bech32;

#[derive(Error, PartialEq, Eq, Debug, Clone)]
pub enum AddressError {
    #[error("Invalid prefix {0}")]
    InvalidPrefix(String),

    #[error("Prefix is missing")]
    MissingPrefix,

    #[error("Invalid version {0}")]
    InvalidVersion(u8),

    #[error("Invalid character {0}")]
    DecodingError(char),

    #[error("Checksum is invalid")]
    BadChecksum,

    #[error("Payload is malformed")]
    BadPayload,

    #[error("Payload of {len} bytes does not match address version {version} ({expected} bytes expected)")]
    InvalidPayloadLength { version: Version, len: usize, expected: usize },
}

#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash, Serialize, Deserialize)]
pub enum Prefix {
    #[serde(rename = "kaspa")]
    Mainnet,
    #[serde(rename = "kaspatest")]
    Testnet,
    #[serde(rename = "kaspasim")]
    Simnet,
    #[serde(rename = "kaspadev")]
    Devnet,
}

impl Prefix {
    pub fn as_str(&self) -> &'static str {
        match self {
            Prefix::Mainnet => "kaspa",
            Prefix::Testnet => "kaspatest",
            Prefix::Simnet => "kaspasim",
            Prefix::Devnet => "kaspadev",
        }
    }
}

impl Display for Prefix {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Prefix {
    type Error = AddressError;

    fn try_from(prefix: &str) -> Result<Self, Self::Error> {
        match prefix {
            "kaspa" => Ok(Prefix::Mainnet),
            "kaspatest" => Ok(Prefix::Testnet),
            "kaspasim" => Ok(Prefix::Simnet),
            "kaspadev" => Ok(Prefix::Devnet),
            _ => Err(AddressError::InvalidPrefix(prefix.to_string())),
        }
    }
}

///
///  Kaspa `Address` version (`PubKey`, `PubKey ECDSA`, `ScriptHash`)
///
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum Version {
    /// Schnorr x-only public key (32 bytes)
    PubKey = 0,
    /// Compressed secp256k1 ECDSA public key (33 bytes)
    PubKeyECDSA = 1,
    /// BLAKE2b-256 hash of a redeem script
    ScriptHash = 8,
}

impl Version {
    pub fn public_key_len(&self) -> usize {
        match self {
            Version::PubKey => 32,
            Version::PubKeyECDSA => 33,
            Version::ScriptHash => 32,
        }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Version::PubKey => "PubKey",
            Version::PubKeyECDSA => "PubKeyECDSA",
            Version::ScriptHash => "ScriptHash",
        })
    }
}

impl TryFrom<u8> for Version {
    type Error = AddressError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Version::PubKey),
            1 => Ok(Version::PubKeyECDSA),
            8 => Ok(Version::ScriptHash),
            _ => Err(AddressError::InvalidVersion(value)),
        }
    }
}

/// Size of the payload vector of an address, large enough for a [`Version::PubKeyECDSA`] key.
pub const PAYLOAD_VECTOR_SIZE: usize = 36;

pub type PayloadVec = SmallVec<[u8; PAYLOAD_VECTOR_SIZE]>;

/// Kaspa `Address` that serializes to and from an address format string: `kaspa:qz0s...t8cv`.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Debug, Hash)]
pub struct Address {
    pub prefix: Prefix,
    pub version: Version,
    pub payload: PayloadVec,
}

impl Address {
    pub fn try_new(prefix: Prefix, version: Version, payload: &[u8]) -> Result<Self, AddressError> {
        let expected = version.public_key_len();
        if payload.len() != expected {
            return Err(AddressError::InvalidPayloadLength { version, len: payload.len(), expected });
        }
        Ok(Self { prefix, version, payload: PayloadVec::from_slice(payload) })
    }

    /// Builds a pay-to-pubkey address, choosing Schnorr for 32-byte keys and ECDSA for 33-byte compressed keys.
    pub fn from_public_key(prefix: Prefix, public_key: &[u8]) -> Result<Self, AddressError> {
        match public_key.len() {
            32 => Self::try_new(prefix, Version::PubKey, public_key),
            _ => Self::try_new(prefix, Version::PubKeyECDSA, public_key),
        }
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.prefix, self.encode_payload())
    }
}

impl From<&Address> for String {
    fn from(address: &Address) -> Self {
        address.to_string()
    }
}

impl TryFrom<&str> for Address {
    type Error = AddressError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.split_once(':') {
            Some((prefix, payload)) => Self::decode_payload(Prefix::try_from(prefix)?, payload),
            None => Err(AddressError::MissingPrefix),
        }
    }
}

impl TryFrom<String> for Address {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.as_str().try_into()
    }
}

impl FromStr for Address {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.try_into()
    }
}

impl Serialize for Address {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Address {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Address::try_from(s.as_str()).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_hex(hex: &str) -> Vec<u8> {
        let mut bytes = vec![0u8; hex.len() / 2];
        faster_hex::hex_decode(hex.as_bytes(), &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_ecdsa_address_from_public_key() {
        let public_key = decode_hex("03401b9e9d698388da082f3692b10d40b7a846c5f15f2a29e63e11f5647bd01deb");
        let address = Address::from_public_key(Prefix::Mainnet, &public_key).unwrap();
        assert_eq!(address.version, Version::PubKeyECDSA);
        assert_eq!(address.to_string(), "kaspa:qyp5qxu7n45c8zx6pqhndy43p4qt02zxchc4723fuclpraty00gpm6c8edeys5s");
    }

    #[test]
    fn test_decode_ecdsa_address() {
        let address = Address::try_from("kaspa:qyptjw50kqcp6a7xmx8juv0xvmgtmem4fvlte88clt2kafas863narspv9sj34u").unwrap();
        assert_eq!(address.prefix, Prefix::Mainnet);
        assert_eq!(address.version, Version::PubKeyECDSA);
        assert_eq!(address.payload.as_slice(), decode_hex("02b93a8fb0301d77c6d98f2e31e666d0bde7754b3ebc9cf8fad56ea7b03ea33e8e").as_slice());
    }

    #[test]
    fn test_encode_decode_all_versions() {
        for (prefix, version) in [
            (Prefix::Mainnet, Version::PubKey),
            (Prefix::Testnet, Version::PubKeyECDSA),
            (Prefix::Devnet, Version::ScriptHash),
            (Prefix::Simnet, Version::PubKey),
        ] {
            let payload = (0..version.public_key_len() as u8).collect::<Vec<_>>();
            let address = Address::try_new(prefix, version, &payload).unwrap();
            let encoded = address.to_string();
            assert!(encoded.starts_with(&format!("{prefix}:")));
            assert_eq!(Address::try_from(encoded.as_str()).unwrap(), address);
        }
    }

    #[test]
    fn test_decode_failures() {
        let valid = "kaspa:qyptjw50kqcp6a7xmx8juv0xvmgtmem4fvlte88clt2kafas863narspv9sj34u";

        assert_eq!(Address::try_from("qyptjw50kqcp6a7xmx8juv0xvmgtmem4fvlte88clt2kafas863narspv9sj34u"), Err(AddressError::MissingPrefix));
        assert_eq!(Address::try_from(valid.replace("kaspa:", "bitcoin:").as_str()), Err(AddressError::InvalidPrefix("bitcoin".into())));
        assert_eq!(Address::try_from(valid.replace("kaspa:", "kaspatest:").as_str()), Err(AddressError::BadChecksum));
        assert_eq!(Address::try_from(valid.replacen('q', "b", 2).as_str()), Err(AddressError::DecodingError('b')));
        assert_eq!(Address::try_from("kaspa:qqqq"), Err(AddressError::BadPayload));

        let mut tampered = valid.to_string();
        tampered.replace_range(10..11, if &valid[10..11] == "p" { "q" } else { "p" });
        assert_eq!(Address::try_from(tampered.as_str()), Err(AddressError::BadChecksum));
    }

    #[test]
    fn test_payload_length_is_checked() {
        assert_eq!(
            Address::try_new(Prefix::Mainnet, Version::ScriptHash, &[0u8; 33]),
            Err(AddressError::InvalidPayloadLength { version: Version::ScriptHash, len: 33, expected: 32 })
        );
    }

    #[test]
    fn test_serde_as_string() {
        let address = Address::try_from("kaspa:qyptjw50kqcp6a7xmx8juv0xvmgtmem4fvlte88clt2kafas863narspv9sj34u").unwrap();
        let json = serde_json::to_string(&address).unwrap();
        assert_eq!(json, "\"kaspa:qyptjw50kqcp6a7xmx8juv0xvmgtmem4fvlte88clt2kafas863narspv9sj34u\"");
        assert_eq!(serde_json::from_str::<Address>(&json).unwrap(), address);
    }
}
