use crate::{
    opcodes::codes::{OpBlake2b, OpCheckSig, OpCheckSigECDSA, OpData32, OpData33, OpEqual},
    script_builder::{ScriptBuilder, ScriptBuilderResult},
};
use blake2b_simd::Params;
use kastx_addresses::{Address, Version};
use kastx_consensus_core::tx::{ScriptPublicKey, ScriptVec};
use smallvec::SmallVec;
use std::iter::once;

/// Version of every standard script public key.
pub const STANDARD_SCRIPT_VERSION: u16 = 0;

/// Creates a new script to pay a transaction output to a 32-byte pubkey.
fn pay_to_pub_key(address_payload: &[u8]) -> ScriptVec {
    SmallVec::from_iter(once(OpData32).chain(address_payload.iter().copied()).chain(once(OpCheckSig)))
}

/// Creates a new script to pay a transaction output to a 33-byte ECDSA pubkey.
fn pay_to_pub_key_ecdsa(address_payload: &[u8]) -> ScriptVec {
    SmallVec::from_iter(once(OpData33).chain(address_payload.iter().copied()).chain(once(OpCheckSigECDSA)))
}

/// Creates a new script to pay a transaction output to a 32-byte script hash.
fn pay_to_script_hash(script_hash: &[u8]) -> ScriptVec {
    SmallVec::from_iter([OpBlake2b, OpData32].iter().copied().chain(script_hash.iter().copied()).chain(once(OpEqual)))
}

/// Creates a new script to pay a transaction output to the specified address.
/// Payload lengths are guaranteed by [`Address`] construction.
pub fn pay_to_address_script(address: &Address) -> ScriptPublicKey {
    let script = match address.version {
        Version::PubKey => pay_to_pub_key(address.payload.as_slice()),
        Version::PubKeyECDSA => pay_to_pub_key_ecdsa(address.payload.as_slice()),
        Version::ScriptHash => pay_to_script_hash(address.payload.as_slice()),
    };
    ScriptPublicKey::new(STANDARD_SCRIPT_VERSION, script)
}

/// Unkeyed BLAKE2b-256 of a redeem script, as committed to by pay-to-script-hash outputs.
pub fn redeem_script_hash(redeem_script: &[u8]) -> [u8; 32] {
    let hash = Params::new().hash_length(32).to_state().update(redeem_script).finalize();
    let mut out = [0u8; 32];
    out.copy_from_slice(hash.as_bytes());
    out
}

/// Takes a script and returns an equivalent pay-to-script-hash script
pub fn pay_to_script_hash_script(redeem_script: &[u8]) -> ScriptPublicKey {
    ScriptPublicKey::new(STANDARD_SCRIPT_VERSION, pay_to_script_hash(&redeem_script_hash(redeem_script)))
}

/// Signature script spending a pay-to-pubkey output: a single push of `signature || hash_type`.
pub fn pay_to_pub_key_signature_script(signature: &[u8], hash_type: u8) -> ScriptBuilderResult<Vec<u8>> {
    let signature = signature.iter().copied().chain(once(hash_type)).collect::<Vec<u8>>();
    Ok(ScriptBuilder::new().add_data(&signature)?.drain())
}

/// Generates a signature script that fits a pay-to-script-hash script: the signature
/// script is followed by a push of the redeem script.
pub fn pay_to_script_hash_signature_script(redeem_script: &[u8], signature_script: &[u8]) -> ScriptBuilderResult<Vec<u8>> {
    let redeem_script_as_data = ScriptBuilder::new().add_data(redeem_script)?.drain();
    Ok(Vec::from_iter(signature_script.iter().copied().chain(redeem_script_as_data)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kastx_addresses::Prefix;

    fn hex(s: &str) -> Vec<u8> {
        let mut bytes = vec![0u8; s.len() / 2];
        faster_hex::hex_decode(s.as_bytes(), &mut bytes).unwrap();
        bytes
    }

    #[test]
    fn test_pay_to_address_script() {
        struct Test {
            address: &'static str,
            expected: &'static str,
        }

        let tests = vec![
            Test {
                address: "kaspa:qyptjw50kqcp6a7xmx8juv0xvmgtmem4fvlte88clt2kafas863narspv9sj34u",
                expected: "2102b93a8fb0301d77c6d98f2e31e666d0bde7754b3ebc9cf8fad56ea7b03ea33e8eab",
            },
            Test {
                address: "kaspa:qyp5qxu7n45c8zx6pqhndy43p4qt02zxchc4723fuclpraty00gpm6c8edeys5s",
                expected: "2103401b9e9d698388da082f3692b10d40b7a846c5f15f2a29e63e11f5647bd01debab",
            },
        ];

        for test in tests {
            let address = Address::try_from(test.address).unwrap();
            let spk = pay_to_address_script(&address);
            assert_eq!(spk.version(), 0);
            assert_eq!(spk.script(), hex(test.expected).as_slice(), "{}", test.address);
        }

        let schnorr = Address::try_new(Prefix::Testnet, Version::PubKey, &[7u8; 32]).unwrap();
        let script = pay_to_address_script(&schnorr);
        assert_eq!(script.script().len(), 34);
        assert_eq!((script.script()[0], script.script()[33]), (OpData32, OpCheckSig));

        let script_hash = Address::try_new(Prefix::Mainnet, Version::ScriptHash, &[9u8; 32]).unwrap();
        let script = pay_to_address_script(&script_hash);
        assert_eq!(script.script().len(), 35);
        assert_eq!((script.script()[0], script.script()[1], script.script()[34]), (OpBlake2b, OpData32, OpEqual));
    }

    #[test]
    fn test_pay_to_script_hash_script() {
        let redeem_script = [0x51u8];
        let spk = pay_to_script_hash_script(&redeem_script);
        let expected = blake2b_simd::Params::new().hash_length(32).hash(&redeem_script);
        assert_eq!(&spk.script()[2..34], expected.as_bytes());
        assert_eq!(spk.script().len(), 35);
    }

    #[test]
    fn test_signature_scripts() {
        let signature = [0x11u8; 64];
        let script = pay_to_pub_key_signature_script(&signature, 1).unwrap();
        assert_eq!(script.len(), 66);
        assert_eq!(script[0], 0x41);
        assert_eq!(&script[1..65], &signature);
        assert_eq!(script[65], 1);

        let redeem_script = vec![0x42u8; 190];
        let p2sh = pay_to_script_hash_signature_script(&redeem_script, &script).unwrap();
        assert_eq!(&p2sh[..66], script.as_slice());
        assert_eq!(&p2sh[66..68], &[0x4c, 190]);
        assert_eq!(&p2sh[68..], redeem_script.as_slice());
    }
}
