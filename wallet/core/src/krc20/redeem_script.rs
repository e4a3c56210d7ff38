use super::envelope::{Envelope, PROTOCOL_TAG};
use crate::imports::*;
use kastx_txscript::opcodes::codes::{Op0, Op1, OpCheckSigECDSA, OpEndIf, OpFalse, OpIf};
use kastx_txscript::script_builder::ScriptBuilder;
use kastx_txscript::{pay_to_script_hash_script, redeem_script_hash};

/// Length of a compressed secp256k1 public key.
pub const COMPRESSED_PUBLIC_KEY_SIZE: usize = 33;

/// The script locking a KRC20 commit output.
///
/// It is spendable by the owner of `public_key` only, followed by an `OP_FALSE OP_IF … OP_ENDIF`
/// block that is never executed and carries the envelope for indexers:
///
/// `<pubkey> OP_CHECKSIG_ECDSA OP_FALSE OP_IF "kasplex" OP_1 <metadata> OP_0 <operation json> OP_ENDIF`
///
/// The script is a pure function of the key and the envelope, so the reveal transaction
/// can rebuild it from persisted data alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedeemScript {
    script: Vec<u8>,
}

impl RedeemScript {
    pub fn new(public_key: &[u8; COMPRESSED_PUBLIC_KEY_SIZE], envelope: &Envelope) -> Result<Self> {
        let operation = envelope.to_json()?;
        let script = ScriptBuilder::new()
            .add_data(public_key)?
            .add_op(OpCheckSigECDSA)?
            .add_op(OpFalse)?
            .add_op(OpIf)?
            .add_data(PROTOCOL_TAG)?
            .add_op(Op1)?
            .add_data(&[])?
            .add_op(Op0)?
            .add_data(operation.as_bytes())?
            .add_op(OpEndIf)?
            .drain();
        Ok(Self { script })
    }

    pub fn script(&self) -> &[u8] {
        &self.script
    }

    /// BLAKE2b-256 of the script, locked into the commit output.
    pub fn hash(&self) -> [u8; 32] {
        redeem_script_hash(&self.script)
    }

    /// The pay-to-script-hash script public key of the commit output.
    pub fn script_public_key(&self) -> ScriptPublicKey {
        pay_to_script_hash_script(&self.script)
    }
}

impl AsRef<[u8]> for RedeemScript {
    fn as_ref(&self) -> &[u8] {
        &self.script
    }
}
