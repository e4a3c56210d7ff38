use crate::{
    MAX_SCRIPT_ELEMENT_SIZE, MAX_SCRIPTS_SIZE,
    opcodes::{OP_1_NEGATE_VAL, OP_DATA_MAX_VAL, OP_DATA_MIN_VAL, OP_SMALL_INT_MAX_VAL, codes::*},
};
use thiserror::Error;

/// Initial capacity of the script buffer, enough for the token redeem scripts without regrowing.
const DEFAULT_SCRIPT_ALLOC: usize = 512;

#[derive(Error, PartialEq, Eq, Debug, Clone, Copy)]
pub enum ScriptBuilderError {
    #[error("adding opcode {0} would exceed the maximum allowed canonical script length of {MAX_SCRIPTS_SIZE}")]
    OpCodeRejected(u8),

    #[error("adding {0} bytes of data would exceed the maximum allowed canonical script length of {MAX_SCRIPTS_SIZE}")]
    DataRejected(usize),

    #[error("adding a data element of {0} bytes exceed the maximum allowed script element size of {MAX_SCRIPT_ELEMENT_SIZE}")]
    ElementExceedsMaxSize(usize),
}
pub type ScriptBuilderResult<T> = std::result::Result<T, ScriptBuilderError>;

/// Builds scripts from opcodes and canonical data pushes.
///
/// Pushes that would break the script engine limits are refused and leave the script untouched.
/// Nothing checks that the script executes.
///
/// For example, the envelope header of a token redeem script:
///
/// ```
/// use kastx_txscript::opcodes::codes::*;
/// use kastx_txscript::script_builder::{ScriptBuilderResult, ScriptBuilder};
/// fn envelope_header(public_key: &[u8]) -> ScriptBuilderResult<Vec<u8>> {
///     Ok(ScriptBuilder::new()
///         .add_data(public_key)?
///         .add_op(OpCheckSigECDSA)?
///         .add_op(OpFalse)?
///         .add_op(OpIf)?
///         .add_data(b"kasplex")?
///         .drain())
/// }
/// ```
pub struct ScriptBuilder {
    script: Vec<u8>,
}

impl ScriptBuilder {
    pub fn new() -> Self {
        Self { script: Vec::with_capacity(DEFAULT_SCRIPT_ALLOC) }
    }

    pub fn script(&self) -> &[u8] {
        &self.script
    }

    /// Takes the script out, leaving the builder empty.
    pub fn drain(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.script)
    }

    pub fn add_op(&mut self, opcode: u8) -> ScriptBuilderResult<&mut Self> {
        if self.script.len() >= MAX_SCRIPTS_SIZE {
            return Err(ScriptBuilderError::OpCodeRejected(opcode));
        }

        self.script.push(opcode);
        Ok(self)
    }

    /// Pushes `data` with the shortest opcode able to carry it. Empty data and single bytes
    /// up to 16 (or 0x81) become the matching small integer opcode.
    pub fn add_data(&mut self, data: &[u8]) -> ScriptBuilderResult<&mut Self> {
        if data.len() > MAX_SCRIPT_ELEMENT_SIZE {
            return Err(ScriptBuilderError::ElementExceedsMaxSize(data.len()));
        }

        let push = push_prefix(data);
        let size = push.len() + if is_small_int(data) { 0 } else { data.len() };
        if self.script.len() + size > MAX_SCRIPTS_SIZE {
            return Err(ScriptBuilderError::DataRejected(size));
        }

        self.script.extend_from_slice(&push);
        if !is_small_int(data) {
            self.script.extend_from_slice(data);
        }
        Ok(self)
    }
}

impl Default for ScriptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn is_small_int(data: &[u8]) -> bool {
    match data {
        [] => true,
        [byte] => *byte <= OP_SMALL_INT_MAX_VAL || *byte == OP_1_NEGATE_VAL,
        _ => false,
    }
}

/// The opcode, and length bytes if any, introducing a push of `data`.
/// Element sizes are capped well below what `OpPushData4` would be needed for.
fn push_prefix(data: &[u8]) -> Vec<u8> {
    match data {
        [] | [0] => vec![Op0],
        [byte] if *byte <= OP_SMALL_INT_MAX_VAL => vec![(Op1 - 1) + byte],
        [OP_1_NEGATE_VAL] => vec![Op1Negate],
        _ if data.len() <= OP_DATA_MAX_VAL as usize => vec![(OP_DATA_MIN_VAL - 1) + data.len() as u8],
        _ if data.len() <= u8::MAX as usize => vec![OpPushData1, data.len() as u8],
        _ => {
            let [low, high] = (data.len() as u16).to_le_bytes();
            vec![OpPushData2, low, high]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn push(data: &[u8]) -> ScriptBuilderResult<Vec<u8>> {
        ScriptBuilder::new().add_data(data).map(|builder| builder.drain())
    }

    #[test]
    fn test_small_integer_pushes() {
        assert_eq!(push(&[]), Ok(vec![Op0]));
        assert_eq!(push(&[0]), Ok(vec![Op0]));
        assert_eq!(push(&[1]), Ok(vec![Op1]));
        assert_eq!(push(&[16]), Ok(vec![Op16]));
        assert_eq!(push(&[0x81]), Ok(vec![Op1Negate]));
        assert_eq!(push(&[17]), Ok(vec![OpData1, 17]));
        assert_eq!(push(&[0x80]), Ok(vec![OpData1, 0x80]));
    }

    #[test]
    fn test_data_push_prefixes() {
        // public key, signature with hash type, the largest direct push, the token operation json
        for (len, prefix) in [
            (33, vec![OpData33]),
            (65, vec![OpData65]),
            (75, vec![OpData75]),
            (76, vec![OpPushData1, 76]),
            (139, vec![OpPushData1, 139]),
            (255, vec![OpPushData1, 255]),
            (256, vec![OpPushData2, 0, 1]),
            (MAX_SCRIPT_ELEMENT_SIZE, vec![OpPushData2, 8, 2]),
        ] {
            let data = vec![0x42u8; len];
            let script = push(&data).unwrap();
            assert_eq!(&script[..prefix.len()], prefix.as_slice(), "push of {len} bytes");
            assert_eq!(&script[prefix.len()..], data.as_slice(), "push of {len} bytes");
        }

        assert_eq!(push(&[0x42; MAX_SCRIPT_ELEMENT_SIZE + 1]), Err(ScriptBuilderError::ElementExceedsMaxSize(521)));
    }

    #[test]
    fn test_envelope_layout() {
        let script = ScriptBuilder::new()
            .add_op(OpFalse)
            .unwrap()
            .add_op(OpIf)
            .unwrap()
            .add_data(b"kasplex")
            .unwrap()
            .add_op(Op1)
            .unwrap()
            .add_data(&[])
            .unwrap()
            .add_op(OpEndIf)
            .unwrap()
            .drain();
        assert_eq!(script, [&[OpFalse, OpIf, OpData7][..], b"kasplex", &[Op1, Op0, OpEndIf]].concat());
    }

    #[test]
    fn test_script_size_limit() {
        let mut builder = ScriptBuilder::new();
        // 19 full elements take 9937 bytes, 61 more leave 2 bytes of room
        for _ in 0..19 {
            builder.add_data(&[0x42; MAX_SCRIPT_ELEMENT_SIZE]).unwrap();
        }
        builder.add_data(&[0x42; 60]).unwrap();
        assert_eq!(builder.script().len(), MAX_SCRIPTS_SIZE - 2);

        let full = builder.script().to_vec();
        assert_eq!(builder.add_data(&[0x42; 2]).map(|_| ()), Err(ScriptBuilderError::DataRejected(3)));
        assert_eq!(builder.script(), full.as_slice());

        builder.add_data(&[0x42]).unwrap();
        assert_eq!(builder.script().len(), MAX_SCRIPTS_SIZE);
        assert_eq!(builder.add_op(OpEndIf).map(|_| ()), Err(ScriptBuilderError::OpCodeRejected(OpEndIf)));
        assert_eq!(builder.add_data(&[]).map(|_| ()), Err(ScriptBuilderError::DataRejected(1)));

        assert_eq!(builder.drain().len(), MAX_SCRIPTS_SIZE);
        assert!(builder.script().is_empty());
    }
}
