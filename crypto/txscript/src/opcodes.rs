//! Opcode values used by the standard and token scripts built in this workspace.

#[allow(non_upper_case_globals)]
pub mod codes {
    pub const OpFalse: u8 = 0x00;
    pub const Op0: u8 = 0x00;

    pub const OpData1: u8 = 0x01;
    pub const OpData7: u8 = 0x07;
    pub const OpData32: u8 = 0x20;
    pub const OpData33: u8 = 0x21;
    pub const OpData65: u8 = 0x41;
    pub const OpData75: u8 = 0x4b;

    pub const OpPushData1: u8 = 0x4c;
    pub const OpPushData2: u8 = 0x4d;

    pub const Op1Negate: u8 = 0x4f;

    pub const Op1: u8 = 0x51;
    pub const Op16: u8 = 0x60;

    pub const OpIf: u8 = 0x63;
    pub const OpEndIf: u8 = 0x68;

    pub const OpEqual: u8 = 0x87;

    pub const OpBlake2b: u8 = 0xaa;
    pub const OpCheckSigECDSA: u8 = 0xab;
    pub const OpCheckSig: u8 = 0xac;
}

/// Last value in the range of small integers pushed by Op1..Op16
pub const OP_SMALL_INT_MAX_VAL: u8 = 16;
/// First value in the range formed by OpData# opcodes (where opcode == value)
pub const OP_DATA_MIN_VAL: u8 = codes::OpData1;
/// Last value in the range formed by OpData# opcodes (where opcode == value)
pub const OP_DATA_MAX_VAL: u8 = codes::OpData75;
/// Minus 1 value
pub const OP_1_NEGATE_VAL: u8 = 0x81;
