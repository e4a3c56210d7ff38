//! Hash types appended to signatures. The wallet signs every input with [`SIG_HASH_ALL`].

/// Commits to every input and every output.
pub const SIG_HASH_ALL: SigHashType = SigHashType(0b0000_0001);
/// Modifier restricting the commitment on inputs to the signed one.
pub const SIG_HASH_ANY_ONE_CAN_PAY: SigHashType = SigHashType(0b1000_0000);

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SigHashType(u8);

impl SigHashType {
    pub fn is_sighash_anyone_can_pay(self) -> bool {
        self.0 & SIG_HASH_ANY_ONE_CAN_PAY.0 != 0
    }

    pub fn to_u8(self) -> u8 {
        self.0
    }

    /// Only the all-outputs types, with or without the anyone-can-pay modifier, are supported.
    pub fn from_u8(val: u8) -> Option<Self> {
        (val & !SIG_HASH_ANY_ONE_CAN_PAY.0 == SIG_HASH_ALL.0).then_some(Self(val))
    }
}
