use std::fmt::{Debug, Display, Formatter};

/// The size of the array used to store subnetwork IDs.
pub const SUBNETWORK_ID_SIZE: usize = 20;

/// The domain representation of a Subnetwork ID
#[derive(Clone, Copy, Default, Eq, PartialEq, Hash)]
pub struct SubnetworkId([u8; SUBNETWORK_ID_SIZE]);

impl SubnetworkId {
    pub const fn from_byte(b: u8) -> SubnetworkId {
        let mut bytes = [0u8; SUBNETWORK_ID_SIZE];
        bytes[0] = b;
        SubnetworkId(bytes)
    }

    pub const fn from_bytes(bytes: [u8; SUBNETWORK_ID_SIZE]) -> SubnetworkId {
        SubnetworkId(bytes)
    }
}

impl AsRef<[u8]> for SubnetworkId {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl Display for SubnetworkId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&faster_hex::hex_string(&self.0))
    }
}

impl Debug for SubnetworkId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(self, f)
    }
}

/// The default subnetwork ID which is used for transactions without related payload data
pub const SUBNETWORK_ID_NATIVE: SubnetworkId = SubnetworkId::from_byte(0);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_native_subnetwork_is_all_zero() {
        assert_eq!(SUBNETWORK_ID_NATIVE.as_ref(), &[0u8; SUBNETWORK_ID_SIZE]);
        assert_eq!(SUBNETWORK_ID_NATIVE.to_string(), "00".repeat(SUBNETWORK_ID_SIZE));
        assert_ne!(SubnetworkId::from_byte(1), SUBNETWORK_ID_NATIVE);
    }
}
