use crate::{Address, AddressError, Prefix, Version};

const CHARSET: &[u8; 32] = b"qpzry9x8gf2tvdw0s3jn54khce6mua7l";
const CHECKSUM_LEN: usize = 8;

// Cashaddr-style BCH checksum over 5-bit groups, 40 bits wide.
// https://bch.info/en/specifications
fn polymod<'data>(values: impl Iterator<Item = &'data u8>) -> u64 {
    const GENERATORS: [u64; 5] = [0x98f2bc8e61, 0x79b76d99e2, 0xf33e5fb3c4, 0xae2eabe2a8, 0x1e4f43e470];

    let mut c = 1u64;
    for d in values {
        let c0 = c >> 35;
        c = ((c & 0x07ffffffff) << 5) ^ (*d as u64);
        for (i, generator) in GENERATORS.iter().enumerate() {
            if (c0 >> i) & 1 != 0 {
                c ^= generator;
            }
        }
    }
    c ^ 1
}

fn prefix_u5(prefix: Prefix) -> impl Iterator<Item = u8> {
    prefix.as_str().bytes().map(|c| c & 0x1f).chain(std::iter::once(0u8))
}

fn checksum(prefix: Prefix, payload_u5: &[u8]) -> u64 {
    let prefix = prefix_u5(prefix).collect::<Vec<_>>();
    polymod(prefix.iter().chain(payload_u5).chain(&[0u8; CHECKSUM_LEN]))
}

fn verify_checksum(prefix: Prefix, data_u5: &[u8]) -> bool {
    let prefix = prefix_u5(prefix).collect::<Vec<_>>();
    polymod(prefix.iter().chain(data_u5)) == 0
}

/// Regroups a bit stream from `from`-bit to `to`-bit words. With `pad` unset, leftover bits
/// must be fewer than `from` and all zero.
fn convert_bits(data: &[u8], from: u32, to: u32, pad: bool) -> Option<Vec<u8>> {
    let max_value = (1u32 << to) - 1;
    let max_acc = (1u32 << (from + to - 1)) - 1;
    let mut acc = 0u32;
    let mut bits = 0u32;
    let mut out = Vec::with_capacity(data.len() * from as usize / to as usize + 1);

    for value in data.iter().map(|v| *v as u32) {
        if value >> from != 0 {
            return None;
        }
        acc = ((acc << from) | value) & max_acc;
        bits += from;
        while bits >= to {
            bits -= to;
            out.push(((acc >> bits) & max_value) as u8);
        }
    }

    if pad {
        if bits > 0 {
            out.push(((acc << (to - bits)) & max_value) as u8);
        }
    } else if bits >= from || ((acc << (to - bits)) & max_value) != 0 {
        return None;
    }

    Some(out)
}

fn rev_charset(c: u8) -> Option<u8> {
    CHARSET.iter().position(|x| *x == c).map(|i| i as u8)
}

impl Address {
    pub(crate) fn encode_payload(&self) -> String {
        let versioned = std::iter::once(self.version as u8).chain(self.payload.iter().copied()).collect::<Vec<_>>();
        let payload_u5 = convert_bits(&versioned, 8, 5, true).expect("8-bit input always regroups into 5-bit words");
        let checksum = checksum(self.prefix, &payload_u5);
        let checksum_u5 = (0..CHECKSUM_LEN).map(|i| ((checksum >> (5 * (CHECKSUM_LEN - 1 - i))) & 0x1f) as u8);

        payload_u5.iter().copied().chain(checksum_u5).map(|c| CHARSET[c as usize] as char).collect()
    }

    pub(crate) fn decode_payload(prefix: Prefix, address: &str) -> Result<Self, AddressError> {
        let data_u5 = address
            .bytes()
            .map(|b| rev_charset(b).ok_or(AddressError::DecodingError(b as char)))
            .collect::<Result<Vec<u8>, _>>()?;

        if data_u5.len() <= CHECKSUM_LEN {
            return Err(AddressError::BadPayload);
        }
        if !verify_checksum(prefix, &data_u5) {
            return Err(AddressError::BadChecksum);
        }

        let payload_u5 = &data_u5[..data_u5.len() - CHECKSUM_LEN];
        let payload = convert_bits(payload_u5, 5, 8, false).ok_or(AddressError::BadPayload)?;
        let (version, payload) = payload.split_first().ok_or(AddressError::BadPayload)?;
        Address::try_new(prefix, Version::try_from(*version)?, payload)
    }
}
