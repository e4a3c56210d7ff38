//!
//! Kaspa and token amount formatting and parsing utilities.
//!

use crate::error::Error;
use crate::result::Result;
use kastx_consensus_core::constants::SOMPI_PER_KASPA;

/// Number of fractional digits of a KAS amount.
pub const KASPA_DECIMALS: u32 = 8;

#[inline]
pub fn sompi_to_kaspa(sompi: u64) -> f64 {
    sompi as f64 / SOMPI_PER_KASPA as f64
}

/// Parses a KAS decimal string into sompi without going through floating point.
/// An empty string yields `None`.
pub fn try_kaspa_str_to_sompi<S: AsRef<str>>(s: S) -> Result<Option<u64>> {
    let amount = s.as_ref().trim();
    if amount.is_empty() {
        return Ok(None);
    }

    let sompi = parse_units(amount, KASPA_DECIMALS)?;
    u64::try_from(sompi).map(Some).map_err(|_| Error::InvalidAmount(amount.to_string()))
}

/// Parses a decimal string into its smallest units for an asset with `decimals` fractional digits,
/// e.g. `"1.5"` with 8 decimals is `150000000`. More fractional digits than `decimals` is an error.
pub fn parse_units(s: &str, decimals: u32) -> Result<u128> {
    let invalid = || Error::InvalidAmount(s.to_string());

    let (integer, fraction) = s.trim().split_once('.').unwrap_or((s.trim(), ""));
    if integer.is_empty() && fraction.is_empty() {
        return Err(invalid());
    }
    if !integer.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) || fraction.len() > decimals as usize {
        return Err(invalid());
    }

    let scale = 10u128.checked_pow(decimals).ok_or_else(invalid)?;
    let integer = if integer.is_empty() { 0 } else { integer.parse::<u128>().map_err(|_| invalid())? };
    let fraction = if fraction.is_empty() {
        0
    } else {
        let padding = 10u128.pow(decimals - fraction.len() as u32);
        fraction.parse::<u128>().map_err(|_| invalid())? * padding
    };

    integer.checked_mul(scale).and_then(|units| units.checked_add(fraction)).ok_or_else(invalid)
}
