//! Fixed-width ABI word decoding
//!
//! Every function here is total: short or missing input decodes to zero (or
//! the zero address) instead of failing, so one malformed log never aborts a
//! whole aggregation.

use std::str::FromStr;

use alloy::primitives::{Address, B256, I256, U256};
use bigdecimal::BigDecimal;

/// ABI word size in bytes
pub const WORD: usize = 32;

/// Big-endian uint256 at `word_offset * 32` bytes into `data`; 0 if out of range
pub fn decode_uint(data: &[u8], word_offset: usize) -> U256 {
    let start = word_offset.saturating_mul(WORD);
    let end = start.saturating_add(WORD);

    data.get(start..end)
        .map(U256::from_be_slice)
        .unwrap_or(U256::ZERO)
}

/// Two's-complement int256 at `word_offset`
pub fn decode_signed_int(data: &[u8], word_offset: usize) -> I256 {
    I256::from_raw(decode_uint(data, word_offset))
}

/// Address held in the low 20 bytes of an indexed topic
pub fn decode_address(topic: Option<&B256>) -> Address {
    topic
        .map(|word| Address::from_word(*word))
        .unwrap_or(Address::ZERO)
}

/// Raw token units to a decimal amount
pub fn scale_amount(raw: U256, decimals: u8) -> BigDecimal {
    parse_scaled(&raw.to_string(), decimals)
}

pub fn scale_signed(raw: I256, decimals: u8) -> BigDecimal {
    parse_scaled(&raw.to_string(), decimals)
}

fn parse_scaled(digits: &str, decimals: u8) -> BigDecimal {
    BigDecimal::from_str(&format!("{digits}e-{decimals}")).unwrap_or_else(|err| {
        tracing::warn!(digits, "Cannot scale amount: {err}");
        BigDecimal::default()
    })
}
