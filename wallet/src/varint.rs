//! # Unsigned Varints
//!
//! Base-128 (LEB128) encoding for `u64`: seven payload bits per byte, least
//! significant group first, high bit set on every byte except the last.
//!
//! The node uses this for every integer on the wire: fees, periods, amounts,
//! length prefixes, and even the version number in front of keys and
//! addresses. Small values stay small: a fee of 1 costs one byte.
//!
//! Decoding is strict. A `u64` never needs more than 10 bytes, and the 10th
//! byte may carry at most one payload bit. Anything else is an overflow, not
//! something we silently wrap.

use thiserror::Error;

/// Longest possible encoding of a `u64`.
pub const MAX_VARINT_LEN: usize = 10;

/// Errors from [`decode`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum VarintError {
    #[error("unexpected end of input while reading varint")]
    Truncated,

    #[error("varint overflows u64")]
    Overflow,
}

/// Appends the varint encoding of `value` to `out`.
pub fn encode_into(mut value: u64, out: &mut Vec<u8>) {
    loop {
        let byte = (value & 0x7f) as u8;
        value >>= 7;
        if value == 0 {
            out.push(byte);
            return;
        }
        out.push(byte | 0x80);
    }
}

/// Returns the varint encoding of `value` as a fresh buffer.
pub fn encode(value: u64) -> Vec<u8> {
    let mut out = Vec::with_capacity(MAX_VARINT_LEN);
    encode_into(value, &mut out);
    out
}

/// Decodes one varint from the front of `input`.
///
/// Returns the value and the number of bytes consumed. Never reads past
/// `input.len()`.
pub fn decode(input: &[u8]) -> Result<(u64, usize), VarintError> {
    let mut value: u64 = 0;
    for (i, &byte) in input.iter().enumerate().take(MAX_VARINT_LEN) {
        let group = u64::from(byte & 0x7f);
        // The 10th byte holds bit 63 only.
        if i == MAX_VARINT_LEN - 1 && group > 1 {
            return Err(VarintError::Overflow);
        }
        value |= group << (7 * i);
        if byte & 0x80 == 0 {
            return Ok((value, i + 1));
        }
    }
    if input.len() >= MAX_VARINT_LEN {
        Err(VarintError::Overflow)
    } else {
        Err(VarintError::Truncated)
    }
}
