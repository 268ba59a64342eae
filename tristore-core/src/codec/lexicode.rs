//! Order-preserving scalar transforms.
//!
//! Every transform maps a scalar to a fixed-width run of lowercase hex digits
//! such that byte order equals numeric order. Hex keeps the output inside
//! ASCII, so encoded numerics can never contain the row delimiter (`0x00`),
//! the type delimiter (`0x01`) or the sentinel (`0xFF`).
//!
//! - signed integers: XOR with the sign bit (`i64::MIN -> 0`, `0 -> 2^63`)
//! - floats: IEEE-754 total-order bit transform; NaN and infinities are
//!   rejected and `-0.0` is canonicalized to `+0.0`

use crate::error::{Error, Result};

/// Sign bit mask for the i64 <-> u64 order-preserving transform.
const SIGN_FLIP_64: u64 = 1u64 << 63;

/// Sign bit mask for the i32 <-> u32 order-preserving transform.
const SIGN_FLIP_32: u32 = 1u32 << 31;

/// Encode a signed 64-bit integer as 16 hex digits.
#[inline]
pub fn encode_i64(value: i64) -> String {
    hex::encode(((value as u64) ^ SIGN_FLIP_64).to_be_bytes())
}

/// Inverse of [`encode_i64`].
pub fn decode_i64(digits: &[u8]) -> Result<i64> {
    let raw = u64::from_be_bytes(decode_fixed(digits)?);
    Ok((raw ^ SIGN_FLIP_64) as i64)
}

/// Encode a signed 32-bit integer as 8 hex digits.
#[inline]
pub fn encode_i32(value: i32) -> String {
    hex::encode(((value as u32) ^ SIGN_FLIP_32).to_be_bytes())
}

/// Inverse of [`encode_i32`].
pub fn decode_i32(digits: &[u8]) -> Result<i32> {
    let raw = u32::from_be_bytes(decode_fixed(digits)?);
    Ok((raw ^ SIGN_FLIP_32) as i32)
}

/// Encode a finite `f64` as 16 hex digits.
///
/// Positive values flip only the sign bit; negative values flip all bits, so
/// more-negative values map to smaller keys.
pub fn encode_f64(value: f64) -> Result<String> {
    if value.is_nan() {
        return Err(Error::invalid_value("NaN is not allowed in index values"));
    }
    if value.is_infinite() {
        return Err(Error::invalid_value(
            "infinite values are not allowed in index values",
        ));
    }
    let value = if value == 0.0 { 0.0 } else { value };
    let bits = value.to_bits();
    let key = if bits & SIGN_FLIP_64 != 0 {
        !bits
    } else {
        bits ^ SIGN_FLIP_64
    };
    Ok(hex::encode(key.to_be_bytes()))
}

/// Inverse of [`encode_f64`].
pub fn decode_f64(digits: &[u8]) -> Result<f64> {
    let key = u64::from_be_bytes(decode_fixed(digits)?);
    let bits = if key & SIGN_FLIP_64 != 0 {
        key ^ SIGN_FLIP_64
    } else {
        !key
    };
    Ok(f64::from_bits(bits))
}

/// Hex digits -> exactly `N` big-endian bytes.
fn decode_fixed<const N: usize>(digits: &[u8]) -> Result<[u8; N]> {
    let bytes = hex::decode(digits).map_err(|e| {
        Error::decode(format!(
            "bad hex {:?}: {}",
            String::from_utf8_lossy(digits),
            e
        ))
    })?;
    let len = bytes.len();
    bytes.try_into().map_err(|_| {
        Error::decode(format!("expected {} hex digits, found {}", N * 2, len * 2))
    })
}
