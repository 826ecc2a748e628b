//! Number to text
//!
//! Formatting appends bytes to a caller-owned [`GrowableBuffer`], growing it
//! through its own allocator. The `*_to_string` forms allocate a fresh buffer
//! from the system allocator.

use keel_memory::{Allocator, GrowableBuffer};

use crate::float::Float;
use crate::int::Integer;

/// Fraction digits computed exactly; higher precisions pad with zeros
pub const MAX_PRECISION: usize = 18;

/// Appends the decimal form of `value`
///
/// Digits are emitted least significant first, then `-` for negatives, and
/// the written segment is reversed in place. `MIN` values need no special
/// case.
pub fn write_int<T: Integer, A: Allocator>(value: T, buf: &mut GrowableBuffer<u8, A>) {
    buf.grow(T::MAX_DIGITS + 1);
    let start = buf.len();

    let mut rest = value;
    loop {
        buf.push(b'0' + rest.low_digit());
        rest = rest.div_ten();
        if rest == T::ZERO {
            break;
        }
    }
    if value.is_negative() {
        buf.push(b'-');
    }

    buf.as_mut_slice()[start..].reverse();
}

/// Decimal form of `value` in a new buffer
pub fn int_to_string<T: Integer>(value: T) -> GrowableBuffer<u8> {
    let mut buf = GrowableBuffer::with_capacity(T::MAX_DIGITS + 1);
    write_int(value, &mut buf);
    buf
}

/// Appends `value` with exactly `precision` fraction digits
///
/// The integer part is truncated toward zero and printed exactly, digit for
/// digit, across the whole finite range.
/// With `precision > 0` the fraction is scaled by `10^precision` and rounded
/// half away from zero; a carry bumps the integer part. Precision 0 prints
/// the truncated integer part only. A value that prints as all zeros gets no
/// sign. `NaN` prints `nan`, infinities print `inf` and `-inf`.
pub fn write_float<F: Float, A: Allocator>(value: F, precision: usize, buf: &mut GrowableBuffer<u8, A>) {
    let value = value.to_f64();
    if value.is_nan() {
        buf.append(b"nan");
        return;
    }
    if value.is_infinite() {
        let text: &[u8] = if value < 0.0 { b"-inf" } else { b"inf" };
        buf.append(text);
        return;
    }

    let magnitude = value.abs();
    let mut whole = magnitude.trunc();
    let computed = precision.min(MAX_PRECISION);
    let scale = 10u64.pow(computed as u32);

    let mut fraction = 0;
    if precision > 0 {
        let scaled = (magnitude.fract() * scale as f64).round() as u64;
        if scaled >= scale {
            // a nonzero fraction means `whole < 2^52`, so this is exact
            whole += 1.0;
            fraction = scaled - scale;
        } else {
            fraction = scaled;
        }
    }

    if value < 0.0 && (whole != 0.0 || fraction != 0) {
        buf.push(b'-');
    }
    write_whole(whole, buf);

    if precision > 0 {
        buf.grow(precision.saturating_add(1));
        buf.push(b'.');
        let mut divisor = scale / 10;
        while divisor > 0 {
            buf.push(b'0' + (fraction / divisor % 10) as u8);
            divisor /= 10;
        }
        for _ in computed..precision {
            buf.push(b'0');
        }
    }
}

const LIMB_BASE: u64 = 1_000_000_000;
const LIMB_DIGITS: usize = 9;
/// Base-10^9 limbs needed for the 309 integer digits of `f64::MAX`
const MAX_LIMBS: usize = 35;

/// Appends a non-negative integral `f64` exactly
///
/// Values below 2^128 go through `u128`. Larger ones are `mantissa * 2^exp`
/// with `exp > 0`; the mantissa is expanded into base-10^9 limbs and doubled
/// `exp` times, up to 32 bits per pass.
fn write_whole<A: Allocator>(whole: f64, buf: &mut GrowableBuffer<u8, A>) {
    if whole < u128::MAX as f64 {
        write_int(whole as u128, buf);
        return;
    }

    let bits = whole.to_bits();
    let exp = ((bits >> 52) & 0x7ff) as u32 - 1075;
    let mantissa = (bits & ((1 << 52) - 1)) | (1 << 52);

    let mut limbs = [0u32; MAX_LIMBS];
    let mut used = 0;
    let mut rest = mantissa;
    while rest > 0 {
        limbs[used] = (rest % LIMB_BASE) as u32;
        rest /= LIMB_BASE;
        used += 1;
    }

    let mut shift = exp;
    while shift > 0 {
        let step = shift.min(32);
        let mut carry = 0u64;
        for limb in &mut limbs[..used] {
            let value = (u64::from(*limb) << step) + carry;
            *limb = (value % LIMB_BASE) as u32;
            carry = value / LIMB_BASE;
        }
        while carry > 0 {
            limbs[used] = (carry % LIMB_BASE) as u32;
            carry /= LIMB_BASE;
            used += 1;
        }
        shift -= step;
    }

    let Some((top, lower)) = limbs[..used].split_last() else {
        return;
    };
    write_int(*top, buf);
    buf.grow(lower.len() * LIMB_DIGITS);
    for &limb in lower.iter().rev() {
        let mut divisor = LIMB_BASE / 10;
        while divisor > 0 {
            buf.push(b'0' + (u64::from(limb) / divisor % 10) as u8);
            divisor /= 10;
        }
    }
}

/// [`write_float`] into a new buffer
pub fn float_to_string<F: Float>(value: F, precision: usize) -> GrowableBuffer<u8> {
    let mut buf = GrowableBuffer::new();
    write_float(value, precision, &mut buf);
    buf
}
