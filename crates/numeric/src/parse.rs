//! Text to number
//!
//! Input is single-byte text. Nothing here allocates; malformed or
//! out-of-range input yields `None`.

use crate::float::Float;
use crate::int::Integer;

/// Fraction digits past this many do not change an `f64` and are ignored
pub const MAX_FRACTION_DIGITS: usize = 19;

/// Parses a decimal integer, ignoring surrounding ASCII whitespace
///
/// One leading `-` is accepted; `+`, inner whitespace, any other non-digit
/// and values outside `T`'s range give `None`.
pub fn parse_int<T: Integer>(text: impl AsRef<[u8]>) -> Option<T> {
    parse_int_exact(text.as_ref().trim_ascii())
}

/// Like [`parse_int`] but whitespace anywhere is rejected
///
/// Digits are consumed from the least significant end, each contributing
/// `digit * 10^position`. Negative values accumulate downward so `T::MIN`
/// parses without overflow. Leading zeros are allowed in any number.
pub fn parse_int_exact<T: Integer>(text: &[u8]) -> Option<T> {
    let (negative, digits) = match text {
        [b'-', rest @ ..] => (true, rest),
        _ => (false, text),
    };
    if digits.is_empty() {
        return None;
    }

    let mut value = T::ZERO;
    // `None` once 10^position leaves T's range; only zeros may follow
    let mut place = Some(T::ONE);
    for &byte in digits.iter().rev() {
        let digit = byte.wrapping_sub(b'0');
        if digit > 9 {
            return None;
        }
        if digit != 0 {
            let term = place?.checked_mul(T::from_digit(digit))?;
            value = if negative {
                value.checked_sub(term)?
            } else {
                value.checked_add(term)?
            };
        }
        place = place.and_then(|p| p.checked_mul(T::TEN));
    }
    Some(value)
}

/// Parses a decimal number with an optional fractional part
///
/// Surrounding ASCII whitespace is ignored. The text splits on `.`; more
/// than one separator gives `None`. The integer part may be empty, or a
/// lone `-`, only when a fractional part follows (`.5`, `-.5`). The
/// fractional part must be one or more digits; digits past
/// [`MAX_FRACTION_DIGITS`] are ignored. The sign comes from the integer
/// part's text, so `-0.5` is negative. Integer parts of any length are
/// accepted; past `f64::MAX` they parse as infinity.
pub fn parse_float<F: Float>(text: impl AsRef<[u8]>) -> Option<F> {
    let text = text.as_ref().trim_ascii();

    let mut parts = text.split(|&byte| byte == b'.');
    let int_part = parts.next().unwrap_or_default();
    let frac_part = parts.next();
    if parts.next().is_some() {
        return None;
    }

    let negative = int_part.first() == Some(&b'-');
    let whole = match (int_part, frac_part) {
        ([] | [b'-'], Some(_)) => 0.0,
        _ => digits_to_f64(int_part.strip_prefix(b"-").unwrap_or(int_part))?,
    };

    let fraction = match frac_part {
        None => 0.0,
        Some(digits) => {
            if digits.is_empty() || !digits.iter().all(u8::is_ascii_digit) {
                return None;
            }
            let digits = &digits[..digits.len().min(MAX_FRACTION_DIGITS)];
            let scaled = parse_int_exact::<u64>(digits)?;
            scaled as f64 / 10f64.powi(digits.len() as i32)
        }
    };

    let magnitude = whole.abs() + fraction;
    Some(F::from_f64(if negative { -magnitude } else { magnitude }))
}

/// Unsigned decimal digits as an `f64`
///
/// Folded in chunks of [`MAX_FRACTION_DIGITS`], each exact in a `u64`, so a
/// long integer part is rounded once per chunk rather than once per digit.
fn digits_to_f64(digits: &[u8]) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    let mut value = 0.0;
    for chunk in digits.chunks(MAX_FRACTION_DIGITS) {
        if !chunk.iter().all(u8::is_ascii_digit) {
            return None;
        }
        let part = parse_int_exact::<u64>(chunk)?;
        value = value * 10f64.powi(chunk.len() as i32) + part as f64;
    }
    Some(value)
}
