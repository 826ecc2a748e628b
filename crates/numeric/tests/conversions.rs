//! Concrete and property-based conversion tests

#![allow(clippy::approx_constant)]

use keel_memory::{GrowableBuffer, SystemAllocator, TrackedAllocator};
use keel_numeric::{float_to_string, int_to_string, parse_float, parse_int, write_float, write_int};
use proptest::prelude::*;
use rstest::rstest;

#[rstest]
#[case("  -42 ", Some(-42))]
#[case("12a", None)]
#[case("0", Some(0))]
#[case("-0", Some(0))]
#[case("007", Some(7))]
#[case("2147483647", Some(i32::MAX))]
#[case("-2147483648", Some(i32::MIN))]
#[case("2147483648", None)]
#[case("", None)]
#[case("   ", None)]
#[case("1 2", None)]
#[case("+1", None)]
fn parse_int_cases(#[case] text: &str, #[case] expected: Option<i32>) {
    assert_eq!(parse_int::<i32>(text), expected);
}

#[rstest]
#[case("3.140", Some(3.14))]
#[case("-0.5", Some(-0.5))]
#[case("10", Some(10.0))]
#[case(".25", Some(0.25))]
#[case("1.2.3", None)]
#[case("1.x", None)]
#[case("", None)]
fn parse_float_cases(#[case] text: &str, #[case] expected: Option<f64>) {
    assert_eq!(parse_float::<f64>(text), expected);
}

#[rstest]
#[case(3.14, 2, "3.14")]
#[case(-0.5, 0, "0")]
#[case(-2.5, 0, "-2")]
#[case(0.125, 2, "0.13")]
#[case(9.995, 0, "9")]
#[case(99.96, 1, "100.0")]
#[case(1e3, 1, "1000.0")]
#[case(1e39, 0, "999999999999999939709166371603178586112")]
fn float_to_string_cases(#[case] value: f64, #[case] precision: usize, #[case] expected: &str) {
    assert_eq!(float_to_string(value, precision).as_str(), Some(expected));
}

#[test]
fn bytes_input_is_accepted() {
    assert_eq!(parse_int::<u16>(b"65535".as_slice()), Some(u16::MAX));
    let owned = int_to_string(-7i64);
    assert_eq!(parse_int::<i64>(owned.as_slice()), Some(-7));
}

#[test]
fn writes_share_one_tracked_buffer() {
    let tracker = TrackedAllocator::new(SystemAllocator);
    {
        let mut line = GrowableBuffer::new_in(&tracker);
        for value in [1u32, 22, 333] {
            write_int(value, &mut line);
            line.push(b' ');
        }
        write_float(0.5f64, 3, &mut line);
        assert_eq!(line.as_str(), Some("1 22 333 0.500"));
    }
    assert!(!tracker.has_leaks());
}

proptest! {
    #[test]
    fn int_round_trip_i64(value in any::<i64>()) {
        prop_assert_eq!(parse_int::<i64>(int_to_string(value).as_slice()), Some(value));
    }

    #[test]
    fn int_round_trip_u128(value in any::<u128>()) {
        prop_assert_eq!(parse_int::<u128>(int_to_string(value).as_slice()), Some(value));
    }

    #[test]
    fn int_round_trip_i8(value in any::<i8>()) {
        prop_assert_eq!(parse_int::<i8>(int_to_string(value).as_slice()), Some(value));
    }

    #[test]
    fn int_matches_display(value in any::<i32>()) {
        let formatted = int_to_string(value);
        let expected = value.to_string();
        prop_assert_eq!(formatted.as_str(), Some(expected.as_str()));
    }

    #[test]
    fn float_round_trip_within_precision(value in -1.0e6f64..1.0e6, precision in 0usize..7) {
        let text = float_to_string(value, precision);
        let parsed = parse_float::<f64>(text.as_slice()).unwrap();
        let tolerance = 10f64.powi(-(precision as i32)) + 1e-9;
        prop_assert!((parsed - value).abs() <= tolerance, "{value} -> {:?} -> {parsed}", text.as_str());
    }

    #[test]
    fn float_round_trip_full_range(
        value in prop::num::f64::POSITIVE
            | prop::num::f64::NEGATIVE
            | prop::num::f64::NORMAL
            | prop::num::f64::SUBNORMAL
            | prop::num::f64::ZERO,
        precision in 0usize..4,
    ) {
        let text = float_to_string(value, precision);
        let parsed = parse_float::<f64>(text.as_slice());
        prop_assert!(parsed.is_some(), "{value:e} -> {:?}", text.as_str());
        let parsed = parsed.unwrap();
        let tolerance = 10f64.powi(-(precision as i32)) + value.abs() * 1e-12;
        prop_assert!((parsed - value).abs() <= tolerance, "{value:e} -> {parsed:e}");
    }

    #[test]
    fn padded_text_parses_like_trimmed(value in any::<i32>(), left in 0usize..4, right in 0usize..4) {
        let text = format!("{}{value}{}", " ".repeat(left), "\t".repeat(right));
        prop_assert_eq!(parse_int::<i32>(&text), Some(value));
    }
}
