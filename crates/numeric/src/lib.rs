//! # keel-numeric
//!
//! Decimal text conversion for every primitive integer and float type.
//!
//! Parsing reads single-byte text and reports malformed or out-of-range
//! input as `None`. Formatting appends to a
//! [`GrowableBuffer<u8>`](keel_memory::GrowableBuffer), so the caller picks
//! the allocator.
//!
//! ```rust
//! use keel_numeric::{float_to_string, int_to_string, parse_float, parse_int};
//!
//! assert_eq!(parse_int::<i32>("  -42 "), Some(-42));
//! assert_eq!(parse_int::<i32>("12a"), None);
//! assert_eq!(parse_float::<f64>("-0.25"), Some(-0.25));
//!
//! assert_eq!(int_to_string(i16::MIN).as_str(), Some("-32768"));
//! assert_eq!(float_to_string(2.5, 2).as_str(), Some("2.50"));
//! ```

#![warn(rust_2018_idioms)]

pub mod float;
pub mod format;
pub mod int;
pub mod parse;

pub use crate::float::Float;
pub use crate::format::{MAX_PRECISION, float_to_string, int_to_string, write_float, write_int};
pub use crate::int::Integer;
pub use crate::parse::{MAX_FRACTION_DIGITS, parse_float, parse_int, parse_int_exact};
