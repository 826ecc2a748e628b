//! Integer capability shared by the parse and format routines

use core::fmt;

mod private {
    pub trait Sealed {}
}

/// Primitive integer usable with [`parse_int`](crate::parse_int) and
/// [`write_int`](crate::write_int)
///
/// Sealed: implemented for every primitive integer type and nothing else.
pub trait Integer: private::Sealed + Copy + Ord + fmt::Debug {
    const ZERO: Self;
    const ONE: Self;
    const TEN: Self;
    /// Whether the type has negative values
    const SIGNED: bool;
    /// Decimal digits needed for the widest value, without a sign
    const MAX_DIGITS: usize;

    /// `digit` must be below ten
    fn from_digit(digit: u8) -> Self;
    fn is_negative(self) -> bool;
    fn checked_add(self, rhs: Self) -> Option<Self>;
    fn checked_sub(self, rhs: Self) -> Option<Self>;
    fn checked_mul(self, rhs: Self) -> Option<Self>;
    /// Magnitude of the least significant decimal digit
    fn low_digit(self) -> u8;
    /// Division by ten, truncating toward zero
    fn div_ten(self) -> Self;
}

macro_rules! integer_common {
    ($ty:ty) => {
        const ZERO: Self = 0;
        const ONE: Self = 1;
        const TEN: Self = 10;
        const MAX_DIGITS: usize = <$ty>::MAX.ilog10() as usize + 1;

        #[inline]
        #[allow(trivial_numeric_casts)]
        fn from_digit(digit: u8) -> Self {
            debug_assert!(digit < 10);
            digit as Self
        }

        #[inline]
        fn checked_add(self, rhs: Self) -> Option<Self> {
            <$ty>::checked_add(self, rhs)
        }

        #[inline]
        fn checked_sub(self, rhs: Self) -> Option<Self> {
            <$ty>::checked_sub(self, rhs)
        }

        #[inline]
        fn checked_mul(self, rhs: Self) -> Option<Self> {
            <$ty>::checked_mul(self, rhs)
        }

        #[inline]
        fn div_ten(self) -> Self {
            self / 10
        }
    };
}

macro_rules! impl_signed {
    ($($ty:ty),* $(,)?) => {$(
        impl private::Sealed for $ty {}

        impl Integer for $ty {
            const SIGNED: bool = true;
            integer_common!($ty);

            #[inline]
            fn is_negative(self) -> bool {
                self < 0
            }

            #[inline]
            #[allow(trivial_numeric_casts)]
            fn low_digit(self) -> u8 {
                (self % 10).unsigned_abs() as u8
            }
        }
    )*};
}

macro_rules! impl_unsigned {
    ($($ty:ty),* $(,)?) => {$(
        impl private::Sealed for $ty {}

        impl Integer for $ty {
            const SIGNED: bool = false;
            integer_common!($ty);

            #[inline]
            fn is_negative(self) -> bool {
                false
            }

            #[inline]
            #[allow(trivial_numeric_casts)]
            fn low_digit(self) -> u8 {
                (self % 10) as u8
            }
        }
    )*};
}

impl_signed!(i8, i16, i32, i64, i128, isize);
impl_unsigned!(u8, u16, u32, u64, u128, usize);
