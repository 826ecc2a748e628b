//! Float capability shared by the parse and format routines

use core::fmt;

mod private {
    pub trait Sealed {}
}

/// `f32` or `f64`; arithmetic happens in `f64` and narrows at the end
pub trait Float: private::Sealed + Copy + PartialOrd + fmt::Debug {
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
}

impl private::Sealed for f32 {}
impl private::Sealed for f64 {}

impl Float for f32 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value as Self
    }

    #[inline]
    fn to_f64(self) -> f64 {
        f64::from(self)
    }
}

impl Float for f64 {
    #[inline]
    fn from_f64(value: f64) -> Self {
        value
    }

    #[inline]
    fn to_f64(self) -> f64 {
        self
    }
}
