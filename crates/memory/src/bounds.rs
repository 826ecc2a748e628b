//! Bounds-check sites shared by the handle and the buffer.
//!
//! `bounds_check!` is the only place that consults the build mode. Under
//! `release-unsafe` the condition is never evaluated and the branch folds
//! away; everywhere else a failed check is a fault.

use core::fmt;

#[cfg(feature = "logging")]
use tracing::error;

/// Fault unless `$cond` holds, when the build mode keeps bounds checks.
macro_rules! bounds_check {
    ($cond:expr, $($arg:tt)+) => {
        if $crate::config::BuildMode::CURRENT.checks_bounds() && !($cond) {
            $crate::bounds::bounds_fault(format_args!($($arg)+));
        }
    };
}

pub(crate) use bounds_check;

#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn bounds_fault(details: fmt::Arguments<'_>) -> ! {
    #[cfg(feature = "logging")]
    error!(mode = %crate::config::BuildMode::CURRENT, "bounds violation: {details}");

    panic!("bounds violation: {details}")
}

/// Capacity arithmetic left the address space.
#[cold]
#[inline(never)]
#[track_caller]
pub(crate) fn capacity_overflow(details: fmt::Arguments<'_>) -> ! {
    #[cfg(feature = "logging")]
    error!("capacity overflow: {details}");

    panic!("capacity overflow: {details}")
}
