//! Build mode and container configuration
//!
//! The build mode is fixed at compile time. Every bounds-check site reads
//! [`BuildMode::CURRENT`], which is a constant, so the compiler removes the
//! check entirely when the mode does not want it.

use core::alloc::Layout;
use core::fmt;
use core::str::FromStr;

use crate::error::{MemoryError, MemoryResult};

/// Process-wide safety tier selected when the crate is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BuildMode {
    /// Unoptimized build, bounds checks on
    #[default]
    Debug,
    /// Optimized build, bounds checks on
    Release,
    /// Optimized build with bounds checks compiled out
    ReleaseUnsafe,
}

impl BuildMode {
    /// Mode this crate was compiled in.
    ///
    /// `release-unsafe` comes from the cargo feature of the same name; the
    /// other two follow `debug_assertions`.
    pub const CURRENT: Self = if cfg!(feature = "release-unsafe") {
        Self::ReleaseUnsafe
    } else if cfg!(debug_assertions) {
        Self::Debug
    } else {
        Self::Release
    };

    /// Whether bounds checks are compiled in for this mode
    #[inline(always)]
    pub const fn checks_bounds(self) -> bool {
        !matches!(self, Self::ReleaseUnsafe)
    }

    /// Canonical spelling used by build tooling
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "debug",
            Self::Release => "release",
            Self::ReleaseUnsafe => "release-unsafe",
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuildMode {
    type Err = MemoryError;

    fn from_str(s: &str) -> MemoryResult<Self> {
        match s {
            "debug" => Ok(Self::Debug),
            "release" => Ok(Self::Release),
            "release-unsafe" => Ok(Self::ReleaseUnsafe),
            other => Err(MemoryError::invalid_config(&format!(
                "unknown build mode '{other}' (expected debug, release or release-unsafe)"
            ))),
        }
    }
}

/// How a buffer picks its next capacity when it runs out of room
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GrowthPolicy {
    /// Double the current capacity until the request fits.
    /// A zero capacity starts from one.
    Doubling,
    /// Allocate exactly what was asked for
    Exact,
}

impl GrowthPolicy {
    /// Capacity to reallocate to so that `needed` elements fit.
    ///
    /// Returns `None` when the doubled capacity would overflow `usize`.
    pub fn next_capacity(self, current: usize, needed: usize) -> Option<usize> {
        if needed <= current {
            return Some(current);
        }
        match self {
            Self::Exact => Some(needed),
            Self::Doubling => {
                let mut capacity = current.max(1);
                while capacity < needed {
                    capacity = capacity.checked_mul(2)?;
                }
                Some(capacity)
            }
        }
    }
}

/// Construction parameters for a growable buffer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferConfig {
    /// Capacity allocated up front, in elements
    pub initial_capacity: usize,
}

impl BufferConfig {
    /// Capacity used by `GrowableBuffer::new`
    pub const DEFAULT_INITIAL_CAPACITY: usize = 8;

    /// Create a config with the default initial capacity
    pub const fn new() -> Self {
        Self {
            initial_capacity: Self::DEFAULT_INITIAL_CAPACITY,
        }
    }

    /// Set the initial capacity
    pub const fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    /// Check that the initial allocation for element type `T` is expressible
    pub fn validate<T>(&self) -> MemoryResult<()> {
        Layout::array::<T>(self.initial_capacity).map_err(|_| {
            MemoryError::invalid_config(&format!(
                "initial capacity {} overflows the address space for {}",
                self.initial_capacity,
                core::any::type_name::<T>()
            ))
        })?;
        Ok(())
    }
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self::new()
    }
}
