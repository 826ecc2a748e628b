//! # keel-memory
//!
//! Memory building blocks with an explicit allocator:
//! - [`Allocator`]: the single substitution point for heap memory, with
//!   [`SystemAllocator`] as the default and [`TrackedAllocator`] for
//!   observing what containers do
//! - [`BoundedHandle`]: a typed pointer that knows the window it may address
//! - [`GrowableBuffer`]: a contiguous sequence with doubling growth
//! - [`RcBox`]: a reference-counted box freed through its allocator
//!
//! ## Quick Start
//!
//! ```rust
//! use keel_memory::prelude::*;
//!
//! let tracker = TrackedAllocator::new(SystemAllocator);
//! {
//!     let mut buffer = GrowableBuffer::new_in(&tracker);
//!     for i in 0..9 {
//!         buffer.push(i);
//!     }
//!     assert_eq!(buffer.capacity(), 16);
//!
//!     let shared = RcBox::new_in(buffer, &tracker);
//!     let again = shared.clone();
//!     assert_eq!(RcBox::strong_count(&again), 2);
//! }
//! assert!(!tracker.has_leaks());
//! ```
//!
//! ## Build modes
//!
//! Every bounds check reads [`BuildMode::CURRENT`]. In `debug` and `release`
//! an out-of-range index, slice or handle offset panics with a
//! `bounds violation:` message. Enabling the `release-unsafe` feature
//! compiles the checks out; out-of-range access is then undefined behavior,
//! exactly like the unchecked pointer arithmetic it becomes.
//!
//! ## Features
//!
//! - `logging` (default): structured events through `tracing`
//! - `release-unsafe`: remove bounds checks

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(unsafe_code)]
#![warn(rust_2018_idioms)]

// Error types
pub mod error;

// Build mode, growth policy, buffer construction parameters
pub mod config;

// Core allocator capability
pub mod allocator;

mod bounds;

pub mod buffer;
pub mod handle;
pub mod rc;

pub use crate::allocator::{Allocator, AllocatorStats, SystemAllocator, TrackedAllocator};
pub use crate::buffer::GrowableBuffer;
pub use crate::config::{BufferConfig, BuildMode, GrowthPolicy};
pub use crate::error::{MemoryError, MemoryResult};
pub use crate::handle::BoundedHandle;
pub use crate::rc::RcBox;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::allocator::{Allocator, SystemAllocator, TrackedAllocator};
    pub use crate::buffer::GrowableBuffer;
    pub use crate::config::{BufferConfig, BuildMode};
    pub use crate::error::{MemoryError, MemoryResult};
    pub use crate::handle::BoundedHandle;
    pub use crate::rc::RcBox;
}
