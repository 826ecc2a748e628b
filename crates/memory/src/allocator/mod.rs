//! Allocator capability and its implementations
//!
//! Every byte of heap memory used by the containers in this crate comes from
//! an [`Allocator`]. Containers take the allocator as a value at
//! construction time; pass `&allocator` to share one instance.

mod stats;
mod system;
mod tracked;
mod traits;

pub use stats::AllocatorStats;
pub use system::SystemAllocator;
pub use tracked::TrackedAllocator;
pub use traits::Allocator;
