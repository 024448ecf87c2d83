//! Ports - Trait definitions for the collaborators a job depends on.

pub mod cutter;
pub mod id_allocator;
pub mod progress;
pub mod prober;
pub mod resolver;

pub use cutter::Cutter;
pub use id_allocator::TaskIdAllocator;
pub use progress::ProgressBackend;
pub use prober::MediaProber;
pub use resolver::FileResolver;
