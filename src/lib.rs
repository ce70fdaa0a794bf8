//! # blockalloc
//!
//! Two-level device memory sub-allocator for heterogeneous compute
//! runtimes.
//!
//! Upstream code requests small typed memory regions with alignment and
//! usage properties; the sub-allocator satisfies them by carving larger
//! opaque *blocks* obtained from a backend into smaller *regions*,
//! reusing freed regions, and coalescing neighbors to fight
//! fragmentation.
//!
//! ## Features
//!
//! - First-fit placement in address order with alignment conformance
//! - Release/reuse fast path: released regions cache their backend
//!   memory until explicitly reclaimed
//! - Reference-counted region lifetime (retain/release)
//! - Multi-block management with growth policy and LRU eviction of
//!   empty blocks
//! - Pluggable backend trait usable from Vulkan, OpenCL, Metal, CUDA,
//!   or WebGPU integrations
//!
//! ## Quick Start
//!
//! ```rust
//! use blockalloc::{Allocator, AllocatorConfig, HostBackend, MemoryRequest};
//!
//! let mut alloc = Allocator::new(AllocatorConfig::default(), HostBackend::new());
//!
//! let region = alloc.reserve(&MemoryRequest::new(256).with_alignment(64)).unwrap();
//! // ... bind alloc.region(region) to a device resource ...
//! alloc.release(region); // soft free: backend memory stays cached
//! alloc.reclaim(region); // hard free: backend memory returned
//! ```
//!
//! The allocator is single-threaded by design; the surrounding runtime
//! holds a mutex around it for the duration of each call.

pub mod api;
pub mod backend;

mod allocators;
mod core;
mod util;

// Re-export the public API at the crate root for convenience
pub use api::alloc::Allocator;
pub use api::config::AllocatorConfig;
pub use api::stats::AllocStats;

// Backend interface
pub use backend::host::HostBackend;
pub use backend::traits::{BackendError, MemoryBackend};

// Data model
pub use self::core::error::AllocError;
pub use self::core::handle::RegionHandle;
pub use self::core::types::{
    AllocationStatus, BackendHandle, MemoryBlock, MemoryCaching, MemoryProperties, MemoryRegion,
    MemoryRequest, MemoryUsage, MemoryVisibility,
};
