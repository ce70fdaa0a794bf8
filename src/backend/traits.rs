//! Backend allocator traits and types.
//!
//! This module defines the device backend interface WITHOUT pulling in
//! any API-specific dependencies. The allocator core depends on these
//! traits, not on implementations; a Vulkan, OpenCL, Metal, CUDA, or
//! WebGPU driver supplies its own implementation.

use thiserror::Error;

use crate::core::types::{MemoryBlock, MemoryRegion};

/// Errors reported by a device backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BackendError {
    /// The device is out of memory.
    #[error("device out of memory")]
    OutOfMemory,
    /// The requested allocation size is invalid.
    #[error("invalid allocation size")]
    InvalidSize,
    /// The requested memory properties are not supported.
    #[error("unsupported memory properties")]
    UnsupportedProperties,
    /// Backend-specific error (opaque).
    #[error("backend error: {0}")]
    Other(String),
}

/// Device backend interface consumed by the allocator core.
///
/// Blocks are whole device allocations (e.g. a Vulkan device memory
/// object); regions are backend sub-allocations within a block (e.g. a
/// buffer bound at an offset). The allocate callbacks write the
/// `handle` field of the passed value; the deallocate callbacks detach
/// it.
///
/// Implementations must not call back into the allocator. The exclusive
/// borrow taken for the duration of each allocator operation enforces
/// this structurally.
pub trait MemoryBackend {
    /// Allocate device memory for a whole block. Writes `block.handle`.
    fn allocate_block(&mut self, block: &mut MemoryBlock) -> Result<(), BackendError>;

    /// Free a block's device memory.
    fn deallocate_block(&mut self, block: &mut MemoryBlock) -> Result<(), BackendError>;

    /// Materialize a backend object for a sub-range of a block. Writes
    /// `region.handle`.
    fn allocate_region(&mut self, region: &mut MemoryRegion) -> Result<(), BackendError>;

    /// Free a region's backend object.
    fn deallocate_region(&mut self, region: &mut MemoryRegion) -> Result<(), BackendError>;
}
