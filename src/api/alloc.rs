//! The main allocator type.

use crate::allocators::block::BlockAllocator;
use crate::api::config::AllocatorConfig;
use crate::api::stats::AllocStats;
use crate::backend::traits::MemoryBackend;
use crate::core::error::AllocError;
use crate::core::handle::RegionHandle;
use crate::core::types::{AllocationStatus, MemoryBlock, MemoryRegion, MemoryRequest};

/// Two-level device memory sub-allocator.
///
/// This is the primary entry point. It owns the backend and a set of
/// blocks obtained through it, and serves region reservations by carving
/// blocks up, reusing released regions, and coalescing reclaimed ones.
///
/// Callers serialize access; every operation takes `&mut self` and runs
/// to completion. Wrap the allocator in a mutex if the surrounding
/// runtime is threaded.
///
/// # Example
///
/// ```rust
/// use blockalloc::{Allocator, AllocatorConfig, HostBackend, MemoryRequest};
///
/// let config = AllocatorConfig::default().with_minimum_block_size(1024);
/// let mut alloc = Allocator::new(config, HostBackend::new());
///
/// let region = alloc.reserve(&MemoryRequest::new(64).with_alignment(16)).unwrap();
/// assert!(alloc.region(region).size >= 64);
/// alloc.release(region);
/// ```
pub struct Allocator<B: MemoryBackend> {
    backend: B,
    blocks: BlockAllocator,
}

impl<B: MemoryBackend> Allocator<B> {
    /// Create an allocator over `backend` with the given configuration.
    pub fn new(config: AllocatorConfig, backend: B) -> Self {
        Self {
            backend,
            blocks: BlockAllocator::new(config),
        }
    }

    /// Reserve a region of device memory.
    ///
    /// Routes the request to an existing compatible block or grows a new
    /// one by policy. The returned handle stays valid until the region is
    /// reclaimed away or the allocator is destroyed.
    ///
    /// # Panics
    ///
    /// Panics if the request has a zero size or a non-power-of-two
    /// alignment; these are caller bugs, not allocation failures.
    pub fn reserve(&mut self, request: &MemoryRequest) -> Result<RegionHandle, AllocError> {
        assert!(request.size > 0, "memory request must have a non-zero size");
        let mut request = *request;
        if request.alignment == 0 {
            request.alignment = 1;
        }
        assert!(
            request.alignment.is_power_of_two(),
            "memory request alignment must be a power of two"
        );
        self.blocks.reserve(&mut self.backend, &request)
    }

    /// Release a region: mark it free for reuse but keep its backend
    /// memory cached. A later compatible `reserve` can take the region
    /// back without a backend round-trip.
    pub fn release(&mut self, handle: RegionHandle) {
        self.blocks.release(handle);
    }

    /// Reclaim a region: release it, free its backend memory, and
    /// coalesce it with free neighbors.
    pub fn reclaim(&mut self, handle: RegionHandle) {
        self.blocks.reclaim(&mut self.backend, handle);
    }

    /// Increase a region's usage count. Each `retain` needs a matching
    /// `release` (or `reclaim`) before the region becomes available.
    pub fn retain(&mut self, handle: RegionHandle) {
        self.blocks.retain(handle);
    }

    /// Mark every region of every block available and zero the reserved
    /// counts, without freeing any backend memory. Outstanding handles
    /// keep resolving as cached regions until a `reclaim`, `collect`, or
    /// `destroy` detaches them.
    pub fn release_all(&mut self) {
        self.blocks.release_all();
    }

    /// Coalesce free regions across all blocks and free blocks that have
    /// become entirely empty. Returns true if anything changed.
    pub fn collect(&mut self) -> bool {
        self.blocks.collect(&mut self.backend)
    }

    /// Free every region and block. The allocator is reusable afterwards
    /// (the next `reserve` grows a fresh block); `Drop` also runs this.
    pub fn destroy(&mut self) {
        self.blocks.destroy(&mut self.backend);
    }

    /// The region a handle refers to.
    ///
    /// # Panics
    ///
    /// Panics if the handle is stale or from another allocator.
    pub fn region(&self, handle: RegionHandle) -> &MemoryRegion {
        self.blocks.region(handle)
    }

    /// The block a region lives in.
    pub fn block_of(&self, handle: RegionHandle) -> &MemoryBlock {
        self.blocks.block_of(handle)
    }

    /// Allocation state of a region.
    pub fn status(&self, handle: RegionHandle) -> AllocationStatus {
        self.blocks.region_status(handle)
    }

    /// Current usage count of a region.
    pub fn usage_count(&self, handle: RegionHandle) -> u32 {
        self.blocks.region_usage(handle)
    }

    /// Number of live blocks.
    pub fn block_count(&self) -> usize {
        self.blocks.block_count()
    }

    /// Compute an allocation statistics snapshot.
    pub fn stats(&self) -> AllocStats {
        self.blocks.stats()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }
}

impl<B: MemoryBackend> Drop for Allocator<B> {
    fn drop(&mut self) {
        self.destroy();
    }
}
