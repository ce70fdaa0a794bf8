//! Block allocator: routes requests across a set of blocks.
//!
//! Owns every block obtained from the backend, in stable slots so region
//! handles can name their owning block in constant time. Requests are
//! routed to the first compatible block with room; when none fits, a new
//! block is grown by policy. Oversized or explicitly dedicated requests
//! get a block of their own, and empty blocks are evicted
//! least-recently-used first when the block count is capped.

use tracing::{debug, trace};

use crate::allocators::region::{RegionAllocator, ReserveOutcome};
use crate::api::config::AllocatorConfig;
use crate::api::stats::AllocStats;
use crate::backend::traits::MemoryBackend;
use crate::core::error::AllocError;
use crate::core::handle::RegionHandle;
use crate::core::types::{AllocationStatus, MemoryBlock, MemoryRegion, MemoryRequest};
use crate::util::layout::{align_up, conform_alignment, round_up_to_multiple};
use crate::util::size::format_bytes;

struct BlockEntry {
    allocator: RegionAllocator,
    /// Reserve clock stamp for least-recently-used eviction.
    last_used: u64,
}

/// Multi-block layer of the sub-allocator.
pub struct BlockAllocator {
    config: AllocatorConfig,
    entries: Vec<Option<BlockEntry>>,
    free_slots: Vec<u32>,
    tick: u64,
}

impl BlockAllocator {
    pub fn new(config: AllocatorConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
            free_slots: Vec::new(),
            tick: 0,
        }
    }

    /// Reserve a region, growing a new block if no existing one fits.
    pub fn reserve(
        &mut self,
        backend: &mut dyn MemoryBackend,
        request: &MemoryRequest,
    ) -> Result<RegionHandle, AllocError> {
        let (block_size, dedicated) = self.conform_block_size(request);
        if dedicated {
            return self.grow_and_reserve(backend, request, block_size, true);
        }

        self.tick += 1;
        let tick = self.tick;
        for slot in 0..self.entries.len() {
            let Some(entry) = self.entries[slot].as_mut() else {
                continue;
            };
            let block = entry.allocator.memory_block();
            if block.dedicated {
                continue;
            }
            if !block.properties.accepts(&request.properties) {
                continue;
            }
            match entry.allocator.reserve(backend, request) {
                ReserveOutcome::Reserved(node) => {
                    entry.last_used = tick;
                    let generation = entry.allocator.node_generation(node);
                    trace!(slot, node, "served from existing block");
                    return Ok(RegionHandle {
                        block: slot as u32,
                        node,
                        generation,
                    });
                }
                ReserveOutcome::NoFit => {}
                ReserveOutcome::BackendFailure => return Err(AllocError::OutOfMemory),
            }
        }

        self.grow_and_reserve(backend, request, block_size, false)
    }

    /// Soft-free a region; its backend memory stays cached in the block.
    pub fn release(&mut self, handle: RegionHandle) {
        self.resolve_mut(handle).allocator.release(handle.node);
    }

    /// Free a region's backend memory and coalesce within its block.
    pub fn reclaim(&mut self, backend: &mut dyn MemoryBackend, handle: RegionHandle) {
        self.resolve_mut(handle).allocator.reclaim(backend, handle.node);
    }

    /// Increase a region's usage count.
    pub fn retain(&mut self, handle: RegionHandle) {
        self.resolve_mut(handle).allocator.retain(handle.node);
    }

    /// Mark every region of every block available without freeing any
    /// backend memory. Outstanding handles become releasable caches.
    pub fn release_all(&mut self) {
        for entry in self.entries.iter_mut().flatten() {
            entry.allocator.release_all();
        }
    }

    /// Coalesce free regions in every block and free blocks that have
    /// become entirely empty. Returns true if anything changed.
    pub fn collect(&mut self, backend: &mut dyn MemoryBackend) -> bool {
        let mut result = false;
        for slot in 0..self.entries.len() as u32 {
            let Some(entry) = self.entries[slot as usize].as_mut() else {
                continue;
            };
            result |= entry.allocator.collect(backend);
            if entry.allocator.is_empty() {
                self.destroy_block(backend, slot);
                result = true;
            }
        }
        result
    }

    /// Tear down every block and its regions.
    pub fn destroy(&mut self, backend: &mut dyn MemoryBackend) {
        debug!("destroying all blocks");
        for slot in 0..self.entries.len() as u32 {
            self.destroy_block(backend, slot);
        }
        self.entries.clear();
        self.free_slots.clear();
    }

    pub fn region(&self, handle: RegionHandle) -> &MemoryRegion {
        self.resolve(handle).allocator.region(handle.node)
    }

    pub fn region_status(&self, handle: RegionHandle) -> AllocationStatus {
        self.resolve(handle).allocator.region_status(handle.node)
    }

    pub fn region_usage(&self, handle: RegionHandle) -> u32 {
        self.resolve(handle).allocator.region_usage(handle.node)
    }

    /// The block a region lives in.
    pub fn block_of(&self, handle: RegionHandle) -> &MemoryBlock {
        self.resolve(handle).allocator.memory_block()
    }

    /// Number of live blocks.
    pub fn block_count(&self) -> usize {
        self.entries.iter().flatten().count()
    }

    pub fn stats(&self) -> AllocStats {
        let mut stats = AllocStats::default();
        for entry in self.entries.iter().flatten() {
            entry.allocator.collect_stats(&mut stats);
        }
        stats
    }

    /// Block size and dedication for a request that needs a new block.
    ///
    /// The size is padded to the conformed alignment so a fresh block is
    /// always able to serve the request that grew it.
    fn conform_block_size(&self, request: &MemoryRequest) -> (u64, bool) {
        let alignment = conform_alignment(request.alignment, request.properties.alignment);
        let padded = align_up(request.size, alignment);
        if request.dedicated {
            return (padded, true);
        }
        let size = round_up_to_multiple(
            padded.max(self.config.minimum_block_size),
            self.config.nearest_multiple,
        );
        if self.config.maximum_block_size > 0 && size > self.config.maximum_block_size {
            (padded, true)
        } else {
            (size, false)
        }
    }

    fn grow_and_reserve(
        &mut self,
        backend: &mut dyn MemoryBackend,
        request: &MemoryRequest,
        block_size: u64,
        dedicated: bool,
    ) -> Result<RegionHandle, AllocError> {
        if self.config.maximum_block_count > 0
            && self.block_count() >= self.config.maximum_block_count as usize
            && !self.evict(backend)
        {
            debug!(
                limit = self.config.maximum_block_count,
                "block count limit reached with nothing evictable"
            );
            return Err(AllocError::NoFit);
        }

        debug!(
            size = %format_bytes(block_size),
            dedicated,
            "growing new block"
        );
        let mut memory = MemoryBlock {
            handle: None,
            size: block_size,
            properties: request.properties,
            dedicated,
        };
        if let Err(err) = backend.allocate_block(&mut memory) {
            debug!(%err, "block-allocate callback failed");
            return Err(AllocError::OutOfMemory);
        }
        if memory.handle.is_none() {
            debug!("backend reported success without attaching a block handle");
            return Err(AllocError::OutOfMemory);
        }

        let mut allocator = RegionAllocator::new(memory);
        let node = match allocator.reserve(backend, request) {
            ReserveOutcome::Reserved(node) => node,
            ReserveOutcome::BackendFailure => {
                // back out the block: the reservation never happened
                debug!("backing out freshly grown block after region failure");
                allocator.destroy(backend);
                if let Err(err) = backend.deallocate_block(allocator.memory_block_mut()) {
                    debug!(%err, "block-deallocate callback failed");
                }
                return Err(AllocError::OutOfMemory);
            }
            ReserveOutcome::NoFit => {
                // a fresh block is sized for the request that grew it, so
                // a placement miss means the sizing logic is inconsistent
                panic!("block allocator: newly grown block failed to place the reservation");
            }
        };
        let generation = allocator.node_generation(node);
        self.tick += 1;
        let entry = BlockEntry {
            allocator,
            last_used: self.tick,
        };
        let slot = self.insert_entry(entry);
        Ok(RegionHandle {
            block: slot,
            node,
            generation,
        })
    }

    /// Coalesce everywhere, then free the least-recently-used block that
    /// has collapsed to a single detached free region.
    fn evict(&mut self, backend: &mut dyn MemoryBackend) -> bool {
        let mut candidate: Option<(u32, u64)> = None;
        for slot in 0..self.entries.len() {
            let Some(entry) = self.entries[slot].as_mut() else {
                continue;
            };
            entry.allocator.collect(backend);
            if entry.allocator.is_empty() {
                debug_assert_eq!(entry.allocator.reserved(), 0);
                let stamp = entry.last_used;
                if candidate.is_none_or(|(_, best)| stamp < best) {
                    candidate = Some((slot as u32, stamp));
                }
            }
        }
        match candidate {
            Some((slot, _)) => {
                self.destroy_block(backend, slot);
                true
            }
            None => {
                trace!("no evictable block");
                false
            }
        }
    }

    fn destroy_block(&mut self, backend: &mut dyn MemoryBackend, slot: u32) {
        let Some(mut entry) = self.entries[slot as usize].take() else {
            return;
        };
        debug!(
            slot,
            size = %format_bytes(entry.allocator.memory_block().size),
            "freeing block"
        );
        entry.allocator.destroy(backend);
        if let Err(err) = backend.deallocate_block(entry.allocator.memory_block_mut()) {
            debug!(%err, "block-deallocate callback failed");
        }
        self.free_slots.push(slot);
    }

    fn insert_entry(&mut self, entry: BlockEntry) -> u32 {
        match self.free_slots.pop() {
            Some(slot) => {
                self.entries[slot as usize] = Some(entry);
                slot
            }
            None => {
                self.entries.push(Some(entry));
                (self.entries.len() - 1) as u32
            }
        }
    }

    fn resolve(&self, handle: RegionHandle) -> &BlockEntry {
        self.entries
            .get(handle.block as usize)
            .and_then(|slot| slot.as_ref())
            .filter(|entry| entry.allocator.holds(handle.node, handle.generation))
            .unwrap_or_else(|| panic!("region handle does not belong to this allocator"))
    }

    fn resolve_mut(&mut self, handle: RegionHandle) -> &mut BlockEntry {
        self.entries
            .get_mut(handle.block as usize)
            .and_then(|slot| slot.as_mut())
            .filter(|entry| entry.allocator.holds(handle.node, handle.generation))
            .unwrap_or_else(|| panic!("region handle does not belong to this allocator"))
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        for entry in self.entries.iter().flatten() {
            entry.allocator.check_invariants();
        }
    }
}
