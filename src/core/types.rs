//! Shared data model for blocks, regions, and requests.
//!
//! These types are the vocabulary spoken across the allocator layers and
//! the backend interface. They carry no behavior beyond property
//! compatibility checks.

use std::num::NonZeroU64;

/// Opaque identifier for a backend allocation.
///
/// Backends write one into [`MemoryBlock::handle`] or
/// [`MemoryRegion::handle`]; the core never interprets the value.
/// `None` is the detached state.
pub type BackendHandle = NonZeroU64;

/// Where an allocation must be reachable from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemoryVisibility {
    /// No preference; compatible with any holder.
    #[default]
    Default,
    /// CPU-side memory, never bound to the device.
    HostOnly,
    /// Device-local memory, not mappable.
    DeviceOnly,
    /// Readback path: device writes, host reads.
    DeviceToHost,
    /// Upload path: host writes, device reads.
    HostToDevice,
}

/// CPU caching behavior of an allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemoryCaching {
    /// No preference; compatible with any holder.
    #[default]
    Default,
    Cached,
    Uncached,
    CachedCoherent,
    UncachedCoherent,
}

/// What the memory will be used for on the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MemoryUsage {
    /// No preference; compatible with any holder.
    #[default]
    Default,
    StaticStorage,
    DynamicStorage,
    UniformStorage,
    TransferSrc,
    TransferDst,
    TransferSrcDst,
}

/// Properties attached to a block or carried by a request.
///
/// `alignment` is the holder's required placement alignment in bytes
/// (zero means none); it does not participate in compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MemoryProperties {
    pub visibility: MemoryVisibility,
    pub caching: MemoryCaching,
    pub usage: MemoryUsage,
    pub alignment: u64,
}

impl MemoryProperties {
    /// Whether a holder with these properties can serve `request`.
    ///
    /// Each axis matches when the requesting value is `Default` or equals
    /// the holder's value.
    pub fn accepts(&self, request: &MemoryProperties) -> bool {
        if request.caching != MemoryCaching::Default && request.caching != self.caching {
            return false;
        }
        if request.visibility != MemoryVisibility::Default && request.visibility != self.visibility {
            return false;
        }
        if request.usage != MemoryUsage::Default && request.usage != self.usage {
            return false;
        }
        true
    }
}

/// A caller's request for a region of device memory.
#[derive(Debug, Clone, Copy)]
pub struct MemoryRequest {
    /// Requested size in bytes. Must be non-zero.
    pub size: u64,
    /// Requested alignment in bytes. Must be a power of two; zero is
    /// normalized to one.
    pub alignment: u64,
    /// Properties the serving block must be compatible with.
    pub properties: MemoryProperties,
    /// Request a block allocated specifically for this region.
    pub dedicated: bool,
}

impl MemoryRequest {
    /// Request `size` bytes with no alignment or property constraints.
    pub fn new(size: u64) -> Self {
        Self {
            size,
            alignment: 1,
            properties: MemoryProperties::default(),
            dedicated: false,
        }
    }

    /// Set the alignment requirement.
    pub fn with_alignment(mut self, alignment: u64) -> Self {
        self.alignment = alignment;
        self
    }

    /// Set the property constraints.
    pub fn with_properties(mut self, properties: MemoryProperties) -> Self {
        self.properties = properties;
        self
    }

    /// Mark the request as dedicated.
    pub fn dedicated(mut self) -> Self {
        self.dedicated = true;
        self
    }
}

/// A sub-range of a block, handed out to a caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryRegion {
    /// Backend identifier, attached on first use.
    pub handle: Option<BackendHandle>,
    /// Byte offset within the owning block.
    pub offset: u64,
    /// Size in bytes.
    pub size: u64,
    /// Properties inherited from the owning block.
    pub properties: MemoryProperties,
    /// Whether this region occupies a block allocated specifically for it.
    pub dedicated: bool,
    /// Whether the backend handle is owned by this region.
    pub is_owner: bool,
}

/// A contiguous backend allocation carved into regions.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryBlock {
    /// Backend identifier written by the block-allocate callback.
    pub handle: Option<BackendHandle>,
    /// Size in bytes.
    pub size: u64,
    /// Properties all regions of this block inherit.
    pub properties: MemoryProperties,
    /// Whether the block was allocated for a single dedicated region.
    pub dedicated: bool,
}

/// Allocation state of a region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AllocationStatus {
    /// Free for placement; may still cache a backend handle.
    #[default]
    Available,
    /// Reserved by a caller.
    InUse,
    /// Reserved and occupying a dedicated block.
    Dedicated,
}

/// Internal region-list node. Regions of one block form an index-linked
/// list over the owning allocator's arena, ordered by ascending offset.
#[derive(Debug, Default)]
pub(crate) struct BlockRegion {
    pub memory: MemoryRegion,
    pub status: AllocationStatus,
    /// Retain count; zero means unreferenced.
    pub usage_count: u32,
    pub prev: Option<u32>,
    pub next: Option<u32>,
}

/// A block plus its region-list bookkeeping.
#[derive(Debug)]
pub(crate) struct BlockResource {
    pub memory: MemoryBlock,
    /// Bytes currently in `InUse` or `Dedicated` regions.
    pub reserved: u64,
    /// Head of the region list (offset zero).
    pub regions: Option<u32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_properties_accept_anything() {
        let holder = MemoryProperties {
            visibility: MemoryVisibility::DeviceOnly,
            caching: MemoryCaching::Cached,
            usage: MemoryUsage::StaticStorage,
            alignment: 0,
        };
        assert!(holder.accepts(&MemoryProperties::default()));
    }

    #[test]
    fn test_mismatched_axis_rejected() {
        let holder = MemoryProperties {
            caching: MemoryCaching::Cached,
            ..MemoryProperties::default()
        };
        let request = MemoryProperties {
            caching: MemoryCaching::Uncached,
            ..MemoryProperties::default()
        };
        assert!(!holder.accepts(&request));
    }

    #[test]
    fn test_exact_match_accepted() {
        let holder = MemoryProperties {
            visibility: MemoryVisibility::HostToDevice,
            usage: MemoryUsage::TransferSrc,
            ..MemoryProperties::default()
        };
        let request = holder;
        assert!(holder.accepts(&request));
    }

    #[test]
    fn test_alignment_ignored_by_compatibility() {
        let holder = MemoryProperties {
            alignment: 64,
            ..MemoryProperties::default()
        };
        let request = MemoryProperties {
            alignment: 128,
            ..MemoryProperties::default()
        };
        assert!(holder.accepts(&request));
    }
}
