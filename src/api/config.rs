//! Allocator configuration.

use crate::util::size::mb;

/// Configuration for the block allocator.
#[derive(Debug, Clone)]
pub struct AllocatorConfig {
    /// Default block size when growing (default: 32 MiB).
    pub minimum_block_size: u64,

    /// Upper cap on block size; 0 means unlimited. A request whose grown
    /// block would exceed the cap gets a dedicated block instead.
    pub maximum_block_size: u64,

    /// Maximum number of live blocks; 0 means unlimited. Exceeding it
    /// evicts the least-recently-used empty block.
    pub maximum_block_count: u32,

    /// Round grown block sizes up to this multiple; 0 disables rounding.
    pub nearest_multiple: u64,
}

impl Default for AllocatorConfig {
    fn default() -> Self {
        Self {
            minimum_block_size: mb(32),
            maximum_block_size: 0,
            maximum_block_count: 0,
            nearest_multiple: 32,
        }
    }
}

impl AllocatorConfig {
    /// Builder pattern: set the minimum block size.
    pub fn with_minimum_block_size(mut self, size: u64) -> Self {
        self.minimum_block_size = size;
        self
    }

    /// Builder pattern: set the maximum block size.
    pub fn with_maximum_block_size(mut self, size: u64) -> Self {
        self.maximum_block_size = size;
        self
    }

    /// Builder pattern: set the maximum block count.
    pub fn with_maximum_block_count(mut self, count: u32) -> Self {
        self.maximum_block_count = count;
        self
    }

    /// Builder pattern: set the block size rounding multiple.
    pub fn with_nearest_multiple(mut self, multiple: u64) -> Self {
        self.nearest_multiple = multiple;
        self
    }
}
