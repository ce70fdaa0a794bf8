//! Allocator error types.

use thiserror::Error;

/// Recoverable failures surfaced by `reserve`.
///
/// Invalid requests (zero size, non-power-of-two alignment) and foreign
/// or stale handles are programmer errors and panic instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AllocError {
    /// A backend callback failed, or no block can grow to accommodate
    /// the request.
    #[error("out of device memory")]
    OutOfMemory,
    /// No compatible region was found and block growth is disallowed by
    /// the configuration.
    #[error("no fitting region and block growth is disallowed")]
    NoFit,
}
