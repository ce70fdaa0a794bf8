//! Alignment arithmetic for region placement.

/// Round a value up to the given alignment.
///
/// `align` must be a power of two.
#[inline]
pub const fn align_up(value: u64, align: u64) -> u64 {
    (value + align - 1) & !(align - 1)
}

/// Offset at which a placement starting at `offset` conforms to `align`.
#[inline]
pub const fn aligned_offset(offset: u64, align: u64) -> u64 {
    align_up(offset, align)
}

/// Bytes consumed by a placement of `size` at `offset` once its end is
/// padded out to `align`.
#[inline]
pub const fn aligned_size(offset: u64, size: u64, align: u64) -> u64 {
    align_up(offset + size, align) - offset
}

/// Reconcile a requested alignment with the holder's required alignment
/// by taking the stronger of the two, rounded up to a power of two.
///
/// Zero on either side is treated as "no requirement".
#[inline]
pub const fn conform_alignment(requested: u64, required: u64) -> u64 {
    let stronger = if requested > required { requested } else { required };
    if stronger <= 1 {
        1
    } else {
        stronger.next_power_of_two()
    }
}

/// Round a size up to the nearest multiple of `multiple`.
///
/// Unlike [`align_up`] the multiple need not be a power of two; zero
/// disables rounding.
#[inline]
pub const fn round_up_to_multiple(value: u64, multiple: u64) -> u64 {
    if multiple == 0 {
        value
    } else {
        value.div_ceil(multiple) * multiple
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_align_up() {
        assert_eq!(align_up(0, 8), 0);
        assert_eq!(align_up(1, 8), 8);
        assert_eq!(align_up(8, 8), 8);
        assert_eq!(align_up(9, 8), 16);
    }

    #[test]
    fn test_aligned_offset() {
        assert_eq!(aligned_offset(0, 64), 0);
        assert_eq!(aligned_offset(4, 64), 64);
        assert_eq!(aligned_offset(64, 64), 64);
    }

    #[test]
    fn test_aligned_size() {
        // placement at an aligned offset consumes exactly the size
        assert_eq!(aligned_size(0, 16, 16), 16);
        // end padding is charged to the placement
        assert_eq!(aligned_size(0, 5, 8), 8);
        assert_eq!(aligned_size(8, 5, 8), 8);
        assert_eq!(aligned_size(16, 32, 16), 32);
    }

    #[test]
    fn test_conform_alignment() {
        assert_eq!(conform_alignment(16, 64), 64);
        assert_eq!(conform_alignment(128, 64), 128);
        assert_eq!(conform_alignment(0, 0), 1);
        assert_eq!(conform_alignment(4, 0), 4);
        // non-power-of-two inputs are promoted
        assert_eq!(conform_alignment(48, 0), 64);
    }

    #[test]
    fn test_round_up_to_multiple() {
        assert_eq!(round_up_to_multiple(1000, 32), 1024);
        assert_eq!(round_up_to_multiple(1024, 32), 1024);
        assert_eq!(round_up_to_multiple(7, 0), 7);
    }
}
