use crate::ExtractError;

/// An inclusive range of block numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockRange {
    /// First block in the range.
    pub start: i64,
    /// Last block in the range.
    pub end: i64,
}

/// Split `[lower, upper]` into contiguous windows of `interval` blocks; the
/// last window may be shorter. Fails iff `upper <= lower`. `interval` must
/// be positive.
pub fn chunk_ranges(
    lower: i64,
    upper: i64,
    interval: i64,
) -> Result<Vec<BlockRange>, ExtractError> {
    debug_assert!(interval > 0, "chunk interval must be positive");
    if upper <= lower {
        return Err(ExtractError::InvalidRange { lower, upper });
    }

    let mut ranges = Vec::new();
    let mut start = lower;
    while start <= upper {
        ranges.push(BlockRange { start, end: upper.min(start + interval - 1) });
        start += interval;
    }
    Ok(ranges)
}
