//! Range splitting for bucketed systems.

use std::ops::Range;

/// Splits `0..count` into `bucket_count` contiguous ranges by linear interpolation.
///
/// Bucket `i` covers `count * i / n .. count * (i + 1) / n`, so the ranges are
/// disjoint, ordered, and the last one always ends at `count`. A `bucket_count`
/// of zero is treated as one. Buckets may be empty when `count < bucket_count`.
///
/// # Example
///
/// ```rust
/// use vesper_core::bucket_ranges;
///
/// assert_eq!(bucket_ranges(10, 3), vec![0..3, 3..6, 6..10]);
/// ```
#[must_use]
pub fn bucket_ranges(count: usize, bucket_count: usize) -> Vec<Range<usize>> {
    let n = bucket_count.max(1);
    (0..n).map(|i| count * i / n..count * (i + 1) / n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges_cover_everything() {
        for count in [0, 1, 5, 6, 7, 1000, 1001] {
            let ranges = bucket_ranges(count, 6);
            assert_eq!(ranges.len(), 6);
            assert_eq!(ranges[0].start, 0);
            assert_eq!(ranges[5].end, count);
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
        }
    }

    #[test]
    fn test_zero_buckets_is_one() {
        assert_eq!(bucket_ranges(42, 0), vec![0..42]);
    }

    #[test]
    fn test_small_counts_leave_empty_buckets() {
        let ranges = bucket_ranges(2, 6);
        let total: usize = ranges.iter().map(ExactSizeIterator::len).sum();
        assert_eq!(total, 2);
        assert!(ranges.iter().any(|r| r.is_empty()));
    }
}
