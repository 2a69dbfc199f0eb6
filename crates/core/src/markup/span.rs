//! Byte-range bookkeeping for the markup transformer.
//!
//! [`ByteRange`] is a half-open `start..end` interval over a UTF-8 string and
//! [`SpanSet`] is a sorted, non-overlapping set of them. The protection mask
//! used by the inline and bare-reference passes is a `SpanSet`.

use std::ops::Range;

/// Half-open byte interval `start..end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    /// Build a range, swapping the bounds if they are given in reverse order
    pub fn new(start: usize, end: usize) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self {
                start: end,
                end: start,
            }
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True when the two ranges share at least one byte
    pub fn overlaps(&self, other: &ByteRange) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// True when `other` lies entirely inside `self`
    pub fn contains(&self, other: &ByteRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        self.start <= offset && offset < self.end
    }

    /// Slice `text` by this range
    pub fn slice<'a>(&self, text: &'a str) -> &'a str {
        &text[self.start..self.end]
    }
}

impl From<Range<usize>> for ByteRange {
    fn from(range: Range<usize>) -> Self {
        ByteRange::new(range.start, range.end)
    }
}

impl From<regex::Match<'_>> for ByteRange {
    fn from(m: regex::Match<'_>) -> Self {
        ByteRange::new(m.start(), m.end())
    }
}

/// Sorted set of disjoint byte ranges
///
/// Inserting a range that touches or overlaps existing ranges merges them, so
/// queries are a binary search over at most one candidate on each side.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpanSet {
    ranges: Vec<ByteRange>,
}

impl SpanSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ByteRange> {
        self.ranges.iter()
    }

    /// Insert a range, merging it with any range it overlaps or abuts
    pub fn insert(&mut self, range: impl Into<ByteRange>) {
        let range = range.into();
        if range.is_empty() {
            return;
        }

        // First range whose end reaches the new start (candidates for merging).
        let first = self.ranges.partition_point(|r| r.end < range.start);
        let mut merged = range;
        let mut last = first;
        while last < self.ranges.len() && self.ranges[last].start <= merged.end {
            merged.start = merged.start.min(self.ranges[last].start);
            merged.end = merged.end.max(self.ranges[last].end);
            last += 1;
        }
        self.ranges.splice(first..last, std::iter::once(merged));
    }

    /// True when any byte of `range` is already claimed
    pub fn overlaps(&self, range: &ByteRange) -> bool {
        if range.is_empty() {
            return self.contains_offset(range.start);
        }
        let idx = self.ranges.partition_point(|r| r.end <= range.start);
        self.ranges
            .get(idx)
            .is_some_and(|candidate| candidate.overlaps(range))
    }

    /// True when `range` lies entirely inside one claimed range
    pub fn contains(&self, range: &ByteRange) -> bool {
        let idx = self.ranges.partition_point(|r| r.end < range.end);
        self.ranges
            .get(idx)
            .is_some_and(|candidate| candidate.contains(range))
    }

    pub fn contains_offset(&self, offset: usize) -> bool {
        let idx = self.ranges.partition_point(|r| r.end <= offset);
        self.ranges
            .get(idx)
            .is_some_and(|candidate| candidate.contains_offset(offset))
    }
}

impl<R: Into<ByteRange>> FromIterator<R> for SpanSet {
    fn from_iter<I: IntoIterator<Item = R>>(iter: I) -> Self {
        let mut set = SpanSet::new();
        for range in iter {
            set.insert(range);
        }
        set
    }
}

impl<R: Into<ByteRange>> Extend<R> for SpanSet {
    fn extend<I: IntoIterator<Item = R>>(&mut self, iter: I) {
        for range in iter {
            self.insert(range);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ============================================================================
    // ByteRange tests
    // ============================================================================

    #[test]
    fn test_byte_range_new_orders_bounds() {
        assert_eq!(ByteRange::new(7, 3), ByteRange { start: 3, end: 7 });
    }

    #[test]
    fn test_byte_range_overlaps_is_half_open() {
        let a = ByteRange::new(0, 5);
        assert!(a.overlaps(&ByteRange::new(4, 8)));
        assert!(!a.overlaps(&ByteRange::new(5, 8)));
    }

    #[test]
    fn test_byte_range_contains() {
        let outer = ByteRange::new(2, 10);
        assert!(outer.contains(&ByteRange::new(2, 10)));
        assert!(outer.contains(&ByteRange::new(3, 4)));
        assert!(!outer.contains(&ByteRange::new(1, 4)));
    }

    #[test]
    fn test_byte_range_slice() {
        assert_eq!(ByteRange::new(4, 9).slice("see example.com"), "examp");
    }

    // ============================================================================
    // SpanSet tests
    // ============================================================================

    #[test]
    fn test_span_set_merges_overlapping_and_adjacent() {
        let set: SpanSet = vec![0..3, 2..5, 5..7, 10..12].into_iter().collect();
        let ranges: Vec<_> = set.iter().copied().collect();
        assert_eq!(ranges, vec![ByteRange::new(0, 7), ByteRange::new(10, 12)]);
    }

    #[test]
    fn test_span_set_insert_out_of_order() {
        let mut set = SpanSet::new();
        set.insert(20..25);
        set.insert(0..2);
        set.insert(8..9);
        let ranges: Vec<_> = set.iter().copied().collect();
        assert_eq!(
            ranges,
            vec![
                ByteRange::new(0, 2),
                ByteRange::new(8, 9),
                ByteRange::new(20, 25)
            ]
        );
    }

    #[test]
    fn test_span_set_insert_bridges_ranges() {
        let mut set: SpanSet = vec![0..2, 4..6, 8..10].into_iter().collect();
        set.insert(1..9);
        assert_eq!(set.len(), 1);
        assert!(set.contains(&ByteRange::new(0, 10)));
    }

    #[test]
    fn test_span_set_ignores_empty_ranges() {
        let mut set = SpanSet::new();
        set.insert(3..3);
        assert!(set.is_empty());
    }

    #[test]
    fn test_span_set_overlaps() {
        let set: SpanSet = vec![5..10, 20..30].into_iter().collect();
        assert!(set.overlaps(&ByteRange::new(0, 6)));
        assert!(set.overlaps(&ByteRange::new(25, 40)));
        assert!(!set.overlaps(&ByteRange::new(10, 20)));
        assert!(!set.overlaps(&ByteRange::new(0, 5)));
    }

    #[test]
    fn test_span_set_contains() {
        let set: SpanSet = vec![5..10].into_iter().collect();
        assert!(set.contains(&ByteRange::new(6, 9)));
        assert!(!set.contains(&ByteRange::new(6, 11)));
        assert!(!set.contains(&ByteRange::new(0, 1)));
    }

    #[test]
    fn test_span_set_contains_offset() {
        let set: SpanSet = vec![5..10].into_iter().collect();
        assert!(set.contains_offset(5));
        assert!(set.contains_offset(9));
        assert!(!set.contains_offset(10));
    }
}
