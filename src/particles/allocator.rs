//! First-fit segment allocator over the particle buffer.
//!
//! Free space is a list of half-open `(start, end)` ranges, sorted by start,
//! with no empty, overlapping or touching ranges.

use crate::particles::emitter::Segment;

#[derive(Debug, Clone)]
pub struct SegmentAllocator {
    capacity: u32,
    reserved: u32,
    free: Vec<(u32, u32)>,
}

impl SegmentAllocator {
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        let free = if capacity > 0 { vec![(0, capacity)] } else { Vec::new() };
        Self {
            capacity,
            reserved: 0,
            free,
        }
    }

    #[inline]
    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    /// Total length of all allocated segments.
    #[inline]
    #[must_use]
    pub fn reserved(&self) -> u32 {
        self.reserved
    }

    #[inline]
    #[must_use]
    pub fn free_ranges(&self) -> &[(u32, u32)] {
        &self.free
    }

    /// Exclusive upper bound of all allocated slots.
    #[must_use]
    pub fn high_water_mark(&self) -> u32 {
        match self.free.last() {
            Some(&(start, end)) if end == self.capacity => start,
            _ => self.capacity,
        }
    }

    /// Takes `length` slots from the front of the first free range large
    /// enough. Returns `None` when no range fits.
    pub fn allocate(&mut self, length: u32) -> Option<Segment> {
        if length == 0 {
            return None;
        }
        let position = self
            .free
            .iter()
            .position(|&(start, end)| end - start >= length)?;

        let range = &mut self.free[position];
        let segment = Segment {
            index: range.0,
            length,
        };
        range.0 += length;
        if range.0 == range.1 {
            self.free.remove(position);
        }
        self.reserved += length;
        Some(segment)
    }

    /// Returns a segment to the free list, merging it with its neighbours.
    pub fn free(&mut self, segment: Segment) {
        if segment.is_empty() {
            return;
        }
        let (start, end) = (segment.index, segment.end());
        debug_assert!(end <= self.capacity, "segment outside of buffer");

        let next = self.free.partition_point(|&(s, _)| s < start);
        debug_assert!(
            next == self.free.len() || end <= self.free[next].0,
            "segment overlaps free space"
        );
        debug_assert!(
            next == 0 || self.free[next - 1].1 <= start,
            "segment overlaps free space"
        );

        let joins_prev = next > 0 && self.free[next - 1].1 == start;
        let joins_next = next < self.free.len() && self.free[next].0 == end;

        match (joins_prev, joins_next) {
            (true, true) => {
                self.free[next - 1].1 = self.free[next].1;
                self.free.remove(next);
            }
            (true, false) => self.free[next - 1].1 = end,
            (false, true) => self.free[next].0 = start,
            (false, false) => self.free.insert(next, (start, end)),
        }
        self.reserved -= segment.length;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(index: u32, length: u32) -> Segment {
        Segment { index, length }
    }

    fn assert_canonical(alloc: &SegmentAllocator) {
        for w in alloc.free_ranges().windows(2) {
            assert!(w[0].1 < w[1].0, "ranges touch or overlap: {:?}", alloc.free_ranges());
        }
        for &(s, e) in alloc.free_ranges() {
            assert!(s < e);
        }
    }

    #[test]
    fn first_fit_takes_front_of_first_range() {
        let mut alloc = SegmentAllocator::new(30);
        let a = alloc.allocate(10).unwrap();
        let b = alloc.allocate(10).unwrap();
        alloc.free(a);
        assert_eq!(alloc.free_ranges(), &[(0, 10), (20, 30)]);
        let _ = b;

        let c = alloc.allocate(5).unwrap();
        assert_eq!(c, seg(0, 5));
        assert_eq!(alloc.free_ranges(), &[(5, 10), (20, 30)]);
    }

    #[test]
    fn skips_ranges_that_are_too_small() {
        let mut alloc = SegmentAllocator::new(30);
        let a = alloc.allocate(10).unwrap();
        let _b = alloc.allocate(10).unwrap();
        alloc.free(a);

        assert_eq!(alloc.allocate(15), None);
        assert_eq!(alloc.allocate(10), Some(seg(0, 10)));
        assert_eq!(alloc.allocate(8), Some(seg(20, 8)));
        assert_eq!(alloc.free_ranges(), &[(28, 30)]);
    }

    #[test]
    fn free_merges_both_neighbours() {
        let mut alloc = SegmentAllocator::new(30);
        let a = alloc.allocate(10).unwrap();
        let b = alloc.allocate(10).unwrap();
        let c = alloc.allocate(10).unwrap();
        alloc.free(a);
        alloc.free(c);
        assert_eq!(alloc.free_ranges(), &[(0, 10), (20, 30)]);
        alloc.free(b);
        assert_eq!(alloc.free_ranges(), &[(0, 30)]);
        assert_eq!(alloc.reserved(), 0);
    }

    #[test]
    fn free_inserts_detached_range_in_order() {
        let mut alloc = SegmentAllocator::new(40);
        let segs: Vec<_> = (0..4).map(|_| alloc.allocate(10).unwrap()).collect();
        alloc.free(segs[2]);
        alloc.free(segs[0]);
        assert_eq!(alloc.free_ranges(), &[(0, 10), (20, 30)]);
        assert_canonical(&alloc);
    }

    #[test]
    fn exhausted_buffer_yields_none() {
        let mut alloc = SegmentAllocator::new(16);
        assert!(alloc.allocate(16).is_some());
        assert!(alloc.free_ranges().is_empty());
        assert_eq!(alloc.allocate(1), None);
        assert_eq!(alloc.high_water_mark(), 16);
    }

    #[test]
    fn high_water_mark_tracks_last_allocation() {
        let mut alloc = SegmentAllocator::new(100);
        let a = alloc.allocate(10).unwrap();
        let b = alloc.allocate(20).unwrap();
        assert_eq!(alloc.high_water_mark(), 30);
        alloc.free(b);
        assert_eq!(alloc.high_water_mark(), 10);
        alloc.free(a);
        assert_eq!(alloc.high_water_mark(), 0);
    }

    #[test]
    fn churn_keeps_free_list_canonical() {
        let mut alloc = SegmentAllocator::new(1000);
        let mut live = Vec::new();
        for i in 0..200u32 {
            if i % 3 == 2 && !live.is_empty() {
                let s = live.remove((i as usize * 7) % live.len());
                alloc.free(s);
            } else if let Some(s) = alloc.allocate(1 + i % 17) {
                live.push(s);
            }
            assert_canonical(&alloc);
            let total: u32 = live.iter().map(|s: &Segment| s.length).sum();
            assert_eq!(alloc.reserved(), total);
        }
        for (i, a) in live.iter().enumerate() {
            for b in &live[i + 1..] {
                assert!(!a.overlaps(b));
            }
        }
    }
}
