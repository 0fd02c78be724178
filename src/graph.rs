//! Circular sample history behind the strip chart

/// Ring of the last `C` plotted y-coordinates.
///
/// New samples overwrite the oldest once the ring is full.
pub struct GraphBuffer<const C: usize> {
    data: [u8; C],
    position: usize,
    size: usize,
}

impl<const C: usize> GraphBuffer<C> {
    pub const fn new() -> Self {
        const { assert!(C > 0, "graph buffer needs at least one slot") };
        Self {
            data: [0; C],
            // One step before slot 0, so the first push lands at index 0
            position: C - 1,
            size: 0,
        }
    }

    /// Index of the most recent sample, `None` while empty
    pub fn position(&self) -> Option<usize> {
        (self.size > 0).then_some(self.position)
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn is_full(&self) -> bool {
        self.size == C
    }

    pub const fn capacity(&self) -> usize {
        C
    }

    pub fn push(&mut self, value: u8) {
        self.position = (self.position + 1) % C;
        self.data[self.position] = value;
        if self.size < C {
            self.size += 1;
        }
    }

    pub fn clear(&mut self) {
        self.position = C - 1;
        self.size = 0;
    }

    /// Samples from the newest backward, each exactly once.
    pub fn iter_newest_first(&self) -> impl Iterator<Item = u8> + '_ {
        (0..self.size).map(move |age| self.data[(self.position + C - age) % C])
    }
}

impl<const C: usize> Default for GraphBuffer<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Map a raw sensor byte to a y-coordinate in `0..=full_scale`, where
/// `full_scale` is the bottom of the trace and larger readings sit higher.
pub fn scale_sample(raw: u8, full_scale: u8) -> u8 {
    let scaled = ((raw as u32) << 2) * full_scale as u32 / 1024;
    full_scale - scaled.min(full_scale as u32) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    const C: usize = 157;

    #[test]
    fn empty_buffer_has_no_position() {
        let graph: GraphBuffer<C> = GraphBuffer::new();
        assert_eq!(graph.position(), None);
        assert!(graph.is_empty());
        assert_eq!(graph.iter_newest_first().count(), 0);
    }

    #[test]
    fn first_sample_lands_in_slot_zero() {
        let mut graph: GraphBuffer<C> = GraphBuffer::new();
        graph.push(42);
        assert_eq!(graph.position(), Some(0));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn overflow_keeps_size_at_capacity_and_drops_oldest() {
        let mut graph: GraphBuffer<C> = GraphBuffer::new();
        for i in 0..=C {
            graph.push((i % 256) as u8);
        }

        assert_eq!(graph.len(), C);
        assert!(graph.is_full());
        // The (C+1)-th sample wrapped around into slot 0
        assert_eq!(graph.position(), Some(0));

        let newest: Vec<u8> = graph.iter_newest_first().collect();
        assert_eq!(newest.len(), C);
        assert_eq!(newest[0], C as u8);
        assert!(!newest.contains(&0));
    }

    #[test]
    fn full_ring_iterates_in_reverse_insertion_order() {
        let mut graph: GraphBuffer<C> = GraphBuffer::new();
        for i in 0..C {
            graph.push(i as u8);
        }

        let newest: Vec<u8> = graph.iter_newest_first().collect();
        let expected: Vec<u8> = (0..C).rev().map(|i| i as u8).collect();
        assert_eq!(newest, expected);
    }

    #[test]
    fn single_slot_ring_keeps_newest() {
        let mut graph: GraphBuffer<1> = GraphBuffer::new();
        graph.push(5);
        graph.push(9);
        assert_eq!(graph.position(), Some(0));
        assert_eq!(graph.len(), 1);
        assert_eq!(graph.iter_newest_first().collect::<Vec<_>>(), [9]);
    }

    #[test]
    fn clear_forgets_history() {
        let mut graph: GraphBuffer<4> = GraphBuffer::new();
        graph.push(1);
        graph.push(2);
        graph.clear();
        assert_eq!(graph.position(), None);
        graph.push(3);
        assert_eq!(graph.position(), Some(0));
        assert_eq!(graph.iter_newest_first().collect::<Vec<_>>(), [3]);
    }

    #[test]
    fn scaling_maps_zero_to_bottom() {
        assert_eq!(scale_sample(0, 230), 230);
    }

    #[test]
    fn scaling_full_reading_stays_in_range() {
        // 255 << 2 = 1020; 1020 * 230 / 1024 = 229
        assert_eq!(scale_sample(255, 230), 1);
        for raw in 0..=u8::MAX {
            assert!(scale_sample(raw, 230) <= 230);
        }
    }

    #[test]
    fn scaling_is_monotonic() {
        let ys: Vec<u8> = (0..=u8::MAX).map(|raw| scale_sample(raw, 230)).collect();
        assert!(ys.windows(2).all(|pair| pair[0] >= pair[1]));
    }
}
