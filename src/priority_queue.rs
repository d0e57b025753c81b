use crate::error::KdError;

#[derive(Clone, Copy, Debug)]
struct Entry {
    weight: f64,
    index: usize,
}

/// A fixed-capacity max-heap on weight, keeping the `max_size` smallest
/// candidates seen so far.
///
/// The heap root is the *largest* kept weight (the worst of the best), so a
/// k-nearest-neighbor search can reject a candidate or prune a subtree with a
/// single comparison against [`top_weight`](Self::top_weight). Entries are
/// `(original point index, squared distance)` pairs.
///
/// The queue is query-scoped scratch state: [`initialize`](Self::initialize)
/// resets it between queries and reuses the backing storage when the capacity
/// is unchanged.
#[derive(Clone, Debug, Default)]
pub struct BoundedPriorityQueue {
    entries: Vec<Entry>,
    max_size: usize,
}

impl BoundedPriorityQueue {
    /// An empty queue with zero capacity. No allocation until `initialize`.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            max_size: 0,
        }
    }

    /// (Re)allocates backing storage for up to `max_size` entries and resets
    /// the live count to zero. Calling with an unchanged `max_size` reuses the
    /// existing storage.
    ///
    /// On allocation failure the queue is left empty with zero capacity and
    /// the error is propagated.
    pub fn initialize(&mut self, max_size: usize) -> Result<(), KdError> {
        self.entries.clear();
        if let Err(err) = self.entries.try_reserve_exact(max_size) {
            self.entries = Vec::new();
            self.max_size = 0;
            return Err(KdError::AllocationFailed(err));
        }
        self.max_size = max_size;
        Ok(())
    }

    /// Offers a candidate to the queue.
    ///
    /// Below capacity the entry is always kept. At capacity it replaces the
    /// current maximum only if its weight is strictly smaller; otherwise it is
    /// discarded. Equal-weight candidates are not ordered: either of two
    /// equal entries may be kept, and callers must not rely on which.
    pub fn insert(&mut self, index: usize, weight: f64) {
        if self.max_size == 0 {
            return;
        }
        if self.entries.len() < self.max_size {
            self.entries.push(Entry { weight, index });
            self.sift_up(self.entries.len() - 1);
        } else if weight < self.entries[0].weight {
            self.entries[0] = Entry { weight, index };
            self.sift_down(0);
        }
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Capacity set by the last successful `initialize`.
    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// The largest weight among held entries, or `f64::INFINITY` when empty.
    pub fn top_weight(&self) -> f64 {
        self.entries.first().map_or(f64::INFINITY, |e| e.weight)
    }

    /// Weight stored in raw heap slot `slot` (heap order, not sorted order).
    pub fn weight(&self, slot: usize) -> f64 {
        self.entries[slot].weight
    }

    /// Index stored in raw heap slot `slot` (heap order, not sorted order).
    pub fn index(&self, slot: usize) -> usize {
        self.entries[slot].index
    }

    /// Iterates the held `(index, weight)` entries in heap order.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.entries.iter().map(|e| (e.index, e.weight))
    }

    fn sift_up(&mut self, mut child: usize) {
        while child > 0 {
            let parent = (child - 1) / 2;
            if self.entries[parent].weight >= self.entries[child].weight {
                break;
            }
            self.entries.swap(parent, child);
            child = parent;
        }
    }

    fn sift_down(&mut self, mut parent: usize) {
        let count = self.entries.len();
        loop {
            let left = 2 * parent + 1;
            if left >= count {
                break;
            }
            let right = left + 1;
            let mut largest = left;
            if right < count && self.entries[right].weight > self.entries[left].weight {
                largest = right;
            }
            if self.entries[largest].weight <= self.entries[parent].weight {
                break;
            }
            self.entries.swap(parent, largest);
            parent = largest;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_below_capacity() {
        let mut queue = BoundedPriorityQueue::new();
        queue.initialize(4).unwrap();

        queue.insert(0, 9.0);
        queue.insert(1, 1.0);
        queue.insert(2, 4.0);

        assert_eq!(queue.len(), 3);
        assert_eq!(queue.top_weight(), 9.0);
    }

    #[test]
    fn test_eviction_at_capacity() {
        let mut queue = BoundedPriorityQueue::new();
        queue.initialize(3).unwrap();

        queue.insert(0, 9.0);
        queue.insert(1, 4.0);
        queue.insert(2, 16.0);

        // Better candidate evicts the current worst (16.0)
        queue.insert(3, 1.0);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.top_weight(), 9.0);

        // Worse candidate is discarded
        queue.insert(4, 25.0);
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.top_weight(), 9.0);

        let mut kept: Vec<f64> = queue.iter().map(|(_, w)| w).collect();
        kept.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(kept, vec![1.0, 4.0, 9.0]);
    }

    #[test]
    fn test_heap_invariant_random() {
        let mut queue = BoundedPriorityQueue::new();
        queue.initialize(8).unwrap();

        // Deterministic but scrambled insertion order
        for i in 0..100usize {
            let weight = ((i * 37) % 101) as f64;
            queue.insert(i, weight);
        }

        assert_eq!(queue.len(), 8);
        // Parent >= child for every slot
        for child in 1..queue.len() {
            let parent = (child - 1) / 2;
            assert!(
                queue.weight(parent) >= queue.weight(child),
                "heap violated at slot {}: parent {} < child {}",
                child,
                queue.weight(parent),
                queue.weight(child)
            );
        }
        // The 8 smallest of the inserted weights survive
        let mut kept: Vec<f64> = queue.iter().map(|(_, w)| w).collect();
        kept.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(kept, vec![0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_initialize_resets_and_reuses() {
        let mut queue = BoundedPriorityQueue::new();
        queue.initialize(5).unwrap();
        for i in 0..5 {
            queue.insert(i, i as f64);
        }
        let capacity_before = queue.entries.capacity();

        queue.initialize(5).unwrap();
        assert_eq!(queue.len(), 0);
        assert_eq!(queue.max_size(), 5);
        assert_eq!(queue.entries.capacity(), capacity_before);
    }

    #[test]
    fn test_zero_capacity_discards_everything() {
        let mut queue = BoundedPriorityQueue::new();
        queue.initialize(0).unwrap();
        queue.insert(0, 1.0);
        assert!(queue.is_empty());
        assert_eq!(queue.top_weight(), f64::INFINITY);
    }
}
