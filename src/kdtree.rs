use std::cmp::Ordering;

use rayon::prelude::*;

use crate::bounds::BoundingBox;
use crate::error::KdError;
use crate::priority_queue::BoundedPriorityQueue;

/// A node of the tree, stored in a flat array.
///
/// Internal nodes always have exactly two children, allocated as adjacent
/// slots; the sibling of `first_child` is `first_child + 1`. Leaves reference
/// a contiguous range of the tree's permuted point storage.
#[derive(Clone, Copy, Debug)]
pub enum KdNode {
    Internal {
        /// Splitting dimension (0 = x, 1 = y, 2 = z).
        axis: u8,
        /// Points with coordinate `< split` go left, `>= split` go right.
        split: f64,
        /// Slot of the left child; the right child is `first_child + 1`.
        first_child: u32,
    },
    Leaf {
        /// First slot of the leaf's range in the permuted point array.
        start: u32,
        /// Number of points in the range.
        size: u32,
    },
}

/// Construction parameters for a [`KdTree`].
#[derive(Clone, Copy, Debug)]
pub struct KdTreeOptions {
    /// Ranges at or below this size become leaves without further splitting.
    pub min_leaf_size: usize,
    /// Hard recursion cap; ranges at this depth become leaves regardless of size.
    pub max_depth: usize,
    /// Split on the approximate median coordinate instead of the bounding-box
    /// midpoint. Evens out subtree sizes at a higher construction cost.
    pub balanced: bool,
}

impl Default for KdTreeOptions {
    fn default() -> Self {
        Self {
            min_leaf_size: 16,
            max_depth: 64,
            balanced: false,
        }
    }
}

#[derive(Clone, Copy)]
struct QueryFrame {
    node: u32,
    /// Lower bound on the squared distance from the query point to any point
    /// in this subtree.
    bound: f64,
}

/// A k-d tree over an immutable 3D point set.
///
/// The tree owns a reordered copy of the input points together with a
/// permutation mapping each stored point back to its original ordinal, so
/// query results always report caller-side indices. Nodes live in one flat
/// array; leaves cover contiguous point ranges.
///
/// Construction is one-shot; there is no insertion or deletion. Queries are
/// read-only, so a built tree can be shared across threads as long as each
/// concurrent query uses its own [`BoundedPriorityQueue`].
///
/// All distances are *squared* Euclidean distances. Callers that need true
/// distances must take the square root themselves.
pub struct KdTree {
    nodes: Vec<KdNode>,
    points: Vec<[f64; 3]>,
    original: Vec<usize>,
    bounds: BoundingBox,
    depth: usize,
    options: KdTreeOptions,
}

impl KdTree {
    /// Builds an index over `points` with default options.
    ///
    /// Fails with [`KdError::EmptyPointSet`] when `points` is empty. The
    /// caller's slice is copied and may be freely modified or dropped
    /// afterwards.
    pub fn build(points: &[[f64; 3]]) -> Result<Self, KdError> {
        Self::build_with(points, KdTreeOptions::default())
    }

    /// Builds an index with explicit construction parameters.
    pub fn build_with(points: &[[f64; 3]], options: KdTreeOptions) -> Result<Self, KdError> {
        if points.is_empty() {
            return Err(KdError::EmptyPointSet);
        }

        let mut tree = Self {
            nodes: Vec::new(),
            points: points.to_vec(),
            original: (0..points.len()).collect(),
            bounds: BoundingBox::from_points(points),
            depth: 0,
            options,
        };

        // A tree over N points has at most 2 * ceil(N / leaf) nodes
        let leaf = options.min_leaf_size.max(1);
        tree.nodes.reserve(2 * points.len().div_ceil(leaf));

        tree.nodes.push(KdNode::Leaf { start: 0, size: 0 });
        tree.depth = tree.split_node(0, 0, points.len(), 0);
        Ok(tree)
    }

    /// Recursively partitions `[start, end)` into the node at `node_id`.
    /// Returns the maximum depth reached in this subtree.
    fn split_node(&mut self, node_id: usize, start: usize, end: usize, depth: usize) -> usize {
        let count = end - start;
        if count <= self.options.min_leaf_size || depth >= self.options.max_depth {
            self.nodes[node_id] = KdNode::Leaf {
                start: start as u32,
                size: count as u32,
            };
            return depth;
        }

        let range_bounds = BoundingBox::from_points(&self.points[start..end]);
        let axis = range_bounds.split_axis();
        let split = if self.options.balanced {
            self.approximate_median(start, end, axis)
        } else {
            range_bounds.midpoint(axis)
        };

        let mid = self.partition(start, end, axis, split);
        if mid == start || mid == end {
            // One-sided split (degenerate or zero-extent range), stop here
            self.nodes[node_id] = KdNode::Leaf {
                start: start as u32,
                size: count as u32,
            };
            return depth;
        }

        let first_child = self.nodes.len();
        self.nodes.push(KdNode::Leaf { start: 0, size: 0 });
        self.nodes.push(KdNode::Leaf { start: 0, size: 0 });
        self.nodes[node_id] = KdNode::Internal {
            axis: axis as u8,
            split,
            first_child: first_child as u32,
        };

        let left_depth = self.split_node(first_child, start, mid, depth + 1);
        let right_depth = self.split_node(first_child + 1, mid, end, depth + 1);
        left_depth.max(right_depth)
    }

    /// Approximate median coordinate of `[start, end)` along `axis`: the
    /// average of the sorted coordinates at `size / 2` and `size / 2 + 1`.
    ///
    /// The second index sits one past the textbook middle for even sizes;
    /// kept as-is since it still lands between the min and max coordinate,
    /// which is all the partition needs. Clamped so a two-point range cannot
    /// read past the end.
    fn approximate_median(&self, start: usize, end: usize, axis: usize) -> f64 {
        let mut coords: Vec<f64> = self.points[start..end].iter().map(|p| p[axis]).collect();
        coords.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        let size = coords.len();
        let hi = (size / 2 + 1).min(size - 1);
        0.5 * (coords[size / 2] + coords[hi])
    }

    /// Hoare two-pointer partition of `[start, end)` on `axis`: coordinates
    /// `< split` end up on the left, `>= split` on the right. Points and the
    /// original-index permutation are swapped in lockstep. Returns the first
    /// slot of the right side.
    fn partition(&mut self, start: usize, end: usize, axis: usize, split: f64) -> usize {
        let mut lo = start;
        let mut hi = end;
        while lo < hi {
            while lo < hi && self.points[lo][axis] < split {
                lo += 1;
            }
            while lo < hi && self.points[hi - 1][axis] >= split {
                hi -= 1;
            }
            if lo < hi {
                self.points.swap(lo, hi - 1);
                self.original.swap(lo, hi - 1);
                lo += 1;
                hi -= 1;
            }
        }
        lo
    }

    /// Collects the `k` nearest neighbors of `query` into `out`.
    ///
    /// `out` is reset to capacity `k` first; on allocation failure the query
    /// aborts with the queue left empty and the tree untouched. After a
    /// successful call `out` holds up to `k` entries of `(original index,
    /// squared distance)` in heap order: [`BoundedPriorityQueue::top_weight`]
    /// is the *farthest* kept distance, not the nearest. Fewer than `k`
    /// entries are returned when the point set is smaller than `k`; `k = 0`
    /// returns none.
    pub fn k_nearest(
        &self,
        query: [f64; 3],
        k: usize,
        out: &mut BoundedPriorityQueue,
    ) -> Result<(), KdError> {
        out.initialize(k)?;
        if k == 0 {
            return Ok(());
        }

        // Branch-and-bound over an explicit stack. A frame's bound is the
        // squared plane distance accumulated when its subtree was deferred;
        // the frame is only entered while that bound can still beat the
        // current k-th best.
        let mut stack: Vec<QueryFrame> = Vec::with_capacity(self.depth + 2);
        stack.push(QueryFrame { node: 0, bound: 0.0 });

        while !stack.is_empty() {
            let top = stack.len() - 1;
            let frame = stack[top];
            if out.len() >= k && frame.bound >= out.top_weight() {
                stack.pop();
                continue;
            }
            match self.nodes[frame.node as usize] {
                KdNode::Leaf { start, size } => {
                    let start = start as usize;
                    for slot in start..start + size as usize {
                        let p = self.points[slot];
                        let dx = p[0] - query[0];
                        let dy = p[1] - query[1];
                        let dz = p[2] - query[2];
                        out.insert(self.original[slot], dx * dx + dy * dy + dz * dz);
                    }
                    stack.pop();
                }
                KdNode::Internal {
                    axis,
                    split,
                    first_child,
                } => {
                    let offset = query[axis as usize] - split;
                    let (near, far) = if offset < 0.0 {
                        (first_child, first_child + 1)
                    } else {
                        (first_child + 1, first_child)
                    };
                    // Revisit this frame as the far child, gated on the plane
                    // distance; descend into the near side first.
                    stack[top] = QueryFrame {
                        node: far,
                        bound: offset * offset,
                    };
                    stack.push(QueryFrame {
                        node: near,
                        bound: frame.bound,
                    });
                }
            }
        }
        Ok(())
    }

    /// The `k` nearest neighbors of `query` as `(original index, squared
    /// distance)` pairs, sorted nearest first.
    pub fn k_nearest_sorted(
        &self,
        query: [f64; 3],
        k: usize,
    ) -> Result<Vec<(usize, f64)>, KdError> {
        let mut queue = BoundedPriorityQueue::new();
        self.k_nearest(query, k, &mut queue)?;
        let mut results: Vec<(usize, f64)> = queue.iter().collect();
        results.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        Ok(results)
    }

    /// Answers many queries in parallel, one sorted result per query point.
    ///
    /// Each rayon worker keeps its own candidate queue as scratch state, so
    /// the shared tree is only ever read.
    pub fn k_nearest_batch(
        &self,
        queries: &[[f64; 3]],
        k: usize,
    ) -> Result<Vec<Vec<(usize, f64)>>, KdError> {
        queries
            .par_iter()
            .map_init(BoundedPriorityQueue::new, |queue, &query| {
                self.k_nearest(query, k, queue)?;
                let mut results: Vec<(usize, f64)> = queue.iter().collect();
                results.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
                Ok(results)
            })
            .collect()
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// The flat node array; slot 0 is the root.
    pub fn nodes(&self) -> &[KdNode] {
        &self.nodes
    }

    /// The tree's reordered copy of the input points. Leaf ranges index into
    /// this array.
    pub fn points(&self) -> &[[f64; 3]] {
        &self.points
    }

    /// For each stored point, the ordinal of that point in the caller's
    /// original input.
    pub fn original_indices(&self) -> &[usize] {
        &self.original
    }

    /// Maximum depth reached during construction (0 for a single-leaf tree).
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Bounding box of the whole point set.
    pub fn bounds(&self) -> &BoundingBox {
        &self.bounds
    }

    /// The parameters this tree was built with.
    pub fn options(&self) -> &KdTreeOptions {
        &self.options
    }
}
