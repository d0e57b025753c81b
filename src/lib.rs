//! # kdthree
//!
//! `kdthree` is a Rust library for k-nearest-neighbor search over static 3D
//! point sets. It builds a k-d tree with flat, cache-friendly storage and
//! answers queries with a bounded-heap branch-and-bound traversal, making it
//! suitable as the acceleration structure behind mesh segmentation, curvature
//! estimation, and other point-cloud pipelines.
//!
//! ## Features
//!
//! - **Flat storage**: nodes in one array, points reordered into contiguous
//!   leaf ranges; query results map back to the caller's original indices.
//! - **Bounded candidate queue**: a fixed-capacity max-heap keeps the k best
//!   candidates and exposes the current worst in O(1) for pruning.
//! - **Configurable construction**: leaf size, depth cap, and a balanced
//!   (approximate-median) split mode.
//! - **Parallel batch queries**: the tree is read-only after construction,
//!   so [`KdTree::k_nearest_batch`] fans queries out over `rayon`.
//!
//! ## Example
//!
//! See the `demos/` directory for an SVG visualization of the tree's leaf
//! cells.
//!
//! ## Main Interface
//!
//! The primary entry point is the [`KdTree`] struct, built once over a point
//! set and queried any number of times.

mod bounds;
mod error;
mod kdtree;
mod priority_queue;

pub use bounds::BoundingBox;
pub use bounds::AXIS_X;
pub use bounds::AXIS_Y;
pub use bounds::AXIS_Z;
pub use error::KdError;
pub use kdtree::KdNode;
pub use kdtree::KdTree;
pub use kdtree::KdTreeOptions;
pub use priority_queue::BoundedPriorityQueue;
