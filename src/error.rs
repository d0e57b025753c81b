//! Error types for index construction and queries.

use std::collections::TryReserveError;
use std::fmt;

/// Errors that can occur while building or querying a [`crate::KdTree`].
#[derive(Debug, Clone)]
pub enum KdError {
    /// The index was constructed from zero points. The tree needs at least
    /// one point to have a root leaf.
    EmptyPointSet,

    /// Backing storage for a query's candidate queue could not be allocated.
    /// The query is aborted and the queue is left empty with zero capacity;
    /// the tree itself stays valid for later queries.
    AllocationFailed(TryReserveError),
}

impl fmt::Display for KdError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KdError::EmptyPointSet => {
                write!(f, "empty point set: need at least 1 point to build an index")
            }
            KdError::AllocationFailed(err) => {
                write!(f, "candidate queue allocation failed: {}", err)
            }
        }
    }
}

impl std::error::Error for KdError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            KdError::EmptyPointSet => None,
            KdError::AllocationFailed(err) => Some(err),
        }
    }
}
