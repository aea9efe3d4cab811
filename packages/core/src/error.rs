//! Error types for content containers

use crate::component::ComponentId;
use crate::fragment::FragmentId;
use thiserror::Error;

pub type FragmentResult<T> = Result<T, FragmentError>;

/// Structural errors raised by [`Fragment`](crate::Fragment) operations.
///
/// Every failing operation leaves the container exactly as it was.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FragmentError {
    #[error("Range {start}..{end} is outside of [0, {length}]")]
    RangeError {
        start: usize,
        end: usize,
        length: usize,
    },

    #[error("No content at index {index} (length {length})")]
    OutOfRange { index: usize, length: usize },

    #[error("Component {0} is not a child of this fragment")]
    ComponentNotFound(ComponentId),

    #[error("Inserting component {0} would make it a descendant of itself")]
    CycleDetected(ComponentId),

    #[error("Component {component} is already held by {parent}")]
    AlreadyAttached {
        component: ComponentId,
        parent: FragmentId,
    },
}

impl FragmentError {
    pub(crate) fn bad_index(index: usize, length: usize) -> Self {
        Self::RangeError {
            start: index,
            end: index,
            length,
        }
    }

    pub(crate) fn bad_range(start: usize, end: usize, length: usize) -> Self {
        Self::RangeError { start, end, length }
    }
}
