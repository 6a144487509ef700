//! Error type shared by both engines.

use std::alloc::{handle_alloc_error, Layout};

/// Failure of a storage request.
///
/// These are the only checked failures in the crate. Looking up an absent
/// key is a normal `None` / `false`, not an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The request exceeds the maximum representable number of elements
    /// for the element type and allocator.
    #[error("requested capacity {requested} exceeds the maximum of {max} elements")]
    CapacityOverflow { requested: usize, max: usize },
    /// The memory source could not satisfy the request.
    #[error("memory allocation of {size} bytes (align {align}) failed")]
    AllocFailed { size: usize, align: usize },
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn alloc_failed(layout: Layout) -> Self {
        Error::AllocFailed {
            size: layout.size(),
            align: layout.align(),
        }
    }

    /// Escalates the error the way std collections do from infallible
    /// entry points such as `Clone` and `Extend`.
    pub(crate) fn raise(self) -> ! {
        match self {
            Error::CapacityOverflow { .. } => panic!("capacity overflow: {self}"),
            Error::AllocFailed { size, align } => match Layout::from_size_align(size, align) {
                Ok(layout) => handle_alloc_error(layout),
                Err(_) => panic!("{self}"),
            },
        }
    }
}
