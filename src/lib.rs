//! # rb-containers
//!
//! Allocator-aware ordered and sequence containers: a red-black tree engine
//! with a cached maximum, a growable array with strong exception-safety on
//! insertion, and cursor-based iteration shared by both.
//!
//! Every operation that allocates returns a [`Result`]; an allocation
//! failure leaves the container as it was.
//!
//! ## Example
//!
//! ```rust
//! use rb_containers::{DynArray, OrderedMap};
//!
//! let mut map = OrderedMap::new();
//! for k in [10, 20, 5, 15, 3] {
//!     map.insert(k, k * 2).unwrap();
//! }
//! assert_eq!(map.keys().copied().collect::<Vec<_>>(), vec![3, 5, 10, 15, 20]);
//! assert_eq!(map.lower_bound(&12).key(), Some(&15));
//!
//! let mut arr = DynArray::new();
//! arr.push_back(1).unwrap();
//! arr.insert(0, 0).unwrap();
//! assert_eq!(arr.as_slice(), &[0, 1]);
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

pub mod algo;
pub mod alloc;
pub mod array;
pub mod cursor;
pub mod error;
pub mod map;
pub mod node;
pub mod set;
pub mod stack;
pub mod tree;

pub use alloc::{Global, RawAlloc};
pub use array::DynArray;
pub use cursor::{walk, ArrayCursor, Bidirectional, RandomAccess, Reverse, TreeCursor, Walk};
pub use error::{Error, Result};
pub use map::OrderedMap;
pub use node::{Color, NodeId};
pub use set::OrderedSet;
pub use stack::Stack;
pub use tree::RbTree;

#[cfg(test)]
mod proptests;
