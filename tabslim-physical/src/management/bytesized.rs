//! This module defines the trait [ByteSized],
//! which should be implemented by types that can
//! calculate their own size.

use std::mem::size_of;

/// Objects that are able calculate their current size in bytes.
///
/// Sizes are logical footprints: they count the elements that are stored,
/// not the spare capacity of the underlying allocations, so that two tables
/// holding the same data always report the same size.
///
/// We use `u64` rather than `usize` here to avoid overflows when summing up large tables.
pub trait ByteSized {
    /// Return the number of bytes this object consumes
    fn size_bytes(&self) -> u64;
}

/// Computes the memory required for the content of a slice using only
/// the direct size of content objects, without taking into accont any data they might point to.
pub(crate) fn size_inner_vec_flat<T>(object: &[T]) -> u64 {
    object.len() as u64 * size_of::<T>() as u64
}

/// Computes the memory required for a list of strings,
/// including the variable-length bytes owned by each string.
pub(crate) fn size_strings_deep(object: &[String]) -> u64 {
    size_inner_vec_flat(object) + object.iter().map(|s| s.len() as u64).sum::<u64>()
}
