//! The crate for tabslim, a tool that measures how much memory a large
//! delimited table occupies and how much of it can be saved
//! by narrowing the physical types of its columns.
//!
//! The work is split into a pipeline of stages, see [pipeline::run]:
//! a quick profile of a sample, a full before/after comparison,
//! a chunked pass producing an optimized subset, and a set of charts.

#![deny(
    missing_debug_implementations,
    missing_copy_implementations,
    trivial_casts,
    trivial_numeric_casts
)]
#![warn(
    missing_docs,
    unused_import_braces,
    unused_qualifications,
    unused_extern_crates,
    variant_size_differences
)]

pub mod comparison;
pub mod config;
pub mod error;
pub mod io;
pub mod pipeline;
pub mod profiler;
pub mod subset;
pub mod visualization;

pub use tabslim_physical as physical;
