//! This crate defines the in-memory table representation of tabslim,
//! i.e., it corresponds to the physical layer of the system.
//! Tables consist of typed columns whose storage can be narrowed
//! without changing the logical values they hold.

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
    variant_size_differences,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap
)]

pub mod columnar;
pub mod datatypes;
pub mod dictionary;
pub mod error;
pub mod management;
pub mod optimizer;
pub mod tabular;
