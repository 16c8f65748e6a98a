//! This module collects functionality for accounting the resources used by tables.

/// Module for defining [bytesized::ByteSized]
pub mod bytesized;
