//! This module defines all the errors that can occur while executing tabslim-cli.

use thiserror::Error;

/// Error that occur during execution of tabslim's CLI app
#[derive(Error, Debug)]
pub enum CliError {
    /// Error if a value given on the command line cannot be used
    #[error("invalid argument {argument}: {reason}")]
    InvalidArgument {
        /// Name of the argument
        argument: String,
        /// Why the value was rejected
        reason: String,
    },
    /// Error originating from tabslim
    #[error(transparent)]
    TabslimError(#[from] tabslim::error::Error),
}
