//! Error taxonomy shared by the table and its configuration.
//!
//! A missing key is not an error: lookups return `Option`.

use core::fmt;
use std::collections::TryReserveError;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum TableError {
    /// The slot array or a key copy could not be allocated. The operation
    /// that reported it left the table unchanged.
    AllocationFailure,
    /// A zero capacity or an unusable load factor was supplied.
    InvalidArgument(&'static str),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::AllocationFailure => f.write_str("allocation failed"),
            TableError::InvalidArgument(what) => write!(f, "invalid argument: {}", what),
        }
    }
}

impl std::error::Error for TableError {}

impl From<TryReserveError> for TableError {
    fn from(_: TryReserveError) -> Self {
        TableError::AllocationFailure
    }
}
