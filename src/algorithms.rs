use std::fmt;

mod constructor;
mod swap;
mod maxp_partitioner;

pub use maxp_partitioner::{MaxpMetadata, MaxpPartitioner, MaxpSolution};

/// Common errors thrown by algorithms.
#[derive(Clone, Debug)]
#[non_exhaustive]
pub enum Error {
    /// No partition that matches the given criteria could been found.
    NotFound,

    /// Input sets don't have matching lengths.
    InputLenMismatch { expected: usize, actual: usize },

    /// Input contains negative values and such values are not supported.
    NegativeValues,

    /// The worker pool for the parallel starts could not be built.
    WorkerPool(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::NotFound => write!(f, "no partition found"),
            Error::InputLenMismatch { expected, actual } => write!(
                f,
                "input sets don't have the same length (expected {expected} items, got {actual})",
            ),
            Error::NegativeValues => write!(f, "input contains negative values"),
            Error::WorkerPool(reason) => write!(f, "could not build worker pool: {reason}"),
        }
    }
}

impl std::error::Error for Error {}
