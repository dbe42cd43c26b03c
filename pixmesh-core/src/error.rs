//! Error types for pixmesh

use thiserror::Error;

/// Main error type for pixmesh operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Algorithm error: {0}")]
    Algorithm(String),

    /// Douglas-Peucker was handed, or produced, fewer than two points
    #[error("Decimation error: {0}")]
    Decimation(String),

    #[error("Triangulation error: {0}")]
    Triangulation(String),

    #[error("Index overflow: {count} vertices do not fit an index limit of {limit}")]
    IndexOverflow { count: usize, limit: usize },
}

/// Result type alias for pixmesh operations
pub type Result<T> = std::result::Result<T, Error>;
