//! Error types for viz3d operations.

use thiserror::Error;

/// Result type alias using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in viz3d operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Input data does not satisfy the shape the operation requires
    /// (missing key, non-finite value, ragged multi-series matrix, etc.).
    #[error("Invalid data shape: {0}")]
    InvalidDataShape(String),

    /// Empty data provided where non-empty is required.
    #[error("Empty data provided")]
    EmptyData,

    /// Scale domain error (empty palette, empty categorical domain).
    #[error("Scale domain error: {0}")]
    ScaleDomain(String),

    /// A point grid handed to the mesh indexer has uneven row lengths.
    #[error("Ragged grid: row {row} has {actual} points, expected {expected}")]
    RaggedGrid {
        /// Index of the offending row.
        row: usize,
        /// Expected row length (taken from the first row).
        expected: usize,
        /// Actual row length.
        actual: usize,
    },

    /// Scene mutation error during a render pass.
    #[error("Rendering error: {0}")]
    Rendering(String),
}
