//! Error types for sedra
//!
//! Fatal errors abort the whole run before any output is persisted.
//! Cell-level arithmetic faults are *not* errors; they become no-data
//! cells during raster algebra.

use thiserror::Error;

/// Main error type for sedra operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Point table missing a required field or carrying non-numeric
    /// coordinates. Raised before any surface is built.
    #[error("malformed input in {source_name}: {reason}")]
    MalformedInput { source_name: String, reason: String },

    /// Fewer than 3 non-collinear points: no triangulated surface exists.
    #[error("degenerate surface for attribute '{attribute}': {reason}")]
    DegenerateSurface { attribute: String, reason: String },

    /// Boundary polygon unusable for clipping (zero area, open ring, ...).
    #[error("invalid boundary geometry: {0}")]
    BoundaryGeometry(String),

    #[error("invalid raster dimensions: {cols}x{rows}")]
    InvalidDimensions { rows: usize, cols: usize },

    #[error("index out of bounds: ({row}, {col}) in raster of size ({rows}, {cols})")]
    IndexOutOfBounds {
        row: usize,
        col: usize,
        rows: usize,
        cols: usize,
    },

    #[error("raster size mismatch: expected ({er}, {ec}), got ({ar}, {ac})")]
    SizeMismatch {
        er: usize,
        ec: usize,
        ar: usize,
        ac: usize,
    },

    #[error("invalid parameter: {name} = {value} ({reason})")]
    InvalidParameter {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("{0}")]
    Other(String),
}

/// Result type alias for sedra operations
pub type Result<T> = std::result::Result<T, Error>;
