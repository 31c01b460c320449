//! # sedra-core
//!
//! Core types and I/O for sedra, a toolkit that derives sediment-transport
//! indicators from 2-D hydraulic model output.
//!
//! This crate provides:
//! - `Raster<T>`: a georeferenced grid with no-data support
//! - `GeoTransform`: affine georeferencing for grids
//! - `Crs`: spatial reference handle shared by all rasters of a run
//! - the error taxonomy of the pipeline
//! - single-band floating-point GeoTIFF persistence

pub mod crs;
pub mod error;
pub mod io;
pub mod raster;

pub use crs::Crs;
pub use error::{Error, Result};
pub use raster::{GeoTransform, Raster, RasterElement};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::crs::Crs;
    pub use crate::error::{Error, Result};
    pub use crate::raster::{GeoTransform, Raster, RasterElement};
}
