//! Raster persistence
//!
//! Output rasters are single-band 32-bit float GeoTIFFs with NaN no-data,
//! one file per derived quantity.

mod geotiff;

pub use geotiff::{
    read_geotiff, read_geotiff_from_buffer, write_geotiff, write_geotiff_to_buffer,
};
