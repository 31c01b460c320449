//! Affine georeferencing for rasters

use serde::{Deserialize, Serialize};

/// Affine transformation between pixel coordinates (col, row) and
/// geographic coordinates (x, y):
///
/// ```text
/// x = origin_x + col * cell_size
/// y = origin_y - row * cell_size
/// ```
///
/// The origin is the upper-left corner of the grid. All rasters produced
/// by this pipeline are north-up with square cells, so only the origin
/// and a single cell size are stored.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Cell size (square cells)
    pub cell_size: f64,
}

impl GeoTransform {
    /// Create a new north-up transform
    pub fn new(origin_x: f64, origin_y: f64, cell_size: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            cell_size,
        }
    }

    /// Build the transform plus grid dimensions covering the extent
    /// `(min_x, min_y, max_x, max_y)` at the given cell size.
    ///
    /// Rows and columns are rounded up so the grid always covers the
    /// full extent; a degenerate extent still yields one row/column.
    pub fn for_extent(
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
        cell_size: f64,
    ) -> (Self, usize, usize) {
        let cols = (((max_x - min_x) / cell_size).ceil() as usize).max(1);
        let rows = (((max_y - min_y) / cell_size).ceil() as usize).max(1);
        (Self::new(min_x, max_y, cell_size), rows, cols)
    }

    /// Geographic coordinates of the center of pixel (col, row)
    pub fn pixel_to_geo(&self, col: usize, row: usize) -> (f64, f64) {
        let x = self.origin_x + (col as f64 + 0.5) * self.cell_size;
        let y = self.origin_y - (row as f64 + 0.5) * self.cell_size;
        (x, y)
    }

    /// Geographic coordinates of the top-left corner of pixel (col, row)
    pub fn pixel_to_geo_corner(&self, col: usize, row: usize) -> (f64, f64) {
        let x = self.origin_x + col as f64 * self.cell_size;
        let y = self.origin_y - row as f64 * self.cell_size;
        (x, y)
    }

    /// Fractional pixel coordinates (col, row) of a geographic point;
    /// use `.floor()` for integer indices.
    pub fn geo_to_pixel(&self, x: f64, y: f64) -> (f64, f64) {
        let col = (x - self.origin_x) / self.cell_size;
        let row = (self.origin_y - y) / self.cell_size;
        (col, row)
    }

    /// Bounding box `(min_x, min_y, max_x, max_y)` of a grid with the
    /// given dimensions under this transform.
    pub fn bounds(&self, cols: usize, rows: usize) -> (f64, f64, f64, f64) {
        let (min_x, max_y) = self.pixel_to_geo_corner(0, 0);
        let (max_x, min_y) = self.pixel_to_geo_corner(cols, rows);
        (min_x, min_y, max_x, max_y)
    }

    /// Transform for a sub-grid starting at pixel (col0, row0)
    pub fn offset(&self, col0: usize, row0: usize) -> Self {
        let (origin_x, origin_y) = self.pixel_to_geo_corner(col0, row0);
        Self::new(origin_x, origin_y, self.cell_size)
    }

    /// GDAL-style coefficient array
    /// `[origin_x, pixel_width, 0, origin_y, 0, pixel_height]`
    pub fn to_gdal(&self) -> [f64; 6] {
        [
            self.origin_x,
            self.cell_size,
            0.0,
            self.origin_y,
            0.0,
            -self.cell_size,
        ]
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0)
    }
}
