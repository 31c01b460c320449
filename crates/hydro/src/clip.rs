//! Boundary clipping
//!
//! Restricts a full-extent raster to the study boundary in two stages:
//! first a cheap rectangular crop to the boundary's bounding rectangle
//! (snapped to the source grid), then a per-cell polygon mask that sets
//! cells whose centers fall outside the boundary to NaN. The output
//! grid spans the bounding rectangle; the spatial reference is taken
//! from the boundary.

use crate::boundary::Boundary;
use crate::maybe_rayon::*;
use ndarray::Array2;
use sedra_core::raster::Raster;
use sedra_core::{Error, Result};
use tracing::debug;

/// Clip a raster to the boundary polygon.
///
/// Fails with [`Error::BoundaryGeometry`] when the boundary's bounding
/// rectangle does not overlap the raster extent at all.
pub fn clip_to_boundary(raster: &Raster<f64>, boundary: &Boundary) -> Result<Raster<f64>> {
    let cropped = crop_to_rect(raster, boundary)?;
    Ok(mask_to_polygon(cropped, boundary))
}

/// Stage one: rectangular pre-clip.
///
/// Reduces the raster to the cells whose footprint overlaps the
/// boundary's bounding rectangle. Cell edges stay aligned with the
/// source grid, so values are copied, never resampled.
fn crop_to_rect(raster: &Raster<f64>, boundary: &Boundary) -> Result<Raster<f64>> {
    let (bmin_x, bmin_y, bmax_x, bmax_y) = boundary.extent();
    let (rows, cols) = raster.shape();
    let transform = raster.transform();

    // Fractional pixel coordinates of the rectangle's corners
    let (left, top) = transform.geo_to_pixel(bmin_x, bmax_y);
    let (right, bottom) = transform.geo_to_pixel(bmax_x, bmin_y);

    let col0 = left.floor().max(0.0) as usize;
    let row0 = top.floor().max(0.0) as usize;
    let col1 = (right.ceil().max(0.0) as usize).min(cols);
    let row1 = (bottom.ceil().max(0.0) as usize).min(rows);

    if col0 >= col1 || row0 >= row1 {
        return Err(Error::BoundaryGeometry(
            "boundary does not overlap the raster extent".into(),
        ));
    }

    debug!(
        row0, col0,
        rows = row1 - row0,
        cols = col1 - col0,
        "cropped raster to boundary rectangle"
    );

    raster.window(row0, col0, row1 - row0, col1 - col0)
}

/// Stage two: polygon mask. Cell centers outside the boundary become
/// NaN; everything else is carried through unchanged.
fn mask_to_polygon(raster: Raster<f64>, boundary: &Boundary) -> Raster<f64> {
    let (rows, cols) = raster.shape();
    let transform = *raster.transform();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, cell) in row_data.iter_mut().enumerate() {
                let (x, y) = transform.pixel_to_geo(col, row);
                if boundary.contains(x, y) {
                    *cell = unsafe { raster.get_unchecked(row, col) };
                }
            }
            row_data
        })
        .collect();

    let mut output = raster.with_same_meta::<f64>(rows, cols);
    output.set_crs(Some(boundary.crs().clone()));
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() = Array2::from_shape_vec((rows, cols), data)
        .expect("mask preserves raster shape");

    output
}
