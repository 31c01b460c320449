//! Surface-to-grid resampling
//!
//! Samples a TIN surface onto a uniform grid covering the surface's
//! full extent. Each cell takes the linearly interpolated surface value
//! at its center; cells whose centers fall outside the convex hull are
//! NaN. The result is fully determined by the surface and the cell
//! size.

use crate::maybe_rayon::*;
use crate::surface::TinSurface;
use sedra_core::raster::{GeoTransform, Raster};
use sedra_core::{Crs, Error, Result};
use tracing::debug;

/// Rasterize a surface at the given cell size.
///
/// The grid covers the surface extent, rounded up to whole cells; the
/// optional `crs` is stamped onto the output.
pub fn rasterize(surface: &TinSurface, cell_size: f64, crs: Option<Crs>) -> Result<Raster<f64>> {
    if !(cell_size > 0.0) {
        return Err(Error::InvalidParameter {
            name: "cell_size",
            value: cell_size.to_string(),
            reason: "must be strictly positive".into(),
        });
    }

    let (min_x, min_y, max_x, max_y) = surface.extent();
    let (transform, rows, cols) = GeoTransform::for_extent(min_x, min_y, max_x, max_y, cell_size);

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, cell) in row_data.iter_mut().enumerate() {
                let (x, y) = transform.pixel_to_geo(col, row);
                if let Some(value) = surface.eval(x, y) {
                    *cell = value;
                }
            }
            row_data
        })
        .collect();

    let mut output = Raster::from_vec(data, rows, cols)?;
    output.set_transform(transform);
    output.set_crs(crs);
    output.set_nodata(Some(f64::NAN));

    debug!(
        attribute = surface.attribute().name(),
        rows, cols, cell_size, "rasterized surface"
    );

    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points::Sample;
    use crate::surface::Attribute;
    use approx::assert_relative_eq;

    fn square_surface(side: f64, depth: f64) -> TinSurface {
        let samples = vec![
            Sample { x: 0.0, y: 0.0, depth, velocity: 1.0 },
            Sample { x: side, y: 0.0, depth, velocity: 1.0 },
            Sample { x: side, y: side, depth, velocity: 1.0 },
            Sample { x: 0.0, y: side, depth, velocity: 1.0 },
        ];
        TinSurface::build(&samples, Attribute::Depth).unwrap()
    }

    #[test]
    fn covers_full_extent() {
        let surface = square_surface(12.0, 2.0);
        let raster = rasterize(&surface, 3.0, None).unwrap();
        assert_eq!(raster.shape(), (4, 4));
        assert_eq!(raster.bounds(), (0.0, 0.0, 12.0, 12.0));
    }

    #[test]
    fn interior_cells_hold_surface_values() {
        let surface = square_surface(12.0, 2.0);
        let raster = rasterize(&surface, 3.0, None).unwrap();
        for row in 0..4 {
            for col in 0..4 {
                let v = raster.get(row, col).unwrap();
                assert_relative_eq!(v, 2.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn doubled_cell_size_quarters_cell_count() {
        let surface = square_surface(12.0, 2.0);
        let fine = rasterize(&surface, 1.0, None).unwrap();
        let coarse = rasterize(&surface, 2.0, None).unwrap();
        assert_eq!(fine.len(), 144);
        assert_eq!(coarse.len(), 36);
        assert_eq!(fine.bounds(), coarse.bounds());
    }

    #[test]
    fn cells_outside_hull_are_nodata() {
        // Triangle covering the lower-left half of its bounding square
        let samples = vec![
            Sample { x: 0.0, y: 0.0, depth: 1.0, velocity: 0.0 },
            Sample { x: 10.0, y: 0.0, depth: 1.0, velocity: 0.0 },
            Sample { x: 0.0, y: 10.0, depth: 1.0, velocity: 0.0 },
        ];
        let surface = TinSurface::build(&samples, Attribute::Depth).unwrap();
        let raster = rasterize(&surface, 1.0, None).unwrap();

        // Top-right corner cell center (9.5, 9.5) is outside the triangle
        assert!(raster.get(0, 9).unwrap().is_nan());
        // Lower-left corner cell center (0.5, 0.5) is inside
        assert!(!raster.get(9, 0).unwrap().is_nan());
    }

    #[test]
    fn deterministic_output() {
        let surface = square_surface(10.0, 2.0);
        let a = rasterize(&surface, 1.0, None).unwrap();
        let b = rasterize(&surface, 1.0, None).unwrap();
        assert_eq!(a.data(), b.data());
    }

    #[test]
    fn rejects_zero_cell_size() {
        let surface = square_surface(10.0, 2.0);
        assert!(rasterize(&surface, 0.0, None).is_err());
    }
}
