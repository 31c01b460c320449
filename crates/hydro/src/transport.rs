//! Sediment-transport raster algebra
//!
//! The fixed, ordered, cell-wise formula chain applied to the clipped
//! depth raster `h` and velocity raster `v`:
//!
//! ```text
//! Cd   = g·n² / h^(1/3)                       drag coefficient
//! u*   = v·√Cd                                shear velocity
//! τ    = ρ_w·u*²                              bed shear stress
//! τ*   = τ / ((ρ_s − ρ_w)·g·d)                Shields stress
//! d_c  = τ / ((ρ_s − ρ_w)·g·τ*_c) · 304.8     flow competence [mm]
//! ```
//!
//! No-data propagates through every step: a NaN input cell stays NaN in
//! all downstream rasters, and `h ≤ 0` (a dry cell) turns into NaN at
//! the drag-coefficient step instead of aborting the run. All inputs to
//! a binary step must share one grid shape.

use crate::config::{PhysicalConstants, FT_TO_MM};
use crate::maybe_rayon::*;
use ndarray::Array2;
use sedra_core::raster::Raster;
use sedra_core::{Error, Result};
use tracing::debug;

/// The derived rasters of one transport run
#[derive(Debug, Clone)]
pub struct TransportOutputs {
    /// Bed shear stress τ in lb/ft²
    pub shear_stress: Raster<f64>,
    /// Dimensionless Shields stress τ*
    pub shields_stress: Raster<f64>,
    /// Flow competence d_c in millimeters
    pub flow_competence: Raster<f64>,
}

fn check_shapes(a: &Raster<f64>, b: &Raster<f64>) -> Result<()> {
    if a.shape() != b.shape() {
        let (er, ec) = a.shape();
        let (ar, ac) = b.shape();
        return Err(Error::SizeMismatch { er, ec, ar, ac });
    }
    Ok(())
}

/// Apply a unary cell-wise function, skipping no-data cells.
///
/// The function may return NaN to mark a cell-level arithmetic fault,
/// which keeps the fault local instead of aborting the run.
fn cellwise<F>(input: &Raster<f64>, f: F) -> Raster<f64>
where
    F: Fn(f64) -> f64 + Sync + Send,
{
    let (rows, cols) = input.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, cell) in row_data.iter_mut().enumerate() {
                let v = unsafe { input.get_unchecked(row, col) };
                if v.is_nan() {
                    continue;
                }
                *cell = f(v);
            }
            row_data
        })
        .collect();

    let mut output = input.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).expect("cellwise preserves raster shape");
    output
}

/// Apply a binary cell-wise function; no-data in either input
/// produces no-data in the output.
fn cellwise_binary<F>(a: &Raster<f64>, b: &Raster<f64>, f: F) -> Result<Raster<f64>>
where
    F: Fn(f64, f64) -> f64 + Sync + Send,
{
    check_shapes(a, b)?;
    let (rows, cols) = a.shape();

    let data: Vec<f64> = (0..rows)
        .into_par_iter()
        .flat_map(|row| {
            let mut row_data = vec![f64::NAN; cols];
            for (col, cell) in row_data.iter_mut().enumerate() {
                let va = unsafe { a.get_unchecked(row, col) };
                let vb = unsafe { b.get_unchecked(row, col) };
                if va.is_nan() || vb.is_nan() {
                    continue;
                }
                *cell = f(va, vb);
            }
            row_data
        })
        .collect();

    let mut output = a.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).expect("cellwise preserves raster shape");
    Ok(output)
}

/// Drag coefficient `Cd = g·n² / h^(1/3)`.
///
/// Dry cells (`h ≤ 0`) become NaN: the cube-root denominator has no
/// physical meaning there and the fault stays at cell level.
pub fn drag_coefficient(depth: &Raster<f64>, constants: &PhysicalConstants) -> Raster<f64> {
    let g = constants.gravity;
    let n = constants.manning_n;
    cellwise(depth, move |h| {
        if h <= 0.0 {
            f64::NAN
        } else {
            g * n * n / h.cbrt()
        }
    })
}

/// Shear velocity `u* = v·√Cd`
pub fn shear_velocity(velocity: &Raster<f64>, drag: &Raster<f64>) -> Result<Raster<f64>> {
    cellwise_binary(velocity, drag, |v, cd| v * cd.sqrt())
}

/// Bed shear stress `τ = ρ_w·u*²`
pub fn bed_shear_stress(shear_velocity: &Raster<f64>, constants: &PhysicalConstants) -> Raster<f64> {
    let rho_w = constants.water_density;
    cellwise(shear_velocity, move |u| rho_w * u * u)
}

/// Shields stress `τ* = τ / ((ρ_s − ρ_w)·g·d)`
pub fn shields_stress(shear_stress: &Raster<f64>, constants: &PhysicalConstants) -> Raster<f64> {
    let denom = constants.submerged_weight() * constants.grain_diameter;
    cellwise(shear_stress, move |tau| tau / denom)
}

/// Flow competence `d_c = τ / ((ρ_s − ρ_w)·g·τ*_c)`, converted from
/// feet to millimeters
pub fn flow_competence(shear_stress: &Raster<f64>, constants: &PhysicalConstants) -> Raster<f64> {
    let denom = constants.submerged_weight() * constants.critical_shields;
    cellwise(shear_stress, move |tau| tau / denom * FT_TO_MM)
}

/// Run the full formula chain on clipped depth and velocity rasters.
///
/// The order is fixed; each step consumes the previous step's raster.
/// Intermediate drag-coefficient and shear-velocity grids are derived
/// and dropped; the three named outputs are returned.
pub fn transport_chain(
    depth: &Raster<f64>,
    velocity: &Raster<f64>,
    constants: &PhysicalConstants,
) -> Result<TransportOutputs> {
    check_shapes(depth, velocity)?;
    constants.validate()?;

    debug!("computing drag coefficient");
    let drag = drag_coefficient(depth, constants);

    debug!("computing shear velocity");
    let u_shear = shear_velocity(velocity, &drag)?;

    debug!("computing bed shear stress");
    let shear = bed_shear_stress(&u_shear, constants);

    debug!("computing Shields stress");
    let shields = shields_stress(&shear, constants);

    debug!("computing flow competence");
    let competence = flow_competence(&shear, constants);

    Ok(TransportOutputs {
        shear_stress: shear,
        shields_stress: shields,
        flow_competence: competence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use sedra_core::GeoTransform;

    fn grid(value: f64) -> Raster<f64> {
        let mut r = Raster::filled(5, 5, value);
        r.set_transform(GeoTransform::new(0.0, 5.0, 1.0));
        r.set_nodata(Some(f64::NAN));
        r
    }

    fn constants() -> PhysicalConstants {
        PhysicalConstants::default()
    }

    #[test]
    fn drag_coefficient_matches_hand_calc() {
        // Cd = 32.2·0.04² / 2^(1/3)
        let result = drag_coefficient(&grid(2.0), &constants());
        let expected = 32.2 * 0.0016 / 2.0f64.cbrt();
        assert_relative_eq!(result.get(2, 2).unwrap(), expected, epsilon = 1e-12);
        assert_relative_eq!(result.get(2, 2).unwrap(), 0.040891, epsilon = 1e-6);
    }

    #[test]
    fn dry_cell_becomes_nodata() {
        let mut depth = grid(2.0);
        depth.set(1, 1, 0.0).unwrap();
        depth.set(3, 3, -0.5).unwrap();

        let result = drag_coefficient(&depth, &constants());
        assert!(result.get(1, 1).unwrap().is_nan());
        assert!(result.get(3, 3).unwrap().is_nan());
        assert!(!result.get(2, 2).unwrap().is_nan());
    }

    #[test]
    fn unit_square_scenario() {
        // depth = 2 ft, velocity = 1 ft/s everywhere
        let c = constants();
        let out = transport_chain(&grid(2.0), &grid(1.0), &c).unwrap();

        // τ = ρ_w·(v·√Cd)² = ρ_w·Cd for v = 1
        let cd = 32.2 * 0.0016 / 2.0f64.cbrt();
        let tau = out.shear_stress.get(2, 2).unwrap();
        assert_relative_eq!(tau, 62.32 * cd, epsilon = 1e-9);
        assert_relative_eq!(tau, 2.548353, epsilon = 1e-5);

        let shields = out.shields_stress.get(2, 2).unwrap();
        assert_relative_eq!(shields, tau / (c.submerged_weight() * c.grain_diameter), epsilon = 1e-12);

        let dc = out.flow_competence.get(2, 2).unwrap();
        assert_relative_eq!(dc, tau / (c.submerged_weight() * 0.045) * 304.8, epsilon = 1e-9);
        // ~5.2 mm of mobilizable grain size for this flow
        assert_relative_eq!(dc, 5.2129, epsilon = 1e-3);
    }

    #[test]
    fn nodata_propagates_through_the_chain() {
        let mut depth = grid(2.0);
        let mut velocity = grid(1.0);
        depth.set(0, 0, f64::NAN).unwrap();
        velocity.set(4, 4, f64::NAN).unwrap();
        depth.set(2, 2, 0.0).unwrap();

        let out = transport_chain(&depth, &velocity, &constants()).unwrap();
        for raster in [&out.shear_stress, &out.shields_stress, &out.flow_competence] {
            assert!(raster.get(0, 0).unwrap().is_nan());
            assert!(raster.get(4, 4).unwrap().is_nan());
            assert!(raster.get(2, 2).unwrap().is_nan());
            assert!(!raster.get(1, 1).unwrap().is_nan());
        }
    }

    #[test]
    fn formula_chain_round_trip() {
        // Recomputing d_c directly from h, v reproduces the chain
        let h = 1.7;
        let v = 3.1;
        let c = constants();

        let out = transport_chain(&grid(h), &grid(v), &c).unwrap();

        let cd = c.gravity * c.manning_n * c.manning_n / h.cbrt();
        let tau = c.water_density * (v * cd.sqrt()).powi(2);
        let dc = tau / (c.submerged_weight() * c.critical_shields) * FT_TO_MM;

        assert_relative_eq!(out.flow_competence.get(2, 2).unwrap(), dc, epsilon = 1e-9);
    }

    #[test]
    fn shape_mismatch_is_an_error() {
        let depth = grid(2.0);
        let mut velocity = Raster::filled(3, 3, 1.0);
        velocity.set_nodata(Some(f64::NAN));
        assert!(transport_chain(&depth, &velocity, &constants()).is_err());
    }

    #[test]
    fn outputs_share_the_input_grid() {
        let out = transport_chain(&grid(2.0), &grid(1.0), &constants()).unwrap();
        assert_eq!(out.shear_stress.shape(), (5, 5));
        assert_eq!(out.shear_stress.transform(), grid(0.0).transform());
    }
}
