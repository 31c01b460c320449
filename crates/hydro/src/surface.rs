//! TIN surface builder
//!
//! Builds a constrained-Delaunay triangulated surface over the sample
//! sites for one attribute (depth or velocity) and exposes it as a
//! queryable interpolant: any (x, y) inside the convex hull evaluates to
//! the linear barycentric interpolation of the containing triangle's
//! vertex values; outside the hull the surface is undefined.
//!
//! Depth and velocity surfaces share the coordinate set but are
//! triangulated independently per attribute.

use crate::points::Sample;
use sedra_core::{Error, Result};
use spade::{
    ConstrainedDelaunayTriangulation, FloatTriangulation, HasPosition, Point2, Triangulation,
};
use tracing::debug;

/// Which sample attribute a surface interpolates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    Depth,
    Velocity,
}

impl Attribute {
    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Depth => "depth",
            Attribute::Velocity => "velocity",
        }
    }

    fn extract(&self, sample: &Sample) -> f64 {
        match self {
            Attribute::Depth => sample.depth,
            Attribute::Velocity => sample.velocity,
        }
    }
}

#[derive(Debug)]
struct TinVertex {
    position: Point2<f64>,
    value: f64,
}

impl HasPosition for TinVertex {
    type Scalar = f64;

    fn position(&self) -> Point2<f64> {
        self.position
    }
}

/// A triangulated, piecewise-linear interpolant over scattered samples
#[derive(Debug)]
pub struct TinSurface {
    cdt: ConstrainedDelaunayTriangulation<TinVertex>,
    attribute: Attribute,
    extent: (f64, f64, f64, f64),
}

impl TinSurface {
    /// Triangulate the sample sites for one attribute.
    ///
    /// Fails with [`Error::DegenerateSurface`] when fewer than three
    /// points exist or all points are collinear (no triangle can be
    /// formed, so no surface exists).
    pub fn build(samples: &[Sample], attribute: Attribute) -> Result<Self> {
        let degenerate = |reason: &str| Error::DegenerateSurface {
            attribute: attribute.name().to_string(),
            reason: reason.to_string(),
        };

        if samples.len() < 3 {
            return Err(degenerate(&format!(
                "need at least 3 points, got {}",
                samples.len()
            )));
        }

        let vertices: Vec<TinVertex> = samples
            .iter()
            .map(|s| TinVertex {
                position: Point2::new(s.x, s.y),
                value: attribute.extract(s),
            })
            .collect();

        // Stable bulk load keeps the triangulation deterministic for a
        // given input order. No constraint edges are imposed.
        let cdt = ConstrainedDelaunayTriangulation::bulk_load_cdt_stable(vertices, Vec::new())
            .map_err(|e| degenerate(&format!("triangulation failed: {}", e)))?;

        if cdt.num_inner_faces() == 0 {
            return Err(degenerate("all points are collinear"));
        }

        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        for s in samples {
            min_x = min_x.min(s.x);
            min_y = min_y.min(s.y);
            max_x = max_x.max(s.x);
            max_y = max_y.max(s.y);
        }

        debug!(
            attribute = attribute.name(),
            vertices = cdt.num_vertices(),
            triangles = cdt.num_inner_faces(),
            "built TIN surface"
        );

        Ok(Self {
            cdt,
            attribute,
            extent: (min_x, min_y, max_x, max_y),
        })
    }

    /// The attribute this surface interpolates
    pub fn attribute(&self) -> Attribute {
        self.attribute
    }

    /// Bounding rectangle `(min_x, min_y, max_x, max_y)` of the sample
    /// sites, i.e. of the surface's convex hull
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        self.extent
    }

    /// Number of triangles in the network
    pub fn triangle_count(&self) -> usize {
        self.cdt.num_inner_faces()
    }

    /// Evaluate the surface at (x, y).
    ///
    /// Locates the containing triangle and interpolates linearly from
    /// its three vertex values; returns `None` outside the convex hull.
    pub fn eval(&self, x: f64, y: f64) -> Option<f64> {
        self.cdt
            .barycentric()
            .interpolate(|v| v.data().value, Point2::new(x, y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn unit_square(depth: f64, velocity: f64) -> Vec<Sample> {
        vec![
            Sample { x: 0.0, y: 0.0, depth, velocity },
            Sample { x: 1.0, y: 0.0, depth, velocity },
            Sample { x: 1.0, y: 1.0, depth, velocity },
            Sample { x: 0.0, y: 1.0, depth, velocity },
        ]
    }

    #[test]
    fn uniform_samples_yield_flat_surface() {
        let surface = TinSurface::build(&unit_square(2.0, 1.0), Attribute::Depth).unwrap();
        assert_eq!(surface.triangle_count(), 2);
        assert_relative_eq!(surface.eval(0.5, 0.5).unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(surface.eval(0.1, 0.9).unwrap(), 2.0, epsilon = 1e-12);
    }

    #[test]
    fn tilted_plane_interpolates_linearly() {
        // z = x + y over the unit square
        let samples = vec![
            Sample { x: 0.0, y: 0.0, depth: 0.0, velocity: 0.0 },
            Sample { x: 1.0, y: 0.0, depth: 1.0, velocity: 0.0 },
            Sample { x: 1.0, y: 1.0, depth: 2.0, velocity: 0.0 },
            Sample { x: 0.0, y: 1.0, depth: 1.0, velocity: 0.0 },
        ];
        let surface = TinSurface::build(&samples, Attribute::Depth).unwrap();
        assert_relative_eq!(surface.eval(0.5, 0.5).unwrap(), 1.0, epsilon = 1e-12);
        assert_relative_eq!(surface.eval(0.25, 0.25).unwrap(), 0.5, epsilon = 1e-12);
    }

    #[test]
    fn outside_hull_is_undefined() {
        let surface = TinSurface::build(&unit_square(2.0, 1.0), Attribute::Depth).unwrap();
        assert!(surface.eval(2.0, 2.0).is_none());
        assert!(surface.eval(-0.5, 0.5).is_none());
    }

    #[test]
    fn attribute_selector_picks_the_right_column() {
        let samples = unit_square(2.0, 1.0);
        let depth = TinSurface::build(&samples, Attribute::Depth).unwrap();
        let velocity = TinSurface::build(&samples, Attribute::Velocity).unwrap();
        assert_relative_eq!(depth.eval(0.5, 0.5).unwrap(), 2.0, epsilon = 1e-12);
        assert_relative_eq!(velocity.eval(0.5, 0.5).unwrap(), 1.0, epsilon = 1e-12);
    }

    #[test]
    fn two_points_are_degenerate() {
        let samples = vec![
            Sample { x: 0.0, y: 0.0, depth: 1.0, velocity: 0.0 },
            Sample { x: 1.0, y: 0.0, depth: 2.0, velocity: 0.0 },
        ];
        let err = TinSurface::build(&samples, Attribute::Depth).unwrap_err();
        assert!(matches!(err, sedra_core::Error::DegenerateSurface { .. }));
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let samples = vec![
            Sample { x: 0.0, y: 0.0, depth: 1.0, velocity: 0.0 },
            Sample { x: 1.0, y: 1.0, depth: 2.0, velocity: 0.0 },
            Sample { x: 2.0, y: 2.0, depth: 3.0, velocity: 0.0 },
            Sample { x: 3.0, y: 3.0, depth: 4.0, velocity: 0.0 },
        ];
        let err = TinSurface::build(&samples, Attribute::Depth).unwrap_err();
        assert!(matches!(err, sedra_core::Error::DegenerateSurface { .. }));
    }

    #[test]
    fn extent_covers_all_sites() {
        let surface = TinSurface::build(&unit_square(2.0, 1.0), Attribute::Depth).unwrap();
        assert_eq!(surface.extent(), (0.0, 0.0, 1.0, 1.0));
    }
}
