//! Study boundary
//!
//! A closed polygon defining the region of interest. The boundary is an
//! immutable input; it also supplies the spatial reference every derived
//! raster inherits.

use geo::algorithm::{Area, BoundingRect, Contains, Intersects};
use geo_types::{Coord, Line, Point, Polygon};
use sedra_core::{Crs, Error, Result};
use std::fs;
use std::path::Path;

/// Closed polygon bounding the study area, plus its spatial reference
#[derive(Debug, Clone)]
pub struct Boundary {
    polygon: Polygon<f64>,
    crs: Crs,
}

impl Boundary {
    /// Validate and wrap a polygon.
    ///
    /// Fails with [`Error::BoundaryGeometry`] when the exterior ring has
    /// fewer than three distinct vertices, encloses no area, or
    /// self-intersects (an ambiguous region of interest cannot be
    /// clipped against).
    pub fn new(polygon: Polygon<f64>, crs: Crs) -> Result<Self> {
        let exterior = polygon.exterior();

        // geo closes rings implicitly; count distinct vertices
        let mut coords: Vec<Coord<f64>> = exterior.0.clone();
        if coords.len() > 1 && coords.first() == coords.last() {
            coords.pop();
        }
        if coords.len() < 3 {
            return Err(Error::BoundaryGeometry(format!(
                "exterior ring has {} distinct vertices, need at least 3",
                coords.len()
            )));
        }

        if polygon.unsigned_area() <= 0.0 {
            return Err(Error::BoundaryGeometry("polygon has zero area".into()));
        }

        if ring_self_intersects(&coords) {
            return Err(Error::BoundaryGeometry(
                "exterior ring self-intersects".into(),
            ));
        }

        Ok(Self { polygon, crs })
    }

    /// Load the first polygon feature of a GeoJSON file.
    ///
    /// GeoJSON carries no projection metadata, so the caller supplies
    /// the spatial reference the coordinates are in.
    pub fn from_geojson_file<P: AsRef<Path>>(path: P, crs: Crs) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)?;
        Self::from_geojson_str(&text, crs).map_err(|e| match e {
            Error::BoundaryGeometry(reason) => {
                Error::BoundaryGeometry(format!("{}: {}", path.display(), reason))
            }
            other => other,
        })
    }

    /// Parse the first polygon found in a GeoJSON string
    pub fn from_geojson_str(text: &str, crs: Crs) -> Result<Self> {
        let geojson: geojson::GeoJson = text
            .parse()
            .map_err(|e| Error::BoundaryGeometry(format!("invalid GeoJSON: {}", e)))?;

        let polygon = first_polygon(&geojson)
            .ok_or_else(|| Error::BoundaryGeometry("no polygon geometry found".into()))?;

        Self::new(polygon, crs)
    }

    /// The boundary polygon
    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    /// The spatial reference all derived rasters inherit
    pub fn crs(&self) -> &Crs {
        &self.crs
    }

    /// Bounding rectangle `(min_x, min_y, max_x, max_y)`
    pub fn extent(&self) -> (f64, f64, f64, f64) {
        // Validation guarantees a non-degenerate ring, so a bounding
        // rectangle always exists.
        let rect = self
            .polygon
            .bounding_rect()
            .expect("validated polygon has a bounding rect");
        (rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }

    /// Whether a point lies strictly inside the polygon. Points exactly
    /// on the ring are not contained, per `geo`'s `Contains` semantics.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.polygon.contains(&Point::new(x, y))
    }
}

/// Segment-pair sweep over non-adjacent edges of the ring.
/// O(n²), fine for boundary outlines.
fn ring_self_intersects(coords: &[Coord<f64>]) -> bool {
    let n = coords.len();
    let segment = |i: usize| Line::new(coords[i], coords[(i + 1) % n]);

    for i in 0..n {
        for j in (i + 1)..n {
            // Adjacent segments always touch at their shared vertex
            if j == i + 1 || (i == 0 && j == n - 1) {
                continue;
            }
            if segment(i).intersects(&segment(j)) {
                return true;
            }
        }
    }
    false
}

fn first_polygon(geojson: &geojson::GeoJson) -> Option<Polygon<f64>> {
    use geojson::{GeoJson, Value};

    let from_geometry = |geometry: &geojson::Geometry| -> Option<Polygon<f64>> {
        match &geometry.value {
            Value::Polygon(_) => geo_types::Polygon::<f64>::try_from(geometry.value.clone()).ok(),
            Value::MultiPolygon(_) => {
                let mp = geo_types::MultiPolygon::<f64>::try_from(geometry.value.clone()).ok()?;
                mp.0.into_iter().next()
            }
            _ => None,
        }
    };

    match geojson {
        GeoJson::Geometry(g) => from_geometry(g),
        GeoJson::Feature(f) => f.geometry.as_ref().and_then(from_geometry),
        GeoJson::FeatureCollection(fc) => fc
            .features
            .iter()
            .filter_map(|f| f.geometry.as_ref())
            .find_map(from_geometry),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo_types::LineString;

    fn square(side: f64) -> Polygon<f64> {
        Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (side, 0.0),
                (side, side),
                (0.0, side),
                (0.0, 0.0),
            ]),
            vec![],
        )
    }

    #[test]
    fn valid_square_passes() {
        let b = Boundary::new(square(10.0), Crs::from_epsg(2226)).unwrap();
        assert_eq!(b.extent(), (0.0, 0.0, 10.0, 10.0));
        assert!(b.contains(5.0, 5.0));
        assert!(!b.contains(11.0, 5.0));
    }

    #[test]
    fn zero_area_rejected() {
        let degenerate = Polygon::new(
            LineString::from(vec![(0.0, 0.0), (5.0, 0.0), (10.0, 0.0), (0.0, 0.0)]),
            vec![],
        );
        let err = Boundary::new(degenerate, Crs::from_epsg(2226)).unwrap_err();
        assert!(matches!(err, Error::BoundaryGeometry(_)));
    }

    #[test]
    fn bowtie_rejected() {
        let bowtie = Polygon::new(
            LineString::from(vec![
                (0.0, 0.0),
                (10.0, 10.0),
                (10.0, 0.0),
                (0.0, 10.0),
                (0.0, 0.0),
            ]),
            vec![],
        );
        let err = Boundary::new(bowtie, Crs::from_epsg(2226)).unwrap_err();
        assert!(matches!(err, Error::BoundaryGeometry(_)));
    }

    #[test]
    fn parses_geojson_feature() {
        let text = r#"{
            "type": "Feature",
            "properties": {},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0,0],[4,0],[4,4],[0,4],[0,0]]]
            }
        }"#;
        let b = Boundary::from_geojson_str(text, Crs::from_epsg(2226)).unwrap();
        assert_eq!(b.extent(), (0.0, 0.0, 4.0, 4.0));
    }

    #[test]
    fn geojson_without_polygon_rejected() {
        let text = r#"{"type":"Point","coordinates":[1.0,2.0]}"#;
        let err = Boundary::from_geojson_str(text, Crs::from_epsg(2226)).unwrap_err();
        assert!(matches!(err, Error::BoundaryGeometry(_)));
    }
}
