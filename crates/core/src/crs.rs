//! Spatial reference handling
//!
//! The pipeline never reprojects: every raster of a run carries the
//! spatial reference of the boundary polygon, unchanged. `Crs` is an
//! opaque handle (EPSG code or WKT string) used only for equality checks
//! and metadata round-tripping.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Spatial reference handle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crs {
    /// EPSG code if known
    epsg: Option<u32>,
    /// WKT representation if known
    wkt: Option<String>,
}

impl Crs {
    /// Create a Crs from an EPSG code
    pub fn from_epsg(code: u32) -> Self {
        Self {
            epsg: Some(code),
            wkt: None,
        }
    }

    /// Create a Crs from a WKT string
    pub fn from_wkt(wkt: impl Into<String>) -> Self {
        Self {
            epsg: None,
            wkt: Some(wkt.into()),
        }
    }

    /// Get the EPSG code if known
    pub fn epsg(&self) -> Option<u32> {
        self.epsg
    }

    /// Get the WKT representation if known
    pub fn wkt(&self) -> Option<&str> {
        self.wkt.as_deref()
    }

    /// Check whether two references describe the same system.
    ///
    /// EPSG codes compare numerically; otherwise WKT strings compare
    /// textually (imperfect, but the pipeline only ever copies one Crs
    /// around, so a mismatch here is a genuine input error).
    pub fn is_equivalent(&self, other: &Crs) -> bool {
        if let (Some(a), Some(b)) = (self.epsg, other.epsg) {
            return a == b;
        }
        match (&self.wkt, &other.wkt) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

impl fmt::Display for Crs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.epsg, &self.wkt) {
            (Some(code), _) => write!(f, "EPSG:{}", code),
            (None, Some(wkt)) => {
                // WKT strings are long; show just the leading name
                let head = wkt.split(',').next().unwrap_or(wkt);
                write!(f, "{}", head)
            }
            (None, None) => write!(f, "<unknown>"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epsg_equivalence() {
        let a = Crs::from_epsg(2226);
        let b = Crs::from_epsg(2226);
        let c = Crs::from_epsg(4326);
        assert!(a.is_equivalent(&b));
        assert!(!a.is_equivalent(&c));
    }

    #[test]
    fn display_epsg() {
        assert_eq!(Crs::from_epsg(2226).to_string(), "EPSG:2226");
    }
}
