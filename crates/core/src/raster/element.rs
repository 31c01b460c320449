//! Cell element trait
//!
//! The pipeline works in `f64` throughout, but persistence writes 32-bit
//! floats, so the raster type stays generic over a small element trait.

use num_traits::{NumCast, Zero};
use std::fmt::Debug;

/// Types that can be stored in a raster cell.
pub trait RasterElement:
    Copy + Clone + Debug + PartialOrd + PartialEq + NumCast + Zero + Send + Sync + 'static
{
    /// No-data value used when none is set explicitly
    fn default_nodata() -> Self;

    /// Whether this value represents no-data under the given marker
    fn is_nodata(&self, nodata: Option<Self>) -> bool;

    /// Convert to f64 if representable
    fn to_f64(self) -> Option<f64> {
        NumCast::from(self)
    }
}

macro_rules! impl_element_float {
    ($t:ty) => {
        impl RasterElement for $t {
            fn default_nodata() -> Self {
                <$t>::NAN
            }

            // NaN is always no-data for float rasters
            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                if self.is_nan() {
                    return true;
                }
                match nodata {
                    Some(nd) => (self - nd).abs() < <$t>::EPSILON * 100.0,
                    None => false,
                }
            }
        }
    };
}

macro_rules! impl_element_int {
    ($t:ty) => {
        impl RasterElement for $t {
            fn default_nodata() -> Self {
                <$t>::MIN
            }

            fn is_nodata(&self, nodata: Option<Self>) -> bool {
                match nodata {
                    Some(nd) => *self == nd,
                    None => false,
                }
            }
        }
    };
}

impl_element_float!(f32);
impl_element_float!(f64);
impl_element_int!(i32);
impl_element_int!(u8);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_is_always_nodata() {
        assert!(f64::NAN.is_nodata(None));
        assert!(f64::NAN.is_nodata(Some(-9999.0)));
        assert!(!1.5f64.is_nodata(None));
    }

    #[test]
    fn int_nodata_is_explicit() {
        assert!(!0i32.is_nodata(None));
        assert!((-9999i32).is_nodata(Some(-9999)));
    }
}
