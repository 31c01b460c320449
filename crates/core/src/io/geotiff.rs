//! Single-band float GeoTIFF reading and writing
//!
//! Uses the `tiff` crate directly. Georeferencing is carried through the
//! ModelPixelScale and ModelTiepoint tags plus a minimal GeoKey directory,
//! which is enough for GIS tools to place the grid correctly.

use crate::error::{Error, Result};
use crate::raster::{GeoTransform, Raster, RasterElement};
use std::fs::File;
use std::io::Cursor;
use std::path::Path;
use tiff::decoder::{Decoder, DecodingResult};
use tiff::encoder::colortype::Gray32Float;
use tiff::encoder::TiffEncoder;
use tiff::tags::Tag;

const GEO_KEY_DIRECTORY: u16 = 34735;

/// Read a single-band GeoTIFF into a raster
pub fn read_geotiff<T, P>(path: P) -> Result<Raster<T>>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::open(path.as_ref())?;
    decode(file)
}

/// Read a single-band GeoTIFF from an in-memory buffer
pub fn read_geotiff_from_buffer<T>(data: &[u8]) -> Result<Raster<T>>
where
    T: RasterElement,
{
    decode(Cursor::new(data))
}

fn decode<T, R>(reader: R) -> Result<Raster<T>>
where
    T: RasterElement,
    R: std::io::Read + std::io::Seek,
{
    let mut decoder =
        Decoder::new(reader).map_err(|e| Error::Other(format!("TIFF decode error: {}", e)))?;

    let (width, height) = decoder
        .dimensions()
        .map_err(|e| Error::Other(format!("cannot read TIFF dimensions: {}", e)))?;
    let rows = height as usize;
    let cols = width as usize;

    let image = decoder
        .read_image()
        .map_err(|e| Error::Other(format!("cannot read TIFF data: {}", e)))?;

    let data: Vec<T> = match image {
        DecodingResult::F32(buf) => cast_buffer(&buf),
        DecodingResult::F64(buf) => cast_buffer(&buf),
        DecodingResult::U8(buf) => cast_buffer(&buf),
        DecodingResult::U16(buf) => cast_buffer(&buf),
        DecodingResult::I16(buf) => cast_buffer(&buf),
        DecodingResult::I32(buf) => cast_buffer(&buf),
        _ => {
            return Err(Error::Other(
                "unsupported TIFF pixel format".to_string(),
            ))
        }
    };

    if data.len() != rows * cols {
        return Err(Error::InvalidDimensions { rows, cols });
    }

    let mut raster = Raster::from_vec(data, rows, cols)?;
    raster.set_nodata(Some(T::default_nodata()));
    if let Ok(transform) = read_geotransform(&mut decoder) {
        raster.set_transform(transform);
    }
    Ok(raster)
}

fn cast_buffer<T, S>(buf: &[S]) -> Vec<T>
where
    T: RasterElement,
    S: num_traits::NumCast + Copy,
{
    buf.iter()
        .map(|&v| num_traits::cast(v).unwrap_or(T::default_nodata()))
        .collect()
}

fn read_geotransform<R: std::io::Read + std::io::Seek>(
    decoder: &mut Decoder<R>,
) -> Result<GeoTransform> {
    let scale = decoder
        .get_tag_f64_vec(Tag::ModelPixelScaleTag)
        .map_err(|_| Error::Other("no pixel scale tag".into()))?;
    let tiepoint = decoder
        .get_tag_f64_vec(Tag::ModelTiepointTag)
        .map_err(|_| Error::Other("no tiepoint tag".into()))?;

    if scale.len() < 2 || tiepoint.len() < 6 {
        return Err(Error::Other("incomplete georeferencing tags".into()));
    }

    // tiepoint: [I, J, K, X, Y, Z]; scale: [sx, sy, sz]
    let origin_x = tiepoint[3] - tiepoint[0] * scale[0];
    let origin_y = tiepoint[4] + tiepoint[1] * scale[1];
    Ok(GeoTransform::new(origin_x, origin_y, scale[0]))
}

/// Write a raster to a single-band float GeoTIFF file
pub fn write_geotiff<T, P>(raster: &Raster<T>, path: P) -> Result<()>
where
    T: RasterElement,
    P: AsRef<Path>,
{
    let file = File::create(path.as_ref())?;
    encode(raster, file)
}

/// Write a raster to an in-memory GeoTIFF buffer
pub fn write_geotiff_to_buffer<T>(raster: &Raster<T>) -> Result<Vec<u8>>
where
    T: RasterElement,
{
    let mut buf = Vec::new();
    encode(raster, Cursor::new(&mut buf))?;
    Ok(buf)
}

fn encode<T, W>(raster: &Raster<T>, writer: W) -> Result<()>
where
    T: RasterElement,
    W: std::io::Write + std::io::Seek,
{
    let mut encoder =
        TiffEncoder::new(writer).map_err(|e| Error::Other(format!("TIFF encoder error: {}", e)))?;

    let (rows, cols) = raster.shape();
    let data: Vec<f32> = raster
        .data()
        .iter()
        .map(|&v| num_traits::cast(v).unwrap_or(f32::NAN))
        .collect();

    let mut image = encoder
        .new_image::<Gray32Float>(cols as u32, rows as u32)
        .map_err(|e| Error::Other(format!("cannot create TIFF image: {}", e)))?;

    let gt = raster.transform();

    let scale = [gt.cell_size, gt.cell_size, 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelPixelScaleTag, &scale[..])
        .map_err(|e| Error::Other(format!("cannot write scale tag: {}", e)))?;

    let tiepoint = [0.0, 0.0, 0.0, gt.origin_x, gt.origin_y, 0.0];
    image
        .encoder()
        .write_tag(Tag::ModelTiepointTag, &tiepoint[..])
        .map_err(|e| Error::Other(format!("cannot write tiepoint tag: {}", e)))?;

    // GTModelTypeGeoKey = Projected, GTRasterTypeGeoKey = PixelIsArea
    let geokeys: [u16; 12] = [
        1, 1, 0, 2, //
        1024, 0, 1, 1, //
        1025, 0, 1, 1, //
    ];
    image
        .encoder()
        .write_tag(Tag::Unknown(GEO_KEY_DIRECTORY), &geokeys[..])
        .map_err(|e| Error::Other(format!("cannot write geokey tag: {}", e)))?;

    image
        .write_data(&data)
        .map_err(|e| Error::Other(format!("cannot write TIFF data: {}", e)))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffer_roundtrip_preserves_values_and_transform() {
        let mut raster: Raster<f64> = Raster::filled(4, 6, 1.5);
        raster.set_transform(GeoTransform::new(6_755_374.66, 2_211_694.97, 3.0));
        raster.set_nodata(Some(f64::NAN));
        raster.set(1, 2, f64::NAN).unwrap();
        raster.set(2, 3, 42.25).unwrap();

        let buf = write_geotiff_to_buffer(&raster).unwrap();
        let back: Raster<f64> = read_geotiff_from_buffer(&buf).unwrap();

        assert_eq!(back.shape(), (4, 6));
        assert!(back.get(1, 2).unwrap().is_nan());
        assert_eq!(back.get(2, 3).unwrap(), 42.25);
        assert!((back.transform().origin_x - 6_755_374.66).abs() < 1e-6);
        assert!((back.transform().origin_y - 2_211_694.97).abs() < 1e-6);
        assert!((back.cell_size() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn file_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depth_ras.tif");

        let mut raster: Raster<f64> = Raster::filled(3, 3, 2.0);
        raster.set_transform(GeoTransform::new(0.0, 9.0, 3.0));

        write_geotiff(&raster, &path).unwrap();
        let back: Raster<f64> = read_geotiff(&path).unwrap();
        assert_eq!(back.get(0, 0).unwrap(), 2.0);
        assert_eq!(back.bounds(), (0.0, 0.0, 9.0, 9.0));
    }
}
